// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Command-line interface for the pipegen binary.
//!
//! The CLI regenerates the CI job files from the metafiles, validates the
//! dependency references of files already on disk, and prints a JSON index of
//! the jobs a run would generate.

use std::{io, path::PathBuf, process};

use clap::{ArgAction, Args, Parser, Subcommand};
use pipegen::{Error, JobIndex, Layout, generate, run, unresolved_dependencies};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command line interface for generating CI job files from metafiles.
#[derive(Debug, Parser,)]
#[command(name = "pipegen", version, about = "Generate CI job files from metafiles")]
struct Cli
{
    #[command(subcommand)]
    command: Option<Command,>,

    /// Repository locations, accepted before or after the subcommand.
    #[command(flatten)]
    layout: LayoutArgs,

    /// Log debug output.
    #[arg(long = "verbose", short = 'v', global = true, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Regenerate every job file from the metafiles.
    Generate(GenerateArgs,),
    /// Validate dependency references of the job files on disk.
    Check(CheckArgs,),
    /// Print a JSON index of the files and jobs a run would generate.
    List(ListArgs,),
}

/// Repository locations shared by every subcommand.
#[derive(Debug, Args, Default, Clone,)]
struct LayoutArgs
{
    /// Repository root.
    #[arg(long = "root", value_name = "DIR", env = "PIPEGEN_ROOT", default_value = ".", global = true)]
    root: PathBuf,

    /// Metafile directory. Defaults to `.yamato/config` under the root.
    #[arg(long = "config-dir", value_name = "DIR", global = true)]
    config_dir: Option<PathBuf,>,

    /// Output directory. Defaults to `.yamato` under the root.
    #[arg(long = "output-dir", value_name = "DIR", global = true)]
    output_dir: Option<PathBuf,>,
}

impl LayoutArgs
{
    fn layout(&self,) -> Layout
    {
        let mut layout = Layout::new(&self.root,);
        if let Some(dir,) = &self.config_dir {
            layout = layout.with_config_dir(dir,);
        }
        if let Some(dir,) = &self.output_dir {
            layout = layout.with_output_dir(dir,);
        }
        layout
    }
}

#[derive(Debug, Args,)]
struct GenerateArgs
{
    /// Generate and validate without touching the output directory.
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    dry_run: bool,
}

#[derive(Debug, Args,)]
struct CheckArgs
{
    /// Exit with a non-zero status when a reference is unresolved.
    #[arg(long = "strict", action = ArgAction::SetTrue)]
    strict: bool,
}

#[derive(Debug, Args,)]
struct ListArgs
{
    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main()
{
    if let Err(error,) = run_cli() {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates metafile, generation, and output errors.
fn run_cli() -> Result<(), Error,>
{
    let cli = Cli::parse();
    init_tracing(cli.verbose,);

    let layout = cli.layout.layout();
    match cli.command {
        Some(Command::Generate(args,),) => run_generate(&layout, args.dry_run,),
        Some(Command::Check(args,),) => run_check(&layout, &args,),
        Some(Command::List(args,),) => run_list(&layout, &args,),
        None => run_generate(&layout, false,),
    }
}

fn init_tracing(verbose: bool,)
{
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default,),);
    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt().with_env_filter(filter,).with_writer(io::stderr,).try_init();
}

fn run_generate(layout: &Layout, dry_run: bool,) -> Result<(), Error,>
{
    let report = run(layout, dry_run,)?;
    info!(
        "Generated {} jobs in {} files ({} unresolved dependencies)",
        report.jobs,
        report.files,
        report.unresolved.len()
    );
    Ok((),)
}

fn run_check(layout: &Layout, args: &CheckArgs,) -> Result<(), Error,>
{
    let index = JobIndex::load_dir(layout.output_dir(),)?;
    let unresolved = unresolved_dependencies(&index,)?;
    for dependency in &unresolved {
        warn!("{dependency}");
    }
    info!("Checked {} jobs in {} files", index.job_count(), index.files.len());

    if args.strict && !unresolved.is_empty() {
        return Err(Error::validation(format!("{} unresolved dependencies", unresolved.len()),),);
    }
    Ok((),)
}

fn run_list(layout: &Layout, args: &ListArgs,) -> Result<(), Error,>
{
    let generation = generate(layout,)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_index(&mut handle, &generation.index(), args.pretty,)
}

fn write_index<W: io::Write,>(writer: &mut W, index: &JobIndex, pretty: bool,) -> Result<(), Error,>
{
    if pretty {
        serde_json::to_writer_pretty(writer, index,)?;
    } else {
        serde_json::to_writer(writer, index,)?;
    }

    Ok((),)
}

#[cfg(test)]
mod tests
{
    use std::{fs, io::Cursor, path::Path};

    use clap::Parser;
    use pipegen::{IndexedFile, IndexedJob, JobIndex};
    use tempfile::tempdir;

    use super::{CheckArgs, Cli, Command, LayoutArgs, run_check, write_index};

    #[test]
    fn cli_defaults_to_generate_in_current_directory()
    {
        let cli = Cli::try_parse_from([env!("CARGO_PKG_NAME"),],).expect("failed to parse CLI",);

        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        let layout = cli.layout.layout();
        assert_eq!(layout.config_dir(), Path::new("./.yamato/config"));
        assert_eq!(layout.reference_prefix(), ".yamato");
    }

    #[test]
    fn generate_subcommand_accepts_directories()
    {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "generate",
            "--root",
            "/repo",
            "--output-dir",
            "ci",
            "--dry-run",
            "--verbose",
        ],)
        .expect("failed to parse CLI",);

        assert!(cli.verbose);
        let args = match cli.command.expect("missing generate command",) {
            Command::Generate(args,) => args,
            other => panic!("unexpected command variant: {other:?}"),
        };
        assert!(args.dry_run);
        let layout = cli.layout.layout();
        assert_eq!(layout.output_dir(), Path::new("/repo/ci"));
        assert_eq!(layout.config_dir(), Path::new("/repo/.yamato/config"));
    }

    #[test]
    fn root_before_subcommand_applies_to_subcommand()
    {
        let cli = Cli::try_parse_from([env!("CARGO_PKG_NAME"), "--root", "/repo", "generate", "--config-dir", "cfg",],)
            .expect("failed to parse CLI",);

        assert!(matches!(cli.command, Some(Command::Generate(_,),)));
        let layout = cli.layout.layout();
        assert_eq!(layout.config_dir(), Path::new("/repo/cfg"));
        assert_eq!(layout.output_dir(), Path::new("/repo/.yamato"));
    }

    #[test]
    fn list_pretty_flag_uses_pretty_writer()
    {
        let cli = Cli::try_parse_from([env!("CARGO_PKG_NAME"), "list", "--pretty",],)
            .expect("failed to parse CLI",);
        let args = match cli.command.expect("missing list command",) {
            Command::List(args,) => args,
            other => panic!("unexpected command variant: {other:?}"),
        };
        assert!(args.pretty);

        let index = JobIndex {
            files: vec![IndexedFile {
                name: "_abv.yml".to_owned(),
                jobs: vec![IndexedJob {
                    id:           "all_project_ci_trunk".to_owned(),
                    dependencies: Vec::new(),
                }],
            }],
        };
        let mut buffer = Cursor::new(Vec::new(),);
        write_index(&mut buffer, &index, false,).expect("failed to serialize index",);

        let output = String::from_utf8(buffer.into_inner(),).expect("invalid UTF-8",);
        assert_eq!(
            output,
            r#"{"files":[{"name":"_abv.yml","jobs":[{"id":"all_project_ci_trunk","dependencies":[]}]}]}"#
        );
    }

    #[test]
    fn strict_check_fails_on_unresolved_references()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let output = temp.path().join(".yamato",);
        fs::create_dir_all(&output,).expect("failed to create output dir",);
        fs::write(
            output.join("_abv.yml",),
            "all_project_ci_trunk:\n  name: ABV\n  dependencies:\n    - .yamato/universal-all.yml#All_Universal_trunk\n",
        )
        .expect("failed to write job file",);

        let layout = LayoutArgs {
            root:       temp.path().to_path_buf(),
            config_dir: None,
            output_dir: None,
        }
        .layout();
        let args = |strict| CheckArgs {
            strict,
        };

        run_check(&layout, &args(false,),).expect("lenient check should pass",);
        match run_check(&layout, &args(true,),) {
            Err(pipegen::Error::Validation {
                message,
            },) => assert_eq!(message, "1 unresolved dependencies"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
