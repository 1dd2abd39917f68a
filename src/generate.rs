// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Generation driver.
//!
//! A run loads the shared metafiles, builds every domain whose metafile is
//! present, renders all job files in memory, validates cross-file
//! dependencies, and only then replaces the previous outputs on disk. A
//! configuration error or an unimplemented command aborts the run before
//! anything is written.

use std::{
    collections::HashSet,
    fmt, fs,
    path::{Component, Path, PathBuf},
};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::{
    config::{
        self, LATEST_EDITOR_VERSIONS_METAFILE, LatestEditorVersions, ProjectMetafile,
        SHARED_METAFILE, SharedConfig,
    },
    context::Context,
    emit,
    error::{self, Error},
    job::JobFile,
    jobs,
    validate::{JobIndex, UnresolvedDependency, unresolved_dependencies},
};

/// Default output directory relative to the repository root.
pub const DEFAULT_OUTPUT_DIR: &str = ".yamato";
/// Default metafile directory relative to the repository root.
pub const DEFAULT_CONFIG_DIR: &str = ".yamato/config";

const METAFILE_EXTENSION: &str = "metafile";
const OUTPUT_EXTENSION: &str = "yml";

/// Locations of the repository root, metafiles, and generated files.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct Layout
{
    root:       PathBuf,
    config_dir: PathBuf,
    output_dir: PathBuf,
}

impl Layout
{
    /// Layout with the default `.yamato/config` and `.yamato` directories
    /// under `root`.
    pub fn new(root: impl Into<PathBuf,>,) -> Self
    {
        let root = root.into();
        Self {
            config_dir: root.join(DEFAULT_CONFIG_DIR,),
            output_dir: root.join(DEFAULT_OUTPUT_DIR,),
            root,
        }
    }

    /// Overrides the metafile directory. Relative paths are resolved against
    /// the root.
    pub fn with_config_dir(mut self, dir: impl AsRef<Path,>,) -> Self
    {
        self.config_dir = self.root.join(dir,);
        self
    }

    /// Overrides the output directory. Relative paths are resolved against
    /// the root.
    pub fn with_output_dir(mut self, dir: impl AsRef<Path,>,) -> Self
    {
        self.output_dir = self.root.join(dir,);
        self
    }

    pub fn root(&self,) -> &Path
    {
        &self.root
    }

    pub fn config_dir(&self,) -> &Path
    {
        &self.config_dir
    }

    pub fn output_dir(&self,) -> &Path
    {
        &self.output_dir
    }

    /// Output directory relative to the root with `/` separators, as used in
    /// dependency references.
    ///
    /// ```
    /// use pipegen::Layout;
    ///
    /// assert_eq!(Layout::new("/repo",).reference_prefix(), ".yamato");
    /// assert_eq!(Layout::new("/repo",).with_output_dir("ci/jobs",).reference_prefix(), "ci/jobs");
    /// ```
    pub fn reference_prefix(&self,) -> String
    {
        let relative = self.output_dir.strip_prefix(&self.root,).unwrap_or(&self.output_dir,);
        relative
            .components()
            .map(|component| match component {
                Component::RootDir => String::new(),
                other => other.as_os_str().to_string_lossy().into_owned(),
            },)
            .collect::<Vec<_,>>()
            .join("/",)
    }
}

/// Domains with a fixed metafile, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum Domain
{
    Editor,
    Packages,
    Abv,
    PreviewPublish,
    Templates,
}

impl Domain
{
    pub const ALL: [Self; 5] =
        [Self::Editor, Self::Packages, Self::Abv, Self::PreviewPublish, Self::Templates,];

    /// Metafile name inside the config directory.
    pub fn metafile(self,) -> &'static str
    {
        match self {
            Self::Editor => "_editor.metafile",
            Self::Packages => "_packages.metafile",
            Self::Abv => "_abv.metafile",
            Self::PreviewPublish => "_preview_publish.metafile",
            Self::Templates => "_templates.metafile",
        }
    }

    fn build(self, ctx: &Context<'_,>, path: &Path,) -> Result<Vec<JobFile,>, Error,>
    {
        match self {
            Self::Editor => jobs::editor::build(ctx, &config::load_yaml(path,)?,),
            Self::Packages => jobs::packages::build(ctx, &config::load_yaml(path,)?,),
            Self::Abv => jobs::abv::build(ctx, &config::load_yaml(path,)?,),
            Self::PreviewPublish => jobs::preview_publish::build(ctx, &config::load_yaml(path,)?,),
            Self::Templates => jobs::templates::build(ctx, &config::load_yaml(path,)?,),
        }
    }
}

impl fmt::Display for Domain
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        let name = match self {
            Self::Editor => "editor priming",
            Self::Packages => "packages",
            Self::Abv => "abv",
            Self::PreviewPublish => "preview publish",
            Self::Templates => "templates",
        };
        f.write_str(name,)
    }
}

/// Job file rendered to YAML, without the header.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct GeneratedFile
{
    pub file: JobFile,
    pub yaml: String,
}

/// Every job file of one run, in generation order.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct Generation
{
    pub files: Vec<GeneratedFile,>,
}

impl Generation
{
    /// Dependency index of the generated jobs.
    pub fn index(&self,) -> JobIndex
    {
        JobIndex::from_files(self.files.iter().map(|generated| &generated.file,),)
    }

    pub fn job_count(&self,) -> usize
    {
        self.files.iter().map(|generated| generated.file.jobs.len(),).sum()
    }
}

/// Outcome of [`run`].
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RunReport
{
    /// Number of generated files.
    pub files:      usize,
    /// Number of generated jobs.
    pub jobs:       usize,
    /// Dependencies that do not resolve to a generated job.
    pub unresolved: Vec<UnresolvedDependency,>,
}

/// Generates every job file in memory.
///
/// # Errors
///
/// Returns [`Error::Io`](Error::Io) or [`Error::Metafile`](Error::Metafile)
/// when the shared metafiles are missing or invalid, any builder error, and
/// [`Error::Validation`](Error::Validation) when two builders produce the
/// same file.
pub fn generate(layout: &Layout,) -> Result<Generation, Error,>
{
    let config_dir = layout.config_dir();
    let shared: SharedConfig = config::load_yaml(&config_dir.join(SHARED_METAFILE,),)?;
    let latest: LatestEditorVersions =
        config::load_yaml(&config_dir.join(LATEST_EDITOR_VERSIONS_METAFILE,),)?;
    let prefix = layout.reference_prefix();
    let ctx = Context::new(&shared, &latest, &prefix,);

    let mut job_files = Vec::new();
    for domain in Domain::ALL {
        let path = config_dir.join(domain.metafile(),);
        if !path.is_file() {
            info!("Skipping {domain} jobs: {} not found", path.display());
            continue;
        }
        info!("Generating {domain} jobs");
        job_files.extend(domain.build(&ctx, &path,)?,);
    }

    for path in project_metafiles(config_dir,)? {
        info!("Generating project jobs from {}", path.display());
        let meta: ProjectMetafile = config::load_yaml(&path,)?;
        job_files.extend(jobs::project::build(&ctx, &meta,)?,);
    }

    let mut seen = HashSet::new();
    let mut files = Vec::with_capacity(job_files.len(),);
    for file in job_files {
        if !seen.insert(file.name.clone(),) {
            return Err(Error::validation(format!("duplicate output file '{}'", file.name),),);
        }
        let yaml = emit::render_file(&file,)?;
        files.push(GeneratedFile {
            file,
            yaml,
        },);
    }

    Ok(Generation {
        files,
    },)
}

/// Project metafiles (`*.metafile` not starting with `_`) sorted by name.
fn project_metafiles(dir: &Path,) -> Result<Vec<PathBuf,>, Error,>
{
    let mut paths: Vec<PathBuf,> = fs::read_dir(dir,)
        .map_err(|source| error::io_error(dir, source,),)?
        .filter_map(Result::ok,)
        .map(|entry| entry.path(),)
        .filter(|path| {
            path.is_file()
                && path.extension().is_some_and(|ext| ext == METAFILE_EXTENSION,)
                && path
                    .file_name()
                    .is_some_and(|name| !name.to_string_lossy().starts_with('_',),)
        },)
        .collect();
    paths.sort();
    Ok(paths,)
}

/// Removes previously generated `*.yml` files from `dir`.
///
/// # Errors
///
/// Returns [`Error::Write`](Error::Write) when a file cannot be removed.
pub fn clear_outputs(dir: &Path,) -> Result<usize, Error,>
{
    if !dir.is_dir() {
        return Ok(0,);
    }
    let entries = fs::read_dir(dir,).map_err(|source| error::write_error(dir, source,),)?;
    let mut removed = 0;
    for entry in entries.filter_map(Result::ok,) {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == OUTPUT_EXTENSION,) {
            debug!("Removing {}", path.display());
            fs::remove_file(&path,).map_err(|source| error::write_error(&path, source,),)?;
            removed += 1;
        }
    }
    Ok(removed,)
}

/// Replaces the outputs in the layout's output directory with `generation`.
///
/// # Errors
///
/// Returns [`Error::Write`](Error::Write) on filesystem failures.
pub fn write_generation(layout: &Layout, generation: &Generation,) -> Result<usize, Error,>
{
    let dir = layout.output_dir();
    fs::create_dir_all(dir,).map_err(|source| error::write_error(dir, source,),)?;
    let removed = clear_outputs(dir,)?;
    debug!("Removed {removed} previous files from {}", dir.display());

    for generated in &generation.files {
        let path = dir.join(&generated.file.name,);
        fs::write(&path, emit::with_header(&generated.yaml,),)
            .map_err(|source| error::write_error(&path, source,),)?;
    }
    Ok(generation.files.len(),)
}

fn spinner() -> ProgressBar
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
            .unwrap_or_else(|_| ProgressStyle::default_spinner(),),
    );
    pb
}

/// Generates, validates, and, unless `dry_run`, writes all job files.
///
/// Unresolved dependencies are logged and returned in the report; they do
/// not fail the run.
///
/// # Errors
///
/// Propagates [`generate`] and [`write_generation`] failures.
pub fn run(layout: &Layout, dry_run: bool,) -> Result<RunReport, Error,>
{
    let pb = spinner();

    pb.set_message(format!("Reading metafiles from {}...", layout.config_dir().display()),);
    let generation = generate(layout,)?;

    pb.set_message("Validating dependencies...",);
    let unresolved = unresolved_dependencies(&generation.index(),)?;
    for dependency in &unresolved {
        warn!("{dependency}");
    }

    if dry_run {
        info!("Dry run: {} files not written", generation.files.len());
    } else {
        pb.set_message(format!("Writing {} files...", generation.files.len()),);
        write_generation(layout, &generation,)?;
        info!("Wrote {} files to {}", generation.files.len(), layout.output_dir().display());
    }
    pb.finish_and_clear();

    Ok(RunReport {
        files: generation.files.len(),
        jobs: generation.job_count(),
        unresolved,
    },)
}
