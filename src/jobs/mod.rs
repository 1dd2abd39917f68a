// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Per-domain job builders.
//!
//! Every builder takes the resolved [`Context`] and its domain metafile and
//! returns the job files of that domain. Builders never touch the
//! filesystem.

pub mod abv;
pub mod commands;
pub mod editor;
pub mod packages;
pub mod preview_publish;
pub mod project;
pub mod templates;

use crate::{
    config::Editor,
    context::Context,
    job::{Dependency, Job},
};

/// Installs the `upm-ci` tooling.
fn upm_ci_install(ctx: &Context<'_,>,) -> String
{
    format!("npm install upm-ci-utils@stable -g --registry {}", ctx.services().upm_ci_registry)
}

/// Installs `unity-downloader-cli` through pip.
fn downloader_install(ctx: &Context<'_,>,) -> String
{
    format!(
        "pip install unity-downloader-cli --index-url {} --upgrade",
        ctx.services().unity_downloader_cli_url
    )
}

/// Dependency of an aggregate job, rerun according to `editor`.
fn aggregate_dependency(ctx: &Context<'_,>, file: &str, job: &str, editor: &Editor,) -> Dependency
{
    ctx.dependency(file, job,).with_rerun(editor.rerun_strategy.as_str(),)
}

/// Schedules nightly editors and gates pull requests on the target editor.
fn add_aggregate_triggers(
    job: &mut Job,
    ctx: &Context<'_,>,
    editor: &Editor,
    expression: Option<&str,>,
)
{
    if editor.nightly {
        job.add_trigger_recurrent(ctx.target_branch(), "daily",);
    }
    if let Some(expression,) = expression
        && ctx.is_target_editor(editor,)
    {
        job.set_trigger_expression(expression,);
    }
}

#[cfg(test)]
mod tests
{
    use super::{add_aggregate_triggers, aggregate_dependency};
    use crate::{
        config::{Editor, LatestEditorVersions, SharedConfig},
        context::Context,
        job::{Dependency, Job},
    };

    #[test]
    fn triggers_follow_editor_flags()
    {
        let shared: SharedConfig = serde_yaml::from_str(
            "target_branch: master\ntarget_editor: trunk\neditors:\n  - track: trunk\n    nightly: true\n  - track: '2021.1'\n    rerun_strategy: always",
        )
        .expect("expected shared config",);
        let latest = LatestEditorVersions::default();
        let ctx = Context::new(&shared, &latest, ".yamato",);
        let trunk: &Editor = &shared.editors[0];
        let other: &Editor = &shared.editors[1];

        let mut job = Job::new();
        add_aggregate_triggers(&mut job, &ctx, trunk, Some("pull_request.target eq \"master\""),);
        assert_eq!(job.triggers.recurrent.len(), 1);
        assert_eq!(job.triggers.recurrent[0].branch, "master");
        assert!(job.triggers.expression.is_some());

        let mut job = Job::new();
        add_aggregate_triggers(&mut job, &ctx, other, Some("expr"),);
        assert!(job.triggers.is_empty());

        assert_eq!(
            aggregate_dependency(&ctx, "_abv.yml", "all_smoke_tests_2021.1", other,),
            Dependency::Rerun {
                path:  ".yamato/_abv.yml#all_smoke_tests_2021.1".to_owned(),
                rerun: "always".to_owned(),
            }
        );
    }
}
