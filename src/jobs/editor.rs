// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Editor priming jobs.
//!
//! A priming job resolves an editor track to a concrete revision once per
//! operating system and publishes it as `unity_revision.txt`; every job of an
//! unpinned editor downloads exactly that revision.

use tracing::debug;

use crate::{
    config::EditorMetafile,
    constants::PATH_UNITY_REVISION,
    context::Context,
    error::Error,
    job::{Job, JobFile},
    naming,
};

/// Builds `_editor_priming.yml`.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) for unknown platforms or
/// agents and for platforms sharing an operating system.
pub fn build(ctx: &Context<'_,>, meta: &EditorMetafile,) -> Result<Vec<JobFile,>, Error,>
{
    let agent = ctx.agent(&meta.agent,)?;
    let platforms = ctx.platforms(&meta.platforms,)?;
    let mut file = JobFile::new(naming::EDITOR_PRIMING_FILE,);

    for editor in ctx.editors(&meta.override_editors,) {
        if !Context::needs_priming(editor,) {
            debug!("Editor {} does not need priming", editor.resolved_name());
            continue;
        }
        for platform in &platforms {
            let mut job = Job::new();
            job.set_name(format!("[{},{}] Editor priming", editor.resolved_name(), platform.os),)
                .set_agent(agent.clone(),)
                .set_skip_checkout(true,)
                .add_commands([
                    format!(
                        "pip install unity-downloader-cli --user --upgrade --index-url {}",
                        ctx.services().unity_downloader_cli_url
                    ),
                    format!(
                        "unity-downloader-cli -u {} -o {} --wait --skip-download -c editor > {PATH_UNITY_REVISION}",
                        editor.track, platform.os
                    ),
                ],)
                .add_artifacts_unity_revision();
            file.insert(naming::editor_priming_job_id(editor.resolved_name(), &platform.os,), job,)?;
        }
    }

    Ok(vec![file],)
}
