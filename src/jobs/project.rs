// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Project test matrix.
//!
//! A project metafile expands into one file per platform and graphics API.
//! Each file holds exactly one test job per editor, test platform, build
//! configuration, and colour space; split standalone tests add a player build
//! job the test job depends on. A separate `<project>-all.yml` aggregates the
//! test jobs per editor.

use tracing::debug;

use super::{
    add_aggregate_triggers, aggregate_dependency,
    commands::{CommandContext, commands_for},
};
use crate::{
    config::{ProjectMetafile, TestPlatformKind},
    context::{Context, require_identifier},
    error::Error,
    job::{Job, JobFile},
    naming::{self, ProjectJobKey},
};

/// Test job reference collected for the aggregate file.
struct TestJobRef
{
    editor: String,
    file:   String,
    job:    String,
}

/// Builds the platform files and the aggregate file of one project.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) for unresolvable
/// references or empty matrix axes, and [`Error::Unsupported`] when a
/// platform/API pair lacks commands for a job.
pub fn build(ctx: &Context<'_,>, meta: &ProjectMetafile,) -> Result<Vec<JobFile,>, Error,>
{
    let project = require_identifier(&meta.project.name, "project name",)?;
    let folder = require_identifier(&meta.project.folder, "project folder",)?;
    let editors = ctx.editors(&meta.override_editors,);
    let platforms = ctx.platforms(&meta.platforms,)?;
    let test_platforms = meta
        .test_platforms
        .iter()
        .map(|test_platform| ctx.test_platform(test_platform,),)
        .collect::<Result<Vec<_,>, _,>>()?;

    let mut files = Vec::new();
    let mut test_jobs = Vec::new();

    for platform in &platforms {
        if platform.apis.is_empty() {
            return Err(Error::validation(format!(
                "{project}: platform '{}' lists no apis",
                platform.name
            ),),);
        }
        if platform.build_configs.is_empty() {
            return Err(Error::validation(format!(
                "{project}: platform '{}' lists no build_configs",
                platform.name
            ),),);
        }
        if platform.color_spaces.is_empty() {
            return Err(Error::validation(format!(
                "{project}: platform '{}' lists no color_spaces",
                platform.name
            ),),);
        }

        for api in &platform.apis {
            let mut file = JobFile::new(naming::project_filename(project, &platform.name, &api.name,)?,);

            for editor in editors {
                for test_platform in test_platforms.iter().filter(|tp| !api.excludes(&tp.name,),) {
                    let split = test_platform.kind == TestPlatformKind::Standalone && platform.standalone_split;

                    for build_config in &platform.build_configs {
                        for color_space in &platform.color_spaces {
                            let key = ProjectJobKey {
                                project,
                                platform: &platform.name,
                                api: &api.name,
                                test_platform: &test_platform.name,
                                build_config: &build_config.name,
                                color_space,
                                editor: editor.resolved_name(),
                            };
                            let cmd = CommandContext {
                                context: *ctx,
                                project_folder: folder,
                                platform,
                                api: &api.name,
                                test_platform,
                                editor,
                                build_config,
                                color_space,
                            };

                            if split {
                                let build_id = key.build_job_id();
                                let mut build = project_job(&cmd, &key, true,)?;
                                build.add_artifacts_players(folder,);
                                file.insert(build_id.as_str(), build,)?;

                                let mut test = project_job(&cmd, &key, false,)?;
                                test.add_dependency(ctx.dependency(&file.name, &build_id,),);
                                file.insert(key.test_job_id(), test,)?;
                            } else {
                                let mut test = project_job(&cmd, &key, false,)?;
                                test.add_dependencies(ctx.priming_dependency(editor, &platform.os,),);
                                file.insert(key.test_job_id(), test,)?;
                            }

                            test_jobs.push(TestJobRef {
                                editor: editor.resolved_name().to_owned(),
                                file:   file.name.clone(),
                                job:    key.test_job_id(),
                            },);
                        }
                    }
                }
            }

            debug!("Generated {} jobs for {}", file.jobs.len(), file.name);
            files.push(file,);
        }
    }

    files.push(all_file(ctx, meta, project, &test_jobs,)?,);
    Ok(files,)
}

/// Test or player build job of one matrix point.
fn project_job(cmd: &CommandContext<'_,>, key: &ProjectJobKey<'_,>, build: bool,) -> Result<Job, Error,>
{
    let point = format!(
        "{}_{}_{}_{}_{}",
        key.platform, key.api, key.test_platform, key.build_config, key.color_space
    );
    let name = if build {
        format!("Build {} on {point} on version {}", key.project, key.editor)
    } else {
        format!("{} on {point} on version {}", key.project, key.editor)
    };

    let mut job = Job::new();
    job.set_name(name,)
        .set_agent(cmd.platform.project_agent(cmd.test_platform.kind, build,)?.clone(),)
        .add_var_upm_registry(cmd.context.services(),)
        .add_var_custom_revision(cmd.editor,);
    if build {
        job.add_dependencies(cmd.context.priming_dependency(cmd.editor, &cmd.platform.os,),);
    }
    job.add_commands(commands_for(cmd, build,)?,).add_artifacts_test_results();
    Ok(job,)
}

fn all_file(
    ctx: &Context<'_,>,
    meta: &ProjectMetafile,
    project: &str,
    test_jobs: &[TestJobRef],
) -> Result<JobFile, Error,>
{
    let agent = ctx.agent(&meta.agent_all,)?;
    let mut file = JobFile::new(naming::project_all_filename(project,)?,);

    for editor in ctx.editors(&meta.override_editors,) {
        let name = editor.resolved_name();
        let mut job = Job::new();
        job.set_name(format!("All {project} CI - {name}"),)
            .set_agent(agent.clone(),)
            .add_var_custom_revision(editor,);

        match &meta.all {
            Some(all,) => {
                for dependency in &all.dependencies {
                    for test_platform in &dependency.test_platforms {
                        let key = ProjectJobKey {
                            project,
                            platform: &dependency.platform,
                            api: &dependency.api,
                            test_platform,
                            build_config: &dependency.build_config,
                            color_space: &dependency.color_space,
                            editor: name,
                        };
                        job.add_dependency(aggregate_dependency(
                            ctx,
                            &key.filename()?,
                            &key.test_job_id(),
                            editor,
                        ),);
                    }
                }
            }
            None => {
                job.add_dependencies(test_jobs.iter().filter(|test| test.editor == name,).map(|test| {
                    aggregate_dependency(ctx, &test.file, &test.job, editor,)
                },),);
            }
        }

        add_aggregate_triggers(&mut job, ctx, editor, meta.expression_trigger.as_deref(),);
        file.insert(naming::project_all_job_id(project, name,), job,)?;
    }

    Ok(file,)
}
