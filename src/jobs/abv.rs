// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Automated build verification jobs: project aggregates, smoke tests, and
//! trunk verification.

use super::{add_aggregate_triggers, aggregate_dependency, downloader_install};
use crate::{
    config::{AbvMetafile, Agent, Editor, SmokeTest, TestPlatform, TestPlatformKind, UtrFlag},
    constants::{DEFAULT_EDITOR_PATH, PATH_TEST_RESULTS, TEST_PROJECTS_DIR},
    context::{Context, DownloaderLocation},
    error::Error,
    job::{Job, JobFile},
    naming::{self, ProjectJobKey},
    utr,
};

/// Operating system smoke tests run on.
const SMOKE_TEST_OS: &str = "windows";

/// Builds `_abv.yml`.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) for unknown agents, test
/// platforms, and project names that yield no file name.
pub fn build(ctx: &Context<'_,>, meta: &AbvMetafile,) -> Result<Vec<JobFile,>, Error,>
{
    let editors = ctx.editors(&meta.override_editors,);
    let agent = ctx.agent(&meta.abv.agent,)?;
    let mut file = JobFile::new(naming::ABV_FILE,);

    let smoke = meta
        .smoke_test
        .as_ref()
        .map(|smoke| -> Result<_, Error,> {
            let test_platforms = smoke
                .test_platforms
                .iter()
                .map(|test_platform| ctx.test_platform(test_platform,),)
                .collect::<Result<Vec<_,>, _,>>()?;
            Ok((smoke, ctx.agent(&smoke.agent,)?, ctx.agent(&smoke.agent_gpu,)?, test_platforms,),)
        },)
        .transpose()?;

    for editor in editors {
        let name = editor.resolved_name();

        if let Some((smoke, agent_cpu, agent_gpu, test_platforms,),) = &smoke {
            for test_platform in test_platforms {
                let agent = if test_platform.kind == TestPlatformKind::Editmode { agent_cpu } else { agent_gpu };
                let job = smoke_test_job(ctx, smoke, test_platform, editor, agent,)?;
                file.insert(naming::smoke_test_job_id(&test_platform.name, name,), job,)?;
            }

            let mut all_smoke = Job::new();
            all_smoke
                .set_name(format!("All Smoke Tests - {name}"),)
                .set_agent(agent.clone(),)
                .add_var_custom_revision(editor,)
                .add_dependencies(test_platforms.iter().map(|test_platform| {
                    aggregate_dependency(
                        ctx,
                        naming::ABV_FILE,
                        &naming::smoke_test_job_id(&test_platform.name, name,),
                        editor,
                    )
                },),);
            file.insert(naming::all_smoke_tests_job_id(name,), all_smoke,)?;
        }

        let mut all = Job::new();
        all.set_name(format!("_ABV for SRP repository - {name}"),)
            .set_agent(agent.clone(),)
            .add_var_custom_revision(editor,);
        for project in &meta.abv.projects {
            all.add_dependency(aggregate_dependency(
                ctx,
                &naming::project_all_filename(project,)?,
                &naming::project_all_job_id(project, name,),
                editor,
            ),);
        }
        if smoke.is_some() {
            all.add_dependency(aggregate_dependency(
                ctx,
                naming::ABV_FILE,
                &naming::all_smoke_tests_job_id(name,),
                editor,
            ),);
        }
        add_aggregate_triggers(&mut all, ctx, editor, meta.abv.expression_trigger.as_deref(),);
        file.insert(naming::all_project_ci_job_id(name,), all,)?;

        if let Some(verification,) = &meta.trunk_verification {
            let mut job = Job::new();
            job.set_name(format!("Trunk verification - {name}"),)
                .set_agent(ctx.agent(&verification.agent,)?,)
                .add_var_custom_revision(editor,);
            for target in &verification.dependencies {
                let key = ProjectJobKey {
                    project:       &target.project,
                    platform:      &target.platform,
                    api:           &target.api,
                    test_platform: &target.test_platform,
                    build_config:  &target.build_config,
                    color_space:   &target.color_space,
                    editor:        name,
                };
                job.add_dependency(aggregate_dependency(ctx, &key.filename()?, &key.test_job_id(), editor,),);
            }
            file.insert(naming::trunk_verification_job_id(name,), job,)?;
        }
    }

    Ok(vec![file],)
}

fn smoke_test_job(
    ctx: &Context<'_,>,
    smoke: &SmokeTest,
    test_platform: &TestPlatform,
    editor: &Editor,
    agent: &Agent,
) -> Result<Job, Error,>
{
    let dir = format!("{TEST_PROJECTS_DIR}/{}", smoke.folder);
    let mut flags = test_platform.utr_flags.clone();
    flags.extend([
        UtrFlag::always("--testproject=.",),
        UtrFlag::always(format!("--editor-location={DEFAULT_EDITOR_PATH}"),),
        UtrFlag::always(format!("--artifacts_path={PATH_TEST_RESULTS}"),),
    ],);
    if test_platform.kind == TestPlatformKind::Standalone {
        flags.push(UtrFlag::always("--platform=StandaloneWindows64",),);
        flags.push(UtrFlag::always(format!("--timeout={}", utr::timeout(test_platform, "default", false,)),),);
    }
    let flags = utr::generic_flags(&flags, &smoke.folder,)?;

    let mut job = Job::new();
    job.set_name(format!("SRP Smoke Test - {}_{}", test_platform.name, editor.resolved_name()),)
        .set_agent(agent.clone(),)
        .add_var_upm_registry(ctx.services(),)
        .add_var_custom_revision(editor,)
        .add_dependencies(ctx.priming_dependency(editor, SMOKE_TEST_OS,),)
        .add_commands([
            format!("curl -s {}.bat --output {dir}/utr.bat", ctx.services().utr_install_url),
            downloader_install(ctx,),
            format!(
                "cd {dir} && unity-downloader-cli {} -c editor --wait --published-only",
                ctx.downloader_source(editor, SMOKE_TEST_OS, DownloaderLocation::TestProject,)?
            ),
            format!("cd {dir} && utr {}", flags.join(" ",)),
        ],)
        .add_artifacts_test_results();
    Ok(job,)
}
