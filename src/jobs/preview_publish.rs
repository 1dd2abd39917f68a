// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Preview publishing of packages once the nightly verification passed.

use super::upm_ci_install;
use crate::{
    config::PreviewPublishMetafile,
    context::Context,
    error::Error,
    job::{Job, JobFile},
    naming,
};

/// Builds `_preview_publish.yml`.
///
/// Publish jobs depend on the target editor's package tests in
/// `_packages.yml`; `wait_for_nightly` depends on the target editor's ABV.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) for unknown platforms or
/// agents and duplicate package ids.
pub fn build(ctx: &Context<'_,>, meta: &PreviewPublishMetafile,) -> Result<Vec<JobFile,>, Error,>
{
    let platforms = ctx.platforms(&meta.platforms,)?;
    let agent_pack = ctx.agent(&meta.agent_pack,)?;
    let agent_publish = ctx.agent(&meta.agent_publish,)?;
    let agent_promote = ctx.agent(&meta.agent_promote,)?;
    let target = ctx.shared().target_editor.as_str();
    let file_name = naming::PREVIEW_PUBLISH_FILE;
    let mut file = JobFile::new(file_name,);

    for package in &meta.packages {
        let pack_id = naming::pack_job_id(&package.id,);
        let publish_id = naming::publish_job_id(&package.id,);

        let mut pack = Job::new();
        pack.set_name(format!("Pack {} (preview)", package.packagename),)
            .set_agent(agent_pack.clone(),)
            .add_commands([
                upm_ci_install(ctx,),
                format!("upm-ci package pack --package-path {}", package.packagename),
            ],)
            .add_artifacts_packages();
        file.insert(pack_id.as_str(), pack,)?;

        let mut publish = Job::new();
        publish
            .set_name(format!("Publish {} (preview)", package.packagename),)
            .set_agent(agent_publish.clone(),)
            .add_dependency(ctx.dependency(file_name, &pack_id,),)
            .add_dependencies(platforms.iter().map(|platform| {
                ctx.dependency(
                    naming::PACKAGES_FILE,
                    &naming::test_job_id(&package.id, &platform.os, target,),
                )
            },),)
            .add_commands([
                upm_ci_install(ctx,),
                format!("upm-ci package publish --package-path {}", package.packagename),
            ],)
            .add_artifacts_packages();
        file.insert(publish_id.as_str(), publish,)?;

        let mut promote = Job::new();
        promote
            .set_name(format!("Promote {} to production", package.packagename),)
            .set_agent(agent_promote.clone(),)
            .add_dependency(ctx.dependency(file_name, &publish_id,),)
            .add_commands([
                upm_ci_install(ctx,),
                format!("upm-ci package promote --package-path {}", package.packagename),
            ],)
            .add_artifacts_packages();
        file.insert(naming::promote_job_id(&package.id,), promote,)?;
    }

    let mut wait = Job::new();
    wait.set_name("Wait for nightly",)
        .set_agent(agent_publish.clone(),)
        .add_dependency(ctx.dependency(naming::ABV_FILE, &naming::all_project_ci_job_id(target,),),);
    file.insert(naming::PREVIEW_WAIT_FOR_NIGHTLY, wait,)?;

    let mut publish_all = Job::new();
    publish_all
        .set_name("Publish all preview packages",)
        .set_agent(agent_publish,)
        .add_dependencies(meta.packages.iter().map(|package| {
            ctx.dependency(file_name, &naming::publish_job_id(&package.id,),)
        },),);
    if meta.auto_publish {
        publish_all
            .add_dependency(ctx.dependency(file_name, naming::PREVIEW_WAIT_FOR_NIGHTLY,),)
            .add_trigger_recurrent(ctx.target_branch(), "daily",);
    }
    file.insert(naming::PREVIEW_PUBLISH_ALL, publish_all,)?;

    let mut promote_all = Job::new();
    promote_all
        .set_name("Promote all preview packages to production",)
        .set_agent(agent_promote,)
        .add_dependencies(meta.packages.iter().map(|package| {
            ctx.dependency(file_name, &naming::promote_job_id(&package.id,),)
        },),);
    file.insert(naming::PREVIEW_PROMOTE_ALL, promote_all,)?;

    Ok(vec![file],)
}

#[cfg(test)]
mod tests
{
    use super::build;
    use crate::{
        config::{LatestEditorVersions, PreviewPublishMetafile, SharedConfig},
        context::Context,
        job::Dependency,
    };

    const SHARED: &str = r"
target_branch: master
target_editor: trunk
editors:
  - track: trunk
platforms:
  Win:
    os: windows
non_project_agents:
  ubuntu:
    type: Unity::VM
    image: package-ci/ubuntu:stable
    flavor: b1.small
";

    fn meta(auto_publish: bool,) -> PreviewPublishMetafile
    {
        serde_yaml::from_str(&format!(
            "packages:\n  - id: core\n    packagename: com.unity.render-pipelines.core\nplatforms: [Win]\nagent_pack: ubuntu\nagent_publish: ubuntu\nagent_promote: ubuntu\nauto_publish: {auto_publish}"
        ),)
        .expect("expected metafile",)
    }

    #[test]
    fn publish_depends_on_package_tests_of_target_editor()
    {
        let shared: SharedConfig = serde_yaml::from_str(SHARED,).expect("expected shared config",);
        let latest = LatestEditorVersions::default();
        let ctx = Context::new(&shared, &latest, ".yamato",);

        let file = build(&ctx, &meta(false,),).expect("expected jobs",).remove(0,);
        let ids: Vec<&str,> = file.job_ids().collect();
        assert_eq!(ids, [
            "pack_core",
            "publish_core",
            "promote_core",
            "wait_for_nightly",
            "publish_all_preview",
            "promote_all_preview",
        ]);

        let publish = file.jobs.get("publish_core",).expect("expected publish job",);
        assert!(publish.dependencies.contains(&Dependency::Path(
            ".yamato/_packages.yml#test_core_windows_trunk".to_owned()
        )));
        let wait = file.jobs.get("wait_for_nightly",).expect("expected wait job",);
        assert_eq!(wait.dependencies[0].path(), ".yamato/_abv.yml#all_project_ci_trunk");
        let publish_all = file.jobs.get("publish_all_preview",).expect("expected publish all",);
        assert!(publish_all.triggers.is_empty());
    }

    #[test]
    fn auto_publish_schedules_publish_all()
    {
        let shared: SharedConfig = serde_yaml::from_str(SHARED,).expect("expected shared config",);
        let latest = LatestEditorVersions::default();
        let ctx = Context::new(&shared, &latest, ".yamato",);

        let file = build(&ctx, &meta(true,),).expect("expected jobs",).remove(0,);
        let publish_all = file.jobs.get("publish_all_preview",).expect("expected publish all",);
        assert_eq!(publish_all.triggers.recurrent.len(), 1);
        assert!(publish_all.dependencies.iter().any(|dependency| dependency.path().ends_with("#wait_for_nightly")));
    }
}
