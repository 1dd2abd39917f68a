// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Package pack, test, and publish jobs.

use super::{aggregate_dependency, downloader_install, upm_ci_install};
use crate::{
    config::{Editor, Package, PackagesMetafile},
    context::{Context, DownloaderLocation, Platform},
    error::Error,
    job::{Job, JobFile},
    naming,
};

/// Builds `_packages.yml`.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) for unknown references,
/// platforms without a package agent, and duplicate package ids.
pub fn build(ctx: &Context<'_,>, meta: &PackagesMetafile,) -> Result<Vec<JobFile,>, Error,>
{
    let platforms = ctx.platforms(&meta.platforms,)?;
    let editors = ctx.editors(&meta.override_editors,);
    let agent_pack = ctx.agent(&meta.agent_pack,)?;
    let agent_publish = ctx.agent(&meta.agent_publish,)?;
    let agent_all = ctx.agent(&meta.agent_all_ci,)?;
    let mut file = JobFile::new(naming::PACKAGES_FILE,);

    for package in &meta.packages {
        let mut pack = Job::new();
        pack.set_name(format!("Pack {}", package.packagename),)
            .set_agent(agent_pack.clone(),)
            .add_commands([
                upm_ci_install(ctx,),
                format!("upm-ci package pack --package-path {}", package.packagename),
            ],)
            .add_artifacts_packages();
        file.insert(naming::pack_job_id(&package.id,), pack,)?;
    }

    for package in &meta.packages {
        for platform in &platforms {
            for editor in editors {
                let test = test_job(ctx, package, platform, editor, false,)?;
                file.insert(naming::test_job_id(&package.id, &platform.os, editor.resolved_name(),), test,)?;
                let with_dependencies = test_job(ctx, package, platform, editor, true,)?;
                file.insert(
                    naming::test_dependencies_job_id(&package.id, &platform.os, editor.resolved_name(),),
                    with_dependencies,
                )?;
            }
        }
    }

    let target = editors.iter().find(|editor| ctx.is_target_editor(editor,),);
    for package in &meta.packages {
        let mut publish = Job::new();
        publish
            .set_name(format!("Publish {}", package.packagename),)
            .set_agent(agent_publish.clone(),)
            .add_dependency(ctx.dependency(naming::PACKAGES_FILE, &naming::pack_job_id(&package.id,),),);
        if let Some(target,) = target {
            publish.add_dependencies(platforms.iter().map(|platform| {
                ctx.dependency(
                    naming::PACKAGES_FILE,
                    &naming::test_job_id(&package.id, &platform.os, target.resolved_name(),),
                )
            },),);
        }
        publish
            .add_commands([
                upm_ci_install(ctx,),
                format!("upm-ci package publish --package-path {}", package.packagename),
            ],)
            .add_artifacts_packages();
        file.insert(naming::publish_job_id(&package.id,), publish,)?;
    }

    let mut publish_all = Job::new();
    publish_all
        .set_name("Publish all packages",)
        .set_agent(agent_publish,)
        .add_dependencies(meta.packages.iter().map(|package| {
            ctx.dependency(naming::PACKAGES_FILE, &naming::publish_job_id(&package.id,),)
        },),);
    file.insert(naming::PACKAGES_PUBLISH_ALL, publish_all,)?;

    for editor in editors {
        let name = editor.resolved_name();
        let mut all = Job::new();
        all.set_name(format!("Pack and test all packages - {name}"),)
            .set_agent(agent_all.clone(),)
            .add_var_upm_registry(ctx.services(),)
            .add_var_custom_revision(editor,);
        for package in &meta.packages {
            for platform in &platforms {
                all.add_dependency(aggregate_dependency(
                    ctx,
                    naming::PACKAGES_FILE,
                    &naming::test_job_id(&package.id, &platform.os, name,),
                    editor,
                ),)
                .add_dependency(aggregate_dependency(
                    ctx,
                    naming::PACKAGES_FILE,
                    &naming::test_dependencies_job_id(&package.id, &platform.os, name,),
                    editor,
                ),);
            }
        }
        all.add_commands([
            upm_ci_install(ctx,),
            "upm-ci package izon -t".to_owned(),
            "upm-ci package izon -d".to_owned(),
        ],);
        file.insert(naming::all_package_ci_job_id(name,), all,)?;
    }

    Ok(vec![file],)
}

/// Test job of one package. With `dependencies` the job runs the updated
/// dependency tests against the packed dependencies.
fn test_job(
    ctx: &Context<'_,>,
    package: &Package,
    platform: &Platform,
    editor: &Editor,
    dependencies: bool,
) -> Result<Job, Error,>
{
    let name = editor.resolved_name();
    let mut job = Job::new();
    job.set_name(if dependencies {
        format!("Test {} {} {name} - dependencies", package.packagename, platform.os)
    } else {
        format!("Test {} {} {name}", package.packagename, platform.os)
    },)
        .set_agent(platform.package_agent()?.clone(),)
        .add_var_upm_registry(ctx.services(),)
        .add_var_custom_revision(editor,)
        .add_dependency(ctx.dependency(naming::PACKAGES_FILE, &naming::pack_job_id(&package.id,),),);
    if dependencies || package.hascodependencies {
        job.add_dependencies(package.dependencies.iter().map(|dependency| {
            ctx.dependency(naming::PACKAGES_FILE, &naming::pack_job_id(dependency,),)
        },),);
    }
    job.add_dependencies(ctx.priming_dependency(editor, &platform.os,),);

    job.add_commands([
        upm_ci_install(ctx,),
        downloader_install(ctx,),
        format!(
            "unity-downloader-cli {} -c editor --wait --published-only",
            ctx.downloader_source(editor, &platform.os, DownloaderLocation::RepositoryRoot,)?
        ),
    ],);
    if dependencies {
        job.add_commands(platform.copycmd.clone(),);
        job.add_commands([format!(
            "upm-ci package test -u {} --package-path {} --type updated-dependencies-tests",
            platform.editorpath, package.packagename
        )],);
    } else {
        job.add_commands([format!(
            "upm-ci package test -u {} --package-path {}",
            platform.editorpath, package.packagename
        )],);
    }
    job.add_artifacts_upm_test_results();
    Ok(job,)
}

#[cfg(test)]
mod tests
{
    use super::build;
    use crate::{
        config::{LatestEditorVersions, PackagesMetafile, SharedConfig},
        context::Context,
        job::Dependency,
    };

    const SHARED: &str = r"
target_branch: master
target_editor: trunk
editors:
  - track: trunk
  - track: '2021.1'
    editor_pinning: true
platforms:
  Win:
    os: windows
    agent_package: win
    copycmd: copy upm-ci~\packages\*.tgz .Editor\Data\Resources\PackageManager\Editor
  OSX:
    os: macos
    agent_package: win
non_project_agents:
  win:
    type: Unity::VM
    image: package-ci/win10:stable
    flavor: b1.large
  ubuntu:
    type: Unity::VM
    image: package-ci/ubuntu:stable
    flavor: b1.small
";

    const LATEST: &str = r"
editor_versions:
  2021.1_latest_internal:
    windows:
      revision: aaa111
    macos:
      revision: bbb222
";

    const META: &str = r"
packages:
  - id: core
    packagename: com.unity.render-pipelines.core
  - id: universal
    packagename: com.unity.render-pipelines.universal
    dependencies: [core]
platforms: [Win, OSX]
agent_pack: ubuntu
agent_publish: ubuntu
";

    #[test]
    fn generates_full_package_matrix()
    {
        let shared: SharedConfig = serde_yaml::from_str(SHARED,).expect("expected shared config",);
        let latest: LatestEditorVersions = serde_yaml::from_str(LATEST,).expect("expected versions",);
        let meta: PackagesMetafile = serde_yaml::from_str(META,).expect("expected metafile",);
        let ctx = Context::new(&shared, &latest, ".yamato",);

        let files = build(&ctx, &meta,).expect("expected package jobs",);
        let file = &files[0];
        // 2 pack + 2*2*2*2 tests + 2 publish + publish_all + 2 aggregates
        assert_eq!(file.jobs.len(), 2 + 16 + 2 + 1 + 2);

        let test = file.jobs.get("test_universal_windows_trunk",).expect("expected test job",);
        assert!(test.dependencies.contains(&Dependency::Path(
            ".yamato/_editor_priming.yml#editor:priming:trunk:windows".to_owned()
        )));
        assert_eq!(test.dependencies.len(), 2);

        let pinned = file
            .jobs
            .get("test_universal_windows_2021.1_dependencies",)
            .expect("expected dependency test job",);
        assert!(pinned.commands.iter().any(|command| command.contains("-u aaa111")));
        assert!(pinned.commands.iter().any(|command| command.starts_with("copy upm-ci~")));
        assert!(pinned.dependencies.contains(&Dependency::Path(".yamato/_packages.yml#pack_core".to_owned())));

        let publish = file.jobs.get("publish_core",).expect("expected publish job",);
        let paths: Vec<&str,> = publish.dependencies.iter().map(Dependency::path,).collect();
        assert_eq!(paths, [
            ".yamato/_packages.yml#pack_core",
            ".yamato/_packages.yml#test_core_windows_trunk",
            ".yamato/_packages.yml#test_core_macos_trunk",
        ]);
    }

    #[test]
    fn aggregate_jobs_rerun_per_editor_strategy()
    {
        let shared: SharedConfig = serde_yaml::from_str(SHARED,).expect("expected shared config",);
        let latest: LatestEditorVersions = serde_yaml::from_str(LATEST,).expect("expected versions",);
        let meta: PackagesMetafile = serde_yaml::from_str(META,).expect("expected metafile",);
        let ctx = Context::new(&shared, &latest, ".yamato",);

        let files = build(&ctx, &meta,).expect("expected package jobs",);
        let all = files[0].jobs.get("all_package_ci_trunk",).expect("expected aggregate job",);
        assert_eq!(all.dependencies.len(), 8);
        assert!(all.dependencies.iter().all(|dependency| matches!(dependency, Dependency::Rerun { rerun, .. } if rerun == "on-new-revision")));
    }
}
