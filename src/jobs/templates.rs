// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Project template pack and test jobs.

use super::{aggregate_dependency, downloader_install, upm_ci_install};
use crate::{
    config::{Editor, Template, TemplatesMetafile},
    context::{Context, DownloaderLocation, Platform},
    error::Error,
    job::{Job, JobFile},
    naming,
};

/// Builds `_templates.yml`.
///
/// Template tests depend on the template pack and on the packs of the
/// packages the template uses, which live in `_packages.yml`.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) for unknown references,
/// platforms without a package agent, and duplicate template ids.
pub fn build(ctx: &Context<'_,>, meta: &TemplatesMetafile,) -> Result<Vec<JobFile,>, Error,>
{
    let platforms = ctx.platforms(&meta.platforms,)?;
    let editors = ctx.editors(&meta.override_editors,);
    let agent_pack = ctx.agent(&meta.agent_pack,)?;
    let agent_all = ctx.agent(&meta.agent_all_ci,)?;
    let mut file = JobFile::new(naming::TEMPLATES_FILE,);

    for template in &meta.templates {
        let mut pack = Job::new();
        pack.set_name(format!("Pack {} template", template.display_name()),)
            .set_agent(agent_pack.clone(),)
            .add_commands([
                upm_ci_install(ctx,),
                format!("upm-ci template pack --project-path {}", template.packagename),
            ],)
            .add_artifacts_templates();
        file.insert(naming::pack_job_id(&template.id,), pack,)?;
    }

    for template in &meta.templates {
        for platform in &platforms {
            for editor in editors {
                file.insert(
                    naming::test_job_id(&template.id, &platform.os, editor.resolved_name(),),
                    test_job(ctx, template, platform, editor,)?,
                )?;
            }
        }
    }

    for editor in editors {
        let name = editor.resolved_name();
        let mut all = Job::new();
        all.set_name(format!("Pack and test all templates - {name}"),)
            .set_agent(agent_all.clone(),)
            .add_var_custom_revision(editor,);
        for template in &meta.templates {
            all.add_dependencies(platforms.iter().map(|platform| {
                aggregate_dependency(
                    ctx,
                    naming::TEMPLATES_FILE,
                    &naming::test_job_id(&template.id, &platform.os, name,),
                    editor,
                )
            },),);
        }
        file.insert(naming::all_template_ci_job_id(name,), all,)?;
    }

    Ok(vec![file],)
}

fn test_job(
    ctx: &Context<'_,>,
    template: &Template,
    platform: &Platform,
    editor: &Editor,
) -> Result<Job, Error,>
{
    let mut job = Job::new();
    job.set_name(format!(
        "Test {} {} {}",
        template.display_name(),
        platform.os,
        editor.resolved_name()
    ),)
        .set_agent(platform.package_agent()?.clone(),)
        .add_var_upm_registry(ctx.services(),)
        .add_var_custom_revision(editor,)
        .add_dependency(ctx.dependency(naming::TEMPLATES_FILE, &naming::pack_job_id(&template.id,),),)
        .add_dependencies(template.dependencies.iter().map(|package| {
            ctx.dependency(naming::PACKAGES_FILE, &naming::pack_job_id(package,),)
        },),)
        .add_dependencies(ctx.priming_dependency(editor, &platform.os,),)
        .add_commands([
            upm_ci_install(ctx,),
            downloader_install(ctx,),
            format!(
                "unity-downloader-cli {} -c editor --wait --published-only",
                ctx.downloader_source(editor, &platform.os, DownloaderLocation::RepositoryRoot,)?
            ),
            format!(
                "upm-ci template test -u {} --project-path {}",
                platform.editorpath, template.packagename
            ),
        ],)
        .add_artifacts_upm_test_results();
    Ok(job,)
}

#[cfg(test)]
mod tests
{
    use super::build;
    use crate::{
        config::{LatestEditorVersions, SharedConfig, TemplatesMetafile},
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
    agent_package: win
  Linux:
    os: linux
    agent_package: win
non_project_agents:
  win:
    type: Unity::VM
    image: package-ci/win10:stable
    flavor: b1.large
  package_ci_ubuntu:
    type: Unity::VM
    image: package-ci/ubuntu:stable
    flavor: b1.small
";

    const META: &str = r"
templates:
  - id: universal
    packagename: com.unity.template.universal
    name: Universal
    dependencies: [core, universal, shadergraph]
platforms: [Win, Linux]
agent_pack: win
";

    #[test]
    fn template_tests_depend_on_package_packs()
    {
        let shared: SharedConfig = serde_yaml::from_str(SHARED,).expect("expected shared config",);
        let latest = LatestEditorVersions::default();
        let meta: TemplatesMetafile = serde_yaml::from_str(META,).expect("expected metafile",);
        let ctx = Context::new(&shared, &latest, ".yamato",);

        let file = build(&ctx, &meta,).expect("expected template jobs",).remove(0,);
        assert_eq!(file.jobs.len(), 1 + 2 + 1);

        let test = file.jobs.get("test_universal_linux_trunk",).expect("expected test job",);
        let paths: Vec<&str,> = test.dependencies.iter().map(Dependency::path,).collect();
        assert_eq!(paths, [
            ".yamato/_templates.yml#pack_universal",
            ".yamato/_packages.yml#pack_core",
            ".yamato/_packages.yml#pack_universal",
            ".yamato/_packages.yml#pack_shadergraph",
            ".yamato/_editor_priming.yml#editor:priming:trunk:linux",
        ]);
        assert_eq!(test.name, "Test Universal linux trunk");

        let all = file.jobs.get("all_template_ci_trunk",).expect("expected aggregate",);
        assert_eq!(all.dependencies.len(), 2);
        assert_eq!(all.agent.as_ref().map(|agent| agent.image.as_str()), Some("package-ci/ubuntu:stable"));
    }
}
