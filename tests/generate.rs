// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use pipegen::{HEADER, JobIndex, Layout, generate, run, unresolved_dependencies};

fn fixture_dir() -> PathBuf
{
    Path::new(env!("CARGO_MANIFEST_DIR"),).join("tests/fixtures/config",)
}

/// Copies the fixture metafiles into a fresh repository root.
fn fixture_repo() -> (tempfile::TempDir, Layout,)
{
    let temp = tempfile::tempdir().expect("failed to create tempdir",);
    let layout = Layout::new(temp.path(),);
    fs::create_dir_all(layout.config_dir(),).expect("failed to create config dir",);
    for entry in fs::read_dir(fixture_dir(),).expect("failed to read fixtures",) {
        let path = entry.expect("failed to read fixture entry",).path();
        let name = path.file_name().expect("fixture file name",);
        fs::copy(&path, layout.config_dir().join(name,),).expect("failed to copy fixture",);
    }
    (temp, layout,)
}

fn outputs(dir: &Path,) -> BTreeMap<String, String,>
{
    fs::read_dir(dir,)
        .expect("failed to read output dir",)
        .map(|entry| entry.expect("failed to read output entry",).path(),)
        .filter(|path| path.extension().is_some_and(|ext| ext == "yml",),)
        .map(|path| {
            let name = path.file_name().expect("output file name",).to_string_lossy().into_owned();
            (name, fs::read_to_string(&path,).expect("failed to read output",),)
        },)
        .collect()
}

#[test]
fn fixture_generates_every_domain()
{
    let layout = Layout::new(env!("CARGO_MANIFEST_DIR"),).with_config_dir(fixture_dir(),);
    let generation = generate(&layout,).expect("generation failed",);

    let names: Vec<&str,> = generation.files.iter().map(|generated| generated.file.name.as_str(),).collect();
    assert_eq!(names, [
        "_editor_priming.yml",
        "_packages.yml",
        "_abv.yml",
        "_preview_publish.yml",
        "_templates.yml",
        "universal-win-dx11.yml",
        "universal-win-vulkan.yml",
        "universal-osx-metal.yml",
        "universal-android-vulkan.yml",
        "universal-all.yml",
    ]);
}

#[test]
fn every_dependency_resolves()
{
    let layout = Layout::new(env!("CARGO_MANIFEST_DIR"),).with_config_dir(fixture_dir(),);
    let generation = generate(&layout,).expect("generation failed",);

    let unresolved = unresolved_dependencies(&generation.index(),).expect("validation failed",);
    assert!(unresolved.is_empty(), "unresolved: {unresolved:?}");
}

#[test]
fn project_matrix_yields_one_test_job_per_combination()
{
    let layout = Layout::new(env!("CARGO_MANIFEST_DIR"),).with_config_dir(fixture_dir(),);
    let generation = generate(&layout,).expect("generation failed",);
    let file = |name: &str| {
        &generation
            .files
            .iter()
            .find(|generated| generated.file.name == name,)
            .expect("expected generated file",)
            .file
    };

    // two editors, three test platforms
    assert_eq!(file("universal-win-dx11.yml").jobs.len(), 2 * 3);
    assert_eq!(file("universal-win-vulkan.yml").jobs.len(), 2 * 3);
    // Standalone excluded
    assert_eq!(file("universal-osx-metal.yml").jobs.len(), 2 * 2);
    // split standalone: build and test job per editor
    let android = file("universal-android-vulkan.yml",);
    assert_eq!(android.jobs.len(), 2 * 2);
    assert!(android.jobs.contains_key("Build_Universal_Android_Vulkan_Standalone_il2cpp_Linear_2021.1"));

    let all = file("universal-all.yml",);
    let trunk = all.jobs.get("All_Universal_trunk",).expect("expected aggregate",);
    assert_eq!(trunk.dependencies.len(), 3 + 3 + 2 + 1);
    assert!(trunk.triggers.expression.is_some());
    assert_eq!(trunk.triggers.recurrent.len(), 1);
    let pinned = all.jobs.get("All_Universal_2021.1",).expect("expected aggregate",);
    assert!(pinned.triggers.is_empty());

    assert_eq!(file("_editor_priming.yml").jobs.len(), 3);
}

#[test]
fn job_names_are_unique()
{
    let layout = Layout::new(env!("CARGO_MANIFEST_DIR"),).with_config_dir(fixture_dir(),);
    let generation = generate(&layout,).expect("generation failed",);

    let mut names = HashSet::new();
    for generated in &generation.files {
        for (id, job,) in generated.file.jobs.iter() {
            assert!(names.insert(job.name.as_str()), "duplicate job name for {id}: {}", job.name);
        }
    }
    assert_eq!(names.len(), generation.job_count());
}

#[test]
fn runs_are_byte_identical()
{
    let (_first_dir, first,) = fixture_repo();
    let (_second_dir, second,) = fixture_repo();

    run(&first, false,).expect("first run failed",);
    run(&second, false,).expect("second run failed",);
    run(&second, false,).expect("repeated run failed",);

    let first_outputs = outputs(first.output_dir(),);
    assert_eq!(first_outputs.len(), 10);
    assert_eq!(first_outputs, outputs(second.output_dir(),));
    assert!(first_outputs.values().all(|contents| contents.starts_with(HEADER)));
}

#[test]
fn written_files_read_back_into_the_same_index()
{
    let (_dir, layout,) = fixture_repo();
    run(&layout, false,).expect("run failed",);

    let generated = generate(&layout,).expect("generation failed",).index();
    let mut on_disk = JobIndex::load_dir(layout.output_dir(),).expect("failed to index outputs",);
    on_disk.files.sort_by(|a, b| a.name.cmp(&b.name,),);
    let mut expected = generated;
    expected.files.sort_by(|a, b| a.name.cmp(&b.name,),);
    assert_eq!(on_disk, expected);
}

#[test]
fn removing_a_domain_metafile_removes_only_its_output()
{
    let (_dir, layout,) = fixture_repo();
    run(&layout, false,).expect("run failed",);
    let before = outputs(layout.output_dir(),);

    fs::remove_file(layout.config_dir().join("_templates.metafile",),).expect("failed to remove metafile",);
    let report = run(&layout, false,).expect("run failed",);
    let after = outputs(layout.output_dir(),);

    assert_eq!(report.files, 9);
    assert!(report.unresolved.is_empty());
    assert!(!after.contains_key("_templates.yml"));
    let mut expected = before;
    expected.remove("_templates.yml",);
    assert_eq!(after, expected);
}
