// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pipegen::{
    BuildConfig, Dependency, Job, JobFile, JobIndex, SharedConfig, UtrFlag, extract_flags,
    parse_yaml, render_file, unresolved_dependencies,
};

fn benchmark_parse_shared(c: &mut Criterion,)
{
    let yaml = r"
target_branch: master
target_editor: trunk
editors:
  - track: trunk
  - track: '2021.1'
    editor_pinning: true
platforms:
  Win:
    os: windows
    components: [editor, il2cpp]
    agents_project:
      default: gpu_win
  OSX:
    os: macos
    agents_project:
      default: metal
non_project_agents:
  gpu_win:
    type: Unity::VM::GPU
    image: sdet/gamecode_win10:stable
    flavor: b1.large
  metal:
    type: Unity::metal::macmini
    image: slough-ops/macos-10.14-xcode:stable
    flavor: m1.mac
test_platforms:
  - name: playmode
    type: playmode
    utr_flags:
      - --suite=playmode
      - flag: --extra-editor-arg=-force-d3d11
        platforms: [Win_DX11]
";

    c.bench_function("parse_shared_metafile", |b| {
        b.iter(|| parse_yaml::<SharedConfig,>(black_box(yaml,),).expect("parse failed",),)
    },);
}

fn benchmark_extract_flags(c: &mut Criterion,)
{
    let mut flags = Vec::new();
    for i in 0..50 {
        flags.push(UtrFlag {
            flag:      format!("--key{}=<PROJECT_FOLDER>/<API>/{i}", i % 10),
            platforms: if i % 3 == 0 { vec!["Win_DX11".to_owned()] } else { Vec::new() },
        },);
    }
    let config = BuildConfig {
        name:              "il2cpp".to_owned(),
        scripting_backend: "IL2CPP".to_owned(),
        api_level:         "NET_2_0".to_owned(),
    };

    c.bench_function("extract_50_flags", |b| {
        b.iter(|| {
            extract_flags(black_box(&flags,), "Win", "DX11", &config, "Linear", "UniversalGraphicsTest",)
                .expect("extract failed",)
        },)
    },);
}

fn job_files(count: usize,) -> Vec<JobFile,>
{
    (0..count)
        .map(|f| {
            let mut file = JobFile::new(format!("project{f}-win-dx11.yml"),);
            for j in 0..20 {
                let mut job = Job::new();
                job.set_name(format!("Project{f} test {j}"),)
                    .add_commands([format!("utr --suite=playmode --testproject=Project{f}")],)
                    .add_artifacts_test_results();
                if j > 0 {
                    job.add_dependency(Dependency::Path(format!(
                        ".yamato/project{f}-win-dx11.yml#job_{}",
                        j - 1
                    )),);
                }
                file.insert(format!("job_{j}"), job,).expect("unique job ids",);
            }
            file
        },)
        .collect()
}

fn benchmark_render(c: &mut Criterion,)
{
    let files = job_files(10,);

    c.bench_function("render_10_files", |b| {
        b.iter(|| {
            for file in &files {
                black_box(render_file(file,).expect("render failed",),);
            }
        },)
    },);
}

fn benchmark_validate(c: &mut Criterion,)
{
    let files = job_files(50,);
    let index = JobIndex::from_files(&files,);

    c.bench_function("validate_1000_jobs", |b| {
        b.iter(|| unresolved_dependencies(black_box(&index,),).expect("validation failed",),)
    },);
}

criterion_group!(
    benches,
    benchmark_parse_shared,
    benchmark_extract_flags,
    benchmark_render,
    benchmark_validate
);
criterion_main!(benches);
