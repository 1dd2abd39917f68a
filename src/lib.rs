// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Generator for the CI job graph of the graphics test matrix.
//!
//! The library loads declarative metafiles describing editors, platforms,
//! graphics APIs, test platforms, packages, templates, and test projects, and
//! expands them into YAML job files. Every job carries its agent, commands,
//! artifacts, triggers, and `<file>#<job>` dependency references; a
//! validation pass reports references that do not resolve to a generated job.
//! All public APIs document their error semantics and are deterministic:
//! identical metafiles always produce byte-identical output.

mod config;
mod constants;
mod context;
mod emit;
mod error;
mod generate;
mod job;
mod jobs;
mod naming;
mod slug;
mod utr;
mod validate;

pub use config::{
    Agent, AgentRef, BuildConfig, Editor, LatestEditorVersions, PlatformEntry, ProjectMetafile,
    SharedConfig, TestPlatform, TestPlatformKind, UtrFlag, load_yaml, parse_yaml,
};
pub use context::Context;
pub use emit::{HEADER, render_file, with_header};
pub use error::{Error, io_error};
pub use generate::{
    DEFAULT_CONFIG_DIR, DEFAULT_OUTPUT_DIR, Domain, GeneratedFile, Generation, Layout, RunReport,
    clear_outputs, generate, run, write_generation,
};
pub use job::{Dependency, Job, JobFile, Table};
pub use slug::FileStem;
pub use utr::extract_flags;
pub use validate::{IndexedFile, IndexedJob, JobIndex, UnresolvedDependency, unresolved_dependencies};
