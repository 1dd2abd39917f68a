// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Dependency validation across generated job files.
//!
//! Validation is advisory: unresolved references are reported to the caller
//! and logged, generation is never aborted because of them.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;

use crate::{
    error::{self, Error},
    job::JobFile,
    utr,
};

static REFERENCE: LazyLock<Result<Regex, regex::Error,>,> =
    LazyLock::new(|| Regex::new(r"^(?:.*/)?(?P<file>[^/#]+)#(?P<job>.+)$",),);

/// File name → job id → dependency references.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq,)]
pub struct JobIndex
{
    pub files: Vec<IndexedFile,>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq,)]
pub struct IndexedFile
{
    pub name: String,
    pub jobs: Vec<IndexedJob,>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq,)]
pub struct IndexedJob
{
    pub id:           String,
    pub dependencies: Vec<String,>,
}

impl JobIndex
{
    /// Indexes in-memory job files.
    pub fn from_files<'f,>(files: impl IntoIterator<Item = &'f JobFile,>,) -> Self
    {
        let files = files
            .into_iter()
            .map(|file| IndexedFile {
                name: file.name.clone(),
                jobs: file
                    .jobs
                    .iter()
                    .map(|(id, job,)| IndexedJob {
                        id:           id.to_owned(),
                        dependencies: job
                            .dependencies
                            .iter()
                            .map(|dependency| dependency.path().to_owned(),)
                            .collect(),
                    },)
                    .collect(),
            },)
            .collect();
        Self {
            files,
        }
    }

    /// Reads every `*.yml` file in `dir` back into an index, in file name
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](Error::Io) when the directory or a file cannot be
    /// read and [`Error::Metafile`](Error::Metafile) for invalid YAML.
    pub fn load_dir(dir: &Path,) -> Result<Self, Error,>
    {
        let mut paths: Vec<PathBuf,> = fs::read_dir(dir,)
            .map_err(|source| error::io_error(dir, source,),)?
            .filter_map(Result::ok,)
            .map(|entry| entry.path(),)
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "yml",),)
            .collect();
        paths.sort();

        let mut files = Vec::with_capacity(paths.len(),);
        for path in paths {
            debug!("Indexing {}", path.display());
            let contents = fs::read_to_string(&path,).map_err(|source| error::io_error(&path, source,),)?;
            let value: Value =
                serde_yaml::from_str(&contents,).map_err(|source| error::metafile_error(&path, source,),)?;
            let name = path.file_name().map(|name| name.to_string_lossy().into_owned(),).unwrap_or_default();
            files.push(IndexedFile {
                name,
                jobs: index_document(&value,),
            },);
        }

        Ok(Self {
            files,
        },)
    }

    /// Total number of indexed jobs.
    pub fn job_count(&self,) -> usize
    {
        self.files.iter().map(|file| file.jobs.len(),).sum()
    }

    fn contains(&self, file: &str, job: &str,) -> bool
    {
        self.files
            .iter()
            .find(|candidate| candidate.name == file,)
            .is_some_and(|candidate| candidate.jobs.iter().any(|indexed| indexed.id == job,),)
    }
}

fn index_document(value: &Value,) -> Vec<IndexedJob,>
{
    let Some(mapping,) = value.as_mapping() else {
        return Vec::new();
    };
    mapping
        .iter()
        .filter_map(|(id, job,)| {
            let id = id.as_str()?;
            let dependencies = job
                .get("dependencies",)
                .and_then(Value::as_sequence,)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| {
                            item.as_str().or_else(|| item.get("path",).and_then(Value::as_str,),)
                        },)
                        .map(str::to_owned,)
                        .collect()
                },)
                .unwrap_or_default();
            Some(IndexedJob {
                id: id.to_owned(),
                dependencies,
            },)
        },)
        .collect()
}

/// Reference to a job that does not exist.
#[derive(Debug, Serialize, Clone, PartialEq, Eq,)]
pub struct UnresolvedDependency
{
    /// File of the job declaring the dependency.
    pub file:            String,
    /// Job declaring the dependency.
    pub job_id:          String,
    /// Referenced file; the whole reference when it is malformed.
    pub dependency_file: String,
    /// Referenced job id.
    pub dependency_job:  String,
}

impl fmt::Display for UnresolvedDependency
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(
            f,
            "Mistake in file {}#{} for dependency {}#{}",
            self.file, self.job_id, self.dependency_file, self.dependency_job
        )
    }
}

/// Lists every dependency whose file or job is missing from `index`.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) if the reference pattern
/// fails to compile.
pub fn unresolved_dependencies(index: &JobIndex,) -> Result<Vec<UnresolvedDependency,>, Error,>
{
    let pattern = utr::compiled(&REFERENCE,)?;

    let mut unresolved = Vec::new();
    for file in &index.files {
        for job in &file.jobs {
            for reference in &job.dependencies {
                let (dependency_file, dependency_job,) = match pattern.captures(reference,) {
                    Some(caps,) => (caps["file"].to_owned(), caps["job"].to_owned(),),
                    None => (reference.clone(), String::new(),),
                };
                if dependency_job.is_empty() || !index.contains(&dependency_file, &dependency_job,) {
                    unresolved.push(UnresolvedDependency {
                        file: file.name.clone(),
                        job_id: job.id.clone(),
                        dependency_file,
                        dependency_job,
                    },);
                }
            }
        }
    }
    Ok(unresolved,)
}
