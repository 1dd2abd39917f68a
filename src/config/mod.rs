// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Metafile document types and loaders.
//!
//! The types in this module mirror the YAML metafiles under the config
//! directory. They keep optional values flexible; [`crate::Context`] turns
//! named references into concrete values.

mod domains;
mod shared;

use std::{fs, path::Path};

pub use domains::{
    AbvMetafile, AbvSection, AllDependency, AllSection, ApiEntry, BuildConfig, EditorMetafile,
    Package, PackagesMetafile, PlatformEntry, PreviewPublishMetafile, ProjectInfo,
    ProjectJobRef, ProjectMetafile, SmokeTest, Template, TemplatesMetafile, TrunkVerification,
};
use serde::de::DeserializeOwned;
pub use shared::{
    Agent, AgentRef, AgentsProject, Editor, EditorRevision, LatestEditorVersions, PlatformSpec,
    Services, SharedConfig, TestPlatform, TestPlatformKind, TestPlatformRef, UtrFlag,
};
use tracing::debug;

use crate::error::{self, Error};

/// File name of the shared-defaults metafile.
pub const SHARED_METAFILE: &str = "__shared.metafile";
/// File name of the latest-editor-versions metafile.
pub const LATEST_EDITOR_VERSIONS_METAFILE: &str = "_latest_editor_versions.metafile";

/// Loads and decodes a metafile from disk.
///
/// # Errors
///
/// Returns [`Error::Io`](Error::Io) when the file cannot be read and
/// [`Error::Metafile`](Error::Metafile) when the YAML does not match `T`.
pub fn load_yaml<T,>(path: &Path,) -> Result<T, Error,>
where
    T: DeserializeOwned,
{
    debug!("Reading metafile {}", path.display());
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    serde_yaml::from_str(&contents,).map_err(|source| error::metafile_error(path, source,),)
}

/// Decodes a metafile from an in-memory YAML document.
///
/// # Errors
///
/// Propagates [`Error::Parse`](Error::Parse) when the YAML does not match
/// `T`.
pub fn parse_yaml<T,>(contents: &str,) -> Result<T, Error,>
where
    T: DeserializeOwned,
{
    Ok(serde_yaml::from_str(contents,)?,)
}
