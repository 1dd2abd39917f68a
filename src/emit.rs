// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! YAML rendering of job files.

use crate::{error::Error, job::JobFile};

/// Comment prepended to every generated file.
pub const HEADER: &str = "\
# This file is generated by pipegen. Do not edit it by hand.
# Change the metafiles in the config directory instead and rerun
# `pipegen generate` to regenerate all .yml files.
";

/// Serializes the jobs of `file` as a YAML mapping keyed by job id.
///
/// # Errors
///
/// Returns [`Error::Emit`](Error::Emit) when serialization fails.
pub fn render_file(file: &JobFile,) -> Result<String, Error,>
{
    serde_yaml::to_string(&file.jobs,).map_err(|source| Error::Emit {
        file: file.name.clone(),
        source,
    },)
}

/// Prepends [`HEADER`] to a rendered file.
pub fn with_header(yaml: &str,) -> String
{
    format!("{HEADER}\n{yaml}")
}
