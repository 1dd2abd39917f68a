#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the generator crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by the metafile loader, job builders, and CLI.
///
/// Configuration problems and unimplemented platform commands abort the run
/// before any output is written. Unresolved dependency references are not
/// errors; they are reported by [`crate::unresolved_dependencies`].
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading metafiles or outputs.
    #[error("failed to read {path:?}: {source}")]
    Io {
        /// Location of the file that could not be read.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors for in-memory documents.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Wraps YAML decoding errors tied to a metafile on disk.
    #[error("failed to parse metafile {path:?}: {source}")]
    Metafile {
        /// Location of the metafile.
        path:   PathBuf,
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when the configuration violates invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Returned when a platform/API pair has no commands for a test type.
    #[error("{platform}_{api}: {command} commands are not implemented")]
    Unsupported {
        /// Platform name, e.g. `OSX`.
        platform: String,
        /// Graphics API name, e.g. `Metal`.
        api:      String,
        /// Command family that was requested, e.g. `standalone_build`.
        command:  String
    },
    /// Wraps serialization errors when writing the JSON job index.
    #[error("failed to serialize job index: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Wraps YAML serialization errors for a generated job file.
    #[error("failed to render {file}: {source}")]
    Emit {
        /// Name of the job file being rendered.
        file:   String,
        /// Underlying serialization error.
        source: serde_yaml::Error
    },
    /// Wraps I/O errors that occur while writing or removing generated files.
    #[error("failed to write generated file at {path:?}: {source}")]
    Write {
        /// Location of the generated file.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs an error for a command family a platform does not provide.
    pub fn unsupported(platform: &str, api: &str, command: &str) -> Self {
        Self::Unsupported {
            platform: platform.to_owned(),
            api:      api.to_owned(),
            command:  command.to_owned()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::Metafile`] variant capturing the failing path and
/// decoding error.
pub fn metafile_error(path: &Path, source: serde_yaml::Error) -> Error {
    Error::Metafile {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::Write`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the generated file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn write_error(path: &Path, source: std::io::Error) -> Error {
    Error::Write {
        path: path.to_path_buf(),
        source
    }
}
