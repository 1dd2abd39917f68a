// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Job identifiers and output file names for every domain.
//!
//! Builders and dependency references both go through these functions, so a
//! referenced job id always matches the id it was generated under.

use crate::{error::Error, slug::FileStem};

pub const EDITOR_PRIMING_FILE: &str = "_editor_priming.yml";
pub const PACKAGES_FILE: &str = "_packages.yml";
pub const ABV_FILE: &str = "_abv.yml";
pub const PREVIEW_PUBLISH_FILE: &str = "_preview_publish.yml";
pub const TEMPLATES_FILE: &str = "_templates.yml";

pub const PACKAGES_PUBLISH_ALL: &str = "publish_all";
pub const PREVIEW_PUBLISH_ALL: &str = "publish_all_preview";
pub const PREVIEW_PROMOTE_ALL: &str = "promote_all_preview";
pub const PREVIEW_WAIT_FOR_NIGHTLY: &str = "wait_for_nightly";

pub fn editor_priming_job_id(editor: &str, os: &str,) -> String
{
    format!("editor:priming:{editor}:{os}")
}

pub fn pack_job_id(id: &str,) -> String
{
    format!("pack_{id}")
}

pub fn test_job_id(id: &str, os: &str, editor: &str,) -> String
{
    format!("test_{id}_{os}_{editor}")
}

pub fn test_dependencies_job_id(id: &str, os: &str, editor: &str,) -> String
{
    format!("test_{id}_{os}_{editor}_dependencies")
}

pub fn publish_job_id(id: &str,) -> String
{
    format!("publish_{id}")
}

pub fn promote_job_id(id: &str,) -> String
{
    format!("promote_{id}")
}

pub fn all_package_ci_job_id(editor: &str,) -> String
{
    format!("all_package_ci_{editor}")
}

pub fn all_template_ci_job_id(editor: &str,) -> String
{
    format!("all_template_ci_{editor}")
}

pub fn all_project_ci_job_id(editor: &str,) -> String
{
    format!("all_project_ci_{editor}")
}

pub fn smoke_test_job_id(test_platform: &str, editor: &str,) -> String
{
    format!("smoke_test_{test_platform}_{editor}")
}

pub fn all_smoke_tests_job_id(editor: &str,) -> String
{
    format!("all_smoke_tests_{editor}")
}

pub fn trunk_verification_job_id(editor: &str,) -> String
{
    format!("trunk_verification_{editor}")
}

pub fn project_all_job_id(project: &str, editor: &str,) -> String
{
    format!("All_{project}_{editor}")
}

/// One point of the project test matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct ProjectJobKey<'a,>
{
    pub project:       &'a str,
    pub platform:      &'a str,
    pub api:           &'a str,
    pub test_platform: &'a str,
    pub build_config:  &'a str,
    pub color_space:   &'a str,
    pub editor:        &'a str,
}

impl ProjectJobKey<'_,>
{
    /// `<Project>_<Platform>_<Api>_<TestPlatform>_<BuildConfig>_<ColorSpace>_<editor>`
    pub fn test_job_id(&self,) -> String
    {
        format!(
            "{}_{}_{}_{}_{}_{}_{}",
            self.project,
            self.platform,
            self.api,
            self.test_platform,
            self.build_config,
            self.color_space,
            self.editor
        )
    }

    /// Identifier of the player build job preceding a split standalone test.
    pub fn build_job_id(&self,) -> String
    {
        format!("Build_{}", self.test_job_id())
    }

    /// File the test job is written into.
    ///
    /// # Errors
    ///
    /// See [`project_filename`].
    pub fn filename(&self,) -> Result<String, Error,>
    {
        project_filename(self.project, self.platform, self.api,)
    }
}

/// `<project>-<platform>-<api>.yml` with slugged components.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) when a component has no
/// characters usable in a file name.
pub fn project_filename(project: &str, platform: &str, api: &str,) -> Result<String, Error,>
{
    stem_filename(&[project, platform, api,], "",)
}

/// `<project>-all.yml` with a slugged project name.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) when the project name has
/// no characters usable in a file name.
pub fn project_all_filename(project: &str,) -> Result<String, Error,>
{
    stem_filename(&[project,], "-all",)
}

fn stem_filename(parts: &[&str], suffix: &str,) -> Result<String, Error,>
{
    FileStem::builder(parts,)
        .build()
        .map(|stem| format!("{stem}{suffix}.yml"),)
        .ok_or_else(|| {
            Error::validation(format!("cannot derive a file name from {}", parts.join("/")),)
        },)
}
