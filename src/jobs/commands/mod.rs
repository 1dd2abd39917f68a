// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Shell commands of project test jobs, per platform and graphics API.
//!
//! Each supported platform provides a [`CommandSet`]. Command families a
//! platform does not implement return [`Error::Unsupported`], which aborts
//! the whole generation run before any file is written.

mod android;
mod iphone;
mod linux;
mod osx_metal;
mod win;

use crate::{
    config::{BuildConfig, Editor, TestPlatform, TestPlatformKind, UtrFlag},
    constants::{PATH_PLAYERS, TEST_PROJECTS_DIR},
    context::{Context, DownloaderLocation, Platform},
    error::Error,
    utr,
};

/// One point of the project matrix, as seen by a command set.
#[derive(Debug, Clone, Copy,)]
pub struct CommandContext<'a,>
{
    pub context:        Context<'a,>,
    pub project_folder: &'a str,
    pub platform:       &'a Platform,
    pub api:            &'a str,
    pub test_platform:  &'a TestPlatform,
    pub editor:         &'a Editor,
    pub build_config:   &'a BuildConfig,
    pub color_space:    &'a str,
}

impl CommandContext<'_,>
{
    /// `<Platform>_<Api>`, the key of flag filters and timeouts.
    pub fn platform_api(&self,) -> String
    {
        format!("{}_{}", self.platform.name, self.api)
    }

    /// `TestProjects/<folder>`
    pub fn project_dir(&self,) -> String
    {
        format!("{TEST_PROJECTS_DIR}/{}", self.project_folder)
    }

    /// Test runner flags of the job, including split and timeout flags.
    ///
    /// Build jobs read `utr_flags_build` when the test platform defines it.
    ///
    /// # Errors
    ///
    /// Propagates [`utr::extract_flags`] failures.
    pub fn utr_flags(&self, build: bool,) -> Result<Vec<String,>, Error,>
    {
        let source = if build && !self.test_platform.utr_flags_build.is_empty() {
            &self.test_platform.utr_flags_build
        } else {
            &self.test_platform.utr_flags
        };
        let mut flags = source.clone();

        if self.test_platform.kind == TestPlatformKind::Standalone {
            if self.platform.standalone_split {
                if build {
                    flags.push(UtrFlag::always("--build-only",),);
                    flags.push(UtrFlag::always(format!("--player-save-path={PATH_PLAYERS}"),),);
                } else {
                    flags.push(UtrFlag::always(format!("--player-load-path={PATH_PLAYERS}"),),);
                }
            }
            let timeout = utr::timeout(self.test_platform, &self.platform_api(), build,);
            flags.push(UtrFlag::always(format!("--timeout={timeout}"),),);
        }

        utr::extract_flags(
            &flags,
            &self.platform.name,
            self.api,
            self.build_config,
            self.color_space,
            self.project_folder,
        )
    }

    /// Same as [`CommandContext::utr_flags`] with `%NAME%` rewritten for
    /// Unix shells.
    ///
    /// # Errors
    ///
    /// Propagates [`utr`] failures.
    pub fn unix_utr_flags(&self, build: bool,) -> Result<Vec<String,>, Error,>
    {
        self.utr_flags(build,)?.iter().map(|flag| utr::unix_env_refs(flag,),).collect()
    }

    /// Revision argument for `unity-downloader-cli`.
    ///
    /// # Errors
    ///
    /// Propagates [`Context::downloader_source`] failures.
    pub fn downloader_source(&self, location: DownloaderLocation,) -> Result<String, Error,>
    {
        self.context.downloader_source(self.editor, &self.platform.os, location,)
    }

    /// `-c <component>` arguments for `unity-downloader-cli`.
    pub fn components(&self,) -> String
    {
        self.platform
            .components
            .iter()
            .map(|component| format!("-c {component}"),)
            .collect::<Vec<_,>>()
            .join(" ",)
    }

    /// Error for a command family this platform/API pair does not provide.
    pub fn unsupported(&self, command: &str,) -> Error
    {
        Error::unsupported(&self.platform.name, self.api, command,)
    }
}

/// Commands of each project job family on one platform.
///
/// The default implementations report the family as unsupported.
pub trait CommandSet
{
    fn editmode(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Err(cmd.unsupported("editmode",),)
    }

    fn playmode(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Err(cmd.unsupported("playmode",),)
    }

    fn standalone(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Err(cmd.unsupported("standalone",),)
    }

    fn standalone_build(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Err(cmd.unsupported("standalone_build",),)
    }
}

/// Looks up the command set of a platform/API pair.
///
/// # Errors
///
/// Returns [`Error::Unsupported`](Error::Unsupported) for pairs without a
/// command set.
pub fn command_set(platform: &str, api: &str,) -> Result<&'static dyn CommandSet, Error,>
{
    let set: &'static dyn CommandSet = match (platform, api,) {
        ("Win", "DX11" | "DX12" | "Vulkan",) => &win::Windows,
        ("Linux", "Vulkan" | "OpenGLCore",) => &linux::Linux,
        ("OSX", "Metal",) => &osx_metal::OsxMetal,
        ("Android", "OpenGLES3" | "Vulkan",) => &android::Android,
        ("iPhone", "Metal",) => &iphone::IPhone,
        _ => return Err(Error::unsupported(platform, api, "job",),),
    };
    Ok(set,)
}

/// Commands of one project job. `build` selects the player build job of a
/// split standalone test.
///
/// # Errors
///
/// Returns [`Error::Unsupported`](Error::Unsupported) for unimplemented
/// combinations and propagates command construction failures.
pub fn commands_for(cmd: &CommandContext<'_,>, build: bool,) -> Result<Vec<String,>, Error,>
{
    let set = command_set(&cmd.platform.name, cmd.api,)?;
    match (cmd.test_platform.kind, build,) {
        (TestPlatformKind::Editmode, _,) => set.editmode(cmd,),
        (TestPlatformKind::Playmode, _,) => set.playmode(cmd,),
        (TestPlatformKind::Standalone, true,) => set.standalone_build(cmd,),
        (TestPlatformKind::Standalone, false,) => set.standalone(cmd,),
    }
}
