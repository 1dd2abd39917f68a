// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Windows commands for DX11, DX12, and Vulkan.

use super::{CommandContext, CommandSet};
use crate::{context::DownloaderLocation, error::Error};

pub(super) struct Windows;

impl Windows
{
    fn setup(cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        let services = cmd.context.services();
        let dir = cmd.project_dir();
        Ok(vec![
            format!("curl -s {}.bat --output {dir}/utr.bat", services.utr_install_url),
            format!(
                "pip install unity-downloader-cli --index-url {} --upgrade",
                services.unity_downloader_cli_url
            ),
            format!(
                "cd {dir} && unity-downloader-cli {} {} --wait --published-only",
                cmd.downloader_source(DownloaderLocation::TestProject,)?,
                cmd.components()
            ),
        ],)
    }

    fn run(cmd: &CommandContext<'_,>, build: bool,) -> Result<String, Error,>
    {
        Ok(format!("cd {} && utr {}", cmd.project_dir(), cmd.utr_flags(build,)?.join(" ",)),)
    }

    fn editor_tests(cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        let mut commands = Self::setup(cmd,)?;
        commands.push(Self::run(cmd, false,)?,);
        Ok(commands,)
    }
}

impl CommandSet for Windows
{
    fn editmode(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Self::editor_tests(cmd,)
    }

    fn playmode(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Self::editor_tests(cmd,)
    }

    fn standalone(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        if !cmd.platform.standalone_split {
            return Self::editor_tests(cmd,);
        }
        let services = cmd.context.services();
        Ok(vec![
            format!("curl -s {}.bat --output {}/utr.bat", services.utr_install_url, cmd.project_dir()),
            Self::run(cmd, false,)?,
        ],)
    }

    fn standalone_build(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        let mut commands = Self::setup(cmd,)?;
        commands.push(Self::run(cmd, true,)?,);
        Ok(commands,)
    }
}
