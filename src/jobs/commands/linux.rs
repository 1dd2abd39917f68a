// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Linux commands for Vulkan and OpenGLCore.

use super::{CommandContext, CommandSet};
use crate::{context::DownloaderLocation, error::Error};

pub(super) struct Linux;

impl Linux
{
    fn fetch_runner(cmd: &CommandContext<'_,>,) -> Vec<String,>
    {
        let dir = cmd.project_dir();
        vec![
            format!("curl -s {} --output {dir}/utr", cmd.context.services().utr_install_url),
            format!("chmod +x {dir}/utr"),
        ]
    }

    fn setup(cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        let mut commands = Self::fetch_runner(cmd,);
        commands.push(format!(
            "sudo pip3 install unity-downloader-cli --index-url {} --upgrade",
            cmd.context.services().unity_downloader_cli_url
        ),);
        commands.push(format!(
            "cd {} && sudo unity-downloader-cli {} {} --wait --published-only",
            cmd.project_dir(),
            cmd.downloader_source(DownloaderLocation::TestProject,)?,
            cmd.components()
        ),);
        Ok(commands,)
    }

    fn run(cmd: &CommandContext<'_,>, build: bool,) -> Result<String, Error,>
    {
        Ok(format!(
            "cd {} && DISPLAY=:0.0 ./utr {}",
            cmd.project_dir(),
            cmd.unix_utr_flags(build,)?.join(" ",)
        ),)
    }

    fn with_editor(cmd: &CommandContext<'_,>, build: bool,) -> Result<Vec<String,>, Error,>
    {
        let mut commands = Self::setup(cmd,)?;
        commands.push(Self::run(cmd, build,)?,);
        Ok(commands,)
    }
}

impl CommandSet for Linux
{
    fn editmode(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Self::with_editor(cmd, false,)
    }

    fn playmode(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Self::with_editor(cmd, false,)
    }

    fn standalone(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        if !cmd.platform.standalone_split {
            return Self::with_editor(cmd, false,);
        }
        let mut commands = Self::fetch_runner(cmd,);
        commands.push(Self::run(cmd, false,)?,);
        Ok(commands,)
    }

    fn standalone_build(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Self::with_editor(cmd, true,)
    }
}
