// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! iPhone Metal commands. Players are built on a Mac and deployed to an
//! attached device.

use super::{CommandContext, CommandSet};
use crate::{context::DownloaderLocation, error::Error};

pub(super) struct IPhone;

impl IPhone
{
    fn fetch_runner(cmd: &CommandContext<'_,>,) -> Vec<String,>
    {
        let dir = cmd.project_dir();
        vec![
            format!("curl -s {} --output {dir}/utr", cmd.context.services().utr_install_url),
            format!("chmod +x {dir}/utr"),
        ]
    }

    fn build(cmd: &CommandContext<'_,>, build: bool,) -> Result<Vec<String,>, Error,>
    {
        let dir = cmd.project_dir();
        let mut commands = vec![format!(
            "pip3 install unity-downloader-cli --index-url {} --upgrade",
            cmd.context.services().unity_downloader_cli_url
        )];
        commands.push(format!(
            "cd {dir} && unity-downloader-cli {} {} --wait --published-only",
            cmd.downloader_source(DownloaderLocation::TestProject,)?,
            cmd.components()
        ),);
        commands.extend(Self::fetch_runner(cmd,),);
        commands.push(format!("cd {dir} && ./utr {}", cmd.unix_utr_flags(build,)?.join(" ",)),);
        Ok(commands,)
    }
}

impl CommandSet for IPhone
{
    fn standalone(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        if !cmd.platform.standalone_split {
            return Self::build(cmd, false,);
        }
        let mut commands = Self::fetch_runner(cmd,);
        commands.push(format!("cd {} && ./utr {}", cmd.project_dir(), cmd.unix_utr_flags(false,)?.join(" ",)),);
        Ok(commands,)
    }

    fn standalone_build(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Self::build(cmd, true,)
    }
}
