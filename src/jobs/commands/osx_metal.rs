// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! OSX Metal commands.
//!
//! The agent drives a Mac mini over SSH: the checkout is copied to the
//! device, the editor is downloaded and tests run there, and results are
//! copied back into the agent's checkout. Player builds are not supported.

use super::{CommandContext, CommandSet};
use crate::{
    constants::{PATH_TEST_RESULTS, REPOSITORY_NAME, TEST_PROJECTS_DIR},
    context::DownloaderLocation,
    error::Error,
};

pub(super) struct OsxMetal;

const SSH_KEY: &str = "~/.ssh/id_rsa_macmini";
const DEVICE: &str = "bokken@$BOKKEN_DEVICE_IP";

fn ssh() -> String
{
    format!("ssh -i {SSH_KEY} -o \"StrictHostKeyChecking=no\" {DEVICE}")
}

fn scp() -> String
{
    format!("scp -i {SSH_KEY} -o \"StrictHostKeyChecking=no\"")
}

impl OsxMetal
{
    fn remote(cmd: &CommandContext<'_,>, build: bool,) -> Result<Vec<String,>, Error,>
    {
        let services = cmd.context.services();
        let dir = cmd.project_dir();
        let remote_dir = format!("~/{REPOSITORY_NAME}/{dir}");
        let results = format!("{dir}/{PATH_TEST_RESULTS}");
        let flags = cmd.unix_utr_flags(build,)?.join(" ",);

        Ok(vec![
            format!("curl -s {} --output {dir}/utr", services.utr_install_url),
            format!("chmod +x {dir}/utr"),
            format!(
                "{} \"bash -lc 'pip3 install unity-downloader-cli --user --index-url {} --upgrade'\"",
                ssh(),
                services.unity_downloader_cli_url
            ),
            format!("{} -r $YAMATO_SOURCE_DIR {DEVICE}:~/{REPOSITORY_NAME}", scp()),
            format!("{} {SSH_KEY} {DEVICE}:{SSH_KEY}", scp()),
            format!(
                "{} '$(/usr/local/bin/python3 -m site --user-base)/bin/unity-downloader-cli {} {} --wait --published-only'",
                ssh(),
                cmd.downloader_source(DownloaderLocation::RemoteCheckout,)?,
                cmd.components()
            ),
            format!(
                "{} \"export UPM_REGISTRY={}; cd {remote_dir} && {remote_dir}/utr {flags}\"\nUTR_RESULT=$?\nmkdir -p {results}/\n{} -r {DEVICE}:/Users/bokken/{REPOSITORY_NAME}/{TEST_PROJECTS_DIR}/{}/{PATH_TEST_RESULTS}/ {results}/\nexit $UTR_RESULT",
                ssh(),
                services.upm_registry,
                scp(),
                cmd.project_folder
            ),
        ],)
    }
}

impl CommandSet for OsxMetal
{
    fn editmode(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Self::remote(cmd, false,)
    }

    fn playmode(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Self::remote(cmd, false,)
    }

    fn standalone(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        Self::remote(cmd, false,)
    }
}
