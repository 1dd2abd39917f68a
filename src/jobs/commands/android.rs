// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Android commands for OpenGLES3 and Vulkan.
//!
//! Players are built on a Windows agent and run on a device attached over
//! `adb`, so only split standalone jobs exist.

use super::{CommandContext, CommandSet};
use crate::{context::DownloaderLocation, error::Error};

pub(super) struct Android;

const ADB: &str = "%ANDROID_SDK_ROOT%\\platform-tools\\adb.exe";
const PLAYBACK_ENGINE: &str = ".Editor\\Data\\PlaybackEngines\\AndroidPlayer";

impl CommandSet for Android
{
    fn standalone(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
    {
        if !cmd.platform.standalone_split {
            return Err(Error::validation(format!(
                "{}: standalone tests require standalone_split",
                cmd.platform_api()
            ),),);
        }
        let dir = cmd.project_dir();
        Ok(vec![
            format!("curl -s {}.bat --output {dir}/utr.bat", cmd.context.services().utr_install_url),
            format!("{ADB} connect %BOKKEN_DEVICE_IP%"),
            format!("powershell {ADB} devices"),
            "NetSh Advfirewall set allprofiles state off".to_owned(),
            format!("cd {dir} && utr {}", cmd.utr_flags(false,)?.join(" ",)),
            format!("start {ADB} kill-server"),
        ],)
    }

    fn standalone_build(&self, cmd: &CommandContext<'_,>,) -> Result<Vec<String,>, Error,>
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
            format!("cd {dir} && mklink /d {PLAYBACK_ENGINE}\\OpenJDK %JAVA_HOME% || exit 0"),
            format!("cd {dir} && mklink /d {PLAYBACK_ENGINE}\\SDK %ANDROID_SDK_ROOT% || exit 0"),
            format!("cd {dir} && mklink /d {PLAYBACK_ENGINE}\\NDK %ANDROID_NDK_ROOT% || exit 0"),
            format!("cd {dir} && utr {}", cmd.utr_flags(true,)?.join(" ",)),
        ],)
    }
}

#[cfg(test)]
mod tests
{
    use super::super::{
        commands_for,
        tests::{Fixture, command_context, mono},
    };
    use crate::error::Error;

    #[test]
    fn unsplit_standalone_is_rejected()
    {
        let fixture = Fixture::new();
        let platform = fixture.platform("name: Android\nstandalone_split: false",);
        let standalone = fixture.test_platform("Standalone",);
        let config = mono();
        let cmd = command_context(&fixture, &platform, "Vulkan", &standalone, &config,);

        match commands_for(&cmd, false,) {
            Err(Error::Validation {
                message,
            },) => assert_eq!(message, "Android_Vulkan: standalone tests require standalone_split"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn build_links_android_toolchain_into_editor()
    {
        let fixture = Fixture::new();
        let platform = fixture.platform("Android",);
        let standalone = fixture.test_platform("Standalone",);
        let config = mono();
        let cmd = command_context(&fixture, &platform, "OpenGLES3", &standalone, &config,);

        let build = commands_for(&cmd, true,).expect("expected build commands",);
        assert_eq!(build.iter().filter(|command| command.contains("mklink /d")).count(), 3);
        let run = commands_for(&cmd, false,).expect("expected run commands",);
        assert!(run.iter().any(|command| command.contains("--platform=Android")));
    }
}
