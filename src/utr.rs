// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Test runner flag extraction.
//!
//! Test platforms list flags once for every platform. Before a flag reaches a
//! command it is filtered by its `<Platform>_<Api>` list, has its
//! placeholders substituted, and is de-duplicated against earlier flags with
//! the same `--key`.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    config::{BuildConfig, TestPlatform, UtrFlag},
    error::Error,
};

/// Flags that may legitimately appear more than once.
const REPEATABLE_FLAGS: &[&str] = &["--extra-editor-arg",];

static FLAG_KEY: LazyLock<Result<Regex, regex::Error,>,> =
    LazyLock::new(|| Regex::new(r"^(--[A-Za-z0-9][A-Za-z0-9_-]*)",),);
static ENV_REFERENCE: LazyLock<Result<Regex, regex::Error,>,> =
    LazyLock::new(|| Regex::new(r"%([A-Za-z_][A-Za-z0-9_]*)%",),);

/// Returns the pattern compiled on first use.
pub(crate) fn compiled(
    pattern: &'static LazyLock<Result<Regex, regex::Error,>,>,
) -> Result<&'static Regex, Error,>
{
    pattern.as_ref().map_err(|e| Error::validation(format!("invalid regex: {e}"),),)
}

/// Returns the flags applicable to one matrix point, with placeholders
/// substituted and repeated keys collapsed.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) if the flag key pattern
/// fails to compile.
///
/// # Examples
///
/// ```
/// use pipegen::{BuildConfig, UtrFlag, extract_flags};
///
/// let flags = vec![
///     UtrFlag { flag: "--suite=playmode".into(), platforms: vec![] },
///     UtrFlag { flag: "--testproject=<PROJECT_FOLDER>".into(), platforms: vec![] },
///     UtrFlag { flag: "--suite=editor".into(), platforms: vec!["Win_DX11".into()] },
/// ];
/// let config = BuildConfig {
///     name:              "mono".into(),
///     scripting_backend: "Mono2x".into(),
///     api_level:         "NET_4_6".into(),
/// };
/// let extracted = extract_flags(&flags, "Win", "DX11", &config, "Linear", "UniversalGraphicsTest",)
///     .expect("valid flags",);
/// assert_eq!(extracted, ["--suite=editor", "--testproject=UniversalGraphicsTest"]);
/// ```
pub fn extract_flags(
    flags: &[UtrFlag],
    platform: &str,
    api: &str,
    build_config: &BuildConfig,
    color_space: &str,
    project_folder: &str,
) -> Result<Vec<String,>, Error,>
{
    let platform_api = format!("{platform}_{api}");
    let substitutions = [
        ("<PROJECT_FOLDER>", project_folder,),
        ("<PLATFORM>", platform,),
        ("<API>", api,),
        ("<BUILD_CONFIG>", build_config.name.as_str(),),
        ("<SCRIPTING_BACKEND>", build_config.scripting_backend.as_str(),),
        ("<API_LEVEL>", build_config.api_level.as_str(),),
        ("<COLORSPACE>", color_space,),
    ];

    let selected = flags.iter().filter(|flag| {
        flag.platforms.is_empty()
            || flag.platforms.iter().any(|candidate| candidate.eq_ignore_ascii_case(&platform_api,),)
    },);
    collapse(selected.map(|flag| substitute(&flag.flag, &substitutions,),),)
}

/// Returns the flags without a platform filter, for jobs that do not run
/// inside a platform/API matrix.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) if the flag key pattern
/// fails to compile.
pub fn generic_flags(flags: &[UtrFlag], project_folder: &str,) -> Result<Vec<String,>, Error,>
{
    let substitutions = [("<PROJECT_FOLDER>", project_folder,),];
    collapse(
        flags
            .iter()
            .filter(|flag| flag.platforms.is_empty(),)
            .map(|flag| substitute(&flag.flag, &substitutions,),),
    )
}

fn substitute(flag: &str, substitutions: &[(&str, &str,)],) -> String
{
    substitutions
        .iter()
        .fold(flag.to_owned(), |acc, (placeholder, value,)| acc.replace(*placeholder, value,),)
}

fn collapse(flags: impl Iterator<Item = String,>,) -> Result<Vec<String,>, Error,>
{
    let key_pattern = compiled(&FLAG_KEY,)?;
    let key_of = |flag: &str| {
        key_pattern.captures(flag,).and_then(|caps| caps.get(1,),).map(|key| key.as_str().to_owned(),)
    };

    let mut collapsed: Vec<String,> = Vec::new();
    for flag in flags {
        let key = key_of(&flag,).filter(|key| !REPEATABLE_FLAGS.contains(&key.as_str(),),);
        let existing = key.as_deref().and_then(|key| {
            collapsed.iter().position(|earlier| key_of(earlier,).as_deref() == Some(key),)
        },);
        match existing {
            Some(index,) => collapsed[index] = flag,
            None => collapsed.push(flag,),
        }
    }
    Ok(collapsed,)
}

/// Timeout in seconds for `test_platform` on `<Platform>_<Api>` key `key`.
pub fn timeout(test_platform: &TestPlatform, key: &str, build: bool,) -> u32
{
    test_platform.timeout_for(key, build,)
}

/// Rewrites `%NAME%` environment references to `$NAME`.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) if the reference pattern
/// fails to compile.
pub fn unix_env_refs(flag: &str,) -> Result<String, Error,>
{
    let pattern = compiled(&ENV_REFERENCE,)?;
    Ok(pattern.replace_all(flag, "$$$1",).into_owned(),)
}

#[cfg(test)]
mod tests
{
    use super::{FLAG_KEY, compiled, extract_flags, generic_flags, timeout, unix_env_refs};
    use crate::config::{BuildConfig, TestPlatform, UtrFlag};

    fn flag(flag: &str, platforms: &[&str],) -> UtrFlag
    {
        UtrFlag {
            flag:      flag.to_owned(),
            platforms: platforms.iter().map(|p| (*p).to_owned(),).collect(),
        }
    }

    fn il2cpp() -> BuildConfig
    {
        BuildConfig {
            name:              "il2cpp".to_owned(),
            scripting_backend: "IL2CPP".to_owned(),
            api_level:         "NET_2_0".to_owned(),
        }
    }

    #[test]
    fn filter_matches_platform_api_case_insensitively()
    {
        let flags = [flag("--platform=StandaloneWindows64", &["win_dx12",],), flag("--platform=OSX", &["OSX_Metal",],),];
        let extracted =
            extract_flags(&flags, "Win", "DX12", &il2cpp(), "Linear", "Universal",).expect("expected flags",);
        assert_eq!(extracted, ["--platform=StandaloneWindows64"]);
    }

    #[test]
    fn placeholders_are_substituted()
    {
        let flags = [flag(
            "--extra-editor-arg=-colorspace=<COLORSPACE> --scripting-backend=<SCRIPTING_BACKEND> <API_LEVEL> <BUILD_CONFIG> <PLATFORM>/<API>",
            &[],
        )];
        let extracted =
            extract_flags(&flags, "Win", "DX12", &il2cpp(), "Gamma", "Universal",).expect("expected flags",);
        assert_eq!(extracted, [
            "--extra-editor-arg=-colorspace=Gamma --scripting-backend=IL2CPP NET_2_0 il2cpp Win/DX12"
        ]);
    }

    #[test]
    fn later_flags_replace_earlier_ones_in_place()
    {
        let flags = [
            flag("--suite=playmode", &[],),
            flag("--testproject=.", &[],),
            flag("--suite=editor", &["Win_DX11",],),
        ];
        let extracted =
            extract_flags(&flags, "Win", "DX11", &il2cpp(), "Linear", "Universal",).expect("expected flags",);
        assert_eq!(extracted, ["--suite=editor", "--testproject=."]);
    }

    #[test]
    fn repeatable_flags_are_kept()
    {
        let flags = [
            flag("--extra-editor-arg=\"-force-d3d12\"", &[],),
            flag("--extra-editor-arg=\"-colorspace=Linear\"", &[],),
        ];
        let extracted =
            extract_flags(&flags, "Win", "DX12", &il2cpp(), "Linear", "Universal",).expect("expected flags",);
        assert_eq!(extracted.len(), 2);
    }

    #[test]
    fn generic_flags_skip_filtered_entries()
    {
        let flags = [flag("--testproject=<PROJECT_FOLDER>", &[],), flag("--platform=Android", &["Android_Vulkan",],),];
        let extracted = generic_flags(&flags, "SRP_SmokeTest",).expect("expected flags",);
        assert_eq!(extracted, ["--testproject=SRP_SmokeTest"]);
    }

    #[test]
    fn timeout_delegates_to_test_platform()
    {
        let platform: TestPlatform = serde_yaml::from_str(
            "name: Standalone\ntype: Standalone\ntimeout_build:\n  Android_Vulkan: 3000",
        )
        .expect("expected test platform",);
        assert_eq!(timeout(&platform, "Android_Vulkan", true,), 3000);
        assert_eq!(timeout(&platform, "Android_Vulkan", false,), 1200);
    }

    #[test]
    fn flag_key_pattern_is_compiled_once()
    {
        let first = compiled(&FLAG_KEY,).expect("expected pattern",);
        let second = compiled(&FLAG_KEY,).expect("expected pattern",);
        assert!(std::ptr::eq(first, second));
        assert_eq!(
            first.captures("--timeout=1200",).and_then(|caps| caps.get(1,),).map(|key| key.as_str()),
            Some("--timeout")
        );
    }

    #[test]
    fn env_references_are_rewritten_for_unix_shells()
    {
        let rewritten = unix_env_refs("--extra-editor-arg=\"-token=%YAMATO_TOKEN%\" %PATH%",)
            .expect("expected rewrite",);
        assert_eq!(rewritten, "--extra-editor-arg=\"-token=$YAMATO_TOKEN\" $PATH");
    }
}
