// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Types of the shared-defaults and latest-editor-versions metafiles.
//!
//! Every domain metafile refers back to these tables by name: editors,
//! platform definitions, reusable agents, and test platforms. The structures
//! mirror the YAML documents and keep optional values flexible; resolution
//! into concrete values happens in [`crate::Context`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CUSTOM_REVISION_TRACK, DEFAULT_EDITOR_PATH, DEFAULT_RERUN_STRATEGY, DEFAULT_TIMEOUT,
    DEFAULT_UNITY_DOWNLOADER_CLI_URL, DEFAULT_UPM_CI_REGISTRY, DEFAULT_UPM_REGISTRY,
    DEFAULT_UTR_INSTALL_URL,
};

/// Root of the shared-defaults metafile consumed by every job builder.
///
/// # Examples
///
/// ```
/// use pipegen::SharedConfig;
///
/// let yaml = r#"
/// target_branch: master
/// target_editor: trunk
/// editors:
///   - track: trunk
///     editor_pinning: true
/// "#;
/// let shared: SharedConfig = serde_yaml::from_str(yaml,).expect("valid shared metafile",);
/// assert_eq!(shared.editors[0].resolved_name(), "trunk");
/// ```
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct SharedConfig
{
    /// Branch recurrent and expression triggers are bound to.
    pub target_branch: String,

    /// Name of the editor whose jobs gate pull requests.
    pub target_editor: String,

    /// Editors every domain expands over unless it overrides them.
    #[serde(default)]
    pub editors: Vec<Editor,>,

    /// Platform definitions keyed by platform name.
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformSpec,>,

    /// Reusable agents keyed by name.
    #[serde(default)]
    pub non_project_agents: BTreeMap<String, Agent,>,

    /// Test platform definitions referenced by name.
    #[serde(default)]
    pub test_platforms: Vec<TestPlatform,>,

    /// Auxiliary service URLs embedded in generated commands.
    #[serde(default)]
    pub services: Services,
}

/// Editor version the matrix is expanded over.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct Editor
{
    /// Release track passed to the editor downloader, e.g. `trunk`.
    pub track: String,

    /// Name embedded in job identifiers. Defaults to the track.
    #[serde(default)]
    pub name: Option<String,>,

    /// Rerun strategy attached to dependencies on this editor's jobs.
    #[serde(default = "default_rerun_strategy")]
    pub rerun_strategy: String,

    /// Pinned editors take their revision from the latest editor versions
    /// file; the others depend on an editor priming job.
    #[serde(default)]
    pub editor_pinning: bool,

    /// Whether aggregate jobs for this editor run on a nightly schedule.
    #[serde(default)]
    pub nightly: bool,
}

impl Editor
{
    /// Returns the name used in job identifiers and job names.
    pub fn resolved_name(&self,) -> &str
    {
        self.name
            .as_deref()
            .map(str::trim,)
            .filter(|value| !value.is_empty(),)
            .unwrap_or(self.track.as_str(),)
    }

    /// Returns `true` when the revision is supplied through the
    /// `CUSTOM_REVISION` variable.
    pub fn is_custom_revision(&self,) -> bool
    {
        self.track == CUSTOM_REVISION_TRACK
    }
}

fn default_rerun_strategy() -> String
{
    DEFAULT_RERUN_STRATEGY.to_owned()
}

/// CI agent specification as written into job definitions.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct Agent
{
    /// Agent type, e.g. `Unity::VM::GPU`.
    #[serde(rename = "type")]
    pub agent_type: String,

    /// Image the agent boots.
    pub image: String,

    /// Machine flavor.
    pub flavor: String,

    /// Optional GPU or device model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String,>,
}

/// Agent given either inline or by name of a `non_project_agents` entry.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
#[serde(untagged)]
pub enum AgentRef
{
    /// Reference to a named shared agent.
    Named(String,),
    /// Inline agent definition.
    Inline(Agent,),
}

/// Agents used by project jobs, selected by test platform type.
///
/// Only `default` is expected on shared platform definitions; the other
/// slots override it for specific job kinds.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq,)]
#[serde(deny_unknown_fields)]
pub struct AgentsProject
{
    /// Agent used when no specific slot applies.
    #[serde(default)]
    pub default: Option<AgentRef,>,

    /// Agent for editmode test jobs.
    #[serde(default)]
    pub editmode: Option<AgentRef,>,

    /// Agent for playmode test jobs.
    #[serde(default)]
    pub playmode: Option<AgentRef,>,

    /// Agent for standalone test jobs.
    #[serde(default)]
    pub standalone: Option<AgentRef,>,

    /// Agent for standalone player build jobs.
    #[serde(default)]
    pub standalone_build: Option<AgentRef,>,
}

/// Shared definition of a platform.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct PlatformSpec
{
    /// Operating system identifier passed to the editor downloader.
    pub os: String,

    /// Editor components to download, e.g. `editor`, `il2cpp`.
    #[serde(default)]
    pub components: Vec<String,>,

    /// Agents for project jobs.
    #[serde(default)]
    pub agents_project: AgentsProject,

    /// Agent for package and template test jobs.
    #[serde(default)]
    pub agent_package: Option<AgentRef,>,

    /// Command copying packed packages into the editor before dependency
    /// tests.
    #[serde(default)]
    pub copycmd: Option<String,>,

    /// Editor location passed to `upm-ci`.
    #[serde(default = "default_editor_path")]
    pub editorpath: String,

    /// Whether standalone tests build the player in a separate job.
    #[serde(default)]
    pub standalone_split: bool,
}

fn default_editor_path() -> String
{
    DEFAULT_EDITOR_PATH.to_owned()
}

/// Category of a test platform, selecting the command family and agent.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash,)]
pub enum TestPlatformKind
{
    /// Editor tests without entering play mode.
    #[serde(rename = "editmode", alias = "EditMode")]
    Editmode,
    /// Editor tests in play mode.
    #[serde(rename = "playmode", alias = "PlayMode")]
    Playmode,
    /// Tests run inside a built player.
    #[serde(rename = "Standalone", alias = "standalone")]
    Standalone,
}

/// Test platform definition.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct TestPlatform
{
    /// Name embedded in job identifiers, e.g. `playmode_XR`.
    pub name: String,

    /// Test platform category.
    #[serde(rename = "type")]
    pub kind: TestPlatformKind,

    /// Flags passed to the test runner for test jobs.
    #[serde(default)]
    pub utr_flags: Vec<UtrFlag,>,

    /// Flags passed to the test runner for standalone build jobs.
    #[serde(default)]
    pub utr_flags_build: Vec<UtrFlag,>,

    /// Timeouts in seconds keyed by `<Platform>_<Api>` or `default`.
    #[serde(default)]
    pub timeout: BTreeMap<String, u32,>,

    /// Build timeouts in seconds keyed by `<Platform>_<Api>` or `default`.
    #[serde(default)]
    pub timeout_build: BTreeMap<String, u32,>,
}

impl TestPlatform
{
    /// Returns the configured timeout for `key`, falling back to the
    /// `default` entry and then to [`DEFAULT_TIMEOUT`].
    pub fn timeout_for(&self, key: &str, build: bool,) -> u32
    {
        let table = if build { &self.timeout_build } else { &self.timeout };
        table
            .iter()
            .find(|(candidate, _,)| candidate.eq_ignore_ascii_case(key,),)
            .or_else(|| table.get_key_value("default",),)
            .map_or(DEFAULT_TIMEOUT, |(_, seconds,)| *seconds,)
    }
}

/// Test platform given either inline or by name.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
#[serde(untagged)]
pub enum TestPlatformRef
{
    /// Reference to a shared test platform.
    Named(String,),
    /// Inline test platform definition.
    Inline(TestPlatform,),
}

/// Test runner flag with an optional `<Platform>_<Api>` filter.
///
/// A bare string applies to every platform:
///
/// ```
/// use pipegen::UtrFlag;
///
/// let flags: Vec<UtrFlag,> = serde_yaml::from_str(
///     "- --suite=playmode\n- flag: --extra-editor-arg=\"-force-d3d12\"\n  platforms: [Win_DX12]\n",
/// )
/// .expect("valid flags",);
/// assert!(flags[0].platforms.is_empty());
/// assert_eq!(flags[1].platforms, ["Win_DX12"]);
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
#[serde(from = "UtrFlagInput")]
pub struct UtrFlag
{
    /// Flag text, possibly containing placeholders.
    pub flag: String,

    /// `<Platform>_<Api>` combinations the flag applies to; empty means all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String,>,
}

impl UtrFlag
{
    /// Flag that applies to every `<Platform>_<Api>` combination.
    pub fn always(flag: impl Into<String,>,) -> Self
    {
        Self {
            flag:      flag.into(),
            platforms: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize,)]
#[serde(untagged)]
enum UtrFlagInput
{
    Always(String,),
    Filtered
    {
        flag:      String,
        #[serde(default)]
        platforms: Vec<String,>,
    },
}

impl From<UtrFlagInput,> for UtrFlag
{
    fn from(input: UtrFlagInput,) -> Self
    {
        match input {
            UtrFlagInput::Always(flag,) => Self::always(flag,),
            UtrFlagInput::Filtered {
                flag,
                platforms,
            } => Self {
                flag,
                platforms,
            },
        }
    }
}

/// Service endpoints referenced from generated commands.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct Services
{
    /// Download location of the test runner; Windows jobs append `.bat`.
    #[serde(default = "default_utr_install_url")]
    pub utr_install_url: String,

    /// Package index serving `unity-downloader-cli`.
    #[serde(default = "default_unity_downloader_cli_url")]
    pub unity_downloader_cli_url: String,

    /// Registry exported as `UPM_REGISTRY`.
    #[serde(default = "default_upm_registry")]
    pub upm_registry: String,

    /// Registry `upm-ci-utils` is installed from.
    #[serde(default = "default_upm_ci_registry")]
    pub upm_ci_registry: String,
}

impl Default for Services
{
    fn default() -> Self
    {
        Self {
            utr_install_url:          default_utr_install_url(),
            unity_downloader_cli_url: default_unity_downloader_cli_url(),
            upm_registry:             default_upm_registry(),
            upm_ci_registry:          default_upm_ci_registry(),
        }
    }
}

fn default_utr_install_url() -> String
{
    DEFAULT_UTR_INSTALL_URL.to_owned()
}

fn default_unity_downloader_cli_url() -> String
{
    DEFAULT_UNITY_DOWNLOADER_CLI_URL.to_owned()
}

fn default_upm_registry() -> String
{
    DEFAULT_UPM_REGISTRY.to_owned()
}

fn default_upm_ci_registry() -> String
{
    DEFAULT_UPM_CI_REGISTRY.to_owned()
}

/// Root of the latest-editor-versions metafile.
///
/// Revisions are keyed by `<track>_latest_internal` and then by OS.
#[derive(Debug, Deserialize, Serialize, Clone, Default,)]
pub struct LatestEditorVersions
{
    /// Revision tables keyed by `<track>_latest_internal`.
    #[serde(default)]
    pub editor_versions: BTreeMap<String, BTreeMap<String, EditorRevision,>,>,
}

impl LatestEditorVersions
{
    /// Looks up the pinned revision of `track` on `os`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pipegen::LatestEditorVersions;
    ///
    /// let yaml = r#"
    /// editor_versions:
    ///   trunk_latest_internal:
    ///     windows:
    ///       revision: 0123abcd
    ///       version: 2021.2.0a9
    /// "#;
    /// let latest: LatestEditorVersions = serde_yaml::from_str(yaml,).expect("valid versions",);
    /// assert_eq!(latest.revision("trunk", "windows",), Some("0123abcd"));
    /// assert_eq!(latest.revision("trunk", "macos",), None);
    /// ```
    pub fn revision(&self, track: &str, os: &str,) -> Option<&str,>
    {
        self.editor_versions
            .get(&format!("{track}_latest_internal"),)?
            .get(os,)
            .map(|entry| entry.revision.as_str(),)
    }
}

/// Pinned editor revision for one OS.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct EditorRevision
{
    /// Revision hash handed to the downloader.
    pub revision: String,

    /// Human readable version string.
    #[serde(default)]
    pub version: Option<String,>,
}

#[cfg(test)]
mod tests
{
    use super::{
        AgentRef, Editor, Services, SharedConfig, TestPlatform, TestPlatformKind, UtrFlag,
    };
    use crate::constants::{DEFAULT_TIMEOUT, DEFAULT_UPM_REGISTRY};

    fn test_platform() -> TestPlatform
    {
        serde_yaml::from_str(
            r"
            name: Standalone
            type: Standalone
            timeout:
              default: 1800
              OSX_Metal: 2400
            ",
        )
        .expect("expected test platform to deserialize",)
    }

    #[test]
    fn editor_name_falls_back_to_track()
    {
        let editor: Editor =
            serde_yaml::from_str("track: trunk",).expect("expected editor to deserialize",);
        assert_eq!(editor.resolved_name(), "trunk");
        assert_eq!(editor.rerun_strategy, "on-new-revision");
        assert!(!editor.editor_pinning);
        assert!(!editor.nightly);
    }

    #[test]
    fn editor_name_override_is_trimmed()
    {
        let editor: Editor = serde_yaml::from_str("track: trunk\nname: '  fast-trunk '",)
            .expect("expected editor to deserialize",);
        assert_eq!(editor.resolved_name(), "fast-trunk");
    }

    #[test]
    fn custom_revision_track_is_detected()
    {
        let editor: Editor = serde_yaml::from_str("track: CUSTOM-REVISION",)
            .expect("expected editor to deserialize",);
        assert!(editor.is_custom_revision());
    }

    #[test]
    fn agent_refs_accept_names_and_inline_agents()
    {
        let refs: Vec<AgentRef,> = serde_yaml::from_str(
            r"
            - package_ci_win
            - type: Unity::VM::GPU
              image: sdet/gamecode_win10:stable
              flavor: b1.large
              model: rtx2080
            ",
        )
        .expect("expected agent refs to deserialize",);

        assert_eq!(refs[0], AgentRef::Named("package_ci_win".to_owned()));
        match &refs[1] {
            AgentRef::Inline(agent,) => {
                assert_eq!(agent.agent_type, "Unity::VM::GPU");
                assert_eq!(agent.model.as_deref(), Some("rtx2080"));
            }
            other => panic!("expected inline agent, got {other:?}"),
        }
    }

    #[test]
    fn test_platform_kinds_accept_aliases()
    {
        let kinds: Vec<TestPlatformKind,> =
            serde_yaml::from_str("[editmode, PlayMode, Standalone, standalone]",)
                .expect("expected kinds to deserialize",);
        assert_eq!(kinds, [
            TestPlatformKind::Editmode,
            TestPlatformKind::Playmode,
            TestPlatformKind::Standalone,
            TestPlatformKind::Standalone,
        ]);
    }

    #[test]
    fn timeout_prefers_platform_key_case_insensitively()
    {
        let platform = test_platform();
        assert_eq!(platform.timeout_for("osx_metal", false,), 2400);
        assert_eq!(platform.timeout_for("Win_DX11", false,), 1800);
        assert_eq!(platform.timeout_for("Win_DX11", true,), DEFAULT_TIMEOUT);
    }

    #[test]
    fn utr_flags_accept_bare_and_filtered_forms()
    {
        let flags: Vec<UtrFlag,> = serde_yaml::from_str(
            r"
            - --suite=editor
            - flag: --platform=Android
              platforms: [Android_OpenGLES3, Android_Vulkan]
            ",
        )
        .expect("expected flags to deserialize",);

        assert_eq!(flags[0].flag, "--suite=editor");
        assert!(flags[0].platforms.is_empty());
        assert_eq!(flags[1].platforms.len(), 2);
    }

    #[test]
    fn services_default_when_omitted()
    {
        let shared: SharedConfig =
            serde_yaml::from_str("target_branch: master\ntarget_editor: trunk",)
                .expect("expected shared config to deserialize",);
        assert_eq!(shared.services, Services::default());
        assert_eq!(shared.services.upm_registry, DEFAULT_UPM_REGISTRY);
    }

    #[test]
    fn services_can_be_partially_overridden()
    {
        let services: Services = serde_yaml::from_str("upm_registry: https://registry.test",)
            .expect("expected services to deserialize",);
        assert_eq!(services.upm_registry, "https://registry.test");
        assert_eq!(services.upm_ci_registry, Services::default().upm_ci_registry);
    }
}
