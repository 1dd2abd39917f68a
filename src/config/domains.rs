// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Types of the per-domain metafiles.
//!
//! Each domain (editor priming, packages, ABV, preview publish, templates,
//! and one file per project) has its own document. Platforms, agents, and
//! test platforms are given by name and resolved against the shared
//! metafile.

use serde::{Deserialize, Serialize};

use super::shared::{AgentRef, AgentsProject, Editor, TestPlatformRef};
use crate::constants::{DEFAULT_AGGREGATE_AGENT, DEFAULT_COLOR_SPACE};

fn default_aggregate_agent() -> AgentRef
{
    AgentRef::Named(DEFAULT_AGGREGATE_AGENT.to_owned(),)
}

fn default_color_spaces() -> Vec<String,>
{
    vec![DEFAULT_COLOR_SPACE.to_owned()]
}

/// Platform entry inside a domain metafile.
///
/// A bare string names a shared platform without further settings:
///
/// ```
/// use pipegen::PlatformEntry;
///
/// let platforms: Vec<PlatformEntry,> = serde_yaml::from_str("[Win, {name: OSX}]",)
///     .expect("valid platforms",);
/// assert_eq!(platforms[0].name, "Win");
/// assert_eq!(platforms[1].color_spaces, ["Linear"]);
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
#[serde(from = "PlatformEntryInput")]
pub struct PlatformEntry
{
    /// Name of the shared platform definition.
    pub name: String,

    /// Graphics APIs to expand over.
    pub apis: Vec<ApiEntry,>,

    /// Build configurations to expand over.
    pub build_configs: Vec<BuildConfig,>,

    /// Colour spaces to expand over.
    pub color_spaces: Vec<String,>,

    /// Overrides of individual project agent slots.
    pub agents_project: AgentsProject,

    /// Override of the shared `standalone_split` setting.
    pub standalone_split: Option<bool,>,
}

#[derive(Debug, Deserialize,)]
#[serde(untagged)]
enum PlatformEntryInput
{
    Named(String,),
    Detailed(PlatformEntryFields,),
}

#[derive(Debug, Deserialize,)]
#[serde(deny_unknown_fields)]
struct PlatformEntryFields
{
    name:             String,
    #[serde(default)]
    apis:             Vec<ApiEntry,>,
    #[serde(default)]
    build_configs:    Vec<BuildConfig,>,
    #[serde(default = "default_color_spaces")]
    color_spaces:     Vec<String,>,
    #[serde(default)]
    agents_project:   AgentsProject,
    #[serde(default)]
    standalone_split: Option<bool,>,
}

impl From<PlatformEntryInput,> for PlatformEntry
{
    fn from(input: PlatformEntryInput,) -> Self
    {
        match input {
            PlatformEntryInput::Named(name,) => Self {
                name,
                apis: Vec::new(),
                build_configs: Vec::new(),
                color_spaces: default_color_spaces(),
                agents_project: AgentsProject::default(),
                standalone_split: None,
            },
            PlatformEntryInput::Detailed(fields,) => Self {
                name:             fields.name,
                apis:             fields.apis,
                build_configs:    fields.build_configs,
                color_spaces:     fields.color_spaces,
                agents_project:   fields.agents_project,
                standalone_split: fields.standalone_split,
            },
        }
    }
}

/// Graphics API entry of a platform.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
#[serde(from = "ApiEntryInput")]
pub struct ApiEntry
{
    /// API name, e.g. `DX11`.
    pub name: String,

    /// Test platforms that are not generated for this API.
    pub exclude_test_platforms: Vec<String,>,
}

impl ApiEntry
{
    /// Returns `true` when `test_platform` is excluded for this API.
    pub fn excludes(&self, test_platform: &str,) -> bool
    {
        self.exclude_test_platforms
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(test_platform,),)
    }
}

#[derive(Debug, Deserialize,)]
#[serde(untagged)]
enum ApiEntryInput
{
    Named(String,),
    Detailed
    {
        name:                   String,
        #[serde(default)]
        exclude_test_platforms: Vec<String,>,
    },
}

impl From<ApiEntryInput,> for ApiEntry
{
    fn from(input: ApiEntryInput,) -> Self
    {
        match input {
            ApiEntryInput::Named(name,) => Self {
                name,
                exclude_test_platforms: Vec::new(),
            },
            ApiEntryInput::Detailed {
                name,
                exclude_test_platforms,
            } => Self {
                name,
                exclude_test_platforms,
            },
        }
    }
}

/// Player build configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct BuildConfig
{
    /// Name embedded in job identifiers, e.g. `il2cpp`.
    pub name: String,

    /// Scripting backend substituted for `<SCRIPTING_BACKEND>`.
    pub scripting_backend: String,

    /// API compatibility level substituted for `<API_LEVEL>`.
    pub api_level: String,
}

/// Package built, tested, and published by the package jobs.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct Package
{
    /// Short identifier embedded in job identifiers.
    pub id: String,

    /// Package name and folder, e.g. `com.unity.render-pipelines.core`.
    pub packagename: String,

    /// Ids of packages this package depends on.
    #[serde(default)]
    pub dependencies: Vec<String,>,

    /// Whether dependency tests against updated dependencies are generated.
    #[serde(default)]
    pub hascodependencies: bool,
}

/// Project template packed and tested by the template jobs.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct Template
{
    /// Short identifier embedded in job identifiers.
    pub id: String,

    /// Template package name and folder.
    pub packagename: String,

    /// Display name used in job names. Defaults to the package name.
    #[serde(default)]
    pub name: Option<String,>,

    /// Ids of packages whose packed artifacts the template tests need.
    #[serde(default)]
    pub dependencies: Vec<String,>,
}

impl Template
{
    /// Returns the name used in job names.
    pub fn display_name(&self,) -> &str
    {
        self.name.as_deref().unwrap_or(self.packagename.as_str(),)
    }
}

/// `_editor.metafile`: editor priming jobs.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct EditorMetafile
{
    /// Editors replacing the shared list for this domain.
    #[serde(default)]
    pub override_editors: Option<Vec<Editor,>,>,

    /// Platforms editor revisions are resolved for.
    pub platforms: Vec<PlatformEntry,>,

    /// Agent running the priming jobs.
    pub agent: AgentRef,
}

/// `_packages.metafile`: package pack, test, and publish jobs.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct PackagesMetafile
{
    /// Editors replacing the shared list for this domain.
    #[serde(default)]
    pub override_editors: Option<Vec<Editor,>,>,

    /// Packages in dependency order.
    pub packages: Vec<Package,>,

    /// Platforms packages are tested on.
    pub platforms: Vec<PlatformEntry,>,

    /// Agent packing packages.
    pub agent_pack: AgentRef,

    /// Agent publishing packages.
    pub agent_publish: AgentRef,

    /// Agent running aggregate jobs.
    #[serde(default = "default_aggregate_agent")]
    pub agent_all_ci: AgentRef,
}

/// `_abv.metafile`: automated build verification jobs.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct AbvMetafile
{
    /// Editors replacing the shared list for this domain.
    #[serde(default)]
    pub override_editors: Option<Vec<Editor,>,>,

    /// Project aggregation settings.
    pub abv: AbvSection,

    /// Smoke test settings; no smoke tests are generated when absent.
    #[serde(default)]
    pub smoke_test: Option<SmokeTest,>,

    /// Trunk verification settings; no job is generated when absent.
    #[serde(default)]
    pub trunk_verification: Option<TrunkVerification,>,
}

/// Projects aggregated by the `all_project_ci` jobs.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct AbvSection
{
    /// Project names whose `All_` jobs are aggregated.
    pub projects: Vec<String,>,

    /// Agent running the aggregate jobs.
    #[serde(default = "default_aggregate_agent")]
    pub agent: AgentRef,

    /// Trigger expression attached to the target editor's aggregate job.
    #[serde(default)]
    pub expression_trigger: Option<String,>,
}

/// Smoke test project settings.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct SmokeTest
{
    /// Folder of the smoke test project under the test projects directory.
    pub folder: String,

    /// Agent for editmode smoke tests.
    pub agent: AgentRef,

    /// Agent for smoke tests that need a GPU.
    pub agent_gpu: AgentRef,

    /// Test platforms the smoke test runs on.
    pub test_platforms: Vec<TestPlatformRef,>,
}

/// Trunk verification settings.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct TrunkVerification
{
    /// Agent running the verification job.
    #[serde(default = "default_aggregate_agent")]
    pub agent: AgentRef,

    /// Project test jobs the verification depends on.
    pub dependencies: Vec<ProjectJobRef,>,
}

/// Coordinates of one project test job.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct ProjectJobRef
{
    /// Project name.
    pub project: String,
    /// Platform name.
    pub platform: String,
    /// API name.
    pub api: String,
    /// Test platform name.
    pub test_platform: String,
    /// Build configuration name.
    pub build_config: String,
    /// Colour space.
    pub color_space: String,
}

/// `_preview_publish.metafile`: preview publishing and promotion jobs.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct PreviewPublishMetafile
{
    /// Editors replacing the shared list for this domain.
    #[serde(default)]
    pub override_editors: Option<Vec<Editor,>,>,

    /// Packages published to the preview registry.
    pub packages: Vec<Package,>,

    /// Platforms whose target-editor package tests gate publishing.
    pub platforms: Vec<PlatformEntry,>,

    /// Agent packing packages.
    pub agent_pack: AgentRef,

    /// Agent publishing packages.
    pub agent_publish: AgentRef,

    /// Agent promoting packages.
    pub agent_promote: AgentRef,

    /// Whether the publish-all job runs on a recurrent trigger.
    #[serde(default)]
    pub auto_publish: bool,
}

/// `_templates.metafile`: template pack and test jobs.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct TemplatesMetafile
{
    /// Editors replacing the shared list for this domain.
    #[serde(default)]
    pub override_editors: Option<Vec<Editor,>,>,

    /// Templates to pack and test.
    pub templates: Vec<Template,>,

    /// Platforms templates are tested on.
    pub platforms: Vec<PlatformEntry,>,

    /// Agent packing templates.
    pub agent_pack: AgentRef,

    /// Agent running aggregate jobs.
    #[serde(default = "default_aggregate_agent")]
    pub agent_all_ci: AgentRef,
}

/// Per-project metafile describing its test matrix.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct ProjectMetafile
{
    /// Editors replacing the shared list for this project.
    #[serde(default)]
    pub override_editors: Option<Vec<Editor,>,>,

    /// Project identity.
    pub project: ProjectInfo,

    /// Test platforms the project runs on.
    pub test_platforms: Vec<TestPlatformRef,>,

    /// Platforms with their APIs, build configs, and colour spaces.
    pub platforms: Vec<PlatformEntry,>,

    /// Subset of jobs the `All_` job depends on; all test jobs when absent.
    #[serde(default)]
    pub all: Option<AllSection,>,

    /// Trigger expression attached to the target editor's `All_` job.
    #[serde(default)]
    pub expression_trigger: Option<String,>,

    /// Agent running the `All_` jobs.
    #[serde(default = "default_aggregate_agent")]
    pub agent_all: AgentRef,
}

/// Project name and folder.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct ProjectInfo
{
    /// Name embedded in job identifiers and file names.
    pub name: String,

    /// Folder under the test projects directory.
    pub folder: String,
}

/// Dependencies of the project's `All_` jobs.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct AllSection
{
    /// Matrix slices the `All_` job depends on.
    pub dependencies: Vec<AllDependency,>,
}

/// One matrix slice of the `All_` job's dependencies.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct AllDependency
{
    /// Platform name.
    pub platform: String,
    /// API name.
    pub api: String,
    /// Build configuration name.
    pub build_config: String,
    /// Colour space.
    pub color_space: String,
    /// Test platform names.
    pub test_platforms: Vec<String,>,
}
