// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Resolution of named references against the shared metafile.
//!
//! Domain metafiles name platforms, agents, and test platforms instead of
//! repeating them. [`Context`] merges those references with the shared
//! definitions and produces the concrete values the job builders embed.

use crate::{
    config::{
        Agent, AgentRef, ApiEntry, BuildConfig, Editor, LatestEditorVersions, PlatformEntry,
        Services, SharedConfig, TestPlatform, TestPlatformKind, TestPlatformRef,
    },
    constants::{PATH_UNITY_REVISION, REPOSITORY_NAME},
    error::Error,
    job::Dependency,
    naming,
};

/// Working directory of a command that invokes `unity-downloader-cli`.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum DownloaderLocation
{
    /// Repository root of the agent checkout.
    RepositoryRoot,
    /// A test project two levels below the repository root.
    TestProject,
    /// Home directory of a remote device holding a copy of the checkout.
    RemoteCheckout,
}

/// Agents used by project jobs on one platform after overrides are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct ProjectAgents
{
    pub default:          Option<Agent,>,
    pub editmode:         Option<Agent,>,
    pub playmode:         Option<Agent,>,
    pub standalone:       Option<Agent,>,
    pub standalone_build: Option<Agent,>,
}

impl ProjectAgents
{
    /// Selects the agent for a job of `kind`, falling back to `default`.
    ///
    /// Player builds prefer `standalone_build`, then `standalone`.
    pub fn for_job(&self, kind: TestPlatformKind, build: bool,) -> Option<&Agent,>
    {
        let specific = match (kind, build,) {
            (TestPlatformKind::Standalone, true,) => {
                self.standalone_build.as_ref().or(self.standalone.as_ref(),)
            }
            (TestPlatformKind::Standalone, false,) => self.standalone.as_ref(),
            (TestPlatformKind::Editmode, _,) => self.editmode.as_ref(),
            (TestPlatformKind::Playmode, _,) => self.playmode.as_ref(),
        };
        specific.or(self.default.as_ref(),)
    }
}

/// Platform entry merged with its shared definition.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct Platform
{
    /// Platform name, e.g. `Win`.
    pub name:             String,
    /// Operating system identifier, e.g. `windows`.
    pub os:               String,
    /// Editor components to download.
    pub components:       Vec<String,>,
    /// Agents for project jobs.
    pub agents:           ProjectAgents,
    /// Agent for package and template tests.
    pub agent_package:    Option<Agent,>,
    /// Command copying packed packages into the editor.
    pub copycmd:          Option<String,>,
    /// Editor location passed to `upm-ci`.
    pub editorpath:       String,
    /// Whether standalone tests are split into build and run jobs.
    pub standalone_split: bool,
    /// Graphics APIs to expand over.
    pub apis:             Vec<ApiEntry,>,
    /// Build configurations to expand over.
    pub build_configs:    Vec<BuildConfig,>,
    /// Colour spaces to expand over.
    pub color_spaces:     Vec<String,>,
}

impl Platform
{
    /// Returns the package test agent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) when neither the
    /// shared definition nor the metafile provides one.
    pub fn package_agent(&self,) -> Result<&Agent, Error,>
    {
        self.agent_package.as_ref().ok_or_else(|| {
            Error::validation(format!("platform '{}' does not define agent_package", self.name),)
        },)
    }

    /// Returns the project agent for a job of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) when no slot applies.
    pub fn project_agent(&self, kind: TestPlatformKind, build: bool,) -> Result<&Agent, Error,>
    {
        self.agents.for_job(kind, build,).ok_or_else(|| {
            Error::validation(format!("platform '{}' has no project agent for {kind:?}", self.name),)
        },)
    }
}

/// Shared definitions and output layout every job builder reads from.
#[derive(Debug, Clone, Copy,)]
pub struct Context<'a,>
{
    shared:           &'a SharedConfig,
    latest:           &'a LatestEditorVersions,
    reference_prefix: &'a str,
}

impl<'a,> Context<'a,>
{
    /// Creates a context. `reference_prefix` is prepended to dependency
    /// references, e.g. `.yamato`.
    pub fn new(
        shared: &'a SharedConfig,
        latest: &'a LatestEditorVersions,
        reference_prefix: &'a str,
    ) -> Self
    {
        Self {
            shared,
            latest,
            reference_prefix,
        }
    }

    pub fn shared(&self,) -> &'a SharedConfig
    {
        self.shared
    }

    pub fn services(&self,) -> &'a Services
    {
        &self.shared.services
    }

    pub fn target_branch(&self,) -> &'a str
    {
        &self.shared.target_branch
    }

    /// Returns the domain override when present, otherwise the shared list.
    pub fn editors<'b,>(&self, overrides: &'b Option<Vec<Editor,>,>,) -> &'b [Editor]
    where
        'a: 'b,
    {
        overrides.as_deref().unwrap_or(self.shared.editors.as_slice(),)
    }

    /// Returns `true` when `editor` gates pull requests.
    pub fn is_target_editor(&self, editor: &Editor,) -> bool
    {
        editor.resolved_name() == self.shared.target_editor
    }

    /// Resolves an inline or named agent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) when the name is not
    /// listed under `non_project_agents`.
    pub fn agent(&self, agent: &AgentRef,) -> Result<Agent, Error,>
    {
        match agent {
            AgentRef::Inline(agent,) => Ok(agent.clone(),),
            AgentRef::Named(name,) => {
                self.shared.non_project_agents.get(name.trim(),).cloned().ok_or_else(|| {
                    Error::validation(format!("unknown agent '{name}'"),)
                },)
            }
        }
    }

    fn optional_agent(&self, agent: Option<&AgentRef,>,) -> Result<Option<Agent,>, Error,>
    {
        agent.map(|agent| self.agent(agent,),).transpose()
    }

    /// Merges a metafile platform entry with the shared definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) for unknown
    /// platforms, blank OS identifiers, and unknown agent names.
    pub fn platform(&self, entry: &PlatformEntry,) -> Result<Platform, Error,>
    {
        let name = require_identifier(&entry.name, "platform name",)?;
        let spec = self
            .shared
            .platforms
            .get(name,)
            .ok_or_else(|| Error::validation(format!("unknown platform '{name}'"),),)?;
        let os = require_identifier(&spec.os, "platform os",)?;

        let shared = &spec.agents_project;
        let local = &entry.agents_project;
        let agents = ProjectAgents {
            default:          self.optional_agent(local.default.as_ref().or(shared.default.as_ref(),),)?,
            editmode:         self.optional_agent(local.editmode.as_ref().or(shared.editmode.as_ref(),),)?,
            playmode:         self.optional_agent(local.playmode.as_ref().or(shared.playmode.as_ref(),),)?,
            standalone:       self
                .optional_agent(local.standalone.as_ref().or(shared.standalone.as_ref(),),)?,
            standalone_build: self.optional_agent(
                local.standalone_build.as_ref().or(shared.standalone_build.as_ref(),),
            )?,
        };

        Ok(Platform {
            name: name.to_owned(),
            os: os.to_owned(),
            components: spec.components.clone(),
            agents,
            agent_package: self.optional_agent(spec.agent_package.as_ref(),)?,
            copycmd: spec.copycmd.clone(),
            editorpath: spec.editorpath.clone(),
            standalone_split: entry.standalone_split.unwrap_or(spec.standalone_split,),
            apis: entry.apis.clone(),
            build_configs: entry.build_configs.clone(),
            color_spaces: entry.color_spaces.clone(),
        },)
    }

    /// Resolves every platform entry of a domain metafile.
    ///
    /// # Errors
    ///
    /// Propagates the first failure of [`Context::platform`].
    pub fn platforms(&self, entries: &[PlatformEntry],) -> Result<Vec<Platform,>, Error,>
    {
        entries.iter().map(|entry| self.platform(entry,),).collect()
    }

    /// Resolves an inline or named test platform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) when the name is not
    /// defined in the shared metafile.
    pub fn test_platform(&self, test_platform: &TestPlatformRef,) -> Result<TestPlatform, Error,>
    {
        match test_platform {
            TestPlatformRef::Inline(test_platform,) => Ok(test_platform.clone(),),
            TestPlatformRef::Named(name,) => self
                .shared
                .test_platforms
                .iter()
                .find(|candidate| candidate.name == name.trim(),)
                .cloned()
                .ok_or_else(|| Error::validation(format!("unknown test platform '{name}'"),),),
        }
    }

    /// Returns the revision argument handed to `unity-downloader-cli`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) when a pinned editor
    /// has no revision for `os`.
    pub fn downloader_source(
        &self,
        editor: &Editor,
        os: &str,
        location: DownloaderLocation,
    ) -> Result<String, Error,>
    {
        if editor.editor_pinning {
            let revision = self.latest.revision(&editor.track, os,).ok_or_else(|| {
                Error::validation(format!(
                    "no pinned revision for editor '{}' on {os}",
                    editor.resolved_name()
                ),)
            },)?;
            return Ok(format!("-u {revision}"),);
        }
        if editor.is_custom_revision() {
            let variable = if os == "windows" { "%CUSTOM_REVISION%" } else { "$CUSTOM_REVISION" };
            return Ok(format!("-u {variable}"),);
        }
        let path = match location {
            DownloaderLocation::RepositoryRoot => PATH_UNITY_REVISION.to_owned(),
            DownloaderLocation::TestProject => format!("../../{PATH_UNITY_REVISION}"),
            DownloaderLocation::RemoteCheckout => format!("~/{REPOSITORY_NAME}/{PATH_UNITY_REVISION}"),
        };
        Ok(format!("--source-file {path}"),)
    }

    /// Returns `true` when `editor` needs a priming job to resolve its
    /// revision.
    pub fn needs_priming(editor: &Editor,) -> bool
    {
        !editor.editor_pinning && !editor.is_custom_revision()
    }

    /// Dependency on the priming job of `editor` on `os`, if it needs one.
    pub fn priming_dependency(&self, editor: &Editor, os: &str,) -> Option<Dependency,>
    {
        Self::needs_priming(editor,).then(|| {
            self.dependency(
                naming::EDITOR_PRIMING_FILE,
                &naming::editor_priming_job_id(editor.resolved_name(), os,),
            )
        },)
    }

    /// Builds a `<prefix>/<file>#<job>` reference.
    pub fn reference(&self, file: &str, job: &str,) -> String
    {
        let prefix = self.reference_prefix.trim_end_matches('/',);
        if prefix.is_empty() {
            format!("{file}#{job}")
        } else {
            format!("{prefix}/{file}#{job}")
        }
    }

    /// Plain dependency on `job` in `file`.
    pub fn dependency(&self, file: &str, job: &str,) -> Dependency
    {
        Dependency::Path(self.reference(file, job,),)
    }
}

/// Trims `input` and rejects blank values or values containing whitespace.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) naming `field`.
pub fn require_identifier<'s,>(input: &'s str, field: &str,) -> Result<&'s str, Error,>
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty"),),);
    }
    if trimmed.chars().any(char::is_whitespace,) {
        return Err(Error::validation(format!("{field} cannot contain whitespace"),),);
    }
    Ok(trimmed,)
}
