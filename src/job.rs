// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Job definitions as written into generated YAML files.
//!
//! A [`Job`] is assembled by the domain builders through its setters and is
//! not modified once inserted into a [`JobFile`]. Field order in the output
//! is fixed by the struct layout and empty sections are omitted, which keeps
//! regenerated files byte-for-byte stable.

use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};

use crate::{
    config::{Agent, Editor, Services},
    constants::{
        CUSTOM_REVISION_UNSET, PATH_ANY_TEST_RESULTS, PATH_PACKAGES, PATH_PLAYERS,
        PATH_TEMPLATES, PATH_UNITY_REVISION, PATH_UPM_TEST_RESULTS, TEST_PROJECTS_DIR,
    },
    error::Error,
};

/// Insertion-ordered string-keyed table.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct Table<V,>
{
    entries: Vec<(String, V,),>,
}

impl<V,> Default for Table<V,>
{
    fn default() -> Self
    {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V,> Table<V,>
{
    /// Creates an empty table.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Inserts `value` under `key`, replacing an existing entry in place.
    /// Returns the replaced value.
    pub fn insert(&mut self, key: impl Into<String,>, value: V,) -> Option<V,>
    {
        let key = key.into();
        if let Some(slot,) = self.entries.iter_mut().find(|(candidate, _,)| *candidate == key,) {
            return Some(std::mem::replace(&mut slot.1, value,),);
        }
        self.entries.push((key, value,),);
        None
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str,) -> Option<&V,>
    {
        self.entries.iter().find(|(candidate, _,)| candidate == key,).map(|(_, value,)| value,)
    }

    /// Returns `true` when `key` is present.
    pub fn contains_key(&self, key: &str,) -> bool
    {
        self.get(key,).is_some()
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self,) -> impl Iterator<Item = &str,>
    {
        self.entries.iter().map(|(key, _,)| key.as_str(),)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self,) -> impl Iterator<Item = (&str, &V,),>
    {
        self.entries.iter().map(|(key, value,)| (key.as_str(), value,),)
    }

    /// Number of entries.
    pub fn len(&self,) -> usize
    {
        self.entries.len()
    }

    /// Returns `true` when the table has no entries.
    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }
}

impl<V: Serialize,> Serialize for Table<V,>
{
    fn serialize<S,>(&self, serializer: S,) -> Result<S::Ok, S::Error,>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len(),),)?;
        for (key, value,) in &self.entries {
            map.serialize_entry(key, value,)?;
        }
        map.end()
    }
}

/// Reference to another job, `<prefix>/<file>#<job id>`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq,)]
#[serde(untagged)]
pub enum Dependency
{
    /// Plain reference.
    Path(String,),
    /// Reference carrying a rerun strategy.
    Rerun
    {
        /// Referenced job.
        path:  String,
        /// Rerun strategy, e.g. `on-new-revision`.
        rerun: String,
    },
}

impl Dependency
{
    /// Returns the referenced `<prefix>/<file>#<job id>` path.
    pub fn path(&self,) -> &str
    {
        match self {
            Self::Path(path,) | Self::Rerun {
                path, ..
            } => path,
        }
    }

    /// Attaches a rerun strategy to the reference.
    pub fn with_rerun(self, rerun: impl Into<String,>,) -> Self
    {
        Self::Rerun {
            path:  match self {
                Self::Path(path,) | Self::Rerun {
                    path, ..
                } => path,
            },
            rerun: rerun.into(),
        }
    }
}

/// Scheduled trigger.
#[derive(Debug, Serialize, Clone, PartialEq, Eq,)]
pub struct Recurrent
{
    /// Branch the schedule runs on.
    pub branch:    String,
    /// Frequency, e.g. `daily`.
    pub frequency: String,
}

/// Triggers that start a job without a user request.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq,)]
pub struct Triggers
{
    /// Pull request trigger expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String,>,
    /// Scheduled triggers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recurrent:  Vec<Recurrent,>,
}

impl Triggers
{
    /// Returns `true` when no trigger is configured.
    pub fn is_empty(&self,) -> bool
    {
        self.expression.is_none() && self.recurrent.is_empty()
    }
}

/// Named artifact collected after the job.
#[derive(Debug, Serialize, Clone, PartialEq, Eq,)]
pub struct Artifact
{
    /// Globs of the collected files.
    pub paths: Vec<String,>,
}

fn is_false(value: &bool,) -> bool
{
    !*value
}

/// One CI job.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq,)]
pub struct Job
{
    /// Display name.
    pub name:          String,
    /// Agent the job runs on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent:         Option<Agent,>,
    /// Whether the repository checkout is skipped.
    #[serde(skip_serializing_if = "is_false")]
    pub skip_checkout: bool,
    /// Environment variables.
    #[serde(skip_serializing_if = "Table::is_empty")]
    pub variables:     Table<String,>,
    /// Jobs that must finish first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies:  Vec<Dependency,>,
    /// Automatic triggers.
    #[serde(skip_serializing_if = "Triggers::is_empty")]
    pub triggers:      Triggers,
    /// Shell commands in execution order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commands:      Vec<String,>,
    /// Collected artifacts.
    #[serde(skip_serializing_if = "Table::is_empty")]
    pub artifacts:     Table<Artifact,>,
}

impl Job
{
    /// Creates an empty job.
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn set_name(&mut self, name: impl Into<String,>,) -> &mut Self
    {
        self.name = name.into();
        self
    }

    pub fn set_agent(&mut self, agent: Agent,) -> &mut Self
    {
        self.agent = Some(agent,);
        self
    }

    pub fn set_skip_checkout(&mut self, skip: bool,) -> &mut Self
    {
        self.skip_checkout = skip;
        self
    }

    pub fn add_variable(&mut self, key: &str, value: impl Into<String,>,) -> &mut Self
    {
        self.variables.insert(key, value.into(),);
        self
    }

    /// Exports the package registry as `UPM_REGISTRY`.
    pub fn add_var_upm_registry(&mut self, services: &Services,) -> &mut Self
    {
        self.add_variable("UPM_REGISTRY", services.upm_registry.as_str(),)
    }

    /// Declares `CUSTOM_REVISION` for editors whose revision is supplied at
    /// run time. Other editors are left untouched.
    pub fn add_var_custom_revision(&mut self, editor: &Editor,) -> &mut Self
    {
        if editor.is_custom_revision() {
            self.add_variable("CUSTOM_REVISION", CUSTOM_REVISION_UNSET,);
        }
        self
    }

    pub fn add_dependency(&mut self, dependency: Dependency,) -> &mut Self
    {
        self.dependencies.push(dependency,);
        self
    }

    pub fn add_dependencies(&mut self, dependencies: impl IntoIterator<Item = Dependency,>,) -> &mut Self
    {
        self.dependencies.extend(dependencies,);
        self
    }

    pub fn add_commands(&mut self, commands: impl IntoIterator<Item = String,>,) -> &mut Self
    {
        self.commands.extend(commands,);
        self
    }

    pub fn set_trigger_expression(&mut self, expression: impl Into<String,>,) -> &mut Self
    {
        self.triggers.expression = Some(expression.into(),);
        self
    }

    pub fn add_trigger_recurrent(&mut self, branch: &str, frequency: &str,) -> &mut Self
    {
        self.triggers.recurrent.push(Recurrent {
            branch:    branch.to_owned(),
            frequency: frequency.to_owned(),
        },);
        self
    }

    pub fn add_artifacts(&mut self, name: &str, paths: &[&str],) -> &mut Self
    {
        self.artifacts.insert(name, Artifact {
            paths: paths.iter().map(|path| (*path).to_owned(),).collect(),
        },);
        self
    }

    pub fn add_artifacts_test_results(&mut self,) -> &mut Self
    {
        self.add_artifacts("logs", &[PATH_ANY_TEST_RESULTS,],)
    }

    pub fn add_artifacts_upm_test_results(&mut self,) -> &mut Self
    {
        self.add_artifacts("logs", &[PATH_UPM_TEST_RESULTS,],)
    }

    pub fn add_artifacts_packages(&mut self,) -> &mut Self
    {
        self.add_artifacts("packages", &[PATH_PACKAGES,],)
    }

    pub fn add_artifacts_templates(&mut self,) -> &mut Self
    {
        self.add_artifacts("templates", &[PATH_TEMPLATES,],)
    }

    pub fn add_artifacts_unity_revision(&mut self,) -> &mut Self
    {
        self.add_artifacts("unity_revision.txt", &[PATH_UNITY_REVISION,],)
    }

    /// Collects players saved by a standalone build of `project_folder`.
    pub fn add_artifacts_players(&mut self, project_folder: &str,) -> &mut Self
    {
        let path = format!("{TEST_PROJECTS_DIR}/{project_folder}/{PATH_PLAYERS}/**");
        self.add_artifacts("players", &[path.as_str(),],)
    }
}

/// Ordered set of jobs written into one output file.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct JobFile
{
    /// File name inside the output directory, e.g. `_packages.yml`.
    pub name: String,
    /// Jobs keyed by identifier.
    pub jobs: Table<Job,>,
}

impl JobFile
{
    /// Creates an empty job file.
    pub fn new(name: impl Into<String,>,) -> Self
    {
        Self {
            name: name.into(), jobs: Table::new(),
        }
    }

    /// Adds a job under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) when `id` is already
    /// used in this file.
    pub fn insert(&mut self, id: impl Into<String,>, job: Job,) -> Result<(), Error,>
    {
        let id = id.into();
        if self.jobs.contains_key(&id,) {
            return Err(Error::validation(format!("duplicate job id '{id}' in {}", self.name),),);
        }
        self.jobs.insert(id, job,);
        Ok((),)
    }

    /// Iterates over job identifiers in insertion order.
    pub fn job_ids(&self,) -> impl Iterator<Item = &str,>
    {
        self.jobs.keys()
    }
}

#[cfg(test)]
mod tests
{
    use super::{Dependency, Job, JobFile, Table};
    use crate::{
        config::{Agent, Editor, Services},
        error::Error,
    };

    fn agent() -> Agent
    {
        Agent {
            agent_type: "Unity::VM".to_owned(),
            image:      "package-ci/ubuntu:stable".to_owned(),
            flavor:     "b1.small".to_owned(),
            model:      None,
        }
    }

    fn editor(track: &str,) -> Editor
    {
        Editor {
            track:          track.to_owned(),
            name:           None,
            rerun_strategy: "on-new-revision".to_owned(),
            editor_pinning: false,
            nightly:        false,
        }
    }

    #[test]
    fn table_replaces_existing_keys_in_place()
    {
        let mut table = Table::new();
        table.insert("a", 1,);
        table.insert("b", 2,);
        assert_eq!(table.insert("a", 3,), Some(1));

        let entries: Vec<_,> = table.iter().collect();
        assert_eq!(entries, [("a", &3), ("b", &2)]);
    }

    #[test]
    fn job_serializes_sections_in_fixed_order()
    {
        let mut job = Job::new();
        job.add_artifacts_test_results()
            .add_commands(["echo run".to_owned(),],)
            .add_dependency(Dependency::Path(".yamato/_abv.yml#x".to_owned(),),)
            .add_var_upm_registry(&Services::default(),)
            .set_agent(agent(),)
            .set_name("Example",);

        let yaml = serde_yaml::to_string(&job,).expect("expected serialization success",);
        let positions: Vec<usize,> = ["name:", "agent:", "variables:", "dependencies:", "commands:", "artifacts:",]
            .iter()
            .map(|key| yaml.find(key,).expect("expected section to be present",),)
            .collect();
        assert!(positions.windows(2,).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn empty_sections_are_omitted()
    {
        let mut job = Job::new();
        job.set_name("Aggregate",);

        let yaml = serde_yaml::to_string(&job,).expect("expected serialization success",);
        assert_eq!(yaml.trim(), "name: Aggregate");
    }

    #[test]
    fn custom_revision_variable_only_for_custom_track()
    {
        let mut job = Job::new();
        job.add_var_custom_revision(&editor("trunk",),);
        assert!(job.variables.is_empty());

        job.add_var_custom_revision(&editor("CUSTOM-REVISION",),);
        assert_eq!(job.variables.get("CUSTOM_REVISION").map(String::as_str), Some("custom_revision_not_set"));
    }

    #[test]
    fn dependency_with_rerun_keeps_path()
    {
        let dependency = Dependency::Path(".yamato/a.yml#b".to_owned(),).with_rerun("always",);
        assert_eq!(dependency.path(), ".yamato/a.yml#b");

        let value = serde_yaml::to_value(&dependency,).expect("expected serialization success",);
        assert_eq!(value["rerun"].as_str(), Some("always"));
    }

    #[test]
    fn players_artifact_points_into_project_folder()
    {
        let mut job = Job::new();
        job.add_artifacts_players("UniversalGraphicsTest",);
        let artifact = job.artifacts.get("players",).expect("expected players artifact",);
        assert_eq!(artifact.paths, ["TestProjects/UniversalGraphicsTest/players/**"]);
    }

    #[test]
    fn job_file_rejects_duplicate_ids()
    {
        let mut file = JobFile::new("_packages.yml",);
        file.insert("pack_core", Job::new(),).expect("expected first insert to succeed",);

        let error = file.insert("pack_core", Job::new(),).expect_err("expected duplicate error",);
        match error {
            Error::Validation {
                message,
            } => assert_eq!(message, "duplicate job id 'pack_core' in _packages.yml"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
