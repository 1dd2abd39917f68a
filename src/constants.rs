// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Fixed paths, service defaults, and markers embedded in generated commands.

/// Name of the repository checkout on remote devices.
pub const REPOSITORY_NAME: &str = "Graphics";
/// Directory holding the rendering test projects.
pub const TEST_PROJECTS_DIR: &str = "TestProjects";
/// File produced by editor priming jobs with the resolved editor revision.
pub const PATH_UNITY_REVISION: &str = "unity_revision.txt";
/// Directory test runs write their results into.
pub const PATH_TEST_RESULTS: &str = "test-results";
/// Directory standalone builds save players into.
pub const PATH_PLAYERS: &str = "players";
/// Glob for packed packages.
pub const PATH_PACKAGES: &str = "upm-ci~/packages/**/*";
/// Glob for packed templates.
pub const PATH_TEMPLATES: &str = "upm-ci~/templates/**/*";
/// Glob for upm-ci test results.
pub const PATH_UPM_TEST_RESULTS: &str = "upm-ci~/test-results/**/*";
/// Glob for test runner results anywhere in the checkout.
pub const PATH_ANY_TEST_RESULTS: &str = "**/test-results/**";

/// Editor track that takes its revision from the `CUSTOM_REVISION` variable.
pub const CUSTOM_REVISION_TRACK: &str = "CUSTOM-REVISION";
/// Placeholder value for the `CUSTOM_REVISION` variable.
pub const CUSTOM_REVISION_UNSET: &str = "custom_revision_not_set";

/// Timeout in seconds used when a test platform does not configure one.
pub const DEFAULT_TIMEOUT: u32 = 1200;
/// Rerun strategy applied to editors that do not configure one.
pub const DEFAULT_RERUN_STRATEGY: &str = "on-new-revision";
/// Named agent used for aggregate jobs when a metafile does not pick one.
pub const DEFAULT_AGGREGATE_AGENT: &str = "package_ci_ubuntu";
/// Relative editor location inside agents' working directory.
pub const DEFAULT_EDITOR_PATH: &str = ".Editor";
/// Colour space used when a platform entry does not list any.
pub const DEFAULT_COLOR_SPACE: &str = "Linear";

/// Default download location of the standalone test runner.
pub const DEFAULT_UTR_INSTALL_URL: &str =
    "https://artifactory.internal.unity3d.com/core-automation/tools/utr-standalone/utr";
/// Default package index serving `unity-downloader-cli`.
pub const DEFAULT_UNITY_DOWNLOADER_CLI_URL: &str =
    "https://artifactory.internal.unity3d.com/api/pypi/common-python/simple";
/// Default registry exported as `UPM_REGISTRY` to test jobs.
pub const DEFAULT_UPM_REGISTRY: &str =
    "https://artifactory-slo.bf.unity3d.com/artifactory/api/npm/upm-candidates";
/// Default npm registry `upm-ci-utils` is installed from.
pub const DEFAULT_UPM_CI_REGISTRY: &str =
    "https://artifactory.prd.cds.internal.unity3d.com/artifactory/api/npm/upm-npm";
