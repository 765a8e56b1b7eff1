//! Configuration loading and parsing for `releasewatch.toml` files.
//!
//! Every field has a default matching the layout of the container GUI
//! project, so the file is optional.
use log::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::Result;

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "releasewatch.toml";
/// Default interval between release checks (30 minutes).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30 * 60;
/// Environment variable gating the native bundle build check.
pub const NATIVE_BUILD_ENV: &str = "TEST_TAURI_BUILD";

/// Upstream repository whose releases are monitored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the GitHub REST API.
    pub api_base: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Base ref used when comparing a release tag.
    pub compare_base: String,
    /// Environment variable holding an optional API token.
    pub token_env: String,
    /// User agent sent with every request (GitHub rejects requests without one).
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".into(),
            owner: "apple".into(),
            repo: "container".into(),
            compare_base: "main".into(),
            token_env: "GITHUB_TOKEN".into(),
            user_agent: format!("releasewatch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Paths relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PathsConfig {
    /// Persisted monitor cursor.
    pub state_file: String,
    /// Directory for release and test reports.
    pub reports_dir: String,
    /// Directory holding one backup set per integrated release.
    pub backups_dir: String,
    /// Directory for log files.
    pub logs_dir: String,
    /// Utility module receiving generated command methods.
    pub utils_module: String,
    /// Run-container form.
    pub run_form: String,
    /// Build-image form.
    pub build_form: String,
    /// Images page (integrity checked only).
    pub images_page: String,
    /// Logs page (integrity checked only).
    pub logs_page: String,
    /// Sidebar navigation component.
    pub sidebar: String,
    /// Directory where scaffolded pages are written.
    pub routes_dir: String,
    /// Route registration module.
    pub routes_index: String,
    /// Package manifest.
    pub package_manifest: String,
    /// App bundle configuration.
    pub bundle_config: String,
    /// Generated release notes.
    pub release_notes: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_file: ".release-state.json".into(),
            reports_dir: "reports".into(),
            backups_dir: "backups".into(),
            logs_dir: "logs".into(),
            utils_module: "src/utils/containerUtils.js".into(),
            run_form: "src/routes/RunContainer.jsx".into(),
            build_form: "src/routes/BuildImage.jsx".into(),
            images_page: "src/routes/Images.jsx".into(),
            logs_page: "src/routes/Logs.jsx".into(),
            sidebar: "src/components/Sidebar.jsx".into(),
            routes_dir: "src/routes".into(),
            routes_index: "src/routes/index.js".into(),
            package_manifest: "package.json".into(),
            bundle_config: "src-tauri/tauri.conf.json".into(),
            release_notes: "RELEASE_NOTES.md".into(),
        }
    }
}

/// External commands, each given as program followed by arguments.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CommandsConfig {
    /// Verifies the container CLI is installed.
    pub cli_check: Vec<String>,
    /// Project test runner, run non-interactively after integration.
    pub test_runner: Vec<String>,
    /// Project build.
    pub build: Vec<String>,
    /// Native bundle build, only run when `TEST_TAURI_BUILD=true`.
    pub native_build: Vec<String>,
    /// Timeout for the native bundle build.
    pub native_build_timeout_secs: u64,
    /// Best-effort CLI probes whose failures are only logged.
    pub probes: Vec<Vec<String>>,
    /// Timeout for each probe.
    pub probe_timeout_secs: u64,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        let cmd = |parts: &[&str]| {
            parts.iter().map(|p| p.to_string()).collect::<Vec<String>>()
        };

        Self {
            cli_check: cmd(&["container", "--version"]),
            test_runner: cmd(&[
                "npm",
                "test",
                "--",
                "--watchAll=false",
                "--passWithNoTests",
            ]),
            build: cmd(&["npm", "run", "build"]),
            native_build: cmd(&["npm", "run", "tauri", "build", "--debug"]),
            native_build_timeout_secs: 300,
            probes: vec![
                cmd(&["container", "--help"]),
                cmd(&["container", "--version"]),
                cmd(&["container", "system", "info"]),
            ],
            probe_timeout_secs: 10,
        }
    }
}

/// Polling behavior.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between release checks.
    pub interval_secs: u64,
    /// Run the integrator when a new release is detected.
    pub auto_integrate: bool,
    /// Run the integration test suite after integrating.
    pub run_integration_tests: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            auto_integrate: true,
            run_integration_tests: true,
        }
    }
}

/// Integration behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IntegrationConfig {
    /// Restore the backup set when the post-integration test run fails.
    pub rollback_on_test_failure: bool,
}

/// Root configuration structure for `releasewatch.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Root of the project being kept in sync.
    pub project_root: PathBuf,
    pub upstream: UpstreamConfig,
    pub paths: PathsConfig,
    pub commands: CommandsConfig,
    pub monitor: MonitorConfig,
    pub integration: IntegrationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            upstream: UpstreamConfig::default(),
            paths: PathsConfig::default(),
            commands: CommandsConfig::default(),
            monitor: MonitorConfig::default(),
            integration: IntegrationConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, or from
    /// `releasewatch.toml` in the project root when present.
    ///
    /// A `project_root` override always wins over the file's value.
    pub fn load(
        file: Option<&Path>,
        project_root: Option<&Path>,
    ) -> Result<Self> {
        let root = project_root.unwrap_or(Path::new("."));

        let path = match file {
            Some(file) => Some(file.to_path_buf()),
            None => {
                let candidate = root.join(DEFAULT_CONFIG_FILE);
                candidate.exists().then_some(candidate)
            }
        };

        let mut config = match path {
            Some(path) => {
                debug!("loading configuration from {}", path.display());
                let content = fs::read_to_string(&path)?;
                toml::from_str::<Config>(&content)?
            }
            None => {
                debug!("configuration file not found: using defaults");
                Config::default()
            }
        };

        if let Some(root) = project_root {
            config.project_root = root.to_path_buf();
        }

        Ok(config)
    }

    /// Resolve a project-relative path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.project_root.join(relative)
    }

    /// Files the integrator may mutate or create, relative to the project
    /// root. These are captured in every backup set.
    pub fn protected_files(&self) -> Vec<String> {
        vec![
            self.paths.utils_module.clone(),
            self.paths.run_form.clone(),
            self.paths.build_form.clone(),
            self.paths.sidebar.clone(),
            self.paths.routes_index.clone(),
            self.paths.package_manifest.clone(),
            self.paths.bundle_config.clone(),
            self.paths.release_notes.clone(),
        ]
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.interval_secs.max(1))
    }
}
