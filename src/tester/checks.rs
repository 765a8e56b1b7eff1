//! Individual smoke checks run after an integration.
use color_eyre::eyre::eyre;
use log::*;
use regex::Regex;
use serde_json::Value;
use std::{env, path::Path, sync::LazyLock, time::Duration};
use tokio::fs;

use crate::{
    config::{Config, NATIVE_BUILD_ENV},
    error::{ReleasewatchError, Result},
    process::{CommandRunner, ShellCommand},
    tester::syntax,
};

pub const CLI_AVAILABILITY: &str = "Container CLI Availability";
pub const PACKAGE_JSON_INTEGRITY: &str = "Package.json Integrity";
pub const TAURI_CONFIG_INTEGRITY: &str = "Tauri Config Integrity";
pub const CONTAINER_UTILS_INTEGRITY: &str = "ContainerUtils Integrity";
pub const UI_COMPONENTS_INTEGRITY: &str = "UI Components Integrity";
pub const NEW_FEATURES_INTEGRATION: &str = "New Features Integration";
pub const COMMAND_EXECUTION: &str = "Container Command Execution";
pub const PROJECT_BUILD: &str = "Project Build";
pub const NATIVE_BUILD: &str = "Native Build";

static SEMVER_TRIPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").unwrap());

const REQUIRED_UTILS_METHODS: &[&str] =
    &["executeCommand", "runContainer", "buildImage", "getContainerLogs"];

const GENERATED_MARKERS: &[&str] = &[
    "Auto-generated support for",
    "Auto-generated for",
    "Auto-generated flag validation",
];

fn failure(message: impl Into<String>) -> ReleasewatchError {
    ReleasewatchError::Other(eyre!(message.into()))
}

/// Whether `TEST_TAURI_BUILD=true` is set.
pub fn native_build_enabled() -> bool {
    env::var(NATIVE_BUILD_ENV).is_ok_and(|v| v == "true")
}

pub async fn cli_availability(
    config: &Config,
    runner: &dyn CommandRunner,
) -> Result<()> {
    let command = ShellCommand::from_parts(&config.commands.cli_check)?;

    match runner.run(&command).await {
        Ok(output) if output.success => Ok(()),
        _ => Err(failure("Apple Container CLI not available or not in PATH")),
    }
}

pub async fn package_json_integrity(config: &Config) -> Result<()> {
    let path = &config.paths.package_manifest;
    let doc = read_json(&config.resolve(path)).await?;

    require_fields(&doc, &["name", "version", "dependencies", "scripts"])?;

    for dep in ["react", "@tauri-apps/api"] {
        if !has_key(&doc, "dependencies", dep)
            && !has_key(&doc, "devDependencies", dep)
        {
            return Err(failure(format!("Missing required dependency: {dep}")));
        }
    }

    for script in ["start", "build", "tauri"] {
        if !has_key(&doc, "scripts", script) {
            return Err(failure(format!("Missing required script: {script}")));
        }
    }

    require_version_triple(&doc)
}

pub async fn tauri_config_integrity(config: &Config) -> Result<()> {
    let doc = read_json(&config.resolve(&config.paths.bundle_config)).await?;
    require_fields(&doc, &["productName", "version", "identifier"])?;
    require_version_triple(&doc)
}

pub async fn container_utils_integrity(config: &Config) -> Result<()> {
    let relative = &config.paths.utils_module;
    let content = fs::read_to_string(config.resolve(relative)).await?;

    syntax::check_source(&content)
        .map_err(|e| failure(format!("Syntax error in {relative}: {e}")))?;

    for method in REQUIRED_UTILS_METHODS {
        if !content.contains(method) {
            return Err(failure(format!(
                "Required method '{method}' not found in {relative}"
            )));
        }
    }

    Ok(())
}

pub async fn ui_components_integrity(config: &Config) -> Result<()> {
    let paths = &config.paths;
    let components = [
        &paths.run_form,
        &paths.build_form,
        &paths.images_page,
        &paths.logs_page,
        &paths.sidebar,
    ];

    for relative in components {
        let content = fs::read_to_string(config.resolve(relative))
            .await
            .map_err(|e| failure(format!("{relative}: {e}")))?;

        if !content.contains("import React") && !content.contains("from 'react'")
        {
            return Err(failure(format!("{relative}: Missing React import")));
        }

        if !content.contains("export default") && !content.contains("export {") {
            return Err(failure(format!("{relative}: Missing export statement")));
        }

        if let Some(issue) = syntax::first_syntax_issue(&content)? {
            return Err(failure(format!(
                "{relative}: Malformed JSX, {issue}"
            )));
        }
    }

    Ok(())
}

/// Logs which files carry generated code. Fails only on unreadable files.
pub async fn new_features_integration(config: &Config) -> Result<()> {
    let paths = &config.paths;

    for relative in [&paths.utils_module, &paths.run_form, &paths.build_form] {
        let content = fs::read_to_string(config.resolve(relative))
            .await
            .map_err(|e| failure(format!("{relative}: {e}")))?;

        if GENERATED_MARKERS.iter().any(|m| content.contains(m)) {
            info!("found auto-generated feature in {}", relative);
        } else {
            info!("no auto-generated features found in {}", relative);
        }
    }

    Ok(())
}

/// Best-effort CLI probes. Failures are logged and never fail the check.
pub async fn command_execution(
    config: &Config,
    runner: &dyn CommandRunner,
) -> Result<()> {
    let limit = Duration::from_secs(config.commands.probe_timeout_secs);

    for probe in config.commands.probes.iter() {
        let command = match ShellCommand::from_parts(probe) {
            Ok(command) => command.with_timeout(limit),
            Err(e) => {
                warn!("skipping probe: {}", e);
                continue;
            }
        };

        match runner.run(&command).await {
            Ok(output) if output.success => {
                info!("command executed successfully: {}", command)
            }
            _ => warn!("command failed (may be expected): {}", command),
        }
    }

    Ok(())
}

pub async fn project_build(
    config: &Config,
    runner: &dyn CommandRunner,
) -> Result<()> {
    info!("building frontend application");

    let command = ShellCommand::from_parts(&config.commands.build)?
        .in_dir(&config.project_root);

    runner
        .run(&command)
        .await
        .and_then(|output| output.into_result(&command))
        .map_err(|e| failure(format!("Build failed: {e}")))?;

    Ok(())
}

pub async fn native_build(
    config: &Config,
    runner: &dyn CommandRunner,
) -> Result<()> {
    info!("testing native bundle build");

    let command = ShellCommand::from_parts(&config.commands.native_build)?
        .in_dir(&config.project_root)
        .with_timeout(Duration::from_secs(
            config.commands.native_build_timeout_secs,
        ));

    runner
        .run(&command)
        .await
        .and_then(|output| output.into_result(&command))
        .map_err(|e| failure(format!("Native build failed: {e}")))?;

    Ok(())
}

async fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

fn require_fields(doc: &Value, fields: &[&str]) -> Result<()> {
    for field in fields {
        if is_blank(doc.get(field)) {
            return Err(failure(format!("Missing required field: {field}")));
        }
    }
    Ok(())
}

fn has_key(doc: &Value, table: &str, key: &str) -> bool {
    doc.get(table)
        .and_then(|t| t.as_object())
        .is_some_and(|t| !is_blank(t.get(key)))
}

fn require_version_triple(doc: &Value) -> Result<()> {
    let version = doc.get("version").and_then(|v| v.as_str()).unwrap_or("");
    if !SEMVER_TRIPLE.is_match(version) {
        return Err(failure(format!("Invalid version format: {version}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn blank_values() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&json!(null))));
        assert!(is_blank(Some(&json!(""))));
        assert!(!is_blank(Some(&json!({}))));
        assert!(!is_blank(Some(&json!("x"))));
    }

    #[test]
    fn dependency_lookup() {
        let doc = json!({
            "dependencies": { "react": "^18" },
            "devDependencies": { "@tauri-apps/api": "^2" }
        });
        assert!(has_key(&doc, "dependencies", "react"));
        assert!(!has_key(&doc, "dependencies", "@tauri-apps/api"));
        assert!(has_key(&doc, "devDependencies", "@tauri-apps/api"));
        assert!(!has_key(&doc, "peerDependencies", "react"));
    }

    #[test]
    fn version_must_be_plain_triple() {
        assert!(require_version_triple(&json!({ "version": "0.4.2" })).is_ok());
        assert!(require_version_triple(&json!({ "version": "0.4" })).is_err());
        assert!(
            require_version_triple(&json!({ "version": "1.0.0-beta" })).is_err()
        );
        assert!(require_version_triple(&json!({})).is_err());
    }

    #[test]
    fn native_build_gated_by_environment() {
        temp_env::with_var(NATIVE_BUILD_ENV, Some("true"), || {
            assert!(native_build_enabled());
        });
        temp_env::with_var(NATIVE_BUILD_ENV, Some("1"), || {
            assert!(!native_build_enabled());
        });
        temp_env::with_var_unset(NATIVE_BUILD_ENV, || {
            assert!(!native_build_enabled());
        });
    }
}
