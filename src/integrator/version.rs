//! Patch-version bump of the package manifest and bundle config.
use semver::{BuildMetadata, Prerelease, Version};
use serde_json::{Value, json};

use crate::error::{ReleasewatchError, Result};

/// Which JSON document is being bumped and where its description lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionedFile {
    PackageManifest,
    BundleConfig,
}

impl VersionedFile {
    fn description_path(&self) -> &'static [&'static str] {
        match self {
            VersionedFile::PackageManifest => &["description"],
            VersionedFile::BundleConfig => &["bundle", "longDescription"],
        }
    }

    pub fn description(&self, tag: &str) -> String {
        match self {
            VersionedFile::PackageManifest => {
                format!("Modern GUI for Apple Container CLI (supports {tag})")
            }
            VersionedFile::BundleConfig => format!(
                "A modern, intuitive desktop application for managing Apple's container CLI with comprehensive support for {tag} features. Includes container lifecycle management, image builds, real-time logs, and system control."
            ),
        }
    }
}

/// Increment the patch component of a `MAJOR.MINOR.PATCH` version.
pub fn bump_patch(version: &str) -> Result<Version> {
    let mut version = Version::parse(version.trim())?;
    version.patch += 1;
    version.pre = Prerelease::EMPTY;
    version.build = BuildMetadata::EMPTY;
    Ok(version)
}

/// Bump `version` and rewrite the description field of a JSON document,
/// preserving key order. Returns the new content and version.
pub fn bump_document(
    content: &str,
    file: VersionedFile,
    tag: &str,
) -> Result<(String, Version)> {
    let mut doc: Value = serde_json::from_str(content)?;

    let current = doc
        .get("version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            ReleasewatchError::invalid_config("missing string field: version")
        })?;

    let next = bump_patch(current)?;
    doc["version"] = json!(next.to_string());

    let (field, parents) = file
        .description_path()
        .split_last()
        .ok_or_else(|| ReleasewatchError::invalid_config("empty field path"))?;

    let mut target = &mut doc;
    for parent in parents {
        target = target
            .get_mut(*parent)
            .filter(|v| v.is_object())
            .ok_or_else(|| {
                ReleasewatchError::invalid_config(format!(
                    "missing object field: {parent}"
                ))
            })?;
    }

    target[*field] = json!(file.description(tag));

    let mut formatted = serde_json::to_string_pretty(&doc)?;
    formatted.push('\n');

    Ok((formatted, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bumps_patch_component() {
        assert_eq!(bump_patch("0.4.1").unwrap().to_string(), "0.4.2");
        assert_eq!(bump_patch("1.0.9-beta.1").unwrap().to_string(), "1.0.10");
        assert!(bump_patch("1.0").is_err());
        assert!(bump_patch("latest").is_err());
    }

    #[test]
    fn bumps_manifest_preserving_key_order() {
        let content = r#"{
  "name": "container-gui",
  "version": "0.4.1",
  "description": "old",
  "scripts": { "start": "react-scripts start" }
}"#;

        let (updated, version) =
            bump_document(content, VersionedFile::PackageManifest, "v0.3.0")
                .unwrap();

        assert_eq!(version.to_string(), "0.4.2");
        assert!(updated.contains("\"version\": \"0.4.2\""));
        assert!(updated.contains(
            "\"description\": \"Modern GUI for Apple Container CLI (supports v0.3.0)\""
        ));
        let name_at = updated.find("\"name\"").unwrap();
        let version_at = updated.find("\"version\"").unwrap();
        let scripts_at = updated.find("\"scripts\"").unwrap();
        assert!(name_at < version_at && version_at < scripts_at);
    }

    #[test]
    fn bumps_bundle_long_description() {
        let content = r#"{"productName": "Container GUI", "version": "0.4.1", "identifier": "x", "bundle": {"active": true}}"#;

        let (updated, _) =
            bump_document(content, VersionedFile::BundleConfig, "v0.3.0")
                .unwrap();

        let doc: Value = serde_json::from_str(&updated).unwrap();
        assert_eq!(doc["version"], "0.4.2");
        assert!(
            doc["bundle"]["longDescription"]
                .as_str()
                .unwrap()
                .contains("support for v0.3.0 features")
        );
        assert_eq!(doc["bundle"]["active"], true);
    }

    #[test]
    fn rejects_unusable_documents() {
        assert!(
            bump_document("{ nope", VersionedFile::PackageManifest, "v1")
                .is_err()
        );
        assert!(
            bump_document(
                r#"{"version": "one"}"#,
                VersionedFile::PackageManifest,
                "v1"
            )
            .is_err()
        );
        assert!(
            bump_document(
                r#"{"version": "1.0.0"}"#,
                VersionedFile::BundleConfig,
                "v1"
            )
            .is_err()
        );
    }
}
