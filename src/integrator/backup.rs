//! Per-release snapshots of the files an integration run may mutate.
//!
//! A backup set is written once per tag. Later runs for the same tag reuse
//! it, so it always holds the project as it was before the first run.
use log::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{error::Result, report::sanitize_tag};

/// Records which files the set holds, next to the copies.
pub const MANIFEST_FILE: &str = "backup.json";

/// Files copied to `backups/pre-{tag}/`, mirroring their project-relative
/// paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupSet {
    #[serde(skip)]
    pub dir: PathBuf,
    /// Relative paths that were copied successfully.
    pub files: Vec<String>,
    /// Relative paths that did not exist yet. Restoring removes them.
    pub absent: Vec<String>,
    /// Relative paths that could not be copied.
    pub failed: Vec<String>,
}

impl BackupSet {
    pub fn dir_for(backups_root: &Path, tag: &str) -> PathBuf {
        backups_root.join(format!("pre-{}", sanitize_tag(tag)))
    }

    /// Copy each file into the backup directory. A file that cannot be
    /// copied is logged and recorded in `failed`; the rest still proceed.
    ///
    /// An existing set for the tag is returned as is and never overwritten.
    pub async fn capture(
        project_root: &Path,
        backups_root: &Path,
        tag: &str,
        files: &[String],
    ) -> Result<Self> {
        let dir = Self::dir_for(backups_root, tag);

        if let Some(existing) = Self::load(&dir).await? {
            info!(
                "backup for {} already exists at {}: keeping it",
                tag,
                dir.display()
            );
            return Ok(existing);
        }

        fs::create_dir_all(&dir).await?;

        let mut set = Self {
            dir,
            ..Self::default()
        };

        for file in files {
            let source = project_root.join(file);
            let target = set.dir.join(file);

            if !fs::try_exists(&source).await.unwrap_or(false) {
                debug!("{} does not exist yet: nothing to back up", file);
                set.absent.push(file.clone());
                continue;
            }

            match copy_with_parents(&source, &target).await {
                Ok(()) => set.files.push(file.clone()),
                Err(e) => {
                    warn!("failed to back up {}: {}", file, e);
                    set.failed.push(file.clone());
                }
            }
        }

        fs::write(
            set.dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&set)?,
        )
        .await?;

        info!(
            "backup created at {} ({} files)",
            set.dir.display(),
            set.files.len()
        );

        Ok(set)
    }

    /// Read the manifest of an existing set.
    async fn load(dir: &Path) -> Result<Option<Self>> {
        let manifest = dir.join(MANIFEST_FILE);
        if !fs::try_exists(&manifest).await? {
            return Ok(None);
        }

        let content = fs::read_to_string(&manifest).await?;
        let mut set: Self = serde_json::from_str(&content)?;
        set.dir = dir.to_path_buf();

        Ok(Some(set))
    }

    /// Copy every backed-up file back into the project and remove files
    /// that did not exist when the set was captured. Returns the paths that
    /// were restored or removed.
    pub async fn restore(&self, project_root: &Path) -> Vec<String> {
        let mut restored = vec![];

        for file in self.files.iter() {
            let source = self.dir.join(file);
            let target = project_root.join(file);

            match copy_with_parents(&source, &target).await {
                Ok(()) => restored.push(file.clone()),
                Err(e) => warn!("failed to restore {}: {}", file, e),
            }
        }

        for file in self.absent.iter() {
            let target = project_root.join(file);

            match fs::remove_file(&target).await {
                Ok(()) => restored.push(file.clone()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("failed to remove {}: {}", file, e),
            }
        }

        restored
    }
}

async fn copy_with_parents(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::copy(source, target).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn captures_and_restores_files() {
        let project = TempDir::new().unwrap();
        let backups = project.path().join("backups");
        std::fs::create_dir_all(project.path().join("src/utils")).unwrap();
        std::fs::write(project.path().join("src/utils/a.js"), "original")
            .unwrap();
        std::fs::write(project.path().join("package.json"), "{}").unwrap();

        let files = vec![
            "src/utils/a.js".to_string(),
            "package.json".to_string(),
            "NOTES.md".to_string(),
        ];

        let set = BackupSet::capture(project.path(), &backups, "v0.3.0", &files)
            .await
            .unwrap();

        assert_eq!(set.dir, backups.join("pre-v0.3.0"));
        assert_eq!(set.files, vec!["src/utils/a.js", "package.json"]);
        assert_eq!(set.absent, vec!["NOTES.md"]);
        assert!(set.failed.is_empty());
        assert!(set.dir.join(MANIFEST_FILE).exists());
        assert_eq!(
            std::fs::read_to_string(set.dir.join("src/utils/a.js")).unwrap(),
            "original"
        );

        std::fs::write(project.path().join("src/utils/a.js"), "mutated")
            .unwrap();
        std::fs::write(project.path().join("NOTES.md"), "generated").unwrap();
        let restored = set.restore(project.path()).await;

        assert_eq!(restored.len(), 3);
        assert_eq!(
            std::fs::read_to_string(project.path().join("src/utils/a.js"))
                .unwrap(),
            "original"
        );
        assert!(!project.path().join("NOTES.md").exists());
    }

    #[tokio::test]
    async fn existing_set_is_never_overwritten() {
        let project = TempDir::new().unwrap();
        let backups = project.path().join("backups");
        let files = vec!["a.js".to_string(), "NOTES.md".to_string()];
        std::fs::write(project.path().join("a.js"), "original").unwrap();

        let first = BackupSet::capture(project.path(), &backups, "v1", &files)
            .await
            .unwrap();

        std::fs::write(project.path().join("a.js"), "mutated").unwrap();
        std::fs::write(project.path().join("NOTES.md"), "generated").unwrap();

        let second = BackupSet::capture(project.path(), &backups, "v1", &files)
            .await
            .unwrap();

        assert_eq!(second, first);
        assert_eq!(
            std::fs::read_to_string(first.dir.join("a.js")).unwrap(),
            "original"
        );
        assert!(!first.dir.join("NOTES.md").exists());
    }
}
