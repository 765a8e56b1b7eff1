//! Integration runs: mutate the GUI project to support a new release.
//!
//! A run backs up the files it may touch, then works through an ordered
//! list of steps. Every step records an outcome in the returned
//! [`IntegrationSummary`]; a failing step never stops the ones after it.
//! File mutations are not locked, so callers must not run two integrations
//! against the same project at once.
use chrono::Utc;
use log::*;
use std::{path::PathBuf, sync::Arc};
use tokio::fs;

use crate::{
    config::Config,
    error::{ReleasewatchError, Result},
    patch::{self, Injection},
    process::{CommandRunner, ShellCommand},
    report::Report,
};

pub mod backup;
pub mod forms;
pub mod naming;
pub mod notes;
pub mod pages;
pub mod templates;
pub mod types;
pub mod utils_module;
pub mod version;

pub use backup::BackupSet;
pub use types::{IntegrationSummary, Step, StepOutcome, StepRecord, StepResult};

use version::VersionedFile;

pub struct Integrator {
    config: Arc<Config>,
    runner: Arc<dyn CommandRunner>,
}

impl Integrator {
    pub fn new(config: Arc<Config>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Run every integration step for the report's release.
    pub async fn integrate(&self, report: &Report) -> Result<IntegrationSummary> {
        let tag = report.release.tag.as_str();
        if tag.is_empty() {
            return Err(ReleasewatchError::invalid_report(
                "cannot integrate a release without a tag",
            ));
        }

        info!("starting integration for Apple container {}", tag);

        let mut summary = IntegrationSummary {
            tag: tag.to_string(),
            ..IntegrationSummary::default()
        };

        let backup = match self.create_backup(tag).await {
            Ok(set) => {
                let mut detail = format!(
                    "{} files saved to {}",
                    set.files.len(),
                    set.dir.display()
                );
                if !set.absent.is_empty() {
                    detail.push_str(&format!(
                        ", not present yet: {}",
                        set.absent.join(", ")
                    ));
                }
                if !set.failed.is_empty() {
                    detail.push_str(&format!(
                        ", not saved: {}",
                        set.failed.join(", ")
                    ));
                }
                let result = StepResult::applied(detail);
                record(&mut summary, Step::Backup, Ok(result));
                Some(set)
            }
            Err(e) => {
                record(&mut summary, Step::Backup, Err(e));
                None
            }
        };

        let result = self.update_utils_module(report).await;
        record(&mut summary, Step::UtilsUpdate, result);

        let result = self.update_forms(report).await;
        record(&mut summary, Step::UiFormUpdate, result);

        let mut created = vec![];
        let result = self.scaffold_pages(report, &mut created).await;
        summary.created_files = created;
        record(&mut summary, Step::PageScaffold, result);

        let result = self.bump_versions(tag).await;
        record(&mut summary, Step::VersionBump, result);

        let result = self.write_release_notes(report).await;
        record(&mut summary, Step::ReleaseNotes, result);

        let result = self.run_test_runner().await;
        summary.tests_passed = matches!(
            &result,
            Ok(r) if r.outcome == StepOutcome::Applied
        );
        record(&mut summary, Step::TestRun, result);

        let result = self.rollback(&summary, backup.as_ref()).await;
        summary.rolled_back = result.outcome == StepOutcome::Applied;
        record(&mut summary, Step::Rollback, Ok(result));

        if summary.tests_passed {
            info!("integration for {} completed successfully", tag);
            info!("review the generated changes and test new features manually");
        } else {
            warn!(
                "integration for {} completed with test failures: manual review required",
                tag
            );
        }

        Ok(summary)
    }

    async fn create_backup(&self, tag: &str) -> Result<BackupSet> {
        BackupSet::capture(
            &self.config.project_root,
            &self.config.resolve(&self.config.paths.backups_dir),
            tag,
            &self.config.protected_files(),
        )
        .await
    }

    async fn update_utils_module(&self, report: &Report) -> Result<StepResult> {
        let analysis = &report.analysis;
        if analysis.commands.is_empty() && analysis.flags.is_empty() {
            return Ok(StepResult::skipped("no new commands or flags"));
        }

        let relative = &self.config.paths.utils_module;
        let content = fs::read_to_string(self.config.resolve(relative)).await?;

        let injections =
            utils_module::injections(analysis, &report.release.tag, &content)?;

        if injections.is_empty() {
            return Ok(StepResult::skipped(format!(
                "{relative}: generated code already present"
            )));
        }

        info!(
            "adding support for commands [{}] and flags [{}]",
            report.analysis.commands.join(", "),
            report.analysis.flags.join(", ")
        );

        self.patch_content(relative, &content, &injections).await
    }

    async fn update_forms(&self, report: &Report) -> Result<StepResult> {
        let flags = &report.analysis.flags;
        if flags.is_empty() {
            return Ok(StepResult::skipped("no new flags"));
        }

        let targets = [
            (&self.config.paths.run_form, forms::run_form()),
            (&self.config.paths.build_form, forms::build_form()),
        ];

        let mut results = vec![];
        for (relative, target) in targets.iter() {
            let result = self
                .update_form(relative, target, flags, &report.release.tag)
                .await;
            results.push(per_file(relative, result));
        }

        Ok(StepResult::merge(results))
    }

    async fn update_form(
        &self,
        relative: &str,
        target: &forms::FormTarget,
        flags: &[String],
        tag: &str,
    ) -> Result<StepResult> {
        let content = fs::read_to_string(self.config.resolve(relative)).await?;

        match forms::injection(target, flags, tag, &content)? {
            Some(injection) => {
                self.patch_content(relative, &content, &[injection]).await
            }
            None => Ok(StepResult::skipped(format!(
                "{relative}: no new fields"
            ))),
        }
    }

    async fn scaffold_pages(
        &self,
        report: &Report,
        created: &mut Vec<PathBuf>,
    ) -> Result<StepResult> {
        let commands = &report.analysis.commands;
        if commands.is_empty() {
            return Ok(StepResult::skipped("no new commands"));
        }

        let mut results = vec![];

        for command in commands.iter() {
            info!("adding support for 'container {}'", command);

            if pages::needs_page(command) {
                let result = self
                    .create_page(command, &report.release.tag, created)
                    .await;
                results.push(per_file(&self.config.paths.routes_dir, result));
            }

            if pages::is_major(command) {
                let result = self.add_nav_entry(command).await;
                results.push(per_file(&self.config.paths.sidebar, result));
            }
        }

        Ok(StepResult::merge(results))
    }

    async fn create_page(
        &self,
        command: &str,
        tag: &str,
        created: &mut Vec<PathBuf>,
    ) -> Result<StepResult> {
        let page = naming::page_name(command);
        if page.is_empty() {
            return Ok(StepResult::skipped(format!(
                "'{command}' has no usable page name"
            )));
        }

        let page_path = self
            .config
            .resolve(&self.config.paths.routes_dir)
            .join(format!("{page}.jsx"));

        if fs::try_exists(&page_path).await? {
            info!("page {}.jsx already exists, skipping creation", page);
            return Ok(StepResult::skipped(format!("{page}.jsx already exists")));
        }

        let content = pages::render_page(command, tag)?;
        fs::write(&page_path, content).await?;
        created.push(page_path);
        info!("created new page: {}.jsx", page);

        let index_path = self.config.resolve(&self.config.paths.routes_index);
        let index = fs::read_to_string(&index_path).await?;
        let updated = pages::register_route(&index, &page);
        if updated != index {
            fs::write(&index_path, updated).await?;
            info!("updated routes index with {}", page);
        }

        Ok(StepResult::applied(format!("created {page}.jsx")))
    }

    async fn add_nav_entry(&self, command: &str) -> Result<StepResult> {
        let route = naming::route_path(command);
        let sidebar = self.config.resolve(&self.config.paths.sidebar);
        let content = fs::read_to_string(&sidebar).await?;

        if pages::has_nav_link(&content, &route) {
            return Ok(StepResult::skipped(format!(
                "sidebar already links to {route}"
            )));
        }

        self.patch_file(
            &self.config.paths.sidebar,
            &[pages::nav_injection(command)?],
        )
        .await
    }

    async fn bump_versions(&self, tag: &str) -> Result<StepResult> {
        let files = [
            (&self.config.paths.package_manifest, VersionedFile::PackageManifest),
            (&self.config.paths.bundle_config, VersionedFile::BundleConfig),
        ];

        let mut results = vec![];
        for (relative, file) in files {
            let result = self.bump_version_file(relative, file, tag).await;
            results.push(per_file(relative, result));
        }

        Ok(StepResult::merge(results))
    }

    async fn bump_version_file(
        &self,
        relative: &str,
        file: VersionedFile,
        tag: &str,
    ) -> Result<StepResult> {
        let path = self.config.resolve(relative);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("skipping version bump of {}: {}", relative, e);
                return Ok(StepResult::skipped(format!("{relative}: {e}")));
            }
        };

        let (updated, next) = match version::bump_document(&content, file, tag)
        {
            Ok(bumped) => bumped,
            Err(e) => {
                warn!("skipping version bump of {}: {}", relative, e);
                return Ok(StepResult::skipped(format!("{relative}: {e}")));
            }
        };

        fs::write(&path, updated).await?;
        info!("updated {} to version {}", relative, next);

        Ok(StepResult::applied(format!("{relative} -> {next}")))
    }

    async fn write_release_notes(&self, report: &Report) -> Result<StepResult> {
        let notes = notes::render_release_notes(report, Utc::now())?;
        let path = self.config.resolve(&self.config.paths.release_notes);
        fs::write(&path, notes).await?;
        info!("release notes written to {}", path.display());
        Ok(StepResult::applied(self.config.paths.release_notes.clone()))
    }

    async fn run_test_runner(&self) -> Result<StepResult> {
        let command = ShellCommand::from_parts(&self.config.commands.test_runner)?
            .in_dir(&self.config.project_root);

        info!("running project tests: {}", command);

        let output = self.runner.run(&command).await?;
        match output.into_result(&command) {
            Ok(_) => Ok(StepResult::applied("tests passed")),
            Err(e) => Ok(StepResult::failed(e.to_string())),
        }
    }

    /// Restore the backup set and remove scaffolded pages, but only when
    /// enabled and the test run failed.
    async fn rollback(
        &self,
        summary: &IntegrationSummary,
        backup: Option<&BackupSet>,
    ) -> StepResult {
        if summary.tests_passed {
            return StepResult::skipped("tests passed");
        }

        if !self.config.integration.rollback_on_test_failure {
            return StepResult::skipped("rollback on test failure is disabled");
        }

        let Some(backup) = backup else {
            return StepResult::failed("no backup set to restore");
        };

        warn!("tests failed: rolling back {}", summary.tag);

        let restored = backup.restore(&self.config.project_root).await;

        for file in summary.created_files.iter() {
            if let Err(e) = fs::remove_file(file).await {
                warn!("failed to remove {}: {}", file.display(), e);
            }
        }

        StepResult::applied(format!(
            "restored {} files, removed {} created files",
            restored.len(),
            summary.created_files.len()
        ))
    }

    /// Read a project file, apply injections and write it back.
    async fn patch_file(
        &self,
        relative: &str,
        injections: &[Injection],
    ) -> Result<StepResult> {
        let content = fs::read_to_string(self.config.resolve(relative)).await?;
        self.patch_content(relative, &content, injections).await
    }

    /// Apply injections to the current `content` of a project file and write
    /// it back. A file whose anchors are all missing is left untouched.
    async fn patch_content(
        &self,
        relative: &str,
        content: &str,
        injections: &[Injection],
    ) -> Result<StepResult> {
        let patched = patch::apply_all(content, injections);

        for anchor_id in patched.missing.iter() {
            warn!("anchor {} not found in {}", anchor_id, relative);
        }

        if !patched.changed() {
            return Ok(StepResult::skipped(format!(
                "{relative}: anchor not found"
            )));
        }

        fs::write(self.config.resolve(relative), patched.content).await?;
        info!("{} updated", relative);

        Ok(StepResult::applied(format!("{relative} updated")))
    }
}

/// Turn a per-file error into a failed result so sibling files proceed.
fn per_file(relative: &str, result: Result<StepResult>) -> StepResult {
    match result {
        Ok(result) => result,
        Err(e) => {
            error!("failed to update {}: {}", relative, e);
            StepResult::failed(format!("{relative}: {e}"))
        }
    }
}

fn record(
    summary: &mut IntegrationSummary,
    step: Step,
    result: Result<StepResult>,
) {
    let result = match result {
        Ok(result) => result,
        Err(e) => StepResult::failed(e.to_string()),
    };

    match result.outcome {
        StepOutcome::Applied => info!("{}: {}", step, result.detail),
        StepOutcome::Skipped => info!("{} skipped: {}", step, result.detail),
        StepOutcome::Failed => error!("{} failed: {}", step, result.detail),
    }

    summary.record(step, result);
}
