use serde::Serialize;
use std::{fmt, path::PathBuf};

/// Ordered steps of an integration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Backup,
    UtilsUpdate,
    UiFormUpdate,
    PageScaffold,
    VersionBump,
    ReleaseNotes,
    TestRun,
    Rollback,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Backup => "backup",
            Step::UtilsUpdate => "utils update",
            Step::UiFormUpdate => "UI form update",
            Step::PageScaffold => "page scaffold",
            Step::VersionBump => "version bump",
            Step::ReleaseNotes => "release notes",
            Step::TestRun => "test run",
            Step::Rollback => "rollback",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    Skipped,
    Applied,
    Failed,
}

/// Outcome of one step (or one file within a step) plus a human readable
/// detail line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub outcome: StepOutcome,
    pub detail: String,
}

impl StepResult {
    pub fn applied(detail: impl Into<String>) -> Self {
        Self {
            outcome: StepOutcome::Applied,
            detail: detail.into(),
        }
    }

    pub fn skipped(detail: impl Into<String>) -> Self {
        Self {
            outcome: StepOutcome::Skipped,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            outcome: StepOutcome::Failed,
            detail: detail.into(),
        }
    }

    /// Fold per-file results into one step result. Failed dominates
    /// applied, which dominates skipped.
    pub fn merge(results: Vec<StepResult>) -> Self {
        let outcome = results
            .iter()
            .map(|r| r.outcome)
            .max()
            .unwrap_or(StepOutcome::Skipped);

        let detail = results
            .into_iter()
            .map(|r| r.detail)
            .filter(|d| !d.is_empty())
            .collect::<Vec<String>>()
            .join("; ");

        Self { outcome, detail }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: Step,
    pub outcome: StepOutcome,
    pub detail: String,
}

/// What an integration run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrationSummary {
    pub tag: String,
    pub steps: Vec<StepRecord>,
    pub created_files: Vec<PathBuf>,
    pub tests_passed: bool,
    pub rolled_back: bool,
}

impl IntegrationSummary {
    pub fn record(&mut self, step: Step, result: StepResult) {
        self.steps.push(StepRecord {
            step,
            outcome: result.outcome,
            detail: result.detail,
        });
    }

    pub fn outcome_of(&self, step: Step) -> Option<StepOutcome> {
        self.steps.iter().find(|s| s.step == step).map(|s| s.outcome)
    }

    pub fn failed_steps(&self) -> Vec<Step> {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Failed)
            .map(|s| s.step)
            .collect()
    }
}
