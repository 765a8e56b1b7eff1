//! Release reports: a release summary, its analysis, and rule-based
//! recommendations. Reports are written once and never modified.
use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
};

use crate::{
    analyzer::Analysis,
    error::{ReleasewatchError, Result},
    upstream::types::Release,
};

/// Subset of the release embedded in a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseSummary {
    pub tag: String,
    pub name: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub url: String,
    pub prerelease: bool,
}

impl From<&Release> for ReleaseSummary {
    fn from(release: &Release) -> Self {
        Self {
            tag: release.tag_name.clone(),
            name: release.name.clone(),
            published: release.published_at,
            url: release.html_url.clone(),
            prerelease: release.prerelease,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub timestamp: DateTime<Utc>,
    pub release: ReleaseSummary,
    pub analysis: Analysis,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub integration_tasks: Vec<String>,
}

/// One independent recommendation rule.
struct Recommendation {
    applies: fn(&Analysis) -> bool,
    recommendation: &'static str,
    task: &'static str,
}

const RECOMMENDATIONS: &[Recommendation] = &[
    Recommendation {
        applies: |a| !a.commands.is_empty(),
        recommendation: "Update CLI command mappings in containerUtils.js",
        task: "Add new command support to Tauri backend",
    },
    Recommendation {
        applies: |a| !a.flags.is_empty(),
        recommendation: "Add new flags to UI forms and command builders",
        task: "Update form validation and option handling",
    },
    Recommendation {
        applies: |a| !a.features.is_empty(),
        recommendation: "Review features for potential UI integration",
        task: "Plan new UI components for enhanced features",
    },
    Recommendation {
        applies: |a| !a.breaking_changes.is_empty(),
        recommendation: "URGENT: Review breaking changes for compatibility",
        task: "Update command syntax and error handling",
    },
];

pub struct ReportBuilder;

impl ReportBuilder {
    /// Build a report stamped with the current time.
    pub fn generate_release_report(
        release: &Release,
        analysis: &Analysis,
    ) -> Report {
        Self::generate_at(release, analysis, Utc::now())
    }

    pub fn generate_at(
        release: &Release,
        analysis: &Analysis,
        now: DateTime<Utc>,
    ) -> Report {
        let mut report = Report {
            timestamp: now,
            release: ReleaseSummary::from(release),
            analysis: analysis.clone(),
            recommendations: vec![],
            integration_tasks: vec![],
        };

        for rule in RECOMMENDATIONS.iter().filter(|r| (r.applies)(analysis)) {
            report.recommendations.push(rule.recommendation.into());
            report.integration_tasks.push(rule.task.into());
        }

        report
    }
}

/// Persist a report as `release-{tag}-{epoch_millis}.json` under
/// `reports_dir`. Fails instead of overwriting an existing artifact.
pub async fn save_report(
    reports_dir: &Path,
    report: &Report,
) -> Result<PathBuf> {
    fs::create_dir_all(reports_dir).await?;

    let file_name = format!(
        "release-{}-{}.json",
        sanitize_tag(&report.release.tag),
        Utc::now().timestamp_millis()
    );
    let path = reports_dir.join(file_name);

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await?;

    file.write_all(serde_json::to_string_pretty(report)?.as_bytes())
        .await?;
    file.flush().await?;

    info!("release report saved: {}", path.display());

    Ok(path)
}

/// Load a report from a file path or an inline JSON document.
pub async fn load_report(arg: &str) -> Result<Report> {
    let trimmed = arg.trim();

    let content = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        let path = Path::new(trimmed);
        let is_file = fs::metadata(path).await.is_ok_and(|m| m.is_file());
        if !is_file {
            return Err(ReleasewatchError::invalid_report(format!(
                "{} is neither inline JSON nor a report file",
                trimmed
            )));
        }
        fs::read_to_string(path).await?
    };

    let mut report: Report = serde_json::from_str(&content)?;
    report.analysis.normalize_legacy_marker();

    if report.release.tag.is_empty() {
        return Err(ReleasewatchError::invalid_report("release tag is empty"));
    }

    Ok(report)
}

/// Tags end up in file and directory names.
pub fn sanitize_tag(tag: &str) -> String {
    tag.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
