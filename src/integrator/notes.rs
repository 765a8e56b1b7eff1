use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::{error::Result, integrator::templates, report::Report};

#[derive(Serialize)]
struct NotesContext<'a> {
    tag: &'a str,
    url: &'a str,
    date: String,
    generated_at: String,
    features: &'a [String],
    commands: &'a [String],
    flags: &'a [String],
    breaking_changes: &'a [String],
    bug_fixes: &'a [String],
}

/// Render `RELEASE_NOTES.md` for a report.
pub fn render_release_notes(report: &Report, now: DateTime<Utc>) -> Result<String> {
    let analysis = &report.analysis;

    templates::render(
        templates::RELEASE_NOTES,
        &NotesContext {
            tag: &report.release.tag,
            url: &report.release.url,
            date: now.format("%Y-%m-%d").to_string(),
            generated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            features: &analysis.features,
            commands: &analysis.commands,
            flags: &analysis.flags,
            breaking_changes: &analysis.breaking_changes,
            bug_fixes: &analysis.bug_fixes,
        },
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{analyzer::Analysis, report::ReleaseSummary};

    fn report(analysis: Analysis) -> Report {
        Report {
            timestamp: Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap(),
            release: ReleaseSummary {
                tag: "v0.3.0".into(),
                url: "https://github.com/apple/container/releases/tag/v0.3.0"
                    .into(),
                ..ReleaseSummary::default()
            },
            analysis,
            recommendations: vec![],
            integration_tasks: vec![],
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 2, 8, 30, 0).unwrap()
    }

    #[test]
    fn renders_fallback_lines_for_empty_sections() {
        let notes =
            render_release_notes(&report(Analysis::default()), now()).unwrap();

        assert!(notes.starts_with("# Container GUI Release Notes\n"));
        assert!(notes.contains("**Release Date:** 2025-07-02\n"));
        assert!(notes.contains(
            "### 🎉 New Features Added\n\n- Updated compatibility with latest Apple Container CLI\n\n### 🔧"
        ));
        assert!(notes.contains("- No new commands in this release\n"));
        assert!(notes.contains("- No new flags in this release\n"));
        assert!(notes.contains("- No breaking changes in this release\n"));
        assert!(notes.contains("- General stability improvements\n"));
        assert!(notes.contains("*Generated on: 2025-07-02T08:30:00.000Z*"));
    }

    #[test]
    fn renders_bullets_for_populated_sections() {
        let analysis = Analysis {
            features: vec!["Added volumes".into(), "Faster pulls".into()],
            commands: vec!["volume".into()],
            flags: vec!["--driver".into()],
            ..Analysis::default()
        };

        let notes = render_release_notes(&report(analysis), now()).unwrap();

        assert!(notes.contains(
            "### 🎉 New Features Added\n\n- Added volumes\n- Faster pulls\n\n### 🔧 New Commands Supported\n\n- `container volume`\n\n### 🚩"
        ));
        assert!(notes.contains("- `--driver`\n"));
        assert!(!notes.contains("No new commands"));
    }
}
