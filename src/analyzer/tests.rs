//! Tests for release-note classification.
use chrono::{TimeZone, Utc};

use super::*;

fn release_with_body(tag: &str, body: &str) -> Release {
    Release {
        id: 7,
        tag_name: tag.into(),
        name: Some(format!("container {tag}")),
        published_at: Some(Utc.with_ymd_and_hms(2025, 6, 9, 18, 0, 0).unwrap()),
        body: Some(body.into()),
        prerelease: false,
        draft: false,
        html_url: format!("https://github.com/apple/container/releases/tag/{tag}"),
    }
}

#[test]
fn volume_release_scenario() {
    let line = "`container volume` is now supported with `--driver` flag (✨ new feature)";
    let release = release_with_body("v0.3.0", line);

    let analysis = ReleaseAnalyzer::new().analyze(&release);

    assert_eq!(analysis.version, "v0.3.0");
    assert_eq!(analysis.commands, vec!["volume"]);
    assert_eq!(analysis.flags, vec!["--driver"]);
    assert_eq!(analysis.features, vec![line]);
    assert!(analysis.breaking_changes.is_empty());
    assert!(analysis.deprecations.is_empty());
    assert!(!analysis.new_command_mentioned);
}

#[test]
fn unrecognized_body_yields_empty_buckets() {
    let release = release_with_body(
        "0.2.1",
        "Thanks to all contributors.\n\nSee the docs for details.",
    );

    let analysis = ReleaseAnalyzer::new().analyze(&release);

    assert!(analysis.is_empty());
    assert!(!analysis.new_command_mentioned);
}

#[test]
fn missing_body_yields_empty_analysis_with_metadata() {
    let mut release = release_with_body("0.1.0", "");
    release.body = None;
    release.prerelease = true;

    let analysis = ReleaseAnalyzer::new().analyze(&release);

    assert!(analysis.is_empty());
    assert!(analysis.is_prerelease);
    assert_eq!(analysis.release_date, release.published_at);
}

#[test]
fn analysis_is_deterministic() {
    let body = "## Changes\n\
        - Added `container network create` (#12)\n\
        - BREAKING: `container ls` output changed\n\
        - Fixed crash with --memory and --cpus\n\
        - Deprecated --legacy\n";
    let release = release_with_body("0.4.0", body);
    let analyzer = ReleaseAnalyzer::new();

    let first = analyzer.analyze(&release);
    let second = analyzer.analyze(&release);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn one_line_can_fill_several_buckets() {
    let line = "- Fixed and removed the broken --legacy flag from container build";
    let release = release_with_body("0.5.0", line);

    let analysis = ReleaseAnalyzer::new().analyze(&release);

    assert_eq!(analysis.bug_fixes, vec![line.trim()]);
    assert_eq!(analysis.deprecations, vec![line.trim()]);
    assert_eq!(analysis.flags, vec!["--legacy"]);
    assert_eq!(analysis.commands, vec!["build"]);
}

#[test]
fn line_recorded_once_per_bucket() {
    // matches all three feature rules
    let line = "feat: ✨ new thing";
    let release = release_with_body("0.5.0", line);

    let analysis = ReleaseAnalyzer::new().analyze(&release);

    assert_eq!(analysis.features, vec![line]);
}

#[test]
fn commands_and_flags_are_deduplicated_in_first_seen_order() {
    let body = "container run --rm\n\
        `container run` gets --rm and --env\n\
        container logs --follow\n\
        container run --env again";
    let release = release_with_body("0.6.0", body);

    let analysis = ReleaseAnalyzer::new().analyze(&release);

    assert_eq!(analysis.commands, vec!["run", "logs"]);
    assert_eq!(analysis.flags, vec!["--rm", "--env", "--follow"]);
}

#[test]
fn generic_command_mention_sets_flag_not_command() {
    let body = "A new experimental command for stats\nAnother new command";
    let release = release_with_body("0.7.0", body);

    let analysis = ReleaseAnalyzer::new().analyze(&release);

    assert!(analysis.new_command_mentioned);
    assert!(analysis.commands.is_empty());
}

#[test]
fn blank_and_whitespace_lines_are_skipped() {
    let body = "   \n\t\n  - Added --dns  \r\n";
    let release = release_with_body("0.8.0", body);

    let analysis = ReleaseAnalyzer::new().analyze(&release);

    assert_eq!(analysis.features, vec!["- Added --dns"]);
    assert_eq!(analysis.flags, vec!["--dns"]);
}

#[test]
fn custom_rule_table_is_honored() {
    let rules = vec![Rule::line(Bucket::Deprecations, r"(?i)sunset").unwrap()];
    let release = release_with_body("0.9.0", "Sunset of the old API\nAdded x");

    let analysis = ReleaseAnalyzer::with_rules(rules).analyze(&release);

    assert_eq!(analysis.deprecations, vec!["Sunset of the old API"]);
    assert!(analysis.features.is_empty());
}
