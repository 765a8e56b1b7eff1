//! Release-note classification.
//!
//! Splits a release body into lines and runs each non-blank line through an
//! ordered rule table, filling six buckets (features, breaking changes,
//! commands, flags, deprecations, bug fixes). The heuristics are expected to
//! produce false positives; what matters is that the same body always yields
//! the same [`Analysis`].

use log::*;

use crate::upstream::types::Release;

pub mod rules;
pub mod types;

pub use rules::{DEFAULT_RULES, Matcher, Rule, RuleMatch};
pub use types::{Analysis, Bucket};

/// Classifies release notes using a pluggable rule table.
#[derive(Debug, Clone)]
pub struct ReleaseAnalyzer {
    rules: Vec<Rule>,
}

impl Default for ReleaseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseAnalyzer {
    /// Analyzer using [`DEFAULT_RULES`].
    pub fn new() -> Self {
        Self::with_rules(DEFAULT_RULES.clone())
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Classify every line of the release body.
    pub fn analyze(&self, release: &Release) -> Analysis {
        let mut analysis = Analysis::for_release(release);
        let body = release.body.as_deref().unwrap_or_default();

        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.classify_line(line, &mut analysis);
        }

        debug!(
            "analysis for {}: {} features, {} breaking, {} commands, {} flags, {} deprecations, {} fixes",
            analysis.version,
            analysis.features.len(),
            analysis.breaking_changes.len(),
            analysis.commands.len(),
            analysis.flags.len(),
            analysis.deprecations.len(),
            analysis.bug_fixes.len(),
        );

        analysis
    }

    fn classify_line(&self, line: &str, analysis: &mut Analysis) {
        // a line lands in a bucket at most once even if several of that
        // bucket's rules match it
        let mut recorded: Vec<Bucket> = vec![];

        for rule in self.rules.iter() {
            match rule.apply(line) {
                RuleMatch::NoMatch => {}
                RuleMatch::Line => {
                    if !recorded.contains(&rule.bucket) {
                        analysis.bucket_mut(rule.bucket).push(line.into());
                        recorded.push(rule.bucket);
                    }
                }
                RuleMatch::Tokens(tokens) => {
                    for token in tokens {
                        analysis.push_unique(rule.bucket, token);
                    }
                }
                RuleMatch::Mention => analysis.new_command_mentioned = true,
            }
        }
    }
}

#[cfg(test)]
mod tests;
