//! Classification rules applied to each release-note line.
use regex::Regex;
use std::sync::LazyLock;

use crate::{analyzer::types::Bucket, error::Result};

/// How a rule extracts data from a matching line.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Record the whole trimmed line.
    Line(Regex),
    /// Record every first capture group with `prefix` prepended.
    Capture { regex: Regex, prefix: &'static str },
    /// Note that the line mentions something without naming it.
    Mention(Regex),
}

/// Result of testing one rule against one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    NoMatch,
    Line,
    Tokens(Vec<String>),
    Mention,
}

/// A single `{predicate, bucket}` entry of the classification table.
#[derive(Debug, Clone)]
pub struct Rule {
    pub bucket: Bucket,
    pub matcher: Matcher,
}

impl Rule {
    pub fn line(bucket: Bucket, pattern: &str) -> Result<Self> {
        Ok(Self {
            bucket,
            matcher: Matcher::Line(Regex::new(pattern)?),
        })
    }

    pub fn capture(
        bucket: Bucket,
        pattern: &str,
        prefix: &'static str,
    ) -> Result<Self> {
        Ok(Self {
            bucket,
            matcher: Matcher::Capture {
                regex: Regex::new(pattern)?,
                prefix,
            },
        })
    }

    pub fn mention(bucket: Bucket, pattern: &str) -> Result<Self> {
        Ok(Self {
            bucket,
            matcher: Matcher::Mention(Regex::new(pattern)?),
        })
    }

    /// Test the rule against an already trimmed line.
    pub fn apply(&self, line: &str) -> RuleMatch {
        match &self.matcher {
            Matcher::Line(regex) => {
                if regex.is_match(line) {
                    RuleMatch::Line
                } else {
                    RuleMatch::NoMatch
                }
            }
            Matcher::Capture { regex, prefix } => {
                let tokens = regex
                    .captures_iter(line)
                    .filter_map(|c| c.get(1))
                    .map(|m| normalize_token(m.as_str()))
                    .filter(|t| !t.is_empty())
                    .map(|t| format!("{prefix}{t}"))
                    .collect::<Vec<String>>();

                if tokens.is_empty() {
                    RuleMatch::NoMatch
                } else {
                    RuleMatch::Tokens(tokens)
                }
            }
            Matcher::Mention(regex) => {
                if regex.is_match(line) {
                    RuleMatch::Mention
                } else {
                    RuleMatch::NoMatch
                }
            }
        }
    }
}

/// Collapse inner whitespace and drop trailing dashes left by the flag
/// pattern (e.g. "--foo-" at the end of a sentence).
fn normalize_token(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .trim_end_matches('-')
        .to_string()
}

// FEATURES
const FEATURE_WORDS: &str = r"(?i)new|added|feature|implement|introduce";
const FEATURE_EMOJI: &str = r"✨|🎉|🚀|⭐";
const FEATURE_PREFIX: &str = r"(?i)feat(?:ure)?[:\s]";

// BREAKING
const BREAKING_PHRASE: &str = r"(?i)breaking.{0,10}change";
const BREAKING_EMOJI: &str = r"💥|⚠️|🚨";
const BREAKING_PREFIX: &str = r"(?i)breaking[:\s]";

// COMMANDS
const COMMAND_WORD: &str = r"container\s+([A-Za-z0-9_]+)";
const COMMAND_QUOTED: &str = r"`container\s+([^`]+)`";
const COMMAND_MENTION: &str = r"(?i)new.{0,20}command";

// FLAGS
const FLAG_TOKEN: &str = r"--([A-Za-z0-9][A-Za-z0-9_-]*)";

// DEPRECATIONS
const DEPRECATION_WORDS: &str = r"(?i)deprecat|remov|discontinu";

// BUG FIXES
const BUG_FIX_WORDS: &str = r"(?i)fix|bug|resolve";
const BUG_FIX_EMOJI: &str = r"🐛|🔧";

/// Rule table used by [`crate::analyzer::ReleaseAnalyzer::new`].
pub static DEFAULT_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::line(Bucket::Features, FEATURE_WORDS),
        Rule::line(Bucket::Features, FEATURE_EMOJI),
        Rule::line(Bucket::Features, FEATURE_PREFIX),
        Rule::line(Bucket::BreakingChanges, BREAKING_PHRASE),
        Rule::line(Bucket::BreakingChanges, BREAKING_EMOJI),
        Rule::line(Bucket::BreakingChanges, BREAKING_PREFIX),
        Rule::capture(Bucket::Commands, COMMAND_WORD, ""),
        Rule::capture(Bucket::Commands, COMMAND_QUOTED, ""),
        Rule::mention(Bucket::Commands, COMMAND_MENTION),
        Rule::capture(Bucket::Flags, FLAG_TOKEN, "--"),
        Rule::line(Bucket::Deprecations, DEPRECATION_WORDS),
        Rule::line(Bucket::BugFixes, BUG_FIX_WORDS),
        Rule::line(Bucket::BugFixes, BUG_FIX_EMOJI),
    ]
    .into_iter()
    .map(|rule| rule.unwrap())
    .collect()
});
