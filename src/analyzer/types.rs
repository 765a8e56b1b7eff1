use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::upstream::types::Release;

/// Legacy marker some reports carry in `commands` instead of
/// `newCommandMentioned`.
pub const LEGACY_NEW_COMMAND_MARKER: &str = "new-command-detected";

/// Output bucket a rule writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    Features,
    BreakingChanges,
    Commands,
    Flags,
    Deprecations,
    BugFixes,
}

/// Structured signals extracted from one release's notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analysis {
    pub version: String,
    pub release_date: Option<DateTime<Utc>>,
    pub is_prerelease: bool,
    pub is_draft: bool,
    pub features: Vec<String>,
    pub breaking_changes: Vec<String>,
    pub commands: Vec<String>,
    pub flags: Vec<String>,
    pub deprecations: Vec<String>,
    pub bug_fixes: Vec<String>,
    /// A line talked about a new command without naming one.
    pub new_command_mentioned: bool,
}

impl Analysis {
    /// Empty analysis carrying the release's identifying metadata.
    pub fn for_release(release: &Release) -> Self {
        Self {
            version: release.tag_name.clone(),
            release_date: release.published_at,
            is_prerelease: release.prerelease,
            is_draft: release.draft,
            ..Self::default()
        }
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<String> {
        match bucket {
            Bucket::Features => &mut self.features,
            Bucket::BreakingChanges => &mut self.breaking_changes,
            Bucket::Commands => &mut self.commands,
            Bucket::Flags => &mut self.flags,
            Bucket::Deprecations => &mut self.deprecations,
            Bucket::BugFixes => &mut self.bug_fixes,
        }
    }

    /// Push unless already present. Returns whether the value was added.
    pub fn push_unique(&mut self, bucket: Bucket, value: String) -> bool {
        let entries = self.bucket_mut(bucket);
        if entries.contains(&value) {
            return false;
        }
        entries.push(value);
        true
    }

    /// Move a legacy marker out of `commands` into the explicit flag.
    pub fn normalize_legacy_marker(&mut self) {
        let before = self.commands.len();
        self.commands.retain(|c| c != LEGACY_NEW_COMMAND_MARKER);
        if self.commands.len() != before {
            self.new_command_mentioned = true;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
            && self.breaking_changes.is_empty()
            && self.commands.is_empty()
            && self.flags.is_empty()
            && self.deprecations.is_empty()
            && self.bug_fixes.is_empty()
    }
}
