use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published upstream release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedCommit {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: String,
}

/// Diff between the compare base and a release tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoComparison {
    pub status: String,
    pub ahead_by: u64,
    pub behind_by: u64,
    pub total_commits: u64,
    pub html_url: String,
    pub commits: Vec<ComparedCommit>,
    pub files: Vec<ChangedFile>,
}

/// Readme payload; `content` is base64 with embedded line breaks.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadmeResponse {
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}
