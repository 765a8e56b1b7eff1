//! Anchor-based text splicing.
//!
//! Generated code is described as data ([`Injection`]) and spliced into
//! source text immediately before an anchor. A missing anchor is a normal
//! outcome, never an error, and leaves the text untouched.
use regex::Regex;

/// Where in the text a snippet is inserted.
#[derive(Debug, Clone)]
pub enum Anchor {
    /// Before the last occurrence of a literal string.
    LastOccurrence(String),
    /// Before the first match of a pattern.
    FirstMatch(Regex),
}

impl Anchor {
    /// Byte offset of the insertion point, if the anchor exists.
    pub fn locate(&self, content: &str) -> Option<usize> {
        match self {
            Anchor::LastOccurrence(literal) => content.rfind(literal.as_str()),
            Anchor::FirstMatch(regex) => regex.find(content).map(|m| m.start()),
        }
    }
}

/// One snippet to splice before an anchor.
#[derive(Debug, Clone)]
pub struct Injection {
    /// Stable name used in logs and outcomes.
    pub anchor_id: String,
    pub anchor: Anchor,
    pub snippet: String,
    /// Text placed between the snippet and the anchor.
    pub suffix: String,
}

impl Injection {
    pub fn new(
        anchor_id: impl Into<String>,
        anchor: Anchor,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            anchor_id: anchor_id.into(),
            anchor,
            snippet: snippet.into(),
            suffix: String::new(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied(String),
    AnchorNotFound { anchor_id: String },
}

/// Splice one injection into `content`.
pub fn apply(content: &str, injection: &Injection) -> PatchOutcome {
    let Some(at) = injection.anchor.locate(content) else {
        return PatchOutcome::AnchorNotFound {
            anchor_id: injection.anchor_id.clone(),
        };
    };

    let mut patched = String::with_capacity(
        content.len() + injection.snippet.len() + injection.suffix.len(),
    );
    patched.push_str(&content[..at]);
    patched.push_str(&injection.snippet);
    patched.push_str(&injection.suffix);
    patched.push_str(&content[at..]);

    PatchOutcome::Applied(patched)
}

/// Result of applying several injections in sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub content: String,
    pub applied: Vec<String>,
    pub missing: Vec<String>,
}

impl PatchReport {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Apply injections one after another, each against the output of the
/// previous one. Missing anchors are recorded and skipped.
pub fn apply_all(content: &str, injections: &[Injection]) -> PatchReport {
    let mut report = PatchReport {
        content: content.to_string(),
        applied: vec![],
        missing: vec![],
    };

    for injection in injections {
        match apply(&report.content, injection) {
            PatchOutcome::Applied(patched) => {
                report.content = patched;
                report.applied.push(injection.anchor_id.clone());
            }
            PatchOutcome::AnchorNotFound { anchor_id } => {
                report.missing.push(anchor_id)
            }
        }
    }

    report
}
