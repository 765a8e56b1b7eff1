use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Passed,
    Failed,
}

/// Outcome of one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    /// Milliseconds.
    pub duration: u64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Sum of check durations in milliseconds.
    pub duration: u64,
}

impl TestSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let passed = results
            .iter()
            .filter(|r| r.status == TestStatus::Passed)
            .count();

        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration: results.iter().map(|r| r.duration).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEnvironment {
    pub version: String,
    pub platform: String,
    pub arch: String,
}

impl TestEnvironment {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// Contents of `reports/test-report.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    pub timestamp: DateTime<Utc>,
    pub summary: TestSummary,
    pub tests: Vec<TestResult>,
    pub environment: TestEnvironment,
}

impl TestReport {
    pub fn new(tests: Vec<TestResult>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            summary: TestSummary::from_results(&tests),
            tests,
            environment: TestEnvironment::current(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.summary.failed == 0
    }

    pub fn result(&self, name: &str) -> Option<&TestResult> {
        self.tests.iter().find(|t| t.name == name)
    }
}
