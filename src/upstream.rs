//! Read-only access to the upstream repository's releases.
//!
//! Every fetch degrades to `None` or an empty list on failure so a flaky
//! network only means "no new release this cycle".

/// GitHub REST API client.
pub mod github;

/// Trait abstraction over release sources.
pub mod traits;

/// Release, comparison and readme payloads.
pub mod types;
