pub mod analyzer;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod integrator;
pub mod logging;
pub mod monitor;
pub mod patch;
pub mod process;
pub mod report;
pub mod state;
pub mod tester;
pub mod upstream;

pub use error::{ReleasewatchError, Result};

#[cfg(test)]
pub mod test_helpers;
