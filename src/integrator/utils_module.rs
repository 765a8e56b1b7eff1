//! Generated methods for the container utility module.
use serde::Serialize;

use crate::{
    analyzer::Analysis,
    error::Result,
    integrator::{naming, templates},
    patch::{Anchor, Injection},
};

/// Generated members are spliced before the object's closing `};`.
pub const CLOSING_ANCHOR: &str = "};";
pub const ANCHOR_ID: &str = "utils-module-close";

#[derive(Serialize)]
struct MethodContext {
    command: String,
    method: String,
    args: String,
}

#[derive(Serialize)]
struct ValidationContext<'a> {
    tag: &'a str,
    flags: &'a [String],
}

/// Comment heading the generated method for `command`.
pub fn method_marker(command: &str) -> String {
    format!("// Auto-generated support for container {command}")
}

/// Comment heading the generated `validateFlags` member for `tag`.
pub fn validation_marker(tag: &str) -> String {
    format!("// Auto-generated flag validation for {tag}")
}

/// Markers are matched as whole lines: `container volume` must not match
/// the marker of `container volume create`.
fn has_marker(existing: &str, marker: &str) -> bool {
    existing.lines().any(|line| line.trim() == marker)
}

/// One method stub per command, then a `validateFlags` member when flags
/// were found. Members whose marker already appears in `existing` are left
/// out, so empty when the analysis has nothing new for the module.
pub fn injections(
    analysis: &Analysis,
    tag: &str,
    existing: &str,
) -> Result<Vec<Injection>> {
    let mut injections = vec![];

    let commands = analysis
        .commands
        .iter()
        .filter(|c| !has_marker(existing, &method_marker(c)))
        .collect::<Vec<&String>>();

    if !commands.is_empty() {
        let mut snippet = String::new();
        for command in commands {
            snippet.push_str(&templates::render(
                templates::UTILS_METHOD,
                &MethodContext {
                    command: command.clone(),
                    method: naming::method_name(command),
                    args: naming::js_args(command),
                },
            )?);
        }
        injections.push(closing(snippet));
    }

    if !analysis.flags.is_empty()
        && !has_marker(existing, &validation_marker(tag))
    {
        let snippet = templates::render(
            templates::FLAG_VALIDATION,
            &ValidationContext {
                tag,
                flags: &analysis.flags,
            },
        )?;
        injections.push(closing(snippet));
    }

    Ok(injections)
}

fn closing(snippet: String) -> Injection {
    Injection::new(
        ANCHOR_ID,
        Anchor::LastOccurrence(CLOSING_ANCHOR.into()),
        snippet,
    )
}
