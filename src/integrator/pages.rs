//! Page scaffolding, route registration and sidebar navigation.
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::{
    error::Result,
    integrator::{naming, templates},
    patch::{Anchor, Injection},
    report::sanitize_tag,
};

/// Commands containing one of these get a dedicated page.
const PAGE_WORTHY: &[&str] = &[
    "build", "run", "logs", "images", "system", "registry", "network",
];

/// Commands equal to one of these get a sidebar entry.
const MAJOR: &[&str] = &[
    "build", "run", "logs", "images", "system", "registry", "network",
    "volume",
];

static EXPORT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s*\{\s*([^}]*?)\s*\}").unwrap());

pub const NAV_ANCHOR: &str = "</nav>";
pub const NAV_ANCHOR_ID: &str = "sidebar-nav-close";

pub fn is_page_worthy(command: &str) -> bool {
    let command = command.to_lowercase();
    PAGE_WORTHY.iter().any(|k| command.contains(k))
}

pub fn is_major(command: &str) -> bool {
    let command = command.to_lowercase();
    MAJOR.contains(&command.as_str())
}

/// Major commands always get a page so their navigation entry has a target.
pub fn needs_page(command: &str) -> bool {
    is_page_worthy(command) || is_major(command)
}

#[derive(Serialize)]
struct PageContext {
    command: String,
    tag: String,
    page: String,
    method: String,
    args: String,
}

pub fn render_page(command: &str, tag: &str) -> Result<String> {
    let command = naming::display_command(command);
    templates::render(
        templates::PAGE,
        &PageContext {
            page: naming::page_name(&command),
            method: naming::method_name(&command),
            args: naming::js_args(&command),
            tag: sanitize_tag(tag),
            command,
        },
    )
}

/// Add an import for `page` and list it in the first local `export { … }`
/// block. Re-exports (`export { … } from '…'`) are left alone; without a
/// local block a new one is appended. Returns the content unchanged if both
/// are already present.
pub fn register_route(index: &str, page: &str) -> String {
    let import_line = format!("import {page} from './{page}';");

    let mut content = if index.contains(&import_line) {
        index.to_string()
    } else {
        format!("{import_line}\n{index}")
    };

    let local = EXPORT_BLOCK
        .captures_iter(&content)
        .filter_map(|c| Some((c.get(0)?, c.get(1)?)))
        .find(|(block, _)| {
            !content[block.end()..].trim_start().starts_with("from")
        })
        .map(|(block, names)| (block.range(), names.as_str().to_string()));

    let Some((range, names)) = local else {
        if !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&format!("\nexport {{\n  {page}\n}};\n"));
        return content;
    };

    if names.split(',').map(|n| n.trim()).any(|n| n == page) {
        return content;
    }

    let existing = names.trim().trim_end_matches(',').trim_end();
    let rewritten = if existing.is_empty() {
        format!("export {{\n  {page}\n}}")
    } else {
        format!("export {{\n  {existing},\n  {page}\n}}")
    };

    content.replace_range(range, &rewritten);
    content
}

/// Whether the sidebar already links to `route`.
pub fn has_nav_link(sidebar: &str, route: &str) -> bool {
    sidebar.contains(&format!("\"{route}\""))
        || sidebar.contains(&format!("'{route}'"))
}

#[derive(Serialize)]
struct NavContext {
    route: String,
    page: String,
}

pub fn nav_injection(command: &str) -> Result<Injection> {
    let snippet = templates::render(
        templates::NAV_ENTRY,
        &NavContext {
            route: naming::route_path(command),
            page: naming::page_name(command),
        },
    )?;

    Ok(Injection::new(
        NAV_ANCHOR_ID,
        Anchor::LastOccurrence(NAV_ANCHOR.into()),
        snippet,
    )
    .with_suffix("\n      "))
}
