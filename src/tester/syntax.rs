//! JavaScript/JSX syntax validation via tree-sitter. Sources are parsed,
//! never executed.
use std::fmt;
use tree_sitter::{Node, Parser};

use crate::error::{ReleasewatchError, Result};

/// Location and kind of the first syntax error in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    pub missing: bool,
    pub kind: String,
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.missing {
            write!(
                f,
                "missing {} at line {}, column {}",
                self.kind, self.line, self.column
            )
        } else {
            write!(
                f,
                "unexpected input at line {}, column {}",
                self.line, self.column
            )
        }
    }
}

/// Parse `source` as JavaScript (JSX included) and report the first error
/// node, if any.
pub fn first_syntax_issue(source: &str) -> Result<Option<SyntaxIssue>> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_javascript::LANGUAGE.into())
        .map_err(|e| ReleasewatchError::SyntaxError(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or_else(|| {
        ReleasewatchError::SyntaxError("parser produced no tree".into())
    })?;

    let root = tree.root_node();
    if !root.has_error() {
        return Ok(None);
    }

    let node = find_error(root).unwrap_or(root);
    let at = node.start_position();

    Ok(Some(SyntaxIssue {
        line: at.row + 1,
        column: at.column + 1,
        missing: node.is_missing(),
        kind: node.kind().to_string(),
    }))
}

/// Fail with [`ReleasewatchError::SyntaxError`] if `source` does not parse.
pub fn check_source(source: &str) -> Result<()> {
    match first_syntax_issue(source)? {
        None => Ok(()),
        Some(issue) => Err(ReleasewatchError::SyntaxError(issue.to_string())),
    }
}

fn find_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    let children = node.children(&mut cursor).collect::<Vec<Node<'_>>>();

    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(find_error)
}
