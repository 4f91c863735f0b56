//! Line splitters for the flat formats: `.env`, `.ini` and `.list`.
//!
//! None of these build nested structure beyond INI sections, so each line is
//! handled on its own with plain trimming.

use crate::diagnostics;
use crate::error::{Result, UniconfError};
use crate::path::{node_for_branch, slot_for_branch, NodePath};
use crate::structural::unquote;
use crate::substitute::substitute_line;
use crate::types::ConfigValue;
use std::io::BufRead;
use std::path::Path;
use tracing::debug;

/// Parse `NAME = value` lines into the branch `branch` under `parent`.
///
/// Lines starting with `#` are comments, and `###` starts a trailing comment.
/// Values are expanded for references, then stripped of one pair of quotes.
/// A repeated name replaces the earlier value. An unterminated reference ends
/// the file at that line with a parse error.
pub fn parse_env_at<R: BufRead>(
    root: &mut ConfigValue,
    parent: &NodePath,
    branch: &str,
    input: R,
) -> Result<usize> {
    let node = node_for_branch(root, parent, branch)?;
    let mut count = 0;
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((name, value)) = split_assignment(trimmed) else {
            debug!(line = trimmed, "skipping env line without assignment");
            continue;
        };
        let value = cut_comment(value, "###");
        let expanded = substitute_line(root, value, idx + 1)?;
        set(root, &node, name, unquote(&expanded))?;
        count += 1;
    }
    Ok(count)
}

/// Parse an INI file into the branch `branch` under `parent`.
///
/// `[section]` opens an object child of the branch (`[]` returns to the branch
/// itself). `key = value` lines land in the current section; `//` after whitespace
/// and `##` start trailing comments; `#` and `;` lines are comments. A section
/// header without `]` is recorded against `origin` and skipped.
pub fn parse_ini_at<R: BufRead>(
    root: &mut ConfigValue,
    parent: &NodePath,
    branch: &str,
    input: R,
    origin: &Path,
) -> Result<usize> {
    let file_node = node_for_branch(root, parent, branch)?;
    let mut section = file_node.clone();
    let mut count = 0;
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('[') {
            match header.find(']') {
                Some(end) => section = node_for_branch(root, &file_node, header[..end].trim())?,
                None => diagnostics::failure_in_file(root, origin, idx + 1, "section name error"),
            }
            continue;
        }

        let Some((name, value)) = split_assignment(trimmed) else {
            debug!(line = trimmed, "skipping ini line without assignment");
            continue;
        };
        let value = cut_comment(cut_slash_comment(value), "##");
        let expanded = substitute_line(root, value, idx + 1)?;
        set(root, &section, name, unquote(&expanded))?;
        count += 1;
    }
    Ok(count)
}

/// Parse a `.list` file: one string per line, appended to an array branch.
///
/// A `[` on the first line opens a nested array that receives the lines. Other
/// lines starting with `[`, `]` or `#` are skipped. Values are unquoted but not
/// expanded.
pub fn parse_list_at<R: BufRead>(
    root: &mut ConfigValue,
    parent: &NodePath,
    branch: &str,
    input: R,
) -> Result<usize> {
    let mut target = slot_for_branch(root, parent, branch)?;
    array_at(root, &target)?;

    let mut count = 0;
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let value = unquote(line.trim());
        if value.is_empty() {
            continue;
        }
        if idx == 0 && value.starts_with('[') {
            let items = array_at(root, &target)?;
            items.push(ConfigValue::Array(Vec::new()));
            target = target.child_index(items.len() - 1);
            continue;
        }
        if value.starts_with(['[', ']', '#']) {
            continue;
        }
        array_at(root, &target)?.push(ConfigValue::from(value));
        count += 1;
    }
    Ok(count)
}

fn array_at<'a>(root: &'a mut ConfigValue, handle: &NodePath) -> Result<&'a mut Vec<ConfigValue>> {
    handle
        .get_mut(root)
        .ok_or_else(|| UniconfError::NotFound(handle.display()))?
        .as_array_mut_or_init()
}

/// Insert or replace `name` in the object at `node`.
fn set(root: &mut ConfigValue, node: &NodePath, name: &str, value: &str) -> Result<()> {
    if diagnostics::is_reserved(node, name) {
        return Err(UniconfError::Reserved(name.to_string()));
    }
    node.get_mut(root)
        .ok_or_else(|| UniconfError::NotFound(node.display()))?
        .as_object_mut_or_init()?
        .insert(name.to_string(), ConfigValue::from(value));
    Ok(())
}

/// Split `name = value` at the first `=`. The name must be a single word.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once('=')?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, value.trim()))
}

fn cut_comment<'a>(value: &'a str, marker: &str) -> &'a str {
    match value.find(marker) {
        Some(pos) => value[..pos].trim_end(),
        None => value,
    }
}

/// `//` comments only count at the start or after whitespace, so URLs survive.
fn cut_slash_comment(value: &str) -> &str {
    if value.starts_with("//") {
        return "";
    }
    let mut search = 0;
    while let Some(pos) = value[search..].find("//") {
        let at = search + pos;
        if value[..at].ends_with(char::is_whitespace) {
            return value[..at].trim_end();
        }
        search = at + 2;
    }
    value
}
