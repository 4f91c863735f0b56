//! Structural parser for the YAML-like indentation format (`.yml` / `.yaml`).
//!
//! The parser reads one line at a time with no lookahead. Indentation (leading
//! spaces) is the only structural signal, tracked with a classic indentation stack:
//!
//! - each frame is `(indent, handle of the node receiving lines at that indent)`;
//! - a line indented like the top frame writes into that frame's node;
//! - a deeper line opens a frame on the node created by the previous line;
//! - a shallower line pops frames until one with exactly the same indent is found,
//!   and fails if there is none.
//!
//! Nodes are typed lazily. A `key:` written to an untyped placeholder makes it an
//! object, a `- item` makes it an array, and from then on the other kind of line is
//! a structural error. Every scalar is expanded for `$(...)` references against the
//! tree root and stored as a string.
//!
//! # Key design decisions
//!
//! - **Handles, not references**: frames hold [`NodePath`]s, which are re-walked on
//!   each write. The tree stays the single owner of every node.
//! - **Compact items**: `- name: x` and `- - x` append a placeholder and then parse
//!   the payload at its own column, so following lines aligned with the payload keep
//!   extending the same node.
//! - **Partial results**: the first failing line aborts the rest of the input, but
//!   every line applied before it stays in the tree.
//! - **Quoting**: a scalar or key wrapped in matching `"` or `'` loses the quotes;
//!   `#` and `: ` inside them are literal. There is no escape processing, and flow
//!   collections (`[a, b]`, `{a: b}`) are kept as plain strings.

use crate::diagnostics;
use crate::error::{Result, UniconfError};
use crate::path::{slot_for_branch, NodePath};
use crate::substitute::{expand, Unresolved};
use crate::types::ConfigValue;
use std::io::BufRead;
use tracing::debug;

/// Parse structural input into the branch `branch` of the root.
///
/// Returns the number of entries and items written. On failure the error names
/// the offending line; lines before it remain applied.
pub fn parse_structural<R: BufRead>(root: &mut ConfigValue, branch: &str, input: R) -> Result<usize> {
    parse_structural_at(root, &NodePath::root(), branch, input)
}

/// Like [`parse_structural`], with the branch created under `parent`.
pub fn parse_structural_at<R: BufRead>(
    root: &mut ConfigValue,
    parent: &NodePath,
    branch: &str,
    input: R,
) -> Result<usize> {
    let base = slot_for_branch(root, parent, branch)?;
    let mut parser = StructuralParser::new(root, base, true);
    let outcome = parser.feed_all(input);
    let (written, warnings) = parser.finish();
    for (line, unresolved) in warnings {
        diagnostics::warning(root, format!("line {}: {}", line, unresolved));
    }
    outcome.map(|_| written)
}

/// Decode a standalone structural document into a value.
///
/// References resolve against the document itself; unresolved ones are left in
/// place without being recorded anywhere, and an unterminated one is a parse
/// error. An empty document decodes to an empty object.
///
/// ```
/// use uniconf_core::{decode, ConfigValue};
/// let value = decode("items:\n  - one\n  - two").unwrap();
/// assert_eq!(value.to_json(), serde_json::json!({"items": ["one", "two"]}));
/// ```
pub fn decode(text: &str) -> Result<ConfigValue> {
    let mut root = ConfigValue::Null;
    let mut parser = StructuralParser::new(&mut root, NodePath::root(), false);
    let outcome = parser.feed_all(text.as_bytes());
    parser.finish();
    outcome.map(|_| root)
}

/// One level of the indentation stack.
#[derive(Debug, Clone)]
struct Frame {
    indent: usize,
    node: NodePath,
    /// A sequence written at the same indent as its parent key (`key:` then
    /// `- item` in the same column). It closes at the first non-item line.
    indentless: bool,
}

/// A classified, comment-free line (or compact item payload).
#[derive(Debug)]
enum Line<'a> {
    /// `- payload`. `offset` is the payload's column relative to the dash.
    Item { payload: &'a str, offset: usize },
    /// `key: value`, value possibly empty.
    Entry { key: &'a str, value: &'a str },
}

struct StructuralParser<'t> {
    root: &'t mut ConfigValue,
    base: NodePath,
    frames: Vec<Frame>,
    /// Node created by the previous line; a deeper line nests under it.
    last_created: Option<NodePath>,
    started: bool,
    /// Refuse the root `errors` key; off for standalone documents.
    guard_errors: bool,
    written: usize,
    warnings: Vec<(usize, Unresolved)>,
}

impl<'t> StructuralParser<'t> {
    fn new(root: &'t mut ConfigValue, base: NodePath, guard_errors: bool) -> Self {
        Self {
            root,
            frames: vec![Frame {
                indent: 0,
                node: base.clone(),
                indentless: false,
            }],
            base,
            last_created: None,
            started: false,
            guard_errors,
            written: 0,
            warnings: Vec::new(),
        }
    }

    fn feed_all<R: BufRead>(&mut self, input: R) -> Result<()> {
        for (idx, line) in input.lines().enumerate() {
            self.feed(idx + 1, &line?)?;
        }
        Ok(())
    }

    /// Type a still-untyped branch as an empty object and hand back the count and
    /// the collected reference warnings.
    fn finish(self) -> (usize, Vec<(usize, Unresolved)>) {
        if let Some(node) = self.base.get_mut(&mut *self.root) {
            if node.is_null() {
                *node = ConfigValue::object();
            }
        }
        (self.written, self.warnings)
    }

    fn feed(&mut self, line_no: usize, raw: &str) -> Result<()> {
        let indent = raw.len() - raw.trim_start_matches(' ').len();
        let rest = &raw[indent..];
        let content = strip_comment(rest);
        if content.is_empty() {
            return Ok(());
        }
        if rest.starts_with('\t') {
            return Err(parse_error(line_no, "tab character in indentation"));
        }
        if indent == 0 && (content == "---" || content == "...") {
            return Ok(());
        }
        if !self.started {
            if indent != 0 {
                return Err(parse_error(line_no, "first line must not be indented"));
            }
            self.started = true;
        }

        self.align(line_no, indent, is_item(content))?;
        self.apply(line_no, indent, content)
    }

    /// Bring the stack top to a frame whose indent equals `indent`.
    fn align(&mut self, line_no: usize, indent: usize, item: bool) -> Result<()> {
        let top = self.top().indent;
        if indent > top {
            let node = self
                .last_created
                .take()
                .ok_or_else(|| parse_error(line_no, "unexpected indentation"))?;
            let nestable = node.get(&*self.root).is_some_and(ConfigValue::is_container);
            if !nestable {
                return Err(parse_error(line_no, "cannot nest under a scalar value"));
            }
            self.frames.push(Frame {
                indent,
                node,
                indentless: false,
            });
            return Ok(());
        }

        while self.frames.len() > 1 {
            let top = self.top();
            let closes_indentless = top.indent == indent && top.indentless && !item;
            if top.indent <= indent && !closes_indentless {
                break;
            }
            self.frames.pop();
        }
        if self.top().indent != indent {
            return Err(parse_error(
                line_no,
                "indentation does not match any enclosing level",
            ));
        }
        if item {
            self.open_indentless();
        }
        Ok(())
    }

    /// An item arriving in the column of an object's keys belongs to the key the
    /// previous line opened, if that key is still a placeholder or an array.
    fn open_indentless(&mut self) {
        let top = self.top();
        if top.indentless {
            return;
        }
        let Some(last) = self.last_created.as_ref() else {
            return;
        };
        if last.parent().as_ref() != Some(&top.node) {
            return;
        }
        let opens = matches!(
            last.get(&*self.root),
            Some(ConfigValue::Null | ConfigValue::Array(_))
        );
        if opens {
            let frame = Frame {
                indent: top.indent,
                node: last.clone(),
                indentless: true,
            };
            self.frames.push(frame);
            self.last_created = None;
        }
    }

    /// Write one line (or compact payload) at column `indent` into the top frame.
    fn apply(&mut self, line_no: usize, indent: usize, content: &str) -> Result<()> {
        let target = self.top().node.clone();
        match classify(content).ok_or_else(|| {
            parse_error(line_no, "expected 'key: value' or '- item'")
        })? {
            Line::Item { payload, offset } => {
                let scalar = if payload.is_empty() || is_structural(payload) {
                    None
                } else {
                    Some(self.scalar(line_no, payload)?)
                };

                let items = self
                    .node_mut(&target)?
                    .as_array_mut_or_init()
                    .map_err(|err| parse_error(line_no, err.to_string()))?;
                items.push(scalar.map_or(ConfigValue::Null, ConfigValue::String));
                let child = target.child_index(items.len() - 1);
                self.written += 1;

                if is_structural(payload) {
                    let column = indent + offset;
                    self.frames.push(Frame {
                        indent: column,
                        node: child,
                        indentless: false,
                    });
                    return self.apply(line_no, column, payload);
                }
                self.last_created = Some(child);
            }
            Line::Entry { key, value } => {
                if self.guard_errors && diagnostics::is_reserved(&target, key) {
                    let err = UniconfError::Reserved(key.to_string());
                    return Err(parse_error(line_no, err.to_string()));
                }
                let scalar = if value.is_empty() {
                    None
                } else {
                    Some(self.scalar(line_no, value)?)
                };

                let map = self
                    .node_mut(&target)?
                    .as_object_mut_or_init()
                    .map_err(|err| parse_error(line_no, err.to_string()))?;
                match scalar {
                    Some(text) => {
                        map.insert(key.to_string(), ConfigValue::String(text));
                    }
                    None => {
                        let slot = map.entry(key.to_string()).or_default();
                        if !slot.is_container() {
                            debug!(key, "replacing scalar with nested placeholder");
                            *slot = ConfigValue::Null;
                        }
                    }
                }
                self.written += 1;
                self.last_created = Some(target.child_key(key));
            }
        }
        Ok(())
    }

    /// Unquote and expand a scalar, keeping any reference warning for later. An
    /// unterminated reference fails the line.
    fn scalar(&mut self, line_no: usize, raw: &str) -> Result<String> {
        let expansion = expand(&*self.root, unquote(raw));
        match expansion.unresolved {
            Some(unresolved) if unresolved.is_malformed() => {
                return Err(parse_error(line_no, unresolved.to_string()));
            }
            Some(unresolved) => self.warnings.push((line_no, unresolved)),
            None => {}
        }
        Ok(expansion.text)
    }

    fn node_mut(&mut self, handle: &NodePath) -> Result<&mut ConfigValue> {
        handle
            .get_mut(&mut *self.root)
            .ok_or_else(|| UniconfError::NotFound(handle.display()))
    }

    fn top(&self) -> &Frame {
        // The base frame is never popped.
        &self.frames[self.frames.len() - 1]
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> UniconfError {
    UniconfError::Parse {
        line,
        message: message.into(),
    }
}

/// Classify comment-free content as a sequence item or a mapping entry.
fn classify(content: &str) -> Option<Line<'_>> {
    if is_item(content) {
        let payload = content[1..].trim_start();
        return Some(Line::Item {
            payload,
            offset: content.len() - payload.len(),
        });
    }
    split_entry(content).map(|(key, value)| Line::Entry { key, value })
}

/// `-` alone or followed by whitespace.
fn is_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ") || content.starts_with("-\t")
}

/// Whether an item payload opens a nested node rather than holding a scalar.
fn is_structural(payload: &str) -> bool {
    is_item(payload) || split_entry(payload).is_some()
}

/// Split `key: value` into its parts.
///
/// The separator is the first `:` followed by whitespace or the end of the line,
/// so `url: http://host` keeps its second colon. A key wrapped in quotes may
/// contain anything but its own quote character.
fn split_entry(content: &str) -> Option<(&str, &str)> {
    if let Some(quote) = content.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let close = content[1..].find(quote)? + 1;
        let value = content[close + 1..].strip_prefix(':')?;
        if !value.is_empty() && !value.starts_with(char::is_whitespace) {
            return None;
        }
        return Some((&content[1..close], value.trim()));
    }

    for (i, c) in content.char_indices() {
        if c != ':' {
            continue;
        }
        let value = &content[i + 1..];
        if value.is_empty() || value.starts_with(char::is_whitespace) {
            let key = content[..i].trim_end();
            if key.is_empty() {
                return None;
            }
            return Some((key, value.trim()));
        }
    }
    None
}

/// Drop a trailing `#` comment and trailing whitespace.
///
/// A `#` opens a comment at the start of the content or after whitespace. A quote
/// at the start of a token opens a quoted region that ends at the same quote
/// followed by whitespace, `:` or the end of the line; `#` inside it is literal.
fn strip_comment(content: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut after_space = true;
    for (i, c) in content.char_indices() {
        match quote {
            Some(q) if c == q => {
                let next = content[i + c.len_utf8()..].chars().next();
                if next.is_none_or(|n| n.is_whitespace() || n == ':') {
                    quote = None;
                }
            }
            Some(_) => {}
            None if c == '#' && after_space => return content[..i].trim_end(),
            None if (c == '"' || c == '\'') && after_space => quote = Some(c),
            None => {}
        }
        after_space = c.is_whitespace();
    }
    content.trim_end()
}

/// Strip one pair of matching outer quotes.
pub(crate) fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[bytes.len() - 1] == bytes[0] {
        return &value[1..value.len() - 1];
    }
    value
}
