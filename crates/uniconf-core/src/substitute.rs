//! `$(...)` reference expansion.
//!
//! A reference is a `$` immediately followed by one of `(`, `[`, `{`, `<`. The text
//! up to the first matching closer (`)`, `]`, `}`, `>`) is a path resolved against
//! the tree root:
//!
//! - a string is spliced in verbatim;
//! - a number is spliced as a rounded integer;
//! - anything else or a missing path stops expansion. The rest of the input from
//!   that `$` on is copied untouched and a warning is produced;
//! - a missing closer stops expansion the same way, but the text is malformed and
//!   is reported as an error. Inside a source file it aborts the file at that line.
//!
//! The scan is a single left-to-right pass. Spliced text is never re-scanned, and a
//! `$` that does not open a reference is copied as-is.

use crate::diagnostics;
use crate::error::{Result, UniconfError};
use crate::path::resolve;
use crate::types::{integer_text, ConfigValue, Kind};
use std::fmt;

/// Why expansion of a string stopped early.
#[derive(Debug, Clone, PartialEq)]
pub enum Unresolved {
    /// The reference path does not exist in the tree.
    Missing { reference: String },
    /// The reference path exists but holds something that cannot be spliced.
    NotScalar { reference: String, kind: Kind },
    /// An opening bracket without its closer.
    Unterminated { reference: String },
}

impl Unresolved {
    /// A reference whose bracket never closes. Unlike a missing target, this is a
    /// defect of the text itself.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Unresolved::Unterminated { .. })
    }
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::Missing { reference } => {
                write!(f, "unresolved reference '{}'", reference)
            }
            Unresolved::NotScalar { reference, kind } => write!(
                f,
                "reference '{}' points to {}, expected a string or number",
                reference, kind
            ),
            Unresolved::Unterminated { reference } => {
                write!(f, "unterminated reference '{}'", reference)
            }
        }
    }
}

/// Result of expanding one string.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub text: String,
    pub unresolved: Option<Unresolved>,
}

/// Expand references in `text` against `root` without touching the tree.
pub fn expand(root: &ConfigValue, text: &str) -> Expansion {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];
        let Some(close) = after.chars().next().and_then(closing_bracket) else {
            out.push('$');
            rest = after;
            continue;
        };

        // All four openers are single-byte, so the body starts right after them.
        let body = &after[1..];
        let spliced = match body.find(close) {
            None => Err(Unresolved::Unterminated {
                reference: rest[dollar..].to_string(),
            }),
            Some(end) => {
                let reference = || rest[dollar..dollar + end + 3].to_string();
                match resolve(root, &body[..end]) {
                    Some(ConfigValue::String(s)) => Ok((s.clone(), end)),
                    Some(ConfigValue::Number(n)) => Ok((integer_text(*n), end)),
                    Some(other) => Err(Unresolved::NotScalar {
                        reference: reference(),
                        kind: other.kind(),
                    }),
                    None => Err(Unresolved::Missing {
                        reference: reference(),
                    }),
                }
            }
        };

        let end = match spliced {
            Ok((value, end)) => {
                out.push_str(&value);
                end
            }
            Err(unresolved) => {
                out.push_str(&rest[dollar..]);
                return Expansion {
                    text: out,
                    unresolved: Some(unresolved),
                };
            }
        };
        rest = &body[end + 1..];
    }

    out.push_str(rest);
    Expansion {
        text: out,
        unresolved: None,
    }
}

/// Expand references in `text`, recording the reason in the root's `errors`
/// collection when expansion stops early: a warning for an unresolved reference,
/// an error for an unterminated one.
pub fn substitute(root: &mut ConfigValue, text: &str) -> String {
    let Expansion { text, unresolved } = expand(root, text);
    match unresolved {
        Some(unresolved) if unresolved.is_malformed() => {
            diagnostics::failure(root, unresolved.to_string())
        }
        Some(unresolved) => diagnostics::warning(root, unresolved.to_string()),
        None => {}
    }
    text
}

/// Expand a value read from line `line` of a source file.
///
/// Unresolved references become a warning tagged with the line. An unterminated
/// reference is returned as a parse error so the caller stops reading the file.
pub(crate) fn substitute_line(root: &mut ConfigValue, text: &str, line: usize) -> Result<String> {
    let Expansion { text, unresolved } = expand(root, text);
    match unresolved {
        Some(unresolved) if unresolved.is_malformed() => Err(UniconfError::Parse {
            line,
            message: unresolved.to_string(),
        }),
        Some(unresolved) => {
            diagnostics::warning(root, format!("line {}: {}", line, unresolved));
            Ok(text)
        }
        None => Ok(text),
    }
}

fn closing_bracket(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '<' => Some('>'),
        _ => None,
    }
}
