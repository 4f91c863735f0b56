//! Encoder for the structural format: the writing half of [`crate::structural`].
//!
//! Output uses two-space indentation. Objects inside arrays use the compact
//! `- key: value` form, with the remaining keys aligned under the first one.
//! Strings and keys are quoted only when the bare text would read back
//! differently.
//!
//! # Example
//! ```
//! use uniconf_core::{decode, encode};
//! let value = decode("server:\n  hosts:\n    - a\n    - b").unwrap();
//! assert_eq!(encode(&value), "server:\n  hosts:\n    - a\n    - b");
//! ```
//!
//! # Limits
//!
//! The format has no escapes, so a few values cannot be written back faithfully:
//! strings with line breaks, strings holding both quote characters and needing
//! quotes, text that looks like a `$(...)` reference (it is expanded on read), and
//! empty containers (they read back as untyped placeholders).

use crate::types::{integer_text, ConfigValue, ObjectMap};

/// Encode a tree into structural text, without a trailing newline.
pub fn encode(value: &ConfigValue) -> String {
    let mut lines = Vec::new();
    match value {
        ConfigValue::Object(map) => encode_fields(map, 0, &mut lines),
        ConfigValue::Array(items) => encode_items(items, 0, &mut lines),
        ConfigValue::Null => {}
        leaf => lines.push(scalar_text(leaf)),
    }
    lines.join("\n")
}

/// One line per key; nested containers follow at `column + 2`.
fn encode_fields(map: &ObjectMap, column: usize, lines: &mut Vec<String>) {
    for (key, value) in map {
        let head = format!("{}{}:", " ".repeat(column), quote_key(key));
        match value {
            ConfigValue::Object(child) if !child.is_empty() => {
                lines.push(head);
                encode_fields(child, column + 2, lines);
            }
            ConfigValue::Array(items) if !items.is_empty() => {
                lines.push(head);
                encode_items(items, column + 2, lines);
            }
            ConfigValue::String(_) | ConfigValue::Number(_) => {
                lines.push(format!("{} {}", head, scalar_text(value)));
            }
            _ => lines.push(head),
        }
    }
}

/// Items are first written as if their content started at `column + 2`; the two
/// spaces in front of the item's first line then become the `- ` marker.
fn encode_items(items: &[ConfigValue], column: usize, lines: &mut Vec<String>) {
    for item in items {
        let first = lines.len();
        let inner = column + 2;
        match item {
            ConfigValue::Object(map) if !map.is_empty() => encode_fields(map, inner, lines),
            ConfigValue::Array(nested) if !nested.is_empty() => encode_items(nested, inner, lines),
            ConfigValue::String(_) | ConfigValue::Number(_) => {
                lines.push(format!("{}{}", " ".repeat(inner), scalar_text(item)));
            }
            _ => {
                lines.push(format!("{}-", " ".repeat(column)));
                continue;
            }
        }
        lines[first].replace_range(column..inner, "- ");
    }
}

fn scalar_text(value: &ConfigValue) -> String {
    match value {
        ConfigValue::String(s) => quote_scalar(s),
        ConfigValue::Number(n) if n.fract() == 0.0 => integer_text(*n),
        ConfigValue::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn quote_scalar(s: &str) -> String {
    let risky = s.is_empty()
        || s == "-"
        || s.starts_with("- ")
        || s.contains(": ")
        || s.ends_with(':');
    if risky || needs_quotes(s) {
        quoted(s)
    } else {
        s.to_string()
    }
}

fn quote_key(key: &str) -> String {
    let risky = key.is_empty() || key.starts_with("- ") || key.contains(':');
    if risky || needs_quotes(key) {
        quoted(key)
    } else {
        key.to_string()
    }
}

/// Checks shared by keys and scalars: surrounding whitespace, a leading quote or
/// `#`, and an embedded comment marker.
fn needs_quotes(s: &str) -> bool {
    s.trim() != s
        || s.starts_with(['"', '\'', '#'])
        || s.contains(" #")
        || s.contains("\t#")
}

/// Wrap in whichever quote character the text does not contain. Text holding
/// both is written bare.
fn quoted(s: &str) -> String {
    if !s.contains('"') {
        format!("\"{}\"", s)
    } else if !s.contains('\'') {
        format!("'{}'", s)
    } else {
        s.to_string()
    }
}
