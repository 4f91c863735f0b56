//! Whole-document formats: JSON and TOML settings.
//!
//! Both are parsed in one go by their own crate, converted to a [`ConfigValue`]
//! and merged into the target branch with the rules in [`crate::merge`].

use crate::error::{Result, UniconfError};
use crate::merge::attach_at;
use crate::path::NodePath;
use crate::types::ConfigValue;

/// Parse a JSON document and attach it to `branch` under `parent`.
///
/// Booleans become `1`/`0`, `null` becomes an untyped placeholder.
pub fn parse_json_at(
    root: &mut ConfigValue,
    parent: &NodePath,
    branch: &str,
    text: &str,
) -> Result<usize> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    attach_at(root, parent, branch, ConfigValue::from(value))
}

/// Parse a TOML document (`.conf` / `.toml`) and attach it to `branch` under
/// `parent`.
///
/// Datetimes are kept as their TOML text.
pub fn parse_settings_at(
    root: &mut ConfigValue,
    parent: &NodePath,
    branch: &str,
    text: &str,
) -> Result<usize> {
    let table = text
        .parse::<toml::Table>()
        .map_err(|err| settings_error(text, err))?;
    attach_at(root, parent, branch, ConfigValue::from(table))
}

/// Turn a TOML error with a byte span into a line-numbered parse error.
fn settings_error(text: &str, err: toml::de::Error) -> UniconfError {
    match err.span() {
        Some(span) => {
            let start = span.start.min(text.len());
            UniconfError::Parse {
                line: text.as_bytes()[..start].iter().filter(|&&b| b == b'\n').count() + 1,
                message: err.message().to_string(),
            }
        }
        None => UniconfError::SettingsParse(err),
    }
}
