//! The in-tree `errors` collection.
//!
//! Problems found while loading are not returned to the caller one by one. They are
//! appended as strings to the reserved `errors` array at the root, so a single load
//! can report problems from many files. Each entry is also emitted through `tracing`.
//!
//! The root `errors` key is reserved: loaders refuse to write it (see
//! [`is_reserved`]). If it still ends up holding something other than an array,
//! the next record replaces it and notes the collision once.

use crate::path::NodePath;
use crate::types::ConfigValue;
use std::path::Path;
use tracing::{error, warn};

/// Root key holding the collected messages.
pub const ERRORS_KEY: &str = "errors";

/// Record a non-fatal problem, e.g. an unresolved reference.
pub fn warning(root: &mut ConfigValue, message: impl AsRef<str>) {
    let message = message.as_ref();
    warn!("{}", message);
    push(root, format!("WARNING: {}", message));
}

/// Record a problem that is not tied to a position in a file.
pub fn failure(root: &mut ConfigValue, message: impl AsRef<str>) {
    let message = message.as_ref();
    error!("{}", message);
    push(root, format!("ERROR: {}", message));
}

/// Record a problem found at `line` of `file`.
pub fn failure_in_file(root: &mut ConfigValue, file: &Path, line: usize, message: impl AsRef<str>) {
    let message = message.as_ref();
    error!(file = %file.display(), line, "{}", message);
    push(
        root,
        format!(
            "ERROR: in file '{}' at line {}: {}",
            file.display(),
            line,
            message
        ),
    );
}

/// Whether writing `key` under `at` would touch the collection.
pub fn is_reserved(at: &NodePath, key: &str) -> bool {
    at.is_root() && key == ERRORS_KEY
}

/// Messages collected so far, oldest first.
pub fn collected(root: &ConfigValue) -> Vec<&str> {
    root.get(ERRORS_KEY)
        .and_then(ConfigValue::as_array)
        .map(|items| items.iter().filter_map(ConfigValue::as_str).collect())
        .unwrap_or_default()
}

fn push(root: &mut ConfigValue, entry: String) {
    let ConfigValue::Object(map) = root else {
        return;
    };
    let errors = map.entry(ERRORS_KEY.to_string()).or_default();
    if !matches!(errors, ConfigValue::Null | ConfigValue::Array(_)) {
        let note = format!(
            "root '{}' held {}; replaced by the problem collection",
            ERRORS_KEY,
            errors.kind()
        );
        error!("{}", note);
        *errors = ConfigValue::Array(vec![ConfigValue::String(format!("ERROR: {}", note))]);
    }
    if let Ok(items) = errors.as_array_mut_or_init() {
        items.push(ConfigValue::String(entry));
    }
}
