//! A configuration session: one tree plus the operations that fill and query it.

use crate::diagnostics;
use crate::error::Result;
use crate::loader;
use crate::merge;
use crate::path::resolve;
use crate::structural;
use crate::substitute;
use crate::types::ConfigValue;
use serde::{Serialize, Serializer};
use std::io::BufRead;
use std::path::Path;

/// Owns the configuration tree for the lifetime of a session.
///
/// The root is always an object. Loads overlay each other in call order, and
/// every problem found along the way is kept in the root's `errors` array (see
/// [`Config::errors`]).
///
/// ```no_run
/// use uniconf_core::Config;
/// let config = Config::load("/etc/myapp").unwrap();
/// let port = config.get_number("server.port").unwrap_or(8080);
/// for problem in config.errors() {
///     eprintln!("{problem}");
/// }
/// # let _ = port;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    root: ConfigValue,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// An empty session.
    pub fn new() -> Self {
        Config {
            root: ConfigValue::object(),
        }
    }

    /// Start a session from a file or directory tree.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Config::new();
        config.load_path(path)?;
        Ok(config)
    }

    /// Overlay a file or directory tree onto the current tree. Returns the number
    /// of values written.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        loader::load_path(&mut self.root, path.as_ref())
    }

    /// Parse structural text from `input` into `branch`.
    ///
    /// A failure is recorded in [`Config::errors`] and also returned. Lines before
    /// the failing one stay applied.
    pub fn parse_structural<R: BufRead>(&mut self, branch: &str, input: R) -> Result<usize> {
        let outcome = structural::parse_structural(&mut self.root, branch, input);
        self.record(branch, outcome)
    }

    /// Merge an already-built subtree into `branch`.
    ///
    /// A merge conflict leaves the tree unchanged, is recorded in
    /// [`Config::errors`] and is returned.
    pub fn attach(&mut self, branch: &str, subtree: ConfigValue) -> Result<usize> {
        let outcome = merge::attach(&mut self.root, branch, subtree);
        self.record(branch, outcome)
    }

    /// Expand `$(...)` references in `text` against the tree.
    pub fn substitute(&mut self, text: &str) -> String {
        substitute::substitute(&mut self.root, text)
    }

    pub fn root(&self) -> &ConfigValue {
        &self.root
    }

    pub fn into_root(self) -> ConfigValue {
        self.root
    }

    /// Drop everything loaded so far, including collected errors.
    pub fn clear(&mut self) {
        self.root = ConfigValue::object();
    }

    /// Problems recorded by all loads so far, oldest first.
    pub fn errors(&self) -> Vec<&str> {
        diagnostics::collected(&self.root)
    }

    /// The node at `path`, split on any of `. / : \` and space.
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        resolve(&self.root, path)
    }

    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path)?.to_text()
    }

    pub fn get_number(&self, path: &str) -> Option<i64> {
        self.get(path)?.to_integer()
    }

    pub fn get_boolean(&self, path: &str) -> Option<bool> {
        self.get(path)?.to_boolean()
    }

    fn record(&mut self, branch: &str, outcome: Result<usize>) -> Result<usize> {
        if let Err(err) = &outcome {
            let message = match err.line() {
                Some(line) => format!("in branch '{}' at line {}: {}", branch, line, err.detail()),
                None => format!("in branch '{}': {}", branch, err),
            };
            diagnostics::failure(&mut self.root, message);
        }
        outcome
    }
}

impl Serialize for Config {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.root.serialize(serializer)
    }
}
