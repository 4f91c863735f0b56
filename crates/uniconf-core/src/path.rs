//! Path resolution and node handles.
//!
//! A textual path such as `db.primary/host` is split on any of the delimiter
//! characters `.`, `/`, `:`, `\` and space into non-empty tokens, and each token is
//! looked up as a key of the current object. Resolution is read-only.
//!
//! Writers never hold references into the tree across calls. They keep a
//! [`NodePath`] instead: the list of key/index steps from the root to a node. A
//! handle is re-walked on every use, so dropping or popping one can never dangle.

use crate::diagnostics;
use crate::error::{Result, UniconfError};
use crate::types::ConfigValue;

/// Characters that separate tokens in a lookup path.
pub const PATH_DELIMITERS: &[char] = &['.', '/', ':', '\\', ' '];

/// Split a path into its non-empty tokens.
///
/// ```
/// use uniconf_core::path::split_path;
/// assert_eq!(split_path("db.primary/host"), vec!["db", "primary", "host"]);
/// assert!(split_path("").is_empty());
/// ```
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(PATH_DELIMITERS)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Resolve `path` starting at `start`.
///
/// Each token is looked up as a case-sensitive key of the current object. A missing
/// key, or any non-object node on the way, yields `None`. An empty path resolves to
/// `start` itself.
pub fn resolve<'a>(start: &'a ConfigValue, path: &str) -> Option<&'a ConfigValue> {
    split_path(path)
        .into_iter()
        .try_fold(start, |node, token| node.get(token))
}

/// One step of a [`NodePath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Non-owning handle to a node: the steps from the root down to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath(Vec<Segment>);

impl NodePath {
    /// Handle to the root itself.
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    pub fn child_key(&self, key: &str) -> Self {
        let mut steps = self.0.clone();
        steps.push(Segment::Key(key.to_string()));
        NodePath(steps)
    }

    pub fn child_index(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(Segment::Index(index));
        NodePath(steps)
    }

    /// Handle to the enclosing node; `None` for the root.
    pub fn parent(&self) -> Option<NodePath> {
        let (_, steps) = self.0.split_last()?;
        Some(NodePath(steps.to_vec()))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Follow the handle from `root`.
    pub fn get<'a>(&self, root: &'a ConfigValue) -> Option<&'a ConfigValue> {
        self.0.iter().try_fold(root, |node, step| match (node, step) {
            (ConfigValue::Object(map), Segment::Key(key)) => map.get(key),
            (ConfigValue::Array(items), Segment::Index(i)) => items.get(*i),
            _ => None,
        })
    }

    /// Follow the handle from `root` for writing.
    pub fn get_mut<'a>(&self, root: &'a mut ConfigValue) -> Option<&'a mut ConfigValue> {
        self.0.iter().try_fold(root, |node, step| match (node, step) {
            (ConfigValue::Object(map), Segment::Key(key)) => map.get_mut(key),
            (ConfigValue::Array(items), Segment::Index(i)) => items.get_mut(*i),
            _ => None,
        })
    }

    /// Dotted rendering for log and error messages.
    pub fn display(&self) -> String {
        if self.0.is_empty() {
            return "<root>".to_string();
        }
        self.0
            .iter()
            .map(|step| match step {
                Segment::Key(key) => key.clone(),
                Segment::Index(i) => i.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Get or create the branch `name` under `parent` as an object.
///
/// An empty name designates `parent` itself. An existing non-`Null` child is
/// returned as-is; writes into it are subject to the merge rules. A `Null`
/// placeholder is typed as an object.
pub fn node_for_branch(root: &mut ConfigValue, parent: &NodePath, name: &str) -> Result<NodePath> {
    let branch = branch_slot(root, parent, name, ConfigValue::object())?;
    if let Some(node) = branch.get_mut(root) {
        node.as_object_mut_or_init()?;
    }
    Ok(branch)
}

/// Get or create the branch `name` under `parent`, leaving a fresh branch as an
/// untyped `Null` placeholder for the first write to decide.
pub fn slot_for_branch(root: &mut ConfigValue, parent: &NodePath, name: &str) -> Result<NodePath> {
    branch_slot(root, parent, name, ConfigValue::Null)
}

fn branch_slot(
    root: &mut ConfigValue,
    parent: &NodePath,
    name: &str,
    fresh: ConfigValue,
) -> Result<NodePath> {
    if name.is_empty() {
        return Ok(parent.clone());
    }
    if diagnostics::is_reserved(parent, name) {
        return Err(UniconfError::Reserved(name.to_string()));
    }
    let parent_node = parent
        .get_mut(root)
        .ok_or_else(|| UniconfError::NotFound(parent.display()))?;
    parent_node
        .as_object_mut_or_init()?
        .entry(name.to_string())
        .or_insert(fresh);
    Ok(parent.child_key(name))
}
