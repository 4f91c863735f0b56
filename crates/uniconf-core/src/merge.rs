//! Attaching parsed subtrees to branches of the tree.
//!
//! Sources that parse into a whole value at once (JSON, TOML settings) are merged
//! into their branch here:
//!
//! - an absent or `Null` branch takes the subtree wholesale;
//! - object onto object inserts every key, later loads overwriting earlier ones;
//! - array onto array appends every element;
//! - a scalar onto a scalar of the same kind replaces it;
//! - any other combination is a [`UniconfError::MergeConflict`] and nothing changes;
//! - an object carrying `errors` onto the root itself is refused, since that key
//!   holds the problem collection.
//!
//! Once attached, every string leaf of the new members is expanded for `$(...)`
//! references exactly once, in document order. A file can therefore reference
//! values loaded before it, and values earlier in its own text.

use crate::diagnostics::{self, ERRORS_KEY};
use crate::error::{Result, UniconfError};
use crate::path::{slot_for_branch, NodePath};
use crate::substitute::substitute;
use crate::types::ConfigValue;
use tracing::debug;

/// Attach `subtree` to the branch `branch` of the root.
///
/// Returns the number of members attached: keys for objects, elements for arrays,
/// one for a scalar.
pub fn attach(root: &mut ConfigValue, branch: &str, subtree: ConfigValue) -> Result<usize> {
    attach_at(root, &NodePath::root(), branch, subtree)
}

/// Like [`attach`], with the branch looked up under `parent`. An empty branch
/// name attaches to `parent` itself.
pub fn attach_at(
    root: &mut ConfigValue,
    parent: &NodePath,
    branch: &str,
    subtree: ConfigValue,
) -> Result<usize> {
    let target = slot_for_branch(root, parent, branch)?;
    let node = target
        .get_mut(root)
        .ok_or_else(|| UniconfError::NotFound(target.display()))?;

    let attached: Vec<NodePath> = match (node, subtree) {
        (node, subtree) if node.is_null() => {
            *node = subtree;
            match &*node {
                ConfigValue::Object(map) => map.keys().map(|k| target.child_key(k)).collect(),
                ConfigValue::Array(items) => {
                    (0..items.len()).map(|i| target.child_index(i)).collect()
                }
                _ => vec![target.clone()],
            }
        }
        (ConfigValue::Object(_), ConfigValue::Object(incoming))
            if diagnostics::is_reserved(&target, ERRORS_KEY)
                && incoming.contains_key(ERRORS_KEY) =>
        {
            return Err(UniconfError::Reserved(ERRORS_KEY.to_string()));
        }
        (ConfigValue::Object(existing), ConfigValue::Object(incoming)) => incoming
            .into_iter()
            .map(|(key, value)| {
                let handle = target.child_key(&key);
                existing.insert(key, value);
                handle
            })
            .collect(),
        (ConfigValue::Array(existing), ConfigValue::Array(incoming)) => {
            let start = existing.len();
            existing.extend(incoming);
            (start..existing.len())
                .map(|i| target.child_index(i))
                .collect()
        }
        (node, subtree) if node.kind() == subtree.kind() && !node.is_container() => {
            *node = subtree;
            vec![target.clone()]
        }
        (node, subtree) => {
            return Err(UniconfError::MergeConflict {
                branch: target.display(),
                existing: node.kind(),
                incoming: subtree.kind(),
            });
        }
    };

    debug!(branch = %target.display(), count = attached.len(), "attached subtree");
    expand_leaves(root, &attached);
    Ok(attached.len())
}

/// Expand references in every string leaf below `handles`, once each.
pub fn expand_leaves(root: &mut ConfigValue, handles: &[NodePath]) {
    let mut leaves = Vec::new();
    for handle in handles {
        if let Some(node) = handle.get(root) {
            collect_string_leaves(node, handle, &mut leaves);
        }
    }

    for leaf in leaves {
        let Some(text) = leaf.get(root).and_then(ConfigValue::as_str) else {
            continue;
        };
        if !text.contains('$') {
            continue;
        }
        let text = text.to_string();
        let expanded = substitute(root, &text);
        if let Some(node) = leaf.get_mut(root) {
            *node = ConfigValue::String(expanded);
        }
    }
}

fn collect_string_leaves(node: &ConfigValue, at: &NodePath, out: &mut Vec<NodePath>) {
    match node {
        ConfigValue::Object(map) => {
            for (key, child) in map {
                collect_string_leaves(child, &at.child_key(key), out);
            }
        }
        ConfigValue::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_string_leaves(child, &at.child_index(i), out);
            }
        }
        ConfigValue::String(_) => out.push(at.clone()),
        ConfigValue::Null | ConfigValue::Number(_) => {}
    }
}
