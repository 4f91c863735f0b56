//! Loading configuration files and directory trees into the root.
//!
//! A directory is walked one level at a time in file-name order:
//!
//! - a subdirectory whose name contains a `.` opens the branch named by the text
//!   before the first `.` (`db.d/` loads into `db`); other subdirectories load
//!   into the current branch;
//! - a file loads into the branch named by the text before its last `.`
//!   (`server.yml` into `server`, `.env` into the current branch);
//! - the extension picks the parser, and files with other extensions are skipped.
//!
//! Symbolic links are followed. A link leading back to a directory that is
//! already being loaded is reported and skipped.
//!
//! A failing file never stops the walk. Its problem is recorded in the root's
//! `errors` collection and the next file is loaded.

use crate::diagnostics;
use crate::document::{parse_json_at, parse_settings_at};
use crate::error::{Result, UniconfError};
use crate::flat::{parse_env_at, parse_ini_at, parse_list_at};
use crate::path::{node_for_branch, NodePath};
use crate::structural::parse_structural_at;
use crate::types::ConfigValue;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Source formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.env`: `NAME=value` lines.
    Env,
    /// `.ini`: sections and `key = value` lines.
    Ini,
    /// `.list`: one array element per line.
    List,
    /// `.json`
    Json,
    /// `.conf` / `.toml`
    Settings,
    /// `.yml` / `.yaml`: the indentation-structured format.
    Structural,
}

impl Format {
    /// Case-sensitive lookup of a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "env" => Some(Format::Env),
            "ini" => Some(Format::Ini),
            "list" => Some(Format::List),
            "json" => Some(Format::Json),
            "conf" | "toml" => Some(Format::Settings),
            "yml" | "yaml" => Some(Format::Structural),
            _ => None,
        }
    }
}

/// Load a file or directory tree into `root`.
///
/// A directory loads into the root itself. A single file loads into the branch
/// named by its stem, as it would inside a directory. Returns the number of
/// values written across all files.
///
/// Only a missing or unreadable `path` is an error here; problems inside
/// individual files are recorded in the `errors` collection.
pub fn load_path(root: &mut ConfigValue, path: &Path) -> Result<usize> {
    let meta = fs::metadata(path)?;
    let base = NodePath::root();
    let count = if meta.is_dir() {
        load_dir(root, &base, path, &mut Vec::new())
    } else {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        load_file(root, &base, path, &name)
    };
    info!(path = %path.display(), count, "configuration loaded");
    Ok(count)
}

/// `ancestors` holds the canonical paths of the directories being loaded above
/// `dir`, so a symlink cycle ends instead of recursing until the OS refuses.
fn load_dir(
    root: &mut ConfigValue,
    node: &NodePath,
    dir: &Path,
    ancestors: &mut Vec<PathBuf>,
) -> usize {
    let canonical = match fs::canonicalize(dir) {
        Ok(canonical) => canonical,
        Err(err) => {
            diagnostics::failure(root, format!("in directory '{}': {}", dir.display(), err));
            return 0;
        }
    };
    if ancestors.contains(&canonical) {
        diagnostics::warning(
            root,
            format!("skipping directory loop at '{}'", dir.display()),
        );
        return 0;
    }
    ancestors.push(canonical);
    let count = load_entries(root, node, dir, ancestors);
    ancestors.pop();
    count
}

fn load_entries(
    root: &mut ConfigValue,
    node: &NodePath,
    dir: &Path,
    ancestors: &mut Vec<PathBuf>,
) -> usize {
    let mut count = 0;
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                diagnostics::failure(root, UniconfError::from(err).to_string());
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();

        if entry.file_type().is_dir() {
            let branch = match name.split_once('.') {
                Some((branch, _)) => node_for_branch(root, node, branch),
                None => Ok(node.clone()),
            };
            match branch {
                Ok(branch) => count += load_dir(root, &branch, entry.path(), ancestors),
                Err(err) => diagnostics::failure(
                    root,
                    format!("in directory '{}': {}", entry.path().display(), err),
                ),
            }
        } else {
            count += load_file(root, node, entry.path(), &name);
        }
    }
    count
}

fn load_file(root: &mut ConfigValue, node: &NodePath, path: &Path, name: &str) -> usize {
    let Some((branch, ext)) = name.rsplit_once('.') else {
        debug!(path = %path.display(), "skipping file without extension");
        return 0;
    };
    let Some(format) = Format::from_extension(ext) else {
        debug!(path = %path.display(), "skipping file with unknown extension");
        return 0;
    };

    match parse_file(root, node, branch, path, format) {
        Ok(count) => {
            debug!(path = %path.display(), ?format, count, "file loaded");
            count
        }
        Err(err) => {
            match err.line() {
                Some(line) => diagnostics::failure_in_file(root, path, line, err.detail()),
                None => diagnostics::failure(root, format!("in file '{}': {}", path.display(), err)),
            }
            0
        }
    }
}

fn parse_file(
    root: &mut ConfigValue,
    node: &NodePath,
    branch: &str,
    path: &Path,
    format: Format,
) -> Result<usize> {
    match format {
        Format::Env => parse_env_at(root, node, branch, open(path)?),
        Format::Ini => parse_ini_at(root, node, branch, open(path)?, path),
        Format::List => parse_list_at(root, node, branch, open(path)?),
        Format::Structural => parse_structural_at(root, node, branch, open(path)?),
        Format::Json => parse_json_at(root, node, branch, &fs::read_to_string(path)?),
        Format::Settings => parse_settings_at(root, node, branch, &fs::read_to_string(path)?),
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}
