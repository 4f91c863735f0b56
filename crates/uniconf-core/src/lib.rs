//! # uniconf-core
//!
//! Layered configuration trees built from whole directories of mixed-format files.
//!
//! Every source (`.env`, `.ini`, `.list`, `.json`, `.conf`/`.toml`, `.yml`/`.yaml`)
//! is loaded into a branch of a single [`ConfigValue`] tree named after its file.
//! String values may reference other values with `$(path.to.value)`, and problems
//! found while loading are collected in the tree's own `errors` array instead of
//! aborting the load.
//!
//! ## Quick start
//!
//! ```rust
//! use uniconf_core::{Config, ConfigValue};
//!
//! let mut config = Config::new();
//! config
//!     .parse_structural("server", "host: example.org\nport: 8080".as_bytes())
//!     .unwrap();
//! config
//!     .parse_structural("client", "url: http://$(server.host):$(server.port)/".as_bytes())
//!     .unwrap();
//!
//! assert_eq!(config.get_string("client.url").unwrap(), "http://example.org:8080/");
//! assert_eq!(config.get_number("server/port"), Some(8080));
//! assert!(config.errors().is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`types`]: the `ConfigValue` tree
//! - [`path`]: path splitting, resolution and node handles
//! - [`substitute`]: `$(...)` reference expansion
//! - [`structural`]: the indentation-structured parser (`.yml`)
//! - [`encoder`]: the structural writer
//! - [`flat`]: `.env`, `.ini` and `.list` parsers
//! - [`document`]: `.json` and `.conf`/`.toml` parsers
//! - [`merge`]: attaching parsed subtrees to branches
//! - [`loader`]: file and directory ingestion
//! - [`diagnostics`]: the in-tree `errors` collection
//! - [`config`]: the `Config` session
//! - [`error`]: error types

pub mod config;
pub mod diagnostics;
pub mod document;
pub mod encoder;
pub mod error;
pub mod flat;
pub mod loader;
pub mod merge;
pub mod path;
pub mod structural;
pub mod substitute;
pub mod types;

pub use config::Config;
pub use encoder::encode;
pub use error::{Result, UniconfError};
pub use loader::{load_path, Format};
pub use merge::attach;
pub use path::{resolve, NodePath};
pub use structural::{decode, parse_structural};
pub use substitute::{expand, substitute};
pub use types::{ConfigValue, Kind, ObjectMap};
