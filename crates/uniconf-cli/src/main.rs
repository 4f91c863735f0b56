//! `uniconf` CLI: load, query and convert configuration trees from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Load a directory of config files and print the merged tree as JSON
//! uniconf load /etc/myapp
//!
//! # Fail (exit 1) when any file reported a problem
//! uniconf load /etc/myapp --strict
//!
//! # Read one value, formatted as a number
//! uniconf get /etc/myapp server.port --as number
//!
//! # Convert JSON to the structural format and back
//! uniconf encode -i settings.json -o settings.yml
//! uniconf decode -i settings.yml
//! ```
//!
//! Logging goes to stderr. `-v` raises the level to `debug`; `UNICONF_LOG` or
//! `RUST_LOG` take a full filter directive and win over `-v`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uniconf_core::{Config, ConfigValue};

#[derive(Parser)]
#[command(
    name = "uniconf",
    version,
    about = "Load layered configuration trees from env, ini, list, json, toml and yml files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a file or directory and print the tree as JSON
    Load {
        /// File or directory to load
        #[arg(env = "UNICONF_PATH")]
        path: String,
        /// Print the JSON on a single line
        #[arg(long)]
        compact: bool,
        /// Exit with status 1 if the load recorded any errors or warnings
        #[arg(long)]
        strict: bool,
    },
    /// Load a file or directory and print one value
    Get {
        /// File or directory to load
        path: String,
        /// Path of the value, e.g. `db.primary.port` or `db/primary/port`
        key: String,
        /// How to print the value
        #[arg(long = "as", value_enum, default_value_t = Render::Json)]
        render: Render,
    },
    /// Encode JSON into the structural (yml-like) format
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Decode the structural format into pretty-printed JSON
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Render {
    String,
    Number,
    Bool,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Load {
            path,
            compact,
            strict,
        } => {
            let config = load(&path)?;
            let json = if compact {
                serde_json::to_string(&config)?
            } else {
                serde_json::to_string_pretty(&config)?
            };
            println!("{}", json);

            let errors = config.errors();
            if strict && !errors.is_empty() {
                for error in &errors {
                    eprintln!("{}", error);
                }
                eprintln!("{} problem(s) while loading {}", errors.len(), path);
                process::exit(1);
            }
        }
        Commands::Get { path, key, render } => {
            let config = load(&path)?;
            let text = render_value(&config, &key, render)?;
            println!("{}", text);
        }
        Commands::Encode { input, output } => {
            let json = read_input(input.as_deref())?;
            let value: serde_json::Value =
                serde_json::from_str(&json).context("Failed to parse JSON input")?;
            let text = uniconf_core::encode(&ConfigValue::from(value));
            write_output(output.as_deref(), &text)?;
        }
        Commands::Decode { input, output } => {
            let text = read_input(input.as_deref())?;
            let value =
                uniconf_core::decode(&text).context("Failed to decode structural input")?;
            let pretty = serde_json::to_string_pretty(&value)?;
            write_output(output.as_deref(), &pretty)?;
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `UNICONF_LOG`, then `RUST_LOG`, then `-v`.
fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("UNICONF_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load(path: &str) -> Result<Config> {
    let config = Config::load(path).with_context(|| format!("Failed to load: {}", path))?;
    debug!(path, errors = config.errors().len(), "load finished");
    Ok(config)
}

/// Format the value at `key` the way `--as` asks for.
fn render_value(config: &Config, key: &str, render: Render) -> Result<String> {
    let missing = || anyhow::anyhow!("No value at '{}' that reads as requested", key);
    let text = match render {
        Render::String => config.get_string(key).ok_or_else(missing)?,
        Render::Number => config.get_number(key).ok_or_else(missing)?.to_string(),
        Render::Bool => config.get_boolean(key).ok_or_else(missing)?.to_string(),
        Render::Json => {
            let value = config.get(key).ok_or_else(missing)?;
            serde_json::to_string_pretty(value)?
        }
    };
    Ok(text)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
