//! Configuration loading.
//!
//! An optional `hooksmith.json` supplies defaults for the CLI flags:
//!
//! ```json
//! {
//!   // comments are allowed
//!   "typed": true,
//!   "sourceMap": true,
//!   "outDir": "src/generated",
//!   "extension": "hks",
//!   "ignore": ["**/drafts/**"]
//! }
//! ```
//!
//! Flags given on the command line win over file values.

use crate::cli::Args;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "hooksmith.json";

/// Source extension scanned in directories when none is configured.
pub const DEFAULT_EXTENSION: &str = "hks";

/// Contents of `hooksmith.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub typed: bool,

    #[serde(default)]
    pub source_map: bool,

    /// Output directory, relative to the config file.
    pub out_dir: Option<Utf8PathBuf>,

    /// Source file extension, with or without the leading dot.
    pub extension: Option<String>,

    /// Extra ignore globs for directory scans.
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
}

impl Config {
    /// Loads configuration from a JSON file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let mut config: Config =
            serde_json::from_str(&remove_json_comments(&content)).map_err(|source| {
                ConfigError::Parse {
                    path: path.to_owned(),
                    source,
                }
            })?;

        if let (Some(out_dir), Some(base)) = (&config.out_dir, path.parent()) {
            if out_dir.is_relative() {
                config.out_dir = Some(base.join(out_dir));
            }
        }
        tracing::debug!(%path, ?config, "loaded config");
        Ok(config)
    }

    /// Loads `hooksmith.json` from `dir` if it exists.
    pub fn find(dir: &Utf8Path) -> Result<Option<Self>, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub typed: bool,
    pub source_map: bool,
    pub out_dir: Option<Utf8PathBuf>,
    /// Source extension without the leading dot.
    pub extension: String,
    pub ignore: Vec<String>,
}

impl Settings {
    /// Merges CLI flags over file configuration.
    pub fn resolve(args: &Args, config: Config) -> Self {
        let extension = config
            .extension
            .as_deref()
            .map(|ext| ext.trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_EXTENSION)
            .to_string();

        let mut ignore = config.ignore;
        ignore.extend(args.ignore.iter().cloned());

        Self {
            typed: args.typed || config.typed,
            source_map: args.source_map || config.source_map,
            out_dir: args.out_dir.clone().or(config.out_dir),
            extension,
            ignore,
        }
    }
}

/// Removes single-line and multi-line comments from JSON.
fn remove_json_comments(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            match c {
                '"' => in_string = false,
                '\\' => result.extend(chars.next()),
                _ => {}
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                result.push(c);
            }
            ('/', Some('/')) => {
                while chars.peek().is_some_and(|&next| next != '\n') {
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                chars.next();
                while let Some(next) = chars.next() {
                    if next == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => result.push(c),
        }
    }

    result
}
