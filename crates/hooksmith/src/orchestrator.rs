//! Main orchestration logic.
//!
//! Inputs are expanded to source units, compiled in parallel, and written
//! next to their sources (or under the output directory). A unit that fails
//! writes nothing; the other units are still compiled.

use crate::cli::{Args, OutputFormat};
use crate::config::{Config, ConfigError, Settings};
use crate::output::{Formatter, Summary};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use hooksmith_codegen::{compile, component_name_from_path, CompileOptions};
use hooksmith_parser::CompileError;
use rayon::prelude::*;
use std::fs;
use thiserror::Error;
use walkdir::WalkDir;

/// Directories never scanned for sources.
const DEFAULT_IGNORES: &[&str] = &["**/node_modules/**", "**/.git/**", "**/target/**"];

/// Errors that stop the whole run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("--name needs exactly one input file, found {0}")]
    NameWithManyFiles(usize),

    #[error("no .{0} files found")]
    NoInputs(String),

    #[error("input not found: {0}")]
    MissingInput(Utf8PathBuf),

    #[error("cannot determine the working directory")]
    CurrentDir,
}

/// Why a single unit failed.
#[derive(Debug, Error)]
pub enum FailureKind {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("failed to read file: {0}")]
    Read(std::io::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize position map: {0}")]
    Map(serde_json::Error),
}

impl FailureKind {
    /// Stable error code for machine and JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::Compile(CompileError::Lex(_)) => "lex-error",
            FailureKind::Compile(CompileError::Parse(_)) => "parse-error",
            FailureKind::Compile(CompileError::MismatchedTag(_)) => "mismatched-tag",
            FailureKind::Read(_) | FailureKind::Write { .. } => "io-error",
            FailureKind::Map(_) => "source-map-error",
        }
    }
}

/// A unit that failed to compile or to write.
#[derive(Debug)]
pub struct UnitFailure {
    pub path: Utf8PathBuf,
    /// Source text, when it could be read.
    pub source: Option<String>,
    pub kind: FailureKind,
}

/// A source file scheduled for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Unit {
    path: Utf8PathBuf,
    /// Path below the scanned directory; the file name for explicit files.
    relative: Utf8PathBuf,
}

/// Runs the compiler over every input.
pub fn run(args: Args) -> Result<Summary, OrchestratorError> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => {
            let cwd = std::env::current_dir()
                .ok()
                .and_then(|dir| Utf8PathBuf::try_from(dir).ok())
                .ok_or(OrchestratorError::CurrentDir)?;
            Config::find(&cwd)?.unwrap_or_default()
        }
    };
    let settings = Settings::resolve(&args, config);

    let ignore_set = build_ignore_set(&settings.ignore)?;
    let units = discover(&args.inputs, &settings.extension, &ignore_set)?;
    if units.is_empty() {
        return Err(OrchestratorError::NoInputs(settings.extension));
    }
    if args.name.is_some() && units.len() > 1 {
        return Err(OrchestratorError::NameWithManyFiles(units.len()));
    }
    if settings.source_map && !settings.typed {
        tracing::warn!("position maps are only written for typed output");
    }
    tracing::info!(
        files = units.len(),
        typed = settings.typed,
        source_map = settings.source_map,
        "compiling"
    );

    let results: Vec<Result<String, UnitFailure>> = units
        .par_iter()
        .map(|unit| compile_unit(unit, &args, &settings))
        .collect();

    let mut summary = Summary::default();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(code) => {
                if args.stdout {
                    print!("{code}");
                }
                summary.compiled += 1;
            }
            Err(failure) => failures.push(failure),
        }
    }
    summary.failed = failures.len();

    if !failures.is_empty() {
        eprint!("{}", Formatter::new(args.output).format(&failures));
    }
    if args.output == OutputFormat::Human {
        eprintln!("{}", summary.format());
    }
    Ok(summary)
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, OrchestratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in DEFAULT_IGNORES.iter().copied().chain(patterns.iter().map(String::as_str)) {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Expands inputs into units. Directories are scanned recursively for
/// `*.<extension>` files in path order; explicit files are taken as given.
fn discover(
    inputs: &[Utf8PathBuf],
    extension: &str,
    ignore: &GlobSet,
) -> Result<Vec<Unit>, OrchestratorError> {
    let suffix = format!(".{extension}");
    let mut units = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<Unit> = WalkDir::new(input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
                .filter(|p| p.file_name().is_some_and(|name| name.ends_with(&suffix)))
                .filter_map(|path| {
                    let relative = path.strip_prefix(input).ok()?.to_owned();
                    if ignore.is_match(relative.as_str()) {
                        return None;
                    }
                    Some(Unit { path, relative })
                })
                .collect();
            found.sort_by(|a, b| a.path.cmp(&b.path));
            tracing::debug!(dir = %input, files = found.len(), "scanned directory");
            units.extend(found);
        } else if input.is_file() {
            let relative = Utf8PathBuf::from(input.file_name().unwrap_or(input.as_str()));
            units.push(Unit {
                path: input.clone(),
                relative,
            });
        } else {
            return Err(OrchestratorError::MissingInput(input.clone()));
        }
    }

    Ok(units)
}

fn output_path(unit: &Unit, settings: &Settings) -> Utf8PathBuf {
    let extension = if settings.typed { "tsx" } else { "jsx" };
    match &settings.out_dir {
        Some(dir) => dir.join(&unit.relative).with_extension(extension),
        None => unit.path.with_extension(extension),
    }
}

/// Compiles one unit and, unless printing to stdout, writes its output.
fn compile_unit(unit: &Unit, args: &Args, settings: &Settings) -> Result<String, UnitFailure> {
    let fail = |source: Option<String>, kind: FailureKind| UnitFailure {
        path: unit.path.clone(),
        source,
        kind,
    };

    let source = fs::read_to_string(&unit.path).map_err(|e| fail(None, FailureKind::Read(e)))?;
    let output_path = output_path(unit, settings);
    let component_name = args
        .name
        .clone()
        .unwrap_or_else(|| component_name_from_path(unit.path.as_str()));
    let options = CompileOptions {
        component_name: Some(component_name),
        typed: settings.typed,
        source_map: settings.typed && settings.source_map && !args.stdout,
        source_id: unit.path.to_string(),
        file_name: output_path.file_name().map(str::to_string),
    };

    let output = match compile(&source, &options) {
        Ok(output) => output,
        Err(error) => return Err(fail(Some(source), error.into())),
    };
    if args.stdout {
        return Ok(output.code);
    }

    let mut code = output.code;
    let map = match &output.position_map {
        Some(map) => {
            let json = map
                .to_json()
                .map_err(|e| fail(None, FailureKind::Map(e)))?;
            let map_path = Utf8PathBuf::from(format!("{output_path}.map"));
            code.push_str(&format!(
                "//# sourceMappingURL={}\n",
                map_path.file_name().unwrap_or_default()
            ));
            Some((map_path, json))
        }
        None => None,
    };

    write_file(&output_path, &code).map_err(|kind| fail(None, kind))?;
    if let Some((map_path, json)) = map {
        write_file(&map_path, &json).map_err(|kind| fail(None, kind))?;
    }
    tracing::debug!(source = %unit.path, output = %output_path, "wrote component");
    Ok(code)
}

fn write_file(path: &Utf8Path, contents: &str) -> Result<(), FailureKind> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    };
    write().map_err(|source| FailureKind::Write {
        path: path.to_owned(),
        source,
    })
}
