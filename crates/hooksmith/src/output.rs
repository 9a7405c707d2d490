//! Error and summary formatting.

use crate::cli::OutputFormat;
use crate::orchestrator::{FailureKind, UnitFailure};
use hooksmith_parser::CompileError;
use miette::{miette, LabeledSpan, NamedSource, Report};
use serde::Serialize;

/// A failure formatted for JSON output.
#[derive(Debug, Serialize)]
pub struct FormattedError {
    /// The source file path.
    pub filename: String,
    /// 1-indexed line, when the failure has a source position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// 1-indexed column, when the failure has a source position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Byte offset, when the failure has a source position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    pub message: String,
    pub code: String,
}

impl From<&UnitFailure> for FormattedError {
    fn from(failure: &UnitFailure) -> Self {
        let position = match &failure.kind {
            FailureKind::Compile(error) => Some(error),
            _ => None,
        };
        Self {
            filename: failure.path.to_string(),
            line: position.map(CompileError::line),
            column: position.map(CompileError::column),
            offset: position.map(|error| u32::from(error.span().start)),
            message: failure.kind.to_string(),
            code: failure.kind.code().to_string(),
        }
    }
}

/// Formats unit failures for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, failures: &[UnitFailure]) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(failures),
            OutputFormat::Json => self.format_json(failures),
            OutputFormat::Machine => self.format_machine(failures),
        }
    }

    /// Annotated source reports through `miette`.
    fn format_human(&self, failures: &[UnitFailure]) -> String {
        failures
            .iter()
            .map(|failure| format!("{:?}\n", report(failure)))
            .collect()
    }

    fn format_json(&self, failures: &[UnitFailure]) -> String {
        let errors: Vec<FormattedError> = failures.iter().map(FormattedError::from).collect();
        serde_json::to_string_pretty(&errors).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_machine(&self, failures: &[UnitFailure]) -> String {
        let mut output = String::new();
        for failure in failures {
            let location = match &failure.kind {
                FailureKind::Compile(error) => {
                    format!("{}:{}:{}", failure.path, error.line(), error.column())
                }
                _ => failure.path.to_string(),
            };
            output.push_str(&format!(
                "ERROR {location} {} ({})\n",
                failure.kind,
                failure.kind.code()
            ));
        }
        output
    }
}

/// Builds a `miette` report, labelled on the source when there is one.
pub fn report(failure: &UnitFailure) -> Report {
    let code = failure.kind.code();
    match (&failure.kind, &failure.source) {
        (FailureKind::Compile(error), Some(source)) => {
            let span = error.span();
            let start = u32::from(span.start) as usize;
            let end = u32::from(span.end) as usize;
            miette!(
                labels = vec![LabeledSpan::at(start..end, label(error))],
                code = code,
                "{}:{}:{}: {error}",
                failure.path,
                error.line(),
                error.column()
            )
            .with_source_code(NamedSource::new(failure.path.as_str(), source.clone()))
        }
        _ => miette!(code = code, "{}: {}", failure.path, failure.kind),
    }
}

fn label(error: &CompileError) -> String {
    match error {
        CompileError::Lex(error) => format!("unrecognized '{}'", error.character),
        CompileError::Parse(error) => error.kind.to_string(),
        CompileError::MismatchedTag(error) => format!("expected </{}>", error.expected),
    }
}

/// Summary of a compile run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Units compiled and written.
    pub compiled: usize,
    /// Units that failed.
    pub failed: usize,
}

impl Summary {
    /// Formats the summary line.
    pub fn format(&self) -> String {
        let file_word = if self.compiled == 1 { "file" } else { "files" };
        if self.failed == 0 {
            format!("hooksmith compiled {} {file_word}", self.compiled)
        } else {
            format!(
                "hooksmith compiled {} {file_word}, {} failed",
                self.compiled, self.failed
            )
        }
    }
}
