//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueEnum};

/// Compiles hooksmith component sources into React hooks components.
#[derive(Debug, Parser)]
#[command(name = "hooksmith")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Source files, or directories to scan for sources
    #[arg(required = true)]
    pub inputs: Vec<Utf8PathBuf>,

    /// Directory for generated files (default: next to each source)
    #[arg(long = "out-dir")]
    pub out_dir: Option<Utf8PathBuf>,

    /// Emit TSX with a props interface and type arguments
    #[arg(long)]
    pub typed: bool,

    /// Write a `.map` file next to each typed output
    #[arg(long = "source-map")]
    pub source_map: bool,

    /// Component name (single input only; default: derived from the file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Print generated code to stdout instead of writing files
    #[arg(long)]
    pub stdout: bool,

    /// Path to hooksmith.json (default: ./hooksmith.json when present)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Glob patterns to ignore while scanning directories
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Error output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Error output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Annotated source reports (default)
    #[default]
    Human,
    /// JSON array of errors
    Json,
    /// One line per error
    Machine,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["hooksmith", "counter.hks"]);
        assert_eq!(args.inputs, vec![Utf8PathBuf::from("counter.hks")]);
        assert!(!args.typed);
        assert!(!args.source_map);
        assert!(args.out_dir.is_none());
        assert_eq!(args.output, OutputFormat::Human);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_inputs_required() {
        assert!(Args::try_parse_from(["hooksmith"]).is_err());
    }

    #[test]
    fn test_typed_with_map() {
        let args = Args::parse_from([
            "hooksmith",
            "--typed",
            "--source-map",
            "--out-dir",
            "dist",
            "src",
        ]);
        assert!(args.typed);
        assert!(args.source_map);
        assert_eq!(args.out_dir.as_deref().map(|p| p.as_str()), Some("dist"));
    }

    #[test]
    fn test_verbosity_counts() {
        let args = Args::parse_from(["hooksmith", "-vv", "a.hks"]);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_output_formats() {
        let args = Args::parse_from(["hooksmith", "--output", "json", "a.hks"]);
        assert_eq!(args.output, OutputFormat::Json);

        let args = Args::parse_from(["hooksmith", "--output", "machine", "a.hks"]);
        assert_eq!(args.output, OutputFormat::Machine);
    }
}
