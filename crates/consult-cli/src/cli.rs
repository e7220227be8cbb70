//! CLI argument definitions for the dataset builder.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "consult-dataset",
    version,
    about = "Build a patient-centered dataset from consultation transcripts",
    long_about = "Build a patient-centered dataset from psychiatric consultation transcripts.\n\n\
                  Transcripts are merged per patient by the sequence number in their file\n\
                  name and joined with GAD-7 / PHQ-9 self-report scores from a CSV table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient names and file names in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the dataset from a transcript folder and a scale table.
    Build(BuildArgs),

    /// Show what would be read from transcript file names.
    ParseName(ParseNameArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Folder containing the transcript files.
    #[arg(value_name = "TRANSCRIPT_DIR")]
    pub source_dir: PathBuf,

    /// CSV table of GAD-7 / PHQ-9 scores keyed by sequence number.
    #[arg(long = "scales", value_name = "CSV")]
    pub scales: PathBuf,

    /// Output file (default: <TRANSCRIPT_DIR>/output/dataset.json).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format (default: inferred from the output extension).
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// TOML file with transcript, scale, and output options.
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Transcript text encoding (overrides the config file).
    #[arg(long = "encoding", value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Encoding to try when the primary one fails; repeatable.
    #[arg(long = "fallback-encoding", value_name = "LABEL")]
    pub fallback_encodings: Vec<String>,

    /// Assemble and report without writing the dataset.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Exit with status 1 when any file or scale row was skipped.
    #[arg(long = "fail-on-errors")]
    pub fail_on_errors: bool,
}

#[derive(Parser)]
pub struct ParseNameArgs {
    /// File names or stems, e.g. "10086，张三 男 34岁".
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Json,
    Jsonl,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_arguments() {
        let cli = Cli::try_parse_from([
            "consult-dataset",
            "build",
            "transcripts",
            "--scales",
            "scales.csv",
            "--fallback-encoding",
            "gb18030",
            "--fallback-encoding",
            "big5",
            "--format",
            "jsonl",
            "--dry-run",
        ])
        .unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args.source_dir, PathBuf::from("transcripts"));
        assert_eq!(args.fallback_encodings, vec!["gb18030", "big5"]);
        assert_eq!(args.format, Some(OutputFormatArg::Jsonl));
        assert!(args.dry_run);
        assert!(!args.fail_on_errors);
    }

    #[test]
    fn scales_are_required() {
        assert!(Cli::try_parse_from(["consult-dataset", "build", "transcripts"]).is_err());
    }

    #[test]
    fn parse_name_needs_a_name() {
        assert!(Cli::try_parse_from(["consult-dataset", "parse-name"]).is_err());
        let cli = Cli::try_parse_from(["consult-dataset", "--log-data", "parse-name", "1 甲"]).unwrap();
        assert!(cli.log_data);
    }
}
