use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info_span;

use consult_core::{PipelineRequest, parse_filename, run_pipeline};
use consult_model::PipelineOptions;
use consult_output::{OutputFormat, write_dataset};

use crate::cli::{BuildArgs, OutputFormatArg, ParseNameArgs};
use crate::types::{BuildResult, ParsedName};

pub fn run_build(args: &BuildArgs) -> Result<BuildResult> {
    let options = load_options(args)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.source_dir));
    let format = match args.format {
        Some(OutputFormatArg::Json) => OutputFormat::Json,
        Some(OutputFormatArg::Jsonl) => OutputFormat::Jsonl,
        None => OutputFormat::from_path(&output),
    };

    let request = PipelineRequest {
        source_dir: args.source_dir.clone(),
        scale_path: args.scales.clone(),
        options,
    };
    let run = run_pipeline(&request)?;

    let written = if args.dry_run {
        tracing::info!("dry run, dataset not written");
        Vec::new()
    } else {
        let _span = info_span!("write", format = %format).entered();
        let written = write_dataset(&output, &run.dataset, format)
            .with_context(|| format!("write dataset {}", output.display()))?;
        tracing::info!(
            path = %output.display(),
            patients = run.dataset.patients.len(),
            "dataset written"
        );
        written
    };

    Ok(BuildResult {
        run,
        output,
        format,
        written,
        dry_run: args.dry_run,
    })
}

/// Config file values first, then command-line overrides.
fn load_options(args: &BuildArgs) -> Result<PipelineOptions> {
    let mut options = match &args.config {
        Some(path) => PipelineOptions::from_toml_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => PipelineOptions::default(),
    };
    if let Some(encoding) = &args.encoding {
        options.transcripts.encoding.clone_from(encoding);
    }
    if !args.fallback_encodings.is_empty() {
        options
            .transcripts
            .fallback_encodings
            .clone_from(&args.fallback_encodings);
    }
    Ok(options)
}

fn default_output(source_dir: &Path) -> PathBuf {
    source_dir.join("output").join("dataset.json")
}

pub fn run_parse_name(args: &ParseNameArgs) -> Vec<ParsedName> {
    args.names
        .iter()
        .map(|input| {
            let stem = Path::new(input)
                .file_stem()
                .map_or_else(|| input.clone(), |stem| stem.to_string_lossy().into_owned());
            ParsedName {
                input: input.clone(),
                outcome: parse_filename(&stem).map_err(|error| error.to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use consult_model::Gender;

    fn build_args(source_dir: &str) -> BuildArgs {
        BuildArgs {
            source_dir: PathBuf::from(source_dir),
            scales: PathBuf::from("scales.csv"),
            output: None,
            format: None,
            config: None,
            encoding: None,
            fallback_encodings: Vec::new(),
            dry_run: false,
            fail_on_errors: false,
        }
    }

    #[test]
    fn flags_override_defaults() {
        let mut args = build_args("in");
        args.encoding = Some("gb18030".to_string());
        args.fallback_encodings = vec!["big5".to_string()];
        let options = load_options(&args).unwrap();
        assert_eq!(options.transcripts.encoding, "gb18030");
        assert_eq!(options.transcripts.fallback_encodings, vec!["big5"]);
        assert_eq!(options.scales.id_column, "序号");
    }

    #[test]
    fn missing_config_is_an_error() {
        let mut args = build_args("in");
        args.config = Some(PathBuf::from("/definitely/not/here.toml"));
        let err = load_options(&args).unwrap_err();
        assert!(format!("{err:#}").contains("here.toml"));
    }

    #[test]
    fn default_output_lives_under_source() {
        assert_eq!(
            default_output(Path::new("in")),
            Path::new("in").join("output").join("dataset.json")
        );
    }

    #[test]
    fn parse_name_strips_extension() {
        let args = ParseNameArgs {
            names: vec!["10087 李四 女.txt".to_string(), "无编号".to_string()],
        };
        let parsed = run_parse_name(&args);
        let meta = parsed[0].outcome.as_ref().unwrap();
        assert_eq!(meta.name, "李四");
        assert_eq!(meta.gender, Some(Gender::Female));
        assert!(parsed[1].outcome.is_err());
    }
}
