//! `build` and `parse-name` commands against a temporary transcript folder.

use std::path::{Path, PathBuf};

use consult_cli::cli::{BuildArgs, OutputFormatArg, ParseNameArgs};
use consult_cli::commands::{run_build, run_parse_name};
use consult_output::OutputFormat;
use tempfile::TempDir;

const SCALES: &str = "序号,G1,G2,G3,G4,G5,G6,G7,P1,P2,P3,P4,P5,P6,P7,P8,P9\n\
10086,1,2,1,0,3,2,1,1,1,1,1,1,1,1,1,1\n";

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let transcripts = dir.path().join("transcripts");
    std::fs::create_dir_all(&transcripts).unwrap();
    std::fs::write(
        transcripts.join("10086 张三 男 34岁.txt"),
        "关键词：失眠\n【医生】你好\n【P（妈妈）】他最近睡不好",
    )
    .unwrap();
    std::fs::write(dir.path().join("scales.csv"), SCALES).unwrap();
    dir
}

fn args(dir: &Path) -> BuildArgs {
    BuildArgs {
        source_dir: dir.join("transcripts"),
        scales: dir.join("scales.csv"),
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
fn build_writes_json_under_source_by_default() {
    let dir = fixture();
    let result = run_build(&args(dir.path())).unwrap();

    let expected: PathBuf = dir.path().join("transcripts/output/dataset.json");
    assert_eq!(result.written, vec![expected.clone()]);
    assert_eq!(result.format, OutputFormat::Json);
    assert!(!result.has_errors());

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&expected).unwrap()).unwrap();
    let patient = &value["patients"][0];
    assert_eq!(patient["patient_id"], "P-010086");
    assert_eq!(patient["keywords"][0], "失眠");
    assert_eq!(patient["scales"][0]["respondent_role"], "self");
    assert_eq!(patient["scales"][0]["PHQ-9"]["total"], 9);
    let turns = &patient["visits"][0]["dialogue"]["turns"];
    assert_eq!(turns[1]["role"], "caregiver");
    assert_eq!(turns[1]["speaker_note"], "妈妈");
    assert!(turns[0].get("speaker_note").is_none());
}

#[test]
fn output_extension_selects_jsonl() {
    let dir = fixture();
    let mut build = args(dir.path());
    build.output = Some(dir.path().join("out/dataset.jsonl"));
    let result = run_build(&build).unwrap();

    assert_eq!(result.format, OutputFormat::Jsonl);
    assert_eq!(result.written.len(), 2);
    assert!(dir.path().join("out/dataset.stats.json").exists());
}

#[test]
fn explicit_format_wins_over_extension() {
    let dir = fixture();
    let mut build = args(dir.path());
    build.output = Some(dir.path().join("dataset.jsonl"));
    build.format = Some(OutputFormatArg::Json);
    let result = run_build(&build).unwrap();
    assert_eq!(result.format, OutputFormat::Json);
    assert_eq!(result.written.len(), 1);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = fixture();
    let mut build = args(dir.path());
    build.dry_run = true;
    let result = run_build(&build).unwrap();

    assert!(result.written.is_empty());
    assert_eq!(result.run.dataset.patients.len(), 1);
    assert!(!dir.path().join("transcripts/output").exists());
}

#[test]
fn skipped_files_surface_as_errors() {
    let dir = fixture();
    std::fs::write(dir.path().join("transcripts/说明.txt"), "随访说明").unwrap();
    let result = run_build(&args(dir.path())).unwrap();

    assert!(result.has_errors());
    assert_eq!(result.run.dataset.stats.failed_files, 1);
    assert_eq!(result.run.dataset.patients.len(), 1);
}

#[test]
fn config_file_is_applied() {
    let dir = fixture();
    let scales = "编号,G1,G2,G3,G4,G5,G6,G7,P1,P2,P3,P4,P5,P6,P7,P8,P9\n\
                  10086,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0\n";
    std::fs::write(dir.path().join("scales.csv"), scales).unwrap();
    let config = dir.path().join("consult.toml");
    std::fs::write(&config, "[scales]\nid_column = \"编号\"\n\n[output]\nschema_version = \"0.3\"\n")
        .unwrap();

    let mut build = args(dir.path());
    build.config = Some(config);
    build.dry_run = true;
    let result = run_build(&build).unwrap();

    assert_eq!(result.run.dataset.dataset_meta.schema_version, "0.3");
    assert_eq!(result.run.dataset.stats.patients_with_scales, 1);
}

#[test]
fn missing_scale_table_fails_before_output() {
    let dir = fixture();
    std::fs::remove_file(dir.path().join("scales.csv")).unwrap();
    let err = run_build(&args(dir.path())).unwrap_err();

    assert!(format!("{err:#}").contains("scales.csv"));
    assert!(!dir.path().join("transcripts/output").exists());
}

#[test]
fn parse_name_reports_each_input() {
    let parsed = run_parse_name(&ParseNameArgs {
        names: vec!["10086，10087 张三 男 34岁".to_string(), "张三".to_string()],
    });
    assert_eq!(parsed.len(), 2);
    let meta = parsed[0].outcome.as_ref().unwrap();
    assert_eq!(meta.sequences().count(), 2);
    assert_eq!(meta.age, Some(34));
    assert_eq!(
        parsed[1].outcome.as_ref().unwrap_err(),
        "filename does not start with a sequence number"
    );
}
