//! End-to-end runs over a small transcript directory and scale table.

use std::path::{Path, PathBuf};

use consult_core::{MergeWarning, PipelineRequest, PipelineRun, run_pipeline};
use consult_model::{Gender, PipelineOptions, Role, SequenceNumber, Stats, Turn};
use tempfile::TempDir;

const SCALE_HEADER: &str = "序号,姓名,G1,G2,G3,G4,G5,G6,G7,P1,P2,P3,P4,P5,P6,P7,P8,P9";

struct Fixture {
    _dir: TempDir,
    transcripts: PathBuf,
    scales: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let transcripts = dir.path().join("transcripts");
        std::fs::create_dir_all(&transcripts).unwrap();
        let scales = dir.path().join("scales.csv");
        let rows = [
            SCALE_HEADER,
            "10086,张三,1,2,1,0,3,2,1,0,1,0,1,0,1,0,1,0",
            "20000,赵七,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0",
        ];
        std::fs::write(&scales, rows.join("\n")).unwrap();

        let fixture = Self {
            _dir: dir,
            transcripts,
            scales,
        };
        fixture.write(
            "10086，张三 男 34岁.txt",
            "关键词：失眠、焦虑\n【医生】最近睡眠怎么样？\n【病人】不好。\n（思考）\n【医生】持续多久了？",
        );
        fixture.write("10087 李四 女.txt", "【医生】你好\n【P（妈妈）】孩子最近不爱说话");
        fixture
    }

    fn write(&self, name: &str, text: &str) {
        std::fs::write(self.transcripts.join(name), text).unwrap();
    }

    fn write_bytes(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.transcripts.join(name), bytes).unwrap();
    }

    fn run(&self) -> PipelineRun {
        run_pipeline(&request(&self.transcripts, &self.scales)).unwrap()
    }
}

fn request(source_dir: &Path, scale_path: &Path) -> PipelineRequest {
    PipelineRequest {
        source_dir: source_dir.to_path_buf(),
        scale_path: scale_path.to_path_buf(),
        options: PipelineOptions::default(),
    }
}

#[test]
fn filename_demographics_reach_patients() {
    let run = Fixture::new().run();
    let patients = &run.dataset.patients;
    assert_eq!(patients.len(), 2);

    assert_eq!(patients[0].patient_id.as_str(), "P-010086");
    assert_eq!(patients[0].name, "张三");
    assert_eq!(patients[0].gender, Some(Gender::Male));
    assert_eq!(patients[0].age, Some(34));

    assert_eq!(patients[1].patient_id.as_str(), "P-010087");
    assert_eq!(patients[1].name, "李四");
    assert_eq!(patients[1].gender, Some(Gender::Female));
    assert_eq!(patients[1].age, None);
}

#[test]
fn visits_split_on_markers() {
    let run = Fixture::new().run();
    let visits = &run.dataset.patients[0].visits;
    assert_eq!(visits.len(), 2);
    assert_eq!(visits[0].visit_id.as_str(), "V-010086-1");
    assert_eq!(
        visits[0].dialogue.turns,
        vec![
            Turn::new(Role::Doctor, "最近睡眠怎么样？"),
            Turn::new(Role::Patient, "不好。"),
        ]
    );
    assert_eq!(visits[1].visit_id.as_str(), "V-010086-2");
    assert_eq!(
        visits[1].dialogue.turns,
        vec![Turn::new(Role::Doctor, "持续多久了？")]
    );
    assert_eq!(visits[1].dialogue.source_file, "10086，张三 男 34岁.txt");
    assert_eq!(run.dataset.patients[0].keywords, vec!["失眠", "焦虑"]);
}

#[test]
fn caregiver_note_from_tag() {
    let run = Fixture::new().run();
    let turns = &run.dataset.patients[1].visits[0].dialogue.turns;
    assert_eq!(turns[1].role, Role::Caregiver);
    assert_eq!(turns[1].speaker_note.as_deref(), Some("妈妈"));
}

#[test]
fn scale_totals_are_joined() {
    let run = Fixture::new().run();
    let scales = &run.dataset.patients[0].scales;
    assert_eq!(scales.len(), 1);
    assert_eq!(scales[0].gad7.items(), &[1, 2, 1, 0, 3, 2, 1]);
    assert_eq!(scales[0].gad7.total(), 10);
    assert_eq!(scales[0].phq9.total(), 4);
    assert!(run.dataset.patients[1].scales.is_empty());
    assert_eq!(run.scale_records, 2);
}

#[test]
fn merge_warnings_name_both_sides() {
    let run = Fixture::new().run();
    assert_eq!(
        run.warnings,
        vec![
            MergeWarning::MissingScale {
                patient_id: SequenceNumber::new(10087).patient_id()
            },
            MergeWarning::UnmatchedScaleRow {
                sequence: SequenceNumber::new(20000)
            },
        ]
    );
}

#[test]
fn bad_filename_is_counted_and_skipped() {
    let fixture = Fixture::new();
    let baseline = fixture.run().dataset.stats;

    fixture.write("张三复诊.txt", "【医生】你好");
    let run = fixture.run();
    let stats = &run.dataset.stats;

    assert_eq!(run.dataset.patients.len(), 2);
    assert_eq!(stats.total_files, baseline.total_files + 1);
    assert_eq!(stats.failed_files, baseline.failed_files + 1);
    assert_eq!(stats.converted_files, baseline.converted_files);
    assert_eq!(stats.errors.len(), 1);
    assert_eq!(stats.errors[0].file, "张三复诊.txt");
}

#[test]
fn undecodable_file_is_counted_and_skipped() {
    let fixture = Fixture::new();
    fixture.write_bytes("3 王五.txt", &[0xC4, 0xE3, 0xBA, 0xC3]);
    let run = fixture.run();

    assert_eq!(run.dataset.patients.len(), 2);
    assert_eq!(run.dataset.stats.failed_files, 1);
    assert_eq!(run.dataset.stats.errors[0].file, "3 王五.txt");
    assert!(run.dataset.stats.errors[0].message.contains("UTF-8"));
}

#[test]
fn fallback_encoding_recovers_file() {
    let fixture = Fixture::new();
    // "【医生】你好" in GBK.
    fixture.write_bytes(
        "3 王五.txt",
        &[0xA1, 0xBE, 0xD2, 0xBD, 0xC9, 0xFA, 0xA1, 0xBF, 0xC4, 0xE3, 0xBA, 0xC3],
    );
    let mut request = request(&fixture.transcripts, &fixture.scales);
    request.options.transcripts.fallback_encodings = vec!["gb18030".to_string()];
    let run = run_pipeline(&request).unwrap();

    assert_eq!(run.dataset.stats.failed_files, 0);
    let patient = &run.dataset.patients[2];
    assert_eq!(patient.name, "王五");
    assert_eq!(
        patient.visits[0].dialogue.turns,
        vec![Turn::new(Role::Doctor, "你好")]
    );
}

#[test]
fn bad_scale_rows_become_stats_errors() {
    let fixture = Fixture::new();
    let rows = [
        SCALE_HEADER,
        "10086,张三,1,2,1,0,3,2,1,0,1,0,1,0,1,0,1,0",
        "10087,李四,1,2,x,0,3,2,1,0,1,0,1,0,1,0,1,0",
    ];
    std::fs::write(&fixture.scales, rows.join("\n")).unwrap();
    let run = fixture.run();
    let stats = &run.dataset.stats;

    assert_eq!(stats.failed_files, 0);
    assert_eq!(stats.errors.len(), 1);
    assert!(stats.errors[0].file.ends_with("scales.csv"));
    assert!(stats.errors[0].message.starts_with("row 3 (sequence 10087)"));
}

#[test]
fn stats_counters() {
    let run = Fixture::new().run();
    let stats = Stats {
        errors: Vec::new(),
        ..run.dataset.stats
    };
    insta::assert_json_snapshot!(stats, @r#"
    {
      "total_files": 2,
      "converted_files": 2,
      "failed_files": 0,
      "patients_with_keywords": 1,
      "patients_with_gender": 2,
      "patients_with_age": 1,
      "patients_with_scales": 1,
      "total_visits": 3,
      "errors": []
    }
    "#);
}

#[test]
fn dataset_meta_is_filled() {
    let fixture = Fixture::new();
    let run = fixture.run();
    let meta = &run.dataset.dataset_meta;
    assert_eq!(meta.schema_version, "0.2");
    assert!(meta.patient_centered);
    assert_eq!(meta.source_dir, fixture.transcripts.display().to_string());
    assert_eq!(meta.date_processing.len(), 10);
}

#[test]
fn missing_inputs_are_fatal() {
    let fixture = Fixture::new();
    let missing = fixture.transcripts.join("nope");
    assert!(run_pipeline(&request(&missing, &fixture.scales)).is_err());
    assert!(run_pipeline(&request(&fixture.transcripts, &missing)).is_err());
}
