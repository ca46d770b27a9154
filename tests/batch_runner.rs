//! Directory batches over temporary record files

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use verdict::corpus::{BatchOptions, BatchRunner, BatchStats};

const COMPLETE: &str = "判決\n主文\n駁回。\n事實及理由\n說明。\n中華民國112年1月2日\n法官";
const EMPTY_MAIN: &str = "判決\n主文\n事實及理由\n說明。\n中華民國112年1月2日\n法官";

fn write_record(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_string(value).unwrap()).unwrap();
}

fn read(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn dirs() -> (TempDir, TempDir) {
    (TempDir::new().unwrap(), TempDir::new().unwrap())
}

#[test]
fn parses_every_record_file() {
    let (input, output) = dirs();
    for i in 0..5 {
        write_record(
            input.path(),
            &format!("case-{i}.json"),
            &json!({ "JID": i, "JFULL": COMPLETE }),
        );
    }
    fs::write(input.path().join("notes.txt"), "ignored").unwrap();

    let options = BatchOptions::new(input.path(), output.path()).with_workers(3);
    let stats = BatchRunner::new(options).run().unwrap();
    assert_eq!(
        stats,
        BatchStats {
            total: 5,
            succeeded: 5,
            failed: 0
        }
    );

    let parsed = read(&output.path().join("case-2_parsed.json"));
    assert_eq!(parsed["JID"], 2);
    assert_eq!(parsed["parsed_judgment"]["Main"], "駁回。");
    assert_eq!(parsed["parsed_judgment"]["Fact and Reason"], "說明。");
    assert!(parsed.get("JFULL").is_none());
    assert!(input.path().join("case-2.json").exists());
}

#[test]
fn incomplete_parses_are_rejected_and_sources_kept() {
    let (input, output) = dirs();
    write_record(input.path(), "good.json", &json!({ "JFULL": COMPLETE }));
    write_record(input.path(), "empty-main.json", &json!({ "JFULL": EMPTY_MAIN }));
    write_record(input.path(), "no-match.json", &json!({ "JFULL": "沒有標記" }));

    let options = BatchOptions::new(input.path(), output.path()).with_delete_source(true);
    let stats = BatchRunner::new(options).run().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.failed, 2);

    assert!(!input.path().join("good.json").exists());
    assert!(input.path().join("empty-main.json").exists());
    assert!(input.path().join("no-match.json").exists());
    assert!(!output.path().join("empty-main_parsed.json").exists());
    assert!(!output.path().join("no-match_parsed.json").exists());
}

#[test]
fn incomplete_parses_pass_when_allowed() {
    let (input, output) = dirs();
    write_record(input.path(), "empty-main.json", &json!({ "JFULL": EMPTY_MAIN }));

    let options = BatchOptions::new(input.path(), output.path())
        .with_require_complete_sections(false);
    let stats = BatchRunner::new(options).run().unwrap();
    assert_eq!(stats.succeeded, 1);

    let parsed = read(&output.path().join("empty-main_parsed.json"));
    assert_eq!(parsed["parsed_judgment"]["Main"], "");
    assert_eq!(parsed["parsed_judgment"]["pattern"], json!(["中華民國年月日", "主文", "事實及理由"]));
}

#[test]
fn array_files_and_invalid_files() {
    let (input, output) = dirs();
    write_record(
        input.path(),
        "many.json",
        &json!([{ "JFULL": COMPLETE }, { "JFULL": COMPLETE }, { "meta": true }]),
    );
    write_record(input.path(), "metadata-only.json", &json!({ "JID": "x" }));
    fs::write(input.path().join("broken.json"), "{ not json").unwrap();

    let runner = BatchRunner::new(BatchOptions::new(input.path(), output.path()).with_workers(8));
    let stats = runner.run().unwrap();
    assert_eq!(
        stats,
        BatchStats {
            total: 3,
            succeeded: 1,
            failed: 2
        }
    );

    let parsed = read(&output.path().join("many_parsed.json"));
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[1]["parsed_judgment"]["Main"], "駁回。");
    assert_eq!(items[2], json!({ "meta": true }));
}

#[test]
fn custom_suffix_and_fields() {
    let (input, output) = dirs();
    write_record(input.path(), "a.json", &json!({ "text": COMPLETE }));

    let record = verdict::corpus::RecordOptions {
        text_field: "text".into(),
        output_field: "sections".into(),
    };
    let options = BatchOptions::new(input.path(), output.path())
        .with_output_suffix("_sections")
        .with_record(record);
    let runner = BatchRunner::new(options);
    let written = runner.process_file(&input.path().join("a.json")).unwrap();

    assert_eq!(written, output.path().join("a_sections.json"));
    assert_eq!(read(&written)["sections"]["Main"], "駁回。");
}

#[test]
fn empty_directory_yields_zero_stats() {
    let (input, output) = dirs();
    let nested = output.path().join("nested/out");
    let stats = BatchRunner::new(BatchOptions::new(input.path(), &nested))
        .run()
        .unwrap();
    assert_eq!(stats, BatchStats::default());
    assert!(nested.is_dir());
}

#[test]
fn stricter_rerun_removes_earlier_output() {
    let (input, output) = dirs();
    write_record(input.path(), "empty-main.json", &json!({ "JFULL": EMPTY_MAIN }));
    let written = output.path().join("empty-main_parsed.json");

    let lax = BatchOptions::new(input.path(), output.path()).with_require_complete_sections(false);
    let first = BatchRunner::new(lax).run().unwrap();
    assert_eq!(first.succeeded, 1);
    assert!(written.exists());

    let strict = BatchOptions::new(input.path(), output.path());
    let second = BatchRunner::new(strict).run().unwrap();
    assert_eq!(
        second,
        BatchStats {
            total: 1,
            succeeded: 0,
            failed: 1
        }
    );
    assert!(!written.exists());
    assert!(input.path().join("empty-main.json").exists());
}

#[test]
fn unreadable_source_clears_stale_output() {
    let (input, output) = dirs();
    fs::write(input.path().join("broken.json"), "{ not json").unwrap();
    let stale = output.path().join("broken_parsed.json");
    fs::write(&stale, "{}").unwrap();

    let runner = BatchRunner::new(BatchOptions::new(input.path(), output.path()));
    assert!(runner.process_file(&input.path().join("broken.json")).is_err());
    assert!(!stale.exists());
}
