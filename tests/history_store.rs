use std::fs;

use chrono::Utc;
use tempfile::TempDir;

use typedash::config::Config;
use typedash::generator::Difficulty;
use typedash::session::{ResultSink, TestResult};
use typedash::store::history::{ANONYMOUS, ResultHistory};
use typedash::store::json_store::{JsonStore, RESULTS_FILE};

fn result(correct: usize) -> TestResult {
    TestResult::from_counts(correct, correct, 60, 0, Difficulty::Medium, Utc::now())
}

fn store_in(dir: &TempDir) -> JsonStore {
    JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap()
}

#[test]
fn results_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut history = ResultHistory::open(store_in(&dir), 100);
        history.set_user_name("grace");
        history.submit(result(250));
        history.submit(result(300));
    }

    let reopened = ResultHistory::open(store_in(&dir), 100);
    assert_eq!(reopened.user_name(), Some("grace"));
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.latest().map(|r| r.result.wpm), Some(60));
    assert!(reopened.records().iter().all(|r| r.user_name == "grace"));
}

#[test]
fn results_without_a_name_are_anonymous() {
    let dir = TempDir::new().unwrap();
    let mut history = ResultHistory::open(store_in(&dir), 10);
    history.submit(result(50));
    assert_eq!(history.records()[0].user_name, ANONYMOUS);
}

#[test]
fn history_limit_drops_oldest() {
    let dir = TempDir::new().unwrap();
    let mut history = ResultHistory::open(store_in(&dir), 3);
    for correct in [50, 100, 150, 200, 250] {
        history.submit(result(correct));
    }
    let wpms: Vec<u32> = history.records().iter().map(|r| r.result.wpm).collect();
    assert_eq!(wpms, vec![30, 40, 50]);

    let reopened = ResultHistory::open(store_in(&dir), 3);
    assert_eq!(reopened.len(), 3);
}

#[test]
fn corrupt_results_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(RESULTS_FILE), "{not json").unwrap();
    let history = ResultHistory::open(store_in(&dir), 10);
    assert!(history.is_empty());
}

#[test]
fn export_then_import_into_another_directory() {
    let source_dir = TempDir::new().unwrap();
    let mut history = ResultHistory::open(store_in(&source_dir), 10);
    history.set_user_name("linus");
    history.submit(result(120));

    let export_path = source_dir.path().join("backup").join("export.json");
    let exported = store_in(&source_dir)
        .export_to_file(&Config::default(), &export_path)
        .unwrap();
    assert_eq!(exported.history.results.len(), 1);

    let target_dir = TempDir::new().unwrap();
    let target = store_in(&target_dir);
    let data = JsonStore::read_export(&export_path).unwrap();
    target.import_all(&data).unwrap();

    let imported = ResultHistory::open(target, 10);
    assert_eq!(imported.user_name(), Some("linus"));
    assert_eq!(imported.len(), 1);
    assert!(!target_dir.path().join("results.json.bak").exists());
}

#[test]
fn reading_a_non_export_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("junk.json");
    fs::write(&path, "[1, 2, 3]").unwrap();
    assert!(JsonStore::read_export(&path).is_err());
}
