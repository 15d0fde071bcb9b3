/// End-to-end scanner tests against a real temporary filesystem, in the
/// spirit of the export layouts Takeout actually produces: one top-level
/// folder per product, files nested arbitrarily below.
use std::fs;
use std::io::Write;
use std::path::Path;
use takeout_tax::{Catalog, FolderScanner, FolderStatus, ScanError, TaxCalculator};
use tempfile::TempDir;

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).expect("create test file");
    f.write_all(&vec![0u8; n]).expect("write test file");
}

fn scanner() -> FolderScanner {
    FolderScanner::new(Catalog::builtin(), Vec::new())
}

/// Build the export tree from the reference scenario:
/// `Google Reader` with 10 files, `Gmail` with 5.
fn build_reference_export(root: &Path) {
    let reader = root.join("Google Reader");
    let gmail = root.join("Gmail");
    fs::create_dir_all(reader.join("subscriptions")).expect("create dirs");
    fs::create_dir_all(&gmail).expect("create dirs");

    for i in 0..8 {
        write_bytes(&reader.join(format!("feed-{i}.xml")), 100);
    }
    write_bytes(&reader.join("subscriptions").join("subscriptions.xml"), 50);
    write_bytes(&reader.join("subscriptions").join("starred.json"), 50);

    for i in 0..5 {
        write_bytes(&gmail.join(format!("mail-{i}.mbox")), 200);
    }
}

#[test]
fn missing_root_fails_with_not_found() {
    let tmp = TempDir::new().expect("create temp dir");
    let missing = tmp.path().join("does-not-exist");

    let err = scanner().scan(&missing).expect_err("scan must fail");
    match err {
        ScanError::RootNotFound(path) => assert_eq!(path, missing),
        other => panic!("expected RootNotFound, got {other:?}"),
    }
}

#[test]
fn reference_export_classifies_and_taxes_correctly() {
    let tmp = TempDir::new().expect("create temp dir");
    build_reference_export(tmp.path());

    let results = scanner().scan(tmp.path()).expect("scan succeeds");
    assert_eq!(results.len(), 2);

    let reader = results
        .iter()
        .find(|r| r.folder == "Google Reader")
        .expect("reader result");
    assert_eq!(reader.status, FolderStatus::Dead);
    assert_eq!(reader.file_count, 10);
    let product = reader.product.as_ref().expect("dead result has a record");
    assert_eq!(product.slug, "google-reader");
    assert_eq!(product.date_close.map(|d| d.to_string()).as_deref(), Some("2013-07-01"));
    assert_eq!(product.avg_migration_hours, 3.0);

    let gmail = results
        .iter()
        .find(|r| r.folder == "Gmail")
        .expect("gmail result");
    assert_eq!(gmail.status, FolderStatus::Alive);
    assert_eq!(gmail.file_count, 5);
    assert!(gmail.product.is_none());

    let report = TaxCalculator::new(50.0).calculate(&results);
    assert_eq!(report.total_migration_hours, 3.0);
    assert_eq!(report.data_at_risk_percent, 0);
    assert_eq!(report.opportunity_cost, 150.0);
}

#[test]
fn dead_results_always_carry_a_closed_record() {
    let tmp = TempDir::new().expect("create temp dir");
    build_reference_export(tmp.path());
    fs::create_dir(tmp.path().join("Hangouts")).expect("create dir");
    fs::create_dir(tmp.path().join("Somewhere Odd")).expect("create dir");

    let results = scanner().scan(tmp.path()).expect("scan succeeds");
    for result in results.iter().filter(|r| r.status == FolderStatus::Dead) {
        let product = result
            .product
            .as_ref()
            .unwrap_or_else(|| panic!("{} is dead but has no record", result.folder));
        assert!(
            product.date_close.is_some(),
            "{} matched a record without a close date",
            result.folder
        );
    }
}

#[test]
fn takeout_folder_name_matches_case_insensitively() {
    let tmp = TempDir::new().expect("create temp dir");
    // "Reader" is Google Reader's canonical Takeout folder name.
    fs::create_dir(tmp.path().join("reader")).expect("create dir");

    let results = scanner().scan(tmp.path()).expect("scan succeeds");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, FolderStatus::Dead);
    assert_eq!(
        results[0].product.as_ref().map(|p| p.slug.as_str()),
        Some("google-reader")
    );
}

#[test]
fn hidden_directories_and_plain_files_are_skipped() {
    let tmp = TempDir::new().expect("create temp dir");
    fs::create_dir(tmp.path().join(".hidden")).expect("create dir");
    fs::create_dir(tmp.path().join("Drive")).expect("create dir");
    write_bytes(&tmp.path().join("archive_browser.html"), 100);

    let results = scanner().scan(tmp.path()).expect("scan succeeds");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].folder, "Drive");
}

#[test]
fn ignore_patterns_skip_matching_folders() {
    let tmp = TempDir::new().expect("create temp dir");
    fs::create_dir(tmp.path().join("__MACOSX")).expect("create dir");
    fs::create_dir(tmp.path().join("Takeout backup 1")).expect("create dir");
    fs::create_dir(tmp.path().join("Drive")).expect("create dir");

    let scanner = FolderScanner::new(
        Catalog::builtin(),
        vec!["__MACOSX".to_string(), "Takeout backup *".to_string()],
    );
    let results = scanner.scan(tmp.path()).expect("scan succeeds");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].folder, "Drive");
}

#[test]
fn statistics_cover_the_whole_subtree() {
    let tmp = TempDir::new().expect("create temp dir");
    let deep = tmp.path().join("Drive").join("a").join("b").join("c");
    fs::create_dir_all(&deep).expect("create dirs");
    write_bytes(&tmp.path().join("Drive").join("top.txt"), 300);
    write_bytes(&deep.join("deep.txt"), 700);

    let results = scanner().scan(tmp.path()).expect("scan succeeds");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].file_count, 2);
    assert_eq!(results[0].size_bytes, 1_000);
    let oldest = results[0].oldest_file.expect("files were found");
    let newest = results[0].newest_file.expect("files were found");
    assert!(oldest <= newest);
}

#[test]
fn empty_folder_has_no_timestamps() {
    let tmp = TempDir::new().expect("create temp dir");
    fs::create_dir(tmp.path().join("Stadia")).expect("create dir");

    let results = scanner().scan(tmp.path()).expect("scan succeeds");
    assert_eq!(results[0].file_count, 0);
    assert_eq!(results[0].size_bytes, 0);
    assert!(results[0].oldest_file.is_none());
    assert!(results[0].newest_file.is_none());
}

#[test]
fn scanning_twice_is_idempotent() {
    let tmp = TempDir::new().expect("create temp dir");
    build_reference_export(tmp.path());
    fs::create_dir(tmp.path().join("Google Play Music")).expect("create dir");

    let scanner = scanner();
    let first = scanner.scan(tmp.path()).expect("first scan succeeds");
    let second = scanner.scan(tmp.path()).expect("second scan succeeds");
    assert_eq!(first, second);
}

#[test]
fn results_are_sorted_by_folder_name() {
    let tmp = TempDir::new().expect("create temp dir");
    for name in ["Stadia", "Drive", "Hangouts"] {
        fs::create_dir(tmp.path().join(name)).expect("create dir");
    }

    let results = scanner().scan(tmp.path()).expect("scan succeeds");
    let names: Vec<&str> = results.iter().map(|r| r.folder.as_str()).collect();
    assert_eq!(names, vec!["Drive", "Hangouts", "Stadia"]);
}
