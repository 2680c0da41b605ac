//! Integration tests for error handling and edge cases.

use pdfpack::config::{Config, OverwriteMode};
use pdfpack::error::PdfPackError;
use pdfpack::manifest::read_manifest;
use pdfpack::{Fragment, assemble_to_path, plan};
use std::path::PathBuf;

use crate::common::{fixture_dir, temp_output_path, write_fixture};

#[test]
fn test_error_nonexistent_input() {
    let dir = fixture_dir();
    let output = temp_output_path(&dir);
    let fragments = vec![
        Fragment::new(write_fixture(dir.path(), "f1.pdf", 1), "Table 1"),
        Fragment::new(PathBuf::from("/nonexistent/file.pdf"), "Missing"),
    ];

    let err = assemble_to_path(&Config::new(fragments, &output)).unwrap_err();
    assert!(matches!(err, PdfPackError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(err.is_input_error());
    assert!(!output.exists(), "Failed run should not leave output");
}

#[test]
fn test_error_garbage_pdf() {
    let dir = fixture_dir();
    let garbage = dir.path().join("garbage.pdf");
    std::fs::write(&garbage, b"this is not a pdf").unwrap();
    let output = temp_output_path(&dir);

    let err = assemble_to_path(&Config::new(vec![Fragment::new(garbage, "Bad")], &output))
        .unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(err.is_input_error());
    assert!(!output.exists());
}

#[test]
fn test_error_empty_input_list() {
    let dir = fixture_dir();
    let config = Config::new(vec![], temp_output_path(&dir));

    assert!(matches!(
        assemble_to_path(&config),
        Err(PdfPackError::NoFilesToMerge)
    ));
    assert!(matches!(plan(&config), Err(PdfPackError::NoFilesToMerge)));
}

#[test]
fn test_error_no_clobber_keeps_existing_output() {
    let dir = fixture_dir();
    let output = temp_output_path(&dir);
    std::fs::write(&output, b"existing").unwrap();

    let mut config = Config::new(
        vec![Fragment::new(write_fixture(dir.path(), "f1.pdf", 1), "Table 1")],
        &output,
    );
    config.overwrite_mode = OverwriteMode::NoClobber;

    let err = assemble_to_path(&config).unwrap_err();
    assert!(matches!(err, PdfPackError::OutputExists { .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(std::fs::read(&output).unwrap(), b"existing");
}

#[test]
fn test_force_overwrites_existing_output() {
    let dir = fixture_dir();
    let output = temp_output_path(&dir);
    std::fs::write(&output, b"existing").unwrap();

    let config = Config::new(
        vec![Fragment::new(write_fixture(dir.path(), "f1.pdf", 1), "Table 1")],
        &output,
    );
    assemble_to_path(&config).unwrap();
    assert!(std::fs::read(&output).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_error_output_is_an_input() {
    let dir = fixture_dir();
    let input = write_fixture(dir.path(), "f1.pdf", 1);
    let config = Config::new(vec![Fragment::new(input.clone(), "Table 1")], &input);

    let err = assemble_to_path(&config).unwrap_err();
    assert!(matches!(err, PdfPackError::InvalidConfig { .. }));
}

#[tokio::test]
async fn test_manifest_drives_assembly() {
    let dir = fixture_dir();
    write_fixture(dir.path(), "f1.pdf", 2);
    write_fixture(dir.path(), "f2.pdf", 1);
    let manifest = dir.path().join("toc.json");
    tokio::fs::write(
        &manifest,
        r#"[
            {"source": "f1.pdf", "title": "Table 1"},
            {"source": "f2.pdf", "title": ""}
        ]"#,
    )
    .await
    .unwrap();

    let fragments = read_manifest(&manifest).await.unwrap();
    assert_eq!(fragments[1].title, "f2.pdf");

    let report = assemble_to_path(&Config::new(fragments, temp_output_path(&dir))).unwrap();
    assert_eq!(report.page_count(), 4);
}

#[tokio::test]
async fn test_manifest_errors() {
    let dir = fixture_dir();
    let manifest = dir.path().join("toc.json");
    tokio::fs::write(&manifest, "[]").await.unwrap();

    let err = read_manifest(&manifest).await.unwrap_err();
    assert!(matches!(err, PdfPackError::InvalidManifest { .. }));
    assert_eq!(err.exit_code(), 1);

    let err = read_manifest(&dir.path().join("missing.json"))
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
