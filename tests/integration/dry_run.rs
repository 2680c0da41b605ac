//! Integration tests for dry-run planning.

use pdfpack::config::Config;
use pdfpack::{Fragment, plan};

use crate::common::{fixture_dir, temp_output_path, write_fixture};

#[test]
fn test_dry_run_creates_no_output() {
    let dir = fixture_dir();
    let fragments = vec![
        Fragment::new(write_fixture(dir.path(), "f1.pdf", 2), "Table 1"),
        Fragment::new(write_fixture(dir.path(), "f2.pdf", 5), "Table 2"),
        Fragment::new(write_fixture(dir.path(), "f3.pdf", 1), "Listing 3"),
    ];
    let output = temp_output_path(&dir);

    let mut config = Config::new(fragments, &output);
    config.dry_run = true;
    let plan = plan(&config).unwrap();

    assert!(!output.exists(), "Dry run should not create output");
    assert_eq!(plan.toc_page_count, 1);
    assert_eq!(plan.body_page_count, 8);
    assert_eq!(plan.total_page_count, 9);

    let starts: Vec<usize> = plan.fragments.iter().map(|f| f.start_page).collect();
    assert_eq!(starts, vec![2, 4, 9]);
}

#[test]
fn test_dry_run_banner_can_add_a_page() {
    let dir = fixture_dir();
    let source = write_fixture(dir.path(), "one.pdf", 1);
    // 60 single-line entries fit one page without a banner but not with one.
    let fragments: Vec<Fragment> = (1..=60)
        .map(|n| Fragment::new(source.clone(), format!("Table {n}")))
        .collect();

    let config = Config::new(fragments.clone(), temp_output_path(&dir));
    assert_eq!(plan(&config).unwrap().toc_page_count, 1);

    let mut config = Config::new(fragments, temp_output_path(&dir));
    config.layout = config.layout.with_banner("Table of Contents");
    assert_eq!(plan(&config).unwrap().toc_page_count, 2);
}

#[test]
fn test_dry_run_plan_serialises() {
    let dir = fixture_dir();
    let fragments = vec![Fragment::new(
        write_fixture(dir.path(), "f1.pdf", 2),
        "Table 1",
    )];
    let config = Config::new(fragments, temp_output_path(&dir));

    let json = serde_json::to_value(plan(&config).unwrap()).unwrap();
    assert_eq!(json["total_page_count"], 3);
    assert_eq!(json["fragments"][0]["title"], "Table 1");
    assert_eq!(json["fragments"][0]["start_page"], 2);
}
