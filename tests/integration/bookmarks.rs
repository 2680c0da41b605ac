//! Integration tests for outline handling across merge and assembly.

use lopdf::Document;
use pdfpack::config::TocLayout;
use pdfpack::merge::BookmarkManager;
use pdfpack::toc::Helvetica;
use pdfpack::{Fragment, assemble, merge};

use crate::common::{fixture_dir, write_fixture};

#[test]
fn test_merged_body_bookmarks_are_fragment_starts() {
    let dir = fixture_dir();
    let body = merge(&[
        Fragment::new(write_fixture(dir.path(), "f1.pdf", 2), "Table 1"),
        Fragment::new(write_fixture(dir.path(), "f2.pdf", 5), "Table 2"),
        Fragment::new(write_fixture(dir.path(), "f3.pdf", 1), "Listing 3"),
    ])
    .unwrap();

    assert_eq!(body.page_count, 8);
    assert_eq!(body.fragment_page_counts, vec![2, 5, 1]);
    let starts: Vec<usize> = body.bookmarks.iter().map(|b| b.page_index).collect();
    assert_eq!(starts, vec![0, 2, 7]);
    assert!(body.bookmarks.iter().all(|b| b.level == 1));
}

#[test]
fn test_existing_outlines_are_replaced() {
    let dir = fixture_dir();
    let first = write_fixture(dir.path(), "f1.pdf", 2);

    let mut doc = Document::load(&first).unwrap();
    let manager = BookmarkManager::new();
    manager
        .write_bookmarks(
            &mut doc,
            &[pdfpack::BookmarkEntry::new("Stale chapter", 1)],
        )
        .unwrap();
    let outlined = dir.path().join("outlined.pdf");
    doc.save(&outlined).unwrap();

    let body = merge(&[
        Fragment::new(outlined, "Table 1"),
        Fragment::new(write_fixture(dir.path(), "f2.pdf", 1), "Table 2"),
    ])
    .unwrap();

    let bookmarks = manager.read_bookmarks(&body.document).unwrap();
    let titles: Vec<&str> = bookmarks.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Table 1", "Table 2"]);
}

#[test]
fn test_non_ascii_titles_survive_round_trip() {
    let dir = fixture_dir();
    let body = merge(&[Fragment::new(
        write_fixture(dir.path(), "f1.pdf", 1),
        "Tabelle 1 Größe",
    )])
    .unwrap();

    let assembled = assemble(body, &TocLayout::default(), &Helvetica).unwrap();
    let bookmarks = BookmarkManager::new()
        .read_bookmarks(&assembled.document)
        .unwrap();
    assert_eq!(bookmarks[0].title, "Tabelle 1 Größe");
    assert_eq!(bookmarks[0].page_index, 1);
}
