//! Integration tests for end-to-end assembly.

use lopdf::{Document, Object};
use pdfpack::config::{CompressionLevel, Config};
use pdfpack::merge::BookmarkManager;
use pdfpack::{Fragment, assemble_to_path};

use crate::common::{fixture_dir, page_ids, page_label, temp_output_path, write_fixture};

fn uncompressed_config(fragments: Vec<Fragment>, output: &std::path::Path) -> Config {
    let mut config = Config::new(fragments, output);
    config.compression = CompressionLevel::None;
    config.quiet = true;
    config
}

#[test]
fn test_three_fragments_get_one_toc_page() {
    let dir = fixture_dir();
    let fragments = vec![
        Fragment::new(write_fixture(dir.path(), "f1.pdf", 2), "Table 1"),
        Fragment::new(write_fixture(dir.path(), "f2.pdf", 5), "Table 2"),
        Fragment::new(write_fixture(dir.path(), "f3.pdf", 1), "Listing 3"),
    ];
    let output = temp_output_path(&dir);

    let report = assemble_to_path(&uncompressed_config(fragments, &output)).unwrap();
    assert_eq!(report.fragments, 3);
    assert_eq!(report.toc_page_count, 1);
    assert_eq!(report.body_page_count, 8);
    assert_eq!(report.page_count(), 9);
    assert!(output.exists(), "Output file was not created");

    let doc = Document::load(&output).unwrap();
    let ids = page_ids(&doc);
    assert_eq!(ids.len(), 9);
    assert_eq!(page_label(&doc, ids[1]), "f1.pdf 1");
    assert_eq!(page_label(&doc, ids[3]), "f2.pdf 1");
    assert_eq!(page_label(&doc, ids[8]), "f3.pdf 1");
}

#[test]
fn test_toc_page_lists_titles_and_numbers() {
    let dir = fixture_dir();
    let fragments = vec![
        Fragment::new(write_fixture(dir.path(), "f1.pdf", 2), "Table 1"),
        Fragment::new(write_fixture(dir.path(), "f2.pdf", 5), "Table 2"),
    ];
    let output = temp_output_path(&dir);
    assemble_to_path(&uncompressed_config(fragments, &output)).unwrap();

    let doc = Document::load(&output).unwrap();
    let toc_text = page_label(&doc, page_ids(&doc)[0]);
    assert!(toc_text.contains("Table 1"));
    assert!(toc_text.contains("Table 2"));
    // Displayed numbers are 1-based and include the TOC page.
    assert!(toc_text.contains('2'));
    assert!(toc_text.contains('4'));
}

#[test]
fn test_toc_rows_link_to_fragment_starts() {
    let dir = fixture_dir();
    let fragments = vec![
        Fragment::new(write_fixture(dir.path(), "f1.pdf", 2), "Table 1"),
        Fragment::new(write_fixture(dir.path(), "f2.pdf", 5), "Table 2"),
        Fragment::new(write_fixture(dir.path(), "f3.pdf", 1), "Listing 3"),
    ];
    let output = temp_output_path(&dir);
    assemble_to_path(&uncompressed_config(fragments, &output)).unwrap();

    let doc = Document::load(&output).unwrap();
    let ids = page_ids(&doc);
    let toc_page = doc.get_dictionary(ids[0]).unwrap();
    let annots = toc_page.get(b"Annots").and_then(Object::as_array).unwrap();
    assert_eq!(annots.len(), 3);

    let targets: Vec<_> = annots
        .iter()
        .map(|annot| {
            let annot = match annot {
                Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
                other => other.as_dict().unwrap(),
            };
            assert_eq!(annot.get(b"Subtype").unwrap().as_name().unwrap(), b"Link");
            let dest = annot.get(b"Dest").and_then(Object::as_array).unwrap();
            dest[0].as_reference().unwrap()
        })
        .collect();
    assert_eq!(targets, vec![ids[1], ids[3], ids[8]]);
}

#[test]
fn test_outline_points_at_shifted_pages() {
    let dir = fixture_dir();
    let fragments = vec![
        Fragment::new(write_fixture(dir.path(), "f1.pdf", 2), "Table 1"),
        Fragment::new(write_fixture(dir.path(), "f2.pdf", 5), "Table 2"),
        Fragment::new(write_fixture(dir.path(), "f3.pdf", 1), "Listing 3"),
    ];
    let output = temp_output_path(&dir);
    assemble_to_path(&uncompressed_config(fragments, &output)).unwrap();

    let doc = Document::load(&output).unwrap();
    let bookmarks = BookmarkManager::new().read_bookmarks(&doc).unwrap();
    let pages: Vec<usize> = bookmarks.iter().map(|b| b.page_index).collect();
    let titles: Vec<&str> = bookmarks.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(pages, vec![1, 3, 8]);
    assert_eq!(titles, vec!["Table 1", "Table 2", "Listing 3"]);
}

#[test]
fn test_blank_title_uses_file_name() {
    let dir = fixture_dir();
    let fragments = vec![
        Fragment::new(write_fixture(dir.path(), "f1.pdf", 1), "Table 1"),
        Fragment::new(write_fixture(dir.path(), "f2.pdf", 1), "   "),
    ];
    let output = temp_output_path(&dir);
    assemble_to_path(&uncompressed_config(fragments, &output)).unwrap();

    let doc = Document::load(&output).unwrap();
    let bookmarks = BookmarkManager::new().read_bookmarks(&doc).unwrap();
    assert_eq!(bookmarks[1].title, "f2.pdf");
    assert!(page_label(&doc, page_ids(&doc)[0]).contains("f2.pdf"));
}

#[test]
fn test_many_fragments_spill_onto_second_toc_page() {
    let dir = fixture_dir();
    let source = write_fixture(dir.path(), "one.pdf", 1);
    let fragments: Vec<Fragment> = (1..=70)
        .map(|n| Fragment::new(source.clone(), format!("Table {n}")))
        .collect();
    let output = temp_output_path(&dir);

    let report = assemble_to_path(&uncompressed_config(fragments, &output)).unwrap();
    assert_eq!(report.toc_page_count, 2);
    assert_eq!(report.page_count(), 72);

    let doc = Document::load(&output).unwrap();
    let bookmarks = BookmarkManager::new().read_bookmarks(&doc).unwrap();
    assert_eq!(bookmarks.len(), 70);
    assert_eq!(bookmarks[0].page_index, 2);
    assert_eq!(bookmarks[69].page_index, 71);
}

#[test]
fn test_compressed_output_is_readable() {
    let dir = fixture_dir();
    let fragments = vec![Fragment::new(
        write_fixture(dir.path(), "f1.pdf", 3),
        "Table 1",
    )];
    let output = temp_output_path(&dir);

    let mut config = Config::new(fragments, &output);
    config.compression = CompressionLevel::Maximum;
    let report = assemble_to_path(&config).unwrap();
    assert!(report.write.file_size > 0);

    let doc = Document::load(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 4);
}

#[test]
fn test_intermediate_file_is_removed() {
    let dir = fixture_dir();
    let fragments = vec![
        Fragment::new(write_fixture(dir.path(), "f1.pdf", 2), "Table 1"),
        Fragment::new(write_fixture(dir.path(), "f2.pdf", 1), "Table 2"),
    ];
    let output = temp_output_path(&dir);
    let intermediate = dir.path().join("body.pdf");

    let mut config = uncompressed_config(fragments, &output);
    config.intermediate = Some(intermediate.clone());
    let report = assemble_to_path(&config).unwrap();

    assert_eq!(report.page_count(), 4);
    assert!(output.exists());
    assert!(!intermediate.exists());
}
