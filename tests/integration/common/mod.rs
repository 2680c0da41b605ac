//! Integration tests for pdfpack.
//!
//! Fixtures are generated on the fly so the tests exercise real files on
//! disk without checking binary PDFs into the repository.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a PDF named `name` with `page_count` pages into `dir`.
///
/// Page `n` shows the text "<name> <n>", which [`page_label`] reads back.
pub fn write_fixture(dir: &Path, name: &str, page_count: usize) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for n in 1..=page_count {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("{name} {n}").into_bytes(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("Failed to encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).expect("Failed to save fixture");
    path
}

/// Create a temporary directory holding the generated fixtures.
pub fn fixture_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Output path inside `dir` that does not exist yet.
pub fn temp_output_path(dir: &TempDir) -> PathBuf {
    dir.path().join("output.pdf")
}

/// Text shown on a page written by [`write_fixture`].
pub fn page_label(doc: &Document, page_id: ObjectId) -> String {
    let content = doc.get_page_content(page_id).expect("Missing page content");
    let content = Content::decode(&content).expect("Failed to decode content");
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|o| o.as_str().ok())
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect()
}

/// Ids of the pages of `doc` in display order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_fixture() {
        let dir = fixture_dir();
        let path = write_fixture(dir.path(), "f.pdf", 3);

        let doc = Document::load(&path).unwrap();
        let ids = page_ids(&doc);
        assert_eq!(ids.len(), 3);
        assert_eq!(page_label(&doc, ids[2]), "f.pdf 3");
    }
}
