//! Helpers for building small PDFs in unit tests.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::path::{Path, PathBuf};

/// Build a document with `page_count` pages, each showing "<label> <n>".
///
/// The MediaBox is inherited from the page tree root so merges have to
/// materialise it.
pub(crate) fn create_test_document(label: &str, page_count: usize) -> Document {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
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
                        format!("{label} {n}").into_bytes(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode test content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Save a generated document under `dir` and return its path.
pub(crate) fn write_test_pdf(dir: &Path, name: &str, page_count: usize) -> PathBuf {
    let path = dir.join(name);
    let mut doc = create_test_document(name, page_count);
    doc.save(&path).expect("save test pdf");
    path
}

/// Text shown by the page with the given object id, as written by
/// [`create_test_document`].
pub(crate) fn page_label(doc: &Document, page_id: ObjectId) -> String {
    let content = doc.get_page_content(page_id).expect("page content");
    let content = Content::decode(&content).expect("decode content");
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|o| o.as_str().ok())
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect::<Vec<_>>()
        .join("")
}
