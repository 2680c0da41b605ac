//! Bookmark (outline) management for PDFs.
//!
//! The outline written here is flat: one item per [`BookmarkEntry`], each
//! pointing at a page with an `[page /XYZ null null null]` destination.

use crate::error::{PdfPackError, Result};
use crate::merge::BookmarkEntry;
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::{HashMap, HashSet};

/// Manager for PDF bookmarks (outlines).
#[derive(Debug, Clone, Copy, Default)]
pub struct BookmarkManager;

impl BookmarkManager {
    /// Create a new bookmark manager.
    pub fn new() -> Self {
        Self
    }

    /// Replace the document outline with `entries`.
    ///
    /// Page indices are 0-based positions in `doc`'s page order. Returns the
    /// number of outline items written.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry points past the last page or the catalog
    /// cannot be updated.
    pub fn write_bookmarks(&self, doc: &mut Document, entries: &[BookmarkEntry]) -> Result<usize> {
        self.remove_bookmarks(doc)?;

        if entries.is_empty() {
            return Ok(0);
        }

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

        let items = entries
            .iter()
            .map(|entry| {
                page_ids
                    .get(entry.page_index)
                    .map(|&page_id| (entry.title.as_str(), page_id))
                    .ok_or_else(|| {
                        PdfPackError::bookmark_failed(format!(
                            "Bookmark '{}' points at page {} but the document has {} pages",
                            entry.title,
                            entry.page_index + 1,
                            page_ids.len()
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        self.create_outline_structure(doc, &items)?;
        Ok(items.len())
    }

    /// Create the PDF outline structure.
    fn create_outline_structure(&self, doc: &mut Document, items: &[(&str, ObjectId)]) -> Result<()> {
        let outline_id = doc.new_object_id();

        let mut item_ids = Vec::with_capacity(items.len());
        for (title, page_id) in items {
            let item_id = doc.new_object_id();
            item_ids.push(item_id);

            let dest = vec![
                Object::Reference(*page_id),
                Object::Name(b"XYZ".to_vec()),
                Object::Null,
                Object::Null,
                Object::Null,
            ];

            let mut item_dict = Dictionary::new();
            item_dict.set("Title", encode_text_string(title));
            item_dict.set("Parent", Object::Reference(outline_id));
            item_dict.set("Dest", Object::Array(dest));

            doc.objects.insert(item_id, Object::Dictionary(item_dict));
        }

        for (i, item_id) in item_ids.iter().enumerate() {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(*item_id) {
                if i > 0 {
                    dict.set("Prev", Object::Reference(item_ids[i - 1]));
                }
                if let Some(next) = item_ids.get(i + 1) {
                    dict.set("Next", Object::Reference(*next));
                }
            }
        }

        let mut outline_dict = Dictionary::new();
        outline_dict.set("Type", Object::Name(b"Outlines".to_vec()));
        outline_dict.set("Count", Object::Integer(item_ids.len() as i64));

        if let (Some(first), Some(last)) = (item_ids.first(), item_ids.last()) {
            outline_dict.set("First", Object::Reference(*first));
            outline_dict.set("Last", Object::Reference(*last));
        }

        doc.objects
            .insert(outline_id, Object::Dictionary(outline_dict));

        let catalog = doc
            .catalog_mut()
            .map_err(|e| PdfPackError::bookmark_failed(format!("Failed to get catalog: {e}")))?;
        catalog.set("Outlines", Object::Reference(outline_id));
        catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));

        Ok(())
    }

    /// Read the outline back as bookmark entries, in display order.
    ///
    /// Nested items get increasing levels. Items whose destination is not a
    /// page of `doc` are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the outline references objects that do not exist.
    pub fn read_bookmarks(&self, doc: &Document) -> Result<Vec<BookmarkEntry>> {
        let Some(outline_id) = outline_root(doc) else {
            return Ok(Vec::new());
        };

        let page_indices: HashMap<ObjectId, usize> = doc
            .get_pages()
            .into_values()
            .enumerate()
            .map(|(index, id)| (id, index))
            .collect();

        let mut entries = Vec::new();
        let mut visited = HashSet::new();
        let root = doc.get_dictionary(outline_id)?;
        collect_items(doc, root, 1, &page_indices, &mut visited, &mut entries)?;
        Ok(entries)
    }

    /// Check if a document has bookmarks.
    pub fn has_bookmarks(&self, doc: &Document) -> bool {
        doc.catalog()
            .map(|catalog| catalog.has(b"Outlines"))
            .unwrap_or(false)
    }

    /// Remove the outline and its items from a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be accessed.
    pub fn remove_bookmarks(&self, doc: &mut Document) -> Result<()> {
        let Some(outline_id) = outline_root(doc) else {
            return Ok(());
        };

        let mut stale = Vec::new();
        let mut pending = vec![outline_id];
        let mut visited = HashSet::new();
        while let Some(id) = pending.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Ok(dict) = doc.get_dictionary(id) {
                for key in [b"First".as_slice(), b"Next".as_slice()] {
                    if let Ok(child) = dict.get(key).and_then(Object::as_reference) {
                        pending.push(child);
                    }
                }
            }
            stale.push(id);
        }

        for id in stale {
            doc.objects.remove(&id);
        }

        let catalog = doc
            .catalog_mut()
            .map_err(|e| PdfPackError::bookmark_failed(format!("Failed to get catalog: {e}")))?;
        catalog.remove(b"Outlines");
        Ok(())
    }
}

fn outline_root(doc: &Document) -> Option<ObjectId> {
    doc.catalog()
        .ok()?
        .get(b"Outlines")
        .and_then(Object::as_reference)
        .ok()
}

fn collect_items(
    doc: &Document,
    parent: &Dictionary,
    level: u8,
    page_indices: &HashMap<ObjectId, usize>,
    visited: &mut HashSet<ObjectId>,
    entries: &mut Vec<BookmarkEntry>,
) -> Result<()> {
    let mut next = parent.get(b"First").and_then(Object::as_reference).ok();

    while let Some(item_id) = next {
        if !visited.insert(item_id) {
            break;
        }
        let item = doc.get_dictionary(item_id)?;

        let title = item
            .get(b"Title")
            .and_then(Object::as_str)
            .map(decode_text_string)
            .unwrap_or_default();

        if let Some(page_index) = destination_page(doc, item).and_then(|id| page_indices.get(&id)) {
            entries.push(BookmarkEntry {
                level,
                title,
                page_index: *page_index,
            });
        }

        collect_items(doc, item, level.saturating_add(1), page_indices, visited, entries)?;
        next = item.get(b"Next").and_then(Object::as_reference).ok();
    }

    Ok(())
}

/// Page referenced by an item's `/Dest`, or by a GoTo action's `/D`.
fn destination_page(doc: &Document, item: &Dictionary) -> Option<ObjectId> {
    let dest = match item.get(b"Dest") {
        Ok(dest) => dest,
        Err(_) => {
            let action = match item.get(b"A").ok()? {
                Object::Reference(id) => doc.get_dictionary(*id).ok()?,
                Object::Dictionary(dict) => dict,
                _ => return None,
            };
            action.get(b"D").ok()?
        }
    };

    dest.as_array().ok()?.first()?.as_reference().ok()
}

/// Encode a PDF text string: literal bytes for ASCII, UTF-16BE otherwise.
pub(crate) fn encode_text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode a PDF text string written as UTF-16BE (with BOM) or single bytes.
pub(crate) fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
