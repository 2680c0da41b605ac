//! Core PDF merging implementation.
//!
//! Fragments are loaded in order and their pages appended to a fresh body
//! document under a single flat page tree. The first failure aborts the whole
//! merge; no partial body is ever returned.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::time::Instant;

use crate::error::{PdfPackError, Result};
use crate::io::{LoadedPdf, PdfReader};
use crate::merge::bookmarks::BookmarkManager;
use crate::merge::{BookmarkEntry, Fragment, MergedBody};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// PDF merger that concatenates fragments.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    /// Reader for loading PDFs.
    reader: PdfReader,

    /// Bookmark manager for outline handling.
    bookmark_manager: BookmarkManager,
}

impl Merger {
    /// Create a new merger with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge fragments in order.
    ///
    /// The returned body carries one outline item per fragment, and
    /// [`MergedBody::bookmarks`] lists the same entries.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `fragments` is empty
    /// - Any fragment cannot be loaded or has no pages
    /// - The page tree cannot be assembled
    pub fn merge(&self, fragments: &[Fragment]) -> Result<MergedBody> {
        if fragments.is_empty() {
            return Err(PdfPackError::NoFilesToMerge);
        }

        let start = Instant::now();
        let mut loaded = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            loaded.push(self.reader.load(&fragment.source)?);
        }
        log::debug!("Loaded {} fragments in {:?}", loaded.len(), start.elapsed());

        let titles: Vec<&str> = fragments.iter().map(|f| f.title.as_str()).collect();
        let body = self.merge_loaded(loaded, &titles)?;

        log::info!(
            "Merged {} fragments into {} pages in {:?}",
            fragments.len(),
            body.page_count,
            start.elapsed()
        );
        Ok(body)
    }

    /// Merge already loaded documents, titling them with `titles`.
    ///
    /// # Errors
    ///
    /// Returns an error if the counts differ, the list is empty, or the page
    /// tree cannot be assembled.
    pub fn merge_loaded(&self, loaded: Vec<LoadedPdf>, titles: &[&str]) -> Result<MergedBody> {
        if loaded.is_empty() {
            return Err(PdfPackError::NoFilesToMerge);
        }
        if loaded.len() != titles.len() {
            return Err(PdfPackError::merge_failed(format!(
                "{} documents but {} titles",
                loaded.len(),
                titles.len()
            )));
        }

        let version = loaded
            .iter()
            .map(|l| l.document.version.as_str())
            .max()
            .unwrap_or("1.7")
            .to_string();

        let mut body = Document::with_version(version);
        let pages_id = body.new_object_id();

        let mut kids: Vec<Object> = Vec::new();
        let mut bookmarks = Vec::with_capacity(loaded.len());
        let mut fragment_page_counts = Vec::with_capacity(loaded.len());

        for (pdf, title) in loaded.into_iter().zip(titles) {
            let first_page = kids.len();
            let page_ids = self.append_document(&mut body, pdf, pages_id)?;

            log::debug!(
                "'{title}' contributes {} pages starting at body page {first_page}",
                page_ids.len()
            );

            bookmarks.push(BookmarkEntry::new(*title, first_page));
            fragment_page_counts.push(page_ids.len());
            kids.extend(page_ids.into_iter().map(Object::Reference));
        }

        let page_count = kids.len();
        body.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );

        let catalog_id = body.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        body.trailer.set("Root", catalog_id);

        self.bookmark_manager.write_bookmarks(&mut body, &bookmarks)?;

        Ok(MergedBody {
            document: body,
            bookmarks,
            page_count,
            fragment_page_counts,
        })
    }

    /// Move every page of `pdf` into `body` under `pages_id`, in page order.
    fn append_document(
        &self,
        body: &mut Document,
        pdf: LoadedPdf,
        pages_id: ObjectId,
    ) -> Result<Vec<ObjectId>> {
        let LoadedPdf {
            document: mut doc,
            path,
            ..
        } = pdf;

        // Renumber objects to avoid ID conflicts
        doc.renumber_objects_with(body.max_id + 1);

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(PdfPackError::corrupted_pdf(path, "PDF has no pages"));
        }

        for &page_id in &page_ids {
            let inherited = inherited_attributes(&doc, page_id);
            let page = doc
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| {
                    PdfPackError::corrupted_pdf(path.clone(), format!("Invalid page object: {e}"))
                })?;

            for (key, value) in inherited {
                page.set(key, value);
            }
            page.set("Parent", Object::Reference(pages_id));
        }

        discard_document_structure(&mut doc, &self.bookmark_manager);

        body.max_id = body.max_id.max(doc.max_id);
        body.objects.extend(doc.objects);

        Ok(page_ids)
    }
}

/// Inheritable attributes the page lacks but an ancestor defines.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for key in INHERITABLE_KEYS {
        if page.has(key) {
            continue;
        }
        if let Some(value) = find_in_ancestors(doc, page, key) {
            found.push((key.to_vec(), value.clone()));
        }
    }
    found
}

fn find_in_ancestors<'a>(doc: &'a Document, node: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = node;
    // Page trees are shallow; the bound only guards against Parent cycles.
    for _ in 0..64 {
        let parent_id = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent_id).ok()?;
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
    }
    None
}

/// Drop the fragment's catalog, page tree nodes and outline.
fn discard_document_structure(doc: &mut Document, manager: &BookmarkManager) {
    if manager.has_bookmarks(doc) {
        log::debug!("Discarding fragment outline");
        if let Err(e) = manager.remove_bookmarks(doc) {
            log::debug!("Fragment outline left in place: {e}");
        }
    }

    let structural: Vec<ObjectId> = doc
        .objects
        .iter()
        .filter(|(_, object)| {
            object
                .as_dict()
                .and_then(|dict| dict.get(b"Type"))
                .and_then(Object::as_name)
                .is_ok_and(|name| name == b"Catalog" || name == b"Pages")
        })
        .map(|(id, _)| *id)
        .collect();

    for id in structural {
        doc.objects.remove(&id);
    }
}

/// Merge fragments with a default [`Merger`].
///
/// # Errors
///
/// See [`Merger::merge`].
pub fn merge(fragments: &[Fragment]) -> Result<MergedBody> {
    Merger::new().merge(fragments)
}
