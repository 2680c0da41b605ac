//! Assembly of the final document.
//!
//! [`assemble`] takes a merged body, lays out the TOC for its bookmarks,
//! prepends the TOC pages, makes every TOC row clickable and rewrites the
//! outline so it points at the shifted body pages. [`assemble_to_path`] runs
//! the whole pipeline from a [`Config`] and writes the result atomically;
//! [`plan`] computes the same page arithmetic without writing anything.

use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{Config, TocLayout};
use crate::error::{PdfPackError, Result};
use crate::io::{PdfReader, PdfWriter, WriteOptions, WriteStatistics};
use crate::merge::{BookmarkEntry, BookmarkManager, MergedBody, merge};
use crate::toc::{
    Helvetica, LinkTarget, RenderedToc, TOC_FONT_RESOURCE, TextMeasurer, TocEntry, build_toc,
    paginate,
};

/// The final document: TOC pages followed by the body.
#[derive(Debug)]
pub struct AssembledDocument {
    /// The finished document.
    pub document: Document,
    /// Number of TOC pages in front of the body.
    pub toc_page_count: usize,
    /// Number of body pages.
    pub body_page_count: usize,
    /// Outline entries in final page numbering.
    pub bookmarks: Vec<BookmarkEntry>,
    /// Clickable TOC rows, with targets still relative to the body.
    pub links: Vec<LinkTarget>,
}

impl AssembledDocument {
    /// Total number of pages.
    pub fn page_count(&self) -> usize {
        self.toc_page_count + self.body_page_count
    }
}

/// Prepend a TOC to `body` and rebase its navigation.
///
/// # Errors
///
/// Returns [`PdfPackError::InvalidConfig`] if `layout` fails validation, and
/// an error if the body's page tree cannot be extended or a link or bookmark
/// points outside the document.
pub fn assemble(
    body: MergedBody,
    layout: &TocLayout,
    measurer: &dyn TextMeasurer,
) -> Result<AssembledDocument> {
    layout
        .validate(measurer)
        .map_err(|e| PdfPackError::invalid_config(format!("TOC layout is invalid: {e}")))?;

    let MergedBody {
        mut document,
        bookmarks,
        page_count: body_page_count,
        ..
    } = body;

    let entries: Vec<TocEntry> = bookmarks.iter().map(TocEntry::from).collect();
    let rendered = build_toc(entries, layout, measurer).unwrap_or_default();
    let toc_page_count = rendered.page_count();

    let body_page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
    if body_page_ids.len() != body_page_count {
        return Err(PdfPackError::merge_failed(format!(
            "Body reports {body_page_count} pages but its page tree has {}",
            body_page_ids.len()
        )));
    }

    insert_toc_pages(&mut document, &rendered, layout, &body_page_ids)?;

    let rebased: Vec<BookmarkEntry> = bookmarks
        .iter()
        .map(|b| b.rebased(toc_page_count))
        .collect();
    BookmarkManager::new().write_bookmarks(&mut document, &rebased)?;

    log::info!(
        "Assembled {toc_page_count} TOC pages and {body_page_count} body pages, {} links",
        rendered.links.len()
    );

    Ok(AssembledDocument {
        document,
        toc_page_count,
        body_page_count,
        bookmarks: rebased,
        links: rendered.links,
    })
}

/// Write the rendered TOC pages into `document` ahead of the body.
fn insert_toc_pages(
    document: &mut Document,
    rendered: &RenderedToc,
    layout: &TocLayout,
    body_page_ids: &[ObjectId],
) -> Result<()> {
    if rendered.pages.is_empty() {
        return Ok(());
    }

    let pages_id = pages_root(document)?;

    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { TOC_FONT_RESOURCE => font_id },
    });

    let toc_page_ids: Vec<ObjectId> = rendered
        .pages
        .iter()
        .map(|_| document.new_object_id())
        .collect();
    let final_page_ids: Vec<ObjectId> = toc_page_ids
        .iter()
        .chain(body_page_ids)
        .copied()
        .collect();

    let mut annotations: Vec<Vec<Object>> = vec![Vec::new(); toc_page_ids.len()];
    for link in &rendered.links {
        let target = link.rebased_page(toc_page_ids.len());
        let target_id = final_page_ids.get(target).copied().ok_or_else(|| {
            PdfPackError::layout_failed(format!(
                "TOC link points at page {} of {}",
                target + 1,
                final_page_ids.len()
            ))
        })?;
        let page_annotations = annotations.get_mut(link.toc_page_index).ok_or_else(|| {
            PdfPackError::layout_failed(format!(
                "TOC link placed on missing TOC page {}",
                link.toc_page_index + 1
            ))
        })?;

        let rect = link.rect.to_pdf_rect(layout.page_height);
        let annotation_id = document.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => rect.iter().map(|&v| Object::from(v)).collect::<Vec<_>>(),
            "Border" => vec![0.into(), 0.into(), 0.into()],
            "Dest" => vec![
                Object::Reference(target_id),
                "XYZ".into(),
                Object::Null,
                Object::Null,
                Object::Null,
            ],
        });
        page_annotations.push(Object::Reference(annotation_id));
    }

    for ((drawing, page_id), annots) in rendered
        .pages
        .iter()
        .zip(&toc_page_ids)
        .zip(annotations)
    {
        let content = drawing.to_content(layout.page_height).encode()?;
        let content_id = document.add_object(Stream::new(dictionary! {}, content));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                layout.page_width.into(),
                layout.page_height.into(),
            ],
            "Resources" => resources_id,
            "Contents" => content_id,
        };
        if !annots.is_empty() {
            page.set("Annots", annots);
        }
        document.objects.insert(*page_id, Object::Dictionary(page));
    }

    prepend_kids(document, pages_id, &toc_page_ids)
}

fn pages_root(document: &Document) -> Result<ObjectId> {
    document
        .catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| PdfPackError::merge_failed(format!("Failed to get pages reference: {e}")))
}

/// Put `page_ids` in front of the existing kids of the root page tree node.
fn prepend_kids(document: &mut Document, pages_id: ObjectId, page_ids: &[ObjectId]) -> Result<()> {
    let dict = document
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfPackError::merge_failed(format!("Failed to get pages object: {e}")))?;

    let existing = match dict.get(b"Kids") {
        Ok(Object::Array(kids)) => kids.clone(),
        _ => return Err(PdfPackError::merge_failed("Pages dictionary missing Kids array")),
    };

    let mut kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    kids.extend(existing);
    dict.set("Kids", kids);

    let current_count = dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    dict.set("Count", current_count + page_ids.len() as i64);
    Ok(())
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct AssemblyReport {
    /// Number of fragments merged.
    pub fragments: usize,
    /// Number of TOC pages.
    pub toc_page_count: usize,
    /// Number of body pages.
    pub body_page_count: usize,
    /// Outline entries as written.
    pub bookmarks: Vec<BookmarkEntry>,
    /// Output file statistics.
    pub write: WriteStatistics,
}

impl AssemblyReport {
    /// Total pages in the output.
    pub fn page_count(&self) -> usize {
        self.toc_page_count + self.body_page_count
    }
}

/// Run the full pipeline for `config` and write the output file.
///
/// # Errors
///
/// Any failure is returned and nothing is left at the output path. A
/// configured intermediate file is removed whether or not the run succeeds.
pub fn assemble_to_path(config: &Config) -> Result<AssemblyReport> {
    if config.fragments.is_empty() {
        return Err(PdfPackError::NoFilesToMerge);
    }
    config.validate()?;
    config.layout.validate(&Helvetica)?;

    let start = Instant::now();
    let writer = PdfWriter::with_options(WriteOptions {
        compression: config.compression,
        overwrite_mode: config.overwrite_mode,
        ..Default::default()
    });
    writer.can_write(&config.output)?;

    let mut body = merge(&config.fragments)?;
    let fragments = body.fragment_page_counts.len();

    let _intermediate = match &config.intermediate {
        Some(path) => {
            let guard = IntermediateFile::new(path.clone());
            body = stage_body(body, guard.path())?;
            Some(guard)
        }
        None => None,
    };

    let mut assembled = assemble(body, &config.layout, &Helvetica)?;
    let write = writer.save(&mut assembled.document, &config.output)?;

    log::info!(
        "Wrote {} ({} pages) in {:?}",
        config.output.display(),
        assembled.page_count(),
        start.elapsed()
    );

    Ok(AssemblyReport {
        fragments,
        toc_page_count: assembled.toc_page_count,
        body_page_count: assembled.body_page_count,
        bookmarks: assembled.bookmarks,
        write,
    })
}

/// Persist the merged body at `path` and continue from the saved copy.
fn stage_body(mut body: MergedBody, path: &Path) -> Result<MergedBody> {
    PdfWriter::without_compression().save(&mut body.document, path)?;
    log::debug!("Staged merged body at {}", path.display());

    let reloaded = PdfReader::new().load(path)?;
    if reloaded.page_count != body.page_count {
        return Err(PdfPackError::merge_failed(format!(
            "Staged body has {} pages, expected {}",
            reloaded.page_count, body.page_count
        )));
    }

    Ok(MergedBody {
        document: reloaded.document,
        ..body
    })
}

/// Removes a scoped intermediate file when dropped.
#[derive(Debug)]
struct IntermediateFile {
    path: PathBuf,
}

impl IntermediateFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for IntermediateFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed intermediate file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove intermediate file {}: {e}",
                self.path.display()
            ),
        }
    }
}

/// One fragment in a dry-run plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedFragment {
    /// Source path.
    pub source: PathBuf,
    /// Bookmark title.
    pub title: String,
    /// Pages in the fragment.
    pub page_count: usize,
    /// 1-based page the fragment starts on in the final document.
    pub start_page: usize,
}

/// What a run would produce, computed without writing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyPlan {
    /// Output path.
    pub output: PathBuf,
    /// Fragments in merge order.
    pub fragments: Vec<PlannedFragment>,
    /// Number of TOC pages.
    pub toc_page_count: usize,
    /// Number of body pages.
    pub body_page_count: usize,
    /// Total pages in the output.
    pub total_page_count: usize,
}

/// Compute the page layout of a run without producing output.
///
/// Every fragment is loaded, so unreadable inputs fail here exactly as they
/// would in a real run.
///
/// # Errors
///
/// Returns configuration and input errors.
pub fn plan(config: &Config) -> Result<AssemblyPlan> {
    if config.fragments.is_empty() {
        return Err(PdfPackError::NoFilesToMerge);
    }
    config.validate()?;
    config.layout.validate(&Helvetica)?;

    let reader = PdfReader::new();
    let mut page_counts = Vec::with_capacity(config.fragments.len());
    for fragment in &config.fragments {
        page_counts.push(reader.load(&fragment.source)?.page_count);
    }

    let mut body_page_count = 0;
    let mut entries = Vec::with_capacity(config.fragments.len());
    for (fragment, count) in config.fragments.iter().zip(&page_counts) {
        entries.push(TocEntry::new(fragment.title.clone(), body_page_count));
        body_page_count += count;
    }

    let toc_page_count = paginate(entries.clone(), &config.layout, &Helvetica).len();

    let fragments = config
        .fragments
        .iter()
        .zip(entries)
        .zip(page_counts)
        .map(|((fragment, entry), page_count)| PlannedFragment {
            source: fragment.source.clone(),
            title: fragment.title.clone(),
            page_count,
            start_page: entry.target_page + toc_page_count + 1,
        })
        .collect();

    Ok(AssemblyPlan {
        output: config.output.clone(),
        fragments,
        toc_page_count,
        body_page_count,
        total_page_count: toc_page_count + body_page_count,
    })
}
