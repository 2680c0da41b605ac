//! Table of Contents layout.
//!
//! The TOC is produced in three pure stages, each taking an explicit
//! [`TocLayout`](crate::config::TocLayout) and [`TextMeasurer`]:
//!
//! 1. [`wrap`] breaks every title into lines that fit the text column,
//! 2. [`paginate`] packs the wrapped entries into pages under a line budget,
//! 3. [`render`] places text, dot leaders and page numbers, and records the
//!    clickable rectangle of every entry.
//!
//! Page references inside this module are relative to the merged body. The
//! assembler adds the TOC page count when it writes the final document.

pub mod metrics;
pub mod paginate;
pub mod render;
pub mod wrap;

pub use metrics::{Helvetica, TextMeasurer};
pub use paginate::{UNTITLED_PLACEHOLDER, paginate, wrap_entry};
pub use render::{PlacedText, RenderedToc, TOC_FONT_RESOURCE, TextRole, TocPageDrawing, render};
pub use wrap::wrap_title;

use crate::config::TocLayout;
use crate::merge::BookmarkEntry;

/// One logical TOC row before wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Nesting level, 1 for top-level entries.
    pub level: u8,
    /// Title shown in the TOC.
    pub title: String,
    /// 0-based page in the merged body this entry points at.
    pub target_page: usize,
}

impl TocEntry {
    /// Create a top-level entry.
    pub fn new(title: impl Into<String>, target_page: usize) -> Self {
        Self::with_level(1, title, target_page)
    }

    /// Create an entry at the given nesting level.
    pub fn with_level(level: u8, title: impl Into<String>, target_page: usize) -> Self {
        Self {
            level: level.max(1),
            title: title.into(),
            target_page,
        }
    }
}

impl From<&BookmarkEntry> for TocEntry {
    fn from(bookmark: &BookmarkEntry) -> Self {
        Self::with_level(bookmark.level, bookmark.title.trim(), bookmark.page_index)
    }
}

/// A TOC entry together with its wrapped display lines (never empty).
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedEntry {
    /// The entry being displayed.
    pub entry: TocEntry,
    /// Display lines, in order.
    pub lines: Vec<String>,
}

impl WrappedEntry {
    /// Number of lines the entry occupies.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Entries placed on one physical TOC page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TocPage {
    /// Entries in display order.
    pub entries: Vec<WrappedEntry>,
}

impl TocPage {
    /// Total wrapped lines on the page.
    pub fn line_count(&self) -> usize {
        self.entries.iter().map(WrappedEntry::line_count).sum()
    }
}

/// Axis-aligned rectangle in layout coordinates (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x0: f32,
    /// Top edge.
    pub y0: f32,
    /// Right edge.
    pub x1: f32,
    /// Bottom edge.
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle from its edges.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle as a PDF `/Rect` array `[llx lly urx ury]` on a page of `page_height`.
    pub fn to_pdf_rect(&self, page_height: f32) -> [f32; 4] {
        [self.x0, page_height - self.y1, self.x1, page_height - self.y0]
    }
}

/// A clickable TOC region and the body page it navigates to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkTarget {
    /// Index of the TOC page holding the region.
    pub toc_page_index: usize,
    /// Region covering every wrapped line of the entry.
    pub rect: Rect,
    /// 0-based body page, before the TOC pages are prepended.
    pub body_target_page: usize,
}

impl LinkTarget {
    /// Absolute page in the final document once `toc_page_count` pages precede the body.
    pub fn rebased_page(&self, toc_page_count: usize) -> usize {
        self.body_target_page + toc_page_count
    }
}

/// Lay out and render a complete TOC for `entries`.
///
/// Returns `None` when there is nothing to list.
pub fn build_toc(
    entries: Vec<TocEntry>,
    layout: &TocLayout,
    measurer: &dyn TextMeasurer,
) -> Option<RenderedToc> {
    let pages = paginate(entries, layout, measurer);
    if pages.is_empty() {
        return None;
    }

    let toc_page_count = pages.len();
    log::debug!("TOC paginated into {toc_page_count} page(s)");
    Some(render(&pages, layout, measurer, toc_page_count))
}
