//! Merging fragments into one body document.
//!
//! The merger concatenates the pages of every [`Fragment`] in order and records
//! one level-1 [`BookmarkEntry`] per fragment, pointing at the first page the
//! fragment contributed.

pub mod bookmarks;
pub mod merger;

pub use bookmarks::BookmarkManager;
pub use merger::{Merger, merge};

use lopdf::Document;
use std::path::{Path, PathBuf};

/// One input document together with the bookmark title it is listed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Path to the PDF file.
    pub source: PathBuf,
    /// Bookmark and TOC title.
    pub title: String,
}

impl Fragment {
    /// Create a fragment.
    ///
    /// The title is trimmed. A blank title falls back to the file name of
    /// `source`.
    pub fn new(source: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        let source = source.into();
        let title = title.into();
        let trimmed = title.trim();

        let title = if trimmed.is_empty() {
            file_name_title(&source)
        } else {
            trimmed.to_string()
        };

        Self { source, title }
    }

    /// Create a fragment titled after the file stem of `source`.
    pub fn from_path(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(source, stem)
    }
}

fn file_name_title(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A navigation entry in the merged body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkEntry {
    /// Nesting level, 1 for top-level entries.
    pub level: u8,
    /// Title shown in the outline and the TOC.
    pub title: String,
    /// 0-based page index in the document the entry belongs to.
    pub page_index: usize,
}

impl BookmarkEntry {
    /// Create a top-level bookmark.
    pub fn new(title: impl Into<String>, page_index: usize) -> Self {
        Self {
            level: 1,
            title: title.into(),
            page_index,
        }
    }

    /// The same bookmark after `offset` pages were inserted in front of the body.
    pub fn rebased(&self, offset: usize) -> Self {
        Self {
            page_index: self.page_index + offset,
            ..self.clone()
        }
    }
}

/// Result of merging fragments.
#[derive(Debug)]
pub struct MergedBody {
    /// The concatenated document, carrying one outline item per fragment.
    pub document: Document,
    /// One bookmark per fragment, in fragment order.
    pub bookmarks: Vec<BookmarkEntry>,
    /// Total number of pages in the body.
    pub page_count: usize,
    /// Pages contributed by each fragment, in fragment order.
    pub fragment_page_counts: Vec<usize>,
}
