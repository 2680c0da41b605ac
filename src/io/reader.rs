//! PDF reading and loading operations.
//!
//! Fragments are loaded one at a time, in order. A load either yields a
//! [`LoadedPdf`] with at least one page or a typed error naming the file.
//!
//! # Examples
//!
//! ```no_run
//! use pdfpack::io::PdfReader;
//! use std::path::Path;
//!
//! # fn example() -> pdfpack::Result<()> {
//! let loaded = PdfReader::new().load(Path::new("t_demog.pdf"))?;
//! println!("{} pages", loaded.page_count);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{PdfPackError, Result};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

/// Loads fragments and rejects documents that cannot contribute pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist or is a directory
    /// - File is not a valid PDF
    /// - PDF is encrypted
    /// - PDF has no pages
    pub fn load(&self, path: &Path) -> Result<LoadedPdf> {
        Self::check_path_exists(path)?;

        let path_buf = path.to_path_buf();
        let start = Instant::now();

        let document = Document::load(&path_buf).map_err(|e| {
            let err_msg = e.to_string();
            let lowered = err_msg.to_lowercase();
            if lowered.contains("encrypt") || lowered.contains("password") {
                PdfPackError::encrypted_pdf(path_buf.clone())
            } else {
                PdfPackError::failed_to_load_pdf(path_buf.clone(), err_msg)
            }
        })?;

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfPackError::corrupted_pdf(path_buf, "PDF has no pages"));
        }

        let load_time = start.elapsed();
        let file_size = std::fs::metadata(&path_buf).map(|m| m.len()).unwrap_or(0);

        log::debug!(
            "Loaded {} ({page_count} pages) in {load_time:?}",
            path_buf.display()
        );

        Ok(LoadedPdf {
            document,
            path: path_buf,
            page_count,
            load_time,
            file_size,
        })
    }

    /// Check that `path` exists and is a file.
    ///
    /// # Errors
    ///
    /// Returns [`PdfPackError::FileNotFound`] or [`PdfPackError::NotAFile`].
    pub fn check_path_exists(path: &Path) -> Result<()> {
        if !path.try_exists()? {
            return Err(PdfPackError::file_not_found(path.to_path_buf()));
        }

        if !path.is_file() {
            return Err(PdfPackError::not_a_file(path.to_path_buf()));
        }

        Ok(())
    }
}
