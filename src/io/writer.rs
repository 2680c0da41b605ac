//! PDF writing and saving operations.
//!
//! Documents are written to a sibling temp file and renamed into place, so a
//! failed run never leaves a partial file at the output path.
//!
//! # Examples
//!
//! ```no_run
//! use pdfpack::io::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # fn example(mut doc: Document) -> pdfpack::Result<()> {
//! let writer = PdfWriter::new();
//! writer.save(&mut doc, Path::new("output.pdf"))?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::{CompressionLevel, OverwriteMode};
use crate::error::{PdfPackError, Result};
use crate::utils::format_file_size;

/// Capacity of the buffered writer wrapped around the temp file.
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// How much to compress before writing.
    pub compression: CompressionLevel,

    /// What to do when the destination already exists.
    pub overwrite_mode: OverwriteMode,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: CompressionLevel::Standard,
            overwrite_mode: OverwriteMode::Force,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Compression that was applied.
    pub compression: CompressionLevel,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer that stores streams as they are.
    pub fn without_compression() -> Self {
        Self {
            options: WriteOptions {
                compression: CompressionLevel::None,
                ..Default::default()
            },
        }
    }

    /// Save a PDF document to a file.
    ///
    /// Compression is applied to `doc` in place before it is serialised.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output exists and overwriting is disabled
    /// - The output directory doesn't exist or is not writable
    /// - Serialisation or the final rename fails
    pub fn save(&self, doc: &mut Document, path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();
        let options = &self.options;

        if options.overwrite_mode == OverwriteMode::NoClobber && path.exists() {
            return Err(PdfPackError::output_exists(path.to_path_buf()));
        }

        match options.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => doc.compress(),
            CompressionLevel::Maximum => {
                doc.prune_objects();
                doc.compress();
            }
        }

        let write_path = temp_path_for(path);

        if let Err(e) = write_document(doc, &write_path) {
            remove_temp_file(&write_path);
            return Err(e);
        }

        if let Err(source) = std::fs::rename(&write_path, path) {
            remove_temp_file(&write_path);
            return Err(PdfPackError::FailedToWrite {
                path: path.to_path_buf(),
                source,
            });
        }

        let write_time = start.elapsed();
        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        log::debug!(
            "Wrote {} ({}) in {write_time:?}",
            path.display(),
            format_file_size(file_size)
        );

        Ok(WriteStatistics {
            write_time,
            file_size,
            output_path: path.to_path_buf(),
            compression: options.compression,
        })
    }

    /// Check that a file can be created at `path` without writing it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output exists and overwriting is disabled
    /// - Parent directory doesn't exist
    /// - Parent directory is not writable
    pub fn can_write(&self, path: &Path) -> Result<()> {
        if self.options.overwrite_mode == OverwriteMode::NoClobber && path.exists() {
            return Err(PdfPackError::output_exists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                return Err(PdfPackError::invalid_config(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                )));
            }

            let metadata = std::fs::metadata(parent)?;
            if metadata.permissions().readonly() {
                return Err(PdfPackError::invalid_config(format!(
                    "Output directory is not writable: {}",
                    parent.display()
                )));
            }
        }

        Ok(())
    }
}

/// `out.pdf` becomes `out.pdf.tmp` in the same directory.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_document(doc: &mut Document, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| PdfPackError::FailedToCreateOutput {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut writer = std::io::BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

    doc.save_to(&mut writer)
        .map_err(|e| PdfPackError::FailedToWrite {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;

    writer.flush().map_err(|e| PdfPackError::FailedToWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn remove_temp_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        log::warn!("Failed to remove temp file {}: {e}", path.display());
    }
}
