//! pdfpack - merge PDF fragments and prepend a clickable Table of Contents.
//!
//! The pipeline takes an ordered list of fragments (a PDF plus a bookmark
//! title), concatenates them into one body, lays out a word-wrapped,
//! dot-leader TOC for the bookmarks, and writes a document whose first pages
//! are the TOC. Every TOC row links to its fragment and the outline is
//! rebased to account for the inserted pages.
//!
//! # Examples
//!
//! ```no_run
//! use pdfpack::{Config, Fragment, assemble_to_path};
//!
//! # fn example() -> pdfpack::Result<()> {
//! let fragments = vec![
//!     Fragment::new("t_demog.pdf", "Table 14.1.1 Demographics"),
//!     Fragment::new("l_ae.pdf", "Listing 16.2.7 Adverse Events"),
//! ];
//! let config = Config::new(fragments, "report.pdf");
//! let report = assemble_to_path(&config)?;
//! println!("{} TOC pages, {} total", report.toc_page_count, report.page_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Stages
//!
//! ```no_run
//! use pdfpack::config::TocLayout;
//! use pdfpack::toc::Helvetica;
//! use pdfpack::{Fragment, assemble, merge};
//!
//! # fn example() -> pdfpack::Result<()> {
//! let body = merge(&[Fragment::from_path("a.pdf"), Fragment::from_path("b.pdf")])?;
//! let mut assembled = assemble(body, &TocLayout::default(), &Helvetica)?;
//! assembled.document.save("out.pdf")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assemble;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod manifest;
pub mod merge;
pub mod output;
pub mod toc;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use assemble::{AssembledDocument, AssemblyPlan, AssemblyReport, assemble, assemble_to_path, plan};
pub use config::{CompressionLevel, Config, OverwriteMode, TocLayout};
pub use error::{PdfPackError, Result};
pub use merge::{BookmarkEntry, Fragment, MergedBody, merge};
