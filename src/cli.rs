//! CLI argument parsing for pdfpack.
//!
//! This module defines the command-line interface using `clap` and turns the
//! parsed arguments into a [`Config`].
//!
//! # Examples
//!
//! ```no_run
//! use pdfpack::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Writing {}", cli.output.display());
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{CompressionLevel, Config, DEFAULT_TOC_TITLE, OverwriteMode, TocLayout};
use crate::error::{PdfPackError, Result};
use crate::manifest::read_manifest;
use crate::merge::Fragment;
use crate::toc::Helvetica;
use crate::utils::{collect_paths_for_patterns, dotted_number_key};

/// Merge PDF fragments and prepend a clickable Table of Contents.
///
/// Every fragment becomes one bookmark and one TOC row. TOC rows are
/// word-wrapped, dot-leadered and link to the first page of their fragment.
#[derive(Parser, Debug, Clone)]
#[command(name = "pdfpack")]
#[command(version)]
#[command(about = "Merge PDF fragments and prepend a clickable Table of Contents", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files or glob patterns, in merge order
    ///
    /// Matches of each pattern are sorted by name. Titles default to the
    /// file stem. Use --manifest to give explicit titles.
    ///
    /// Examples:
    ///   pdfpack t_*.pdf l_*.pdf -o report.pdf
    #[arg(value_name = "FILE", required_unless_present = "manifest")]
    pub inputs: Vec<String>,

    /// JSON manifest listing fragments and their titles
    ///
    /// An array of {"source": "<path>", "title": "<bookmark>"} records.
    /// Relative paths resolve against the manifest's directory.
    #[arg(short, long, value_name = "FILE", conflicts_with = "inputs")]
    pub manifest: Option<PathBuf>,

    /// Order fragments by the first dotted number in their titles
    ///
    /// "Table 14.1.2" sorts before "Table 14.1.10". Titles without a number
    /// go last; ties keep their given order.
    #[arg(long)]
    pub numeric_sort: bool,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Font size of TOC entries in points
    #[arg(long, value_name = "PT", default_value_t = 8.0)]
    pub font_size: f32,

    /// Draw a centered heading on the first TOC page
    ///
    /// Without a value the heading reads "Table of Contents".
    #[arg(
        long,
        value_name = "TEXT",
        num_args = 0..=1,
        default_missing_value = DEFAULT_TOC_TITLE
    )]
    pub toc_title: Option<String>,

    /// Compression level for output PDF
    ///
    /// - none: No compression
    /// - standard: Compress streams (default)
    /// - maximum: Compress streams and drop unreferenced objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Overwrite an existing output file (default)
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Stage the merged body at this path before adding the TOC
    ///
    /// The file is removed when the run ends.
    #[arg(long, value_name = "FILE")]
    pub intermediate: Option<PathBuf>,

    /// Dry run - load inputs and show the page plan without creating output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the dry-run plan as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Resolve the fragments named on the command line or in the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or a pattern matches
    /// nothing.
    pub async fn fragments(&self) -> Result<Vec<Fragment>> {
        let mut fragments = if let Some(manifest) = &self.manifest {
            read_manifest(manifest).await?
        } else if self.inputs.is_empty() {
            return Err(PdfPackError::NoFilesToMerge);
        } else {
            let paths = collect_paths_for_patterns(&self.inputs)?;
            paths.into_iter().map(Fragment::from_path).collect()
        };

        if self.numeric_sort {
            fragments.sort_by_key(|f| dotted_number_key(&f.title));
        }
        Ok(fragments)
    }

    /// Build the TOC layout from the typography flags.
    pub fn layout(&self) -> TocLayout {
        let layout = TocLayout::default().with_font_size(self.font_size);
        match &self.toc_title {
            Some(title) => layout.with_banner(title.clone()),
            None => layout,
        }
    }

    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Compression level is invalid
    /// - The TOC layout cannot fit a line
    /// - Configuration validation fails
    pub fn to_config(&self, fragments: Vec<Fragment>) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Force
        };

        let layout = self.layout();
        layout.validate(&Helvetica).map_err(|e| {
            PdfPackError::invalid_config(format!("TOC layout is invalid: {e}"))
        })?;

        let config = Config {
            fragments,
            output: self.output.clone(),
            layout,
            compression,
            overwrite_mode,
            intermediate: self.intermediate.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
        };

        config.validate().map_err(|e| {
            PdfPackError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }
}
