//! Configuration module for pdfpack.
//!
//! Two layers live here:
//! - [`TocLayout`], the fixed page geometry and typography the TOC is laid out
//!   with. It is a plain value handed explicitly to every layout function.
//! - [`Config`], everything one assembly run needs: the ordered fragments, the
//!   output path and the output-side policies.

use anyhow::{Result, bail};

use crate::PdfPackError;
use crate::merge::Fragment;
use crate::toc::metrics::TextMeasurer;
use std::{path::PathBuf, str::FromStr};

/// A4 page width in points.
pub const A4_WIDTH: f32 = 595.0;

/// A4 page height in points.
pub const A4_HEIGHT: f32 = 842.0;

/// Banner text used when the CLI enables the TOC title.
pub const DEFAULT_TOC_TITLE: &str = "Table of Contents";

/// Page geometry and typography for the Table of Contents.
///
/// All distances are PDF points measured from the top-left corner of the page;
/// the renderer converts to PDF's bottom-left origin when emitting operators.
#[derive(Debug, Clone, PartialEq)]
pub struct TocLayout {
    /// Page width.
    pub page_width: f32,
    /// Page height.
    pub page_height: f32,
    /// Font size of TOC entries. The banner uses `font_size + 2`.
    pub font_size: f32,
    /// Left margin, where level-1 entries start.
    pub left_margin: f32,
    /// Top margin, the baseline of the first line.
    pub top_margin: f32,
    /// Right margin, where page numbers end.
    pub right_margin: f32,
    /// Vertical space reserved from the page height when computing the line budget.
    pub vertical_reserve: f32,
    /// Line spacing as a multiple of the font size.
    pub line_spacing_factor: f32,
    /// Horizontal indent added per nesting level below 1.
    pub indent_per_level: f32,
    /// Minimum space between the dot leader and the page number.
    pub leader_gap: f32,
    /// Number of digits the page-number column is sized for.
    pub reserved_digits: usize,
    /// Centered banner drawn on the first TOC page, if any.
    pub banner: Option<String>,
}

impl Default for TocLayout {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            font_size: 8.0,
            left_margin: 50.0,
            top_margin: 50.0,
            right_margin: 60.0,
            vertical_reserve: 100.0,
            line_spacing_factor: 1.5,
            indent_per_level: 20.0,
            leader_gap: 8.0,
            reserved_digits: 5,
            banner: None,
        }
    }
}

impl TocLayout {
    /// Lines reserved on the page that hosts the banner.
    pub const BANNER_RESERVED_LINES: usize = 2;

    /// Enable the banner with the given title.
    pub fn with_banner(mut self, title: impl Into<String>) -> Self {
        self.banner = Some(title.into());
        self
    }

    /// Set the entry font size.
    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Distance between consecutive baselines.
    pub fn line_spacing(&self) -> f32 {
        self.font_size * self.line_spacing_factor
    }

    /// Font size of the banner line.
    pub fn banner_font_size(&self) -> f32 {
        self.font_size + 2.0
    }

    /// Right edge of the page-number column. Every page number ends here.
    pub fn page_number_x(&self) -> f32 {
        self.page_width - self.right_margin
    }

    /// Horizontal indent for an entry at `level` (1-based).
    pub fn indent(&self, level: u8) -> f32 {
        self.indent_per_level * f32::from(level.saturating_sub(1))
    }

    /// Width of the page-number column, sized for the widest number allowed.
    pub fn page_number_column_width(&self, measurer: &dyn TextMeasurer) -> f32 {
        let sample = "9".repeat(self.reserved_digits);
        measurer.text_width(&sample, self.font_size)
    }

    /// Width available to level-1 entry text.
    pub fn text_max_width(&self, measurer: &dyn TextMeasurer) -> f32 {
        self.page_number_x()
            - self.left_margin
            - self.page_number_column_width(measurer)
            - self.leader_gap
    }

    /// Line budget of a TOC page.
    ///
    /// The page hosting the banner (the first one, when enabled) gives up
    /// [`Self::BANNER_RESERVED_LINES`] lines.
    pub fn lines_per_page(&self, hosts_banner: bool) -> usize {
        let usable = (self.page_height - self.vertical_reserve).max(0.0);
        let lines = (usable / self.line_spacing()).floor() as usize;
        if hosts_banner && self.banner.is_some() {
            lines.saturating_sub(Self::BANNER_RESERVED_LINES)
        } else {
            lines
        }
    }

    /// Validate the geometry against a measurer.
    ///
    /// # Errors
    ///
    /// Returns an error if the font size is not positive, the text column has
    /// no width, or a page cannot hold a single line.
    pub fn validate(&self, measurer: &dyn TextMeasurer) -> Result<()> {
        if self.font_size.is_nan() || self.font_size <= 0.0 {
            bail!("TOC font size must be positive, got {}", self.font_size);
        }

        if self.line_spacing_factor.is_nan() || self.line_spacing_factor <= 0.0 {
            bail!("Line spacing factor must be positive");
        }

        if self.reserved_digits == 0 {
            bail!("Page-number column must reserve at least one digit");
        }

        let text_width = self.text_max_width(measurer);
        if text_width <= 0.0 {
            bail!(
                "TOC text column has no room: {text_width:.1}pt left at font size {}",
                self.font_size
            );
        }

        if self.lines_per_page(true) == 0 {
            bail!(
                "TOC page of height {} cannot hold a line at font size {}",
                self.page_height,
                self.font_size
            );
        }

        Ok(())
    }
}

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - streams are written as produced.
    None,
    /// Compress streams.
    #[default]
    Standard,
    /// Compress streams and prune unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfPackError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfPackError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Replace an existing output file.
    #[default]
    Force,
    /// Never overwrite, error if the file exists.
    NoClobber,
}

/// Complete configuration for one assembly run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Fragments in merge order.
    pub fragments: Vec<Fragment>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// TOC geometry and typography.
    pub layout: TocLayout,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Where to persist the merged body (with bookmarks, without TOC) while
    /// the run is in progress. Removed once the final document is written.
    pub intermediate: Option<PathBuf>,

    /// Dry run mode - plan without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,
}

impl Config {
    /// Create a configuration with default layout and policies.
    pub fn new(fragments: Vec<Fragment>, output: impl Into<PathBuf>) -> Self {
        Self {
            fragments,
            output: output.into(),
            layout: TocLayout::default(),
            compression: CompressionLevel::default(),
            overwrite_mode: OverwriteMode::default(),
            intermediate: None,
            dry_run: false,
            verbose: false,
            quiet: false,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No fragments are specified
    /// - Verbose and quiet modes are both enabled
    /// - The output or intermediate path collides with an input
    /// - The intermediate path equals the output path
    pub fn validate(&self) -> Result<()> {
        if self.fragments.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        for fragment in &self.fragments {
            if fragment.source == self.output {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    self.output.display()
                );
            }
        }

        if let Some(intermediate) = &self.intermediate {
            if intermediate == &self.output {
                bail!(
                    "Intermediate file cannot be the output file: {}",
                    intermediate.display()
                );
            }

            if self.fragments.iter().any(|f| &f.source == intermediate) {
                bail!(
                    "Intermediate file cannot be an input file: {}",
                    intermediate.display()
                );
            }
        }

        Ok(())
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
