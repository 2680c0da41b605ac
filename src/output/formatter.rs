//! Message formatting and display.
//!
//! User-facing status lines for the CLI, with support for quiet and verbose
//! modes. Diagnostics from the library go through `log` instead.
//!
//! # Examples
//!
//! ```
//! use pdfpack::output::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Merging 3 fragments...");
//! formatter.success("Created report.pdf");
//! ```

use crate::assemble::{AssemblyPlan, AssemblyReport};
use crate::config::Config;
use std::io::{self, Write};

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
    /// Debug/verbose message.
    Debug,
}

impl MessageLevel {
    fn prefix(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Error => "✗ ",
            Self::Debug => "→ ",
        }
    }

    fn color_code(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "\x1b[32m",
            Self::Warning => "\x1b[33m",
            Self::Error => "\x1b[31m",
            Self::Debug => "\x1b[36m",
        }
    }

    /// Warnings and errors go to stderr.
    fn is_diagnostic(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// Output formatter with configurable verbosity.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    /// Whether to suppress non-error output.
    quiet: bool,
    /// Whether to show verbose output.
    verbose: bool,
    /// Whether to use colored output.
    colored: bool,
}

impl OutputFormatter {
    /// Create a new output formatter.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: Self::should_use_color(),
        }
    }

    /// Create a formatter from configuration.
    ///
    /// A dry run always prints its plan, even in quiet mode.
    pub fn from_config(config: &Config) -> Self {
        Self::new(!config.should_print(), config.verbose)
    }

    /// Detect if colored output should be used.
    fn should_use_color() -> bool {
        use std::io::IsTerminal;
        io::stdout().is_terminal() && std::env::var("TERM").is_ok()
    }

    /// Print an informational message. Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Print a success message. Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Print a warning message, even in quiet mode.
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        self.print_message(MessageLevel::Error, message);
    }

    /// Print a message only in verbose mode.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    /// Print a labelled value in verbose mode.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Print the dry-run plan.
    pub fn plan(&self, plan: &AssemblyPlan) {
        if self.quiet {
            return;
        }
        for line in plan_lines(plan) {
            println!("{line}");
        }
    }

    /// Print the summary of a finished run.
    pub fn report(&self, report: &AssemblyReport) {
        self.success(&format!(
            "Created {} ({} pages, {})",
            report.write.output_path.display(),
            report.page_count(),
            report.write.format_file_size()
        ));
        self.detail("Fragments", &report.fragments.to_string());
        self.detail("TOC pages", &report.toc_page_count.to_string());
        self.detail("Body pages", &report.body_page_count.to_string());
        self.detail("Write time", &format!("{:?}", report.write.write_time));
        for bookmark in &report.bookmarks {
            self.debug(&format!(
                "p.{:<5} {}",
                bookmark.page_index + 1,
                bookmark.title
            ));
        }
    }

    /// Build the text of a message with level-appropriate formatting.
    pub fn format_message(&self, level: MessageLevel, message: &str) -> String {
        let prefix = level.prefix();
        let color_code = level.color_code();

        if self.colored && !color_code.is_empty() {
            format!("{color_code}{prefix}{message}\x1b[0m")
        } else {
            format!("{prefix}{message}")
        }
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        let line = self.format_message(level, message);
        if level.is_diagnostic() {
            let _ = writeln!(io::stderr(), "{line}");
        } else {
            println!("{line}");
        }
    }
}

/// Lines describing a dry-run plan.
fn plan_lines(plan: &AssemblyPlan) -> Vec<String> {
    let mut lines = Vec::with_capacity(plan.fragments.len() + 4);
    lines.push(format!("Output would be: {}", plan.output.display()));
    lines.push(format!(
        "Pages: {} TOC + {} body = {}",
        plan.toc_page_count, plan.body_page_count, plan.total_page_count
    ));

    for (index, fragment) in plan.fragments.iter().enumerate() {
        lines.push(format!(
            "  {}. p.{:<5} {} ({} pages, {})",
            index + 1,
            fragment.start_page,
            fragment.title,
            fragment.page_count,
            fragment.source.display()
        ));
    }
    lines
}
