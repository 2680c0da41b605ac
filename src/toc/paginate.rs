//! Packing wrapped TOC entries into pages under a line budget.

use crate::config::TocLayout;
use crate::toc::metrics::TextMeasurer;
use crate::toc::wrap::wrap_title;
use crate::toc::{TocEntry, TocPage, WrappedEntry};

/// Line shown for an entry whose title wraps to nothing.
pub const UNTITLED_PLACEHOLDER: &str = "Untitled";

/// Wrap a single entry to the width left after its indent.
pub fn wrap_entry(entry: TocEntry, layout: &TocLayout, measurer: &dyn TextMeasurer) -> WrappedEntry {
    let max_width = layout.text_max_width(measurer) - layout.indent(entry.level);
    let mut lines = wrap_title(&entry.title, layout.font_size, max_width, measurer);

    if lines.is_empty() {
        log::warn!(
            "TOC entry for page {} has an empty title, using '{UNTITLED_PLACEHOLDER}'",
            entry.target_page
        );
        lines.push(UNTITLED_PLACEHOLDER.to_string());
    }

    WrappedEntry { entry, lines }
}

/// Pack entries into TOC pages, preserving their order.
///
/// A page is closed when the next entry would push its line count past the
/// page's budget. An entry taller than a whole page still gets a page of its
/// own; it is never split and never shares a page with the entry before it.
pub fn paginate(
    entries: Vec<TocEntry>,
    layout: &TocLayout,
    measurer: &dyn TextMeasurer,
) -> Vec<TocPage> {
    let mut pages = Vec::new();
    let mut current = TocPage::default();
    let mut budget = layout.lines_per_page(true);

    for entry in entries {
        let wrapped = wrap_entry(entry, layout, measurer);
        let line_count = wrapped.line_count();

        if !current.entries.is_empty() && current.line_count() + line_count > budget {
            pages.push(std::mem::take(&mut current));
            budget = layout.lines_per_page(false);
        }

        if line_count > budget {
            log::debug!(
                "TOC entry '{}' needs {line_count} lines, page budget is {budget}",
                wrapped.entry.title
            );
        }

        current.entries.push(wrapped);
    }

    if !current.entries.is_empty() {
        pages.push(current);
    }

    pages
}
