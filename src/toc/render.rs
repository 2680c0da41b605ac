//! Placing TOC text on pages and producing PDF content streams.
//!
//! Rendering happens in two steps. [`render`] computes positions in layout
//! coordinates (top-left origin) and records them as [`PlacedText`] runs plus
//! one [`LinkTarget`] per entry. [`TocPageDrawing::to_content`] then turns a page
//! into lopdf operations, flipping y into PDF's bottom-left space.

use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

use crate::config::TocLayout;
use crate::toc::metrics::{TextMeasurer, WIN_ANSI_REPLACEMENT, win_ansi_code};
use crate::toc::{LinkTarget, Rect, TocPage, WrappedEntry};

/// Resource name the TOC font is registered under on every TOC page.
pub const TOC_FONT_RESOURCE: &str = "F1";

/// Horizontal space between the end of a title and the first leader dot.
const LEADER_START_PADDING: f32 = 2.0;

/// What a placed text run represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    /// The centered "Table of Contents" heading.
    Banner,
    /// One wrapped line of an entry title.
    Title,
    /// The dot leader after the last title line.
    Leader,
    /// The right-aligned page number.
    PageNumber,
}

/// A run of text at a fixed position. `y` is the baseline, measured from the top.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    /// Kind of run.
    pub role: TextRole,
    /// Text to draw.
    pub text: String,
    /// Left edge of the run.
    pub x: f32,
    /// Baseline, from the top of the page.
    pub y: f32,
    /// Font size of the run.
    pub font_size: f32,
}

/// Everything drawn on one TOC page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TocPageDrawing {
    /// Text runs in drawing order.
    pub texts: Vec<PlacedText>,
}

impl TocPageDrawing {
    /// Runs with the given role, in drawing order.
    pub fn texts_with_role(&self, role: TextRole) -> impl Iterator<Item = &PlacedText> {
        self.texts.iter().filter(move |t| t.role == role)
    }

    /// Convert the page into content-stream operations.
    pub fn to_content(&self, page_height: f32) -> Content {
        let mut operations = Vec::with_capacity(self.texts.len() * 5);

        for run in &self.texts {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![
                    Object::Name(TOC_FONT_RESOURCE.as_bytes().to_vec()),
                    run.font_size.into(),
                ],
            ));
            operations.push(Operation::new(
                "Td",
                vec![run.x.into(), (page_height - run.y).into()],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(to_win_ansi(&run.text), StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        Content { operations }
    }
}

/// Rendered TOC pages plus the clickable regions on them.
#[derive(Debug, Clone, Default)]
pub struct RenderedToc {
    /// One drawing per TOC page, in order.
    pub pages: Vec<TocPageDrawing>,
    /// One link per entry, in entry order.
    pub links: Vec<LinkTarget>,
}

impl RenderedToc {
    /// Number of TOC pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Render paginated entries.
///
/// `toc_page_count` is the number of pages that will precede the body in the
/// final document. Displayed numbers are 1-based final page numbers.
pub fn render(
    pages: &[TocPage],
    layout: &TocLayout,
    measurer: &dyn TextMeasurer,
    toc_page_count: usize,
) -> RenderedToc {
    let mut rendered = RenderedToc {
        pages: Vec::with_capacity(pages.len()),
        links: Vec::new(),
    };

    for (page_index, page) in pages.iter().enumerate() {
        let mut drawing = TocPageDrawing::default();
        let mut y = layout.top_margin;

        if page_index == 0
            && let Some(banner) = layout.banner.as_deref()
        {
            drawing.texts.push(place_banner(banner, y, layout, measurer));
            y += layout.line_spacing();
        }

        for wrapped in &page.entries {
            let (rect, y_after) =
                place_entry(&mut drawing, wrapped, y, layout, measurer, toc_page_count);
            rendered.links.push(LinkTarget {
                toc_page_index: page_index,
                rect,
                body_target_page: wrapped.entry.target_page,
            });
            y = y_after;
        }

        rendered.pages.push(drawing);
    }

    rendered
}

fn place_banner(
    banner: &str,
    y: f32,
    layout: &TocLayout,
    measurer: &dyn TextMeasurer,
) -> PlacedText {
    let font_size = layout.banner_font_size();
    let width = measurer.text_width(banner, font_size);
    PlacedText {
        role: TextRole::Banner,
        text: banner.to_string(),
        x: layout.page_width / 2.0 - width / 2.0,
        y,
        font_size,
    }
}

/// Draw one entry starting at baseline `y`. Returns the link rectangle and
/// the baseline following the entry.
fn place_entry(
    drawing: &mut TocPageDrawing,
    wrapped: &WrappedEntry,
    y: f32,
    layout: &TocLayout,
    measurer: &dyn TextMeasurer,
    toc_page_count: usize,
) -> (Rect, f32) {
    let font_size = layout.font_size;
    let x = layout.left_margin + layout.indent(wrapped.entry.level);
    let first_line_y = y;
    let mut y = y;

    let last = wrapped.lines.len().saturating_sub(1);
    for (i, line) in wrapped.lines.iter().enumerate() {
        drawing.texts.push(PlacedText {
            role: TextRole::Title,
            text: line.clone(),
            x,
            y,
            font_size,
        });

        if i == last {
            let number = (wrapped.entry.target_page + toc_page_count + 1).to_string();
            let number_width = measurer.text_width(&number, font_size);
            let number_x = layout.page_number_x() - number_width;

            let dots_start_x = x + measurer.text_width(line, font_size) + LEADER_START_PADDING;
            let dots_limit = number_x - layout.leader_gap;
            let dot_width = measurer.text_width(".", font_size);
            if dot_width > 0.0 && dots_start_x < dots_limit {
                let count = ((dots_limit - dots_start_x) / dot_width).floor() as usize;
                if count > 0 {
                    drawing.texts.push(PlacedText {
                        role: TextRole::Leader,
                        text: ".".repeat(count),
                        x: dots_start_x,
                        y,
                        font_size,
                    });
                }
            }

            drawing.texts.push(PlacedText {
                role: TextRole::PageNumber,
                text: number,
                x: number_x,
                y,
                font_size,
            });
        }

        y += layout.line_spacing();
    }

    let rect = Rect::new(x, first_line_y - font_size, layout.page_number_x(), y);
    (rect, y)
}

/// Encode text for the WinAnsi-encoded base font. Unmappable characters become `?`.
pub(crate) fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| win_ansi_code(c).unwrap_or(WIN_ANSI_REPLACEMENT))
        .collect()
}
