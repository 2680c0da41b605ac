//! Text measurement for TOC layout.
//!
//! Wrapping and dot-leader fill only need the advance width of a string at a
//! given font size. [`TextMeasurer`] is that seam; [`Helvetica`] answers it from
//! the base-14 font metrics, which is also the font the renderer draws with.

/// Measures the rendered width of text.
pub trait TextMeasurer {
    /// Width of `text` set at `font_size`, in points.
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

/// Base-14 Helvetica advance widths for WinAnsi codes 32..=126, in 1/1000 em.
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32..47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48..63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64..79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80..95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96..111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112..126
];

/// Helvetica widths for WinAnsi codes 128..=255. Codes the encoding leaves
/// undefined (0x81, 0x8D, 0x8F, 0x90, 0x9D) are never produced and hold 0.
const HELVETICA_HIGH_WIDTHS: [u16; 128] = [
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0, // 0x80
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667, // 0x90
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

/// Characters WinAnsiEncoding places in 0x80..=0x9F.
const WIN_ANSI_SPECIALS: [(char, u8); 27] = [
    ('\u{20AC}', 0x80), // euro
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85), // ellipsis
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91), // curly quotes
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95), // bullet
    ('\u{2013}', 0x96), // en dash
    ('\u{2014}', 0x97), // em dash
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

/// Byte drawn for characters WinAnsiEncoding cannot represent.
pub const WIN_ANSI_REPLACEMENT: u8 = b'?';

/// WinAnsiEncoding code for `c`, or `None` if the encoding has no glyph for it.
///
/// Printable ASCII and Latin-1 map to themselves. The C1 control range
/// U+0080..U+009F has no glyphs; WinAnsi reuses those codes for punctuation
/// such as dashes and curly quotes.
pub fn win_ansi_code(c: char) -> Option<u8> {
    match c as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => Some(code as u8),
        _ => WIN_ANSI_SPECIALS
            .iter()
            .find(|(special, _)| *special == c)
            .map(|&(_, code)| code),
    }
}

/// Standard Helvetica metrics, no font file required.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

impl Helvetica {
    /// Advance width of a single character in 1/1000 em.
    ///
    /// Characters without a WinAnsi code are drawn as `?` and measured as one.
    pub fn char_width(c: char) -> u16 {
        let code = win_ansi_code(c).unwrap_or(WIN_ANSI_REPLACEMENT);
        match code {
            32..=126 => HELVETICA_ASCII_WIDTHS[usize::from(code - 32)],
            128..=255 => HELVETICA_HIGH_WIDTHS[usize::from(code - 128)],
            _ => HELVETICA_ASCII_WIDTHS[usize::from(WIN_ANSI_REPLACEMENT - 32)],
        }
    }
}

impl TextMeasurer for Helvetica {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(Self::char_width(c))).sum();
        units as f32 * font_size / 1000.0
    }
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        (**self).text_width(text, font_size)
    }
}
