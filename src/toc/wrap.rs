//! Greedy word wrapping of TOC titles.

use crate::toc::metrics::TextMeasurer;

/// Wrap `title` into the fewest lines that fit `max_width` at `font_size`.
///
/// Words are separated by any whitespace and re-joined with a single space. A
/// word wider than `max_width` is kept whole on its own line. An empty or
/// whitespace-only title yields no lines.
pub fn wrap_title(
    title: &str,
    font_size: f32,
    max_width: f32,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut words = title.split_whitespace();

    let Some(first) = words.next() else {
        return lines;
    };
    let mut current = first.to_string();

    for word in words {
        let candidate_len = current.len() + 1 + word.len();
        let mut candidate = String::with_capacity(candidate_len);
        candidate.push_str(&current);
        candidate.push(' ');
        candidate.push_str(word);

        if measurer.text_width(&candidate, font_size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    lines.push(current);
    lines
}
