//! Shared helpers for path expansion and display.

use crate::{PdfPackError, Result, io::PdfReader};
use std::path::PathBuf;

/// Expand glob patterns into existing files.
///
/// Matches of one pattern are sorted; patterns keep the order they were given in.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns {
        resolved_paths.extend(collect_paths_for_pattern(pattern.as_ref())?);
    }

    Ok(resolved_paths)
}

fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|err| PdfPackError::Other {
        message: format!("Invalid pattern '{pattern}': {err}"),
    })?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| PdfPackError::Other {
            message: err.to_string(),
        })?;
        PdfReader::check_path_exists(&path)?;
        resolved_paths.push(path);
    }

    if resolved_paths.is_empty() {
        return Err(PdfPackError::file_not_found(PathBuf::from(pattern)));
    }

    resolved_paths.sort();
    Ok(resolved_paths)
}

/// Sort key from the first dotted number in `text`.
///
/// `"t_14.1.10"` gives `[14, 1, 10]`, so it orders after `"t_14.1.2"`. Text
/// without digits gets a key that sorts after every numbered title.
pub fn dotted_number_key(text: &str) -> Vec<u64> {
    let Some(start) = text.find(|c: char| c.is_ascii_digit()) else {
        return vec![u64::MAX];
    };

    let mut key = Vec::new();
    let mut rest = &text[start..];
    loop {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        key.push(rest[..end].parse().unwrap_or(u64::MAX));
        rest = &rest[end..];

        match rest.strip_prefix('.') {
            Some(next) if next.starts_with(|c: char| c.is_ascii_digit()) => rest = next,
            _ => break,
        }
    }
    key
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
