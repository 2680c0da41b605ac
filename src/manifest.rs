//! Fragment manifests.
//!
//! A manifest is a JSON array of `{ "source": "<path>", "title": "<bookmark>" }`
//! records, listed in merge order. Relative sources resolve against the
//! directory containing the manifest.
//!
//! ```json
//! [
//!   { "source": "tables/t_demog.pdf", "title": "Table 14.1.1 Demographics" },
//!   { "source": "listings/l_ae.pdf",  "title": "Listing 16.2.7 Adverse Events" }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PdfPackError, Result};
use crate::merge::Fragment;

/// One manifest record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// PDF path, absolute or relative to the manifest.
    pub source: PathBuf,
    /// Bookmark title. Blank titles fall back to the file name.
    #[serde(default)]
    pub title: String,
}

/// Read and parse the manifest at `path`.
///
/// # Errors
///
/// Returns [`PdfPackError::FailedToReadManifest`] if the file cannot be read
/// and [`PdfPackError::InvalidManifest`] if it is not a valid manifest.
pub async fn read_manifest(path: &Path) -> Result<Vec<Fragment>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PdfPackError::FailedToReadManifest {
            path: path.to_path_buf(),
            source,
        })?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    parse_manifest(&json, base_dir, path)
}

/// Parse manifest JSON, resolving relative sources against `base_dir`.
///
/// `manifest_path` is only used in error messages.
///
/// # Errors
///
/// Returns [`PdfPackError::InvalidManifest`] for malformed JSON, an empty
/// list, or a record with an empty source.
pub fn parse_manifest(json: &str, base_dir: &Path, manifest_path: &Path) -> Result<Vec<Fragment>> {
    let entries: Vec<ManifestEntry> = serde_json::from_str(json)
        .map_err(|e| PdfPackError::invalid_manifest(manifest_path.to_path_buf(), e.to_string()))?;

    if entries.is_empty() {
        return Err(PdfPackError::invalid_manifest(
            manifest_path.to_path_buf(),
            "Manifest lists no fragments",
        ));
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            if entry.source.as_os_str().is_empty() {
                return Err(PdfPackError::invalid_manifest(
                    manifest_path.to_path_buf(),
                    format!("Record {} has an empty source", index + 1),
                ));
            }

            let source = if entry.source.is_absolute() {
                entry.source
            } else {
                base_dir.join(entry.source)
            };
            Ok(Fragment::new(source, entry.title))
        })
        .collect()
}
