//! Error types for pdfpack.
//!
//! Every failure inside the assembly pipeline is fatal to the run, so a single
//! error enum covers input, layout and output problems. Cleanup of scoped
//! intermediate files is the one exception: it is logged, never returned.

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfpack operations.
pub type Result<T> = std::result::Result<T, PdfPackError>;

/// Main error type for pdfpack operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfPackError {
    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input path exists but is not a regular file.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Failed to load PDF file.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", .path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF file is corrupted or has an unusable structure.
    #[error("Corrupted or invalid PDF: {}\n  Details: {details}", .path.display())]
    CorruptedPdf {
        /// Path to the corrupted PDF.
        path: PathBuf,
        /// Details about the corruption.
        details: String,
    },

    /// PDF file is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        .path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// No fragments were provided.
    #[error("No input files specified for assembly")]
    NoFilesToMerge,

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to read the fragment manifest.
    #[error("Failed to read manifest: {}\n  Reason: {source}", .path.display())]
    FailedToReadManifest {
        /// Path to the manifest file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The manifest could not be parsed or contains an invalid record.
    #[error("Invalid manifest: {}\n  Details: {details}", .path.display())]
    InvalidManifest {
        /// Path to the manifest file.
        path: PathBuf,
        /// Details about what's invalid.
        details: String,
    },

    /// Merge operation failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// TOC layout or rendering failed.
    #[error("Table of contents layout failed: {reason}")]
    LayoutFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Bookmark (outline) construction failed.
    #[error("Failed to build bookmarks: {reason}")]
    BookmarkFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfPackError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<anyhow::Error> for PdfPackError {
    fn from(err: anyhow::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl PdfPackError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a CorruptedPdf error.
    pub fn corrupted_pdf(path: PathBuf, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            path,
            details: details.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidManifest error.
    pub fn invalid_manifest(path: PathBuf, details: impl Into<String>) -> Self {
        Self::InvalidManifest {
            path,
            details: details.into(),
        }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create a LayoutFailed error.
    pub fn layout_failed(reason: impl Into<String>) -> Self {
        Self::LayoutFailed {
            reason: reason.into(),
        }
    }

    /// Create a BookmarkFailed error.
    pub fn bookmark_failed(reason: impl Into<String>) -> Self {
        Self::BookmarkFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error was caused by the inputs rather than the output side.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::NotAFile { .. }
                | Self::FailedToLoadPdf { .. }
                | Self::CorruptedPdf { .. }
                | Self::EncryptedPdf { .. }
                | Self::FailedToReadManifest { .. }
                | Self::InvalidManifest { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FailedToReadManifest { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::CorruptedPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::NoFilesToMerge => 1,
            Self::InvalidManifest { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::MergeFailed { .. } => 6,
            Self::LayoutFailed { .. } => 6,
            Self::BookmarkFailed { .. } => 6,
            Self::Other { .. } => 1,
        }
    }
}
