//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

/// Kind of corpus file a document was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// One document per CSV row
    Tabular,
    /// One document per PDF page
    Pdf,
    /// One document per text file
    #[serde(rename = "text")]
    PlainText,
}

impl SourceType {
    /// Detect source type from a file extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Tabular),
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tabular => "tabular",
            Self::Pdf => "pdf",
            Self::PlainText => "text",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of text extracted from a corpus file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Extracted text
    pub text: String,

    /// File the text came from
    pub source_path: PathBuf,

    /// Kind of file
    pub source_type: SourceType,

    /// 0-based row index for CSV, 1-based page number for PDF, 0 for text files
    pub position: usize,
}

/// A contiguous window of a document's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Trimmed chunk text
    pub text: String,

    /// Path of the originating document
    pub parent_source: PathBuf,

    /// 0-based index within its document
    pub position: usize,

    /// Byte range of the untrimmed window in the document text
    pub byte_range: Range<usize>,
}

/// A corpus file that contributed no documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of loading a corpus directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub documents: Vec<SourceDocument>,
    pub skipped: Vec<SkippedFile>,
}

impl LoadReport {
    /// Whether no documents were loaded.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Statistics about the index built at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of source documents loaded
    pub documents: usize,

    /// Files skipped during loading
    pub skipped_files: Vec<SkippedFile>,

    /// Number of indexed chunks
    pub chunks: usize,

    /// Embedding dimensionality (0 when nothing was indexed)
    pub dimensions: usize,

    /// When the index was built
    pub built_at: DateTime<Utc>,
}
