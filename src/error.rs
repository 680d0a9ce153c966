//! Error types for the guideline builder.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that end a build or exclude a single document from it.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The guidelines directory held no Word documents.
    #[error("no Word documents found in {}", .0.display())]
    NoDocuments(PathBuf),

    /// Documents were found but every one of them failed to process.
    #[error("no guidelines were processed successfully ({attempted} attempted)")]
    NoGuidelinesProcessed { attempted: usize },

    /// A document has no tables to read metadata or sections from.
    #[error("document has no tables")]
    MissingTable,

    /// The archive is not a readable Word document.
    #[error("invalid Word document: {0}")]
    Docx(#[from] zip::result::ZipError),

    /// `word/document.xml` could not be parsed.
    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;
