//! Guideline records and their extraction from document tables.
//!
//! Every guideline document has the same shape: one two-row table per
//! section (header row, content row), followed by a metadata table of
//! label/value rows.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::colors::ColorScheme;
use crate::docx::Table;
use crate::error::{BuildError, Result};

const TITLE_LABEL: &str = "CLINICAL GUIDELINE TITLE";

/// Filename suffixes stripped when deriving a title, in order.
const DRAFT_SUFFIXES: &[&str] = &[" Draft V.1", " Draft v.1", " Draft"];

/// A section exactly as it appears in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSection {
    pub header: String,
    pub content: String,
}

/// A section ready for the page: content rendered to HTML, colours attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedSection {
    pub header: String,
    pub content: String,
    pub colors: ColorScheme,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelineMetadata {
    pub title: Option<String>,
    pub directorate: String,
    pub reference: String,
    pub author: String,
    pub ratifying_group: String,
    pub director_approval: String,
    pub date_ratification: String,
    pub date_implementation: String,
    pub date_review: String,
}

/// One processed guideline as embedded in the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guideline {
    pub title: String,
    pub filename: String,
    pub category: String,
    pub directorate: String,
    pub author: String,
    pub date_ratification: String,
    pub date_review: String,
    pub sections: Vec<FormattedSection>,
}

/// Tables of one source document split into sections and metadata.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub metadata: GuidelineMetadata,
    pub sections: Vec<RawSection>,
}

impl ExtractedDocument {
    /// The last table holds the metadata; every earlier table is a section.
    pub fn from_tables(tables: &[Table]) -> Result<Self> {
        let (metadata_table, content_tables) =
            tables.split_last().ok_or(BuildError::MissingTable)?;

        Ok(Self {
            metadata: extract_metadata(metadata_table),
            sections: extract_sections(content_tables),
        })
    }
}

/// Read labelled metadata rows. Labels are matched by substring, so the
/// order of the checks matters for labels that overlap.
pub fn extract_metadata(table: &Table) -> GuidelineMetadata {
    let mut metadata = GuidelineMetadata::default();

    for row in &table.rows {
        if row.len() < 2 {
            continue;
        }

        let first = row[0].trim();
        let label = first.to_lowercase();
        let value = row[1].trim().to_string();

        if label.contains("clinical guideline title") {
            metadata.title = Some(strip_title_label(first));
        } else if label.contains("directorate") {
            metadata.directorate = value;
        } else if label.contains("guideline reference") {
            metadata.reference = value;
        } else if label.contains("author") {
            metadata.author = value;
        } else if label.contains("ratifying group") {
            metadata.ratifying_group = value;
        } else if label.contains("director approval") {
            metadata.director_approval = value;
        } else if label.contains("date of ratification") {
            metadata.date_ratification = value;
        } else if label.contains("date of implementation") {
            metadata.date_implementation = value;
        } else if label.contains("date for review") {
            metadata.date_review = value;
        }
    }

    metadata
}

/// The title is written into the label cell itself, after the label text.
fn strip_title_label(cell: &str) -> String {
    let pattern = format!(r"{}\s*", regex::escape(TITLE_LABEL));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.replace_all(cell, "").trim().to_string(),
        Err(_) => cell.replace(TITLE_LABEL, "").trim().to_string(),
    }
}

/// Header from the first cell of row one, content from the first cell of row
/// two. Tables with fewer rows, or an empty header or body, are skipped.
pub fn extract_sections(tables: &[Table]) -> Vec<RawSection> {
    tables
        .iter()
        .filter(|table| table.rows.len() >= 2)
        .filter_map(|table| {
            let header = table.cell(0, 0)?.trim();
            let content = table.cell(1, 0)?.trim();
            if header.is_empty() || content.is_empty() {
                return None;
            }
            Some(RawSection {
                header: header.to_string(),
                content: content.to_string(),
            })
        })
        .collect()
}

/// Derive the display title. The filename is preferred since metadata titles
/// are inconsistently capitalised across documents.
pub fn guideline_title(filename: &str, metadata_title: Option<&str>) -> String {
    let stem = filename.strip_suffix(".docx").unwrap_or(filename);
    let mut title = stem.to_string();
    for suffix in DRAFT_SUFFIXES {
        title = title.replace(suffix, "");
    }
    let title = title.trim();

    if !title.is_empty() {
        return title.to_string();
    }

    match metadata_title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => stem.to_string(),
    }
}
