//! Minimal Word document reader.
//!
//! Guideline documents keep all their content in tables, so only the tables
//! of `word/document.xml` are read. Text is assembled the way Word presents
//! it: runs concatenated, tabs and breaks kept, paragraphs of a cell joined by
//! newlines.

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;

const DOCUMENT_PART: &str = "word/document.xml";

/// A table of cell texts, row by row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// Read the top-level body tables of a `.docx` file.
pub fn read_tables(path: &Path) -> Result<Vec<Table>> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;

    let tables = parse_tables(&xml)?;
    debug!("Read {} tables from {}", tables.len(), path.display());
    Ok(tables)
}

/// Builder state for the table currently being read.
#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<CellState>,
}

struct CellState {
    paragraphs: Vec<String>,
    paragraph: Option<String>,
    span: usize,
    in_run: bool,
    in_text: bool,
}

impl CellState {
    fn new() -> Self {
        Self {
            paragraphs: Vec::new(),
            paragraph: None,
            span: 1,
            in_run: false,
            in_text: false,
        }
    }

    fn push_str(&mut self, text: &str) {
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.push_str(text);
        }
    }

    fn finish(self) -> (String, usize) {
        (self.paragraphs.join("\n"), self.span)
    }
}

/// Parse the tables out of a `word/document.xml` body. Tables nested inside
/// cells are skipped along with their text, as is text box content.
pub fn parse_tables(xml: &str) -> Result<Vec<Table>> {
    let mut reader = Reader::from_str(xml);
    let mut tables = Vec::new();
    let mut depth = 0usize;
    let mut hidden_depth = 0usize;
    let mut state = TableState::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) if is_hidden_container(e.local_name().as_ref()) => hidden_depth += 1,
            Event::End(e) if is_hidden_container(e.local_name().as_ref()) => {
                hidden_depth = hidden_depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ if hidden_depth > 0 => {}
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => {
                    depth += 1;
                    if depth == 1 {
                        state = TableState::default();
                    }
                }
                _ if depth != 1 => {}
                b"tr" => state.row = Some(Vec::new()),
                b"tc" => state.cell = Some(CellState::new()),
                b"p" => {
                    if let Some(cell) = state.cell.as_mut() {
                        cell.paragraph = Some(String::new());
                    }
                }
                b"r" => set_cell_flag(&mut state, |cell| cell.in_run = true),
                b"t" => set_cell_flag(&mut state, |cell| cell.in_text = cell.in_run),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"tbl" => {
                    if depth == 1 {
                        tables.push(Table {
                            rows: std::mem::take(&mut state.rows),
                        });
                    }
                    depth = depth.saturating_sub(1);
                }
                _ if depth != 1 => {}
                b"tr" => {
                    if let Some(row) = state.row.take() {
                        state.rows.push(row);
                    }
                }
                b"tc" => {
                    if let Some(cell) = state.cell.take() {
                        let (text, span) = cell.finish();
                        if let Some(row) = state.row.as_mut() {
                            row.extend(std::iter::repeat(text).take(span));
                        }
                    }
                }
                b"p" => {
                    if let Some(cell) = state.cell.as_mut() {
                        if let Some(paragraph) = cell.paragraph.take() {
                            cell.paragraphs.push(paragraph);
                        }
                    }
                }
                b"r" => set_cell_flag(&mut state, |cell| cell.in_run = false),
                b"t" => set_cell_flag(&mut state, |cell| cell.in_text = false),
                _ => {}
            },
            Event::Empty(e) if depth == 1 => {
                if let Some(cell) = state.cell.as_mut() {
                    read_empty_element(cell, &e);
                }
            }
            Event::Text(e) if depth == 1 => {
                if let Some(cell) = state.cell.as_mut() {
                    if cell.in_text {
                        cell.push_str(&e.unescape()?);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(tables)
}

/// Text boxes carry their own paragraphs, and `mc:Fallback` repeats the
/// drawing as VML. Neither belongs to the cell text.
fn is_hidden_container(local_name: &[u8]) -> bool {
    matches!(local_name, b"txbxContent" | b"Fallback")
}

fn set_cell_flag(state: &mut TableState, update: impl FnOnce(&mut CellState)) {
    if let Some(cell) = state.cell.as_mut() {
        update(cell);
    }
}

fn read_empty_element(cell: &mut CellState, e: &BytesStart<'_>) {
    match e.local_name().as_ref() {
        b"p" => cell.paragraphs.push(String::new()),
        b"tab" | b"ptab" if cell.in_run => cell.push_str("\t"),
        b"noBreakHyphen" if cell.in_run => cell.push_str("-"),
        b"br" | b"cr" if cell.in_run => cell.push_str("\n"),
        b"gridSpan" => {
            if let Some(span) = attribute_value(e, b"val").and_then(|v| v.parse().ok()) {
                cell.span = span;
            }
        }
        _ => {}
    }
}

fn attribute_value(e: &BytesStart<'_>, local_name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == local_name)
        .and_then(|attr| String::from_utf8(attr.value.into_owned()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(tables: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            tables
        )
    }

    #[test]
    fn test_cells_and_paragraphs() {
        let xml = body(
            r#"<w:p><w:r><w:t>Intro outside tables</w:t></w:r></w:p>
<w:tbl>
  <w:tr><w:tc><w:p><w:r><w:t>Background</w:t></w:r></w:p></w:tc></w:tr>
  <w:tr><w:tc>
    <w:p><w:r><w:t xml:space="preserve">First </w:t></w:r><w:r><w:t>line</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:t>Fish &amp; chips</w:t><w:tab/><w:t>end</w:t></w:r></w:p>
  </w:tc></w:tr>
</w:tbl>"#,
        );

        let tables = parse_tables(&xml).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].cell(0, 0), Some("Background"));
        assert_eq!(tables[0].cell(1, 0), Some("First line\n\nFish & chips\tend"));
        assert_eq!(tables[0].cell(2, 0), None);
    }

    #[test]
    fn test_grid_span_repeats_cell() {
        let xml = body(
            r#"<w:tbl><w:tr>
  <w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>Wide</w:t></w:r></w:p></w:tc>
  <w:tc><w:p><w:r><w:t>Narrow</w:t></w:r></w:p></w:tc>
</w:tr></w:tbl>"#,
        );

        let tables = parse_tables(&xml).unwrap();
        assert_eq!(tables[0].rows[0], vec!["Wide", "Wide", "Narrow"]);
    }

    #[test]
    fn test_nested_tables_are_skipped() {
        let xml = body(
            r#"<w:tbl><w:tr><w:tc>
  <w:p><w:r><w:t>Outer</w:t></w:r></w:p>
  <w:tbl><w:tr><w:tc><w:p><w:r><w:t>Inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
</w:tc></w:tr></w:tbl>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Second</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );

        let tables = parse_tables(&xml).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows, vec![vec!["Outer".to_string()]]);
        assert_eq!(tables[1].cell(0, 0), Some("Second"));
    }

    #[test]
    fn test_tab_stops_are_not_text() {
        let xml = body(
            r#"<w:tbl><w:tr><w:tc><w:p>
  <w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
  <w:r><w:t>Text</w:t><w:br/><w:t>More</w:t></w:r>
</w:p></w:tc></w:tr></w:tbl>"#,
        );

        let tables = parse_tables(&xml).unwrap();
        assert_eq!(tables[0].cell(0, 0), Some("Text\nMore"));
    }

    #[test]
    fn test_hyphen_and_absolute_tab_runs() {
        let xml = body(
            r#"<w:tbl><w:tr><w:tc><w:p>
  <w:r><w:t>Non</w:t><w:noBreakHyphen/><w:t>pharmacological options</w:t></w:r>
</w:p><w:p>
  <w:r><w:t>Dose</w:t><w:ptab w:relativeTo="margin" w:alignment="right" w:leader="none"/><w:t>5 mg</w:t></w:r>
</w:p></w:tc></w:tr></w:tbl>"#,
        );

        let tables = parse_tables(&xml).unwrap();
        assert_eq!(
            tables[0].cell(0, 0),
            Some("Non-pharmacological options\nDose\t5 mg")
        );
    }

    #[test]
    fn test_text_box_content_is_skipped() {
        let xml = body(
            r#"<w:tbl><w:tr><w:tc><w:p>
  <w:r><w:t xml:space="preserve">Before </w:t></w:r>
  <w:r><mc:AlternateContent><mc:Choice Requires="wps"><w:drawing><wps:txbx><w:txbxContent>
    <w:p><w:r><w:t>BOX</w:t></w:r></w:p>
  </w:txbxContent></wps:txbx></w:drawing></mc:Choice><mc:Fallback><w:pict><v:textbox><w:txbxContent>
    <w:p><w:r><w:t>BOX</w:t></w:r></w:p>
  </w:txbxContent></v:textbox></w:pict></mc:Fallback></mc:AlternateContent></w:r>
  <w:r><w:t>after</w:t></w:r>
</w:p><w:p><w:r><w:t>Next</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );

        let tables = parse_tables(&xml).unwrap();
        assert_eq!(tables[0].cell(0, 0), Some("Before after\nNext"));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(read_tables(Path::new("/nonexistent/guideline.docx")).is_err());
    }
}
