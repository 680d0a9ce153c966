//! Groups the lines of a section body into markup blocks.
//!
//! A single cursor walks the lines. At each non-blank line the rules below are
//! tried in order and the first that applies consumes one or more lines:
//!
//! 1. a line the [`PatternTable`] classifies as H3 or H4 becomes a heading
//! 2. a short line followed by a long paragraph becomes an H3 heading
//! 3. a numbered step takes the plain lines after it as sub-items
//! 4. three or more consecutive short lines become a bullet list
//! 5. a directive or colon-terminated line becomes a bold line
//! 6. anything else is a paragraph
//!
//! Blank lines are never emitted; they are skipped by the cursor and by every
//! lookahead.

use serde::Serialize;

use crate::patterns::{char_len, is_numbered, parse_numbered, LineClass, PatternTable};

/// Implicit headings are shorter than this...
const IMPLICIT_HEADING_MAX_LEN: usize = 60;
/// ...and precede a line longer than this.
const LONG_PARAGRAPH_MIN_LEN: usize = 80;
/// Bullet candidates are shorter than this.
const LIST_ITEM_MAX_LEN: usize = 100;
/// Lines this short are too terse for an implicit heading or list item.
const MIN_LINE_LEN: usize = 3;
/// A run of short lines must be at least this long to become a list.
const MIN_LIST_ITEMS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H3,
    H4,
}

impl HeadingLevel {
    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
        }
    }
}

/// One structural block inferred from section text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkupBlock {
    Heading { level: HeadingLevel, text: String },
    Paragraph { text: String },
    BoldLine { text: String },
    List { items: Vec<String> },
    NumberedItem { number: String, text: String, subitems: Vec<String> },
}

impl MarkupBlock {
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        MarkupBlock::Heading { level, text: text.into() }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        MarkupBlock::Paragraph { text: text.into() }
    }

    pub fn bold_line(text: impl Into<String>) -> Self {
        MarkupBlock::BoldLine { text: text.into() }
    }
}

/// Applies the block rules to a sequence of lines.
pub struct LineSegmenter<'a> {
    patterns: &'a PatternTable,
}

impl<'a> LineSegmenter<'a> {
    pub fn new(patterns: &'a PatternTable) -> Self {
        Self { patterns }
    }

    pub fn segment(&self, lines: &[&str]) -> Vec<MarkupBlock> {
        let mut blocks = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].trim();
            if line.is_empty() {
                i += 1;
                continue;
            }

            let len = char_len(line);
            let class = self.patterns.classify_line(line);

            // Rule 1: known heading
            match class {
                LineClass::H3 => {
                    blocks.push(MarkupBlock::heading(HeadingLevel::H3, line));
                    i += 1;
                    continue;
                }
                LineClass::H4 => {
                    blocks.push(MarkupBlock::heading(HeadingLevel::H4, line));
                    i += 1;
                    continue;
                }
                _ => {}
            }

            // Rule 2: short line introducing a long paragraph
            if len > MIN_LINE_LEN
                && len < IMPLICIT_HEADING_MAX_LEN
                && !line.ends_with('.')
                && !line.ends_with(',')
                && !is_numbered(line)
            {
                if let Some(next) = next_non_blank(lines, i + 1) {
                    if char_len(next) > LONG_PARAGRAPH_MIN_LEN {
                        blocks.push(MarkupBlock::heading(HeadingLevel::H3, line));
                        i += 1;
                        continue;
                    }
                }
            }

            // Rule 3: numbered step with trailing sub-items
            if let Some((number, text)) = parse_numbered(line) {
                let (subitems, next) = self.collect_subitems(lines, i + 1);
                blocks.push(MarkupBlock::NumberedItem {
                    number: number.to_string(),
                    text: text.to_string(),
                    subitems,
                });
                i = next;
                continue;
            }

            // Rule 4: run of short lines
            if len > MIN_LINE_LEN && len < LIST_ITEM_MAX_LEN {
                let (items, next) = self.collect_list_run(lines, i);
                if items.len() >= MIN_LIST_ITEMS {
                    blocks.push(MarkupBlock::List { items });
                    i = next;
                    continue;
                }
            }

            // Rule 5: directive or colon-terminated line
            if class == LineClass::BoldDirective {
                blocks.push(MarkupBlock::bold_line(line));
                i += 1;
                continue;
            }

            // Rule 6
            blocks.push(MarkupBlock::paragraph(line));
            i += 1;
        }

        blocks
    }

    /// Collect the plain lines following a numbered step. Stops at the next
    /// numbered step, heading or directive. Returns the items and the index
    /// of the first unconsumed line.
    fn collect_subitems(&self, lines: &[&str], start: usize) -> (Vec<String>, usize) {
        let mut subitems = Vec::new();
        let mut i = start;

        while i < lines.len() {
            let sub = lines[i].trim();
            if sub.is_empty() {
                i += 1;
                continue;
            }
            if is_numbered(sub)
                || self.patterns.matches_heading(sub)
                || self.patterns.is_directive(sub)
            {
                break;
            }
            subitems.push(sub.to_string());
            i += 1;
        }

        (subitems, i)
    }

    /// Collect the run of short lines starting at `start`, which is always
    /// included. Returns the run and the index just past it.
    fn collect_list_run(&self, lines: &[&str], start: usize) -> (Vec<String>, usize) {
        let mut items = vec![lines[start].trim().to_string()];
        let mut j = start + 1;

        while j < lines.len() {
            let next = lines[j].trim();
            if next.is_empty() {
                j += 1;
                continue;
            }
            if is_numbered(next) || self.patterns.matches_heading(next) {
                break;
            }
            let len = char_len(next);
            if len > MIN_LINE_LEN && len < LIST_ITEM_MAX_LEN {
                items.push(next.to_string());
                j += 1;
            } else {
                break;
            }
        }

        (items, j)
    }
}

fn next_non_blank<'l>(lines: &[&'l str], from: usize) -> Option<&'l str> {
    lines[from.min(lines.len())..]
        .iter()
        .copied()
        .map(str::trim)
        .find(|line| !line.is_empty())
}
