//! Turns raw section text into HTML fragments.
//!
//! Line text is passed through as-is unless escaping is enabled: the source
//! documents are trusted and the page has always shown their text verbatim.

use crate::patterns::PatternTable;
use crate::segmenter::{LineSegmenter, MarkupBlock};

pub struct ContentFormatter {
    patterns: PatternTable,
    escape_html: bool,
}

impl ContentFormatter {
    pub fn new(patterns: PatternTable) -> Self {
        Self {
            patterns,
            escape_html: false,
        }
    }

    /// Escape `<`, `>` and `&` in line text when rendering.
    pub fn with_html_escaping(mut self, escape_html: bool) -> Self {
        self.escape_html = escape_html;
        self
    }

    /// Infer the block structure of a section body.
    pub fn format(&self, content: &str) -> Vec<MarkupBlock> {
        if content.trim().is_empty() {
            return Vec::new();
        }

        let lines: Vec<&str> = content.split('\n').collect();
        LineSegmenter::new(&self.patterns).segment(&lines)
    }

    /// Render blocks to HTML, one element per line.
    pub fn render(&self, blocks: &[MarkupBlock]) -> String {
        let mut out = Vec::new();
        for block in blocks {
            self.render_block(block, &mut out);
        }
        out.join("\n")
    }

    pub fn format_html(&self, content: &str) -> String {
        self.render(&self.format(content))
    }

    fn render_block(&self, block: &MarkupBlock, out: &mut Vec<String>) {
        match block {
            MarkupBlock::Heading { level, text } => {
                let tag = level.tag();
                out.push(format!("<{}>{}</{}>", tag, self.text(text), tag));
            }
            MarkupBlock::Paragraph { text } => {
                out.push(format!("<p>{}</p>", self.text(text)));
            }
            MarkupBlock::BoldLine { text } => {
                out.push(format!("<strong>{}</strong>", self.text(text)));
            }
            MarkupBlock::List { items } => self.render_list(items, out),
            MarkupBlock::NumberedItem {
                number,
                text,
                subitems,
            } => {
                out.push(format!(
                    "<p><strong>{}. {}</strong></p>",
                    number,
                    self.text(text)
                ));
                if !subitems.is_empty() {
                    self.render_list(subitems, out);
                }
            }
        }
    }

    fn render_list(&self, items: &[String], out: &mut Vec<String>) {
        out.push("<ul>".to_string());
        for item in items {
            out.push(format!("<li>{}</li>", self.text(item)));
        }
        out.push("</ul>".to_string());
    }

    fn text<'t>(&self, text: &'t str) -> std::borrow::Cow<'t, str> {
        if self.escape_html {
            html_escape::encode_text(text)
        } else {
            std::borrow::Cow::Borrowed(text)
        }
    }
}
