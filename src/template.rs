//! Injects the build data into the page template.
//!
//! The template is a complete HTML page whose script declares three empty
//! data constants. Each declaration is replaced, byte for byte, with one that
//! carries the built data. A declaration that has drifted from the expected
//! text is left alone and reported.

use anyhow::{Context, Result};
use log::warn;
use std::collections::BTreeMap;
use std::path::Path;

use crate::category::CategoryConfig;
use crate::document::Guideline;

pub const GUIDELINES_PLACEHOLDER: &str = "const guidelinesData = /*GUIDELINES_DATA*/[];";
pub const CATEGORIES_PLACEHOLDER: &str =
    r#"const categories = /*CATEGORIES_DATA*/{"categories":{},"category_order":[]};"#;
pub const INDEX_PLACEHOLDER: &str = "const guidelineIndex = {};";

pub struct PageTemplate {
    source: String,
}

impl PageTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template: {}", path.display()))?;
        Ok(Self::new(source))
    }

    /// Produce the page with all three data blocks substituted.
    pub fn render(
        &self,
        guidelines: &[Guideline],
        categories: &CategoryConfig,
        index: &BTreeMap<String, usize>,
    ) -> Result<String> {
        let guidelines_json =
            serde_json::to_string(guidelines).context("Failed to serialize guidelines")?;
        let categories_json =
            serde_json::to_string(categories).context("Failed to serialize categories")?;

        let output = replace_placeholder(
            &self.source,
            GUIDELINES_PLACEHOLDER,
            &format!("const guidelinesData = {};", guidelines_json),
        );
        let output = replace_placeholder(
            &output,
            CATEGORIES_PLACEHOLDER,
            &format!("const categories = {};", categories_json),
        );
        let output = replace_placeholder(&output, INDEX_PLACEHOLDER, &index_literal(index)?);

        Ok(output)
    }
}

fn replace_placeholder(source: &str, placeholder: &str, replacement: &str) -> String {
    if !source.contains(placeholder) {
        warn!("Template placeholder not found, data not injected: {}", placeholder);
        return source.to_string();
    }
    source.replace(placeholder, replacement)
}

/// The title-to-position lookup as a JavaScript object literal, one entry
/// per line, in title order.
pub fn index_literal(index: &BTreeMap<String, usize>) -> Result<String> {
    let mut code = String::from("const guidelineIndex = {");
    for (title, position) in index {
        let key = serde_json::to_string(title).context("Failed to serialize guideline title")?;
        code.push_str(&format!("\n            {}: {},", key, position));
    }
    code.push_str("\n        };");
    Ok(code)
}
