//! Visual themes for guideline sections.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::lookup::TieredLookup;

/// Emoji and colours used to render one section card.
///
/// Serialized with the short keys the page script reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub emoji: String,
    #[serde(rename = "bg")]
    pub background_color: String,
    #[serde(rename = "text")]
    pub text_color: String,
    #[serde(rename = "accent")]
    pub accent_color: String,
}

impl ColorScheme {
    pub fn new(emoji: &str, background: &str, text: &str, accent: &str) -> Self {
        Self {
            emoji: emoji.to_string(),
            background_color: background.to_string(),
            text_color: text.to_string(),
            accent_color: accent.to_string(),
        }
    }

    /// Neutral gray for sections without a dedicated scheme.
    pub fn neutral() -> Self {
        Self::new("📝", "#e2e8f0", "#1e293b", "#475569")
    }
}

/// Resolves section headers to colour schemes.
#[derive(Debug, Clone)]
pub struct SectionColorizer {
    schemes: TieredLookup<ColorScheme>,
}

impl SectionColorizer {
    pub fn new(schemes: IndexMap<String, ColorScheme>, default: ColorScheme) -> Self {
        Self {
            schemes: TieredLookup::new(schemes, default),
        }
    }

    /// Schemes for the standard guideline section headers.
    pub fn clinical() -> Self {
        let red_flags = ColorScheme::new("🚨", "#fde8e8", "#991b1b", "#dc3545");
        let background = ColorScheme::new("📋", "#dbeafe", "#1e3a5f", "#0066cc");
        let assessment = ColorScheme::new("🔍", "#d1fae5", "#065f46", "#17a2b8");
        let management = ColorScheme::new("💊", "#dcfce7", "#166534", "#28a745");
        let discharge = ColorScheme::new("📤", "#ede9fe", "#5b21b6", "#6f42c1");
        let advice = ColorScheme::new("📞", "#ffedd5", "#9a3412", "#ff8c42");
        let information = ColorScheme::new("📚", "#f3f4f6", "#374151", "#6b7280");

        let schemes: IndexMap<String, ColorScheme> = [
            ("Red Flags", red_flags),
            ("Background", background),
            ("Assessment", assessment.clone()),
            ("Secondary Assessment", assessment.clone()),
            ("Ongoing Assessment", assessment),
            ("Management", management.clone()),
            ("Ongoing Management", management),
            ("Discharge and Follow up", discharge),
            ("Advice and Referrals", advice),
            ("Information and References", information),
        ]
        .into_iter()
        .map(|(header, scheme)| (header.to_string(), scheme))
        .collect();

        Self::new(schemes, ColorScheme::neutral())
    }

    pub fn color_for(&self, header: &str) -> ColorScheme {
        self.schemes.resolve(header).clone()
    }
}

impl Default for SectionColorizer {
    fn default() -> Self {
        Self::clinical()
    }
}
