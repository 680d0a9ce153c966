//! Line classification tables for guideline content.
//!
//! Guideline sections arrive as flat text with no markup. The tables here
//! recognise the sub-headings and instructional directives that recur across
//! the clinical guidelines so the segmenter can turn them into structure.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

lazy_static! {
    /// Matches numbered steps such as `1. Check the previous...`
    static ref NUMBERED_REGEX: Regex = Regex::new(r"^(\d+)\.\s+(.+)").unwrap();
}

/// Lines this long or longer are never headings.
pub const HEADING_MAX_LEN: usize = 80;

/// Major sub-headings, rendered as `<h3>`.
pub const H3_PATTERNS: &[&str] = &[
    r"^About\s",
    r"^Take a history",
    r"^Examine the patient",
    r"^Arrange\s",
    r"^Immediate assessment",
    r"^Immediate management",
    r"^Initial Management",
    r"^Ongoing Management",
    r"^Secondary Assessment",
    r"^Start Treatment",
    r"^Classification of",
    r"^Confirming",
    r"^Certifying",
    r"^Registering",
    r"^Transferring",
    r"^Medical Examiner",
    r"^Hypertensive emergency",
    r"^Hypertensive urgency",
    r"^Malignant hypertension",
    r"^Standard discharge",
    r"^Isolated systolic",
    r"^Body mass index",
    r"^Assess fluid",
    r"^Fluid management",
    r"^Antibiotic",
    r"^Sepsis Six",
    r"^Source control",
    r"^Pharmacological",
    r"^Non-pharmacological",
    r"^Pre-operative",
    r"^Intra-operative",
    r"^Post-operative",
    r"^Type 1 diabetes",
    r"^Type 2 diabetes",
    r"^Initial treatment",
    r"^Ongoing treatment",
    r"^Discharge and Follow",
    r"^Advice and Referrals",
];

/// Minor sub-headings, rendered as `<h4>`. Most are anchored at both ends.
pub const H4_PATTERNS: &[&str] = &[
    r"^Risk factors$",
    r"^Symptoms$",
    r"^Medications$",
    r"^Red flags$",
    r"^Concerning features$",
    r"^General surgery$",
    r"^Gynaecology$",
    r"^Obstetrics$",
    r"^Urology$",
    r"^Medical causes$",
    r"^Vascular$",
    r"^Ruptured abdominal",
    r"^Ectopic pregnancy$",
    r"^Ureteric colic$",
    r"^Very ill$",
    r"^Urgent dialysis$",
    r"^Severe hyponatraemia",
    r"^Moderate hyponatraemia",
    r"^Mild hyponatraemia",
    r"^Acute$",
    r"^Chronic$",
    r"^Stage [123]",
    r"^Grade [1234]",
    r"^First-line",
    r"^Second-line",
    r"^Third-line",
    r"^For health professionals",
    r"^For patients",
    r"^References$",
    r"^Information$",
    r"^Emergency department",
    r"^Investigations$",
    r"^White coat",
];

/// Imperative prefixes that mark a line for emphasis. Case-sensitive.
pub const DIRECTIVE_PATTERN: &str = r"^(Exclude if:|Ask about:|Note:|Consider:|Important:|If not excluded|If suspected|If the patient|Ensure |Avoid |Check |Perform |Request |Advise |Document |Calculate |Aim to|Do not |Seek |Start |Stop |Refer |Recommend )";

/// Classification of a single line of guideline text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    H3,
    H4,
    BoldDirective,
    None,
}

/// Compiled heading and directive matchers.
///
/// Built once and shared read-only between formatters; `Regex` is `Sync`, so a
/// single table can serve every worker thread of a build.
#[derive(Debug, Clone)]
pub struct PatternTable {
    h3: Vec<Regex>,
    h4: Vec<Regex>,
    directive: Regex,
}

impl PatternTable {
    /// Compile a table from raw pattern sources. Heading patterns are matched
    /// case-insensitively, the directive pattern case-sensitively.
    pub fn new(h3: &[&str], h4: &[&str], directive: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            h3: compile_case_insensitive(h3)?,
            h4: compile_case_insensitive(h4)?,
            directive: Regex::new(directive)?,
        })
    }

    /// The table used for clinical guideline documents.
    pub fn clinical() -> Result<Self, regex::Error> {
        Self::new(H3_PATTERNS, H4_PATTERNS, DIRECTIVE_PATTERN)
    }

    /// Classify a trimmed line. H3 is tried before H4, and both before the
    /// directive check, since some lines match more than one tier.
    pub fn classify_line(&self, line: &str) -> LineClass {
        if char_len(line) < HEADING_MAX_LEN {
            if self.is_h3(line) {
                return LineClass::H3;
            }
            if self.is_h4(line) {
                return LineClass::H4;
            }
        }

        if self.is_directive(line) || line.ends_with(':') {
            return LineClass::BoldDirective;
        }

        LineClass::None
    }

    pub fn is_h3(&self, line: &str) -> bool {
        self.h3.iter().any(|re| re.is_match(line))
    }

    pub fn is_h4(&self, line: &str) -> bool {
        self.h4.iter().any(|re| re.is_match(line))
    }

    /// Heading match without the length guard, used when deciding where a
    /// run of list lines stops.
    pub fn matches_heading(&self, line: &str) -> bool {
        self.is_h3(line) || self.is_h4(line)
    }

    /// Directive prefix match only; a trailing colon is not considered.
    pub fn is_directive(&self, line: &str) -> bool {
        self.directive.is_match(line)
    }
}

fn compile_case_insensitive(patterns: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    patterns
        .iter()
        .map(|pattern| RegexBuilder::new(pattern).case_insensitive(true).build())
        .collect()
}

/// Split a numbered step into its number and remaining text.
pub fn parse_numbered(line: &str) -> Option<(&str, &str)> {
    let captures = NUMBERED_REGEX.captures(line)?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

pub fn is_numbered(line: &str) -> bool {
    NUMBERED_REGEX.is_match(line)
}

/// Line length in characters, matching how headings are measured by eye.
pub fn char_len(line: &str) -> usize {
    line.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PatternTable {
        PatternTable::clinical().unwrap()
    }

    #[test]
    fn test_h3_prefix_patterns() {
        let table = table();
        assert_eq!(table.classify_line("About sepsis"), LineClass::H3);
        assert_eq!(table.classify_line("Sepsis Six bundle"), LineClass::H3);
        assert_eq!(table.classify_line("take a history of symptoms"), LineClass::H3);
        // `About\s` needs the trailing whitespace
        assert_eq!(table.classify_line("Aboutness"), LineClass::None);
    }

    #[test]
    fn test_h4_exact_patterns() {
        let table = table();
        assert_eq!(table.classify_line("Risk factors"), LineClass::H4);
        assert_eq!(table.classify_line("RISK FACTORS"), LineClass::H4);
        assert_eq!(table.classify_line("Stage 2 hypertension"), LineClass::H4);
        assert_eq!(table.classify_line("Grade 4"), LineClass::H4);
        assert_eq!(table.classify_line("Grade 5"), LineClass::None);
        // Anchored at the end, so extra text disqualifies it
        assert_eq!(table.classify_line("Risk factors include smoking"), LineClass::None);
    }

    #[test]
    fn test_h3_checked_before_h4() {
        let table = PatternTable::new(&[r"^Shared"], &[r"^Shared"], DIRECTIVE_PATTERN).unwrap();
        assert_eq!(table.classify_line("Shared heading"), LineClass::H3);
    }

    #[test]
    fn test_long_lines_are_not_headings() {
        let table = table();
        let line = format!("About {}", "x".repeat(80));
        assert_eq!(table.classify_line(&line), LineClass::None);
        assert!(table.matches_heading(&line));
    }

    #[test]
    fn test_directives() {
        let table = table();
        assert_eq!(table.classify_line("Exclude if: pregnant"), LineClass::BoldDirective);
        assert_eq!(table.classify_line("Ensure fluids are given"), LineClass::BoldDirective);
        assert_eq!(table.classify_line("Signs of shock:"), LineClass::BoldDirective);
        // Directive prefixes are case-sensitive
        assert_eq!(table.classify_line("ensure fluids are given"), LineClass::None);
        assert!(!table.is_directive("Signs of shock:"));
    }

    #[test]
    fn test_heading_wins_over_trailing_colon() {
        let table = table();
        assert_eq!(table.classify_line("Antibiotic choice:"), LineClass::H3);
    }

    #[test]
    fn test_parse_numbered() {
        assert_eq!(parse_numbered("1. First step"), Some(("1", "First step")));
        assert_eq!(parse_numbered("12.  Twelfth"), Some(("12", "Twelfth")));
        assert_eq!(parse_numbered("1.5 mg/kg"), None);
        assert!(!is_numbered("Step 1. go"));
    }

    #[test]
    fn test_char_len_counts_characters() {
        assert_eq!(char_len("≥ 3"), 3);
        assert_eq!(char_len(""), 0);
    }
}
