//! Guideline Builder
//!
//! Builds a single-page clinical guideline app from a folder of Word
//! documents, inferring headings, lists and emphasis from plain section text.

pub mod builder;
pub mod category;
pub mod colors;
pub mod config;
pub mod document;
pub mod docx;
pub mod error;
pub mod formatter;
pub mod lookup;
pub mod patterns;
pub mod segmenter;
pub mod template;

pub use builder::{BuildStats, DocumentFailure, GuidelineBuilder};
pub use category::{CategoryConfig, CategoryResolver, UNCATEGORISED};
pub use colors::{ColorScheme, SectionColorizer};
pub use config::BuildConfig;
pub use document::{FormattedSection, Guideline, GuidelineMetadata, RawSection};
pub use error::BuildError;
pub use formatter::ContentFormatter;
pub use lookup::TieredLookup;
pub use patterns::{LineClass, PatternTable};
pub use segmenter::{HeadingLevel, LineSegmenter, MarkupBlock};
pub use template::PageTemplate;
