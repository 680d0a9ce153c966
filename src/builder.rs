use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::category::{CategoryConfig, CategoryResolver};
use crate::colors::SectionColorizer;
use crate::config::{resolve_path, BuildConfig};
use crate::docx;
use crate::document::{guideline_title, ExtractedDocument, FormattedSection, Guideline};
use crate::error::BuildError;
use crate::formatter::ContentFormatter;
use crate::patterns::PatternTable;
use crate::template::PageTemplate;

/// A document that was left out of the build.
#[derive(Debug, Clone)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct BuildStats {
    pub documents_found: usize,
    pub guidelines_processed: usize,
    pub categories_populated: usize,
    pub build_time: Duration,
    pub output_path: PathBuf,
    pub copied_assets: Vec<String>,
    pub failures: Vec<DocumentFailure>,
    /// Guideline titles per category, in configured category order
    pub summary: Vec<(String, Vec<String>)>,
}

pub struct GuidelineBuilder {
    config: BuildConfig,
    project_dir: PathBuf,
    formatter: ContentFormatter,
    colorizer: SectionColorizer,
    categories: CategoryConfig,
    resolver: CategoryResolver,
    template: PageTemplate,
    parallel_jobs: usize,
}

impl GuidelineBuilder {
    /// Load the category config and template. Either one missing is fatal.
    pub fn new(config: BuildConfig, project_dir: PathBuf) -> Result<Self> {
        let categories = CategoryConfig::load(&resolve_path(&project_dir, &config.categories))?;
        let template = PageTemplate::load(&resolve_path(&project_dir, &config.template))?;

        let patterns = PatternTable::clinical().context("Failed to compile heading patterns")?;
        let formatter = ContentFormatter::new(patterns).with_html_escaping(config.escape_html);
        let resolver = CategoryResolver::new(&categories);
        let parallel_jobs = config.jobs();

        Ok(Self {
            config,
            project_dir,
            formatter,
            colorizer: SectionColorizer::clinical(),
            categories,
            resolver,
            template,
            parallel_jobs,
        })
    }

    fn guidelines_dir(&self) -> PathBuf {
        resolve_path(&self.project_dir, &self.config.guidelines_dir)
    }

    fn output_dir(&self) -> PathBuf {
        resolve_path(&self.project_dir, &self.config.output_dir)
    }

    pub fn build(&self) -> Result<BuildStats> {
        let start_time = Instant::now();
        info!("Starting guideline build...");

        let documents = self.discover_documents()?;
        if documents.is_empty() {
            error!("No Word documents found in {}", self.guidelines_dir().display());
            return Err(BuildError::NoDocuments(self.guidelines_dir()).into());
        }
        info!("Found {} Word documents", documents.len());
        for path in &documents {
            debug!("  - {}", display_name(path));
        }

        let (mut guidelines, failures) = self.process_documents(&documents)?;
        if guidelines.is_empty() {
            error!("No guidelines were processed successfully");
            return Err(BuildError::NoGuidelinesProcessed {
                attempted: documents.len(),
            }
            .into());
        }

        // Stable sort keeps discovery order among equal titles
        guidelines.sort_by(|a, b| a.title.cmp(&b.title));
        let index = guideline_index(&guidelines);

        let mut categories = self.categories.clone();
        categories.assign_guidelines(
            guidelines
                .iter()
                .map(|g| (g.category.as_str(), g.title.as_str())),
        );

        let page = self.template.render(&guidelines, &categories, &index)?;

        let output_dir = self.output_dir();
        std::fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;
        let output_path = output_dir.join(&self.config.output_file);
        std::fs::write(&output_path, page)
            .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

        let copied_assets = self.copy_static_assets(&output_dir)?;

        let summary = category_summary(&categories);
        let stats = BuildStats {
            documents_found: documents.len(),
            guidelines_processed: guidelines.len(),
            categories_populated: categories.populated_count(),
            build_time: start_time.elapsed(),
            output_path,
            copied_assets,
            failures,
            summary,
        };

        info!("Build completed in {:?}", stats.build_time);
        Ok(stats)
    }

    /// `.docx` files directly inside the guidelines directory, sorted. Word
    /// lock files (`~$name.docx`) are ignored.
    pub fn discover_documents(&self) -> Result<Vec<PathBuf>> {
        let dir = self.guidelines_dir();
        let pattern = format!(
            "{}/*.docx",
            glob::Pattern::escape(&dir.to_string_lossy())
        );

        let mut files = Vec::new();
        for entry in glob::glob(&pattern).with_context(|| format!("Invalid pattern: {}", pattern))? {
            match entry {
                Ok(path) => {
                    if display_name(&path).starts_with("~$") {
                        debug!("Skipping lock file: {}", path.display());
                        continue;
                    }
                    if path.is_file() {
                        files.push(path);
                    }
                }
                Err(e) => warn!("Unreadable path during discovery: {}", e),
            }
        }

        files.sort();
        Ok(files)
    }

    /// Extract and format every document on the worker pool. A failing
    /// document is logged and reported, never fatal.
    fn process_documents(
        &self,
        files: &[PathBuf],
    ) -> Result<(Vec<Guideline>, Vec<DocumentFailure>)> {
        info!(
            "Processing {} documents with {} parallel jobs",
            files.len(),
            self.parallel_jobs
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.parallel_jobs)
            .build()?;

        let results: Vec<(&PathBuf, Result<Guideline>)> = pool.install(|| {
            files
                .par_iter()
                .map(|path| (path, self.process_document(path)))
                .collect()
        });

        let mut guidelines = Vec::new();
        let mut failures = Vec::new();
        for (path, result) in results {
            match result {
                Ok(guideline) => {
                    info!(
                        "Extracted {} as '{}' ({}, {} sections)",
                        display_name(path),
                        guideline.title,
                        guideline.category,
                        guideline.sections.len()
                    );
                    guidelines.push(guideline);
                }
                Err(e) => {
                    error!("Failed to process {}: {:#}", path.display(), e);
                    failures.push(DocumentFailure {
                        path: path.clone(),
                        reason: format!("{:#}", e),
                    });
                }
            }
        }

        Ok((guidelines, failures))
    }

    pub fn process_document(&self, path: &Path) -> Result<Guideline> {
        let filename = display_name(path);
        debug!("Processing document: {}", filename);

        let tables = docx::read_tables(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        let extracted = ExtractedDocument::from_tables(&tables)
            .with_context(|| format!("Unexpected document structure: {}", filename))?;

        Ok(self.assemble_guideline(&filename, extracted))
    }

    /// Title, category and formatted sections for an extracted document.
    pub fn assemble_guideline(&self, filename: &str, extracted: ExtractedDocument) -> Guideline {
        let metadata = extracted.metadata;
        let title = guideline_title(filename, metadata.title.as_deref());
        let category = self.resolver.resolve(&title, &metadata.directorate);

        let sections = extracted
            .sections
            .iter()
            .map(|section| FormattedSection {
                header: section.header.clone(),
                content: self.formatter.format_html(&section.content),
                colors: self.colorizer.color_for(&section.header),
            })
            .collect();

        Guideline {
            title,
            filename: filename.to_string(),
            category,
            directorate: metadata.directorate,
            author: metadata.author,
            date_ratification: metadata.date_ratification,
            date_review: metadata.date_review,
            sections,
        }
    }

    /// Copy the configured static files next to the page. Files that do not
    /// exist in the project directory are skipped.
    fn copy_static_assets(&self, output_dir: &Path) -> Result<Vec<String>> {
        let mut copied = Vec::new();

        for name in &self.config.static_files {
            let src = self.project_dir.join(name);
            if !src.is_file() {
                debug!("Static asset not present, skipping: {}", name);
                continue;
            }
            let dest = output_dir.join(name);
            std::fs::copy(&src, &dest).with_context(|| {
                format!(
                    "Failed to copy static asset {} to {}",
                    src.display(),
                    dest.display()
                )
            })?;
            info!("Copied {}", name);
            copied.push(name.clone());
        }

        Ok(copied)
    }
}

/// Title to position in the sorted guideline list. A repeated title maps to
/// its last occurrence.
pub fn guideline_index(guidelines: &[Guideline]) -> BTreeMap<String, usize> {
    guidelines
        .iter()
        .enumerate()
        .map(|(position, g)| (g.title.clone(), position))
        .collect()
}

fn category_summary(categories: &CategoryConfig) -> Vec<(String, Vec<String>)> {
    categories
        .category_order
        .iter()
        .filter_map(|name| {
            let info = categories.categories.get(name)?;
            if info.guidelines.is_empty() {
                None
            } else {
                Some((name.clone(), info.guidelines.clone()))
            }
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{GuidelineMetadata, RawSection};
    use std::fs;
    use tempfile::TempDir;

    const CATEGORIES: &str = r#"{
        "categories": {"Surgery": {"guidelines": []}, "Medicine": {"guidelines": []}},
        "directorate_mapping": {"Surgical Services": "Surgery"},
        "category_order": ["Medicine", "Surgery"]
    }"#;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("categories.json"), CATEGORIES).unwrap();
        fs::write(dir.path().join("template.html"), "const guidelineIndex = {};").unwrap();
        dir
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("categories.json"), CATEGORIES).unwrap();
        let result = GuidelineBuilder::new(BuildConfig::default(), dir.path().to_path_buf());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_category_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("template.html"), "").unwrap();
        let result = GuidelineBuilder::new(BuildConfig::default(), dir.path().to_path_buf());
        assert!(result.is_err());
    }

    #[test]
    fn test_no_documents_fails() {
        let dir = project();
        fs::create_dir(dir.path().join("guidelines")).unwrap();
        let builder = GuidelineBuilder::new(BuildConfig::default(), dir.path().to_path_buf()).unwrap();

        let err = builder.build().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::NoDocuments(_))
        ));
    }

    #[test]
    fn test_discovery_skips_lock_files_and_other_extensions() {
        let dir = project();
        let guidelines = dir.path().join("guidelines");
        fs::create_dir(&guidelines).unwrap();
        fs::write(guidelines.join("b.docx"), "").unwrap();
        fs::write(guidelines.join("a.docx"), "").unwrap();
        fs::write(guidelines.join("~$a.docx"), "").unwrap();
        fs::write(guidelines.join("notes.txt"), "").unwrap();

        let builder = GuidelineBuilder::new(BuildConfig::default(), dir.path().to_path_buf()).unwrap();
        let files = builder.discover_documents().unwrap();
        let names: Vec<String> = files.iter().map(|p| display_name(p)).collect();
        assert_eq!(names, vec!["a.docx", "b.docx"]);
    }

    #[test]
    fn test_assemble_guideline() {
        let dir = project();
        let builder = GuidelineBuilder::new(BuildConfig::default(), dir.path().to_path_buf()).unwrap();
        let extracted = ExtractedDocument {
            metadata: GuidelineMetadata {
                directorate: "Surgical Services".to_string(),
                author: "Dr B".to_string(),
                ..Default::default()
            },
            sections: vec![RawSection {
                header: "Red Flags".to_string(),
                content: "Peritonism".to_string(),
            }],
        };

        let guideline = builder.assemble_guideline("Acute Abdomen Draft.docx", extracted);
        assert_eq!(guideline.title, "Acute Abdomen");
        assert_eq!(guideline.category, "Surgery");
        assert_eq!(guideline.author, "Dr B");
        assert_eq!(guideline.sections[0].content, "<p>Peritonism</p>");
        assert_eq!(guideline.sections[0].colors.emoji, "🚨");
    }

    #[test]
    fn test_guideline_index_last_duplicate_wins() {
        let dir = project();
        let builder = GuidelineBuilder::new(BuildConfig::default(), dir.path().to_path_buf()).unwrap();
        let make = |name: &str| {
            builder.assemble_guideline(
                name,
                ExtractedDocument {
                    metadata: GuidelineMetadata::default(),
                    sections: Vec::new(),
                },
            )
        };
        let guidelines = vec![make("AKI.docx"), make("Sepsis.docx"), make("Sepsis Draft.docx")];

        let index = guideline_index(&guidelines);
        assert_eq!(index.len(), 2);
        assert_eq!(index["AKI"], 0);
        assert_eq!(index["Sepsis"], 2);
    }
}
