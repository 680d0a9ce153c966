//! Build configuration.
//!
//! All paths are relative to the project directory unless absolute. Values
//! come from `BuildConfig::default()`, optionally overlaid by a YAML file, and
//! finally by command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding the `.docx` guideline documents
    pub guidelines_dir: PathBuf,
    /// Page template with the data placeholders
    pub template: PathBuf,
    /// Category definitions and directorate mapping
    pub categories: PathBuf,
    /// Where `index.html` and the static assets are written
    pub output_dir: PathBuf,
    /// Name of the generated page inside `output_dir`
    pub output_file: String,
    /// Files copied verbatim from the project directory when present
    pub static_files: Vec<String>,
    /// Worker threads for document processing; defaults to the CPU count
    pub parallel_jobs: Option<usize>,
    /// Escape markup-significant characters in document text
    pub escape_html: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            guidelines_dir: PathBuf::from("guidelines"),
            template: PathBuf::from("template.html"),
            categories: PathBuf::from("categories.json"),
            output_dir: PathBuf::from("dist"),
            output_file: "index.html".to_string(),
            static_files: vec![
                "manifest.json".to_string(),
                "sw.js".to_string(),
                "icon-192x192.png".to_string(),
                "icon-512x512.png".to_string(),
                "favicon.png".to_string(),
            ],
            parallel_jobs: None,
            escape_html: false,
        }
    }
}

impl BuildConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Number of worker threads to use.
    pub fn jobs(&self) -> usize {
        self.parallel_jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

/// Resolve a configured path against the project directory.
pub fn resolve_path(project_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = BuildConfig::default();
        assert_eq!(config.guidelines_dir, PathBuf::from("guidelines"));
        assert_eq!(config.output_file, "index.html");
        assert_eq!(config.static_files.len(), 5);
        assert!(!config.escape_html);
        assert!(config.jobs() >= 1);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "output_dir: public\nparallel_jobs: 2\nescape_html: true").unwrap();

        let config = BuildConfig::from_file(file.path()).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert_eq!(config.jobs(), 2);
        assert!(config.escape_html);
        assert_eq!(config.template, PathBuf::from("template.html"));
    }

    #[test]
    fn test_resolve_path() {
        let project = Path::new("/srv/guidelines");
        assert_eq!(
            resolve_path(project, Path::new("dist")),
            PathBuf::from("/srv/guidelines/dist")
        );
        assert_eq!(resolve_path(project, Path::new("/tmp/out")), PathBuf::from("/tmp/out"));
    }
}
