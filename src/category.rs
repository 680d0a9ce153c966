//! Category configuration and guideline categorisation.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::lookup::TieredLookup;

/// Category given to guidelines that match nothing in the config.
pub const UNCATEGORISED: &str = "Uncategorised";

/// One category entry from `categories.json`.
///
/// Fields the builder does not interpret (icons, descriptions) are carried
/// through to the page untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    #[serde(default)]
    pub guidelines: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Contents of `categories.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(default)]
    pub categories: IndexMap<String, CategoryInfo>,
    #[serde(default)]
    pub directorate_mapping: IndexMap<String, String>,
    #[serde(default)]
    pub category_order: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CategoryConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read category config: {}", path.display()))?;
        let config = Self::from_json(&content)
            .with_context(|| format!("Failed to parse category config: {}", path.display()))?;
        debug!(
            "Loaded {} categories and {} directorate mappings",
            config.categories.len(),
            config.directorate_mapping.len()
        );
        Ok(config)
    }

    /// Replace every configured category's guideline list with the titles
    /// assigned to it, sorted. Assignments to categories the config does not
    /// define are dropped.
    pub fn assign_guidelines<'a, I>(&mut self, assignments: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut by_category: IndexMap<&str, Vec<String>> = IndexMap::new();
        for (category, title) in assignments {
            by_category
                .entry(category)
                .or_default()
                .push(title.to_string());
        }

        for (name, info) in self.categories.iter_mut() {
            let mut titles = by_category.swap_remove(name.as_str()).unwrap_or_default();
            titles.sort();
            info.guidelines = titles;
        }
    }

    /// Number of categories that hold at least one guideline.
    pub fn populated_count(&self) -> usize {
        self.categories
            .values()
            .filter(|info| !info.guidelines.is_empty())
            .count()
    }
}

/// Assigns a category to each guideline.
///
/// Tried in order: the directorate as an exact mapping key, the title as a
/// member of a category's guideline list, the directorate as a partial
/// mapping key, and finally [`UNCATEGORISED`].
#[derive(Debug, Clone)]
pub struct CategoryResolver {
    directorates: TieredLookup<String>,
    members: Vec<(String, Vec<String>)>,
}

impl CategoryResolver {
    pub fn new(config: &CategoryConfig) -> Self {
        let members = config
            .categories
            .iter()
            .map(|(name, info)| (name.clone(), info.guidelines.clone()))
            .collect();

        Self {
            directorates: TieredLookup::new(
                config.directorate_mapping.clone(),
                UNCATEGORISED.to_string(),
            ),
            members,
        }
    }

    pub fn resolve(&self, title: &str, directorate: &str) -> String {
        if !directorate.is_empty() {
            if let Some(category) = self.directorates.exact(directorate) {
                return category.clone();
            }
        }

        if let Some((category, _)) = self
            .members
            .iter()
            .find(|(_, titles)| titles.iter().any(|t| t == title))
        {
            return category.clone();
        }

        self.directorates
            .partial(directorate)
            .unwrap_or_else(|| self.directorates.default_value())
            .clone()
    }
}
