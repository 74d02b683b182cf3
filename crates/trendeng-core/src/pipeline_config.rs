use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::category_map::CategoryMap;
use crate::{ConfigError, Region};

/// Known brand names matched against product titles when the pipeline file
/// does not provide its own list.
pub const DEFAULT_KNOWN_BRANDS: &[&str] = &[
    "Nike", "Adidas", "Shein", "Renner", "C&A", "Zara", "Hering", "Moleca", "Vizzano", "Dakota",
    "Colcci", "Farm", "Schutz", "Arezzo", "Melissa",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectorKind {
    /// Rising related queries from a search-trend API. Locator: region.
    SearchTrends,
    /// Saved trend page, one file per region. Locator: region.
    StaticPage,
    /// Hashtag list, one file per category label. Locator: category.
    HashtagList,
}

impl std::fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorKind::SearchTrends => write!(f, "search_trends"),
            CollectorKind::StaticPage => write!(f, "static_page"),
            CollectorKind::HashtagList => write!(f, "hashtag_list"),
        }
    }
}

/// One configured collection tuple: which collector to run, with which
/// locator, and how to label what it returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub kind: CollectorKind,
    /// Source label stamped on every candidate (e.g. `TikTok`).
    pub source: String,
    /// Source-vocabulary category label, translated later by the processor.
    pub category: String,
    /// Region the tuple belongs to. `None` follows the run region for
    /// region-located collectors and defaults to `BR` for hashtag lists.
    #[serde(default)]
    pub region: Option<Region>,
    /// Category locator for hashtag lists.
    #[serde(default)]
    pub category_label: Option<String>,
    /// Directory holding the files read by file-backed collectors.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Endpoint override for API-backed collectors.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl SourceConfig {
    /// Region this tuple collects for during a run scoped to `run_region`.
    #[must_use]
    pub fn effective_region(&self, run_region: Region) -> Region {
        match (self.region, self.kind) {
            (Some(region), _) => region,
            (None, CollectorKind::HashtagList) => Region::Br,
            (None, _) => run_region,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapConfig {
    pub version: String,
    pub entries: BTreeMap<String, String>,
}

/// A node of the static category tree seeded into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub children: Vec<CategoryConfig>,
}

impl CategoryConfig {
    /// Explicit slug if configured, otherwise one derived from the name.
    ///
    /// Derivation folds Latin accents to ASCII, lower-cases, and joins the
    /// remaining alphanumeric runs with `-` (`"CALÇAS E SHORTS"` becomes
    /// `calcas-e-shorts`).
    #[must_use]
    pub fn slug(&self) -> String {
        match &self.slug {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_string(),
            _ => slugify(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQueryConfig {
    pub query: String,
    pub category: String,
    pub region: Region,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

fn default_known_brands() -> Vec<String> {
    DEFAULT_KNOWN_BRANDS.iter().map(|b| (*b).to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub category_map: Option<CategoryMapConfig>,
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    #[serde(default = "default_known_brands")]
    pub known_brands: Vec<String>,
    #[serde(default)]
    pub search_queries: Vec<SearchQueryConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            category_map: None,
            categories: Vec::new(),
            known_brands: default_known_brands(),
            search_queries: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Builds the category translator table; the built-in table is used
    /// when the file has no `category_map` section.
    #[must_use]
    pub fn category_map(&self) -> CategoryMap {
        match &self.category_map {
            Some(cfg) => CategoryMap::new(cfg.version.clone(), cfg.entries.clone()),
            None => CategoryMap::default(),
        }
    }
}

/// Load and validate the pipeline configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PipelineFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let config: PipelineConfig =
        serde_yaml::from_str(&content).map_err(ConfigError::PipelineFileParse)?;

    validate_pipeline(&config)?;

    Ok(config)
}

fn validate_pipeline(config: &PipelineConfig) -> Result<(), ConfigError> {
    for source in &config.sources {
        validate_source(source)?;
    }

    if let Some(map) = &config.category_map {
        if map.version.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category_map.version must be non-empty".to_string(),
            ));
        }
        if let Some((label, _)) = map
            .entries
            .iter()
            .find(|(k, v)| k.trim().is_empty() || v.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "category_map entry '{label}' has an empty label or slug"
            )));
        }
    }

    let mut seen_slugs = HashSet::new();
    for parent in &config.categories {
        validate_category(parent, &mut seen_slugs)?;
        for child in &parent.children {
            if !child.children.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "category '{}' is nested more than one level deep",
                    child.name
                )));
            }
            validate_category(child, &mut seen_slugs)?;
        }
    }

    if config.known_brands.iter().any(|b| b.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "known_brands entries must be non-empty".to_string(),
        ));
    }

    let mut seen_queries = HashSet::new();
    for query in &config.search_queries {
        if query.query.trim().is_empty() {
            return Err(ConfigError::Validation(
                "search query text must be non-empty".to_string(),
            ));
        }
        if !seen_queries.insert((query.query.to_lowercase(), query.region)) {
            return Err(ConfigError::Validation(format!(
                "duplicate search query '{}' for region {}",
                query.query, query.region
            )));
        }
    }

    Ok(())
}

fn validate_source(source: &SourceConfig) -> Result<(), ConfigError> {
    if source.source.trim().is_empty() {
        return Err(ConfigError::Validation(
            "source label must be non-empty".to_string(),
        ));
    }
    if source.category.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "source '{}' has an empty category label",
            source.source
        )));
    }

    match source.kind {
        CollectorKind::SearchTrends => {}
        CollectorKind::StaticPage => {
            if source.path.is_none() {
                return Err(ConfigError::Validation(format!(
                    "static_page source '{}' requires a path",
                    source.source
                )));
            }
        }
        CollectorKind::HashtagList => {
            if source.path.is_none() {
                return Err(ConfigError::Validation(format!(
                    "hashtag_list source '{}' requires a path",
                    source.source
                )));
            }
            if source
                .category_label
                .as_deref()
                .is_none_or(|l| l.trim().is_empty())
            {
                return Err(ConfigError::Validation(format!(
                    "hashtag_list source '{}' requires a category_label",
                    source.source
                )));
            }
        }
    }

    Ok(())
}

fn validate_category(
    category: &CategoryConfig,
    seen_slugs: &mut HashSet<String>,
) -> Result<(), ConfigError> {
    if category.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "category name must be non-empty".to_string(),
        ));
    }
    let slug = category.slug();
    if slug.is_empty() {
        return Err(ConfigError::Validation(format!(
            "category '{}' produces an empty slug",
            category.name
        )));
    }
    if !seen_slugs.insert(slug.clone()) {
        return Err(ConfigError::Validation(format!(
            "duplicate category slug: '{}' (from category '{}')",
            slug, category.name
        )));
    }
    Ok(())
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        other => other,
    }
}

fn slugify(name: &str) -> String {
    name.chars()
        .map(fold_accent)
        .map(|c| c.to_ascii_lowercase())
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
#[path = "pipeline_config_test.rs"]
mod tests;
