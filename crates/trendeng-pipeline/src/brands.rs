//! Brand attribution for enriched products.

use trendeng_core::PipelineConfig;

/// Maps a product title to a brand name, if one can be recognised.
pub trait BrandResolver: Send + Sync {
    fn resolve(&self, title: &str) -> Option<&str>;
}

/// Case-insensitive substring match against a fixed brand list. The first
/// listed brand contained in the title wins.
#[derive(Debug, Clone)]
pub struct KnownBrandResolver {
    /// `(display name, lower-cased name)`
    brands: Vec<(String, String)>,
}

impl KnownBrandResolver {
    pub fn new<I, S>(brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let brands = brands
            .into_iter()
            .map(Into::into)
            .filter(|b: &String| !b.trim().is_empty())
            .map(|b| {
                let lower = b.to_lowercase();
                (b, lower)
            })
            .collect();
        Self { brands }
    }

    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.known_brands.iter().cloned())
    }
}

impl BrandResolver for KnownBrandResolver {
    fn resolve(&self, title: &str) -> Option<&str> {
        let title = title.to_lowercase();
        self.brands
            .iter()
            .find(|(_, lower)| title.contains(lower.as_str()))
            .map(|(name, _)| name.as_str())
    }
}
