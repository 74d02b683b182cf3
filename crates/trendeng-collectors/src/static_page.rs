//! Trend names read from saved storefront trend pages, one file per region.

use std::path::PathBuf;

use async_trait::async_trait;
use regex::Regex;
use trendeng_core::Region;

use crate::{read_lines, CollectError, Collector, Locator, RawRecord};

/// House brands stripped from product descriptions so only the trend
/// description remains.
const HOUSE_BRANDS: &[&str] = &[
    "SHEIN", "DAZY", "EMERY ROSE", "ROMWE", "MOTF", "BIZCHIC", "MUSERA", "Coolane", "Anewsta",
    "Firerie", "Calvaya", "Livesso", "Poéselle", "Ontre", "Maija", "Attitoon", "Mulvari",
    "Sollinarry", "Flirla", "RosyDaze", "COSMINA", "Elenzga", "Breezaya", "INAWLY", "Aveloria",
    "Sweetra", "Siren Gaze", "LUNE", "BAE", "EZwear", "Clasi", "PETITE", "ICON", "MOD",
    "Frenchy", "Unity", "Swim", "Essnce",
];

/// Reads `<dir>/<region>.txt` (lower-case region code) and returns one
/// cleaned trend name per non-blank line.
///
/// `US` pages are rendered client-side and cannot be captured statically,
/// so that region always yields nothing.
pub struct StaticPageCollector {
    dir: PathBuf,
    brand_pattern: Regex,
    whitespace: Regex,
}

impl StaticPageCollector {
    /// # Errors
    ///
    /// Returns [`CollectError::Pattern`] if the cleaning patterns fail to compile.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CollectError> {
        let alternation = HOUSE_BRANDS
            .iter()
            .map(|b| regex::escape(b))
            .collect::<Vec<_>>()
            .join("|");
        // "BRAND x Artist" collaborations go with the brand.
        let brand_pattern = Regex::new(&format!(r"(?i)\b({alternation})(\s*x\s*[A-Za-z]+)?\b"))?;
        let whitespace = Regex::new(r"\s+")?;
        Ok(Self {
            dir: dir.into(),
            brand_pattern,
            whitespace,
        })
    }

    /// Removes house brands, leading dashes and redundant whitespace.
    #[must_use]
    pub fn clean_description(&self, description: &str) -> String {
        let without_brands = self.brand_pattern.replace_all(description, "");
        let trimmed = without_brands
            .trim_start_matches([' ', '-'])
            .trim();
        self.whitespace.replace_all(trimmed, " ").into_owned()
    }

    fn supports(region: Region) -> bool {
        matches!(region, Region::Br | Region::Eu)
    }
}

#[async_trait]
impl Collector for StaticPageCollector {
    fn name(&self) -> &'static str {
        "static_page"
    }

    async fn collect(&self, locator: &Locator) -> Result<Vec<RawRecord>, CollectError> {
        let Locator::Region(region) = locator else {
            return Err(CollectError::UnsupportedLocator {
                collector: self.name(),
                locator: locator.to_string(),
            });
        };

        if !Self::supports(*region) {
            tracing::info!(%region, "static trend page is not available for region");
            return Ok(Vec::new());
        }

        let path = self
            .dir
            .join(format!("{}.txt", region.as_str().to_lowercase()));
        let Some(lines) = read_lines(&path).await? else {
            tracing::warn!(%region, path = %path.display(), "static trend page file not found");
            return Ok(Vec::new());
        };

        let records: Vec<RawRecord> = lines
            .iter()
            .map(|line| self.clean_description(line))
            .filter(|name| !name.is_empty())
            .map(RawRecord::Name)
            .collect();

        tracing::debug!(%region, count = records.len(), "static trend page collected");
        Ok(records)
    }
}
