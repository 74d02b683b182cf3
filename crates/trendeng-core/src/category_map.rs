//! Translation from source category vocabularies to canonical category slugs.

use std::collections::HashMap;

/// Version label of the built-in mapping table.
pub const BUILTIN_VERSION: &str = "builtin-1";

const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    ("GENERAL", "acessorios"),
    ("APPAREL_ACCESSORIES", "acessorios"),
    ("BEAUTY_PERSONAL_CARE", "beleza"),
    ("FASHION", "acessorios"),
    // Canonical slugs map onto themselves so already-translated labels pass.
    ("READY_TO_WEAR", "ready-to-wear"),
    ("ACESSORIOS", "acessorios"),
    ("BELEZA", "beleza"),
    ("VESTIDOS", "vestidos"),
    ("CAMISAS_E_BLUSAS", "camisas-e-blusas"),
    ("CALCAS_E_SHORTS", "calcas-e-shorts"),
];

/// Versioned lookup table from source category labels to canonical slugs.
///
/// Keys are normalized on construction (see [`CategoryMap::normalize_label`]),
/// so lookups are case-insensitive and treat `-` and `_` alike. The map is
/// constructed once and passed to whoever needs it; there is no process-wide
/// instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    version: String,
    entries: HashMap<String, String>,
}

impl CategoryMap {
    /// Builds a map from `(source_label, canonical_slug)` pairs.
    pub fn new<I, K, V>(version: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (Self::normalize_label(k.as_ref()), v.into()))
            .collect();
        Self {
            version: version.into(),
            entries,
        }
    }

    /// Upper-cases the label and folds hyphens to underscores.
    #[must_use]
    pub fn normalize_label(label: &str) -> String {
        label.to_uppercase().replace('-', "_")
    }

    /// Returns the canonical slug for `source_label`, or `None` when the
    /// label is empty or unmapped. Callers treat `None` as a hard skip.
    #[must_use]
    pub fn translate(&self, source_label: &str) -> Option<&str> {
        if source_label.is_empty() {
            return None;
        }
        self.entries
            .get(&Self::normalize_label(source_label))
            .map(String::as_str)
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self::new(BUILTIN_VERSION, BUILTIN_ENTRIES.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_labels() {
        let map = CategoryMap::default();
        assert_eq!(map.translate("APPAREL_ACCESSORIES"), Some("acessorios"));
        assert_eq!(map.translate("BEAUTY_PERSONAL_CARE"), Some("beleza"));
        assert_eq!(map.translate("READY_TO_WEAR"), Some("ready-to-wear"));
    }

    #[test]
    fn lookup_ignores_case_and_hyphens() {
        let map = CategoryMap::default();
        assert_eq!(map.translate("ready-to-wear"), Some("ready-to-wear"));
        assert_eq!(map.translate("general"), Some("acessorios"));
        assert_eq!(map.translate("Apparel-Accessories"), Some("acessorios"));
        assert_eq!(map.translate("beleza"), Some("beleza"));
    }

    #[test]
    fn every_builtin_label_is_deterministic_in_any_casing() {
        let map = CategoryMap::default();
        for (label, slug) in BUILTIN_ENTRIES {
            let variants = [
                (*label).to_string(),
                label.to_lowercase(),
                label.replace('_', "-"),
                label.to_lowercase().replace('_', "-"),
            ];
            for v in variants {
                assert_eq!(map.translate(&v), Some(*slug), "label variant {v}");
            }
        }
    }

    #[test]
    fn unmapped_and_empty_labels_return_none() {
        let map = CategoryMap::default();
        assert_eq!(map.translate("UNKNOWN_LABEL"), None);
        assert_eq!(map.translate(""), None);
        assert_eq!(map.translate("   "), None);
    }

    #[test]
    fn surrounding_whitespace_is_not_stripped() {
        let map = CategoryMap::default();
        assert_eq!(map.translate(" APPAREL_ACCESSORIES"), None);
        assert_eq!(map.translate("BELEZA\n"), None);
        assert_eq!(CategoryMap::normalize_label(" a-b "), " A_B ");
    }

    #[test]
    fn injected_map_overrides_builtin() {
        let map = CategoryMap::new("v2", [("street-wear", "ready-to-wear")]);
        assert_eq!(map.version(), "v2");
        assert_eq!(map.len(), 1);
        assert_eq!(map.translate("STREET_WEAR"), Some("ready-to-wear"));
        assert_eq!(map.translate("GENERAL"), None);
    }
}
