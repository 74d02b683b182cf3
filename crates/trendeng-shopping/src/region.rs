use trendeng_core::Region;

/// Localisation parameters passed to Google-Shopping-backed providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionParams {
    /// Country (`gl`).
    pub gl: &'static str,
    /// Interface language (`hl`).
    pub hl: &'static str,
    pub google_domain: &'static str,
}

#[must_use]
pub fn region_params(region: Region) -> RegionParams {
    match region {
        Region::Br => RegionParams {
            gl: "br",
            hl: "pt",
            google_domain: "google.com.br",
        },
        Region::Us => RegionParams {
            gl: "us",
            hl: "en",
            google_domain: "google.com",
        },
        // The EU market is served from the German storefront.
        Region::Eu => RegionParams {
            gl: "de",
            hl: "de",
            google_domain: "google.de",
        },
    }
}
