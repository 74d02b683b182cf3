use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Market a trend or tracked search query belongs to.
///
/// Stored as the upper-case code (`BR`, `US`, `EU`). Parsing is
/// case-insensitive and ignores surrounding whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Br,
    Us,
    Eu,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Br, Region::Us, Region::Eu];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Br => "BR",
            Region::Us => "US",
            Region::Eu => "EU",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BR" => Ok(Region::Br),
            "US" => Ok(Region::Us),
            "EU" => Ok(Region::Eu),
            _ => Err(CoreError::UnsupportedRegion(s.to_owned())),
        }
    }
}
