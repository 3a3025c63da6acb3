//! Client platform tag attached to each session

use serde::{Deserialize, Serialize};

/// Platform a session was opened from
///
/// Closed variant set; tags that arrive from older clients or older database
/// rows go through [`Platform::parse_tag`] rather than raw string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Web,
    Ios,
    Android,
    Unknown,
}

impl Default for Platform {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Platform {
    /// Canonical database tag
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Unknown => "unknown",
        }
    }

    /// Map a stored or client-supplied tag to a variant
    ///
    /// Accepts the legacy spellings used by earlier schema revisions
    /// ("IOS", "iPhone", "mobile_ios", ...). Anything unrecognized becomes
    /// `Unknown` instead of failing the row.
    #[must_use]
    pub fn parse_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "web" | "browser" => Self::Web,
            "ios" | "iphone" | "mobile_ios" => Self::Ios,
            "android" | "mobile_android" => Self::Android,
            _ => Self::Unknown,
        }
    }

    /// Whether this tag participates in the per-platform breakdown
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_tag(s))
    }
}
