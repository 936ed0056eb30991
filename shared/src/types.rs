//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Supported languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "vi")]
    Vietnamese,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Vietnamese => "vi",
            Language::English => "en",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vi" => Ok(Language::Vietnamese),
            "en" => Ok(Language::English),
            other => Err(format!("unknown language code: {}", other)),
        }
    }
}

/// Sort orders accepted by the cage list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CageSortKey {
    /// Sort by cage identifier, ascending
    #[default]
    Id,
    /// Highest growth progress first
    ProgressDesc,
    /// Lowest growth progress first
    ProgressAsc,
    /// Longest farming time first
    DaysDesc,
    /// Shortest farming time first
    DaysAsc,
}
