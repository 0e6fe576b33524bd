//! Amazon storefronts and their locale conventions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An Amazon storefront, identified by its domain suffix (`com`, `it`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marketplace {
    #[default]
    #[serde(rename = "com")]
    UnitedStates,
    #[serde(rename = "ca")]
    Canada,
    #[serde(rename = "co.uk")]
    UnitedKingdom,
    #[serde(rename = "it")]
    Italy,
    #[serde(rename = "de")]
    Germany,
    #[serde(rename = "fr")]
    France,
    #[serde(rename = "es")]
    Spain,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown marketplace '{0}' (expected one of: com, ca, co.uk, it, de, fr, es)")]
pub struct UnknownMarketplace(pub String);

impl Marketplace {
    pub const ALL: [Self; 7] = [
        Self::UnitedStates,
        Self::Canada,
        Self::UnitedKingdom,
        Self::Italy,
        Self::Germany,
        Self::France,
        Self::Spain,
    ];

    /// Domain suffix after `amazon.`
    pub const fn domain(self) -> &'static str {
        match self {
            Self::UnitedStates => "com",
            Self::Canada => "ca",
            Self::UnitedKingdom => "co.uk",
            Self::Italy => "it",
            Self::Germany => "de",
            Self::France => "fr",
            Self::Spain => "es",
        }
    }

    /// Human readable storefront name
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::UnitedStates => "United States",
            Self::Canada => "Canada",
            Self::UnitedKingdom => "United Kingdom",
            Self::Italy => "Italy",
            Self::Germany => "Germany",
            Self::France => "France",
            Self::Spain => "Spain",
        }
    }

    pub fn host(self) -> String {
        format!("www.amazon.{}", self.domain())
    }

    /// Storefront root, e.g. `https://www.amazon.com`
    pub fn base_url(self) -> String {
        format!("https://{}", self.host())
    }

    /// Canonical product link for an ASIN on this storefront.
    pub fn product_link(self, asin: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url(),
            crate::domain::constants::PRODUCT_PATH_PREFIX,
            asin
        )
    }

    /// Character separating the integer part from the fraction in prices and ratings.
    pub const fn decimal_separator(self) -> char {
        match self {
            Self::UnitedStates | Self::Canada | Self::UnitedKingdom => '.',
            Self::Italy | Self::Germany | Self::France | Self::Spain => ',',
        }
    }

    /// Thousands separator. French storefronts group with a (narrow) space.
    pub const fn grouping_separator(self) -> char {
        match self {
            Self::UnitedStates | Self::Canada | Self::UnitedKingdom => ',',
            Self::Italy | Self::Germany | Self::Spain => '.',
            Self::France => ' ',
        }
    }

    pub const fn currency_symbol(self) -> &'static str {
        match self {
            Self::UnitedStates | Self::Canada => "$",
            Self::UnitedKingdom => "£",
            Self::Italy | Self::Germany | Self::France | Self::Spain => "€",
        }
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.domain())
    }
}

impl FromStr for Marketplace {
    type Err = UnknownMarketplace;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches("amazon.").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.domain() == normalized)
            .ok_or_else(|| UnknownMarketplace(s.to_string()))
    }
}
