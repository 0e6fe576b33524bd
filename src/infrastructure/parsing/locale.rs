//! Storefront-specific label parsing
//!
//! Rating labels and review counts are written in the storefront's language
//! with its own decimal and grouping separators. Each function dispatches on
//! the [`Marketplace`] instead of guessing from the text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::Marketplace;

const NUMBER: &str = r"\d+(?:[.,]\d+)?";

fn rating_regex(connector: &str, stars: &str) -> Regex {
    let pattern = format!(r"(?i)^\s*(?P<value>{NUMBER})\s+{connector}\s+(?P<max>{NUMBER})\s+{stars}\s*$");
    Regex::new(&pattern).expect("rating label pattern is a valid regex")
}

static ENGLISH_RATING: Lazy<Regex> = Lazy::new(|| rating_regex("out of", "stars"));
static ITALIAN_RATING: Lazy<Regex> = Lazy::new(|| rating_regex("su", "stelle"));
static GERMAN_RATING: Lazy<Regex> = Lazy::new(|| rating_regex("von", "Sternen"));
static FRENCH_RATING: Lazy<Regex> = Lazy::new(|| rating_regex("sur", "étoiles"));
static SPANISH_RATING: Lazy<Regex> = Lazy::new(|| rating_regex("de", "estrellas"));

/// "X out of Y stars" in the storefront's language
pub fn rating_pattern(marketplace: Marketplace) -> &'static Regex {
    match marketplace {
        Marketplace::UnitedStates | Marketplace::Canada | Marketplace::UnitedKingdom => {
            &ENGLISH_RATING
        }
        Marketplace::Italy => &ITALIAN_RATING,
        Marketplace::Germany => &GERMAN_RATING,
        Marketplace::France => &FRENCH_RATING,
        Marketplace::Spain => &SPANISH_RATING,
    }
}

/// Whether `label` has the shape of a rating label on this storefront
pub fn is_rating_label(marketplace: Marketplace, label: &str) -> bool {
    rating_pattern(marketplace).is_match(label)
}

fn parse_decimal(marketplace: Marketplace, token: &str) -> Option<f64> {
    let canonical = token.replace(marketplace.decimal_separator(), ".");
    canonical.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Rating value of a label such as `4.5 out of 5 stars` or `4,5 su 5 stelle`.
///
/// Returns `None` when the label does not match the storefront's pattern or
/// the value falls outside `[0, 5]` or above the stated maximum.
pub fn parse_rating_label(marketplace: Marketplace, label: &str) -> Option<f64> {
    let captures = rating_pattern(marketplace).captures(label)?;
    let value = parse_decimal(marketplace, &captures["value"])?;
    let max = parse_decimal(marketplace, &captures["max"])?;

    (0.0..=5.0).contains(&value).then_some(value).filter(|v| *v <= max)
}

/// Review count from anchor text such as `(1,234)` or `(1.234)`.
///
/// Parentheses, whitespace (including non-breaking spaces) and the storefront's
/// grouping separator are stripped before parsing.
pub fn parse_review_count(marketplace: Marketplace, text: &str) -> Option<u64> {
    let grouping = marketplace.grouping_separator();
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')' && *c != grouping)
        .collect();

    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok()
}
