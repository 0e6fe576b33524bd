//! Result presentation
//!
//! Price normalization and filtering, histogram binning and the terminal
//! rendering of result tables. Everything here is pure; the binary decides
//! where the output goes.

use std::fmt::Write as _;

use serde::Serialize;

use crate::domain::{Marketplace, Record};

/// Shown instead of an empty table
pub const NO_RESULTS_MESSAGE: &str =
    "No results found, or an error occurred while fetching the data.";

/// Link column label
pub const LINK_LABEL: &str = "Open";

/// Widest histogram bar, in characters
const HISTOGRAM_WIDTH: usize = 40;

/// Longest description shown in the table before truncation
const DESCRIPTION_WIDTH: usize = 60;

/// Numeric value of a displayed price such as `$1,234.56` or `1.234,56 €`.
///
/// Currency symbols and grouping separators are dropped; the marketplace's
/// decimal separator marks the fraction. `None` when nothing numeric remains.
pub fn parse_price_value(marketplace: Marketplace, text: &str) -> Option<f64> {
    let decimal = marketplace.decimal_separator();

    let normalized: String = text
        .chars()
        .filter_map(|c| {
            if c.is_ascii_digit() {
                Some(c)
            } else if c == decimal {
                Some('.')
            } else {
                None
            }
        })
        .collect();

    if !normalized.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    normalized.parse().ok()
}

/// Numeric price of a record, when it has a readable one
pub fn record_price(marketplace: Marketplace, record: &Record) -> Option<f64> {
    record
        .price
        .as_deref()
        .and_then(|price| parse_price_value(marketplace, price))
}

/// Inclusive price bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Bounds are kept as given; an inverted range contains nothing
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Smallest and largest known price; `None` when no record has one
    pub fn from_records(marketplace: Marketplace, records: &[Record]) -> Option<Self> {
        records
            .iter()
            .filter_map(|record| record_price(marketplace, record))
            .fold(None, |range: Option<Self>, price| {
                Some(range.map_or(Self { min: price, max: price }, |r| Self {
                    min: r.min.min(price),
                    max: r.max.max(price),
                }))
            })
    }

    /// Replace either bound with a user bound, as given
    #[must_use]
    pub fn restrict(self, min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(min.unwrap_or(self.min), max.unwrap_or(self.max))
    }

    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, price: f64) -> bool {
        (self.min..=self.max).contains(&price)
    }
}

/// Records split by a price filter
#[derive(Debug, Clone, Default, Serialize)]
pub struct PriceFilterOutcome {
    /// Records whose price lies inside the range
    #[serde(rename = "inRange")]
    pub in_range: Vec<Record>,

    /// Records without a readable price, never filtered numerically
    #[serde(rename = "unknownPrice")]
    pub unknown_price: Vec<Record>,
}

impl PriceFilterOutcome {
    pub fn is_empty(&self) -> bool {
        self.in_range.is_empty() && self.unknown_price.is_empty()
    }
}

/// Keep records priced inside `range`; records without a price are set aside
pub fn filter_by_price(
    marketplace: Marketplace,
    records: &[Record],
    range: &PriceRange,
) -> PriceFilterOutcome {
    let mut outcome = PriceFilterOutcome::default();

    for record in records {
        match record_price(marketplace, record) {
            Some(price) if range.contains(price) => outcome.in_range.push(record.clone()),
            Some(_) => {}
            None => outcome.unknown_price.push(record.clone()),
        }
    }

    outcome
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins over `[min, max]` of `values`.
///
/// Every bin is half-open except the last, which also takes `max`. When all
/// values are equal there is a single bin holding all of them.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn price_histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: (i as f64).mul_add(width, min),
            upper: if i + 1 == bins {
                max
            } else {
                ((i + 1) as f64).mul_add(width, min)
            },
            count: 0,
        })
        .collect();

    for value in finite {
        let index = (((value - min) / width).floor() as usize).min(bins - 1);
        histogram[index].count += 1;
    }

    histogram
}

/// One table line with display-ready columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Product page, displayed as [`LINK_LABEL`]
    pub link: String,
    /// Thumbnail URL
    pub image: Option<String>,
    pub description: String,
    /// Currency symbol plus two decimals, e.g. `€1234.56`
    pub price: Option<String>,
    pub reviews: Option<String>,
    /// One decimal plus a star, e.g. `4.5 ⭐`
    pub rating: Option<String>,
}

impl TableRow {
    pub fn from_record(marketplace: Marketplace, record: &Record) -> Self {
        Self {
            link: record.link.clone(),
            image: record.image_url.clone(),
            description: record.description.clone().unwrap_or_default(),
            price: record_price(marketplace, record).map(|p| format_price(marketplace, p)),
            reviews: record.review_count.map(|n| n.to_string()),
            rating: record.rating.map(format_rating),
        }
    }
}

pub fn format_price(marketplace: Marketplace, value: f64) -> String {
    format!("{}{value:.2}", marketplace.currency_symbol())
}

pub fn format_rating(rating: f64) -> String {
    format!("{rating:.1} ⭐")
}

/// Plain-text table of `rows`, or [`NO_RESULTS_MESSAGE`] when there are none
pub fn render_table(rows: &[TableRow]) -> String {
    if rows.is_empty() {
        return format!("{NO_RESULTS_MESSAGE}\n");
    }

    let headers = ["Link", "Description", "Price", "Reviews", "Rating", "Image"];
    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|row| {
            [
                LINK_LABEL.to_string(),
                truncate(&row.description, DESCRIPTION_WIDTH),
                row.price.clone().unwrap_or_default(),
                row.reviews.clone().unwrap_or_default(),
                row.rating.clone().unwrap_or_default(),
                row.image.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &headers.map(ToString::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for (line, row) in cells.iter().zip(rows) {
        push_line(&mut out, line, &widths);
        let _ = writeln!(out, "  {}", row.link);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Horizontal bar chart of a price histogram
pub fn render_histogram(marketplace: Marketplace, bins: &[HistogramBin]) -> String {
    let mut out = String::from("Price distribution\n");
    if bins.is_empty() {
        out.push_str("(no prices)\n");
        return out;
    }

    let labels: Vec<String> = bins
        .iter()
        .map(|bin| {
            format!(
                "{} - {}",
                format_price(marketplace, bin.lower),
                format_price(marketplace, bin.upper)
            )
        })
        .collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let peak = bins.iter().map(|bin| bin.count).max().unwrap_or(0).max(1);

    for (label, bin) in labels.iter().zip(bins) {
        let bar = "█".repeat(bin.count * HISTOGRAM_WIDTH / peak);
        let pad = label_width - label.chars().count();
        let _ = writeln!(out, "{label}{} | {bar} {}", " ".repeat(pad), bin.count);
    }
    out
}
