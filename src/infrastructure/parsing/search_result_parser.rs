//! Search-result page parser
//!
//! Turns one results page into records. Each listing container is handled on
//! its own so a single broken listing never costs the rest of the page.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, warn};

use super::config::SearchResultSelectors;
use super::locale::{is_rating_label, parse_rating_label, parse_review_count};
use super::{ContextualParser, ParseContext, ParsingError, ParsingResult};
use crate::domain::Record;
use crate::domain::constants::DESCRIPTION_SEPARATOR;
use crate::infrastructure::config::ExtractionPolicy;

/// Compiled selectors, built once per parser
#[derive(Debug, Clone)]
struct CompiledSelectors {
    container: Selector,
    image: Selector,
    heading: Selector,
    price: Selector,
    price_text: Selector,
    rating_label: Selector,
    rating_text: Selector,
    review_link: Selector,
    pagination_item: Selector,
    robot_check: Selector,
}

/// Parser for storefront search-result pages
#[derive(Debug, Clone)]
pub struct SearchResultParser {
    selectors: CompiledSelectors,
    id_attribute: String,
    review_anchor_suffix: String,
    policy: ExtractionPolicy,
}

impl SearchResultParser {
    /// Create a parser with the default selectors and lenient policy
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&SearchResultSelectors::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(config: &SearchResultSelectors) -> ParsingResult<Self> {
        Ok(Self {
            selectors: CompiledSelectors {
                container: compile(&config.container)?,
                image: compile(&config.image)?,
                heading: compile(&config.heading)?,
                price: compile(&config.price)?,
                price_text: compile(&config.price_text)?,
                rating_label: compile(&config.rating_label)?,
                rating_text: compile(&config.rating_text)?,
                review_link: compile(&config.review_link)?,
                pagination_item: compile(&config.pagination_item)?,
                robot_check: compile(&config.robot_check)?,
            },
            id_attribute: config.id_attribute.clone(),
            review_anchor_suffix: config.review_anchor_suffix.clone(),
            policy: ExtractionPolicy::default(),
        })
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: ExtractionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Parse a page of raw markup into records
    pub fn extract(&self, markup: &str, context: &ParseContext) -> ParsingResult<Vec<Record>> {
        let html = Html::parse_document(markup);
        self.parse_with_context(&html, context)
    }

    /// Page count advertised by the first page plus that page's records,
    /// from a single parse of the markup
    pub fn analyze_first_page(
        &self,
        markup: &str,
        context: &ParseContext,
    ) -> (u32, ParsingResult<Vec<Record>>) {
        let html = Html::parse_document(markup);
        let pages = self.page_count(&html).unwrap_or_else(|| {
            debug!("No pagination control found, assuming a single page");
            1
        });
        (pages, self.parse_with_context(&html, context))
    }

    /// Total page count from the pagination control: the last entry whose
    /// text is a positive number. `None` when there is no such entry.
    pub fn page_count(&self, html: &Html) -> Option<u32> {
        let items: Vec<ElementRef> = html.select(&self.selectors.pagination_item).collect();
        items
            .iter()
            .rev()
            .find_map(|item| element_text(item).parse::<u32>().ok().filter(|n| *n > 0))
    }

    /// Page count of a raw results document, 1 when it has no pagination control
    pub fn discover_page_count(&self, markup: &str) -> u32 {
        self.page_count(&Html::parse_document(markup)).unwrap_or(1)
    }

    /// Whether the markup is the storefront's robot check instead of results
    pub fn is_robot_check(&self, html: &Html) -> bool {
        html.select(&self.selectors.robot_check).next().is_some()
    }

    /// Extract one record from a listing container
    fn extract_record(
        &self,
        element: &ElementRef,
        index: usize,
        context: &ParseContext,
    ) -> ParsingResult<Record> {
        let id = element
            .value()
            .attr(&self.id_attribute)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ParsingError::MissingIdentifier {
                page: context.page,
                index,
            })?;

        let mut record = Record::new(id, context.marketplace);
        record.image_url = self.extract_image(element);
        record.description = self.extract_description(element);
        record.price = self.extract_price(element);
        record.rating = self.extract_rating(element, context);
        record.review_count = self.extract_review_count(element, context);

        Ok(record)
    }

    fn extract_image(&self, element: &ElementRef) -> Option<String> {
        element
            .select(&self.selectors.image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(ToString::to_string)
    }

    fn extract_description(&self, element: &ElementRef) -> Option<String> {
        let fragments: Vec<String> = element
            .select(&self.selectors.heading)
            .map(|heading| element_text(&heading))
            .filter(|text| !text.is_empty())
            .collect();

        (!fragments.is_empty()).then(|| fragments.join(DESCRIPTION_SEPARATOR))
    }

    /// Display text kept verbatim; separators are normalized by the presentation layer
    fn extract_price(&self, element: &ElementRef) -> Option<String> {
        let price = element.select(&self.selectors.price).next()?;
        price
            .select(&self.selectors.price_text)
            .next()
            .map(|text| element_text(&text))
            .filter(|text| !text.is_empty())
    }

    fn extract_rating(&self, element: &ElementRef, context: &ParseContext) -> Option<f64> {
        let marketplace = context.marketplace;

        let label = element
            .select(&self.selectors.rating_label)
            .filter_map(|e| e.value().attr("aria-label"))
            .find(|label| is_rating_label(marketplace, label))
            .map(ToString::to_string)
            .or_else(|| {
                element
                    .select(&self.selectors.rating_text)
                    .map(|e| element_text(&e))
                    .find(|text| is_rating_label(marketplace, text))
            })?;

        let rating = parse_rating_label(marketplace, &label);
        if rating.is_none() {
            debug!("Ignoring out-of-range rating label '{}' on page {}", label, context.page);
        }
        rating
    }

    fn extract_review_count(&self, element: &ElementRef, context: &ParseContext) -> Option<u64> {
        let mut anchors = element.select(&self.selectors.review_link).filter(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| href.ends_with(self.review_anchor_suffix.as_str()))
        });

        let mut seen_anchor = false;
        let count = anchors.find_map(|anchor| {
            seen_anchor = true;
            parse_review_count(context.marketplace, &element_text(&anchor))
        });

        if count.is_none() && seen_anchor {
            debug!("Reviews anchor without a readable count on page {}", context.page);
        }
        count
    }
}

impl ContextualParser for SearchResultParser {
    type Output = Vec<Record>;
    type Context = ParseContext;

    /// Extract every listing on the page, honouring the extraction policy
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        debug!("Parsing search results for page {}", context.page);

        let containers: Vec<ElementRef> = html.select(&self.selectors.container).collect();

        if containers.is_empty() {
            if self.is_robot_check(html) {
                warn!("Page {} is a robot check page, no listings available", context.page);
            } else {
                warn!(
                    "No listing containers found on page {} (end of results or markup change)",
                    context.page
                );
            }
            return Ok(Vec::new());
        }

        let mut records = Vec::with_capacity(containers.len());

        for (index, element) in containers.iter().enumerate() {
            match self.extract_record(element, index, context) {
                Ok(record) => records.push(record),
                Err(e) => match self.policy {
                    ExtractionPolicy::Lenient => {
                        error!("Skipping listing {} on page {}: {}", index, context.page, e);
                    }
                    ExtractionPolicy::Strict => {
                        return Err(ParsingError::ContainerFailed {
                            page: context.page,
                            index,
                            source: Box::new(e),
                            markup: element.html(),
                        });
                    }
                },
            }
        }

        debug!(
            "Extracted {} of {} listings from page {}",
            records.len(),
            containers.len(),
            context.page
        );

        Ok(records)
    }
}

fn compile(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}

/// Element text with whitespace runs collapsed and the ends trimmed
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
