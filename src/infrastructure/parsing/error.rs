//! Parsing error types for search-result extraction

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Listing {index} on page {page} has no identifier")]
    MissingIdentifier { page: u32, index: usize },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Failed to process listing {index} on page {page}: {source}")]
    ContainerFailed {
        page: u32,
        index: usize,
        #[source]
        source: Box<ParsingError>,
        /// Raw HTML of the offending container, for diagnosis
        markup: String,
    },
}

impl ParsingError {
    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Raw container markup attached by strict extraction
    pub fn container_markup(&self) -> Option<&str> {
        match self {
            Self::ContainerFailed { markup, .. } => Some(markup),
            _ => None,
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
