//! Transport capability shared by every page fetch
//!
//! The orchestrator never talks to `reqwest` directly; it receives an
//! `Arc<dyn Transport>` so tests can script responses and completion order.

use async_trait::async_trait;
use scraper::{Html, Node};
use thiserror::Error;

/// Longest error message kept from an error response body
const MAX_MESSAGE_CHARS: usize = 300;

/// Network or HTTP failure of a single request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        /// Visible text of the error page
        message: String,
    },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl TransportError {
    /// Build a status error whose message is the visible text of the error body
    pub fn from_status(status: u16, url: &str, body: &str) -> Self {
        let mut message = visible_text(body);
        if message.is_empty() {
            message = reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown status")
                .to_string();
        }
        Self::Status {
            status,
            url: url.to_string(),
            message,
        }
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. } | Self::Timeout { url } | Self::Request { url, .. } => url,
        }
    }

    /// The storefront answered with its robot check instead of results
    pub fn is_captcha(&self) -> bool {
        matches!(self, Self::Status { message, .. } if message.to_lowercase().contains("captcha"))
    }

    /// Message suitable for showing to the person who ran the search
    pub fn user_message(&self) -> String {
        if self.is_captcha() {
            return "Amazon detected unusual activity and asked for a captcha. Try again later."
                .to_string();
        }
        match self {
            Self::Status { status: 403, .. } => {
                "Access denied. Amazon may be blocking these requests.".to_string()
            }
            Self::Status { status: 404, .. } => "Page not found.".to_string(),
            Self::Status { message, .. } => format!("An error occurred: {message}"),
            Self::Timeout { .. } => "The storefront did not answer in time.".to_string(),
            Self::Request { message, .. } => format!("Could not reach the storefront: {message}"),
        }
    }
}

/// Fetches raw markup for a URL plus query parameters
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<String, TransportError>;
}

/// Human readable text of a markup document: text nodes outside
/// `script`/`style`, whitespace collapsed, truncated.
pub fn visible_text(markup: &str) -> String {
    let document = Html::parse_document(markup);

    let text = document
        .tree
        .root()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|parent| match parent.value() {
                    Node::Element(element) => Some(matches!(
                        element.name(),
                        "script" | "style" | "noscript" | "template"
                    )),
                    _ => None,
                })
                .unwrap_or(false);
            (!hidden).then_some(&**text)
        })
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    if text.chars().count() > MAX_MESSAGE_CHARS {
        let truncated: String = text.chars().take(MAX_MESSAGE_CHARS).collect();
        format!("{truncated}…")
    } else {
        text
    }
}
