use clarity_scanner::FetchError;
use thiserror::Error;

/// Request-level failures. Contract violations and per-image caption
/// failures are recovered before they reach this type.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Page fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Image enumeration failed; covers the whole remediation request
    /// since no images can be assessed without the page.
    #[error("Image enumeration failed: {0}")]
    Crawl(#[source] FetchError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;
