use serde::{Deserialize, Serialize};

/// Visible text extracted from one page, capped at `MAX_CONTENT_CHARS`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub url: String,
    pub text: String,
}

impl PageText {
    pub fn new(url: String, text: String) -> Self {
        Self { url, text }
    }
}

/// One `<img>` element as found in the document, attributes verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageTag {
    pub src: Option<String>,
    pub alt: Option<String>,
}

impl ImageTag {
    pub fn new(src: Option<String>, alt: Option<String>) -> Self {
        Self { src, alt }
    }
}
