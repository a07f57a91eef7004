use crate::error::{FetchError, Result};
use crate::page::{ImageTag, PageText};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Hard cap on extracted page text. Bounds the size of the prompt built
/// downstream from it.
pub const MAX_CONTENT_CHARS: usize = 5000;

/// Subtrees whose text nodes are never user-visible.
const SKIPPED_SUBTREES: [&str; 4] = ["script", "style", "noscript", "template"];

pub struct PageFetcher {
    client: Client,
    timeout_secs: u64,
}

impl PageFetcher {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            timeout_secs,
        }
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Fetch a page and reduce it to newline-joined visible text,
    /// truncated to the first `MAX_CONTENT_CHARS` characters.
    pub async fn fetch_text(&self, url: &str) -> Result<PageText> {
        let body = self.fetch_html(url).await?;
        let text = extract_visible_text(&body);
        let text = truncate_chars(&text, MAX_CONTENT_CHARS).to_string();
        info!(
            "Extracted {} chars of text from {}",
            text.chars().count(),
            url
        );
        Ok(PageText::new(url.to_string(), text))
    }

    /// Fetch a page and enumerate every `<img>` element's `src` and `alt`
    /// attributes, in document order.
    pub async fn fetch_images(&self, url: &str) -> Result<Vec<ImageTag>> {
        let body = self.fetch_html(url).await?;
        let tags = extract_image_tags(&body);
        info!("Found {} <img> elements on {}", tags.len(), url);
        Ok(tags)
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(body)
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines: Vec<&str> = Vec::new();

    for node in document.tree.nodes() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| SKIPPED_SUBTREES.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }

    lines.join("\n")
}

fn extract_image_tags(html: &str) -> Vec<ImageTag> {
    let document = Html::parse_document(html);
    let img_selector = Selector::parse("img").unwrap();

    document
        .select(&img_selector)
        .map(|element| {
            ImageTag::new(
                element.value().attr("src").map(str::to_string),
                element.value().attr("alt").map(str::to_string),
            )
        })
        .collect()
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    async fn mount_page(server: &MockServer, route: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(html.as_bytes().to_vec()),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_text_extraction_skips_scripts_and_styles() {
        let mock_server = MockServer::start().await;
        mount_page(
            &mock_server,
            "/",
            r#"<html><head>
                <style>.hidden { display: none; }</style>
                <script>var tracking = "secret";</script>
            </head><body>
                <h1>Welcome</h1>
                <p>Visible paragraph</p>
            </body></html>"#,
        )
        .await;

        let fetcher = PageFetcher::new();
        let page = fetcher.fetch_text(&mock_server.uri()).await.unwrap();

        assert!(page.text.contains("Welcome"));
        assert!(page.text.contains("Visible paragraph"));
        assert!(!page.text.contains("tracking"));
        assert!(!page.text.contains("display: none"));
    }

    #[tokio::test]
    async fn test_text_nodes_joined_with_newlines() {
        let mock_server = MockServer::start().await;
        mount_page(
            &mock_server,
            "/",
            "<html><body><h1>One</h1><p>Two</p><p>Three</p></body></html>",
        )
        .await;

        let fetcher = PageFetcher::new();
        let page = fetcher.fetch_text(&mock_server.uri()).await.unwrap();

        assert_eq!(page.text, "One\nTwo\nThree");
    }

    #[tokio::test]
    async fn test_text_truncated_at_content_cap() {
        let mock_server = MockServer::start().await;
        let long_body = "a".repeat(MAX_CONTENT_CHARS * 2);
        mount_page(
            &mock_server,
            "/",
            &format!("<html><body><p>{}</p></body></html>", long_body),
        )
        .await;

        let fetcher = PageFetcher::new();
        let page = fetcher.fetch_text(&mock_server.uri()).await.unwrap();

        assert_eq!(page.text.chars().count(), MAX_CONTENT_CHARS);
    }

    #[tokio::test]
    async fn test_browser_user_agent_is_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", "Mozilla/5.0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(b"<html><body>ok</body></html>".to_vec()),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = PageFetcher::new();
        fetcher.fetch_text(&mock_server.uri()).await.unwrap();
    }

    #[tokio::test]
    async fn test_image_enumeration_preserves_document_order() {
        let mock_server = MockServer::start().await;
        mount_page(
            &mock_server,
            "/",
            r#"<html><body>
                <img src="/logo.png">
                <img src="/banner.jpg" alt="Banner">
                <img alt="no source">
            </body></html>"#,
        )
        .await;

        let fetcher = PageFetcher::new();
        let tags = fetcher.fetch_images(&mock_server.uri()).await.unwrap();

        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].src.as_deref(), Some("/logo.png"));
        assert_eq!(tags[0].alt, None);
        assert_eq!(tags[1].alt.as_deref(), Some("Banner"));
        assert_eq!(tags[2].src, None);
    }

    #[tokio::test]
    async fn test_server_error_surfaces_as_fetch_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fetcher = PageFetcher::new();
        let result = fetcher.fetch_text(&mock_server.uri()).await;

        assert!(matches!(result, Err(FetchError::Http(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_any_request() {
        let fetcher = PageFetcher::new();
        let result = fetcher.fetch_text("not a url").await;

        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
