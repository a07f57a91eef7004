// Selection policy for images that need caption remediation.

use crate::page::ImageTag;
use tracing::debug;
use url::Url;

/// Formats a captioning model cannot usefully describe. Data URIs are
/// rejected separately, before any resolution.
const EXCLUDED_EXTENSIONS: [&str; 5] = ["svg", "webp", "gif", "ico", "xml"];

/// Select the images worth remediating: no usable alt text, a present
/// `src`, and a format a captioning model can process. Selected `src`
/// values are resolved against the page URL; fetch order is preserved
/// and exact duplicates are kept.
pub fn uncaptioned_images(tags: &[ImageTag], page_url: &Url) -> Vec<String> {
    let mut selected = Vec::new();

    for tag in tags {
        let Some(src) = tag.src.as_deref() else {
            continue;
        };

        if has_usable_alt(tag) {
            continue;
        }

        if src.starts_with("data:") {
            debug!("Skipping data URI image on {}", page_url);
            continue;
        }

        let Some(resolved) = resolve_src(page_url, src) else {
            debug!("Could not resolve image src {:?} on {}", src, page_url);
            continue;
        };

        if has_excluded_extension(&resolved) {
            debug!("Skipping excluded format: {}", resolved);
            continue;
        }

        selected.push(resolved.to_string());
    }

    selected
}

fn has_usable_alt(tag: &ImageTag) -> bool {
    tag.alt.as_deref().is_some_and(|alt| !alt.trim().is_empty())
}

fn resolve_src(page_url: &Url, src: &str) -> Option<Url> {
    let mut resolved = page_url.join(src).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

fn has_excluded_extension(url: &Url) -> bool {
    match url.path().rsplit_once('.') {
        Some((_, extension)) => {
            let extension = extension.to_ascii_lowercase();
            EXCLUDED_EXTENSIONS.contains(&extension.as_str())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(src: Option<&str>, alt: Option<&str>) -> ImageTag {
        ImageTag::new(src.map(str::to_string), alt.map(str::to_string))
    }

    fn page_url() -> Url {
        Url::parse("https://example.com/gallery/").unwrap()
    }

    #[test]
    fn test_missing_alt_raster_image_is_selected() {
        let tags = vec![tag(Some("logo.png"), None)];
        let selected = uncaptioned_images(&tags, &page_url());
        assert_eq!(selected, vec!["https://example.com/gallery/logo.png"]);
    }

    #[test]
    fn test_empty_and_whitespace_alt_are_selected() {
        let tags = vec![
            tag(Some("/a.jpg"), Some("")),
            tag(Some("/b.jpeg"), Some("   ")),
        ];
        let selected = uncaptioned_images(&tags, &page_url());
        assert_eq!(selected.len(), 2);
        assert!(selected[0].ends_with("/a.jpg"));
        assert!(selected[1].ends_with("/b.jpeg"));
    }

    #[test]
    fn test_non_empty_alt_is_never_selected() {
        let tags = vec![tag(Some("photo.png"), Some("x"))];
        assert!(uncaptioned_images(&tags, &page_url()).is_empty());
    }

    #[test]
    fn test_missing_src_is_never_selected() {
        let tags = vec![tag(None, None)];
        assert!(uncaptioned_images(&tags, &page_url()).is_empty());
    }

    #[test]
    fn test_excluded_formats_are_never_selected() {
        let tags = vec![
            tag(Some("icon.svg"), None),
            tag(Some("anim.gif"), None),
            tag(Some("photo.webp"), None),
            tag(Some("favicon.ico"), None),
            tag(Some("sprite.xml"), None),
            tag(Some("shot.PNG"), None),
        ];
        let selected = uncaptioned_images(&tags, &page_url());
        assert_eq!(selected, vec!["https://example.com/gallery/shot.PNG"]);
    }

    #[test]
    fn test_data_uri_is_never_selected() {
        let tags = vec![tag(Some("data:image/png;base64,iVBORw0KGgo="), None)];
        assert!(uncaptioned_images(&tags, &page_url()).is_empty());
    }

    #[test]
    fn test_relative_src_resolves_against_page_url() {
        let tags = vec![
            tag(Some("../img/one.png"), None),
            tag(Some("/img/two.jpg"), None),
            tag(Some("https://cdn.example.net/three.bmp"), None),
        ];
        let selected = uncaptioned_images(&tags, &page_url());
        assert_eq!(
            selected,
            vec![
                "https://example.com/img/one.png",
                "https://example.com/img/two.jpg",
                "https://cdn.example.net/three.bmp",
            ]
        );
    }

    #[test]
    fn test_extension_check_ignores_query_string() {
        let tags = vec![tag(Some("/photo.png?width=300&fmt=svg"), None)];
        let selected = uncaptioned_images(&tags, &page_url());
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_duplicates_kept_in_fetch_order() {
        let tags = vec![
            tag(Some("a.png"), None),
            tag(Some("b.png"), None),
            tag(Some("a.png"), None),
        ];
        let selected = uncaptioned_images(&tags, &page_url());
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0], selected[2]);
    }
}
