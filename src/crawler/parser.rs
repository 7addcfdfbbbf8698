//! HTML parsing helpers
//!
//! Link, title, and plain-text extraction used by the crawler and by
//! search result construction.

use scraper::{Html, Selector};
use std::collections::HashSet;

/// Extracts the distinct site-relative links of a page
///
/// Returns `href` values of `<a>` elements that start with `/`, in
/// document order, de-duplicated. Absolute links, fragments, and
/// special schemes never start with `/` and are dropped by the same
/// test. Protocol-relative (`//…`) hrefs are returned here and filtered
/// by the crawler, which owns that policy.
pub fn extract_relative_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if href.starts_with('/') && seen.insert(href.to_string()) {
                links.push(href.to_string());
            }
        }
    }
    links
}

/// Extracts the page title from the `<title>` tag
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts whitespace-normalized plain text from the document body
///
/// Falls back to the whole document when there is no `<body>` element.
pub fn extract_body_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let body_text = Selector::parse("body")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|body| body.text().collect::<Vec<_>>().join(" "))
        })
        .unwrap_or_else(|| document.root_element().text().collect::<Vec<_>>().join(" "));

    body_text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_relative_links() {
        let html = r#"<html><body>
            <a href="/page1">One</a>
            <a href="/page2">Two</a>
            <a href="https://other.com/page">Absolute</a>
        </body></html>"#;
        assert_eq!(extract_relative_links(html), vec!["/page1", "/page2"]);
    }

    #[test]
    fn test_duplicate_links_deduplicated() {
        let html = r#"<html><body>
            <a href="/page">First</a>
            <a href="/page">Second</a>
        </body></html>"#;
        assert_eq!(extract_relative_links(html), vec!["/page"]);
    }

    #[test]
    fn test_special_schemes_not_relative() {
        let html = r##"<html><body>
            <a href="mailto:test@example.com">Mail</a>
            <a href="javascript:void(0)">Js</a>
            <a href="#anchor">Anchor</a>
        </body></html>"##;
        assert!(extract_relative_links(html).is_empty());
    }

    #[test]
    fn test_protocol_relative_links_returned() {
        // The crawler decides not to follow these; the parser reports them
        let html = r#"<html><body><a href="//cdn.example.com/x">Cdn</a></body></html>"#;
        assert_eq!(extract_relative_links(html), vec!["//cdn.example.com/x"]);
    }

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        assert_eq!(extract_title(html), Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        let html = r#"<html><head></head><body></body></html>"#;
        assert_eq!(extract_title(html), None);
    }

    #[test]
    fn test_extract_body_text() {
        let html = r#"<html><head><title>T</title></head>
            <body><p>кот   кот</p><div>собака</div></body></html>"#;
        assert_eq!(extract_body_text(html), "кот кот собака");
    }

    #[test]
    fn test_body_text_skips_head() {
        let html = r#"<html><head><title>Heading</title></head><body>текст</body></html>"#;
        assert_eq!(extract_body_text(html), "текст");
    }
}
