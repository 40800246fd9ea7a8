//! Reading regions out of server-rendered pages.
//!
//! Uses `scraper` for parsing. Parsed documents never leave these functions,
//! so callers can run them from any task.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Errors while extracting a region from a page.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("page has no element matching '{0}'")]
    MissingRegion(String),
}

/// Parse a CSS selector, keeping the failure reason as text.
pub fn parse_selector(selector: &str) -> Result<Selector, PageError> {
    Selector::parse(selector).map_err(|e| PageError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Inner HTML of the first element matching `selector` in a full document.
pub fn extract_region(html: &str, selector: &str) -> Result<String, PageError> {
    let selector_parsed = parse_selector(selector)?;
    let document = Html::parse_document(html);
    document
        .select(&selector_parsed)
        .next()
        .map(|el| el.inner_html())
        .ok_or_else(|| PageError::MissingRegion(selector.to_string()))
}

/// Everything the in-memory document needs to know about one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSnapshot {
    pub attributes: Vec<(String, String)>,
    pub classes: Vec<String>,
    pub text: String,
    /// Outer HTML of each child element, or the whole inner HTML as a single
    /// entry when `split_children` was not requested
    pub children: Vec<String>,
}

/// Snapshot the first element matching `selector`, if any.
pub fn snapshot_element(
    document: &Html,
    selector: &str,
    split_children: bool,
) -> Result<Option<ElementSnapshot>, PageError> {
    let selector_parsed = parse_selector(selector)?;
    Ok(document
        .select(&selector_parsed)
        .next()
        .map(|el| snapshot(el, split_children)))
}

fn snapshot(el: ElementRef<'_>, split_children: bool) -> ElementSnapshot {
    let value = el.value();
    let children = if split_children {
        el.children()
            .filter_map(ElementRef::wrap)
            .map(|child| child.html())
            .collect()
    } else {
        let inner = el.inner_html();
        if inner.is_empty() {
            Vec::new()
        } else {
            vec![inner]
        }
    };

    ElementSnapshot {
        attributes: value
            .attrs()
            .filter(|(name, _)| *name != "class")
            .map(|(name, v)| (name.to_string(), v.to_string()))
            .collect(),
        classes: value.classes().map(str::to_string).collect(),
        text: el.text().collect::<String>().trim().to_string(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html><head><meta name="story-id" content="a1b2c3"><title>Story</title></head>
<body>
<nav><span id="sse-status" class="dot" data-state="disconnected"></span><span id="sse-label">Offline</span></nav>
<main><h1>Draft</h1><p>Once upon a time</p></main>
<table id="activity-table"><tbody><tr><td>1</td></tr><tr><td>2</td></tr></tbody></table>
</body></html>"#;

    #[test]
    fn test_extract_region() {
        assert_eq!(
            extract_region(PAGE, "main").unwrap(),
            "<h1>Draft</h1><p>Once upon a time</p>"
        );
    }

    #[test]
    fn test_extract_missing_region() {
        assert_eq!(
            extract_region("<html><body><div></div></body></html>", "main"),
            Err(PageError::MissingRegion("main".to_string()))
        );
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(
            extract_region(PAGE, "main[["),
            Err(PageError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_snapshot_meta_and_status() {
        let document = Html::parse_document(PAGE);
        let meta = snapshot_element(&document, r#"meta[name="story-id"]"#, false)
            .unwrap()
            .unwrap();
        assert!(meta
            .attributes
            .contains(&("content".to_string(), "a1b2c3".to_string())));

        let dot = snapshot_element(&document, "#sse-status", false).unwrap().unwrap();
        assert_eq!(dot.classes, vec!["dot".to_string()]);
        assert!(dot.children.is_empty());

        let label = snapshot_element(&document, "#sse-label", false).unwrap().unwrap();
        assert_eq!(label.text, "Offline");
    }

    #[test]
    fn test_snapshot_split_rows() {
        let document = Html::parse_document(PAGE);
        let body = snapshot_element(&document, "#activity-table tbody", true)
            .unwrap()
            .unwrap();
        assert_eq!(
            body.children,
            vec!["<tr><td>1</td></tr>".to_string(), "<tr><td>2</td></tr>".to_string()]
        );
    }

    #[test]
    fn test_snapshot_absent_element() {
        let document = Html::parse_document("<html><body></body></html>");
        assert_eq!(snapshot_element(&document, "main", false).unwrap(), None);
    }
}
