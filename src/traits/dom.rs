//! Document abstraction.
//!
//! The live client never owns the page it keeps in sync. Everything it reads
//! (location, focus, marker elements) and everything it writes (status dot,
//! activity rows, main region) goes through [`Dom`], addressed by CSS
//! selectors taken from [`DomSelectors`](crate::config::DomSelectors).
//!
//! Writes to a selector that matches nothing are silently ignored, the same
//! way a missing element would be skipped in a browser.

/// The element that currently holds keyboard focus.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FocusedElement {
    /// Lower-case tag name (`input`, `textarea`, `div`, ...)
    pub tag: String,
    /// Value of the `type` attribute, for `<input>` elements
    pub input_type: Option<String>,
    /// Whether the element is a content-editable region
    pub content_editable: bool,
}

impl FocusedElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }

    pub fn with_content_editable(mut self, editable: bool) -> Self {
        self.content_editable = editable;
        self
    }
}

/// Trait for the document the live client keeps in sync.
///
/// Implementations use interior mutability: the client shares one document
/// between its connection task and its refresh tasks.
pub trait Dom: Send + Sync {
    /// Full URL of the page currently displayed.
    fn location_href(&self) -> String;

    /// Path component of [`Dom::location_href`].
    fn location_path(&self) -> String;

    /// Read an attribute of the first element matching `selector`.
    fn attribute(&self, selector: &str, name: &str) -> Option<String>;

    /// The currently focused element, if any.
    fn active_element(&self) -> Option<FocusedElement>;

    fn set_attribute(&self, selector: &str, name: &str, value: &str);

    fn set_text(&self, selector: &str, text: &str);

    fn add_class(&self, selector: &str, class: &str);

    fn remove_class(&self, selector: &str, class: &str);

    /// Read a layout property of the element, forcing the document to
    /// settle pending style changes before the next write.
    fn layout_read(&self, selector: &str) -> f64;

    /// Replace the element's children. Returns `false` if nothing matched.
    fn set_inner_html(&self, selector: &str, html: &str) -> bool;

    /// Insert markup as the element's new first child. Returns `false` if
    /// nothing matched.
    fn prepend_html(&self, selector: &str, html: &str) -> bool;

    /// Drop trailing children so at most `max` remain.
    fn truncate_children(&self, selector: &str, max: usize);
}
