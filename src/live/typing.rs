//! Guard against refreshing under an operator who is typing.

use std::sync::Arc;

use crate::traits::{Dom, FocusedElement};

/// `<input>` types that take free text.
const TEXT_INPUT_TYPES: &[&str] = &[
    "text", "search", "email", "url", "tel", "password", "number", "date",
    "datetime-local", "month", "time", "week",
];

/// Whether `element` is a free-text entry surface.
pub fn is_text_entry(element: &FocusedElement) -> bool {
    if element.content_editable {
        return true;
    }
    match element.tag.as_str() {
        "textarea" => true,
        // A missing or empty type attribute means "text"
        "input" => element
            .input_type
            .as_deref()
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .map_or(true, |t| TEXT_INPUT_TYPES.contains(&t.as_str())),
        _ => false,
    }
}

pub struct TypingGuard {
    dom: Arc<dyn Dom>,
}

impl TypingGuard {
    pub fn new(dom: Arc<dyn Dom>) -> Self {
        Self { dom }
    }

    /// True if a destructive refresh now would disrupt typing.
    pub fn is_typing(&self) -> bool {
        self.dom
            .active_element()
            .map_or(false, |el| is_text_entry(&el))
    }
}
