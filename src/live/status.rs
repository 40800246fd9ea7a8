//! Connection status indicator.
//!
//! A dot and a label in the page chrome. The dot's `data-state` attribute
//! carries the persistent state; the `flash` class drives a short CSS
//! animation on every received event.

use std::sync::Arc;

use crate::traits::Dom;

/// Class whose (re)application restarts the activity animation.
pub const FLASH_CLASS: &str = "flash";

pub const LABEL_CONNECTED: &str = "Live";
pub const LABEL_DISCONNECTED: &str = "Offline";

pub struct StatusIndicator {
    dom: Arc<dyn Dom>,
    dot: String,
    label: String,
}

impl StatusIndicator {
    pub fn new(dom: Arc<dyn Dom>, dot: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            dom,
            dot: dot.into(),
            label: label.into(),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        let (state, text) = if connected {
            ("connected", LABEL_CONNECTED)
        } else {
            ("disconnected", LABEL_DISCONNECTED)
        };
        self.dom.set_attribute(&self.dot, "data-state", state);
        self.dom.set_attribute(&self.dot, "title", text);
        self.dom.set_text(&self.label, text);
    }

    /// Restart the activity animation.
    ///
    /// Removing and re-adding the class in one go would be coalesced by the
    /// renderer and the animation would not replay, so the two writes are
    /// separated by a layout read that makes the removal take effect.
    pub fn flash(&self) {
        self.dom.remove_class(&self.dot, FLASH_CLASS);
        let _ = self.dom.layout_read(&self.dot);
        self.dom.add_class(&self.dot, FLASH_CLASS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ElementState, MemoryDom, Mutation};

    fn setup() -> (Arc<MemoryDom>, StatusIndicator) {
        let dom = Arc::new(
            MemoryDom::new("http://localhost:8000/")
                .with_element("#dot", ElementState::new())
                .with_element("#label", ElementState::new().with_text("Offline")),
        );
        let indicator = StatusIndicator::new(dom.clone(), "#dot", "#label");
        (dom, indicator)
    }

    #[test]
    fn test_set_connected() {
        let (dom, indicator) = setup();
        indicator.set_connected(true);
        let dot = dom.element("#dot").unwrap();
        assert_eq!(dot.attributes.get("data-state").map(String::as_str), Some("connected"));
        assert_eq!(dot.attributes.get("title").map(String::as_str), Some("Live"));
        assert_eq!(dom.element("#label").unwrap().text, "Live");

        indicator.set_connected(false);
        assert_eq!(
            dom.attribute("#dot", "data-state").as_deref(),
            Some("disconnected")
        );
        assert_eq!(dom.element("#label").unwrap().text, "Offline");
    }

    #[test]
    fn test_flash_is_remove_read_add() {
        let (dom, indicator) = setup();
        indicator.flash();
        assert_eq!(
            dom.mutations(),
            vec![
                Mutation::RemoveClass {
                    selector: "#dot".to_string(),
                    class: FLASH_CLASS.to_string()
                },
                Mutation::LayoutRead {
                    selector: "#dot".to_string()
                },
                Mutation::AddClass {
                    selector: "#dot".to_string(),
                    class: FLASH_CLASS.to_string()
                },
            ]
        );
        assert!(dom.element("#dot").unwrap().has_class(FLASH_CLASS));
    }

    #[test]
    fn test_rapid_flashes_leave_one_class() {
        let (dom, indicator) = setup();
        for _ in 0..5 {
            indicator.flash();
        }
        let dot = dom.element("#dot").unwrap();
        assert_eq!(dot.classes, vec![FLASH_CLASS.to_string()]);
        assert_eq!(dom.mutations().len(), 15);
    }

    #[test]
    fn test_missing_elements_are_tolerated() {
        let dom = Arc::new(MemoryDom::new("http://localhost:8000/"));
        let indicator = StatusIndicator::new(dom.clone(), "#dot", "#label");
        indicator.set_connected(true);
        indicator.flash();
        assert!(dom.mutations().is_empty());
    }
}
