//! Page classification.

use std::sync::Arc;

use crate::traits::Dom;

/// Which dashboard view is displayed, as far as refreshing is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContext {
    /// A single story's detail page
    Story { story_id: String },
    /// The agent activity log
    Activity,
    /// Pipeline and story listings
    List,
}

/// Classifies the current page from the document, fresh on every call.
pub struct PageContextResolver {
    dom: Arc<dyn Dom>,
    story_meta: String,
    activity_path: String,
}

impl PageContextResolver {
    pub fn new(
        dom: Arc<dyn Dom>,
        story_meta: impl Into<String>,
        activity_path: impl Into<String>,
    ) -> Self {
        Self {
            dom,
            story_meta: story_meta.into(),
            activity_path: activity_path.into(),
        }
    }

    /// First match wins: story marker, then activity path, then list.
    pub fn resolve(&self) -> PageContext {
        let story_id = self
            .dom
            .attribute(&self.story_meta, "content")
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        if let Some(story_id) = story_id {
            return PageContext::Story { story_id };
        }

        if self.dom.location_path() == self.activity_path {
            return PageContext::Activity;
        }

        PageContext::List
    }
}
