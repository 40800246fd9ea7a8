//! In-memory document.
//!
//! [`MemoryDom`] stores the handful of elements the live client addresses,
//! keyed by the selector used to reach them, and records every mutation.
//! Tests register elements directly; the `livedash` binary seeds one from a
//! fetched page with [`MemoryDom::from_page`].
//!
//! Replacing a region's inner HTML re-reads every registered element from
//! the new markup, so elements nested in the region (the activity table body
//! inside `main`) follow the server's rendering.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use scraper::Html;

use crate::config::DomSelectors;
use crate::page::{snapshot_element, ElementSnapshot, PageError};
use crate::traits::{Dom, FocusedElement};

/// State of one addressable element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementState {
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub text: String,
    /// Child markup, first child first
    pub children: VecDeque<String>,
}

impl ElementState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Children concatenated.
    pub fn inner_html(&self) -> String {
        self.children.iter().map(String::as_str).collect()
    }
}

/// One recorded write to the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetAttribute { selector: String, name: String, value: String },
    SetText { selector: String, text: String },
    AddClass { selector: String, class: String },
    RemoveClass { selector: String, class: String },
    LayoutRead { selector: String },
    SetInnerHtml { selector: String },
    Prepend { selector: String },
    Truncate { selector: String, removed: usize },
}

/// Mutations kept by a recording document; older ones are dropped.
pub const MUTATION_LOG_LIMIT: usize = 4096;

impl From<ElementSnapshot> for ElementState {
    fn from(snapshot: ElementSnapshot) -> Self {
        Self {
            attributes: snapshot.attributes.into_iter().collect(),
            classes: snapshot.classes,
            text: snapshot.text,
            children: snapshot.children.into(),
        }
    }
}

#[derive(Debug, Default)]
struct DomState {
    href: String,
    focused: Option<FocusedElement>,
    elements: HashMap<String, ElementState>,
    /// Selectors whose children are kept one entry per child element
    split: HashSet<String>,
    recording: bool,
    mutations: VecDeque<Mutation>,
}

impl DomState {
    fn record(&mut self, mutation: Mutation) {
        if !self.recording {
            return;
        }
        if self.mutations.len() == MUTATION_LOG_LIMIT {
            self.mutations.pop_front();
        }
        self.mutations.push_back(mutation);
    }

    /// Registered selectors (other than `region`) matched in `html`.
    fn nested_in(&self, region: &str, html: &Html) -> Vec<(String, ElementState)> {
        self.elements
            .keys()
            .filter(|selector| selector.as_str() != region)
            .filter_map(|selector| {
                let split = self.split.contains(selector);
                // Selectors were parsed when registered from a page; a bad
                // one simply never matches
                let snapshot = snapshot_element(html, selector, split).ok()??;
                Some((selector.clone(), snapshot.into()))
            })
            .collect()
    }
}

/// Thread-safe in-memory [`Dom`].
///
/// Documents from [`MemoryDom::new`] record their mutations (the newest
/// [`MUTATION_LOG_LIMIT`]); long-running owners turn that off with
/// [`MemoryDom::without_recording`].
#[derive(Debug, Default)]
pub struct MemoryDom {
    state: Mutex<DomState>,
}

impl MemoryDom {
    /// Empty document at `href`.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(DomState {
                href: href.into(),
                recording: true,
                ..DomState::default()
            }),
        }
    }

    /// Stop recording mutations and drop the ones recorded so far.
    pub fn without_recording(self) -> Self {
        {
            let mut state = self.lock();
            state.recording = false;
            state.mutations.clear();
        }
        self
    }

    /// Keep the children of `selector` as separate entries, one per child
    /// element, whenever it is re-read from markup.
    pub fn with_split_children(self, selector: &str) -> Self {
        self.lock().split.insert(selector.to_string());
        self
    }

    /// Seed a document from a fetched page.
    ///
    /// Every selector in `selectors` that matches is registered; the activity
    /// table body keeps its rows as separate children so new rows can be
    /// inserted and trimmed.
    pub fn from_page(href: &str, html: &str, selectors: &DomSelectors) -> Result<Self, PageError> {
        let document = Html::parse_document(html);
        let dom = Self::new(href).with_split_children(&selectors.activity_body);
        for (field, selector) in selectors.iter() {
            let split = field == "activity_body";
            if let Some(snapshot) = snapshot_element(&document, selector, split)? {
                dom.insert_element(selector, snapshot.into());
            }
        }
        Ok(dom)
    }

    fn lock(&self) -> MutexGuard<'_, DomState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register (or replace) an element under `selector`.
    pub fn insert_element(&self, selector: &str, element: ElementState) {
        self.lock().elements.insert(selector.to_string(), element);
    }

    pub fn with_element(self, selector: &str, element: ElementState) -> Self {
        self.insert_element(selector, element);
        self
    }

    /// Move focus to `element`, or clear focus with `None`.
    pub fn set_focus(&self, element: Option<FocusedElement>) {
        self.lock().focused = element;
    }

    pub fn set_href(&self, href: impl Into<String>) {
        self.lock().href = href.into();
    }

    /// Copy of the element registered under `selector`.
    pub fn element(&self, selector: &str) -> Option<ElementState> {
        self.lock().elements.get(selector).cloned()
    }

    /// Recorded writes, oldest first.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.lock().mutations.iter().cloned().collect()
    }

    pub fn clear_mutations(&self) {
        self.lock().mutations.clear();
    }

    /// Apply `f` to the element if it exists, recording `mutation` when it
    /// does.
    fn mutate<F>(&self, selector: &str, mutation: Mutation, f: F) -> bool
    where
        F: FnOnce(&mut ElementState),
    {
        let mut state = self.lock();
        let Some(element) = state.elements.get_mut(selector) else {
            return false;
        };
        f(element);
        state.record(mutation);
        true
    }
}

impl Dom for MemoryDom {
    fn location_href(&self) -> String {
        self.lock().href.clone()
    }

    fn location_path(&self) -> String {
        let href = self.location_href();
        match reqwest::Url::parse(&href) {
            Ok(url) => url.path().to_string(),
            // Relative hrefs: strip query and fragment
            Err(_) => href
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }

    fn attribute(&self, selector: &str, name: &str) -> Option<String> {
        self.lock()
            .elements
            .get(selector)
            .and_then(|el| el.attributes.get(name).cloned())
    }

    fn active_element(&self) -> Option<FocusedElement> {
        self.lock().focused.clone()
    }

    fn set_attribute(&self, selector: &str, name: &str, value: &str) {
        let mutation = Mutation::SetAttribute {
            selector: selector.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        };
        self.mutate(selector, mutation, |el| {
            el.attributes.insert(name.to_string(), value.to_string());
        });
    }

    fn set_text(&self, selector: &str, text: &str) {
        let mutation = Mutation::SetText {
            selector: selector.to_string(),
            text: text.to_string(),
        };
        self.mutate(selector, mutation, |el| el.text = text.to_string());
    }

    fn add_class(&self, selector: &str, class: &str) {
        let mutation = Mutation::AddClass {
            selector: selector.to_string(),
            class: class.to_string(),
        };
        self.mutate(selector, mutation, |el| {
            if !el.has_class(class) {
                el.classes.push(class.to_string());
            }
        });
    }

    fn remove_class(&self, selector: &str, class: &str) {
        let mutation = Mutation::RemoveClass {
            selector: selector.to_string(),
            class: class.to_string(),
        };
        self.mutate(selector, mutation, |el| el.classes.retain(|c| c != class));
    }

    fn layout_read(&self, selector: &str) -> f64 {
        let mutation = Mutation::LayoutRead {
            selector: selector.to_string(),
        };
        // Nothing is laid out in memory; the read is only recorded
        self.mutate(selector, mutation, |_| {});
        0.0
    }

    fn set_inner_html(&self, selector: &str, html: &str) -> bool {
        let mut state = self.lock();
        let Some(element) = state.elements.get(selector) else {
            return false;
        };

        // Elements that lived in the old markup go away unless the new
        // markup has them again
        let before = Html::parse_fragment(&element.inner_html());
        let after = Html::parse_fragment(html);
        let removed: Vec<String> = state
            .nested_in(selector, &before)
            .into_iter()
            .map(|(nested, _)| nested)
            .collect();
        let replaced = state.nested_in(selector, &after);

        for nested in removed {
            state.elements.remove(&nested);
        }
        for (nested, element) in replaced {
            state.elements.insert(nested, element);
        }

        if let Some(element) = state.elements.get_mut(selector) {
            element.children.clear();
            if !html.is_empty() {
                element.children.push_back(html.to_string());
            }
        }
        state.record(Mutation::SetInnerHtml {
            selector: selector.to_string(),
        });
        true
    }

    fn prepend_html(&self, selector: &str, html: &str) -> bool {
        let mutation = Mutation::Prepend {
            selector: selector.to_string(),
        };
        self.mutate(selector, mutation, |el| el.children.push_front(html.to_string()))
    }

    fn truncate_children(&self, selector: &str, max: usize) {
        let mut state = self.lock();
        let Some(element) = state.elements.get_mut(selector) else {
            return;
        };
        let removed = element.children.len().saturating_sub(max);
        if removed == 0 {
            return;
        }
        element.children.truncate(max);
        state.record(Mutation::Truncate {
            selector: selector.to_string(),
            removed,
        });
    }
}
