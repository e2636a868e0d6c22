//! An in-memory page implementing [`Dom`].
//!
//! Elements are positioned boxes. A root element's `top` is its document
//! offset; a child's `top` is relative to its parent's content, so scrolling
//! the parent moves the child's document offset up by the parent's scroll
//! position. Selectors match by exact token (`"#feed"`, `".item"`, `"ul"`).

use crate::dom::{Dom, ElementId, ScrollTarget};

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub selectors: Vec<String>,
    pub parent: Option<ElementId>,
    pub top: f64,
    pub height: f64,
    pub scroll_top: f64,
    /// Height of the content inside the element; equal to `height` unless
    /// the element scrolls.
    pub scroll_height: f64,
}

impl Element {
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            selectors: Vec::new(),
            parent: None,
            top,
            height,
            scroll_top: 0.0,
            scroll_height: height,
        }
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    pub fn child_of(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn content_height(mut self, height: f64) -> Self {
        self.scroll_height = height;
        self
    }

    fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.height).max(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    viewport_height: f64,
    viewport_scroll_top: f64,
    content_height: f64,
    interactive: bool,
}

impl Document {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            elements: Vec::new(),
            viewport_height,
            viewport_scroll_top: 0.0,
            content_height: viewport_height,
            interactive: true,
        }
    }

    /// A document that reports itself as server-rendered.
    pub fn server_rendered(viewport_height: f64) -> Self {
        Self {
            interactive: false,
            ..Self::new(viewport_height)
        }
    }

    pub fn insert(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(element);
        id
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height;
        self.viewport_scroll_top = self.viewport_scroll_top.clamp(0.0, self.max_viewport_scroll());
    }

    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    pub fn set_content_height(&mut self, height: f64) {
        self.content_height = height;
        self.viewport_scroll_top = self.viewport_scroll_top.clamp(0.0, self.max_viewport_scroll());
    }

    /// Scroll a target by `delta`, clamped to its scrollable range.
    pub fn scroll_by(&mut self, target: ScrollTarget, delta: f64) {
        let current = self.scroll_top(target);
        self.set_scroll_top(target, current + delta);
    }

    fn max_viewport_scroll(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }
}

impl Dom for Document {
    fn query_selector_all(&self, selector: &str) -> Vec<ElementId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.selectors.iter().any(|s| s == selector))
            .map(|(i, _)| ElementId(i))
            .collect()
    }

    fn offset_top(&self, element: ElementId) -> f64 {
        let Some(el) = self.element(element) else {
            return 0.0;
        };
        match el.parent.and_then(|p| self.element(p).map(|parent| (p, parent))) {
            Some((parent_id, parent)) => self.offset_top(parent_id) - parent.scroll_top + el.top,
            None => el.top,
        }
    }

    fn height(&self, target: ScrollTarget) -> f64 {
        match target {
            ScrollTarget::Viewport => self.viewport_height,
            ScrollTarget::Element(id) => self.element(id).map_or(0.0, |el| el.height),
        }
    }

    fn scroll_top(&self, target: ScrollTarget) -> f64 {
        match target {
            ScrollTarget::Viewport => self.viewport_scroll_top,
            ScrollTarget::Element(id) => self.element(id).map_or(0.0, |el| el.scroll_top),
        }
    }

    fn set_scroll_top(&mut self, target: ScrollTarget, value: f64) {
        match target {
            ScrollTarget::Viewport => {
                self.viewport_scroll_top = value.clamp(0.0, self.max_viewport_scroll());
            }
            ScrollTarget::Element(id) => {
                if let Some(el) = self.element_mut(id) {
                    el.scroll_top = value.clamp(0.0, el.max_scroll());
                }
            }
        }
    }

    fn scroll_height(&self, target: ScrollTarget) -> f64 {
        match target {
            ScrollTarget::Viewport => self.content_height,
            ScrollTarget::Element(id) => self.element(id).map_or(0.0, |el| el.scroll_height),
        }
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_matches_exact_tokens() {
        let mut doc = Document::new(100.0);
        let a = doc.insert(Element::new(0.0, 10.0).selector(".item"));
        let b = doc.insert(Element::new(10.0, 10.0).selector(".item").selector("#last"));

        assert_eq!(doc.query_selector_all(".item"), vec![a, b]);
        assert_eq!(doc.query_selector_all("#last"), vec![b]);
        assert!(doc.query_selector_all(".it").is_empty());
    }

    #[test]
    fn child_offset_follows_parent_scroll() {
        let mut doc = Document::new(500.0);
        let feed = doc.insert(
            Element::new(50.0, 200.0)
                .selector("#feed")
                .content_height(1000.0),
        );
        let loader = doc.insert(Element::new(900.0, 20.0).child_of(feed));
        let target = ScrollTarget::Element(feed);

        assert_eq!(doc.offset_top(loader), 950.0);
        doc.set_scroll_top(target, 300.0);
        assert_eq!(doc.offset_top(loader), 650.0);
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut doc = Document::new(100.0);
        doc.set_content_height(250.0);

        doc.set_scroll_top(ScrollTarget::Viewport, 1000.0);
        assert_eq!(doc.scroll_top(ScrollTarget::Viewport), 150.0);

        doc.scroll_by(ScrollTarget::Viewport, -500.0);
        assert_eq!(doc.scroll_top(ScrollTarget::Viewport), 0.0);
    }

    #[test]
    fn shrinking_content_pulls_scroll_back() {
        let mut doc = Document::new(100.0);
        doc.set_content_height(400.0);
        doc.set_scroll_top(ScrollTarget::Viewport, 300.0);

        doc.set_content_height(200.0);
        assert_eq!(doc.scroll_top(ScrollTarget::Viewport), 100.0);
    }

    #[test]
    fn server_rendered_documents_are_not_interactive() {
        assert!(Document::new(10.0).is_interactive());
        assert!(!Document::server_rendered(10.0).is_interactive());
    }
}
