//! Page builders for loader and host tests.

use crate::document::{Document, Element};
use crate::dom::ElementId;

pub const LOADER_HEIGHT: f64 = 20.0;

pub fn items(range: std::ops::Range<u32>) -> Vec<u32> {
    range.collect()
}

struct Container {
    selector: String,
    top: f64,
    height: f64,
    content_height: f64,
}

/// Builds a document holding one loader element, either directly in the
/// page or inside a scrolling container.
pub struct PageBuilder {
    viewport: f64,
    content: Option<f64>,
    loader_top: f64,
    container: Option<Container>,
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PageBuilder {
    pub fn new() -> Self {
        Self {
            viewport: 500.0,
            content: None,
            loader_top: 0.0,
            container: None,
        }
    }

    pub fn viewport(mut self, height: f64) -> Self {
        self.viewport = height;
        self
    }

    pub fn content(mut self, height: f64) -> Self {
        self.content = Some(height);
        self
    }

    pub fn loader_at(mut self, top: f64) -> Self {
        self.loader_top = top;
        self
    }

    pub fn container(mut self, selector: &str, top: f64, height: f64, content_height: f64) -> Self {
        self.container = Some(Container {
            selector: selector.to_string(),
            top,
            height,
            content_height,
        });
        self
    }

    pub fn build(self) -> (Document, ElementId) {
        let (doc, loader, _) = self.build_inner();
        (doc, loader)
    }

    /// Like [`build`](Self::build), also returning the container's id.
    pub fn build_with_container(self) -> (Document, ElementId, ElementId) {
        let (doc, loader, container) = self.build_inner();
        let container = container.expect("no container configured");
        (doc, loader, container)
    }

    fn build_inner(self) -> (Document, ElementId, Option<ElementId>) {
        let mut doc = Document::new(self.viewport);
        match self.container {
            Some(c) => {
                let page_height = (c.top + c.height).max(self.viewport);
                doc.set_content_height(self.content.unwrap_or(page_height));
                let container = doc.insert(
                    Element::new(c.top, c.height)
                        .selector(c.selector)
                        .content_height(c.content_height),
                );
                let loader =
                    doc.insert(Element::new(self.loader_top, LOADER_HEIGHT).child_of(container));
                (doc, loader, Some(container))
            }
            None => {
                let page_height = (self.loader_top + LOADER_HEIGHT).max(self.viewport);
                doc.set_content_height(self.content.unwrap_or(page_height));
                let loader = doc.insert(Element::new(self.loader_top, LOADER_HEIGHT));
                (doc, loader, None)
            }
        }
    }
}
