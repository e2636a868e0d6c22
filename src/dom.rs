use std::fmt;

/// Handle to an element in a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Something that scrolls: the global viewport or a single element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollTarget {
    Viewport,
    Element(ElementId),
}

impl fmt::Display for ScrollTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Viewport => f.write_str("viewport"),
            Self::Element(id) => id.fmt(f),
        }
    }
}

/// Measurement and query capability the loader needs from its page.
///
/// Offsets are in document coordinates: `offset_top` of an element is its
/// distance from the top of the document, already accounting for any
/// scrolled ancestors.
pub trait Dom {
    /// All elements matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<ElementId>;

    fn offset_top(&self, element: ElementId) -> f64;

    /// Visible height of a scroll target.
    fn height(&self, target: ScrollTarget) -> f64;

    fn scroll_top(&self, target: ScrollTarget) -> f64;

    fn set_scroll_top(&mut self, target: ScrollTarget, value: f64);

    /// Total height of the scrollable content.
    fn scroll_height(&self, target: ScrollTarget) -> f64;

    /// False while rendering outside an interactive session (server-side
    /// rendering, snapshots); loaders never dispatch then.
    fn is_interactive(&self) -> bool {
        true
    }
}
