use std::fmt;

use crate::dom::ScrollTarget;
use crate::guid::Guid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    Resize,
}

impl EventKind {
    pub const ALL: [EventKind; 2] = [EventKind::Scroll, EventKind::Resize];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One listener: `kind` events on `target`, owned by `namespace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub target: ScrollTarget,
    pub kind: EventKind,
    pub namespace: Guid,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} on {}", self.kind, self.namespace, self.target)
    }
}

/// Namespaced listener registry.
///
/// Several loaders may listen on the same target; each one's bindings are
/// keyed by its own namespace so unbinding one never touches another.
#[derive(Debug, Default)]
pub struct EventBus {
    bindings: Vec<Binding>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a listener. Binding the same triple twice is a no-op.
    pub fn bind(&mut self, target: ScrollTarget, kind: EventKind, namespace: Guid) {
        let binding = Binding {
            target,
            kind,
            namespace,
        };
        if !self.bindings.contains(&binding) {
            self.bindings.push(binding);
        }
    }

    /// Remove `namespace`'s `kind` listener on `target`. Returns how many
    /// bindings were removed.
    pub fn unbind(&mut self, target: ScrollTarget, kind: EventKind, namespace: Guid) -> usize {
        let before = self.bindings.len();
        self.bindings
            .retain(|b| !(b.target == target && b.kind == kind && b.namespace == namespace));
        before - self.bindings.len()
    }

    /// Namespaces listening for `kind` on `target`, in binding order.
    pub fn listeners(&self, target: ScrollTarget, kind: EventKind) -> Vec<Guid> {
        self.bindings
            .iter()
            .filter(|b| b.target == target && b.kind == kind)
            .map(|b| b.namespace)
            .collect()
    }

    pub fn is_bound(&self, namespace: Guid) -> bool {
        self.bindings.iter().any(|b| b.namespace == namespace)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementId;

    #[test]
    fn namespaces_do_not_collide() {
        let mut bus = EventBus::new();
        let (a, b) = (Guid::new(1), Guid::new(2));

        for kind in EventKind::ALL {
            bus.bind(ScrollTarget::Viewport, kind, a);
            bus.bind(ScrollTarget::Viewport, kind, b);
        }
        assert_eq!(bus.listeners(ScrollTarget::Viewport, EventKind::Scroll), vec![a, b]);

        assert_eq!(bus.unbind(ScrollTarget::Viewport, EventKind::Scroll, a), 1);
        assert_eq!(bus.listeners(ScrollTarget::Viewport, EventKind::Scroll), vec![b]);
        assert_eq!(bus.listeners(ScrollTarget::Viewport, EventKind::Resize), vec![a, b]);
    }

    #[test]
    fn listeners_are_scoped_to_target() {
        let mut bus = EventBus::new();
        let guid = Guid::new(7);
        let feed = ScrollTarget::Element(ElementId(3));
        bus.bind(feed, EventKind::Scroll, guid);

        assert!(bus.listeners(ScrollTarget::Viewport, EventKind::Scroll).is_empty());
        assert_eq!(bus.listeners(feed, EventKind::Scroll), vec![guid]);
    }

    #[test]
    fn double_bind_and_missing_unbind_are_harmless() {
        let mut bus = EventBus::new();
        let guid = Guid::new(1);
        bus.bind(ScrollTarget::Viewport, EventKind::Scroll, guid);
        bus.bind(ScrollTarget::Viewport, EventKind::Scroll, guid);
        assert_eq!(bus.len(), 1);

        assert_eq!(bus.unbind(ScrollTarget::Viewport, EventKind::Resize, guid), 0);
        assert!(bus.is_bound(guid));
    }

    #[test]
    fn binding_display_uses_namespaced_form() {
        let binding = Binding {
            target: ScrollTarget::Viewport,
            kind: EventKind::Resize,
            namespace: Guid::new(4),
        };
        assert_eq!(binding.to_string(), "resize.infinity4 on viewport");
    }
}
