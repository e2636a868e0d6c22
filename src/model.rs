/// The host-owned list a loader watches.
///
/// Loaders only read from it. Growing it (and eventually flagging that
/// everything is loaded) is the job of whoever handles the load action.
pub trait InfinityModel {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn reached_infinity(&self) -> bool;
}

/// The two values a loader reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelSnapshot {
    pub len: usize,
    pub reached_infinity: bool,
}

impl ModelSnapshot {
    pub fn of<M: InfinityModel + ?Sized>(model: &M) -> Self {
        Self {
            len: model.len(),
            reached_infinity: model.reached_infinity(),
        }
    }
}

/// A plain vector of loaded items plus the "everything loaded" flag.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedModel<T> {
    items: Vec<T>,
    pages_loaded: usize,
    reached_infinity: bool,
}

impl<T> Default for PagedModel<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pages_loaded: 0,
            reached_infinity: false,
        }
    }
}

impl<T> PagedModel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    /// Append a page. An empty page means the source is exhausted.
    pub fn push_page(&mut self, page: Vec<T>) {
        if page.is_empty() {
            self.reached_infinity = true;
            return;
        }
        self.items.extend(page);
        self.pages_loaded += 1;
    }

    /// Insert a page of older items above the current ones.
    pub fn prepend_page(&mut self, page: Vec<T>) {
        if page.is_empty() {
            self.reached_infinity = true;
            return;
        }
        self.items.splice(0..0, page);
        self.pages_loaded += 1;
    }

    pub fn mark_reached_infinity(&mut self) {
        self.reached_infinity = true;
    }
}

impl<T> InfinityModel for PagedModel<T> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn reached_infinity(&self) -> bool {
        self.reached_infinity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_grow_the_model() {
        let mut model = PagedModel::new();
        model.push_page(vec![1, 2]);
        model.push_page(vec![3]);
        assert_eq!(model.items(), &[1, 2, 3]);
        assert_eq!(model.pages_loaded(), 2);
        assert!(!model.reached_infinity());
    }

    #[test]
    fn prepend_keeps_newest_last() {
        let mut model = PagedModel::new();
        model.push_page(vec![3, 4]);
        model.prepend_page(vec![1, 2]);
        assert_eq!(model.items(), &[1, 2, 3, 4]);
    }

    #[test]
    fn empty_page_reaches_infinity() {
        let mut model: PagedModel<u32> = PagedModel::new();
        model.push_page(vec![]);
        assert!(model.reached_infinity());
        assert_eq!(ModelSnapshot::of(&model), ModelSnapshot {
            len: 0,
            reached_infinity: true
        });
    }
}
