use std::time::Duration;

use infinity_loader::PagedModel;

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const DEFAULT_PAGES: usize = 8;
pub const DEFAULT_LATENCY_MS: u64 = 300;

/// One row of the demo feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: u64,
    pub title: String,
}

pub type Feed = PagedModel<Entry>;

const SUBJECTS: &[&str] = &[
    "Notes on debouncing scroll handlers",
    "Reverse timelines without the jump",
    "Measuring offsets inside nested scroll containers",
    "When the last page is empty",
    "Loading ahead of the fold",
    "Namespacing listeners per instance",
];

/// A fake paginated backend with a fixed number of pages.
#[derive(Debug, Clone)]
pub struct PageSource {
    pub page_size: usize,
    pub pages: usize,
    pub latency: Duration,
}

impl Default for PageSource {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pages: DEFAULT_PAGES,
            latency: Duration::from_millis(DEFAULT_LATENCY_MS),
        }
    }
}

impl PageSource {
    /// Entries for `page`; empty once past the last page.
    pub fn page(&self, page: usize) -> Vec<Entry> {
        if page >= self.pages {
            return Vec::new();
        }
        let start = page * self.page_size;
        (start..start + self.page_size)
            .map(|i| Entry {
                id: i as u64 + 1,
                title: SUBJECTS[i % SUBJECTS.len()].to_string(),
            })
            .collect()
    }

    pub async fn fetch_page(&self, page: usize) -> Vec<Entry> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.page(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> PageSource {
        PageSource {
            page_size: 3,
            pages: 2,
            latency: Duration::ZERO,
        }
    }

    #[test]
    fn pages_are_contiguous() {
        let source = source();
        let ids: Vec<u64> = (0..2)
            .flat_map(|p| source.page(p))
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn past_last_page_is_empty() {
        assert!(source().page(2).is_empty());
    }

    #[tokio::test]
    async fn fetch_returns_the_page() {
        let entries = source().fetch_page(1).await;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].id, 4);
    }
}
