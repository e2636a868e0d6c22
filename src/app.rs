use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use infinity_loader::{
    ActionHandler, Clock, Document, Dom, Element, ElementId, EventKind, Guid, Host,
    InfinityModel, LoadMore, LoaderConfig, LoaderState, ScrollTarget, ScrollableOption,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::source::{Entry, Feed, PageSource};
use crate::theme::ResolvedTheme;

/// Tab line plus status bar.
const CHROME_ROWS: u16 = 2;
pub const DEBUG_PANE_ROWS: u16 = 10;
const LOADER_ROWS: f64 = 1.0;

/// Selector of the feed pane when it is its own scroll container.
pub const FEED_SELECTOR: &str = "#feed";

pub enum AsyncResult {
    Page {
        generation: u64,
        loader: Guid,
        task_id: u64,
        page: usize,
        entries: Vec<Entry>,
    },
}

#[derive(Debug)]
pub struct TaskInfo {
    pub id: u64,
    pub description: String,
    pub started_at: Instant,
}

#[derive(Debug)]
pub struct LogEntry {
    pub message: String,
}

/// Debug panel state: task tracking and log messages.
#[derive(Debug, Default)]
pub struct DebugState {
    pub visible: bool,
    pub running_tasks: Vec<TaskInfo>,
    pub log: VecDeque<LogEntry>,
    next_task_id: u64,
}

impl DebugState {
    const MAX_LOG_ENTRIES: usize = 50;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, msg: impl Into<String>) {
        self.log.push_back(LogEntry {
            message: msg.into(),
        });
        if self.log.len() > Self::MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
    }

    pub fn start_task(&mut self, description: impl Into<String>) -> u64 {
        let id = self.next_task_id;
        self.next_task_id += 1;
        let desc = description.into();
        self.log(format!("Started: {}", desc));
        self.running_tasks.push(TaskInfo {
            id,
            description: desc,
            started_at: Instant::now(),
        });
        id
    }

    pub fn end_task(&mut self, id: u64, outcome: &str) {
        if let Some(pos) = self.running_tasks.iter().position(|t| t.id == id) {
            let task = self.running_tasks.remove(pos);
            let elapsed = task.started_at.elapsed();
            self.log(format!("{} {}: {:.2?}", task.description, outcome, elapsed));
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }
}

/// Page fetch bookkeeping kept by the app, not the loader.
#[derive(Debug, Default)]
pub struct FetchState {
    pub in_flight: bool,
    /// Load actions that started a fetch.
    pub dispatched: usize,
    /// Load actions dropped because a fetch was already running.
    pub ignored: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    ScrollTop,
    ScrollBottom,
    Refresh,
    ToggleDebug,
    Quit,
    UpdateViewportHeight(u16),
}

/// One visible line of the feed pane.
#[derive(Debug, PartialEq)]
pub enum Row<'a> {
    Entry(&'a Entry),
    Loader { text: &'a str, complete: bool },
    /// Where a destroyed loader used to be.
    Blank,
}

/// Handles the loader's action by fetching the next page in the background.
struct Fetcher<'a> {
    action: &'a str,
    source: &'a PageSource,
    tx: &'a mpsc::Sender<AsyncResult>,
    fetch: &'a mut FetchState,
    debug: &'a mut DebugState,
    generation: u64,
}

impl ActionHandler<Feed> for Fetcher<'_> {
    fn send_action(&mut self, request: &LoadMore, feed: &mut Feed) {
        if request.action != self.action {
            self.debug
                .log(format!("No handler for action '{}'", request.action));
            return;
        }
        // the loader may ask again before the last page lands
        if self.fetch.in_flight {
            self.fetch.ignored += 1;
            debug!(loader = %request.loader, "load already in flight");
            return;
        }
        self.fetch.in_flight = true;
        self.fetch.dispatched += 1;

        let page = feed.pages_loaded();
        let task_id = self.debug.start_task(format!("Load page {}", page + 1));
        let source = self.source.clone();
        let tx = self.tx.clone();
        let generation = self.generation;
        let loader = request.loader;

        tokio::spawn(async move {
            let entries = source.fetch_page(page).await;
            let _ = tx
                .send(AsyncResult::Page {
                    generation,
                    loader,
                    task_id,
                    page,
                    entries,
                })
                .await;
        });
    }
}

pub struct App {
    pub host: Host<Document, Feed>,
    pub loader: Guid,
    pub loader_element: ElementId,
    pub container: Option<ElementId>,
    pub config: LoaderConfig,
    pub source: PageSource,
    pub fetch: FetchState,
    pub theme: ResolvedTheme,
    pub debug: DebugState,
    pub error: Option<String>,
    pub should_quit: bool,
    // Async task management
    pub result_tx: mpsc::Sender<AsyncResult>,
    pub result_rx: mpsc::Receiver<AsyncResult>,
    pub generation: u64,
    pub viewport_height: Option<u16>,
}

impl App {
    pub fn new(
        config: LoaderConfig,
        source: PageSource,
        theme: ResolvedTheme,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::channel(10);

        let mut doc = Document::new(0.0);
        let container = matches!(config.scrollable, ScrollableOption::Selector(_))
            .then(|| doc.insert(Element::new(0.0, 0.0).selector(FEED_SELECTOR)));
        let loader_el = Element::new(0.0, LOADER_ROWS).selector(".infinity-loader");
        let loader_element = doc.insert(match container {
            Some(c) => loader_el.child_of(c),
            None => loader_el,
        });

        let mut host = Host::new(doc, clock);
        let loader = host.mount(loader_element, config.clone(), Feed::new());

        let mut app = Self {
            host,
            loader,
            loader_element,
            container,
            config,
            source,
            fetch: FetchState::default(),
            theme,
            debug: DebugState::new(),
            error: None,
            should_quit: false,
            result_tx,
            result_rx,
            generation: 0,
            viewport_height: None,
        };
        app.apply_layout(0);
        app
    }

    pub fn feed(&self) -> Option<&Feed> {
        self.host.model(self.loader)
    }

    pub fn scroll_target(&self) -> ScrollTarget {
        self.container
            .map_or(ScrollTarget::Viewport, ScrollTarget::Element)
    }

    pub fn scroll_top(&self) -> usize {
        self.host.dom().scroll_top(self.scroll_target()).max(0.0) as usize
    }

    /// Rows available to the feed pane.
    pub fn feed_height(&self) -> u16 {
        let chrome = if self.debug.visible {
            CHROME_ROWS + DEBUG_PANE_ROWS
        } else {
            CHROME_ROWS
        };
        self.viewport_height
            .map(|h| h.saturating_sub(chrome))
            .unwrap_or(0)
    }

    pub fn loader_state(&self) -> Option<LoaderState> {
        self.host.loader(self.loader).map(|l| l.state())
    }

    pub fn update(&mut self, msg: Message) {
        match msg {
            Message::ScrollDown => self.scroll_by(1.0),
            Message::ScrollUp => self.scroll_by(-1.0),
            Message::PageDown => self.scroll_by(self.half_page()),
            Message::PageUp => self.scroll_by(-self.half_page()),
            Message::ScrollTop => self.scroll_to(0.0),
            Message::ScrollBottom => self.scroll_to(f64::MAX),
            Message::Refresh => self.refresh(),
            Message::ToggleDebug => {
                self.debug.toggle();
                self.relayout();
            }
            Message::Quit => self.should_quit = true,
            Message::UpdateViewportHeight(height) => {
                if self.viewport_height.replace(height) != Some(height) {
                    self.relayout();
                }
            }
        }
    }

    /// Run deferred loader work. Call once per frame, after drawing.
    pub fn after_render(&mut self) {
        let (host, mut fetcher) = self.split();
        if let Err(e) = host.flush(&mut fetcher) {
            warn!(error = %e, "loader setup failed");
            self.debug.log(format!("Setup failed: {e}"));
            self.error = Some(e.to_string());
        }
    }

    /// Run debounced checks that are due.
    pub fn tick(&mut self) {
        let (host, mut fetcher) = self.split();
        host.tick(&mut fetcher);
    }

    pub fn handle_async_result(&mut self, result: AsyncResult) {
        match result {
            AsyncResult::Page {
                generation,
                loader,
                task_id,
                page,
                entries,
            } => {
                if generation != self.generation {
                    self.debug.end_task(task_id, "discarded (stale)");
                    return;
                }
                self.fetch.in_flight = false;
                self.debug.end_task(
                    task_id,
                    if entries.is_empty() {
                        "reached the end"
                    } else {
                        "completed"
                    },
                );
                let Some(len) = self.host.model(loader).map(|m| m.len()) else {
                    return;
                };
                // lay out the new rows first so the loader sees them
                self.apply_layout(len + entries.len());
                let reverse = self.config.reverse;
                self.host.update_model(loader, |feed| {
                    if reverse {
                        feed.prepend_page(entries);
                    } else {
                        feed.push_page(entries);
                    }
                });
                debug!(page, "page applied");
            }
        }
    }

    /// Lines of the feed pane from the current scroll position.
    pub fn visible_rows(&self) -> Vec<Row<'_>> {
        let Some(feed) = self.feed() else {
            return Vec::new();
        };
        let entries = feed.items();
        let reverse = self.config.reverse;
        let loader_row = if reverse { 0 } else { entries.len() };
        let top = self.scroll_top();

        (top..top + self.feed_height() as usize)
            .filter_map(|row| {
                if row == loader_row {
                    return Some(self.loader_row(feed));
                }
                let index = if reverse { row.checked_sub(1)? } else { row };
                entries.get(index).map(Row::Entry)
            })
            .collect()
    }

    fn loader_row<'a>(&'a self, feed: &'a Feed) -> Row<'a> {
        match self.host.loader(self.loader) {
            Some(loader)
                if matches!(
                    loader.state(),
                    LoaderState::Uninitialized | LoaderState::Active
                ) =>
            {
                Row::Loader {
                    text: loader.status_text(feed),
                    complete: feed.reached_infinity(),
                }
            }
            _ => Row::Blank,
        }
    }

    fn split(&mut self) -> (&mut Host<Document, Feed>, Fetcher<'_>) {
        (
            &mut self.host,
            Fetcher {
                action: &self.config.load_more_action,
                source: &self.source,
                tx: &self.result_tx,
                fetch: &mut self.fetch,
                debug: &mut self.debug,
                generation: self.generation,
            },
        )
    }

    fn half_page(&self) -> f64 {
        f64::from((self.feed_height() / 2).max(1))
    }

    fn scroll_by(&mut self, delta: f64) {
        let target = self.scroll_target();
        let current = self.host.dom().scroll_top(target);
        self.host.scroll_to(target, current + delta);
    }

    fn scroll_to(&mut self, value: f64) {
        let target = self.scroll_target();
        self.host.scroll_to(target, value);
    }

    fn relayout(&mut self) {
        let len = self.feed().map_or(0, |f| f.len());
        self.apply_layout(len);
        let target = self.scroll_target();
        self.host.dispatch(target, EventKind::Resize);
    }

    /// Size the page for `len` entries plus the loader row.
    fn apply_layout(&mut self, len: usize) {
        let pane = f64::from(self.feed_height());
        let content = len as f64 + LOADER_ROWS;
        let loader_top = if self.config.reverse { 0.0 } else { len as f64 };
        let target = self.scroll_target();

        let dom = self.host.dom_mut();
        dom.set_viewport_height(pane);
        match self.container {
            Some(container) => {
                dom.set_content_height(pane);
                if let Some(el) = dom.element_mut(container) {
                    el.height = pane;
                    el.scroll_height = content;
                }
            }
            None => dom.set_content_height(content),
        }
        if let Some(el) = dom.element_mut(self.loader_element) {
            el.top = loader_top;
        }
        let current = dom.scroll_top(target);
        dom.set_scroll_top(target, current);
    }

    fn refresh(&mut self) {
        self.generation += 1;
        self.host.unmount(self.loader);
        self.fetch = FetchState::default();
        self.error = None;
        self.loader = self
            .host
            .mount(self.loader_element, self.config.clone(), Feed::new());
        self.apply_layout(0);
        let target = self.scroll_target();
        self.host.dom_mut().set_scroll_top(target, 0.0);
        self.debug.log(format!("Remounted loader {}", self.loader));
    }
}
