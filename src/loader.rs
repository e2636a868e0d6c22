use std::time::Instant;

use tracing::{debug, info};

use crate::config::{LoaderConfig, ScrollableOption};
use crate::debounce::Debouncer;
use crate::dom::{Dom, ElementId, ScrollTarget};
use crate::error::LoaderError;
use crate::events::{EventBus, EventKind};
use crate::guid::Guid;
use crate::model::{InfinityModel, ModelSnapshot};

pub const CLASS_NAME: &str = "infinity-loader";
pub const REACHED_INFINITY_CLASS: &str = "reached-infinity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderState {
    #[default]
    Uninitialized,
    Active,
    Destroying,
    Destroyed,
}

/// The resolved scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scrollable {
    pub target: ScrollTarget,
    /// True when resolved from a selector rather than defaulting to the
    /// viewport.
    pub custom: bool,
}

/// A request to run the host's load action for one loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMore {
    pub loader: Guid,
    pub action: String,
}

/// What the host has to do after [`InfinityLoader::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reaction {
    /// The loader tore itself down; the host should finish removing it.
    pub destroyed: bool,
    /// Re-run the boundary check once the new items are rendered.
    pub recheck_after_render: bool,
}

/// Triggers a load action when its element scrolls into reach.
///
/// The loader sits at the end of a list (or the start, in reverse mode) and
/// watches the list's scroll container. It never touches the list itself:
/// it only tells its host when more items are wanted.
#[derive(Debug)]
pub struct InfinityLoader {
    guid: Guid,
    element: ElementId,
    config: LoaderConfig,
    scrollable: Option<Scrollable>,
    debouncer: Debouncer,
    observed: ModelSnapshot,
    state: LoaderState,
}

impl InfinityLoader {
    /// Create a loader for `element`. `model` is only read to record the
    /// baseline later changes are compared against.
    pub fn new<M: InfinityModel + ?Sized>(
        guid: Guid,
        element: ElementId,
        config: LoaderConfig,
        model: &M,
    ) -> Self {
        let debouncer = Debouncer::new(config.debounce_delay());
        Self {
            guid,
            element,
            config,
            scrollable: None,
            debouncer,
            observed: ModelSnapshot::of(model),
            state: LoaderState::Uninitialized,
        }
    }

    pub fn guid(&self) -> Guid {
        self.guid
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == LoaderState::Active
    }

    pub fn scrollable(&self) -> Option<Scrollable> {
        self.scrollable
    }

    pub fn resolve_scrollable(
        option: &ScrollableOption,
        dom: &dyn Dom,
    ) -> Result<Scrollable, LoaderError> {
        match option {
            ScrollableOption::Viewport => Ok(Scrollable {
                target: ScrollTarget::Viewport,
                custom: false,
            }),
            ScrollableOption::Selector(selector) => {
                match dom.query_selector_all(selector).as_slice() {
                    [id] => Ok(Scrollable {
                        target: ScrollTarget::Element(*id),
                        custom: true,
                    }),
                    [] => Err(LoaderError::NoScrollable {
                        selector: selector.clone(),
                    }),
                    many => Err(LoaderError::MultipleScrollables {
                        selector: selector.clone(),
                        count: many.len(),
                    }),
                }
            }
            ScrollableOption::Invalid(value) => Err(LoaderError::InvalidScrollable {
                found: value.type_str().to_string(),
            }),
        }
    }

    /// Resolve the scrollable, bind events and run a first check.
    ///
    /// Only an uninitialized loader is set up; anything else returns
    /// `Ok(None)` untouched. On error nothing is bound and the loader stays
    /// uninitialized.
    pub fn setup(
        &mut self,
        dom: &dyn Dom,
        events: &mut EventBus,
    ) -> Result<Option<LoadMore>, LoaderError> {
        if self.state != LoaderState::Uninitialized {
            debug!(guid = %self.guid, state = ?self.state, "skipping setup");
            return Ok(None);
        }
        let scrollable = Self::resolve_scrollable(&self.config.scrollable, dom)?;
        self.scrollable = Some(scrollable);
        self.bind_events(events);
        self.state = LoaderState::Active;
        info!(
            guid = %self.guid,
            target = %scrollable.target,
            reverse = self.config.reverse,
            "loader active"
        );
        Ok(self.load_more_if_needed(dom))
    }

    fn bind_events(&self, events: &mut EventBus) {
        let Some(scrollable) = self.scrollable else {
            return;
        };
        for kind in EventKind::ALL {
            events.bind(scrollable.target, kind, self.guid);
            let namespaced = format!("{kind}.{}", self.guid);
            debug!(binding = %namespaced, target = %scrollable.target, "bound");
        }
    }

    fn unbind_events(&self, events: &mut EventBus) {
        let Some(scrollable) = self.scrollable else {
            return;
        };
        for kind in EventKind::ALL {
            events.unbind(scrollable.target, kind, self.guid);
        }
        debug!(guid = %self.guid, target = %scrollable.target, "unbound");
    }

    /// Note a scroll or resize on the scrollable. The check itself runs from
    /// [`poll`](Self::poll) once the debounce delay has passed quietly.
    pub fn handle_event(&mut self, kind: EventKind, now: Instant) -> bool {
        if !self.is_active() {
            return false;
        }
        self.debouncer.trigger(now);
        debug!(guid = %self.guid, event = %kind, "debounced");
        true
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Run the debounced check if it is due.
    pub fn poll(&mut self, now: Instant, dom: &dyn Dom) -> Option<LoadMore> {
        if !self.debouncer.poll(now) {
            return None;
        }
        self.load_more_if_needed(dom)
    }

    /// Offset of the loader from the top of its scrollable's content.
    pub fn self_offset(&self, dom: &dyn Dom) -> f64 {
        let own = dom.offset_top(self.element);
        match self.scrollable.map(|s| s.target) {
            Some(target @ ScrollTarget::Element(container)) => {
                own - dom.offset_top(container) + dom.scroll_top(target)
            }
            _ => own,
        }
    }

    pub fn bottom_of_scrollable_offset(&self, dom: &dyn Dom) -> f64 {
        let target = self.target();
        dom.height(target) + dom.scroll_top(target)
    }

    pub fn trigger_point(&self, dom: &dyn Dom) -> f64 {
        self.self_offset(dom) - self.config.trigger_offset
    }

    pub fn should_load_more(&self, dom: &dyn Dom) -> bool {
        if self.config.development_mode || !dom.is_interactive() || !self.is_active() {
            return false;
        }
        if self.config.reverse {
            dom.scroll_top(self.target()) <= self.config.trigger_offset
        } else {
            self.bottom_of_scrollable_offset(dom) > self.trigger_point(dom)
        }
    }

    pub fn load_more_if_needed(&self, dom: &dyn Dom) -> Option<LoadMore> {
        if !self.should_load_more(dom) {
            return None;
        }
        debug!(guid = %self.guid, action = %self.config.load_more_action, "load more");
        Some(LoadMore {
            loader: self.guid,
            action: self.config.load_more_action.clone(),
        })
    }

    /// React to the model's current state.
    ///
    /// The two rules are independent. A length change resets the scrollable
    /// near the top in reverse mode, so prepended items do not shove the
    /// view, and asks for a re-check after render. Reaching infinity with
    /// `destroy_on_infinity` set then tears the loader down on the spot; a
    /// destroyed loader needs no re-check.
    pub fn observe<M: InfinityModel + ?Sized>(
        &mut self,
        model: &M,
        dom: &mut dyn Dom,
        events: &mut EventBus,
    ) -> Reaction {
        let current = ModelSnapshot::of(model);
        let previous = std::mem::replace(&mut self.observed, current);
        let mut reaction = Reaction::default();
        if matches!(self.state, LoaderState::Destroying | LoaderState::Destroyed) {
            return reaction;
        }

        if current.len != previous.len {
            if self.config.reverse
                && let Some(scrollable) = self.scrollable
            {
                dom.set_scroll_top(scrollable.target, self.config.reverse_scroll_reset);
            }
            reaction.recheck_after_render = true;
        }

        if current.reached_infinity
            && !previous.reached_infinity
            && self.config.destroy_on_infinity
        {
            info!(guid = %self.guid, "reached infinity, destroying");
            self.teardown(events);
            reaction.destroyed = true;
            reaction.recheck_after_render = false;
        }
        reaction
    }

    /// Change `destroy_on_infinity` at runtime; an already complete model
    /// destroys the loader immediately.
    pub fn set_destroy_on_infinity<M: InfinityModel + ?Sized>(
        &mut self,
        enabled: bool,
        model: &M,
        events: &mut EventBus,
    ) -> Reaction {
        self.config.destroy_on_infinity = enabled;
        let mut reaction = Reaction::default();
        if enabled
            && model.reached_infinity()
            && !matches!(self.state, LoaderState::Destroying | LoaderState::Destroyed)
        {
            self.teardown(events);
            reaction.destroyed = true;
        }
        reaction
    }

    /// Unbind, drop any pending check, and move to `Destroying`.
    pub fn teardown(&mut self, events: &mut EventBus) {
        if matches!(self.state, LoaderState::Destroying | LoaderState::Destroyed) {
            return;
        }
        self.unbind_events(events);
        self.debouncer.cancel();
        self.state = LoaderState::Destroying;
        info!(guid = %self.guid, "loader destroying");
    }

    pub fn finish_destroy(&mut self) {
        if self.state == LoaderState::Destroying {
            self.state = LoaderState::Destroyed;
            info!(guid = %self.guid, "loader destroyed");
        }
    }

    /// Scroll the scrollable all the way down.
    pub fn content_scroll_down(&self, dom: &mut dyn Dom) {
        let target = self.target();
        let height = dom.scroll_height(target);
        dom.set_scroll_top(target, height);
    }

    pub fn status_text<M: InfinityModel + ?Sized>(&self, model: &M) -> &str {
        if model.reached_infinity() {
            &self.config.loaded_text
        } else {
            &self.config.loading_text
        }
    }

    pub fn class_names<M: InfinityModel + ?Sized>(&self, model: &M) -> Vec<&'static str> {
        let mut classes = vec![CLASS_NAME];
        if model.reached_infinity() {
            classes.push(REACHED_INFINITY_CLASS);
        }
        classes
    }

    fn target(&self) -> ScrollTarget {
        self.scrollable.map_or(ScrollTarget::Viewport, |s| s.target)
    }
}
