use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::config::LoaderConfig;
use crate::dom::{Dom, ElementId, ScrollTarget};
use crate::error::LoaderError;
use crate::events::{EventBus, EventKind};
use crate::guid::{Guid, IdGenerator, SequentialIds};
use crate::loader::{InfinityLoader, LoadMore, Reaction};
use crate::model::InfinityModel;
use crate::runloop::{Queue, RunLoop, Task};
use crate::time::Clock;

/// Receives load requests together with the model they are for.
///
/// The handler owns all follow-up: fetching, growing the model, flagging
/// that it reached infinity. The host re-observes the model afterwards.
pub trait ActionHandler<M> {
    fn send_action(&mut self, request: &LoadMore, model: &mut M);
}

impl<M, F> ActionHandler<M> for F
where
    F: FnMut(&LoadMore, &mut M),
{
    fn send_action(&mut self, request: &LoadMore, model: &mut M) {
        self(request, model)
    }
}

struct Mounted<M> {
    loader: InfinityLoader,
    model: M,
}

/// Lifecycle host for loaders on one page.
///
/// The owner drives it: [`dispatch`](Self::dispatch) for scroll and resize
/// events, [`tick`](Self::tick) to run debounced checks that are due, and
/// [`flush`](Self::flush) after each render to run deferred work (setup,
/// post-render re-checks, destroy completion).
///
/// A loader that destroys itself stays mounted in the `Destroyed` state so
/// its model can still be read and rendered; only [`unmount`](Self::unmount)
/// removes the entry and hands the model back.
pub struct Host<D, M> {
    dom: D,
    events: EventBus,
    run_loop: RunLoop,
    clock: Arc<dyn Clock>,
    ids: Box<dyn IdGenerator + Send>,
    mounted: BTreeMap<Guid, Mounted<M>>,
}

impl<D: Dom, M: InfinityModel> Host<D, M> {
    pub fn new(dom: D, clock: Arc<dyn Clock>) -> Self {
        Self::with_ids(dom, clock, Box::new(SequentialIds::new()))
    }

    pub fn with_ids(dom: D, clock: Arc<dyn Clock>, ids: Box<dyn IdGenerator + Send>) -> Self {
        Self {
            dom,
            events: EventBus::new(),
            run_loop: RunLoop::new(),
            clock,
            ids,
            mounted: BTreeMap::new(),
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Direct access to the page, for layout changes. Scrolling through
    /// here fires no events; use [`scroll_to`](Self::scroll_to) for that.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn loader(&self, guid: Guid) -> Option<&InfinityLoader> {
        self.mounted.get(&guid).map(|m| &m.loader)
    }

    pub fn model(&self, guid: Guid) -> Option<&M> {
        self.mounted.get(&guid).map(|m| &m.model)
    }

    pub fn guids(&self) -> impl Iterator<Item = Guid> + '_ {
        self.mounted.keys().copied()
    }

    /// Insert a loader for `element`. Setup is deferred to the next
    /// [`flush`](Self::flush).
    pub fn mount(&mut self, element: ElementId, config: LoaderConfig, model: M) -> Guid {
        let guid = self.ids.next_guid();
        let loader = InfinityLoader::new(guid, element, config, &model);
        self.mounted.insert(guid, Mounted { loader, model });
        self.run_loop
            .schedule(Queue::RouterTransitions, guid, Task::Setup);
        debug!(%guid, %element, "mounted");
        guid
    }

    /// Tear a loader down and remove it, handing back its model.
    pub fn unmount(&mut self, guid: Guid) -> Option<M> {
        let mut mounted = self.mounted.remove(&guid)?;
        mounted.loader.teardown(&mut self.events);
        mounted.loader.finish_destroy();
        self.run_loop.cancel_all(guid);
        debug!(%guid, "unmounted");
        Some(mounted.model)
    }

    /// Mutate a model, then let its loader react to the change.
    pub fn update_model<R>(&mut self, guid: Guid, f: impl FnOnce(&mut M) -> R) -> Option<R> {
        let mounted = self.mounted.get_mut(&guid)?;
        let out = f(&mut mounted.model);
        let reaction = mounted
            .loader
            .observe(&mounted.model, &mut self.dom, &mut self.events);
        self.react(guid, reaction);
        Some(out)
    }

    pub fn set_destroy_on_infinity(&mut self, guid: Guid, enabled: bool) {
        if let Some(mounted) = self.mounted.get_mut(&guid) {
            let reaction = mounted
                .loader
                .set_destroy_on_infinity(enabled, &mounted.model, &mut self.events);
            self.react(guid, reaction);
        }
    }

    /// Deliver an event to every loader listening on `target`. Returns how
    /// many loaders took it.
    pub fn dispatch(&mut self, target: ScrollTarget, kind: EventKind) -> usize {
        let now = self.clock.now();
        let mut delivered = 0;
        for guid in self.events.listeners(target, kind) {
            if let Some(mounted) = self.mounted.get_mut(&guid)
                && mounted.loader.handle_event(kind, now)
            {
                delivered += 1;
            }
        }
        trace!(%target, event = %kind, delivered, "dispatched");
        delivered
    }

    /// Scroll `target` and fire a scroll event on it.
    pub fn scroll_to(&mut self, target: ScrollTarget, value: f64) -> usize {
        self.dom.set_scroll_top(target, value);
        self.dispatch(target, EventKind::Scroll)
    }

    /// Earliest pending debounce deadline across all loaders.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.mounted
            .values()
            .filter_map(|m| m.loader.next_deadline())
            .min()
    }

    /// Run debounced checks that are due. Returns the number of actions sent.
    pub fn tick(&mut self, actions: &mut impl ActionHandler<M>) -> usize {
        let now = self.clock.now();
        let requests: Vec<LoadMore> = self
            .mounted
            .values_mut()
            .filter_map(|m| m.loader.poll(now, &self.dom))
            .collect();
        let sent = requests.len();
        for request in requests {
            self.send(request, actions);
        }
        sent
    }

    /// Drain deferred work. Returns the number of actions sent.
    ///
    /// A loader whose setup fails is removed and its error returned; work
    /// still queued for other loaders runs on the next flush.
    pub fn flush(&mut self, actions: &mut impl ActionHandler<M>) -> Result<usize, LoaderError> {
        let mut sent = 0;
        while let Some((queue, guid, task)) = self.run_loop.next() {
            let Some(mounted) = self.mounted.get_mut(&guid) else {
                continue;
            };
            trace!(?queue, %guid, ?task, "run");
            let request = match task {
                Task::Setup => match mounted.loader.setup(&self.dom, &mut self.events) {
                    Ok(request) => request,
                    Err(e) => {
                        warn!(%guid, error = %e, "setup failed");
                        self.mounted.remove(&guid);
                        self.run_loop.cancel_all(guid);
                        return Err(e);
                    }
                },
                Task::LoadMoreIfNeeded => mounted.loader.load_more_if_needed(&self.dom),
                Task::FinishDestroy => {
                    mounted.loader.finish_destroy();
                    None
                }
            };
            if let Some(request) = request {
                self.send(request, actions);
                sent += 1;
            }
        }
        Ok(sent)
    }

    fn send(&mut self, request: LoadMore, actions: &mut impl ActionHandler<M>) {
        let guid = request.loader;
        let Some(mounted) = self.mounted.get_mut(&guid) else {
            return;
        };
        if !mounted.loader.is_active() {
            return;
        }
        actions.send_action(&request, &mut mounted.model);
        let reaction = mounted
            .loader
            .observe(&mounted.model, &mut self.dom, &mut self.events);
        self.react(guid, reaction);
    }

    fn react(&mut self, guid: Guid, reaction: Reaction) {
        if reaction.destroyed {
            self.run_loop.cancel_all(guid);
            self.run_loop
                .schedule(Queue::Destroy, guid, Task::FinishDestroy);
        } else if reaction.recheck_after_render {
            self.run_loop
                .schedule_once(Queue::AfterRender, guid, Task::LoadMoreIfNeeded);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::ScrollableOption;
    use crate::document::{Document, Element};
    use crate::loader::LoaderState;
    use crate::model::PagedModel;
    use crate::test_utils::{PageBuilder, items};
    use crate::time::{ManualClock, manual_clock};

    type Model = PagedModel<u32>;

    const DEBOUNCE: Duration = Duration::from_millis(10);

    /// Records every action it receives without touching the model.
    #[derive(Default)]
    struct Recorder {
        sent: Vec<(String, Guid, usize)>,
    }

    impl ActionHandler<Model> for Recorder {
        fn send_action(&mut self, request: &LoadMore, model: &mut Model) {
            self.sent
                .push((request.action.clone(), request.loader, model.len()));
        }
    }

    fn host_for(doc: Document) -> (Host<Document, Model>, Arc<ManualClock>) {
        let clock = manual_clock();
        let host = Host::new(doc, clock.clone());
        (host, clock)
    }

    fn long_page() -> (Document, ElementId) {
        PageBuilder::new()
            .viewport(500.0)
            .content(1020.0)
            .loader_at(1000.0)
            .build()
    }

    #[test]
    fn scrolling_to_bottom_dispatches_once_per_window() {
        let (doc, el) = long_page();
        let (mut host, clock) = host_for(doc);
        let mut recorder = Recorder::default();
        let mut model = Model::new();
        model.push_page(items(0..50));
        let guid = host.mount(el, LoaderConfig::default(), model);

        assert_eq!(host.flush(&mut recorder).unwrap(), 0);
        assert_eq!(host.loader(guid).unwrap().state(), LoaderState::Active);

        host.scroll_to(ScrollTarget::Viewport, 520.0);
        clock.advance(Duration::from_millis(3));
        host.scroll_to(ScrollTarget::Viewport, 520.0);
        assert_eq!(host.tick(&mut recorder), 0);

        clock.advance(DEBOUNCE);
        assert_eq!(host.tick(&mut recorder), 1);
        assert_eq!(recorder.sent, vec![("infinityLoad".to_string(), guid, 50)]);

        // more scrolling inside the next window waits for the window
        host.scroll_to(ScrollTarget::Viewport, 519.0);
        clock.advance(Duration::from_millis(5));
        assert_eq!(host.tick(&mut recorder), 0);
        clock.advance(Duration::from_millis(5));
        assert_eq!(host.tick(&mut recorder), 1);
        assert_eq!(recorder.sent.len(), 2);
    }

    #[test]
    fn next_deadline_tracks_pending_checks() {
        let (doc, el) = long_page();
        let (mut host, clock) = host_for(doc);
        let guid = host.mount(el, LoaderConfig::default(), Model::new());
        host.flush(&mut Recorder::default()).unwrap();
        assert_eq!(host.next_deadline(), None);

        host.dispatch(ScrollTarget::Viewport, EventKind::Resize);
        assert_eq!(host.next_deadline(), Some(clock.now() + DEBOUNCE));
        assert!(host.loader(guid).is_some());
    }

    #[test]
    fn unmount_cancels_scheduled_check() {
        let (doc, el) = long_page();
        let (mut host, clock) = host_for(doc);
        let mut recorder = Recorder::default();
        let guid = host.mount(el, LoaderConfig::default(), Model::new());
        host.flush(&mut recorder).unwrap();

        host.scroll_to(ScrollTarget::Viewport, 520.0);
        let model = host.unmount(guid);
        clock.advance(Duration::from_secs(1));

        assert!(model.is_some());
        assert_eq!(host.tick(&mut recorder), 0);
        assert!(recorder.sent.is_empty());
        assert!(host.events().is_empty());
    }

    #[test]
    fn unmount_before_setup_skips_setup() {
        let (doc, el) = PageBuilder::new().loader_at(10.0).build();
        let (mut host, _clock) = host_for(doc);
        let mut recorder = Recorder::default();
        let guid = host.mount(el, LoaderConfig::default(), Model::new());

        host.unmount(guid);
        assert_eq!(host.flush(&mut recorder).unwrap(), 0);
        assert!(host.events().is_empty());
    }

    #[test]
    fn setup_dispatches_when_loader_is_visible() {
        let (doc, el) = PageBuilder::new().viewport(500.0).loader_at(10.0).build();
        let (mut host, _clock) = host_for(doc);
        let mut recorder = Recorder::default();
        let guid = host.mount(el, LoaderConfig::default(), Model::new());

        assert_eq!(host.flush(&mut recorder).unwrap(), 1);
        assert_eq!(recorder.sent[0].1, guid);
    }

    #[test]
    fn development_mode_never_dispatches() {
        let (doc, el) = PageBuilder::new().viewport(500.0).loader_at(10.0).build();
        let (mut host, clock) = host_for(doc);
        let mut recorder = Recorder::default();
        let config = LoaderConfig {
            development_mode: true,
            ..Default::default()
        };
        host.mount(el, config, Model::new());

        host.flush(&mut recorder).unwrap();
        for _ in 0..3 {
            host.dispatch(ScrollTarget::Viewport, EventKind::Scroll);
            clock.advance(DEBOUNCE);
            host.tick(&mut recorder);
        }
        assert!(recorder.sent.is_empty());
    }

    #[test]
    fn failed_setup_removes_loader() {
        let (doc, el) = long_page();
        let (mut host, _clock) = host_for(doc);
        let config = LoaderConfig {
            scrollable: ScrollableOption::selector("#feed"),
            ..Default::default()
        };
        let guid = host.mount(el, config, Model::new());

        let err = host.flush(&mut Recorder::default()).unwrap_err();
        assert!(matches!(err, LoaderError::NoScrollable { .. }));
        assert!(host.loader(guid).is_none());
        assert!(host.events().is_empty());
    }

    #[test]
    fn growth_rechecks_after_render_until_infinity() {
        // loader stays in reach, so each render triggers another load
        let (doc, el) = PageBuilder::new().viewport(500.0).loader_at(10.0).build();
        let (mut host, _clock) = host_for(doc);
        let mut calls = 0;
        let mut grow = |_: &LoadMore, model: &mut Model| {
            calls += 1;
            if model.pages_loaded() < 3 {
                let start = model.len() as u32;
                model.push_page(items(start..start + 10));
            } else {
                model.mark_reached_infinity();
            }
        };
        let guid = host.mount(el, LoaderConfig::default(), Model::new());

        host.flush(&mut grow).unwrap();

        assert_eq!(calls, 4);
        let model = host.model(guid).unwrap();
        assert_eq!(model.len(), 30);
        assert!(model.reached_infinity());
    }

    #[test]
    fn slow_host_sees_repeated_dispatch() {
        let (doc, el) = long_page();
        let (mut host, clock) = host_for(doc);
        let mut recorder = Recorder::default();
        host.mount(el, LoaderConfig::default(), Model::new());
        host.flush(&mut recorder).unwrap();

        for _ in 0..2 {
            host.scroll_to(ScrollTarget::Viewport, 520.0);
            clock.advance(DEBOUNCE);
            host.tick(&mut recorder);
        }
        assert_eq!(recorder.sent.len(), 2);
    }

    #[test]
    fn reached_infinity_destroys_when_configured() {
        let (doc, el) = long_page();
        let (mut host, clock) = host_for(doc);
        let mut recorder = Recorder::default();
        let config = LoaderConfig {
            destroy_on_infinity: true,
            ..Default::default()
        };
        let guid = host.mount(el, config, Model::new());
        host.flush(&mut recorder).unwrap();

        host.scroll_to(ScrollTarget::Viewport, 520.0);
        host.update_model(guid, |m| m.mark_reached_infinity());
        assert_eq!(host.loader(guid).unwrap().state(), LoaderState::Destroying);

        host.flush(&mut recorder).unwrap();
        assert_eq!(host.loader(guid).unwrap().state(), LoaderState::Destroyed);

        clock.advance(DEBOUNCE);
        assert_eq!(host.tick(&mut recorder), 0);
        assert!(host.events().is_empty());
    }

    #[test]
    fn enabling_destroy_on_complete_model_destroys() {
        let (doc, el) = long_page();
        let (mut host, _clock) = host_for(doc);
        let guid = host.mount(el, LoaderConfig::default(), Model::new());
        host.flush(&mut Recorder::default()).unwrap();

        host.update_model(guid, |m| m.mark_reached_infinity());
        assert!(host.loader(guid).unwrap().is_active());

        host.set_destroy_on_infinity(guid, true);
        assert_eq!(host.loader(guid).unwrap().state(), LoaderState::Destroying);
    }

    #[test]
    fn self_destroyed_loader_keeps_its_model_until_unmount() {
        let (doc, el) = long_page();
        let (mut host, _clock) = host_for(doc);
        let config = LoaderConfig {
            destroy_on_infinity: true,
            ..Default::default()
        };
        let guid = host.mount(el, config, Model::new());
        host.flush(&mut Recorder::default()).unwrap();

        host.update_model(guid, |m| {
            m.push_page(items(0..5));
            m.mark_reached_infinity();
        });
        host.flush(&mut Recorder::default()).unwrap();

        assert_eq!(host.loader(guid).unwrap().state(), LoaderState::Destroyed);
        assert_eq!(host.model(guid).unwrap().len(), 5);

        let model = host.unmount(guid).unwrap();
        assert!(model.reached_infinity());
        assert!(host.loader(guid).is_none());
        assert_eq!(host.guids().count(), 0);
    }

    #[test]
    fn loaders_sharing_a_scrollable_stay_independent() {
        let mut doc = Document::new(500.0);
        doc.set_content_height(2000.0);
        let top = doc.insert(Element::new(0.0, 20.0));
        let bottom = doc.insert(Element::new(1980.0, 20.0));
        let (mut host, clock) = host_for(doc);
        let mut recorder = Recorder::default();
        let a = host.mount(top, LoaderConfig::default(), Model::new());
        let b = host.mount(bottom, LoaderConfig::default(), Model::new());
        host.flush(&mut recorder).unwrap();
        recorder.sent.clear();

        host.unmount(a);
        assert_eq!(host.scroll_to(ScrollTarget::Viewport, 1500.0), 1);
        clock.advance(DEBOUNCE);
        host.tick(&mut recorder);

        assert_eq!(recorder.sent.len(), 1);
        assert_eq!(recorder.sent[0].1, b);
    }

    #[test]
    fn reverse_growth_resets_scroll_and_rechecks() {
        let (doc, el) = PageBuilder::new()
            .viewport(500.0)
            .content(3000.0)
            .loader_at(0.0)
            .build();
        let (mut host, _clock) = host_for(doc);
        let mut recorder = Recorder::default();
        let config = LoaderConfig {
            reverse: true,
            ..Default::default()
        };
        let guid = host.mount(el, config, Model::new());
        host.flush(&mut recorder).unwrap();
        assert_eq!(recorder.sent.len(), 1);

        host.update_model(guid, |m| m.prepend_page(items(0..20)));
        assert_eq!(host.dom().scroll_top(ScrollTarget::Viewport), 100.0);

        // scroll now sits below the trigger offset, so the re-check is quiet
        host.flush(&mut recorder).unwrap();
        assert_eq!(recorder.sent.len(), 1);
    }
}
