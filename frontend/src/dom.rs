//! Browser implementations of the host capabilities.
//!
//! Every callback handed to the browser holds only a `Weak` to the state it
//! updates, so anything delivered after the owner is gone falls on the floor.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{Array, Reflect};
use web_sys::{
    AddEventListenerOptions, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, ScrollBehavior, ScrollToOptions, Window,
};

use crate::host::{ScrollSource, ViewportObserver};
use crate::scroll::{RateLimit, ScrollAction, ScrollMetrics, ScrollPositionTracker};
use crate::spy::{ActiveSectionState, IntersectionSample, SectionActivityTracker, SectionId, SpyOptions};

/// How long to wait for a smooth scroll when `scrollend` is not supported
pub const SETTLE_FALLBACK_MS: u32 = 700;

/// Upper bound on waiting for `scrollend`, e.g. when the target was unreachable
pub const SETTLE_SAFETY_MS: u32 = 3000;

/// Milliseconds on the page's monotonic clock
pub fn now() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_default()
}

fn passive(once: bool) -> AddEventListenerOptions {
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    options.set_once(once);
    options
}

type EntriesCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// `IntersectionObserver` over elements looked up by id
pub struct DomViewportObserver {
    observer: Option<IntersectionObserver>,
    _callback: EntriesCallback,
}

impl DomViewportObserver {
    pub fn new(
        options: &SpyOptions,
        mut on_batch: impl FnMut(Vec<IntersectionSample>) + 'static,
    ) -> Self {
        let callback = Closure::wrap(Box::new(move |entries: Array, _: IntersectionObserver| {
            let samples = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| {
                    IntersectionSample::new(
                        entry.target().id(),
                        entry.is_intersecting(),
                        entry.intersection_ratio(),
                    )
                })
                .collect();
            on_batch(samples);
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&options.root_margin.to_string());
        let thresholds: Array = options
            .effective_thresholds()
            .into_iter()
            .map(JsValue::from_f64)
            .collect();
        init.set_threshold(&thresholds);

        // no observer means no batches; the tracker keeps its default section
        let observer =
            match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
                Ok(observer) => Some(observer),
                Err(err) => {
                    warn!("IntersectionObserver unavailable: {:?}", err);
                    None
                }
            };

        Self {
            observer,
            _callback: callback,
        }
    }
}

impl ViewportObserver for DomViewportObserver {
    fn observe(&mut self, section: &SectionId) -> bool {
        let Some(observer) = &self.observer else {
            return false;
        };
        let element = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(section.as_str()));
        match element {
            Some(element) => {
                observer.observe(&element);
                true
            }
            None => false,
        }
    }

    fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

/// The page scroll of `window`
#[derive(Clone)]
pub struct WindowScroll {
    window: Window,
}

impl WindowScroll {
    pub fn new() -> Option<Self> {
        web_sys::window().map(|window| Self { window })
    }

    fn supports_scrollend(&self) -> bool {
        Reflect::has(&self.window, &JsValue::from_str("onscrollend")).unwrap_or(false)
    }
}

impl ScrollSource for WindowScroll {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or_default()
    }

    fn section_top(&self, section: &SectionId) -> Option<f64> {
        let element = self.window.document()?.get_element_by_id(section.as_str())?;
        Some(element.get_bounding_client_rect().top())
    }

    fn smooth_scroll_to(&self, top: f64, on_settled: Box<dyn FnOnce()>) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);

        // whichever of scrollend and the timer comes first runs the callback
        let slot = Rc::new(RefCell::new(Some(on_settled)));
        let settle = move || {
            let on_settled = slot.borrow_mut().take();
            if let Some(on_settled) = on_settled {
                on_settled();
            }
        };

        let wait_ms = if self.supports_scrollend() {
            let settle = settle.clone();
            let listener = Closure::once_into_js(settle);
            let attached = self
                .window
                .add_event_listener_with_callback_and_add_event_listener_options(
                    "scrollend",
                    listener.unchecked_ref(),
                    &passive(true),
                );
            if attached.is_ok() {
                SETTLE_SAFETY_MS
            } else {
                SETTLE_FALLBACK_MS
            }
        } else {
            SETTLE_FALLBACK_MS
        };
        Timeout::new(wait_ms, settle).forget();
    }
}

struct SpyRuntime {
    tracker: SectionActivityTracker<DomViewportObserver>,
    timer: Option<Timeout>,
}

type SpyCell = Rc<RefCell<Option<SpyRuntime>>>;

/// A started [`SectionActivityTracker`] wired to the DOM.
///
/// Dropping it disposes the tracker.
pub struct LiveSpy {
    runtime: SpyCell,
}

impl LiveSpy {
    pub fn mount(
        sections: Vec<SectionId>,
        options: SpyOptions,
        on_change: impl Fn(ActiveSectionState) + 'static,
    ) -> Self {
        let runtime: SpyCell = Rc::new(RefCell::new(None));
        let outbox: Rc<RefCell<Option<ActiveSectionState>>> = Rc::default();
        let on_change: Rc<dyn Fn(ActiveSectionState)> = Rc::new(on_change);

        let observer = DomViewportObserver::new(&options, {
            let runtime = Rc::downgrade(&runtime);
            let outbox = outbox.clone();
            let on_change = on_change.clone();
            move |samples| {
                // unmounted
                let Some(runtime) = runtime.upgrade() else {
                    return;
                };
                let changed = runtime
                    .borrow_mut()
                    .as_mut()
                    .is_some_and(|rt| rt.tracker.handle_batch(&samples, now()));
                if changed {
                    arm_timer(&runtime, &outbox, &on_change);
                }
                flush(&outbox, &on_change);
            }
        });

        let tracker = SectionActivityTracker::new(sections, options, observer).on_change({
            let outbox = outbox.clone();
            move |state: &ActiveSectionState| *outbox.borrow_mut() = Some(state.clone())
        });
        *runtime.borrow_mut() = Some(SpyRuntime {
            tracker,
            timer: None,
        });

        if let Some(rt) = runtime.borrow_mut().as_mut() {
            rt.tracker.start(now());
        }
        arm_timer(&runtime, &outbox, &on_change);
        flush(&outbox, &on_change);

        Self { runtime }
    }
}

impl Drop for LiveSpy {
    fn drop(&mut self) {
        let runtime = self.runtime.borrow_mut().take();
        if let Some(mut runtime) = runtime {
            runtime.tracker.dispose();
            let timer = runtime.timer.take();
            // the observer's closure or the timer's may be on the stack right now
            Timeout::new(0, move || drop((runtime, timer))).forget();
        }
    }
}

/// Schedule the next debounce commit, replacing any earlier timer
fn arm_timer(
    cell: &SpyCell,
    outbox: &Rc<RefCell<Option<ActiveSectionState>>>,
    on_change: &Rc<dyn Fn(ActiveSectionState)>,
) {
    let weak: Weak<RefCell<Option<SpyRuntime>>> = Rc::downgrade(cell);
    let mut guard = cell.borrow_mut();
    let Some(runtime) = guard.as_mut() else {
        return;
    };
    let Some(deadline) = runtime.tracker.next_deadline() else {
        return;
    };

    let delay = (deadline - now()).max(0.0).ceil() as u32;
    let outbox = outbox.clone();
    let on_change = on_change.clone();
    runtime.timer = Some(Timeout::new(delay, move || {
        let Some(cell) = weak.upgrade() else {
            return;
        };
        if let Some(runtime) = cell.borrow_mut().as_mut() {
            // a re-push would have replaced this timer, so the deadline is current
            runtime.tracker.tick(now().max(deadline));
        }
        flush(&outbox, &on_change);
    }));
}

/// Hand the latest state to the owner once no borrow is held
fn flush(outbox: &Rc<RefCell<Option<ActiveSectionState>>>, on_change: &Rc<dyn Fn(ActiveSectionState)>) {
    let state = outbox.borrow_mut().take();
    if let Some(state) = state {
        on_change(state);
    }
}

struct ScrollShared {
    window: Window,
    tracker: RefCell<ScrollPositionTracker>,
    trailing: RefCell<Option<Timeout>>,
    on_change: Box<dyn Fn(ScrollMetrics)>,
}

impl ScrollShared {
    fn sample(&self) {
        let scroll_y = self.window.scroll_y().unwrap_or_default();
        let changed = self.tracker.borrow_mut().sample(scroll_y, now());
        if let Some(metrics) = changed {
            (self.on_change)(metrics);
        }
    }
}

/// Passive `scroll` listener feeding a [`ScrollPositionTracker`]
pub struct ScrollListener {
    shared: Rc<ScrollShared>,
    handler: Closure<dyn FnMut()>,
}

impl ScrollListener {
    pub fn attach(limit: RateLimit, on_change: impl Fn(ScrollMetrics) + 'static) -> Option<Self> {
        let window = web_sys::window()?;
        let initial_y = window.scroll_y().unwrap_or_default();
        let shared = Rc::new(ScrollShared {
            tracker: RefCell::new(ScrollPositionTracker::new(limit, initial_y)),
            trailing: RefCell::new(None),
            on_change: Box::new(on_change),
            window,
        });

        let handler = Closure::wrap(Box::new({
            let weak = Rc::downgrade(&shared);
            move || {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                let action = shared.tracker.borrow_mut().on_scroll(now());
                match action {
                    ScrollAction::SampleNow => shared.sample(),
                    ScrollAction::RequestFrame => {
                        let weak = Rc::downgrade(&shared);
                        let frame = Closure::once_into_js(move || {
                            if let Some(shared) = weak.upgrade() {
                                shared.sample();
                            }
                        });
                        if shared
                            .window
                            .request_animation_frame(frame.unchecked_ref())
                            .is_err()
                        {
                            shared.sample();
                        }
                    }
                    ScrollAction::SampleAfter(ms) => {
                        let weak = Rc::downgrade(&shared);
                        let timer = Timeout::new(ms, move || {
                            if let Some(shared) = weak.upgrade() {
                                shared.sample();
                            }
                        });
                        // the slot only ever holds a spent timer at this point
                        *shared.trailing.borrow_mut() = Some(timer);
                    }
                    ScrollAction::Skip => {}
                }
            }
        }) as Box<dyn FnMut()>);

        if let Err(err) = shared
            .window
            .add_event_listener_with_callback_and_add_event_listener_options(
                "scroll",
                handler.as_ref().unchecked_ref(),
                &passive(false),
            )
        {
            warn!("Could not listen for scroll events: {:?}", err);
            return None;
        }

        let initial = shared.tracker.borrow().metrics();
        (shared.on_change)(initial);
        debug!("Scroll listener attached");
        Some(Self { shared, handler })
    }
}

impl Drop for ScrollListener {
    fn drop(&mut self) {
        let _ = self
            .shared
            .window
            .remove_event_listener_with_callback("scroll", self.handler.as_ref().unchecked_ref());
        self.shared.trailing.borrow_mut().take();
    }
}
