use std::rc::Rc;

use yew::prelude::*;
use yew_hooks::use_is_mounted;

use crate::dom::{LiveSpy, ScrollListener, WindowScroll};
use crate::navigate::SmoothScrollNavigator;
use crate::scroll::{RateLimit, ScrollMetrics};
use crate::spy::{ActiveSectionState, SectionId, SpyOptions};

/// Which of `sections` is active. Registration starts over whenever the
/// section list or the options change.
#[hook]
pub fn use_scroll_spy(sections: Vec<SectionId>, options: SpyOptions) -> ActiveSectionState {
    let state = use_state(ActiveSectionState::default);

    {
        let setter = state.setter();
        use_effect_with_deps(
            move |(sections, options)| {
                let spy = LiveSpy::mount(sections.clone(), options.clone(), move |next| {
                    setter.set(next)
                });
                move || drop(spy)
            },
            (sections, options),
        );
    }

    (*state).clone()
}

#[hook]
pub fn use_scroll_position(limit: RateLimit) -> ScrollMetrics {
    let metrics = use_state(ScrollMetrics::default);

    {
        let setter = metrics.setter();
        use_effect_with_deps(
            move |limit| {
                let listener = ScrollListener::attach(*limit, move |next| setter.set(next));
                move || drop(listener)
            },
            limit,
        );
    }

    *metrics
}

/// Scroll actions bound to the component that created them
#[derive(Clone)]
pub struct SmoothScroll {
    offset: f64,
    is_mounted: Rc<dyn Fn() -> bool>,
}

impl SmoothScroll {
    pub fn scroll_to(&self, section: &str) {
        self.scroll_to_then(section, || ());
    }

    /// `on_settled` runs once the scroll stops, unless the component has
    /// unmounted by then or the section does not exist
    pub fn scroll_to_then(&self, section: &str, on_settled: impl FnOnce() + 'static) {
        let Some(window) = WindowScroll::new() else {
            return;
        };
        let is_mounted = self.is_mounted.clone();
        SmoothScrollNavigator::new(window).scroll_to_section_then(
            &SectionId::from(section),
            self.offset,
            move || {
                if is_mounted() {
                    on_settled();
                }
            },
        );
    }
}

#[hook]
pub fn use_smooth_scroll(offset: f64) -> SmoothScroll {
    let is_mounted = use_is_mounted();
    SmoothScroll { offset, is_mounted }
}
