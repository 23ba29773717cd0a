//! Capabilities the navigation core needs from its host.
//!
//! The browser implementations live in [`crate::dom`]; tests use the fakes
//! in [`fake`].

use crate::spy::SectionId;

/// Reports how much of each watched section is visible.
///
/// The host delivers batches of samples back to the tracker on its own
/// schedule; this trait only covers registration.
pub trait ViewportObserver {
    /// Start watching the element bound to `section`.
    /// Returns `false` when no such element exists right now.
    fn observe(&mut self, section: &SectionId) -> bool;

    /// Stop watching every element. No batch may be delivered afterwards.
    fn disconnect(&mut self);
}

/// Page scroll position and animated scrolling.
pub trait ScrollSource {
    /// Current vertical scroll offset of the page
    fn scroll_y(&self) -> f64;

    /// Top edge of the section's element relative to the viewport
    fn section_top(&self, section: &SectionId) -> Option<f64>;

    /// Animate to `top` and call `on_settled` once the scroll has come to rest
    fn smooth_scroll_to(&self, top: f64, on_settled: Box<dyn FnOnce()>);
}

#[cfg(test)]
pub mod fake {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;

    /// Observer over a fixed set of existing element ids
    #[derive(Clone, Default)]
    pub struct FakeObserver {
        pub present: Vec<&'static str>,
        pub observed: Rc<RefCell<Vec<SectionId>>>,
        pub disconnects: Rc<Cell<usize>>,
    }

    impl FakeObserver {
        pub fn with_elements(present: &[&'static str]) -> Self {
            Self {
                present: present.to_vec(),
                ..Self::default()
            }
        }
    }

    impl ViewportObserver for FakeObserver {
        fn observe(&mut self, section: &SectionId) -> bool {
            if !self.present.iter().any(|id| *id == section.as_str()) {
                return false;
            }
            self.observed.borrow_mut().push(section.clone());
            true
        }

        fn disconnect(&mut self) {
            self.disconnects.set(self.disconnects.get() + 1);
            self.observed.borrow_mut().clear();
        }
    }

    /// Page with fixed section positions. Scrolls jump instantly; the settle
    /// callback is held until the test releases it.
    #[derive(Default)]
    pub struct FakePage {
        pub scroll_y: Cell<f64>,
        pub tops: HashMap<&'static str, f64>,
        pub scrolls: RefCell<Vec<f64>>,
        pub settle: RefCell<Option<Box<dyn FnOnce()>>>,
    }

    impl FakePage {
        /// `tops` are document offsets; viewport offsets derive from scroll_y
        pub fn new(tops: &[(&'static str, f64)]) -> Self {
            Self {
                tops: tops.iter().copied().collect(),
                ..Self::default()
            }
        }

        pub fn finish_scroll(&self) {
            let settle = self.settle.borrow_mut().take();
            if let Some(settle) = settle {
                settle();
            }
        }
    }

    impl ScrollSource for FakePage {
        fn scroll_y(&self) -> f64 {
            self.scroll_y.get()
        }

        fn section_top(&self, section: &SectionId) -> Option<f64> {
            self.tops
                .get(section.as_str())
                .map(|top| top - self.scroll_y.get())
        }

        fn smooth_scroll_to(&self, top: f64, on_settled: Box<dyn FnOnce()>) {
            self.scroll_y.set(top);
            self.scrolls.borrow_mut().push(top);
            *self.settle.borrow_mut() = Some(on_settled);
        }
    }
}
