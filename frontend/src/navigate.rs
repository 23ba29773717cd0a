//! Animated jumps to a section, leaving room for the sticky header.

use log::debug;

use crate::host::ScrollSource;
use crate::spy::SectionId;

/// Height of the fixed header the target lands under
pub const DEFAULT_HEADER_OFFSET_PX: f64 = 80.0;

/// Closer than this to the target counts as already there
const SETTLED_TOLERANCE_PX: f64 = 1.0;

pub struct SmoothScrollNavigator<S: ScrollSource> {
    source: S,
}

impl<S: ScrollSource> SmoothScrollNavigator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Scroll so the section's top sits `offset` pixels below the viewport top.
    ///
    /// Returns the target position, or `None` (and does nothing) when the
    /// section has no element.
    pub fn scroll_to_section(&self, section: &SectionId, offset: f64) -> Option<f64> {
        self.scroll_to_section_then(section, offset, || ())
    }

    /// Like [`Self::scroll_to_section`], calling `on_settled` once the scroll
    /// has come to rest. `on_settled` runs right away when the page already
    /// sits at the target, and is dropped unused when the section cannot be
    /// resolved.
    pub fn scroll_to_section_then(
        &self,
        section: &SectionId,
        offset: f64,
        on_settled: impl FnOnce() + 'static,
    ) -> Option<f64> {
        let Some(top) = self.source.section_top(section) else {
            debug!("Cannot scroll to {}: no such element", section);
            return None;
        };
        let scroll_y = self.source.scroll_y();
        let target = (top + scroll_y - offset).max(0.0);
        if (target - scroll_y).abs() < SETTLED_TOLERANCE_PX {
            debug!("Already at {}", section);
            on_settled();
            return Some(target);
        }
        debug!("Scrolling to {} at {}px", section, target);
        self.source.smooth_scroll_to(target, Box::new(on_settled));
        Some(target)
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
