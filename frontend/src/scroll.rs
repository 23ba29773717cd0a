//! Rate-limited scroll metrics for navigation chrome.
//!
//! The host forwards raw scroll events to [`ScrollPositionTracker::on_scroll`]
//! and does what the returned [`ScrollAction`] says; reading the position is
//! left to the host so the tracker never touches the DOM.

use serde::Deserialize;

/// Past this many pixels the page counts as scrolled
pub const SCROLLED_THRESHOLD_PX: f64 = 50.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    #[default]
    Down,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_y: f64,
    pub is_scrolled: bool,
    pub is_at_top: bool,
    pub direction: ScrollDirection,
}

/// How often scroll events turn into samples
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum RateLimit {
    /// At most one sample per rendered frame
    #[default]
    AnimationFrame,
    /// At most one sample per `ms`, always including the last event
    Interval { ms: u32 },
}

/// What the host should do with a scroll event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollAction {
    /// Read the position and call `sample` right away
    SampleNow,
    /// Call `sample` from the next animation frame
    RequestFrame,
    /// Call `sample` after this many milliseconds
    SampleAfter(u32),
    /// A sample is already on its way
    Skip,
}

#[derive(Debug, Clone)]
pub struct ScrollPositionTracker {
    metrics: ScrollMetrics,
    limit: RateLimit,
    pending: bool,
    last_sample_at: Option<f64>,
}

impl ScrollPositionTracker {
    /// Start from the position the page is already at
    pub fn new(limit: RateLimit, initial_y: f64) -> Self {
        let mut tracker = Self {
            metrics: ScrollMetrics::default(),
            limit,
            pending: false,
            last_sample_at: None,
        };
        tracker.apply(initial_y);
        tracker
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub fn on_scroll(&mut self, now: f64) -> ScrollAction {
        if self.pending {
            return ScrollAction::Skip;
        }
        match self.limit {
            RateLimit::AnimationFrame => {
                self.pending = true;
                ScrollAction::RequestFrame
            }
            RateLimit::Interval { ms } => {
                let elapsed = self.last_sample_at.map(|at| now - at);
                match elapsed {
                    Some(elapsed) if elapsed < f64::from(ms) => {
                        self.pending = true;
                        ScrollAction::SampleAfter((f64::from(ms) - elapsed).ceil() as u32)
                    }
                    _ => ScrollAction::SampleNow,
                }
            }
        }
    }

    /// Record the current position. Returns the new metrics if anything changed.
    pub fn sample(&mut self, scroll_y: f64, now: f64) -> Option<ScrollMetrics> {
        self.pending = false;
        self.last_sample_at = Some(now);
        let before = self.metrics;
        self.apply(scroll_y);
        (self.metrics != before).then_some(self.metrics)
    }

    fn apply(&mut self, scroll_y: f64) {
        let previous = self.metrics.scroll_y;
        let direction = if scroll_y > previous {
            ScrollDirection::Down
        } else if scroll_y < previous {
            ScrollDirection::Up
        } else {
            self.metrics.direction
        };
        self.metrics = ScrollMetrics {
            scroll_y,
            is_scrolled: scroll_y > SCROLLED_THRESHOLD_PX,
            is_at_top: scroll_y <= 0.0,
            direction,
        };
    }
}
