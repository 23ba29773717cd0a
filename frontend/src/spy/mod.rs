//! Scroll-spy: which page section is currently the most visible.
//!
//! A [`SectionActivityTracker`] registers every section with a
//! [`ViewportObserver`], picks the most visible intersecting section out of
//! each batch of samples the host reports, and holds the result back until it
//! has been stable for a quiet period so the navigation does not flicker.
//!
//! Nothing in here can fail: missing elements, empty batches and late
//! callbacks all degrade to "no state change".

pub mod debounce;
pub mod margin;

use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Deserializer};

use crate::host::ViewportObserver;
use debounce::Debounced;
pub use margin::{Length, RootMargin};

/// Visibility ratios the observer always reports at
pub const DEFAULT_THRESHOLDS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

pub const DEFAULT_DEBOUNCE_MS: u32 = 100;

/// Identifier of a page section, matching the element's `id` attribute
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One element's visibility as reported by the host observer
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionSample {
    pub section: SectionId,
    pub is_intersecting: bool,
    /// Visible fraction of the element, 0.0 to 1.0
    pub ratio: f64,
}

impl IntersectionSample {
    pub fn new(section: impl Into<SectionId>, is_intersecting: bool, ratio: f64) -> Self {
        Self {
            section: section.into(),
            is_intersecting,
            ratio,
        }
    }
}

/// Tracker output.
///
/// `raw` follows every batch; `debounced` only takes a value once `raw` has
/// held it for the whole quiet period. Render from [`Self::current`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActiveSectionState {
    pub raw: Option<SectionId>,
    pub debounced: Option<SectionId>,
}

impl ActiveSectionState {
    pub fn current(&self) -> Option<&SectionId> {
        self.debounced.as_ref().or(self.raw.as_ref())
    }

    pub fn is_current(&self, section: &str) -> bool {
        self.current().is_some_and(|id| id.as_str() == section)
    }
}

/// How to choose between sections reporting exactly the same ratio
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TieBreak {
    /// The section listed first in the tracked id list
    #[default]
    LowestIndex,
    /// Whichever sample the host happened to deliver first
    FirstEntry,
}

/// Tracker configuration
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpyOptions {
    /// Extra trigger ratios, merged with [`DEFAULT_THRESHOLDS`]
    #[serde(alias = "threshold", deserialize_with = "one_or_many")]
    pub thresholds: Vec<f64>,
    pub root_margin: RootMargin,
    pub debounce_ms: u32,
    pub tie_break: TieBreak,
}

impl Default for SpyOptions {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            root_margin: RootMargin::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            tie_break: TieBreak::default(),
        }
    }
}

impl SpyOptions {
    /// Sorted, de-duplicated trigger ratios to hand to the observer.
    ///
    /// The default ladder is always included so "most visible" can be told
    /// apart between partially overlapping sections.
    pub fn effective_thresholds(&self) -> Vec<f64> {
        let mut ratios: Vec<f64> = DEFAULT_THRESHOLDS
            .iter()
            .chain(&self.thresholds)
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(0.0, 1.0))
            .collect();
        ratios.sort_by(f64::total_cmp);
        ratios.dedup();
        ratios
    }
}

/// Accepts `0.5` as well as `[0.25, 0.5]`
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(f64),
        Many(Vec<f64>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(ratio) => vec![ratio],
        OneOrMany::Many(ratios) => ratios,
    })
}

type ChangeListener = Box<dyn FnMut(&ActiveSectionState)>;

/// Tracks which of an ordered list of sections is the active one.
///
/// Instances are scoped to their owner; two navigation bars get two trackers.
pub struct SectionActivityTracker<O: ViewportObserver> {
    sections: Vec<SectionId>,
    options: SpyOptions,
    observer: O,
    state: ActiveSectionState,
    debounce: Debounced<SectionId>,
    listener: Option<ChangeListener>,
    observed: usize,
    started: bool,
    disposed: bool,
}

impl<O: ViewportObserver> SectionActivityTracker<O> {
    pub fn new(sections: Vec<SectionId>, options: SpyOptions, observer: O) -> Self {
        let mut unique: Vec<SectionId> = Vec::with_capacity(sections.len());
        for id in sections {
            if unique.contains(&id) {
                warn!("Section id {} listed twice, ignoring the duplicate", id);
            } else {
                unique.push(id);
            }
        }
        Self {
            sections: unique,
            debounce: Debounced::new(options.debounce_ms),
            options,
            observer,
            state: ActiveSectionState::default(),
            listener: None,
            observed: 0,
            started: false,
            disposed: false,
        }
    }

    /// Called after every change of `raw` or `debounced`
    pub fn on_change(mut self, listener: impl FnMut(&ActiveSectionState) + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Register every section with the observer and default to the first one.
    ///
    /// Sections without an element are skipped and not picked up later; the
    /// owner has to restart the tracker for that.
    pub fn start(&mut self, now: f64) {
        if self.started || self.disposed {
            return;
        }
        self.started = true;

        for id in &self.sections {
            if self.observer.observe(id) {
                self.observed += 1;
            } else {
                debug!("No element for section {}, skipping", id);
            }
        }
        debug!(
            "Observing {} of {} sections",
            self.observed,
            self.sections.len()
        );

        if self.state.raw.is_none() {
            if let Some(first) = self.sections.first().cloned() {
                self.set_raw(first, now);
            }
        }
    }

    /// Fold one batch of samples into the state.
    /// Returns whether `raw` changed.
    pub fn handle_batch(&mut self, samples: &[IntersectionSample], now: f64) -> bool {
        if self.disposed {
            return false;
        }
        let Some(winner) = self.most_visible(samples) else {
            return false;
        };
        if self.state.raw.as_ref() == Some(winner) {
            return false;
        }
        let winner = winner.clone();
        self.set_raw(winner, now);
        true
    }

    /// Commit `raw` to `debounced` if it has been stable long enough.
    /// Returns whether `debounced` changed.
    pub fn tick(&mut self, now: f64) -> bool {
        if self.disposed {
            return false;
        }
        let Some(settled) = self.debounce.poll(now).cloned() else {
            return false;
        };
        debug!("Active section settled on {}", settled);
        self.state.debounced = Some(settled);
        self.emit();
        true
    }

    /// When the host should next call [`Self::tick`]
    pub fn next_deadline(&self) -> Option<f64> {
        if self.disposed {
            return None;
        }
        self.debounce.deadline()
    }

    /// Stop observing and go inert. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.observer.disconnect();
        self.debounce.cancel();
        self.listener = None;
        debug!("Section tracker disposed");
    }

    pub fn state(&self) -> &ActiveSectionState {
        &self.state
    }

    pub fn sections(&self) -> &[SectionId] {
        &self.sections
    }

    pub fn options(&self) -> &SpyOptions {
        &self.options
    }

    /// Number of sections that had an element at start
    pub fn observed_count(&self) -> usize {
        self.observed
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn set_raw(&mut self, id: SectionId, now: f64) {
        debug!("Active section now {}", id);
        self.debounce.push(id.clone(), now);
        self.state.raw = Some(id);
        self.emit();
    }

    fn emit(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.state);
        }
    }

    fn most_visible<'a>(&self, samples: &'a [IntersectionSample]) -> Option<&'a SectionId> {
        let mut best: Option<(&SectionId, usize, f64)> = None;

        for sample in samples {
            if !sample.is_intersecting || !sample.ratio.is_finite() {
                continue;
            }
            let Some(index) = self.sections.iter().position(|id| *id == sample.section) else {
                continue;
            };
            let ratio = sample.ratio.clamp(0.0, 1.0);

            let wins = match best {
                // an intersecting entry at ratio 0 only touches the edge
                None => ratio > 0.0,
                Some((_, best_index, best_ratio)) => {
                    ratio > best_ratio
                        || (ratio == best_ratio
                            && self.options.tie_break == TieBreak::LowestIndex
                            && index < best_index)
                }
            };
            if wins {
                best = Some((&sample.section, index, ratio));
            }
        }

        best.map(|(id, _, _)| id)
    }
}

impl<O: ViewportObserver> Drop for SectionActivityTracker<O> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::host::fake::FakeObserver;

    fn ids(list: &[&str]) -> Vec<SectionId> {
        list.iter().map(|id| SectionId::from(*id)).collect()
    }

    fn tracker(list: &[&'static str], debounce_ms: u32) -> SectionActivityTracker<FakeObserver> {
        let options = SpyOptions {
            debounce_ms,
            ..SpyOptions::default()
        };
        let mut t = SectionActivityTracker::new(ids(list), options, FakeObserver::with_elements(list));
        t.start(0.0);
        t
    }

    fn raw(t: &SectionActivityTracker<FakeObserver>) -> Option<&str> {
        t.state().raw.as_ref().map(SectionId::as_str)
    }

    fn debounced(t: &SectionActivityTracker<FakeObserver>) -> Option<&str> {
        t.state().debounced.as_ref().map(SectionId::as_str)
    }

    #[test]
    fn test_defaults_to_first_section() {
        let t = tracker(&["hero", "services"], 100);
        assert_eq!(raw(&t), Some("hero"));
        assert_eq!(debounced(&t), None);
        assert!(t.state().is_current("hero"));
    }

    #[test]
    fn test_most_visible_wins() {
        let mut t = tracker(&["a", "b"], 100);
        let changed = t.handle_batch(
            &[
                IntersectionSample::new("a", true, 0.6),
                IntersectionSample::new("b", true, 0.9),
            ],
            10.0,
        );
        assert!(changed);
        assert_eq!(raw(&t), Some("b"));
    }

    #[test]
    fn test_no_intersection_keeps_raw() {
        let mut t = tracker(&["a", "b"], 100);
        t.handle_batch(&[IntersectionSample::new("b", true, 0.5)], 0.0);
        let changed = t.handle_batch(
            &[
                IntersectionSample::new("a", false, 0.0),
                IntersectionSample::new("b", false, 0.0),
            ],
            10.0,
        );
        assert!(!changed);
        assert_eq!(raw(&t), Some("b"));
        assert!(!t.handle_batch(&[], 20.0));
        assert_eq!(raw(&t), Some("b"));
    }

    #[test]
    fn test_ignores_unknown_nan_and_edge_touching_samples() {
        let mut t = tracker(&["a", "b"], 100);
        t.handle_batch(
            &[
                IntersectionSample::new("footer", true, 1.0),
                IntersectionSample::new("b", true, f64::NAN),
                IntersectionSample::new("b", true, 0.0),
            ],
            0.0,
        );
        assert_eq!(raw(&t), Some("a"));
    }

    #[test]
    fn test_tie_prefers_lowest_index() {
        let mut t = tracker(&["a", "b", "c"], 100);
        t.handle_batch(
            &[
                IntersectionSample::new("c", true, 0.5),
                IntersectionSample::new("b", true, 0.5),
            ],
            0.0,
        );
        assert_eq!(raw(&t), Some("b"));
    }

    #[test]
    fn test_tie_first_entry_policy() {
        let options = SpyOptions {
            tie_break: TieBreak::FirstEntry,
            ..SpyOptions::default()
        };
        let list = ["a", "b", "c"];
        let mut t = SectionActivityTracker::new(ids(&list), options, FakeObserver::with_elements(&list));
        t.start(0.0);
        t.handle_batch(
            &[
                IntersectionSample::new("c", true, 0.5),
                IntersectionSample::new("b", true, 0.5),
            ],
            0.0,
        );
        assert_eq!(raw(&t), Some("c"));
    }

    #[test]
    fn test_debounce_converges_on_last_change() {
        let commits = Rc::new(RefCell::new(Vec::new()));
        let list = ["a", "b", "c", "d"];
        let options = SpyOptions {
            debounce_ms: 100,
            ..SpyOptions::default()
        };
        let mut t = SectionActivityTracker::new(ids(&list), options, FakeObserver::with_elements(&list))
            .on_change({
                let commits = commits.clone();
                let mut last = None;
                move |state: &ActiveSectionState| {
                    if state.debounced != last {
                        last = state.debounced.clone();
                        commits.borrow_mut().push(last.clone());
                    }
                }
            });
        t.start(1000.0);
        t.handle_batch(&[IntersectionSample::new("b", true, 1.0)], 1010.0);
        t.handle_batch(&[IntersectionSample::new("c", true, 1.0)], 1040.0);
        t.handle_batch(&[IntersectionSample::new("d", true, 1.0)], 1080.0);

        assert_eq!(t.next_deadline(), Some(1180.0));
        assert!(!t.tick(1100.0));
        assert!(!t.tick(1179.0));
        assert!(t.tick(1180.0));
        assert!(!t.tick(1500.0));

        assert_eq!(*commits.borrow(), vec![Some(SectionId::from("d"))]);
        assert_eq!(debounced(&t), Some("d"));
    }

    #[test]
    fn test_returning_within_quiet_period_commits_nothing() {
        let commits = Rc::new(RefCell::new(Vec::new()));
        let list = ["a", "b"];
        let mut t = SectionActivityTracker::new(ids(&list), SpyOptions::default(), FakeObserver::with_elements(&list))
            .on_change({
                let commits = commits.clone();
                let mut last = None;
                move |state: &ActiveSectionState| {
                    if state.debounced != last {
                        last = state.debounced.clone();
                        commits.borrow_mut().push(last.clone());
                    }
                }
            });
        t.start(0.0);
        t.tick(100.0);
        assert_eq!(debounced(&t), Some("a"));

        t.handle_batch(&[IntersectionSample::new("b", true, 0.8)], 200.0);
        t.handle_batch(&[IntersectionSample::new("a", true, 0.8)], 250.0);
        t.tick(350.0);
        t.tick(1000.0);

        assert_eq!(raw(&t), Some("a"));
        assert_eq!(debounced(&t), Some("a"));
        assert_eq!(*commits.borrow(), vec![Some(SectionId::from("a"))]);
    }

    #[test]
    fn test_no_updates_after_dispose() {
        let calls = Rc::new(Cell::new(0));
        let list = ["a", "b"];
        let observer = FakeObserver::with_elements(&list);
        let disconnects = observer.disconnects.clone();
        let mut t = SectionActivityTracker::new(ids(&list), SpyOptions::default(), observer)
            .on_change({
                let calls = calls.clone();
                move |_: &ActiveSectionState| calls.set(calls.get() + 1)
            });
        t.start(0.0);
        let before = calls.get();
        let snapshot = t.state().clone();

        t.dispose();
        assert_eq!(disconnects.get(), 1);
        assert!(!t.handle_batch(&[IntersectionSample::new("b", true, 1.0)], 10.0));
        assert!(!t.tick(1000.0));
        assert_eq!(t.next_deadline(), None);
        assert_eq!(calls.get(), before);
        assert_eq!(*t.state(), snapshot);

        t.dispose();
        drop(t);
        assert_eq!(disconnects.get(), 1);
    }

    #[test]
    fn test_skips_missing_elements() {
        let observer = FakeObserver::with_elements(&["hero", "contact"]);
        let observed = observer.observed.clone();
        let mut t = SectionActivityTracker::new(
            ids(&["hero", "services", "contact"]),
            SpyOptions::default(),
            observer,
        );
        t.start(0.0);
        assert_eq!(t.observed_count(), 2);
        assert_eq!(*observed.borrow(), ids(&["hero", "contact"]));
        assert_eq!(raw(&t), Some("hero"));
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let t = tracker(&["a", "b", "a"], 100);
        assert_eq!(t.sections(), ids(&["a", "b"]).as_slice());
    }

    #[test]
    fn test_empty_section_list_stays_empty() {
        let mut t = tracker(&[], 100);
        assert_eq!(*t.state(), ActiveSectionState::default());
        assert!(!t.handle_batch(&[IntersectionSample::new("x", true, 1.0)], 0.0));
        assert_eq!(t.next_deadline(), None);
    }

    #[test]
    fn test_landing_page_scenario() {
        let mut t = tracker(&["hero", "services", "contact"], 150);

        t.handle_batch(&[IntersectionSample::new("hero", true, 1.0)], 0.0);
        assert_eq!(raw(&t), Some("hero"));

        t.handle_batch(
            &[
                IntersectionSample::new("hero", true, 0.2),
                IntersectionSample::new("services", true, 0.8),
            ],
            50.0,
        );
        assert_eq!(raw(&t), Some("services"));

        t.tick(150.0);
        assert_eq!(debounced(&t), None);

        t.tick(260.0);
        assert_eq!(debounced(&t), Some("services"));
        assert!(t.state().is_current("services"));
    }

    #[test]
    fn test_effective_thresholds_merge_defaults() {
        let options = SpyOptions {
            thresholds: vec![0.3, 1.5, f64::NAN, 0.5],
            ..SpyOptions::default()
        };
        assert_eq!(
            options.effective_thresholds(),
            vec![0.0, 0.25, 0.3, 0.5, 0.75, 1.0]
        );
    }

    #[test]
    fn test_options_from_json() {
        let options: SpyOptions = serde_json::from_str(
            r#"{ "threshold": [0.3], "rootMargin": "0px 0px -60% 0px", "debounceMs": 150 }"#,
        )
        .unwrap();
        assert_eq!(options.debounce_ms, 150);
        assert_eq!(options.root_margin.bottom, Length::Percent(-60.0));
        assert_eq!(options.tie_break, TieBreak::LowestIndex);

        let single: SpyOptions = serde_json::from_str(r#"{ "threshold": 0.3 }"#).unwrap();
        assert_eq!(single.thresholds, vec![0.3]);
        assert_eq!(single.debounce_ms, DEFAULT_DEBOUNCE_MS);

        let bad = serde_json::from_str::<SpyOptions>(r#"{ "rootMargin": "wide" }"#);
        assert!(bad.is_err());
    }
}
