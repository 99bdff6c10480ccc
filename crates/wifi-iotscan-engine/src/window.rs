//! Sliding-window aggregation of per-frame features.
//!
//! Two distinct passes:
//!
//! 1. **Frame-anchored windows**: every distinct frame start time anchors a
//!    lookahead window `[t, t + window_size]`; the signal flags of all
//!    records inside are OR-reduced. Windows overlap and are not a grid.
//! 2. **Summary buckets**: a fixed, non-overlapping grid over
//!    `[0, max_window_end)` stepping `summary_window`; each bucket counts
//!    how many anchored windows starting inside it are classified as
//!    triggering for the device's class.
//!
//! The anchored pass is a single count-based two-pointer sweep over the
//! time-sorted records, so per-device cost stays linear after the sort.

use wifi_iotscan_core::TriggerSignal;

use crate::features::FeatureRecord;

/// OR-reduction of signal flags over one frame-anchored lookahead window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowRecord {
    /// Anchor time: a distinct `relative_time` from the feature stream.
    pub window_start: f64,
    /// `window_start + window_size`.
    pub window_end: f64,
    /// Any record in the window carried the actuation-length signature.
    pub actuation: bool,
    /// Any record in the window completed the burst pattern.
    pub burst: bool,
    /// Any record in the window carried the strip actuation signature.
    pub strip_actuation: bool,
}

impl WindowRecord {
    /// Whether this window counts as triggering for the given class signal.
    ///
    /// `None` (unknown device classes) never triggers.
    #[must_use]
    pub fn is_triggering(&self, signal: Option<TriggerSignal>) -> bool {
        match signal {
            Some(TriggerSignal::Actuation) => self.actuation,
            Some(TriggerSignal::Burst) => self.burst,
            Some(TriggerSignal::StripActuation) => self.strip_actuation,
            None => false,
        }
    }
}

/// One fixed-grid summary cell with its triggering-window count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryBucket {
    /// Inclusive bucket start.
    pub start: f64,
    /// Exclusive bucket end (`start + summary_window`).
    pub end: f64,
    /// Number of triggering anchored windows whose start falls inside.
    pub trigger_count: u32,
}

/// Build one lookahead window per distinct record start time.
///
/// `records` must be sorted ascending by `relative_time` (the extraction
/// stage guarantees this). Membership is the closed interval
/// `[anchor, anchor + window_size]`. Flag state is maintained with per-flag
/// counters that are incremented as records enter the sweep and decremented
/// as they leave, so no window rescans the record list.
#[must_use]
pub fn anchored_windows(records: &[FeatureRecord], window_size: f64) -> Vec<WindowRecord> {
    let n = records.len();
    let mut windows = Vec::with_capacity(n);

    let mut left = 0_usize;
    let mut right = 0_usize;
    let mut actuation_inside = 0_usize;
    let mut burst_inside = 0_usize;
    let mut strip_inside = 0_usize;

    for anchor in 0..n {
        if anchor > 0 && records[anchor].relative_time == records[anchor - 1].relative_time {
            continue;
        }
        let start = records[anchor].relative_time;
        let end = start + window_size;

        while left < anchor {
            if left < right {
                let leaving = &records[left];
                actuation_inside -= usize::from(leaving.actuation);
                burst_inside -= usize::from(leaving.burst);
                strip_inside -= usize::from(leaving.strip_actuation);
            }
            left += 1;
        }
        if right < left {
            right = left;
        }
        while right < n && records[right].relative_time <= end {
            let entering = &records[right];
            actuation_inside += usize::from(entering.actuation);
            burst_inside += usize::from(entering.burst);
            strip_inside += usize::from(entering.strip_actuation);
            right += 1;
        }

        windows.push(WindowRecord {
            window_start: start,
            window_end: end,
            actuation: actuation_inside > 0,
            burst: burst_inside > 0,
            strip_actuation: strip_inside > 0,
        });
    }

    windows
}

/// Sweep the fixed summary grid over the anchored windows.
///
/// Buckets start at 0 and step `summary_window` until the grid passes the
/// largest `window_end`. Bucket `k` covers window starts in
/// `[k * summary_window, (k + 1) * summary_window)`; starts are computed by
/// multiplication rather than repeated addition so the grid does not drift
/// over long captures.
#[must_use]
pub fn summary_buckets(
    windows: &[WindowRecord],
    signal: Option<TriggerSignal>,
    summary_window: f64,
) -> Vec<SummaryBucket> {
    if windows.is_empty() || summary_window <= 0.0 {
        return Vec::new();
    }

    let max_end = windows
        .iter()
        .map(|w| w.window_end)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut buckets = Vec::new();
    let mut next_window = 0_usize;
    for step in 0_u64.. {
        let start = step as f64 * summary_window;
        if start >= max_end {
            break;
        }
        let end = start + summary_window;

        let mut trigger_count = 0_u32;
        while next_window < windows.len() && windows[next_window].window_start < end {
            if windows[next_window].is_triggering(signal) {
                trigger_count += 1;
            }
            next_window += 1;
        }

        buckets.push(SummaryBucket {
            start,
            end,
            trigger_count,
        });
    }

    buckets
}
