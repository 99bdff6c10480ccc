//! Trigger event selection.
//!
//! After the summary-bucket sweep, each device contributes at most one
//! event. Most classes report the first bucket with any triggering window;
//! the air purifier instead reports the bucket with the highest trigger
//! count over the whole session (strict `>` comparison, so the earliest
//! maximal bucket wins). Devices with no triggering bucket are absent from
//! the output.

use wifi_iotscan_core::utils::round3;
use wifi_iotscan_core::{DeviceClass, MacAddr};

use crate::window::SummaryBucket;

/// One inferred actuation event for a (device class, device address) pair.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TriggerEvent {
    /// Behavioral class of the device.
    pub device_class: DeviceClass,
    /// Normalized device address.
    pub device_address: MacAddr,
    /// Selected bucket start, rounded to 3 decimal places.
    pub start: f64,
    /// Selected bucket end, rounded to 3 decimal places.
    pub end: f64,
    /// Triggering-window count of the selected bucket.
    pub trigger_count: u32,
    /// 1-based chronological index, assigned after all events are pooled.
    pub order: u32,
}

/// Pick the representative bucket for a device, per its class policy.
///
/// Returns `None` when no bucket triggered.
#[must_use]
pub fn select_trigger_bucket(
    buckets: &[SummaryBucket],
    class: DeviceClass,
) -> Option<SummaryBucket> {
    if class.selects_peak_bucket() {
        let mut best: Option<SummaryBucket> = None;
        for bucket in buckets {
            if bucket.trigger_count == 0 {
                continue;
            }
            match best {
                Some(current) if bucket.trigger_count <= current.trigger_count => {}
                _ => best = Some(*bucket),
            }
        }
        best
    } else {
        buckets.iter().copied().find(|b| b.trigger_count > 0)
    }
}

/// Build the (unordered) trigger event for a device from its selected bucket.
#[must_use]
pub fn event_from_bucket(
    class: DeviceClass,
    address: MacAddr,
    bucket: SummaryBucket,
) -> TriggerEvent {
    TriggerEvent {
        device_class: class,
        device_address: address,
        start: round3(bucket.start),
        end: round3(bucket.end),
        trigger_count: bucket.trigger_count,
        order: 0,
    }
}

/// Sort pooled events chronologically and assign 1-based order numbers.
pub fn assign_order(events: &mut [TriggerEvent]) {
    events.sort_by(|a, b| {
        a.start
            .partial_cmp(&b.start)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (idx, event) in events.iter_mut().enumerate() {
        event.order = idx as u32 + 1;
    }
}
