//! Session orchestration.
//!
//! `analyze` runs the whole pipeline over one capture: router resolution,
//! the global address pre-filter, the per-device trigger pipeline, trigger
//! pooling, confidence annotation, and the action rule battery. It is a
//! pure, infallible function: malformed or empty input degrades to empty
//! per-device results, never an error.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use wifi_iotscan_core::{
    Confidence, DeviceClass, DeviceRegistry, Frame, MacAddr, DEFAULT_SUMMARY_WINDOW,
    DEFAULT_WINDOW_SIZE,
};

use crate::actions::{classify_actions, ActionSignal, DeviceAggregates};
use crate::confidence::prediction_confidence;
use crate::features::extract_features;
use crate::filter::{filter_address_set, filter_device_router};
use crate::router::infer_router;
use crate::trigger::{assign_order, event_from_bucket, select_trigger_bucket, TriggerEvent};
use crate::window::{anchored_windows, summary_buckets};

/// Windowing parameters for one analysis session.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionConfig {
    /// Lookahead window size for frame-anchored windows, in seconds.
    pub window_size: f64,
    /// Fixed-grid summary window size, in seconds.
    pub summary_window: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            summary_window: DEFAULT_SUMMARY_WINDOW,
        }
    }
}

/// One entry of the chronological trigger sequence.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TriggerReport {
    /// Opaque identifier from the registry.
    pub device_id: String,
    /// Disambiguated display name.
    pub display_name: String,
    /// The selected trigger event.
    #[serde(flatten)]
    pub event: TriggerEvent,
    /// Frames linking the device and the router over the session.
    pub total_packets: u64,
    /// Advisory prediction confidence for this event.
    pub prediction_confidence: Confidence,
}

/// Per-device behavioral summary.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DeviceReport {
    /// Opaque identifier from the registry.
    pub device_id: String,
    /// Disambiguated display name.
    pub display_name: String,
    /// Behavioral class.
    pub device_class: DeviceClass,
    /// Normalized device address.
    pub device_address: MacAddr,
    /// Frames touching the device over the session.
    pub total_packets: u64,
    /// Whether the device produced a trigger event.
    pub triggered: bool,
    /// Ranked behavioral hypotheses, descending by confidence.
    pub action_signals: Vec<ActionSignal>,
}

/// The full output of one analysis session.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SessionReport {
    /// Chronological trigger sequence, `order` running 1..N.
    pub trigger_sequence: Vec<TriggerReport>,
    /// The resolved access point address, if supplied or inferred.
    pub router_address: Option<MacAddr>,
    /// Number of configured devices, triggered or not.
    pub total_devices: usize,
    /// Per-device behavioral summaries, in registry order.
    pub per_device: Vec<DeviceReport>,
}

/// Per-device intermediate pipeline state.
struct DeviceAnalysis {
    bucket_count: u32,
    event: Option<TriggerEvent>,
    pair_packet_count: u64,
    aggregates: DeviceAggregates,
}

/// Run the full inference pipeline over one capture.
///
/// Deterministic given identical inputs: same frame order plus same
/// registry always yields the same report.
#[must_use]
pub fn analyze(frames: &[Frame], registry: &DeviceRegistry, config: &SessionConfig) -> SessionReport {
    let configured = registry.configured_addresses();
    let router = registry
        .router_address()
        .or_else(|| infer_router(frames, &configured));

    let mut interested: HashSet<MacAddr> = configured.clone();
    if let Some(router_addr) = router {
        interested.insert(router_addr);
    }

    let all_frames: Vec<&Frame> = frames.iter().collect();
    let session_frames = filter_address_set(&all_frames, &interested);
    debug!(
        total = frames.len(),
        kept = session_frames.len(),
        "pre-filtered capture to configured addresses"
    );

    let devices = registry.resolved_devices(router);
    let mut analyses: Vec<DeviceAnalysis> = Vec::with_capacity(devices.len());

    for device in &devices {
        let pair_frames = filter_device_router(&session_frames, device);
        let records = extract_features(&pair_frames);
        let windows = anchored_windows(&records, config.window_size);
        let buckets = summary_buckets(
            &windows,
            device.device_class.trigger_signal(),
            config.summary_window,
        );

        let event = select_trigger_bucket(&buckets, device.device_class)
            .map(|bucket| event_from_bucket(device.device_class, device.device_address, bucket));

        let pair_packet_count = match router {
            Some(router_addr) => session_frames
                .iter()
                .filter(|f| f.involves(&device.device_address) && f.involves(&router_addr))
                .count() as u64,
            None => 0,
        };

        let aggregates =
            DeviceAggregates::collect(&session_frames, device.device_address, &windows);

        analyses.push(DeviceAnalysis {
            bucket_count: buckets.len() as u32,
            event,
            pair_packet_count,
            aggregates,
        });
    }

    // Pool all trigger events, sort them chronologically, and number them.
    let mut events: Vec<TriggerEvent> = analyses
        .iter()
        .filter_map(|a| a.event.clone())
        .collect();
    assign_order(&mut events);

    let device_index: HashMap<(DeviceClass, MacAddr), usize> = devices
        .iter()
        .enumerate()
        .map(|(i, d)| ((d.device_class, d.device_address), i))
        .collect();

    let trigger_sequence: Vec<TriggerReport> = events
        .into_iter()
        .filter_map(|event| {
            let idx = *device_index.get(&(event.device_class, event.device_address))?;
            let device = &devices[idx];
            let analysis = &analyses[idx];
            let confidence = prediction_confidence(
                event.trigger_count,
                analysis.bucket_count,
                analysis.aggregates.data_ratio,
                analysis.pair_packet_count,
            );
            Some(TriggerReport {
                device_id: device.device_id.clone(),
                display_name: device.display_name.clone(),
                event,
                total_packets: analysis.pair_packet_count,
                prediction_confidence: confidence,
            })
        })
        .collect();

    let per_device: Vec<DeviceReport> = devices
        .iter()
        .zip(&analyses)
        .map(|(device, analysis)| DeviceReport {
            device_id: device.device_id.clone(),
            display_name: device.display_name.clone(),
            device_class: device.device_class,
            device_address: device.device_address,
            total_packets: analysis.aggregates.total_packets,
            triggered: analysis.event.is_some(),
            action_signals: classify_actions(&analysis.aggregates),
        })
        .collect();

    SessionReport {
        trigger_sequence,
        router_address: router,
        total_devices: devices.len(),
        per_device,
    }
}
