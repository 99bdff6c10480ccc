//! Heuristic behavioral-action classification.
//!
//! A fixed, ordered battery of independent rules evaluated against one
//! device's session aggregates. Each rule either abstains or emits one
//! labeled, confidence-scored hypothesis; rules do not suppress each other,
//! so a chatty device can legitimately carry several hypotheses at once.
//! The thresholds are load-bearing calibration, not tunables.

use std::collections::BTreeMap;

use wifi_iotscan_core::utils::{norm01, round3};
use wifi_iotscan_core::{Confidence, Frame, FrameType, MacAddr};

use crate::window::WindowRecord;

/// Frames shorter than this count as keep-alive-sized.
const SMALL_FRAME_MAX: u32 = 60;
/// Frames longer than this count as bulk-transfer-sized.
const LARGE_FRAME_MIN: u32 = 1000;
/// Management subtype: probe request.
const SUBTYPE_PROBE_REQUEST: u8 = 4;
/// Management subtype: association request.
const SUBTYPE_ASSOCIATION_REQUEST: u8 = 0;
/// Management subtype: authentication.
const SUBTYPE_AUTHENTICATION: u8 = 11;

/// One behavioral hypothesis for a device.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ActionSignal {
    /// Human-readable action label.
    pub action_label: &'static str,
    /// Confidence in [0, 1], rounded to 3 decimal places.
    pub confidence: Confidence,
    /// The named numeric inputs the confidence was derived from.
    pub evidence: BTreeMap<&'static str, f64>,
}

/// Per-device aggregates the rule battery is evaluated against.
///
/// Collected once per device over the session's pre-filtered frames and the
/// device's anchored windows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceAggregates {
    /// Data-frame count among frames touching the device.
    pub data_count: u64,
    /// Management-frame count.
    pub mgmt_count: u64,
    /// Control-frame count.
    pub ctrl_count: u64,
    /// `data + management + control` frame count.
    pub total_packets: u64,
    /// `data_count / total_packets`, 0.0 when no packets.
    pub data_ratio: f64,
    /// `mgmt_count / total_packets`, 0.0 when no packets.
    pub mgmt_ratio: f64,
    /// `ctrl_count / total_packets`, 0.0 when no packets.
    pub ctrl_ratio: f64,
    /// Mean frame length over all frames touching the device.
    pub avg_frame_len: Option<f64>,
    /// Frames per second over the device's observation span.
    pub packet_rate: f64,
    /// Probe-request count.
    pub probe_count: u64,
    /// Association-request count (includes authentication frames, which the
    /// pairing heuristic counts on both sides).
    pub assoc_count: u64,
    /// Authentication-frame count.
    pub auth_count: u64,
    /// Share of frames shorter than [`SMALL_FRAME_MAX`].
    pub small_frame_ratio: f64,
    /// Frames longer than [`LARGE_FRAME_MIN`].
    pub large_frame_count: u64,
    /// Frames sent to broadcast / IPv6-multicast destinations.
    pub multicast_count: u64,
    /// Anchored windows carrying an actuation or burst signature.
    pub actuation_windows: u64,
    /// Whether any anchored window carried an actuation or burst signature.
    pub spike_detected: bool,
}

impl DeviceAggregates {
    /// Collect aggregates for one device from the pre-filtered session
    /// frames and the device's anchored windows.
    #[must_use]
    pub fn collect(frames: &[&Frame], device: MacAddr, windows: &[WindowRecord]) -> Self {
        let mut agg = Self::default();

        let mut first_time: Option<f64> = None;
        let mut last_time: Option<f64> = None;
        let mut frame_count = 0_u64;
        let mut length_sum = 0_u64;
        let mut small_frames = 0_u64;

        for frame in frames {
            if !frame.involves(&device) {
                continue;
            }

            match frame.frame_type {
                FrameType::Data => agg.data_count += 1,
                FrameType::Management => agg.mgmt_count += 1,
                FrameType::Control => agg.ctrl_count += 1,
                FrameType::Other => {}
            }

            frame_count += 1;
            length_sum += u64::from(frame.length);
            if frame.length < SMALL_FRAME_MAX {
                small_frames += 1;
            }
            if frame.length > LARGE_FRAME_MIN {
                agg.large_frame_count += 1;
            }

            first_time = Some(first_time.map_or(frame.timestamp, |t: f64| t.min(frame.timestamp)));
            last_time = Some(last_time.map_or(frame.timestamp, |t: f64| t.max(frame.timestamp)));

            if frame.frame_type == FrameType::Management {
                if frame.frame_subtype == SUBTYPE_PROBE_REQUEST {
                    agg.probe_count += 1;
                }
                if frame.frame_subtype == SUBTYPE_ASSOCIATION_REQUEST
                    || frame.frame_subtype == SUBTYPE_AUTHENTICATION
                {
                    agg.assoc_count += 1;
                }
                if frame.frame_subtype == SUBTYPE_AUTHENTICATION {
                    agg.auth_count += 1;
                }
            }

            if frame
                .addr1
                .is_some_and(|dst| is_discovery_destination(&dst))
            {
                agg.multicast_count += 1;
            }
        }

        agg.total_packets = agg.data_count + agg.mgmt_count + agg.ctrl_count;
        if agg.total_packets > 0 {
            let total = agg.total_packets as f64;
            agg.data_ratio = agg.data_count as f64 / total;
            agg.mgmt_ratio = agg.mgmt_count as f64 / total;
            agg.ctrl_ratio = agg.ctrl_count as f64 / total;
        }

        if frame_count > 0 {
            agg.avg_frame_len = Some(length_sum as f64 / frame_count as f64);
            agg.small_frame_ratio = small_frames as f64 / frame_count as f64;
        }
        if frame_count > 1 {
            let duration = last_time.unwrap_or(0.0) - first_time.unwrap_or(0.0);
            if duration > 0.0 {
                agg.packet_rate = frame_count as f64 / duration;
            }
        }

        agg.actuation_windows = windows
            .iter()
            .filter(|w| w.actuation || w.burst)
            .count() as u64;
        agg.spike_detected = agg.actuation_windows > 0;

        agg
    }
}

/// Broadcast (`ff:ff:ff:*`) or IPv6-multicast (`33:33:*`) destination.
fn is_discovery_destination(addr: &MacAddr) -> bool {
    let bytes = addr.as_bytes();
    (bytes[0] == 0xff && bytes[1] == 0xff && bytes[2] == 0xff)
        || (bytes[0] == 0x33 && bytes[1] == 0x33)
}

type ActionRule = fn(&DeviceAggregates) -> Option<ActionSignal>;

/// The rule battery, in evaluation order.
const RULES: [ActionRule; 13] = [
    high_data_streaming,
    data_transmission,
    management_beaconing,
    probe_scanning,
    association_authentication,
    keep_alive,
    control_frames,
    firmware_ota,
    local_discovery,
    power_toggle,
    motion_trigger,
    idle_low_activity,
    mixed_activity,
];

/// Evaluate every rule against the aggregates and rank the results.
///
/// Signals are sorted descending by confidence; the sort is stable, so
/// equal-confidence signals keep battery order. No deduplication is
/// performed between rules.
#[must_use]
pub fn classify_actions(agg: &DeviceAggregates) -> Vec<ActionSignal> {
    let mut signals: Vec<ActionSignal> = RULES.iter().filter_map(|rule| rule(agg)).collect();
    signals.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    signals
}

fn signal(
    action_label: &'static str,
    score: f64,
    evidence: BTreeMap<&'static str, f64>,
) -> ActionSignal {
    ActionSignal {
        action_label,
        confidence: Confidence::from_score(score),
        evidence,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn high_data_streaming(agg: &DeviceAggregates) -> Option<ActionSignal> {
    let avg = agg.avg_frame_len?;
    if !(agg.data_ratio > 0.7 && agg.packet_rate > 1.0 && avg > 400.0) {
        return None;
    }
    let score = 0.6 * norm01(agg.data_ratio, 0.7, 1.0)
        + 0.3 * norm01(agg.packet_rate, 1.0, 10.0)
        + 0.1 * norm01(avg, 400.0, 1500.0);
    Some(signal(
        "High Data / Streaming",
        score,
        BTreeMap::from([
            ("data_ratio", round3(agg.data_ratio)),
            ("avg_frame_len", round1(avg)),
            ("pkt_rate", round2(agg.packet_rate)),
            ("total_packets", agg.total_packets as f64),
        ]),
    ))
}

fn data_transmission(agg: &DeviceAggregates) -> Option<ActionSignal> {
    if !(agg.data_ratio > 0.3 && agg.total_packets > 20) {
        return None;
    }
    let score = 0.5 * norm01(agg.data_ratio, 0.3, 0.7)
        + 0.3 * norm01(agg.total_packets as f64, 20.0, 500.0)
        + 0.2 * norm01(agg.avg_frame_len.unwrap_or(0.0), 80.0, 1000.0);
    let mut evidence = BTreeMap::from([
        ("data_ratio", round3(agg.data_ratio)),
        ("total_packets", agg.total_packets as f64),
    ]);
    if let Some(avg) = agg.avg_frame_len {
        evidence.insert("avg_frame_len", round1(avg));
    }
    Some(signal("Data Transmission", score, evidence))
}

fn management_beaconing(agg: &DeviceAggregates) -> Option<ActionSignal> {
    if !(agg.mgmt_ratio > 0.6 || (agg.mgmt_ratio > 0.3 && agg.total_packets < 50)) {
        return None;
    }
    let score = 0.6 * norm01(agg.mgmt_ratio, 0.3, 1.0)
        + 0.4 * norm01(agg.total_packets as f64, 0.0, 200.0);
    Some(signal(
        "Management Packets / Beaconing",
        score,
        BTreeMap::from([
            ("management_ratio", round3(agg.mgmt_ratio)),
            ("total_packets", agg.total_packets as f64),
        ]),
    ))
}

fn probe_scanning(agg: &DeviceAggregates) -> Option<ActionSignal> {
    if agg.probe_count <= 5 {
        return None;
    }
    let score = (agg.probe_count as f64 / 50.0 + 0.3).min(1.0);
    Some(signal(
        "Probe / Scanning",
        score,
        BTreeMap::from([("probe_count", agg.probe_count as f64)]),
    ))
}

fn association_authentication(agg: &DeviceAggregates) -> Option<ActionSignal> {
    let pairing_frames = agg.assoc_count + agg.auth_count;
    if pairing_frames <= 2 {
        return None;
    }
    let score = (pairing_frames as f64 / 10.0 + 0.4).min(1.0);
    Some(signal(
        "Association / Authentication (Pairing)",
        score,
        BTreeMap::from([
            ("assoc_count", agg.assoc_count as f64),
            ("auth_count", agg.auth_count as f64),
        ]),
    ))
}

fn keep_alive(agg: &DeviceAggregates) -> Option<ActionSignal> {
    if !(agg.small_frame_ratio > 0.5 && agg.total_packets > 10 && agg.data_ratio < 0.2) {
        return None;
    }
    let score = 0.6 * norm01(agg.small_frame_ratio, 0.5, 1.0)
        + 0.4 * norm01(agg.total_packets as f64, 10.0, 200.0);
    Some(signal(
        "Keep-Alive / Heartbeat",
        score,
        BTreeMap::from([
            ("small_frame_ratio", round3(agg.small_frame_ratio)),
            ("total_packets", agg.total_packets as f64),
        ]),
    ))
}

fn control_frames(agg: &DeviceAggregates) -> Option<ActionSignal> {
    if agg.ctrl_ratio <= 0.25 {
        return None;
    }
    let score = (agg.ctrl_ratio * 1.2).min(1.0);
    Some(signal(
        "Control Frames (ACK / RTS / CTS)",
        score,
        BTreeMap::from([
            ("control_ratio", round3(agg.ctrl_ratio)),
            ("total_packets", agg.total_packets as f64),
        ]),
    ))
}

fn firmware_ota(agg: &DeviceAggregates) -> Option<ActionSignal> {
    if !(agg.data_ratio > 0.6 && agg.large_frame_count > 50) {
        return None;
    }
    let score = (0.4 + norm01(agg.large_frame_count as f64, 50.0, 500.0)).min(1.0);
    Some(signal(
        "Firmware / OTA (possible)",
        score,
        BTreeMap::from([
            ("large_frames", agg.large_frame_count as f64),
            ("data_ratio", round3(agg.data_ratio)),
        ]),
    ))
}

fn local_discovery(agg: &DeviceAggregates) -> Option<ActionSignal> {
    if agg.multicast_count <= 5 {
        return None;
    }
    let score = (0.3 + norm01(agg.multicast_count as f64, 5.0, 200.0)).min(1.0);
    Some(signal(
        "ARP / Local Discovery (possible)",
        score,
        BTreeMap::from([("mcast_count", agg.multicast_count as f64)]),
    ))
}

fn power_toggle(agg: &DeviceAggregates) -> Option<ActionSignal> {
    if !(agg.actuation_windows > 0 && (agg.total_packets < 200 || agg.data_ratio < 0.2)) {
        return None;
    }
    let score = (0.3 + norm01(agg.actuation_windows as f64, 1.0, 10.0)).min(1.0);
    Some(signal(
        "Power Toggle / Actuation",
        score,
        BTreeMap::from([
            ("actuation_windows", agg.actuation_windows as f64),
            ("total_packets", agg.total_packets as f64),
        ]),
    ))
}

fn motion_trigger(agg: &DeviceAggregates) -> Option<ActionSignal> {
    if !(agg.spike_detected && agg.total_packets < 300) {
        return None;
    }
    Some(signal(
        "Motion Trigger",
        0.5,
        BTreeMap::from([
            ("spike_detected", 1.0),
            ("total_packets", agg.total_packets as f64),
        ]),
    ))
}

fn idle_low_activity(agg: &DeviceAggregates) -> Option<ActionSignal> {
    if !(agg.total_packets < 10 && agg.data_ratio < 0.2) {
        return None;
    }
    let score = (0.8 - 0.05 * agg.total_packets as f64).min(1.0);
    Some(signal(
        "Idle / Low Activity",
        score,
        BTreeMap::from([("total_packets", agg.total_packets as f64)]),
    ))
}

fn mixed_activity(agg: &DeviceAggregates) -> Option<ActionSignal> {
    let three_way =
        agg.data_ratio > 0.15 && agg.mgmt_ratio > 0.15 && agg.ctrl_ratio > 0.05;
    let two_way = agg.data_ratio > 0.2 && agg.mgmt_ratio > 0.2;
    if !(three_way || two_way) {
        return None;
    }
    let score = (0.4 + 0.5 * (agg.data_ratio + agg.mgmt_ratio)).min(1.0);
    Some(signal(
        "Mixed Activity",
        score,
        BTreeMap::from([
            ("data_ratio", round3(agg.data_ratio)),
            ("management_ratio", round3(agg.mgmt_ratio)),
            ("control_ratio", round3(agg.ctrl_ratio)),
        ]),
    ))
}
