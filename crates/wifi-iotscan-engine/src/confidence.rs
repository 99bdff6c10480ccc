//! Prediction confidence scoring.
//!
//! A pure function combining three normalized evidence terms: how dense the
//! triggering buckets were over the session, how many packets backed each
//! summary window, and what share of the device's traffic was data frames.
//! The score is advisory metadata on emitted trigger events; it never gates
//! emission.

use wifi_iotscan_core::utils::logistic;
use wifi_iotscan_core::Confidence;

/// Weight of the trigger-density term.
const TRIGGER_DENSITY_WEIGHT: f64 = 0.6;
/// Weight of the packet-strength term.
const PACKET_STRENGTH_WEIGHT: f64 = 0.25;
/// Weight of the data-ratio term.
const DATA_RATIO_WEIGHT: f64 = 0.15;
/// Steepness of the packets-per-window logistic.
const PACKET_STRENGTH_SLOPE: f64 = 0.7;

/// Compute the prediction confidence for one device's trigger event.
///
/// - `trigger_count`: triggering windows in the selected summary bucket.
/// - `total_windows`: summary buckets spanned by the device's session.
/// - `data_ratio`: data-frame share of the device's traffic, clamped to
///   [0, 1]; pass 0.0 when unavailable.
/// - `total_packets`: frames linking the device and the router. Zero
///   packets means zero evidence: the score is exactly 0.0 regardless of
///   the other inputs.
///
/// The result is always in [0, 1], rounded to 3 decimal places.
#[must_use]
pub fn prediction_confidence(
    trigger_count: u32,
    total_windows: u32,
    data_ratio: f64,
    total_packets: u64,
) -> Confidence {
    if total_packets == 0 {
        return Confidence::MIN;
    }

    let trigger_density = if total_windows > 0 {
        (f64::from(trigger_count) / f64::from(total_windows)).clamp(0.0, 1.0)
    } else if trigger_count > 0 {
        1.0
    } else {
        0.0
    };

    let packets_per_window = if total_windows > 0 {
        total_packets as f64 / f64::from(total_windows)
    } else {
        total_packets as f64
    };
    let packet_strength =
        logistic(PACKET_STRENGTH_SLOPE * (packets_per_window - 1.0)).clamp(0.0, 1.0);

    let data_ratio = data_ratio.clamp(0.0, 1.0);

    let score = TRIGGER_DENSITY_WEIGHT * trigger_density
        + PACKET_STRENGTH_WEIGHT * packet_strength
        + DATA_RATIO_WEIGHT * data_ratio;
    Confidence::from_score(score)
}
