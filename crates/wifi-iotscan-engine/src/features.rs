//! Per-frame feature derivation.
//!
//! Each kept frame is reduced to a small set of boolean signal flags keyed
//! on frame length and arrival pattern. The flags are deliberately crude:
//! they encode the link-layer signatures observed when each supported device
//! class actuates, and the windowing stage ORs them over time to absorb
//! jitter.

use std::collections::VecDeque;

use wifi_iotscan_core::Frame;

/// Frame lengths characteristic of a plug/switch/sensor actuation.
pub const ACTUATION_LENGTHS: [u32; 2] = [269, 91];

/// Frame lengths characteristic of a power-strip actuation.
pub const STRIP_ACTUATION_LENGTHS: [u32; 3] = [301, 269, 317];

/// The repeated short-frame burst signature emitted by the air purifier:
/// alternating 24- and 10-byte frames, five times over.
pub const BURST_PATTERN: [u32; 10] = [24, 10, 24, 10, 24, 10, 24, 10, 24, 10];

/// Signal flags derived from one kept frame.
///
/// Created once during extraction and never mutated; consumed immediately
/// by the windowing stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRecord {
    /// Seconds since the first kept frame of this device's stream.
    pub relative_time: f64,
    /// Frame length in bytes.
    pub length: u32,
    /// Actuation-length signature (269 or 91 bytes).
    pub actuation: bool,
    /// Completed the repeated short-frame burst pattern.
    pub burst: bool,
    /// Power-strip actuation-length signature (301, 269, or 317 bytes).
    pub strip_actuation: bool,
    /// Retry bit from the frame control field.
    pub retry: bool,
}

/// Derive feature records from a device's filtered frame stream.
///
/// Flags are computed in original capture order; the burst detector keeps a
/// sliding buffer of the last ten kept-frame lengths and raises the flag on
/// the frame that completes [`BURST_PATTERN`]. The output is sorted by
/// `relative_time` (stable, so equal-time frames keep capture order).
#[must_use]
pub fn extract_features(frames: &[&Frame]) -> Vec<FeatureRecord> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };
    let t0 = first.timestamp;

    let mut length_buffer: VecDeque<u32> = VecDeque::with_capacity(BURST_PATTERN.len());
    let mut records = Vec::with_capacity(frames.len());

    for frame in frames {
        length_buffer.push_back(frame.length);
        if length_buffer.len() > BURST_PATTERN.len() {
            length_buffer.pop_front();
        }
        let burst =
            length_buffer.len() == BURST_PATTERN.len() && length_buffer.iter().eq(BURST_PATTERN.iter());

        records.push(FeatureRecord {
            relative_time: frame.timestamp - t0,
            length: frame.length,
            actuation: ACTUATION_LENGTHS.contains(&frame.length),
            burst,
            strip_actuation: STRIP_ACTUATION_LENGTHS.contains(&frame.length),
            retry: frame.retry,
        });
    }

    records.sort_by(|a, b| {
        a.relative_time
            .partial_cmp(&b.relative_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use wifi_iotscan_core::FrameType;

    fn frames_of_lengths(lengths: &[u32]) -> Vec<Frame> {
        lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| Frame::new(i as f64 * 0.1, len, FrameType::Data, 0))
            .collect()
    }

    fn extract(frames: &[Frame]) -> Vec<FeatureRecord> {
        let refs: Vec<&Frame> = frames.iter().collect();
        extract_features(&refs)
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(extract_features(&[]).is_empty());
    }

    #[test]
    fn actuation_flags_are_pure_functions_of_length() {
        let frames = frames_of_lengths(&[269, 91, 301, 317, 100]);
        let records = extract(&frames);

        assert!(records[0].actuation && records[0].strip_actuation); // 269 is in both sets
        assert!(records[1].actuation && !records[1].strip_actuation);
        assert!(!records[2].actuation && records[2].strip_actuation);
        assert!(!records[3].actuation && records[3].strip_actuation);
        assert!(!records[4].actuation && !records[4].strip_actuation);
    }

    #[test]
    fn extraction_is_deterministic() {
        let frames = frames_of_lengths(&[269, 10, 24, 91, 301]);
        assert_eq!(extract(&frames), extract(&frames));
    }

    #[test]
    fn relative_time_is_anchored_on_first_kept_frame() {
        let mut frames = frames_of_lengths(&[100, 100]);
        frames[0].timestamp = 5.0;
        frames[1].timestamp = 7.5;
        let records = extract(&frames);
        assert_eq!(records[0].relative_time, 0.0);
        assert!((records[1].relative_time - 2.5).abs() < 1e-12);
    }

    #[test]
    fn burst_fires_on_pattern_completion_only() {
        let mut lengths = vec![24, 10, 24, 10, 24, 10, 24, 10, 24, 10];
        lengths.extend_from_slice(&[24, 10]);
        let frames = frames_of_lengths(&lengths);
        let records = extract(&frames);

        // The first nine frames cannot complete the ten-length pattern.
        assert!(records[..9].iter().all(|r| !r.burst));
        // The tenth frame completes it; the buffer then keeps sliding, so
        // every second frame after that completes it again.
        assert!(records[9].burst);
        assert!(!records[10].burst);
        assert!(records[11].burst);
    }

    #[test]
    fn burst_requires_exact_sequence() {
        let frames = frames_of_lengths(&[24, 10, 24, 10, 24, 99, 24, 10, 24, 10]);
        let records = extract(&frames);
        assert!(records.iter().all(|r| !r.burst));
    }

    #[test]
    fn retry_bit_is_copied() {
        let frames = vec![
            Frame::new(0.0, 50, FrameType::Data, 0).with_retry(true),
            Frame::new(0.1, 50, FrameType::Data, 0),
        ];
        let records = extract(&frames);
        assert!(records[0].retry);
        assert!(!records[1].retry);
    }
}
