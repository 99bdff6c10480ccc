//! Access-point address inference.
//!
//! When no router address is supplied, the engine infers one from
//! cross-traffic: every frame carrying exactly one configured device address
//! votes for each of its other, non-configured addresses. The address with
//! the most votes is taken as the access point for the whole session.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use wifi_iotscan_core::{Frame, MacAddr};

/// Infer the router address from frames and the configured-address set.
///
/// A frame contributes when exactly one distinct address among its fields
/// is configured; each of its other distinct, non-configured addresses is
/// tallied once. The highest tally wins; on ties, the first address to
/// reach the maximum wins (the tally iterates in first-observation order
/// under a strict `>` comparison). Returns `None` when no address was ever
/// tallied.
#[must_use]
pub fn infer_router(frames: &[Frame], configured: &HashSet<MacAddr>) -> Option<MacAddr> {
    let mut observation_order: Vec<MacAddr> = Vec::new();
    let mut tallies: HashMap<MacAddr, u64> = HashMap::new();

    for frame in frames {
        let mut distinct: Vec<MacAddr> = Vec::with_capacity(3);
        for addr in frame.addresses() {
            if !distinct.contains(&addr) {
                distinct.push(addr);
            }
        }

        let configured_hits = distinct.iter().filter(|a| configured.contains(a)).count();
        if configured_hits != 1 {
            continue;
        }

        for addr in distinct {
            if configured.contains(&addr) {
                continue;
            }
            let tally = tallies.entry(addr).or_insert_with(|| {
                observation_order.push(addr);
                0
            });
            *tally += 1;
        }
    }

    let mut best: Option<(MacAddr, u64)> = None;
    for addr in observation_order {
        let tally = tallies[&addr];
        if best.map_or(true, |(_, best_tally)| tally > best_tally) {
            best = Some((addr, tally));
        }
    }

    match best {
        Some((addr, tally)) => {
            debug!(router = %addr, tally, "inferred access point from cross-traffic");
            Some(addr)
        }
        None => {
            debug!("no access point could be inferred");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wifi_iotscan_core::FrameType;

    fn mac(last: u8) -> MacAddr {
        MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, last])
    }

    fn frame(a1: Option<MacAddr>, a2: Option<MacAddr>, a3: Option<MacAddr>) -> Frame {
        Frame::new(0.0, 100, FrameType::Data, 0).with_addresses(a1, a2, a3)
    }

    #[test]
    fn majority_partner_wins() {
        let device = mac(1);
        let x = mac(10);
        let y = mac(11);
        let configured: HashSet<MacAddr> = [device].into_iter().collect();

        let mut frames = Vec::new();
        for _ in 0..9 {
            frames.push(frame(Some(x), Some(device), None));
        }
        frames.push(frame(Some(y), Some(device), None));

        assert_eq!(infer_router(&frames, &configured), Some(x));
    }

    #[test]
    fn tie_goes_to_first_observed() {
        let device = mac(1);
        let x = mac(10);
        let y = mac(11);
        let configured: HashSet<MacAddr> = [device].into_iter().collect();

        let frames = vec![
            frame(Some(y), Some(device), None),
            frame(Some(x), Some(device), None),
            frame(Some(y), Some(device), None),
            frame(Some(x), Some(device), None),
        ];
        assert_eq!(infer_router(&frames, &configured), Some(y));
    }

    #[test]
    fn frames_with_two_configured_addresses_abstain() {
        let dev_a = mac(1);
        let dev_b = mac(2);
        let x = mac(10);
        let configured: HashSet<MacAddr> = [dev_a, dev_b].into_iter().collect();

        // Device-to-device traffic must not vote for a bystander address.
        let frames = vec![frame(Some(dev_a), Some(dev_b), Some(x))];
        assert_eq!(infer_router(&frames, &configured), None);
    }

    #[test]
    fn duplicate_address_fields_count_once() {
        let device = mac(1);
        let x = mac(10);
        let configured: HashSet<MacAddr> = [device].into_iter().collect();

        // x appears as both receiver and BSSID on the same frame: one vote.
        let y = mac(11);
        let frames = vec![
            frame(Some(x), Some(device), Some(x)),
            frame(Some(y), Some(device), None),
            frame(Some(y), Some(device), None),
        ];
        assert_eq!(infer_router(&frames, &configured), Some(y));
    }

    #[test]
    fn empty_tally_yields_none() {
        let configured: HashSet<MacAddr> = [mac(1)].into_iter().collect();
        assert_eq!(infer_router(&[], &configured), None);

        // Traffic with no configured participant abstains.
        let frames = vec![frame(Some(mac(10)), Some(mac(11)), None)];
        assert_eq!(infer_router(&frames, &configured), None);
    }
}
