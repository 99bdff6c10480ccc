//! Address-based frame filtering.
//!
//! Two filters feed the pipeline: the pair filter restricts a capture to the
//! traffic between one device and the access point, and the set filter keeps
//! every frame touching any address of interest (used for the global
//! pre-filter and per-device action aggregation).
//!
//! Both filters return borrowed frames in input order: the output is always
//! an order-preserving subset of the input, and the engine never copies or
//! mutates capture data.

use std::collections::HashSet;

use wifi_iotscan_core::{DeviceConfig, Frame, MacAddr};

/// Keep the frames exchanged between a device and its router.
///
/// A frame is kept when its (sender, receiver) pair equals the
/// (device, router) pair in either direction. Device classes that emit
/// self-addressed frames additionally keep any frame whose receiver is the
/// device itself, regardless of the other endpoint.
///
/// Frames without a decodable link layer are dropped unconditionally, and a
/// device with no resolved router address filters to nothing.
pub fn filter_device_router<'a>(frames: &[&'a Frame], device: &DeviceConfig) -> Vec<&'a Frame> {
    let Some(router) = device.router_address else {
        return Vec::new();
    };
    let device_addr = device.device_address;
    let keep_self_addressed = device.device_class.keeps_self_addressed_frames();

    frames
        .iter()
        .copied()
        .filter(|frame| {
            if !frame.has_link_layer() {
                return false;
            }
            let sender = frame.addr2;
            let receiver = frame.addr1;
            let pair_match = (sender == Some(device_addr) && receiver == Some(router))
                || (sender == Some(router) && receiver == Some(device_addr));
            pair_match || (keep_self_addressed && receiver == Some(device_addr))
        })
        .collect()
}

/// Keep the frames touching any address in `interesting`.
///
/// A frame is kept when any of its three address fields is in the set.
/// Frames without a decodable link layer are dropped.
pub fn filter_address_set<'a>(
    frames: &[&'a Frame],
    interesting: &HashSet<MacAddr>,
) -> Vec<&'a Frame> {
    frames
        .iter()
        .copied()
        .filter(|frame| frame.addresses().any(|addr| interesting.contains(&addr)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wifi_iotscan_core::{DeviceClass, FrameType};

    fn mac(last: u8) -> MacAddr {
        MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, last])
    }

    fn frame(t: f64, sender: Option<MacAddr>, receiver: Option<MacAddr>) -> Frame {
        Frame::new(t, 100, FrameType::Data, 0).with_addresses(receiver, sender, None)
    }

    fn refs(frames: &[Frame]) -> Vec<&Frame> {
        frames.iter().collect()
    }

    fn device(class: DeviceClass, addr: MacAddr, router: Option<MacAddr>) -> DeviceConfig {
        DeviceConfig {
            device_id: "dev".to_owned(),
            display_name: "Device".to_owned(),
            device_class: class,
            device_address: addr,
            router_address: router,
        }
    }

    #[test]
    fn pair_filter_keeps_both_directions() {
        let dev = mac(1);
        let router = mac(2);
        let other = mac(3);
        let frames = vec![
            frame(0.0, Some(dev), Some(router)),
            frame(1.0, Some(router), Some(dev)),
            frame(2.0, Some(dev), Some(other)),
            frame(3.0, Some(other), Some(router)),
        ];
        let config = device(DeviceClass::Plug, dev, Some(router));

        let kept = filter_device_router(&refs(&frames), &config);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].timestamp, 0.0);
        assert_eq!(kept[1].timestamp, 1.0);
    }

    #[test]
    fn pair_filter_preserves_input_order() {
        let dev = mac(1);
        let router = mac(2);
        let frames: Vec<Frame> = (0..10)
            .map(|i| frame(f64::from(i), Some(dev), Some(router)))
            .collect();
        let config = device(DeviceClass::Plug, dev, Some(router));

        let kept = filter_device_router(&refs(&frames), &config);
        let times: Vec<f64> = kept.iter().map(|f| f.timestamp).collect();
        let mut sorted = times.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(times, sorted);
    }

    #[test]
    fn air_purifier_keeps_self_addressed_frames() {
        let dev = mac(1);
        let router = mac(2);
        let other = mac(3);
        let frames = vec![
            frame(0.0, Some(other), Some(dev)), // receiver is the device
            frame(1.0, Some(dev), Some(other)), // receiver is not
        ];

        let purifier = device(DeviceClass::AirPurifier, dev, Some(router));
        let kept = filter_device_router(&refs(&frames), &purifier);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].timestamp, 0.0);

        let plug = device(DeviceClass::Plug, dev, Some(router));
        assert!(filter_device_router(&refs(&frames), &plug).is_empty());
    }

    #[test]
    fn missing_router_filters_to_empty() {
        let dev = mac(1);
        let frames = vec![frame(0.0, Some(dev), Some(mac(2)))];
        let config = device(DeviceClass::AirPurifier, dev, None);
        assert!(filter_device_router(&refs(&frames), &config).is_empty());
    }

    #[test]
    fn undecodable_frames_are_dropped() {
        let dev = mac(1);
        let router = mac(2);
        let frames = vec![
            Frame::new(0.0, 64, FrameType::Other, 0),
            frame(1.0, Some(dev), Some(router)),
        ];
        let config = device(DeviceClass::Plug, dev, Some(router));
        let kept = filter_device_router(&refs(&frames), &config);
        assert_eq!(kept.len(), 1);

        let set: HashSet<MacAddr> = [dev].into_iter().collect();
        let kept = filter_address_set(&refs(&frames), &set);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn set_filter_matches_any_address_field() {
        let dev = mac(1);
        let frames = vec![
            frame(0.0, Some(dev), Some(mac(9))),
            frame(1.0, Some(mac(9)), Some(dev)),
            Frame::new(2.0, 80, FrameType::Data, 0).with_addresses(
                Some(mac(9)),
                Some(mac(8)),
                Some(dev),
            ),
            frame(3.0, Some(mac(8)), Some(mac(9))),
        ];
        let set: HashSet<MacAddr> = [dev].into_iter().collect();
        let kept = filter_address_set(&refs(&frames), &set);
        assert_eq!(kept.len(), 3);
    }
}
