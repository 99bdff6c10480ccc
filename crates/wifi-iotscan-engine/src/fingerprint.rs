//! Per-device session fingerprinting.
//!
//! Independent of the trigger pipeline, a capture can be summarized into
//! one fingerprint per observed hardware address: traffic volume and type
//! breakdown, observation span, signal strength, router connectivity, and a
//! tiered identification confidence. Addresses outside the registry are
//! reported as new devices, but only when their traffic touched the router.
//!
//! Vendor resolution is an injected capability so the engine never performs
//! network I/O; callers wire in their own lookup at the boundary.

use std::collections::HashMap;

use wifi_iotscan_core::{Confidence, DeviceRegistry, Frame, FrameType, MacAddr};

/// Resolves a hardware address to a vendor name.
///
/// Implementations live at the application boundary (e.g. an OUI database
/// or a web API client); the engine only consumes the trait.
pub trait VendorLookup {
    /// The vendor name for `address`, if known.
    fn vendor_for(&self, address: &MacAddr) -> Option<String>;
}

/// A `VendorLookup` that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVendorLookup;

impl VendorLookup for NullVendorLookup {
    fn vendor_for(&self, _address: &MacAddr) -> Option<String> {
        None
    }
}

/// Count and share of one frame type within a device's traffic.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PacketTypeBreakdown {
    /// Number of frames of this type.
    pub count: u64,
    /// Share of the device's total traffic, as a percentage rounded to
    /// 2 decimal places.
    pub percentage: f64,
}

/// Session-level fingerprint of one observed hardware address.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DeviceFingerprint {
    /// The observed address.
    pub address: MacAddr,
    /// Display name from the registry, or "New Device" for unknown traffic.
    pub device_name: String,
    /// Whether the address is in the registry.
    pub known: bool,
    /// Total frames touching this address.
    pub total_packets: u64,
    /// Data-frame breakdown.
    pub data: PacketTypeBreakdown,
    /// Management-frame breakdown.
    pub management: PacketTypeBreakdown,
    /// Control-frame breakdown.
    pub control: PacketTypeBreakdown,
    /// Timestamp of the first frame touching this address.
    pub first_seen: Option<f64>,
    /// Timestamp of the last frame touching this address.
    pub last_seen: Option<f64>,
    /// Mean antenna signal in dBm over frames that carried it, rounded to
    /// 2 decimal places.
    pub avg_signal_dbm: Option<f64>,
    /// Whether any of the address's frames also touched the router.
    pub connected_to_router: bool,
    /// Vendor name, when the injected lookup resolves one.
    pub vendor: Option<String>,
    /// Tiered identification confidence.
    pub confidence: Confidence,
}

#[derive(Default)]
struct Stats {
    packet_count: u64,
    data_packets: u64,
    management_packets: u64,
    control_packets: u64,
    first_seen: Option<f64>,
    last_seen: Option<f64>,
    signal_sum: f64,
    signal_count: u64,
    connected_to_router: bool,
}

/// Fingerprint every observed address in the capture.
///
/// Known addresses are always tracked; unknown addresses only when their
/// frame also touched the router (otherwise ambient traffic from every
/// neighboring network would flood the report). Results are returned in
/// first-observation order.
#[must_use]
pub fn fingerprint_devices(
    frames: &[Frame],
    registry: &DeviceRegistry,
    router: Option<MacAddr>,
    vendors: &dyn VendorLookup,
) -> Vec<DeviceFingerprint> {
    let known_names: HashMap<MacAddr, &str> = registry
        .devices()
        .iter()
        .map(|d| (d.device_address, d.display_name.as_str()))
        .collect();

    let mut order: Vec<MacAddr> = Vec::new();
    let mut stats: HashMap<MacAddr, Stats> = HashMap::new();

    for frame in frames {
        let mut addrs: Vec<MacAddr> = Vec::with_capacity(3);
        for addr in frame.addresses() {
            if !addrs.contains(&addr) {
                addrs.push(addr);
            }
        }
        let touches_router = router.map_or(false, |r| addrs.contains(&r));

        for addr in addrs {
            if Some(addr) == router {
                continue;
            }
            if !known_names.contains_key(&addr) && !touches_router {
                continue;
            }

            let entry = stats.entry(addr).or_insert_with(|| {
                order.push(addr);
                Stats::default()
            });

            entry.packet_count += 1;
            match frame.frame_type {
                FrameType::Data => entry.data_packets += 1,
                FrameType::Management => entry.management_packets += 1,
                FrameType::Control => entry.control_packets += 1,
                FrameType::Other => {}
            }

            entry.first_seen =
                Some(entry.first_seen.map_or(frame.timestamp, |t| t.min(frame.timestamp)));
            entry.last_seen =
                Some(entry.last_seen.map_or(frame.timestamp, |t| t.max(frame.timestamp)));

            if let Some(dbm) = frame.signal_dbm {
                entry.signal_sum += dbm;
                entry.signal_count += 1;
            }
            if touches_router {
                entry.connected_to_router = true;
            }
        }
    }

    order
        .into_iter()
        .map(|addr| {
            let s = &stats[&addr];
            let (device_name, known) = match known_names.get(&addr) {
                Some(name) => ((*name).to_owned(), true),
                None => ("New Device".to_owned(), false),
            };
            let avg_signal_dbm = if s.signal_count > 0 {
                Some(round2(s.signal_sum / s.signal_count as f64))
            } else {
                None
            };

            DeviceFingerprint {
                address: addr,
                device_name,
                known,
                total_packets: s.packet_count,
                data: breakdown(s.data_packets, s.packet_count),
                management: breakdown(s.management_packets, s.packet_count),
                control: breakdown(s.control_packets, s.packet_count),
                first_seen: s.first_seen,
                last_seen: s.last_seen,
                avg_signal_dbm,
                connected_to_router: s.connected_to_router,
                vendor: vendors.vendor_for(&addr),
                confidence: identification_confidence(s),
            }
        })
        .collect()
}

/// Tiered identification confidence from traffic volume and connectivity.
///
/// Base 0.5; +0.3 / +0.2 / +0.1 for more than 100 / 50 / 10 packets; +0.1
/// when any data frame was seen; +0.1 when connected to the router.
/// Capped at 1.0.
fn identification_confidence(stats: &Stats) -> Confidence {
    let mut confidence = 0.5;
    if stats.packet_count > 100 {
        confidence += 0.3;
    } else if stats.packet_count > 50 {
        confidence += 0.2;
    } else if stats.packet_count > 10 {
        confidence += 0.1;
    }
    if stats.data_packets > 0 {
        confidence += 0.1;
    }
    if stats.connected_to_router {
        confidence += 0.1;
    }
    Confidence::from_score(confidence)
}

fn breakdown(count: u64, total: u64) -> PacketTypeBreakdown {
    let percentage = if total > 0 {
        round2(count as f64 / total as f64 * 100.0)
    } else {
        0.0
    };
    PacketTypeBreakdown { count, percentage }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use wifi_iotscan_core::RawDeviceEntry;

    struct StaticVendors;

    impl VendorLookup for StaticVendors {
        fn vendor_for(&self, address: &MacAddr) -> Option<String> {
            (address.as_bytes()[5] == 0x01).then(|| "Acme Devices".to_owned())
        }
    }

    fn registry() -> DeviceRegistry {
        DeviceRegistry::from_entries(
            &[RawDeviceEntry {
                device_id: "plug_1".to_owned(),
                device_name: "plug_1".to_owned(),
                device_class: "plug".to_owned(),
                device_address: "aa:bb:cc:dd:ee:01".to_owned(),
            }],
            Some("aa:bb:cc:dd:ee:02"),
        )
    }

    fn frame(t: f64, frame_type: FrameType, a1: MacAddr, a2: MacAddr) -> Frame {
        Frame::new(t, 100, frame_type, 0).with_addresses(Some(a1), Some(a2), None)
    }

    #[test]
    fn known_device_is_fingerprinted() {
        let device = MacAddr::parse("aa:bb:cc:dd:ee:01").unwrap();
        let router = MacAddr::parse("aa:bb:cc:dd:ee:02").unwrap();
        let frames = vec![
            frame(0.0, FrameType::Data, router, device).with_signal_dbm(-60.0),
            frame(5.0, FrameType::Management, router, device).with_signal_dbm(-70.0),
        ];

        let prints = fingerprint_devices(&frames, &registry(), Some(router), &NullVendorLookup);
        assert_eq!(prints.len(), 1);

        let fp = &prints[0];
        assert!(fp.known);
        assert_eq!(fp.device_name, "Plug");
        assert_eq!(fp.total_packets, 2);
        assert_eq!(fp.data.count, 1);
        assert_eq!(fp.data.percentage, 50.0);
        assert_eq!(fp.first_seen, Some(0.0));
        assert_eq!(fp.last_seen, Some(5.0));
        assert_eq!(fp.avg_signal_dbm, Some(-65.0));
        assert!(fp.connected_to_router);
        // 0.5 base + 0.1 data + 0.1 connected
        assert_eq!(fp.confidence.value(), 0.7);
    }

    #[test]
    fn unknown_traffic_needs_router_contact() {
        let router = MacAddr::parse("aa:bb:cc:dd:ee:02").unwrap();
        let stranger = MacAddr::parse("de:ad:be:ef:00:01").unwrap();
        let bystander = MacAddr::parse("de:ad:be:ef:00:02").unwrap();

        let frames = vec![
            frame(0.0, FrameType::Data, router, stranger),
            frame(1.0, FrameType::Data, bystander, stranger),
        ];
        let prints = fingerprint_devices(&frames, &registry(), Some(router), &NullVendorLookup);

        // The stranger is reported (it touched the router); the bystander
        // pair in the second frame is not.
        assert_eq!(prints.len(), 1);
        assert_eq!(prints[0].address, stranger);
        assert!(!prints[0].known);
        assert_eq!(prints[0].device_name, "New Device");
        assert_eq!(prints[0].total_packets, 1);
    }

    #[test]
    fn confidence_tiers_scale_with_volume() {
        let device = MacAddr::parse("aa:bb:cc:dd:ee:01").unwrap();
        let router = MacAddr::parse("aa:bb:cc:dd:ee:02").unwrap();

        let frames: Vec<Frame> = (0..120)
            .map(|i| frame(f64::from(i), FrameType::Control, router, device))
            .collect();
        let prints = fingerprint_devices(&frames, &registry(), Some(router), &NullVendorLookup);

        // 0.5 base + 0.3 volume + 0.1 connected, no data frames.
        assert_eq!(prints[0].confidence.value(), 0.9);
    }

    #[test]
    fn vendor_lookup_is_injected() {
        let device = MacAddr::parse("aa:bb:cc:dd:ee:01").unwrap();
        let router = MacAddr::parse("aa:bb:cc:dd:ee:02").unwrap();
        let frames = vec![frame(0.0, FrameType::Data, router, device)];

        let prints = fingerprint_devices(&frames, &registry(), Some(router), &StaticVendors);
        assert_eq!(prints[0].vendor.as_deref(), Some("Acme Devices"));

        let prints = fingerprint_devices(&frames, &registry(), Some(router), &NullVendorLookup);
        assert_eq!(prints[0].vendor, None);
    }

    #[test]
    fn router_itself_is_not_fingerprinted() {
        let device = MacAddr::parse("aa:bb:cc:dd:ee:01").unwrap();
        let router = MacAddr::parse("aa:bb:cc:dd:ee:02").unwrap();
        let frames = vec![frame(0.0, FrameType::Data, router, device)];

        let prints = fingerprint_devices(&frames, &registry(), Some(router), &NullVendorLookup);
        assert!(prints.iter().all(|fp| fp.address != router));
    }
}
