//! # wifi-iotscan-engine
//!
//! Device behavior inference over decoded 802.11 captures.
//!
//! Given a time-ordered frame list and a device registry, the engine
//! produces a chronological trigger sequence (one inferred actuation event
//! per configured device) and a ranked list of behavioral-action hypotheses
//! per device. The pipeline:
//!
//! 1. [`router`] — infer the access point address when none is supplied.
//! 2. [`filter`] — restrict the capture to the traffic between each device
//!    and the router.
//! 3. [`features`] — derive per-frame boolean signal flags from length and
//!    arrival pattern.
//! 4. [`window`] — OR-reduce flags over frame-anchored lookahead windows,
//!    then count triggering windows on a fixed summary grid.
//! 5. [`trigger`] — pick one representative event per device, per its
//!    class policy, and order all events chronologically.
//! 6. [`confidence`] — annotate each event with an advisory prediction
//!    confidence.
//! 7. [`actions`] — run the heuristic rule battery over per-device
//!    aggregates.
//!
//! [`session::analyze`] wires the stages together; [`fingerprint`]
//! independently summarizes every observed address in a capture.
//!
//! The engine is a single-threaded, synchronous, pure computation: no
//! shared mutable state, no I/O, and deterministic output for identical
//! input. Per-device pipelines share nothing and may be fanned out by the
//! caller if desired.
//!
//! ## Example
//!
//! ```rust
//! use wifi_iotscan_core::{DeviceRegistry, Frame, FrameType, MacAddr, RawDeviceEntry};
//! use wifi_iotscan_engine::session::{analyze, SessionConfig};
//!
//! let registry = DeviceRegistry::from_entries(
//!     &[RawDeviceEntry {
//!         device_id: "plug_1".to_owned(),
//!         device_name: "plug_1".to_owned(),
//!         device_class: "plug".to_owned(),
//!         device_address: "c0:f8:53:de:cf:2a".to_owned(),
//!     }],
//!     Some("14:eb:b6:be:d7:1e"),
//! );
//!
//! let device = MacAddr::parse("c0:f8:53:de:cf:2a").unwrap();
//! let router = MacAddr::parse("14:eb:b6:be:d7:1e").unwrap();
//! let frames = vec![
//!     Frame::new(0.0, 91, FrameType::Data, 0)
//!         .with_addresses(Some(router), Some(device), None),
//! ];
//!
//! let report = analyze(&frames, &registry, &SessionConfig::default());
//! assert_eq!(report.trigger_sequence.len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod actions;
pub mod confidence;
pub mod features;
pub mod filter;
pub mod fingerprint;
pub mod router;
pub mod session;
pub mod trigger;
pub mod window;

// Re-export key types at the crate root for convenience.
pub use actions::{classify_actions, ActionSignal, DeviceAggregates};
pub use confidence::prediction_confidence;
pub use features::{extract_features, FeatureRecord};
pub use filter::{filter_address_set, filter_device_router};
pub use fingerprint::{fingerprint_devices, DeviceFingerprint, NullVendorLookup, VendorLookup};
pub use router::infer_router;
pub use session::{analyze, DeviceReport, SessionConfig, SessionReport, TriggerReport};
pub use trigger::TriggerEvent;
pub use window::{anchored_windows, summary_buckets, SummaryBucket, WindowRecord};
