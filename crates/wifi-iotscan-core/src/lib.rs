//! # wifi-iotscan-core
//!
//! Core types for the wifi-iotscan device behavior inference system.
//!
//! This crate provides the domain vocabulary shared by the capture boundary
//! and the inference engine:
//!
//! - **Capture types**: [`Frame`], [`FrameType`] — decoded 802.11 frames as
//!   delivered by the external packet decoder.
//! - **Registry types**: [`DeviceRegistry`], [`DeviceConfig`],
//!   [`DeviceClass`], [`RawDeviceEntry`] — the tracked-device list with
//!   address normalization and display-name disambiguation.
//! - **Common types**: [`MacAddr`], [`Confidence`], [`TriggerSignal`].
//! - **Errors**: [`CoreError`] / [`CoreResult`] from fallible constructors.
//!
//! ## Feature Flags
//!
//! - `serde`: enable serialization/deserialization via serde
//!
//! ## Example
//!
//! ```rust
//! use wifi_iotscan_core::{DeviceClass, MacAddr, TriggerSignal};
//!
//! let addr = MacAddr::parse("C0-F8-53-DE-CF-2A").unwrap();
//! assert_eq!(addr.to_string(), "c0:f8:53:de:cf:2a");
//!
//! let class = DeviceClass::parse("Wall Plug");
//! assert_eq!(class.trigger_signal(), Some(TriggerSignal::Actuation));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod registry;
pub mod types;
pub mod utils;

// Re-export commonly used types at the crate root
pub use error::{CoreError, CoreResult};
pub use registry::{DeviceRegistry, RawDeviceEntry};
pub use types::{Confidence, DeviceClass, DeviceConfig, Frame, FrameType, MacAddr, TriggerSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default lookahead window size for frame-anchored windows, in seconds.
pub const DEFAULT_WINDOW_SIZE: f64 = 1.0;

/// Default fixed-grid summary window size, in seconds.
pub const DEFAULT_SUMMARY_WINDOW: f64 = 1.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_valid() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn default_window_constants() {
        assert!(DEFAULT_WINDOW_SIZE > 0.0);
        assert!(DEFAULT_SUMMARY_WINDOW > 0.0);
    }
}
