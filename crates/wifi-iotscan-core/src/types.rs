//! Core data types for the wifi-iotscan system.
//!
//! This module defines the fundamental value objects shared by the capture
//! boundary and the inference engine:
//!
//! - **Addressing**: [`MacAddr`]
//! - **Capture types**: [`Frame`], [`FrameType`]
//! - **Registry types**: [`DeviceClass`], [`DeviceConfig`], [`TriggerSignal`]
//! - **Common types**: [`Confidence`]

use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::utils::round3;

// ---------------------------------------------------------------------------
// MacAddr -- Value Object
// ---------------------------------------------------------------------------

/// A hardware address wrapping a 6-byte IEEE 802.11 MAC.
///
/// This is the primary identity for both tracked devices and the access
/// point. Two `MacAddr` values are equal when their bytes match, so any two
/// textual spellings of the same address (`"AA-BB-CC-DD-EE-FF"`,
/// `"aabbccddeeff"`, `"aa:bb:cc:dd:ee:ff"`) compare equal after parsing.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Create a `MacAddr` from a byte slice.
    ///
    /// Returns an error if the slice is not exactly 6 bytes.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let arr: [u8; 6] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidAddress { len: bytes.len() })?;
        Ok(Self(arr))
    }

    /// Parse and normalize a hardware address string.
    ///
    /// Accepts colon-, dash-, or space-separated octets as well as a bare
    /// 12-digit hex string, in any letter case. The parsed value renders
    /// canonically as lowercase colon-separated octets via [`fmt::Display`].
    pub fn parse(s: &str) -> CoreResult<Self> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| *c != ':' && *c != '-' && !c.is_whitespace())
            .collect();
        if cleaned.len() != 12 || !cleaned.is_ascii() {
            return Err(CoreError::address_parse(s));
        }

        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&cleaned[i * 2..i * 2 + 2], 16)
                .map_err(|_| CoreError::address_parse(s))?;
        }
        Ok(Self(bytes))
    }

    /// Return the raw 6-byte address.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({self})")
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for MacAddr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for MacAddr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// FrameType -- Value Object
// ---------------------------------------------------------------------------

/// The coarse 802.11 frame type as reported by the external decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameType {
    /// Management frames (type code 0): beacons, probes, association.
    Management,
    /// Control frames (type code 1): ACK, RTS, CTS.
    Control,
    /// Data frames (type code 2).
    Data,
    /// Anything the decoder could not place in the above categories.
    Other,
}

impl FrameType {
    /// Map a raw 802.11 type code to a `FrameType`.
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Management,
            1 => Self::Control,
            2 => Self::Data,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Management => write!(f, "management"),
            Self::Control => write!(f, "control"),
            Self::Data => write!(f, "data"),
            Self::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Frame -- Value Object
// ---------------------------------------------------------------------------

/// A single decoded 802.11 link-layer frame.
///
/// Produced by the external packet decoder and treated as read-only by the
/// engine. `addr1` is the receiver, `addr2` the sender, and `addr3` the
/// BSSID (or third addressing field, depending on the to/from-DS flags).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// Capture timestamp in seconds.
    pub timestamp: f64,
    /// Frame length in bytes.
    pub length: u32,
    /// Receiver address, if decodable.
    pub addr1: Option<MacAddr>,
    /// Sender address, if decodable.
    pub addr2: Option<MacAddr>,
    /// Third address field (typically the BSSID), if decodable.
    pub addr3: Option<MacAddr>,
    /// Coarse frame type.
    pub frame_type: FrameType,
    /// Raw 802.11 subtype code.
    pub frame_subtype: u8,
    /// Whether the retry bit was set in the frame control field.
    pub retry: bool,
    /// Antenna signal strength in dBm, when the capture recorded it.
    pub signal_dbm: Option<f64>,
}

impl Frame {
    /// Create a frame with no addressing, no retry bit, and no signal data.
    #[must_use]
    pub fn new(timestamp: f64, length: u32, frame_type: FrameType, frame_subtype: u8) -> Self {
        Self {
            timestamp,
            length,
            addr1: None,
            addr2: None,
            addr3: None,
            frame_type,
            frame_subtype,
            retry: false,
            signal_dbm: None,
        }
    }

    /// Set the three address fields.
    #[must_use]
    pub fn with_addresses(
        mut self,
        addr1: Option<MacAddr>,
        addr2: Option<MacAddr>,
        addr3: Option<MacAddr>,
    ) -> Self {
        self.addr1 = addr1;
        self.addr2 = addr2;
        self.addr3 = addr3;
        self
    }

    /// Set the retry flag.
    #[must_use]
    pub fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    /// Set the antenna signal strength in dBm.
    #[must_use]
    pub fn with_signal_dbm(mut self, dbm: f64) -> Self {
        self.signal_dbm = Some(dbm);
        self
    }

    /// Whether the decoder recovered any link-layer addressing.
    ///
    /// Frames without a decodable link layer are dropped by every filter.
    #[must_use]
    pub fn has_link_layer(&self) -> bool {
        self.addr1.is_some() || self.addr2.is_some() || self.addr3.is_some()
    }

    /// Iterate over the addresses present on this frame.
    pub fn addresses(&self) -> impl Iterator<Item = MacAddr> + '_ {
        [self.addr1, self.addr2, self.addr3].into_iter().flatten()
    }

    /// Whether any address field on this frame equals `addr`.
    #[must_use]
    pub fn involves(&self, addr: &MacAddr) -> bool {
        self.addresses().any(|a| a == *addr)
    }
}

// ---------------------------------------------------------------------------
// TriggerSignal -- Value Object
// ---------------------------------------------------------------------------

/// The per-window activation signal a device class is keyed on.
///
/// Each device class actuates with a characteristic link-layer signature;
/// a window counts as triggering when the class's signal was observed in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerSignal {
    /// Actuation-sized frames (269 or 91 bytes) were seen.
    Actuation,
    /// The repeated short-frame burst pattern was seen.
    Burst,
    /// Power-strip actuation-sized frames (301, 269, or 317 bytes) were seen.
    StripActuation,
}

// ---------------------------------------------------------------------------
// DeviceClass -- Value Object
// ---------------------------------------------------------------------------

/// The behavioral class of a tracked IoT device.
///
/// Classes are parsed from normalized labels (lowercase, underscores for
/// spaces). Labels outside the known set map to [`DeviceClass::Unknown`],
/// which is tracked but never produces trigger events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// Smart plug.
    Plug,
    /// In-wall smart plug.
    WallPlug,
    /// Table lamp.
    TableLamp,
    /// Smart switch.
    Switch,
    /// Motion sensor.
    MotionSensor,
    /// Door sensor.
    DoorSensor,
    /// Air purifier. Filtered and selected with special rules.
    AirPurifier,
    /// Power strip.
    PowerStrip,
    /// Any label outside the known set. Never triggering.
    Unknown,
}

impl DeviceClass {
    /// Parse a class from a raw label.
    ///
    /// The label is normalized first: trimmed, lowercased, spaces replaced
    /// with underscores. Unrecognised labels yield [`DeviceClass::Unknown`]
    /// rather than an error.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase().replace(' ', "_");
        match normalized.as_str() {
            "plug" => Self::Plug,
            "wall_plug" => Self::WallPlug,
            "table_lamp" => Self::TableLamp,
            "switch" => Self::Switch,
            "motion_sensor" => Self::MotionSensor,
            "door_sensor" => Self::DoorSensor,
            "air_purifier" => Self::AirPurifier,
            "power_strip" => Self::PowerStrip,
            _ => Self::Unknown,
        }
    }

    /// The normalized label for this class.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Plug => "plug",
            Self::WallPlug => "wall_plug",
            Self::TableLamp => "table_lamp",
            Self::Switch => "switch",
            Self::MotionSensor => "motion_sensor",
            Self::DoorSensor => "door_sensor",
            Self::AirPurifier => "air_purifier",
            Self::PowerStrip => "power_strip",
            Self::Unknown => "unknown_device",
        }
    }

    /// Human-friendly rendering of the class label ("wall_plug" → "Wall Plug").
    #[must_use]
    pub fn friendly_name(&self) -> String {
        self.as_label()
            .split('_')
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The activation signal this class is keyed on, or `None` for classes
    /// that never trigger.
    #[must_use]
    pub fn trigger_signal(&self) -> Option<TriggerSignal> {
        match self {
            Self::Plug
            | Self::WallPlug
            | Self::TableLamp
            | Self::Switch
            | Self::MotionSensor
            | Self::DoorSensor => Some(TriggerSignal::Actuation),
            Self::AirPurifier => Some(TriggerSignal::Burst),
            Self::PowerStrip => Some(TriggerSignal::StripActuation),
            Self::Unknown => None,
        }
    }

    /// Whether frames addressed to the device itself are kept even when the
    /// other endpoint is not the router.
    ///
    /// The air purifier emits frames with itself as destination that must
    /// not be dropped by the pair filter.
    #[must_use]
    pub fn keeps_self_addressed_frames(&self) -> bool {
        matches!(self, Self::AirPurifier)
    }

    /// Whether the trigger event for this class is the summary bucket with
    /// the maximum trigger count, rather than the first triggering bucket.
    #[must_use]
    pub fn selects_peak_bucket(&self) -> bool {
        matches!(self, Self::AirPurifier)
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DeviceClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_label())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DeviceClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

// ---------------------------------------------------------------------------
// DeviceConfig -- Value Object
// ---------------------------------------------------------------------------

/// One tracked device with its resolved session addressing.
///
/// `device_address` is normalized at construction; `router_address` is the
/// session-wide access point address, filled in once supplied or inferred.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Opaque identifier carried through from the registry input.
    pub device_id: String,
    /// Display name, disambiguated when a class has several members.
    pub display_name: String,
    /// Behavioral class.
    pub device_class: DeviceClass,
    /// Normalized hardware address of the device.
    pub device_address: MacAddr,
    /// Resolved access point address, shared across the session.
    pub router_address: Option<MacAddr>,
}

// ---------------------------------------------------------------------------
// Confidence -- Value Object
// ---------------------------------------------------------------------------

/// Confidence score in the range [0.0, 1.0], held at 3 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Confidence(f64);

impl Confidence {
    /// Maximum confidence (1.0).
    pub const MAX: Self = Self(1.0);

    /// Minimum confidence (0.0).
    pub const MIN: Self = Self(0.0);

    /// Creates a new confidence value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range [0.0, 1.0].
    pub fn new(value: f64) -> CoreResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(CoreError::validation(format!(
                "confidence must be in [0.0, 1.0], got {value}"
            )));
        }
        Ok(Self(round3(value)))
    }

    /// Build a confidence from a raw score, clamping to [0.0, 1.0] and
    /// rounding to 3 decimal places.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        Self(round3(score.clamp(0.0, 1.0)))
    }

    /// The raw confidence value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_parse_normalizes_spellings() {
        let canonical = MacAddr::parse("aa:bb:cc:dd:ee:ff").unwrap();
        assert_eq!(MacAddr::parse("AA-BB-CC-DD-EE-FF").unwrap(), canonical);
        assert_eq!(MacAddr::parse("aabbccddeeff").unwrap(), canonical);
        assert_eq!(MacAddr::parse(" aa bb cc dd ee ff ").unwrap(), canonical);
        assert_eq!(canonical.to_string(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn mac_parse_rejects_garbage() {
        assert!(MacAddr::parse("aa:bb:cc").is_err());
        assert!(MacAddr::parse("zz:bb:cc:dd:ee:ff").is_err());
        assert!(MacAddr::parse("").is_err());
        assert!(MacAddr::parse("aa:bb:cc:dd:ee:ff:00").is_err());
    }

    #[test]
    fn mac_from_bytes_checks_length() {
        assert!(MacAddr::from_bytes(&[1, 2, 3, 4, 5, 6]).is_ok());
        assert!(MacAddr::from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn frame_type_from_code() {
        assert_eq!(FrameType::from_code(0), FrameType::Management);
        assert_eq!(FrameType::from_code(1), FrameType::Control);
        assert_eq!(FrameType::from_code(2), FrameType::Data);
        assert_eq!(FrameType::from_code(3), FrameType::Other);
    }

    #[test]
    fn frame_link_layer_detection() {
        let bare = Frame::new(0.0, 42, FrameType::Other, 0);
        assert!(!bare.has_link_layer());

        let addressed = bare
            .clone()
            .with_addresses(Some(MacAddr([1; 6])), None, None);
        assert!(addressed.has_link_layer());
        assert!(addressed.involves(&MacAddr([1; 6])));
        assert!(!addressed.involves(&MacAddr([2; 6])));
    }

    #[test]
    fn device_class_parse_and_labels() {
        assert_eq!(DeviceClass::parse("plug"), DeviceClass::Plug);
        assert_eq!(DeviceClass::parse("Wall Plug"), DeviceClass::WallPlug);
        assert_eq!(DeviceClass::parse("AIR_PURIFIER"), DeviceClass::AirPurifier);
        assert_eq!(DeviceClass::parse("toaster"), DeviceClass::Unknown);
        assert_eq!(DeviceClass::Unknown.as_label(), "unknown_device");
        assert_eq!(DeviceClass::WallPlug.friendly_name(), "Wall Plug");
    }

    #[test]
    fn device_class_trigger_signals() {
        assert_eq!(
            DeviceClass::Plug.trigger_signal(),
            Some(TriggerSignal::Actuation)
        );
        assert_eq!(
            DeviceClass::DoorSensor.trigger_signal(),
            Some(TriggerSignal::Actuation)
        );
        assert_eq!(
            DeviceClass::AirPurifier.trigger_signal(),
            Some(TriggerSignal::Burst)
        );
        assert_eq!(
            DeviceClass::PowerStrip.trigger_signal(),
            Some(TriggerSignal::StripActuation)
        );
        assert_eq!(DeviceClass::Unknown.trigger_signal(), None);
    }

    #[test]
    fn air_purifier_special_rules() {
        assert!(DeviceClass::AirPurifier.keeps_self_addressed_frames());
        assert!(DeviceClass::AirPurifier.selects_peak_bucket());
        assert!(!DeviceClass::Plug.keeps_self_addressed_frames());
        assert!(!DeviceClass::Plug.selects_peak_bucket());
    }

    #[test]
    fn confidence_validation() {
        assert!(Confidence::new(0.5).is_ok());
        assert!(Confidence::new(0.0).is_ok());
        assert!(Confidence::new(1.0).is_ok());
        assert!(Confidence::new(-0.1).is_err());
        assert!(Confidence::new(1.1).is_err());
    }

    #[test]
    fn confidence_from_score_clamps_and_rounds() {
        assert_eq!(Confidence::from_score(1.7).value(), 1.0);
        assert_eq!(Confidence::from_score(-0.2).value(), 0.0);
        assert_eq!(Confidence::from_score(0.123456).value(), 0.123);
    }
}
