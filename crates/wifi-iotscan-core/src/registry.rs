//! Device registry aggregate.
//!
//! The registry validates the raw device list supplied by the caller:
//! addresses are normalized, malformed entries are dropped (one bad entry
//! must never abort the session), and display names are disambiguated when
//! several devices share a class.

use std::collections::HashSet;

use tracing::warn;

use crate::types::{DeviceClass, DeviceConfig, MacAddr};

/// One raw registry entry as supplied by the caller, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawDeviceEntry {
    /// Opaque identifier, carried through unchanged.
    pub device_id: String,
    /// Raw device name, e.g. `"wall_plug_2"`.
    pub device_name: String,
    /// Raw class label, e.g. `"Wall Plug"`.
    pub device_class: String,
    /// Raw hardware address in any accepted spelling.
    pub device_address: String,
}

/// Validated collection of tracked devices plus the session router address.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceConfig>,
    router_address: Option<MacAddr>,
}

impl DeviceRegistry {
    /// Build a registry from raw entries and an optional router address.
    ///
    /// Entries whose address fails normalization are dropped with a warning;
    /// a malformed router address degrades to `None` (the engine will try to
    /// infer one from traffic instead).
    #[must_use]
    pub fn from_entries(entries: &[RawDeviceEntry], router_address: Option<&str>) -> Self {
        let router = router_address.and_then(|raw| match MacAddr::parse(raw) {
            Ok(addr) => Some(addr),
            Err(_) => {
                warn!(input = raw, "dropping malformed router address");
                None
            }
        });

        let mut devices = Vec::with_capacity(entries.len());
        for entry in entries {
            let address = match MacAddr::parse(&entry.device_address) {
                Ok(addr) => addr,
                Err(_) => {
                    warn!(
                        device = %entry.device_name,
                        input = %entry.device_address,
                        "dropping registry entry with malformed address"
                    );
                    continue;
                }
            };

            let device_class = DeviceClass::parse(&entry.device_class);
            devices.push(DeviceConfig {
                device_id: entry.device_id.clone(),
                display_name: entry.device_name.clone(),
                device_class,
                device_address: address,
                router_address: router,
            });
        }

        let mut registry = Self {
            devices,
            router_address: router,
        };
        registry.assign_display_names();
        registry
    }

    /// The validated device list, in registry order.
    #[must_use]
    pub fn devices(&self) -> &[DeviceConfig] {
        &self.devices
    }

    /// The supplied router address, if any.
    #[must_use]
    pub fn router_address(&self) -> Option<MacAddr> {
        self.router_address
    }

    /// The number of tracked devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the registry tracks no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// The set of configured device addresses.
    #[must_use]
    pub fn configured_addresses(&self) -> HashSet<MacAddr> {
        self.devices.iter().map(|d| d.device_address).collect()
    }

    /// Look up a device by its normalized address.
    #[must_use]
    pub fn device_by_address(&self, address: &MacAddr) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.device_address == *address)
    }

    /// Clone the device list with the given router address filled in on
    /// every entry. Used once the session has resolved the access point.
    #[must_use]
    pub fn resolved_devices(&self, router: Option<MacAddr>) -> Vec<DeviceConfig> {
        self.devices
            .iter()
            .map(|d| DeviceConfig {
                router_address: router,
                ..d.clone()
            })
            .collect()
    }

    /// Replace raw display names with disambiguated friendly names.
    ///
    /// A lone member of a class gets the bare friendly class name. When a
    /// class has several members, a trailing `_<n>` on the raw name becomes
    /// the index; otherwise the 1-based position in registry order is used.
    fn assign_display_names(&mut self) {
        let class_counts: Vec<usize> = self
            .devices
            .iter()
            .map(|d| {
                self.devices
                    .iter()
                    .filter(|other| other.device_class == d.device_class)
                    .count()
            })
            .collect();

        let mut class_positions: Vec<usize> = Vec::with_capacity(self.devices.len());
        for (i, device) in self.devices.iter().enumerate() {
            let position = self.devices[..i]
                .iter()
                .filter(|other| other.device_class == device.device_class)
                .count()
                + 1;
            class_positions.push(position);
        }

        for ((device, count), position) in self
            .devices
            .iter_mut()
            .zip(class_counts)
            .zip(class_positions)
        {
            let friendly = device.device_class.friendly_name();
            device.display_name = if count <= 1 {
                friendly
            } else if let Some(index) = trailing_index(&device.display_name) {
                format!("{friendly} ({index})")
            } else {
                format!("{friendly} ({position})")
            };
        }
    }
}

/// Extract a trailing `_<digits>` suffix from a raw device name.
fn trailing_index(name: &str) -> Option<u32> {
    let (_, suffix) = name.trim().rsplit_once('_')?;
    suffix.parse().ok()
}
