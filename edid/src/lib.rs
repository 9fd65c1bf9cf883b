//! # EDID catalog
//!
//! A fixed set of monitor identities and the EDID blobs they report.
//! Virtual connectors are given one of these so display enumeration sees
//! a realistic monitor instead of a bare virtual output.
//!
//! Identities are split into three disjoint families: internal eDP
//! panels, external DisplayPort monitors, and external HDMI monitors.
//! `lookup` is a pure table read. The digests are decoded once on first
//! use and every later lookup returns the same bytes.
//!
//! ```
//! use edid::{DpMonitor, MonitorName};
//!
//! let blob = edid::lookup(MonitorName::Dp(DpMonitor::ACI_9713_ASUS_VE258_DP));
//! assert_eq!(blob.len() % 128, 0);
//! ```

// Austin Shafer - 2025
#[macro_use]
extern crate lazy_static;

mod hex;
mod tables;

pub use hex::{decode_hex, decode_hex_strict, validate_hex, HexError};
pub use tables::{DpMonitor, EdpMonitor, HdmiMonitor};

use std::collections::HashMap;
use std::fmt;

/// A monitor identity from one of the three families
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MonitorName {
    Edp(EdpMonitor),
    Dp(DpMonitor),
    Hdmi(HdmiMonitor),
}

impl MonitorName {
    /// Every identity in the catalog
    pub fn all() -> impl Iterator<Item = MonitorName> {
        EdpMonitor::ALL
            .iter()
            .map(|m| MonitorName::Edp(*m))
            .chain(DpMonitor::ALL.iter().map(|m| MonitorName::Dp(*m)))
            .chain(HdmiMonitor::ALL.iter().map(|m| MonitorName::Hdmi(*m)))
    }

    /// Resolve a symbolic name such as `ACI_9713_ASUS_VE258_DP`
    pub fn from_name(name: &str) -> Option<MonitorName> {
        Self::all().find(|m| m.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MonitorName::Edp(m) => m.name(),
            MonitorName::Dp(m) => m.name(),
            MonitorName::Hdmi(m) => m.name(),
        }
    }

    /// The raw table entry for this identity
    pub fn hex(&self) -> &'static str {
        match self {
            MonitorName::Edp(m) => m.hex(),
            MonitorName::Dp(m) => m.hex(),
            MonitorName::Hdmi(m) => m.hex(),
        }
    }
}

impl fmt::Display for MonitorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<EdpMonitor> for MonitorName {
    fn from(m: EdpMonitor) -> Self {
        MonitorName::Edp(m)
    }
}

impl From<DpMonitor> for MonitorName {
    fn from(m: DpMonitor) -> Self {
        MonitorName::Dp(m)
    }
}

impl From<HdmiMonitor> for MonitorName {
    fn from(m: HdmiMonitor) -> Self {
        MonitorName::Hdmi(m)
    }
}

lazy_static! {
    /// Every digest decoded once, process wide and read only
    static ref CATALOG: HashMap<MonitorName, Vec<u8>> = MonitorName::all()
        .map(|name| (name, decode_hex(name.hex())))
        .collect();
}

/// Get the binary EDID for a monitor
///
/// An identity missing from the catalog yields an empty slice. Callers
/// writing EDIDs must treat that as a failure.
pub fn lookup(name: MonitorName) -> &'static [u8] {
    CATALOG.get(&name).map(Vec::as_slice).unwrap_or(&[])
}
