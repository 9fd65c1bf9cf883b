//! Connector descriptions
//!
//! A `ConnectorSpec` describes one virtual display to create. Specs are
//! plain values built with chained setters and collected into a list,
//! one entry per display. Nothing touches the system until a list is
//! handed to a `TopologySession`.

// Austin Shafer - 2025
use crate::{Result, VkmsError};
use edid::MonitorName;
use std::fmt;

/// Most overlay planes a single connector may ask for. DRM tracks
/// planes in 32 bit masks, so more than this can never be routed.
pub const MAX_OVERLAY_PLANES: usize = 32;

/// DRM connector types
///
/// The discriminants are the kernel's `DRM_MODE_CONNECTOR_*` codes,
/// which is what gets written to a connector's `type` attribute.
#[allow(non_camel_case_types)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConnectorType {
    Unknown = 0,
    VGA = 1,
    DisplayPort = 10,
    HDMIA = 11,
    HDMIB = 12,
    eDP = 14,
    Virtual = 15,
    DSI = 16,
    DPI = 17,
    Writeback = 18,
}

/// The result of parsing a connector type name
///
/// Unrecognized names are kept so the caller decides whether that is
/// an error or should fall back to a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedType {
    Known(ConnectorType),
    Unrecognized(String),
}

impl ParsedType {
    pub fn known(&self) -> Option<ConnectorType> {
        match self {
            ParsedType::Known(ty) => Some(*ty),
            ParsedType::Unrecognized(_) => None,
        }
    }

    pub fn unwrap_or(&self, default: ConnectorType) -> ConnectorType {
        self.known().unwrap_or(default)
    }
}

impl ConnectorType {
    pub const ALL: &'static [ConnectorType] = &[
        ConnectorType::Unknown,
        ConnectorType::VGA,
        ConnectorType::DisplayPort,
        ConnectorType::HDMIA,
        ConnectorType::HDMIB,
        ConnectorType::eDP,
        ConnectorType::Virtual,
        ConnectorType::DSI,
        ConnectorType::DPI,
        ConnectorType::Writeback,
    ];

    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// The short name used by the setup tool, e.g. `DP` or `HDMIA`
    pub fn name(&self) -> &'static str {
        match self {
            ConnectorType::Unknown => "UNKNOWN",
            ConnectorType::VGA => "VGA",
            ConnectorType::DisplayPort => "DP",
            ConnectorType::HDMIA => "HDMIA",
            ConnectorType::HDMIB => "HDMIB",
            ConnectorType::eDP => "eDP",
            ConnectorType::Virtual => "VIRTUAL",
            ConnectorType::DSI => "DSI",
            ConnectorType::DPI => "DPI",
            ConnectorType::Writeback => "WRITEBACK",
        }
    }

    /// Look up a type by its short name. Names are case sensitive.
    pub fn parse(name: &str) -> ParsedType {
        match Self::ALL.iter().find(|ty| ty.name() == name) {
            Some(ty) => ParsedType::Known(*ty),
            None => ParsedType::Unrecognized(name.to_string()),
        }
    }

    pub fn from_code(code: u32) -> Option<ConnectorType> {
        Self::ALL.iter().copied().find(|ty| ty.code() == code)
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values of a connector's `status` attribute
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConnectorStatus {
    Connected = 1,
    Disconnected = 2,
    Unknown = 3,
}

impl ConnectorStatus {
    pub fn from_enabled(enabled: bool) -> Self {
        match enabled {
            true => ConnectorStatus::Connected,
            false => ConnectorStatus::Disconnected,
        }
    }

    pub fn code(&self) -> u32 {
        *self as u32
    }

    pub fn from_code(code: u32) -> Option<ConnectorStatus> {
        match code {
            1 => Some(ConnectorStatus::Connected),
            2 => Some(ConnectorStatus::Disconnected),
            3 => Some(ConnectorStatus::Unknown),
            _ => None,
        }
    }
}

/// Values of a plane's `type` attribute
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaneType {
    Overlay = 0,
    Primary = 1,
    Cursor = 2,
}

impl PlaneType {
    /// The type of the nth plane created for a connector
    ///
    /// Every connector gets a cursor first, then a primary, and
    /// everything after that is an overlay.
    pub fn for_position(position: usize) -> Self {
        match position {
            0 => PlaneType::Cursor,
            1 => PlaneType::Primary,
            _ => PlaneType::Overlay,
        }
    }

    pub fn code(&self) -> u32 {
        *self as u32
    }
}

/// Description of one virtual connector
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorSpec {
    cs_type: ConnectorType,
    cs_enabled_at_start: bool,
    cs_additional_overlay_planes: usize,
    cs_monitor: Option<MonitorName>,
}

impl Default for ConnectorSpec {
    fn default() -> Self {
        Self {
            cs_type: ConnectorType::DisplayPort,
            cs_enabled_at_start: true,
            cs_additional_overlay_planes: 0,
            cs_monitor: None,
        }
    }
}

impl ConnectorSpec {
    /// Create a spec with default settings: a connected DisplayPort
    /// connector with no overlays and no EDID.
    pub fn create() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, ty: ConnectorType) -> Self {
        self.cs_type = ty;
        self
    }

    pub fn enabled_at_start(mut self, enabled: bool) -> Self {
        self.cs_enabled_at_start = enabled;
        self
    }

    pub fn with_additional_overlay_planes(mut self, count: usize) -> Self {
        self.cs_additional_overlay_planes = count;
        self
    }

    pub fn with_monitor(mut self, monitor: impl Into<MonitorName>) -> Self {
        self.cs_monitor = Some(monitor.into());
        self
    }

    pub fn connector_type(&self) -> ConnectorType {
        self.cs_type
    }

    pub fn is_enabled_at_start(&self) -> bool {
        self.cs_enabled_at_start
    }

    pub fn additional_overlay_planes(&self) -> usize {
        self.cs_additional_overlay_planes
    }

    pub fn monitor(&self) -> Option<MonitorName> {
        self.cs_monitor
    }

    /// Total planes this connector will own: cursor, primary, overlays
    pub fn plane_count(&self) -> usize {
        self.cs_additional_overlay_planes.saturating_add(2)
    }

    /// Check this spec as connector `index` of a topology
    pub fn validate(&self, index: usize) -> Result<()> {
        if self.cs_additional_overlay_planes > MAX_OVERLAY_PLANES {
            return Err(VkmsError::TooManyPlanes {
                connector: index,
                requested: self.cs_additional_overlay_planes,
            });
        }
        Ok(())
    }
}
