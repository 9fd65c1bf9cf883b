//! # vkms topology manager
//!
//! Builds fake display hardware out of the vkms driver so composer tests
//! can exercise hotplug, composition and readback without real monitors.
//!
//! vkms is configured through configfs. A topology is a set of resource
//! directories (connectors, encoders, CRTCs and planes) linked together
//! by routing symlinks. This crate turns a list of `ConnectorSpec`s into
//! that tree, toggles vkms and the composer around it, and removes it
//! again afterwards.
//!
//! * `connector` - connector descriptions and the DRM type codes.
//! * `plan` - the ordered list of operations for a topology.
//! * `resource` - individual resource operations on a topology root.
//! * `session` - the setup and teardown state machine.
//! * `surface` - the filesystem the topology lives on, real or in memory.
//! * `control` - system properties and composer service control.
//!
//! ```no_run
//! use vkms::{ConnectorSpec, ConnectorType, TopologySession};
//!
//! let specs = vec![
//!     ConnectorSpec::create().with_type(ConnectorType::eDP),
//!     ConnectorSpec::create()
//!         .with_type(ConnectorType::HDMIA)
//!         .with_additional_overlay_planes(1),
//! ];
//! let session = TopologySession::create_with_specs(&specs).unwrap();
//! session.toggle_connector(1, false).unwrap();
//! ```

// Austin Shafer - 2025
extern crate utils;

mod config;
mod connector;
mod control;
mod error;
mod plan;
mod resource;
mod session;
pub mod surface;
mod teardown;

pub use config::{SessionConfig, SessionConfigBuilder, VKMS_CONFIGFS_DIR, VKMS_INSTANCE_NAME};
pub use connector::{
    ConnectorSpec, ConnectorStatus, ConnectorType, ParsedType, PlaneType, MAX_OVERLAY_PLANES,
};
pub use control::{RecordingControl, Setprop, SystemControl, CTL_START, CTL_STOP};
pub use error::{ProvisionError, Result, VkmsError};
pub use plan::{GraphOp, TopologyPlan};
pub use resource::{NodeId, ResourceGraph, ResourceKind, PLANE_FORMAT_ALL, POSSIBLE_PREFIX};
pub use session::{SessionState, TopologySession};
pub use surface::{ConfigFs, ConfigSurface, MemSurface};
pub use teardown::TeardownReport;

pub use edid::MonitorName;

#[cfg(test)]
mod tests;
