// Error types for topology provisioning
//
// Austin Shafer - 2025
use crate::resource::NodeId;
use crate::teardown::TeardownReport;
use nix::errno::Errno;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VkmsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VkmsError {
    // Configuration errors. These are caught before anything on the
    // surface is touched.
    #[error("At least one connector must be specified")]
    NoConnectors,
    #[error("Requested {requested} displays but {provided} connector specs were provided")]
    CountMismatch { requested: usize, provided: usize },
    #[error("Unknown connector type {0:?}")]
    UnknownConnectorType(String),
    #[error("Unknown monitor {0:?}")]
    UnknownMonitor(String),
    #[error(
        "Connector {connector} asked for {requested} overlay planes, at most {} are allowed",
        crate::connector::MAX_OVERLAY_PLANES
    )]
    TooManyPlanes { connector: usize, requested: usize },
    #[error("Connector {index} is out of range, only {count} connectors exist")]
    ConnectorOutOfRange { index: usize, count: usize },
    #[error("Cannot link {src} to {dst}, no such routing exists")]
    InvalidLink { src: NodeId, dst: NodeId },
    #[error("{op} references {node} before it was created")]
    NodeNotPlanned { op: &'static str, node: NodeId },

    // Resource errors. These abort provisioning and trigger a rollback.
    #[error("Failed to {op} {}: {errno}", .path.display())]
    Resource {
        op: &'static str,
        path: PathBuf,
        errno: Errno,
    },
    #[error("Cannot link {src} to {dst}: {} does not exist", .missing.display())]
    MissingEndpoint {
        src: NodeId,
        dst: NodeId,
        missing: PathBuf,
    },
    #[error("No EDID data found for connector {index}")]
    EmptyEdid { index: usize },

    // Service control errors
    #[error("Failed to set property {key} to {value}: {reason}")]
    Property {
        key: String,
        value: String,
        reason: String,
    },
}

impl VkmsError {
    pub(crate) fn resource(op: &'static str, path: impl Into<PathBuf>, errno: Errno) -> Self {
        VkmsError::Resource {
            op,
            path: path.into(),
            errno,
        }
    }

    /// Was this caught before touching the surface or any service
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            VkmsError::NoConnectors
                | VkmsError::CountMismatch { .. }
                | VkmsError::UnknownConnectorType(_)
                | VkmsError::UnknownMonitor(_)
                | VkmsError::TooManyPlanes { .. }
                | VkmsError::ConnectorOutOfRange { .. }
                | VkmsError::InvalidLink { .. }
                | VkmsError::NodeNotPlanned { .. }
        )
    }
}

/// A failed provisioning attempt
///
/// `rollback` holds the report of the teardown that ran after the
/// failure. It is `None` for configuration errors, which are caught
/// before anything was created and so need no rollback.
#[derive(Error, Debug)]
#[error("Failed to provision virtual displays: {error}")]
pub struct ProvisionError {
    #[source]
    pub error: VkmsError,
    pub rollback: Option<TeardownReport>,
}
