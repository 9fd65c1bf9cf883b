//! The vkms resource graph
//!
//! Each DRM resource is a directory under the topology root:
//!
//! ```text
//! <root>/connectors/CONNECTOR_<i>/{status,type,edid,possible_encoders/}
//! <root>/crtcs/CRTC_<i>/
//! <root>/encoders/ENCODER_<i>/possible_crtcs/
//! <root>/planes/PLANE_<i>/{type,supported_formats,possible_crtcs/}
//! <root>/enabled
//! ```
//!
//! A routing link from one resource to another is a symlink placed in
//! the source's `possible_<group>` directory, named after the target and
//! pointing at the target's directory.
//!
//! Every operation here is a single blocking filesystem call with no
//! retries. Failures are logged with the path and OS error and returned.

// Austin Shafer - 2025
use crate::connector::{ConnectorStatus, ConnectorType, PlaneType};
use crate::plan::GraphOp;
use crate::surface::ConfigSurface;
use crate::{Result, VkmsError};
use utils::log;

use std::fmt;
use std::path::{Path, PathBuf};

/// Format string accepted by a plane. For now every plane takes
/// every format.
pub const PLANE_FORMAT_ALL: &str = "+*";

/// Prefix of the directories holding routing links
pub const POSSIBLE_PREFIX: &str = "possible_";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Connector,
    Crtc,
    Encoder,
    Plane,
}

impl ResourceKind {
    /// The group directory holding all resources of this kind
    pub fn group(&self) -> &'static str {
        match self {
            ResourceKind::Connector => "connectors",
            ResourceKind::Crtc => "crtcs",
            ResourceKind::Encoder => "encoders",
            ResourceKind::Plane => "planes",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            ResourceKind::Connector => "CONNECTOR_",
            ResourceKind::Crtc => "CRTC_",
            ResourceKind::Encoder => "ENCODER_",
            ResourceKind::Plane => "PLANE_",
        }
    }

    /// Name of the link directory inside a source node that holds
    /// links to resources of this kind
    pub fn possible_group(&self) -> String {
        format!("{}{}", POSSIBLE_PREFIX, self.group())
    }

    /// Is a routing link from `self` to `dst` meaningful
    pub fn can_route_to(&self, dst: ResourceKind) -> bool {
        matches!(
            (self, dst),
            (ResourceKind::Encoder, ResourceKind::Crtc)
                | (ResourceKind::Connector, ResourceKind::Encoder)
                | (ResourceKind::Plane, ResourceKind::Crtc)
        )
    }
}

/// One resource node: a kind and its index
///
/// Connectors, CRTCs and encoders share the connector's index. Planes
/// are numbered globally since connectors own varying plane counts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub kind: ResourceKind,
    pub index: usize,
}

impl NodeId {
    pub fn new(kind: ResourceKind, index: usize) -> Self {
        Self { kind, index }
    }

    pub fn connector(index: usize) -> Self {
        Self::new(ResourceKind::Connector, index)
    }

    pub fn crtc(index: usize) -> Self {
        Self::new(ResourceKind::Crtc, index)
    }

    pub fn encoder(index: usize) -> Self {
        Self::new(ResourceKind::Encoder, index)
    }

    pub fn plane(index: usize) -> Self {
        Self::new(ResourceKind::Plane, index)
    }

    /// Directory name, e.g. `CRTC_0`
    pub fn name(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.index)
    }

    /// Path relative to the topology root, e.g. `crtcs/CRTC_0`
    pub fn relative_path(&self) -> PathBuf {
        Path::new(self.kind.group()).join(self.name())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Resource operations on a topology root
pub struct ResourceGraph<S: ConfigSurface> {
    rg_root: PathBuf,
    rg_surface: S,
}

impl<S: ConfigSurface> ResourceGraph<S> {
    pub fn new(root: impl Into<PathBuf>, surface: S) -> Self {
        Self {
            rg_root: root.into(),
            rg_surface: surface,
        }
    }

    pub fn root(&self) -> &Path {
        &self.rg_root
    }

    pub fn surface(&self) -> &S {
        &self.rg_surface
    }

    pub fn node_path(&self, node: NodeId) -> PathBuf {
        self.rg_root.join(node.relative_path())
    }

    /// Create the topology root itself
    pub fn create_root(&self) -> Result<()> {
        self.rg_surface.create_dir(&self.rg_root).map_err(|errno| {
            log::error!(
                "Failed to create directory {}: {}",
                self.rg_root.display(),
                errno
            );
            VkmsError::resource("create", &self.rg_root, errno)
        })?;

        log::info!("Successfully created directory {}", self.rg_root.display());
        Ok(())
    }

    /// Create a resource directory
    ///
    /// Fails if the group directory is missing or the node exists.
    pub fn create_node(&self, node: NodeId) -> Result<()> {
        let path = self.node_path(node);
        self.rg_surface.create_dir(&path).map_err(|errno| {
            log::error!("Failed to create directory {}: {}", path.display(), errno);
            VkmsError::resource("create", &path, errno)
        })
    }

    /// Write one attribute file
    fn write_attr(&self, node: NodeId, attr: &str, data: &[u8]) -> Result<()> {
        let path = self.node_path(node).join(attr);
        self.rg_surface.write_file(&path, data).map_err(|errno| {
            log::error!("Failed to write {}: {}", path.display(), errno);
            VkmsError::resource("write", &path, errno)
        })
    }

    /// Set a connector's hotplug status
    pub fn set_status(&self, connector: usize, status: ConnectorStatus) -> Result<()> {
        self.write_attr(
            NodeId::connector(connector),
            "status",
            status.code().to_string().as_bytes(),
        )?;

        log::info!("Successfully set connector {} to {:?}", connector, status);
        Ok(())
    }

    /// Read back a connector's hotplug status
    ///
    /// Returns None if the attribute holds something we don't understand.
    pub fn connector_status(&self, connector: usize) -> Result<Option<ConnectorStatus>> {
        let path = self.node_path(NodeId::connector(connector)).join("status");
        let data = self
            .rg_surface
            .read_file(&path)
            .map_err(|errno| VkmsError::resource("read", &path, errno))?;

        Ok(String::from_utf8_lossy(&data)
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(ConnectorStatus::from_code))
    }

    /// Set a connector's type
    ///
    /// This has to happen before the connector is linked and vkms is
    /// enabled, drivers may cache the type at connect time.
    pub fn set_connector_type(&self, connector: usize, ty: ConnectorType) -> Result<()> {
        self.write_attr(
            NodeId::connector(connector),
            "type",
            ty.code().to_string().as_bytes(),
        )?;

        log::info!("Successfully set connector {} type to {}", connector, ty);
        Ok(())
    }

    /// Write a connector's EDID in one truncating write
    ///
    /// An empty blob means a monitor was asked for but nothing was found
    /// for it, so this fails without writing anything.
    pub fn set_edid(&self, connector: usize, edid: &[u8]) -> Result<()> {
        if edid.is_empty() {
            log::error!("Failed to get EDID data for connector {}", connector);
            return Err(VkmsError::EmptyEdid { index: connector });
        }

        self.write_attr(NodeId::connector(connector), "edid", edid)?;

        log::info!(
            "Successfully wrote EDID data with size {} to connector {}",
            edid.len(),
            connector
        );
        Ok(())
    }

    pub fn set_plane_type(&self, plane: usize, ty: PlaneType) -> Result<()> {
        self.write_attr(
            NodeId::plane(plane),
            "type",
            ty.code().to_string().as_bytes(),
        )?;

        log::info!("Successfully set plane {} type to {:?}", plane, ty);
        Ok(())
    }

    pub fn set_plane_format(&self, plane: usize) -> Result<()> {
        // TODO: per-plane format lists once a test needs them
        self.write_attr(
            NodeId::plane(plane),
            "supported_formats",
            PLANE_FORMAT_ALL.as_bytes(),
        )?;

        log::info!("Successfully set plane {} format", plane);
        Ok(())
    }

    /// Create a routing link from `src` to `dst`
    ///
    /// Both nodes must already exist. The link directory is normally a
    /// default group made by vkms, it is only created here when missing.
    pub fn link(&self, src: NodeId, dst: NodeId) -> Result<()> {
        if !src.kind.can_route_to(dst.kind) {
            return Err(VkmsError::InvalidLink { src, dst });
        }

        let src_dir = self.node_path(src);
        let dst_dir = self.node_path(dst);
        for endpoint in [&src_dir, &dst_dir] {
            if !self.rg_surface.is_dir(endpoint) {
                log::error!(
                    "Cannot link {} to {}, {} does not exist",
                    src,
                    dst,
                    endpoint.display()
                );
                return Err(VkmsError::MissingEndpoint {
                    src,
                    dst,
                    missing: endpoint.clone(),
                });
            }
        }

        let link_dir = src_dir.join(dst.kind.possible_group());
        if !self.rg_surface.is_dir(&link_dir) {
            self.rg_surface.create_dir(&link_dir).map_err(|errno| {
                log::error!("Failed to create directory {}: {}", link_dir.display(), errno);
                VkmsError::resource("create", &link_dir, errno)
            })?;
        }

        let link_path = link_dir.join(dst.name());
        self.rg_surface
            .symlink(&dst_dir, &link_path)
            .map_err(|errno| {
                log::error!(
                    "Failed to create symlink at {} pointing to {}: {}",
                    link_path.display(),
                    dst_dir.display(),
                    errno
                );
                VkmsError::resource("link", &link_path, errno)
            })?;

        log::info!(
            "Successfully linked {} to {}",
            link_path.display(),
            dst_dir.display()
        );
        Ok(())
    }

    /// Toggle the driver's top level `enabled` attribute
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        let path = self.rg_root.join("enabled");
        let value: &[u8] = if enabled { b"1" } else { b"0" };
        self.rg_surface.write_file(&path, value).map_err(|errno| {
            log::error!("Failed to toggle VKMS at {}: {}", path.display(), errno);
            VkmsError::resource("write", &path, errno)
        })?;

        log::info!("Successfully toggled VKMS at {}", path.display());
        Ok(())
    }

    /// Perform one planned operation
    pub fn apply(&self, op: &GraphOp) -> Result<()> {
        match op {
            GraphOp::CreateNode(node) => self.create_node(*node),
            GraphOp::SetStatus { connector, status } => self.set_status(*connector, *status),
            GraphOp::SetConnectorType { connector, ty } => {
                self.set_connector_type(*connector, *ty)
            }
            GraphOp::SetEdid { connector, monitor } => {
                self.set_edid(*connector, edid::lookup(*monitor))
            }
            GraphOp::SetPlaneType { plane, ty } => self.set_plane_type(*plane, *ty),
            GraphOp::SetPlaneFormat { plane } => self.set_plane_format(*plane),
            GraphOp::Link { src, dst } => self.link(*src, *dst),
        }
    }
}
