//! Topology plans
//!
//! A `TopologyPlan` is the full list of operations needed to build a
//! display topology, computed up front and without touching anything.
//! Building the plan is where the configuration gets validated and
//! where the ordering rules are enforced: a node must be created before
//! any attribute on it is written, and both ends of a link must exist
//! before the link is made. Flushing the plan is then a straight walk
//! over `ops()`.

// Austin Shafer - 2025
use crate::connector::{ConnectorSpec, ConnectorStatus, ConnectorType, PlaneType};
use crate::resource::NodeId;
use crate::{Result, VkmsError};
use edid::MonitorName;

use std::collections::HashSet;
use std::ops::Range;

/// One step of building a topology
#[derive(Debug, Clone, PartialEq)]
pub enum GraphOp {
    CreateNode(NodeId),
    SetStatus {
        connector: usize,
        status: ConnectorStatus,
    },
    SetConnectorType {
        connector: usize,
        ty: ConnectorType,
    },
    SetEdid {
        connector: usize,
        monitor: MonitorName,
    },
    SetPlaneType {
        plane: usize,
        ty: PlaneType,
    },
    SetPlaneFormat {
        plane: usize,
    },
    Link {
        src: NodeId,
        dst: NodeId,
    },
}

impl GraphOp {
    /// The nodes that must exist before this op can run
    pub(crate) fn requires(&self) -> Vec<NodeId> {
        match self {
            GraphOp::CreateNode(_) => Vec::new(),
            GraphOp::SetStatus { connector, .. }
            | GraphOp::SetConnectorType { connector, .. }
            | GraphOp::SetEdid { connector, .. } => vec![NodeId::connector(*connector)],
            GraphOp::SetPlaneType { plane, .. } | GraphOp::SetPlaneFormat { plane } => {
                vec![NodeId::plane(*plane)]
            }
            GraphOp::Link { src, dst } => vec![*src, *dst],
        }
    }

    fn name(&self) -> &'static str {
        match self {
            GraphOp::CreateNode(_) => "CreateNode",
            GraphOp::SetStatus { .. } => "SetStatus",
            GraphOp::SetConnectorType { .. } => "SetConnectorType",
            GraphOp::SetEdid { .. } => "SetEdid",
            GraphOp::SetPlaneType { .. } => "SetPlaneType",
            GraphOp::SetPlaneFormat { .. } => "SetPlaneFormat",
            GraphOp::Link { .. } => "Link",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyPlan {
    tp_ops: Vec<GraphOp>,
    tp_nodes: HashSet<NodeId>,
    /// Global plane indices owned by each connector
    tp_planes: Vec<Range<usize>>,
}

impl TopologyPlan {
    pub(crate) fn empty() -> Self {
        Self {
            tp_ops: Vec::new(),
            tp_nodes: HashSet::new(),
            tp_planes: Vec::new(),
        }
    }

    /// `count` default connectors
    ///
    /// Connector 0 is an eDP panel and the rest are DisplayPort. All of
    /// them start disconnected with a cursor and a primary plane.
    pub fn generic(count: usize) -> Result<Self> {
        Self::build(count, &[])
    }

    /// One connector per spec
    pub fn from_specs(specs: &[ConnectorSpec]) -> Result<Self> {
        if specs.is_empty() {
            return Err(VkmsError::NoConnectors);
        }
        Self::build(specs.len(), specs)
    }

    /// Plan `count` connectors, described by `specs` if it is non-empty
    ///
    /// A non-empty `specs` must hold exactly `count` entries.
    pub fn build(count: usize, specs: &[ConnectorSpec]) -> Result<Self> {
        if count == 0 {
            return Err(VkmsError::NoConnectors);
        }
        if !specs.is_empty() && specs.len() != count {
            return Err(VkmsError::CountMismatch {
                requested: count,
                provided: specs.len(),
            });
        }

        for (i, spec) in specs.iter().enumerate() {
            spec.validate(i)?;
        }

        let mut plan = Self::empty();
        let mut next_plane = 0;
        for i in 0..count {
            next_plane = plan.add_connector(i, specs.get(i), next_plane)?;
        }

        Ok(plan)
    }

    pub(crate) fn push_node(&mut self, node: NodeId) {
        self.tp_nodes.insert(node);
        self.tp_ops.push(GraphOp::CreateNode(node));
    }

    /// Add an op that depends on existing nodes
    pub(crate) fn push(&mut self, op: GraphOp) -> Result<()> {
        if let GraphOp::Link { src, dst } = op {
            if !src.kind.can_route_to(dst.kind) {
                return Err(VkmsError::InvalidLink { src, dst });
            }
        }

        if let Some(node) = op.requires().into_iter().find(|n| !self.tp_nodes.contains(n)) {
            return Err(VkmsError::NodeNotPlanned {
                op: op.name(),
                node: node,
            });
        }

        self.tp_ops.push(op);
        Ok(())
    }

    /// Plan connector `i` and everything routed to it
    ///
    /// Planes are numbered from `first_plane`. Returns the next free
    /// plane index.
    fn add_connector(
        &mut self,
        i: usize,
        spec: Option<&ConnectorSpec>,
        first_plane: usize,
    ) -> Result<usize> {
        let crtc = NodeId::crtc(i);
        let encoder = NodeId::encoder(i);
        let connector = NodeId::connector(i);

        self.push_node(crtc);
        self.push_node(encoder);
        self.push(GraphOp::Link {
            src: encoder,
            dst: crtc,
        })?;

        self.push_node(connector);
        // Unless explicitly configured, connectors start disconnected
        let enabled = spec.map(|s| s.is_enabled_at_start()).unwrap_or(false);
        self.push(GraphOp::SetStatus {
            connector: i,
            status: ConnectorStatus::from_enabled(enabled),
        })?;

        let ty = match spec {
            Some(s) => s.connector_type(),
            None if i == 0 => ConnectorType::eDP,
            None => ConnectorType::DisplayPort,
        };
        self.push(GraphOp::SetConnectorType { connector: i, ty })?;

        if let Some(monitor) = spec.and_then(|s| s.monitor()) {
            self.push(GraphOp::SetEdid {
                connector: i,
                monitor,
            })?;
        }

        self.push(GraphOp::Link {
            src: connector,
            dst: encoder,
        })?;

        let plane_count = spec.map(|s| s.plane_count()).unwrap_or(2);
        let last_plane = first_plane
            .checked_add(plane_count)
            .ok_or(VkmsError::TooManyPlanes {
                connector: i,
                requested: plane_count.saturating_sub(2),
            })?;
        let planes = first_plane..last_plane;
        for (position, plane) in planes.clone().enumerate() {
            self.push_node(NodeId::plane(plane));
            self.push(GraphOp::SetPlaneType {
                plane,
                ty: PlaneType::for_position(position),
            })?;
            self.push(GraphOp::SetPlaneFormat { plane })?;
            self.push(GraphOp::Link {
                src: NodeId::plane(plane),
                dst: crtc,
            })?;
        }

        self.tp_planes.push(planes.clone());
        Ok(planes.end)
    }

    pub fn ops(&self) -> &[GraphOp] {
        &self.tp_ops
    }

    pub fn connector_count(&self) -> usize {
        self.tp_planes.len()
    }

    /// Total planes across all connectors, i.e. the next free index
    pub fn plane_count(&self) -> usize {
        self.tp_planes.last().map(|r| r.end).unwrap_or(0)
    }

    /// Global plane indices of connector `i`
    pub fn planes_for(&self, connector: usize) -> Option<Range<usize>> {
        self.tp_planes.get(connector).cloned()
    }

    /// Every node the plan creates
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tp_ops.iter().filter_map(|op| match op {
            GraphOp::CreateNode(node) => Some(*node),
            _ => None,
        })
    }
}
