/// vkms topology tests
///
/// Everything here runs against `MemSurface` and `RecordingControl`,
/// except the `configfs_*` tests which use a real temporary directory.
///
/// Austin Shafer - 2025
use crate as vk;
use crate::surface::ConfigSurface;
use crate::{
    ConnectorSpec, ConnectorStatus, ConnectorType, GraphOp, MemSurface, NodeId, ParsedType,
    PlaneType, ProvisionError, RecordingControl, ResourceGraph, ResourceKind, SessionConfig,
    SessionState, SystemControl, TopologyPlan, TopologySession, VkmsError, MAX_OVERLAY_PLANES,
};
use edid::{DpMonitor, EdpMonitor, HdmiMonitor, MonitorName};
use nix::errno::Errno;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

type MemSession = TopologySession<MemSurface, RecordingControl>;

fn test_config() -> SessionConfig {
    SessionConfig::builder()
        .settle_delay(Duration::ZERO)
        .build()
}

fn test_surface(config: &SessionConfig) -> MemSurface {
    MemSurface::vkms(&config.root)
}

/// Provision on a fresh in-memory surface
///
/// Returns handles to the surface and control so the test can
/// inspect them even after the session is gone.
fn provision(
    count: usize,
    specs: &[ConnectorSpec],
) -> (
    Result<MemSession, ProvisionError>,
    MemSurface,
    RecordingControl,
) {
    let config = test_config();
    let surf = test_surface(&config);
    let control = RecordingControl::new();
    let session =
        TopologySession::provision(config, surf.clone(), control.clone(), count, specs);

    (session, surf, control)
}

fn root() -> PathBuf {
    test_config().root
}

fn node_path(node: NodeId) -> PathBuf {
    root().join(node.relative_path())
}

fn attr(surf: &MemSurface, node: NodeId, name: &str) -> Option<String> {
    surf.file_contents(&node_path(node).join(name))
        .map(|data| String::from_utf8(data).unwrap())
}

/// All resource directories left on the surface
fn node_dirs(surf: &MemSurface) -> Vec<PathBuf> {
    let prefixes = [
        ResourceKind::Connector.prefix(),
        ResourceKind::Crtc.prefix(),
        ResourceKind::Encoder.prefix(),
        ResourceKind::Plane.prefix(),
    ];

    surf.dirs_under(&root())
        .into_iter()
        .filter(|p| {
            let name = p.file_name().unwrap().to_str().unwrap();
            prefixes.iter().any(|prefix| name.starts_with(prefix))
        })
        .collect()
}

fn count_kind(surf: &MemSurface, kind: ResourceKind) -> usize {
    node_dirs(surf)
        .iter()
        .filter(|p| p.parent().unwrap().file_name().unwrap() == kind.group())
        .count()
}

// ---------------------------------------------------------------
// Connector specs
// ---------------------------------------------------------------

#[test]
fn spec_defaults() {
    let spec = ConnectorSpec::create();
    assert_eq!(spec.connector_type(), ConnectorType::DisplayPort);
    assert!(spec.is_enabled_at_start());
    assert_eq!(spec.additional_overlay_planes(), 0);
    assert_eq!(spec.monitor(), None);
    assert_eq!(spec.plane_count(), 2);
}

#[test]
fn spec_builder_chains() {
    let spec = ConnectorSpec::create()
        .with_type(ConnectorType::HDMIA)
        .enabled_at_start(false)
        .with_additional_overlay_planes(3)
        .with_monitor(HdmiMonitor::DEL_61462_DELL_U2410_HDMI);

    assert_eq!(spec.connector_type(), ConnectorType::HDMIA);
    assert!(!spec.is_enabled_at_start());
    assert_eq!(spec.plane_count(), 5);
    assert_eq!(
        spec.monitor(),
        Some(MonitorName::Hdmi(HdmiMonitor::DEL_61462_DELL_U2410_HDMI))
    );
}

#[test]
fn connector_type_names() {
    assert_eq!(
        ConnectorType::parse("HDMIB"),
        ParsedType::Known(ConnectorType::HDMIB)
    );
    assert_eq!(
        ConnectorType::parse("eDP"),
        ParsedType::Known(ConnectorType::eDP)
    );
    // Names are case sensitive
    assert_eq!(
        ConnectorType::parse("edp"),
        ParsedType::Unrecognized("edp".to_string())
    );

    let parsed = ConnectorType::parse("SCART");
    assert_eq!(parsed.known(), None);
    assert_eq!(
        parsed.unwrap_or(ConnectorType::DisplayPort),
        ConnectorType::DisplayPort
    );

    for ty in ConnectorType::ALL {
        assert_eq!(ConnectorType::parse(ty.name()).known(), Some(*ty));
        assert_eq!(ConnectorType::from_code(ty.code()), Some(*ty));
    }
}

#[test]
fn drm_codes() {
    assert_eq!(ConnectorType::DisplayPort.code(), 10);
    assert_eq!(ConnectorType::eDP.code(), 14);
    assert_eq!(ConnectorType::Writeback.code(), 18);
    assert_eq!(ConnectorStatus::Connected.code(), 1);
    assert_eq!(ConnectorStatus::Disconnected.code(), 2);
    assert_eq!(PlaneType::Overlay.code(), 0);
    assert_eq!(PlaneType::Primary.code(), 1);
    assert_eq!(PlaneType::Cursor.code(), 2);
}

// ---------------------------------------------------------------
// Plans
// ---------------------------------------------------------------

#[test]
fn plan_rejects_bad_counts() {
    assert_eq!(TopologyPlan::generic(0), Err(VkmsError::NoConnectors));
    assert_eq!(TopologyPlan::from_specs(&[]), Err(VkmsError::NoConnectors));

    let specs = vec![ConnectorSpec::create(), ConnectorSpec::create()];
    assert_eq!(
        TopologyPlan::build(3, &specs),
        Err(VkmsError::CountMismatch {
            requested: 3,
            provided: 2
        })
    );
}

#[test]
fn plan_bounds_overlay_count() {
    let huge = ConnectorSpec::create().with_additional_overlay_planes(usize::MAX);
    assert_eq!(huge.plane_count(), usize::MAX);

    let err = TopologyPlan::from_specs(&[huge]).unwrap_err();
    assert_eq!(
        err,
        VkmsError::TooManyPlanes {
            connector: 0,
            requested: usize::MAX
        }
    );
    assert!(err.is_config_error());

    let specs = vec![
        ConnectorSpec::create().with_additional_overlay_planes(MAX_OVERLAY_PLANES),
        ConnectorSpec::create().with_additional_overlay_planes(MAX_OVERLAY_PLANES + 1),
    ];
    assert_eq!(
        TopologyPlan::from_specs(&specs),
        Err(VkmsError::TooManyPlanes {
            connector: 1,
            requested: MAX_OVERLAY_PLANES + 1
        })
    );

    let plan = TopologyPlan::from_specs(&specs[..1]).unwrap();
    assert_eq!(plan.plane_count(), MAX_OVERLAY_PLANES + 2);
}

#[test]
fn plan_generic_counts() {
    for n in 1..6 {
        let plan = TopologyPlan::generic(n).unwrap();
        let nodes: Vec<NodeId> = plan.nodes().collect();
        let count = |kind| nodes.iter().filter(|n| n.kind == kind).count();

        assert_eq!(plan.connector_count(), n);
        assert_eq!(count(ResourceKind::Connector), n);
        assert_eq!(count(ResourceKind::Crtc), n);
        assert_eq!(count(ResourceKind::Encoder), n);
        assert_eq!(count(ResourceKind::Plane), 2 * n);
        assert_eq!(plan.plane_count(), 2 * n);
    }
}

#[test]
fn plan_orders_nodes_before_use() {
    let specs = vec![
        ConnectorSpec::create().with_additional_overlay_planes(2),
        ConnectorSpec::create().with_monitor(DpMonitor::HWP_12446_HP_Z24i_DP),
        ConnectorSpec::create().with_additional_overlay_planes(1),
    ];
    let plan = TopologyPlan::from_specs(&specs).unwrap();

    let mut created = HashSet::new();
    for op in plan.ops() {
        for node in op.requires() {
            assert!(created.contains(&node), "{:?} ran before {} existed", op, node);
        }
        if let GraphOp::CreateNode(node) = op {
            assert!(created.insert(*node), "{} created twice", node);
        }
    }
}

#[test]
fn plan_plane_indices_never_reused() {
    let specs = vec![
        ConnectorSpec::create().with_additional_overlay_planes(1),
        ConnectorSpec::create(),
        ConnectorSpec::create().with_additional_overlay_planes(4),
    ];
    let plan = TopologyPlan::from_specs(&specs).unwrap();

    assert_eq!(plan.planes_for(0), Some(0..3));
    assert_eq!(plan.planes_for(1), Some(3..5));
    assert_eq!(plan.planes_for(2), Some(5..11));
    assert_eq!(plan.planes_for(3), None);
    assert_eq!(plan.plane_count(), 11);

    let planes: Vec<usize> = plan
        .nodes()
        .filter(|n| n.kind == ResourceKind::Plane)
        .map(|n| n.index)
        .collect();
    assert_eq!(planes, (0..11).collect::<Vec<_>>());
}

#[test]
fn plan_plane_types_per_connector() {
    let specs = vec![
        ConnectorSpec::create().with_additional_overlay_planes(2),
        ConnectorSpec::create(),
    ];
    let plan = TopologyPlan::from_specs(&specs).unwrap();
    let types: Vec<(usize, PlaneType)> = plan
        .ops()
        .iter()
        .filter_map(|op| match op {
            GraphOp::SetPlaneType { plane, ty } => Some((*plane, *ty)),
            _ => None,
        })
        .collect();

    assert_eq!(
        types,
        vec![
            (0, PlaneType::Cursor),
            (1, PlaneType::Primary),
            (2, PlaneType::Overlay),
            (3, PlaneType::Overlay),
            (4, PlaneType::Cursor),
            (5, PlaneType::Primary),
        ]
    );
}

#[test]
fn plan_refuses_ops_on_unplanned_nodes() {
    let mut plan = TopologyPlan::empty();
    plan.push_node(NodeId::crtc(0));

    assert_eq!(
        plan.push(GraphOp::Link {
            src: NodeId::encoder(0),
            dst: NodeId::crtc(0),
        }),
        Err(VkmsError::NodeNotPlanned {
            op: "Link",
            node: NodeId::encoder(0),
        })
    );
    assert_eq!(
        plan.push(GraphOp::SetPlaneFormat { plane: 0 }),
        Err(VkmsError::NodeNotPlanned {
            op: "SetPlaneFormat",
            node: NodeId::plane(0),
        })
    );

    plan.push_node(NodeId::plane(0));
    assert!(plan
        .push(GraphOp::Link {
            src: NodeId::plane(0),
            dst: NodeId::crtc(0),
        })
        .is_ok());
    // Planes route to CRTCs, never the other way around
    assert_eq!(
        plan.push(GraphOp::Link {
            src: NodeId::crtc(0),
            dst: NodeId::plane(0),
        }),
        Err(VkmsError::InvalidLink {
            src: NodeId::crtc(0),
            dst: NodeId::plane(0),
        })
    );
}

// ---------------------------------------------------------------
// Resource graph
// ---------------------------------------------------------------

/// A graph on a surface whose instance directory already exists
fn bare_graph() -> (ResourceGraph<MemSurface>, MemSurface) {
    let config = test_config();
    let surf = test_surface(&config);
    let graph = ResourceGraph::new(config.root.clone(), surf.clone());
    graph.create_root().unwrap();
    (graph, surf)
}

#[test]
fn create_node_fails_on_duplicates_and_missing_root() {
    let (graph, _surf) = bare_graph();
    graph.create_node(NodeId::crtc(0)).unwrap();
    assert!(matches!(
        graph.create_node(NodeId::crtc(0)),
        Err(VkmsError::Resource {
            errno: Errno::EEXIST,
            ..
        })
    ));

    let config = test_config();
    let orphan = ResourceGraph::new(config.root.clone(), test_surface(&config));
    assert!(matches!(
        orphan.create_node(NodeId::crtc(0)),
        Err(VkmsError::Resource {
            errno: Errno::ENOENT,
            ..
        })
    ));
}

#[test]
fn link_requires_both_endpoints() {
    let (graph, surf) = bare_graph();
    graph.create_node(NodeId::encoder(0)).unwrap();

    let err = graph
        .link(NodeId::encoder(0), NodeId::crtc(0))
        .unwrap_err();
    assert_eq!(
        err,
        VkmsError::MissingEndpoint {
            src: NodeId::encoder(0),
            dst: NodeId::crtc(0),
            missing: node_path(NodeId::crtc(0)),
        }
    );

    graph.create_node(NodeId::crtc(0)).unwrap();
    graph.link(NodeId::encoder(0), NodeId::crtc(0)).unwrap();

    let link = node_path(NodeId::encoder(0)).join("possible_crtcs/CRTC_0");
    assert_eq!(surf.read_link(&link), Some(node_path(NodeId::crtc(0))));

    // The same link twice is refused
    assert!(matches!(
        graph.link(NodeId::encoder(0), NodeId::crtc(0)),
        Err(VkmsError::Resource {
            errno: Errno::EEXIST,
            ..
        })
    ));
}

#[test]
fn empty_edid_writes_nothing() {
    let (graph, surf) = bare_graph();
    graph.create_node(NodeId::connector(0)).unwrap();
    let before = surf.mutation_count();

    assert_eq!(
        graph.set_edid(0, &[]),
        Err(VkmsError::EmptyEdid { index: 0 })
    );
    assert_eq!(surf.mutation_count(), before);
    assert!(!surf.exists(&node_path(NodeId::connector(0)).join("edid")));
}

#[test]
fn edid_is_written_verbatim() {
    let (graph, surf) = bare_graph();
    graph.create_node(NodeId::connector(0)).unwrap();

    let monitor = MonitorName::Dp(DpMonitor::DEL_61463_DELL_U2410_DP);
    graph
        .apply(&GraphOp::SetEdid {
            connector: 0,
            monitor,
        })
        .unwrap();

    assert_eq!(
        surf.file_contents(&node_path(NodeId::connector(0)).join("edid")),
        Some(edid::decode_hex(monitor.hex()))
    );
}

#[test]
fn enable_failure_names_attribute() {
    let (graph, surf) = bare_graph();
    let enabled = root().join("enabled");
    surf.fail_on(&enabled, Errno::EACCES);

    assert_eq!(
        graph.set_enabled(true),
        Err(VkmsError::Resource {
            op: "write",
            path: enabled,
            errno: Errno::EACCES,
        })
    );
}

#[test]
fn status_reads_back() {
    let (graph, _surf) = bare_graph();
    graph.create_node(NodeId::connector(0)).unwrap();

    graph.set_status(0, ConnectorStatus::Unknown).unwrap();
    assert_eq!(
        graph.connector_status(0),
        Ok(Some(ConnectorStatus::Unknown))
    );
    graph.set_status(0, ConnectorStatus::Connected).unwrap();
    assert_eq!(
        graph.connector_status(0),
        Ok(Some(ConnectorStatus::Connected))
    );
}

// ---------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------

#[test]
fn generic_session_builds_topology() {
    let (session, surf, control) = provision(3, &[]);
    let session = session.unwrap();

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.active_connector_count(), 3);
    assert_eq!(session.plane_count(), 6);

    assert_eq!(count_kind(&surf, ResourceKind::Connector), 3);
    assert_eq!(count_kind(&surf, ResourceKind::Crtc), 3);
    assert_eq!(count_kind(&surf, ResourceKind::Encoder), 3);
    assert_eq!(count_kind(&surf, ResourceKind::Plane), 6);

    // eDP panel first, DisplayPort after that, all disconnected
    assert_eq!(attr(&surf, NodeId::connector(0), "type").unwrap(), "14");
    assert_eq!(attr(&surf, NodeId::connector(1), "type").unwrap(), "10");
    assert_eq!(attr(&surf, NodeId::connector(2), "type").unwrap(), "10");
    for i in 0..3 {
        assert_eq!(attr(&surf, NodeId::connector(i), "status").unwrap(), "2");
        assert!(attr(&surf, NodeId::connector(i), "edid").is_none());
    }

    assert_eq!(
        surf.file_contents(&root().join("enabled")),
        Some(b"1".to_vec())
    );
    assert_eq!(
        control.calls(),
        vec![
            (
                vk::CTL_STOP.to_string(),
                "vendor.hwcomposer-3".to_string()
            ),
            (
                "vendor.hwc.drm.device".to_string(),
                "/dev/dri/card1".to_string()
            ),
            (
                vk::CTL_START.to_string(),
                "vendor.hwcomposer-3".to_string()
            ),
        ]
    );

    drop(session);
}

#[test]
fn generic_session_links() {
    let (session, surf, _control) = provision(2, &[]);
    let _session = session.unwrap();

    let expect = |src: NodeId, dst: NodeId| {
        let link = node_path(src)
            .join(dst.kind.possible_group())
            .join(dst.name());
        assert_eq!(surf.read_link(&link), Some(node_path(dst)), "{}", link.display());
    };

    for i in 0..2 {
        expect(NodeId::encoder(i), NodeId::crtc(i));
        expect(NodeId::connector(i), NodeId::encoder(i));
    }
    expect(NodeId::plane(0), NodeId::crtc(0));
    expect(NodeId::plane(1), NodeId::crtc(0));
    expect(NodeId::plane(2), NodeId::crtc(1));
    expect(NodeId::plane(3), NodeId::crtc(1));

    assert_eq!(attr(&surf, NodeId::plane(2), "type").unwrap(), "2");
    assert_eq!(attr(&surf, NodeId::plane(3), "type").unwrap(), "1");
    assert_eq!(
        attr(&surf, NodeId::plane(3), "supported_formats").unwrap(),
        vk::PLANE_FORMAT_ALL
    );
}

#[test]
fn toggling_one_connector_leaves_others_alone() {
    let (session, surf, _control) = provision(3, &[]);
    let session = session.unwrap();
    for i in 0..3 {
        session.toggle_connector(i, true).unwrap();
    }

    session.toggle_connector(1, false).unwrap();
    assert_eq!(attr(&surf, NodeId::connector(1), "status").unwrap(), "2");
    assert_eq!(
        session.connector_status(1),
        Ok(Some(ConnectorStatus::Disconnected))
    );

    session.toggle_connector(1, true).unwrap();
    assert_eq!(attr(&surf, NodeId::connector(1), "status").unwrap(), "1");

    assert_eq!(attr(&surf, NodeId::connector(0), "status").unwrap(), "1");
    assert_eq!(attr(&surf, NodeId::connector(2), "status").unwrap(), "1");
}

#[test]
fn toggling_is_idempotent() {
    let (session, surf, _control) = provision(1, &[]);
    let session = session.unwrap();

    assert!(session.toggle_connector(0, true).is_ok());
    assert!(session.toggle_connector(0, true).is_ok());
    assert_eq!(attr(&surf, NodeId::connector(0), "status").unwrap(), "1");

    assert!(session.toggle_connector(0, false).is_ok());
    assert!(session.toggle_connector(0, false).is_ok());
    assert_eq!(attr(&surf, NodeId::connector(0), "status").unwrap(), "2");
}

#[test]
fn toggling_out_of_range() {
    let (session, _surf, _control) = provision(2, &[]);
    let session = session.unwrap();

    assert_eq!(
        session.toggle_connector(2, true),
        Err(VkmsError::ConnectorOutOfRange { index: 2, count: 2 })
    );
}

#[test]
fn advanced_session_follows_specs() {
    let specs = vec![
        ConnectorSpec::create()
            .with_type(ConnectorType::DisplayPort)
            .with_additional_overlay_planes(1),
        ConnectorSpec::create()
            .with_type(ConnectorType::eDP)
            .with_monitor(EdpMonitor::REDRIX),
    ];
    let (session, surf, _control) = provision(specs.len(), &specs);
    let session = session.unwrap();

    assert_eq!(session.active_connector_count(), 2);
    assert_eq!(session.plane_count(), 5);

    assert_eq!(attr(&surf, NodeId::connector(0), "type").unwrap(), "10");
    assert_eq!(attr(&surf, NodeId::connector(1), "type").unwrap(), "14");
    // Specs start connected unless told otherwise
    assert_eq!(attr(&surf, NodeId::connector(0), "status").unwrap(), "1");

    // Connector 0 owns a cursor, a primary and one overlay
    let types: Vec<String> = (0..3)
        .map(|p| attr(&surf, NodeId::plane(p), "type").unwrap())
        .collect();
    assert_eq!(types, vec!["2", "1", "0"]);
    for p in 0..3 {
        let link = node_path(NodeId::plane(p)).join("possible_crtcs/CRTC_0");
        assert!(surf.read_link(&link).is_some());
    }

    // Connector 1 owns planes 3 and 4
    for p in 3..5 {
        let link = node_path(NodeId::plane(p)).join("possible_crtcs/CRTC_1");
        assert!(surf.read_link(&link).is_some());
    }
    assert!(!surf.exists(&node_path(NodeId::plane(5))));

    let edid = surf
        .file_contents(&node_path(NodeId::connector(1)).join("edid"))
        .unwrap();
    assert!(!edid.is_empty());
    assert_eq!(edid, edid::decode_hex(MonitorName::Edp(EdpMonitor::REDRIX).hex()));
    assert!(!surf.exists(&node_path(NodeId::connector(0)).join("edid")));
}

#[test]
fn disabled_at_start() {
    let specs = vec![ConnectorSpec::create().enabled_at_start(false)];
    let (session, surf, _control) = provision(1, &specs);
    let _session = session.unwrap();

    assert_eq!(attr(&surf, NodeId::connector(0), "status").unwrap(), "2");
}

#[test]
fn mismatched_specs_touch_nothing() {
    let specs = vec![ConnectorSpec::create(), ConnectorSpec::create()];
    let (session, surf, control) = provision(3, &specs);
    let err = session.err().unwrap();

    assert_eq!(
        err.error,
        VkmsError::CountMismatch {
            requested: 3,
            provided: 2
        }
    );
    assert!(err.error.is_config_error());
    assert!(err.rollback.is_none());
    assert_eq!(surf.mutation_count(), 0);
    assert!(!surf.exists(&root()));
    assert!(control.calls().is_empty());
}

#[test]
fn oversized_spec_touches_nothing() {
    let specs = vec![ConnectorSpec::create().with_additional_overlay_planes(usize::MAX)];
    let (session, surf, control) = provision(1, &specs);
    let err = session.err().unwrap();

    assert!(matches!(err.error, VkmsError::TooManyPlanes { .. }));
    assert!(err.rollback.is_none());
    assert_eq!(surf.mutation_count(), 0);
    assert!(control.calls().is_empty());
}

#[test]
fn custom_config_reaches_control() {
    let config = SessionConfig::builder()
        .drm_device("/dev/dri/card2")
        .backend_property("debug.drm.device")
        .service_name("composer")
        .settle_delay(Duration::ZERO)
        .build();
    let surf = test_surface(&config);
    let control = RecordingControl::new();

    let session =
        TopologySession::provision(config, surf, control.clone(), 1, &[]).unwrap();
    assert_eq!(session.config().service_name, "composer");
    assert_eq!(
        control.calls(),
        vec![
            (vk::CTL_STOP.to_string(), "composer".to_string()),
            ("debug.drm.device".to_string(), "/dev/dri/card2".to_string()),
            (vk::CTL_START.to_string(), "composer".to_string()),
        ]
    );
}

#[test]
fn toggle_service_picks_property() {
    let control = RecordingControl::new();
    control.toggle_service("composer", false).unwrap();
    control.toggle_service("composer", true).unwrap();

    assert_eq!(
        control.calls(),
        vec![
            (vk::CTL_STOP.to_string(), "composer".to_string()),
            (vk::CTL_START.to_string(), "composer".to_string()),
        ]
    );
}

#[test]
fn zero_displays_rejected() {
    let (session, surf, _control) = provision(0, &[]);
    assert_eq!(session.err().unwrap().error, VkmsError::NoConnectors);
    assert_eq!(surf.mutation_count(), 0);
}

#[test]
fn service_stop_failure_is_fatal() {
    let config = test_config();
    let surf = test_surface(&config);
    let control = RecordingControl::new();
    control.fail_property(vk::CTL_STOP);

    let err = TopologySession::provision(config, surf.clone(), control.clone(), 2, &[])
        .err()
        .unwrap();

    assert!(matches!(err.error, VkmsError::Property { .. }));
    // The backend was never switched and no topology was created
    assert_eq!(control.property("vendor.hwc.drm.device"), None);
    assert!(node_dirs(&surf).is_empty());
    assert!(!surf.exists(&root()));
}

#[test]
fn existing_instance_is_fatal() {
    let config = test_config();
    let surf = test_surface(&config);
    surf.create_dir(&config.root).unwrap();

    let err = TopologySession::provision(config, surf, RecordingControl::new(), 1, &[])
        .err()
        .unwrap();
    assert!(matches!(
        err.error,
        VkmsError::Resource {
            errno: Errno::EEXIST,
            ..
        }
    ));
}

#[test]
fn failure_mid_build_rolls_back() {
    let config = test_config();
    let surf = test_surface(&config);
    let control = RecordingControl::new();
    // Connector 0's primary plane
    surf.fail_on(&node_path(NodeId::plane(1)), Errno::ENOMEM);

    let err = TopologySession::provision(config, surf.clone(), control.clone(), 2, &[])
        .err()
        .unwrap();

    assert_eq!(
        err.error,
        VkmsError::Resource {
            op: "create",
            path: node_path(NodeId::plane(1)),
            errno: Errno::ENOMEM,
        }
    );
    let report = err.rollback.unwrap();
    assert!(report.removed_root(&root()));
    assert!(report
        .unlinked
        .contains(&node_path(NodeId::plane(0)).join("possible_crtcs/CRTC_0")));

    assert!(node_dirs(&surf).is_empty());
    assert!(!surf.exists(&root()));
    // The composer was never restarted
    assert_eq!(control.property(vk::CTL_START), None);
}

#[test]
fn enable_failure_rolls_back() {
    let config = test_config();
    let surf = test_surface(&config);
    surf.fail_on(&config.enabled_path(), Errno::EINVAL);

    let err = TopologySession::provision(config, surf.clone(), RecordingControl::new(), 2, &[])
        .err()
        .unwrap();

    assert!(matches!(
        err.error,
        VkmsError::Resource {
            errno: Errno::EINVAL,
            ..
        }
    ));
    assert!(err.rollback.is_some());
    assert!(node_dirs(&surf).is_empty());
}

#[test]
fn service_start_failure_rolls_back() {
    let config = test_config();
    let surf = test_surface(&config);
    let control = RecordingControl::new();
    control.fail_property(vk::CTL_START);

    let err = TopologySession::provision(config, surf.clone(), control, 1, &[])
        .err()
        .unwrap();

    assert!(matches!(err.error, VkmsError::Property { .. }));
    assert!(!surf.exists(&root()));
}

#[test]
fn teardown_skips_undeletable_dirs() {
    let (session, surf, _control) = provision(2, &[]);
    let mut session = session.unwrap();
    let stuck = node_path(NodeId::crtc(1));
    surf.pin(&stuck);

    let report = session.teardown().unwrap();

    assert_eq!(node_dirs(&surf), vec![stuck.clone()]);
    assert!(report.skipped.contains(&stuck));
    assert!(!report.kernel_owned.contains(&stuck));
    assert!(!report.removed_root(&root()));
    assert_eq!(session.state(), SessionState::TornDown);
}

#[test]
fn rollback_leaves_only_undeletable_dirs() {
    let config = test_config();
    let surf = test_surface(&config);
    let stuck = node_path(NodeId::crtc(0));
    surf.pin(&stuck);
    surf.fail_on(&node_path(NodeId::plane(2)), Errno::EACCES);

    let err = TopologySession::provision(config, surf.clone(), RecordingControl::new(), 2, &[])
        .err()
        .unwrap();

    assert!(err.rollback.unwrap().skipped.contains(&stuck));
    assert_eq!(node_dirs(&surf), vec![stuck]);
}

#[test]
fn teardown_disables_driver_first() {
    let (session, surf, control) = provision(1, &[]);
    let mut session = session.unwrap();
    surf.pin(&root());

    session.teardown().unwrap();

    // The instance survived, so the enabled attribute is still visible
    assert_eq!(
        surf.file_contents(&root().join("enabled")),
        Some(b"0".to_vec())
    );
    assert_eq!(control.calls().last().unwrap().0, vk::CTL_STOP);
    assert!(node_dirs(&surf).is_empty());
}

#[test]
fn clean_teardown_has_no_leftovers() {
    let (session, _surf, _control) = provision(2, &[]);
    let mut session = session.unwrap();

    let report = session.teardown().unwrap();

    assert!(report.skipped.is_empty(), "{:?}", report.skipped);
    assert!(report.removed_root(&root()));
    // Default groups refuse removal and go with their parent
    assert!(report.kernel_owned.contains(&root().join("connectors")));
    assert!(report
        .kernel_owned
        .contains(&node_path(NodeId::connector(0)).join("possible_encoders")));
}

#[test]
fn teardown_runs_once() {
    let (session, _surf, _control) = provision(1, &[]);
    let mut session = session.unwrap();

    assert!(session.teardown().is_some());
    assert!(session.teardown().is_none());
}

#[test]
fn drop_tears_down() {
    let (session, surf, _control) = provision(2, &[]);
    drop(session.unwrap());

    assert!(node_dirs(&surf).is_empty());
    assert!(!surf.exists(&root()));
}

#[test]
fn disabled_cleanup_leaves_topology() {
    let (session, surf, control) = provision(2, &[]);
    let mut session = session.unwrap();
    session.disable_cleanup_on_destruction();

    assert!(session.teardown().is_none());
    drop(session);
    assert_eq!(node_dirs(&surf).len(), 2 + 2 + 2 + 4);

    // Something else can still clear it out later
    let report = MemSession::force_delete_with(test_config(), surf.clone(), control);
    assert!(report.removed_root(&root()));
    assert!(!surf.exists(&root()));
}

#[test]
fn force_delete_without_instance() {
    let config = test_config();
    let surf = test_surface(&config);
    let report = MemSession::force_delete_with(config, surf.clone(), RecordingControl::new());

    assert!(report.removed.is_empty());
    assert!(report.unlinked.is_empty());
    assert_eq!(surf.mutation_count(), 0);
}

// ---------------------------------------------------------------
// Real filesystem
// ---------------------------------------------------------------

/// A topology root on a temp dir with the resource groups in place,
/// since nothing creates them for us outside configfs
fn configfs_graph(tmp: &Path) -> ResourceGraph<vk::ConfigFs> {
    let root = tmp.join("my-vkms");
    let graph = ResourceGraph::new(root.clone(), vk::ConfigFs::new());
    graph.create_root().unwrap();
    for kind in [
        ResourceKind::Connector,
        ResourceKind::Crtc,
        ResourceKind::Encoder,
        ResourceKind::Plane,
    ] {
        std::fs::create_dir(root.join(kind.group())).unwrap();
    }
    graph
}

#[test]
fn configfs_builds_links() {
    let tmp = tempfile::TempDir::new().unwrap();
    let graph = configfs_graph(tmp.path());

    graph.create_node(NodeId::crtc(0)).unwrap();
    graph.create_node(NodeId::plane(0)).unwrap();
    graph.set_plane_type(0, PlaneType::Cursor).unwrap();
    graph.link(NodeId::plane(0), NodeId::crtc(0)).unwrap();

    let plane_dir = graph.node_path(NodeId::plane(0));
    assert_eq!(std::fs::read_to_string(plane_dir.join("type")).unwrap(), "2");
    assert_eq!(
        std::fs::read_link(plane_dir.join("possible_crtcs/CRTC_0")).unwrap(),
        graph.node_path(NodeId::crtc(0))
    );
    assert!(graph.surface().is_dir(&plane_dir));
    assert!(!graph.surface().is_dir(&plane_dir.join("possible_crtcs/CRTC_0")));
}

#[test]
fn configfs_status_is_truncated() {
    let tmp = tempfile::TempDir::new().unwrap();
    let graph = configfs_graph(tmp.path());
    graph.create_node(NodeId::connector(0)).unwrap();

    graph.set_status(0, ConnectorStatus::Disconnected).unwrap();
    graph.set_status(0, ConnectorStatus::Connected).unwrap();
    assert_eq!(
        graph.connector_status(0),
        Ok(Some(ConnectorStatus::Connected))
    );
}

#[test]
fn configfs_teardown_unlinks_first() {
    let tmp = tempfile::TempDir::new().unwrap();
    let graph = configfs_graph(tmp.path());
    graph.create_node(NodeId::crtc(0)).unwrap();
    graph.create_node(NodeId::encoder(0)).unwrap();
    graph.link(NodeId::encoder(0), NodeId::crtc(0)).unwrap();

    let config = SessionConfig::builder()
        .root(graph.root())
        .settle_delay(Duration::ZERO)
        .build();
    let report = TopologySession::force_delete_with(config, vk::ConfigFs::new(), RecordingControl::new());

    let encoder_dir = graph.node_path(NodeId::encoder(0));
    assert_eq!(report.unlinked, vec![encoder_dir.join("possible_crtcs/CRTC_0")]);
    assert!(!encoder_dir.exists());
    assert!(!graph.node_path(NodeId::crtc(0)).exists());
    // A plain directory keeps the enabled file, so the root stays
    assert!(report.skipped.contains(&graph.root().to_path_buf()));
}
