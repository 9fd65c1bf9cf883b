//! Topology sessions
//!
//! A `TopologySession` owns one vkms instance from setup to teardown.
//! Setup is all or nothing:
//!
//! 1. Stop the composer, point it at the vkms DRM node and create the
//!    instance directory.
//! 2. Flush the topology plan: CRTCs, encoders, connectors and planes
//!    along with their attributes and routing links.
//! 3. Enable vkms and start the composer again.
//!
//! If any step fails the whole instance is torn down again before the
//! error is returned, so a failed setup never leaves a half built
//! topology behind. Dropping a ready session tears it down too, unless
//! `disable_cleanup_on_destruction` was called.

// Austin Shafer - 2025
use crate::config::SessionConfig;
use crate::connector::{ConnectorSpec, ConnectorStatus};
use crate::control::{Setprop, SystemControl};
use crate::error::ProvisionError;
use crate::plan::TopologyPlan;
use crate::resource::ResourceGraph;
use crate::surface::{ConfigFs, ConfigSurface};
use crate::teardown::{self, TeardownReport};
use crate::{Result, VkmsError};
use utils::log;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unstarted,
    Provisioning,
    Ready,
    FailedRollback,
    TornDown,
}

pub struct TopologySession<S: ConfigSurface = ConfigFs, C: SystemControl = Setprop> {
    ts_config: SessionConfig,
    ts_graph: ResourceGraph<S>,
    ts_control: C,
    ts_state: SessionState,
    /// Set once provisioning completes
    ts_active_connectors: usize,
    /// Next free global plane index
    ts_next_plane: usize,
    ts_cleanup_disabled: bool,
}

impl TopologySession<ConfigFs, Setprop> {
    /// Set up `count` default displays on the real device
    ///
    /// Each display gets one CRTC, one encoder, a cursor plane and a
    /// primary plane. The first connector is eDP and the rest are
    /// DisplayPort, all starting disconnected.
    pub fn create_with_generic_connectors(
        count: usize,
    ) -> std::result::Result<Self, ProvisionError> {
        Self::provision(
            SessionConfig::default(),
            ConfigFs::new(),
            Setprop::new(),
            count,
            &[],
        )
    }

    /// Set up one display per spec on the real device
    pub fn create_with_specs(
        specs: &[ConnectorSpec],
    ) -> std::result::Result<Self, ProvisionError> {
        if specs.is_empty() {
            log::error!("Empty configuration provided. At least one connector must be specified.");
            return Err(ProvisionError {
                error: VkmsError::NoConnectors,
                rollback: None,
            });
        }

        Self::provision(
            SessionConfig::default(),
            ConfigFs::new(),
            Setprop::new(),
            specs.len(),
            specs,
        )
    }

    /// Tear down whatever vkms instance is on the real device
    ///
    /// Used to clear out a topology left behind by a session that had
    /// cleanup disabled.
    pub fn force_delete() -> TeardownReport {
        Self::force_delete_with(SessionConfig::default(), ConfigFs::new(), Setprop::new())
    }
}

impl<S: ConfigSurface, C: SystemControl> TopologySession<S, C> {
    /// Provision `count` displays on the given surface
    ///
    /// If `specs` is non-empty it must hold exactly `count` entries.
    /// Configuration errors are reported before anything is touched.
    /// Any later failure rolls back the whole instance, and the error
    /// carries the teardown report.
    pub fn provision(
        config: SessionConfig,
        surface: S,
        control: C,
        count: usize,
        specs: &[ConnectorSpec],
    ) -> std::result::Result<Self, ProvisionError> {
        let plan = TopologyPlan::build(count, specs).map_err(|e| {
            log::error!("Invalid display configuration: {}", e);
            ProvisionError {
                error: e,
                rollback: None,
            }
        })?;

        let mut session = Self {
            ts_graph: ResourceGraph::new(config.root.clone(), surface),
            ts_config: config,
            ts_control: control,
            ts_state: SessionState::Unstarted,
            ts_active_connectors: 0,
            ts_next_plane: 0,
            ts_cleanup_disabled: false,
        };

        match session.run_provisioning(&plan) {
            Ok(()) => {
                session.ts_state = SessionState::Ready;
                session.ts_active_connectors = plan.connector_count();
                session.ts_next_plane = plan.plane_count();
                Ok(session)
            }
            Err(e) => {
                log::error!("Failed to set up VKMS: {}", e);
                session.ts_state = SessionState::FailedRollback;
                let report =
                    teardown::teardown(&session.ts_config, &session.ts_graph, &session.ts_control);
                Err(ProvisionError {
                    error: e,
                    rollback: Some(report),
                })
            }
        }
    }

    fn run_provisioning(&mut self, plan: &TopologyPlan) -> Result<()> {
        self.ts_state = SessionState::Provisioning;

        // Nothing is safe to touch without knowing the composer is down
        self.ts_control
            .stop_service(&self.ts_config.service_name)?;
        self.set_vkms_as_display_driver()?;

        for op in plan.ops() {
            self.ts_graph.apply(op)?;
        }
        log::info!(
            "Successfully set up {} displays with {} planes",
            plan.connector_count(),
            plan.plane_count()
        );

        self.ts_graph.set_enabled(true)?;
        self.ts_control
            .start_service(&self.ts_config.service_name)?;
        Ok(())
    }

    /// Point the composer at vkms and create our instance
    fn set_vkms_as_display_driver(&self) -> Result<()> {
        self.ts_control
            .set_property(&self.ts_config.backend_property, &self.ts_config.drm_device)?;
        self.ts_graph.create_root()
    }

    /// Tear down a vkms instance without a session
    pub fn force_delete_with(config: SessionConfig, surface: S, control: C) -> TeardownReport {
        let graph = ResourceGraph::new(config.root.clone(), surface);
        teardown::teardown(&config, &graph, &control)
    }

    /// Connect or disconnect a connector, simulating a hotplug
    pub fn toggle_connector(&self, index: usize, enable: bool) -> Result<()> {
        if index >= self.ts_active_connectors {
            log::error!(
                "Connector {} is out of range, {} connectors exist",
                index,
                self.ts_active_connectors
            );
            return Err(VkmsError::ConnectorOutOfRange {
                index,
                count: self.ts_active_connectors,
            });
        }

        self.ts_graph
            .set_status(index, ConnectorStatus::from_enabled(enable))
    }

    /// Read back a connector's current status
    pub fn connector_status(&self, index: usize) -> Result<Option<ConnectorStatus>> {
        if index >= self.ts_active_connectors {
            return Err(VkmsError::ConnectorOutOfRange {
                index,
                count: self.ts_active_connectors,
            });
        }
        self.ts_graph.connector_status(index)
    }

    /// Leave the topology in place when this session goes away
    pub fn disable_cleanup_on_destruction(&mut self) {
        self.ts_cleanup_disabled = true;
    }

    /// Number of connectors created, connected or not
    pub fn active_connector_count(&self) -> usize {
        self.ts_active_connectors
    }

    /// Number of planes created across all connectors
    pub fn plane_count(&self) -> usize {
        self.ts_next_plane
    }

    pub fn state(&self) -> SessionState {
        self.ts_state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.ts_config
    }

    pub fn graph(&self) -> &ResourceGraph<S> {
        &self.ts_graph
    }

    /// Tear the topology down now
    ///
    /// Returns None without doing anything if cleanup was disabled, or
    /// if this session was already torn down.
    pub fn teardown(&mut self) -> Option<TeardownReport> {
        if self.ts_cleanup_disabled {
            log::info!("Skipping cleanup, it was disabled for this session");
            return None;
        }
        if self.ts_state == SessionState::TornDown {
            return None;
        }

        let report = teardown::teardown(&self.ts_config, &self.ts_graph, &self.ts_control);
        self.ts_state = SessionState::TornDown;
        Some(report)
    }
}

impl<S: ConfigSurface, C: SystemControl> Drop for TopologySession<S, C> {
    fn drop(&mut self) {
        // Failed setups have already been rolled back
        if self.ts_state == SessionState::Ready {
            self.teardown();
        }
    }
}
