// System properties and service control
//
// The composer is toggled through Android's init: setting `ctl.start`
// or `ctl.stop` to a service name starts or stops that service. The
// same property store also selects which DRM device the composer opens.
//
// Austin Shafer - 2025
use crate::{Result, VkmsError};
use utils::log;

use std::cell::RefCell;
use std::collections::HashMap;
use std::process::Command;
use std::rc::Rc;

pub const CTL_START: &str = "ctl.start";
pub const CTL_STOP: &str = "ctl.stop";

pub trait SystemControl {
    fn set_property(&self, key: &str, value: &str) -> Result<()>;

    fn start_service(&self, name: &str) -> Result<()> {
        self.set_property(CTL_START, name)
    }

    fn stop_service(&self, name: &str) -> Result<()> {
        self.set_property(CTL_STOP, name)
    }

    /// Start or stop `name`
    fn toggle_service(&self, name: &str, enable: bool) -> Result<()> {
        match enable {
            true => self.start_service(name),
            false => self.stop_service(name),
        }
    }
}

/// Sets properties with the `setprop` tool
#[derive(Debug, Default, Copy, Clone)]
pub struct Setprop;

impl Setprop {
    pub fn new() -> Self {
        Self
    }
}

impl SystemControl for Setprop {
    fn set_property(&self, key: &str, value: &str) -> Result<()> {
        let err = |reason: String| {
            log::error!("Failed to set property {} to {}: {}", key, value, reason);
            VkmsError::Property {
                key: key.to_string(),
                value: value.to_string(),
                reason: reason,
            }
        };

        let status = Command::new("setprop")
            .arg(key)
            .arg(value)
            .status()
            .map_err(|e| err(e.to_string()))?;
        if !status.success() {
            return Err(err(format!("setprop exited with {}", status)));
        }

        log::info!("Successfully set property {} to {}", key, value);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    rs_calls: Vec<(String, String)>,
    rs_failures: HashMap<String, String>,
}

/// Records property writes instead of performing them
///
/// Clones share the same record, so a test can hold on to one while a
/// session owns another.
#[derive(Debug, Default, Clone)]
pub struct RecordingControl {
    rc_state: Rc<RefCell<RecordingState>>,
}

impl RecordingControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write of `key` fail
    pub fn fail_property(&self, key: &str) {
        self.rc_state
            .borrow_mut()
            .rs_failures
            .insert(key.to_string(), "injected failure".to_string());
    }

    /// Every successful (key, value) write, in order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.rc_state.borrow().rs_calls.clone()
    }

    /// The last value written to `key`
    pub fn property(&self, key: &str) -> Option<String> {
        self.rc_state
            .borrow()
            .rs_calls
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

impl SystemControl for RecordingControl {
    fn set_property(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.rc_state.borrow_mut();
        if let Some(reason) = state.rs_failures.get(key) {
            return Err(VkmsError::Property {
                key: key.to_string(),
                value: value.to_string(),
                reason: reason.clone(),
            });
        }

        state.rs_calls.push((key.to_string(), value.to_string()));
        Ok(())
    }
}
