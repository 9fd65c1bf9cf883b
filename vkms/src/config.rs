// Session configuration
//
// Austin Shafer - 2025
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the vkms configfs subsystem lives
pub const VKMS_CONFIGFS_DIR: &str = "/config/vkms";
/// Our instance under it. The name itself is arbitrary.
pub const VKMS_INSTANCE_NAME: &str = "my-vkms";

/// Parameters for a TopologySession
///
/// The defaults describe an Android device running the HWC3
/// composer on top of vkms.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The topology root, i.e. our vkms instance directory
    pub root: PathBuf,
    /// DRM node the composer should open once vkms is enabled
    pub drm_device: String,
    /// Property selecting the composer's DRM device
    pub backend_property: String,
    /// Name of the composer service
    pub service_name: String,
    /// How long to wait for the kernel to release resources after
    /// disabling vkms and before touching any directories
    pub settle_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root: Path::new(VKMS_CONFIGFS_DIR).join(VKMS_INSTANCE_NAME),
            drm_device: "/dev/dri/card1".to_string(),
            backend_property: "vendor.hwc.drm.device".to_string(),
            service_name: "vendor.hwcomposer-3".to_string(),
            settle_delay: Duration::from_millis(500),
        }
    }
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder {
            sc: SessionConfig::default(),
        }
    }

    /// Path of the driver's top level `enabled` attribute
    pub fn enabled_path(&self) -> PathBuf {
        self.root.join("enabled")
    }
}

/// Implements the builder pattern for easier config creation
pub struct SessionConfigBuilder {
    sc: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn root<'a>(&'a mut self, root: impl Into<PathBuf>) -> &'a mut Self {
        self.sc.root = root.into();
        self
    }

    pub fn drm_device<'a>(&'a mut self, dev: &str) -> &'a mut Self {
        self.sc.drm_device = dev.to_string();
        self
    }

    pub fn backend_property<'a>(&'a mut self, key: &str) -> &'a mut Self {
        self.sc.backend_property = key.to_string();
        self
    }

    pub fn service_name<'a>(&'a mut self, name: &str) -> &'a mut Self {
        self.sc.service_name = name.to_string();
        self
    }

    pub fn settle_delay<'a>(&'a mut self, delay: Duration) -> &'a mut Self {
        self.sc.settle_delay = delay;
        self
    }

    pub fn build(&self) -> SessionConfig {
        self.sc.clone()
    }
}
