// Platform-specific sensor and firmware backends

pub mod firmware;
pub mod sensors;

use crate::core::hardware::{BoardIdentitySource, HardwareMonitor};

pub use firmware::{read_dmi_identity, FirmwareBoardIdentity};
pub use sensors::{FallbackMonitor, SysinfoMonitor};

/// Sensor backend chain for the current platform
pub fn default_monitor() -> Box<dyn HardwareMonitor + Send + Sync> {
    Box::new(sensors::platform_monitor())
}

/// Board identity source for the current platform
pub fn default_board_identity() -> Box<dyn BoardIdentitySource + Send + Sync> {
    Box::new(FirmwareBoardIdentity)
}
