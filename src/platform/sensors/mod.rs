pub mod lhm_tree;
#[cfg(windows)]
pub mod lhm_wmi;
pub mod sysinfo_monitor;

use log::info;

use crate::core::hardware::{HardwareMonitor, MonitorOptions, MonitorSession};
use crate::error::{DiagError, Result};

pub use sysinfo_monitor::SysinfoMonitor;

/// Tries each backend in order and opens the first that succeeds.
pub struct FallbackMonitor {
    backends: Vec<(&'static str, Box<dyn HardwareMonitor + Send + Sync>)>,
}

impl FallbackMonitor {
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Append a backend, tried after the ones already added.
    pub fn with<M>(mut self, name: &'static str, backend: M) -> Self
    where
        M: HardwareMonitor + Send + Sync + 'static,
    {
        self.backends.push((name, Box::new(backend)));
        self
    }
}

impl Default for FallbackMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareMonitor for FallbackMonitor {
    fn open(&self, options: &MonitorOptions) -> Result<Box<dyn MonitorSession>> {
        let mut last_error = None;
        for (name, backend) in &self.backends {
            match backend.open(options) {
                Ok(session) => {
                    info!("Using {} sensor backend", name);
                    return Ok(session);
                }
                Err(e) => {
                    info!("{} sensor backend unavailable: {}", name, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| DiagError::monitor_unavailable("no sensor backend configured")))
    }
}

/// LibreHardwareMonitor first, sysinfo when it is not running.
#[cfg(windows)]
pub fn platform_monitor() -> FallbackMonitor {
    FallbackMonitor::new()
        .with("LibreHardwareMonitor", lhm_wmi::LhmWmiMonitor)
        .with("sysinfo", SysinfoMonitor)
}

#[cfg(not(windows))]
pub fn platform_monitor() -> FallbackMonitor {
    FallbackMonitor::new().with("sysinfo", SysinfoMonitor)
}
