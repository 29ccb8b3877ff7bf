//! Hardware telemetry: sensor tree model, sensor reads and the probe.

pub mod probe;
pub mod sensors;
pub mod types;

pub use probe::HardwareProbe;
pub use sensors::{
    BoardIdentity, BoardIdentitySource, GpuVendor, HardwareKind, HardwareMonitor, HardwareUnit,
    MonitorOptions, MonitorSession, Sensor, SensorKind,
};
pub use types::*;
