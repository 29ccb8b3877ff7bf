//! LibreHardwareMonitor backend through its WMI provider.
//!
//! Only available while LibreHardwareMonitor itself is running; the
//! namespace disappears when it exits.

use log::{debug, info};
use wmi::WMIConnection;

use super::lhm_tree::{apply_sensor_rows, build_tree, LhmHardware, LhmSensor};
use crate::core::hardware::{HardwareMonitor, HardwareUnit, MonitorOptions, MonitorSession};
use crate::error::{DiagError, Result};

pub const LHM_NAMESPACE: &str = "root\\LibreHardwareMonitor";

pub struct LhmWmiMonitor;

impl HardwareMonitor for LhmWmiMonitor {
    fn open(&self, options: &MonitorOptions) -> Result<Box<dyn MonitorSession>> {
        let con = WMIConnection::with_namespace_path(LHM_NAMESPACE).map_err(|e| {
            DiagError::monitor_unavailable(format!("cannot connect to {}: {}", LHM_NAMESPACE, e))
        })?;

        let hardware: Vec<LhmHardware> = con
            .query()
            .map_err(|e| DiagError::monitor_unavailable(format!("Hardware query failed: {}", e)))?;
        if hardware.is_empty() {
            return Err(DiagError::monitor_unavailable(
                "LibreHardwareMonitor publishes no hardware",
            ));
        }

        let sensors: Vec<LhmSensor> = con
            .query()
            .map_err(|e| DiagError::monitor_unavailable(format!("Sensor query failed: {}", e)))?;

        info!(
            "LibreHardwareMonitor: {} hardware node(s), {} sensor(s)",
            hardware.len(),
            sensors.len()
        );
        let units = build_tree(&hardware, &sensors, options);
        Ok(Box::new(LhmWmiSession { con, units }))
    }
}

struct LhmWmiSession {
    con: WMIConnection,
    units: Vec<HardwareUnit>,
}

impl MonitorSession for LhmWmiSession {
    fn hardware(&self) -> &[HardwareUnit] {
        &self.units
    }

    fn update(&mut self, identifier: &str) {
        let query = format!(
            "SELECT * FROM Sensor WHERE Parent = '{}'",
            identifier.replace('\\', "\\\\").replace('\'', "\\'")
        );
        match self.con.raw_query::<LhmSensor>(&query) {
            Ok(rows) => {
                apply_sensor_rows(&mut self.units, identifier, &rows);
            }
            Err(e) => debug!("Sensor refresh for {} failed: {}", identifier, e),
        }
    }
}
