//! Tree assembly for LibreHardwareMonitor's WMI provider.
//!
//! The provider publishes flat `Hardware` and `Sensor` class instances linked
//! by `Identifier`/`Parent`. These rows are plain data so the tree logic is
//! platform independent.

use serde::Deserialize;

use crate::core::hardware::{HardwareKind, HardwareUnit, MonitorOptions, Sensor, SensorKind};

/// Guard against malformed parent links
const MAX_DEPTH: usize = 8;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename = "Hardware")]
#[serde(rename_all = "PascalCase")]
pub struct LhmHardware {
    pub identifier: String,
    pub name: String,
    pub hardware_type: String,
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename = "Sensor")]
#[serde(rename_all = "PascalCase")]
pub struct LhmSensor {
    pub identifier: String,
    pub name: String,
    pub sensor_type: String,
    #[serde(default)]
    pub value: Option<f32>,
    pub parent: String,
}

impl LhmSensor {
    fn to_sensor(&self) -> Sensor {
        Sensor::new(
            self.name.clone(),
            SensorKind::from_lhm(&self.sensor_type),
            self.value.filter(|v| v.is_finite()),
        )
    }
}

/// Build the unit forest, keeping only categories enabled in `options`.
pub fn build_tree(
    hardware: &[LhmHardware],
    sensors: &[LhmSensor],
    options: &MonitorOptions,
) -> Vec<HardwareUnit> {
    let is_root = |hw: &LhmHardware| match hw.parent.as_deref() {
        None | Some("") => true,
        Some(parent) => !hardware.iter().any(|other| other.identifier == parent),
    };

    hardware
        .iter()
        .filter(|hw| is_root(hw))
        .filter_map(|hw| build_unit(hw, hardware, sensors, options, 0))
        .collect()
}

fn build_unit(
    hw: &LhmHardware,
    hardware: &[LhmHardware],
    sensors: &[LhmSensor],
    options: &MonitorOptions,
    depth: usize,
) -> Option<HardwareUnit> {
    let kind = HardwareKind::from_lhm(&hw.hardware_type);
    if !options.allows(kind) || depth > MAX_DEPTH {
        return None;
    }

    let mut unit = HardwareUnit::new(hw.identifier.clone(), hw.name.trim(), kind);
    unit.sensors = sensors_of(&hw.identifier, sensors);
    unit.children = hardware
        .iter()
        .filter(|child| child.parent.as_deref() == Some(hw.identifier.as_str()))
        .filter_map(|child| build_unit(child, hardware, sensors, options, depth + 1))
        .collect();
    Some(unit)
}

fn sensors_of(identifier: &str, sensors: &[LhmSensor]) -> Vec<Sensor> {
    sensors
        .iter()
        .filter(|s| s.parent == identifier)
        .map(LhmSensor::to_sensor)
        .collect()
}

/// Replace the sensors of unit `identifier` with freshly queried rows.
///
/// Returns `false` when no unit carries that identifier.
pub fn apply_sensor_rows(units: &mut [HardwareUnit], identifier: &str, rows: &[LhmSensor]) -> bool {
    for unit in units.iter_mut() {
        if unit.identifier == identifier {
            unit.sensors = sensors_of(identifier, rows);
            return true;
        }
        if apply_sensor_rows(&mut unit.children, identifier, rows) {
            return true;
        }
    }
    false
}
