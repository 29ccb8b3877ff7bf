//! Portable sensor backend on top of `sysinfo::Components`.
//!
//! sysinfo only exposes temperatures, flat and labelled by the kernel driver
//! (`coretemp Package id 0`, `amdgpu edge`, `nvme Composite`). The driver
//! token decides which unit a component belongs to.

use log::debug;
use sysinfo::Components;

use crate::core::hardware::{
    GpuVendor, HardwareKind, HardwareMonitor, HardwareUnit, MonitorOptions, MonitorSession, Sensor,
    SensorKind,
};
use crate::error::Result;

pub struct SysinfoMonitor;

impl HardwareMonitor for SysinfoMonitor {
    fn open(&self, options: &MonitorOptions) -> Result<Box<dyn MonitorSession>> {
        let components = Components::new_with_refreshed_list();
        debug!("sysinfo reports {} component(s)", components.list().len());

        let mut session = SysinfoSession {
            components,
            options: *options,
            units: Vec::new(),
            assignment: Vec::new(),
        };
        session.rebuild();
        Ok(Box::new(session))
    }
}

struct SysinfoSession {
    components: Components,
    options: MonitorOptions,
    units: Vec<HardwareUnit>,
    /// Unit identifier per component, by index
    assignment: Vec<Option<String>>,
}

impl SysinfoSession {
    fn rebuild(&mut self) {
        let readings: Vec<(String, Option<f32>)> = self
            .components
            .list()
            .iter()
            .map(|c| (c.label().to_string(), c.temperature()))
            .collect();
        let (units, assignment) = group_readings(&readings, &self.options);
        self.units = units;
        self.assignment = assignment;
    }
}

impl MonitorSession for SysinfoSession {
    fn hardware(&self) -> &[HardwareUnit] {
        &self.units
    }

    fn update(&mut self, identifier: &str) {
        let mut touched = false;
        for (component, unit) in self.components.list_mut().iter_mut().zip(&self.assignment) {
            if unit.as_deref() == Some(identifier) {
                component.refresh();
                touched = true;
            }
        }
        if touched {
            self.rebuild();
        }
    }
}

/// Map a driver token to a unit kind and display name.
fn classify_driver(driver: &str) -> Option<(HardwareKind, &'static str)> {
    let kind = match driver {
        "coretemp" | "k10temp" | "zenpower" | "cpu" | "cpu_thermal" | "package" => {
            (HardwareKind::Cpu, "CPU")
        }
        "amdgpu" | "radeon" => (HardwareKind::Gpu(GpuVendor::Amd), "AMD GPU"),
        "nouveau" | "nvidia" => (HardwareKind::Gpu(GpuVendor::Nvidia), "NVIDIA GPU"),
        "i915" | "xe" => (HardwareKind::Gpu(GpuVendor::Intel), "Intel GPU"),
        "nvme" | "drivetemp" => (HardwareKind::Storage, "Drive"),
        _ => return None,
    };
    Some(kind)
}

fn split_label(label: &str) -> (String, String) {
    let label = label.trim();
    match label.split_once(char::is_whitespace) {
        Some((driver, rest)) if !rest.trim().is_empty() => {
            (driver.to_lowercase(), rest.trim().to_string())
        }
        _ => (label.to_lowercase(), label.to_string()),
    }
}

/// Group labelled temperature readings into hardware units.
///
/// Storage drivers report one set of sensors per drive, so a repeated sensor
/// name opens a new drive unit. Returns the units and, for every reading, the
/// identifier of the unit it landed in.
pub fn group_readings(
    readings: &[(String, Option<f32>)],
    options: &MonitorOptions,
) -> (Vec<HardwareUnit>, Vec<Option<String>>) {
    let mut units: Vec<HardwareUnit> = Vec::new();
    let mut assignment = Vec::with_capacity(readings.len());

    for (label, value) in readings {
        let (driver, sensor_name) = split_label(label);
        let Some((kind, display)) = classify_driver(&driver) else {
            assignment.push(None);
            continue;
        };
        if !options.allows(kind) {
            assignment.push(None);
            continue;
        }

        let sensor = Sensor::new(
            sensor_name.clone(),
            SensorKind::Temperature,
            value.filter(|v| v.is_finite()),
        );
        let value_is_new = |unit: &HardwareUnit| !unit.sensors.iter().any(|s| s.name == sensor_name);

        let position = if kind == HardwareKind::Storage {
            units
                .iter()
                .rposition(|u| u.identifier.starts_with(&format!("/sysinfo/{}/", driver)))
                .filter(|&i| value_is_new(&units[i]))
        } else {
            units.iter().position(|u| u.kind == kind)
        };

        let index = match position {
            Some(index) => index,
            None => {
                let (identifier, name) = if kind == HardwareKind::Storage {
                    let ordinal = units
                        .iter()
                        .filter(|u| u.identifier.starts_with(&format!("/sysinfo/{}/", driver)))
                        .count();
                    (
                        format!("/sysinfo/{}/{}", driver, ordinal),
                        format!("{} {} #{}", display, driver, ordinal),
                    )
                } else {
                    (format!("/sysinfo/{}", driver), display.to_string())
                };
                units.push(HardwareUnit::new(identifier, name, kind));
                units.len() - 1
            }
        };

        units[index].sensors.push(sensor);
        assignment.push(Some(units[index].identifier.clone()));
    }

    (units, assignment)
}
