//! Sensor tree model and the "best matching sensor" reads.
//!
//! A monitor session exposes a tree of [`HardwareUnit`]s. Each unit owns typed
//! [`Sensor`]s and may contain sub-units (a Super I/O chip under the
//! motherboard, for instance). The read functions here are pure: they never
//! touch the session, they only walk an already refreshed tree.

use crate::error::Result;

/// GPU vendor family carried on GPU units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuVendor {
    Amd,
    Nvidia,
    Intel,
}

impl GpuVendor {
    /// Vendors the probe accepts when looking for a GPU. Order carries no
    /// preference: the first GPU unit found in the tree wins.
    pub const ACCEPTED: [GpuVendor; 3] = [GpuVendor::Amd, GpuVendor::Nvidia, GpuVendor::Intel];
}

/// Category of a hardware unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareKind {
    Cpu,
    Gpu(GpuVendor),
    Motherboard,
    SuperIo,
    Storage,
    Memory,
    Controller,
    Network,
    Other,
}

impl HardwareKind {
    /// Parse a LibreHardwareMonitor `HardwareType` value.
    pub fn from_lhm(value: &str) -> Self {
        match value {
            "Cpu" => HardwareKind::Cpu,
            "GpuNvidia" => HardwareKind::Gpu(GpuVendor::Nvidia),
            "GpuAmd" => HardwareKind::Gpu(GpuVendor::Amd),
            "GpuIntel" => HardwareKind::Gpu(GpuVendor::Intel),
            "Motherboard" | "Mainboard" => HardwareKind::Motherboard,
            "SuperIO" => HardwareKind::SuperIo,
            "Storage" | "HDD" => HardwareKind::Storage,
            "Memory" | "RAM" => HardwareKind::Memory,
            "Cooler" | "EmbeddedController" | "Psu" | "Battery" => HardwareKind::Controller,
            "Network" => HardwareKind::Network,
            _ => HardwareKind::Other,
        }
    }
}

/// Category of a single sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Temperature,
    Load,
    Fan,
    Data,
    SmallData,
    Clock,
    Voltage,
    Power,
    Control,
    Other,
}

impl SensorKind {
    /// Parse a LibreHardwareMonitor `SensorType` value.
    pub fn from_lhm(value: &str) -> Self {
        match value {
            "Temperature" => SensorKind::Temperature,
            "Load" => SensorKind::Load,
            "Fan" => SensorKind::Fan,
            "Data" => SensorKind::Data,
            "SmallData" => SensorKind::SmallData,
            "Clock" => SensorKind::Clock,
            "Voltage" => SensorKind::Voltage,
            "Power" => SensorKind::Power,
            "Control" => SensorKind::Control,
            _ => SensorKind::Other,
        }
    }

    /// Kinds that carry data quantities (memory sizes).
    pub fn is_data_quantity(self) -> bool {
        matches!(self, SensorKind::Data | SensorKind::SmallData)
    }
}

/// A single hardware-exposed measurement
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub name: String,
    pub kind: SensorKind,
    pub value: Option<f32>,
}

impl Sensor {
    pub fn new(name: impl Into<String>, kind: SensorKind, value: Option<f32>) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
        }
    }
}

/// A named hardware component with its sensors and sub-units
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareUnit {
    pub identifier: String,
    pub name: String,
    pub kind: HardwareKind,
    pub sensors: Vec<Sensor>,
    pub children: Vec<HardwareUnit>,
}

impl HardwareUnit {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>, kind: HardwareKind) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            kind,
            sensors: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_sensor(mut self, sensor: Sensor) -> Self {
        self.sensors.push(sensor);
        self
    }

    pub fn with_child(mut self, child: HardwareUnit) -> Self {
        self.children.push(child);
        self
    }
}

/// Hardware categories to enable when opening a monitor session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    pub cpu: bool,
    pub gpu: bool,
    pub motherboard: bool,
    pub storage: bool,
    pub controller: bool,
}

impl MonitorOptions {
    /// Everything the probe reads
    pub fn all() -> Self {
        Self {
            cpu: true,
            gpu: true,
            motherboard: true,
            storage: true,
            controller: true,
        }
    }

    /// Whether units of `kind` should be exposed by the session.
    pub fn allows(&self, kind: HardwareKind) -> bool {
        match kind {
            HardwareKind::Cpu => self.cpu,
            HardwareKind::Gpu(_) => self.gpu,
            HardwareKind::Motherboard | HardwareKind::SuperIo => self.motherboard,
            HardwareKind::Storage => self.storage,
            HardwareKind::Controller => self.controller,
            HardwareKind::Memory | HardwareKind::Network | HardwareKind::Other => false,
        }
    }
}

/// Source of hardware sensor sessions.
///
/// Implementations live in the platform layer; the probe only sees this trait.
pub trait HardwareMonitor {
    /// Open a session with the requested categories enabled
    fn open(&self, options: &MonitorOptions) -> Result<Box<dyn MonitorSession>>;
}

/// An open, stateful connection to a sensor backend
pub trait MonitorSession {
    /// Top-level hardware units enabled for this session
    fn hardware(&self) -> &[HardwareUnit];

    /// Re-read the sensor values of one unit (not its children)
    fn update(&mut self, identifier: &str);

    /// Release backend resources. Called exactly once per session.
    fn close(&mut self) {}
}

/// Motherboard identity as reported by firmware
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardIdentity {
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
}

/// Firmware/management query for board identity (SMBIOS, WMI, DMI)
pub trait BoardIdentitySource {
    fn query(&self) -> Result<BoardIdentity>;
}

/// Refresh every unit and sub-unit of the session, depth-first.
pub fn refresh_all(session: &mut dyn MonitorSession) {
    let mut identifiers = Vec::new();
    for unit in session.hardware() {
        collect_identifiers(unit, &mut identifiers);
    }
    for identifier in &identifiers {
        session.update(identifier);
    }
}

fn collect_identifiers(unit: &HardwareUnit, out: &mut Vec<String>) {
    out.push(unit.identifier.clone());
    for child in &unit.children {
        collect_identifiers(child, out);
    }
}

/// First unit (depth-first across the forest) matching `predicate`.
pub fn find_unit<'a, F>(units: &'a [HardwareUnit], predicate: F) -> Option<&'a HardwareUnit>
where
    F: Fn(&HardwareUnit) -> bool + Copy,
{
    for unit in units {
        if predicate(unit) {
            return Some(unit);
        }
        if let Some(found) = find_unit(&unit.children, predicate) {
            return Some(found);
        }
    }
    None
}

/// All units matching `predicate`, depth-first.
pub fn find_units<'a, F>(units: &'a [HardwareUnit], predicate: F) -> Vec<&'a HardwareUnit>
where
    F: Fn(&HardwareUnit) -> bool + Copy,
{
    let mut found = Vec::new();
    walk_units(units, &mut |unit| {
        if predicate(unit) {
            found.push(unit);
        }
    });
    found
}

fn walk_units<'a>(units: &'a [HardwareUnit], visit: &mut dyn FnMut(&'a HardwareUnit)) {
    for unit in units {
        visit(unit);
        walk_units(&unit.children, visit);
    }
}

/// Sensors of `unit` and its sub-units matching `matches`, depth-first in
/// declaration order.
pub fn collect_sensors<F>(unit: &HardwareUnit, matches: F) -> Vec<&Sensor>
where
    F: Fn(SensorKind) -> bool + Copy,
{
    let mut out = Vec::new();
    push_sensors(unit, matches, &mut out);
    out
}

fn push_sensors<'a, F>(unit: &'a HardwareUnit, matches: F, out: &mut Vec<&'a Sensor>)
where
    F: Fn(SensorKind) -> bool + Copy,
{
    out.extend(unit.sensors.iter().filter(|s| matches(s.kind)));
    for child in &unit.children {
        push_sensors(child, matches, out);
    }
}

/// Pick the best value among `sensors`.
///
/// Preferred names are tried in order (case-insensitive substring match) and
/// only sensors with a finite value count. Without a preferred hit the first
/// sensor carrying a finite value is used.
pub fn select_value(sensors: &[&Sensor], preferred: &[&str]) -> Option<f32> {
    let present = |s: &&Sensor| s.value.filter(|v| v.is_finite());

    for wanted in preferred {
        let wanted = wanted.to_lowercase();
        let hit = sensors
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&wanted))
            .find_map(present);
        if hit.is_some() {
            return hit;
        }
    }

    sensors.iter().find_map(present)
}

/// Temperature in °C rounded to one decimal. A missing unit reads as absent.
pub fn read_temperature(unit: Option<&HardwareUnit>, preferred: &[&str]) -> Option<f64> {
    let unit = unit?;
    let sensors = collect_sensors(unit, |kind| kind == SensorKind::Temperature);
    select_value(&sensors, preferred).map(round_one_decimal)
}

/// Load in percent rounded to one decimal.
pub fn read_load(unit: &HardwareUnit, preferred: &[&str]) -> Option<f64> {
    let sensors = collect_sensors(unit, |kind| kind == SensorKind::Load);
    select_value(&sensors, preferred).map(round_one_decimal)
}

/// Memory size in MB from the data-quantity sensors, rounded to an integer.
pub fn read_memory_mb(unit: &HardwareUnit, preferred: &[&str]) -> Option<u64> {
    let sensors = collect_sensors(unit, SensorKind::is_data_quantity);
    select_value(&sensors, preferred).and_then(|v| {
        let rounded = f64::from(v).round();
        (rounded >= 0.0).then_some(rounded as u64)
    })
}

/// Fan speed of a single sensor, rounded to whole RPM.
pub fn read_fan_rpm(sensor: &Sensor) -> Option<u32> {
    sensor.value.filter(|v| v.is_finite()).and_then(|v| {
        let rounded = f64::from(v).round();
        (rounded >= 0.0).then_some(rounded as u32)
    })
}

fn round_one_decimal(value: f32) -> f64 {
    (f64::from(value) * 10.0).round() / 10.0
}
