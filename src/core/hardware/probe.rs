//! Best-effort hardware telemetry collection.
//!
//! [`HardwareProbe::run`] never fails. Every missing signal becomes an entry
//! in the snapshot's `errors`, a step that faults is recorded and skipped, and
//! only a monitor that cannot be opened turns the whole snapshot into `ERROR`.

use std::panic::{self, AssertUnwindSafe};

use chrono::Utc;
use log::{debug, info, warn};

use super::sensors::{
    collect_sensors, find_unit, find_units, read_fan_rpm, read_load, read_memory_mb,
    read_temperature, refresh_all, BoardIdentity, BoardIdentitySource, GpuVendor, HardwareKind,
    HardwareMonitor, HardwareUnit, MonitorOptions, MonitorSession, SensorKind,
};
use super::types::{
    CpuReading, FanReading, GpuReading, HardwareSnapshot, MotherboardReading, ProbeStatus,
    StorageReading,
};
use crate::error::DiagError;

const CPU_TEMPERATURE: &[&str] = &["Package", "CPU Package", "Core"];
const GPU_TEMPERATURE: &[&str] = &["GPU Core", "Core", "Hot Spot", "Hotspot"];
const GPU_LOAD: &[&str] = &["GPU Core", "GPU Total", "Core"];
const GPU_MEMORY_TOTAL: &[&str] = &["Memory Total", "GPU Memory Total", "VRAM Total"];
const GPU_MEMORY_USED: &[&str] = &["Memory Used", "GPU Memory Used", "VRAM Used"];
const STORAGE_TEMPERATURE: &[&str] = &["Temperature", "Drive Temperature", "HDD Temperature"];

/// Firmware strings that vendors leave in place of a real value
const PLACEHOLDER_VALUES: &[&str] = &[
    "to be filled by o.e.m.",
    "default string",
    "not applicable",
    "none",
];

/// Collects one [`HardwareSnapshot`] per [`run`](HardwareProbe::run).
pub struct HardwareProbe {
    monitor: Box<dyn HardwareMonitor + Send + Sync>,
    board: Box<dyn BoardIdentitySource + Send + Sync>,
}

/// Closes the session on every exit path, unwinding included.
struct SessionGuard(Box<dyn MonitorSession>);

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}

impl HardwareProbe {
    pub fn new(
        monitor: Box<dyn HardwareMonitor + Send + Sync>,
        board: Box<dyn BoardIdentitySource + Send + Sync>,
    ) -> Self {
        Self { monitor, board }
    }

    /// Probe with the platform's default monitor and board identity source.
    pub fn with_platform_defaults() -> Self {
        Self::new(
            crate::platform::default_monitor(),
            crate::platform::default_board_identity(),
        )
    }

    /// Run every collection step in order and classify the result.
    ///
    /// Only a monitor that cannot be opened yields `ERROR`. A step that
    /// panics records one error for its category and the next step runs.
    pub fn run(&self) -> HardwareSnapshot {
        let timestamp = Utc::now();

        let opened = panic::catch_unwind(AssertUnwindSafe(|| {
            self.monitor.open(&MonitorOptions::all())
        }))
        .unwrap_or_else(|payload| Err(DiagError::monitor_unavailable(panic_message(payload.as_ref()))));

        let session = match opened {
            Ok(session) => session,
            Err(e) => {
                warn!("Hardware monitor could not be opened: {}", e);
                return HardwareSnapshot::failed(
                    timestamp,
                    format!("Hardware monitor could not be opened: {}", e),
                );
            }
        };
        let mut guard = SessionGuard(session);

        let mut snapshot = HardwareSnapshot::empty(timestamp);
        self.collect(guard.0.as_mut(), &mut snapshot);
        drop(guard);

        snapshot.status = if snapshot.errors.is_empty() {
            ProbeStatus::Ok
        } else {
            ProbeStatus::Warn
        };
        info!(
            "Hardware probe finished with status {} ({} issue(s))",
            snapshot.status,
            snapshot.errors.len()
        );
        snapshot
    }

    fn collect(&self, session: &mut dyn MonitorSession, snapshot: &mut HardwareSnapshot) {
        let errors = &mut snapshot.errors;

        debug!("Refreshing sensor tree");
        isolated(errors, "Sensor refresh failed", |_| refresh_all(session));
        let units = session.hardware();

        debug!("Reading motherboard identity");
        snapshot.motherboard = isolated(errors, "Motherboard information not available", |errors| {
            self.read_motherboard(units, errors)
        });

        debug!("Reading CPU sensors");
        snapshot.cpu = isolated(errors, "CPU temperature not available", |errors| {
            read_cpu(units, errors)
        });

        debug!("Reading GPU sensors");
        snapshot.gpu = isolated(errors, "GPU information not available", |errors| {
            read_gpu(units, errors)
        });

        debug!("Reading storage sensors");
        snapshot.storage = isolated(errors, "Storage information not available", |errors| {
            read_storage(units, errors)
        });

        debug!("Reading fan sensors");
        snapshot.fans = isolated(errors, "Fan information not available", |errors| {
            read_fans(units, errors)
        });
    }

    fn read_motherboard(
        &self,
        units: &[HardwareUnit],
        errors: &mut Vec<String>,
    ) -> MotherboardReading {
        let queried = panic::catch_unwind(AssertUnwindSafe(|| self.board.query()));
        let identity = match queried {
            Ok(Ok(identity)) => identity,
            Ok(Err(e)) => {
                debug!("Board identity query failed: {}", e);
                BoardIdentity::default()
            }
            Err(payload) => {
                debug!("Board identity query panicked: {}", panic_message(payload.as_ref()));
                BoardIdentity::default()
            }
        };

        let mut reading = MotherboardReading {
            vendor: usable(identity.vendor),
            model: usable(identity.model),
            serial: usable(identity.serial),
        };

        if reading.model.is_none() {
            reading.model = find_unit(units, |u| u.kind == HardwareKind::Motherboard)
                .and_then(|u| usable(Some(u.name.clone())));
        }

        if reading.vendor.is_none() && reading.model.is_none() {
            push_error(errors, "Motherboard information not available");
        }

        reading
    }
}

/// Run one collection step, turning a panic into an error entry and the
/// step's default value.
fn isolated<T, F>(errors: &mut Vec<String>, failure: &str, step: F) -> T
where
    T: Default,
    F: FnOnce(&mut Vec<String>) -> T,
{
    match panic::catch_unwind(AssertUnwindSafe(|| step(errors))) {
        Ok(value) => value,
        Err(payload) => {
            push_error(
                errors,
                format!("{}: {}", failure, panic_message(payload.as_ref())),
            );
            T::default()
        }
    }
}

fn read_cpu(units: &[HardwareUnit], errors: &mut Vec<String>) -> CpuReading {
    let cpu = find_unit(units, |u| u.kind == HardwareKind::Cpu);
    let temperature_c = read_temperature(cpu, CPU_TEMPERATURE);
    if temperature_c.is_none() {
        push_error(errors, "CPU temperature not available");
    }
    CpuReading { temperature_c }
}

fn read_gpu(units: &[HardwareUnit], errors: &mut Vec<String>) -> GpuReading {
    let gpu = find_unit(units, |u| {
        matches!(u.kind, HardwareKind::Gpu(vendor) if GpuVendor::ACCEPTED.contains(&vendor))
    });
    let Some(gpu) = gpu else {
        push_error(errors, "No GPU detected");
        return GpuReading::default();
    };

    let reading = GpuReading {
        name: Some(gpu.name.clone()),
        temperature_c: read_temperature(Some(gpu), GPU_TEMPERATURE),
        load_percent: read_load(gpu, GPU_LOAD),
        vram_total_mb: read_memory_mb(gpu, GPU_MEMORY_TOTAL),
        vram_used_mb: read_memory_mb(gpu, GPU_MEMORY_USED),
    };

    if reading.temperature_c.is_none() {
        push_error(errors, format!("GPU temperature not available ({})", gpu.name));
    }
    if reading.load_percent.is_none() {
        push_error(errors, format!("GPU load not available ({})", gpu.name));
    }
    if reading.vram_total_mb.is_none() || reading.vram_used_mb.is_none() {
        push_error(errors, format!("GPU VRAM information not available ({})", gpu.name));
    }

    reading
}

fn read_storage(units: &[HardwareUnit], errors: &mut Vec<String>) -> Vec<StorageReading> {
    let drives = find_units(units, |u| u.kind == HardwareKind::Storage);
    if drives.is_empty() {
        push_error(errors, "No storage devices detected");
        return Vec::new();
    }

    drives
        .into_iter()
        .map(|drive| {
            let temperature_c = read_temperature(Some(drive), STORAGE_TEMPERATURE);
            if temperature_c.is_none() {
                push_error(
                    errors,
                    format!("Storage temperature not available: {}", drive.name),
                );
            }
            StorageReading {
                device: Some(drive.name.clone()),
                model: Some(drive.name.clone()),
                temperature_c,
            }
        })
        .collect()
}

fn read_fans(units: &[HardwareUnit], errors: &mut Vec<String>) -> Vec<FanReading> {
    let sensors: Vec<_> = units
        .iter()
        .flat_map(|unit| collect_sensors(unit, |kind| kind == SensorKind::Fan))
        .collect();

    if sensors.is_empty() {
        push_error(errors, "No fan sensors detected");
        return Vec::new();
    }

    let fans: Vec<FanReading> = sensors
        .iter()
        .map(|sensor| FanReading {
            name: Some(sensor.name.clone()),
            rpm: read_fan_rpm(sensor),
        })
        .collect();

    let silent: Vec<&str> = fans
        .iter()
        .filter(|fan| fan.rpm.is_none())
        .filter_map(|fan| fan.name.as_deref())
        .collect();
    if !silent.is_empty() {
        push_error(errors, format!("Fan RPM not available: {}", silent.join(", ")));
    }

    fans
}

fn push_error(errors: &mut Vec<String>, message: impl Into<String>) {
    let message = message.into();
    warn!("{}", message);
    errors.push(message);
}

/// Trimmed firmware value, or `None` when empty or an OEM placeholder.
fn usable(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() || PLACEHOLDER_VALUES.contains(&trimmed.to_lowercase().as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "sensor backend panicked".to_string()
    }
}
