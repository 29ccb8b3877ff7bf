use chrono::{DateTime, Utc};
use serde::Serialize;

/// Overall health of one probe run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeStatus {
    Ok,
    Warn,
    Error,
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeStatus::Ok => write!(f, "OK"),
            ProbeStatus::Warn => write!(f, "WARN"),
            ProbeStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Complete hardware telemetry record of a single probe invocation.
///
/// Serialized field names follow the `hardwareProbe` node written by the
/// snapshot merger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareSnapshot {
    pub timestamp_utc: DateTime<Utc>,
    pub status: ProbeStatus,
    pub motherboard: MotherboardReading,
    pub cpu: CpuReading,
    pub gpu: GpuReading,
    pub storage: Vec<StorageReading>,
    pub fans: Vec<FanReading>,
    pub errors: Vec<String>,
}

impl HardwareSnapshot {
    /// An empty snapshot stamped with `timestamp_utc`, status `OK`.
    pub fn empty(timestamp_utc: DateTime<Utc>) -> Self {
        Self {
            timestamp_utc,
            status: ProbeStatus::Ok,
            motherboard: MotherboardReading::default(),
            cpu: CpuReading::default(),
            gpu: GpuReading::default(),
            storage: Vec::new(),
            fans: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Terminal snapshot for a collection attempt that could not run at all.
    pub fn failed(timestamp_utc: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Error,
            errors: vec![error.into()],
            ..Self::empty(timestamp_utc)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MotherboardReading {
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuReading {
    #[serde(rename = "temperatureC")]
    pub temperature_c: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuReading {
    pub name: Option<String>,
    #[serde(rename = "temperatureC")]
    pub temperature_c: Option<f64>,
    pub load_percent: Option<f64>,
    #[serde(rename = "vramTotalMB")]
    pub vram_total_mb: Option<u64>,
    #[serde(rename = "vramUsedMB")]
    pub vram_used_mb: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StorageReading {
    pub device: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "temperatureC")]
    pub temperature_c: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FanReading {
    pub name: Option<String>,
    pub rpm: Option<u32>,
}
