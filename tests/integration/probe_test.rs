use pcdiag::core::hardware::{
    BoardIdentity, BoardIdentitySource, GpuReading, GpuVendor, HardwareKind, HardwareMonitor,
    HardwareProbe, HardwareSnapshot, HardwareUnit, MonitorOptions, MonitorSession,
    MotherboardReading, ProbeStatus, Sensor, SensorKind,
};
use pcdiag::error::{DiagError, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default, Clone)]
struct Tracker {
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

struct FakeMonitor {
    units: Vec<HardwareUnit>,
    tracker: Tracker,
    panic_on_update: bool,
}

struct FakeSession {
    units: Vec<HardwareUnit>,
    tracker: Tracker,
    panic_on_update: bool,
}

impl HardwareMonitor for FakeMonitor {
    fn open(&self, _options: &MonitorOptions) -> Result<Box<dyn MonitorSession>> {
        self.tracker.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            units: self.units.clone(),
            tracker: self.tracker.clone(),
            panic_on_update: self.panic_on_update,
        }))
    }
}

impl MonitorSession for FakeSession {
    fn hardware(&self) -> &[HardwareUnit] {
        &self.units
    }

    fn update(&mut self, _identifier: &str) {
        if self.panic_on_update {
            panic!("sensor driver crashed");
        }
    }

    fn close(&mut self) {
        self.tracker.closed.store(true, Ordering::SeqCst);
    }
}

struct UnavailableMonitor;

impl HardwareMonitor for UnavailableMonitor {
    fn open(&self, _options: &MonitorOptions) -> Result<Box<dyn MonitorSession>> {
        Err(DiagError::monitor_unavailable("driver not loaded"))
    }
}

struct PanickingMonitor;

impl HardwareMonitor for PanickingMonitor {
    fn open(&self, _options: &MonitorOptions) -> Result<Box<dyn MonitorSession>> {
        panic!("COM apartment already initialised")
    }
}

struct FakeBoard(Option<BoardIdentity>);

struct PanickingBoard;

impl BoardIdentitySource for PanickingBoard {
    fn query(&self) -> Result<BoardIdentity> {
        panic!("COM apartment already initialised")
    }
}

impl BoardIdentitySource for FakeBoard {
    fn query(&self) -> Result<BoardIdentity> {
        self.0
            .clone()
            .ok_or_else(|| DiagError::firmware("SMBIOS unavailable"))
    }
}

fn board_identity() -> BoardIdentity {
    BoardIdentity {
        vendor: Some("ASUSTeK COMPUTER INC.".into()),
        model: Some("ROG STRIX B550-F GAMING".into()),
        serial: Some("MB-1234567890".into()),
    }
}

fn healthy_tree() -> Vec<HardwareUnit> {
    let superio = HardwareUnit::new("/lpc/nct6798d", "Nuvoton NCT6798D", HardwareKind::SuperIo)
        .with_sensor(Sensor::new("CPU Fan", SensorKind::Fan, Some(1180.4)))
        .with_sensor(Sensor::new("Chassis Fan #1", SensorKind::Fan, Some(822.0)));
    let board = HardwareUnit::new("/motherboard", "ROG STRIX B550-F GAMING", HardwareKind::Motherboard)
        .with_child(superio);
    let cpu = HardwareUnit::new("/amdcpu/0", "AMD Ryzen 7 5800X", HardwareKind::Cpu)
        .with_sensor(Sensor::new("Core (Tctl/Tdie)", SensorKind::Temperature, Some(48.0)))
        .with_sensor(Sensor::new("CPU Package", SensorKind::Temperature, Some(52.36)));
    let gpu = HardwareUnit::new(
        "/gpu-nvidia/0",
        "NVIDIA GeForce RTX 3070",
        HardwareKind::Gpu(GpuVendor::Nvidia),
    )
    .with_sensor(Sensor::new("GPU Hot Spot", SensorKind::Temperature, Some(51.0)))
    .with_sensor(Sensor::new("GPU Core", SensorKind::Temperature, Some(44.04)))
    .with_sensor(Sensor::new("GPU Core", SensorKind::Load, Some(7.0)))
    .with_sensor(Sensor::new("GPU Memory Total", SensorKind::SmallData, Some(8192.0)))
    .with_sensor(Sensor::new("GPU Memory Used", SensorKind::SmallData, Some(1311.7)));
    let nvme = HardwareUnit::new("/nvme/0", "Samsung SSD 980 PRO 1TB", HardwareKind::Storage)
        .with_sensor(Sensor::new("Temperature", SensorKind::Temperature, Some(38.0)));

    vec![board, cpu, gpu, nvme]
}

/// Every null optional in the serialized snapshot must be explained by an
/// error of its category.
fn assert_nulls_explained(snapshot: &HardwareSnapshot) {
    let node = serde_json::to_value(snapshot).unwrap();
    let errors: Vec<String> = node["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_lowercase)
        .collect();

    let board = &node["motherboard"];
    if board["vendor"].is_null() && board["model"].is_null() {
        assert!(explained_by(&errors, &["motherboard"]), "motherboard unexplained: {:?}", errors);
    }

    if node["cpu"]["temperatureC"].is_null() {
        assert!(explained_by(&errors, &["cpu temperature"]), "cpu unexplained: {:?}", errors);
    }

    let gpu = &node["gpu"];
    if gpu["name"].is_null() {
        assert!(explained_by(&errors, &["gpu"]), "gpu unexplained: {:?}", errors);
    } else {
        for (field, needle) in [
            ("temperatureC", "gpu temperature"),
            ("loadPercent", "gpu load"),
            ("vramTotalMB", "gpu vram"),
            ("vramUsedMB", "gpu vram"),
        ] {
            if gpu[field].is_null() {
                assert!(explained_by(&errors, &[needle]), "gpu.{} unexplained: {:?}", field, errors);
            }
        }
    }

    let storage = node["storage"].as_array().unwrap();
    if storage.is_empty() {
        assert!(explained_by(&errors, &["storage"]), "storage unexplained: {:?}", errors);
    }
    for drive in storage {
        if drive["temperatureC"].is_null() {
            let device = drive["device"].as_str().unwrap_or_default();
            assert!(
                explained_by(&errors, &["storage temperature", device]),
                "{} unexplained: {:?}",
                device,
                errors
            );
        }
    }

    let fans = node["fans"].as_array().unwrap();
    if fans.is_empty() {
        assert!(explained_by(&errors, &["fan"]), "fans unexplained: {:?}", errors);
    }
    for fan in fans {
        if fan["rpm"].is_null() {
            let name = fan["name"].as_str().unwrap_or_default();
            assert!(explained_by(&errors, &["fan rpm", name]), "{} unexplained: {:?}", name, errors);
        }
    }
}

fn explained_by(errors: &[String], needles: &[&str]) -> bool {
    errors
        .iter()
        .any(|e| needles.iter().all(|n| e.contains(&n.to_lowercase())))
}

fn probe(units: Vec<HardwareUnit>, board: Option<BoardIdentity>) -> (HardwareProbe, Tracker) {
    let tracker = Tracker::default();
    let monitor = FakeMonitor {
        units,
        tracker: tracker.clone(),
        panic_on_update: false,
    };
    (
        HardwareProbe::new(Box::new(monitor), Box::new(FakeBoard(board))),
        tracker,
    )
}

#[test]
fn test_healthy_machine_reports_ok() {
    let (probe, tracker) = probe(healthy_tree(), Some(board_identity()));
    let snapshot = probe.run();

    assert_eq!(snapshot.status, ProbeStatus::Ok);
    assert!(snapshot.errors.is_empty(), "unexpected errors: {:?}", snapshot.errors);

    assert_eq!(snapshot.motherboard.vendor.as_deref(), Some("ASUSTeK COMPUTER INC."));
    assert_eq!(snapshot.motherboard.serial.as_deref(), Some("MB-1234567890"));
    assert_eq!(snapshot.cpu.temperature_c, Some(52.4));

    assert_eq!(snapshot.gpu.name.as_deref(), Some("NVIDIA GeForce RTX 3070"));
    assert_eq!(snapshot.gpu.temperature_c, Some(44.0));
    assert_eq!(snapshot.gpu.load_percent, Some(7.0));
    assert_eq!(snapshot.gpu.vram_total_mb, Some(8192));
    assert_eq!(snapshot.gpu.vram_used_mb, Some(1312));

    assert_eq!(snapshot.storage.len(), 1);
    assert_eq!(snapshot.storage[0].temperature_c, Some(38.0));

    let fans: Vec<(&str, Option<u32>)> = snapshot
        .fans
        .iter()
        .map(|f| (f.name.as_deref().unwrap_or(""), f.rpm))
        .collect();
    assert_eq!(fans, vec![("CPU Fan", Some(1180)), ("Chassis Fan #1", Some(822))]);

    assert_eq!(tracker.opened.load(Ordering::SeqCst), 1);
    assert!(tracker.closed.load(Ordering::SeqCst));
    assert_nulls_explained(&snapshot);
}

#[test]
fn test_empty_tree_warns_in_collection_order() {
    let (probe, tracker) = probe(Vec::new(), None);
    let snapshot = probe.run();

    assert_eq!(snapshot.status, ProbeStatus::Warn);
    assert_eq!(
        snapshot.errors,
        vec![
            "Motherboard information not available",
            "CPU temperature not available",
            "No GPU detected",
            "No storage devices detected",
            "No fan sensors detected",
        ]
    );
    assert_eq!(snapshot.motherboard, MotherboardReading::default());
    assert_eq!(snapshot.cpu.temperature_c, None);
    assert_eq!(snapshot.gpu, GpuReading::default());
    assert!(snapshot.storage.is_empty());
    assert!(snapshot.fans.is_empty());
    assert!(tracker.closed.load(Ordering::SeqCst));
    assert_nulls_explained(&snapshot);
}

#[test]
fn test_unavailable_monitor_is_an_error_snapshot() {
    let probe = HardwareProbe::new(
        Box::new(UnavailableMonitor),
        Box::new(FakeBoard(Some(board_identity()))),
    );
    let snapshot = probe.run();

    assert_eq!(snapshot.status, ProbeStatus::Error);
    assert_eq!(snapshot.errors.len(), 1);
    assert!(snapshot.errors[0].contains("driver not loaded"));
    assert_eq!(snapshot.motherboard.vendor, None);
    assert!(snapshot.storage.is_empty());
}

#[test]
fn test_panicking_monitor_open_is_an_error_snapshot() {
    let probe = HardwareProbe::new(Box::new(PanickingMonitor), Box::new(FakeBoard(None)));
    let snapshot = probe.run();

    assert_eq!(snapshot.status, ProbeStatus::Error);
    assert_eq!(snapshot.errors.len(), 1);
    assert!(snapshot.errors[0].contains("COM apartment already initialised"));
}

#[test]
fn test_refresh_panic_is_recorded_and_collection_continues() {
    let tracker = Tracker::default();
    let monitor = FakeMonitor {
        units: healthy_tree(),
        tracker: tracker.clone(),
        panic_on_update: true,
    };
    let probe = HardwareProbe::new(Box::new(monitor), Box::new(FakeBoard(Some(board_identity()))));
    let snapshot = probe.run();

    assert_eq!(snapshot.status, ProbeStatus::Warn);
    assert_eq!(snapshot.errors, vec!["Sensor refresh failed: sensor driver crashed"]);
    assert_eq!(snapshot.cpu.temperature_c, Some(52.4));
    assert_eq!(snapshot.gpu.vram_total_mb, Some(8192));
    assert_eq!(snapshot.storage.len(), 1);
    assert_eq!(snapshot.fans.len(), 2);
    assert!(tracker.closed.load(Ordering::SeqCst));
    assert_nulls_explained(&snapshot);
}

#[test]
fn test_panicking_board_source_keeps_other_readings() {
    let tracker = Tracker::default();
    let monitor = FakeMonitor {
        units: healthy_tree(),
        tracker: tracker.clone(),
        panic_on_update: false,
    };
    let probe = HardwareProbe::new(Box::new(monitor), Box::new(PanickingBoard));
    let snapshot = probe.run();

    assert_eq!(snapshot.status, ProbeStatus::Ok);
    assert!(snapshot.errors.is_empty(), "unexpected errors: {:?}", snapshot.errors);
    assert_eq!(snapshot.motherboard.vendor, None);
    assert_eq!(snapshot.motherboard.model.as_deref(), Some("ROG STRIX B550-F GAMING"));
    assert_eq!(snapshot.cpu.temperature_c, Some(52.4));
    assert_eq!(snapshot.gpu.name.as_deref(), Some("NVIDIA GeForce RTX 3070"));
    assert_eq!(snapshot.storage.len(), 1);
    assert_eq!(snapshot.fans.len(), 2);
    assert!(tracker.closed.load(Ordering::SeqCst));
}

#[test]
fn test_panicking_board_source_without_board_unit_is_reported() {
    let mut units = healthy_tree();
    units.remove(0);
    let monitor = FakeMonitor {
        units,
        tracker: Tracker::default(),
        panic_on_update: false,
    };
    let probe = HardwareProbe::new(Box::new(monitor), Box::new(PanickingBoard));
    let snapshot = probe.run();

    assert_eq!(snapshot.status, ProbeStatus::Warn);
    assert_eq!(
        snapshot.errors,
        vec!["Motherboard information not available", "No fan sensors detected"]
    );
    assert_eq!(snapshot.cpu.temperature_c, Some(52.4));
    assert_nulls_explained(&snapshot);
}

#[test]
fn test_board_model_falls_back_to_motherboard_unit() {
    let identity = BoardIdentity {
        vendor: Some("To Be Filled By O.E.M.".into()),
        model: None,
        serial: Some("   ".into()),
    };
    let (probe, _) = probe(healthy_tree(), Some(identity));
    let snapshot = probe.run();

    assert_eq!(snapshot.motherboard.vendor, None);
    assert_eq!(snapshot.motherboard.model.as_deref(), Some("ROG STRIX B550-F GAMING"));
    assert_eq!(snapshot.motherboard.serial, None);
    assert_eq!(snapshot.status, ProbeStatus::Ok);
}

#[test]
fn test_every_missing_gpu_value_is_reported() {
    let mut units = healthy_tree();
    units[2] = HardwareUnit::new("/gpu-intel/0", "Intel(R) UHD Graphics 770", HardwareKind::Gpu(GpuVendor::Intel))
        .with_sensor(Sensor::new("GPU Memory Total", SensorKind::SmallData, None));
    let (probe, _) = probe(units, Some(board_identity()));
    let snapshot = probe.run();

    assert_eq!(snapshot.status, ProbeStatus::Warn);
    assert_eq!(snapshot.gpu.name.as_deref(), Some("Intel(R) UHD Graphics 770"));
    assert_eq!(snapshot.gpu.vram_total_mb, None);
    assert_eq!(snapshot.gpu.vram_used_mb, None);
    assert_eq!(
        snapshot.errors,
        vec![
            "GPU temperature not available (Intel(R) UHD Graphics 770)",
            "GPU load not available (Intel(R) UHD Graphics 770)",
            "GPU VRAM information not available (Intel(R) UHD Graphics 770)",
        ]
    );
    assert_nulls_explained(&snapshot);
}

#[test]
fn test_used_vram_falls_back_to_any_data_sensor() {
    let mut units = healthy_tree();
    units[2] = HardwareUnit::new("/gpu-intel/0", "Intel(R) UHD Graphics 770", HardwareKind::Gpu(GpuVendor::Intel))
        .with_sensor(Sensor::new("GPU Core", SensorKind::Temperature, Some(40.0)))
        .with_sensor(Sensor::new("GPU Core", SensorKind::Load, Some(3.0)))
        .with_sensor(Sensor::new("GPU Memory Total", SensorKind::SmallData, Some(2048.0)));
    let (probe, _) = probe(units, Some(board_identity()));
    let snapshot = probe.run();

    assert_eq!(snapshot.gpu.vram_total_mb, Some(2048));
    assert_eq!(snapshot.gpu.vram_used_mb, Some(2048));
    assert_eq!(snapshot.status, ProbeStatus::Ok);
}

#[test]
fn test_non_finite_readings_are_reported() {
    let mut units = healthy_tree();
    units[1] = HardwareUnit::new("/intelcpu/0", "Intel Core i7-12700K", HardwareKind::Cpu)
        .with_sensor(Sensor::new("CPU Package", SensorKind::Temperature, Some(f32::NAN)));
    let (probe, _) = probe(units, Some(board_identity()));
    let snapshot = probe.run();

    assert_eq!(snapshot.status, ProbeStatus::Warn);
    assert_eq!(snapshot.cpu.temperature_c, None);
    assert_eq!(snapshot.errors, vec!["CPU temperature not available"]);
    assert_nulls_explained(&snapshot);
}

#[test]
fn test_silent_fans_and_cold_drives_are_reported() {
    let superio = HardwareUnit::new("/lpc/it8688e", "ITE IT8688E", HardwareKind::SuperIo)
        .with_sensor(Sensor::new("Fan #1", SensorKind::Fan, Some(900.0)))
        .with_sensor(Sensor::new("Fan #2", SensorKind::Fan, None))
        .with_sensor(Sensor::new("Fan #3", SensorKind::Fan, None));
    let mut units = healthy_tree();
    units[0] = HardwareUnit::new("/motherboard", "Z690 AORUS", HardwareKind::Motherboard).with_child(superio);
    units.push(HardwareUnit::new("/hdd/1", "WDC WD20EZRZ", HardwareKind::Storage));

    let (probe, _) = probe(units, Some(board_identity()));
    let snapshot = probe.run();

    assert_eq!(snapshot.status, ProbeStatus::Warn);
    assert_eq!(snapshot.fans.len(), 3);
    assert_eq!(snapshot.storage.len(), 2);
    assert_eq!(snapshot.storage[1].temperature_c, None);
    assert_eq!(
        snapshot.errors,
        vec![
            "Storage temperature not available: WDC WD20EZRZ",
            "Fan RPM not available: Fan #2, Fan #3",
        ]
    );
    assert_nulls_explained(&snapshot);
}

#[test]
fn test_each_run_opens_a_fresh_session() {
    let (probe, tracker) = probe(healthy_tree(), Some(board_identity()));
    let first = probe.run();
    let second = probe.run();

    assert_eq!(tracker.opened.load(Ordering::SeqCst), 2);
    assert!(second.timestamp_utc >= first.timestamp_utc);
}

#[test]
fn test_snapshot_serializes_with_report_field_names() {
    let (probe, _) = probe(healthy_tree(), Some(board_identity()));
    let value = serde_json::to_value(probe.run()).unwrap();

    assert_eq!(value["status"], "OK");
    assert!(value["timestampUtc"].is_string());
    assert_eq!(value["cpu"]["temperatureC"], 52.4);
    assert_eq!(value["gpu"]["vramTotalMB"], 8192);
    assert_eq!(value["gpu"]["loadPercent"], 7.0);
    assert!(value["errors"].as_array().unwrap().is_empty());
}
