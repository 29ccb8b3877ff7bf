// Core business logic module

pub mod config;
pub mod hardware;
pub mod scan;
pub mod snapshot;

// Re-export commonly used items
pub use config::Config;
pub use hardware::{HardwareProbe, HardwareSnapshot, ProbeStatus};
pub use scan::{ScanOrchestrator, ScanOutcome, ScanSettings};
pub use snapshot::merge_snapshot;
