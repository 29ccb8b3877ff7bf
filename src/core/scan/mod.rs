//! Health-check scan orchestration.

pub mod orchestrator;

pub use orchestrator::{expand_args, ScanOrchestrator, ScanOutcome, ScanSettings};
