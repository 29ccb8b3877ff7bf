// UI and formatting module

pub mod messages;
pub mod probe_formatters;

pub use messages::{dimmed, error, success, warn};
pub use probe_formatters::{format_scan_outcome, format_snapshot};
