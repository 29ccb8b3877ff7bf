//! Final snapshot assembly: health report plus hardware probe.

pub mod merger;

pub use merger::{merge_snapshot, merge_value, output_file_name, sanitize_run_id, HARDWARE_PROBE_KEY};
