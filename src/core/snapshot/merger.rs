//! Merge a hardware snapshot into an externally produced JSON report.
//!
//! The report is treated as an opaque JSON tree. The only change made to it
//! is the top-level `hardwareProbe` key; source key order is preserved.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::core::hardware::HardwareSnapshot;
use crate::error::{DiagError, Result};

/// Top-level key holding the serialized snapshot
pub const HARDWARE_PROBE_KEY: &str = "hardwareProbe";

const UTF8_BOM: char = '\u{feff}';

/// Characters Windows refuses in file names
const INVALID_FILE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Merge `snapshot` into the report at `source` and write the result to
/// `output_dir`. Returns the path of the written file.
///
/// # Errors
///
/// - [`DiagError::SourceNotFound`] when `source` does not exist
/// - [`DiagError::PermissionDenied`] when `source` or `output_dir` is not accessible
/// - [`DiagError::InvalidJson`] when `source` is not valid JSON
/// - [`DiagError::Io`] for any other read or write failure
pub fn merge_snapshot(
    source: &Path,
    snapshot: &HardwareSnapshot,
    output_dir: &Path,
    run_id: Option<&str>,
) -> Result<PathBuf> {
    let document = read_document(source)?;
    let merged = merge_value(document, snapshot)?;

    let file_name = output_file_name(run_id, Utc::now());
    let target = output_dir.join(file_name);
    write_atomically(&target, output_dir, &merged)?;

    info!("Merged hardware snapshot into {}", target.display());
    Ok(target)
}

/// Attach the serialized snapshot to `document` under [`HARDWARE_PROBE_KEY`].
///
/// A root that is not an object is discarded and replaced by an empty object.
pub fn merge_value(document: Value, snapshot: &HardwareSnapshot) -> Result<Value> {
    let mut root = match document {
        Value::Object(map) => map,
        other => {
            warn!(
                "Source report root is {} instead of an object; starting from an empty object",
                json_type_name(&other)
            );
            Map::new()
        }
    };

    if root.contains_key(HARDWARE_PROBE_KEY) {
        debug!("Replacing existing '{}' key in source report", HARDWARE_PROBE_KEY);
    }
    root.insert(HARDWARE_PROBE_KEY.to_string(), serde_json::to_value(snapshot)?);

    Ok(Value::Object(root))
}

/// `Snapshot_Final_<runId>.json`, or a UTC timestamp when no run id is given.
pub fn output_file_name(run_id: Option<&str>, now: DateTime<Utc>) -> String {
    match run_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => format!("Snapshot_Final_{}.json", sanitize_run_id(id)),
        None => format!("Snapshot_Final_{}.json", now.format("%Y%m%d_%H%M%S")),
    }
}

/// Replace characters that cannot appear in a Windows file name.
pub fn sanitize_run_id(run_id: &str) -> String {
    run_id
        .chars()
        .map(|c| {
            if INVALID_FILE_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

fn read_document(source: &Path) -> Result<Value> {
    let text = fs::read_to_string(source).map_err(|e| DiagError::from_read_io(e, source))?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(&text);

    serde_json::from_str(text).map_err(|e| DiagError::InvalidJson {
        path: source.to_path_buf(),
        source: e,
    })
}

fn write_atomically(target: &Path, output_dir: &Path, value: &Value) -> Result<()> {
    let mut file =
        NamedTempFile::new_in(output_dir).map_err(|e| DiagError::from_write_io(e, output_dir))?;

    serde_json::to_writer_pretty(&mut file, value).map_err(|e| {
        if e.is_io() {
            DiagError::from_write_io(e.into(), target)
        } else {
            DiagError::Serialization(e)
        }
    })?;
    file.write_all(b"\n")
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| DiagError::from_write_io(e, target))?;

    file.persist(target)
        .map_err(|e| DiagError::from_write_io(e.error, target))?;
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
