//! Motherboard identity straight from firmware tables.

use std::fs;
use std::path::Path;

use crate::core::hardware::{BoardIdentity, BoardIdentitySource};
use crate::error::{DiagError, Result};

#[cfg(windows)]
use serde::Deserialize;
#[cfg(windows)]
use wmi::WMIConnection;

/// Linux exposes the SMBIOS baseboard strings here
pub const DMI_ID_DIR: &str = "/sys/class/dmi/id";

/// Queries SMBIOS through WMI on Windows and sysfs on Linux.
pub struct FirmwareBoardIdentity;

impl BoardIdentitySource for FirmwareBoardIdentity {
    fn query(&self) -> Result<BoardIdentity> {
        query_board_identity()
    }
}

#[cfg(windows)]
#[derive(Deserialize, Debug)]
#[serde(rename = "Win32_BaseBoard")]
#[serde(rename_all = "PascalCase")]
struct Win32BaseBoard {
    manufacturer: Option<String>,
    product: Option<String>,
    serial_number: Option<String>,
}

#[cfg(windows)]
fn query_board_identity() -> Result<BoardIdentity> {
    let wmi_con = WMIConnection::new()
        .map_err(|e| DiagError::firmware(format!("Failed to connect to WMI: {}", e)))?;

    let boards: Vec<Win32BaseBoard> = wmi_con
        .query()
        .map_err(|e| DiagError::firmware(format!("Win32_BaseBoard query failed: {}", e)))?;

    let board = boards
        .into_iter()
        .next()
        .ok_or_else(|| DiagError::firmware("no Win32_BaseBoard instance"))?;

    Ok(BoardIdentity {
        vendor: board.manufacturer,
        model: board.product,
        serial: board.serial_number,
    })
}

#[cfg(target_os = "linux")]
fn query_board_identity() -> Result<BoardIdentity> {
    read_dmi_identity(Path::new(DMI_ID_DIR))
}

#[cfg(not(any(windows, target_os = "linux")))]
fn query_board_identity() -> Result<BoardIdentity> {
    Err(DiagError::firmware(
        "board identity is not available on this platform",
    ))
}

/// Read `board_vendor`, `board_name` and `board_serial` from a DMI directory.
///
/// `board_serial` is root-only on most distributions; an unreadable file just
/// leaves that field empty.
pub fn read_dmi_identity(dir: &Path) -> Result<BoardIdentity> {
    let identity = BoardIdentity {
        vendor: read_dmi_field(dir, "board_vendor"),
        model: read_dmi_field(dir, "board_name"),
        serial: read_dmi_field(dir, "board_serial"),
    };

    if identity == BoardIdentity::default() {
        return Err(DiagError::firmware(format!(
            "no readable board data in {}",
            dir.display()
        )));
    }
    Ok(identity)
}

fn read_dmi_field(dir: &Path, name: &str) -> Option<String> {
    match fs::read_to_string(dir.join(name)) {
        Ok(text) => Some(text.trim_end_matches(['\n', '\0']).to_string()),
        Err(e) => {
            log::debug!("DMI field {} unreadable: {}", name, e);
            None
        }
    }
}
