use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::cli::open_store;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::Settings;

pub const EXPORT_FILE: &str = "db.json";

pub fn run(settings: &Settings, output: Option<String>) -> Result<()> {
    let store = open_store(settings)?;
    let json = store.export_json()?;

    let dest = PathBuf::from(output.unwrap_or_else(|| EXPORT_FILE.to_string()));
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&dest, &json)?;

    println!("Exported to {}", dest.display());
    println!("Size:    {}", format_bytes(json.len() as u64));
    println!("SHA-256: {}", checksum(json.as_bytes()));
    Ok(())
}

pub(crate) fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
