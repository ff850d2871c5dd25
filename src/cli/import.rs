use std::path::PathBuf;

use crate::cli::export::checksum;
use crate::cli::{open_store, refresh};
use crate::error::Result;
use crate::settings::Settings;

pub fn run(settings: &Settings, file: &str) -> Result<()> {
    let file_path = PathBuf::from(file);
    let text = std::fs::read_to_string(&file_path)?;
    let store = open_store(settings)?;

    let db = store.import_json(&text)?;

    let subscriptions: usize = db.accounts.iter().map(|a| a.subscriptions.len()).sum();
    println!(
        "Imported {}: {} accounts, {} subscriptions, {} emails",
        file_path.display(),
        db.accounts.len(),
        subscriptions,
        db.emails.len()
    );
    println!("SHA-256: {}", checksum(text.as_bytes()));
    refresh(&store)
}
