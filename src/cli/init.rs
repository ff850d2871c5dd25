use std::path::PathBuf;

use crate::cli::open_store;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path, DB_FILE};

pub fn run(data_dir: Option<String>, seed: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(seed) = seed {
        settings.seed_file = Some(shellexpand_path(&seed));
    }

    save_settings(&settings)?;

    let store = open_store(&settings)?;
    let db = store.load()?;

    let resolved = PathBuf::from(&settings.data_dir);
    println!("Initialized sharesub at {}", resolved.display());
    println!("Database: {}", resolved.join(DB_FILE).display());
    println!(
        "{} accounts, {} emails",
        db.accounts.len(),
        db.emails.len()
    );
    Ok(())
}
