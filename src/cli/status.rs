use std::path::PathBuf;

use crate::cli::open_store;
use crate::error::Result;
use crate::fmt::{format_bytes, money};
use crate::reports::kpis;
use crate::settings::{Settings, DB_FILE};
use crate::store::BLOB_KEY;

pub fn run(settings: &Settings) -> Result<()> {
    let data_dir = PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());
    println!(
        "Seed:       {}",
        settings
            .seed_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `sharesub init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let store = open_store(settings)?;
    let saved = store.blobs().last_saved(BLOB_KEY)?;
    println!("Last saved: {}", saved.as_deref().unwrap_or("(never)"));

    let db = store.load()?;
    let subscriptions: usize = db.accounts.iter().map(|a| a.subscriptions.len()).sum();
    let members: usize = db.accounts.iter().map(|a| a.member_count()).sum();
    let enabled = db.emails.iter().filter(|e| e.enabled).count();
    let k = kpis(&db);

    println!();
    println!("Accounts:       {}", k.accounts);
    println!("Subscriptions:  {subscriptions}");
    println!("Members:        {members}");
    println!("Emails:         {} ({enabled} enabled)", db.emails.len());
    println!();
    println!("Revenue:        {}", money(k.revenue));
    println!("Cost:           {}", money(k.cost));
    println!("Margin:         {}", money(k.margin));

    Ok(())
}
