use crate::cli::{aborted, confirm, open_store, refresh};
use crate::error::Result;
use crate::settings::Settings;

pub fn run(settings: &Settings, yes: bool) -> Result<()> {
    let store = open_store(settings)?;
    if confirm("Erase all accounts, subscriptions, members and mails?", yes)?.is_none() {
        return aborted();
    }
    store.reset()?;
    println!("Database reset.");
    refresh(&store)
}
