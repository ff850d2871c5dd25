use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{aborted, confirm, open_store, refresh, EmailArgs};
use crate::error::{Result, SharesubError};
use crate::fmt::or_dash;
use crate::ops::{delete_email, save_form, toggle_email, Editing, Form, Locator, Parent};
use crate::settings::Settings;

pub fn add(settings: &Settings, fields: EmailArgs) -> Result<()> {
    let store = open_store(settings)?;
    let loc = store.update(|db| {
        save_form(db, Editing::Creating(Parent::Root), Form::Email(fields.into()))
    })?;
    println!("Added {loc}");
    refresh(&store)
}

pub fn edit(settings: &Settings, id: u64, fields: EmailArgs) -> Result<()> {
    let store = open_store(settings)?;
    let loc = store.update(|db| {
        save_form(db, Editing::Editing(Locator::Email(id)), Form::Email(fields.into()))
    })?;
    println!("Updated {loc}");
    refresh(&store)
}

pub fn toggle(settings: &Settings, id: u64) -> Result<()> {
    let store = open_store(settings)?;
    let enabled = store.update(|db| toggle_email(db, id))?;
    let state = if enabled {
        "enabled".green()
    } else {
        "disabled".yellow()
    };
    println!("Email #{id} {state}");
    refresh(&store)
}

pub fn delete(settings: &Settings, id: u64, yes: bool) -> Result<()> {
    let store = open_store(settings)?;
    let address = store
        .load()?
        .email(id)
        .map(|e| e.address.clone())
        .ok_or(SharesubError::EmailNotFound(id))?;
    let Some(confirmed) = confirm(&format!("Delete mail '{address}'?"), yes)? else {
        return aborted();
    };
    let removed = store.update(|db| delete_email(db, id, confirmed))?;
    println!("Deleted email #{}: {}", removed.id, removed.address);
    refresh(&store)
}

pub fn list(settings: &Settings) -> Result<()> {
    let db = open_store(settings)?.load()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Address", "Country", "Enabled", "Last check"]);
    for e in &db.emails {
        table.add_row(vec![
            Cell::new(e.id),
            Cell::new(or_dash(&e.address)),
            Cell::new(or_dash(&e.country)),
            Cell::new(if e.enabled { "yes" } else { "no" }),
            Cell::new(or_dash(&e.last_check)),
        ]);
    }
    println!("Emails\n{table}");
    Ok(())
}
