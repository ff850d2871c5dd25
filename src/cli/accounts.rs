use comfy_table::{Cell, Table};

use crate::cli::{aborted, confirm, open_store, refresh, AccountArgs};
use crate::error::{Result, SharesubError};
use crate::fmt::{money, or_dash};
use crate::ops::{delete_account, save_form, Editing, Form, Locator, Parent};
use crate::reports::account_margin;
use crate::settings::Settings;

pub fn add(settings: &Settings, fields: AccountArgs) -> Result<()> {
    let store = open_store(settings)?;
    let loc = store.update(|db| {
        save_form(db, Editing::Creating(Parent::Root), Form::Account(fields.into()))
    })?;
    println!("Added {loc}");
    refresh(&store)
}

pub fn edit(settings: &Settings, id: u64, fields: AccountArgs) -> Result<()> {
    let store = open_store(settings)?;
    let loc = store.update(|db| {
        save_form(db, Editing::Editing(Locator::Account(id)), Form::Account(fields.into()))
    })?;
    println!("Updated {loc}");
    refresh(&store)
}

pub fn delete(settings: &Settings, id: u64, yes: bool) -> Result<()> {
    let store = open_store(settings)?;
    let Some(account) = store.load()?.account(id).cloned() else {
        return Err(SharesubError::AccountNotFound(id));
    };
    let prompt = format!(
        "Delete account '{}' with {} subscriptions and {} members?",
        account.name,
        account.subscriptions.len(),
        account.member_count()
    );
    let Some(confirmed) = confirm(&prompt, yes)? else {
        return aborted();
    };
    let removed = store.update(|db| delete_account(db, id, confirmed))?;
    println!(
        "Deleted account #{}: {} ({} subscriptions, {} members)",
        removed.id,
        removed.name,
        removed.subscriptions.len(),
        removed.member_count()
    );
    refresh(&store)
}

pub fn list(settings: &Settings) -> Result<()> {
    let db = open_store(settings)?.load()?;

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Name", "Country", "Mail", "IBAN", "Revenue", "Cost", "Margin", "Subs",
    ]);
    for a in &db.accounts {
        table.add_row(vec![
            Cell::new(a.id),
            Cell::new(or_dash(&a.name)),
            Cell::new(or_dash(&a.country)),
            Cell::new(or_dash(&a.account_email)),
            Cell::new(or_dash(&a.iban_masked)),
            Cell::new(money(a.monthly_revenue)),
            Cell::new(money(a.monthly_cost)),
            Cell::new(money(account_margin(a))),
            Cell::new(a.subscriptions.len()),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}
