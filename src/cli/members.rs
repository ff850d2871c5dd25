use comfy_table::{Cell, Table};

use crate::cli::{aborted, confirm, open_store, refresh, MemberArgs};
use crate::error::{Result, SharesubError};
use crate::fmt::{money, or_dash};
use crate::models::{Database, Subscription};
use crate::ops::{delete_member, save_form, Editing, Form, Locator, Parent};
use crate::reports::subscription_members_total;
use crate::settings::Settings;

fn find_subscription(db: &Database, account: u64, subscription: u64) -> Result<&Subscription> {
    db.account(account)
        .ok_or(SharesubError::AccountNotFound(account))?
        .subscription(subscription)
        .ok_or(SharesubError::SubscriptionNotFound {
            account,
            subscription,
        })
}

pub fn add(settings: &Settings, account: u64, subscription: u64, fields: MemberArgs) -> Result<()> {
    let store = open_store(settings)?;
    let loc = store.update(|db| {
        save_form(
            db,
            Editing::Creating(Parent::Subscription(account, subscription)),
            Form::Member(fields.into()),
        )
    })?;
    println!("Added {loc}");
    refresh(&store)
}

pub fn edit(
    settings: &Settings,
    account: u64,
    subscription: u64,
    member: u64,
    fields: MemberArgs,
) -> Result<()> {
    let store = open_store(settings)?;
    let loc = store.update(|db| {
        save_form(
            db,
            Editing::Editing(Locator::Member(account, subscription, member)),
            Form::Member(fields.into()),
        )
    })?;
    println!("Updated {loc}");
    refresh(&store)
}

pub fn delete(
    settings: &Settings,
    account: u64,
    subscription: u64,
    member: u64,
    yes: bool,
) -> Result<()> {
    let store = open_store(settings)?;
    let db = store.load()?;
    let pseudo = find_subscription(&db, account, subscription)?
        .members
        .iter()
        .find(|m| m.id == member)
        .map(|m| m.pseudo.clone())
        .ok_or(SharesubError::MemberNotFound {
            account,
            subscription,
            member,
        })?;
    let Some(confirmed) = confirm(&format!("Remove member '{pseudo}'?"), yes)? else {
        return aborted();
    };
    let removed =
        store.update(|db| delete_member(db, account, subscription, member, confirmed))?;
    println!("Deleted member #{}: {}", removed.id, removed.pseudo);
    refresh(&store)
}

pub fn list(settings: &Settings, account: u64, subscription: u64) -> Result<()> {
    let db = open_store(settings)?.load()?;
    let sub = find_subscription(&db, account, subscription)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Pseudo", "Mail", "Pays /month"]);
    for m in &sub.members {
        table.add_row(vec![
            Cell::new(m.id),
            Cell::new(or_dash(&m.pseudo)),
            Cell::new(or_dash(&m.mail)),
            Cell::new(money(m.monthly_fee)),
        ]);
    }
    println!("Members of {} {}\n{table}", sub.platform, sub.plan);
    println!(
        "Total: {} /month from {} members",
        money(subscription_members_total(sub)),
        sub.members.len()
    );
    Ok(())
}
