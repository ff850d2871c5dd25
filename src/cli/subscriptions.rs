use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{aborted, confirm, open_store, refresh, SubscriptionArgs};
use crate::error::{Result, SharesubError};
use crate::fmt::{money, or_dash};
use crate::models::DATE_FORMAT;
use crate::ops::{delete_subscription, save_form, Editing, Form, Locator, Parent};
use crate::reports::{subscription_members_total, subscription_rows};
use crate::settings::Settings;

pub fn add(settings: &Settings, account: u64, fields: SubscriptionArgs) -> Result<()> {
    let fields = fields.into_fields()?;
    let store = open_store(settings)?;
    let loc = store.update(|db| {
        save_form(
            db,
            Editing::Creating(Parent::Account(account)),
            Form::Subscription(fields),
        )
    })?;
    println!("Added {loc}");
    refresh(&store)
}

pub fn edit(
    settings: &Settings,
    account: u64,
    subscription: u64,
    fields: SubscriptionArgs,
) -> Result<()> {
    let fields = fields.into_fields()?;
    let store = open_store(settings)?;
    let loc = store.update(|db| {
        save_form(
            db,
            Editing::Editing(Locator::Subscription(account, subscription)),
            Form::Subscription(fields),
        )
    })?;
    println!("Updated {loc}");
    refresh(&store)
}

pub fn delete(settings: &Settings, account: u64, subscription: u64, yes: bool) -> Result<()> {
    let store = open_store(settings)?;
    let db = store.load()?;
    let sub = db
        .account(account)
        .ok_or(SharesubError::AccountNotFound(account))?
        .subscription(subscription)
        .ok_or(SharesubError::SubscriptionNotFound {
            account,
            subscription,
        })?;
    let prompt = format!(
        "Delete subscription {} {} with {} members?",
        sub.platform,
        sub.plan,
        sub.members.len()
    );
    let Some(confirmed) = confirm(&prompt, yes)? else {
        return aborted();
    };
    let removed = store.update(|db| delete_subscription(db, account, subscription, confirmed))?;
    println!(
        "Deleted subscription #{}: {} {} ({} members)",
        removed.id,
        removed.platform,
        removed.plan,
        removed.members.len()
    );
    refresh(&store)
}

pub fn list(settings: &Settings, account: Option<u64>) -> Result<()> {
    let db = open_store(settings)?.load()?;
    if let Some(id) = account {
        db.account(id).ok_or(SharesubError::AccountNotFound(id))?;
    }
    let today = Local::now().date_naive();

    let mut table = Table::new();
    table.set_header(vec![
        "Account", "ID", "Platform", "Plan", "Price", "Members", "Members pay", "Renews",
    ]);
    for row in subscription_rows(&db, today)
        .into_iter()
        .filter(|r| account.map_or(true, |id| r.account_id == id))
    {
        table.add_row(vec![
            Cell::new(format!("#{} {}", row.account_id, row.account_name)),
            Cell::new(row.id),
            Cell::new(or_dash(&row.platform)),
            Cell::new(or_dash(&row.plan)),
            Cell::new(money(row.price)),
            Cell::new(row.members),
            Cell::new(money(row.members_total)),
            Cell::new(
                row.renew_date
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_else(|| "\u{2014}".to_string()),
            ),
        ]);
    }
    println!("Subscriptions\n{table}");
    Ok(())
}

pub fn show(settings: &Settings, account: u64, subscription: u64, reveal: bool) -> Result<()> {
    let db = open_store(settings)?.load()?;
    let owner = db
        .account(account)
        .ok_or(SharesubError::AccountNotFound(account))?;
    let sub = owner
        .subscription(subscription)
        .ok_or(SharesubError::SubscriptionNotFound {
            account,
            subscription,
        })?;

    let password = if reveal {
        sub.password.clone()
    } else {
        "\u{2022}".repeat(sub.password.chars().count().min(12))
    };
    let members_total = subscription_members_total(sub);

    println!("{}", format!("{} \u{2022} {}", sub.platform, sub.plan).bold());
    println!("  Account:     #{} {}", owner.id, owner.name);
    println!("  ID:          #{}", sub.id);
    println!("  Mail:        {}", or_dash(&sub.email));
    println!("  Password:    {}", or_dash(&password));
    println!("  Price:       {}", money(sub.price_you_pay_month));
    println!(
        "  Renews:      {}",
        sub.renew_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "\u{2014}".to_string())
    );
    println!("  Members:     {}", sub.members.len());
    let paid = money(members_total);
    let paid = if members_total >= sub.price_you_pay_month {
        paid.green()
    } else {
        paid.red()
    };
    println!("  Members pay: {paid} /month");
    println!("  Comment:     {}", or_dash(&sub.comment));
    Ok(())
}
