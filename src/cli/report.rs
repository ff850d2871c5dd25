use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_store;
use crate::error::Result;
use crate::fmt::{money, or_dash};
use crate::models::DATE_FORMAT;
use crate::reports::{account_rows, kpis, subscription_rows};
use crate::settings::Settings;

/// Renewals this close are highlighted.
const RENEWAL_WARNING_DAYS: i64 = 7;

fn signed_money(val: f64) -> String {
    if val < 0.0 {
        money(val).red().to_string()
    } else {
        money(val).green().to_string()
    }
}

pub fn run(settings: &Settings) -> Result<()> {
    let db = open_store(settings)?.load()?;
    let k = kpis(&db);
    let today = Local::now().date_naive();

    println!("{}", "Monthly overview".bold());
    println!("  Revenue:  {}", money(k.revenue));
    println!("  Cost:     {}", money(k.cost));
    println!("  Margin:   {}", signed_money(k.margin));
    println!("  Accounts: {}", k.accounts);
    println!();

    if db.accounts.is_empty() {
        println!("No accounts yet. Add one with `sharesub accounts add --name ...`.");
        return Ok(());
    }

    let mut accounts = Table::new();
    accounts.set_header(vec![
        "ID", "Account", "Country", "Revenue", "Cost", "Margin", "Subs", "Members",
    ]);
    for row in account_rows(&db) {
        accounts.add_row(vec![
            Cell::new(row.id),
            Cell::new(or_dash(&row.name)),
            Cell::new(or_dash(&row.country)),
            Cell::new(money(row.revenue)),
            Cell::new(money(row.cost)),
            Cell::new(signed_money(row.margin)),
            Cell::new(row.subscriptions),
            Cell::new(row.members),
        ]);
    }
    println!("Accounts\n{accounts}\n");

    let rows = subscription_rows(&db, today);
    if rows.is_empty() {
        println!("No subscriptions yet.");
        return Ok(());
    }

    let mut subs = Table::new();
    subs.set_header(vec![
        "Account", "ID", "Subscription", "Price", "Members", "Members pay", "Renews", "In",
    ]);
    for row in rows {
        let renews = row
            .renew_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "\u{2014}".to_string());
        let days = match row.days_to_renewal {
            Some(d) if d < 0 => format!("{}d ago", -d).red().to_string(),
            Some(d) if d <= RENEWAL_WARNING_DAYS => format!("{d}d").yellow().to_string(),
            Some(d) => format!("{d}d"),
            None => "\u{2014}".to_string(),
        };
        subs.add_row(vec![
            Cell::new(format!("#{} {}", row.account_id, row.account_name)),
            Cell::new(row.id),
            Cell::new(format!("{} \u{2022} {}", row.platform, row.plan)),
            Cell::new(money(row.price)),
            Cell::new(row.members),
            Cell::new(money(row.members_total)),
            Cell::new(renews),
            Cell::new(days),
        ]);
    }
    println!("Subscriptions\n{subs}");
    Ok(())
}
