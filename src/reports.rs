//! Derived figures. Nothing here is stored; everything is recomputed from the
//! current snapshot, so it can never drift from the records.

use chrono::NaiveDate;

use crate::models::{Account, AccountId, Database, Subscription, SubscriptionId};

pub fn total_revenue(db: &Database) -> f64 {
    db.accounts.iter().map(|a| a.monthly_revenue).sum()
}

pub fn total_cost(db: &Database) -> f64 {
    db.accounts.iter().map(|a| a.monthly_cost).sum()
}

pub fn margin(db: &Database) -> f64 {
    total_revenue(db) - total_cost(db)
}

pub fn account_count(db: &Database) -> usize {
    db.accounts.len()
}

/// What the members of one subscription pay per month, all together.
pub fn subscription_members_total(sub: &Subscription) -> f64 {
    sub.members.iter().map(|m| m.monthly_fee).sum()
}

pub fn account_margin(account: &Account) -> f64 {
    account.monthly_revenue - account.monthly_cost
}

/// The four dashboard figures.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub revenue: f64,
    pub cost: f64,
    pub margin: f64,
    pub accounts: usize,
}

pub fn kpis(db: &Database) -> Kpis {
    let revenue = total_revenue(db);
    let cost = total_cost(db);
    Kpis {
        revenue,
        cost,
        margin: revenue - cost,
        accounts: account_count(db),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountRow {
    pub id: AccountId,
    pub name: String,
    pub country: String,
    pub revenue: f64,
    pub cost: f64,
    pub margin: f64,
    pub subscriptions: usize,
    pub members: usize,
}

pub fn account_rows(db: &Database) -> Vec<AccountRow> {
    db.accounts
        .iter()
        .map(|a| AccountRow {
            id: a.id,
            name: a.name.clone(),
            country: a.country.clone(),
            revenue: a.monthly_revenue,
            cost: a.monthly_cost,
            margin: account_margin(a),
            subscriptions: a.subscriptions.len(),
            members: a.member_count(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRow {
    pub account_id: AccountId,
    pub account_name: String,
    pub id: SubscriptionId,
    pub platform: String,
    pub plan: String,
    pub price: f64,
    pub members: usize,
    pub members_total: f64,
    pub renew_date: Option<NaiveDate>,
    /// Negative when the renewal date is already past.
    pub days_to_renewal: Option<i64>,
}

/// One row per subscription across all accounts, in storage order.
pub fn subscription_rows(db: &Database, today: NaiveDate) -> Vec<SubscriptionRow> {
    db.accounts
        .iter()
        .flat_map(|a| {
            a.subscriptions.iter().map(move |s| SubscriptionRow {
                account_id: a.id,
                account_name: a.name.clone(),
                id: s.id,
                platform: s.platform.clone(),
                plan: s.plan.clone(),
                price: s.price_you_pay_month,
                members: s.members.len(),
                members_total: subscription_members_total(s),
                renew_date: s.renew_date,
                days_to_renewal: s.renew_date.map(|d| (d - today).num_days()),
            })
        })
        .collect()
}
