use std::collections::HashSet;
use std::fmt;

use rand::Rng;

use crate::error::{Result, SharesubError};
use crate::models::{
    Account, AccountFields, AccountId, Database, EmailFields, EmailId, EmailRecord, Member,
    MemberFields, MemberId, Subscription, SubscriptionFields, SubscriptionId,
};

/// Ids are drawn from `[0, ID_SPACE)`.
const ID_SPACE: u64 = 1_000_000_000;

/// Proof that the user affirmed a destructive action. The core never prompts;
/// the calling layer builds this after its own confirmation step.
#[derive(Debug, Clone, Copy)]
pub struct Confirmed(());

impl Confirmed {
    pub fn affirmed() -> Self {
        Confirmed(())
    }
}

/// Path of ids down to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    Account(AccountId),
    Subscription(AccountId, SubscriptionId),
    Member(AccountId, SubscriptionId, MemberId),
    Email(EmailId),
}

/// Where a new entity is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// Top level: accounts and emails.
    Root,
    Account(AccountId),
    Subscription(AccountId, SubscriptionId),
}

/// What a submitted form targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Editing {
    Creating(Parent),
    Editing(Locator),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    Account(AccountFields),
    Subscription(SubscriptionFields),
    Member(MemberFields),
    Email(EmailFields),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Account(a) => write!(f, "account #{a}"),
            Locator::Subscription(a, s) => write!(f, "subscription #{s} (account #{a})"),
            Locator::Member(a, s, m) => {
                write!(f, "member #{m} (account #{a}, subscription #{s})")
            }
            Locator::Email(e) => write!(f, "email #{e}"),
        }
    }
}

impl Form {
    fn kind(&self) -> &'static str {
        match self {
            Form::Account(_) => "account",
            Form::Subscription(_) => "subscription",
            Form::Member(_) => "member",
            Form::Email(_) => "email",
        }
    }
}

/// Single save handler for every form. The target travels with the form, so a
/// stale target from an earlier interaction cannot leak in.
pub fn save_form(db: &mut Database, target: Editing, form: Form) -> Result<Locator> {
    match (target, form) {
        (Editing::Creating(Parent::Root), Form::Account(fields)) => {
            Ok(Locator::Account(add_account(db, fields)))
        }
        (Editing::Creating(Parent::Root), Form::Email(fields)) => {
            Ok(Locator::Email(add_email(db, fields)))
        }
        (Editing::Creating(Parent::Account(a)), Form::Subscription(fields)) => {
            let s = add_subscription(db, a, fields)?;
            Ok(Locator::Subscription(a, s))
        }
        (Editing::Creating(Parent::Subscription(a, s)), Form::Member(fields)) => {
            let m = add_member(db, a, s, fields)?;
            Ok(Locator::Member(a, s, m))
        }
        (Editing::Editing(loc @ Locator::Account(a)), Form::Account(fields)) => {
            edit_account(db, a, fields)?;
            Ok(loc)
        }
        (Editing::Editing(loc @ Locator::Subscription(a, s)), Form::Subscription(fields)) => {
            edit_subscription(db, a, s, fields)?;
            Ok(loc)
        }
        (Editing::Editing(loc @ Locator::Member(a, s, m)), Form::Member(fields)) => {
            edit_member(db, a, s, m, fields)?;
            Ok(loc)
        }
        (Editing::Editing(loc @ Locator::Email(e)), Form::Email(fields)) => {
            edit_email(db, e, fields)?;
            Ok(loc)
        }
        (target, form) => Err(SharesubError::FormMismatch(format!(
            "{} form cannot be saved into {target:?}",
            form.kind()
        ))),
    }
}

fn fresh_id<I: IntoIterator<Item = u64>>(taken: I) -> u64 {
    let taken: HashSet<u64> = taken.into_iter().collect();
    let mut rng = rand::thread_rng();
    loop {
        let id = rng.gen_range(0..ID_SPACE);
        if !taken.contains(&id) {
            return id;
        }
    }
}

/// Gives every entity whose id is already taken in its collection a fresh
/// one. The first holder of an id keeps it. Returns how many were reassigned.
pub fn repair_ids(db: &mut Database) -> usize {
    let mut reassigned = unique_ids(&mut db.accounts, |a| &mut a.id);
    reassigned += unique_ids(&mut db.emails, |e| &mut e.id);
    for account in &mut db.accounts {
        reassigned += unique_ids(&mut account.subscriptions, |s| &mut s.id);
        for sub in &mut account.subscriptions {
            reassigned += unique_ids(&mut sub.members, |m| &mut m.id);
        }
    }
    reassigned
}

fn unique_ids<T>(items: &mut [T], id: impl Fn(&mut T) -> &mut u64) -> usize {
    let mut seen = HashSet::new();
    let mut clashes = Vec::new();
    for (idx, item) in items.iter_mut().enumerate() {
        if !seen.insert(*id(item)) {
            clashes.push(idx);
        }
    }
    for &idx in &clashes {
        let fresh = fresh_id(seen.iter().copied());
        seen.insert(fresh);
        *id(&mut items[idx]) = fresh;
    }
    clashes.len()
}

pub fn account_mut(db: &mut Database, account: AccountId) -> Result<&mut Account> {
    db.accounts
        .iter_mut()
        .find(|a| a.id == account)
        .ok_or(SharesubError::AccountNotFound(account))
}

pub fn subscription_mut(
    db: &mut Database,
    account: AccountId,
    subscription: SubscriptionId,
) -> Result<&mut Subscription> {
    account_mut(db, account)?
        .subscriptions
        .iter_mut()
        .find(|s| s.id == subscription)
        .ok_or(SharesubError::SubscriptionNotFound {
            account,
            subscription,
        })
}

pub fn member_mut(
    db: &mut Database,
    account: AccountId,
    subscription: SubscriptionId,
    member: MemberId,
) -> Result<&mut Member> {
    subscription_mut(db, account, subscription)?
        .members
        .iter_mut()
        .find(|m| m.id == member)
        .ok_or(SharesubError::MemberNotFound {
            account,
            subscription,
            member,
        })
}

pub fn email_mut(db: &mut Database, email: EmailId) -> Result<&mut EmailRecord> {
    db.emails
        .iter_mut()
        .find(|e| e.id == email)
        .ok_or(SharesubError::EmailNotFound(email))
}

// --- accounts ---

pub fn add_account(db: &mut Database, fields: AccountFields) -> AccountId {
    let id = fresh_id(db.accounts.iter().map(|a| a.id));
    db.accounts.push(fields.into_account(id));
    id
}

pub fn edit_account(db: &mut Database, account: AccountId, fields: AccountFields) -> Result<()> {
    fields.apply(account_mut(db, account)?);
    Ok(())
}

/// Removes the account together with every subscription and member it holds.
pub fn delete_account(db: &mut Database, account: AccountId, _: Confirmed) -> Result<Account> {
    let idx = db
        .accounts
        .iter()
        .position(|a| a.id == account)
        .ok_or(SharesubError::AccountNotFound(account))?;
    Ok(db.accounts.remove(idx))
}

// --- subscriptions ---

pub fn add_subscription(
    db: &mut Database,
    account: AccountId,
    fields: SubscriptionFields,
) -> Result<SubscriptionId> {
    let acc = account_mut(db, account)?;
    let id = fresh_id(acc.subscriptions.iter().map(|s| s.id));
    acc.subscriptions.push(fields.into_subscription(id));
    Ok(id)
}

pub fn edit_subscription(
    db: &mut Database,
    account: AccountId,
    subscription: SubscriptionId,
    fields: SubscriptionFields,
) -> Result<()> {
    fields.apply(subscription_mut(db, account, subscription)?);
    Ok(())
}

pub fn delete_subscription(
    db: &mut Database,
    account: AccountId,
    subscription: SubscriptionId,
    _: Confirmed,
) -> Result<Subscription> {
    let acc = account_mut(db, account)?;
    let idx = acc
        .subscriptions
        .iter()
        .position(|s| s.id == subscription)
        .ok_or(SharesubError::SubscriptionNotFound {
            account,
            subscription,
        })?;
    Ok(acc.subscriptions.remove(idx))
}

// --- members ---

pub fn add_member(
    db: &mut Database,
    account: AccountId,
    subscription: SubscriptionId,
    fields: MemberFields,
) -> Result<MemberId> {
    let sub = subscription_mut(db, account, subscription)?;
    let id = fresh_id(sub.members.iter().map(|m| m.id));
    sub.members.push(fields.into_member(id));
    Ok(id)
}

pub fn edit_member(
    db: &mut Database,
    account: AccountId,
    subscription: SubscriptionId,
    member: MemberId,
    fields: MemberFields,
) -> Result<()> {
    fields.apply(member_mut(db, account, subscription, member)?);
    Ok(())
}

pub fn delete_member(
    db: &mut Database,
    account: AccountId,
    subscription: SubscriptionId,
    member: MemberId,
    _: Confirmed,
) -> Result<Member> {
    let sub = subscription_mut(db, account, subscription)?;
    let idx = sub
        .members
        .iter()
        .position(|m| m.id == member)
        .ok_or(SharesubError::MemberNotFound {
            account,
            subscription,
            member,
        })?;
    Ok(sub.members.remove(idx))
}

// --- emails ---

pub fn add_email(db: &mut Database, fields: EmailFields) -> EmailId {
    let id = fresh_id(db.emails.iter().map(|e| e.id));
    db.emails.push(fields.into_email(id));
    id
}

pub fn edit_email(db: &mut Database, email: EmailId, fields: EmailFields) -> Result<()> {
    fields.apply(email_mut(db, email)?);
    Ok(())
}

pub fn delete_email(db: &mut Database, email: EmailId, _: Confirmed) -> Result<EmailRecord> {
    let idx = db
        .emails
        .iter()
        .position(|e| e.id == email)
        .ok_or(SharesubError::EmailNotFound(email))?;
    Ok(db.emails.remove(idx))
}

/// Flips `enabled` and returns the new value.
pub fn toggle_email(db: &mut Database, email: EmailId) -> Result<bool> {
    let record = email_mut(db, email)?;
    record.enabled = !record.enabled;
    Ok(record.enabled)
}
