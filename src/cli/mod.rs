pub mod accounts;
pub mod demo;
pub mod emails;
pub mod export;
pub mod import;
pub mod init;
pub mod members;
pub mod report;
pub mod reset;
pub mod status;
pub mod subscriptions;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use dialoguer::Confirm;

use crate::db::SqliteBlobStore;
use crate::error::{Result, SharesubError};
use crate::fmt::money;
use crate::models::{
    parse_amount, parse_date, AccountFields, EmailFields, MemberFields, SubscriptionFields,
};
use crate::ops::Confirmed;
use crate::reports::kpis;
use crate::settings::{Settings, DB_FILE};
use crate::store::{FileSeed, Store};

#[derive(Parser)]
#[command(
    name = "sharesub",
    version,
    about = "Bookkeeping for shared subscriptions: accounts, plans, members and contact mails."
)]
pub struct Cli {
    /// Use this data directory instead of the saved one
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,
    /// Log store activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up sharesub: choose a data directory and create the database.
    Init {
        /// JSON snapshot to start from when the database is empty
        #[arg(long)]
        seed: Option<String>,
    },
    /// Show current database and summary figures.
    Status,
    /// Dashboard: totals, accounts and subscriptions.
    Report,
    /// Manage owner accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage the subscriptions of an account.
    Subs {
        #[command(subcommand)]
        command: SubsCommands,
    },
    /// Manage the members sharing a subscription.
    Members {
        #[command(subcommand)]
        command: MembersCommands,
    },
    /// Manage contact mails.
    Emails {
        #[command(subcommand)]
        command: EmailsCommands,
    },
    /// Write the stored database to a JSON file.
    Export {
        /// Output path (default: ./db.json)
        #[arg(long)]
        output: Option<String>,
    },
    /// Replace the whole database with a JSON file.
    Import {
        /// Path to a JSON export
        file: String,
    },
    /// Wipe everything back to an empty database.
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Replace the database with sample data to explore sharesub.
    Demo {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add an account.
    Add {
        #[command(flatten)]
        fields: AccountArgs,
    },
    /// List all accounts.
    List,
    /// Change fields of an account; omitted fields stay as they are.
    Edit {
        /// Account ID (shown in `sharesub accounts list`)
        id: u64,
        #[command(flatten)]
        fields: AccountArgs,
    },
    /// Delete an account with all its subscriptions and members.
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum SubsCommands {
    /// Add a subscription to an account.
    Add {
        account: u64,
        #[command(flatten)]
        fields: SubscriptionArgs,
    },
    /// List subscriptions, optionally for one account.
    List { account: Option<u64> },
    /// Show one subscription in full.
    Show {
        account: u64,
        subscription: u64,
        /// Print the password instead of masking it
        #[arg(long)]
        reveal: bool,
    },
    /// Change fields of a subscription; omitted fields stay as they are.
    Edit {
        account: u64,
        subscription: u64,
        #[command(flatten)]
        fields: SubscriptionArgs,
    },
    /// Delete a subscription with all its members.
    Delete {
        account: u64,
        subscription: u64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum MembersCommands {
    /// Add a member to a subscription.
    Add {
        account: u64,
        subscription: u64,
        #[command(flatten)]
        fields: MemberArgs,
    },
    /// List the members of a subscription.
    List { account: u64, subscription: u64 },
    /// Change fields of a member; omitted fields stay as they are.
    Edit {
        account: u64,
        subscription: u64,
        member: u64,
        #[command(flatten)]
        fields: MemberArgs,
    },
    /// Remove a member from a subscription.
    Delete {
        account: u64,
        subscription: u64,
        member: u64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum EmailsCommands {
    /// Add a contact mail.
    Add {
        #[command(flatten)]
        fields: EmailArgs,
    },
    /// List contact mails.
    List,
    /// Change fields of a mail; omitted fields stay as they are.
    Edit {
        id: u64,
        #[command(flatten)]
        fields: EmailArgs,
    },
    /// Flip the enabled flag of a mail.
    Toggle { id: u64 },
    /// Delete a contact mail.
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct AccountArgs {
    /// Display name, e.g. 'ShareSub #1'
    #[arg(long)]
    pub name: Option<String>,
    /// Country code, e.g. FR
    #[arg(long)]
    pub country: Option<String>,
    /// Owner mail of the account
    #[arg(long = "email")]
    pub account_email: Option<String>,
    /// Masked IBAN, shown as entered
    #[arg(long = "iban")]
    pub iban_masked: Option<String>,
    /// Monthly revenue
    #[arg(long, value_parser = parse_money)]
    pub revenue: Option<f64>,
    /// Monthly cost
    #[arg(long, value_parser = parse_money)]
    pub cost: Option<f64>,
}

#[derive(Args, Debug, Default)]
pub struct SubscriptionArgs {
    /// Service, e.g. spotify
    #[arg(long)]
    pub platform: Option<String>,
    /// Plan name, e.g. Famille
    #[arg(long)]
    pub plan: Option<String>,
    /// Login mail of the subscription
    #[arg(long)]
    pub email: Option<String>,
    /// Login password (stored as entered)
    #[arg(long, conflicts_with = "ask_password")]
    pub password: Option<String>,
    /// Prompt for the password without echo
    #[arg(long = "ask-password")]
    pub ask_password: bool,
    /// What you pay per month
    #[arg(long, value_parser = parse_money)]
    pub price: Option<f64>,
    /// Renewal date: YYYY-MM-DD ('' clears it)
    #[arg(long, value_parser = parse_renew_date)]
    pub renew: Option<RenewDate>,
    /// Free text
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct MemberArgs {
    /// Display name
    #[arg(long)]
    pub pseudo: Option<String>,
    /// Member mail
    #[arg(long)]
    pub mail: Option<String>,
    /// What this member pays per month
    #[arg(long, value_parser = parse_money)]
    pub fee: Option<f64>,
}

#[derive(Args, Debug, Default)]
pub struct EmailArgs {
    /// Mail address
    #[arg(long)]
    pub address: Option<String>,
    /// Country code
    #[arg(long)]
    pub country: Option<String>,
    /// true or false
    #[arg(long)]
    pub enabled: Option<bool>,
    /// Last check, free text, e.g. '2025-08-22 12:10'
    #[arg(long = "last-check")]
    pub last_check: Option<String>,
}

/// Parsed `--renew` value; `None` clears the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewDate(pub Option<NaiveDate>);

/// Accepts `3.5` and `3,5`.
pub(crate) fn parse_money(raw: &str) -> std::result::Result<f64, String> {
    parse_amount(raw).ok_or_else(|| format!("'{raw}' is not an amount"))
}

pub(crate) fn parse_renew_date(raw: &str) -> std::result::Result<RenewDate, String> {
    if raw.trim().is_empty() {
        return Ok(RenewDate(None));
    }
    parse_date(raw)
        .map(|d| RenewDate(Some(d)))
        .ok_or_else(|| format!("'{raw}' is not a date (expected YYYY-MM-DD)"))
}

impl From<AccountArgs> for AccountFields {
    fn from(args: AccountArgs) -> Self {
        AccountFields {
            name: args.name,
            country: args.country,
            account_email: args.account_email,
            iban_masked: args.iban_masked,
            monthly_revenue: args.revenue,
            monthly_cost: args.cost,
        }
    }
}

impl SubscriptionArgs {
    /// Resolves `--ask-password` into a plain field set.
    pub fn into_fields(self) -> Result<SubscriptionFields> {
        let password = if self.ask_password {
            Some(rpassword::prompt_password("Password: ")?)
        } else {
            self.password
        };
        Ok(SubscriptionFields {
            platform: self.platform,
            plan: self.plan,
            email: self.email,
            password,
            price_you_pay_month: self.price,
            renew_date: self.renew.map(|r| r.0),
            comment: self.comment,
        })
    }
}

impl From<MemberArgs> for MemberFields {
    fn from(args: MemberArgs) -> Self {
        MemberFields {
            pseudo: args.pseudo,
            mail: args.mail,
            monthly_fee: args.fee,
        }
    }
}

impl From<EmailArgs> for EmailFields {
    fn from(args: EmailArgs) -> Self {
        EmailFields {
            address: args.address,
            country: args.country,
            enabled: args.enabled,
            last_check: args.last_check,
        }
    }
}

/// Opens the database under the data directory, creating both if needed.
pub(crate) fn open_store(settings: &Settings) -> Result<Store<SqliteBlobStore>> {
    let data_dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let mut store = Store::new(SqliteBlobStore::open(&data_dir.join(DB_FILE))?);
    if let Some(seed) = settings.seed_path() {
        store = store.with_seed(FileSeed::new(seed));
    }
    Ok(store)
}

/// `Some` when the user agreed (or passed `--yes`).
pub(crate) fn confirm(prompt: &str, yes: bool) -> Result<Option<Confirmed>> {
    if yes {
        return Ok(Some(Confirmed::affirmed()));
    }
    let agreed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| SharesubError::Other(format!("Confirmation needed ({e}); pass --yes")))?;
    Ok(agreed.then(Confirmed::affirmed))
}

/// Recompute and print the headline figures from the freshly saved state.
pub(crate) fn refresh(store: &Store<SqliteBlobStore>) -> Result<()> {
    let k = kpis(&store.load()?);
    println!(
        "Revenue {} | Cost {} | Margin {} | Accounts {}",
        money(k.revenue),
        money(k.cost),
        money(k.margin),
        k.accounts
    );
    Ok(())
}

pub(crate) fn aborted() -> Result<()> {
    println!("Aborted.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("3.5"), Ok(3.5));
        assert_eq!(parse_money(" 3,50 "), Ok(3.5));
        assert!(parse_money("abc").is_err());
        assert!(parse_money("inf").is_err());
    }

    #[test]
    fn test_parse_renew_date() {
        assert_eq!(
            parse_renew_date("2025-10-14"),
            Ok(RenewDate(NaiveDate::from_ymd_opt(2025, 10, 14)))
        );
        assert_eq!(parse_renew_date(""), Ok(RenewDate(None)));
        assert!(parse_renew_date("14/10/2025").is_err());
    }

    #[test]
    fn test_edit_args_only_carry_given_flags() {
        let cli = Cli::parse_from(["sharesub", "subs", "edit", "1", "101", "--comment", "new text"]);
        let Commands::Subs {
            command: SubsCommands::Edit { fields, .. },
        } = cli.command
        else {
            panic!("expected subs edit");
        };
        let fields = fields.into_fields().unwrap();
        assert_eq!(
            fields,
            SubscriptionFields {
                comment: Some("new text".to_string()),
                ..SubscriptionFields::default()
            }
        );
    }
}
