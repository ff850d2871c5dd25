mod cli;
mod db;
mod error;
mod fmt;
mod models;
mod ops;
mod reports;
mod settings;
mod store;

use clap::{CommandFactory, Parser};
use env_logger::Env;

use cli::{AccountsCommands, Cli, Commands, EmailsCommands, MembersCommands, SubsCommands};
use settings::effective_settings;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    let settings = effective_settings(cli.data_dir.as_deref());

    let result = match cli.command {
        Commands::Init { seed } => cli::init::run(cli.data_dir, seed),
        Commands::Status => cli::status::run(&settings),
        Commands::Report => cli::report::run(&settings),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add { fields } => cli::accounts::add(&settings, fields),
            AccountsCommands::List => cli::accounts::list(&settings),
            AccountsCommands::Edit { id, fields } => cli::accounts::edit(&settings, id, fields),
            AccountsCommands::Delete { id, yes } => cli::accounts::delete(&settings, id, yes),
        },
        Commands::Subs { command } => match command {
            SubsCommands::Add { account, fields } => {
                cli::subscriptions::add(&settings, account, fields)
            }
            SubsCommands::List { account } => cli::subscriptions::list(&settings, account),
            SubsCommands::Show {
                account,
                subscription,
                reveal,
            } => cli::subscriptions::show(&settings, account, subscription, reveal),
            SubsCommands::Edit {
                account,
                subscription,
                fields,
            } => cli::subscriptions::edit(&settings, account, subscription, fields),
            SubsCommands::Delete {
                account,
                subscription,
                yes,
            } => cli::subscriptions::delete(&settings, account, subscription, yes),
        },
        Commands::Members { command } => match command {
            MembersCommands::Add {
                account,
                subscription,
                fields,
            } => cli::members::add(&settings, account, subscription, fields),
            MembersCommands::List {
                account,
                subscription,
            } => cli::members::list(&settings, account, subscription),
            MembersCommands::Edit {
                account,
                subscription,
                member,
                fields,
            } => cli::members::edit(&settings, account, subscription, member, fields),
            MembersCommands::Delete {
                account,
                subscription,
                member,
                yes,
            } => cli::members::delete(&settings, account, subscription, member, yes),
        },
        Commands::Emails { command } => match command {
            EmailsCommands::Add { fields } => cli::emails::add(&settings, fields),
            EmailsCommands::List => cli::emails::list(&settings),
            EmailsCommands::Edit { id, fields } => cli::emails::edit(&settings, id, fields),
            EmailsCommands::Toggle { id } => cli::emails::toggle(&settings, id),
            EmailsCommands::Delete { id, yes } => cli::emails::delete(&settings, id, yes),
        },
        Commands::Export { output } => cli::export::run(&settings, output),
        Commands::Import { file } => cli::import::run(&settings, &file),
        Commands::Reset { yes } => cli::reset::run(&settings, yes),
        Commands::Demo { yes } => cli::demo::run(&settings, yes),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "sharesub", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
