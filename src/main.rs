use clap::Parser;
use std::process::ExitCode;
use subtrack::args::{
    Args, BackupCommand, Command, ExpensesCommand, NotificationsCommand, SettingsCommand,
    SubscriptionsCommand,
};
use subtrack::{commands, Config, Mode, Result};
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {}", e.error_type(), e.user_message());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().subtrack_home().path();

    // When SUBTRACK_IN_TEST_MODE is set and non-empty, an in-memory API stands in for the
    // configured server.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.api_base_url())
            .await?
            .print(),

        Command::Dashboard(dashboard_args) => {
            let config = Config::load(home).await?;
            commands::dashboard(config, mode, dashboard_args.demo())
                .await?
                .print()
        }

        Command::Subscriptions(sub) => {
            let config = Config::load(home).await?;
            match sub {
                SubscriptionsCommand::List => {
                    commands::subscriptions_list(config, mode).await?.print()
                }
                SubscriptionsCommand::Get(id) => commands::subscriptions_get(config, mode, &id.id)
                    .await?
                    .print(),
                SubscriptionsCommand::Add(add) => {
                    commands::subscriptions_add(config, mode, add.clone())
                        .await?
                        .print()
                }
                SubscriptionsCommand::Update(update) => {
                    commands::subscriptions_update(config, mode, update.clone())
                        .await?
                        .print()
                }
                SubscriptionsCommand::Delete(id) => {
                    commands::subscriptions_delete(config, mode, &id.id)
                        .await?
                        .print()
                }
                SubscriptionsCommand::Seed => {
                    commands::subscriptions_seed(config, mode).await?.print()
                }
            }
        }

        Command::Expenses(exp) => {
            let config = Config::load(home).await?;
            match exp {
                ExpensesCommand::List => commands::expenses_list(config, mode).await?.print(),
                ExpensesCommand::Get(id) => commands::expenses_get(config, mode, &id.id)
                    .await?
                    .print(),
                ExpensesCommand::Add(add) => commands::expenses_add(config, mode, add.clone())
                    .await?
                    .print(),
                ExpensesCommand::Update(update) => {
                    commands::expenses_update(config, mode, update.clone())
                        .await?
                        .print()
                }
                ExpensesCommand::Delete(id) => commands::expenses_delete(config, mode, &id.id)
                    .await?
                    .print(),
            }
        }

        Command::Settings(settings) => {
            let config = Config::load(home).await?;
            match settings {
                SettingsCommand::Show => commands::settings_show(config, mode).await?.print(),
                SettingsCommand::Set(set) => commands::settings_set(config, mode, set.clone())
                    .await?
                    .print(),
            }
        }

        Command::Notifications(notifications) => {
            let config = Config::load(home).await?;
            match notifications {
                NotificationsCommand::Plan => {
                    commands::notifications_plan(config, mode).await?.print()
                }
                NotificationsCommand::Test => {
                    commands::notifications_test(config, mode).await?.print()
                }
            }
        }

        Command::Backup(backup) => {
            let config = Config::load(home).await?;
            match backup {
                BackupCommand::ExportJson => {
                    commands::backup_export_json(config, mode).await?.print()
                }
                BackupCommand::ExportCsv => commands::backup_export_csv(config, mode).await?.print(),
                BackupCommand::Import(import) => {
                    commands::backup_import(config, mode, &import.path, import.merge)
                        .await?
                        .print()
                }
                BackupCommand::DeleteAll(delete) => {
                    commands::backup_delete_all(config, mode, delete.yes)
                        .await?
                        .print()
                }
            }
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
