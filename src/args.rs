//! These structs provide the CLI interface for the subtrack CLI.

use crate::model::BillingCycle;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// subtrack: Keep track of your subscriptions and fixed expenses.
///
/// subtrack talks to the SubTrack API configured with `subtrack init --api-base-url` (or the
/// SUBTRACK_BACKEND_URL environment variable). Subscriptions keep working without the API: they
/// are then read from and written to a store in the subtrack home directory, and every command
/// says when that happened.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the subtrack home directory and its configuration file.
    ///
    /// Without --api-base-url subtrack runs in local-only mode: subscriptions are kept on this
    /// device and everything else is unavailable.
    Init(InitArgs),
    /// Show monthly and yearly totals.
    Dashboard(DashboardArgs),
    /// List, add, change and delete subscriptions.
    #[command(subcommand)]
    Subscriptions(SubscriptionsCommand),
    /// List, add, change and delete fixed expenses.
    #[command(subcommand)]
    Expenses(ExpensesCommand),
    /// Show or change the app settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Plan renewal reminders.
    #[command(subcommand)]
    Notifications(NotificationsCommand),
    /// Export, import or delete all data.
    #[command(subcommand)]
    Backup(BackupCommand),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where subtrack data and configuration is held. Defaults to ~/subtrack
    #[arg(long, env = "SUBTRACK_HOME", default_value_t = default_subtrack_home())]
    subtrack_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, subtrack_home: PathBuf) -> Self {
        Self {
            log_level,
            subtrack_home: subtrack_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn subtrack_home(&self) -> &DisplayPath {
        &self.subtrack_home
    }
}

/// (Not shown): Args for the `subtrack init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the SubTrack API, e.g. https://subtrack.example.com
    #[arg(long)]
    api_base_url: Option<String>,
}

impl InitArgs {
    pub fn new(api_base_url: Option<String>) -> Self {
        Self { api_base_url }
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }
}

/// (Not shown): Args for the `subtrack dashboard` command.
#[derive(Debug, Parser, Clone)]
pub struct DashboardArgs {
    /// Replace all data on the server with demo data first.
    #[arg(long)]
    demo: bool,
}

impl DashboardArgs {
    pub fn new(demo: bool) -> Self {
        Self { demo }
    }

    pub fn demo(&self) -> bool {
        self.demo
    }
}

/// A subscription or expense id.
#[derive(Debug, Parser, Clone)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubscriptionsCommand {
    /// List all subscriptions.
    List,
    /// Show one subscription.
    Get(IdArgs),
    /// Add a subscription.
    Add(AddSubscriptionArgs),
    /// Change fields of a subscription.
    Update(UpdateSubscriptionArgs),
    /// Delete a subscription.
    Delete(IdArgs),
    /// Fill an empty local store with one subscription per known service.
    Seed,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExpensesCommand {
    /// List all fixed expenses.
    List,
    /// Show one fixed expense.
    Get(IdArgs),
    /// Add a fixed expense.
    Add(AddExpenseArgs),
    /// Change fields of a fixed expense.
    Update(UpdateExpenseArgs),
    /// Delete a fixed expense.
    Delete(IdArgs),
}

/// (Not shown): Args for `subtrack subscriptions add`.
#[derive(Debug, Parser, Clone)]
pub struct AddSubscriptionArgs {
    /// Start from a known service, e.g. netflix or spotify. Name, category and amount default to
    /// the service's first plan, or to --plan.
    #[arg(long)]
    pub preset: Option<String>,

    /// The plan of --preset to use, e.g. "Netflix Premium".
    #[arg(long, requires = "preset")]
    pub plan: Option<String>,

    #[arg(long, required_unless_present = "preset")]
    pub name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// The amount in euros, e.g. 12,99
    #[arg(long, required_unless_present = "preset")]
    pub amount: Option<String>,

    #[arg(long, value_enum)]
    pub cycle: Option<BillingCycle>,

    /// The first billing date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    pub start_date: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Where the subscription can be cancelled.
    #[arg(long)]
    pub cancel_url: Option<String>,
}

/// (Not shown): Args for `subtrack subscriptions update`.
#[derive(Debug, Parser, Clone)]
pub struct UpdateSubscriptionArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// The amount in euros, e.g. 12,99
    #[arg(long)]
    pub amount: Option<String>,

    #[arg(long, value_enum)]
    pub cycle: Option<BillingCycle>,

    #[arg(long)]
    pub start_date: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long)]
    pub cancel_url: Option<String>,
}

/// (Not shown): Args for `subtrack expenses add`.
#[derive(Debug, Parser, Clone)]
pub struct AddExpenseArgs {
    #[arg(long)]
    pub name: String,

    /// One of Wohnen, Versicherung, Kommunikation, Mobilität, Gesundheit, Bildung, Sonstiges.
    #[arg(long, default_value = "Sonstiges")]
    pub category: String,

    /// The amount in euros, e.g. 850
    #[arg(long)]
    pub amount: String,

    /// Defaults to monthly.
    #[arg(long, value_enum)]
    pub cycle: Option<BillingCycle>,

    #[arg(long)]
    pub notes: Option<String>,
}

/// (Not shown): Args for `subtrack expenses update`.
#[derive(Debug, Parser, Clone)]
pub struct UpdateExpenseArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub amount: Option<String>,

    #[arg(long, value_enum)]
    pub cycle: Option<BillingCycle>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Show the current settings.
    Show,
    /// Change one or more settings.
    Set(SetSettingsArgs),
}

/// (Not shown): Args for `subtrack settings set`.
#[derive(Debug, Parser, Clone)]
pub struct SetSettingsArgs {
    #[arg(long)]
    pub currency: Option<String>,

    /// Turn renewal reminders on or off.
    #[arg(long)]
    pub notifications: Option<bool>,

    /// The time of day for reminders, HH:MM.
    #[arg(long)]
    pub notification_time: Option<String>,

    /// Days before a renewal to remind, e.g. 1,3,7
    #[arg(long, value_delimiter = ',')]
    pub days_before: Option<Vec<u32>>,

    #[arg(long)]
    pub theme: Option<String>,

    #[arg(long)]
    pub backup_interval: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum NotificationsCommand {
    /// Show the reminders for upcoming renewals.
    Plan,
    /// Produce a reminder that triggers right away.
    Test,
}

#[derive(Subcommand, Debug, Clone)]
pub enum BackupCommand {
    /// Write all data to a JSON file in the backups directory.
    ExportJson,
    /// Write subscriptions and expenses to CSV files in the backups directory.
    ExportCsv,
    /// Load subscriptions and expenses from a JSON backup.
    Import(ImportArgs),
    /// Delete all subscriptions and expenses on the server.
    DeleteAll(DeleteAllArgs),
}

/// (Not shown): Args for `subtrack backup import`.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// The JSON backup file.
    pub path: PathBuf,

    /// Add to the existing data instead of replacing it.
    #[arg(long)]
    pub merge: bool,
}

/// (Not shown): Args for `subtrack backup delete-all`.
#[derive(Debug, Parser, Clone)]
pub struct DeleteAllArgs {
    /// Confirms that all data should be deleted.
    #[arg(long)]
    pub yes: bool,
}

fn default_subtrack_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("subtrack"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --subtrack-home or SUBTRACK_HOME instead of relying on the \
                default subtrack home directory.",
            );
            PathBuf::from("subtrack")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_preset() {
        let args = Args::try_parse_from([
            "subtrack",
            "--subtrack-home",
            "/tmp/st",
            "subscriptions",
            "add",
            "--preset",
            "netflix",
        ])
        .unwrap();
        assert_eq!(args.common().subtrack_home().path(), Path::new("/tmp/st"));
        match args.command() {
            Command::Subscriptions(SubscriptionsCommand::Add(add)) => {
                assert_eq!(add.preset.as_deref(), Some("netflix"));
                assert_eq!(add.name, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_add_requires_name_without_preset() {
        let result =
            Args::try_parse_from(["subtrack", "subscriptions", "add", "--amount", "12,99"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_days_before() {
        let args = Args::try_parse_from([
            "subtrack",
            "--log-level",
            "debug",
            "settings",
            "set",
            "--days-before",
            "1,3",
            "--notifications",
            "false",
        ])
        .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        match args.command() {
            Command::Settings(SettingsCommand::Set(set)) => {
                assert_eq!(set.days_before, Some(vec![1, 3]));
                assert_eq!(set.notifications, Some(false));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_cycle() {
        let args = Args::try_parse_from([
            "subtrack",
            "expenses",
            "add",
            "--name",
            "Miete",
            "--amount",
            "850",
            "--cycle",
            "yearly",
        ])
        .unwrap();
        match args.command() {
            Command::Expenses(ExpensesCommand::Add(add)) => {
                assert_eq!(add.cycle, Some(BillingCycle::Yearly));
                assert_eq!(add.category, "Sonstiges");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
