//! Command handlers for the subtrack CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod backup;
mod dashboard;
mod expenses;
mod init;
mod notifications;
mod settings;
mod subscriptions;

use crate::repo::{Fallback, Origin};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

pub use backup::{backup_delete_all, backup_export_csv, backup_export_json, backup_import};
pub use dashboard::dashboard;
pub use expenses::{expenses_add, expenses_delete, expenses_get, expenses_list, expenses_update};
pub use init::init;
pub use notifications::{notifications_plan, notifications_test};
pub use settings::{settings_set, settings_show};
pub use subscriptions::{
    subscriptions_add, subscriptions_delete, subscriptions_get, subscriptions_list,
    subscriptions_seed, subscriptions_update,
};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// A note appended to messages when the on-device store was used. Remote failures are also logged
/// with their user-facing message.
fn origin_note(origin: &Origin) -> String {
    match origin {
        Origin::Remote => String::new(),
        Origin::Local(Fallback::Unconfigured) => " (on this device, no API configured)".to_string(),
        Origin::Local(Fallback::Failed(e)) => {
            warn!("{}", e.user_message());
            " (on this device, the API is unavailable)".to_string()
        }
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
