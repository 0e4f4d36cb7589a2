//! The data-access layer used by the commands.
//!
//! `SubscriptionRepo` reads and writes through the API and degrades to the on-device store when the
//! API is not configured or fails. Every result it returns says where the data came from. The other
//! repos are remote-only and return the `ApiError` when the API fails.
//!
//! Each repo keeps the collection it last loaded, in the order it was returned. After every
//! successful remote mutation the collection is re-listed from the API.

mod dashboard;
mod remote;
mod subscriptions;

pub use dashboard::DashboardRepo;
pub use remote::{ExpenseRepo, RemoteRepo};
pub use subscriptions::SubscriptionRepo;

use crate::api::{Api, ApiError, Mode};
use crate::error::{ErrorType, IntoResult};
use crate::settings::SettingsRepo;
use crate::store::{FileStore, SubscriptionStore};
use crate::{Config, Result};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Why the on-device store was used instead of the API.
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback {
    /// No API base URL is configured. No request was sent.
    Unconfigured,
    /// The request was sent and failed.
    Failed(ApiError),
}

/// Where a result came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    Remote,
    Local(Fallback),
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Remote => f.write_str("remote"),
            Origin::Local(Fallback::Unconfigured) => f.write_str("local (no API configured)"),
            Origin::Local(Fallback::Failed(e)) => write!(f, "local (API failed: {e})"),
        }
    }
}

/// A value together with its `Origin`.
#[derive(Debug, Clone, PartialEq)]
pub struct Synced<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Synced<T> {
    pub(crate) fn remote(value: T) -> Self {
        Self {
            value,
            origin: Origin::Remote,
        }
    }

    pub(crate) fn local(value: T, fallback: Fallback) -> Self {
        Self {
            value,
            origin: Origin::Local(fallback),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.origin == Origin::Remote
    }

    /// The reason for using the on-device store, if it was used.
    pub fn fallback(&self) -> Option<&Fallback> {
        match &self.origin {
            Origin::Remote => None,
            Origin::Local(fallback) => Some(fallback),
        }
    }

    /// The API error that caused the fallback, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self.fallback() {
            Some(Fallback::Failed(e)) => Some(e),
            _ => None,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Synced<U> {
        Synced {
            value: f(self.value),
            origin: self.origin,
        }
    }
}

/// All repos, sharing one API client.
pub struct Repos {
    api: Option<Api>,
    pub subscriptions: SubscriptionRepo,
    pub expenses: ExpenseRepo,
    pub dashboard: DashboardRepo,
    pub settings: SettingsRepo,
}

impl Repos {
    /// Opens the repos for `config`. The on-device store lives in the config's store directory.
    pub fn open(config: &Config, mode: Mode) -> Result<Self> {
        let api = Api::from_config(config, mode).pub_result(ErrorType::Config)?;
        let store = SubscriptionStore::new(Arc::new(FileStore::new(config.store())));
        Ok(Self::new(api, store))
    }

    pub fn new(api: Option<Api>, store: SubscriptionStore) -> Self {
        Self {
            subscriptions: SubscriptionRepo::new(api.clone(), store),
            expenses: ExpenseRepo::new(api.clone()),
            dashboard: DashboardRepo::new(api.clone()),
            settings: SettingsRepo::new(api.clone()),
            api,
        }
    }

    /// The shared API client, or `None` in local-only mode.
    pub fn api(&self) -> Option<&Api> {
        self.api.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestBackend;
    use crate::store::MemoryStore;

    #[test]
    fn test_synced_accessors() {
        let remote = Synced::remote(1);
        assert!(remote.is_remote());
        assert_eq!(remote.fallback(), None);

        let failed = Synced::local(2, Fallback::Failed(ApiError::timeout())).map(|n| n * 10);
        assert!(!failed.is_remote());
        assert_eq!(failed.value, 20);
        assert_eq!(
            failed.api_error().map(ApiError::code),
            Some(crate::api::ErrorCode::TimeoutError)
        );

        let unconfigured = Synced::local((), Fallback::Unconfigured);
        assert_eq!(unconfigured.fallback(), Some(&Fallback::Unconfigured));
        assert_eq!(unconfigured.api_error(), None);
        assert_eq!(unconfigured.origin.to_string(), "local (no API configured)");
    }

    #[tokio::test]
    async fn test_repos_share_one_api() {
        let backend = TestBackend::default();
        let api = Api::new(Arc::new(backend.clone()));
        let store = SubscriptionStore::new(Arc::new(MemoryStore::default()));
        let mut repos = Repos::new(Some(api), store);
        repos.subscriptions.list().await.unwrap();
        repos.expenses.list().await.unwrap();
        repos.dashboard.fetch().await.unwrap();
        repos.settings.fetch().await.unwrap();
        assert_eq!(backend.calls(), 4);
    }
}
