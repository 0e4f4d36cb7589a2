//! Access to the remote REST API.
//!
//! The `Backend` trait sends one JSON request and returns the decoded JSON response. `HttpBackend`
//! talks to a real server; `TestBackend` emulates the server in memory. `Api` wraps a backend with
//! one typed method per endpoint.

mod error;
mod http;
mod test_backend;

pub use error::{ApiError, ErrorCode};
pub use http::HttpBackend;
pub use test_backend::TestBackend;

use crate::error::Res;
use crate::model::{
    AppSettings, CsvExport, DashboardSummary, DemoDataResult, ExportData, ImportRequest,
    ImportResult, Resource, ScheduledNotification, ScheduledNotifications,
};
use crate::Config;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::debug;

/// When this environment variable is set to a non-empty value the in-memory `TestBackend` is used
/// instead of HTTP.
pub const TEST_MODE_ENV: &str = "SUBTRACK_IN_TEST_MODE";

/// Selects which `Backend` implementation is used.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Sends a single request to the API. `path` starts with `/api/`. A successful response without a
/// body is returned as `Value::Null`.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError>;
}

/// A typed client for the API endpoints.
#[derive(Clone)]
pub struct Api {
    backend: Arc<dyn Backend>,
}

impl Api {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Creates the client for the configured API, or `None` when no base URL is configured.
    pub fn from_config(config: &Config, mode: Mode) -> Res<Option<Self>> {
        let base_url = match config.api_base_url() {
            Some(url) => url,
            None => {
                debug!("No API base URL is configured");
                return Ok(None);
            }
        };
        let backend: Arc<dyn Backend> = match mode {
            Mode::Http => Arc::new(HttpBackend::new(&base_url, config.request_timeout())?),
            Mode::Test => {
                debug!("Using the in-memory test backend for {base_url}");
                Arc::new(TestBackend::default())
            }
        };
        Ok(Some(Self::new(backend)))
    }

    pub async fn list<R: Resource>(&self) -> Result<Vec<R>, ApiError> {
        self.call(Method::Get, R::PATH, None).await
    }

    pub async fn get<R: Resource>(&self, id: &str) -> Result<R, ApiError> {
        self.call(Method::Get, &item_path::<R>(id), None).await
    }

    pub async fn create<R: Resource>(&self, new: &R::New) -> Result<R, ApiError> {
        self.call(Method::Post, R::PATH, Some(to_value(new)?)).await
    }

    pub async fn update<R: Resource>(&self, id: &str, patch: &R::Patch) -> Result<R, ApiError> {
        self.call(Method::Put, &item_path::<R>(id), Some(to_value(patch)?))
            .await
    }

    pub async fn delete<R: Resource>(&self, id: &str) -> Result<(), ApiError> {
        self.backend
            .send(Method::Delete, &item_path::<R>(id), None)
            .await
            .map(|_| ())
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary, ApiError> {
        self.call(Method::Get, "/api/dashboard", None).await
    }

    /// Replaces all data on the server with demo records.
    pub async fn load_demo_data(&self) -> Result<DemoDataResult, ApiError> {
        self.call(Method::Post, "/api/demo-data", None).await
    }

    pub async fn settings(&self) -> Result<AppSettings, ApiError> {
        self.call(Method::Get, "/api/settings", None).await
    }

    pub async fn put_settings(&self, settings: &AppSettings) -> Result<AppSettings, ApiError> {
        self.call(Method::Put, "/api/settings", Some(to_value(settings)?))
            .await
    }

    pub async fn scheduled_notifications(&self) -> Result<Vec<ScheduledNotification>, ApiError> {
        let body: ScheduledNotifications = self
            .call(Method::Get, "/api/notifications/scheduled", None)
            .await?;
        Ok(body.notifications)
    }

    pub async fn export_json(&self) -> Result<ExportData, ApiError> {
        self.call(Method::Get, "/api/export/json", None).await
    }

    pub async fn export_csv(&self) -> Result<CsvExport, ApiError> {
        self.call(Method::Get, "/api/export/csv", None).await
    }

    pub async fn import_json(&self, request: &ImportRequest) -> Result<ImportResult, ApiError> {
        self.call(Method::Post, "/api/import/json", Some(to_value(request)?))
            .await
    }

    pub async fn delete_all_data(&self) -> Result<(), ApiError> {
        self.backend
            .send(Method::Delete, "/api/data/all", None)
            .await
            .map(|_| ())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let value = self.backend.send(method, path, body).await?;
        serde_json::from_value(value).map_err(|e| {
            ApiError::invalid_response(format!("Ungültige API-Antwort von {path}: {e}"))
        })
    }
}

fn item_path<R: Resource>(id: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    format!("{}/{}", R::PATH, encoded)
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::new(ErrorCode::UnknownError, format!("Unable to encode: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BillingCycle, Cents, Expense, NewSubscription, Subscription};

    #[test]
    fn test_item_path_is_encoded() {
        assert_eq!(
            item_path::<Subscription>("65a1f0c2e4b0a1b2c3d4e5f6"),
            "/api/subscriptions/65a1f0c2e4b0a1b2c3d4e5f6"
        );
        assert_eq!(item_path::<Expense>("a/b c"), "/api/expenses/a%2Fb+c");
    }

    #[test]
    fn test_mode_default() {
        assert_eq!(Mode::default(), Mode::Http);
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let backend = Arc::new(TestBackend::default());
        let api = Api::new(backend.clone());
        let created: Subscription = api
            .create::<Subscription>(&NewSubscription {
                name: "Netflix".into(),
                category: "Streaming".into(),
                amount_cents: Cents::new(1299),
                billing_cycle: BillingCycle::Monthly,
                start_date: "2025-01-15".into(),
                notes: None,
                cancel_url: None,
            })
            .await
            .unwrap();
        let fetched: Subscription = api.get(&created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(api.list::<Subscription>().await.unwrap().len(), 1);
        api.delete::<Subscription>(&created.id).await.unwrap();
        assert!(api
            .get::<Subscription>(&created.id)
            .await
            .unwrap_err()
            .is_not_found());
        assert_eq!(backend.calls(), 5);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_invalid_response() {
        let backend = Arc::new(TestBackend::default());
        let api = Api::new(backend);
        // The dashboard is an object, not a list
        let e = api
            .call::<Vec<Subscription>>(Method::Get, "/api/dashboard", None)
            .await
            .unwrap_err();
        assert_eq!(e.code(), ErrorCode::InvalidResponse);
    }
}
