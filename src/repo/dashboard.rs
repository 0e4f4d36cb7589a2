use crate::api::{Api, ApiError};
use crate::model::{DashboardSummary, DemoDataResult};
use tracing::{debug, warn};

/// The dashboard aggregate, computed by the API.
pub struct DashboardRepo {
    api: Option<Api>,
    summary: Option<DashboardSummary>,
}

impl DashboardRepo {
    pub fn new(api: Option<Api>) -> Self {
        Self { api, summary: None }
    }

    /// The last summary fetched successfully.
    pub fn summary(&self) -> Option<&DashboardSummary> {
        self.summary.as_ref()
    }

    pub async fn fetch(&mut self) -> Result<DashboardSummary, ApiError> {
        let api = self.api.as_ref().ok_or_else(ApiError::unconfigured)?;
        let summary = api.dashboard().await?;
        self.summary = Some(summary.clone());
        Ok(summary)
    }

    /// Asks the API to add its demo subscriptions and expenses, then fetches the new summary. The
    /// demo data is in place once the API accepts it, so a failed fetch keeps the previous summary.
    pub async fn load_demo_data(&mut self) -> Result<DemoDataResult, ApiError> {
        let api = self.api.as_ref().ok_or_else(ApiError::unconfigured)?;
        let result = api.load_demo_data().await?;
        debug!(
            "Demo data added {} subscriptions and {} expenses",
            result.subscriptions, result.expenses
        );
        if let Err(e) = self.fetch().await {
            warn!("Unable to fetch the dashboard after loading demo data: {e}");
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Backend, Method, TestBackend};
    use serde_json::Value;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_demo_data_refreshes_summary() {
        let backend = TestBackend::default();
        let mut repo = DashboardRepo::new(Some(Api::new(Arc::new(backend.clone()))));
        let empty = repo.fetch().await.unwrap();
        assert_eq!(empty, DashboardSummary::default());

        let result = repo.load_demo_data().await.unwrap();
        let summary = repo.summary().unwrap();
        assert_eq!(summary.subscription_count, result.subscriptions);
        assert_eq!(summary.expense_count, result.expenses);
        assert_eq!(
            *summary,
            DashboardSummary::compute(&backend.subscriptions(), &backend.expenses())
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_summary() {
        let backend = TestBackend::default();
        let mut repo = DashboardRepo::new(Some(Api::new(Arc::new(backend.clone()))));
        repo.load_demo_data().await.unwrap();
        let before = repo.summary().cloned();

        backend.set_offline(true);
        assert!(repo.fetch().await.is_err());
        assert_eq!(repo.summary().cloned(), before);
    }

    /// Goes offline right after the first POST has been handled.
    struct OfflineAfterPost(TestBackend);

    #[async_trait::async_trait]
    impl Backend for OfflineAfterPost {
        async fn send(
            &self,
            method: Method,
            path: &str,
            body: Option<Value>,
        ) -> Result<Value, ApiError> {
            let response = self.0.send(method, path, body).await;
            if method == Method::Post {
                self.0.set_offline(true);
            }
            response
        }
    }

    #[tokio::test]
    async fn test_demo_data_counts_when_refetch_fails() {
        let backend = TestBackend::default();
        let mut repo = DashboardRepo::new(Some(Api::new(Arc::new(OfflineAfterPost(
            backend.clone(),
        )))));

        let result = repo.load_demo_data().await.unwrap();
        assert_eq!(result.subscriptions, 4);
        assert_eq!(backend.subscriptions().len(), 4);
        assert_eq!(backend.calls(), 2);
        assert!(repo.summary().is_none());
    }

    #[tokio::test]
    async fn test_unconfigured() {
        let mut repo = DashboardRepo::new(None);
        assert_eq!(repo.fetch().await.unwrap_err(), ApiError::unconfigured());
        assert!(repo.summary().is_none());
    }
}
