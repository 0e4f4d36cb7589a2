use crate::api::{Api, ApiError};
use crate::model::{Expense, Resource};
use tracing::{debug, warn};

/// Expenses have no on-device copy.
pub type ExpenseRepo = RemoteRepo<Expense>;

/// A collection that is only available through the API.
///
/// Failures are returned as `ApiError` and leave the collection as it was. Without a configured
/// API every operation fails with `ApiError::unconfigured()` and no request is sent.
pub struct RemoteRepo<R: Resource> {
    api: Option<Api>,
    items: Vec<R>,
}

impl<R: Resource> RemoteRepo<R> {
    pub fn new(api: Option<Api>) -> Self {
        Self {
            api,
            items: Vec::new(),
        }
    }

    /// The collection as of the last successful operation.
    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub async fn list(&mut self) -> Result<Vec<R>, ApiError> {
        let list = self.api()?.list::<R>().await?;
        self.items = list.clone();
        Ok(list)
    }

    pub async fn get(&self, id: &str) -> Result<R, ApiError> {
        self.api()?.get::<R>(id).await
    }

    pub async fn create(&mut self, new: &R::New) -> Result<R, ApiError> {
        let created: R = self.api()?.create::<R>(new).await?;
        debug!("Created {} {}", R::NAME, created.id());
        if !self.refresh().await {
            self.items.push(created.clone());
        }
        Ok(created)
    }

    pub async fn update(&mut self, id: &str, patch: &R::Patch) -> Result<R, ApiError> {
        let updated: R = self.api()?.update::<R>(id, patch).await?;
        if !self.refresh().await {
            for item in self.items.iter_mut().filter(|i| i.id() == id) {
                *item = updated.clone();
            }
        }
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        self.api()?.delete::<R>(id).await?;
        debug!("Deleted {} {id}", R::NAME);
        if !self.refresh().await {
            self.items.retain(|i| i.id() != id);
        }
        Ok(())
    }

    fn api(&self) -> Result<&Api, ApiError> {
        self.api.as_ref().ok_or_else(ApiError::unconfigured)
    }

    /// Re-lists after a mutation. Returns false if that failed, in which case the caller applies
    /// the mutation to the collection itself.
    async fn refresh(&mut self) -> bool {
        let result = match &self.api {
            Some(api) => api.list::<R>().await,
            None => return false,
        };
        match result {
            Ok(list) => {
                self.items = list;
                true
            }
            Err(e) => {
                warn!("Unable to refresh {} list after a change: {e}", R::NAME);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ErrorCode, TestBackend};
    use crate::model::{BillingCycle, Cents, ExpensePatch, NewExpense};
    use std::sync::Arc;

    fn repo() -> (ExpenseRepo, TestBackend) {
        let backend = TestBackend::default();
        let api = Api::new(Arc::new(backend.clone()));
        (ExpenseRepo::new(Some(api)), backend)
    }

    fn rent() -> NewExpense {
        NewExpense {
            name: "Miete".into(),
            category: "Wohnen".into(),
            amount_cents: Cents::new(85000),
            billing_cycle: BillingCycle::Monthly,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_fails_without_request() {
        let mut repo = ExpenseRepo::new(None);
        let err = repo.list().await.unwrap_err();
        assert_eq!(err, ApiError::unconfigured());
        assert!(repo.create(&rent()).await.is_err());
        assert!(repo.items().is_empty());
    }

    #[tokio::test]
    async fn test_crud() {
        let (mut repo, backend) = repo();
        let created = repo.create(&rent()).await.unwrap();
        assert_eq!(repo.items(), [created.clone()].as_slice());

        let fetched = repo.get(&created.id).await.unwrap();
        assert_eq!(fetched, created);

        let patch = ExpensePatch {
            amount_cents: Some(Cents::new(90000)),
            ..Default::default()
        };
        let updated = repo.update(&created.id, &patch).await.unwrap();
        assert_eq!(updated.amount_cents, Cents::new(90000));
        assert_eq!(repo.items()[0].amount_cents, Cents::new(90000));

        repo.delete(&created.id).await.unwrap();
        assert!(repo.items().is_empty());
        assert!(backend.expenses().is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_state() {
        let (mut repo, backend) = repo();
        repo.create(&rent()).await.unwrap();
        let before = repo.items().to_vec();

        backend.set_offline(true);
        let err = repo.list().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NetworkError);
        assert!(repo.delete(&before[0].id).await.is_err());
        assert_eq!(repo.items(), before.as_slice());
    }

    #[tokio::test]
    async fn test_validation_error_surfaces() {
        let (mut repo, _) = repo();
        let mut free = rent();
        free.amount_cents = Cents::ZERO;
        let err = repo.create(&free).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.status(), Some(422));
        assert!(repo.items().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let (mut repo, _) = repo();
        let err = repo.delete("65a1f0c20000000000000042").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "Fixkosten nicht gefunden");
    }
}
