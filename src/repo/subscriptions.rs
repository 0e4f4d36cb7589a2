use crate::api::Api;
use crate::error::{ErrorType, IntoResult};
use crate::model::{NewSubscription, Subscription, SubscriptionPatch};
use crate::repo::{Fallback, Synced};
use crate::store::SubscriptionStore;
use crate::Result;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Subscriptions, from the API when possible and from the on-device store otherwise.
///
/// Remote failures never surface as `Err`. They are returned as `Origin::Local(Fallback::Failed)`
/// alongside the local result. `Err` means the on-device store itself could not be read or written.
pub struct SubscriptionRepo {
    api: Option<Api>,
    store: SubscriptionStore,
    items: Vec<Subscription>,
}

impl SubscriptionRepo {
    pub fn new(api: Option<Api>, store: SubscriptionStore) -> Self {
        Self {
            api,
            store,
            items: Vec::new(),
        }
    }

    /// The collection as of the last operation.
    pub fn items(&self) -> &[Subscription] {
        &self.items
    }

    pub fn is_configured(&self) -> bool {
        self.api.is_some()
    }

    pub fn store(&self) -> &SubscriptionStore {
        &self.store
    }

    pub async fn list(&mut self) -> Result<Synced<Vec<Subscription>>> {
        let fallback = match &self.api {
            None => Fallback::Unconfigured,
            Some(api) => match api.list::<Subscription>().await {
                Ok(list) => {
                    self.items = list.clone();
                    return Ok(Synced::remote(list));
                }
                Err(e) => {
                    warn!("Listing subscriptions failed, using the local store: {e}");
                    Fallback::Failed(e)
                }
            },
        };
        let list = self.store.load_all().await.pub_result(ErrorType::Storage)?;
        self.items = list.clone();
        Ok(Synced::local(list, fallback))
    }

    /// Returns `None` if the subscription exists neither remotely nor locally.
    pub async fn get(&self, id: &str) -> Result<Synced<Option<Subscription>>> {
        let fallback = match &self.api {
            None => Fallback::Unconfigured,
            Some(api) => match api.get::<Subscription>(id).await {
                Ok(sub) => return Ok(Synced::remote(Some(sub))),
                Err(e) => {
                    debug!("Getting subscription {id} failed, using the local store: {e}");
                    Fallback::Failed(e)
                }
            },
        };
        let found = self.store.find(id).await.pub_result(ErrorType::Storage)?;
        Ok(Synced::local(found, fallback))
    }

    /// Creates the subscription remotely, or in the on-device store if that is not possible.
    pub async fn create(&mut self, new: NewSubscription) -> Result<Synced<Subscription>> {
        let fallback = match &self.api {
            None => Fallback::Unconfigured,
            Some(api) => match api.create::<Subscription>(&new).await {
                Ok(created) => {
                    debug!("Created subscription {} remotely", created.id);
                    self.refresh().await;
                    return Ok(Synced::remote(created));
                }
                Err(e) => {
                    warn!("Creating subscription failed, saving it locally: {e}");
                    Fallback::Failed(e)
                }
            },
        };
        let list = self.store.create(new).await.pub_result(ErrorType::Storage)?;
        let created = list.first().cloned();
        self.items = list;
        match created {
            Some(created) => Ok(Synced::local(created, fallback)),
            None => Err(anyhow::anyhow!("The local store did not keep the new subscription"))
                .pub_result(ErrorType::Storage),
        }
    }

    /// Returns the updated subscription, or `None` if no subscription has `id`.
    pub async fn update(
        &mut self,
        id: &str,
        patch: &SubscriptionPatch,
    ) -> Result<Synced<Option<Subscription>>> {
        let fallback = match &self.api {
            None => Fallback::Unconfigured,
            Some(api) => match api.update::<Subscription>(id, patch).await {
                Ok(updated) => {
                    self.refresh().await;
                    return Ok(Synced::remote(Some(updated)));
                }
                Err(e) => {
                    warn!("Updating subscription {id} failed, updating it locally: {e}");
                    Fallback::Failed(e)
                }
            },
        };
        let list = self
            .store
            .update(id, patch)
            .await
            .pub_result(ErrorType::Storage)?;
        let updated = list.iter().find(|s| s.id == id).cloned();
        self.items = list;
        Ok(Synced::local(updated, fallback))
    }

    /// Deletes the subscription and returns the collection afterwards. Deleting an unknown id
    /// locally leaves the collection unchanged.
    pub async fn delete(&mut self, id: &str) -> Result<Synced<Vec<Subscription>>> {
        let fallback = match &self.api {
            None => Fallback::Unconfigured,
            Some(api) => match api.delete::<Subscription>(id).await {
                Ok(()) => {
                    debug!("Deleted subscription {id} remotely");
                    self.items.retain(|s| s.id != id);
                    self.refresh().await;
                    return Ok(Synced::remote(self.items.clone()));
                }
                Err(e) => {
                    warn!("Deleting subscription {id} failed, deleting it locally: {e}");
                    Fallback::Failed(e)
                }
            },
        };
        let list = self.store.remove(id).await.pub_result(ErrorType::Storage)?;
        self.items = list.clone();
        Ok(Synced::local(list, fallback))
    }

    /// Fills an empty on-device store with the service presets. Returns the number added.
    pub async fn seed_from_presets(&mut self, today: NaiveDate) -> Result<usize> {
        let added = self
            .store
            .seed_from_presets(today)
            .await
            .pub_result(ErrorType::Storage)?;
        if added > 0 && self.api.is_none() {
            self.items = self.store.load_all().await.pub_result(ErrorType::Storage)?;
        }
        Ok(added)
    }

    /// Re-lists from the API after a remote mutation. If this fails the mutation has still
    /// happened, so the previous collection is kept and the failure is only logged.
    async fn refresh(&mut self) {
        let Some(api) = &self.api else {
            return;
        };
        match api.list::<Subscription>().await {
            Ok(list) => self.items = list,
            Err(e) => warn!("Unable to refresh subscriptions after a change: {e}"),
        }
    }
}
