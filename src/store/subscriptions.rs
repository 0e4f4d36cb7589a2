use crate::error::Res;
use crate::model::{seed_subscriptions, NewSubscription, Resource, Subscription, SubscriptionPatch};
use crate::store::KeyValueStore;
use anyhow::Context;
use chrono::{NaiveDate, SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// The store key of the local subscription collection.
pub const SUBSCRIPTIONS_KEY: &str = "subtrack.subscriptions.v1";

/// The id prefix that marks a subscription created on this device.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// The on-device subscription collection, stored as one JSON array, newest first.
///
/// Every operation reads the whole collection and mutating operations write it back. A missing or
/// unreadable value is treated as an empty collection.
#[derive(Clone)]
pub struct SubscriptionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SubscriptionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub async fn load_all(&self) -> Res<Vec<Subscription>> {
        let raw = match self.kv.get(SUBSCRIPTIONS_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(Vec::new()),
        };
        match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                warn!("Ignoring unreadable local subscriptions: {e}");
                Ok(Vec::new())
            }
        }
    }

    pub async fn find(&self, id: &str) -> Res<Option<Subscription>> {
        Ok(self.load_all().await?.into_iter().find(|s| s.id == id))
    }

    /// Adds a subscription with a new local id in front of the collection and returns the updated
    /// collection.
    pub async fn create(&self, new: NewSubscription) -> Res<Vec<Subscription>> {
        let mut list = self.load_all().await?;
        let record = Subscription::assemble(local_id(), now(), new);
        debug!("Creating local subscription {}", record.id);
        list.insert(0, record);
        self.save_all(&list).await?;
        Ok(list)
    }

    /// Merges `patch` into the subscription with `id` and returns the updated collection. An
    /// unknown id leaves the collection unchanged.
    pub async fn update(&self, id: &str, patch: &SubscriptionPatch) -> Res<Vec<Subscription>> {
        let mut list = self.load_all().await?;
        for item in list.iter_mut().filter(|s| s.id == id) {
            item.apply(patch);
        }
        self.save_all(&list).await?;
        Ok(list)
    }

    /// Removes the subscription with `id` and returns the updated collection. An unknown id leaves
    /// the collection unchanged.
    pub async fn remove(&self, id: &str) -> Res<Vec<Subscription>> {
        let mut list = self.load_all().await?;
        list.retain(|s| s.id != id);
        self.save_all(&list).await?;
        Ok(list)
    }

    /// Fills an empty collection with one subscription per service preset, starting on `today`.
    /// Returns the number of subscriptions added, which is zero if the collection was not empty.
    pub async fn seed_from_presets(&self, today: NaiveDate) -> Res<usize> {
        if !self.load_all().await?.is_empty() {
            debug!("Not seeding, the local collection is not empty");
            return Ok(0);
        }
        let start_date = today.format(crate::model::DATE_FORMAT).to_string();
        let seeded: Vec<Subscription> = seed_subscriptions(&start_date)
            .into_iter()
            .map(|new| Subscription::assemble(local_id(), now(), new))
            .collect();
        self.save_all(&seeded).await?;
        Ok(seeded.len())
    }

    pub async fn save_all(&self, list: &[Subscription]) -> Res<()> {
        let json = serde_json::to_string(list).context("Unable to serialize local subscriptions")?;
        self.kv
            .set(SUBSCRIPTIONS_KEY, &json)
            .await
            .context("Unable to save local subscriptions")
    }
}

/// Returns true if `id` was generated on this device.
pub fn is_local_id(id: &str) -> bool {
    id.starts_with(LOCAL_ID_PREFIX)
}

/// `local-<unix millis>-<6 random characters>`.
fn local_id() -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{LOCAL_ID_PREFIX}{}-{}",
        Utc::now().timestamp_millis(),
        &random[..6]
    )
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
