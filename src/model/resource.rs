use crate::model::{BillingCycle, Cents};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// A collection entity served by the remote API under `PATH`, e.g. `/api/subscriptions`.
///
/// `New` is the create payload (no `id` or `created_at`) and `Patch` is the partial update
/// payload, in which absent fields are left untouched.
pub trait Resource:
    Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type New: Debug + Clone + Serialize + DeserializeOwned + Send + Sync;
    type Patch: Debug + Clone + Default + Serialize + DeserializeOwned + Send + Sync;

    /// The collection endpoint, relative to the API base URL.
    const PATH: &'static str;

    /// A human-readable, singular name for log and error messages.
    const NAME: &'static str;

    /// Builds a full record from a create payload.
    fn assemble(id: String, created_at: String, new: Self::New) -> Self;

    /// Merges the fields present in `patch` into `self`.
    fn apply(&mut self, patch: &Self::Patch);

    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn amount(&self) -> Cents;

    fn billing_cycle(&self) -> BillingCycle;

    /// Returns true if the patch would not change anything.
    fn is_empty_patch(patch: &Self::Patch) -> bool;
}
