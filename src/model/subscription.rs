use crate::model::{BillingCycle, Cents, Resource};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// The format of `start_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A recurring subscription such as a streaming service.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub category: String,
    pub amount_cents: Cents,
    pub billing_cycle: BillingCycle,
    /// Calendar date, `YYYY-MM-DD`.
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// The payload used to create a `Subscription`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub name: String,
    pub category: String,
    pub amount_cents: Cents,
    pub billing_cycle: BillingCycle,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
}

/// A partial update of a `Subscription`. Fields that are `None` are left untouched.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_cents: Option<Cents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_cycle: Option<BillingCycle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
}

impl Resource for Subscription {
    type New = NewSubscription;
    type Patch = SubscriptionPatch;

    const PATH: &'static str = "/api/subscriptions";
    const NAME: &'static str = "subscription";

    fn assemble(id: String, created_at: String, new: NewSubscription) -> Self {
        Self {
            id,
            name: new.name,
            category: new.category,
            amount_cents: new.amount_cents,
            billing_cycle: new.billing_cycle,
            start_date: new.start_date,
            notes: new.notes,
            cancel_url: new.cancel_url,
            created_at: Some(created_at),
        }
    }

    fn apply(&mut self, patch: &SubscriptionPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(amount) = patch.amount_cents {
            self.amount_cents = amount;
        }
        if let Some(cycle) = patch.billing_cycle {
            self.billing_cycle = cycle;
        }
        if let Some(start_date) = &patch.start_date {
            self.start_date = start_date.clone();
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(cancel_url) = &patch.cancel_url {
            self.cancel_url = Some(cancel_url.clone());
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn amount(&self) -> Cents {
        self.amount_cents
    }

    fn billing_cycle(&self) -> BillingCycle {
        self.billing_cycle
    }

    fn is_empty_patch(patch: &SubscriptionPatch) -> bool {
        patch == &SubscriptionPatch::default()
    }
}

impl Subscription {
    /// Parses `start_date`, returning `None` if it is not a `YYYY-MM-DD` date.
    pub fn start(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.start_date, DATE_FORMAT).ok()
    }

    /// The first renewal date on or after `today`. Renewals fall on the start date plus whole
    /// billing cycles; month ends are clamped (Jan 31 + 1 month = Feb 28/29).
    pub fn next_renewal(&self, today: NaiveDate) -> Option<NaiveDate> {
        let start = self.start()?;
        if start >= today {
            return Some(start);
        }
        let step = self.billing_cycle.months();
        let mut cycles: u32 = 1;
        loop {
            let candidate = start.checked_add_months(Months::new(step * cycles))?;
            if candidate >= today {
                return Some(candidate);
            }
            cycles += 1;
        }
    }
}
