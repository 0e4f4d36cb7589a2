use crate::model::{BillingCycle, Cents, Resource};
use serde::{Deserialize, Serialize};

/// A fixed expense such as rent or insurance.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub name: String,
    pub category: String,
    pub amount_cents: Cents,
    pub billing_cycle: BillingCycle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// The payload used to create an `Expense`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub name: String,
    pub category: String,
    pub amount_cents: Cents,
    pub billing_cycle: BillingCycle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A partial update of an `Expense`. Fields that are `None` are left untouched.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpensePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_cents: Option<Cents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_cycle: Option<BillingCycle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Resource for Expense {
    type New = NewExpense;
    type Patch = ExpensePatch;

    const PATH: &'static str = "/api/expenses";
    const NAME: &'static str = "expense";

    fn assemble(id: String, created_at: String, new: NewExpense) -> Self {
        Self {
            id,
            name: new.name,
            category: new.category,
            amount_cents: new.amount_cents,
            billing_cycle: new.billing_cycle,
            notes: new.notes,
            created_at: Some(created_at),
        }
    }

    fn apply(&mut self, patch: &ExpensePatch) {
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
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
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

    fn is_empty_patch(patch: &ExpensePatch) -> bool {
        patch == &ExpensePatch::default()
    }
}
