use crate::model::{BillingCycle, Cents, Expense, Resource, Subscription};
use serde::{Deserialize, Serialize};

/// The aggregate shown on the dashboard. All amounts are in cents.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub monthly_subscriptions: Cents,
    pub monthly_expenses: Cents,
    pub total_monthly: Cents,
    pub yearly_total: Cents,
    pub subscription_count: usize,
    pub expense_count: usize,
}

impl DashboardSummary {
    /// Computes the summary the same way the API does:
    /// - Monthly totals count yearly items as a twelfth of their amount (integer division).
    /// - The yearly total is the sum of monthly items times twelve plus the yearly items at their
    ///   full amount, so it is not affected by the rounding of the monthly totals.
    pub fn compute(subscriptions: &[Subscription], expenses: &[Expense]) -> Self {
        let monthly_subscriptions = monthly(subscriptions);
        let monthly_expenses = monthly(expenses);
        let yearly_total = (only(subscriptions, BillingCycle::Monthly)
            + only(expenses, BillingCycle::Monthly))
            * 12
            + only(subscriptions, BillingCycle::Yearly)
            + only(expenses, BillingCycle::Yearly);
        Self {
            monthly_subscriptions,
            monthly_expenses,
            total_monthly: monthly_subscriptions + monthly_expenses,
            yearly_total,
            subscription_count: subscriptions.len(),
            expense_count: expenses.len(),
        }
    }

    /// The share of the monthly total spent on subscriptions, in whole percent.
    pub fn subscription_share(&self) -> u8 {
        if self.total_monthly.value() <= 0 {
            return 0;
        }
        let share = i128::from(self.monthly_subscriptions.value()) * 100
            / i128::from(self.total_monthly.value());
        share.clamp(0, 100) as u8
    }
}

fn monthly<R: Resource>(items: &[R]) -> Cents {
    items
        .iter()
        .map(|item| match item.billing_cycle() {
            BillingCycle::Monthly => item.amount(),
            BillingCycle::Yearly => item.amount() / 12,
        })
        .sum()
}

fn only<R: Resource>(items: &[R], cycle: BillingCycle) -> Cents {
    items
        .iter()
        .filter(|item| item.billing_cycle() == cycle)
        .map(|item| item.amount())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewExpense, NewSubscription};

    fn sub(amount: i64, cycle: BillingCycle) -> Subscription {
        Subscription::assemble(
            format!("s{amount}"),
            String::new(),
            NewSubscription {
                name: "x".into(),
                category: "Streaming".into(),
                amount_cents: Cents::new(amount),
                billing_cycle: cycle,
                start_date: "2025-01-01".into(),
                notes: None,
                cancel_url: None,
            },
        )
    }

    fn exp(amount: i64, cycle: BillingCycle) -> Expense {
        Expense::assemble(
            format!("e{amount}"),
            String::new(),
            NewExpense {
                name: "y".into(),
                category: "Wohnen".into(),
                amount_cents: Cents::new(amount),
                billing_cycle: cycle,
                notes: None,
            },
        )
    }

    #[test]
    fn test_compute() {
        let subs = vec![
            sub(1299, BillingCycle::Monthly),
            sub(8990, BillingCycle::Yearly),
        ];
        let exps = vec![exp(85000, BillingCycle::Monthly), exp(30000, BillingCycle::Yearly)];
        let summary = DashboardSummary::compute(&subs, &exps);
        assert_eq!(summary.monthly_subscriptions, Cents::new(1299 + 749));
        assert_eq!(summary.monthly_expenses, Cents::new(85000 + 2500));
        assert_eq!(summary.total_monthly, Cents::new(1299 + 749 + 85000 + 2500));
        assert_eq!(
            summary.yearly_total,
            Cents::new((1299 + 85000) * 12 + 8990 + 30000)
        );
        assert_eq!(summary.subscription_count, 2);
        assert_eq!(summary.expense_count, 2);
    }

    #[test]
    fn test_compute_empty() {
        let summary = DashboardSummary::compute(&[], &[]);
        assert_eq!(summary, DashboardSummary::default());
        assert_eq!(summary.subscription_share(), 0);
    }

    #[test]
    fn test_subscription_share() {
        let summary =
            DashboardSummary::compute(&[sub(2500, BillingCycle::Monthly)], &[exp(7500, BillingCycle::Monthly)]);
        assert_eq!(summary.subscription_share(), 25);
    }

    #[test]
    fn test_compute_huge_amounts_saturate() {
        let subs = vec![sub(i64::MAX, BillingCycle::Monthly)];
        let exps = vec![exp(i64::MAX, BillingCycle::Yearly)];
        let summary = DashboardSummary::compute(&subs, &exps);
        assert_eq!(summary.monthly_subscriptions, Cents::new(i64::MAX));
        assert_eq!(summary.total_monthly, Cents::new(i64::MAX));
        assert_eq!(summary.yearly_total, Cents::new(i64::MAX));
        assert_eq!(summary.subscription_share(), 100);
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{"monthly_subscriptions":2048,"monthly_expenses":87500,"total_monthly":89548,
            "yearly_total":1075566,"subscription_count":2,"expense_count":2}"#;
        let summary: DashboardSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.total_monthly.value(), 89548);
    }
}
