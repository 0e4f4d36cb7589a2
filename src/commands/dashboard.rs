use crate::api::Mode;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{format_cents, format_compact, DashboardSummary};
use crate::repo::Repos;
use crate::{Config, Result};
use tracing::info;

/// Shows the dashboard totals. With `demo` the server data is first replaced with demo data.
pub async fn dashboard(config: Config, mode: Mode, demo: bool) -> Result<Out<DashboardSummary>> {
    let mut repos = Repos::open(&config, mode)?;
    let summary = if demo {
        let result = repos
            .dashboard
            .load_demo_data()
            .await
            .pub_result(ErrorType::Api)?;
        if !result.message.is_empty() {
            info!("{}", result.message);
        }
        repos.dashboard.summary().cloned().unwrap_or_default()
    } else {
        repos.dashboard.fetch().await.pub_result(ErrorType::Api)?
    };
    Ok(Out::new(render(&summary), summary))
}

fn render(summary: &DashboardSummary) -> String {
    format!(
        "Monatlich gesamt: {}\n\
         Abonnements: {} ({}, {}%)\n\
         Fixkosten: {} ({})\n\
         Jährlich: {}",
        format_cents(summary.total_monthly.value()),
        format_cents(summary.monthly_subscriptions.value()),
        summary.subscription_count,
        summary.subscription_share(),
        format_cents(summary.monthly_expenses.value()),
        summary.expense_count,
        format_compact(summary.yearly_total.value()),
    )
}
