//! Types that represent the core data model, such as `Subscription` and `Expense`.
mod amount;
mod cycle;
mod dashboard;
mod expense;
mod export;
mod icon;
mod notification;
mod presets;
mod resource;
mod settings;
mod subscription;

pub use amount::{format_cents, format_compact, parse_amount, Cents, CentsError};
pub use cycle::BillingCycle;
pub use dashboard::DashboardSummary;
pub use expense::{Expense, ExpensePatch, NewExpense};
pub use export::{CsvExport, DemoDataResult, ExportData, ImportRequest, ImportResult};
pub use icon::{category_icon, service_icon, ExpenseCategory, Service};
pub use notification::{ScheduledNotification, ScheduledNotifications};
pub use presets::{
    preset, seed_subscriptions, Plan, ServicePreset, EXPENSE_CATEGORIES, SERVICE_PRESETS,
    SUBSCRIPTION_CATEGORIES,
};
pub use resource::Resource;
pub use settings::{AppSettings, SettingsPatch, TIME_FORMAT};
pub use subscription::{NewSubscription, Subscription, SubscriptionPatch, DATE_FORMAT};
