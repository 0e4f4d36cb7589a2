//! Implements the `Backend` trait with an in-memory emulation of the API server.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a server. The emulation follows the server closely: collections are
//! sorted by name, ids are 24 hex digits, and errors use the same status codes and bodies.

use crate::api::{ApiError, Backend, Method};
use crate::backup::{expenses_csv, subscriptions_csv};
use crate::model::{
    AppSettings, BillingCycle, Cents, DashboardSummary, Expense, ExportData, ImportRequest,
    ImportResult, NewExpense, NewSubscription, Resource, ScheduledNotification, Subscription,
    DATE_FORMAT,
};
use chrono::{Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

const SUBSCRIPTION_NOT_FOUND: &str = "Abonnement nicht gefunden";
const EXPENSE_NOT_FOUND: &str = "Fixkosten nicht gefunden";

/// An in-memory API server. Clones share the same data.
#[derive(Clone, Default)]
pub struct TestBackend {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    subscriptions: Vec<Subscription>,
    expenses: Vec<Expense>,
    settings: AppSettings,
    next_id: u64,
    offline: bool,
    calls: usize,
    today: Option<NaiveDate>,
}

impl TestBackend {
    /// When offline, every request fails with a `NetworkError` as if the server were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// The number of requests received so far, including those that failed.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    /// Fixes the date used to compute scheduled notifications.
    pub fn set_today(&self, today: NaiveDate) {
        self.lock().today = Some(today);
    }

    /// The subscriptions held by the server, in insertion order.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.lock().subscriptions.clone()
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.lock().expenses.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock can only happen in a failing test
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl Backend for TestBackend {
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        trace!("{method} {path} (test backend)");
        let mut state = self.lock();
        state.calls += 1;
        if state.offline {
            return Err(ApiError::network("Connection refused (test backend is offline)"));
        }
        state.handle(method, path, body)
    }
}

impl State {
    fn handle(&mut self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match (method, segments.as_slice()) {
            (Method::Get, ["api", "dashboard"]) => {
                to_json(&DashboardSummary::compute(&self.subscriptions, &self.expenses))
            }
            (Method::Post, ["api", "demo-data"]) => Ok(self.load_demo_data()),

            (Method::Get, ["api", "subscriptions"]) => list(&self.subscriptions),
            (Method::Get, ["api", "subscriptions", id]) => {
                find(&self.subscriptions, id, SUBSCRIPTION_NOT_FOUND)
            }
            (Method::Post, ["api", "subscriptions"]) => {
                let id = self.new_id();
                create(&mut self.subscriptions, id, body)
            }
            (Method::Put, ["api", "subscriptions", id]) => {
                update(&mut self.subscriptions, id, body, SUBSCRIPTION_NOT_FOUND)
            }
            (Method::Delete, ["api", "subscriptions", id]) => remove(
                &mut self.subscriptions,
                id,
                SUBSCRIPTION_NOT_FOUND,
                "Abonnement gelöscht",
            ),

            (Method::Get, ["api", "expenses"]) => list(&self.expenses),
            (Method::Get, ["api", "expenses", id]) => find(&self.expenses, id, EXPENSE_NOT_FOUND),
            (Method::Post, ["api", "expenses"]) => {
                let id = self.new_id();
                create(&mut self.expenses, id, body)
            }
            (Method::Put, ["api", "expenses", id]) => {
                update(&mut self.expenses, id, body, EXPENSE_NOT_FOUND)
            }
            (Method::Delete, ["api", "expenses", id]) => remove(
                &mut self.expenses,
                id,
                EXPENSE_NOT_FOUND,
                "Fixkosten gelöscht",
            ),

            (Method::Get, ["api", "settings"]) => to_json(&self.settings),
            (Method::Put, ["api", "settings"]) => {
                self.settings = parse(body)?;
                to_json(&self.settings)
            }

            (Method::Get, ["api", "notifications", "scheduled"]) => {
                to_json(&json!({ "notifications": self.scheduled_notifications() }))
            }

            (Method::Get, ["api", "export", "json"]) => to_json(&ExportData {
                version: "1.0".to_string(),
                app_name: "SubTrack".to_string(),
                exported_at: Utc::now().to_rfc3339(),
                subscriptions: sorted(&self.subscriptions),
                expenses: sorted(&self.expenses),
                settings: self.settings.clone(),
            }),
            (Method::Get, ["api", "export", "csv"]) => {
                let subscriptions = subscriptions_csv(&sorted(&self.subscriptions))
                    .map_err(|e| server_error(&format!("{e:#}")))?;
                let expenses = expenses_csv(&sorted(&self.expenses))
                    .map_err(|e| server_error(&format!("{e:#}")))?;
                Ok(json!({
                    "subscriptions_csv": subscriptions,
                    "expenses_csv": expenses,
                    "exported_at": Utc::now().to_rfc3339(),
                }))
            }
            (Method::Post, ["api", "import", "json"]) => {
                let request: ImportRequest = parse(body)?;
                to_json(&self.import(request))
            }
            (Method::Delete, ["api", "data", "all"]) => {
                self.subscriptions.clear();
                self.expenses.clear();
                Ok(json!({ "message": "Alle Daten gelöscht" }))
            }

            _ => Err(reject(404, json!({ "detail": "Not Found" }))),
        }
    }

    fn new_id(&mut self) -> String {
        self.next_id += 1;
        format!("65a1f0c2{:016x}", self.next_id)
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// One reminder per subscription and configured lead time, for the next renewal of each
    /// subscription. Reminders whose date has already passed are omitted.
    fn scheduled_notifications(&self) -> Vec<ScheduledNotification> {
        if !self.settings.notification_enabled {
            return Vec::new();
        }
        let today = self.today();
        let mut scheduled = Vec::new();
        for sub in &self.subscriptions {
            let Some(renewal) = sub.next_renewal(today) else {
                continue;
            };
            let days_until = (renewal - today).num_days();
            for &days_before in &self.settings.notification_days_before {
                let Some(date) = renewal.checked_sub_days(chrono::Days::new(days_before as u64))
                else {
                    continue;
                };
                if date < today {
                    continue;
                }
                let when = match days_before {
                    0 => "heute".to_string(),
                    1 => "morgen".to_string(),
                    n => format!("in {n} Tagen"),
                };
                scheduled.push(ScheduledNotification {
                    id: format!("{}-{days_before}", sub.id),
                    subscription_id: sub.id.clone(),
                    subscription_name: sub.name.clone(),
                    scheduled_date: date.format(DATE_FORMAT).to_string(),
                    days_until,
                    message: format!("{} wird {when} verlängert ({})", sub.name, sub.amount_cents),
                    kind: "renewal".to_string(),
                    amount_cents: sub.amount_cents,
                });
            }
        }
        scheduled.sort_by(|a, b| {
            (&a.scheduled_date, &a.subscription_name).cmp(&(&b.scheduled_date, &b.subscription_name))
        });
        scheduled
    }

    fn import(&mut self, request: ImportRequest) -> ImportResult {
        if !request.merge {
            self.subscriptions.clear();
            self.expenses.clear();
        }
        let mut result = ImportResult::default();
        for value in request.subscriptions.unwrap_or_default() {
            if let Ok(new) = serde_json::from_value::<NewSubscription>(value) {
                let id = self.new_id();
                self.subscriptions
                    .push(Subscription::assemble(id, created_at(), new));
                result.subscriptions_imported += 1;
            }
        }
        for value in request.expenses.unwrap_or_default() {
            if let Ok(new) = serde_json::from_value::<NewExpense>(value) {
                let id = self.new_id();
                self.expenses.push(Expense::assemble(id, created_at(), new));
                result.expenses_imported += 1;
            }
        }
        result
    }

    fn load_demo_data(&mut self) -> Value {
        self.subscriptions.clear();
        self.expenses.clear();
        let subscriptions = [
            ("Netflix", "Streaming", 1299, BillingCycle::Monthly, "2024-01-15", "Premium Abo", "https://www.netflix.com/cancelplan"),
            ("Spotify", "Musik", 999, BillingCycle::Monthly, "2023-06-01", "Family Plan", "https://www.spotify.com/account"),
            ("Amazon Prime", "Shopping", 8990, BillingCycle::Yearly, "2024-03-01", "Inkl. Prime Video", "https://www.amazon.de/prime"),
            ("Microsoft 365", "Software", 6900, BillingCycle::Yearly, "2024-02-15", "Family", "https://account.microsoft.com"),
        ];
        for (name, category, cents, cycle, start, notes, url) in subscriptions {
            let id = self.new_id();
            self.subscriptions.push(Subscription::assemble(
                id,
                created_at(),
                NewSubscription {
                    name: name.to_string(),
                    category: category.to_string(),
                    amount_cents: Cents::new(cents),
                    billing_cycle: cycle,
                    start_date: start.to_string(),
                    notes: Some(notes.to_string()),
                    cancel_url: Some(url.to_string()),
                },
            ));
        }
        let expenses = [
            ("Miete", "Wohnen", 85000, BillingCycle::Monthly, "Kaltmiete inkl. Nebenkosten"),
            ("Strom", "Wohnen", 7500, BillingCycle::Monthly, "Stadtwerke"),
            ("Internet", "Kommunikation", 3999, BillingCycle::Monthly, "100 Mbit/s"),
            ("KFZ-Versicherung", "Versicherung", 48000, BillingCycle::Yearly, "Vollkasko"),
            ("Handyvertrag", "Kommunikation", 2999, BillingCycle::Monthly, "10GB Daten"),
        ];
        for (name, category, cents, cycle, notes) in expenses {
            let id = self.new_id();
            self.expenses.push(Expense::assemble(
                id,
                created_at(),
                NewExpense {
                    name: name.to_string(),
                    category: category.to_string(),
                    amount_cents: Cents::new(cents),
                    billing_cycle: cycle,
                    notes: Some(notes.to_string()),
                },
            ));
        }
        json!({
            "message": "Demo-Daten erfolgreich angelegt",
            "subscriptions": self.subscriptions.len(),
            "expenses": self.expenses.len(),
        })
    }
}

fn sorted<R: Resource>(items: &[R]) -> Vec<R> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));
    sorted
}

fn list<R: Resource>(items: &[R]) -> Result<Value, ApiError> {
    to_json(&sorted(items))
}

fn find<R: Resource>(items: &[R], id: &str, not_found: &str) -> Result<Value, ApiError> {
    check_id(id)?;
    match items.iter().find(|item| item.id() == id) {
        Some(item) => to_json(item),
        None => Err(reject(404, json!({ "detail": not_found }))),
    }
}

fn create<R: Resource>(items: &mut Vec<R>, id: String, body: Option<Value>) -> Result<Value, ApiError> {
    let new: R::New = parse(body)?;
    let record = R::assemble(id, created_at(), new);
    check_amount(record.amount())?;
    let value = to_json(&record)?;
    items.push(record);
    Ok(value)
}

fn update<R: Resource>(
    items: &mut [R],
    id: &str,
    body: Option<Value>,
    not_found: &str,
) -> Result<Value, ApiError> {
    check_id(id)?;
    let patch: R::Patch = parse(body)?;
    if R::is_empty_patch(&patch) {
        return Err(reject(400, json!({ "detail": "Keine Daten zum Aktualisieren" })));
    }
    let item = items
        .iter_mut()
        .find(|item| item.id() == id)
        .ok_or_else(|| reject(404, json!({ "detail": not_found })))?;
    let mut updated = item.clone();
    updated.apply(&patch);
    check_amount(updated.amount())?;
    *item = updated;
    to_json(&*item)
}

fn remove<R: Resource>(
    items: &mut Vec<R>,
    id: &str,
    not_found: &str,
    message: &str,
) -> Result<Value, ApiError> {
    check_id(id)?;
    let before = items.len();
    items.retain(|item| item.id() != id);
    if items.len() == before {
        return Err(reject(404, json!({ "detail": not_found })));
    }
    Ok(json!({ "message": message }))
}

/// Server ids are 24 hex digits. Anything else, such as a `local-` id, is rejected.
fn check_id(id: &str) -> Result<(), ApiError> {
    if id.len() == 24 && id.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(reject(400, json!({ "detail": "Ungültige ID" })))
    }
}

fn check_amount(amount: Cents) -> Result<(), ApiError> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(reject(
            422,
            json!({ "detail": [{
                "loc": ["body", "amount_cents"],
                "msg": "Input should be greater than 0",
                "type": "greater_than",
            }]}),
        ))
    }
}

fn parse<T: DeserializeOwned>(body: Option<Value>) -> Result<T, ApiError> {
    let body = body.unwrap_or(Value::Null);
    serde_json::from_value(body).map_err(|e| {
        reject(
            422,
            json!({ "detail": [{ "loc": ["body"], "msg": e.to_string(), "type": "value_error" }] }),
        )
    })
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| server_error(&e.to_string()))
}

/// Mirrors the naive timestamps the server writes.
fn created_at() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

fn server_error(message: &str) -> ApiError {
    reject(
        500,
        json!({ "success": false, "error": { "code": "DATABASE_ERROR", "message": message } }),
    )
}

fn reject(status: u16, body: Value) -> ApiError {
    ApiError::from_response(status, &body.to_string())
}
