use crate::model::{Cents, DATE_FORMAT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An upcoming renewal that the API has computed for a subscription.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScheduledNotification {
    pub id: String,
    pub subscription_id: String,
    pub subscription_name: String,
    /// Calendar date of the reminder, `YYYY-MM-DD`.
    pub scheduled_date: String,
    pub days_until: i64,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount_cents: Cents,
}

impl ScheduledNotification {
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.scheduled_date, DATE_FORMAT).ok()
    }
}

/// The body of `GET /api/notifications/scheduled`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScheduledNotifications {
    #[serde(default)]
    pub notifications: Vec<ScheduledNotification>,
}

#[test]
fn scheduled_notification_wire_format() {
    let json = r#"{"notifications":[{
        "id": "n1",
        "subscription_id": "s1",
        "subscription_name": "Netflix",
        "scheduled_date": "2025-03-12",
        "days_until": 3,
        "message": "Netflix wird in 3 Tagen verlängert (12,99 €)",
        "type": "renewal",
        "amount_cents": 1299
    }]}"#;
    let parsed: ScheduledNotifications = serde_json::from_str(json).unwrap();
    let n = &parsed.notifications[0];
    assert_eq!(n.kind, "renewal");
    assert_eq!(n.date(), NaiveDate::from_ymd_opt(2025, 3, 12));
    assert!(serde_json::to_string(n).unwrap().contains(r#""type":"renewal""#));
}
