//! Renewal reminders.
//!
//! The API computes which renewals are coming up. This module turns them into `Reminder`s that the
//! platform can deliver at the right time. Delivery itself is not done here.
//!
//! `Notifier::init` is called once at startup with the delivery behavior and the current settings.
//! Nothing is configured implicitly.

use crate::error::Res;
use crate::model::{AppSettings, ScheduledNotification};
use anyhow::ensure;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const TEST_TITLE: &str = "Test-Benachrichtigung";
const TEST_BODY: &str = "Benachrichtigungen funktionieren!";

/// How delivered reminders are presented.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NotificationBehavior {
    pub show_alert: bool,
    pub play_sound: bool,
    pub set_badge: bool,
    /// The name of the notification channel on platforms that group notifications.
    pub channel: String,
}

impl Default for NotificationBehavior {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: true,
            channel: "Abo-Erinnerungen".to_string(),
        }
    }
}

/// A reminder to be delivered at `trigger`, local time.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub title: String,
    pub body: String,
    pub trigger: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    pub sound: bool,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    behavior: NotificationBehavior,
    enabled: bool,
    time: NaiveTime,
}

impl Notifier {
    pub fn init(behavior: NotificationBehavior, settings: &AppSettings) -> Self {
        let notifier = Self {
            behavior,
            enabled: settings.notification_enabled,
            time: settings.notification_time(),
        };
        debug!(
            "Notifications {} at {}",
            if notifier.enabled { "enabled" } else { "disabled" },
            notifier.time
        );
        notifier
    }

    pub fn behavior(&self) -> &NotificationBehavior {
        &self.behavior
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Plans one reminder per scheduled renewal, triggered on its date at the configured time.
    /// Reminders that would trigger before `now` are dropped, and nothing is planned while
    /// notifications are disabled. The result is ordered by trigger time.
    pub fn plan(&self, scheduled: &[ScheduledNotification], now: NaiveDateTime) -> Vec<Reminder> {
        if !self.enabled {
            return Vec::new();
        }
        let mut reminders: Vec<Reminder> = scheduled
            .iter()
            .filter_map(|n| {
                let Some(date) = n.date() else {
                    warn!(
                        "Skipping reminder {} with invalid date '{}'",
                        n.id, n.scheduled_date
                    );
                    return None;
                };
                Some(Reminder {
                    id: n.id.clone(),
                    title: format!("{} wird verlängert", n.subscription_name),
                    body: n.message.clone(),
                    trigger: date.and_time(self.time),
                    subscription_id: Some(n.subscription_id.clone()),
                    sound: self.behavior.play_sound,
                })
            })
            .filter(|r| r.trigger >= now)
            .collect();
        reminders.sort_by(|a, b| a.trigger.cmp(&b.trigger).then_with(|| a.id.cmp(&b.id)));
        reminders
    }

    /// A reminder that triggers right away, to check that delivery works.
    pub fn test_reminder(&self, now: NaiveDateTime) -> Res<Reminder> {
        ensure!(self.enabled, "Benachrichtigungen sind deaktiviert");
        Ok(Reminder {
            id: "test".to_string(),
            title: TEST_TITLE.to_string(),
            body: TEST_BODY.to_string(),
            trigger: now + Duration::seconds(1),
            subscription_id: None,
            sound: self.behavior.play_sound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cents, SettingsPatch};
    use chrono::NaiveDate;

    fn scheduled(id: &str, name: &str, date: &str) -> ScheduledNotification {
        ScheduledNotification {
            id: id.into(),
            subscription_id: format!("sub-{id}"),
            subscription_name: name.into(),
            scheduled_date: date.into(),
            days_until: 3,
            message: format!("{name} wird in 3 Tagen verlängert (12,99 €)"),
            kind: "renewal".into(),
            amount_cents: Cents::new(1299),
        }
    }

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").unwrap()
    }

    fn notifier(patch: SettingsPatch) -> Notifier {
        Notifier::init(
            NotificationBehavior::default(),
            &AppSettings::default().merged(&patch),
        )
    }

    #[test]
    fn test_plan_uses_configured_time() {
        let n = notifier(SettingsPatch {
            notification_time: Some("18:30".into()),
            ..Default::default()
        });
        let reminders = n.plan(
            &[
                scheduled("b", "Spotify", "2025-03-12"),
                scheduled("a", "Netflix", "2025-03-11"),
            ],
            at("2025-03-10", "12:00"),
        );
        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].title, "Netflix wird verlängert");
        assert_eq!(reminders[0].trigger, at("2025-03-11", "18:30"));
        assert_eq!(reminders[0].subscription_id.as_deref(), Some("sub-a"));
        assert_eq!(reminders[1].body, "Spotify wird in 3 Tagen verlängert (12,99 €)");
        assert!(reminders[1].sound);
    }

    #[test]
    fn test_plan_drops_past_and_invalid() {
        let n = notifier(SettingsPatch::default());
        let reminders = n.plan(
            &[
                scheduled("past", "Netflix", "2025-03-09"),
                scheduled("earlier-today", "Disney+", "2025-03-10"),
                scheduled("bad", "Spotify", "morgen"),
                scheduled("ok", "YouTube", "2025-03-20"),
            ],
            at("2025-03-10", "10:00"),
        );
        let ids: Vec<&str> = reminders.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[test]
    fn test_disabled_plans_nothing() {
        let n = notifier(SettingsPatch {
            notification_enabled: Some(false),
            ..Default::default()
        });
        assert!(!n.is_enabled());
        let now = at("2025-03-10", "08:00");
        assert!(n.plan(&[scheduled("a", "Netflix", "2025-03-11")], now).is_empty());
        assert!(n.test_reminder(now).is_err());
    }

    #[test]
    fn test_test_reminder() {
        let n = notifier(SettingsPatch::default());
        let now = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let reminder = n.test_reminder(now).unwrap();
        assert_eq!(reminder.title, "Test-Benachrichtigung");
        assert_eq!(reminder.body, "Benachrichtigungen funktionieren!");
        assert!(reminder.trigger > now);
        assert_eq!(n.behavior().channel, "Abo-Erinnerungen");
    }
}
