use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// The format of `notification_time`.
pub const TIME_FORMAT: &str = "%H:%M";

/// User preferences stored by the API. Fields missing from a response take their default value.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub currency: String,
    pub notification_enabled: bool,
    /// Local time of day, `HH:MM`.
    pub notification_time: String,
    pub notification_days_before: Vec<u32>,
    pub theme: String,
    pub backup_interval: String,
    pub last_backup: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            notification_enabled: true,
            notification_time: "09:00".to_string(),
            notification_days_before: vec![1, 3, 7],
            theme: "dark".to_string(),
            backup_interval: "weekly".to_string(),
            last_backup: None,
        }
    }
}

impl AppSettings {
    /// Parses `notification_time`. Falls back to 09:00 when the stored value is not `HH:MM`.
    pub fn notification_time(&self) -> NaiveTime {
        NaiveTime::parse_from_str(&self.notification_time, TIME_FORMAT)
            .unwrap_or_else(|_| NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default())
    }

    /// Returns a copy of `self` with the fields present in `patch` replaced.
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        let mut merged = self.clone();
        if let Some(currency) = &patch.currency {
            merged.currency = currency.clone();
        }
        if let Some(enabled) = patch.notification_enabled {
            merged.notification_enabled = enabled;
        }
        if let Some(time) = &patch.notification_time {
            merged.notification_time = time.clone();
        }
        if let Some(days) = &patch.notification_days_before {
            merged.notification_days_before = days.clone();
        }
        if let Some(theme) = &patch.theme {
            merged.theme = theme.clone();
        }
        if let Some(interval) = &patch.backup_interval {
            merged.backup_interval = interval.clone();
        }
        if let Some(last_backup) = &patch.last_backup {
            merged.last_backup = Some(last_backup.clone());
        }
        merged
    }
}

/// A partial settings update.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_days_before: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_backup: Option<String>,
}
