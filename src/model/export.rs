use crate::model::{AppSettings, Expense, Subscription};
use serde::{Deserialize, Serialize};

/// A full backup as produced by `GET /api/export/json`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    pub version: String,
    pub app_name: String,
    pub exported_at: String,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub settings: AppSettings,
}

/// The body of `GET /api/export/csv`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CsvExport {
    pub subscriptions_csv: String,
    pub expenses_csv: String,
    pub exported_at: String,
}

/// The body of `POST /api/import/json`. Records are passed through as they appear in the backup
/// file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriptions: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expenses: Option<Vec<serde_json::Value>>,
    /// Keep existing records instead of replacing them.
    pub merge: bool,
}

/// The response of `POST /api/import/json`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub subscriptions_imported: usize,
    pub expenses_imported: usize,
}

/// The response of `POST /api/demo-data`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DemoDataResult {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub subscriptions: usize,
    #[serde(default)]
    pub expenses: usize,
}
