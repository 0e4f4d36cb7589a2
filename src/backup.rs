//! Export, import and deletion of all data, plus the backup files written by exports.

use crate::api::{Api, ApiError};
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{
    AppSettings, CsvExport, Expense, ExportData, ImportRequest, ImportResult, Subscription,
};
use crate::store::SubscriptionStore;
use crate::{utils, Config, Result};
use anyhow::{anyhow, ensure, Context};
use chrono::{Local, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix of JSON backup files.
pub const JSON_BACKUP: &str = "subtrack-backup";

/// Prefix of the subscriptions CSV file.
pub const SUBSCRIPTIONS_CSV: &str = "abonnements";

/// Prefix of the expenses CSV file.
pub const EXPENSES_CSV: &str = "fixkosten";

const EXPORT_VERSION: &str = "1.0";
const EXPORT_APP_NAME: &str = "SubTrack";

/// Manages backup file creation and rotation.
///
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Writes the full export as `subtrack-backup.YYYY-MM-DD-NNN.json`. Without an API the export
    /// holds the local subscriptions and default settings.
    pub async fn export_json(
        &self,
        api: Option<&Api>,
        local: &SubscriptionStore,
    ) -> Result<PathBuf> {
        let data = match api {
            Some(api) => api.export_json().await.pub_result(ErrorType::Api)?,
            None => local_export(local).await.pub_result(ErrorType::Storage)?,
        };
        debug!(
            "Exporting {} subscriptions and {} expenses",
            data.subscriptions.len(),
            data.expenses.len()
        );
        self.save_json(JSON_BACKUP, &data)
            .await
            .pub_result(ErrorType::Backup)
    }

    /// Writes `abonnements.YYYY-MM-DD-NNN.csv` and `fixkosten.YYYY-MM-DD-NNN.csv`. Without an API the
    /// subscriptions come from the on-device store and the expenses file only has a header.
    pub async fn export_csv(
        &self,
        api: Option<&Api>,
        local: &SubscriptionStore,
    ) -> Result<Vec<PathBuf>> {
        let export = match api {
            Some(api) => api.export_csv().await.pub_result(ErrorType::Api)?,
            None => local_csv_export(local).await.pub_result(ErrorType::Storage)?,
        };
        let subscriptions = self
            .save_text(SUBSCRIPTIONS_CSV, "csv", &export.subscriptions_csv)
            .await
            .pub_result(ErrorType::Backup)?;
        let expenses = self
            .save_text(EXPENSES_CSV, "csv", &export.expenses_csv)
            .await
            .pub_result(ErrorType::Backup)?;
        Ok(vec![subscriptions, expenses])
    }

    /// Saves `data` as a pretty-printed JSON backup file named `{prefix}.YYYY-MM-DD-NNN.json`, where
    /// NNN is a sequence number, and rotates old backups.
    pub(crate) async fn save_json<T: Serialize>(&self, prefix: &str, data: &T) -> Res<PathBuf> {
        let json = serde_json::to_string_pretty(data).context("Failed to serialize the export")?;
        self.save_text(prefix, "json", &json).await
    }

    async fn save_text(&self, prefix: &str, extension: &str, contents: &str) -> Res<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(prefix, &date, extension).await?;
        let path = self
            .backups_dir
            .join(format!("{prefix}.{date}-{seq:03}.{extension}"));
        utils::write(&path, contents).await?;
        info!("Wrote {}", path.display());

        self.rotate(prefix, extension).await?;
        Ok(path)
    }

    /// Scans the backups directory for existing files with the given prefix and date, and returns
    /// the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str, extension: &str) -> Res<u32> {
        let max_seq = utils::file_names(&self.backups_dir)
            .await?
            .iter()
            .filter_map(|name| parse_sequence_number(name, prefix, date, extension))
            .max()
            .unwrap_or(0);
        Ok(max_seq + 1)
    }

    /// Keeps only the newest `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str, extension: &str) -> Res<()> {
        let mut files: Vec<String> = utils::file_names(&self.backups_dir)
            .await?
            .into_iter()
            .filter(|name| is_backup_file(name, prefix, extension))
            .collect();

        // The name format sorts by date and then sequence number
        files.sort();

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for name in files.into_iter().take(to_delete) {
            debug!("Removing old backup {name}");
            utils::remove(&self.backups_dir.join(name)).await?;
        }
        Ok(())
    }
}

/// Reads a JSON backup file and sends its subscriptions and expenses to the API. With `merge` the
/// records are added to the existing ones, otherwise they replace them.
pub async fn import_json(api: Option<&Api>, path: &Path, merge: bool) -> Result<ImportResult> {
    let request = read_import(path, merge).await.pub_result(ErrorType::Backup)?;
    let api = api.ok_or_else(ApiError::unconfigured).pub_result(ErrorType::Api)?;
    let result = api.import_json(&request).await.pub_result(ErrorType::Api)?;
    info!(
        "{} Abos und {} Fixkosten importiert",
        result.subscriptions_imported, result.expenses_imported
    );
    Ok(result)
}

/// Deletes all subscriptions and expenses held by the API.
pub async fn delete_all(api: Option<&Api>) -> Result<()> {
    let api = api.ok_or_else(ApiError::unconfigured).pub_result(ErrorType::Api)?;
    api.delete_all_data().await.pub_result(ErrorType::Api)
}

async fn read_import(path: &Path, merge: bool) -> Res<ImportRequest> {
    let data: Value = utils::deserialize(path).await?;
    let field = |name: &str| -> Res<Option<Vec<Value>>> {
        match data.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items.clone())),
            Some(_) => Err(anyhow!("'{name}' must be a list in {}", path.display())),
        }
    };
    let subscriptions = field("subscriptions")?;
    let expenses = field("expenses")?;
    ensure!(
        subscriptions.is_some() || expenses.is_some(),
        "Ungültiges Backup-Format: {} enthält weder subscriptions noch expenses",
        path.display()
    );
    Ok(ImportRequest {
        subscriptions,
        expenses,
        merge,
    })
}

async fn local_export(local: &SubscriptionStore) -> Res<ExportData> {
    Ok(ExportData {
        version: EXPORT_VERSION.to_string(),
        app_name: EXPORT_APP_NAME.to_string(),
        exported_at: Utc::now().to_rfc3339(),
        subscriptions: local.load_all().await?,
        expenses: Vec::new(),
        settings: AppSettings::default(),
    })
}

async fn local_csv_export(local: &SubscriptionStore) -> Res<CsvExport> {
    Ok(CsvExport {
        subscriptions_csv: subscriptions_csv(&local.load_all().await?)?,
        expenses_csv: expenses_csv(&[])?,
        exported_at: Utc::now().to_rfc3339(),
    })
}

/// Renders subscriptions as `;`-separated CSV with German headers and amounts like `12,99`.
pub(crate) fn subscriptions_csv(subscriptions: &[Subscription]) -> Res<String> {
    write_csv(
        &[
            "Name",
            "Kategorie",
            "Betrag",
            "Abrechnungszyklus",
            "Startdatum",
            "Notizen",
            "Kündigungslink",
        ],
        subscriptions.iter().map(|s| {
            vec![
                s.name.clone(),
                s.category.clone(),
                amount(s.amount_cents.euros()),
                s.billing_cycle.label().to_string(),
                s.start_date.clone(),
                s.notes.clone().unwrap_or_default(),
                s.cancel_url.clone().unwrap_or_default(),
            ]
        }),
    )
}

/// Renders expenses like `subscriptions_csv`.
pub(crate) fn expenses_csv(expenses: &[Expense]) -> Res<String> {
    write_csv(
        &["Name", "Kategorie", "Betrag", "Abrechnungszyklus", "Notizen"],
        expenses.iter().map(|e| {
            vec![
                e.name.clone(),
                e.category.clone(),
                amount(e.amount_cents.euros()),
                e.billing_cycle.label().to_string(),
                e.notes.clone().unwrap_or_default(),
            ]
        }),
    )
}

fn write_csv(header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> Res<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());
    writer.write_record(header).context("Unable to write CSV header")?;
    for row in rows {
        writer.write_record(&row).context("Unable to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Unable to finish CSV: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

fn amount(euros: rust_decimal::Decimal) -> String {
    euros.to_string().replace('.', ",")
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename `{prefix}.{date}-{NNN}.{extension}`.
/// Returns None if the filename doesn't match.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str, extension: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{prefix}.{date}-"))?
        .strip_suffix(&format!(".{extension}"))?
        .parse()
        .ok()
}

fn is_backup_file(filename: &str, prefix: &str, extension: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ErrorCode, TestBackend};
    use crate::model::{BillingCycle, Cents, NewSubscription, Resource};
    use crate::store::MemoryStore;
    use crate::test::TestEnv;
    use std::sync::Arc;

    fn memory_store() -> SubscriptionStore {
        SubscriptionStore::new(Arc::new(MemoryStore::default()))
    }

    fn netflix() -> NewSubscription {
        NewSubscription {
            name: "Netflix".into(),
            category: "Streaming".into(),
            amount_cents: Cents::new(1299),
            billing_cycle: BillingCycle::Monthly,
            start_date: "2025-01-15".into(),
            notes: Some("Premium; 4K".into()),
            cancel_url: None,
        }
    }

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number(
                "subtrack-backup.2025-12-14-001.json",
                "subtrack-backup",
                "2025-12-14",
                "json"
            ),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number(
                "abonnements.2025-12-14-042.csv",
                "abonnements",
                "2025-12-14",
                "csv"
            ),
            Some(42)
        );
        assert_eq!(
            parse_sequence_number(
                "fixkosten.2025-12-14-001.csv",
                "abonnements",
                "2025-12-14",
                "csv"
            ),
            None
        );
        assert_eq!(
            parse_sequence_number(
                "abonnements.2025-12-13-001.csv",
                "abonnements",
                "2025-12-14",
                "csv"
            ),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("fixkosten.2025-12-14-001.csv", "fixkosten", "csv"));
        assert!(!is_backup_file("fixkosten.2025-12-14-001.csv", "fixkosten", "json"));
        assert!(!is_backup_file("abonnements.2025-12-14-001.csv", "fixkosten", "csv"));
    }

    #[test]
    fn test_subscriptions_csv() {
        let sub = Subscription::assemble("s1".into(), "2025-01-01T00:00:00Z".into(), netflix());
        let csv = subscriptions_csv(&[sub]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Name;Kategorie;Betrag;Abrechnungszyklus;Startdatum;Notizen;Kündigungslink"
        );
        assert_eq!(lines[1], "Netflix;Streaming;12,99;monatlich;2025-01-15;\"Premium; 4K\";");
        assert_eq!(expenses_csv(&[]).unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn test_rotation() {
        let env = TestEnv::new().await;
        let backup = env.config().backup();
        for i in 0..7 {
            backup.save_json(JSON_BACKUP, &i).await.unwrap();
        }
        let mut names = utils::file_names(env.config().backups()).await.unwrap();
        names.sort();
        assert_eq!(names.len(), 5);
        assert!(names[0].ends_with("-003.json"));
        assert!(names[4].ends_with("-007.json"));
    }

    #[tokio::test]
    async fn test_local_exports() {
        let env = TestEnv::new().await;
        let store = memory_store();
        store.create(netflix()).await.unwrap();
        let backup = env.config().backup();

        let path = backup.export_json(None, &store).await.unwrap();
        let data: ExportData = utils::deserialize(&path).await.unwrap();
        assert_eq!(data.app_name, "SubTrack");
        assert_eq!(data.subscriptions, store.load_all().await.unwrap());
        assert!(data.expenses.is_empty());

        let paths = backup.export_csv(None, &store).await.unwrap();
        let file_name = paths[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("abonnements."));
        let subs = utils::read(&paths[0]).await.unwrap();
        assert!(subs.contains("Netflix;Streaming;12,99;monatlich"));
        let expenses = utils::read(&paths[1]).await.unwrap();
        assert_eq!(expenses.trim(), "Name;Kategorie;Betrag;Abrechnungszyklus;Notizen");
    }

    #[tokio::test]
    async fn test_remote_export_import_and_delete() {
        let env = TestEnv::new().await;
        let backend = TestBackend::default();
        let api = Api::new(Arc::new(backend.clone()));
        api.load_demo_data().await.unwrap();
        let backup = env.config().backup();
        let store = memory_store();

        let path = backup.export_json(Some(&api), &store).await.unwrap();
        let exported: ExportData = utils::deserialize(&path).await.unwrap();
        assert_eq!(exported.subscriptions.len(), 4);
        assert_eq!(exported.expenses.len(), 5);

        delete_all(Some(&api)).await.unwrap();
        assert!(backend.subscriptions().is_empty());

        let result = import_json(Some(&api), &path, false).await.unwrap();
        assert_eq!(result.subscriptions_imported, 4);
        assert_eq!(result.expenses_imported, 5);
        assert_eq!(backend.expenses().len(), 5);

        let paths = backup.export_csv(Some(&api), &store).await.unwrap();
        let expenses = utils::read(&paths[1]).await.unwrap();
        assert!(expenses.contains("Miete;Wohnen;850,00;monatlich"));
    }

    #[tokio::test]
    async fn test_import_rejects_other_files() {
        let env = TestEnv::new().await;
        let path = env.config().root().join("other.json");
        utils::write(&path, r#"{"settings":{}}"#).await.unwrap();
        let backend = TestBackend::default();
        let api = Api::new(Arc::new(backend.clone()));
        let err = import_json(Some(&api), &path, true).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Backup);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_remote_failure_is_an_api_error() {
        let env = TestEnv::new().await;
        let backend = TestBackend::default();
        backend.set_offline(true);
        let api = Api::new(Arc::new(backend));
        let err = env
            .config()
            .backup()
            .export_json(Some(&api), &memory_store())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Api);
        assert_eq!(err.api_error().map(|e| e.code()), Some(ErrorCode::NetworkError));
        assert!(delete_all(None).await.is_err());
    }
}
