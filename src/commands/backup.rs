use crate::api::Mode;
use crate::backup;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::ImportResult;
use crate::repo::Repos;
use crate::{Config, Result};
use anyhow::anyhow;
use std::path::{Path, PathBuf};

pub async fn backup_export_json(config: Config, mode: Mode) -> Result<Out<PathBuf>> {
    let repos = Repos::open(&config, mode)?;
    let path = config
        .backup()
        .export_json(repos.api(), repos.subscriptions.store())
        .await?;
    Ok(Out::new(export_message(&repos, &[&path]), path))
}

pub async fn backup_export_csv(config: Config, mode: Mode) -> Result<Out<Vec<PathBuf>>> {
    let repos = Repos::open(&config, mode)?;
    let paths = config
        .backup()
        .export_csv(repos.api(), repos.subscriptions.store())
        .await?;
    let refs: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
    Ok(Out::new(export_message(&repos, &refs), paths))
}

pub async fn backup_import(
    config: Config,
    mode: Mode,
    path: &Path,
    merge: bool,
) -> Result<Out<ImportResult>> {
    let repos = Repos::open(&config, mode)?;
    let result = backup::import_json(repos.api(), path, merge).await?;
    let message = format!(
        "Imported {} subscriptions and {} expenses from {}",
        result.subscriptions_imported,
        result.expenses_imported,
        path.display()
    );
    Ok(Out::new(message, result))
}

/// Deletes every subscription and expense on the server. Requires `yes` as confirmation.
pub async fn backup_delete_all(config: Config, mode: Mode, yes: bool) -> Result<Out<()>> {
    if !yes {
        return Err(anyhow!(
            "This deletes all subscriptions and expenses on the server, pass --yes to confirm"
        ))
        .pub_result(ErrorType::Validation);
    }
    let repos = Repos::open(&config, mode)?;
    backup::delete_all(repos.api()).await?;
    Ok("Deleted all subscriptions and expenses".into())
}

fn export_message(repos: &Repos, paths: &[&Path]) -> String {
    let mut message = String::from("Exported");
    if repos.api().is_none() {
        message.push_str(" the subscriptions on this device");
    }
    message.push_str(" to");
    for path in paths {
        message.push_str(&format!("\n{}", path.display()));
    }
    message
}
