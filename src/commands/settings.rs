use crate::api::Mode;
use crate::args::SetSettingsArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{AppSettings, SettingsPatch, TIME_FORMAT};
use crate::repo::Repos;
use crate::{Config, Result};
use anyhow::{bail, Context};
use chrono::NaiveTime;

pub async fn settings_show(config: Config, mode: Mode) -> Result<Out<AppSettings>> {
    let mut repos = Repos::open(&config, mode)?;
    let settings = repos.settings.fetch().await.pub_result(ErrorType::Api)?;
    Ok(Out::new(render(&settings), settings))
}

/// Changes the given settings. The current settings are fetched first so that the fields which
/// are not given keep their values on the server.
pub async fn settings_set(
    config: Config,
    mode: Mode,
    args: SetSettingsArgs,
) -> Result<Out<AppSettings>> {
    let patch = SettingsPatch {
        currency: args.currency,
        notification_enabled: args.notifications,
        notification_time: args.notification_time,
        notification_days_before: args.days_before,
        theme: args.theme,
        backup_interval: args.backup_interval,
        last_backup: None,
    };
    validate_patch(&patch).pub_result(ErrorType::Validation)?;

    let mut repos = Repos::open(&config, mode)?;
    repos.settings.fetch().await.pub_result(ErrorType::Api)?;
    let saved = repos
        .settings
        .update(&patch)
        .await
        .pub_result(ErrorType::Api)?;
    Ok(Out::new(format!("Saved settings\n{}", render(&saved)), saved))
}

fn validate_patch(patch: &SettingsPatch) -> Res<()> {
    if *patch == SettingsPatch::default() {
        bail!("Nothing to update");
    }
    if let Some(time) = &patch.notification_time {
        NaiveTime::parse_from_str(time, TIME_FORMAT)
            .with_context(|| format!("'{time}' is not a time of day like 09:00"))?;
    }
    if let Some(days) = &patch.notification_days_before {
        if days.is_empty() {
            bail!("At least one reminder day is required");
        }
    }
    Ok(())
}

fn render(settings: &AppSettings) -> String {
    let days = settings
        .notification_days_before
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "currency: {}\n\
         notifications: {}\n\
         notification time: {}\n\
         days before renewal: {days}\n\
         theme: {}\n\
         backup interval: {}\n\
         last backup: {}",
        settings.currency,
        if settings.notification_enabled { "on" } else { "off" },
        settings.notification_time,
        settings.theme,
        settings.backup_interval,
        settings.last_backup.as_deref().unwrap_or("never"),
    )
}
