//! App settings, stored by the API.

use crate::api::{Api, ApiError};
use crate::model::{AppSettings, SettingsPatch};
use tracing::debug;

/// Remote-only access to `AppSettings`. Fields missing from the API response take their defaults.
pub struct SettingsRepo {
    api: Option<Api>,
    current: AppSettings,
}

impl SettingsRepo {
    pub fn new(api: Option<Api>) -> Self {
        Self {
            api,
            current: AppSettings::default(),
        }
    }

    /// The settings as of the last successful operation, or the defaults.
    pub fn current(&self) -> &AppSettings {
        &self.current
    }

    pub async fn fetch(&mut self) -> Result<AppSettings, ApiError> {
        let settings = self.api()?.settings().await?;
        self.current = settings.clone();
        Ok(settings)
    }

    /// Merges `patch` over the current settings, saves the result and adopts what the API returns.
    pub async fn update(&mut self, patch: &SettingsPatch) -> Result<AppSettings, ApiError> {
        let merged = self.current.merged(patch);
        debug!("Saving settings {merged:?}");
        let saved = self.api()?.put_settings(&merged).await?;
        self.current = saved.clone();
        Ok(saved)
    }

    fn api(&self) -> Result<&Api, ApiError> {
        self.api.as_ref().ok_or_else(ApiError::unconfigured)
    }
}
