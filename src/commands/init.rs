use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the subtrack home directory, its subdirectories and an initial `config.json`.
///
/// # Arguments
/// - `subtrack_home` - The directory that will be the root of the home directory, e.g.
///   `$HOME/subtrack`
/// - `api_base_url` - The base URL of the SubTrack API. Without it subtrack runs in local-only mode.
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(subtrack_home: &Path, api_base_url: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(subtrack_home, api_base_url)
        .await
        .context("Unable to create the subtrack home directory and config")
        .pub_result(ErrorType::Config)?;
    let message = match config.api_base_url() {
        Some(url) => format!(
            "Successfully created {} using the API at {url}",
            config.root().display()
        ),
        None => format!(
            "Successfully created {} in local-only mode",
            config.root().display()
        ),
    };
    Ok(message.into())
}
