use crate::error::Res;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs::ReadDir;
use std::path::{Path, PathBuf};

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Res<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Write a file by writing a temporary sibling first and then renaming it over `path`, so that
/// readers never see a partially written file.
pub(crate) async fn write_replace(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Res<()> {
    let path = path.as_ref();
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    write(&tmp, contents).await?;
    rename(&tmp, path).await
}

/// Read a file to a `String`.
pub(crate) async fn read(path: &Path) -> Res<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Read a file to a `String`, returning `None` if it does not exist.
pub(crate) async fn read_if_exists(path: &Path) -> Res<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read file at {}", path.display())),
    }
}

/// Deserialize a JSON file into type `T`.
pub(crate) async fn deserialize<T>(path: &Path) -> Res<T>
where
    T: DeserializeOwned,
{
    let content = read(path).await?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file at {}", path.display()))
}

/// Basically move a file. Renames `from` -> `to`.
pub(crate) async fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Res<()> {
    tokio::fs::rename(from.as_ref(), to.as_ref())
        .await
        .with_context(|| {
            format!(
                "Unable to move file from '{}' to '{}'",
                from.as_ref().to_string_lossy(),
                to.as_ref().to_string_lossy()
            )
        })
}

pub(crate) async fn remove(path: &Path) -> Res<()> {
    tokio::fs::remove_file(path)
        .await
        .with_context(|| format!("Unable to remove {}", path.display()))
}

/// Create a directory and its parents if they do not exist.
pub(crate) async fn make_dir(path: &Path) -> Res<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory {}", path.display()))
}

pub(crate) async fn canonicalize(path: &Path) -> Res<PathBuf> {
    tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Unable to resolve path {}", path.display()))
}

pub(crate) async fn read_dir(path: &Path) -> Res<ReadDir> {
    let p = path.to_owned();
    tokio::task::spawn_blocking(move || std::fs::read_dir(&p))
        .await
        .context("The directory listing task failed")?
        .with_context(|| format!("Unable to read directory {}", path.display()))
}

/// Lists the file names in `dir`.
pub(crate) async fn file_names(dir: &Path) -> Res<Vec<String>> {
    let mut names = Vec::new();
    for entry in read_dir(dir).await? {
        let entry = entry.with_context(|| format!("Unable to read entry in {}", dir.display()))?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_replace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.json");
        write_replace(&path, "1").await.unwrap();
        write_replace(&path, "2").await.unwrap();
        assert_eq!(read(&path).await.unwrap(), "2");
        assert_eq!(file_names(dir.path()).await.unwrap(), vec!["a.json"]);
    }

    #[tokio::test]
    async fn test_read_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing");
        assert_eq!(read_if_exists(&path).await.unwrap(), None);
        write(&path, "x").await.unwrap();
        assert_eq!(read_if_exists(&path).await.unwrap().as_deref(), Some("x"));
    }
}
