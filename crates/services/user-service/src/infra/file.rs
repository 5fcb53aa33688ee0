//! Whole-document JSON file storage.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;

use common::AppResult;

/// A JSON document read and written in one piece.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so readers never observe a half-written document. There is no
/// locking across processes.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether the document exists on disk.
    pub async fn exists(&self) -> AppResult<bool> {
        Ok(fs::try_exists(&self.path).await?)
    }

    /// Read the document, or `T::default()` if the file does not exist yet.
    pub async fn read<T>(&self) -> AppResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(T::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Store file {} missing, starting empty", self.path.display());
                Ok(T::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the whole document.
    pub async fn write<T>(&self, document: &T) -> AppResult<()>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec_pretty(document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &self.path).await?;

        tracing::debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
