use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};
use tokio::sync::Mutex;

use super::document::ClubDocument;

/// JsonConnection owns the club data file and its in-memory copy.
///
/// All access goes through one async mutex. Writes run against a draft,
/// the draft is persisted with a temp file and rename, and only then does it
/// replace the in-memory document. A failed write changes nothing.
#[derive(Clone)]
pub struct JsonConnection {
    data_file: Arc<PathBuf>,
    document: Arc<Mutex<ClubDocument>>,
}

impl JsonConnection {
    /// Open the data file, creating an empty one if it does not exist
    pub async fn open<P: AsRef<Path>>(data_file: P) -> Result<Self> {
        let data_file = data_file.as_ref().to_path_buf();

        if let Some(parent) = data_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
            }
        }

        let document = if data_file.exists() {
            let raw = tokio::fs::read(&data_file)
                .await
                .with_context(|| format!("Failed to read {}", data_file.display()))?;
            let document: ClubDocument = serde_json::from_slice(&raw)
                .with_context(|| format!("Data file {} is not a valid club document", data_file.display()))?;
            info!(
                "Loaded {} ({} activities, {} trainers, {} users)",
                data_file.display(),
                document.activities.len(),
                document.trainers.len(),
                document.users.len()
            );
            document
        } else {
            let document = ClubDocument::default();
            persist(&data_file, &document).await?;
            info!("Created empty data file {}", data_file.display());
            document
        };

        Ok(Self {
            data_file: Arc::new(data_file),
            document: Arc::new(Mutex::new(document)),
        })
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Run a read-only closure against the current document
    pub async fn read<R>(&self, f: impl FnOnce(&ClubDocument) -> R) -> R {
        let document = self.document.lock().await;
        f(&document)
    }

    /// Run a mutation against a draft of the document and persist it.
    ///
    /// If the closure or the file write fails, the stored document is left
    /// untouched.
    pub async fn write<R>(&self, f: impl FnOnce(&mut ClubDocument) -> Result<R>) -> Result<R> {
        let mut document = self.document.lock().await;
        let mut draft = document.clone();
        let result = f(&mut draft)?;
        persist(&self.data_file, &draft).await?;
        *document = draft;
        Ok(result)
    }
}

async fn persist(data_file: &Path, document: &ClubDocument) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(document).context("Failed to serialize club document")?;
    let tmp_file = data_file.with_extension("json.tmp");
    tokio::fs::write(&tmp_file, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", tmp_file.display()))?;
    tokio::fs::rename(&tmp_file, data_file)
        .await
        .with_context(|| format!("Failed to replace {}", data_file.display()))?;
    debug!("Persisted {} bytes to {}", bytes.len(), data_file.display());
    Ok(())
}
