//! On-disk attachment storage.
//!
//! Accepted files are written under a random name; only the metadata
//! (`{name, path, media_type, size}`) goes into the complaint row. No
//! binary data lives in the database.

use std::path::PathBuf;

use nivaran_core::{complaint::Attachment, submission::CandidateFile};
use uuid::Uuid;

/// File extension for a stored blob, derived from its (already screened)
/// media type.
fn extension_for(media_type: &str) -> &'static str {
  match media_type {
    "image/jpeg" => ".jpg",
    "image/png" => ".png",
    "application/pdf" => ".pdf",
    "application/msword" => ".doc",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
      ".docx"
    }
    _ => ".bin",
  }
}

/// A directory of attachment blobs keyed by random names.
pub struct BlobStore {
  root: PathBuf,
}

impl BlobStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Create the storage directory if it does not exist yet.
  pub async fn ensure_dir(&self) -> std::io::Result<()> {
    tokio::fs::create_dir_all(&self.root).await
  }

  /// Write one accepted file under a freshly generated key and return the
  /// metadata to store with the complaint.
  pub async fn save(
    &self,
    file: &CandidateFile,
    bytes: &[u8],
  ) -> std::io::Result<Attachment> {
    let key = format!("{}{}", Uuid::new_v4(), extension_for(&file.media_type));
    tokio::fs::write(self.root.join(&key), bytes).await?;
    Ok(Attachment {
      name:       file.name.clone(),
      path:       key,
      media_type: file.media_type.clone(),
      size:       bytes.len() as u64,
    })
  }

  /// Best-effort removal, used to clean up after a failed insert. A blob
  /// that cannot be removed is logged and leaked.
  pub async fn remove(&self, path: &str) {
    if let Err(e) = tokio::fs::remove_file(self.root.join(path)).await {
      tracing::warn!(path, error = %e, "failed to remove orphaned attachment");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn candidate(name: &str, media_type: &str, size: u64) -> CandidateFile {
    CandidateFile {
      name:       name.into(),
      media_type: media_type.into(),
      size,
    }
  }

  #[tokio::test]
  async fn save_writes_blob_and_returns_metadata() {
    let dir = std::env::temp_dir().join(format!("nivaran-blobs-{}", Uuid::new_v4()));
    let blobs = BlobStore::new(&dir);
    blobs.ensure_dir().await.unwrap();

    let bytes = b"fake pdf bytes";
    let meta = blobs
      .save(&candidate("report.pdf", "application/pdf", bytes.len() as u64), bytes)
      .await
      .unwrap();

    assert_eq!(meta.name, "report.pdf");
    assert!(meta.path.ends_with(".pdf"));
    assert_eq!(meta.size, bytes.len() as u64);

    let stored = tokio::fs::read(dir.join(&meta.path)).await.unwrap();
    assert_eq!(stored, bytes);

    blobs.remove(&meta.path).await;
    assert!(!dir.join(&meta.path).exists());
    tokio::fs::remove_dir_all(&dir).await.ok();
  }
}
