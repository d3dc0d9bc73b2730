use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use super::domain::{now_millis, StorageId};

/// Upload URLs stay valid for an hour.
const UPLOAD_TTL_MS: i64 = 60 * 60 * 1000;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload URL is invalid or has expired")]
    InvalidUploadToken,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Short-lived URL a client uploads one blob to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub upload_url: String,
    pub expires_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Blob storage keyed by opaque identifiers.
pub trait ObjectStorage: Send + Sync {
    fn generate_upload_url(&self) -> Result<UploadTicket, StorageError>;
    /// Consume an upload token, returning the id of the stored blob.
    fn store(
        &self,
        upload_token: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StorageId, StorageError>;
    fn url_for(&self, id: &StorageId) -> Result<Option<String>, StorageError>;
    fn fetch(&self, id: &StorageId) -> Result<Option<StoredBlob>, StorageError>;
}

#[derive(Default)]
struct Buckets {
    pending_uploads: HashMap<String, i64>,
    blobs: HashMap<StorageId, StoredBlob>,
}

/// In-process storage that issues URLs under the service's public base URL.
pub struct MemoryObjectStorage {
    public_url: String,
    buckets: Mutex<Buckets>,
}

impl MemoryObjectStorage {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into().trim_end_matches('/').to_string(),
            buckets: Mutex::new(Buckets::default()),
        }
    }

    fn buckets(&self) -> Result<MutexGuard<'_, Buckets>, StorageError> {
        self.buckets
            .lock()
            .map_err(|_| StorageError::Unavailable("storage mutex poisoned".to_string()))
    }
}

impl ObjectStorage for MemoryObjectStorage {
    fn generate_upload_url(&self) -> Result<UploadTicket, StorageError> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let now = now_millis();
        let expires_at = now + UPLOAD_TTL_MS;

        let mut buckets = self.buckets()?;
        // Abandoned tokens would otherwise accumulate for the life of the process.
        buckets.pending_uploads.retain(|_, expiry| *expiry >= now);
        buckets.pending_uploads.insert(token.clone(), expires_at);

        Ok(UploadTicket {
            upload_url: format!("{}/api/v1/uploads/{token}", self.public_url),
            expires_at,
        })
    }

    fn store(
        &self,
        upload_token: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StorageId, StorageError> {
        let mut buckets = self.buckets()?;
        let expires_at = buckets
            .pending_uploads
            .remove(upload_token)
            .ok_or(StorageError::InvalidUploadToken)?;
        if expires_at < now_millis() {
            return Err(StorageError::InvalidUploadToken);
        }

        let id = StorageId::generate();
        buckets.blobs.insert(
            id.clone(),
            StoredBlob {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(id)
    }

    fn url_for(&self, id: &StorageId) -> Result<Option<String>, StorageError> {
        let buckets = self.buckets()?;
        Ok(buckets
            .blobs
            .contains_key(id)
            .then(|| format!("{}/api/v1/files/{id}/content", self.public_url)))
    }

    fn fetch(&self, id: &StorageId) -> Result<Option<StoredBlob>, StorageError> {
        Ok(self.buckets()?.blobs.get(id).cloned())
    }
}
