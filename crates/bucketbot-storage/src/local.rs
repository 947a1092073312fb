use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bucketbot_core::{AccessPolicy, ObjectEntry, ObjectMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Directory under the storage root holding per-object metadata.
const META_DIR: &str = ".bucketbot-meta";

#[derive(Debug, Serialize, Deserialize)]
struct SidecarMeta {
    content_type: String,
}

/// Local filesystem storage implementation
///
/// Keys map to files under `base_path`. The filesystem has no object ACLs, so
/// uploads ignore the requested policy and ACL operations report
/// `AclUnsupported`.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: Option<String>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/bucketbot")
    /// * `base_url` - Public base URL; `file://` URLs are produced when absent
    pub async fn new(base_path: impl Into<PathBuf>, base_url: Option<String>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(base_path.join(META_DIR))
            .await
            .map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    base_path.display(),
                    e
                ))
            })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Reject keys that could escape the storage root or touch the metadata directory.
    fn validate_key(key: &str) -> StorageResult<()> {
        if key.is_empty() || key.ends_with('/') {
            return Err(StorageError::InvalidKey(format!("'{}' is not an object key", key)));
        }
        if key.split('/').any(|segment| segment == "..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        if key == META_DIR || key.starts_with(&format!("{}/", META_DIR)) {
            return Err(StorageError::InvalidKey(format!(
                "'{}' is reserved for object metadata",
                META_DIR
            )));
        }
        Ok(())
    }

    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        Self::validate_key(key)?;
        Ok(self.base_path.join(key))
    }

    fn sidecar_path(&self, key: &str) -> PathBuf {
        self.base_path.join(META_DIR).join(format!("{}.json", key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn is_file(path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn write_sidecar(&self, key: &str, content_type: &str) -> StorageResult<()> {
        let path = self.sidecar_path(key);
        Self::ensure_parent_dir(&path).await?;
        let body = serde_json::to_vec(&SidecarMeta {
            content_type: content_type.to_string(),
        })
        .map_err(|e| StorageError::Provider(format!("Failed to encode metadata: {}", e)))?;
        fs::write(&path, body).await?;
        Ok(())
    }

    async fn read_sidecar(&self, key: &str) -> Option<SidecarMeta> {
        let body = fs::read(self.sidecar_path(key)).await.ok()?;
        serde_json::from_slice(&body).ok()
    }

    async fn remove_sidecar(&self, key: &str) {
        let path = self.sidecar_path(key);
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, path = %path.display(), "Failed to remove object metadata");
            }
        }
    }

    /// Every object key under the root, sorted like an S3 listing.
    async fn all_keys(&self) -> StorageResult<Vec<(String, std::fs::Metadata)>> {
        let mut found = Vec::new();
        let mut pending = vec![self.base_path.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let metadata = entry.metadata().await?;
                if metadata.is_dir() {
                    if dir == self.base_path && entry.file_name() == META_DIR {
                        continue;
                    }
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.base_path) {
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    found.push((key, metadata));
                }
            }
        }

        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }
}

fn modified_at(metadata: &std::fs::Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
        _policy: AccessPolicy,
    ) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        Self::ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let size = fs::copy(local_path, &path).await.map_err(|e| {
            tracing::error!(
                error = %e,
                source = %local_path.display(),
                key = %key,
                "Local storage upload failed"
            );
            StorageError::IoError(e)
        })?;
        self.write_sidecar(key, content_type).await?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!(
                "file://{}/{}",
                self.base_path.display().to_string().trim_end_matches('/'),
                key
            ),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        if !Self::is_file(&path).await {
            return Err(StorageError::NotFound(key.to_string()));
        }

        fs::remove_file(&path).await?;
        self.remove_sidecar(key).await;

        tracing::info!(path = %path.display(), key = %key, "Local storage delete successful");
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(Self::is_file(&path).await)
    }

    async fn set_access_policy(&self, key: &str, _policy: AccessPolicy) -> StorageResult<()> {
        self.key_to_path(key)?;
        Err(StorageError::AclUnsupported)
    }

    async fn access_policy(&self, key: &str) -> StorageResult<Option<AccessPolicy>> {
        let path = self.key_to_path(key)?;
        if !Self::is_file(&path).await {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(None)
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<bool> {
        let from_path = self.key_to_path(from_key)?;
        let to_path = self.key_to_path(to_key)?;

        if !Self::is_file(&from_path).await {
            return Ok(false);
        }

        Self::ensure_parent_dir(&to_path).await?;
        fs::copy(&from_path, &to_path).await?;

        match self.read_sidecar(from_key).await {
            Some(meta) => self.write_sidecar(to_key, &meta.content_type).await?,
            None => self.remove_sidecar(to_key).await,
        }

        tracing::info!(
            from_key = %from_key,
            to_key = %to_key,
            "Local storage copy successful"
        );

        Ok(true)
    }

    async fn list(&self, prefix: &str, limit: usize) -> StorageResult<Vec<ObjectEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        Ok(self
            .all_keys()
            .await?
            .into_iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .take(limit)
            .map(|(key, metadata)| ObjectEntry {
                key,
                size: Some(metadata.len()),
                last_modified: modified_at(&metadata),
            })
            .collect())
    }

    async fn metadata(&self, key: &str) -> StorageResult<Option<ObjectMetadata>> {
        let path = self.key_to_path(key)?;
        let metadata = match fs::metadata(&path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(ObjectMetadata {
            key: key.to_string(),
            size: metadata.len(),
            content_type: self.read_sidecar(key).await.map(|m| m.content_type),
            last_modified: modified_at(&metadata),
            etag: None,
            access_policy: None,
        }))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
