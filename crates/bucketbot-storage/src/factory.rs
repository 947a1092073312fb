#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::{S3Settings, S3Storage};
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use bucketbot_core::StorageConfig;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    match config.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("BUCKET_NAME not configured".to_string()))?;

            let storage = S3Storage::new(S3Settings {
                bucket,
                region: config.region.clone(),
                endpoint_url: config.endpoint_url.clone(),
                custom_endpoint_url: config.custom_endpoint_url.clone(),
                force_path_style: config.force_path_style,
                credentials: config.credentials(),
            })
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, config.custom_endpoint_url.clone()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;

    fn local_config(path: Option<String>) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Local,
            region: "us-east-1".to_string(),
            bucket: None,
            endpoint_url: None,
            custom_endpoint_url: Some("https://files.example.com".to_string()),
            force_path_style: false,
            access_key_id: None,
            secret_access_key: None,
            local_storage_path: path,
        }
    }

    #[tokio::test]
    async fn builds_local_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = create_storage(&local_config(Some(dir.path().display().to_string())))
            .await
            .unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
        assert_eq!(storage.url_for("a.txt"), "https://files.example.com/a.txt");
    }

    #[tokio::test]
    async fn local_backend_requires_path() {
        let result = create_storage(&local_config(None)).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
