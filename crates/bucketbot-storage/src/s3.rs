use crate::traits::{Storage, StorageError, StorageResult};
use crate::urls::object_url;
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::head_object::HeadObjectOutput;
use aws_sdk_s3::primitives::{ByteStream, DateTime as SmithyDateTime};
use aws_sdk_s3::types::{Grant, ObjectCannedAcl, Permission};
use aws_sdk_s3::Client;
use bucketbot_core::{AccessPolicy, ObjectEntry, ObjectMetadata};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Grantee URI that marks an object as world-readable.
const ALL_USERS_URI: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

/// ListObjectsV2 page size ceiling
const MAX_PAGE_SIZE: usize = 1000;

/// Connection settings for [`S3Storage`]
#[derive(Clone, Debug)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (e.g. "https://fra1.digitaloceanspaces.com")
    pub endpoint_url: Option<String>,
    /// Public base URL used by `url_for` instead of the bucket host
    pub custom_endpoint_url: Option<String>,
    pub force_path_style: bool,
    /// Static key/secret pair. The ambient AWS credential chain is used when absent.
    pub credentials: Option<(String, String)>,
}

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    endpoint_url: Option<String>,
    custom_endpoint_url: Option<String>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// Retries are disabled: every storage operation is a single provider call
    /// and failures are reported to the user as they happen.
    pub async fn new(settings: S3Settings) -> StorageResult<Self> {
        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(settings.region.clone()));

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(RetryConfig::disabled());

        if let Some((access_key, secret_key)) = &settings.credentials {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "bucketbot-static",
            ));
        }

        let sdk_config = loader.load().await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.force_path_style);
        if let Some(ref endpoint) = settings.endpoint_url {
            s3_config = s3_config.endpoint_url(endpoint);
        }
        let client = Client::from_conf(s3_config.build());

        tracing::debug!(
            bucket = %settings.bucket,
            region = %settings.region,
            endpoint = settings.endpoint_url.as_deref().unwrap_or("aws"),
            static_credentials = settings.credentials.is_some(),
            "S3 client configured"
        );

        Ok(S3Storage {
            client,
            bucket: settings.bucket,
            endpoint_url: settings.endpoint_url,
            custom_endpoint_url: settings.custom_endpoint_url,
        })
    }

    async fn head(&self, key: &str) -> StorageResult<Option<HeadObjectOutput>> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(Some(output)),
            Err(e) => match map_sdk_error(e, key) {
                StorageError::NotFound(_) => Ok(None),
                other => Err(other),
            },
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
        policy: AccessPolicy,
    ) -> StorageResult<()> {
        let body = ByteStream::from_path(local_path).await.map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to read {}: {}", local_path.display(), e),
            ))
        })?;

        let start = std::time::Instant::now();

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type);
        if policy == AccessPolicy::PublicRead {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request.send().await.map_err(|e| {
            tracing::error!(
                error = %DisplayErrorContext(&e),
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            map_sdk_error(e, key)
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            content_type = %content_type,
            policy = %policy,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        object_url(
            &self.bucket,
            self.endpoint_url.as_deref(),
            self.custom_endpoint_url.as_deref(),
            key,
        )
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        // DeleteObject succeeds on missing keys, so probe first.
        if self.head(key).await?.is_none() {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let start = std::time::Instant::now();

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                map_sdk_error(e, key)
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.head(key).await?.is_some())
    }

    async fn set_access_policy(&self, key: &str, policy: AccessPolicy) -> StorageResult<()> {
        let start = std::time::Instant::now();

        match self
            .client
            .put_object_acl()
            .bucket(&self.bucket)
            .key(key)
            .acl(canned_acl(policy))
            .send()
            .await
        {
            Ok(_) => {
                tracing::info!(
                    bucket = %self.bucket,
                    key = %key,
                    policy = %policy,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 ACL updated"
                );
                Ok(())
            }
            Err(e) if is_acl_unsupported(&e) => Err(StorageError::AclUnsupported),
            Err(e) => {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 ACL update failed"
                );
                Err(map_sdk_error(e, key))
            }
        }
    }

    async fn access_policy(&self, key: &str) -> StorageResult<Option<AccessPolicy>> {
        match self
            .client
            .get_object_acl()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(Some(policy_from_grants(output.grants()))),
            Err(e) if is_acl_unsupported(&e) => {
                tracing::debug!(bucket = %self.bucket, key = %key, "Provider has no object ACLs");
                Ok(None)
            }
            Err(e) => Err(map_sdk_error(e, key)),
        }
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<bool> {
        if self.head(from_key).await?.is_none() {
            return Ok(false);
        }

        let source_policy = self.access_policy(from_key).await?;
        let start = std::time::Instant::now();

        // URL-encode the copy source per AWS S3 API requirements
        let copy_source = format!("{}/{}", self.bucket, urlencoding::encode(from_key));

        let mut request = self
            .client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(&copy_source)
            .key(to_key);
        if let Some(policy) = source_policy {
            request = request.acl(canned_acl(policy));
        }

        request.send().await.map_err(|e| {
            tracing::error!(
                error = %DisplayErrorContext(&e),
                bucket = %self.bucket,
                from_key = %from_key,
                to_key = %to_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 copy failed"
            );
            map_sdk_error(e, from_key)
        })?;

        tracing::info!(
            bucket = %self.bucket,
            from_key = %from_key,
            to_key = %to_key,
            preserved_acl = source_policy.map(|p| p.as_str()).unwrap_or("none"),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 copy successful"
        );

        Ok(true)
    }

    async fn list(&self, prefix: &str, limit: usize) -> StorageResult<Vec<ObjectEntry>> {
        let mut entries = Vec::new();
        let mut continuation_token: Option<String> = None;

        while entries.len() < limit {
            let page_size = (limit - entries.len()).min(MAX_PAGE_SIZE);
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .max_keys(page_size as i32)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|e| map_sdk_error(e, prefix))?;

            for object in output.contents() {
                if entries.len() >= limit {
                    break;
                }
                if let Some(key) = object.key() {
                    entries.push(ObjectEntry {
                        key: key.to_string(),
                        size: object.size().and_then(|s| u64::try_from(s).ok()),
                        last_modified: object.last_modified().and_then(to_chrono),
                    });
                }
            }

            match (output.is_truncated(), output.next_continuation_token()) {
                (Some(true), Some(token)) => continuation_token = Some(token.to_string()),
                _ => break,
            }
        }

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %prefix,
            count = entries.len(),
            "S3 list complete"
        );

        Ok(entries)
    }

    async fn metadata(&self, key: &str) -> StorageResult<Option<ObjectMetadata>> {
        let head = match self.head(key).await? {
            Some(head) => head,
            None => return Ok(None),
        };
        let access_policy = self.access_policy(key).await?;

        Ok(Some(ObjectMetadata {
            key: key.to_string(),
            size: head
                .content_length()
                .and_then(|len| u64::try_from(len).ok())
                .unwrap_or(0),
            content_type: head.content_type().map(String::from),
            last_modified: head.last_modified().and_then(to_chrono),
            etag: head.e_tag().map(String::from),
            access_policy,
        }))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

fn canned_acl(policy: AccessPolicy) -> ObjectCannedAcl {
    match policy {
        AccessPolicy::PublicRead => ObjectCannedAcl::PublicRead,
        AccessPolicy::Private => ObjectCannedAcl::Private,
    }
}

/// An object is public when the AllUsers group may read it.
fn policy_from_grants(grants: &[Grant]) -> AccessPolicy {
    let public = grants.iter().any(|grant| {
        let all_users = grant
            .grantee()
            .and_then(|grantee| grantee.uri())
            .map(|uri| uri == ALL_USERS_URI)
            .unwrap_or(false);
        let readable = matches!(
            grant.permission(),
            Some(Permission::Read) | Some(Permission::FullControl)
        );
        all_users && readable
    });

    if public {
        AccessPolicy::PublicRead
    } else {
        AccessPolicy::Private
    }
}

fn to_chrono(dt: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

fn status_code<E>(err: &SdkError<E, HttpResponse>) -> Option<u16> {
    err.raw_response().map(|response| response.status().as_u16())
}

fn is_acl_unsupported<E>(err: &SdkError<E, HttpResponse>) -> bool
where
    E: ProvideErrorMetadata,
{
    matches!(
        err.code(),
        Some("NotImplemented") | Some("AccessControlListNotSupported") | Some("NotSupported")
    ) || status_code(err) == Some(501)
}

/// Collapse an SDK error into the storage taxonomy.
fn map_sdk_error<E>(err: SdkError<E, HttpResponse>, key: &str) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = status_code(&err);
    match (err.code(), status) {
        (Some("NoSuchKey") | Some("NotFound"), _) | (_, Some(404)) => {
            StorageError::NotFound(key.to_string())
        }
        (Some("AccessDenied"), _) | (_, Some(403)) => StorageError::AccessDenied(key.to_string()),
        _ => StorageError::Provider(DisplayErrorContext(&err).to_string()),
    }
}
