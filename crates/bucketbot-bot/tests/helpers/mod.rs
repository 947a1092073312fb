#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bucketbot_bot::telegram::types::Update;
use bucketbot_bot::telegram::TelegramError;
use bucketbot_bot::{BotState, ChatTransport};
use bucketbot_core::{AccessPolicy, ObjectEntry, ObjectMetadata, StorageBackend};
use bucketbot_infra::CdnClient;
use bucketbot_storage::urls::object_url;
use bucketbot_storage::{Storage, StorageError, StorageResult};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const OWNER: &str = "owner";
pub const OWNER_CHAT: i64 = 1001;
pub const BUCKET: &str = "media";

/// A message the bot sent
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub chat_id: i64,
    pub text: String,
    pub html: bool,
}

/// Fake transport that records replies and serves canned files.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    files: Mutex<HashMap<String, (String, Vec<u8>)>>,
    downloads: Mutex<Vec<PathBuf>>,
    pub resolve_calls: AtomicUsize,
    pub fail_downloads: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_downloads() -> Self {
        Self {
            fail_downloads: true,
            ..Self::default()
        }
    }

    /// Make `file_id` resolvable to `remote_path` with the given content.
    pub fn add_file(&self, file_id: &str, remote_path: &str, body: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(file_id.to_string(), (remote_path.to_string(), body.to_vec()));
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.text).collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.sent().last().map(|s| s.text.clone())
    }

    /// Temp paths downloads were written to
    pub fn download_paths(&self) -> Vec<PathBuf> {
        self.downloads.lock().unwrap().clone()
    }

    fn record(&self, chat_id: i64, text: &str, html: bool) {
        self.sent.lock().unwrap().push(Sent {
            chat_id,
            text: text.to_string(),
            html,
        });
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.record(chat_id, text, false);
        Ok(())
    }

    async fn send_html(&self, chat_id: i64, html: &str) -> Result<(), TelegramError> {
        self.record(chat_id, html, true);
        Ok(())
    }

    async fn resolve_file(&self, file_id: &str) -> Result<String, TelegramError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .get(file_id)
            .map(|(path, _)| path.clone())
            .ok_or_else(|| TelegramError::Api("Bad Request: invalid file_id".to_string()))
    }

    async fn download(&self, remote_path: &str, dest: &Path) -> Result<u64, TelegramError> {
        self.downloads.lock().unwrap().push(dest.to_path_buf());
        let body = self
            .files
            .lock()
            .unwrap()
            .values()
            .find(|(path, _)| path == remote_path)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| TelegramError::Api("file not found".to_string()))?;

        // Leave a partial file behind to check cleanup on failure.
        tokio::fs::write(dest, &body[..body.len() / 2]).await?;
        if self.fail_downloads {
            return Err(TelegramError::Api("connection reset".to_string()));
        }
        tokio::fs::write(dest, &body).await?;
        Ok(body.len() as u64)
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub policy: AccessPolicy,
}

/// In-memory bucket with switchable ACL support.
pub struct MemoryStorage {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    acl_supported: bool,
    upload_error: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            acl_supported: true,
            upload_error: None,
        }
    }

    pub fn without_acl() -> Self {
        Self {
            acl_supported: false,
            ..Self::new()
        }
    }

    pub fn failing_uploads() -> Self {
        Self::failing_uploads_with("SlowDown: please reduce your request rate")
    }

    pub fn failing_uploads_with(detail: &str) -> Self {
        Self {
            upload_error: Some(detail.to_string()),
            ..Self::new()
        }
    }

    pub fn insert(&self, key: &str, body: &[u8], content_type: &str, policy: AccessPolicy) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                content_type: content_type.to_string(),
                policy,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
        policy: AccessPolicy,
    ) -> StorageResult<()> {
        if let Some(detail) = &self.upload_error {
            return Err(StorageError::Provider(detail.clone()));
        }
        let body = tokio::fs::read(local_path).await?;
        self.insert(key, &body, content_type, policy);
        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        object_url(BUCKET, None, None, key)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn set_access_policy(&self, key: &str, policy: AccessPolicy) -> StorageResult<()> {
        if !self.acl_supported {
            return Err(StorageError::AclUnsupported);
        }
        let mut objects = self.objects.lock().unwrap();
        let object = objects
            .get_mut(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        object.policy = policy;
        Ok(())
    }

    async fn access_policy(&self, key: &str) -> StorageResult<Option<AccessPolicy>> {
        let policy = self
            .get(key)
            .map(|o| o.policy)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(self.acl_supported.then_some(policy))
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<bool> {
        let Some(mut object) = self.get(from_key) else {
            return Ok(false);
        };
        if !self.acl_supported {
            object.policy = AccessPolicy::Private;
        }
        self.objects
            .lock()
            .unwrap()
            .insert(to_key.to_string(), object);
        Ok(true)
    }

    async fn list(&self, prefix: &str, limit: usize) -> StorageResult<Vec<ObjectEntry>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .take(limit)
            .map(|(key, object)| ObjectEntry {
                key: key.clone(),
                size: Some(object.body.len() as u64),
                last_modified: None,
            })
            .collect())
    }

    async fn metadata(&self, key: &str) -> StorageResult<Option<ObjectMetadata>> {
        Ok(self.get(key).map(|object| ObjectMetadata {
            key: key.to_string(),
            size: object.body.len() as u64,
            content_type: Some(object.content_type.clone()),
            last_modified: None,
            etag: Some("\"d41d8cd98f00b204e9800998ecf8427e\"".to_string()),
            access_policy: self.acl_supported.then_some(object.policy),
        }))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Bot wired to fakes, with its own temp directory.
pub struct Harness {
    pub state: BotState,
    pub storage: Arc<MemoryStorage>,
    pub transport: Arc<RecordingTransport>,
    pub temp_dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(MemoryStorage::new(), RecordingTransport::new(), None)
    }

    pub fn with(
        storage: MemoryStorage,
        transport: RecordingTransport,
        cdn: Option<CdnClient>,
    ) -> Self {
        let storage = Arc::new(storage);
        let transport = Arc::new(transport);
        let temp_dir = TempDir::new().unwrap();
        let state = BotState {
            storage: storage.clone(),
            transport: transport.clone(),
            cdn,
            authorized_username: OWNER.to_string(),
            developer_chat_id: None,
            temp_path: temp_dir.path().to_path_buf(),
        };
        Self {
            state,
            storage,
            transport,
            temp_dir,
        }
    }

    /// Nothing is left in the temp directory.
    pub fn temp_dir_is_empty(&self) -> bool {
        std::fs::read_dir(self.temp_dir.path()).unwrap().next().is_none()
    }
}

pub fn url(key: &str) -> String {
    format!("https://{}.s3.amazonaws.com/{}", BUCKET, key)
}

pub fn raw_message(update_id: i64, username: Option<&str>, message: Value) -> Value {
    let mut message = message;
    message["message_id"] = json!(update_id * 10);
    message["date"] = json!(1_700_000_000);
    message["chat"] = json!({"id": OWNER_CHAT, "type": "private"});
    message["from"] = match username {
        Some(name) => json!({"id": OWNER_CHAT, "is_bot": false, "first_name": "Test", "username": name}),
        None => json!({"id": OWNER_CHAT, "is_bot": false, "first_name": "Test"}),
    };
    json!({"update_id": update_id, "message": message})
}

pub fn decode(raw: Value) -> Update {
    serde_json::from_value(raw).unwrap()
}

pub fn text_from(username: &str, text: &str) -> Update {
    decode(raw_message(1, Some(username), json!({"text": text})))
}

pub fn text(text: &str) -> Update {
    text_from(OWNER, text)
}

pub fn document(
    file_id: &str,
    file_name: &str,
    mime_type: Option<&str>,
    file_size: u64,
    caption: Option<&str>,
) -> Update {
    let mut doc = json!({"file_id": file_id, "file_unique_id": "u", "file_name": file_name, "file_size": file_size});
    if let Some(mime) = mime_type {
        doc["mime_type"] = json!(mime);
    }
    let mut message = json!({"document": doc});
    if let Some(caption) = caption {
        message["caption"] = json!(caption);
    }
    decode(raw_message(1, Some(OWNER), message))
}
