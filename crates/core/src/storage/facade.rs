//! Service facade over the object store.
//!
//! Validates inputs, stages upload/download files on local disk, and
//! shapes the strings the HTTP layer returns to clients.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::fs;
use tracing::{debug, warn};

use super::client::ObjectStore;
use super::config::StorageConfig;
use super::error::StorageError;

/// Facade owning the staging directory and delegating to an
/// [`ObjectStore`].
pub struct StorageFacade<S: ObjectStore> {
    store: Arc<S>,
    staging_dir: PathBuf,
}

impl<S: ObjectStore> StorageFacade<S> {
    /// Create a new facade.
    #[must_use]
    pub fn new(store: Arc<S>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            staging_dir: staging_dir.into(),
        }
    }

    /// The staging directory this facade writes transient files into.
    #[must_use]
    pub fn staging_dir(&self) -> &std::path::Path {
        &self.staging_dir
    }

    /// Create a bucket and report where the provider placed it.
    pub async fn create_bucket(&self, bucket: &str) -> Result<String, StorageError> {
        ensure_not_empty(bucket, "bucket name")?;
        let location = self.store.create_bucket(bucket).await?;
        Ok(format!("Bucket created in location: {location}"))
    }

    /// Answer whether a bucket exists, as a human-readable string.
    /// An absent bucket is a normal answer here, not an error.
    pub async fn check_bucket(&self, bucket: &str) -> Result<String, StorageError> {
        ensure_not_empty(bucket, "bucket name")?;
        if self.store.bucket_exists(bucket).await? {
            Ok(format!("Bucket does exist: {bucket}"))
        } else {
            Ok(format!("Bucket does not exist: {bucket}"))
        }
    }

    /// List all bucket names, provider ordering verbatim.
    pub async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        self.store.list_buckets().await
    }

    /// Stage the received bytes on local disk, upload them under `key`,
    /// and remove the staged file on success. On a provider-side
    /// failure the staged file stays behind for inspection.
    pub async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        original_filename: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        ensure_not_empty(bucket, "bucket name")?;
        ensure_not_empty(key, "key")?;

        let staged_name = sanitize_staged_filename(original_filename);
        if staged_name.is_empty() {
            return Err(StorageError::validation("file name is empty"));
        }

        fs::create_dir_all(&self.staging_dir)
            .await
            .map_err(|err| StorageError::local_io(err.to_string()))?;

        let staged_path = self.staging_dir.join(staged_name);
        fs::write(&staged_path, &bytes)
            .await
            .map_err(|err| StorageError::local_io(err.to_string()))?;
        debug!(bucket, key, staged = %staged_path.display(), size = bytes.len(), "file staged");

        match self.store.put_object(bucket, key, &staged_path).await {
            Ok(true) => {
                // Deletion failure after a successful put is swallowed;
                // the object is already in the bucket.
                if let Err(err) = fs::remove_file(&staged_path).await {
                    warn!(staged = %staged_path.display(), error = %err, "staged file cleanup failed");
                }
                Ok("File uploaded successfully".to_string())
            }
            Ok(false) => Err(StorageError::upload_failed(bucket, key)),
            Err(err @ StorageError::LocalIo(_)) => Err(err),
            Err(err) => {
                warn!(bucket, key, error = %err, "upload failed");
                Err(StorageError::upload_failed(bucket, key))
            }
        }
    }

    /// Fetch an object and write it into the staging directory under a
    /// filename derived from the key.
    pub async fn download_file(&self, bucket: &str, key: &str) -> Result<String, StorageError> {
        ensure_not_empty(bucket, "bucket name")?;
        ensure_not_empty(key, "key")?;

        let bytes = self.store.get_object_bytes(bucket, key).await?;

        let file_name = derive_download_filename(key);
        // The derived name keeps the leading '/' so the join strips it
        // instead of escaping the staging directory.
        let target = self.staging_dir.join(file_name.trim_start_matches('/'));

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| StorageError::local_io(err.to_string()))?;
        }

        // Truncate-and-write; there is no crash-consistency requirement.
        fs::write(&target, &bytes)
            .await
            .map_err(|err| StorageError::local_io(format!("could not write download: {err}")))?;
        debug!(bucket, key, target = %target.display(), size = bytes.len(), "file downloaded");

        Ok("File downloaded successfully".to_string())
    }

    /// Mint a presigned URL for a direct PUT, valid for `minutes`.
    pub async fn presign_upload(
        &self,
        bucket: &str,
        key: &str,
        minutes: u64,
    ) -> Result<String, StorageError> {
        let expires_in = presign_duration(bucket, key, minutes)?;
        self.store.presign_put(bucket, key, expires_in).await
    }

    /// Mint a presigned URL for a direct GET, valid for `minutes`.
    pub async fn presign_download(
        &self,
        bucket: &str,
        key: &str,
        minutes: u64,
    ) -> Result<String, StorageError> {
        let expires_in = presign_duration(bucket, key, minutes)?;
        self.store.presign_get(bucket, key, expires_in).await
    }
}

/// Validate presign inputs and convert minutes to a duration.
fn presign_duration(bucket: &str, key: &str, minutes: u64) -> Result<Duration, StorageError> {
    ensure_not_empty(bucket, "bucket name")?;
    ensure_not_empty(key, "key")?;
    if minutes == 0 {
        return Err(StorageError::validation(
            "expiration must be a positive number of minutes",
        ));
    }
    if minutes > StorageConfig::MAX_PRESIGN_MINUTES {
        return Err(StorageError::validation(format!(
            "expiration exceeds the signing limit of {} minutes",
            StorageConfig::MAX_PRESIGN_MINUTES
        )));
    }
    Ok(Duration::from_secs(minutes * 60))
}

fn ensure_not_empty(value: &str, field: &str) -> Result<(), StorageError> {
    if value.is_empty() {
        return Err(StorageError::validation(format!("{field} is empty")));
    }
    Ok(())
}

/// Derive the staged filename from an object key: the substring from
/// the last `/` (inclusive) when the key contains one, else the whole
/// key.
///
/// TODO: the kept leading slash reproduces the original service's
/// naming; move to `last_index + 1` once nothing asserts on the
/// slash-prefixed name.
fn derive_download_filename(key: &str) -> &str {
    match key.rfind('/') {
        Some(index) => &key[index..],
        None => key,
    }
}

/// Reduce a client-supplied filename to its final path component so a
/// crafted name cannot traverse out of the staging directory.
fn sanitize_staged_filename(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_start_matches('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// In-memory object store for testing.
    struct MockStore {
        buckets: Mutex<HashMap<String, HashMap<String, Bytes>>>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                buckets: Mutex::new(HashMap::new()),
            }
        }

        fn with_bucket(bucket: &str) -> Self {
            let store = Self::new();
            store
                .buckets
                .lock()
                .unwrap()
                .insert(bucket.to_string(), HashMap::new());
            store
        }

        fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
            self.buckets
                .lock()
                .unwrap()
                .get(bucket)
                .and_then(|objects| objects.get(key).cloned())
        }
    }

    impl ObjectStore for MockStore {
        async fn create_bucket(&self, name: &str) -> Result<String, StorageError> {
            let mut buckets = self.buckets.lock().unwrap();
            if buckets.contains_key(name) {
                return Err(StorageError::bucket_already_owned(name));
            }
            buckets.insert(name.to_string(), HashMap::new());
            Ok(format!("/{name}"))
        }

        async fn bucket_exists(&self, name: &str) -> Result<bool, StorageError> {
            Ok(self.buckets.lock().unwrap().contains_key(name))
        }

        async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
            let mut names: Vec<String> = self.buckets.lock().unwrap().keys().cloned().collect();
            names.sort();
            Ok(names)
        }

        async fn put_object(
            &self,
            bucket: &str,
            key: &str,
            local_path: &Path,
        ) -> Result<bool, StorageError> {
            let data = std::fs::read(local_path)
                .map_err(|err| StorageError::local_io(err.to_string()))?;
            let mut buckets = self.buckets.lock().unwrap();
            let Some(objects) = buckets.get_mut(bucket) else {
                return Ok(false);
            };
            objects.insert(key.to_string(), Bytes::from(data));
            Ok(true)
        }

        async fn get_object_bytes(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
            self.object(bucket, key)
                .ok_or_else(|| StorageError::not_found(format!("object '{key}'")))
        }

        async fn presign_put(
            &self,
            bucket: &str,
            key: &str,
            expires_in: Duration,
        ) -> Result<String, StorageError> {
            Ok(format!(
                "https://{bucket}.s3.example.com/{key}?X-Amz-Expires={}",
                expires_in.as_secs()
            ))
        }

        async fn presign_get(
            &self,
            bucket: &str,
            key: &str,
            expires_in: Duration,
        ) -> Result<String, StorageError> {
            Ok(format!(
                "https://{bucket}.s3.example.com/{key}?X-Amz-Expires={}",
                expires_in.as_secs()
            ))
        }
    }

    fn facade_with(store: MockStore) -> (StorageFacade<MockStore>, TempDir) {
        let staging = TempDir::new().expect("should create temp dir");
        let facade = StorageFacade::new(Arc::new(store), staging.path());
        (facade, staging)
    }

    #[tokio::test]
    async fn test_create_then_check_then_list() {
        let (facade, _staging) = facade_with(MockStore::new());

        let message = facade.create_bucket("my-bucket-001").await.unwrap();
        assert_eq!(message, "Bucket created in location: /my-bucket-001");

        let check = facade.check_bucket("my-bucket-001").await.unwrap();
        assert_eq!(check, "Bucket does exist: my-bucket-001");

        let buckets = facade.list_buckets().await.unwrap();
        assert_eq!(buckets, vec!["my-bucket-001".to_string()]);
    }

    #[tokio::test]
    async fn test_check_absent_bucket_is_a_normal_answer() {
        let (facade, _staging) = facade_with(MockStore::new());

        let check = facade.check_bucket("does-not-exist").await.unwrap();
        assert_eq!(check, "Bucket does not exist: does-not-exist");
    }

    #[tokio::test]
    async fn test_create_bucket_rejects_empty_name() {
        let (facade, _staging) = facade_with(MockStore::new());

        let err = facade.create_bucket("").await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upload_success_removes_staged_file() {
        let (facade, staging) = facade_with(MockStore::with_bucket("my-bucket-001"));

        let message = facade
            .upload_file(
                "my-bucket-001",
                "greetings/hi.txt",
                "hello.txt",
                Bytes::from_static(b"hello"),
            )
            .await
            .unwrap();
        assert_eq!(message, "File uploaded successfully");
        assert!(!staging.path().join("hello.txt").exists());
    }

    #[tokio::test]
    async fn test_upload_round_trips_bytes() {
        let store = MockStore::with_bucket("b");
        let staging = TempDir::new().unwrap();
        let facade = StorageFacade::new(Arc::new(store), staging.path());

        facade
            .upload_file("b", "k", "data.bin", Bytes::from_static(b"\x00\x01\x02"))
            .await
            .unwrap();

        let fetched = facade.store.get_object_bytes("b", "k").await.unwrap();
        assert_eq!(fetched, Bytes::from_static(b"\x00\x01\x02"));
    }

    #[tokio::test]
    async fn test_upload_to_missing_bucket_leaves_staged_file() {
        let (facade, staging) = facade_with(MockStore::new());

        let err = facade
            .upload_file("nope", "k", "hello.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed { .. }));

        let staged = staging.path().join("hello.txt");
        assert!(staged.exists());
        assert_eq!(std::fs::read(&staged).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_upload_sanitizes_traversal_filenames() {
        // A failing put leaves the staged file behind, which lets us
        // observe where the crafted name actually landed.
        let (facade, staging) = facade_with(MockStore::new());

        let err = facade
            .upload_file("nope", "k", "../../etc/passwd", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed { .. }));
        assert!(staging.path().join("passwd").exists());
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_filename() {
        let (facade, _staging) = facade_with(MockStore::with_bucket("b"));

        let err = facade
            .upload_file("b", "k", "", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    #[tokio::test]
    async fn test_download_writes_derived_filename() {
        let store = MockStore::with_bucket("my-bucket-001");
        store
            .buckets
            .lock()
            .unwrap()
            .get_mut("my-bucket-001")
            .unwrap()
            .insert("greetings/hi.txt".to_string(), Bytes::from_static(b"hello"));
        let staging = TempDir::new().unwrap();
        let facade = StorageFacade::new(Arc::new(store), staging.path());

        let message = facade
            .download_file("my-bucket-001", "greetings/hi.txt")
            .await
            .unwrap();
        assert_eq!(message, "File downloaded successfully");

        let target = staging.path().join("hi.txt");
        assert_eq!(std::fs::read(&target).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_download_flat_key_uses_whole_key() {
        let store = MockStore::with_bucket("b");
        store
            .buckets
            .lock()
            .unwrap()
            .get_mut("b")
            .unwrap()
            .insert("notes.txt".to_string(), Bytes::from_static(b"n"));
        let staging = TempDir::new().unwrap();
        let facade = StorageFacade::new(Arc::new(store), staging.path());

        facade.download_file("b", "notes.txt").await.unwrap();
        assert!(staging.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_download_missing_object_is_not_found() {
        let (facade, _staging) = facade_with(MockStore::with_bucket("b"));

        let err = facade.download_file("b", "absent").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_presign_embeds_requested_expiry() {
        let (facade, _staging) = facade_with(MockStore::new());

        let url = facade.presign_upload("b", "x", 5).await.unwrap();
        assert!(url.starts_with("https://"));
        assert!(url.contains("X-Amz-Expires=300"));

        let url = facade.presign_download("b", "x", 60).await.unwrap();
        assert!(url.contains("X-Amz-Expires=3600"));
    }

    #[tokio::test]
    async fn test_presign_rejects_zero_and_over_limit() {
        let (facade, _staging) = facade_with(MockStore::new());

        let err = facade.presign_upload("b", "x", 0).await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let err = facade
            .presign_download("b", "x", StorageConfig::MAX_PRESIGN_MINUTES + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        // The limit itself is accepted.
        assert!(
            facade
                .presign_download("b", "x", StorageConfig::MAX_PRESIGN_MINUTES)
                .await
                .is_ok()
        );
    }

    #[test]
    fn test_derive_download_filename() {
        assert_eq!(derive_download_filename("greetings/hi.txt"), "/hi.txt");
        assert_eq!(derive_download_filename("hi.txt"), "hi.txt");
        assert_eq!(derive_download_filename("a/b/c.bin"), "/c.bin");
        assert_eq!(derive_download_filename("trailing/"), "/");
    }

    #[test]
    fn test_sanitize_staged_filename() {
        assert_eq!(sanitize_staged_filename("hello.txt"), "hello.txt");
        assert_eq!(sanitize_staged_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_staged_filename("dir\\file.bin"), "file.bin");
        assert_eq!(sanitize_staged_filename("..."), "");
        assert_eq!(sanitize_staged_filename(""), "");
    }
}
