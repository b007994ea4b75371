//! # Local Filesystem Backend
//!
//! Layout under the root directory:
//!
//! ```text
//! {user}/documents/{document}
//! {user}/blobs/{blob}/{generation}   content of one blob version
//! {user}/generations/{blob}          committed generation of the blob
//! {user}/tmp/                        uploads in flight
//! ```
//!
//! Writes go to a temp file and are renamed into place, so readers never see
//! partial content. A blob write stores its content as version `current + 1`
//! and then commits by renaming the new generation record into place. That
//! rename is the only commit point: readers and the compare-and-swap follow
//! the generation record, so a version written without its commit stays
//! invisible and is overwritten by the next successful write. Blob
//! compare-and-swap runs under a per-key async lock held from the generation
//! read until the commit.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use super::backend::{
    stream_from_bytes, validate_component, BackendFuture, BlobKey, ByteStream, Generation,
    StorageBackend,
};
use super::errors::{BackendError, BackendResult};

/// Local filesystem storage backend
#[derive(Debug)]
pub struct LocalBackend {
    root: PathBuf,
    locks: Mutex<HashMap<BlobKey, Arc<AsyncMutex<()>>>>,
}

impl LocalBackend {
    /// Create a new local backend
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn document_path(&self, user_id: &str, document_id: &str) -> PathBuf {
        self.root.join(user_id).join("documents").join(document_id)
    }

    fn version_path(&self, key: &BlobKey, generation: Generation) -> PathBuf {
        self.root
            .join(&key.user_id)
            .join("blobs")
            .join(&key.blob_id)
            .join(generation.to_string())
    }

    fn generation_path(&self, key: &BlobKey) -> PathBuf {
        self.root
            .join(&key.user_id)
            .join("generations")
            .join(&key.blob_id)
    }

    fn temp_path(&self, user_id: &str) -> PathBuf {
        self.root
            .join(user_id)
            .join("tmp")
            .join(Uuid::new_v4().to_string())
    }

    /// Stream `body` into a temp file, then rename it over `target`
    async fn write_atomically(
        &self,
        user_id: &str,
        target: &Path,
        body: ByteStream,
    ) -> BackendResult<()> {
        let temp = self.temp_path(user_id);

        if let Err(e) = write_stream(&temp, body).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        if let Err(e) = fs::rename(&temp, target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(io_error(e));
        }
        Ok(())
    }

    async fn read_generation(&self, key: &BlobKey) -> BackendResult<Generation> {
        match fs::read_to_string(self.generation_path(key)).await {
            Ok(content) => content.trim().parse().map(Generation).map_err(|_| {
                BackendError::Internal(format!("Corrupt generation record for {}", key))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Generation::NONE),
            Err(e) => Err(io_error(e)),
        }
    }

    fn lock_for(&self, key: &BlobKey) -> BackendResult<Arc<AsyncMutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| BackendError::Internal("Lock poisoned".into()))?;
        Ok(locks.entry(key.clone()).or_default().clone())
    }

    /// Drop the per-key lock entry once nobody else holds or waits on it
    fn release_lock(&self, key: &BlobKey, lock: Arc<AsyncMutex<()>>) {
        if let Ok(mut locks) = self.locks.lock() {
            // one reference in the map, one here
            if Arc::strong_count(&lock) == 2 {
                locks.remove(key);
            }
        }
    }

    async fn store_blob_locked(
        &self,
        key: &BlobKey,
        body: ByteStream,
        expected: Generation,
    ) -> BackendResult<Generation> {
        let current = self.read_generation(key).await?;
        if current != expected {
            return Err(BackendError::GenerationMismatch { expected, current });
        }

        let next = current.next();
        self.write_atomically(&key.user_id, &self.version_path(key, next), body)
            .await?;

        // commit
        self.write_atomically(
            &key.user_id,
            &self.generation_path(key),
            stream_from_bytes(next.to_string()),
        )
        .await?;

        if current != Generation::NONE {
            // open readers keep their handle
            let _ = fs::remove_file(self.version_path(key, current)).await;
        }

        Ok(next)
    }

    async fn load_blob_locked(&self, key: &BlobKey) -> BackendResult<(ByteStream, Generation)> {
        let generation = self.read_generation(key).await?;
        if generation == Generation::NONE {
            return Err(BackendError::NotFound(key.to_string()));
        }

        let file = fs::File::open(self.version_path(key, generation))
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => BackendError::Internal(format!(
                    "Generation {} of {} has no content",
                    generation, key
                )),
                _ => io_error(e),
            })?;

        let body: ByteStream = Box::pin(ReaderStream::new(file));
        Ok((body, generation))
    }
}

impl StorageBackend for LocalBackend {
    fn store_document<'a>(
        &'a self,
        user_id: &'a str,
        document_id: &'a str,
        body: ByteStream,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            validate_component(user_id)?;
            validate_component(document_id)?;

            let target = self.document_path(user_id, document_id);
            self.write_atomically(user_id, &target, body).await
        })
    }

    fn get_document<'a>(
        &'a self,
        user_id: &'a str,
        document_id: &'a str,
    ) -> BackendFuture<'a, ByteStream> {
        Box::pin(async move {
            validate_component(user_id)?;
            validate_component(document_id)?;

            let file = fs::File::open(self.document_path(user_id, document_id))
                .await
                .map_err(|e| not_found_or_io(e, format!("{}/{}", user_id, document_id)))?;

            let body: ByteStream = Box::pin(ReaderStream::new(file));
            Ok(body)
        })
    }

    fn load_blob<'a>(&'a self, key: &'a BlobKey) -> BackendFuture<'a, (ByteStream, Generation)> {
        Box::pin(async move {
            key.validate()?;

            let lock = self.lock_for(key)?;
            let guard = lock.lock().await;
            let result = self.load_blob_locked(key).await;
            drop(guard);
            self.release_lock(key, lock);

            result
        })
    }

    fn store_blob<'a>(
        &'a self,
        key: &'a BlobKey,
        body: ByteStream,
        expected: Generation,
    ) -> BackendFuture<'a, Generation> {
        Box::pin(async move {
            key.validate()?;

            let lock = self.lock_for(key)?;
            let guard = lock.lock().await;
            let result = self.store_blob_locked(key, body, expected).await;
            drop(guard);
            self.release_lock(key, lock);

            result
        })
    }

    fn generation<'a>(&'a self, key: &'a BlobKey) -> BackendFuture<'a, Generation> {
        Box::pin(async move {
            key.validate()?;
            self.read_generation(key).await
        })
    }
}

async fn write_stream(path: &Path, mut body: ByteStream) -> BackendResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let mut file = fs::File::create(path).await.map_err(io_error)?;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(io_error)?;
        file.write_all(&chunk).await.map_err(io_error)?;
    }
    file.sync_all().await.map_err(io_error)?;
    Ok(())
}

fn io_error(e: io::Error) -> BackendError {
    BackendError::Io(e.to_string())
}

fn not_found_or_io(e: io::Error, what: String) -> BackendError {
    if e.kind() == io::ErrorKind::NotFound {
        BackendError::NotFound(what)
    } else {
        io_error(e)
    }
}
