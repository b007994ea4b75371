//! # In-Memory Backend
//!
//! Bodies are buffered before the compare-and-swap so the map lock is
//! never held across an await point.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;

use super::backend::{
    collect_stream, stream_from_bytes, validate_component, BackendFuture, BlobKey, ByteStream,
    Generation, StorageBackend,
};
use super::errors::{BackendError, BackendResult};

/// In-memory storage backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: RwLock<HashMap<(String, String), Bytes>>,
    blobs: RwLock<HashMap<BlobKey, (Bytes, Generation)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> BackendError {
        BackendError::Internal("Lock poisoned".into())
    }

    fn compare_and_swap(
        &self,
        key: &BlobKey,
        data: Bytes,
        expected: Generation,
    ) -> BackendResult<Generation> {
        let mut blobs = self.blobs.write().map_err(|_| Self::poisoned())?;

        let current = blobs.get(key).map(|(_, g)| *g).unwrap_or(Generation::NONE);
        if current != expected {
            return Err(BackendError::GenerationMismatch { expected, current });
        }

        let next = current.next();
        blobs.insert(key.clone(), (data, next));
        Ok(next)
    }
}

impl StorageBackend for MemoryBackend {
    fn store_document<'a>(
        &'a self,
        user_id: &'a str,
        document_id: &'a str,
        body: ByteStream,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            validate_component(user_id)?;
            validate_component(document_id)?;

            let data = collect_stream(body)
                .await
                .map_err(|e| BackendError::Io(e.to_string()))?;

            let mut documents = self.documents.write().map_err(|_| Self::poisoned())?;
            documents.insert((user_id.to_string(), document_id.to_string()), data);
            Ok(())
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

            let documents = self.documents.read().map_err(|_| Self::poisoned())?;
            documents
                .get(&(user_id.to_string(), document_id.to_string()))
                .map(|data| stream_from_bytes(data.clone()))
                .ok_or_else(|| BackendError::NotFound(format!("{}/{}", user_id, document_id)))
        })
    }

    fn load_blob<'a>(&'a self, key: &'a BlobKey) -> BackendFuture<'a, (ByteStream, Generation)> {
        Box::pin(async move {
            key.validate()?;

            let blobs = self.blobs.read().map_err(|_| Self::poisoned())?;
            blobs
                .get(key)
                .map(|(data, generation)| (stream_from_bytes(data.clone()), *generation))
                .ok_or_else(|| BackendError::NotFound(key.to_string()))
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

            let data = collect_stream(body)
                .await
                .map_err(|e| BackendError::Io(e.to_string()))?;

            self.compare_and_swap(key, data, expected)
        })
    }

    fn generation<'a>(&'a self, key: &'a BlobKey) -> BackendFuture<'a, Generation> {
        Box::pin(async move {
            let blobs = self.blobs.read().map_err(|_| Self::poisoned())?;
            Ok(blobs.get(key).map(|(_, g)| *g).unwrap_or(Generation::NONE))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_document_write_read() {
        let backend = MemoryBackend::new();
        backend
            .store_document("u1", "d1", stream_from_bytes("hello"))
            .await
            .unwrap();

        let body = backend.get_document("u1", "d1").await.unwrap();
        assert_eq!(collect_stream(body).await.unwrap(), Bytes::from("hello"));
    }

    #[tokio::test]
    async fn test_document_not_found() {
        let backend = MemoryBackend::new();
        let result = backend.get_document("u1", "missing").await;
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fresh_blob_starts_at_generation_one() {
        let backend = MemoryBackend::new();
        let key = BlobKey::new("u1", "b1");

        let generation = backend
            .store_blob(&key, stream_from_bytes("v1"), Generation::NONE)
            .await
            .unwrap();
        assert_eq!(generation, Generation(1));

        let (body, loaded) = backend.load_blob(&key).await.unwrap();
        assert_eq!(loaded, Generation(1));
        assert_eq!(collect_stream(body).await.unwrap(), Bytes::from("v1"));
    }

    #[tokio::test]
    async fn test_stale_generation_rejected_without_write() {
        let backend = MemoryBackend::new();
        let key = BlobKey::new("u1", "b1");
        backend
            .store_blob(&key, stream_from_bytes("v1"), Generation::NONE)
            .await
            .unwrap();

        let result = backend
            .store_blob(&key, stream_from_bytes("v2"), Generation::NONE)
            .await;
        assert_eq!(
            result,
            Err(BackendError::GenerationMismatch {
                expected: Generation::NONE,
                current: Generation(1),
            })
        );

        let (body, generation) = backend.load_blob(&key).await.unwrap();
        assert_eq!(generation, Generation(1));
        assert_eq!(collect_stream(body).await.unwrap(), Bytes::from("v1"));
    }

    #[tokio::test]
    async fn test_invalid_key_rejected() {
        let backend = MemoryBackend::new();
        let result = backend
            .store_blob(&BlobKey::new("u1", ".."), stream_from_bytes("x"), Generation::NONE)
            .await;
        assert!(matches!(result, Err(BackendError::InvalidKey(_))));
    }
}
