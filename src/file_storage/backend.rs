//! # Storage Backend Trait
//!
//! The contract between the transfer handlers and whatever persists bytes.
//!
//! ## Generation protocol
//! `store_blob` is a compare-and-swap: it writes only when the caller's
//! expected generation equals the stored one (an absent blob is at
//! generation 0) and then assigns the next generation. On mismatch it
//! writes nothing and returns `GenerationMismatch`.

use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_util::{stream, Stream, StreamExt};

use super::errors::{BackendError, BackendResult};

/// Streamed object body
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Boxed backend future
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = BackendResult<T>> + Send + 'a>>;

/// Backend-assigned blob version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub i64);

impl Generation {
    /// Generation of a blob that has never been written
    pub const NONE: Generation = Generation(0);

    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Addressing unit for generation checks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey {
    pub user_id: String,
    pub blob_id: String,
}

impl BlobKey {
    pub fn new(user_id: impl Into<String>, blob_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            blob_id: blob_id.into(),
        }
    }

    /// Reject keys that could leave the user's namespace
    pub fn validate(&self) -> BackendResult<()> {
        validate_component(&self.user_id)?;
        validate_component(&self.blob_id)
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.blob_id)
    }
}

/// A key component must be a single, ordinary path segment
pub fn validate_component(component: &str) -> BackendResult<()> {
    let invalid = component.is_empty()
        || component == "."
        || component == ".."
        || component.contains(['/', '\\', '\0']);

    if invalid {
        return Err(BackendError::InvalidKey(component.to_string()));
    }
    Ok(())
}

/// Backend trait for document and blob storage
pub trait StorageBackend: Send + Sync + fmt::Debug {
    /// Persist a whole document, replacing any previous content
    fn store_document<'a>(
        &'a self,
        user_id: &'a str,
        document_id: &'a str,
        body: ByteStream,
    ) -> BackendFuture<'a, ()>;

    /// Open a document for streaming
    fn get_document<'a>(
        &'a self,
        user_id: &'a str,
        document_id: &'a str,
    ) -> BackendFuture<'a, ByteStream>;

    /// Open a blob for streaming along with its current generation
    fn load_blob<'a>(&'a self, key: &'a BlobKey) -> BackendFuture<'a, (ByteStream, Generation)>;

    /// Compare-and-swap write; returns the new generation
    fn store_blob<'a>(
        &'a self,
        key: &'a BlobKey,
        body: ByteStream,
        expected: Generation,
    ) -> BackendFuture<'a, Generation>;

    /// Current generation of a blob (`Generation::NONE` when absent)
    fn generation<'a>(&'a self, key: &'a BlobKey) -> BackendFuture<'a, Generation>;
}

/// Wrap in-memory bytes as a body stream
pub fn stream_from_bytes(data: impl Into<Bytes>) -> ByteStream {
    let data = data.into();
    Box::pin(stream::once(async move { Ok(data) }))
}

/// Drain a body stream into memory
pub async fn collect_stream(mut body: ByteStream) -> io::Result<Bytes> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = body.next().await {
        buffer.extend_from_slice(&chunk?);
    }
    Ok(buffer.freeze())
}
