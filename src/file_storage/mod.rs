//! # File Storage
//!
//! The storage backend contract used by the transfer handlers, plus a
//! filesystem and an in-memory implementation.

pub mod backend;
pub mod errors;
pub mod local;
pub mod memory;

pub use backend::{
    collect_stream, stream_from_bytes, BackendFuture, BlobKey, ByteStream, Generation,
    StorageBackend,
};
pub use errors::{BackendError, BackendResult};
pub use local::LocalBackend;
pub use memory::MemoryBackend;
