//! blobgate - Authenticated document and blob transfer gateway
//!
//! Documents are addressed by a storage claim token. Blobs are addressed by
//! HMAC-signed URLs and overwritten only under a generation precondition.

pub mod claims;
pub mod cli;
pub mod config;
pub mod file_storage;
pub mod http_server;
pub mod observability;
pub mod signing;
