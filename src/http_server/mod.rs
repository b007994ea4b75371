//! # HTTP Server Module
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/storage/{token}` - Whole-document transfer (claim token)
//! - `/blobstorage` - Blob transfer (signed URL, generation preconditions)

pub mod blob_routes;
pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod server;
pub mod state;
pub mod storage_routes;

pub use blob_routes::{GENERATION_HEADER, GENERATION_MATCH_HEADER};
pub use config::HttpServerConfig;
pub use errors::{ErrorResponse, GatewayError};
pub use server::HttpServer;
pub use state::AppState;
