//! Observable events
//!
//! Events are explicit and typed; their string form is the `event` field of
//! a log line.

use std::fmt;

use super::logger::Severity;

/// Observable events in blobgate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded
    ConfigLoaded,
    /// Server bound and serving
    Serving,
    /// Server failed to start (FATAL)
    ServerFailed,

    // Document transfer
    DocumentUploaded,
    DocumentDownloaded,

    // Blob transfer
    BlobLoaded,
    BlobStored,
    /// Upload lost the generation compare-and-swap
    BlobPreconditionFailed,
    /// Generation header present but not an integer
    GenerationHeaderMalformed,

    // Rejections and failures
    /// Token or signature rejected before reaching the backend
    RequestRejected,
    /// Backend reported an error
    BackendFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::Serving => "BLOBGATE_SERVING",
            Event::ServerFailed => "SERVER_FAILED",

            Event::DocumentUploaded => "DOCUMENT_UPLOADED",
            Event::DocumentDownloaded => "DOCUMENT_DOWNLOADED",

            Event::BlobLoaded => "BLOB_LOADED",
            Event::BlobStored => "BLOB_STORED",
            Event::BlobPreconditionFailed => "BLOB_PRECONDITION_FAILED",
            Event::GenerationHeaderMalformed => "GENERATION_HEADER_MALFORMED",

            Event::RequestRejected => "REQUEST_REJECTED",
            Event::BackendFailed => "BACKEND_FAILED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ServerFailed => Severity::Fatal,
            Event::BackendFailed => Severity::Error,
            Event::RequestRejected
            | Event::BlobPreconditionFailed
            | Event::GenerationHeaderMalformed => Severity::Warn,
            Event::DocumentDownloaded | Event::BlobLoaded => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::Serving,
            Event::ServerFailed,
            Event::DocumentUploaded,
            Event::DocumentDownloaded,
            Event::BlobLoaded,
            Event::BlobStored,
            Event::BlobPreconditionFailed,
            Event::GenerationHeaderMalformed,
            Event::RequestRejected,
            Event::BackendFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_severities() {
        assert_eq!(Event::ServerFailed.severity(), Severity::Fatal);
        assert_eq!(Event::BlobStored.severity(), Severity::Info);
        assert_eq!(Event::RequestRejected.severity(), Severity::Warn);
        assert_eq!(Event::BackendFailed.severity(), Severity::Error);
    }
}
