//! Observability subsystem
//!
//! Structured JSON logging of lifecycle and request events.
//!
//! # Usage
//!
//! ```ignore
//! use blobgate::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::BlobStored, &[("generation", "2")]);
//! ```
//!
//! Never pass secrets, tokens or signatures as fields.

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event_with_fields(Event::BlobStored, &[("generation", "1")]);
    }
}
