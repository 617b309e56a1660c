//! Unique identifier generation for connector requests

use std::fmt::Debug;

/// Source of the job and transaction identifiers attached to outgoing requests.
///
/// Implementations must be safe to share between threads; every call is
/// expected to return a value that has not been handed out before.
pub trait IdGenerator: Debug + Send + Sync {
    /// Produce the next unique identifier
    fn next_unique_id(&self) -> String;
}

/// Random v4 UUIDs rendered as 32 lower-case hex characters
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_unique_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}
