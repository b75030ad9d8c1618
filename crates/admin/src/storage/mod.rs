//! Session cache adapter.
//!
//! Sessions are stored as JSON text under their session id. The adapter has
//! three operations and no retries or timeouts. Any transport
//! or decoding failure is surfaced to the caller as a [`SessionStorageError`].
//!
//! - [`RedisSessionStorage`] - External Redis server (production)
//! - [`MemorySessionStorage`] - Process-local map (tests, `SESSION_BACKEND=memory`)

mod memory;
mod redis;

pub use memory::MemorySessionStorage;
pub use redis::RedisSessionStorage;

use async_trait::async_trait;
use sticky_cart_core::Session;
use thiserror::Error;

/// Errors raised by a session storage backend.
#[derive(Debug, Error)]
pub enum SessionStorageError {
    /// Encoding the session to JSON failed.
    #[error("Encoding failed with: {0}")]
    Encode(String),

    /// A stored value is not a valid session record.
    #[error("Decoding failed with: {0}")]
    Decode(String),

    /// The cache server or connection failed.
    #[error("Session cache error: {0}")]
    Backend(String),
}

/// Persistent storage for shop sessions, keyed by session id.
#[async_trait]
pub trait SessionStorage: Send + Sync + 'static {
    /// Store a session under its id, overwriting any existing value.
    ///
    /// Returns `true` once the write is acknowledged.
    async fn store(&self, session: &Session) -> Result<bool, SessionStorageError>;

    /// Load the session stored under `id`, or `None` if there is none.
    async fn load(&self, id: &str) -> Result<Option<Session>, SessionStorageError>;

    /// Delete the session stored under `id`.
    ///
    /// Returns `true` if a session existed.
    async fn delete(&self, id: &str) -> Result<bool, SessionStorageError>;
}

pub(crate) fn encode_session(session: &Session) -> Result<String, SessionStorageError> {
    serde_json::to_string(session).map_err(|e| SessionStorageError::Encode(e.to_string()))
}

pub(crate) fn decode_session(value: &str) -> Result<Session, SessionStorageError> {
    serde_json::from_str(value).map_err(|e| SessionStorageError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_session("not json").unwrap_err();
        assert!(matches!(err, SessionStorageError::Decode(_)));
    }

    #[test]
    fn test_decode_accepts_camel_case_record() {
        let json = r#"{"id":"offline_a.myshopify.com","shop":"a.myshopify.com","state":"1","scope":"write_script_tags","accessToken":"shpat_1"}"#;
        let session = decode_session(json).unwrap();
        assert_eq!(session.access_token.as_deref(), Some("shpat_1"));
        assert_eq!(session.scope.as_deref(), Some("write_script_tags"));
    }
}
