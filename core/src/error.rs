//! Error types for the remote client and the local store.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers distinguish "the task
//! does not exist" from "the server returned an unexpected status." All other
//! non-2xx responses land in `Http` with the raw status code and body.
//! Controllers never propagate these; they render them with `Display` into
//! the UI state's error message.

use thiserror::Error;

/// Errors from building, executing, or parsing remote API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested task does not exist.
    #[error("task not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// A 2xx response arrived without the body the operation requires.
    #[error("empty response body")]
    EmptyBody,

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request never produced a response (connect, DNS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote configuration cannot produce a working client.
    #[error("invalid remote config: {0}")]
    InvalidConfig(String),
}

/// Errors from the local SQLite store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
