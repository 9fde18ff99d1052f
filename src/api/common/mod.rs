//
//  circleci
//  api/common/mod.rs
//

//! Shared API types: the error taxonomy and the pagination envelope.
//!
//! # Overview
//!
//! Every public operation in this crate returns [`Error`]. The variants fall
//! into a handful of groups:
//!
//! | Group | Variants | Raised by |
//! |-------|----------|-----------|
//! | Configuration | `InvalidAddress`, `MissingToken` | [`Client::new`](crate::Client::new) |
//! | Encoding | `BadPath`, `Serialization` | request building, response decoding |
//! | Transport | `Transport`, `Cancelled`, `Io` | dispatch |
//! | API status | `Unauthorized`, `NotFound`, `Api` | status classification |
//! | Resource layer | `Validation` | required-field checks in service methods |
//!
//! Configuration errors are fatal and raised at construction. Encoding errors
//! indicate a caller-input problem. None of these are ever retried by the
//! client; retry policy belongs to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod pagination;

pub use pagination::Paged;

/// Unified error type for all CircleCI API operations.
///
/// `Unauthorized` and `NotFound` are fixed variants (no payload) so callers
/// can branch on authentication and missing-resource failures without
/// matching on message strings.
///
/// # Example
///
/// ```rust
/// use circleci::Error;
///
/// fn describe(err: &Error) -> &'static str {
///     match err {
///         Error::Unauthorized => "check your API token",
///         Error::NotFound => "no such resource",
///         Error::Api(_) => "the API rejected the request",
///         _ => "request failed",
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The configured base address does not parse as an absolute URL.
    #[error("invalid address: {0}")]
    InvalidAddress(#[source] url::ParseError),

    /// No API token was supplied and `CIRCLECI_TOKEN` is unset, or the token
    /// contains bytes that cannot be carried in an HTTP header.
    #[error("API token is required")]
    MissingToken,

    /// The relative request path could not be resolved against the base URL.
    #[error("invalid request path: {0}")]
    BadPath(#[source] url::ParseError),

    /// A request payload could not be encoded, or a response body could not
    /// be decoded as JSON.
    #[error("JSON serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A network-level failure from the underlying HTTP transport.
    ///
    /// The client never retries; surface-as-is.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The call's cancellation token was triggered.
    ///
    /// Takes priority over [`Error::Transport`] when both apply: a transport
    /// failure observed while the token is cancelled reports as `Cancelled`.
    #[error("request cancelled")]
    Cancelled,

    /// The API answered 401. The response body is not consulted.
    #[error("unauthorized")]
    Unauthorized,

    /// The API answered 404. The response body is not consulted.
    #[error("not found")]
    NotFound,

    /// Any other non-2xx status. Carries the server's `{"message": …}` when
    /// the error envelope parses, otherwise the HTTP status line
    /// (e.g. `500 Internal Server Error`).
    #[error("{0}")]
    Api(String),

    /// A required field was missing or empty. Raised by the resource-service
    /// layer before any request is built; no network I/O has occurred.
    #[error("{0}")]
    Validation(&'static str),

    /// Writing a raw response body into the caller's sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The error envelope the v2 API returns for most non-2xx statuses.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorResponse {
    pub message: String,
}
