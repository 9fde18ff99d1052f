//
//  circleci
//  lib.rs
//

//! # CircleCI API Client Library
//!
//! A typed Rust client for the [CircleCI API v2](https://circleci.com/docs/api/v2/).
//!
//! ## Overview
//!
//! This library provides request/response types and thin per-resource services
//! for the CircleCI v2 REST API: contexts, pipelines, projects, jobs,
//! workflows, insights, webhooks, schedules, and users.
//!
//! All wire handling is concentrated in a small core ([`Client`]): URL
//! resolution, query-string encoding, JSON bodies, authentication headers, and
//! status-code-to-error mapping. Resource services never build raw requests
//! themselves.
//!
//! ## Creating a Client
//!
//! ```rust,no_run
//! use circleci::{Client, Config};
//!
//! // Token read from the CIRCLECI_TOKEN environment variable.
//! let client = Client::new(Config::default())?;
//!
//! // Or configured explicitly.
//! let client = Client::new(Config {
//!     token: Some("your-token".to_string()),
//!     ..Config::default()
//! })?;
//! # Ok::<(), circleci::Error>(())
//! ```
//!
//! ## Making Requests
//!
//! Every call takes a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! so in-flight requests can be abandoned cooperatively:
//!
//! ```rust,no_run
//! use circleci::{Client, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), circleci::Error> {
//! let client = Client::new(Config::default())?;
//! let cancel = CancellationToken::new();
//!
//! let me = client.users().me(&cancel).await?;
//! println!("Logged in as {}", me.login);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pagination
//!
//! List endpoints return a [`Paged`](api::common::Paged) envelope. There is no
//! automatic iteration helper; pass the returned `next_page_token` back via
//! the endpoint's options to fetch the following page.
//!
//! ## Error Handling
//!
//! Every operation returns [`Error`]. Authorization failures and missing
//! resources are dedicated variants ([`Error::Unauthorized`],
//! [`Error::NotFound`]) so callers can branch without string matching. The
//! client performs no retries; transport errors surface immediately.

/// API client layer: core HTTP plumbing and per-resource services.
pub mod api;

pub use api::client::{Client, Config, Destination};
pub use api::common::Error;

/// Library version, derived from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
