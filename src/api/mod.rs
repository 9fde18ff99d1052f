//
//  circleci
//  api/mod.rs
//

//! # API Layer
//!
//! This module contains the core HTTP client and one service module per
//! CircleCI API resource area.
//!
//! ## Architecture
//!
//! - [`client`]: Core client — configuration, request building, dispatch,
//!   response decoding, and status-code-to-error mapping
//! - [`common`]: Error taxonomy and shared response types (pagination)
//! - Resource modules ([`contexts`], [`pipelines`], [`projects`], [`jobs`],
//!   [`workflows`], [`insights`], [`webhooks`], [`schedules`], [`users`]):
//!   typed methods that validate required fields, compose a path, and delegate
//!   to the core client
//!
//! Resource services are cheap borrow-handles obtained from accessor methods
//! on [`Client`] (e.g. [`Client::contexts`]); they hold an explicit reference
//! to the client and no other state.

/// Core HTTP client: configuration, request building, and dispatch.
pub mod client;

/// Shared API types: the error taxonomy and pagination envelope.
pub mod common;

pub(crate) mod query;

/// Context management (shared environment variables).
pub mod contexts;

/// Pipeline queries and setup-workflow continuation.
pub mod pipelines;

/// Project settings: checkout keys, environment variables, pipeline triggers.
pub mod projects;

/// Job details, cancellation, and artifacts.
pub mod jobs;

/// Workflow queries, approval, cancellation, and reruns.
pub mod workflows;

/// Usage metrics for workflows (Insights endpoints).
pub mod insights;

/// Outbound webhook management.
pub mod webhooks;

/// Pipeline schedule queries.
pub mod schedules;

/// Current user and collaborations.
pub mod users;

pub use client::{Client, Config, Destination};
pub use common::{Error, Paged};

use common::Error as ApiError;

// Required-field checks shared by the resource services. Mirrors the
// "non-nil and non-empty" convention used throughout the v2 options structs.
pub(crate) fn valid_string(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

pub(crate) fn require(value: &str, message: &'static str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::Validation(message));
    }
    Ok(())
}
