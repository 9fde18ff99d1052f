//
//  circleci
//  api/contexts.rs
//

//! Context management.
//!
//! Contexts are named collections of environment variables shared across
//! projects in an organization. Variable values are write-only: the API
//! returns metadata about variables, never their values.
//!
//! CircleCI API docs: <https://circleci.com/docs/api/v2/#tag/Context>
//!
//! # Example
//!
//! ```rust,no_run
//! use circleci::{Client, Config};
//! use circleci::api::contexts::{ContextCreateOptions, OwnerOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), circleci::Error> {
//! let client = Client::new(Config::default())?;
//! let cancel = CancellationToken::new();
//!
//! let context = client
//!     .contexts()
//!     .create(&cancel, ContextCreateOptions {
//!         name: "deploy".to_string(),
//!         owner: OwnerOptions {
//!             slug: Some("gh/acme".to_string()),
//!             ..OwnerOptions::default()
//!         },
//!     })
//!     .await?;
//! println!("created context {}", context.id);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::client::{Client, Destination};
use super::common::{Error, Paged};
use super::{require, valid_string};

/// Service handle for the context endpoints.
pub struct Contexts<'c> {
    client: &'c Client,
}

impl Client {
    /// The context service.
    pub fn contexts(&self) -> Contexts<'_> {
        Contexts { client: self }
    }
}

/// A CircleCI context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// An environment variable inside a context. The value is never returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextVariable {
    pub variable: String,
    pub created_at: Option<DateTime<Utc>>,
    pub context_id: String,
}

/// Options for [`Contexts::list`]. Either `owner_id` or `owner_slug` is
/// required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContextListOptions {
    /// The unique ID of the owner of the contexts. Specify either this or
    /// `owner_slug`.
    #[serde(rename = "owner-id", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    /// Organization slug, e.g. `gh/acme`. Specify either this or `owner_id`.
    #[serde(rename = "owner-slug", skip_serializing_if = "Option::is_none")]
    pub owner_slug: Option<String>,

    /// `account` or `organization`. Accounts are only used as context owners
    /// in server installations.
    #[serde(rename = "owner-type", skip_serializing_if = "Option::is_none")]
    pub owner_type: Option<String>,

    /// Cursor from a previous page.
    #[serde(rename = "page-token", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl ContextListOptions {
    fn validate(&self) -> Result<(), Error> {
        if !valid_string(self.owner_id.as_deref()) && !valid_string(self.owner_slug.as_deref()) {
            return Err(Error::Validation(
                "either organization ID or slug is required",
            ));
        }
        Ok(())
    }
}

/// Options for [`Contexts::create`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContextCreateOptions {
    /// The context name.
    pub name: String,

    /// The organization or account owning the context.
    pub owner: OwnerOptions,
}

/// Owner of a context; either `id` or `slug` is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OwnerOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// `account` or `organization`; defaults server-side to `organization`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub owner_type: Option<String>,
}

impl ContextCreateOptions {
    fn validate(&self) -> Result<(), Error> {
        if !valid_string(self.owner.id.as_deref()) && !valid_string(self.owner.slug.as_deref()) {
            return Err(Error::Validation(
                "either organization ID or slug is required",
            ));
        }
        Ok(())
    }
}

/// Options for [`Contexts::add_or_update_variable`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddOrUpdateVariableOptions {
    /// The value to store. Required.
    pub value: String,
}

impl AddOrUpdateVariableOptions {
    fn validate(&self) -> Result<(), Error> {
        require(&self.value, "missing environment variable value")
    }
}

impl Contexts<'_> {
    /// Lists contexts for an owner.
    pub async fn list(
        &self,
        cancel: &CancellationToken,
        options: ContextListOptions,
    ) -> Result<Paged<Context>, Error> {
        options.validate()?;

        let request = self
            .client
            .build_request(Method::GET, "context", Some(&options))?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }

    /// Returns basic information about a context.
    pub async fn get(&self, cancel: &CancellationToken, context_id: &str) -> Result<Context, Error> {
        require(context_id, "context ID is required")?;

        let path = format!("context/{context_id}");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut context = Context::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut context))
            .await?;
        Ok(context)
    }

    /// Creates a new context.
    pub async fn create(
        &self,
        cancel: &CancellationToken,
        options: ContextCreateOptions,
    ) -> Result<Context, Error> {
        options.validate()?;

        let request = self
            .client
            .build_request(Method::POST, "context", Some(&options))?;

        let mut context = Context::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut context))
            .await?;
        Ok(context)
    }

    /// Deletes a context.
    pub async fn delete(&self, cancel: &CancellationToken, context_id: &str) -> Result<(), Error> {
        require(context_id, "context ID is required")?;

        let path = format!("context/{context_id}");
        let request = self.client.build_request::<()>(Method::DELETE, &path, None)?;

        self.client
            .execute::<()>(cancel, request, Destination::Discard)
            .await
    }

    /// Lists the environment variables in a context, without their values.
    pub async fn list_variables(
        &self,
        cancel: &CancellationToken,
        context_id: &str,
    ) -> Result<Paged<ContextVariable>, Error> {
        require(context_id, "context ID is required")?;

        let path = format!("context/{context_id}/environment-variable");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }

    /// Deletes an environment variable from a context.
    pub async fn remove_variable(
        &self,
        cancel: &CancellationToken,
        context_id: &str,
        variable_name: &str,
    ) -> Result<(), Error> {
        require(context_id, "context ID is required")?;
        require(variable_name, "environment variable name is required")?;

        let path = format!("context/{context_id}/environment-variable/{variable_name}");
        let request = self.client.build_request::<()>(Method::DELETE, &path, None)?;

        self.client
            .execute::<()>(cancel, request, Destination::Discard)
            .await
    }

    /// Creates or updates an environment variable within a context. The
    /// returned metadata never includes the value.
    pub async fn add_or_update_variable(
        &self,
        cancel: &CancellationToken,
        context_id: &str,
        variable_name: &str,
        options: AddOrUpdateVariableOptions,
    ) -> Result<ContextVariable, Error> {
        options.validate()?;
        require(context_id, "context ID is required")?;
        require(variable_name, "environment variable name is required")?;

        let path = format!("context/{context_id}/environment-variable/{variable_name}");
        let request = self
            .client
            .build_request(Method::PUT, &path, Some(&options))?;

        let mut variable = ContextVariable::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut variable))
            .await?;
        Ok(variable)
    }
}
