//
//  circleci
//  api/webhooks.rs
//

//! Outbound webhook management.
//!
//! CircleCI API docs: <https://circleci.com/docs/api/v2/#tag/Webhook>

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::client::{Client, Destination};
use super::common::{Error, Paged};
use super::require;

/// Service handle for the webhook endpoints.
pub struct Webhooks<'c> {
    client: &'c Client,
}

impl Client {
    /// The webhook service.
    pub fn webhooks(&self) -> Webhooks<'_> {
        Webhooks { client: self }
    }
}

/// An outbound webhook registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Webhook {
    pub id: String,
    pub name: String,
    pub url: String,
    pub events: Vec<Event>,
    pub scope: Option<Scope>,
    #[serde(rename = "signing-secret")]
    pub signing_secret: String,
    #[serde(rename = "verify-tls")]
    pub verify_tls: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// What a webhook is attached to. Currently only projects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scope {
    pub id: String,
    #[serde(rename = "type")]
    pub scope_type: String,
}

/// Events a webhook can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    #[serde(rename = "workflow-completed")]
    WorkflowCompleted,
    #[serde(rename = "job-completed")]
    JobCompleted,
}

/// Options for [`Webhooks::list`]. Both fields are required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WebhookListOptions {
    #[serde(rename = "scope-id")]
    pub scope_id: String,
    #[serde(rename = "scope-type")]
    pub scope_type: String,
}

impl WebhookListOptions {
    fn validate(&self) -> Result<(), Error> {
        require(&self.scope_id, "webhook scope ID is required")?;
        require(&self.scope_type, "webhook scope type is required")
    }
}

/// Options for [`Webhooks::create`]. Every field is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WebhookCreateOptions {
    pub name: String,
    pub events: Vec<Event>,
    pub url: String,
    #[serde(rename = "verify-tls")]
    pub verify_tls: Option<bool>,
    #[serde(rename = "signing-secret")]
    pub signing_secret: String,
    pub scope: Scope,
}

impl WebhookCreateOptions {
    fn validate(&self) -> Result<(), Error> {
        require(&self.name, "webhook name is required")?;
        if self.events.is_empty() {
            return Err(Error::Validation("webhook events are required"));
        }
        require(&self.url, "webhook URL is required")?;
        if self.verify_tls.is_none() {
            return Err(Error::Validation("webhook verify-tls flag is required"));
        }
        require(&self.signing_secret, "webhook signing secret is required")?;
        require(&self.scope.id, "webhook scope ID is required")?;
        require(&self.scope.scope_type, "webhook scope type is required")
    }
}

impl Webhooks<'_> {
    /// Returns a webhook by ID.
    pub async fn get(&self, cancel: &CancellationToken, id: &str) -> Result<Webhook, Error> {
        require(id, "webhook ID is required")?;

        let path = format!("webhook/{id}");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut webhook = Webhook::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut webhook))
            .await?;
        Ok(webhook)
    }

    /// Lists the webhooks registered for a scope.
    pub async fn list(
        &self,
        cancel: &CancellationToken,
        options: WebhookListOptions,
    ) -> Result<Paged<Webhook>, Error> {
        options.validate()?;

        let request = self
            .client
            .build_request(Method::GET, "webhook", Some(&options))?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }

    /// Registers a new webhook.
    pub async fn create(
        &self,
        cancel: &CancellationToken,
        options: WebhookCreateOptions,
    ) -> Result<Webhook, Error> {
        options.validate()?;

        let request = self
            .client
            .build_request(Method::POST, "webhook", Some(&options))?;

        let mut webhook = Webhook::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut webhook))
            .await?;
        Ok(webhook)
    }
}
