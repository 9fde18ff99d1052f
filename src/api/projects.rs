//
//  circleci
//  api/projects.rs
//

//! Project settings: checkout keys, environment variables, and pipeline
//! triggers.
//!
//! Project slugs take the form `{vcs}/{org}/{repo}`, e.g. `gh/acme/widget`;
//! the embedded slashes are path segments, not a single encoded value.
//!
//! CircleCI API docs: <https://circleci.com/docs/api/v2/#tag/Project>

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::client::{Client, Destination};
use super::common::{Error, Paged};
use super::pipelines::Pipeline;
use super::require;

/// Service handle for the project endpoints.
pub struct Projects<'c> {
    client: &'c Client,
}

impl Client {
    /// The project service.
    pub fn projects(&self) -> Projects<'_> {
        Projects { client: self }
    }
}

/// A CircleCI project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub organization_name: String,
    pub vcs_info: Option<VcsInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VcsInfo {
    pub vcs_url: String,
    pub provider: String,
    pub default_branch: String,
}

/// The kind of checkout key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutKeyType {
    #[serde(rename = "user-key")]
    UserKey,
    #[serde(rename = "deploy-key")]
    DeployKey,
}

/// An SSH key used to check the project's sources out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectCheckoutKey {
    // Documentation says `public-key`, but the API returns `public_key`.
    // Same for `created_at`.
    pub public_key: String,
    #[serde(rename = "type")]
    pub key_type: Option<CheckoutKeyType>,
    pub fingerprint: String,
    pub preferred: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// A project environment variable. Values come back masked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectVariable {
    pub name: String,
    pub value: String,
}

/// Options for [`Projects::create_checkout_key`]. The key type is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectCreateCheckoutKeyOptions {
    #[serde(rename = "type")]
    pub key_type: Option<CheckoutKeyType>,
}

impl ProjectCreateCheckoutKeyOptions {
    fn validate(&self) -> Result<(), Error> {
        if self.key_type.is_none() {
            return Err(Error::Validation("project checkout key type is required"));
        }
        Ok(())
    }
}

/// Options for [`Projects::create_variable`]. Name and value are required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectCreateVariableOptions {
    pub name: String,
    pub value: String,
}

impl ProjectCreateVariableOptions {
    fn validate(&self) -> Result<(), Error> {
        require(&self.name, "project variable name is required")?;
        require(&self.value, "project variable value is required")
    }
}

/// Options for [`Projects::trigger_pipeline`]. Nothing is required; `branch`
/// and `tag` are mutually exclusive server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectTriggerPipelineOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Options for [`Projects::list_pipelines`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectListPipelinesOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(rename = "page-token", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// Options for [`Projects::list_my_pipelines`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectListMyPipelinesOptions {
    #[serde(rename = "page-token", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl Projects<'_> {
    /// Returns a project by slug.
    pub async fn get(&self, cancel: &CancellationToken, project_slug: &str) -> Result<Project, Error> {
        require(project_slug, "project slug is required")?;

        let path = format!("project/{project_slug}");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut project = Project::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut project))
            .await?;
        Ok(project)
    }

    /// Creates a checkout key for a project.
    pub async fn create_checkout_key(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        options: ProjectCreateCheckoutKeyOptions,
    ) -> Result<ProjectCheckoutKey, Error> {
        options.validate()?;
        require(project_slug, "project slug is required")?;

        let path = format!("project/{project_slug}/checkout-key");
        let request = self
            .client
            .build_request(Method::POST, &path, Some(&options))?;

        let mut key = ProjectCheckoutKey::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut key))
            .await?;
        Ok(key)
    }

    /// Lists the checkout keys of a project.
    pub async fn list_checkout_keys(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
    ) -> Result<Paged<ProjectCheckoutKey>, Error> {
        require(project_slug, "project slug is required")?;

        let path = format!("project/{project_slug}/checkout-key");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }

    /// Returns a checkout key by fingerprint.
    pub async fn get_checkout_key(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        fingerprint: &str,
    ) -> Result<ProjectCheckoutKey, Error> {
        require(project_slug, "project slug is required")?;
        require(fingerprint, "project checkout key fingerprint is required")?;

        let path = format!("project/{project_slug}/checkout-key/{fingerprint}");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut key = ProjectCheckoutKey::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut key))
            .await?;
        Ok(key)
    }

    /// Deletes a checkout key.
    pub async fn delete_checkout_key(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        fingerprint: &str,
    ) -> Result<(), Error> {
        require(project_slug, "project slug is required")?;
        require(fingerprint, "project checkout key fingerprint is required")?;

        let path = format!("project/{project_slug}/checkout-key/{fingerprint}");
        let request = self.client.build_request::<()>(Method::DELETE, &path, None)?;

        self.client
            .execute::<()>(cancel, request, Destination::Discard)
            .await
    }

    /// Creates an environment variable on a project.
    pub async fn create_variable(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        options: ProjectCreateVariableOptions,
    ) -> Result<ProjectVariable, Error> {
        options.validate()?;
        require(project_slug, "project slug is required")?;

        let path = format!("project/{project_slug}/envvar");
        let request = self
            .client
            .build_request(Method::POST, &path, Some(&options))?;

        let mut variable = ProjectVariable::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut variable))
            .await?;
        Ok(variable)
    }

    /// Lists the environment variables of a project (values masked).
    pub async fn list_variables(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
    ) -> Result<Paged<ProjectVariable>, Error> {
        require(project_slug, "project slug is required")?;

        let path = format!("project/{project_slug}/envvar");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }

    /// Deletes an environment variable from a project.
    pub async fn delete_variable(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        name: &str,
    ) -> Result<(), Error> {
        require(project_slug, "project slug is required")?;
        require(name, "project variable name is required")?;

        let path = format!("project/{project_slug}/envvar/{name}");
        let request = self.client.build_request::<()>(Method::DELETE, &path, None)?;

        self.client
            .execute::<()>(cancel, request, Destination::Discard)
            .await
    }

    /// Returns a masked environment variable by name.
    pub async fn get_variable(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        name: &str,
    ) -> Result<ProjectVariable, Error> {
        require(project_slug, "project slug is required")?;
        require(name, "project variable name is required")?;

        let path = format!("project/{project_slug}/envvar/{name}");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut variable = ProjectVariable::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut variable))
            .await?;
        Ok(variable)
    }

    /// Triggers a new pipeline on the project.
    pub async fn trigger_pipeline(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        options: ProjectTriggerPipelineOptions,
    ) -> Result<Pipeline, Error> {
        require(project_slug, "project slug is required")?;

        let path = format!("project/{project_slug}/pipeline");
        let request = self
            .client
            .build_request(Method::POST, &path, Some(&options))?;

        let mut pipeline = Pipeline::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut pipeline))
            .await?;
        Ok(pipeline)
    }

    /// Lists the project's pipelines, most recent first.
    pub async fn list_pipelines(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        options: ProjectListPipelinesOptions,
    ) -> Result<Paged<Pipeline>, Error> {
        require(project_slug, "project slug is required")?;

        let path = format!("project/{project_slug}/pipeline");
        let request = self
            .client
            .build_request(Method::GET, &path, Some(&options))?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }

    /// Lists the current user's pipelines on the project.
    pub async fn list_my_pipelines(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        options: ProjectListMyPipelinesOptions,
    ) -> Result<Paged<Pipeline>, Error> {
        require(project_slug, "project slug is required")?;

        let path = format!("project/{project_slug}/pipeline/mine");
        let request = self
            .client
            .build_request(Method::GET, &path, Some(&options))?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }

    /// Returns a pipeline by its number within the project.
    pub async fn get_pipeline(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        pipeline_number: &str,
    ) -> Result<Pipeline, Error> {
        require(project_slug, "project slug is required")?;
        require(pipeline_number, "pipeline number is required")?;

        let path = format!("project/{project_slug}/pipeline/{pipeline_number}");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut pipeline = Pipeline::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut pipeline))
            .await?;
        Ok(pipeline)
    }
}
