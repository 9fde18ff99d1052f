//
//  circleci
//  api/workflows.rs
//

//! Workflow queries, approval, cancellation, and reruns.
//!
//! CircleCI API docs: <https://circleci.com/docs/api/v2/#tag/Workflow>

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::client::{Client, Destination};
use super::common::{Error, Paged};
use super::require;

/// Service handle for the workflow endpoints.
pub struct Workflows<'c> {
    client: &'c Client,
}

impl Client {
    /// The workflow service.
    pub fn workflows(&self) -> Workflows<'_> {
        Workflows { client: self }
    }
}

/// A workflow run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Workflow {
    pub pipeline_id: String,
    pub canceled_by: String,
    pub id: String,
    pub name: String,
    pub project_slug: String,
    pub errored_by: String,
    pub tag: String,
    /// Workflow status; left as raw JSON because the API is not consistent
    /// about its shape across endpoints.
    pub status: serde_json::Value,
    pub started_by: String,
    pub pipeline_number: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
}

/// A job within a workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowJob {
    pub id: String,
    pub canceled_by: String,
    pub dependencies: Vec<String>,
    pub job_number: i64,
    pub name: String,
    pub approved_by: String,
    pub project_slug: String,
    pub status: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub approval_request_id: String,
}

/// Options for [`Workflows::rerun`]. Nothing is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowRerunOptions {
    /// Rerun only these job IDs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<String>>,

    /// Rerun from the failed job onward.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_failed: Option<bool>,

    /// Only rerun the named `jobs` and their dependencies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse_tree: Option<bool>,
}

impl Workflows<'_> {
    /// Returns a workflow by ID.
    pub async fn get(&self, cancel: &CancellationToken, id: &str) -> Result<Workflow, Error> {
        require(id, "workflow ID is required")?;

        let path = format!("workflow/{id}");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut workflow = Workflow::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut workflow))
            .await?;
        Ok(workflow)
    }

    /// Approves a pending approval job in a workflow.
    pub async fn approve_job(
        &self,
        cancel: &CancellationToken,
        id: &str,
        approval_request_id: &str,
    ) -> Result<(), Error> {
        require(id, "workflow ID is required")?;
        require(
            approval_request_id,
            "approval request ID (the ID of the job being approved) is required",
        )?;

        let path = format!("workflow/{id}/approve/{approval_request_id}");
        let request = self.client.build_request::<()>(Method::POST, &path, None)?;

        self.client
            .execute::<()>(cancel, request, Destination::Discard)
            .await
    }

    /// Cancels a running workflow.
    pub async fn cancel(&self, cancel: &CancellationToken, id: &str) -> Result<(), Error> {
        require(id, "workflow ID is required")?;

        let path = format!("workflow/{id}/cancel");
        let request = self.client.build_request::<()>(Method::POST, &path, None)?;

        self.client
            .execute::<()>(cancel, request, Destination::Discard)
            .await
    }

    /// Lists the jobs of a workflow.
    pub async fn list_jobs(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> Result<Paged<WorkflowJob>, Error> {
        require(id, "workflow ID is required")?;

        let path = format!("workflow/{id}/job");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }

    /// Reruns a workflow, optionally restricted to a set of jobs.
    pub async fn rerun(
        &self,
        cancel: &CancellationToken,
        id: &str,
        options: WorkflowRerunOptions,
    ) -> Result<(), Error> {
        require(id, "workflow ID is required")?;

        let path = format!("workflow/{id}/rerun");
        let request = self
            .client
            .build_request(Method::POST, &path, Some(&options))?;

        self.client
            .execute::<()>(cancel, request, Destination::Discard)
            .await
    }
}
