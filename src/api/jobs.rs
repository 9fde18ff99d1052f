//
//  circleci
//  api/jobs.rs
//

//! Job details, cancellation, and artifacts.
//!
//! CircleCI API docs: <https://circleci.com/docs/api/v2/#tag/Job>

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::client::{Client, Destination};
use super::common::{Error, Paged};
use super::require;

/// Service handle for the job endpoints.
pub struct Jobs<'c> {
    client: &'c Client,
}

impl Client {
    /// The job service.
    pub fn jobs(&self) -> Jobs<'_> {
        Jobs { client: self }
    }
}

/// Job details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    pub web_url: String,
    pub project: Option<JobProject>,
    pub parallel_runs: Vec<ParallelRun>,
    pub started_at: Option<DateTime<Utc>>,
    pub latest_workflow: Option<LatestWorkflow>,
    pub name: String,
    pub executor: Option<Executor>,
    pub parallelism: i64,
    /// Job status; left as raw JSON because the API is not consistent about
    /// its shape across endpoints.
    pub status: serde_json::Value,
    pub number: i64,
    pub pipeline: Option<JobPipeline>,
    pub duration: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub messages: Vec<JobMessage>,
    pub contexts: Vec<JobContext>,
    pub organization: Option<Organization>,
    pub queued_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobProject {
    pub slug: String,
    pub name: String,
    pub external_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelRun {
    pub index: i64,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LatestWorkflow {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Executor {
    #[serde(rename = "type")]
    pub executor_type: String,
    pub resource_class: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobPipeline {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub message: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobContext {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub name: String,
}

/// An artifact produced by a job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Artifact {
    pub path: String,
    pub node_index: i64,
    /// Absolute download URL.
    pub url: String,
}

impl Jobs<'_> {
    /// Returns job details by project slug and job number.
    pub async fn get(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        job_number: &str,
    ) -> Result<Job, Error> {
        require(project_slug, "project slug is required")?;
        require(job_number, "job number is required")?;

        let path = format!("project/{project_slug}/job/{job_number}");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut job = Job::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut job))
            .await?;
        Ok(job)
    }

    /// Cancels a running job.
    pub async fn cancel(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        job_number: &str,
    ) -> Result<(), Error> {
        require(project_slug, "project slug is required")?;
        require(job_number, "job number is required")?;

        let path = format!("project/{project_slug}/job/{job_number}/cancel");
        let request = self.client.build_request::<()>(Method::POST, &path, None)?;

        self.client
            .execute::<()>(cancel, request, Destination::Discard)
            .await
    }

    /// Lists the artifacts a job produced.
    pub async fn list_artifacts(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        job_number: &str,
    ) -> Result<Paged<Artifact>, Error> {
        require(project_slug, "project slug is required")?;
        require(job_number, "job number is required")?;

        let path = format!("project/{project_slug}/{job_number}/artifacts");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }

    /// Downloads an artifact's contents into `sink`.
    ///
    /// Artifact URLs are absolute (they point at a storage host, not the API
    /// origin); the request still carries the usual auth headers.
    pub async fn download_artifact(
        &self,
        cancel: &CancellationToken,
        artifact: &Artifact,
        sink: &mut (dyn std::io::Write + Send),
    ) -> Result<(), Error> {
        require(&artifact.url, "artifact URL is required")?;

        let request = self
            .client
            .build_request::<()>(Method::GET, &artifact.url, None)?;

        self.client
            .execute::<()>(cancel, request, Destination::Raw(sink))
            .await
    }
}
