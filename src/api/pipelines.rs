//
//  circleci
//  api/pipelines.rs
//

//! Pipeline queries and setup-workflow continuation.
//!
//! CircleCI API docs: <https://circleci.com/docs/api/v2/#tag/Pipeline>

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::client::{Client, Destination};
use super::common::{Error, Paged};
use super::require;
use super::workflows::Workflow;

/// Service handle for the pipeline endpoints.
pub struct Pipelines<'c> {
    client: &'c Client,
}

impl Client {
    /// The pipeline service.
    pub fn pipelines(&self) -> Pipelines<'_> {
        Pipelines { client: self }
    }
}

/// A pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pipeline {
    pub id: String,
    pub project_slug: String,
    pub state: String,
    pub number: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub trigger: Option<Trigger>,
    pub vcs: Option<Vcs>,
    pub errors: Vec<PipelineError>,
}

/// What started a pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Trigger {
    #[serde(rename = "type")]
    pub trigger_type: String,
    pub received_at: Option<DateTime<Utc>>,
    pub actor: Option<Actor>,
}

/// The user a trigger or schedule acts as.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub login: String,
    pub avatar_url: String,
}

/// VCS details for the revision a pipeline ran against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vcs {
    pub provider_name: String,
    pub target_repository_url: String,
    pub branch: Option<String>,
    pub review_id: Option<String>,
    pub review_url: Option<String>,
    pub revision: String,
    pub tag: Option<String>,
    pub origin_repository_url: String,
    pub commit: Option<Commit>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Commit {
    pub subject: String,
    pub body: String,
}

/// An error attached to a pipeline (e.g. a config compilation failure).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// The configuration a pipeline ran with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: String,
    pub compiled: String,
    #[serde(rename = "setup-config")]
    pub setup_config: String,
    #[serde(rename = "compiled-setup-config")]
    pub compiled_setup_config: String,
}

/// Options for [`Pipelines::list`]. Nothing is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineListOptions {
    /// Organization slug, e.g. `gh/acme`.
    #[serde(rename = "org-slug", skip_serializing_if = "Option::is_none")]
    pub org_slug: Option<String>,

    /// Only pipelines triggered by the current user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mine: Option<bool>,

    #[serde(rename = "page-token", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// Options for [`Pipelines::r#continue`]. The continuation key and the
/// configuration are required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineContinueOptions {
    /// Continuation key issued to the setup workflow.
    #[serde(rename = "continuation-key")]
    pub continuation_key: String,

    /// The full configuration to continue the pipeline with.
    pub configuration: String,

    /// Pipeline parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Map<String, serde_json::Value>>,
}

impl PipelineContinueOptions {
    fn validate(&self) -> Result<(), Error> {
        require(
            &self.continuation_key,
            "pipeline continuation key is required",
        )?;
        require(&self.configuration, "pipeline configuration is required")
    }
}

/// Options for [`Pipelines::list_workflows`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineListWorkflowsOptions {
    #[serde(rename = "page-token", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl Pipelines<'_> {
    /// Lists recent pipelines across the organizations the user belongs to.
    pub async fn list(
        &self,
        cancel: &CancellationToken,
        options: PipelineListOptions,
    ) -> Result<Paged<Pipeline>, Error> {
        let request = self
            .client
            .build_request(Method::GET, "pipeline", Some(&options))?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }

    /// Continues a setup pipeline with a full configuration.
    pub async fn r#continue(
        &self,
        cancel: &CancellationToken,
        options: PipelineContinueOptions,
    ) -> Result<(), Error> {
        options.validate()?;

        let request =
            self.client
                .build_request(Method::POST, "pipeline/continue", Some(&options))?;

        self.client
            .execute::<()>(cancel, request, Destination::Discard)
            .await
    }

    /// Returns a pipeline by ID.
    pub async fn get(
        &self,
        cancel: &CancellationToken,
        pipeline_id: &str,
    ) -> Result<Pipeline, Error> {
        require(pipeline_id, "pipeline ID is required")?;

        let path = format!("pipeline/{pipeline_id}");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut pipeline = Pipeline::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut pipeline))
            .await?;
        Ok(pipeline)
    }

    /// Returns the configuration a pipeline ran with.
    pub async fn get_config(
        &self,
        cancel: &CancellationToken,
        pipeline_id: &str,
    ) -> Result<PipelineConfig, Error> {
        require(pipeline_id, "pipeline ID is required")?;

        let path = format!("pipeline/{pipeline_id}/config");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut config = PipelineConfig::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut config))
            .await?;
        Ok(config)
    }

    /// Lists the workflows of a pipeline.
    pub async fn list_workflows(
        &self,
        cancel: &CancellationToken,
        pipeline_id: &str,
        options: PipelineListWorkflowsOptions,
    ) -> Result<Paged<Workflow>, Error> {
        require(pipeline_id, "pipeline ID is required")?;

        let path = format!("pipeline/{pipeline_id}/workflow");
        let request = self
            .client
            .build_request(Method::GET, &path, Some(&options))?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testutil::test_client;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_list() {
        let (mut server, client) = test_client().await;
        let mock = server
            .mock("GET", "/api/v2/pipeline")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("org-slug".into(), "gh/acme".into()),
                Matcher::UrlEncoded("mine".into(), "true".into()),
            ]))
            .with_body(r#"{"items": [{"id": "p1", "state": "created"}]}"#)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let list = client
            .pipelines()
            .list(
                &cancel,
                PipelineListOptions {
                    org_slug: Some("gh/acme".to_string()),
                    mine: Some(true),
                    ..PipelineListOptions::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(list.items[0].id, "p1");
        assert_eq!(list.items[0].state, "created");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_continue_requires_key_and_configuration() {
        let (_server, client) = test_client().await;
        let cancel = CancellationToken::new();

        let err = client
            .pipelines()
            .r#continue(
                &cancel,
                PipelineContinueOptions {
                    configuration: "version: 2.1".to_string(),
                    ..PipelineContinueOptions::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation("pipeline continuation key is required")
        ));

        let err = client
            .pipelines()
            .r#continue(
                &cancel,
                PipelineContinueOptions {
                    continuation_key: "key".to_string(),
                    ..PipelineContinueOptions::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation("pipeline configuration is required")
        ));
    }

    #[tokio::test]
    async fn test_get_config() {
        let (mut server, client) = test_client().await;
        let mock = server
            .mock("GET", "/api/v2/pipeline/p1/config")
            .with_body(r#"{"source": "version: 2.1", "compiled": "version: 2"}"#)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let config = client.pipelines().get_config(&cancel, "p1").await.unwrap();

        assert_eq!(config.source, "version: 2.1");
        assert_eq!(config.compiled, "version: 2");
        mock.assert_async().await;
    }
}
