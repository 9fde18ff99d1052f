//
//  circleci
//  api/insights.rs
//

//! Usage metrics for workflows (Insights endpoints).
//!
//! CircleCI API docs: <https://circleci.com/docs/api/v2/#tag/Insights>

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::client::{Client, Destination};
use super::common::{Error, Paged};
use super::require;

/// Service handle for the insights endpoints.
pub struct Insights<'c> {
    client: &'c Client,
}

impl Client {
    /// The insights service.
    pub fn insights(&self) -> Insights<'_> {
        Insights { client: self }
    }
}

/// The time window metrics are aggregated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingWindow {
    #[serde(rename = "last-24-hours")]
    Last24Hours,
    #[serde(rename = "last-7-days")]
    Last7Days,
    #[serde(rename = "last-30-days")]
    Last30Days,
    #[serde(rename = "last-60-days")]
    Last60Days,
    #[serde(rename = "last-90-days")]
    Last90Days,
}

/// Aggregated metrics for one workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryMetrics {
    pub name: String,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    pub metrics: Option<Metrics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub total_runs: i64,
    pub successful_runs: i64,
    pub mttr: i64,
    pub total_credits_used: i64,
    pub failed_runs: i64,
    pub success_rate: f64,
    pub duration_metrics: Option<DurationMetrics>,
    pub total_recoveries: i64,
    pub throughput: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationMetrics {
    pub min: i64,
    pub mean: i64,
    pub median: i64,
    pub p95: i64,
    pub max: i64,
    pub standard_deviation: f64,
}

/// One recorded run of a workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowRun {
    pub id: String,
    pub branch: String,
    pub duration: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub credits_used: i64,
    pub status: String,
}

/// Options for [`Insights::list_summary_metrics`]. Nothing is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InsightsListSummaryMetricsOptions {
    #[serde(rename = "reporting-window", skip_serializing_if = "Option::is_none")]
    pub reporting_window: Option<ReportingWindow>,

    #[serde(rename = "all-branches", skip_serializing_if = "Option::is_none")]
    pub all_branches: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(rename = "page-token", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// Options for [`Insights::list_workflow_runs`]. Nothing is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InsightsListWorkflowRunsOptions {
    #[serde(rename = "all-branches", skip_serializing_if = "Option::is_none")]
    pub all_branches: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(rename = "start-date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(rename = "end-date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(rename = "page-token", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl Insights<'_> {
    /// Lists aggregated metrics for a project's workflows.
    pub async fn list_summary_metrics(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        options: InsightsListSummaryMetricsOptions,
    ) -> Result<Paged<SummaryMetrics>, Error> {
        require(project_slug, "project slug is required")?;

        let path = format!("insights/{project_slug}/workflows");
        let request = self
            .client
            .build_request(Method::GET, &path, Some(&options))?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }

    /// Lists recent runs of one workflow.
    pub async fn list_workflow_runs(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        workflow_name: &str,
        options: InsightsListWorkflowRunsOptions,
    ) -> Result<Paged<WorkflowRun>, Error> {
        require(project_slug, "project slug is required")?;
        require(workflow_name, "workflow name is required")?;

        let path = format!("insights/{project_slug}/workflows/{workflow_name}");
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
    async fn test_list_summary_metrics_query() {
        let (mut server, client) = test_client().await;
        let mock = server
            .mock("GET", "/api/v2/insights/gh/acme/widget/workflows")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("reporting-window".into(), "last-90-days".into()),
                Matcher::UrlEncoded("all-branches".into(), "true".into()),
            ]))
            .with_body(r#"{"items": [{"name": "build"}]}"#)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let list = client
            .insights()
            .list_summary_metrics(
                &cancel,
                "gh/acme/widget",
                InsightsListSummaryMetricsOptions {
                    reporting_window: Some(ReportingWindow::Last90Days),
                    all_branches: Some(true),
                    ..InsightsListSummaryMetricsOptions::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(list.items[0].name, "build");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_workflow_runs_requires_name() {
        let (_server, client) = test_client().await;
        let cancel = CancellationToken::new();

        let err = client
            .insights()
            .list_workflow_runs(
                &cancel,
                "gh/acme/widget",
                "",
                InsightsListWorkflowRunsOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation("workflow name is required")));
    }

    #[test]
    fn test_reporting_window_wire_form() {
        assert_eq!(
            serde_json::to_string(&ReportingWindow::Last24Hours).unwrap(),
            r#""last-24-hours""#
        );
    }
}
