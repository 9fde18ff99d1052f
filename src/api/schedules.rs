//
//  circleci
//  api/schedules.rs
//

//! Scheduled pipeline queries.
//!
//! CircleCI API docs: <https://circleci.com/docs/api/v2/#tag/Schedule>

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::client::{Client, Destination};
use super::common::{Error, Paged};
use super::pipelines::Actor;
use super::require;

/// Service handle for the schedule endpoints.
pub struct Schedules<'c> {
    client: &'c Client,
}

impl Client {
    /// The schedule service.
    pub fn schedules(&self) -> Schedules<'_> {
        Schedules { client: self }
    }
}

/// A pipeline schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub timetable: Option<Timetable>,
    #[serde(rename = "updated-at")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "created-at")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "project-slug")]
    pub project_slug: String,
    pub parameters: Option<serde_json::Map<String, serde_json::Value>>,
    pub actor: Option<Actor>,
}

/// When a schedule fires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Timetable {
    #[serde(rename = "per-hour")]
    pub per_hour: i64,
    #[serde(rename = "hours-of-day")]
    pub hours_of_day: Vec<i64>,
    #[serde(rename = "days-of-week")]
    pub days_of_week: Vec<String>,
}

/// Options for [`Schedules::list`]. Nothing is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleListOptions {
    #[serde(rename = "page-token", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl Schedules<'_> {
    /// Lists the schedules of a project.
    pub async fn list(
        &self,
        cancel: &CancellationToken,
        project_slug: &str,
        options: ScheduleListOptions,
    ) -> Result<Paged<Schedule>, Error> {
        require(project_slug, "project slug is required")?;

        let path = format!("project/{project_slug}/schedule");
        let request = self
            .client
            .build_request(Method::GET, &path, Some(&options))?;

        let mut list = Paged::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut list))
            .await?;
        Ok(list)
    }

    /// Returns a schedule by ID.
    pub async fn get(&self, cancel: &CancellationToken, id: &str) -> Result<Schedule, Error> {
        require(id, "schedule ID is required")?;

        let path = format!("schedule/{id}");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut schedule = Schedule::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut schedule))
            .await?;
        Ok(schedule)
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
            .mock("GET", "/api/v2/project/gh/acme/widget/schedule")
            .match_query(Matcher::UrlEncoded("page-token".into(), "tok".into()))
            .with_body(
                r#"{"items": [{"id": "s1", "name": "nightly",
                    "timetable": {"per-hour": 1, "hours-of-day": [3]}}]}"#,
            )
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let list = client
            .schedules()
            .list(
                &cancel,
                "gh/acme/widget",
                ScheduleListOptions {
                    page_token: Some("tok".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(list.items[0].name, "nightly");
        let timetable = list.items[0].timetable.as_ref().unwrap();
        assert_eq!(timetable.per_hour, 1);
        assert_eq!(timetable.hours_of_day, vec![3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_requires_id() {
        let (_server, client) = test_client().await;
        let cancel = CancellationToken::new();

        let err = client.schedules().get(&cancel, "").await.unwrap_err();
        assert!(matches!(err, Error::Validation("schedule ID is required")));
    }
}
