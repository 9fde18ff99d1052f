//
//  circleci
//  api/users.rs
//

//! The current user and their organizations.
//!
//! CircleCI API docs: <https://circleci.com/docs/api/v2/#tag/User>

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::client::{Client, Destination};
use super::common::Error;
use super::require;

/// Service handle for the user endpoints.
pub struct Users<'c> {
    client: &'c Client,
}

impl Client {
    /// The user service.
    pub fn users(&self) -> Users<'_> {
        Users { client: self }
    }
}

/// A CircleCI user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub login: String,
    pub name: String,
}

/// An organization the current user collaborates in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Collaboration {
    #[serde(rename = "vcs-type")]
    pub vcs_type: String,
    pub name: String,
    pub avatar_url: String,
}

impl Users<'_> {
    /// Returns the user the token belongs to.
    pub async fn me(&self, cancel: &CancellationToken) -> Result<User, Error> {
        let request = self.client.build_request::<()>(Method::GET, "me", None)?;

        let mut user = User::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut user))
            .await?;
        Ok(user)
    }

    /// Lists the organizations the current user collaborates in.
    ///
    /// This endpoint returns a bare array rather than a paged envelope.
    pub async fn collaborations(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Collaboration>, Error> {
        let request = self
            .client
            .build_request::<()>(Method::GET, "me/collaborations", None)?;

        let mut collaborations = Vec::new();
        self.client
            .execute(cancel, request, Destination::Json(&mut collaborations))
            .await?;
        Ok(collaborations)
    }

    /// Returns a user by ID.
    pub async fn get(&self, cancel: &CancellationToken, id: &str) -> Result<User, Error> {
        require(id, "user ID is required")?;

        let path = format!("user/{id}");
        let request = self.client.build_request::<()>(Method::GET, &path, None)?;

        let mut user = User::default();
        self.client
            .execute(cancel, request, Destination::Json(&mut user))
            .await?;
        Ok(user)
    }
}
