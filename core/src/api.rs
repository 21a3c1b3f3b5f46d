//! The remote story API.
//!
//! [`StoryApi`] has one method per endpoint. Methods hand back raw JSON
//! payloads; turning them into domain values is left to [`crate::models`],
//! so payload validation happens in one place.

mod http;

pub use http::{HttpStoryApi, DEFAULT_BASE_URL};

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Response of the signup and login endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthPayload {
    pub user: Value,
    pub token: String,
}

#[async_trait]
pub trait StoryApi: Send + Sync {
    /// `GET /stories`, unauthenticated. Returns the `stories` array.
    async fn list_stories(&self) -> Result<Vec<Value>>;

    /// `POST /stories`. Returns the created `story`.
    async fn create_story(&self, token: &str, story: Value) -> Result<Value>;

    /// `DELETE /stories/{id}`.
    async fn delete_story(&self, token: &str, story_id: &str) -> Result<()>;

    /// `POST /signup`.
    async fn signup(&self, username: &str, password: &str, name: &str) -> Result<AuthPayload>;

    /// `POST /login`.
    async fn login(&self, username: &str, password: &str) -> Result<AuthPayload>;

    /// `GET /users/{username}`. Returns the `user`.
    async fn get_user(&self, token: &str, username: &str) -> Result<Value>;

    /// `POST /users/{username}/favorites/{id}`.
    async fn add_favorite(&self, token: &str, username: &str, story_id: &str) -> Result<()>;

    /// `DELETE /users/{username}/favorites/{id}`.
    async fn remove_favorite(&self, token: &str, username: &str, story_id: &str) -> Result<()>;
}
