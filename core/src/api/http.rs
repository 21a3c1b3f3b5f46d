use super::{AuthPayload, StoryApi};
use crate::models::decode;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://hack-or-snooze-v3.herokuapp.com";

#[derive(Debug, Deserialize)]
struct StoriesResponse {
    stories: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct StoryResponse {
    story: Value,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    user: Value,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    user: Value,
    token: String,
}

/// `{"error": {"status", "title", "message"}}`
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// [`StoryApi`] over HTTP with JSON bodies.
///
/// No timeout is configured and nothing is retried: a hung request hangs
/// the calling operation.
#[derive(Clone)]
pub struct HttpStoryApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpStoryApi {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. "http://localhost:5000").
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Like [`Self::new`], sending through a preconfigured `client`.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::InvalidInput(format!("Invalid API base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidInput(format!(
                "API base URL cannot have paths appended: {}",
                base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.endpoint(segments))
    }

    /// Send a request, turning transport failures and non-2xx answers
    /// into [`Error::Remote`].
    async fn send(&self, label: &str, request: RequestBuilder) -> Result<reqwest::Response> {
        debug!("{}: sending request", label);
        let response = request.send().await.map_err(|e| {
            warn!("{}: request failed: {}", label, e);
            Error::remote(None, e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            debug!("{}: {}", label, status);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!("{}: {} {}", label, status, message);
        Err(Error::remote(Some(status.as_u16()), message))
    }

    /// Send a request and decode its JSON body into `T`.
    ///
    /// A body that is not JSON is a remote failure; JSON of the wrong shape
    /// is a construction error.
    async fn send_decoded<T: DeserializeOwned>(
        &self,
        label: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.send(label, request).await?;
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| Error::remote(None, format!("Failed to read {} response: {}", label, e)))?;
        decode(&body, label)
    }
}

#[async_trait]
impl StoryApi for HttpStoryApi {
    async fn list_stories(&self) -> Result<Vec<Value>> {
        let response: StoriesResponse = self
            .send_decoded("list stories", self.request(Method::GET, &["stories"]))
            .await?;
        Ok(response.stories)
    }

    async fn create_story(&self, token: &str, story: Value) -> Result<Value> {
        let request = self
            .request(Method::POST, &["stories"])
            .json(&json!({ "token": token, "story": story }));
        let response: StoryResponse = self.send_decoded("create story", request).await?;
        Ok(response.story)
    }

    async fn delete_story(&self, token: &str, story_id: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, &["stories", story_id])
            .query(&[("token", token)]);
        self.send("delete story", request).await?;
        Ok(())
    }

    async fn signup(&self, username: &str, password: &str, name: &str) -> Result<AuthPayload> {
        let request = self.request(Method::POST, &["signup"]).json(&json!({
            "user": { "username": username, "password": password, "name": name }
        }));
        let response: AuthResponse = self
            .send_decoded("signup", request)
            .await
            .map_err(classify_signup)?;
        auth_payload(response)
    }

    async fn login(&self, username: &str, password: &str) -> Result<AuthPayload> {
        let request = self.request(Method::POST, &["login"]).json(&json!({
            "user": { "username": username, "password": password }
        }));
        let response: AuthResponse = self
            .send_decoded("login", request)
            .await
            .map_err(classify_login)?;
        auth_payload(response)
    }

    async fn get_user(&self, token: &str, username: &str) -> Result<Value> {
        let request = self
            .request(Method::GET, &["users", username])
            .query(&[("token", token)]);
        let response: UserResponse = self.send_decoded("get user", request).await?;
        Ok(response.user)
    }

    async fn add_favorite(&self, token: &str, username: &str, story_id: &str) -> Result<()> {
        let request = self
            .request(Method::POST, &["users", username, "favorites", story_id])
            .json(&json!({ "token": token }));
        self.send("add favorite", request).await?;
        Ok(())
    }

    async fn remove_favorite(&self, token: &str, username: &str, story_id: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, &["users", username, "favorites", story_id])
            .query(&[("token", token)]);
        self.send("remove favorite", request).await?;
        Ok(())
    }
}

fn auth_payload(response: AuthResponse) -> Result<AuthPayload> {
    if response.token.is_empty() {
        return Err(Error::Construction("Response has an empty `token`".to_string()));
    }
    Ok(AuthPayload {
        user: response.user,
        token: response.token,
    })
}

/// Human-readable message for a failed response: the API's error message,
/// else the body text, else the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(response) = serde_json::from_str::<ErrorResponse>(body) {
        return response.error.message;
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

/// Duplicate usernames and rejected fields on signup are validation errors.
fn classify_signup(err: Error) -> Error {
    match err {
        Error::Remote {
            status: Some(400) | Some(409),
            message,
        } => Error::Validation(message),
        other => other,
    }
}

/// Unknown user or wrong password on login are authentication errors.
fn classify_login(err: Error) -> Error {
    match err {
        Error::Remote {
            status: Some(401) | Some(403) | Some(404),
            message,
        } => Error::Auth(message),
        other => other,
    }
}
