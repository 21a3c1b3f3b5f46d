use crate::api::StoryApi;
use crate::models::{Credentials, UserSession};
use crate::stories::require_token;
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Account operations: signup, login, session resumption and favorites.
#[derive(Clone)]
pub struct SessionClient {
    api: Arc<dyn StoryApi>,
}

impl SessionClient {
    pub fn new(api: Arc<dyn StoryApi>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &dyn StoryApi {
        self.api.as_ref()
    }

    /// Register a new account. A fresh account has no stories or favorites.
    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<UserSession> {
        let payload = self.api.signup(username, password, name).await?;
        let session = UserSession::from_payload(&payload.user)?.with_token(payload.token);
        info!("Created account {}", session.username());
        Ok(session)
    }

    /// Log in with a username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserSession> {
        let payload = self.api.login(username, password).await?;
        let session = UserSession::from_full_payload(&payload.user)?.with_token(payload.token);
        info!(
            "Logged in as {} ({} stories, {} favorites)",
            session.username(),
            session.own_stories().len(),
            session.favorites().len()
        );
        Ok(session)
    }

    /// Resume a session from a stored token and username.
    ///
    /// Returns `Ok(None)` without touching the server when either part is
    /// missing or empty.
    pub async fn resolve_from_credential(
        &self,
        token: Option<&str>,
        username: Option<&str>,
    ) -> Result<Option<UserSession>> {
        let (token, username) = match (token, username) {
            (Some(t), Some(u)) if !t.is_empty() && !u.is_empty() => (t, u),
            _ => {
                debug!("No stored credentials, staying anonymous");
                return Ok(None);
            }
        };

        let user = self.api.get_user(token, username).await?;
        let session = UserSession::from_full_payload(&user)?.with_token(token);
        info!("Resumed session for {}", session.username());
        Ok(Some(session))
    }

    /// Convenience wrapper over [`Self::resolve_from_credential`] for a
    /// loaded credential pair.
    pub async fn resolve(&self, credentials: Option<&Credentials>) -> Result<Option<UserSession>> {
        self.resolve_from_credential(
            credentials.map(|c| c.token.as_str()),
            credentials.map(|c| c.username.as_str()),
        )
        .await
    }

    /// Favorite or unfavorite a story, then reload the account so the
    /// session's timestamps and favorites match the server.
    ///
    /// If the toggle succeeds but the reload fails, the error is returned
    /// and the session keeps its previous favorites; resolving the session
    /// again brings it back in line.
    pub async fn set_favorite<'s>(
        &self,
        session: &'s mut UserSession,
        story_id: &str,
        is_favorite: bool,
    ) -> Result<&'s UserSession> {
        require_token(session)?;
        let (token, username) = (session.token(), session.username());
        if is_favorite {
            self.api.add_favorite(token, username, story_id).await?;
        } else {
            self.api.remove_favorite(token, username, story_id).await?;
        }

        let user = self.api.get_user(token, username).await.map_err(|e| {
            warn!(
                "Favorite toggle for {} applied but reload failed: {}",
                story_id, e
            );
            e
        })?;
        session.refresh_from(&user)?;

        debug!(
            "{} {} story {}",
            session.username(),
            if is_favorite { "favorited" } else { "unfavorited" },
            story_id
        );
        Ok(&*session)
    }
}
