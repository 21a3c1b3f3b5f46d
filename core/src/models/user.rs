use super::{decode, dedup_by_id, Credentials, StoryRecord};
use crate::Result;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An account's identity plus its owned and favorited stories.
///
/// A session with an empty token is anonymous. The serde shape is the
/// API's full `user` object; the token is never part of that object and
/// defaults to empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    username: String,
    name: String,
    created_at: String,
    updated_at: String,
    #[serde(default)]
    token: String,
    #[serde(rename = "stories")]
    own_stories: Vec<StoryRecord>,
    favorites: Vec<StoryRecord>,
}

/// The account fields every `user` payload carries.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    username: String,
    name: String,
    created_at: String,
    updated_at: String,
}

/// What a favorite toggle can change.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FavoritesSnapshot {
    created_at: String,
    updated_at: String,
    favorites: Vec<StoryRecord>,
}

impl UserSession {
    /// Build a session from a `user` payload, without stories or token.
    pub fn from_payload(user: &Value) -> Result<Self> {
        let profile: Profile = decode(user, "user")?;
        Ok(Self {
            username: profile.username,
            name: profile.name,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
            token: String::new(),
            own_stories: Vec::new(),
            favorites: Vec::new(),
        })
    }

    /// Build a session from a full `user` payload, including its
    /// `stories` and `favorites` arrays.
    pub fn from_full_payload(user: &Value) -> Result<Self> {
        let mut session: Self = decode(user, "user")?;
        session.token.clear();
        session.own_stories = dedup_by_id(session.own_stories);
        session.favorites = dedup_by_id(session.favorites);
        Ok(session)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn own_stories(&self) -> &[StoryRecord] {
        &self.own_stories
    }

    pub fn favorites(&self) -> &[StoryRecord] {
        &self.favorites
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn is_favorite(&self, story_id: &str) -> bool {
        self.favorites.iter().any(|s| s.id() == story_id)
    }

    pub fn owns(&self, story_id: &str) -> bool {
        self.own_stories.iter().any(|s| s.id() == story_id)
    }

    /// The pair to persist for resuming this session later.
    pub fn credentials(&self) -> Option<Credentials> {
        if self.is_authenticated() {
            Some(Credentials::new(self.token.clone(), self.username.clone()))
        } else {
            None
        }
    }

    /// Account creation date as `YYYY-MM-DD`.
    pub fn created_date(&self) -> String {
        match DateTime::parse_from_rfc3339(&self.created_at) {
            Ok(dt) => dt.format("%Y-%m-%d").to_string(),
            Err(_) => self.created_at.chars().take(10).collect(),
        }
    }

    /// Apply the server's view of the account after a favorite toggle.
    ///
    /// Only timestamps and favorites are refreshed; own stories are not
    /// touched by a toggle.
    pub(crate) fn refresh_from(&mut self, user: &Value) -> Result<()> {
        let snapshot: FavoritesSnapshot = decode(user, "user")?;
        self.created_at = snapshot.created_at;
        self.updated_at = snapshot.updated_at;
        self.favorites = dedup_by_id(snapshot.favorites);
        Ok(())
    }

    pub(crate) fn push_own_story(&mut self, story: StoryRecord) {
        self.own_stories.retain(|s| s.id() != story.id());
        self.own_stories.insert(0, story);
    }

    pub(crate) fn forget_story(&mut self, story_id: &str) {
        self.own_stories.retain(|s| s.id() != story_id);
        self.favorites.retain(|s| s.id() != story_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;

    fn story(id: &str) -> Value {
        json!({
            "storyId": id,
            "title": format!("Story {}", id),
            "author": "Someone",
            "url": "https://example.com",
            "username": "alice",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        })
    }

    fn user() -> Value {
        json!({
            "username": "alice",
            "name": "Alice",
            "createdAt": "2023-05-06T10:20:30.000Z",
            "updatedAt": "2023-05-06T10:20:30.000Z",
            "favorites": [story("1"), story("1"), story("2")],
            "stories": [story("3")]
        })
    }

    #[test]
    fn test_basic_payload_has_no_stories() {
        let session = UserSession::from_payload(&user()).unwrap();
        assert_eq!(session.username(), "alice");
        assert_eq!(session.name(), "Alice");
        assert!(session.favorites().is_empty());
        assert!(session.own_stories().is_empty());
        assert!(!session.is_authenticated());
        assert_eq!(session.credentials(), None);
    }

    #[test]
    fn test_full_payload_dedups_favorites() {
        let session = UserSession::from_full_payload(&user()).unwrap().with_token("tok");
        let ids: Vec<&str> = session.favorites().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(session.owns("3"));
        assert!(session.is_favorite("2"));
        assert_eq!(session.credentials(), Some(Credentials::new("tok", "alice")));
    }

    #[test]
    fn test_deserialize_api_user_shape() {
        let session: UserSession = serde_json::from_value(user()).unwrap();
        assert_eq!(session.username(), "alice");
        assert_eq!(session.created_at(), "2023-05-06T10:20:30.000Z");
        assert!(session.owns("3"));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_full_payload_requires_arrays() {
        let mut payload = user();
        payload.as_object_mut().unwrap().remove("stories");
        assert!(matches!(
            UserSession::from_full_payload(&payload),
            Err(Error::Construction(_))
        ));
    }

    #[test]
    fn test_created_date() {
        let session = UserSession::from_payload(&user()).unwrap();
        assert_eq!(session.created_date(), "2023-05-06");
    }

    #[test]
    fn test_created_date_falls_back_to_prefix() {
        let mut payload = user();
        payload["createdAt"] = json!("2023-05-06 garbage");
        let session = UserSession::from_payload(&payload).unwrap();
        assert_eq!(session.created_date(), "2023-05-06");
    }

    #[test]
    fn test_refresh_leaves_state_alone_on_bad_payload() {
        let mut session = UserSession::from_full_payload(&user()).unwrap();
        let before = session.clone();
        let err = session.refresh_from(&json!({ "createdAt": "x", "updatedAt": "y" }));
        assert!(err.is_err());
        assert_eq!(session, before);
    }

    #[test]
    fn test_forget_story() {
        let mut session = UserSession::from_full_payload(&user()).unwrap();
        session.forget_story("2");
        session.forget_story("3");
        assert!(!session.is_favorite("2"));
        assert!(!session.owns("3"));
        assert!(session.is_favorite("1"));
    }
}
