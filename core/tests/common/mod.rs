//! In-memory stand-in for the story API, shared by the behavior tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use snooze_core::api::{AuthPayload, StoryApi};
use snooze_core::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;

pub const PASSWORD: &str = "hunter2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListStories,
    CreateStory,
    DeleteStory,
    Signup,
    Login,
    GetUser,
    AddFavorite,
    RemoveFavorite,
}

struct Account {
    password: String,
    name: String,
    created_at: String,
    updated_at: String,
    favorites: Vec<String>,
}

#[derive(Default)]
struct State {
    stories: Vec<Value>,
    accounts: HashMap<String, Account>,
    calls: HashMap<Endpoint, usize>,
    fail_next: Option<(Endpoint, Error)>,
    clock: u32,
}

impl State {
    fn tick(&mut self) -> String {
        self.clock += 1;
        format!("2024-01-01T00:{:02}:{:02}.000Z", self.clock / 60, self.clock % 60)
    }

    fn user_for_token(&self, token: &str) -> Result<String> {
        token
            .strip_prefix("token-")
            .filter(|name| self.accounts.contains_key(*name))
            .map(str::to_string)
            .ok_or_else(|| Error::remote(Some(401), "Invalid token"))
    }

    fn user_payload(&self, username: &str) -> Value {
        let account = &self.accounts[username];
        let favorites: Vec<Value> = account
            .favorites
            .iter()
            .filter_map(|id| self.stories.iter().find(|s| s["storyId"] == id.as_str()))
            .cloned()
            .collect();
        let stories: Vec<Value> = self
            .stories
            .iter()
            .filter(|s| s["username"] == username)
            .cloned()
            .collect();
        json!({
            "username": username,
            "name": account.name,
            "createdAt": account.created_at,
            "updatedAt": account.updated_at,
            "favorites": favorites,
            "stories": stories,
        })
    }
}

/// A fake API that keeps accounts and stories in memory and counts calls
/// per endpoint.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts `alice` and `bob`, and three stories listed newest first.
    pub fn seeded() -> Self {
        let api = Self::new();
        api.add_account("alice", "Alice Liddell");
        api.add_account("bob", "Bob");
        api.add_story("s1", "First", "bob");
        api.add_story("s2", "Second", "alice");
        api.add_story("s3", "Third", "bob");
        api
    }

    pub fn add_account(&self, username: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        state.accounts.insert(
            username.to_string(),
            Account {
                password: PASSWORD.to_string(),
                name: name.to_string(),
                created_at: now.clone(),
                updated_at: now,
                favorites: Vec::new(),
            },
        );
    }

    /// Seed a story; later seeds come first, as on the server.
    pub fn add_story(&self, id: &str, title: &str, username: &str) {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        state.stories.insert(
            0,
            json!({
                "storyId": id,
                "title": title,
                "author": "Some Author",
                "url": format!("https://www.example.com/{}", id),
                "username": username,
                "createdAt": now,
                "updatedAt": now,
            }),
        );
    }

    pub fn favorite_directly(&self, username: &str, story_id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(account) = state.accounts.get_mut(username) {
            account.favorites.push(story_id.to_string());
        }
    }

    pub fn token_for(username: &str) -> String {
        format!("token-{}", username)
    }

    /// Make the next call to `endpoint` fail with `error`.
    pub fn fail_next(&self, endpoint: Endpoint, error: Error) {
        self.state.lock().unwrap().fail_next = Some((endpoint, error));
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(&endpoint)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.values().sum()
    }

    pub fn server_favorites(&self, username: &str) -> Vec<String> {
        self.state.lock().unwrap().accounts[username].favorites.clone()
    }

    pub fn server_story_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .stories
            .iter()
            .map(|s| s["storyId"].as_str().unwrap().to_string())
            .collect()
    }

    fn enter(&self, endpoint: Endpoint) -> Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(endpoint).or_default() += 1;
        if matches!(&state.fail_next, Some((e, _)) if *e == endpoint) {
            let (_, error) = state.fail_next.take().unwrap();
            return Err(error);
        }
        Ok(state)
    }
}

#[async_trait]
impl StoryApi for FakeApi {
    async fn list_stories(&self) -> Result<Vec<Value>> {
        let state = self.enter(Endpoint::ListStories)?;
        Ok(state.stories.clone())
    }

    async fn create_story(&self, token: &str, story: Value) -> Result<Value> {
        let mut state = self.enter(Endpoint::CreateStory)?;
        let username = state.user_for_token(token)?;
        let now = state.tick();
        let created = json!({
            "storyId": format!("new-{}", uuid::Uuid::new_v4()),
            "title": story["title"],
            "author": story["author"],
            "url": story["url"],
            "username": username,
            "createdAt": now,
            "updatedAt": now,
        });
        state.stories.insert(0, created.clone());
        Ok(created)
    }

    async fn delete_story(&self, token: &str, story_id: &str) -> Result<()> {
        let mut state = self.enter(Endpoint::DeleteStory)?;
        state.user_for_token(token)?;
        let before = state.stories.len();
        state.stories.retain(|s| s["storyId"] != story_id);
        if state.stories.len() == before {
            return Err(Error::remote(Some(404), "Story not found"));
        }
        for account in state.accounts.values_mut() {
            account.favorites.retain(|id| id != story_id);
        }
        Ok(())
    }

    async fn signup(&self, username: &str, password: &str, name: &str) -> Result<AuthPayload> {
        let mut state = self.enter(Endpoint::Signup)?;
        if state.accounts.contains_key(username) {
            return Err(Error::Validation(format!(
                "There is already a user with username '{}'.",
                username
            )));
        }
        let now = state.tick();
        state.accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                name: name.to_string(),
                created_at: now.clone(),
                updated_at: now,
                favorites: Vec::new(),
            },
        );
        Ok(AuthPayload {
            user: state.user_payload(username),
            token: Self::token_for(username),
        })
    }

    async fn login(&self, username: &str, password: &str) -> Result<AuthPayload> {
        let state = self.enter(Endpoint::Login)?;
        match state.accounts.get(username) {
            Some(account) if account.password == password => Ok(AuthPayload {
                user: state.user_payload(username),
                token: Self::token_for(username),
            }),
            _ => Err(Error::Auth("Invalid credentials".to_string())),
        }
    }

    async fn get_user(&self, token: &str, username: &str) -> Result<Value> {
        let state = self.enter(Endpoint::GetUser)?;
        if state.user_for_token(token)? != username {
            return Err(Error::remote(Some(401), "Token does not match user"));
        }
        Ok(state.user_payload(username))
    }

    async fn add_favorite(&self, token: &str, username: &str, story_id: &str) -> Result<()> {
        let mut state = self.enter(Endpoint::AddFavorite)?;
        if state.user_for_token(token)? != username {
            return Err(Error::remote(Some(401), "Token does not match user"));
        }
        let now = state.tick();
        let account = state.accounts.get_mut(username).unwrap();
        if !account.favorites.iter().any(|id| id == story_id) {
            account.favorites.insert(0, story_id.to_string());
        }
        account.updated_at = now;
        Ok(())
    }

    async fn remove_favorite(&self, token: &str, username: &str, story_id: &str) -> Result<()> {
        let mut state = self.enter(Endpoint::RemoveFavorite)?;
        if state.user_for_token(token)? != username {
            return Err(Error::remote(Some(401), "Token does not match user"));
        }
        let now = state.tick();
        let account = state.accounts.get_mut(username).unwrap();
        account.favorites.retain(|id| id != story_id);
        account.updated_at = now;
        Ok(())
    }
}
