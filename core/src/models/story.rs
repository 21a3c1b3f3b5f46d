use super::decode;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A single submitted story, as last reported by the server.
///
/// Records are snapshots: there is no way to change a field after
/// construction. Views that hold the same story hold independent copies.
/// The serde shape is the API's story object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    #[serde(rename = "storyId", alias = "id")]
    id: String,
    title: String,
    author: String,
    url: String,
    #[serde(rename = "username")]
    posted_by: String,
    created_at: String,
    updated_at: String,
}

impl StoryRecord {
    /// Build a record from an API story payload.
    ///
    /// The identifier is read from `storyId`; a payload carrying `id`
    /// instead is accepted.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        decode(payload, "story")
    }

    /// Build records from a list of payloads, failing on the first bad one.
    pub fn from_payloads(payloads: &[Value]) -> Result<Vec<Self>> {
        payloads.iter().map(Self::from_payload).collect()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Username of the account that submitted the story.
    pub fn posted_by(&self) -> &str {
        &self.posted_by
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    /// Host part of the story URL, without a leading `www.`.
    pub fn hostname(&self) -> &str {
        let rest = match self.url.find("://") {
            Some(idx) => &self.url[idx + 3..],
            None => &self.url,
        };
        let host = rest.split('/').next().unwrap_or(rest);
        host.strip_prefix("www.").unwrap_or(host)
    }
}

/// The user-supplied part of a new story.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryDraft {
    pub title: String,
    pub author: String,
    pub url: String,
}

impl StoryDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            url: url.into(),
        }
    }

    /// The `story` object sent on create, stamped with the submitter.
    pub fn to_payload(&self, username: &str) -> Value {
        json!({
            "title": self.title,
            "author": self.author,
            "url": self.url,
            "username": username,
        })
    }
}
