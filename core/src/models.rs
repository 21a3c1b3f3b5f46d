mod credentials;
mod story;
mod user;

pub use credentials::Credentials;
pub use story::{StoryDraft, StoryRecord};
pub use user::UserSession;

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;

/// Decode an API payload into `T`.
///
/// Missing fields and wrong types become construction errors naming `kind`.
pub(crate) fn decode<T: DeserializeOwned>(payload: &Value, kind: &str) -> Result<T> {
    T::deserialize(payload)
        .map_err(|e| Error::Construction(format!("Malformed {} payload: {}", kind, e)))
}

/// Drop later records whose id was already seen, keeping order.
pub(crate) fn dedup_by_id(stories: Vec<StoryRecord>) -> Vec<StoryRecord> {
    let mut seen = HashSet::new();
    stories
        .into_iter()
        .filter(|story| seen.insert(story.id().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_names_missing_field() {
        let payload = json!({ "storyId": "1" });
        let err = decode::<StoryRecord>(&payload, "story").unwrap_err();
        assert!(matches!(err, Error::Construction(msg) if msg.contains("story") && msg.contains("`title`")));
    }

    #[test]
    fn test_decode_rejects_null_field() {
        let payload = json!({
            "storyId": "1", "title": null, "author": "X", "url": "http://a.com",
            "username": "x", "createdAt": "t1", "updatedAt": "t1"
        });
        assert!(matches!(
            decode::<StoryRecord>(&payload, "story"),
            Err(Error::Construction(_))
        ));
    }

    #[test]
    fn test_dedup_keeps_first() {
        let story = |id: &str, title: &str| {
            decode::<StoryRecord>(
                &json!({
                    "storyId": id, "title": title, "author": "X", "url": "http://a.com",
                    "username": "x", "createdAt": "t1", "updatedAt": "t1"
                }),
                "story",
            )
            .unwrap()
        };
        let stories = dedup_by_id(vec![story("1", "first"), story("2", "b"), story("1", "again")]);
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].title(), "first");
    }
}
