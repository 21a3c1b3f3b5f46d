use crate::api::StoryApi;
use crate::models::{StoryDraft, StoryRecord, UserSession};
use crate::{Error, Result};
use tracing::{debug, info};

/// Every known story, newest first.
///
/// Mutations call the server first and touch local state only once the
/// call has succeeded, so a failed call never leaves a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryCollection {
    stories: Vec<StoryRecord>,
}

impl StoryCollection {
    pub fn new(stories: Vec<StoryRecord>) -> Self {
        Self { stories }
    }

    /// Fetch the full story list, in the order the server returns it.
    pub async fn fetch_all(api: &dyn StoryApi) -> Result<Self> {
        let payloads = api.list_stories().await?;
        let stories = StoryRecord::from_payloads(&payloads)?;
        debug!("Fetched {} stories", stories.len());
        Ok(Self::new(stories))
    }

    /// Submit a story on behalf of `session`.
    ///
    /// The created record is put first in this collection and in the
    /// session's own stories.
    pub async fn add_story(
        &mut self,
        api: &dyn StoryApi,
        session: &mut UserSession,
        draft: &StoryDraft,
    ) -> Result<StoryRecord> {
        require_token(session)?;
        let payload = api
            .create_story(session.token(), draft.to_payload(session.username()))
            .await?;
        let story = StoryRecord::from_payload(&payload)?;

        self.stories.retain(|s| s.id() != story.id());
        self.stories.insert(0, story.clone());
        session.push_own_story(story.clone());

        info!("Added story {} for {}", story.id(), session.username());
        Ok(story)
    }

    /// Delete a story on the server, then drop it from this collection and
    /// from the session's own stories and favorites.
    pub async fn remove_story(
        &mut self,
        api: &dyn StoryApi,
        session: &mut UserSession,
        story_id: &str,
    ) -> Result<()> {
        require_token(session)?;
        api.delete_story(session.token(), story_id).await?;

        self.stories.retain(|s| s.id() != story_id);
        session.forget_story(story_id);

        info!("Removed story {} for {}", story_id, session.username());
        Ok(())
    }

    pub fn stories(&self) -> &[StoryRecord] {
        &self.stories
    }

    pub fn get(&self, story_id: &str) -> Option<&StoryRecord> {
        self.stories.iter().find(|s| s.id() == story_id)
    }

    pub fn contains(&self, story_id: &str) -> bool {
        self.get(story_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StoryRecord> {
        self.stories.iter()
    }
}

impl<'a> IntoIterator for &'a StoryCollection {
    type Item = &'a StoryRecord;
    type IntoIter = std::slice::Iter<'a, StoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.stories.iter()
    }
}

/// Authenticated calls need a token; an anonymous session never reaches
/// the server.
pub(crate) fn require_token(session: &UserSession) -> Result<()> {
    if session.is_authenticated() {
        Ok(())
    } else {
        Err(Error::Auth(format!(
            "{} is not logged in",
            session.username()
        )))
    }
}
