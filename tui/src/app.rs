use crate::config::Config;
use anyhow::{anyhow, bail, Context, Result};
use snooze_core::{
    api::{HttpStoryApi, StoryApi},
    models::{StoryDraft, StoryRecord, UserSession},
    storage::{Connection, CredentialRepository, Database},
    SessionClient, StoryCollection,
};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How long an informational status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    AllStories,
    Favorites,
    MyStories,
    Profile,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::AllStories => "All Stories",
            View::Favorites => "Favorites",
            View::MyStories => "My Stories",
            View::Profile => "Profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Signup,
    Submit,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub secret: bool,
}

impl FormField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            secret: false,
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            secret: true,
            ..Self::new(label)
        }
    }
}

/// An open input form and the field that has focus.
#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl Form {
    pub fn new(kind: FormKind) -> Self {
        let fields = match kind {
            FormKind::Login => vec![FormField::new("Username"), FormField::secret("Password")],
            FormKind::Signup => vec![
                FormField::new("Name"),
                FormField::new("Username"),
                FormField::secret("Password"),
            ],
            FormKind::Submit => vec![
                FormField::new("Title"),
                FormField::new("Author"),
                FormField::new("URL"),
            ],
        };
        Self {
            kind,
            fields,
            focus: 0,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Login => "Login",
            FormKind::Signup => "Create Account",
            FormKind::Submit => "Submit a Story",
        }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    shown_at: Instant,
}

/// Application state
pub struct App {
    pub should_quit: bool,
    pub config: Config,
    pub view: View,
    pub stories: StoryCollection,
    pub session: Option<UserSession>,
    pub selected: usize,
    pub form: Option<Form>,
    /// Id of the story waiting for a y/n delete confirmation.
    pub pending_delete: Option<String>,
    pub help_open: bool,
    pub status: Option<StatusMessage>,
    client: SessionClient,
    db_connection: Connection,
}

impl App {
    /// Create an App talking to the configured API, with local state in `db_path`
    pub fn new(db_path: &Path, config: Config) -> Result<Self> {
        let conn = Database::new(db_path)
            .open()
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;
        let api = HttpStoryApi::new(&config.api.base_url)?;
        info!("Using story API at {}", api.base_url());
        Ok(Self::with_api(conn, config, Arc::new(api)))
    }

    pub fn with_api(db_connection: Connection, config: Config, api: Arc<dyn StoryApi>) -> Self {
        Self {
            should_quit: false,
            config,
            view: View::AllStories,
            stories: StoryCollection::default(),
            session: None,
            selected: 0,
            form: None,
            pending_delete: None,
            help_open: false,
            status: None,
            client: SessionClient::new(api),
            db_connection,
        }
    }

    /// Resume a stored session, if any, then load the stories.
    ///
    /// A saved login that cannot be read or resumed is reported and the app
    /// continues anonymously.
    pub async fn startup(&mut self) -> Result<()> {
        let credentials = match CredentialRepository::load(&self.db_connection) {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!("Could not read saved login: {}", e);
                self.set_error(format!("Could not read saved login: {}", e));
                None
            }
        };
        match self.client.resolve(credentials.as_ref()).await {
            Ok(session) => self.session = session,
            Err(e) => {
                warn!("Could not resume session: {}", e);
                self.set_error(format!("Could not restore session: {}", e));
            }
        }
        self.refresh_stories().await
    }

    pub async fn refresh_stories(&mut self) -> Result<()> {
        self.stories = StoryCollection::fetch_all(self.client.api()).await?;
        self.clamp_selection();
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// The stories listed in the current view
    pub fn visible_stories(&self) -> &[StoryRecord] {
        match (self.view, &self.session) {
            (View::AllStories, _) => self.stories.stories(),
            (View::Favorites, Some(session)) => session.favorites(),
            (View::MyStories, Some(session)) => session.own_stories(),
            _ => &[],
        }
    }

    pub fn selected_story(&self) -> Option<&StoryRecord> {
        self.visible_stories().get(self.selected)
    }

    pub fn move_cursor_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_cursor_down(&mut self) {
        if self.selected + 1 < self.visible_stories().len() {
            self.selected += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_stories().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Switch views. Going back to all stories re-fetches them.
    pub async fn set_view(&mut self, view: View) -> Result<()> {
        if view != View::AllStories && !self.is_logged_in() {
            bail!("Log in to see {}", view.title().to_lowercase());
        }
        self.view = view;
        self.selected = 0;
        self.pending_delete = None;
        if view == View::AllStories {
            self.refresh_stories().await?;
        }
        Ok(())
    }

    /// Open a form, or close it if the same one is already open
    pub fn open_form(&mut self, kind: FormKind) -> Result<()> {
        if kind == FormKind::Submit && !self.is_logged_in() {
            bail!("Log in to submit a story");
        }
        if self.form.as_ref().map(|f| f.kind) == Some(kind) {
            self.form = None;
        } else {
            self.form = Some(Form::new(kind));
        }
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub fn form_input(&mut self, c: char) {
        if let Some(form) = self.form.as_mut() {
            if let Some(field) = form.fields.get_mut(form.focus) {
                field.value.push(c);
            }
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(form) = self.form.as_mut() {
            if let Some(field) = form.fields.get_mut(form.focus) {
                field.value.pop();
            }
        }
    }

    pub fn form_next_field(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.focus = (form.focus + 1) % form.fields.len();
        }
    }

    pub fn form_prev_field(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.focus = (form.focus + form.fields.len() - 1) % form.fields.len();
        }
    }

    /// Send the open form. On failure the form stays open.
    pub async fn submit_form(&mut self) -> Result<()> {
        let Some(form) = self.form.clone() else {
            return Ok(());
        };

        match form.kind {
            FormKind::Login => {
                let session = self
                    .client
                    .authenticate(form.value(0), form.value(1))
                    .await?;
                self.sign_in(session)?;
            }
            FormKind::Signup => {
                let session = self
                    .client
                    .create_account(form.value(1), form.value(2), form.value(0))
                    .await?;
                self.sign_in(session)?;
            }
            FormKind::Submit => {
                let draft = StoryDraft::new(form.value(0), form.value(1), form.value(2));
                let session = self
                    .session
                    .as_mut()
                    .ok_or_else(|| anyhow!("Log in to submit a story"))?;
                let story = self
                    .stories
                    .add_story(self.client.api(), session, &draft)
                    .await?;
                self.form = None;
                self.set_info(format!("Submitted \"{}\"", story.title()));
            }
        }
        Ok(())
    }

    fn sign_in(&mut self, session: UserSession) -> Result<()> {
        if let Some(credentials) = session.credentials() {
            CredentialRepository::save(&mut self.db_connection, &credentials)?;
        }
        self.set_info(format!("Welcome, {}!", session.name()));
        self.session = Some(session);
        self.form = None;
        self.view = View::AllStories;
        self.clamp_selection();
        Ok(())
    }

    /// Forget the stored credential and go back to browsing anonymously
    pub async fn logout(&mut self) -> Result<()> {
        if self.session.is_none() {
            return Ok(());
        }
        CredentialRepository::clear(&self.db_connection)?;
        self.session = None;
        self.form = None;
        self.pending_delete = None;
        self.view = View::AllStories;
        self.selected = 0;
        self.set_info("Logged out".to_string());
        self.refresh_stories().await
    }

    /// Flip the favorite state of the selected story
    pub async fn toggle_favorite_selected(&mut self) -> Result<()> {
        let Some(story_id) = self.selected_story().map(|s| s.id().to_string()) else {
            return Ok(());
        };
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| anyhow!("Log in to favorite stories"))?;
        let favorite = !session.is_favorite(&story_id);
        self.client.set_favorite(session, &story_id, favorite).await?;
        self.clamp_selection();
        Ok(())
    }

    /// Ask for confirmation before deleting the selected story.
    /// Only stories in "My Stories" can be deleted.
    pub fn initiate_delete(&mut self) {
        if self.view != View::MyStories {
            return;
        }
        self.pending_delete = self.selected_story().map(|s| s.id().to_string());
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the pending story, then show the refreshed story list
    pub async fn confirm_delete(&mut self) -> Result<()> {
        let Some(story_id) = self.pending_delete.take() else {
            return Ok(());
        };
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| anyhow!("Log in to delete stories"))?;
        self.stories
            .remove_story(self.client.api(), session, &story_id)
            .await?;
        self.set_info("Story deleted".to_string());
        self.set_view(View::AllStories).await
    }

    /// Open the selected story in the system browser
    pub fn open_selected(&mut self) -> Result<()> {
        if let Some(story) = self.selected_story() {
            let url = story.url().to_string();
            opener::open(&url).with_context(|| format!("Failed to open {}", url))?;
        }
        Ok(())
    }

    pub fn open_help(&mut self) {
        self.help_open = true;
    }

    pub fn close_help(&mut self) {
        self.help_open = false;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Show a failed operation in the status bar
    pub fn report(&mut self, err: anyhow::Error) {
        warn!("{:#}", err);
        self.set_error(format!("{:#}", err));
    }

    fn set_info(&mut self, text: String) {
        self.status = Some(StatusMessage {
            text,
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    fn set_error(&mut self, text: String) {
        self.status = Some(StatusMessage {
            text,
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    /// Periodic housekeeping: expire informational messages
    pub fn tick(&mut self) {
        let expired = self
            .status
            .as_ref()
            .map(|s| !s.is_error && s.shown_at.elapsed() >= STATUS_TTL)
            .unwrap_or(false);
        if expired {
            self.status = None;
        }
    }
}
