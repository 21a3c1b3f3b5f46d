use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use snooze_core::api::DEFAULT_BASE_URL;
use std::fs;
use std::path::Path;

/// Something the user can ask for with a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    Login,
    Signup,
    Logout,
    Submit,
    AllStories,
    Favorites,
    MyStories,
    Profile,
    ToggleFavorite,
    Delete,
    Open,
    Refresh,
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Keymap {
    pub quit: String,
    pub help: String,
    pub login: String,
    pub signup: String,
    pub logout: String,
    pub submit: String,
    pub all_stories: String,
    pub favorites: String,
    pub my_stories: String,
    pub profile: String,
    pub toggle_favorite: String,
    pub delete: String,
    pub open: String,
    pub refresh: String,
    pub cursor_up: String,
    pub cursor_down: String,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "h".to_string(),
            login: "l".to_string(),
            signup: "c".to_string(),
            logout: "ctrl-l".to_string(),
            submit: "s".to_string(),
            all_stories: "1".to_string(),
            favorites: "2".to_string(),
            my_stories: "3".to_string(),
            profile: "4".to_string(),
            toggle_favorite: "f".to_string(),
            delete: "d".to_string(),
            open: "enter".to_string(),
            refresh: "r".to_string(),
            cursor_up: "up".to_string(),
            cursor_down: "down".to_string(),
        }
    }
}

impl Keymap {
    /// The action bound to `key`, if any.
    pub fn action_for(&self, key: &KeyEvent) -> Option<Action> {
        let bindings = [
            (&self.quit, Action::Quit),
            (&self.help, Action::Help),
            (&self.login, Action::Login),
            (&self.signup, Action::Signup),
            (&self.logout, Action::Logout),
            (&self.submit, Action::Submit),
            (&self.all_stories, Action::AllStories),
            (&self.favorites, Action::Favorites),
            (&self.my_stories, Action::MyStories),
            (&self.profile, Action::Profile),
            (&self.toggle_favorite, Action::ToggleFavorite),
            (&self.delete, Action::Delete),
            (&self.open, Action::Open),
            (&self.refresh, Action::Refresh),
            (&self.cursor_up, Action::Up),
            (&self.cursor_down, Action::Down),
        ];

        bindings
            .into_iter()
            .find(|(binding, _)| binding_matches(binding, key))
            .map(|(_, action)| action)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub keymap: Keymap,
}

/// Load the config file, writing the defaults first if it does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        let toml = toml::to_string(&config).context("Failed to serialize default config")?;
        fs::write(path, toml)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Parse a binding such as `q`, `ctrl-l`, `enter` or `up`.
pub fn parse_binding(binding: &str) -> Option<(KeyCode, KeyModifiers)> {
    let binding = binding.trim().to_lowercase();
    let (modifiers, key) = match binding.strip_prefix("ctrl-") {
        Some(rest) => (KeyModifiers::CONTROL, rest.to_string()),
        None => match binding.strip_prefix("alt-") {
            Some(rest) => (KeyModifiers::ALT, rest.to_string()),
            None => (KeyModifiers::NONE, binding),
        },
    };

    let code = match key.as_str() {
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "delete" => KeyCode::Delete,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };

    Some((code, modifiers))
}

fn binding_matches(binding: &str, key: &KeyEvent) -> bool {
    let Some((code, modifiers)) = parse_binding(binding) else {
        return false;
    };
    let pressed = match key.code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };
    // Shift is implied by the character itself.
    let held = key.modifiers.difference(KeyModifiers::SHIFT);
    pressed == code && held == modifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_parse_binding() {
        assert_eq!(parse_binding("q"), Some((KeyCode::Char('q'), KeyModifiers::NONE)));
        assert_eq!(
            parse_binding("ctrl-l"),
            Some((KeyCode::Char('l'), KeyModifiers::CONTROL))
        );
        assert_eq!(parse_binding("Enter"), Some((KeyCode::Enter, KeyModifiers::NONE)));
        assert_eq!(parse_binding("nonsense"), None);
    }

    #[test]
    fn test_default_keymap_actions() {
        let keymap = Keymap::default();
        assert_eq!(
            keymap.action_for(&key(KeyCode::Char('f'), KeyModifiers::NONE)),
            Some(Action::ToggleFavorite)
        );
        assert_eq!(
            keymap.action_for(&key(KeyCode::Char('l'), KeyModifiers::CONTROL)),
            Some(Action::Logout)
        );
        assert_eq!(
            keymap.action_for(&key(KeyCode::Char('l'), KeyModifiers::NONE)),
            Some(Action::Login)
        );
        assert_eq!(
            keymap.action_for(&key(KeyCode::Char('Q'), KeyModifiers::SHIFT)),
            Some(Action::Quit)
        );
        assert_eq!(keymap.action_for(&key(KeyCode::Char('z'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_load_config_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = load_config(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);

        let reloaded = load_config(&path).unwrap();
        assert_eq!(reloaded.keymap.quit, "q");
    }

    #[test]
    fn test_load_partial_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\nbase_url = \"http://localhost:5000\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.keymap.submit, "s");
    }

    #[test]
    fn test_load_invalid_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api\nbroken").unwrap();

        assert!(load_config(&path).is_err());
    }
}
