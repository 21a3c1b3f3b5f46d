use crate::models::Credentials;
use crate::Result;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

const TOKEN_KEY: &str = "token";
const USERNAME_KEY: &str = "username";

/// Persists the session credential: a token and a username, always
/// written and cleared together.
pub struct CredentialRepository;

impl CredentialRepository {
    /// Store the credential, replacing any previous one
    pub fn save(conn: &mut Connection, credentials: &Credentials) -> Result<()> {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO credentials (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )?;
            stmt.execute(params![TOKEN_KEY, credentials.token])?;
            stmt.execute(params![USERNAME_KEY, credentials.username])?;
        }
        tx.commit()?;

        debug!("Saved credentials for {}", credentials.username);
        Ok(())
    }

    /// Load the stored credential.
    ///
    /// Returns `None` unless both entries are present and non-empty.
    pub fn load(conn: &Connection) -> Result<Option<Credentials>> {
        let token = Self::get(conn, TOKEN_KEY)?;
        let username = Self::get(conn, USERNAME_KEY)?;

        match (token, username) {
            (Some(token), Some(username)) if !token.is_empty() && !username.is_empty() => {
                Ok(Some(Credentials { token, username }))
            }
            _ => Ok(None),
        }
    }

    /// Forget the stored credential
    pub fn clear(conn: &Connection) -> Result<()> {
        conn.execute(
            "DELETE FROM credentials WHERE key IN (?1, ?2)",
            params![TOKEN_KEY, USERNAME_KEY],
        )?;
        debug!("Cleared stored credentials");
        Ok(())
    }

    fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        let value = conn
            .query_row(
                "SELECT value FROM credentials WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}
