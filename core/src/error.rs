use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure (`status` is `None`) or a non-2xx answer from the API.
    #[error("Remote error{}: {message}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Remote { status: Option<u16>, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Malformed payload: {0}")]
    Construction(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Remote {
            status,
            message: message.into(),
        }
    }

    /// HTTP status carried by a remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => *status,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_display_with_status() {
        let err = Error::remote(Some(401), "Invalid token");
        assert_eq!(err.to_string(), "Remote error (status 401): Invalid token");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_remote_display_without_status() {
        let err = Error::remote(None, "connection refused");
        assert_eq!(err.to_string(), "Remote error: connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_non_remote_has_no_status() {
        assert_eq!(Error::Auth("nope".to_string()).status(), None);
    }
}
