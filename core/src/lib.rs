pub mod api;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod stories;

pub use error::{Error, Result};
pub use session::SessionClient;
pub use stories::StoryCollection;
