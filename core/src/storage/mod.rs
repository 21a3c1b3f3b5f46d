mod credential_repository;
mod database;

pub use credential_repository::CredentialRepository;
pub use database::{Connection, Database};
