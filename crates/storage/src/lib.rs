/// Remote persistence surface for the comic form
/// Table storage and blob storage are delegated to a hosted data platform;
/// this crate defines the trait surface the core consumes, the HTTP
/// implementation against that platform, and an in-memory fake for tests.
use thiserror::Error;

mod config;
pub use config::*;

mod store;
pub use store::*;

mod blob;
pub use blob::*;

mod rest;
pub use rest::*;

mod memory;
pub use memory::*;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store rejected request: {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
