/// Comic document model
/// Fixed-layout comic template: pages of editable panels, plus the record
/// types persisted to the remote submissions table.
use thiserror::Error;

mod panel;
pub use panel::*;

mod template;
pub use template::*;

mod record;
pub use record::*;

mod aux;
pub use aux::*;

mod document;
pub use document::*;

#[derive(Debug, Error)]
pub enum ComicError {
    #[error("page index out of range: {0}")]
    PageOutOfRange(usize),

    #[error("panel not found: {0}")]
    PanelNotFound(String),

    #[error("panel {0} is not a {1} panel")]
    WrongPanelKind(String, &'static str),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ComicError>;
