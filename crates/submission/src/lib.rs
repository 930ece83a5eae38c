/// Draft-state synchronization and submission assembly
/// The editing core behind the comic form: renders picked images into panel
/// blobs, autosaves the document as a draft record, and assembles the final
/// immutable submission when the customer confirms.
use thiserror::Error;

mod capture;
pub use capture::*;

mod autosave;
pub use autosave::*;

mod assembler;
pub use assembler::*;

mod identity;
pub use identity::*;

mod session;
pub use session::*;

#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The shared link's code does not resolve to a known customer.
    /// Terminal; there is no retry path.
    #[error("invalid customer code: {0}")]
    InvalidCode(String),

    #[error("image rendering failed: {0}")]
    Render(#[from] image::ImageError),

    #[error("unsupported rotation: {0} degrees (quarter turns only)")]
    UnsupportedRotation(u16),

    #[error("upload failed for panel {panel_id} after {attempts} attempts")]
    UploadFailed { panel_id: String, attempts: u32 },

    #[error("submission requires explicit confirmation")]
    NotConfirmed,

    #[error(transparent)]
    Model(#[from] comic::ComicError),

    #[error(transparent)]
    Store(#[from] storage::StorageError),
}

pub type Result<T> = std::result::Result<T, SubmissionError>;
