use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No active project")]
    NoActiveProject,

    #[error("Track not found: {0}")]
    TrackNotFound(uuid::Uuid),

    #[error("Clip not found: {0}")]
    ClipNotFound(uuid::Uuid),

    #[error("Asset not found: {0}")]
    AssetNotFound(uuid::Uuid),

    #[error("Asset {0} has no duration yet")]
    EmptyAsset(uuid::Uuid),

    #[error("Nothing to export")]
    NothingToExport,

    #[error("Transcode failed: {0}")]
    Transcode(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
