use thiserror::Error;

pub type Result<T> = std::result::Result<T, OutlineError>;

#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("node not found: {id}")]
    NotFound { id: String },

    #[error("cannot delete root node {id}")]
    CannotDeleteRoot { id: String },

    /// The stored document is neither a flow array nor a tree object.
    #[error("unsupported outline format: expected array or object, found {0}")]
    UnsupportedFormat(&'static str),

    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid outline json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl OutlineError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// JSON-RPC error code reported to transport clients.
    pub fn rpc_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => -32004,
            Self::CannotDeleteRoot { .. } => -32003,
            Self::UnsupportedFormat(_) | Self::Io(_) | Self::Json(_) | Self::Task(_) => -32603,
        }
    }
}
