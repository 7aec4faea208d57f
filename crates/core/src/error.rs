/// Result alias that carries the custom [`BeatVizError`] type.
pub type Result<T> = std::result::Result<T, BeatVizError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum BeatVizError {
    /// Free-form failure without a more specific category.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Settings, charts and signal recordings are all JSON on disk.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// The asset provider has nothing stored under the requested path.
    #[error("asset `{path}` not found")]
    AssetNotFound { path: String },
    #[error("shader compilation failed: {0}")]
    Shader(String),
    /// A shader program does not declare a uniform the render pass writes.
    #[error("shader program does not declare uniform `{0}`")]
    MissingUniform(String),
    #[error("invalid chart: {0}")]
    Chart(String),
}

impl BeatVizError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn asset_not_found(path: impl Into<String>) -> Self {
        Self::AssetNotFound { path: path.into() }
    }
}

impl From<&str> for BeatVizError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for BeatVizError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
