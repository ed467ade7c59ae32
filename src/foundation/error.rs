/// Convenience result type used across drape.
pub type DrapeResult<T> = Result<T, DrapeError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only conditions that callers must act on are errors. Degenerate geometry falls back to a fixed
/// scale, out-of-region edits are clamped, and cache misses trigger a live render; none of those
/// produce a `DrapeError`.
#[derive(thiserror::Error, Debug)]
pub enum DrapeError {
    /// Invalid user-provided or catalog data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image, font, or garment asset failed to load, decode, or arrived too late.
    #[error("asset load failed for '{url}': {reason}")]
    AssetLoad {
        /// Source URL of the asset.
        url: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// Snapshot or design persistence failed. Always retryable.
    #[error("persist error: {0}")]
    Persist(String),

    /// Errors while rasterizing or compositing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DrapeError {
    /// Build a [`DrapeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DrapeError::AssetLoad`] value.
    pub fn asset_load(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetLoad {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`DrapeError::Persist`] value.
    pub fn persist(msg: impl Into<String>) -> Self {
        Self::Persist(msg.into())
    }

    /// Build a [`DrapeError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`DrapeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persist(_) | Self::AssetLoad { .. })
    }
}

impl From<serde_json::Error> for DrapeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
