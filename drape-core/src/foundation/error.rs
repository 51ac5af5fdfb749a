/// Convenience result type used across drape.
pub type DrapeResult<T> = Result<T, DrapeError>;

/// Which side of a composition an asset identifier refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetRole {
    /// The foreground graphic (logo).
    Graphic,
    /// The background garment photo.
    Base,
}

impl std::fmt::Display for AssetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Graphic => f.write_str("graphic"),
            Self::Base => f.write_str("base"),
        }
    }
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum DrapeError {
    /// A resize target or buffer dimension is zero, negative or overflows.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// Perspective corners admit no valid homography.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A batch job references an identifier the asset lookup cannot resolve.
    #[error("missing asset: {role} '{id}'")]
    MissingAsset {
        /// Graphic or base image.
        role: AssetRole,
        /// Identifier as given by the job.
        id: String,
    },

    /// Compositing inputs disagree on the expected channel depth.
    #[error("channel mismatch: {0}")]
    ChannelMismatch(String),

    /// Invalid user-provided parameters or job data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing jobs or configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DrapeError {
    /// Build a [`DrapeError::InvalidDimension`] value.
    pub fn invalid_dimension(msg: impl Into<String>) -> Self {
        Self::InvalidDimension(msg.into())
    }

    /// Build a [`DrapeError::DegenerateGeometry`] value.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateGeometry(msg.into())
    }

    /// Build a [`DrapeError::MissingAsset`] value.
    pub fn missing(role: AssetRole, id: impl Into<String>) -> Self {
        Self::MissingAsset {
            role,
            id: id.into(),
        }
    }

    /// Build a [`DrapeError::ChannelMismatch`] value.
    pub fn channel_mismatch(msg: impl Into<String>) -> Self {
        Self::ChannelMismatch(msg.into())
    }

    /// Build a [`DrapeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DrapeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Returns `true` for [`DrapeError::MissingAsset`].
    pub fn is_missing_asset(&self) -> bool {
        matches!(self, Self::MissingAsset { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
