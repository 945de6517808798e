/// Result alias used at the configuration boundary.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors raised while loading or validating scene inputs.
///
/// Playback itself never produces these: the per-frame path degrades to silence instead.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// A value is outside its allowed range or shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// A configuration document is inconsistent.
    #[error("config error: {0}")]
    Config(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other failure with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SceneError {
    /// Build a [`SceneError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SceneError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SceneError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}
