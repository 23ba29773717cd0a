use thiserror::Error;

/// Configuration errors. Nothing at runtime surfaces an error; a broken
/// config falls back to defaults.
#[derive(Debug, Error)]
pub enum Error {
    /// Root margin is not a 1-4 value CSS length shorthand
    #[error("invalid root margin {0:?}: expected 1 to 4 lengths in px or %")]
    InvalidRootMargin(String),

    /// Embedded JSON config could not be parsed
    #[error("invalid navigation config: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
