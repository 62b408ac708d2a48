use thiserror::Error;

/// Errors produced while loading `*.interaction.ron` assets
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AssetLoaderError {
    #[error("could not read asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse RON: {0}")]
    RonSpannedError(#[from] ron::error::SpannedError),
}
