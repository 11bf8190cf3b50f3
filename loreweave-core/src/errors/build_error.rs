use super::activation_error::VectorSearchError;
use super::convert_error::ConvertError;

/// Errors surfaced by a whole-prompt build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    VectorSearch(#[from] VectorSearchError),

    #[error(transparent)]
    Convert(#[from] ConvertError),
}
