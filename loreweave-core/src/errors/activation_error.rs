/// Activation subsystem errors.
///
/// The activation engine degrades silently on bad entries; the only
/// failure it surfaces is a failing vector-search callback, which aborts
/// the run because no activation result is meaningful without it.
#[derive(Debug, thiserror::Error)]
pub enum VectorSearchError {
    #[error("vector search callback failed: {reason}")]
    CallbackFailed { reason: String },
}
