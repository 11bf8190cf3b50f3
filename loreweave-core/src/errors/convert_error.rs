/// Message-shape conversion errors.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Tag and target provenance is lost once items become plain messages,
    /// so the tagged shape cannot be reconstructed backwards. Callers that
    /// need it must retain the tagged stage instead.
    #[error("cannot reconstruct tagged items from internal messages: provenance is lost")]
    TaggedUnsupported,
}
