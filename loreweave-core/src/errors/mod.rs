//! Per-subsystem error enums. One bad rule or lore entry never aborts a
//! build; only boundary failures surface here.

mod activation_error;
mod build_error;
mod convert_error;

pub use activation_error::VectorSearchError;
pub use build_error::BuildError;
pub use convert_error::ConvertError;
