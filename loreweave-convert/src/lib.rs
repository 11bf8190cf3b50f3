//! # loreweave-convert
//!
//! The boundary layer. Normalizers turn heterogeneous caller JSON (lore
//! files, rule files, several legacy spellings) into validated core
//! types, and the channel layer converts chat histories between external
//! wire shapes and the internal segment-shaped messages.
//!
//! The engine crates never see raw JSON; everything crosses this boundary
//! first.

mod channels;
mod normalize;

pub use channels::{
    detect_format, messages_in, messages_out, FlatMessage, StageOutput, WireFormat,
};
pub use normalize::{merge_rules, normalize_lore, normalize_rules};
