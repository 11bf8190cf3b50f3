//! # loreweave-assemble
//!
//! Merges enabled preset blocks, activated lore entries, and linear chat
//! history into one ordered, tagged item sequence. Relative blocks form
//! the skeleton; fixed blocks and fixed lore entries are injected into
//! the chat history at their declared depth.

mod assembler;

pub use assembler::{assemble, AssembleParams, HistoryNode};
