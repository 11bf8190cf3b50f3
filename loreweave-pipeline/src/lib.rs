//! # loreweave-pipeline
//!
//! The per-item text pipeline: raw → macro-expanded → regex-rewritten,
//! with every stage retained. Macro expansion resolves variable macros
//! before plain key macros; regex rewriting walks the caller-merged rule
//! list in order, skipping rules whose target/view/depth filters exclude
//! the item.

mod apply;
mod macros;
mod pattern;
mod stages;

pub use apply::apply_rules;
pub use macros::expand_macros;
pub use stages::{process_item, run_pipeline, PipelineOutput, PipelineParams};
