//! # loreweave-build
//!
//! The top of the stack: one async call that takes a preset, an optional
//! character, global lore/rule inputs, and a chat history, and returns
//! the fully staged prompt in the requested wire shape.
//!
//! Everything below this crate is synchronous except the single awaited
//! vector-search callback inside activation.

mod orchestrator;
mod params;

pub use orchestrator::build_prompt;
pub use params::{
    BuildOptions, BuildParams, BuildResult, BuildStages, GlobalInputs, SystemRolePolicy,
};
