//! # loreweave-activation
//!
//! Decides which lore entries fire for a given context, and in what
//! order. Iterative fixed-point evaluation with a bounded number of
//! recursion passes; probability gating; optional vector-search trigger.

mod engine;
mod trigger;

pub use engine::{ActivationEngine, VectorSearch};
