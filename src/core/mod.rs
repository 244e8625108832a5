//! Shared domain primitives.
//!
//! These types sit below the agent machinery so the workflow engine, the
//! retrieval boundary, and the CLI can share them without pulling in
//! provider code.

pub mod context;
pub mod passage;
pub mod verdict;

pub use context::assemble;
pub use passage::Passage;
pub use verdict::{RelevanceVerdict, Verdict};
