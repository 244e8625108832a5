//! Event-driven workflow engine.
//!
//! Pipeline sequencing is expressed as explicit state machines: typed
//! events ([`WorkflowEvent`]) drive step functions, and a typed state
//! struct ([`RunState`]) accumulates each step's output. Failures are a
//! first-class terminal state carrying the faulting [`Stage`], not an
//! exception unwinding through the stack.

pub mod engine;
pub mod event;
pub mod state;

pub use engine::{AggregatorWorkflow, AnalystWorkflow};
pub use event::{Stage, WorkflowEvent};
pub use state::RunState;
