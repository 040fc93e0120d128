//! Conversational concierge engine
//!
//! Two halves, both pure of UI concerns:
//! - [`decide_intent`]: rule-based classification of free-text utterances
//!   into a typed intent with extracted filters. Deterministic, no I/O.
//! - [`ScriptExecutor`]: runs one conversational turn for a classified (or
//!   widget-supplied) intent, calling backend collaborators and building
//!   widget messages, returning the updated session state.

pub mod classifier;
pub mod copy;
pub mod executor;
pub mod vocab;

pub use classifier::decide_intent;
pub use executor::{ScriptExecutor, TurnOutcome, TurnRequest};
