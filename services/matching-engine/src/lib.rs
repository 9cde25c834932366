//! Matching Engine Service
//!
//! Pairs anonymous users through a persisted FIFO search queue and manages
//! the lifecycle of the conversation rooms they end up in.
//!
//! **Key Invariants:**
//! - A user appears at most once in the search queue
//! - The longest-waiting searcher is paired first
//! - Every member of a live room points back at it; a deleted room has no
//!   member still pointing at it
//! - Room identifiers are unique and never reused
//!
//! Multi-step updates are serialized by two exclusive sections: one for the
//! search queue, one for room membership (see [`sections`]).

pub mod engine;
pub mod error;
pub mod registry;
pub mod sections;

pub use engine::MatchingEngine;
pub use error::{EngineError, EngineResult};
