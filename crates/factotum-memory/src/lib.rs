//! # Factotum Memory
//!
//! Semantic long-term fact store. Facts are embedded into fixed-size unit
//! vectors; similarity-based lookup drives recall, duplicate detection and
//! deletion. Entries persist in a JSON file next to the session.

mod encoder;
mod store;

pub use encoder::FactEncoder;
pub use store::{ForgetOutcome, MemoryMatch, RememberOutcome, SemanticMemory};
