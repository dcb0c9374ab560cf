//! # Factotum Agent
//!
//! The orchestration loop: drives one user request through bounded
//! model/tool round trips, and the Gemini client that implements the
//! model boundary.

mod gemini;
mod session;

pub use gemini::GeminiModel;
pub use session::{CancelFlag, Session, TurnOutcome};
