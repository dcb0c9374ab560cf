//! # Factotum Testing
//!
//! Deterministic doubles for the model boundary and the tool surface, plus
//! a harness that drives a full session through scripted exchanges.

mod harness;
mod mock_tools;
mod scripted;

pub use harness::{HarnessReport, SessionHarness};
pub use mock_tools::RecordingTool;
pub use scripted::{FailingModel, ScriptedModel};
