//! Qualification funnel.
//!
//! The per-turn state machine plus the pieces it consults: greeting
//! detection, birth date parsing and reason classification.

mod classifier;
mod date_parser;
mod greeting;
mod machine;
pub mod reasons;
pub mod replies;

pub use classifier::{fallback_score, SimilarityClassifier};
pub use date_parser::parse_date;
pub use greeting::{is_greeting, GREETINGS};
pub use machine::{FunnelOutcome, FunnelStateMachine, DEFAULT_QUALIFICATION_THRESHOLD};
