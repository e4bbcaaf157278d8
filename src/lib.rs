//! Card Duel - deterministic two-player card battle core
//!
//! The authoritative battle simulation behind a card battler: an ordered
//! action queue driving all state transitions, a rule-validation layer,
//! and a checksummed action log for bit-exact replay.

pub mod core;
pub mod game;
pub mod replay;
pub mod error;

pub use error::{DuelError, Result};
