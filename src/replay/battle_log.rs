//! The battle log data model
//!
//! One log is sufficient to reproduce a battle exactly: the RNG seed,
//! both starting deck pools, and every externally enqueued, loggable
//! action in execution order. Chained actions are not recorded - they
//! are re-derived by their parents during replay.

use crate::core::CardId;
use crate::game::actions::ParamMap;
use serde::{Deserialize, Serialize};

/// One recorded action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedAction {
    pub name: String,

    /// String-typed parameters; omitted from the file when empty
    #[serde(
        rename = "extraActionParams",
        default,
        skip_serializing_if = "ParamMap::is_empty"
    )]
    pub extra_action_params: ParamMap,
}

/// A complete recorded battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLog {
    pub seed: u64,

    #[serde(rename = "top_deck")]
    pub top_deck: Vec<CardId>,

    #[serde(rename = "bot_deck")]
    pub bot_deck: Vec<CardId>,

    pub actions: Vec<LoggedAction>,
}

impl BattleLog {
    pub fn new(seed: u64, top_deck: Vec<CardId>, bot_deck: Vec<CardId>) -> Self {
        BattleLog {
            seed,
            top_deck,
            bot_deck,
            actions: Vec::new(),
        }
    }
}
