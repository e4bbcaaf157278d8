//! Game actions: the closed set of battle state transitions
//!
//! Every mutation of the board state is one of these variants. The enum
//! doubles as the action registry: names are derived from the variants
//! and the per-kind required-parameter lists live in one table, so the
//! battle log can round-trip actions by name without any runtime
//! registration.

use crate::core::CardId;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// String-keyed parameter map, used only at the battle-log boundary
///
/// BTreeMap so serialized parameter order is canonical.
pub type ParamMap = BTreeMap<String, String>;

/// Trap flavors surfaced by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapTrigger {
    Kill,
    Debuff,
}

/// One atomic unit of board-state mutation plus optional presentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameAction {
    /// Sentinel occupying the queue whenever no real work is pending
    Idle,

    /// Active player draws one card from their deck pool
    DrawCard,

    /// Active player plays the held card at `hand_index`
    PlayCard { hand_index: usize },

    /// Resolve the effect of a spell that was just played
    CardEffect { card_id: CardId },

    /// The board card at `card_index` of `player_index` strikes the
    /// opposing player
    CardAttack {
        player_index: usize,
        card_index: usize,
    },

    /// Destroy board cards of `player_index`. A trap trigger removes the
    /// newest card immediately; otherwise the indices are marked and
    /// compacted out at end-of-turn cleanup.
    CardDestruction {
        card_indices: SmallVec<[usize; 4]>,
        player_index: usize,
        trap_trigger: bool,
    },

    /// Active player takes their accumulated poison damage
    PoisonTick,

    /// Advance the turn to the other player
    NextPlayer,

    /// End-of-turn cleanup for the player whose turn just ended
    PostNextPlayer,

    /// Presentation-only marker that a trap fired
    TrapTriggered { trigger: TrapTrigger },

    /// The battle is decided
    GameOver { victor_index: usize },
}

/// Names of all registered action kinds, sorted
pub const REGISTERED_ACTION_NAMES: &[&str] = &[
    "CardAttack",
    "CardDestruction",
    "CardEffect",
    "DrawCard",
    "GameOver",
    "Idle",
    "NextPlayer",
    "PlayCard",
    "PoisonTick",
    "PostNextPlayer",
    "TrapTriggered",
];

const HAND_INDEX_PARAM: &str = "handIndex";
const CARD_ID_PARAM: &str = "cardId";
const CARD_INDEX_PARAM: &str = "cardIndex";
const CARD_INDICES_PARAM: &str = "cardIndices";
const PLAYER_INDEX_PARAM: &str = "playerIndex";
const IS_TRAP_TRIGGER_PARAM: &str = "isTrapTrigger";
const TRAP_TRIGGER_TYPE_PARAM: &str = "trapTriggerType";
const VICTOR_INDEX_PARAM: &str = "victorIndex";

impl GameAction {
    /// Stable symbolic name, used in the battle log and for queue
    /// inspection
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::Idle => "Idle",
            GameAction::DrawCard => "DrawCard",
            GameAction::PlayCard { .. } => "PlayCard",
            GameAction::CardEffect { .. } => "CardEffect",
            GameAction::CardAttack { .. } => "CardAttack",
            GameAction::CardDestruction { .. } => "CardDestruction",
            GameAction::PoisonTick => "PoisonTick",
            GameAction::NextPlayer => "NextPlayer",
            GameAction::PostNextPlayer => "PostNextPlayer",
            GameAction::TrapTriggered { .. } => "TrapTriggered",
            GameAction::GameOver { .. } => "GameOver",
        }
    }

    /// Parameters an entry for this kind must carry in the battle log
    ///
    /// Panics on an unregistered name: action names only come from
    /// internal code paths and the (checksummed) log, so a miss is an
    /// internal defect, not bad input.
    pub fn required_param_names(name: &str) -> &'static [&'static str] {
        match name {
            "Idle" | "DrawCard" | "PoisonTick" | "NextPlayer" | "PostNextPlayer" => &[],
            "PlayCard" => &[HAND_INDEX_PARAM],
            "CardEffect" => &[CARD_ID_PARAM],
            "CardAttack" => &[PLAYER_INDEX_PARAM, CARD_INDEX_PARAM],
            "CardDestruction" => &[CARD_INDICES_PARAM, PLAYER_INDEX_PARAM, IS_TRAP_TRIGGER_PARAM],
            "TrapTriggered" => &[TRAP_TRIGGER_TYPE_PARAM],
            "GameOver" => &[VICTOR_INDEX_PARAM],
            _ => panic!("Unregistered game action name: {}", name),
        }
    }

    /// Whether executed instances of this kind belong in the battle log
    ///
    /// Presentation-only and purely informational kinds return false;
    /// the idle sentinel never executes anything.
    pub fn should_be_logged(&self) -> bool {
        !matches!(
            self,
            GameAction::Idle | GameAction::TrapTriggered { .. } | GameAction::GameOver { .. }
        )
    }

    /// Build an action from a log entry
    ///
    /// Any missing or malformed required parameter is a fatal
    /// programming error: entries are produced by this crate's own
    /// serializer and verified by checksum before reaching here.
    pub fn from_log_entry(name: &str, params: &ParamMap) -> GameAction {
        for required in Self::required_param_names(name) {
            assert!(
                params.contains_key(*required),
                "Action {} is missing required parameter {}",
                name,
                required
            );
        }

        match name {
            "Idle" => GameAction::Idle,
            "DrawCard" => GameAction::DrawCard,
            "PlayCard" => GameAction::PlayCard {
                hand_index: parse_usize(params, HAND_INDEX_PARAM),
            },
            "CardEffect" => GameAction::CardEffect {
                card_id: CardId::new(parse_usize(params, CARD_ID_PARAM) as u32),
            },
            "CardAttack" => GameAction::CardAttack {
                player_index: parse_usize(params, PLAYER_INDEX_PARAM),
                card_index: parse_usize(params, CARD_INDEX_PARAM),
            },
            "CardDestruction" => GameAction::CardDestruction {
                card_indices: parse_index_list(params, CARD_INDICES_PARAM),
                player_index: parse_usize(params, PLAYER_INDEX_PARAM),
                trap_trigger: parse_bool(params, IS_TRAP_TRIGGER_PARAM),
            },
            "PoisonTick" => GameAction::PoisonTick,
            "NextPlayer" => GameAction::NextPlayer,
            "PostNextPlayer" => GameAction::PostNextPlayer,
            "TrapTriggered" => GameAction::TrapTriggered {
                trigger: match params[TRAP_TRIGGER_TYPE_PARAM].as_str() {
                    "kill" => TrapTrigger::Kill,
                    "debuff" => TrapTrigger::Debuff,
                    other => panic!("Unknown trap trigger type: {}", other),
                },
            },
            "GameOver" => GameAction::GameOver {
                victor_index: parse_usize(params, VICTOR_INDEX_PARAM),
            },
            _ => panic!("Unregistered game action name: {}", name),
        }
    }

    /// Flatten this action into log-boundary parameters
    ///
    /// All values are encoded as strings; numeric parameters use their
    /// decimal form and booleans "true"/"false".
    pub fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        match self {
            GameAction::Idle
            | GameAction::DrawCard
            | GameAction::PoisonTick
            | GameAction::NextPlayer
            | GameAction::PostNextPlayer => {}
            GameAction::PlayCard { hand_index } => {
                params.insert(HAND_INDEX_PARAM.into(), hand_index.to_string());
            }
            GameAction::CardEffect { card_id } => {
                params.insert(CARD_ID_PARAM.into(), card_id.to_string());
            }
            GameAction::CardAttack {
                player_index,
                card_index,
            } => {
                params.insert(PLAYER_INDEX_PARAM.into(), player_index.to_string());
                params.insert(CARD_INDEX_PARAM.into(), card_index.to_string());
            }
            GameAction::CardDestruction {
                card_indices,
                player_index,
                trap_trigger,
            } => {
                params.insert(CARD_INDICES_PARAM.into(), encode_index_list(card_indices));
                params.insert(PLAYER_INDEX_PARAM.into(), player_index.to_string());
                params.insert(IS_TRAP_TRIGGER_PARAM.into(), trap_trigger.to_string());
            }
            GameAction::TrapTriggered { trigger } => {
                let value = match trigger {
                    TrapTrigger::Kill => "kill",
                    TrapTrigger::Debuff => "debuff",
                };
                params.insert(TRAP_TRIGGER_TYPE_PARAM.into(), value.into());
            }
            GameAction::GameOver { victor_index } => {
                params.insert(VICTOR_INDEX_PARAM.into(), victor_index.to_string());
            }
        }
        params
    }
}

fn parse_usize(params: &ParamMap, key: &str) -> usize {
    params[key]
        .parse()
        .unwrap_or_else(|_| panic!("Parameter {} is not an index: {:?}", key, params[key]))
}

fn parse_bool(params: &ParamMap, key: &str) -> bool {
    match params[key].as_str() {
        "true" => true,
        "false" => false,
        other => panic!("Parameter {} is not a boolean: {:?}", key, other),
    }
}

/// Index lists are encoded "[1,3,5]"
fn encode_index_list(indices: &[usize]) -> String {
    let joined = indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("[{}]", joined)
}

fn parse_index_list(params: &ParamMap, key: &str) -> SmallVec<[usize; 4]> {
    let raw = params[key].as_str();
    let inner = raw
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or_else(|| panic!("Parameter {} is not an index list: {:?}", key, raw));
    if inner.is_empty() {
        return SmallVec::new();
    }
    inner
        .split(',')
        .map(|part| {
            part.trim()
                .parse()
                .unwrap_or_else(|_| panic!("Parameter {} is not an index list: {:?}", key, raw))
        })
        .collect()
}
