//! Battle legality rules
//!
//! Pure predicates over a board snapshot. The engine itself trusts its
//! callers; policies (and any interactive frontend) consult these
//! before enqueuing plays, evaluating against copies when planning
//! ahead so speculation never touches the authoritative state.

use crate::core::{BoardState, CardData, CardFamily, MAX_BOARD_CARDS};

/// Stateless rule checks
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        RuleEngine
    }

    /// Whether `player_index` may legally play `card` from hand slot
    /// `card_index` against this board.
    ///
    /// Checks, in order: the board-capacity ceiling, the Titan crowding
    /// exception, and the effective weight against the player's current
    /// ammo (per-slot override and global weight surcharge included).
    pub fn can_card_be_played(
        &self,
        card: &CardData,
        card_index: usize,
        player_index: usize,
        board: &BoardState,
    ) -> bool {
        let player = &board.player_states[player_index];

        if player.board_cards.len() >= MAX_BOARD_CARDS {
            return false;
        }

        // Titans refuse a crowded board
        if card.family == CardFamily::Titans && player.board_cards.len() > 1 {
            return false;
        }

        player.effective_held_weight(card, card_index) <= player.current_weight_ammo
    }
}
