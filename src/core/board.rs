//! The authoritative board state

use crate::core::card::CardId;
use crate::core::player::PlayerState;
use serde::{Deserialize, Serialize};

/// Number of players in a standard battle
pub const PLAYER_COUNT: usize = 2;

/// Index of the top (remote) player
pub const TOP_PLAYER_INDEX: usize = 0;

/// Index of the bottom (local) player
pub const BOT_PLAYER_INDEX: usize = 1;

/// Complete mutable state of one battle
///
/// Owned exclusively by the action engine; every mutation flows through
/// an action's state-application step. Pure data plus accessors - no
/// invariant is self-enforcing here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    pub player_states: Vec<PlayerState>,

    /// Always a valid index into `player_states`
    pub active_player_index: usize,

    /// Incremented by every turn advance
    pub turn_counter: u32,
}

impl BoardState {
    /// Fresh battle state: both players at starting health with their
    /// deck pools, empty hands and boards.
    ///
    /// The bottom player starts as the nominal active player; the first
    /// turn-advance action flips to the top player, who therefore takes
    /// the first turn.
    pub fn new_battle(top_deck: Vec<CardId>, bot_deck: Vec<CardId>) -> Self {
        BoardState {
            player_states: vec![PlayerState::new(top_deck), PlayerState::new(bot_deck)],
            active_player_index: BOT_PLAYER_INDEX,
            turn_counter: 0,
        }
    }

    pub fn player_count(&self) -> usize {
        self.player_states.len()
    }

    pub fn active_player(&self) -> &PlayerState {
        &self.player_states[self.active_player_index]
    }

    pub fn active_player_mut(&mut self) -> &mut PlayerState {
        &mut self.player_states[self.active_player_index]
    }

    pub fn inactive_player_index(&self) -> usize {
        (self.active_player_index + 1) % self.player_states.len()
    }

    pub fn inactive_player(&self) -> &PlayerState {
        &self.player_states[self.inactive_player_index()]
    }

    pub fn inactive_player_mut(&mut self) -> &mut PlayerState {
        let index = self.inactive_player_index();
        &mut self.player_states[index]
    }

    /// The opponent of `player_index` in a two-player battle
    pub fn opponent_index(&self, player_index: usize) -> usize {
        (player_index + 1) % self.player_states.len()
    }

    /// A battle is over once either player is at zero health
    pub fn is_terminal(&self) -> bool {
        self.player_states.iter().any(|p| p.health <= 0)
    }

    /// Index of the winner, if the battle is over
    pub fn victor_index(&self) -> Option<usize> {
        self.player_states
            .iter()
            .position(|p| p.health <= 0)
            .map(|loser| self.opponent_index(loser))
    }
}

impl std::fmt::Display for BoardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "turn {} | active player {}",
            self.turn_counter, self.active_player_index
        )?;
        for (index, player) in self.player_states.iter().enumerate() {
            writeln!(
                f,
                "player {}: health {} | ammo {}/{} | poison {}",
                index,
                player.health,
                player.current_weight_ammo,
                player.total_weight_ammo,
                player.poison_stack
            )?;
            writeln!(
                f,
                "  held  {:?}",
                player.held_cards.iter().map(|c| c.0).collect::<Vec<_>>()
            )?;
            writeln!(
                f,
                "  board {:?}",
                player.board_cards.iter().map(|c| c.0).collect::<Vec<_>>()
            )?;
        }
        Ok(())
    }
}
