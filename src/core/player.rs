//! Per-player battle state

use crate::core::card::{CardData, CardId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hand size ceiling; draws into a full hand are burned
pub const MAX_HELD_CARDS: usize = 6;

/// Board size ceiling, enforced by the rule engine
pub const MAX_BOARD_CARDS: usize = 5;

/// Health both players start a battle with
pub const STARTING_HEALTH: i32 = 30;

/// Stat kinds that can be overridden per card or modified board-wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardStatType {
    Damage,
    Weight,
}

/// Sparse per-card stat overrides
pub type StatOverrides = FxHashMap<CardStatType, i32>;

/// Board-wide effect flags, one bit each
///
/// Flags live on the player they affect and are cleared at that player's
/// end-of-turn cleanup.
pub mod modifier_masks {
    pub const NONE: u32 = 0;
    /// The next non-spell card played is destroyed by a trap
    pub const KILL_NEXT: u32 = 1 << 0;
    /// A board-wide debuff is active (the stat delta itself lives in
    /// `global_stat_modifiers`)
    pub const BOARD_DEBUFF: u32 = 1 << 1;
}

/// Board-wide modifiers for one player's side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardModifiers {
    /// Bitmask over `modifier_masks`
    pub modifier_mask: u32,

    /// Stat deltas applied to every affected card on this side
    pub global_stat_modifiers: StatOverrides,
}

/// Mutable state for one player
///
/// Plain data; all mutation happens through the action pipeline, and the
/// invariants (health >= 0, ammo >= 0 after a legal play) are preserved
/// by the actions, not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Deck pool: draws sample from this uniformly, with replacement
    pub deck_cards: Vec<CardId>,

    /// Hand, in selection order
    pub held_cards: Vec<CardId>,

    /// Cards in play, oldest first
    pub board_cards: Vec<CardId>,

    /// Index-aligned with `held_cards`; may be shorter (missing tail
    /// means no overrides)
    pub held_card_stat_overrides: Vec<StatOverrides>,

    /// Index-aligned with `board_cards`; may be shorter
    pub board_card_stat_overrides: Vec<StatOverrides>,

    pub board_modifiers: BoardModifiers,

    pub health: i32,

    /// Poison accumulated from insect hits; dealt and reset at the start
    /// of this player's turn
    pub poison_stack: i32,

    /// Grows by one each of this player's turns
    pub total_weight_ammo: i32,

    /// Refilled to `total_weight_ammo` at turn start, spent on plays
    pub current_weight_ammo: i32,

    /// Board cards marked dead, compacted out at end-of-turn cleanup.
    /// BTreeSet so iteration order is deterministic.
    pub board_card_indices_to_destroy: BTreeSet<usize>,
}

impl PlayerState {
    pub fn new(deck_cards: Vec<CardId>) -> Self {
        PlayerState {
            deck_cards,
            held_cards: Vec::new(),
            board_cards: Vec::new(),
            held_card_stat_overrides: Vec::new(),
            board_card_stat_overrides: Vec::new(),
            board_modifiers: BoardModifiers::default(),
            health: STARTING_HEALTH,
            poison_stack: 0,
            total_weight_ammo: 0,
            current_weight_ammo: 0,
            board_card_indices_to_destroy: BTreeSet::new(),
        }
    }

    /// Effective weight of a held card: per-index override if present,
    /// else base; non-spells additionally pay the global weight
    /// modifier. Never negative.
    pub fn effective_held_weight(&self, card: &CardData, hand_index: usize) -> i32 {
        let mut weight = self
            .held_card_stat_overrides
            .get(hand_index)
            .and_then(|ov| ov.get(&CardStatType::Weight).copied())
            .unwrap_or(card.weight);

        if !card.is_spell() {
            if let Some(modifier) = self
                .board_modifiers
                .global_stat_modifiers
                .get(&CardStatType::Weight)
            {
                weight += modifier;
            }
        }

        weight.max(0)
    }

    /// Effective damage of a board card: per-index override if present,
    /// else base, plus the global damage modifier. Never negative.
    pub fn effective_board_damage(&self, card: &CardData, board_index: usize) -> i32 {
        let mut damage = self
            .board_card_stat_overrides
            .get(board_index)
            .and_then(|ov| ov.get(&CardStatType::Damage).copied())
            .unwrap_or(card.damage);

        if let Some(modifier) = self
            .board_modifiers
            .global_stat_modifiers
            .get(&CardStatType::Damage)
        {
            damage += modifier;
        }

        damage.max(0)
    }

    /// Set a held-card stat override, growing the override list to reach
    /// the index if needed.
    pub fn set_held_override(&mut self, hand_index: usize, stat: CardStatType, value: i32) {
        if self.held_card_stat_overrides.len() <= hand_index {
            self.held_card_stat_overrides
                .resize(hand_index + 1, StatOverrides::default());
        }
        self.held_card_stat_overrides[hand_index].insert(stat, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::CardRegistry;

    fn creature(registry: &CardRegistry) -> CardData {
        registry
            .all_card_ids()
            .iter()
            .map(|id| registry.get(*id).clone())
            .find(|c| !c.is_spell())
            .unwrap()
    }

    #[test]
    fn test_effective_weight_prefers_override() {
        let registry = CardRegistry::standard();
        let card = creature(&registry);
        let mut player = PlayerState::new(vec![card.id]);
        player.held_cards.push(card.id);

        assert_eq!(player.effective_held_weight(&card, 0), card.weight);

        player.set_held_override(0, CardStatType::Weight, card.weight + 3);
        assert_eq!(player.effective_held_weight(&card, 0), card.weight + 3);
    }

    #[test]
    fn test_effective_weight_applies_global_surcharge() {
        let registry = CardRegistry::standard();
        let card = creature(&registry);
        let mut player = PlayerState::new(vec![card.id]);
        player.held_cards.push(card.id);
        player
            .board_modifiers
            .global_stat_modifiers
            .insert(CardStatType::Weight, 2);

        assert_eq!(player.effective_held_weight(&card, 0), card.weight + 2);
    }

    #[test]
    fn test_effective_damage_floors_at_zero() {
        let registry = CardRegistry::standard();
        let card = creature(&registry);
        let mut player = PlayerState::new(vec![card.id]);
        player.board_cards.push(card.id);
        player
            .board_modifiers
            .global_stat_modifiers
            .insert(CardStatType::Damage, -100);

        assert_eq!(player.effective_board_damage(&card, 0), 0);
    }

    #[test]
    fn test_override_growth_is_sparse() {
        let registry = CardRegistry::standard();
        let card = creature(&registry);
        let mut player = PlayerState::new(vec![card.id]);
        player.held_cards = vec![card.id; 4];
        player.set_held_override(2, CardStatType::Damage, 9);

        assert_eq!(player.held_card_stat_overrides.len(), 3);
        assert!(player.held_card_stat_overrides[0].is_empty());
        assert!(player.held_card_stat_overrides[1].is_empty());
        assert_eq!(
            player.held_card_stat_overrides[2].get(&CardStatType::Damage),
            Some(&9)
        );
    }
}
