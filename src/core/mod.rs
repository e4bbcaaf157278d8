//! Core battle data types

pub mod board;
pub mod card;
pub mod player;

pub use board::{BoardState, BOT_PLAYER_INDEX, PLAYER_COUNT, TOP_PLAYER_INDEX};
pub use card::{CardData, CardEffect, CardFamily, CardId, CardRegistry};
pub use player::{
    modifier_masks, BoardModifiers, CardStatType, PlayerState, StatOverrides, MAX_BOARD_CARDS,
    MAX_HELD_CARDS, STARTING_HEALTH,
};
