//! Greedy action generation for a non-interactive player
//!
//! Plans a whole turn against a simulated copy of the board, then
//! enqueues the chosen actions through the normal pipeline. The policy
//! never touches the authoritative state directly.

use crate::core::{BoardState, CardData, CardEffect, CardRegistry};
use crate::game::actions::GameAction;
use crate::game::engine::GameActionEngine;
use crate::game::rules::RuleEngine;
use smallvec::SmallVec;

/// Outcome of one planning pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPlan {
    /// The turn was ended with a turn-advance action
    TurnEnded,
    /// A draw spell was played; re-plan once the drawn cards exist
    AwaitingDraws,
}

/// Greedy turn planner
///
/// Orders the hand by descending damage (draw spells first, since the
/// cards they add may enable better plays), plays everything the rule
/// engine allows against a running simulated copy of the board, and
/// finishes with a turn advance.
#[derive(Debug, Default)]
pub struct GreedyPolicy {
    rules: RuleEngine,
}

impl GreedyPolicy {
    pub fn new() -> Self {
        GreedyPolicy {
            rules: RuleEngine::new(),
        }
    }

    /// Decide the active player's actions and enqueue them
    pub fn decide_and_enqueue(&self, engine: &mut GameActionEngine) -> TurnPlan {
        let (actions, plan) = {
            let snapshot = engine.board().clone();
            self.plan(&snapshot, engine.registry())
        };
        for action in actions {
            engine.enqueue(action);
        }
        plan
    }

    /// Plan against an immutable snapshot; pure apart from the clone
    pub fn plan(
        &self,
        snapshot: &BoardState,
        registry: &CardRegistry,
    ) -> (SmallVec<[GameAction; 8]>, TurnPlan) {
        let mut simulated = snapshot.clone();
        let player_index = simulated.active_player_index;

        // Sort a copy of the hand by play priority; indices into the
        // simulated hand are recomputed per play since earlier plays
        // shift them
        let mut candidates: Vec<_> = simulated.active_player().held_cards.clone();
        candidates.sort_by(|lhs, rhs| {
            let lhs = registry.get(*lhs);
            let rhs = registry.get(*rhs);
            is_draw_spell(rhs)
                .cmp(&is_draw_spell(lhs))
                .then(rhs.damage.cmp(&lhs.damage))
                .then(lhs.id.cmp(&rhs.id))
        });

        let mut actions: SmallVec<[GameAction; 8]> = SmallVec::new();
        let mut awaiting_draws = false;

        for candidate in candidates {
            let card: CardData = registry.get(candidate).clone();

            // Index of this card in the simulated hand right now
            let hand_index = match simulated
                .active_player()
                .held_cards
                .iter()
                .position(|id| *id == card.id)
            {
                Some(index) => index,
                None => continue,
            };

            if !self
                .rules
                .can_card_be_played(&card, hand_index, player_index, &simulated)
            {
                continue;
            }

            actions.push(GameAction::PlayCard { hand_index });

            // Mirror the play onto the simulated copy
            let player = simulated.active_player_mut();
            let weight = player.effective_held_weight(&card, hand_index);
            if hand_index < player.held_card_stat_overrides.len() {
                player.held_card_stat_overrides.remove(hand_index);
            }
            player.held_cards.remove(hand_index);
            player.current_weight_ammo -= weight;
            if !card.is_spell() {
                player.board_cards.push(card.id);
            }

            if is_draw_spell(&card) {
                // The drawn cards are unknown until the chain resolves
                awaiting_draws = true;
                break;
            }
        }

        if awaiting_draws {
            (actions, TurnPlan::AwaitingDraws)
        } else {
            actions.push(GameAction::NextPlayer);
            (actions, TurnPlan::TurnEnded)
        }
    }
}

fn is_draw_spell(card: &CardData) -> bool {
    matches!(card.effect, Some(CardEffect::GainDraws(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoardState, CardId, CardRegistry, MAX_BOARD_CARDS};
    use crate::game::engine::{EngineMode, GameActionEngine};

    fn find_card(registry: &CardRegistry, name: &str) -> CardId {
        registry
            .all_card_ids()
            .into_iter()
            .find(|id| registry.get(*id).name == name)
            .unwrap_or_else(|| panic!("no card named {}", name))
    }

    fn engine_with_hand(hand: Vec<CardId>, ammo: i32) -> GameActionEngine {
        let registry = CardRegistry::standard();
        let deck = registry.all_card_ids();
        let board = BoardState::new_battle(deck.clone(), deck);
        let mut engine = GameActionEngine::new(EngineMode::Headless, 21, board, registry);
        {
            let player = engine.board_mut().active_player_mut();
            player.held_cards = hand;
            player.total_weight_ammo = ammo;
            player.current_weight_ammo = ammo;
        }
        engine
    }

    #[test]
    fn test_plays_affordable_cards_by_descending_damage() {
        let registry = CardRegistry::standard();
        let firefly = find_card(&registry, "Firefly"); // 1 dmg, 1 weight
        let mantis = find_card(&registry, "Mantis"); // 3 dmg, 2 weight
        let iguana = find_card(&registry, "Iguana"); // 4 dmg, 3 weight

        let mut engine = engine_with_hand(vec![firefly, mantis, iguana], 5);
        let policy = GreedyPolicy::new();
        let plan = policy.decide_and_enqueue(&mut engine);
        engine.run_until_idle(0.0);

        assert_eq!(plan, TurnPlan::TurnEnded);
        // Iguana (4 dmg) then mantis (3 dmg) fit in 5 ammo; firefly no
        // longer does. Board order records the play order.
        let played = &engine.board().player_states[1].board_cards;
        assert_eq!(played, &vec![iguana, mantis]);
        // Turn was advanced
        assert_eq!(engine.board().active_player_index, 0);
    }

    #[test]
    fn test_policy_respects_titan_crowding() {
        let registry = CardRegistry::standard();
        let vole = find_card(&registry, "Vole");
        let mammoth = find_card(&registry, "Mammoth"); // Titan

        let mut engine = engine_with_hand(vec![mammoth], 20);
        {
            let player = engine.board_mut().active_player_mut();
            player.board_cards = vec![vole, vole];
        }
        let policy = GreedyPolicy::new();
        policy.decide_and_enqueue(&mut engine);
        engine.run_until_idle(0.0);

        // Two cards on board: the mammoth stays in hand
        let player = &engine.board().player_states[1];
        assert_eq!(player.held_cards, vec![mammoth]);
        assert_eq!(player.board_cards.len(), 2);
    }

    #[test]
    fn test_policy_respects_board_capacity() {
        let registry = CardRegistry::standard();
        let vole = find_card(&registry, "Vole");

        let mut engine = engine_with_hand(vec![vole; 4], 20);
        {
            let player = engine.board_mut().active_player_mut();
            player.board_cards = vec![vole; MAX_BOARD_CARDS - 1];
        }
        let policy = GreedyPolicy::new();
        policy.decide_and_enqueue(&mut engine);
        engine.run_until_idle(0.0);

        let player = &engine.board().player_states[1];
        assert_eq!(player.board_cards.len(), MAX_BOARD_CARDS);
        assert_eq!(player.held_cards.len(), 3);
    }

    #[test]
    fn test_draw_spell_pauses_planning() {
        let registry = CardRegistry::standard();
        let swarm_call = find_card(&registry, "Swarm Call");
        let mantis = find_card(&registry, "Mantis");

        let mut engine = engine_with_hand(vec![mantis, swarm_call], 10);
        {
            // Pin the deck pool so the chained draws stay predictable
            let vole = find_card(engine.registry(), "Vole");
            engine.board_mut().active_player_mut().deck_cards = vec![vole];
        }
        let policy = GreedyPolicy::new();

        let plan = policy.decide_and_enqueue(&mut engine);
        assert_eq!(plan, TurnPlan::AwaitingDraws);
        engine.run_until_idle(0.0);

        // The spell resolved and drew cards; the mantis is still in hand
        let player = engine.board().active_player();
        assert!(player.held_cards.contains(&mantis));
        assert_eq!(player.held_cards.len(), 3);
        // Turn is still ours
        assert_eq!(engine.board().active_player_index, 1);

        // Second pass finishes the turn
        let plan = policy.decide_and_enqueue(&mut engine);
        assert_eq!(plan, TurnPlan::TurnEnded);
        engine.run_until_idle(0.0);
        assert_eq!(engine.board().active_player_index, 0);
    }

    #[test]
    fn test_plan_does_not_touch_the_snapshot() {
        let registry = CardRegistry::standard();
        let mantis = find_card(&registry, "Mantis");
        let engine = engine_with_hand(vec![mantis], 5);
        let snapshot = engine.board().clone();

        let policy = GreedyPolicy::new();
        let (actions, _) = policy.plan(&snapshot, engine.registry());

        assert!(!actions.is_empty());
        assert_eq!(&snapshot, engine.board());
    }
}
