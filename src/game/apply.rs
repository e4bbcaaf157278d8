//! State application for every action kind
//!
//! The authoritative half of each action: synchronous, total, runs
//! exactly once when the action reaches the head of the queue. May
//! spawn follow-up actions (chaining); must never block or touch
//! presentation.

use crate::core::card::CardEffect;
use crate::core::player::modifier_masks;
use crate::core::{BoardModifiers, CardFamily, CardStatType, MAX_HELD_CARDS};
use crate::game::actions::{GameAction, TrapTrigger};
use crate::game::engine::{GameActionEngine, SpawnedActions};
use rand::Rng;
use smallvec::SmallVec;

impl GameActionEngine {
    /// Apply `action`'s board mutation, returning any chained actions
    /// in the order they should run.
    pub(crate) fn apply_action_state(&mut self, action: &GameAction) -> SpawnedActions {
        match action {
            GameAction::Idle => SmallVec::new(),
            GameAction::DrawCard => self.apply_draw_card(),
            GameAction::PlayCard { hand_index } => self.apply_play_card(*hand_index),
            GameAction::CardEffect { card_id } => self.apply_card_effect(*card_id),
            GameAction::CardAttack {
                player_index,
                card_index,
            } => self.apply_card_attack(*player_index, *card_index),
            GameAction::CardDestruction {
                card_indices,
                player_index,
                trap_trigger,
            } => self.apply_card_destruction(card_indices, *player_index, *trap_trigger),
            GameAction::PoisonTick => self.apply_poison_tick(),
            GameAction::NextPlayer => self.apply_next_player(),
            GameAction::PostNextPlayer => self.apply_post_next_player(),
            GameAction::TrapTriggered { .. } => SmallVec::new(),
            GameAction::GameOver { victor_index } => {
                let message = format!("Player {} wins the battle", victor_index);
                self.logger.minimal(&message);
                SmallVec::new()
            }
        }
    }

    fn apply_draw_card(&mut self) -> SpawnedActions {
        let active_index = self.board.active_player_index;
        let deck_len = self.board.active_player().deck_cards.len();
        assert!(deck_len > 0, "Draw from an empty deck pool");

        // The RNG advances even when the draw is burned, so a full hand
        // does not desynchronize replays.
        let deck_index = self.rng.gen_range(0..deck_len);

        let player = self.board.active_player_mut();
        let card_id = player.deck_cards[deck_index];
        if player.held_cards.len() >= MAX_HELD_CARDS {
            let message = format!("Player {} burns a draw (hand is full)", active_index);
            self.logger.normal(&message);
            return SmallVec::new();
        }
        player.held_cards.push(card_id);

        let message = format!(
            "Player {} draws {}",
            active_index,
            self.registry.get(card_id).name
        );
        self.logger.normal(&message);
        SmallVec::new()
    }

    fn apply_play_card(&mut self, hand_index: usize) -> SpawnedActions {
        let active_index = self.board.active_player_index;
        let held_count = self.board.active_player().held_cards.len();
        assert!(
            hand_index < held_count,
            "Play of hand index {} with {} held cards",
            hand_index,
            held_count
        );

        let card_id = self.board.active_player().held_cards[hand_index];
        let card = self.registry.get(card_id).clone();

        let player = self.board.active_player_mut();
        let weight = player.effective_held_weight(&card, hand_index);
        assert!(
            player.current_weight_ammo >= weight,
            "Illegal play enqueued: {} costs {} with {} ammo",
            card.name,
            weight,
            player.current_weight_ammo
        );

        // A held override follows its card to the board slot
        if hand_index < player.held_card_stat_overrides.len() {
            let overrides = player.held_card_stat_overrides.remove(hand_index);
            if !card.is_spell() && !overrides.is_empty() {
                let board_len = player.board_cards.len();
                if player.board_card_stat_overrides.len() < board_len {
                    player
                        .board_card_stat_overrides
                        .resize(board_len, Default::default());
                }
                player.board_card_stat_overrides.push(overrides);
            }
        }

        player.held_cards.remove(hand_index);
        player.current_weight_ammo -= weight;

        let mut spawned = SmallVec::new();
        if card.is_spell() {
            spawned.push(GameAction::CardEffect { card_id });
        } else {
            player.board_cards.push(card_id);

            if player.board_modifiers.modifier_mask & modifier_masks::KILL_NEXT != 0 {
                player.board_modifiers.modifier_mask &= !modifier_masks::KILL_NEXT;
                let newest = player.board_cards.len() - 1;
                spawned.push(GameAction::TrapTriggered {
                    trigger: TrapTrigger::Kill,
                });
                spawned.push(GameAction::CardDestruction {
                    card_indices: SmallVec::from_slice(&[newest]),
                    player_index: active_index,
                    trap_trigger: true,
                });
            } else if player.board_modifiers.modifier_mask & modifier_masks::BOARD_DEBUFF != 0 {
                spawned.push(GameAction::TrapTriggered {
                    trigger: TrapTrigger::Debuff,
                });
            }
        }

        let message = format!("Player {} plays {}", active_index, card.name);
        self.logger.normal(&message);
        spawned
    }

    fn apply_card_effect(&mut self, card_id: crate::core::CardId) -> SpawnedActions {
        let card = self.registry.get(card_id).clone();
        let effect = card
            .effect
            .unwrap_or_else(|| panic!("CardEffect action for non-spell {}", card.name));

        let mut spawned = SmallVec::new();
        match effect {
            CardEffect::GainDraws(count) => {
                for _ in 0..count {
                    spawned.push(GameAction::DrawCard);
                }
            }
            CardEffect::BuffHeldFamilyDamage { family, amount } => {
                let player = self.board.active_player_mut();
                for index in 0..player.held_cards.len() {
                    let held = self.registry.get(player.held_cards[index]);
                    if held.family != family || held.is_spell() {
                        continue;
                    }
                    let current = player
                        .held_card_stat_overrides
                        .get(index)
                        .and_then(|ov| ov.get(&CardStatType::Damage).copied())
                        .unwrap_or(held.damage);
                    player.set_held_override(index, CardStatType::Damage, current + amount);
                }
            }
            CardEffect::KillNextEnemyCard => {
                self.board.inactive_player_mut().board_modifiers.modifier_mask |=
                    modifier_masks::KILL_NEXT;
            }
            CardEffect::EnemyBoardDebuff { amount } => {
                let enemy = self.board.inactive_player_mut();
                enemy.board_modifiers.modifier_mask |= modifier_masks::BOARD_DEBUFF;
                *enemy
                    .board_modifiers
                    .global_stat_modifiers
                    .entry(CardStatType::Damage)
                    .or_insert(0) -= amount;
            }
            CardEffect::EnemyWeightSurcharge { amount } => {
                let enemy = self.board.inactive_player_mut();
                enemy.board_modifiers.modifier_mask |= modifier_masks::BOARD_DEBUFF;
                *enemy
                    .board_modifiers
                    .global_stat_modifiers
                    .entry(CardStatType::Weight)
                    .or_insert(0) += amount;
            }
            CardEffect::DestroyNewestEnemyCard => {
                let enemy_index = self.board.inactive_player_index();
                let enemy_board_len = self.board.inactive_player().board_cards.len();
                if enemy_board_len > 0 {
                    spawned.push(GameAction::CardDestruction {
                        card_indices: SmallVec::from_slice(&[enemy_board_len - 1]),
                        player_index: enemy_index,
                        trap_trigger: false,
                    });
                }
            }
        }

        let message = format!("{} resolves", card.name);
        self.logger.normal(&message);
        spawned
    }

    fn apply_card_attack(&mut self, player_index: usize, card_index: usize) -> SpawnedActions {
        let attacker = &self.board.player_states[player_index];

        // The card may have been destroyed between this action's
        // creation and its state application
        if attacker.board_card_indices_to_destroy.contains(&card_index) {
            return SmallVec::new();
        }
        assert!(
            card_index < attacker.board_cards.len(),
            "Attack from board index {} with {} board cards",
            card_index,
            attacker.board_cards.len()
        );

        let card = self.registry.get(attacker.board_cards[card_index]).clone();
        let damage = attacker.effective_board_damage(&card, card_index);

        let defender_index = self.board.opponent_index(player_index);
        let defender = &mut self.board.player_states[defender_index];

        if card.family == CardFamily::Insects {
            defender.poison_stack += 1;
        }
        defender.health -= damage;

        let mut spawned = SmallVec::new();
        if defender.health <= 0 {
            defender.health = 0;
            spawned.push(GameAction::GameOver {
                victor_index: player_index,
            });
        }

        let message = format!(
            "{} strikes player {} for {}",
            card.name, defender_index, damage
        );
        self.logger.normal(&message);
        spawned
    }

    fn apply_card_destruction(
        &mut self,
        card_indices: &[usize],
        player_index: usize,
        trap_trigger: bool,
    ) -> SpawnedActions {
        let player = &mut self.board.player_states[player_index];

        if trap_trigger {
            // The trap snaps the just-played card straight off the board
            let popped = player.board_cards.pop();
            assert!(popped.is_some(), "Trap destruction on an empty board");
            if player.board_card_stat_overrides.len() > player.board_cards.len() {
                player
                    .board_card_stat_overrides
                    .truncate(player.board_cards.len());
            }
        } else {
            for index in card_indices {
                assert!(
                    *index < player.board_cards.len(),
                    "Destruction of board index {} with {} board cards",
                    index,
                    player.board_cards.len()
                );
                player.board_card_indices_to_destroy.insert(*index);
            }
        }

        let message = format!("Player {} loses {} card(s)", player_index, card_indices.len());
        self.logger.normal(&message);
        SmallVec::new()
    }

    fn apply_poison_tick(&mut self) -> SpawnedActions {
        let active_index = self.board.active_player_index;
        let player = self.board.active_player_mut();
        let damage = player.poison_stack;
        player.poison_stack = 0;
        player.health = (player.health - damage).max(0);

        let message = format!("Player {} takes {} poison damage", active_index, damage);
        self.logger.normal(&message);
        SmallVec::new()
    }

    fn apply_next_player(&mut self) -> SpawnedActions {
        let previous_index = self.board.active_player_index;
        self.board.active_player_index =
            (previous_index + 1) % self.board.player_count();
        self.board.turn_counter += 1;

        let new_active = self.board.active_player_mut();
        new_active.total_weight_ammo += 1;
        new_active.current_weight_ammo = new_active.total_weight_ammo;
        let poisoned = new_active.poison_stack > 0;

        let mut spawned = SmallVec::new();
        if poisoned {
            spawned.push(GameAction::PoisonTick);
        }
        // The ended player's board strikes the incoming player
        let attacker_count = self.board.player_states[previous_index].board_cards.len();
        for card_index in 0..attacker_count {
            spawned.push(GameAction::CardAttack {
                player_index: previous_index,
                card_index,
            });
        }
        spawned.push(GameAction::PostNextPlayer);

        let message = format!(
            "Turn {}: player {} is up",
            self.board.turn_counter, self.board.active_player_index
        );
        self.logger.normal(&message);
        spawned
    }

    fn apply_post_next_player(&mut self) -> SpawnedActions {
        let ended = self.board.inactive_player_mut();

        if !ended.board_card_indices_to_destroy.is_empty() {
            let mut remaining_cards = Vec::with_capacity(ended.board_cards.len());
            let mut remaining_overrides = Vec::with_capacity(ended.board_cards.len());
            for (index, card) in ended.board_cards.iter().enumerate() {
                if ended.board_card_indices_to_destroy.contains(&index) {
                    continue;
                }
                remaining_cards.push(*card);
                remaining_overrides.push(
                    ended
                        .board_card_stat_overrides
                        .get(index)
                        .cloned()
                        .unwrap_or_default(),
                );
            }
            ended.board_cards = remaining_cards;
            ended.board_card_stat_overrides = remaining_overrides;
            ended.board_card_indices_to_destroy.clear();
        }

        // Hand buffs and board-wide effects last until the end of the
        // owning player's turn; board overrides follow surviving cards
        ended.held_card_stat_overrides.clear();
        ended.board_modifiers = BoardModifiers::default();
        SmallVec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoardState, CardId, CardRegistry};
    use crate::game::engine::EngineMode;

    fn engine_with_decks(top: Vec<CardId>, bot: Vec<CardId>) -> GameActionEngine {
        let registry = CardRegistry::standard();
        let board = BoardState::new_battle(top, bot);
        GameActionEngine::new(EngineMode::Headless, 7, board, registry)
    }

    fn find_card(registry: &CardRegistry, name: &str) -> CardId {
        registry
            .all_card_ids()
            .into_iter()
            .find(|id| registry.get(*id).name == name)
            .unwrap_or_else(|| panic!("no card named {}", name))
    }

    #[test]
    fn test_draw_burns_on_full_hand() {
        let registry = CardRegistry::standard();
        let vole = find_card(&registry, "Vole");
        let mut engine = engine_with_decks(vec![vole], vec![vole]);

        for _ in 0..MAX_HELD_CARDS + 2 {
            engine.enqueue(GameAction::DrawCard);
        }
        engine.run_until_idle(0.0);

        assert_eq!(
            engine.board().active_player().held_cards.len(),
            MAX_HELD_CARDS
        );
    }

    #[test]
    fn test_play_card_moves_card_and_spends_ammo() {
        let registry = CardRegistry::standard();
        let mantis = find_card(&registry, "Mantis");
        let mut engine = engine_with_decks(vec![mantis], vec![mantis]);
        {
            let player = engine.board_mut().active_player_mut();
            player.held_cards.push(mantis);
            player.total_weight_ammo = 3;
            player.current_weight_ammo = 3;
        }

        engine.enqueue(GameAction::PlayCard { hand_index: 0 });
        engine.run_until_idle(0.0);

        let player = engine.board().active_player();
        assert!(player.held_cards.is_empty());
        assert_eq!(player.board_cards, vec![mantis]);
        assert_eq!(player.current_weight_ammo, 1);
    }

    #[test]
    fn test_attack_applies_damage_and_poison() {
        let registry = CardRegistry::standard();
        let mantis = find_card(&registry, "Mantis");
        let mut engine = engine_with_decks(vec![mantis], vec![mantis]);
        engine.board_mut().player_states[0].board_cards.push(mantis);

        // Active player is 1, so player 0's mantis strikes player 1
        engine.enqueue(GameAction::CardAttack {
            player_index: 0,
            card_index: 0,
        });
        engine.run_until_idle(0.0);

        let defender = &engine.board().player_states[1];
        assert_eq!(defender.health, crate::core::STARTING_HEALTH - 3);
        assert_eq!(defender.poison_stack, 1);
    }

    #[test]
    fn test_lethal_attack_chains_game_over() {
        let registry = CardRegistry::standard();
        let mammoth = find_card(&registry, "Mammoth");
        let mut engine = engine_with_decks(vec![mammoth], vec![mammoth]);
        engine.board_mut().player_states[0].board_cards.push(mammoth);
        engine.board_mut().player_states[1].health = 5;
        engine.logger_mut().enable_capture();

        engine.enqueue(GameAction::CardAttack {
            player_index: 0,
            card_index: 0,
        });
        engine.run_until_idle(0.0);

        assert_eq!(engine.board().player_states[1].health, 0);
        assert_eq!(engine.board().victor_index(), Some(0));
        assert!(engine
            .logger()
            .logs()
            .iter()
            .any(|entry| entry.message.contains("wins the battle")));
    }

    #[test]
    fn test_marked_attacker_skips_its_attack() {
        let registry = CardRegistry::standard();
        let mantis = find_card(&registry, "Mantis");
        let mut engine = engine_with_decks(vec![mantis], vec![mantis]);
        engine.board_mut().player_states[0].board_cards.push(mantis);
        engine.board_mut().player_states[0]
            .board_card_indices_to_destroy
            .insert(0);

        engine.enqueue(GameAction::CardAttack {
            player_index: 0,
            card_index: 0,
        });
        engine.run_until_idle(0.0);

        assert_eq!(
            engine.board().player_states[1].health,
            crate::core::STARTING_HEALTH
        );
    }

    #[test]
    fn test_kill_next_trap_destroys_played_card() {
        let registry = CardRegistry::standard();
        let vole = find_card(&registry, "Vole");
        let mut engine = engine_with_decks(vec![vole], vec![vole]);
        {
            let player = engine.board_mut().active_player_mut();
            player.held_cards.push(vole);
            player.total_weight_ammo = 2;
            player.current_weight_ammo = 2;
            player.board_modifiers.modifier_mask |= modifier_masks::KILL_NEXT;
        }

        engine.enqueue(GameAction::PlayCard { hand_index: 0 });
        engine.run_until_idle(0.0);

        let player = engine.board().active_player();
        assert!(player.board_cards.is_empty());
        assert_eq!(
            player.board_modifiers.modifier_mask & modifier_masks::KILL_NEXT,
            0
        );
        // The card was still paid for
        assert_eq!(player.current_weight_ammo, 1);
    }

    #[test]
    fn test_deferred_destruction_compacts_at_cleanup() {
        let registry = CardRegistry::standard();
        let vole = find_card(&registry, "Vole");
        let mantis = find_card(&registry, "Mantis");
        let gecko = find_card(&registry, "Gecko");
        let mut engine = engine_with_decks(vec![vole], vec![vole]);

        // Board cards belong to the bot player (index 1), who is active
        {
            let player = engine.board_mut().active_player_mut();
            player.board_cards = vec![vole, mantis, gecko];
        }
        engine.enqueue(GameAction::CardDestruction {
            card_indices: SmallVec::from_slice(&[1]),
            player_index: 1,
            trap_trigger: false,
        });
        // Ending player 1's turn compacts their board
        engine.enqueue(GameAction::NextPlayer);
        engine.run_until_idle(0.0);

        assert_eq!(engine.board().player_states[1].board_cards, vec![vole, gecko]);
        assert!(engine.board().player_states[1]
            .board_card_indices_to_destroy
            .is_empty());
    }

    #[test]
    fn test_poison_tick_consumes_stack() {
        let registry = CardRegistry::standard();
        let vole = find_card(&registry, "Vole");
        let mut engine = engine_with_decks(vec![vole], vec![vole]);
        // Player 0 is about to become active with poison stacked
        engine.board_mut().player_states[0].poison_stack = 4;

        engine.enqueue(GameAction::NextPlayer);
        engine.run_until_idle(0.0);

        let player = &engine.board().player_states[0];
        assert_eq!(player.health, crate::core::STARTING_HEALTH - 4);
        assert_eq!(player.poison_stack, 0);
    }

    #[test]
    fn test_next_player_refills_ammo() {
        let registry = CardRegistry::standard();
        let vole = find_card(&registry, "Vole");
        let mut engine = engine_with_decks(vec![vole], vec![vole]);

        engine.enqueue(GameAction::NextPlayer);
        engine.run_until_idle(0.0);
        assert_eq!(engine.board().player_states[0].total_weight_ammo, 1);
        assert_eq!(engine.board().player_states[0].current_weight_ammo, 1);
        assert_eq!(engine.board().player_states[1].current_weight_ammo, 0);

        engine.enqueue(GameAction::NextPlayer);
        engine.run_until_idle(0.0);
        assert_eq!(engine.board().player_states[1].total_weight_ammo, 1);

        engine.enqueue(GameAction::NextPlayer);
        engine.run_until_idle(0.0);
        assert_eq!(engine.board().player_states[0].total_weight_ammo, 2);
        assert_eq!(engine.board().player_states[0].current_weight_ammo, 2);
    }

    #[test]
    fn test_cleanup_clears_modifiers_and_held_overrides() {
        let registry = CardRegistry::standard();
        let vole = find_card(&registry, "Vole");
        let mut engine = engine_with_decks(vec![vole], vec![vole]);
        {
            let player = engine.board_mut().active_player_mut();
            player.held_cards.push(vole);
            player.set_held_override(0, CardStatType::Damage, 9);
            player.board_modifiers.modifier_mask |= modifier_masks::BOARD_DEBUFF;
            player
                .board_modifiers
                .global_stat_modifiers
                .insert(CardStatType::Damage, -2);
        }

        engine.enqueue(GameAction::NextPlayer);
        engine.run_until_idle(0.0);

        let ended = &engine.board().player_states[1];
        assert!(ended.held_card_stat_overrides.is_empty());
        assert_eq!(ended.board_modifiers, BoardModifiers::default());
    }
}
