//! The game action engine
//!
//! Owns the board state and a FIFO queue of pending actions, and
//! advances the battle one step per external tick. An idle sentinel
//! occupies the queue whenever no real work is pending, so the queue is
//! never empty.

/// Macro for conditional transition logging that avoids allocation when
/// the feature is disabled
///
/// When the verbose-logging feature is off this becomes a no-op at
/// compile time, eliminating the format! allocations on hot replay
/// paths.
macro_rules! log_transition {
    ($self:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.logger.transition(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self; // Suppress unused variable warning
        }
    };
}

use crate::core::{BoardState, CardRegistry};
use crate::game::actions::{GameAction, ParamMap};
use crate::game::logger::GameLogger;
use crate::game::presentation::{
    NullPresenter, PresentationDelegate, PresentationState, PresentationUpdate,
};
use crate::replay::BattleSerializer;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Name reported while the queue holds only the idle sentinel
pub const IDLE_ACTION_NAME: &str = "Idle";

/// Engine operation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    /// Apply state transitions immediately, skip presentation
    Headless,
    /// Pause at each action until its presentation reports finished
    Animated,
}

/// A queued action plus where it came from
///
/// Only externally enqueued actions are recorded to the battle log;
/// chained actions are re-derived from their parents on replay.
#[derive(Debug, Clone)]
struct QueuedAction {
    action: GameAction,
    external: bool,
}

/// Actions spawned by one state application
pub type SpawnedActions = SmallVec<[GameAction; 4]>;

/// The action queue engine
///
/// Sole owner of the battle's `BoardState`, the action queue and the
/// seeded RNG. All mutation happens synchronously inside `update`.
pub struct GameActionEngine {
    mode: EngineMode,
    seed: u64,
    pub(crate) rng: ChaCha12Rng,
    pub(crate) board: BoardState,
    pub(crate) registry: CardRegistry,
    pub(crate) logger: GameLogger,
    queue: VecDeque<QueuedAction>,
    active_action_has_applied_state: bool,
    presentation: Option<PresentationState>,
    presenter: Box<dyn PresentationDelegate>,
    recorder: Option<BattleSerializer>,
}

impl GameActionEngine {
    pub fn new(mode: EngineMode, seed: u64, board: BoardState, registry: CardRegistry) -> Self {
        let mut engine = GameActionEngine {
            mode,
            seed,
            rng: ChaCha12Rng::seed_from_u64(seed),
            board,
            registry,
            logger: GameLogger::new(),
            queue: VecDeque::new(),
            active_action_has_applied_state: false,
            presentation: None,
            presenter: Box::new(NullPresenter::default()),
            recorder: None,
        };
        engine.queue.push_back(QueuedAction {
            action: GameAction::Idle,
            external: false,
        });
        engine
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// Mutable board access for battle setup (dealing opening hands,
    /// test scenarios). Never used by the action pipeline itself.
    pub fn board_mut(&mut self) -> &mut BoardState {
        &mut self.board
    }

    pub fn registry(&self) -> &CardRegistry {
        &self.registry
    }

    pub fn logger(&self) -> &GameLogger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut GameLogger {
        &mut self.logger
    }

    /// Replace the presentation delegate (animated mode)
    pub fn set_presenter(&mut self, presenter: Box<dyn PresentationDelegate>) {
        self.presenter = presenter;
    }

    /// Attach a battle recorder; every externally enqueued, loggable
    /// action is recorded as its state application completes.
    pub fn attach_recorder(&mut self, recorder: BattleSerializer) {
        self.recorder = Some(recorder);
    }

    /// Detach the recorder, e.g. to flush it at battle end
    pub fn take_recorder(&mut self) -> Option<BattleSerializer> {
        self.recorder.take()
    }

    /// Name of the action at the head of the queue
    pub fn active_action_name(&self) -> &'static str {
        self.queue
            .front()
            .expect("action queue can never be empty")
            .action
            .name()
    }

    pub fn is_idle(&self) -> bool {
        self.active_action_name() == IDLE_ACTION_NAME
    }

    /// Enqueue an action from outside the pipeline
    ///
    /// If the head is the idle sentinel it is replaced; the sentinel
    /// never coexists with real work.
    pub fn enqueue(&mut self, action: GameAction) {
        if self.is_idle() {
            self.queue.pop_front();
        }
        log_transition!(self, "Pushed action {}", action.name());
        self.queue.push_back(QueuedAction {
            action,
            external: true,
        });
    }

    /// Enqueue by symbolic name with string parameters (the battle-log
    /// boundary). Unknown names and missing required parameters are
    /// fatal - these only come from internal code paths and
    /// checksum-verified logs.
    pub fn enqueue_by_name(&mut self, name: &str, params: &ParamMap) {
        self.enqueue(GameAction::from_log_entry(name, params));
    }

    /// Single-tick driver
    ///
    /// Headless mode advances exactly one action to completion per
    /// call; animated mode applies the head's state on its first visit
    /// and then polls its presentation every call until finished.
    pub fn update(&mut self, dt_millis: f32) {
        if self.is_idle() {
            return;
        }

        match self.mode {
            EngineMode::Headless => {
                let spawned = self.apply_head_state();
                self.queue.pop_front();
                self.insert_chained(spawned);
                self.refill_idle_sentinel();
            }
            EngineMode::Animated => {
                if !self.active_action_has_applied_state {
                    let spawned = self.apply_head_state();
                    self.insert_chained_behind_head(spawned);
                    let action = &self.queue.front().unwrap().action;
                    self.presentation = Some(PresentationState::begin(
                        action,
                        self.board.active_player_index,
                        self.presenter.as_mut(),
                    ));
                    self.active_action_has_applied_state = true;
                }

                self.presenter.update(dt_millis);
                let update = self
                    .presentation
                    .as_mut()
                    .expect("animating action must have presentation state")
                    .advance(dt_millis, self.presenter.as_mut());

                if update == PresentationUpdate::Finished {
                    let finished_name = self.active_action_name();
                    log_transition!(self, "Finished animation of action {}", finished_name);
                    self.queue.pop_front();
                    self.presentation = None;
                    self.active_action_has_applied_state = false;
                    self.refill_idle_sentinel();
                }
            }
        }
    }

    /// Drive the engine until it reports idle
    ///
    /// The workhorse for headless battles and replays; also drains
    /// animated engines by ticking `dt_millis` per frame.
    pub fn run_until_idle(&mut self, dt_millis: f32) {
        while !self.is_idle() {
            self.update(dt_millis);
        }
    }

    /// Apply the head action's state mutation and record it if needed
    fn apply_head_state(&mut self) -> SpawnedActions {
        let head = self
            .queue
            .front()
            .expect("action queue can never be empty")
            .clone();

        log_transition!(self, "Setting state of action {}", head.action.name());
        let spawned = self.apply_action_state(&head.action);

        if head.external && head.action.should_be_logged() {
            if let Some(recorder) = self.recorder.as_mut() {
                recorder.record(head.action.name(), head.action.to_params());
            }
        }

        spawned
    }

    /// Chained actions run directly after their parent, ahead of
    /// anything that was already queued behind it. The parent has
    /// already been popped here.
    fn insert_chained(&mut self, spawned: SpawnedActions) {
        for action in spawned.into_iter().rev() {
            log_transition!(self, "Chained action {}", action.name());
            self.queue.push_front(QueuedAction {
                action,
                external: false,
            });
        }
    }

    /// Same insertion rule while the parent is still at the head
    /// (animated mode applies state before its presentation finishes).
    fn insert_chained_behind_head(&mut self, spawned: SpawnedActions) {
        for (offset, action) in spawned.into_iter().enumerate() {
            log_transition!(self, "Chained action {}", action.name());
            self.queue.insert(
                1 + offset,
                QueuedAction {
                    action,
                    external: false,
                },
            );
        }
    }

    fn refill_idle_sentinel(&mut self) {
        if self.queue.is_empty() {
            self.queue.push_back(QueuedAction {
                action: GameAction::Idle,
                external: false,
            });
        }
    }
}

impl std::fmt::Debug for GameActionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameActionEngine")
            .field("mode", &self.mode)
            .field("seed", &self.seed)
            .field("queue_len", &self.queue.len())
            .field("active_action", &self.active_action_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoardState, CardRegistry};

    fn headless_engine() -> GameActionEngine {
        let registry = CardRegistry::standard();
        let deck = registry.all_card_ids();
        let board = BoardState::new_battle(deck.clone(), deck);
        GameActionEngine::new(EngineMode::Headless, 42, board, registry)
    }

    #[test]
    fn test_idle_action_exists_by_default() {
        let engine = headless_engine();
        assert_eq!(engine.active_action_name(), IDLE_ACTION_NAME);
        assert!(engine.is_idle());
    }

    #[test]
    fn test_pushed_action_is_active() {
        let mut engine = headless_engine();
        engine.enqueue(GameAction::DrawCard);
        assert_eq!(engine.active_action_name(), "DrawCard");
    }

    #[test]
    fn test_engine_returns_to_idle_after_drain() {
        let mut engine = headless_engine();
        engine.enqueue(GameAction::DrawCard);
        engine.run_until_idle(0.0);
        assert!(engine.is_idle());
        assert_eq!(engine.board().active_player().held_cards.len(), 1);
    }

    #[test]
    fn test_same_seed_same_draws() {
        let mut first = headless_engine();
        let mut second = headless_engine();
        for engine in [&mut first, &mut second] {
            for _ in 0..8 {
                engine.enqueue(GameAction::DrawCard);
            }
            engine.run_until_idle(0.0);
        }
        assert_eq!(
            first.board().active_player().held_cards,
            second.board().active_player().held_cards
        );
    }

    #[test]
    #[should_panic(expected = "Unregistered game action name")]
    fn test_enqueue_unknown_name_is_fatal() {
        let mut engine = headless_engine();
        engine.enqueue_by_name("NotAnAction", &ParamMap::new());
    }
}
