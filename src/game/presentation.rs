//! Presentation phase of actions
//!
//! Animated mode lets each action drive visual effects across ticks
//! before the next action starts. The engine never blocks: it polls a
//! per-action `PresentationState` every tick, and that state in turn
//! polls effect completion on the external `PresentationDelegate`.
//! Nothing in this module touches the board state.

use crate::game::actions::{GameAction, TrapTrigger};
use smallvec::SmallVec;

/// Result of one presentation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationUpdate {
    Ongoing,
    Finished,
}

/// What a visual effect is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectTarget {
    HeldCard {
        player_index: usize,
        card_index: usize,
    },
    BoardCard {
        player_index: usize,
        card_index: usize,
    },
    Player {
        player_index: usize,
    },
    Board,
}

/// Visual effect kinds the battle scene knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    CardSlide,
    CardEnlarge,
    CardStrike,
    CardRecoil,
    CardDissolve,
    SpellFlash,
    PoisonBubble,
    TurnPointerSpin,
    TrapSnap,
    VictoryBanner,
}

/// A fire-and-forget effect request handed to the presentation delegate
#[derive(Debug, Clone)]
pub struct EffectRequest {
    pub kind: EffectKind,
    pub targets: SmallVec<[EffectTarget; 2]>,
    pub duration_millis: f32,
}

/// Handle to a started effect, polled for completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectHandle(pub u64);

/// The rendering-side collaborator
///
/// The engine only ever starts effects and polls them; completion is
/// driven by the delegate's own per-frame `update`. Implementations
/// must never reach back into the board state.
pub trait PresentationDelegate {
    fn start_effect(&mut self, request: EffectRequest) -> EffectHandle;

    fn is_effect_finished(&self, handle: EffectHandle) -> bool;

    /// Called once per engine tick in animated mode
    fn update(&mut self, dt_millis: f32);
}

/// Delegate that completes every effect instantly
///
/// Used in headless contexts and as the default for animated engines
/// without a scene attached.
#[derive(Debug, Default)]
pub struct NullPresenter {
    next_handle: u64,
}

impl PresentationDelegate for NullPresenter {
    fn start_effect(&mut self, _request: EffectRequest) -> EffectHandle {
        self.next_handle += 1;
        EffectHandle(self.next_handle)
    }

    fn is_effect_finished(&self, _handle: EffectHandle) -> bool {
        true
    }

    fn update(&mut self, _dt_millis: f32) {}
}

/// Delegate that completes each effect after its requested duration
///
/// Stands in for a real tweening scene: effects finish from this
/// delegate's own `update`, exactly like the live animation manager
/// would, which makes it the reference double for animated-mode tests.
#[derive(Debug, Default)]
pub struct TimedPresenter {
    next_handle: u64,
    running: Vec<(EffectHandle, f32)>,
}

impl TimedPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }
}

impl PresentationDelegate for TimedPresenter {
    fn start_effect(&mut self, request: EffectRequest) -> EffectHandle {
        self.next_handle += 1;
        let handle = EffectHandle(self.next_handle);
        self.running.push((handle, request.duration_millis));
        handle
    }

    fn is_effect_finished(&self, handle: EffectHandle) -> bool {
        !self.running.iter().any(|(h, _)| *h == handle)
    }

    fn update(&mut self, dt_millis: f32) {
        for (_, remaining) in self.running.iter_mut() {
            *remaining -= dt_millis;
        }
        self.running.retain(|(_, remaining)| *remaining > 0.0);
    }
}

// Effect durations, in milliseconds
const DRAW_SLIDE_DURATION: f32 = 600.0;
const PLAY_SLIDE_DURATION: f32 = 500.0;
const SPELL_FLASH_DURATION: f32 = 400.0;
const ATTACK_ENLARGE_DURATION: f32 = 250.0;
const ATTACK_STRIKE_DURATION: f32 = 250.0;
const ATTACK_RECOIL_DURATION: f32 = 400.0;
const DISSOLVE_DURATION: f32 = 700.0;
const POISON_DURATION: f32 = 500.0;
const TURN_POINTER_DURATION: f32 = 1000.0;
const CLEANUP_SETTLE_DURATION: f32 = 400.0;
const TRAP_SNAP_DURATION: f32 = 600.0;
const VICTORY_BANNER_DURATION: f32 = 1200.0;

/// Phases of the attack animation sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackPhase {
    Enlarge,
    Strike,
    Recoil,
}

/// Transient animation state for the action at the head of the queue
///
/// Exists only while that action is animating; never persisted and never
/// consulted by state application.
#[derive(Debug)]
pub enum PresentationState {
    /// Nothing to animate
    Instant,

    /// Wait out a fixed timer without delegate effects
    Timed { remaining_millis: f32 },

    /// Wait until every started effect reports finished
    AwaitEffects {
        handles: SmallVec<[EffectHandle; 3]>,
    },

    /// Multi-step attack: enlarge, strike, recoil
    AttackSequence {
        attacker_player: usize,
        attacker_card: usize,
        phase: AttackPhase,
        handle: EffectHandle,
    },
}

impl PresentationState {
    /// Start the presentation for an action whose state has just been
    /// applied. `active_player_index` is the board's active player at
    /// that moment, used to target side-specific effects.
    pub fn begin(
        action: &GameAction,
        active_player_index: usize,
        delegate: &mut dyn PresentationDelegate,
    ) -> Self {
        match action {
            GameAction::Idle | GameAction::PostNextPlayer => PresentationState::Timed {
                remaining_millis: match action {
                    GameAction::PostNextPlayer => CLEANUP_SETTLE_DURATION,
                    _ => 0.0,
                },
            },
            GameAction::DrawCard => Self::single_effect(
                delegate,
                EffectKind::CardSlide,
                EffectTarget::Board,
                DRAW_SLIDE_DURATION,
            ),
            GameAction::PlayCard { hand_index } => Self::single_effect(
                delegate,
                EffectKind::CardSlide,
                EffectTarget::HeldCard {
                    player_index: active_player_index,
                    card_index: *hand_index,
                },
                PLAY_SLIDE_DURATION,
            ),
            GameAction::CardEffect { .. } => Self::single_effect(
                delegate,
                EffectKind::SpellFlash,
                EffectTarget::Board,
                SPELL_FLASH_DURATION,
            ),
            GameAction::CardAttack {
                player_index,
                card_index,
            } => {
                let handle = delegate.start_effect(EffectRequest {
                    kind: EffectKind::CardEnlarge,
                    targets: SmallVec::from_slice(&[EffectTarget::BoardCard {
                        player_index: *player_index,
                        card_index: *card_index,
                    }]),
                    duration_millis: ATTACK_ENLARGE_DURATION,
                });
                PresentationState::AttackSequence {
                    attacker_player: *player_index,
                    attacker_card: *card_index,
                    phase: AttackPhase::Enlarge,
                    handle,
                }
            }
            GameAction::CardDestruction {
                card_indices,
                player_index,
                ..
            } => {
                let handles = card_indices
                    .iter()
                    .map(|card_index| {
                        delegate.start_effect(EffectRequest {
                            kind: EffectKind::CardDissolve,
                            targets: SmallVec::from_slice(&[EffectTarget::BoardCard {
                                player_index: *player_index,
                                card_index: *card_index,
                            }]),
                            duration_millis: DISSOLVE_DURATION,
                        })
                    })
                    .collect();
                PresentationState::AwaitEffects { handles }
            }
            GameAction::PoisonTick => Self::single_effect(
                delegate,
                EffectKind::PoisonBubble,
                EffectTarget::Board,
                POISON_DURATION,
            ),
            GameAction::NextPlayer => Self::single_effect(
                delegate,
                EffectKind::TurnPointerSpin,
                EffectTarget::Board,
                TURN_POINTER_DURATION,
            ),
            GameAction::TrapTriggered { .. } => Self::single_effect(
                delegate,
                EffectKind::TrapSnap,
                EffectTarget::Board,
                TRAP_SNAP_DURATION,
            ),
            GameAction::GameOver { victor_index } => Self::single_effect(
                delegate,
                EffectKind::VictoryBanner,
                EffectTarget::Player {
                    player_index: *victor_index,
                },
                VICTORY_BANNER_DURATION,
            ),
        }
    }

    fn single_effect(
        delegate: &mut dyn PresentationDelegate,
        kind: EffectKind,
        target: EffectTarget,
        duration_millis: f32,
    ) -> Self {
        let handle = delegate.start_effect(EffectRequest {
            kind,
            targets: SmallVec::from_slice(&[target]),
            duration_millis,
        });
        PresentationState::AwaitEffects {
            handles: SmallVec::from_slice(&[handle]),
        }
    }

    /// One presentation tick; pure bookkeeping
    pub fn advance(
        &mut self,
        dt_millis: f32,
        delegate: &mut dyn PresentationDelegate,
    ) -> PresentationUpdate {
        match self {
            PresentationState::Instant => PresentationUpdate::Finished,
            PresentationState::Timed { remaining_millis } => {
                *remaining_millis -= dt_millis;
                if *remaining_millis <= 0.0 {
                    PresentationUpdate::Finished
                } else {
                    PresentationUpdate::Ongoing
                }
            }
            PresentationState::AwaitEffects { handles } => {
                if handles.iter().all(|h| delegate.is_effect_finished(*h)) {
                    PresentationUpdate::Finished
                } else {
                    PresentationUpdate::Ongoing
                }
            }
            PresentationState::AttackSequence {
                attacker_player,
                attacker_card,
                phase,
                handle,
            } => {
                if !delegate.is_effect_finished(*handle) {
                    return PresentationUpdate::Ongoing;
                }
                let target = EffectTarget::BoardCard {
                    player_index: *attacker_player,
                    card_index: *attacker_card,
                };
                match phase {
                    AttackPhase::Enlarge => {
                        *handle = delegate.start_effect(EffectRequest {
                            kind: EffectKind::CardStrike,
                            targets: SmallVec::from_slice(&[target]),
                            duration_millis: ATTACK_STRIKE_DURATION,
                        });
                        *phase = AttackPhase::Strike;
                        PresentationUpdate::Ongoing
                    }
                    AttackPhase::Strike => {
                        *handle = delegate.start_effect(EffectRequest {
                            kind: EffectKind::CardRecoil,
                            targets: SmallVec::from_slice(&[target]),
                            duration_millis: ATTACK_RECOIL_DURATION,
                        });
                        *phase = AttackPhase::Recoil;
                        PresentationUpdate::Ongoing
                    }
                    AttackPhase::Recoil => PresentationUpdate::Finished,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_presenter_finishes_instantly() {
        let mut presenter = NullPresenter::default();
        let mut state = PresentationState::begin(&GameAction::DrawCard, 0, &mut presenter);
        assert_eq!(
            state.advance(0.0, &mut presenter),
            PresentationUpdate::Finished
        );
    }

    #[test]
    fn test_timed_presenter_tracks_duration() {
        let mut presenter = TimedPresenter::new();
        let handle = presenter.start_effect(EffectRequest {
            kind: EffectKind::CardSlide,
            targets: SmallVec::new(),
            duration_millis: 100.0,
        });

        assert!(!presenter.is_effect_finished(handle));
        presenter.update(60.0);
        assert!(!presenter.is_effect_finished(handle));
        presenter.update(60.0);
        assert!(presenter.is_effect_finished(handle));
    }

    #[test]
    fn test_attack_sequence_runs_three_phases() {
        let mut presenter = TimedPresenter::new();
        let action = GameAction::CardAttack {
            player_index: 0,
            card_index: 0,
        };
        let mut state = PresentationState::begin(&action, 1, &mut presenter);

        let mut ticks = 0;
        loop {
            presenter.update(100.0);
            if state.advance(100.0, &mut presenter) == PresentationUpdate::Finished {
                break;
            }
            ticks += 1;
            assert!(ticks < 100, "attack presentation never finished");
        }

        // Three chained effects at 250 + 250 + 400 ms cannot finish in
        // fewer ticks than their combined duration allows
        assert!(ticks >= 8, "attack sequence finished too quickly: {}", ticks);
    }
}
