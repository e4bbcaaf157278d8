//! The action queue engine and its surrounding machinery

pub mod actions;
mod apply;
pub mod engine;
pub mod logger;
pub mod policy;
pub mod presentation;
pub mod rules;

pub use actions::{GameAction, ParamMap, TrapTrigger, REGISTERED_ACTION_NAMES};
pub use engine::{EngineMode, GameActionEngine, IDLE_ACTION_NAME};
pub use logger::{GameLogger, LogEntry, OutputMode, VerbosityLevel};
pub use policy::{GreedyPolicy, TurnPlan};
pub use presentation::{
    EffectHandle, EffectKind, EffectRequest, EffectTarget, NullPresenter, PresentationDelegate,
    PresentationState, PresentationUpdate, TimedPresenter,
};
pub use rules::RuleEngine;
