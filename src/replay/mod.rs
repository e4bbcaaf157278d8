//! Battle log persistence and deterministic replay

pub mod battle_log;
pub mod deserializer;
pub mod serializer;

pub use battle_log::{BattleLog, LoggedAction};
pub use deserializer::BattleDeserializer;
pub use serializer::BattleSerializer;
