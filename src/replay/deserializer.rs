//! Battle log loading, verification and replay
//!
//! The checksum is stripped and verified before any parsing happens; a
//! mismatch refuses to yield a log at all, leaving the caller's state
//! untouched.

use crate::error::{DuelError, Result};
use crate::game::engine::GameActionEngine;
use crate::replay::battle_log::BattleLog;
use crate::replay::serializer::payload_checksum;
use std::path::Path;

/// Loads and verifies a recorded battle
#[derive(Debug, Clone)]
pub struct BattleDeserializer {
    log: BattleLog,
}

impl BattleDeserializer {
    /// Load a battle log from durable storage
    ///
    /// Fails with `MissingData` when the file does not exist and
    /// `CorruptedLog` when the checksum token is absent, malformed or
    /// does not match the payload.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = match std::fs::read_to_string(path.as_ref()) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DuelError::MissingData(format!(
                    "no battle log at {}",
                    path.as_ref().display()
                )))
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_file_contents(&raw)
    }

    /// Verify and parse raw file contents
    pub fn from_file_contents(raw: &str) -> Result<Self> {
        let amp = raw
            .rfind('&')
            .ok_or_else(|| DuelError::CorruptedLog("missing checksum token".to_string()))?;
        let (payload, token) = raw.split_at(amp);

        let stored: u64 = token[1..]
            .trim_end()
            .parse()
            .map_err(|_| DuelError::CorruptedLog("malformed checksum token".to_string()))?;
        let computed = payload_checksum(payload);
        if stored != computed {
            return Err(DuelError::CorruptedLog(format!(
                "checksum mismatch: stored {} computed {}",
                stored, computed
            )));
        }

        let log: BattleLog = serde_json::from_str(payload)
            .map_err(|e| DuelError::CorruptedLog(e.to_string()))?;
        Ok(BattleDeserializer { log })
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn seed(&self) -> u64 {
        self.log.seed
    }

    pub fn top_deck(&self) -> &[crate::core::CardId] {
        &self.log.top_deck
    }

    pub fn bot_deck(&self) -> &[crate::core::CardId] {
        &self.log.bot_deck
    }

    /// Re-enqueue every recorded action, in order, into an engine that
    /// was constructed from this log's seed and decks, and drain it.
    ///
    /// Reproduces the exact final board of the original battle.
    pub fn replay_into(&self, engine: &mut GameActionEngine) {
        for entry in &self.log.actions {
            engine.enqueue_by_name(&entry.name, &entry.extra_action_params);
            engine.run_until_idle(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actions::ParamMap;
    use crate::replay::serializer::BattleSerializer;

    fn sample_contents() -> String {
        let mut serializer = BattleSerializer::new(9, vec![], vec![]);
        serializer.record("NextPlayer", ParamMap::new());
        serializer.to_file_contents().unwrap()
    }

    #[test]
    fn test_round_trip() {
        let contents = sample_contents();
        let deserializer = BattleDeserializer::from_file_contents(&contents).unwrap();
        assert_eq!(deserializer.seed(), 9);
        assert_eq!(deserializer.log().actions.len(), 1);
    }

    #[test]
    fn test_single_byte_tamper_is_detected() {
        let contents = sample_contents();

        // Flip one digit of the stored seed
        let tampered = contents.replacen("\"seed\": 9", "\"seed\": 8", 1);
        assert_ne!(contents, tampered);
        match BattleDeserializer::from_file_contents(&tampered) {
            Err(DuelError::CorruptedLog(_)) => {}
            other => panic!("expected CorruptedLog, got {:?}", other),
        }
    }

    #[test]
    fn test_tampered_checksum_token_is_detected() {
        let contents = sample_contents();
        let mut tampered = contents.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == '0' { '1' } else { '0' });

        assert!(matches!(
            BattleDeserializer::from_file_contents(&tampered),
            Err(DuelError::CorruptedLog(_))
        ));
    }

    #[test]
    fn test_truncated_file_is_detected() {
        let contents = sample_contents();
        let truncated = &contents[..contents.len() - 4];
        assert!(matches!(
            BattleDeserializer::from_file_contents(truncated),
            Err(DuelError::CorruptedLog(_))
        ));
    }

    #[test]
    fn test_missing_file_is_distinct_from_corruption() {
        let missing = std::env::temp_dir().join("card_duel_no_such_log.json");
        assert!(matches!(
            BattleDeserializer::load(&missing),
            Err(DuelError::MissingData(_))
        ));
    }
}
