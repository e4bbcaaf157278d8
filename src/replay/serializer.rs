//! Battle log recording and durable storage
//!
//! The serialized file is the canonical pretty-printed JSON of the log
//! followed by a trailing `&<checksum>` token, where the checksum
//! covers the exact payload bytes. Truncation or tampering anywhere in
//! the file breaks the token.

use crate::core::CardId;
use crate::error::{DuelError, Result};
use crate::game::actions::ParamMap;
use crate::replay::battle_log::{BattleLog, LoggedAction};
use rustc_hash::FxHasher;
use std::hash::Hasher;
use std::path::Path;

/// Compute the checksum of a serialized log payload
pub(crate) fn payload_checksum(payload: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(payload.as_bytes());
    hasher.finish()
}

/// Append-only battle recorder
///
/// Attach one to an engine and every externally enqueued, loggable
/// action is recorded as its state application completes; flush writes
/// the checksummed file.
#[derive(Debug, Clone)]
pub struct BattleSerializer {
    log: BattleLog,
}

impl BattleSerializer {
    pub fn new(seed: u64, top_deck: Vec<CardId>, bot_deck: Vec<CardId>) -> Self {
        BattleSerializer {
            log: BattleLog::new(seed, top_deck, bot_deck),
        }
    }

    /// Append one entry to the in-memory log
    pub fn record(&mut self, name: &str, extra_action_params: ParamMap) {
        self.log.actions.push(LoggedAction {
            name: name.to_string(),
            extra_action_params,
        });
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn recorded_count(&self) -> usize {
        self.log.actions.len()
    }

    /// Serialize to the canonical on-disk form, checksum token included
    pub fn to_file_contents(&self) -> Result<String> {
        let payload = serde_json::to_string_pretty(&self.log)
            .map_err(|e| DuelError::SerializationError(e.to_string()))?;
        let checksum = payload_checksum(&payload);
        Ok(format!("{}&{}", payload, checksum))
    }

    /// Write the log to durable storage
    pub fn flush<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_file_contents()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_contents_end_with_checksum_token() {
        let serializer = BattleSerializer::new(42, vec![CardId::new(0)], vec![CardId::new(1)]);
        let contents = serializer.to_file_contents().unwrap();

        let amp = contents.rfind('&').expect("missing checksum token");
        let (payload, token) = contents.split_at(amp);
        assert_eq!(token[1..].parse::<u64>().unwrap(), payload_checksum(payload));
    }

    #[test]
    fn test_record_appends_in_order() {
        let mut serializer = BattleSerializer::new(1, vec![], vec![]);
        serializer.record("NextPlayer", ParamMap::new());
        let mut params = ParamMap::new();
        params.insert("handIndex".to_string(), "2".to_string());
        serializer.record("PlayCard", params);

        assert_eq!(serializer.recorded_count(), 2);
        assert_eq!(serializer.log().actions[0].name, "NextPlayer");
        assert_eq!(serializer.log().actions[1].name, "PlayCard");
    }

    #[test]
    fn test_checksum_is_content_sensitive() {
        let a = BattleSerializer::new(1, vec![], vec![]);
        let mut b = BattleSerializer::new(1, vec![], vec![]);
        b.record("NextPlayer", ParamMap::new());

        let contents_a = a.to_file_contents().unwrap();
        let contents_b = b.to_file_contents().unwrap();
        let token = |s: &str| s[s.rfind('&').unwrap() + 1..].to_string();
        assert_ne!(token(&contents_a), token(&contents_b));
    }
}
