//! Replay cache for idempotent command submission
//!
//! Keyed by (game, command kind, client token). An entry lives for the
//! configured retention window; expired entries are purged lazily.

use std::time::{Duration, Instant};

use ahash::AHashMap;

use crate::core::error::Result;
use crate::core::types::GameId;
use crate::game::commands::{CommandKind, CommandOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplayKey {
    pub game: GameId,
    pub kind: CommandKind,
    pub token: String,
}

impl ReplayKey {
    pub fn new(game: GameId, kind: CommandKind, token: impl Into<String>) -> Self {
        Self {
            game,
            kind,
            token: token.into(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    stored_at: Instant,
    result: Result<CommandOutcome>,
}

#[derive(Debug)]
pub struct ReplayCache {
    entries: AHashMap<ReplayKey, Entry>,
    retention: Duration,
}

impl ReplayCache {
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: AHashMap::new(),
            retention,
        }
    }

    /// Cached result for `key`, if still within retention
    pub fn get(&mut self, key: &ReplayKey, now: Instant) -> Option<Result<CommandOutcome>> {
        self.purge(now);
        self.entries.get(key).map(|entry| entry.result.clone())
    }

    pub fn insert(&mut self, key: ReplayKey, result: Result<CommandOutcome>, now: Instant) {
        self.entries.insert(
            key,
            Entry {
                stored_at: now,
                result,
            },
        );
    }

    /// Drop entries older than the retention window
    pub fn purge(&mut self, now: Instant) {
        let retention = self.retention;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.stored_at) <= retention);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::GameError;
    use crate::core::types::CityId;
    use crate::map::hex::OffsetCoord;

    fn outcome() -> Result<CommandOutcome> {
        Ok(CommandOutcome::Expanded {
            city: CityId(1),
            target: OffsetCoord::new(0, 1),
            cost: 10,
        })
    }

    #[test]
    fn test_hit_within_retention() {
        let mut cache = ReplayCache::new(Duration::from_secs(3600));
        let game = GameId::new();
        let key = ReplayKey::new(game, CommandKind::ExpandTerritory, "t-1");
        let start = Instant::now();

        cache.insert(key.clone(), outcome(), start);

        assert_eq!(cache.get(&key, start + Duration::from_secs(60)), Some(outcome()));
        let other_kind = ReplayKey::new(game, CommandKind::MoveUnit, "t-1");
        assert_eq!(cache.get(&other_kind, start), None);
    }

    #[test]
    fn test_expired_entries_purged() {
        let mut cache = ReplayCache::new(Duration::from_secs(3600));
        let key = ReplayKey::new(GameId::new(), CommandKind::EndTurn, "t-2");
        let start = Instant::now();
        cache.insert(key.clone(), Err(GameError::GameFinished), start);

        assert_eq!(cache.get(&key, start + Duration::from_secs(3601)), None);
        assert!(cache.is_empty());
    }
}
