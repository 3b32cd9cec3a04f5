//! Independent engines keyed by tracked entity.

use crate::config::EngineConfig;
use crate::engine::SignalEngine;
use crate::snapshot::EngineSnapshot;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Opaque identifier for a tracked entity (an asset on a page, a tab, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for EntityKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Owns one engine per entity; engines share a configuration but no state.
#[derive(Debug, Clone)]
pub struct EngineRegistry {
    config: EngineConfig,
    engines: BTreeMap<EntityKey, SignalEngine>,
}

impl EngineRegistry {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            engines: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Engine for `key`, created on first use.
    pub fn engine(&mut self, key: &EntityKey) -> Result<&mut SignalEngine> {
        if !self.engines.contains_key(key) {
            debug!(entity = %key, "tracking new entity");
            let engine = SignalEngine::new(self.config.clone())?;
            self.engines.insert(key.clone(), engine);
        }

        self.engines
            .get_mut(key)
            .ok_or_else(|| Error::UnknownEntity(key.to_string()))
    }

    pub fn get(&self, key: &EntityKey) -> Option<&SignalEngine> {
        self.engines.get(key)
    }

    /// Route a price sample to the entity's engine.
    pub fn submit_price(&mut self, key: &EntityKey, value: f64, timestamp: i64) -> Result<bool> {
        Ok(self.engine(key)?.submit_price(value, timestamp))
    }

    pub fn reset(&mut self, key: &EntityKey) -> Result<()> {
        self.engines
            .get_mut(key)
            .map(SignalEngine::reset)
            .ok_or_else(|| Error::UnknownEntity(key.to_string()))
    }

    /// Stop tracking an entity, handing back its engine.
    pub fn remove(&mut self, key: &EntityKey) -> Option<SignalEngine> {
        self.engines.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.engines.keys()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn snapshots(&self) -> BTreeMap<EntityKey, EngineSnapshot> {
        self.engines
            .iter()
            .map(|(key, engine)| (key.clone(), engine.snapshot()))
            .collect()
    }

    /// Restore engines from snapshots, replacing any existing ones.
    ///
    /// A snapshot that fails validation is logged and its entity starts fresh.
    /// Returns the number of snapshots restored as-is.
    pub fn restore_all(&mut self, snapshots: BTreeMap<EntityKey, EngineSnapshot>) -> Result<usize> {
        let mut restored = 0;

        for (key, snapshot) in snapshots {
            let engine = match SignalEngine::restore(self.config.clone(), snapshot) {
                Ok(engine) => {
                    restored += 1;
                    engine
                }
                Err(e) => {
                    warn!(entity = %key, error = %e, "discarding unusable snapshot");
                    SignalEngine::new(self.config.clone())?
                }
            };
            self.engines.insert(key, engine);
        }

        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Signal;

    fn registry() -> EngineRegistry {
        EngineRegistry::new(EngineConfig {
            simulate_trading: true,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_entities_are_independent() {
        let mut reg = registry();
        let btc = EntityKey::from("btc");
        let eth = EntityKey::from("eth");

        assert!(reg.submit_price(&btc, 60_000.0, 1).unwrap());
        assert!(reg.submit_price(&btc, 60_100.0, 2).unwrap());
        assert!(reg.submit_price(&eth, 3_000.0, 1).unwrap());

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(&btc).unwrap().series().len(), 2);
        assert_eq!(reg.get(&eth).unwrap().series().last(), Some(3_000.0));
    }

    #[test]
    fn test_invalid_price_still_creates_entity() {
        let mut reg = registry();
        let key = EntityKey::from("page");
        assert!(!reg.submit_price(&key, f64::NAN, 1).unwrap());
        assert!(reg.get(&key).unwrap().series().is_empty());
    }

    #[test]
    fn test_reset_unknown_entity() {
        let mut reg = registry();
        let result = reg.reset(&EntityKey::from("missing"));
        assert!(matches!(result, Err(Error::UnknownEntity(_))));
    }

    #[test]
    fn test_reset_and_remove() {
        let mut reg = registry();
        let key = EntityKey::from("sol");
        reg.submit_price(&key, 150.0, 1).unwrap();

        reg.reset(&key).unwrap();
        assert_eq!(reg.get(&key).unwrap().signal(), Signal::Warmup);

        assert!(reg.remove(&key).is_some());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_snapshots_and_restore_all() {
        let mut reg = registry();
        let good = EntityKey::from("good");
        let bad = EntityKey::from("bad");
        for (i, price) in [10.0, 11.0, 12.0].iter().enumerate() {
            reg.submit_price(&good, *price, i as i64).unwrap();
            reg.submit_price(&bad, *price, i as i64).unwrap();
        }

        let mut snapshots = reg.snapshots();
        snapshots.get_mut(&bad).unwrap().simulation.holdings = -3.0;

        let mut fresh = registry();
        let restored = fresh.restore_all(snapshots).unwrap();

        assert_eq!(restored, 1);
        assert_eq!(fresh.get(&good).unwrap().series().len(), 3);
        assert!(fresh.get(&bad).unwrap().series().is_empty());
        assert_eq!(fresh.keys().count(), 2);
    }

    #[test]
    fn test_entity_key_serializes_as_string() {
        let key = EntityKey::new("example.com/BTC");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"example.com/BTC\"");
        assert_eq!(key.as_str(), "example.com/BTC");
    }
}
