use std::any::TypeId;
use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::container::registry::RegistrationError;
use crate::key::TypeKey;
use crate::strategy::{Conversion, ConversionError, Strategy};

/// Maps registration keys to the strategies producing their objects.
///
/// Strategies are handed out as `Arc`s so that no lock is held while an
/// object is being produced. Released strategies are disposed after the lock
/// has been dropped.
#[derive(Debug, Default)]
pub struct RegistrationTable {
    entries: RwLock<HashMap<TypeId, HashMap<TypeKey, Arc<Strategy>>>>,
}

impl RegistrationTable {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts or replaces the registration of `key`. A replaced strategy is
    /// disposed.
    pub fn register(&self, key: TypeKey, strategy: Strategy) {
        let kind = strategy.kind();
        let previous = self
            .entries
            .write()
            .entry(key.target_type())
            .or_default()
            .insert(key.clone(), Arc::new(strategy));

        if let Some(previous) = previous {
            debug!(%key, %kind, replaced = %previous.kind(), "replaced registration");
            previous.dispose();
        } else {
            debug!(%key, %kind, "registered");
        }
    }

    pub fn lookup(&self, key: &TypeKey) -> Option<Arc<Strategy>> {
        self.entries
            .read()
            .get(&key.target_type())
            .and_then(|slot| slot.get(key))
            .cloned()
    }

    /// Replaces the strategy of `key` with whatever `convert` derives from
    /// the current one.
    pub fn convert<F>(&self, key: &TypeKey, convert: F) -> Result<(), RegistrationError>
    where
        F: FnOnce(&Strategy) -> Result<Conversion, ConversionError>,
    {
        let mut entries = self.entries.write();
        let Some(current) = entries
            .get_mut(&key.target_type())
            .and_then(|slot| slot.get_mut(key))
        else {
            return Err(RegistrationError::NotRegistered { key: key.clone() });
        };

        let conversion = convert(current).map_err(|source| RegistrationError::Conversion {
            key: key.clone(),
            source,
        })?;

        match conversion {
            Conversion::Unchanged => Ok(()),
            Conversion::Replaced {
                strategy,
                release_previous,
            } => {
                let kind = strategy.kind();
                let previous = mem::replace(current, Arc::new(strategy));
                drop(entries);

                debug!(%key, from = %previous.kind(), to = %kind, "converted registration");
                if release_previous {
                    previous.dispose();
                }
                Ok(())
            }
        }
    }

    /// Removes and disposes the registration of `key`. Returns false if there
    /// was none.
    pub fn remove(&self, key: &TypeKey) -> bool {
        let removed = {
            let mut entries = self.entries.write();
            let removed = entries
                .get_mut(&key.target_type())
                .and_then(|slot| slot.remove(key));
            if entries
                .get(&key.target_type())
                .is_some_and(|slot| slot.is_empty())
            {
                entries.remove(&key.target_type());
            }
            removed
        };

        match removed {
            Some(strategy) => {
                debug!(%key, "unregistered");
                strategy.dispose();
                true
            }
            None => false,
        }
    }

    /// Returns every registered key of the given type.
    pub fn keys_of(&self, target: TypeId) -> Vec<TypeKey> {
        self.entries
            .read()
            .get(&target)
            .map(|slot| slot.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().values().map(HashMap::len).sum()
    }

    /// Empties the table, disposing every strategy.
    pub fn dispose_all(&self) {
        let entries = mem::take(&mut *self.entries.write());
        for (key, strategy) in entries.into_values().flatten() {
            debug!(%key, "disposing registration");
            strategy.dispose();
        }
    }
}
