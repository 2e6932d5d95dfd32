//! Versioned in-memory engine: key → list of pairwise-concurrent
//! versions, with optimistic put and version-aware delete.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use regex::Regex;
use tracing::trace;
use vkv_core::{Clock, ClockOrdering, MatchType, StoreError, StoreResult, Versioned};

use crate::serializer::KeySerializer;
use crate::store::Store;

type KeyList<C, V> = Arc<Mutex<Vec<Versioned<C, V>>>>;

/// Versioned, concurrent in-memory key-value engine.
///
/// State is a concurrent map from key to an `Arc<Mutex<Vec<Versioned>>>`
/// (the key-list lock); the `Arc` identity itself doubles as the
/// "is this still the mapped list" recheck token the optimistic put and
/// delete loops use after re-acquiring the key-list lock.
pub struct InMemoryEngine<K, C: Clock, V> {
    map: DashMap<K, KeyList<C, V>>,
    key_serializer: Option<Arc<dyn KeySerializer<K> + Send + Sync>>,
}

impl<K, C, V> InMemoryEngine<K, C, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    C: Clock,
    V: Clone + Send + Sync + 'static,
{
    /// An engine with no registered key serializer. Expression-based
    /// deletion will fail with `Unsupported` until one is attached via
    /// [`Self::with_key_serializer`].
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
            key_serializer: None,
        }
    }

    /// Attach a key serializer, enabling expression-based deletion.
    pub fn with_key_serializer(mut self, serializer: Arc<dyn KeySerializer<K> + Send + Sync>) -> Self {
        self.key_serializer = Some(serializer);
        self
    }

    fn snapshot(&self, key: &K) -> Vec<Versioned<C, V>> {
        match self.map.get(key) {
            Some(entry) => entry.value().lock().clone(),
            None => Vec::new(),
        }
    }
}

impl<K, C, V> Default for InMemoryEngine<K, C, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    C: Clock,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C, V> Store<K, C, V> for InMemoryEngine<K, C, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    C: Clock,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> StoreResult<Vec<Versioned<C, V>>> {
        Ok(self.snapshot(key))
    }

    fn put(&self, key: K, record: Versioned<C, V>) -> StoreResult<()> {
        loop {
            let Some(entry) = self.map.get(&key) else {
                let list: KeyList<C, V> = Arc::new(Mutex::new(vec![record.clone()]));
                match self.map.entry(key.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(list);
                        return Ok(());
                    }
                    Entry::Occupied(_) => continue,
                };
            };
            let list = entry.value().clone();
            drop(entry);

            let mut guard = list.lock();
            match self.map.get(&key) {
                Some(current) if Arc::ptr_eq(current.value(), &list) => {}
                _ => continue, // list was swapped out from under us; retry
            }

            let mut keep = Vec::with_capacity(guard.len() + 1);
            let mut already_present = false;
            for existing in guard.iter() {
                match record.version.compare(&existing.version) {
                    ClockOrdering::Before => return Err(StoreError::ObsoleteVersion),
                    ClockOrdering::After => {
                        trace!("put superseding an existing version");
                    }
                    ClockOrdering::Equal => {
                        already_present = true;
                        keep.push(existing.clone());
                    }
                    ClockOrdering::Concurrent => keep.push(existing.clone()),
                }
            }
            if !already_present {
                keep.push(record);
            }
            *guard = keep;
            return Ok(());
        }
    }

    fn delete(&self, key: &K, version: Option<&C>) -> StoreResult<bool> {
        let version = match version {
            None => return Ok(self.map.remove(key).is_some()),
            Some(v) => v,
        };

        let Some(entry) = self.map.get(key) else {
            return Ok(false);
        };
        let list = entry.value().clone();
        drop(entry);

        let (removed, now_empty) = {
            let mut guard = list.lock();
            let before = guard.len();
            guard.retain(|record| !record.version.is_obsolete_against(version));
            (before != guard.len(), guard.is_empty())
        };

        if now_empty {
            self.map.remove_if(key, |_, mapped| Arc::ptr_eq(mapped, &list));
        }
        Ok(removed)
    }

    fn delete_all(&self, versions: &HashMap<K, C>) -> StoreResult<bool>
    where
        K: Eq + Hash + Clone,
    {
        let mut any = false;
        for (key, version) in versions {
            if self.delete(key, Some(version))? {
                any = true;
            }
        }
        Ok(any)
    }

    fn delete_all_matching(&self, match_type: MatchType, expression: &str) -> StoreResult<bool> {
        if match_type == MatchType::ElExpression {
            return Err(StoreError::Unsupported("el_expression has no registered evaluator"));
        }

        let serializer = self
            .key_serializer
            .as_ref()
            .ok_or(StoreError::Unsupported("expression delete requires a registered key serializer"))?;

        let regex = match match_type {
            MatchType::Regex => Some(
                Regex::new(expression).map_err(|e| StoreError::OperationFailed(e.to_string()))?,
            ),
            _ => None,
        };

        let matching: Vec<K> = self
            .map
            .iter()
            .filter_map(|entry| {
                let key = entry.key().clone();
                let is_match = match match_type {
                    MatchType::StartsWith => serializer
                        .raw_bytes(&key)
                        .starts_with(expression.as_bytes()),
                    MatchType::Contains => serializer.serialize(&key).contains(expression),
                    MatchType::EndsWith => serializer.serialize(&key).ends_with(expression),
                    MatchType::Regex => regex
                        .as_ref()
                        .expect("regex compiled above for Regex match type")
                        .is_match(&serializer.serialize(&key)),
                    MatchType::ElExpression => unreachable!("handled above"),
                };
                is_match.then_some(key)
            })
            .collect();

        let mut any = false;
        for key in matching {
            if self.map.remove(&key).is_some() {
                any = true;
            }
        }
        Ok(any)
    }

    fn entries(&self) -> StoreResult<Box<dyn Iterator<Item = (K, Versioned<C, V>)> + '_>> {
        let keys: Vec<K> = self.map.iter().map(|entry| entry.key().clone()).collect();
        Ok(Box::new(Entries {
            engine: self,
            keys: keys.into_iter(),
            current_key: None,
            current: Vec::new().into_iter(),
        }))
    }

    fn keys(&self) -> StoreResult<Box<dyn Iterator<Item = K> + '_>> {
        let keys: Vec<K> = self.map.iter().map(|entry| entry.key().clone()).collect();
        Ok(Box::new(keys.into_iter()))
    }

    fn get_capability(&self, tag: &str) -> StoreResult<&(dyn std::any::Any + Send + Sync)> {
        if tag == "key_serializer" {
            if let Some(serializer) = &self.key_serializer {
                return Ok(serializer.as_ref());
            }
        }
        Err(StoreError::NoSuchCapability(tag.to_string()))
    }
}

/// Forward-only flattening iterator returned by [`InMemoryEngine::entries`].
///
/// On advancing to a new key it takes a snapshot of that key's list under
/// the list's own lock, then iterates the snapshot outside the lock.
/// Empty lists encountered mid-iteration are skipped.
struct Entries<'a, K, C: Clock, V> {
    engine: &'a InMemoryEngine<K, C, V>,
    keys: std::vec::IntoIter<K>,
    current_key: Option<K>,
    current: std::vec::IntoIter<Versioned<C, V>>,
}

impl<'a, K, C, V> Iterator for Entries<'a, K, C, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    C: Clock,
    V: Clone + Send + Sync + 'static,
{
    type Item = (K, Versioned<C, V>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.current.next() {
                let key = self.current_key.clone().expect("current set alongside current_key");
                return Some((key, record));
            }
            let key = self.keys.next()?;
            let snapshot = self.engine.snapshot(&key);
            self.current_key = Some(key);
            self.current = snapshot.into_iter();
        }
    }
}
