//! Keyspace Module
//!
//! The in-memory engine behind [`super::MemoryStore`]: a map of typed
//! entries with lazy TTL expiry, an optional LRU capacity bound and
//! Redis command semantics.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use crate::error::{CacheError, Result};
use crate::store::KeyType;

use super::entry::{CacheEntry, StoredValue};
use super::glob::glob_match;
use super::lru::LruTracker;
use super::stats::CacheStats;

const BACKEND: &str = "memory";

// == Keyspace ==
#[derive(Debug)]
pub struct Keyspace {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    /// 0 = unbounded
    max_entries: usize,
}

impl Keyspace {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
        }
    }

    // == Internals ==

    fn wrong_type(key: &str) -> CacheError {
        CacheError::wrong_type(BACKEND, key)
    }

    fn drop_key(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    /// Removes `key` if its TTL has elapsed.
    fn purge_if_expired(&mut self, key: &str) {
        if self.entries.get(key).is_some_and(CacheEntry::is_expired) {
            self.drop_key(key);
            self.stats.record_expired(1);
        }
    }

    /// Evicts the least recently used key when a new key would exceed the bound.
    fn make_room(&mut self) {
        if self.max_entries == 0 {
            return;
        }
        while self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
                None => break,
            }
        }
    }

    /// Live value of `key` for a read, recording a hit or miss.
    fn read(&mut self, key: &str) -> Option<&StoredValue> {
        self.purge_if_expired(key);
        let hit = self.entries.contains_key(key);
        self.stats.record_read(hit);
        if hit {
            self.lru.touch(key);
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Value slot of `key` for a write, created from `empty` when absent.
    fn slot(&mut self, key: &str, empty: StoredValue) -> &mut StoredValue {
        self.purge_if_expired(key);
        if !self.entries.contains_key(key) {
            self.make_room();
        }
        self.lru.touch(key);
        &mut self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry::new(empty))
            .value
    }

    /// Applies a member removal; `remove` returns `None` on a type mismatch.
    /// The key is deleted once the collection is empty.
    fn remove_member(
        &mut self,
        key: &str,
        remove: impl FnOnce(&mut StoredValue) -> Option<bool>,
    ) -> Result<bool> {
        self.purge_if_expired(key);
        let Some(entry) = self.entries.get_mut(key) else {
            return Ok(false);
        };
        let removed = remove(&mut entry.value).ok_or_else(|| Self::wrong_type(key))?;
        if entry.value.is_empty_collection() {
            self.drop_key(key);
        }
        Ok(removed)
    }

    /// Replaces `dest` with `value`, or deletes it when the result is empty.
    fn store_result(&mut self, dest: &str, value: StoredValue) -> usize {
        self.drop_key(dest);
        let card = value.card().unwrap_or(0);
        if card > 0 {
            self.make_room();
            self.entries.insert(dest.to_string(), CacheEntry::new(value));
            self.lru.touch(dest);
        }
        card
    }

    fn set_members(&mut self, key: &str) -> Result<HashSet<String>> {
        self.purge_if_expired(key);
        match self.entries.get(key).map(|entry| &entry.value) {
            None => Ok(HashSet::new()),
            Some(StoredValue::Set(members)) => Ok(members.clone()),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    /// Plain set members count with score 1, as ZUNIONSTORE does.
    fn scored_members(&mut self, key: &str) -> Result<HashMap<String, f64>> {
        self.purge_if_expired(key);
        match self.entries.get(key).map(|entry| &entry.value) {
            None => Ok(HashMap::new()),
            Some(StoredValue::Set(members)) => {
                Ok(members.iter().map(|m| (m.clone(), 1.0)).collect())
            }
            Some(StoredValue::ZSet(members)) => Ok(members.clone()),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    fn union_of(&mut self, keys: &[String]) -> Result<HashSet<String>> {
        let mut union = HashSet::new();
        for key in keys {
            union.extend(self.set_members(key)?);
        }
        Ok(union)
    }

    fn inter_of(&mut self, keys: &[String]) -> Result<HashSet<String>> {
        let mut sets = Vec::with_capacity(keys.len());
        for key in keys {
            sets.push(self.set_members(key)?);
        }
        let mut iter = sets.into_iter();
        let first = iter.next().unwrap_or_default();
        Ok(iter.fold(first, |acc, set| acc.intersection(&set).cloned().collect()))
    }

    fn zunion_of(&mut self, keys: &[String]) -> Result<HashMap<String, f64>> {
        let mut union: HashMap<String, f64> = HashMap::new();
        for key in keys {
            for (member, score) in self.scored_members(key)? {
                *union.entry(member).or_insert(0.0) += score;
            }
        }
        Ok(union)
    }

    fn zinter_of(&mut self, keys: &[String]) -> Result<HashMap<String, f64>> {
        let mut scored = Vec::with_capacity(keys.len());
        for key in keys {
            scored.push(self.scored_members(key)?);
        }
        let mut iter = scored.into_iter();
        let first = iter.next().unwrap_or_default();
        Ok(iter.fold(first, |acc, other| {
            acc.into_iter()
                .filter_map(|(member, score)| other.get(&member).map(|s| (member, score + s)))
                .collect()
        }))
    }

    // == Keyspace Commands ==

    pub fn key_type(&mut self, key: &str) -> KeyType {
        self.purge_if_expired(key);
        self.entries
            .get(key)
            .map_or(KeyType::None, |entry| entry.value.key_type())
    }

    pub fn exists(&mut self, key: &str) -> bool {
        self.purge_if_expired(key);
        self.entries.contains_key(key)
    }

    pub fn keys(&mut self, pattern: &str) -> Vec<String> {
        self.cleanup_expired();
        let mut keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    pub fn expire(&mut self, key: &str, seconds: u64) -> bool {
        self.purge_if_expired(key);
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.expire_in(seconds);
                true
            }
            None => false,
        }
    }

    pub fn del(&mut self, key: &str) -> bool {
        self.purge_if_expired(key);
        self.drop_key(key)
    }

    pub fn dbsize(&mut self) -> usize {
        self.cleanup_expired();
        self.entries.len()
    }

    pub fn flushdb(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    pub fn card(&mut self, key: &str, kind: &KeyType) -> Result<usize> {
        self.purge_if_expired(key);
        match self.entries.get(key) {
            None => Ok(0),
            Some(entry) if entry.value.key_type() == *kind => Ok(entry.value.card().unwrap_or(0)),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.drop_key(key);
        }
        self.stats.record_expired(expired.len());
        expired.len()
    }

    // == String Commands ==

    pub fn get(&mut self, key: &str) -> Result<Option<String>> {
        match self.read(key) {
            None => Ok(None),
            Some(StoredValue::Str(value)) => Ok(Some(value.clone())),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    /// Overwrites any previous value and clears its TTL.
    pub fn set(&mut self, key: &str, value: String) {
        self.purge_if_expired(key);
        if !self.entries.contains_key(key) {
            self.make_room();
        }
        self.entries
            .insert(key.to_string(), CacheEntry::new(StoredValue::Str(value)));
        self.lru.touch(key);
    }

    // == Hash Commands ==

    pub fn hset(&mut self, key: &str, fields: Vec<(String, String)>) -> Result<()> {
        match self.slot(key, StoredValue::Hash(HashMap::new())) {
            StoredValue::Hash(hash) => {
                hash.extend(fields);
                Ok(())
            }
            _ => Err(Self::wrong_type(key)),
        }
    }

    pub fn hgetall(&mut self, key: &str) -> Result<Vec<(String, String)>> {
        match self.read(key) {
            None => Ok(Vec::new()),
            Some(StoredValue::Hash(hash)) => {
                let mut fields: Vec<(String, String)> =
                    hash.iter().map(|(f, v)| (f.clone(), v.clone())).collect();
                fields.sort();
                Ok(fields)
            }
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    pub fn hdel(&mut self, key: &str, field: &str) -> Result<bool> {
        self.remove_member(key, |value| match value {
            StoredValue::Hash(hash) => Some(hash.remove(field).is_some()),
            _ => None,
        })
    }

    // == List Commands ==

    pub fn rpush(&mut self, key: &str, values: Vec<String>) -> Result<()> {
        match self.slot(key, StoredValue::List(Vec::new())) {
            StoredValue::List(items) => {
                items.extend(values);
                Ok(())
            }
            _ => Err(Self::wrong_type(key)),
        }
    }

    pub fn lrange(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        match self.read(key) {
            None => Ok(Vec::new()),
            Some(StoredValue::List(items)) => {
                let range = normalize_range(items.len(), start, stop);
                Ok(items[range].to_vec())
            }
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    // == Set Commands ==

    pub fn sadd(&mut self, key: &str, members: Vec<String>) -> Result<()> {
        match self.slot(key, StoredValue::Set(HashSet::new())) {
            StoredValue::Set(set) => {
                set.extend(members);
                Ok(())
            }
            _ => Err(Self::wrong_type(key)),
        }
    }

    pub fn srem(&mut self, key: &str, member: &str) -> Result<bool> {
        self.remove_member(key, |value| match value {
            StoredValue::Set(set) => Some(set.remove(member)),
            _ => None,
        })
    }

    pub fn smembers(&mut self, key: &str) -> Result<Vec<String>> {
        match self.read(key) {
            None => Ok(Vec::new()),
            Some(StoredValue::Set(set)) => Ok(sorted(set.iter().cloned())),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    pub fn sunion(&mut self, keys: &[String]) -> Result<Vec<String>> {
        Ok(sorted(self.union_of(keys)?))
    }

    pub fn sinter(&mut self, keys: &[String]) -> Result<Vec<String>> {
        Ok(sorted(self.inter_of(keys)?))
    }

    pub fn sunionstore(&mut self, dest: &str, keys: &[String]) -> Result<usize> {
        let union = self.union_of(keys)?;
        Ok(self.store_result(dest, StoredValue::Set(union)))
    }

    pub fn sinterstore(&mut self, dest: &str, keys: &[String]) -> Result<usize> {
        let inter = self.inter_of(keys)?;
        Ok(self.store_result(dest, StoredValue::Set(inter)))
    }

    // == Sorted Set Commands ==

    pub fn zadd(&mut self, key: &str, members: Vec<(String, f64)>) -> Result<()> {
        match self.slot(key, StoredValue::ZSet(HashMap::new())) {
            StoredValue::ZSet(zset) => {
                zset.extend(members);
                Ok(())
            }
            _ => Err(Self::wrong_type(key)),
        }
    }

    pub fn zrem(&mut self, key: &str, member: &str) -> Result<bool> {
        self.remove_member(key, |value| match value {
            StoredValue::ZSet(zset) => Some(zset.remove(member).is_some()),
            _ => None,
        })
    }

    pub fn zrange(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        match self.read(key) {
            None => Ok(Vec::new()),
            Some(StoredValue::ZSet(zset)) => {
                let ordered = StoredValue::zset_sorted(zset);
                let range = normalize_range(ordered.len(), start, stop);
                Ok(ordered[range].iter().map(|(m, _)| (*m).clone()).collect())
            }
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    /// Members with `min <= score <= max`, ascending.
    pub fn zrangebyscore(&mut self, key: &str, min: f64, max: f64) -> Result<Vec<String>> {
        match self.read(key) {
            None => Ok(Vec::new()),
            Some(StoredValue::ZSet(zset)) => Ok(StoredValue::zset_sorted(zset)
                .into_iter()
                .filter(|(_, score)| *score >= min && *score <= max)
                .map(|(m, _)| m.clone())
                .collect()),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    pub fn zunionstore(&mut self, dest: &str, keys: &[String]) -> Result<usize> {
        let union = self.zunion_of(keys)?;
        Ok(self.store_result(dest, StoredValue::ZSet(union)))
    }

    pub fn zinterstore(&mut self, dest: &str, keys: &[String]) -> Result<usize> {
        let inter = self.zinter_of(keys)?;
        Ok(self.store_result(dest, StoredValue::ZSet(inter)))
    }
}

fn sorted(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut items: Vec<String> = items.into_iter().collect();
    items.sort();
    items
}

/// Resolves Redis-style inclusive indices (negative counts from the end)
/// into a slice range; out-of-bounds ranges resolve to empty.
fn normalize_range(len: usize, start: i64, stop: i64) -> Range<usize> {
    let len = len as i64;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return 0..0;
    }
    start as usize..(stop + 1) as usize
}
