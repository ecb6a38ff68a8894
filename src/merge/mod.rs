//! Folding source lists into one ordered, deduplicated catalog.
//!
//! Records have no shared identifier across sources, so identity is the
//! normalized game name. Each call to [`merge`] folds one source into the list
//! built so far: known games only gain fields they were missing, unknown games
//! are slotted in next to the neighbours they had in their own source.

use std::collections::HashMap;

use crate::types::GameRecord;

mod normalize;


pub use normalize::normalize_name;

/// What a single [`merge_with_stats`] call did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub updated: usize,
    pub added: usize,
    pub skipped: usize,
}

/// Fill the fields `existing` is missing from `incoming`.
///
/// Existing values always win, field by field, so a record can pick up its
/// description from one source and its price from another.
pub fn reconcile(existing: GameRecord, incoming: GameRecord) -> GameRecord {
    GameRecord {
        name: existing.name,
        description: existing.description.or(incoming.description),
        price: existing.price.or(incoming.price),
        post_date: existing.post_date.or(incoming.post_date),
        link: existing.link.or(incoming.link),
        platform: existing.platform.or(incoming.platform),
    }
}

/// Where `new_record` belongs in `result`, judged by its neighbours in `source`.
///
/// The nearest following neighbour already in `result` wins (insert before
/// it), then the nearest preceding one (insert after it). With neither, or if
/// `new_record` is not in `source` at all, the answer is the end of `result`.
pub fn insert_position(result: &[GameRecord], new_record: &GameRecord, source: &[GameRecord]) -> usize {
    let mut index = KeyIndex::default();
    for (position, record) in result.iter().enumerate() {
        let key = normalize_name(&record.name);
        if !key.is_empty() && index.get(&key).is_none() {
            index.push(key, position);
        }
    }

    let source_keys: Vec<String> = source.iter().map(|r| normalize_name(&r.name)).collect();

    anchored_position(&index, result.len(), &source_keys, &normalize_name(&new_record.name))
}

/// Fold `incoming` into `base`. See [`merge_with_stats`].
pub fn merge(base: Vec<GameRecord>, incoming: &[GameRecord]) -> Vec<GameRecord> {
    merge_with_stats(base, incoming).0
}

/// Fold `incoming` into `base`, returning the merged list and what happened.
///
/// `base` is first collapsed by key: unnamed records are dropped and repeats
/// are reconciled into their first occurrence. Every incoming record then
/// either updates the entry with the same key or is inserted at the position
/// [`insert_position`] picks against the list as it stands at that moment.
///
/// Anchor lookups scan `incoming` linearly, so a merge costs
/// `O(len(incoming) * len(result))`. Fine for a few hundred giveaways.
pub fn merge_with_stats(base: Vec<GameRecord>, incoming: &[GameRecord]) -> (Vec<GameRecord>, MergeStats) {
    let mut stats = MergeStats::default();
    let mut result: Vec<GameRecord> = Vec::with_capacity(base.len() + incoming.len());
    let mut index = KeyIndex::default();

    for record in base {
        let key = normalize_name(&record.name);
        if key.is_empty() {
            tracing::debug!(name = %record.name, "dropping unnamed base record");
            continue;
        }

        match index.get(&key) {
            Some(position) => {
                let existing = std::mem::take(&mut result[position]);
                result[position] = reconcile(existing, record);
            }
            None => {
                index.push(key, result.len());
                result.push(record);
            }
        }
    }

    let source_keys: Vec<String> = incoming.iter().map(|r| normalize_name(&r.name)).collect();

    for (record, key) in incoming.iter().zip(&source_keys) {
        if key.is_empty() {
            stats.skipped += 1;
            continue;
        }

        if let Some(position) = index.get(key) {
            let existing = std::mem::take(&mut result[position]);
            result[position] = reconcile(existing, record.clone());
            stats.updated += 1;
            tracing::debug!(name = %record.name, position, "updated");
        } else {
            let position = anchored_position(&index, result.len(), &source_keys, key);
            if position == result.len() {
                index.push(key.clone(), position);
            } else {
                index.insert_at(key.clone(), position);
            }
            result.insert(position, record.clone());
            stats.added += 1;
            tracing::debug!(name = %record.name, position, "added");
        }
    }

    (result, stats)
}

/// Key to position in the list being built. Must be updated on every insert.
#[derive(Debug, Default)]
struct KeyIndex {
    positions: HashMap<String, usize>,
}

impl KeyIndex {
    fn get(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Record `key` at the end of the list. Nothing after it needs shifting.
    fn push(&mut self, key: String, position: usize) {
        self.positions.insert(key, position);
    }

    /// Record `key` at `position`, shifting every entry at or after it.
    fn insert_at(&mut self, key: String, position: usize) {
        for existing in self.positions.values_mut() {
            if *existing >= position {
                *existing += 1;
            }
        }
        self.positions.insert(key, position);
    }
}

fn anchored_position(index: &KeyIndex, len: usize, source_keys: &[String], key: &str) -> usize {
    let Some(own) = source_keys.iter().position(|k| k == key) else {
        return len;
    };

    if let Some(after) = source_keys[own + 1..].iter().find_map(|k| index.get(k)) {
        return after;
    }

    if let Some(before) = source_keys[..own].iter().rev().find_map(|k| index.get(k)) {
        return before + 1;
    }

    len
}
