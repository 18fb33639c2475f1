//! Authoritative entity storage with stable identifiers and deferred removal.

use std::collections::{BTreeMap, BTreeSet};

use lawn_defence_core::{AttackerId, DefenderId, DefenderKind, ProjectileId};

use crate::{
    entities::{Attacker, Defender, Projectile},
    grid::GridMap,
};

/// Ordered collection keyed by a stable identifier.
///
/// Removals are only recorded while passes iterate; the entries stay in place
/// until [`Slots::reap`] runs at the end of the tick. Entries awaiting removal
/// are invisible to every `live` accessor.
#[derive(Debug)]
pub(crate) struct Slots<K, V> {
    entries: BTreeMap<K, V>,
    pending: BTreeSet<K>,
}

impl<K: Copy + Ord, V> Slots<K, V> {
    fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            pending: BTreeSet::new(),
        }
    }

    fn insert(&mut self, key: K, value: V) {
        let _ = self.entries.insert(key, value);
    }

    /// Returns the entry if it exists and is not awaiting removal.
    pub(crate) fn live(&self, key: K) -> Option<&V> {
        if self.pending.contains(&key) {
            return None;
        }
        self.entries.get(&key)
    }

    pub(crate) fn live_mut(&mut self, key: K) -> Option<&mut V> {
        if self.pending.contains(&key) {
            return None;
        }
        self.entries.get_mut(&key)
    }

    /// Captures the identifiers of live entries so callers can mutate the
    /// collection while walking the snapshot.
    pub(crate) fn live_keys(&self) -> Vec<K> {
        self.iter_live().map(|(key, _)| key).collect()
    }

    pub(crate) fn iter_live(&self) -> impl Iterator<Item = (K, &V)> {
        let pending = &self.pending;
        self.entries
            .iter()
            .filter(move |(key, _)| !pending.contains(*key))
            .map(|(key, value)| (*key, value))
    }

    pub(crate) fn iter_live_mut(&mut self) -> impl Iterator<Item = &mut V> {
        let pending = &self.pending;
        self.entries
            .iter_mut()
            .filter(move |(key, _)| !pending.contains(*key))
            .map(|(_, value)| value)
    }

    /// Schedules the entry for removal at the next reap. Unknown or already
    /// scheduled keys are ignored.
    pub(crate) fn mark_for_removal(&mut self, key: K) {
        if self.entries.contains_key(&key) {
            let _ = self.pending.insert(key);
        }
    }

    fn reap(&mut self) -> Vec<V> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .into_iter()
            .filter_map(|key| self.entries.remove(&key))
            .collect()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.pending.clear();
    }
}

/// Owns the live defenders, attackers and projectiles.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    pub(crate) defenders: Slots<DefenderId, Defender>,
    pub(crate) attackers: Slots<AttackerId, Attacker>,
    pub(crate) projectiles: Slots<ProjectileId, Projectile>,
    next_defender_id: DefenderId,
    next_attacker_id: AttackerId,
    next_projectile_id: ProjectileId,
}

impl EntityRegistry {
    /// Creates an empty registry with reset identifier counters.
    pub(crate) fn new() -> Self {
        Self {
            defenders: Slots::new(),
            attackers: Slots::new(),
            projectiles: Slots::new(),
            next_defender_id: DefenderId::new(0),
            next_attacker_id: AttackerId::new(0),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn insert_defender(&mut self, defender: Defender) -> DefenderId {
        let id = self.next_defender_id;
        self.next_defender_id = DefenderId::new(id.get().wrapping_add(1));
        self.defenders.insert(id, defender);
        id
    }

    pub(crate) fn insert_attacker(&mut self, attacker: Attacker) -> AttackerId {
        let id = self.next_attacker_id;
        self.next_attacker_id = AttackerId::new(id.get().wrapping_add(1));
        self.attackers.insert(id, attacker);
        id
    }

    pub(crate) fn insert_projectile(&mut self, projectile: Projectile) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().wrapping_add(1));
        self.projectiles.insert(id, projectile);
        id
    }

    pub(crate) fn live_shooters(&self) -> usize {
        self.defenders
            .iter_live()
            .filter(|(_, defender)| defender.kind() == DefenderKind::Shooter)
            .count()
    }

    /// Flushes every pending removal, releasing the grid cells held by removed
    /// defenders.
    pub(crate) fn reap(&mut self, grid: &mut GridMap) {
        for defender in self.defenders.reap() {
            grid.free(defender.cell());
        }
        let _ = self.attackers.reap();
        let _ = self.projectiles.reap();
    }

    /// Drops every entity while keeping identifiers unique for the session.
    pub(crate) fn clear(&mut self) {
        self.defenders.clear();
        self.attackers.clear();
        self.projectiles.clear();
    }
}
