//! De-flickering of the per-frame key set.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tagtrack_core::Mix;

/// Tracks, per key, how many consecutive updates have passed since it was
/// last observed, and reports which keys should be forgotten.
///
/// `persistence` is the number of consecutive absent frames a key survives:
/// with `persistence = N`, a key is reported forgotten on its (N+1)-th
/// consecutive absent frame; `persistence = 0` forgets a key on the first
/// frame it is absent.
#[derive(Clone, Debug)]
pub struct PersistenceManager<Id> {
    persistence: u32,
    ages: BTreeMap<Id, u32>,
}

impl<Id: Ord + Clone> PersistenceManager<Id> {
    pub fn new(persistence: u32) -> Self {
        Self {
            persistence,
            ages: BTreeMap::new(),
        }
    }

    /// Updates the threshold; takes effect from the next [`update`](Self::update).
    pub fn set_persistence(&mut self, persistence: u32) {
        self.persistence = persistence;
    }

    pub fn persistence(&self) -> u32 {
        self.persistence
    }

    /// Feeds the key set of the current frame and returns the keys to
    /// forget, in ascending key order.
    ///
    /// Keys present in `current` have their counter reset to zero (creating
    /// a record on first sighting); absent keys are aged and evicted once
    /// they outlive the persistence window.
    pub fn update<V>(&mut self, current: &BTreeMap<Id, V>) -> Vec<Id> {
        let mut forgotten = Vec::new();
        let persistence = self.persistence;
        self.ages.retain(|id, age| {
            if current.contains_key(id) {
                *age = 0;
                true
            } else if *age >= persistence {
                forgotten.push(id.clone());
                false
            } else {
                *age += 1;
                true
            }
        });
        for id in current.keys() {
            self.ages.entry(id.clone()).or_insert(0);
        }
        forgotten
    }

    /// Number of keys currently tracked.
    pub fn tracked(&self) -> usize {
        self.ages.len()
    }
}

/// Retains the last known value of every key surviving the persistence
/// window.
///
/// This is the primary de-flicker operation: a tag that vanishes for up to
/// `persistence` frames still reports its last known value.
#[derive(Clone, Debug)]
pub struct Cache<Id, V> {
    manager: PersistenceManager<Id>,
    cached: BTreeMap<Id, V>,
}

impl<Id: Ord + Clone, V: Clone> Cache<Id, V> {
    pub fn new(persistence: u32) -> Self {
        Self {
            manager: PersistenceManager::new(persistence),
            cached: BTreeMap::new(),
        }
    }

    pub fn set_persistence(&mut self, persistence: u32) {
        self.manager.set_persistence(persistence);
    }

    /// Merges the current frame into the cache and returns the full merged
    /// view: survivors from past frames plus every current observation.
    pub fn update(&mut self, current: &BTreeMap<Id, V>) -> &BTreeMap<Id, V> {
        for id in self.manager.update(current) {
            self.cached.remove(&id);
        }
        for (id, value) in current {
            self.cached.insert(id.clone(), value.clone());
        }
        &self.cached
    }
}

/// A [`Cache`] whose overwrite step low-pass blends the old and new value:
/// `gain * old + (1 - gain) * observed`.
///
/// `gain = 0` disables smoothing (every observation passes through
/// unchanged); values close to 1 respond slowly to new observations. The
/// first observation of a key is always stored unblended.
#[derive(Clone, Debug)]
pub struct BlendFilter<Id, V> {
    manager: PersistenceManager<Id>,
    gain: f64,
    smoothed: BTreeMap<Id, V>,
}

impl<Id: Ord + Clone, V: Mix> BlendFilter<Id, V> {
    pub fn new(persistence: u32, gain: f64) -> Self {
        Self {
            manager: PersistenceManager::new(persistence),
            gain,
            smoothed: BTreeMap::new(),
        }
    }

    pub fn set_persistence(&mut self, persistence: u32) {
        self.manager.set_persistence(persistence);
    }

    pub fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }

    /// Merges and blends the current frame, returning the full de-flickered,
    /// smoothed view.
    pub fn update(&mut self, current: &BTreeMap<Id, V>) -> &BTreeMap<Id, V> {
        for id in self.manager.update(current) {
            self.smoothed.remove(&id);
        }
        for (id, value) in current {
            match self.smoothed.entry(id.clone()) {
                Entry::Occupied(mut entry) => {
                    let blended = entry.get().mix(value, self.gain);
                    entry.insert(blended);
                }
                Entry::Vacant(entry) => {
                    entry.insert(value.clone());
                }
            }
        }
        &self.smoothed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tagtrack_core::{quad, Quad, TagId};

    fn frame(ids: &[TagId]) -> BTreeMap<TagId, u32> {
        ids.iter().map(|&id| (id, 0)).collect()
    }

    #[test]
    fn zero_persistence_forgets_on_first_absence() {
        let mut manager = PersistenceManager::new(0);
        assert!(manager.update(&frame(&[])).is_empty());
        assert!(manager.update(&frame(&[42])).is_empty());
        assert_eq!(manager.update(&frame(&[])), vec![42]);
        assert_eq!(manager.tracked(), 0);
    }

    #[test]
    fn key_survives_exactly_persistence_absent_frames() {
        let mut manager = PersistenceManager::new(3);
        assert!(manager.update(&frame(&[])).is_empty());
        assert!(manager.update(&frame(&[42])).is_empty());
        assert!(manager.update(&frame(&[])).is_empty());
        assert!(manager.update(&frame(&[])).is_empty());
        assert!(manager.update(&frame(&[])).is_empty());
        assert_eq!(manager.update(&frame(&[])), vec![42]);
    }

    #[test]
    fn eviction_interleaves_with_other_observations() {
        let mut manager = PersistenceManager::new(2);
        assert!(manager.update(&frame(&[])).is_empty());
        assert!(manager.update(&frame(&[42])).is_empty());
        assert!(manager.update(&frame(&[])).is_empty());
        assert!(manager.update(&frame(&[])).is_empty());
        assert_eq!(manager.update(&frame(&[43])), vec![42]);
    }

    #[test]
    fn resighting_resets_the_counter() {
        let mut manager = PersistenceManager::new(1);
        assert!(manager.update(&frame(&[7])).is_empty());
        assert!(manager.update(&frame(&[])).is_empty());
        assert!(manager.update(&frame(&[7])).is_empty());
        assert!(manager.update(&frame(&[])).is_empty());
        assert_eq!(manager.update(&frame(&[])), vec![7]);
    }

    #[test]
    fn persistence_change_applies_to_next_update() {
        let mut manager = PersistenceManager::new(2);
        assert!(manager.update(&frame(&[])).is_empty());
        assert!(manager.update(&frame(&[42])).is_empty());
        manager.set_persistence(1);
        assert!(manager.update(&frame(&[])).is_empty());
        assert_eq!(manager.update(&frame(&[])), vec![42]);
    }

    #[test]
    fn forgotten_keys_come_out_sorted() {
        let mut manager = PersistenceManager::new(0);
        assert!(manager.update(&frame(&[9, 3, 27])).is_empty());
        assert_eq!(manager.update(&frame(&[])), vec![3, 9, 27]);
    }

    #[test]
    fn cache_reports_last_value_through_the_gap() {
        let corners = quad([(1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0)]);
        let mut cache: Cache<TagId, Quad> = Cache::new(1);

        let mut current = BTreeMap::new();
        current.insert(42, corners);
        assert_eq!(cache.update(&current).len(), 1);

        // Absent one frame: last value still reported.
        let merged = cache.update(&BTreeMap::new());
        assert_eq!(merged.get(&42), Some(&corners));

        // Second consecutive absence exceeds the window.
        assert!(cache.update(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn cache_overwrites_on_resighting() {
        let first = quad([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let second = quad([(9.0, 9.0), (10.0, 9.0), (10.0, 10.0), (9.0, 10.0)]);
        let mut cache: Cache<TagId, Quad> = Cache::new(5);

        let mut current = BTreeMap::new();
        current.insert(1, first);
        cache.update(&current);
        current.insert(1, second);
        let merged = cache.update(&current);
        assert_eq!(merged.get(&1), Some(&second));
    }

    #[test]
    fn blend_filter_zero_gain_passes_observations_through() {
        let mut filter: BlendFilter<TagId, f64> = BlendFilter::new(0, 0.0);
        let mut current = BTreeMap::new();
        current.insert(0, 1.0);
        assert_relative_eq!(filter.update(&current)[&0], 1.0);
        current.insert(0, 10.0);
        assert_relative_eq!(filter.update(&current)[&0], 10.0);
    }

    #[test]
    fn blend_filter_mixes_old_and_new_with_gain() {
        // First sample stored raw, second blended: 0.1*S1 + 0.9*S2.
        let mut filter: BlendFilter<TagId, f64> = BlendFilter::new(0, 0.1);
        let mut current = BTreeMap::new();
        current.insert(0, 4.0);
        filter.update(&current);
        current.insert(0, 14.0);
        assert_relative_eq!(filter.update(&current)[&0], 0.1 * 4.0 + 0.9 * 14.0);
    }

    #[test]
    fn blend_filter_smooths_quads_per_corner() {
        let first = quad([(1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0)]);
        let second = quad([(10.0, 11.0), (12.0, 13.0), (14.0, 15.0), (16.0, 17.0)]);
        let mut filter: BlendFilter<TagId, Quad> = BlendFilter::new(0, 0.1);

        let mut current = BTreeMap::new();
        current.insert(0, first);
        filter.update(&current);
        current.insert(0, second);
        let smoothed = filter.update(&current)[&0];
        for ((s, f), o) in smoothed.iter().zip(first.iter()).zip(second.iter()) {
            assert_relative_eq!(s.x, 0.1 * f.x + 0.9 * o.x, epsilon = 1e-6);
            assert_relative_eq!(s.y, 0.1 * f.y + 0.9 * o.y, epsilon = 1e-6);
        }
    }
}
