//! Axis histograms for mode-based centroids
//!
//! The scanners locate objects by the most frequent row or column among
//! matching pixels rather than by the mean, which keeps thin color bleed at
//! silhouette edges from pulling the result.

use std::collections::BTreeMap;

/// Count of matching pixels per axis value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyMap {
    counts: BTreeMap<u32, u32>,
}

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one matching pixel at `key`
    pub fn add(&mut self, key: u32) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Count recorded at `key`
    pub fn count(&self, key: u32) -> u32 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Most frequent key and its count
    ///
    /// When several keys share the top count, the upper median of those keys
    /// (in ascending order) wins, so a symmetric object resolves to its middle.
    /// An empty map has no mode.
    pub fn mode(&self) -> Option<(u32, u32)> {
        let max = *self.counts.values().max()?;
        let tied: Vec<u32> = self
            .counts
            .iter()
            .filter(|(_, &count)| count == max)
            .map(|(&key, _)| key)
            .collect();
        Some((tied[tied.len() / 2], max))
    }
}

impl FromIterator<u32> for FrequencyMap {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut map = Self::new();
        for key in iter {
            map.add(key);
        }
        map
    }
}
