//! Stockpile - city-level resource storage

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::map::terrain::ResourceKind;

/// Resources held by a city
///
/// Ordered by kind so serialized state is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stockpile {
    resources: BTreeMap<ResourceKind, u32>,
}

impl Stockpile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current amount of a resource
    pub fn get(&self, resource: ResourceKind) -> u32 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }

    pub fn add(&mut self, resource: ResourceKind, amount: u32) {
        *self.resources.entry(resource).or_insert(0) += amount;
    }

    /// Try to remove resources, returns amount actually removed
    pub fn remove(&mut self, resource: ResourceKind, amount: u32) -> u32 {
        match self.resources.get_mut(&resource) {
            Some(current) => {
                let removed = amount.min(*current);
                *current -= removed;
                removed
            }
            None => 0,
        }
    }

    pub fn has(&self, resource: ResourceKind, amount: u32) -> bool {
        self.get(resource) >= amount
    }

    /// Remove `amount` only if all of it is available
    pub fn spend(&mut self, resource: ResourceKind, amount: u32) -> bool {
        if !self.has(resource, amount) {
            return false;
        }
        self.remove(resource, amount);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        self.resources.iter().map(|(k, v)| (*k, *v))
    }
}

impl<const N: usize> From<[(ResourceKind, u32); N]> for Stockpile {
    fn from(entries: [(ResourceKind, u32); N]) -> Self {
        let mut stockpile = Self::new();
        for (kind, amount) in entries {
            stockpile.add(kind, amount);
        }
        stockpile
    }
}
