//! Reward catalog and redemption costs.

use serde::{Deserialize, Serialize};

/// A redeemable reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Stable identifier used on the command line (e.g. "toy").
    pub key: String,
    /// Display name.
    pub name: String,
    /// Points deducted on redemption.
    pub cost: i64,
}

impl Reward {
    pub fn new(key: &str, name: &str, cost: i64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            cost,
        }
    }

    pub fn toy() -> Self {
        Self::new("toy", "Toy", 5)
    }

    pub fn hockey_game() -> Self {
        Self::new("hockey_game", "Hockey Game", 10)
    }
}

/// Ordered set of rewards, looked up by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardCatalog {
    rewards: Vec<Reward>,
}

impl RewardCatalog {
    /// Built-in rewards followed by `extra`. An extra entry whose key matches
    /// a built-in one replaces it in place. Entries costing less than one
    /// point are skipped: redemption must only ever subtract.
    pub fn with_extra(extra: &[Reward]) -> Self {
        let mut catalog = Self::default();
        for reward in extra {
            if reward.cost <= 0 {
                tracing::warn!(reward = %reward.key, cost = reward.cost, "ignoring free reward");
                continue;
            }
            match catalog.rewards.iter_mut().find(|r| r.key == reward.key) {
                Some(existing) => *existing = reward.clone(),
                None => catalog.rewards.push(reward.clone()),
            }
        }
        catalog
    }

    pub fn find(&self, key: &str) -> Option<&Reward> {
        self.rewards.iter().find(|r| r.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reward> {
        self.rewards.iter()
    }
}

impl Default for RewardCatalog {
    fn default() -> Self {
        Self {
            rewards: vec![Reward::toy(), Reward::hockey_game()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_costs() {
        let catalog = RewardCatalog::default();
        assert_eq!(catalog.find("toy").map(|r| r.cost), Some(5));
        assert_eq!(catalog.find("hockey_game").map(|r| r.cost), Some(10));
        assert!(catalog.find("pony").is_none());
    }

    #[test]
    fn extra_rewards_append_and_override() {
        let catalog = RewardCatalog::with_extra(&[
            Reward::new("movie_night", "Movie Night", 7),
            Reward::new("toy", "Small Toy", 4),
        ]);
        let keys: Vec<_> = catalog.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["toy", "hockey_game", "movie_night"]);
        assert_eq!(catalog.find("toy").map(|r| r.cost), Some(4));
    }

    #[test]
    fn non_positive_costs_are_skipped() {
        let catalog = RewardCatalog::with_extra(&[
            Reward::new("bonus", "Bonus", -50),
            Reward::new("toy", "Free Toy", 0),
        ]);
        assert!(catalog.find("bonus").is_none());
        assert_eq!(catalog.find("toy").map(|r| r.cost), Some(5));
    }
}
