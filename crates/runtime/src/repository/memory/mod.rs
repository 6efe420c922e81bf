//! In-memory reward repository used by tests and ephemeral worlds.

use std::collections::BTreeMap;
use std::sync::RwLock;

use game_core::RewardContainer;

use crate::repository::{RepositoryError, Result, RewardRepository};

#[derive(Debug, Default)]
pub struct InMemoryRewardRepository {
    chests: RwLock<BTreeMap<u32, Vec<RewardContainer>>>,
}

impl InMemoryRewardRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RewardRepository for InMemoryRewardRepository {
    fn store(&self, player_guid: u32, container: &RewardContainer) -> Result<()> {
        let mut chests = self
            .chests
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        chests
            .entry(player_guid)
            .or_default()
            .push(container.clone());
        Ok(())
    }

    fn load(&self, player_guid: u32) -> Result<Vec<RewardContainer>> {
        let chests = self
            .chests
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(chests.get(&player_guid).cloned().unwrap_or_default())
    }

    fn take(&self, player_guid: u32) -> Result<Vec<RewardContainer>> {
        let mut chests = self
            .chests
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(chests.remove(&player_guid).unwrap_or_default())
    }

    fn players(&self) -> Result<Vec<u32>> {
        let chests = self
            .chests
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(chests.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{EntityId, RewardItem, Tick};

    fn container(boss: &str, item_type: u16) -> RewardContainer {
        let mut container = RewardContainer::new(EntityId(1 << 30), boss, Tick(5000));
        container.items.push(RewardItem {
            item_type,
            count: 1,
        });
        container
    }

    #[test]
    fn take_empties_the_chest() {
        let repo = InMemoryRewardRepository::new();
        repo.store(7, &container("warlord", 100)).unwrap();
        repo.store(7, &container("warlord", 101)).unwrap();

        assert_eq!(repo.load(7).unwrap().len(), 2);
        let taken = repo.take(7).unwrap();
        assert_eq!(taken[0].items[0].item_type, 100);
        assert_eq!(taken[1].items[0].item_type, 101);
        assert!(repo.load(7).unwrap().is_empty());
        assert!(repo.players().unwrap().is_empty());
    }
}
