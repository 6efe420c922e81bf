//! Repository contract for reward containers.

use game_core::RewardContainer;

use super::Result;

/// Per-player store of reward containers waiting to be collected.
///
/// Containers of one player keep their insertion order.
pub trait RewardRepository: Send + Sync {
    /// Appends a container to the player's reward chest.
    fn store(&self, player_guid: u32, container: &RewardContainer) -> Result<()>;

    /// Returns the player's containers without removing them.
    fn load(&self, player_guid: u32) -> Result<Vec<RewardContainer>>;

    /// Removes and returns the player's containers.
    fn take(&self, player_guid: u32) -> Result<Vec<RewardContainer>>;

    /// Guids of every player with at least one stored container.
    fn players(&self) -> Result<Vec<u32>> {
        Ok(vec![])
    }
}
