//! File-based RewardRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use game_core::RewardContainer;

use crate::repository::{Result, RewardRepository};

/// Stores each player's reward chest as `rewards_{guid}.json`.
///
/// Writes go to a temporary sibling file first and are renamed into place,
/// so a crash never leaves a half-written chest behind.
pub struct FileRewardRepository {
    base_dir: PathBuf,
}

impl FileRewardRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Platform data directory for rewards, e.g. `~/.local/share/monster-ai/rewards`.
    pub fn default_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "monster-ai")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./save_data"))
            .join("rewards")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn chest_path(&self, player_guid: u32) -> PathBuf {
        self.base_dir.join(format!("rewards_{}.json", player_guid))
    }

    fn write_chest(&self, player_guid: u32, chest: &[RewardContainer]) -> Result<()> {
        let path = self.chest_path(player_guid);
        if chest.is_empty() {
            if path.exists() {
                fs::remove_file(&path)?;
            }
            return Ok(());
        }

        let temp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(chest)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(
            target: "runtime::repository",
            "Saved {} reward container(s) for player {} to {}",
            chest.len(),
            player_guid,
            path.display()
        );
        Ok(())
    }
}

impl RewardRepository for FileRewardRepository {
    fn store(&self, player_guid: u32, container: &RewardContainer) -> Result<()> {
        let mut chest = self.load(player_guid)?;
        chest.push(container.clone());
        self.write_chest(player_guid, &chest)
    }

    fn load(&self, player_guid: u32) -> Result<Vec<RewardContainer>> {
        let path = self.chest_path(player_guid);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn take(&self, player_guid: u32) -> Result<Vec<RewardContainer>> {
        let chest = self.load(player_guid)?;
        self.write_chest(player_guid, &[])?;
        Ok(chest)
    }

    fn players(&self) -> Result<Vec<u32>> {
        let mut guids = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(guid_str) = filename
                    .strip_prefix("rewards_")
                    .and_then(|s| s.strip_suffix(".json"))
                && let Ok(guid) = guid_str.parse::<u32>()
            {
                guids.push(guid);
            }
        }

        guids.sort_unstable();
        Ok(guids)
    }
}
