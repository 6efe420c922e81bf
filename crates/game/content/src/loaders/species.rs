//! Species catalog loader.

use std::collections::BTreeSet;
use std::path::Path;

use game_core::Species;

use crate::loaders::{LoadResult, read_file};

/// Loader for species catalogs from RON files.
///
/// RON format: `Vec<Species>`; omitted fields take the species defaults.
pub struct SpeciesLoader;

impl SpeciesLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<Species>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load species catalog {}: {}", path.display(), e))
    }

    /// Parses a catalog and rejects duplicate names (case-insensitive) and
    /// summons of unknown species.
    pub fn parse(content: &str) -> LoadResult<Vec<Species>> {
        let species: Vec<Species> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse species RON: {}", e))?;

        let mut names = BTreeSet::new();
        for entry in &species {
            if entry.name.is_empty() {
                anyhow::bail!("species without a name");
            }
            if !names.insert(entry.key()) {
                anyhow::bail!("duplicate species '{}'", entry.name);
            }
        }
        for entry in &species {
            for summon in &entry.summons {
                if !names.contains(&summon.name.to_lowercase()) {
                    anyhow::bail!(
                        "species '{}' summons unknown species '{}'",
                        entry.name,
                        summon.name
                    );
                }
            }
        }

        Ok(species)
    }
}
