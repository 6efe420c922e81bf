use std::collections::HashMap;
use std::sync::Arc;

use game_core::{Species, SpeciesOracle};

/// Species definitions keyed by lower-cased name.
#[derive(Debug, Default)]
pub struct SpeciesCatalog {
    species: HashMap<String, Arc<Species>>,
}

impl SpeciesCatalog {
    pub fn new(species: impl IntoIterator<Item = Species>) -> Self {
        Self {
            species: species
                .into_iter()
                .map(|species| (species.key(), Arc::new(species)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Sorted species names, for diagnostics.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.species.values().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl SpeciesOracle for SpeciesCatalog {
    fn species(&self, name: &str) -> Option<Arc<Species>> {
        self.species.get(&name.to_lowercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let catalog = SpeciesCatalog::new([Species::new("Dragon Lord"), Species::new("rat")]);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.species("dragon lord").is_some());
        assert!(catalog.species("RAT").is_some());
        assert!(catalog.species("ghoul").is_none());
        assert_eq!(catalog.names(), vec!["Dragon Lord", "rat"]);
    }
}
