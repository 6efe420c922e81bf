use std::sync::Arc;

use crate::species::Species;

/// Catalog of species definitions.
pub trait SpeciesOracle: Send + Sync {
    /// Looks up a species by name, case-insensitively.
    fn species(&self, name: &str) -> Option<Arc<Species>>;
}
