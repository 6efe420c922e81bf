use crate::state::{Direction, Position};

/// Tuning knobs of a path search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FindPathParams {
    /// Search the whole area instead of stopping at the first tile in range.
    pub full_path_search: bool,
    /// Destination must have clear line of sight to the target.
    pub clear_sight: bool,
    pub allow_diagonal: bool,
    /// Prefer tiles exactly at `max_target_dist` from the target.
    pub keep_distance: bool,
    /// Search radius; negative means unbounded.
    pub max_search_dist: i32,
    pub min_target_dist: i32,
    pub max_target_dist: i32,
}

impl Default for FindPathParams {
    fn default() -> Self {
        Self {
            full_path_search: true,
            clear_sight: true,
            allow_diagonal: true,
            keep_distance: false,
            max_search_dist: 0,
            min_target_dist: -1,
            max_target_dist: -1,
        }
    }
}

/// Path queries against the static map.
pub trait PathOracle: Send + Sync {
    /// Directions leading from `from` to a tile whose distance to `to` fits
    /// `params`. `walkable` vets each visited tile against dynamic state
    /// (creatures, spawn range).
    fn find_path(
        &self,
        from: Position,
        to: Position,
        params: &FindPathParams,
        walkable: &dyn Fn(Position) -> bool,
    ) -> Option<Vec<Direction>>;
}
