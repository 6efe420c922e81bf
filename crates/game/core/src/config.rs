/// World-wide tunables consumed by the monster AI.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Allowed floor distance from the spawn anchor. 0 disables the check.
    pub despawn_range: i32,
    /// Half-width of the square zone around the spawn anchor. 0 disables
    /// despawning entirely.
    pub despawn_radius: i32,
    /// Remove monsters that leave their spawn zone instead of teleporting them
    /// back.
    pub remove_on_despawn: bool,
    /// Radius within which a monster without targets stays put. 0 disables the
    /// return walk.
    pub walk_to_spawn_radius: i32,
    pub reward_base_rate: f64,
    pub reward_rate_damage_done: f64,
    pub reward_rate_damage_taken: f64,
    pub reward_rate_healing_done: f64,
}

impl GameConfig {
    // ===== fixed engine constants =====
    /// Half-extent of the viewport a monster perceives.
    pub const VIEWPORT_X: i32 = 9;
    pub const VIEWPORT_Y: i32 = 9;
    /// Distance a fleeing monster tries to keep from its target.
    pub const MAX_VIEWPORT_X: i32 = 11;
    /// Search radius of follow path queries.
    pub const FOLLOW_SEARCH_DIST: i32 = 12;
    /// Throw window for pushed items.
    pub const THROW_RANGE_X: i32 = 8;
    pub const THROW_RANGE_Y: i32 = 6;
    /// Minimum time between two random wander steps.
    pub const RANDOM_STEP_INTERVAL_MS: u64 = 1000;
    /// Follow paths are recomputed at most this often unless forced.
    pub const FOLLOW_PATH_INTERVAL_MS: u64 = 2000;
    /// Cooldown and focus applied by a successful challenge.
    pub const CHALLENGE_FOCUS_MS: i64 = 8000;
    /// Items a monster may throw aside in one push before destroying the rest.
    pub const MAX_PUSHED_ITEMS: usize = 20;
    /// Upper bound of chances expressed out of 100 000 (loot).
    pub const MAX_LOOT_CHANCE: u32 = 100_000;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_DESPAWN_RANGE: i32 = 2;
    pub const DEFAULT_DESPAWN_RADIUS: i32 = 50;
    pub const DEFAULT_WALK_TO_SPAWN_RADIUS: i32 = 15;

    pub fn new() -> Self {
        Self {
            despawn_range: Self::DEFAULT_DESPAWN_RANGE,
            despawn_radius: Self::DEFAULT_DESPAWN_RADIUS,
            remove_on_despawn: true,
            walk_to_spawn_radius: Self::DEFAULT_WALK_TO_SPAWN_RADIUS,
            reward_base_rate: 1.0,
            reward_rate_damage_done: 1.0,
            reward_rate_damage_taken: 1.0,
            reward_rate_healing_done: 1.0,
        }
    }

    pub fn with_reward_base_rate(mut self, rate: f64) -> Self {
        self.reward_base_rate = rate;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
