//! Fixed limits and storage keys shared across the engine.
//!
//! Balance numbers live in [`crate::rewards::RewardPolicy`]; the values here
//! are structural and changing them alters persisted data or loop bounds.

// Storage keys -------------------------------------------------------------
pub const STORAGE_GAME_STATE: &str = "runeTile_gameState";
pub const STORAGE_SLAYER_MASTERS: &str = "runeTile_slayerMasters";
pub const STORAGE_DAILY_TASKS: &str = "runeTile_dailyTasks";
pub const STORAGE_LAST_SEEN_VERSION: &str = "runeTile_lastSeenVersion";
pub const STORAGE_PLAYER_STATS: &str = "runeTile_playerStats";

/// Version recorded by the last-seen marker.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// Stats --------------------------------------------------------------------
pub const MAX_SKILL_LEVEL: u32 = 99;
pub const STAT_REFRESH_INTERVAL_MS: i64 = 15 * 60 * 1_000;

// Generation bounds --------------------------------------------------------
pub(crate) const MAX_SKILL_ATTEMPTS: usize = 50;
pub(crate) const MAX_DUPLICATE_ATTEMPTS: usize = 10;
/// Retry number from which the offending category is excluded.
pub(crate) const EXCLUDE_CATEGORY_AFTER: usize = 5;

