//! RuneTile Game Engine
//!
//! Platform-agnostic core logic for RuneTile, a tile-unlock progression game
//! layered over a player's hiscores. This crate provides the grid, task
//! generation, economy and persistence without UI or transport dependencies.

pub mod catalog;
pub mod constants;
pub mod daily;
pub mod error;
pub mod generator;
pub mod grid;
pub mod numbers;
pub mod position;
pub mod providers;
pub mod random;
pub mod rewards;
pub mod session;
pub mod shop;
pub mod slayer;
pub mod state;
pub mod storage;
pub mod task;

// Re-export commonly used types
pub use catalog::{BOSSES, Boss, BossTier, ItemTier, SLAYER_MASTERS, Skill};
pub use daily::{
    DailyChallengeState, DailyDifficulty, DailyFlags, DailyOutcome, complete_daily,
    generate_all_daily_tasks, generate_daily_task, today_local,
};
pub use error::{CompleteBlock, GameError, UnlockBlock};
pub use generator::{GeneratorError, TaskGenerator, start_task};
pub use grid::{
    can_unlock, complete, complete_position, compute_visible_positions, generation_frontier,
    tile_state, unlock, unlock_position,
};
pub use position::{Position, PositionError, TileSet};
pub use providers::{
    ProviderError, QuestMilestones, QuestProvider, QuestRecord, QuestStatus, StatProvider,
    needs_refresh,
};
pub use random::{RandomSource, SeededRandom, ThreadRandom, seeded_fraction};
pub use rewards::{AmountRange, PolicyError, RewardPolicy};
pub use session::{GameEngine, GameSession};
pub use shop::{ShopError, max_affordable, purchase};
pub use slayer::{SlayerMaster, SlayerOutcome, SlayerRoster};
pub use state::{PlayerStats, ProgressionState, TileState};
pub use storage::{BlobStore, MemoryStore, Persistence, SavedPlayer, StorageError};
pub use task::{Difficulty, Requirement, Reward, RewardKind, Task, TaskCategory};
