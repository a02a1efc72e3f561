//! Grid engine: visibility, unlock and completion transitions.
//!
//! Every transition takes the current state by reference and returns a new
//! one. Callers adopt the result only on `Ok`, so a refused action leaves the
//! caller's state untouched.
use std::collections::HashSet;

use crate::error::{CompleteBlock, GameError, UnlockBlock};
use crate::position::Position;
use crate::state::{ProgressionState, TileState};
use crate::task::{RewardKind, Task};

fn push_unique(out: &mut Vec<Position>, seen: &mut HashSet<Position>, position: Position) {
    if seen.insert(position) {
        out.push(position);
    }
}

/// Positions shown to the player: unlocked tiles then their orthogonal
/// neighbours, in first-seen order. A fresh run shows only the origin.
#[must_use]
pub fn compute_visible_positions(state: &ProgressionState) -> Vec<Position> {
    if state.unlocked_tiles.is_empty() {
        return vec![Position::ORIGIN];
    }
    let mut seen = HashSet::with_capacity(state.unlocked_tiles.len() * 5);
    let mut out = Vec::with_capacity(state.unlocked_tiles.len() * 5);
    for position in state.unlocked_tiles.iter() {
        push_unique(&mut out, &mut seen, position);
    }
    for position in state.unlocked_tiles.iter() {
        for neighbor in position.neighbors() {
            push_unique(&mut out, &mut seen, neighbor);
        }
    }
    out
}

/// Visible positions plus one extra ring, so tasks exist before the player
/// can reach them.
#[must_use]
pub fn generation_frontier(state: &ProgressionState) -> Vec<Position> {
    let visible = compute_visible_positions(state);
    let mut seen: HashSet<Position> = visible.iter().copied().collect();
    let mut out = visible.clone();
    for position in &visible {
        for neighbor in position.neighbors() {
            push_unique(&mut out, &mut seen, neighbor);
        }
    }
    out
}

#[must_use]
pub fn tile_state(position: Position, state: &ProgressionState) -> TileState {
    if state.completed_tiles.contains(position) {
        TileState::Completed
    } else if state.unlocked_tiles.contains(position) {
        TileState::Unlocked
    } else {
        TileState::Locked
    }
}

fn unlock_block(position: Position, state: &ProgressionState) -> Option<UnlockBlock> {
    if state.unlocked_tiles.contains(position) {
        Some(UnlockBlock::AlreadyUnlocked)
    } else if state.keys < 1 {
        Some(UnlockBlock::NoKeys)
    } else {
        None
    }
}

/// Whether `position` may be unlocked. Adjacency is not required.
#[must_use]
pub fn can_unlock(position: Position, state: &ProgressionState) -> bool {
    unlock_block(position, state).is_none()
}

/// Spend one key to unlock the tile at `position_key`.
///
/// # Errors
///
/// Returns `InvalidPosition` for a malformed key and `CannotUnlock` when the
/// tile is already unlocked or no key is available.
pub fn unlock(position_key: &str, state: &ProgressionState) -> Result<ProgressionState, GameError> {
    let position: Position = position_key.parse()?;
    unlock_position(position, state)
}

/// Typed variant of [`unlock`].
///
/// # Errors
///
/// Returns `CannotUnlock` when the tile is already unlocked or no key is
/// available.
pub fn unlock_position(
    position: Position,
    state: &ProgressionState,
) -> Result<ProgressionState, GameError> {
    if let Some(reason) = unlock_block(position, state) {
        return Err(GameError::CannotUnlock { position, reason });
    }
    let mut next = state.clone();
    next.keys -= 1;
    next.unlocked_tiles.insert(position);
    next.visible_tiles.extend(position.neighbors());
    Ok(next)
}

/// Credit `task`'s key and gold rewards and mark the tile completed.
///
/// # Errors
///
/// Returns `InvalidPosition` for a malformed key and `CannotComplete` when the
/// tile is locked or already completed.
pub fn complete(
    position_key: &str,
    task: &Task,
    state: &ProgressionState,
) -> Result<ProgressionState, GameError> {
    let position: Position = position_key.parse()?;
    complete_position(position, task, state)
}

/// Typed variant of [`complete`].
///
/// # Errors
///
/// Returns `CannotComplete` when the tile is locked or already completed.
pub fn complete_position(
    position: Position,
    task: &Task,
    state: &ProgressionState,
) -> Result<ProgressionState, GameError> {
    let reason = match tile_state(position, state) {
        TileState::Unlocked => None,
        TileState::Locked => Some(CompleteBlock::Locked),
        TileState::Completed => Some(CompleteBlock::AlreadyCompleted),
    };
    if let Some(reason) = reason {
        return Err(GameError::CannotComplete { position, reason });
    }
    let mut next = credit(state, task);
    next.completed_tiles.insert(position);
    Ok(next)
}

/// Copy of `state` with the task's key and gold rewards added.
pub(crate) fn credit(state: &ProgressionState, task: &Task) -> ProgressionState {
    let keys = u32::try_from(task.reward_total(RewardKind::Keys)).unwrap_or(u32::MAX);
    let mut next = state.clone();
    next.keys = next.keys.saturating_add(keys);
    next.gold = next.gold.saturating_add(task.reward_total(RewardKind::Gold));
    next
}
