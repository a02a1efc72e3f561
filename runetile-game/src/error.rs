use std::fmt;
use thiserror::Error;

use crate::daily::DailyDifficulty;
use crate::position::{Position, PositionError};
use crate::providers::ProviderError;
use crate::shop::ShopError;

/// Why an unlock was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockBlock {
    AlreadyUnlocked,
    NoKeys,
}

impl fmt::Display for UnlockBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadyUnlocked => "tile is already unlocked",
            Self::NoKeys => "no keys available",
        })
    }
}

/// Why a completion was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteBlock {
    Locked,
    AlreadyCompleted,
    MissingTask,
}

impl fmt::Display for CompleteBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Locked => "tile is still locked",
            Self::AlreadyCompleted => "tile is already completed",
            Self::MissingTask => "tile has no task",
        })
    }
}

/// Failures surfaced by engine actions. State is never modified when one is
/// returned.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    InvalidPosition(#[from] PositionError),
    #[error("cannot unlock {position}: {reason}")]
    CannotUnlock {
        position: Position,
        reason: UnlockBlock,
    },
    #[error("cannot complete {position}: {reason}")]
    CannotComplete {
        position: Position,
        reason: CompleteBlock,
    },
    #[error("unknown slayer master `{0}`")]
    UnknownSlayerMaster(String),
    #[error("{0} daily challenge already completed today")]
    DailyAlreadyCompleted(DailyDifficulty),
    #[error(transparent)]
    Shop(#[from] ShopError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
