//! Key shop: converts gold into keys.
use thiserror::Error;

use crate::state::ProgressionState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error("purchase quantity must be at least one")]
    ZeroQuantity,
    #[error("not enough gold: need {required}, have {available}")]
    InsufficientGold { required: u64, available: u64 },
    #[error("purchase total overflows")]
    PriceOverflow,
}

/// Total gold cost of `key_amount` keys.
///
/// # Errors
///
/// Returns `ZeroQuantity` for an empty order and `PriceOverflow` when the
/// total does not fit in a `u64`.
pub fn quote(key_amount: u32, unit_price: u64) -> Result<u64, ShopError> {
    if key_amount == 0 {
        return Err(ShopError::ZeroQuantity);
    }
    unit_price
        .checked_mul(u64::from(key_amount))
        .ok_or(ShopError::PriceOverflow)
}

/// Buy `key_amount` keys at `unit_price` gold each.
///
/// # Errors
///
/// Returns `InsufficientGold` when the player cannot cover the total, plus
/// the errors of [`quote`]. The input state is never modified.
pub fn purchase(
    state: &ProgressionState,
    key_amount: u32,
    unit_price: u64,
) -> Result<ProgressionState, ShopError> {
    let required = quote(key_amount, unit_price)?;
    if state.gold < required {
        return Err(ShopError::InsufficientGold {
            required,
            available: state.gold,
        });
    }
    let keys = state
        .keys
        .checked_add(key_amount)
        .ok_or(ShopError::PriceOverflow)?;
    let mut next = state.clone();
    next.gold -= required;
    next.keys = keys;
    Ok(next)
}

/// Largest number of keys `gold` can buy.
#[must_use]
pub fn max_affordable(gold: u64, unit_price: u64) -> u32 {
    if unit_price == 0 {
        return u32::MAX;
    }
    u32::try_from(gold / unit_price).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::RewardPolicy;
    use crate::state::PlayerStats;

    fn with_gold(gold: u64) -> ProgressionState {
        let mut state =
            ProgressionState::new("shopper", PlayerStats::default(), 0, &RewardPolicy::default());
        state.keys = 0;
        state.gold = gold;
        state
    }

    #[test]
    fn exact_funds_buy_keys() {
        let state = with_gold(100);
        let next = purchase(&state, 5, 20).unwrap();
        assert_eq!(next.gold, 0);
        assert_eq!(next.keys, 5);
    }

    #[test]
    fn short_funds_leave_state_untouched() {
        let state = with_gold(100);
        let err = purchase(&state, 6, 20).unwrap_err();
        assert_eq!(
            err,
            ShopError::InsufficientGold {
                required: 120,
                available: 100
            }
        );
        assert_eq!(state.gold, 100);
        assert_eq!(state.keys, 0);
    }

    #[test]
    fn zero_and_overflow_are_rejected() {
        let state = with_gold(u64::MAX);
        assert_eq!(purchase(&state, 0, 20), Err(ShopError::ZeroQuantity));
        assert_eq!(purchase(&state, 2, u64::MAX), Err(ShopError::PriceOverflow));
    }

    #[test]
    fn affordability_rounds_down() {
        assert_eq!(max_affordable(250, 100), 2);
        assert_eq!(max_affordable(99, 100), 0);
        assert_eq!(max_affordable(5, 0), u32::MAX);
    }
}
