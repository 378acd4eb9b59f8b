//! Pure lifecycle classification of a discovered stage.
//!
//! The classifier reflects live on-chain readability only. The separate
//! `Closed` status is assigned by reconciliation when a previously stored
//! stage stops being returned by extraction, which is a different condition
//! from anything observable in a single extraction run.

use alloy::primitives::U256;

use crate::types::{MintDescriptor, MintStatus, StatusReason};

/// Time/supply bounds of the sale as extracted on-chain.
#[derive(Clone, Copy, Debug, Default)]
pub struct SaleBounds {
    /// Inclusive unix seconds; `None` is unbounded.
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub max_supply: Option<U256>,
}

/// Live counters read alongside the sale config.
#[derive(Clone, Copy, Debug, Default)]
pub struct SaleCounters {
    /// Explicit on-chain "sale disabled" flag; overrides everything.
    pub disabled: bool,
    pub minted: Option<U256>,
    /// Tokens still mintable, for protocols that expose the remainder
    /// instead of a minted counter.
    pub remaining: Option<U256>,
}

/// Priority chain: disabled flag, elapsed end time, future start time,
/// exhausted supply, else open.
pub fn classify(
    bounds: &SaleBounds,
    counters: &SaleCounters,
    now: u64,
) -> (MintStatus, Option<StatusReason>) {
    if counters.disabled {
        return (MintStatus::Ended, Some(StatusReason::SaleDisabled));
    }
    if bounds.end_time.is_some_and(|end| now > end) {
        return (MintStatus::Ended, Some(StatusReason::TimeEnded));
    }
    if bounds.start_time.is_some_and(|start| start > now) {
        return (MintStatus::Pending, Some(StatusReason::NotStarted));
    }
    if let (Some(max), Some(minted)) = (bounds.max_supply, counters.minted)
        && minted >= max
    {
        return (MintStatus::Ended, Some(StatusReason::SupplyExhausted));
    }
    if counters.remaining.is_some_and(|r| r.is_zero()) {
        return (MintStatus::Ended, Some(StatusReason::SupplyExhausted));
    }
    (MintStatus::Open, None)
}

/// Classifies from the descriptor's own bounds and writes the result back.
pub fn apply(descriptor: &mut MintDescriptor, counters: &SaleCounters, now: u64) {
    let bounds = SaleBounds {
        start_time: descriptor.start_time,
        end_time: descriptor.end_time,
        max_supply: descriptor.max_supply,
    };
    let (status, reason) = classify(&bounds, counters, now);
    descriptor.status = status;
    descriptor.status_reason = reason;
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn bounds(start: Option<u64>, end: Option<u64>, max: Option<u64>) -> SaleBounds {
        SaleBounds {
            start_time: start,
            end_time: end,
            max_supply: max.map(U256::from),
        }
    }

    #[test]
    fn unbounded_sale_is_open() {
        let (status, reason) = classify(&bounds(None, None, None), &SaleCounters::default(), NOW);
        assert_eq!(status, MintStatus::Open);
        assert_eq!(reason, None);
    }

    #[test]
    fn disabled_flag_overrides_everything() {
        let counters = SaleCounters {
            disabled: true,
            ..SaleCounters::default()
        };
        // Even a sale that has not started yet reports ended when disabled
        let (status, reason) = classify(&bounds(Some(NOW + 100), None, None), &counters, NOW);
        assert_eq!(status, MintStatus::Ended);
        assert_eq!(reason, Some(StatusReason::SaleDisabled));
    }

    #[test]
    fn elapsed_end_time_ends_the_sale() {
        let (status, reason) = classify(
            &bounds(None, Some(NOW - 1), None),
            &SaleCounters::default(),
            NOW,
        );
        assert_eq!(status, MintStatus::Ended);
        assert_eq!(reason, Some(StatusReason::TimeEnded));
    }

    #[test]
    fn end_time_is_inclusive() {
        let (status, _) = classify(
            &bounds(None, Some(NOW), None),
            &SaleCounters::default(),
            NOW,
        );
        assert_eq!(status, MintStatus::Open);
    }

    #[test]
    fn future_start_time_is_pending() {
        let (status, reason) = classify(
            &bounds(Some(NOW + 1), None, None),
            &SaleCounters::default(),
            NOW,
        );
        assert_eq!(status, MintStatus::Pending);
        assert_eq!(reason, Some(StatusReason::NotStarted));
    }

    #[test]
    fn exhausted_supply_ends_the_sale() {
        let counters = SaleCounters {
            minted: Some(U256::from(100)),
            ..SaleCounters::default()
        };
        let (status, reason) = classify(&bounds(None, None, Some(100)), &counters, NOW);
        assert_eq!(status, MintStatus::Ended);
        assert_eq!(reason, Some(StatusReason::SupplyExhausted));
    }

    #[test]
    fn remaining_supply_stays_open() {
        let counters = SaleCounters {
            minted: Some(U256::from(99)),
            ..SaleCounters::default()
        };
        let (status, _) = classify(&bounds(None, None, Some(100)), &counters, NOW);
        assert_eq!(status, MintStatus::Open);
    }

    #[test]
    fn zero_remaining_ends_the_sale() {
        let counters = SaleCounters {
            remaining: Some(U256::ZERO),
            ..SaleCounters::default()
        };
        let (status, reason) = classify(&bounds(None, None, None), &counters, NOW);
        assert_eq!(status, MintStatus::Ended);
        assert_eq!(reason, Some(StatusReason::SupplyExhausted));
    }

    #[test]
    fn elapsed_end_wins_over_supply() {
        let counters = SaleCounters {
            minted: Some(U256::from(100)),
            ..SaleCounters::default()
        };
        let (_, reason) = classify(&bounds(None, Some(NOW - 1), Some(100)), &counters, NOW);
        assert_eq!(reason, Some(StatusReason::TimeEnded));
    }
}
