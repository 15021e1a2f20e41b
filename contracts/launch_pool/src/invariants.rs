#![allow(dead_code)]

extern crate std;

use crate::math::entitlement;
use crate::types::{Contribution, Pool, PoolStatus};

/// INV-1: caps and limits are ordered and positive.
pub fn assert_params_ordered(pool: &Pool) {
    assert!(pool.rate > 0, "INV-1 violated: non-positive rate {}", pool.rate);
    assert!(
        pool.hard_cap >= pool.soft_cap && pool.soft_cap > 0,
        "INV-1 violated: caps out of order (soft {}, hard {})",
        pool.soft_cap,
        pool.hard_cap
    );
    assert!(
        pool.max_contribution >= pool.min_contribution && pool.min_contribution > 0,
        "INV-1 violated: limits out of order (min {}, max {})",
        pool.min_contribution,
        pool.max_contribution
    );
}

/// INV-2: the raise never exceeds the hard cap.
pub fn assert_raised_within_hard_cap(pool: &Pool) {
    assert!(
        pool.total_raised >= 0 && pool.total_raised <= pool.hard_cap,
        "INV-2 violated: total_raised {} outside [0, {}]",
        pool.total_raised,
        pool.hard_cap
    );
}

/// INV-3: a schedule, once set, is strictly ordered.
pub fn assert_schedule_ordered(pool: &Pool) {
    if pool.status == PoolStatus::Pending || pool.status == PoolStatus::Cancelled {
        return;
    }
    assert!(
        pool.start_time < pool.end_time && pool.end_time < pool.refund_end_time,
        "INV-3 violated: schedule {} / {} / {}",
        pool.start_time,
        pool.end_time,
        pool.refund_end_time
    );
}

/// INV-4: a contribution stays within the per-user maximum.
pub fn assert_contribution_within_limit(pool: &Pool, contribution: &Contribution) {
    assert!(
        contribution.amount >= 0 && contribution.amount <= pool.max_contribution,
        "INV-4 violated: contribution {} outside [0, {}]",
        contribution.amount,
        pool.max_contribution
    );
}

/// INV-5: tokens and refund are never both claimed.
pub fn assert_settlement_exclusive(contribution: &Contribution) {
    assert!(
        !(contribution.claimed_tokens && contribution.claimed_refund),
        "INV-5 violated: both tokens and refund claimed"
    );
}

/// INV-6: only lifecycle edges are ever taken.
pub fn assert_valid_status_transition(from: PoolStatus, to: PoolStatus) {
    assert!(
        from == to || from.can_transition_to(to),
        "INV-6 violated: invalid status transition from {:?} to {:?}",
        from,
        to
    );
}

/// INV-7: distributed offering never exceeds the entitlement of the raise.
pub fn assert_distribution_bounded(pool: &Pool) {
    let ceiling = entitlement(pool.total_raised, pool.rate).unwrap();
    assert!(
        pool.total_distributed <= ceiling,
        "INV-7 violated: distributed {} above entitlement of raise {}",
        pool.total_distributed,
        ceiling
    );
    assert!(
        pool.total_refunded <= pool.total_raised,
        "INV-7 violated: refunded {} above raised {}",
        pool.total_refunded,
        pool.total_raised
    );
}

/// Run all stateless pool invariants.
pub fn assert_all_pool_invariants(pool: &Pool) {
    assert_params_ordered(pool);
    assert_raised_within_hard_cap(pool);
    assert_schedule_ordered(pool);
    assert_distribution_bounded(pool);
}
