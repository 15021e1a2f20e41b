extern crate std;

use std::vec::Vec;

use soroban_sdk::{testutils::Address as _, Address};

use crate::invariants::{assert_all_pool_invariants, assert_settlement_exclusive};
use crate::math::RATE_SCALE;
use crate::test::{
    default_params, setup, setup_active, Setup, END, HARD_CAP_OFFERING, REFUND_END, START,
};
use crate::{Error, PoolParams, PoolStatus};

fn buy_each(s: &Setup, count: usize, amount: i128) -> Vec<Address> {
    (0..count)
        .map(|_| {
            let buyer = s.buyer(amount);
            s.pool.buy_tokens(&buyer, &amount);
            buyer
        })
        .collect()
}

#[test]
fn test_soft_cap_met_exactly_completes_and_pays_each_once() {
    let s = setup_active();
    let buyers = buy_each(&s, 5, 10);
    assert_eq!(s.pool.get_pool().total_raised, 50);

    s.set_time(END + 1);
    assert_eq!(s.pool.finalize(&s.owner), PoolStatus::Completed);

    for buyer in buyers.iter() {
        assert_eq!(s.pool.claim_tokens(buyer), 20);
        assert_eq!(s.offering.balance(buyer), 20);
        assert_eq!(
            s.pool.try_claim_tokens(buyer),
            Err(Ok(Error::TokensAlreadyClaimed))
        );
        assert_eq!(
            s.pool.try_claim_refund(buyer),
            Err(Ok(Error::InvalidState))
        );
        assert_settlement_exclusive(&s.pool.get_contribution(buyer));
    }

    let pool = s.pool.get_pool();
    assert_eq!(pool.total_distributed, 100);
    assert_eq!(s.offering.balance(&s.pool.address), HARD_CAP_OFFERING - 100);
    assert_all_pool_invariants(&pool);
}

#[test]
fn test_soft_cap_missed_refunds_each_once() {
    let s = setup_active();
    let buyers = buy_each(&s, 2, 10);

    s.set_time(END + 1);
    assert_eq!(s.pool.finalize(&s.owner), PoolStatus::Refunding);

    for buyer in buyers.iter() {
        assert_eq!(s.pool.claim_refund(buyer), 10);
        assert_eq!(s.payment.balance(buyer), 10);
        assert_eq!(
            s.pool.try_claim_refund(buyer),
            Err(Ok(Error::RefundAlreadyClaimed))
        );
        assert_eq!(s.pool.try_claim_tokens(buyer), Err(Ok(Error::InvalidState)));
    }

    let pool = s.pool.get_pool();
    assert_eq!(pool.total_raised, 20);
    assert_eq!(pool.total_refunded, 20);
    assert_eq!(s.payment.balance(&s.pool.address), 0);
}

#[test]
fn test_claimed_tokens_forfeit_refund_after_override() {
    let s = setup_active();
    let buyers = buy_each(&s, 6, 10);
    let (claimer, other) = (&buyers[0], &buyers[1]);

    s.set_time(END + 1);
    s.pool.finalize(&s.owner);
    s.pool.claim_tokens(claimer);

    s.pool.enable_refund(&s.owner);
    assert_eq!(s.pool.get_status(), PoolStatus::Refunding);

    assert_eq!(
        s.pool.try_claim_refund(claimer),
        Err(Ok(Error::TokensAlreadyClaimed))
    );
    assert_eq!(s.pool.claim_refund(other), 10);
    assert_settlement_exclusive(&s.pool.get_contribution(claimer));
    assert_settlement_exclusive(&s.pool.get_contribution(other));
}

#[test]
fn test_enable_refund_during_sale() {
    let s = setup_active();
    let buyers = buy_each(&s, 3, 20);

    s.pool.enable_refund(&s.owner);
    assert_eq!(s.pool.get_status(), PoolStatus::Refunding);
    assert_eq!(s.pool.try_finalize(&s.owner), Err(Ok(Error::InvalidState)));

    let late = s.buyer(10);
    assert_eq!(s.pool.try_buy_tokens(&late, &10), Err(Ok(Error::InvalidState)));

    assert_eq!(s.pool.claim_refund(&buyers[2]), 20);
    assert_eq!(s.pool.try_enable_refund(&s.owner), Err(Ok(Error::InvalidState)));
}

#[test]
fn test_enable_refund_closed_after_refund_window() {
    let s = setup_active();
    buy_each(&s, 5, 10);
    s.set_time(END + 1);
    s.pool.finalize(&s.owner);

    s.set_time(REFUND_END + 1);
    assert_eq!(
        s.pool.try_enable_refund(&s.owner),
        Err(Ok(Error::RefundWindowExpired))
    );
}

#[test]
fn test_refund_window_expiry_and_unsold_sweep() {
    let s = setup_active();
    let buyers = buy_each(&s, 2, 10);

    s.set_time(END + 1);
    s.pool.finalize(&s.owner);
    assert_eq!(
        s.pool.try_withdraw_unsold_tokens(&s.owner),
        Err(Ok(Error::RefundWindowOpen))
    );

    s.set_time(REFUND_END + 1);
    for buyer in buyers.iter() {
        assert_eq!(
            s.pool.try_claim_refund(buyer),
            Err(Ok(Error::RefundWindowExpired))
        );
    }

    let owner_before = s.offering.balance(&s.owner);
    assert_eq!(s.pool.withdraw_unsold_tokens(&s.owner), HARD_CAP_OFFERING);
    assert_eq!(s.offering.balance(&s.owner), owner_before + HARD_CAP_OFFERING);
    assert_eq!(s.offering.balance(&s.pool.address), 0);

    // Refunds nobody claimed in time go to the owner.
    assert_eq!(s.pool.withdraw_raised_funds(&s.owner), 20);
    assert_eq!(s.payment.balance(&s.owner), 20);
    assert_eq!(s.payment.balance(&s.pool.address), 0);
}

#[test]
fn test_unclaimed_refunds_swept_to_owner() {
    let s = setup_active();
    let buyers = buy_each(&s, 2, 10);
    s.set_time(END + 1);
    assert_eq!(s.pool.finalize(&s.owner), PoolStatus::Refunding);

    assert_eq!(s.pool.claim_refund(&buyers[0]), 10);
    assert_eq!(
        s.pool.try_withdraw_raised_funds(&s.owner),
        Err(Ok(Error::RefundWindowOpen))
    );

    s.set_time(REFUND_END + 1);
    assert_eq!(
        s.pool.try_claim_refund(&buyers[1]),
        Err(Ok(Error::RefundWindowExpired))
    );
    assert_eq!(s.pool.withdraw_raised_funds(&s.owner), 10);
    assert_eq!(s.payment.balance(&s.owner), 10);
    assert_eq!(s.payment.balance(&buyers[0]), 10);
    assert_eq!(s.payment.balance(&s.pool.address), 0);

    assert_eq!(s.pool.withdraw_unsold_tokens(&s.owner), HARD_CAP_OFFERING);
    let pool = s.pool.get_pool();
    assert_eq!(pool.total_refunded, 10);
    assert_all_pool_invariants(&pool);
}

#[test]
fn test_raised_sweep_rejected_for_cancelled_pool() {
    let s = setup();
    s.pool.deposit_offering_tokens(&s.owner, &HARD_CAP_OFFERING);
    s.pool.cancel(&s.owner);
    assert_eq!(
        s.pool.try_withdraw_raised_funds(&s.owner),
        Err(Ok(Error::InvalidState))
    );
}

#[test]
fn test_refund_allowed_at_refund_end() {
    let s = setup_active();
    let buyers = buy_each(&s, 1, 10);
    s.set_time(END + 1);
    s.pool.finalize(&s.owner);

    s.set_time(REFUND_END);
    assert_eq!(s.pool.claim_refund(&buyers[0]), 10);
}

#[test]
fn test_withdraw_raised_funds_after_refund_window() {
    let s = setup_active();
    buy_each(&s, 5, 10);
    s.set_time(END + 1);
    s.pool.finalize(&s.owner);

    s.set_time(REFUND_END);
    assert_eq!(
        s.pool.try_withdraw_raised_funds(&s.owner),
        Err(Ok(Error::RefundWindowOpen))
    );

    s.set_time(REFUND_END + 1);
    let stranger = Address::generate(&s.env);
    assert_eq!(
        s.pool.try_withdraw_raised_funds(&stranger),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(s.pool.withdraw_raised_funds(&s.owner), 50);
    assert_eq!(s.payment.balance(&s.owner), 50);
    assert_eq!(s.payment.balance(&s.pool.address), 0);

    // A second sweep finds nothing left.
    assert_eq!(s.pool.withdraw_raised_funds(&s.owner), 0);
}

#[test]
fn test_unsold_sweep_after_completed_sale() {
    let s = setup_active();
    let buyers = buy_each(&s, 3, 20);
    s.set_time(END + 1);
    s.pool.finalize(&s.owner);
    for buyer in buyers.iter() {
        s.pool.claim_tokens(buyer);
    }

    s.set_time(REFUND_END + 1);
    assert_eq!(s.pool.withdraw_unsold_tokens(&s.owner), HARD_CAP_OFFERING - 120);
}

#[test]
fn test_unsold_sweep_of_cancelled_pool() {
    let s = setup();
    s.pool.deposit_offering_tokens(&s.owner, &HARD_CAP_OFFERING);
    s.pool.cancel(&s.owner);

    assert_eq!(s.pool.withdraw_unsold_tokens(&s.owner), HARD_CAP_OFFERING);
    assert_eq!(s.offering.balance(&s.owner), 1_000);
}

#[test]
fn test_unsold_sweep_rejected_while_live() {
    let s = setup_active();
    s.set_time(REFUND_END + 1);
    assert_eq!(
        s.pool.try_withdraw_unsold_tokens(&s.owner),
        Err(Ok(Error::InvalidState))
    );
}

#[test]
fn test_claim_without_contribution_fails() {
    let s = setup_active();
    buy_each(&s, 5, 10);
    s.set_time(END + 1);
    s.pool.finalize(&s.owner);

    let outsider = s.buyer(0);
    assert_eq!(
        s.pool.try_claim_tokens(&outsider),
        Err(Ok(Error::NoContribution))
    );
}

#[test]
fn test_refund_without_contribution_fails() {
    let s = setup_active();
    buy_each(&s, 1, 10);
    s.set_time(END + 1);
    s.pool.finalize(&s.owner);

    let outsider = s.buyer(0);
    assert_eq!(
        s.pool.try_claim_refund(&outsider),
        Err(Ok(Error::NoContribution))
    );
}

#[test]
fn test_claim_matches_entitlement_at_fractional_rate() {
    let s = setup();
    // 1.5 offering per payment unit; hard cap entitlement 150.
    s.pool.update_parameters(
        &s.owner,
        &PoolParams {
            rate: RATE_SCALE + RATE_SCALE / 2,
            ..default_params()
        },
    );
    s.pool.deposit_offering_tokens(&s.owner, &150);
    s.pool.activate(&s.owner, &START, &END, &REFUND_END);
    s.set_time(START);

    let buyer = s.buyer(100);
    s.pool.buy_tokens(&buyer, &5);
    s.pool.buy_tokens(&buyer, &6);
    let filler = buy_each(&s, 1, 40);

    // 11 * 1.5 = 16.5, truncated once on the cumulative amount.
    assert_eq!(s.pool.get_entitlement(&buyer), 16);

    s.set_time(END + 1);
    s.pool.finalize(&s.owner);
    assert_eq!(s.pool.claim_tokens(&buyer), 16);
    assert_eq!(s.pool.claim_tokens(&filler[0]), 60);
    assert_eq!(s.pool.get_entitlement(&buyer), 16);
}
