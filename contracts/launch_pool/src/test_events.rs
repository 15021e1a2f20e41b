extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    vec, Address, Env, IntoVal, Symbol, TryIntoVal, Val, Vec,
};

use crate::events::{
    OfferingDeposited, OwnershipTransferred, RefundClaimed, StatusChanged, Swept,
    TokensClaimed, TokensPurchased,
};
use crate::test::{setup, setup_active, END, HARD_CAP_OFFERING, REFUND_END};
use crate::PoolStatus;

/// Topics and data of the most recent event published by `contract`.
fn last_event_of(env: &Env, contract: &Address) -> (Vec<Val>, Val) {
    let mut found = None;
    for (source, event_topics, data) in env.events().all().iter() {
        if source == *contract {
            found = Some((event_topics, data));
        }
    }
    found.expect("No events found")
}

fn topics(env: &Env, name: Symbol, actor: &Address) -> Vec<Val> {
    vec![env, name.into_val(env), actor.into_val(env)]
}

#[test]
fn test_offering_deposited_event() {
    let s = setup();
    s.pool.deposit_offering_tokens(&s.owner, &HARD_CAP_OFFERING);

    let (event_topics, data) = last_event_of(&s.env, &s.pool.address);
    assert_eq!(event_topics, topics(&s.env, symbol_short!("deposit"), &s.owner));

    let event_data: OfferingDeposited = data.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        OfferingDeposited {
            amount: HARD_CAP_OFFERING,
            total_deposited: HARD_CAP_OFFERING,
            offering_deposited: true,
            status: PoolStatus::Pending,
        }
    );
}

#[test]
fn test_purchase_event_carries_cumulative_entitlement() {
    let s = setup_active();
    let buyer = s.buyer(100);
    s.pool.buy_tokens(&buyer, &10);
    s.pool.buy_tokens(&buyer, &15);

    let (event_topics, data) = last_event_of(&s.env, &s.pool.address);
    assert_eq!(event_topics, topics(&s.env, symbol_short!("purchase"), &buyer));

    let event_data: TokensPurchased = data.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        TokensPurchased {
            amount: 15,
            contribution: 25,
            entitlement: 50,
            total_raised: 25,
            status: PoolStatus::Active,
        }
    );
    assert_eq!(event_data.entitlement, s.pool.get_entitlement(&buyer));
}

#[test]
fn test_finalized_event() {
    let s = setup_active();
    let buyer = s.buyer(20);
    s.pool.buy_tokens(&buyer, &20);
    s.set_time(END + 1);
    s.pool.finalize(&s.owner);

    let (event_topics, data) = last_event_of(&s.env, &s.pool.address);
    assert_eq!(event_topics, topics(&s.env, symbol_short!("finalized"), &s.owner));

    let event_data: StatusChanged = data.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        StatusChanged {
            previous: PoolStatus::Active,
            total_raised: 20,
            status: PoolStatus::Refunding,
        }
    );
}

#[test]
fn test_claim_and_refund_events() {
    let s = setup_active();
    let a = s.buyer(30);
    let b = s.buyer(30);
    s.pool.buy_tokens(&a, &30);
    s.pool.buy_tokens(&b, &30);
    s.set_time(END + 1);
    s.pool.finalize(&s.owner);

    s.pool.claim_tokens(&a);
    let (event_topics, data) = last_event_of(&s.env, &s.pool.address);
    assert_eq!(event_topics, topics(&s.env, symbol_short!("claimed"), &a));
    let claimed: TokensClaimed = data.try_into_val(&s.env).unwrap();
    assert_eq!(
        claimed,
        TokensClaimed {
            amount: 60,
            total_distributed: 60,
            status: PoolStatus::Completed,
        }
    );

    s.pool.enable_refund(&s.owner);
    let (event_topics, data) = last_event_of(&s.env, &s.pool.address);
    assert_eq!(event_topics, topics(&s.env, symbol_short!("refund_on"), &s.owner));
    let changed: StatusChanged = data.try_into_val(&s.env).unwrap();
    assert_eq!(changed.previous, PoolStatus::Completed);
    assert_eq!(changed.status, PoolStatus::Refunding);

    s.pool.claim_refund(&b);
    let (event_topics, data) = last_event_of(&s.env, &s.pool.address);
    assert_eq!(event_topics, topics(&s.env, symbol_short!("refunded"), &b));
    let refunded: RefundClaimed = data.try_into_val(&s.env).unwrap();
    assert_eq!(
        refunded,
        RefundClaimed {
            amount: 30,
            total_refunded: 30,
            status: PoolStatus::Refunding,
        }
    );
}

#[test]
fn test_sweep_event() {
    let s = setup_active();
    s.set_time(END + 1);
    s.pool.finalize(&s.owner);
    s.set_time(REFUND_END + 1);
    s.pool.withdraw_unsold_tokens(&s.owner);

    let (event_topics, data) = last_event_of(&s.env, &s.pool.address);
    assert_eq!(event_topics, topics(&s.env, symbol_short!("wd_unsold"), &s.owner));
    let swept: Swept = data.try_into_val(&s.env).unwrap();
    assert_eq!(
        swept,
        Swept {
            amount: HARD_CAP_OFFERING,
            status: PoolStatus::Refunding,
        }
    );
}

#[test]
fn test_ownership_event() {
    let s = setup();
    let next = Address::generate(&s.env);
    s.pool.transfer_ownership(&s.owner, &next);

    let (event_topics, data) = last_event_of(&s.env, &s.pool.address);
    assert_eq!(event_topics, topics(&s.env, symbol_short!("owner"), &s.owner));
    let moved: OwnershipTransferred = data.try_into_val(&s.env).unwrap();
    assert_eq!(moved.new_owner, next);
}
