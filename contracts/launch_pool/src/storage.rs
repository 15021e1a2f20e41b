//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by the pool.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key      | Type         | Description                          |
//! |----------|--------------|--------------------------------------|
//! | `Owner`  | `Address`    | Owner allowed to run admin calls     |
//! | `Assets` | `Assets`     | Payment and offering token contracts |
//! | `Params` | `PoolParams` | Rate, caps and per-user limits       |
//! | `State`  | `PoolState`  | Status, schedule and counters        |
//! | `Locked` | `bool`       | Re-entry flag, see [`crate::guard`]  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                     | Type           | Description              |
//! |-------------------------|----------------|--------------------------|
//! | `Contribution(address)` | `Contribution` | Per-participant record   |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{Assets, Contribution, Pool, PoolParams, PoolState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Owner,
    Assets,
    Params,
    State,
    Locked,
    Contribution(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Owner)
}

/// Write every singleton entry of a freshly initialised pool.
pub fn init_pool(env: &Env, owner: &Address, assets: &Assets, params: &PoolParams) {
    let instance = env.storage().instance();
    instance.set(&DataKey::Owner, owner);
    instance.set(&DataKey::Assets, assets);
    instance.set(&DataKey::Params, params);
    instance.set(&DataKey::State, &PoolState::new());
    bump_instance(env);
}

pub fn load_owner(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .ok_or(Error::NotInitialized)
}

pub fn save_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&DataKey::Owner, owner);
    bump_instance(env);
}

pub fn load_assets(env: &Env) -> Result<Assets, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Assets)
        .ok_or(Error::NotInitialized)
}

pub fn load_params(env: &Env) -> Result<PoolParams, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Params)
        .ok_or(Error::NotInitialized)
}

pub fn save_params(env: &Env, params: &PoolParams) {
    env.storage().instance().set(&DataKey::Params, params);
    bump_instance(env);
}

pub fn load_state(env: &Env) -> Result<PoolState, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::State)
        .ok_or(Error::NotInitialized)
}

pub fn save_state(env: &Env, state: &PoolState) {
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

pub fn is_locked(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Locked)
        .unwrap_or(false)
}

pub fn set_locked(env: &Env, locked: bool) {
    env.storage().instance().set(&DataKey::Locked, &locked);
}

/// Combine the singleton entries into the public [`Pool`] view.
pub fn load_pool(env: &Env) -> Result<Pool, Error> {
    let owner = load_owner(env)?;
    let assets = load_assets(env)?;
    let params = load_params(env)?;
    let state = load_state(env)?;
    Ok(Pool {
        owner,
        payment_asset: assets.payment_asset,
        offering_asset: assets.offering_asset,
        rate: params.rate,
        soft_cap: params.soft_cap,
        hard_cap: params.hard_cap,
        min_contribution: params.min_contribution,
        max_contribution: params.max_contribution,
        start_time: state.schedule.start_time,
        end_time: state.schedule.end_time,
        refund_end_time: state.schedule.refund_end_time,
        status: state.status,
        total_raised: state.total_raised,
        total_distributed: state.total_distributed,
        total_refunded: state.total_refunded,
        offering_deposited_amount: state.offering_deposited_amount,
        offering_deposited: state.offering_deposited,
        participant_count: state.participant_count,
    })
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Load a participant's record, or `None` if they never bought.
pub fn load_contribution(env: &Env, participant: &Address) -> Option<Contribution> {
    let key = DataKey::Contribution(participant.clone());
    let contribution: Option<Contribution> = env.storage().persistent().get(&key);
    if contribution.is_some() {
        bump_persistent(env, &key);
    }
    contribution
}

pub fn save_contribution(env: &Env, participant: &Address, contribution: &Contribution) {
    let key = DataKey::Contribution(participant.clone());
    env.storage().persistent().set(&key, contribution);
    bump_persistent(env, &key);
}
