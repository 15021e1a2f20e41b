//! Standardized event emission.
//!
//! Every mutating entry point publishes one event. Topics are
//! `(symbol, actor)`; data is one of the structs below and always carries the
//! resulting [`PoolStatus`] so an observer can replay the lifecycle without
//! reading contract storage.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

use crate::types::{PoolParams, PoolStatus, Schedule};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolCreated {
    pub payment_asset: Address,
    pub offering_asset: Address,
    pub params: PoolParams,
    pub status: PoolStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParametersUpdated {
    pub params: PoolParams,
    pub offering_deposited: bool,
    pub status: PoolStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OfferingDeposited {
    pub amount: i128,
    pub total_deposited: i128,
    pub offering_deposited: bool,
    pub status: PoolStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScheduleSet {
    pub schedule: Schedule,
    pub status: PoolStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokensPurchased {
    /// Payment units paid in this call.
    pub amount: i128,
    /// Participant's cumulative contribution after this call.
    pub contribution: i128,
    /// Offering units owed for `contribution`; what `claim_tokens` pays.
    pub entitlement: i128,
    pub total_raised: i128,
    pub status: PoolStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusChanged {
    pub previous: PoolStatus,
    pub total_raised: i128,
    pub status: PoolStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokensClaimed {
    pub amount: i128,
    pub total_distributed: i128,
    pub status: PoolStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundClaimed {
    pub amount: i128,
    pub total_refunded: i128,
    pub status: PoolStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Swept {
    pub amount: i128,
    pub status: PoolStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnershipTransferred {
    pub new_owner: Address,
}

pub fn emit_pool_created(env: &Env, owner: Address, data: PoolCreated) {
    env.events().publish((symbol_short!("init"), owner), data);
}

pub fn emit_parameters_updated(env: &Env, owner: Address, data: ParametersUpdated) {
    env.events().publish((symbol_short!("params"), owner), data);
}

pub fn emit_offering_deposited(env: &Env, owner: Address, data: OfferingDeposited) {
    env.events().publish((symbol_short!("deposit"), owner), data);
}

pub fn emit_activated(env: &Env, owner: Address, data: ScheduleSet) {
    env.events().publish((symbol_short!("activated"), owner), data);
}

pub fn emit_schedule_updated(env: &Env, owner: Address, data: ScheduleSet) {
    env.events().publish((symbol_short!("schedule"), owner), data);
}

pub fn emit_tokens_purchased(env: &Env, participant: Address, data: TokensPurchased) {
    env.events().publish((symbol_short!("purchase"), participant), data);
}

pub fn emit_finalized(env: &Env, owner: Address, data: StatusChanged) {
    env.events().publish((symbol_short!("finalized"), owner), data);
}

pub fn emit_refund_enabled(env: &Env, owner: Address, data: StatusChanged) {
    env.events().publish((symbol_short!("refund_on"), owner), data);
}

pub fn emit_cancelled(env: &Env, owner: Address, data: StatusChanged) {
    env.events().publish((symbol_short!("cancelled"), owner), data);
}

pub fn emit_tokens_claimed(env: &Env, participant: Address, data: TokensClaimed) {
    env.events().publish((symbol_short!("claimed"), participant), data);
}

pub fn emit_refund_claimed(env: &Env, participant: Address, data: RefundClaimed) {
    env.events().publish((symbol_short!("refunded"), participant), data);
}

pub fn emit_funds_withdrawn(env: &Env, owner: Address, data: Swept) {
    env.events().publish((symbol_short!("wd_funds"), owner), data);
}

pub fn emit_unsold_withdrawn(env: &Env, owner: Address, data: Swept) {
    env.events().publish((symbol_short!("wd_unsold"), owner), data);
}

pub fn emit_ownership_transferred(env: &Env, previous: Address, data: OwnershipTransferred) {
    env.events().publish((symbol_short!("owner"), previous), data);
}
