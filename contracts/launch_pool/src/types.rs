//! # Types
//!
//! Shared data structures used across all modules of the launch pool.
//!
//! ## Design decisions
//!
//! ### Split ledger entries
//!
//! The pool is a singleton, but it is stored as several instance entries:
//!
//! - [`Assets`]: written once at `init`; never mutated.
//! - [`PoolParams`]: rewritable while the pool is `Pending`, frozen afterwards.
//! - [`PoolState`]: written on every purchase, claim, refund and transition.
//!
//! Per-participant [`Contribution`] records live in persistent storage, one
//! entry per address. The public API exposes the reconstructed [`Pool`] view.
//!
//! ### Status as a Finite-State Machine
//!
//! [`PoolStatus`] enforces a forward-only lifecycle:
//!
//! ```text
//! Pending ──► Active ──► Completed ──► Refunding
//!    │           └─────────────────────►┘
//!    └──► Cancelled
//! ```
//!
//! `finalize` picks `Completed` or `Refunding` from the soft cap; the owner may
//! force `Refunding` from `Active` or `Completed` with `enable_refund`.

use soroban_sdk::{contracttype, Address};

/// Lifecycle status of the pool.
///
/// The discriminants are the canonical numeric encoding used in events and by
/// the off-chain indexer.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum PoolStatus {
    /// Being configured; offering tokens may be deposited.
    Pending = 0,
    /// Sale is live between `start_time` and `end_time`.
    Active = 1,
    /// Soft cap reached; contributors claim offering tokens.
    Completed = 2,
    /// Cancelled by the owner before activation.
    Cancelled = 3,
    /// Contributors reclaim their payment until `refund_end_time`.
    Refunding = 4,
}

impl PoolStatus {
    /// Whether `self -> to` is an edge of the lifecycle graph.
    pub fn can_transition_to(self, to: PoolStatus) -> bool {
        matches!(
            (self, to),
            (PoolStatus::Pending, PoolStatus::Active)
                | (PoolStatus::Pending, PoolStatus::Cancelled)
                | (PoolStatus::Active, PoolStatus::Completed)
                | (PoolStatus::Active, PoolStatus::Refunding)
                | (PoolStatus::Completed, PoolStatus::Refunding)
        )
    }
}

/// The two token contracts the pool moves value through.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assets {
    /// Asset contributors pay with.
    pub payment_asset: Address,
    /// Asset contributors receive on a successful raise.
    pub offering_asset: Address,
}

/// Sale economics. Amounts are in payment-asset units.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolParams {
    /// Offering units per payment unit, scaled by [`crate::math::RATE_SCALE`].
    pub rate: i128,
    /// Minimum aggregate raise for the sale to succeed.
    pub soft_cap: i128,
    /// Maximum aggregate raise accepted.
    pub hard_cap: i128,
    /// Smallest single purchase.
    pub min_contribution: i128,
    /// Largest cumulative contribution per participant.
    pub max_contribution: i128,
}

/// Sale and refund windows, as ledger timestamps in seconds.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Schedule {
    pub start_time: u64,
    pub end_time: u64,
    pub refund_end_time: u64,
}

/// Mutable pool state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    pub status: PoolStatus,
    /// All zeroes until `activate`.
    pub schedule: Schedule,
    /// Sum of all accepted contributions. Never exceeds the hard cap.
    pub total_raised: i128,
    /// Offering units released through claims.
    pub total_distributed: i128,
    /// Payment units returned through refunds.
    pub total_refunded: i128,
    /// Offering units the owner has deposited so far.
    pub offering_deposited_amount: i128,
    /// True once the deposit covers the hard-cap entitlement.
    pub offering_deposited: bool,
    /// Number of distinct contributors.
    pub participant_count: u32,
}

impl PoolState {
    pub fn new() -> Self {
        Self {
            status: PoolStatus::Pending,
            schedule: Schedule::default(),
            total_raised: 0,
            total_distributed: 0,
            total_refunded: 0,
            offering_deposited_amount: 0,
            offering_deposited: false,
            participant_count: 0,
        }
    }
}

/// A participant's ledger entry. Created on first purchase, never deleted.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Contribution {
    /// Cumulative payment-asset contributed.
    pub amount: i128,
    /// Offering tokens have been claimed. Excludes `claimed_refund`.
    pub claimed_tokens: bool,
    /// Payment has been refunded. Excludes `claimed_tokens`.
    pub claimed_refund: bool,
}

/// Full read-only view of the pool.
///
/// Reconstructed from the split storage entries by `get_pool`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    pub owner: Address,
    pub payment_asset: Address,
    pub offering_asset: Address,
    pub rate: i128,
    pub soft_cap: i128,
    pub hard_cap: i128,
    pub min_contribution: i128,
    pub max_contribution: i128,
    pub start_time: u64,
    pub end_time: u64,
    pub refund_end_time: u64,
    pub status: PoolStatus,
    pub total_raised: i128,
    pub total_distributed: i128,
    pub total_refunded: i128,
    pub offering_deposited_amount: i128,
    pub offering_deposited: bool,
    pub participant_count: u32,
}
