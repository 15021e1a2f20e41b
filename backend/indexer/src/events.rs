//! Canonical event types emitted by the launch pool contract.
//!
//! These mirror the Soroban events defined in
//! `contracts/launch_pool/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the pool contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Pool initialised (`init` topic).
    PoolCreated,
    /// Rate, caps or limits changed while pending (`params`).
    ParametersUpdated,
    /// Owner deposited offering tokens (`deposit`).
    OfferingDeposited,
    /// Sale opened (`activated`).
    PoolActivated,
    /// End or refund-end time moved (`schedule`).
    ScheduleUpdated,
    /// A contributor bought in (`purchase`).
    TokensPurchased,
    /// Sale resolved to Completed or Refunding (`finalized`).
    PoolFinalized,
    /// Owner forced refunds (`refund_on`).
    RefundEnabled,
    /// Owner cancelled a pending pool (`cancelled`).
    PoolCancelled,
    /// A contributor claimed offering tokens (`claimed`).
    TokensClaimed,
    /// A contributor took a refund (`refunded`).
    RefundClaimed,
    /// Raised funds swept to the owner (`wd_funds`).
    FundsWithdrawn,
    /// Remaining offering swept to the owner (`wd_unsold`).
    UnsoldWithdrawn,
    /// Owner role handed over (`owner`).
    OwnershipTransferred,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "init" => Self::PoolCreated,
            "params" => Self::ParametersUpdated,
            "deposit" => Self::OfferingDeposited,
            "activated" => Self::PoolActivated,
            "schedule" => Self::ScheduleUpdated,
            "purchase" => Self::TokensPurchased,
            "finalized" => Self::PoolFinalized,
            "refund_on" => Self::RefundEnabled,
            "cancelled" => Self::PoolCancelled,
            "claimed" => Self::TokensClaimed,
            "refunded" => Self::RefundClaimed,
            "wd_funds" => Self::FundsWithdrawn,
            "wd_unsold" => Self::UnsoldWithdrawn,
            "owner" => Self::OwnershipTransferred,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PoolCreated => "pool_created",
            Self::ParametersUpdated => "parameters_updated",
            Self::OfferingDeposited => "offering_deposited",
            Self::PoolActivated => "pool_activated",
            Self::ScheduleUpdated => "schedule_updated",
            Self::TokensPurchased => "tokens_purchased",
            Self::PoolFinalized => "pool_finalized",
            Self::RefundEnabled => "refund_enabled",
            Self::PoolCancelled => "pool_cancelled",
            Self::TokensClaimed => "tokens_claimed",
            Self::RefundClaimed => "refund_claimed",
            Self::FundsWithdrawn => "funds_withdrawn",
            Self::UnsoldWithdrawn => "unsold_withdrawn",
            Self::OwnershipTransferred => "ownership_transferred",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(s: &str) -> Self {
        ALL_KINDS
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .unwrap_or(Self::Unknown)
    }
}

const ALL_KINDS: [EventKind; 14] = [
    EventKind::PoolCreated,
    EventKind::ParametersUpdated,
    EventKind::OfferingDeposited,
    EventKind::PoolActivated,
    EventKind::ScheduleUpdated,
    EventKind::TokensPurchased,
    EventKind::PoolFinalized,
    EventKind::RefundEnabled,
    EventKind::PoolCancelled,
    EventKind::TokensClaimed,
    EventKind::RefundClaimed,
    EventKind::FundsWithdrawn,
    EventKind::UnsoldWithdrawn,
    EventKind::OwnershipTransferred,
];

/// Name of the pool status with the contract's numeric encoding.
pub fn status_name(status: i64) -> &'static str {
    match status {
        0 => "pending",
        1 => "active",
        2 => "completed",
        3 => "cancelled",
        4 => "refunding",
        _ => "unknown",
    }
}

/// Rate, caps and per-user limits carried by `init` and `params` events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTerms {
    pub rate: String,
    pub soft_cap: String,
    pub hard_cap: String,
    pub min_contribution: String,
    pub max_contribution: String,
}

/// Sale and refund windows carried by `activated` and `schedule` events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSchedule {
    pub start_time: i64,
    pub end_time: i64,
    pub refund_end_time: i64,
}

/// A fully decoded pool event, ready to be stored in the database.
///
/// Amounts are `i128` on chain and kept as decimal strings here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolEvent {
    /// RPC event id; unique per contract event.
    pub event_id: String,
    pub event_type: String,
    /// Second topic: the participant or owner that triggered the event.
    pub actor: Option<String>,
    pub amount: Option<String>,
    /// Participant's cumulative contribution (purchases).
    pub contribution: Option<String>,
    /// Participant's cumulative entitlement (purchases).
    pub entitlement: Option<String>,
    /// Running pool-level total carried by the event.
    pub total: Option<String>,
    /// Resulting pool status.
    pub status: Option<i64>,
    pub new_owner: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    /// Asset pair, `init` only.
    pub payment_asset: Option<String>,
    pub offering_asset: Option<String>,
    pub terms: Option<PoolTerms>,
    pub schedule: Option<PoolSchedule>,
    /// Whether the deposit covers a full hard cap (`params`, `deposit`).
    pub offering_deposited: Option<bool>,
}

impl PoolEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::from_stored(&self.event_type)
    }
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub contribution: Option<String>,
    pub entitlement: Option<String>,
    pub total: Option<String>,
    pub status: Option<i64>,
    pub new_owner: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// Projected pool record, field for field with the contract's `Pool` view.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PoolSnapshot {
    pub contract_id: String,
    pub owner: Option<String>,
    pub payment_asset: Option<String>,
    pub offering_asset: Option<String>,
    pub rate: String,
    pub soft_cap: String,
    pub hard_cap: String,
    pub min_contribution: String,
    pub max_contribution: String,
    pub start_time: i64,
    pub end_time: i64,
    pub refund_end_time: i64,
    pub status: i64,
    pub total_raised: String,
    pub total_distributed: String,
    pub total_refunded: String,
    pub offering_deposited_amount: String,
    pub offering_deposited: bool,
    pub participant_count: i64,
    pub last_ledger: i64,
}

/// Projected contribution record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContributionRecord {
    pub address: String,
    pub amount: String,
    pub entitlement: String,
    pub claimed_tokens: bool,
    pub claimed_refund: bool,
    pub last_ledger: i64,
}
