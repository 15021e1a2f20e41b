//! # Launch Pool Contract
//!
//! A timed, capped fundraising pool. Contributors pay a payment asset during
//! the sale window and, if the soft cap is met, claim the offering asset at a
//! fixed rate; otherwise they reclaim their payment during the refund window.
//!
//! | Phase          | Entry Point(s)                                                   |
//! |----------------|------------------------------------------------------------------|
//! | Bootstrap      | [`LaunchPool::init`]                                             |
//! | Configuration  | `update_parameters`, `deposit_offering_tokens`, `cancel`        |
//! | Sale           | `activate`, `update_schedule`, `buy_tokens`                      |
//! | Resolution     | `finalize`, `enable_refund`                                      |
//! | Settlement     | `claim_tokens`, `claim_refund`                                   |
//! | Recovery       | `withdraw_raised_funds`, `withdraw_unsold_tokens`                |
//! | Ownership      | `transfer_ownership`                                             |
//! | Queries        | `get_pool`, `get_status`, `get_contribution`, `get_entitlement`, `owner` |
//!
//! ## Architecture
//!
//! Owner checks live in [`access`], storage access in [`storage`], token calls
//! in [`assets`] and the re-entry flag in [`guard`]. Every mutating entry
//! point runs under [`guard::non_reentrant`] and saves its bookkeeping before
//! touching a token contract. Returning an [`Error`] makes the host discard
//! all writes of the invocation.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, log, Address, Env};

mod access;
mod assets;
pub mod events;
mod guard;
pub mod math;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_settlement;

use events::{
    OfferingDeposited, OwnershipTransferred, ParametersUpdated, PoolCreated, RefundClaimed,
    ScheduleSet, StatusChanged, Swept, TokensClaimed, TokensPurchased,
};
pub use types::{Assets, Contribution, Pool, PoolParams, PoolState, PoolStatus, Schedule};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    NotAuthorized = 3,
    InvalidParameters = 4,
    InvalidSchedule = 5,
    InvalidState = 6,
    OfferingNotDeposited = 7,
    NotInSaleWindow = 8,
    BelowMinContribution = 9,
    AboveMaxContribution = 10,
    HardCapExceeded = 11,
    FinalizeTooEarly = 12,
    NoContribution = 13,
    TokensAlreadyClaimed = 14,
    RefundAlreadyClaimed = 15,
    RefundWindowExpired = 16,
    RefundWindowOpen = 17,
    TransferFailed = 18,
    Reentrancy = 19,
    InvalidAmount = 20,
    Overflow = 21,
    ScheduleLocked = 22,
}

#[contract]
pub struct LaunchPool;

#[contractimpl]
impl LaunchPool {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Create the pool in `Pending` with `owner` as administrator.
    ///
    /// Must be called exactly once after deployment.
    pub fn init(
        env: Env,
        owner: Address,
        payment_asset: Address,
        offering_asset: Address,
        params: PoolParams,
    ) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        owner.require_auth();

        validate_params(&params)?;
        if payment_asset == offering_asset {
            return Err(Error::InvalidParameters);
        }

        let assets = Assets {
            payment_asset: payment_asset.clone(),
            offering_asset: offering_asset.clone(),
        };
        storage::init_pool(&env, &owner, &assets, &params);

        events::emit_pool_created(
            &env,
            owner,
            PoolCreated {
                payment_asset,
                offering_asset,
                params,
                status: PoolStatus::Pending,
            },
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Configuration (Pending only)
    // ─────────────────────────────────────────────────────────

    /// Overwrite rate, caps and per-user limits.
    ///
    /// Re-evaluates whether the offering deposit still covers the hard cap.
    pub fn update_parameters(env: Env, caller: Address, params: PoolParams) -> Result<(), Error> {
        guard::non_reentrant(&env, || {
            access::require_owner(&env, &caller)?;
            let mut state = storage::load_state(&env)?;
            require_status(&state, PoolStatus::Pending)?;
            validate_params(&params)?;

            state.offering_deposited = covers_hard_cap(&state, &params)?;
            storage::save_params(&env, &params);
            storage::save_state(&env, &state);

            events::emit_parameters_updated(
                &env,
                caller.clone(),
                ParametersUpdated {
                    params,
                    offering_deposited: state.offering_deposited,
                    status: state.status,
                },
            );
            Ok(())
        })
    }

    /// Pull `amount` of the offering asset from the owner into the pool.
    pub fn deposit_offering_tokens(env: Env, caller: Address, amount: i128) -> Result<(), Error> {
        guard::non_reentrant(&env, || {
            access::require_owner(&env, &caller)?;
            let mut state = storage::load_state(&env)?;
            require_status(&state, PoolStatus::Pending)?;
            if amount <= 0 {
                return Err(Error::InvalidAmount);
            }

            let params = storage::load_params(&env)?;
            state.offering_deposited_amount = math::add(state.offering_deposited_amount, amount)?;
            state.offering_deposited = covers_hard_cap(&state, &params)?;
            storage::save_state(&env, &state);

            let assets = storage::load_assets(&env)?;
            assets::transfer(
                &env,
                &assets.offering_asset,
                &caller,
                &env.current_contract_address(),
                amount,
            )?;

            events::emit_offering_deposited(
                &env,
                caller.clone(),
                OfferingDeposited {
                    amount,
                    total_deposited: state.offering_deposited_amount,
                    offering_deposited: state.offering_deposited,
                    status: state.status,
                },
            );
            Ok(())
        })
    }

    /// Cancel a pool that never went live. Terminal.
    pub fn cancel(env: Env, caller: Address) -> Result<(), Error> {
        guard::non_reentrant(&env, || {
            access::require_owner(&env, &caller)?;
            let mut state = storage::load_state(&env)?;
            let previous = transition(&mut state, PoolStatus::Cancelled)?;
            storage::save_state(&env, &state);

            log!(&env, "pool cancelled");
            events::emit_cancelled(
                &env,
                caller.clone(),
                StatusChanged {
                    previous,
                    total_raised: state.total_raised,
                    status: state.status,
                },
            );
            Ok(())
        })
    }

    // ─────────────────────────────────────────────────────────
    // Sale
    // ─────────────────────────────────────────────────────────

    /// Open the sale. Requires a fully funded offering deposit and
    /// `now < start_time < end_time < refund_end_time`.
    pub fn activate(
        env: Env,
        caller: Address,
        start_time: u64,
        end_time: u64,
        refund_end_time: u64,
    ) -> Result<(), Error> {
        guard::non_reentrant(&env, || {
            access::require_owner(&env, &caller)?;
            let mut state = storage::load_state(&env)?;
            require_status(&state, PoolStatus::Pending)?;
            if !state.offering_deposited {
                return Err(Error::OfferingNotDeposited);
            }

            let now = env.ledger().timestamp();
            if start_time <= now || end_time <= start_time || refund_end_time <= end_time {
                return Err(Error::InvalidSchedule);
            }

            transition(&mut state, PoolStatus::Active)?;
            state.schedule = Schedule {
                start_time,
                end_time,
                refund_end_time,
            };
            storage::save_state(&env, &state);

            log!(&env, "pool activated", start_time, end_time, refund_end_time);
            events::emit_activated(
                &env,
                caller.clone(),
                ScheduleSet {
                    schedule: state.schedule.clone(),
                    status: state.status,
                },
            );
            Ok(())
        })
    }

    /// Move `end_time` and `refund_end_time` while the sale has not ended.
    pub fn update_schedule(
        env: Env,
        caller: Address,
        end_time: u64,
        refund_end_time: u64,
    ) -> Result<(), Error> {
        guard::non_reentrant(&env, || {
            access::require_owner(&env, &caller)?;
            let mut state = storage::load_state(&env)?;
            require_status(&state, PoolStatus::Active)?;

            let now = env.ledger().timestamp();
            if now > state.schedule.end_time {
                return Err(Error::ScheduleLocked);
            }
            if end_time <= state.schedule.start_time
                || end_time < now
                || refund_end_time <= end_time
            {
                return Err(Error::InvalidSchedule);
            }

            state.schedule.end_time = end_time;
            state.schedule.refund_end_time = refund_end_time;
            storage::save_state(&env, &state);

            events::emit_schedule_updated(
                &env,
                caller.clone(),
                ScheduleSet {
                    schedule: state.schedule.clone(),
                    status: state.status,
                },
            );
            Ok(())
        })
    }

    /// Contribute `amount` of the payment asset.
    ///
    /// The ledger is updated before the payment is pulled; a failed pull
    /// aborts the whole call.
    pub fn buy_tokens(env: Env, participant: Address, amount: i128) -> Result<(), Error> {
        guard::non_reentrant(&env, || {
            participant.require_auth();
            let mut state = storage::load_state(&env)?;
            require_status(&state, PoolStatus::Active)?;

            let now = env.ledger().timestamp();
            if now < state.schedule.start_time || now > state.schedule.end_time {
                return Err(Error::NotInSaleWindow);
            }

            let params = storage::load_params(&env)?;
            if amount < params.min_contribution {
                return Err(Error::BelowMinContribution);
            }

            let existing = storage::load_contribution(&env, &participant);
            let is_new = existing.is_none();
            let mut contribution = existing.unwrap_or_default();

            let new_amount = math::add(contribution.amount, amount)?;
            if new_amount > params.max_contribution {
                return Err(Error::AboveMaxContribution);
            }
            let new_total = math::add(state.total_raised, amount)?;
            if new_total > params.hard_cap {
                return Err(Error::HardCapExceeded);
            }
            let entitlement = math::entitlement(new_amount, params.rate)?;

            contribution.amount = new_amount;
            state.total_raised = new_total;
            if is_new {
                state.participant_count += 1;
            }
            storage::save_contribution(&env, &participant, &contribution);
            storage::save_state(&env, &state);

            let assets = storage::load_assets(&env)?;
            assets::transfer(
                &env,
                &assets.payment_asset,
                &participant,
                &env.current_contract_address(),
                amount,
            )?;

            events::emit_tokens_purchased(
                &env,
                participant.clone(),
                TokensPurchased {
                    amount,
                    contribution: new_amount,
                    entitlement,
                    total_raised: new_total,
                    status: state.status,
                },
            );
            Ok(())
        })
    }

    // ─────────────────────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────────────────────

    /// Close the sale once it has ended or sold out.
    ///
    /// Resolves to `Completed` when the soft cap is met (inclusive), otherwise
    /// to `Refunding`.
    pub fn finalize(env: Env, caller: Address) -> Result<PoolStatus, Error> {
        guard::non_reentrant(&env, || {
            access::require_owner(&env, &caller)?;
            let mut state = storage::load_state(&env)?;
            require_status(&state, PoolStatus::Active)?;

            let params = storage::load_params(&env)?;
            let now = env.ledger().timestamp();
            if now <= state.schedule.end_time && state.total_raised < params.hard_cap {
                return Err(Error::FinalizeTooEarly);
            }

            let outcome = if state.total_raised >= params.soft_cap {
                PoolStatus::Completed
            } else {
                PoolStatus::Refunding
            };
            let previous = transition(&mut state, outcome)?;
            storage::save_state(&env, &state);

            log!(&env, "pool finalized", state.total_raised, outcome);
            events::emit_finalized(
                &env,
                caller.clone(),
                StatusChanged {
                    previous,
                    total_raised: state.total_raised,
                    status: state.status,
                },
            );
            Ok(outcome)
        })
    }

    /// Owner override: force the pool into `Refunding`.
    ///
    /// Available from `Active` or `Completed` until the refund window closes.
    pub fn enable_refund(env: Env, caller: Address) -> Result<(), Error> {
        guard::non_reentrant(&env, || {
            access::require_owner(&env, &caller)?;
            let mut state = storage::load_state(&env)?;
            if state.status != PoolStatus::Active && state.status != PoolStatus::Completed {
                return Err(Error::InvalidState);
            }
            if env.ledger().timestamp() > state.schedule.refund_end_time {
                return Err(Error::RefundWindowExpired);
            }

            let previous = transition(&mut state, PoolStatus::Refunding)?;
            storage::save_state(&env, &state);

            log!(&env, "refund enabled by owner", previous);
            events::emit_refund_enabled(
                &env,
                caller.clone(),
                StatusChanged {
                    previous,
                    total_raised: state.total_raised,
                    status: state.status,
                },
            );
            Ok(())
        })
    }

    // ─────────────────────────────────────────────────────────
    // Settlement
    // ─────────────────────────────────────────────────────────

    /// Pay the participant their offering entitlement. Returns the amount paid.
    pub fn claim_tokens(env: Env, participant: Address) -> Result<i128, Error> {
        guard::non_reentrant(&env, || {
            participant.require_auth();
            let mut state = storage::load_state(&env)?;
            require_status(&state, PoolStatus::Completed)?;

            let mut contribution = load_settleable(&env, &participant)?;
            if contribution.claimed_tokens {
                return Err(Error::TokensAlreadyClaimed);
            }
            if contribution.claimed_refund {
                return Err(Error::RefundAlreadyClaimed);
            }

            let params = storage::load_params(&env)?;
            let amount = math::entitlement(contribution.amount, params.rate)?;

            contribution.claimed_tokens = true;
            state.total_distributed = math::add(state.total_distributed, amount)?;
            storage::save_contribution(&env, &participant, &contribution);
            storage::save_state(&env, &state);

            let assets = storage::load_assets(&env)?;
            assets::transfer(
                &env,
                &assets.offering_asset,
                &env.current_contract_address(),
                &participant,
                amount,
            )?;

            events::emit_tokens_claimed(
                &env,
                participant.clone(),
                TokensClaimed {
                    amount,
                    total_distributed: state.total_distributed,
                    status: state.status,
                },
            );
            Ok(amount)
        })
    }

    /// Return the participant's whole contribution. Returns the amount refunded.
    pub fn claim_refund(env: Env, participant: Address) -> Result<i128, Error> {
        guard::non_reentrant(&env, || {
            participant.require_auth();
            let mut state = storage::load_state(&env)?;
            require_status(&state, PoolStatus::Refunding)?;
            if env.ledger().timestamp() > state.schedule.refund_end_time {
                return Err(Error::RefundWindowExpired);
            }

            let mut contribution = load_settleable(&env, &participant)?;
            if contribution.claimed_refund {
                return Err(Error::RefundAlreadyClaimed);
            }
            if contribution.claimed_tokens {
                return Err(Error::TokensAlreadyClaimed);
            }

            let amount = contribution.amount;
            contribution.claimed_refund = true;
            state.total_refunded = math::add(state.total_refunded, amount)?;
            storage::save_contribution(&env, &participant, &contribution);
            storage::save_state(&env, &state);

            let assets = storage::load_assets(&env)?;
            assets::transfer(
                &env,
                &assets.payment_asset,
                &env.current_contract_address(),
                &participant,
                amount,
            )?;

            events::emit_refund_claimed(
                &env,
                participant.clone(),
                RefundClaimed {
                    amount,
                    total_refunded: state.total_refunded,
                    status: state.status,
                },
            );
            Ok(amount)
        })
    }

    // ─────────────────────────────────────────────────────────
    // Recovery
    // ─────────────────────────────────────────────────────────

    /// Sweep the payment asset to the owner once the refund window has closed.
    ///
    /// For a `Completed` pool this is the raise; for a `Refunding` pool it is
    /// whatever contributors left unclaimed. Returns the amount swept.
    pub fn withdraw_raised_funds(env: Env, caller: Address) -> Result<i128, Error> {
        guard::non_reentrant(&env, || {
            access::require_owner(&env, &caller)?;
            let state = storage::load_state(&env)?;
            match state.status {
                PoolStatus::Completed | PoolStatus::Refunding => {}
                PoolStatus::Pending | PoolStatus::Active | PoolStatus::Cancelled => {
                    return Err(Error::InvalidState)
                }
            }
            require_refund_window_closed(&env, &state)?;

            let assets = storage::load_assets(&env)?;
            let amount = assets::sweep(&env, &assets.payment_asset, &caller)?;

            events::emit_funds_withdrawn(
                &env,
                caller.clone(),
                Swept {
                    amount,
                    status: state.status,
                },
            );
            Ok(amount)
        })
    }

    /// Sweep the remaining offering asset to the owner after the refund window.
    /// Returns the amount swept.
    pub fn withdraw_unsold_tokens(env: Env, caller: Address) -> Result<i128, Error> {
        guard::non_reentrant(&env, || {
            access::require_owner(&env, &caller)?;
            let state = storage::load_state(&env)?;
            match state.status {
                PoolStatus::Completed | PoolStatus::Cancelled | PoolStatus::Refunding => {}
                PoolStatus::Pending | PoolStatus::Active => return Err(Error::InvalidState),
            }
            require_refund_window_closed(&env, &state)?;

            let assets = storage::load_assets(&env)?;
            let amount = assets::sweep(&env, &assets.offering_asset, &caller)?;

            events::emit_unsold_withdrawn(
                &env,
                caller.clone(),
                Swept {
                    amount,
                    status: state.status,
                },
            );
            Ok(amount)
        })
    }

    // ─────────────────────────────────────────────────────────
    // Ownership
    // ─────────────────────────────────────────────────────────

    /// Hand the owner role to `new_owner`.
    pub fn transfer_ownership(env: Env, caller: Address, new_owner: Address) -> Result<(), Error> {
        guard::non_reentrant(&env, || {
            access::transfer_ownership(&env, &caller, &new_owner)?;
            events::emit_ownership_transferred(
                &env,
                caller.clone(),
                OwnershipTransferred {
                    new_owner: new_owner.clone(),
                },
            );
            Ok(())
        })
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_pool(env: Env) -> Result<Pool, Error> {
        storage::load_pool(&env)
    }

    pub fn get_status(env: Env) -> Result<PoolStatus, Error> {
        Ok(storage::load_state(&env)?.status)
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        storage::load_owner(&env)
    }

    /// The participant's record; zeroed if they never bought.
    pub fn get_contribution(env: Env, participant: Address) -> Contribution {
        storage::load_contribution(&env, &participant).unwrap_or_default()
    }

    /// Offering units the participant's contribution is worth, whether or not
    /// it has been claimed.
    pub fn get_entitlement(env: Env, participant: Address) -> Result<i128, Error> {
        let params = storage::load_params(&env)?;
        let contribution = storage::load_contribution(&env, &participant).unwrap_or_default();
        math::entitlement(contribution.amount, params.rate)
    }
}

// ─────────────────────────────────────────────────────────
// Internal Helpers
// ─────────────────────────────────────────────────────────

fn validate_params(params: &PoolParams) -> Result<(), Error> {
    if params.rate <= 0
        || params.soft_cap <= 0
        || params.hard_cap < params.soft_cap
        || params.min_contribution <= 0
        || params.max_contribution < params.min_contribution
    {
        return Err(Error::InvalidParameters);
    }
    math::entitlement(params.hard_cap, params.rate).map_err(|_| Error::InvalidParameters)?;
    Ok(())
}

fn covers_hard_cap(state: &PoolState, params: &PoolParams) -> Result<bool, Error> {
    Ok(state.offering_deposited_amount >= math::entitlement(params.hard_cap, params.rate)?)
}

fn require_status(state: &PoolState, expected: PoolStatus) -> Result<(), Error> {
    if state.status != expected {
        return Err(Error::InvalidState);
    }
    Ok(())
}

fn require_refund_window_closed(env: &Env, state: &PoolState) -> Result<(), Error> {
    if env.ledger().timestamp() <= state.schedule.refund_end_time {
        return Err(Error::RefundWindowOpen);
    }
    Ok(())
}

/// Move `state` to `to`, returning the status it left.
fn transition(state: &mut PoolState, to: PoolStatus) -> Result<PoolStatus, Error> {
    let previous = state.status;
    if !previous.can_transition_to(to) {
        return Err(Error::InvalidState);
    }
    state.status = to;
    Ok(previous)
}

fn load_settleable(env: &Env, participant: &Address) -> Result<Contribution, Error> {
    match storage::load_contribution(env, participant) {
        Some(contribution) if contribution.amount > 0 => Ok(contribution),
        _ => Err(Error::NoContribution),
    }
}
