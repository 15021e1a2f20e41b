//! Token movements.
//!
//! Thin wrappers over the SEP-41 token client that turn any failure of the
//! external call into [`Error::TransferFailed`]. Callers save their own
//! bookkeeping before calling in here.

use soroban_sdk::{token, Address, Env};

use crate::Error;

/// Move `amount` of `asset` from `from` to `to`.
pub fn transfer(
    env: &Env,
    asset: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), Error> {
    let client = token::Client::new(env, asset);
    match client.try_transfer(from, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(Error::TransferFailed),
    }
}

/// Balance of `asset` held by this contract.
pub fn own_balance(env: &Env, asset: &Address) -> Result<i128, Error> {
    let client = token::Client::new(env, asset);
    match client.try_balance(&env.current_contract_address()) {
        Ok(Ok(balance)) => Ok(balance),
        _ => Err(Error::TransferFailed),
    }
}

/// Send this contract's whole balance of `asset` to `to`; returns the amount moved.
pub fn sweep(env: &Env, asset: &Address, to: &Address) -> Result<i128, Error> {
    let balance = own_balance(env, asset)?;
    if balance > 0 {
        transfer(env, asset, &env.current_contract_address(), to, balance)?;
    }
    Ok(balance)
}
