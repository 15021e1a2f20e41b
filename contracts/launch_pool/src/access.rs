//! Owner capability.
//!
//! The owner is a stored [`Address`]. Every admin entry point takes the
//! caller explicitly, requires its signature and compares it to the stored
//! owner.

use soroban_sdk::{Address, Env};

use crate::storage;
use crate::Error;

/// Authenticate `caller` and check it is the pool owner.
pub fn require_owner(env: &Env, caller: &Address) -> Result<(), Error> {
    caller.require_auth();
    let owner = storage::load_owner(env)?;
    if *caller != owner {
        return Err(Error::NotAuthorized);
    }
    Ok(())
}

/// Hand the owner capability to `new_owner`.
///
/// Effective immediately; the previous owner loses every admin right.
pub fn transfer_ownership(env: &Env, caller: &Address, new_owner: &Address) -> Result<(), Error> {
    require_owner(env, caller)?;
    storage::save_owner(env, new_owner);
    Ok(())
}
