//! Re-entry protection for state-mutating entry points.
//!
//! The flag lives in instance storage. A failing invocation is rolled back by
//! the host, flag included, so the pool can never be left locked.

use soroban_sdk::Env;

use crate::storage;
use crate::Error;

/// Run `body` with the pool locked against nested entry.
pub fn non_reentrant<T>(env: &Env, body: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
    enter(env)?;
    let result = body();
    exit(env);
    result
}

fn enter(env: &Env) -> Result<(), Error> {
    if storage::is_locked(env) {
        return Err(Error::Reentrancy);
    }
    storage::set_locked(env, true);
    Ok(())
}

fn exit(env: &Env) {
    storage::set_locked(env, false);
}
