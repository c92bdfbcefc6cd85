//! # Whitelist gate
//!
//! Binary approve/reject decision per participant. A decision is final:
//! repeating it is a no-op, reversing it fails with `StatusLocked`.
//!
//! Authorization of the caller is checked by the contract entry points via
//! [`crate::rbac::require_whitelist_controller`]; this module only applies
//! the decision to the ledger.

use soroban_sdk::{Address, Env};

use crate::ledger::{self, Acceptance};
use crate::stages::StageSchedule;
use crate::storage;
use crate::types::WhitelistStatus;
use crate::Error;

/// Approve `who`, accepting all of their pending contributions at `block`.
///
/// Returns `None` when `who` was already approved.
pub fn approve(
    env: &Env,
    schedule: &StageSchedule,
    who: &Address,
    block: u64,
) -> Result<Option<Acceptance>, Error> {
    let mut record = storage::load_participant(env, who).unwrap_or_default();
    match record.whitelist_status {
        WhitelistStatus::Approved => return Ok(None),
        WhitelistStatus::Rejected => return Err(Error::StatusLocked),
        WhitelistStatus::Pending => {}
    }

    record.whitelist_status = WhitelistStatus::Approved;
    let acceptance = ledger::accept_pending(env, schedule, who, &mut record, block)?;
    storage::save_participant(env, who, &record);
    Ok(Some(acceptance))
}

/// Reject `who`, cancelling all of their pending contributions.
///
/// Returns the amount to refund, or `None` when `who` was already rejected.
pub fn reject(env: &Env, who: &Address) -> Result<Option<i128>, Error> {
    let mut record = storage::load_participant(env, who).unwrap_or_default();
    match record.whitelist_status {
        WhitelistStatus::Rejected => return Ok(None),
        WhitelistStatus::Approved => return Err(Error::StatusLocked),
        WhitelistStatus::Pending => {}
    }

    record.whitelist_status = WhitelistStatus::Rejected;
    let refunded = ledger::refund_pending(env, who, &mut record)?;
    storage::save_participant(env, who, &record);
    Ok(Some(refunded))
}

pub fn status_of(env: &Env, who: &Address) -> WhitelistStatus {
    storage::load_participant(env, who)
        .map(|p| p.whitelist_status)
        .unwrap_or(WhitelistStatus::Pending)
}
