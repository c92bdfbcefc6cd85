//! # Project withdrawal
//!
//! Funds accepted in a stage become releasable to the project wallet once the
//! sale has moved past that stage. Funds of the current stage stay with the
//! contract because participants can still reverse them.
//!
//! Claims are recorded per stage, oldest stage first, so a participant can
//! only reverse funds of their own acceptance stage that are still unclaimed.

use soroban_sdk::Env;

use crate::ledger;
use crate::stages::StageSchedule;
use crate::storage;
use crate::Error;

/// Stages `0..bound` are released at `block`.
fn release_bound(schedule: &StageSchedule, block: u64) -> u32 {
    let stage = schedule.accounting_stage(block);
    // Once the sale is over, late approvals are released too.
    if stage > schedule.stage_count() {
        stage + 1
    } else {
        stage
    }
}

/// Currency the project wallet may withdraw at `block`.
pub fn available(env: &Env, schedule: &StageSchedule, block: u64) -> Result<i128, Error> {
    let mut total: i128 = 0;
    for stage in 0..release_bound(schedule, block) {
        total = total
            .checked_add(ledger::unclaimed(env, stage))
            .ok_or(Error::Overflow)?;
    }
    Ok(total)
}

/// Record a project withdrawal of `amount` at `block`, claiming released
/// stages oldest first.
pub fn withdraw(
    env: &Env,
    schedule: &StageSchedule,
    block: u64,
    amount: i128,
) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    if amount > available(env, schedule, block)? {
        return Err(Error::ExceedsAvailable);
    }

    let mut totals = storage::load_totals(env);
    totals.project_withdrawn = totals
        .project_withdrawn
        .checked_add(amount)
        .ok_or(Error::Overflow)?;

    let mut remaining = amount;
    for stage in 0..release_bound(schedule, block) {
        if remaining == 0 {
            break;
        }
        let take = ledger::unclaimed(env, stage).min(remaining);
        if take > 0 {
            storage::set_stage_claimed(env, stage, storage::stage_claimed(env, stage) + take);
            remaining -= take;
        }
    }
    storage::save_totals(env, &totals);
    Ok(())
}
