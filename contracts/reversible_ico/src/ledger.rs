//! # Contribution ledger
//!
//! Per-participant accounting of committed, pending, accepted and withdrawn
//! currency, plus the global [`LedgerTotals`] and the per-stage
//! `StageAccepted` aggregate that project withdrawals are gated on.
//!
//! Every operation computes its full effect first and only then writes, so an
//! `Err` never leaves a half-applied record behind.
//!
//! Functions taking `record: &mut Participant` leave persisting the record to
//! the caller; everything else they touch is written here.

use soroban_sdk::{Address, Env, Map};

use crate::stages::StageSchedule;
use crate::storage;
use crate::types::{Contribution, ContributionStatus, Participant, WhitelistStatus, TOKEN_UNIT};
use crate::Error;

/// Outcome of a successful commit.
pub struct CommitReceipt {
    pub contribution: Contribution,
    /// True when the participant was already approved.
    pub accepted: bool,
    /// Sold tokens owed to the participant right away.
    pub tokens: i128,
}

/// Outcome of accepting a participant's pending contributions.
pub struct Acceptance {
    pub amount: i128,
    pub tokens: i128,
}

/// Outcome of a participant withdrawal.
pub struct Withdrawal {
    pub tokens_returned: i128,
    pub price: i128,
}

/// Sold tokens bought by `amount` at `price` (floor).
pub fn tokens_for(amount: i128, price: i128) -> Result<i128, Error> {
    if price <= 0 {
        return Err(Error::InvalidConfig);
    }
    amount
        .checked_mul(TOKEN_UNIT)
        .map(|scaled| scaled / price)
        .ok_or(Error::Overflow)
}

fn add(a: i128, b: i128) -> Result<i128, Error> {
    a.checked_add(b).ok_or(Error::Overflow)
}

/// Accepted currency of `stage` the project has not claimed yet.
pub fn unclaimed(env: &Env, stage: u32) -> i128 {
    storage::stage_accepted(env, stage) - storage::stage_claimed(env, stage)
}

/// Record a new contribution of `amount` from `who` at `block`.
///
/// The contribution is priced at the stage `block` falls in. It is accepted on
/// the spot when `who` is already approved, otherwise it stays pending.
pub fn commit(
    env: &Env,
    schedule: &StageSchedule,
    who: &Address,
    block: u64,
    amount: i128,
) -> Result<CommitReceipt, Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    let stage = schedule.stage_at(block)?;
    let price = schedule.stage(stage)?.token_price;

    let mut record = storage::load_participant(env, who).unwrap_or_default();
    let accepted = match record.whitelist_status {
        WhitelistStatus::Rejected => return Err(Error::StatusLocked),
        WhitelistStatus::Approved => true,
        WhitelistStatus::Pending => false,
    };

    let mut totals = storage::load_totals(env);
    let mut contributions = storage::load_contributions(env, who);
    let tokens = if accepted { tokens_for(amount, price)? } else { 0 };

    record.committed_total = add(record.committed_total, amount)?;
    totals.committed = add(totals.committed, amount)?;
    let mut stage_accepted = None;
    if accepted {
        record.accepted_total = add(record.accepted_total, amount)?;
        record.token_balance = add(record.token_balance, tokens)?;
        totals.accepted = add(totals.accepted, amount)?;
        stage_accepted = Some(add(storage::stage_accepted(env, stage), amount)?);
    } else {
        record.pending_total = add(record.pending_total, amount)?;
        totals.pending = add(totals.pending, amount)?;
    }

    let contribution = Contribution {
        block_number: block,
        amount,
        stage_index: stage,
        token_price: price,
        status: if accepted {
            ContributionStatus::Accepted
        } else {
            ContributionStatus::Pending
        },
        accepted_stage: if accepted { Some(stage) } else { None },
        withdrawn: 0,
    };
    contributions.push_back(contribution.clone());
    record.contribution_count = contributions.len();

    storage::save_contributions(env, who, &contributions);
    storage::save_participant(env, who, &record);
    storage::save_totals(env, &totals);
    if let Some(value) = stage_accepted {
        storage::set_stage_accepted(env, stage, value);
    }

    Ok(CommitReceipt {
        contribution,
        accepted,
        tokens,
    })
}

/// Move every pending contribution of `who` to Accepted at `block`.
///
/// Tokens are settled at each contribution's own commit price; the funds are
/// attributed to the stage acceptance happens in.
pub fn accept_pending(
    env: &Env,
    schedule: &StageSchedule,
    who: &Address,
    record: &mut Participant,
    block: u64,
) -> Result<Acceptance, Error> {
    let mut contributions = storage::load_contributions(env, who);
    let stage = schedule.accounting_stage(block);

    let mut amount: i128 = 0;
    let mut tokens: i128 = 0;
    for i in 0..contributions.len() {
        if let Some(mut c) = contributions.get(i) {
            if c.status != ContributionStatus::Pending {
                continue;
            }
            amount = add(amount, c.amount)?;
            tokens = add(tokens, tokens_for(c.amount, c.token_price)?)?;
            c.status = ContributionStatus::Accepted;
            c.accepted_stage = Some(stage);
            contributions.set(i, c);
        }
    }
    if amount == 0 {
        return Ok(Acceptance { amount, tokens });
    }

    let mut totals = storage::load_totals(env);
    record.pending_total -= amount;
    record.accepted_total = add(record.accepted_total, amount)?;
    record.token_balance = add(record.token_balance, tokens)?;
    totals.pending -= amount;
    totals.accepted = add(totals.accepted, amount)?;
    let stage_total = add(storage::stage_accepted(env, stage), amount)?;

    storage::save_contributions(env, who, &contributions);
    storage::save_totals(env, &totals);
    storage::set_stage_accepted(env, stage, stage_total);

    Ok(Acceptance { amount, tokens })
}

/// Cancel every pending contribution of `who` and return the refunded sum.
///
/// Accepted contributions are never touched. Returns `Ok(0)` without writing
/// when nothing is pending.
pub fn refund_pending(env: &Env, who: &Address, record: &mut Participant) -> Result<i128, Error> {
    let mut contributions = storage::load_contributions(env, who);

    let mut refunded: i128 = 0;
    for i in 0..contributions.len() {
        if let Some(mut c) = contributions.get(i) {
            if c.status == ContributionStatus::Pending {
                refunded = add(refunded, c.amount)?;
                c.status = ContributionStatus::Cancelled;
                contributions.set(i, c);
            }
        }
    }
    if refunded == 0 {
        return Ok(0);
    }

    let mut totals = storage::load_totals(env);
    record.pending_total -= refunded;
    record.committed_total -= refunded;
    totals.pending -= refunded;
    totals.committed -= refunded;

    storage::save_contributions(env, who, &contributions);
    storage::save_totals(env, &totals);
    Ok(refunded)
}

/// Participant-initiated cancel of all pending contributions.
pub fn cancel(env: &Env, who: &Address) -> Result<i128, Error> {
    let mut record = storage::load_participant(env, who).ok_or(Error::NothingToCancel)?;
    let refunded = refund_pending(env, who, &mut record)?;
    if refunded == 0 {
        return Err(Error::NothingToCancel);
    }
    storage::save_participant(env, who, &record);
    Ok(refunded)
}

/// Reverse `amount` of accepted currency for `who` at the price of `block`.
///
/// Consumes the newest accepted contributions first. The participant receives
/// `amount` back and hands back the tokens `amount` buys at the current price,
/// capped by the tokens they hold. A contribution can only be reversed out of
/// the part of its acceptance stage the project has not claimed. Fails with
/// `InsufficientBalance` when `amount` exceeds what remains reversible.
pub fn withdraw(
    env: &Env,
    schedule: &StageSchedule,
    who: &Address,
    block: u64,
    amount: i128,
) -> Result<Withdrawal, Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    let current = schedule.stage_at(block)?;
    let price = schedule.stage(current)?.token_price;

    let mut record = storage::load_participant(env, who).ok_or(Error::InsufficientBalance)?;
    if amount > record.withdrawable() {
        return Err(Error::InsufficientBalance);
    }

    let mut contributions = storage::load_contributions(env, who);
    let mut per_stage: Map<u32, i128> = Map::new(env);
    let mut remaining = amount;

    for i in (0..contributions.len()).rev() {
        if remaining == 0 {
            break;
        }
        let Some(mut c) = contributions.get(i) else {
            continue;
        };
        if c.status != ContributionStatus::Accepted {
            continue;
        }
        let stage = c.accepted_stage.unwrap_or(c.stage_index);
        let taken = per_stage.get(stage).unwrap_or(0);
        let take = (c.amount - c.withdrawn)
            .min(remaining)
            .min(unclaimed(env, stage) - taken);
        if take <= 0 {
            continue;
        }
        c.withdrawn += take;
        if c.withdrawn == c.amount {
            c.status = ContributionStatus::Withdrawn;
        }
        per_stage.set(stage, taken + take);
        contributions.set(i, c);
        remaining -= take;
    }
    if remaining > 0 {
        return Err(Error::InsufficientBalance);
    }

    let mut totals = storage::load_totals(env);
    let tokens_returned = tokens_for(amount, price)?.min(record.token_balance);
    record.withdrawn_total = add(record.withdrawn_total, amount)?;
    record.token_balance -= tokens_returned;
    totals.withdrawn = add(totals.withdrawn, amount)?;

    for (stage, taken) in per_stage.iter() {
        storage::set_stage_accepted(env, stage, storage::stage_accepted(env, stage) - taken);
    }
    storage::save_contributions(env, who, &contributions);
    storage::save_participant(env, who, &record);
    storage::save_totals(env, &totals);

    Ok(Withdrawal {
        tokens_returned,
        price,
    })
}
