//! # Event-log replay
//!
//! Rebuilds currency totals from the application event log alone. The log is
//! the canonical audit record: folding it from an empty state must reproduce
//! the live aggregates exactly.

use soroban_sdk::{Address, Env};

use crate::storage;
use crate::types::{ApplicationEvent, ApplicationEventType, LedgerTotals};
use crate::Error;

/// Fold one event into `totals`.
pub fn apply(totals: &mut LedgerTotals, event: &ApplicationEvent) -> Result<(), Error> {
    let amount = event.amount;
    match event.kind {
        ApplicationEventType::ContributionNew => {
            totals.committed = add(totals.committed, amount)?;
            totals.pending = add(totals.pending, amount)?;
        }
        ApplicationEventType::CommitmentAccepted => {
            totals.committed = add(totals.committed, amount)?;
            totals.accepted = add(totals.accepted, amount)?;
        }
        ApplicationEventType::WhitelistApprove => {
            totals.pending = sub(totals.pending, amount)?;
            totals.accepted = add(totals.accepted, amount)?;
        }
        ApplicationEventType::WhitelistReject
        | ApplicationEventType::ParticipantCancel
        | ApplicationEventType::ContributionCancel => {
            totals.committed = sub(totals.committed, amount)?;
            totals.pending = sub(totals.pending, amount)?;
        }
        ApplicationEventType::ParticipantWithdraw => {
            totals.withdrawn = add(totals.withdrawn, amount)?;
        }
        ApplicationEventType::ProjectWithdraw => {
            totals.project_withdrawn = add(totals.project_withdrawn, amount)?;
        }
    }
    Ok(())
}

/// Replay the whole log from an empty state.
pub fn replay_totals(env: &Env) -> Result<LedgerTotals, Error> {
    replay_filtered(env, None)
}

/// Replay only the entries recorded for `who`.
pub fn replay_participant(env: &Env, who: &Address) -> Result<LedgerTotals, Error> {
    replay_filtered(env, Some(who))
}

fn replay_filtered(env: &Env, who: Option<&Address>) -> Result<LedgerTotals, Error> {
    let mut totals = LedgerTotals::default();
    for id in 0..storage::event_count(env) {
        let Some(event) = storage::load_event(env, id) else {
            continue;
        };
        if let Some(who) = who {
            if &event.participant != who {
                continue;
            }
        }
        apply(&mut totals, &event)?;
    }
    Ok(totals)
}

fn add(a: i128, b: i128) -> Result<i128, Error> {
    a.checked_add(b).ok_or(Error::Overflow)
}

fn sub(a: i128, b: i128) -> Result<i128, Error> {
    a.checked_sub(b).ok_or(Error::Overflow)
}
