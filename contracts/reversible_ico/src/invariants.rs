#![allow(dead_code)]

extern crate std;

use soroban_sdk::Vec;

use crate::types::{Contribution, ContributionStatus, LedgerTotals, Participant, Stage};

/// INV-1: Stages are contiguous and non-overlapping.
pub fn assert_stages_contiguous(stages: &Vec<Stage>) {
    for i in 1..stages.len() {
        let prev = stages.get(i - 1).unwrap();
        let next = stages.get(i).unwrap();
        assert!(
            prev.start_block <= prev.end_block,
            "INV-1 violated: stage {} ends before it starts",
            i - 1
        );
        assert_eq!(
            prev.end_block + 1,
            next.start_block,
            "INV-1 violated: gap or overlap between stage {} and {}",
            i - 1,
            i
        );
    }
}

/// INV-2: Token price strictly increases with the stage index.
pub fn assert_prices_increasing(stages: &Vec<Stage>) {
    for i in 1..stages.len() {
        let prev = stages.get(i - 1).unwrap();
        let next = stages.get(i).unwrap();
        assert!(
            next.token_price > prev.token_price,
            "INV-2 violated: price of stage {} ({}) is not above stage {} ({})",
            i,
            next.token_price,
            i - 1,
            prev.token_price
        );
    }
}

/// INV-3: committed total equals the sum of all non-cancelled contributions,
/// and pending total equals the sum of pending ones.
pub fn assert_sum_invariant(participant: &Participant, contributions: &Vec<Contribution>) {
    let mut committed = 0i128;
    let mut pending = 0i128;
    for c in contributions.iter() {
        if c.status != ContributionStatus::Cancelled {
            committed += c.amount;
        }
        if c.status == ContributionStatus::Pending {
            pending += c.amount;
        }
    }
    assert_eq!(
        participant.committed_total, committed,
        "INV-3 violated: committed_total {} != contribution sum {}",
        participant.committed_total, committed
    );
    assert_eq!(
        participant.pending_total, pending,
        "INV-3 violated: pending_total {} != pending sum {}",
        participant.pending_total, pending
    );
    assert_eq!(participant.contribution_count, contributions.len());
}

/// INV-4: Withdrawals never exceed what was accepted, and acceptance never
/// exceeds what was committed.
pub fn assert_reversibility(participant: &Participant) {
    assert!(
        participant.withdrawn_total >= 0 && participant.accepted_total >= 0,
        "INV-4 violated: negative totals"
    );
    assert!(
        participant.withdrawn_total <= participant.accepted_total,
        "INV-4 violated: withdrawn {} > accepted {}",
        participant.withdrawn_total,
        participant.accepted_total
    );
    assert!(
        participant.accepted_total <= participant.committed_total,
        "INV-4 violated: accepted {} > committed {}",
        participant.accepted_total,
        participant.committed_total
    );
    assert!(participant.token_balance >= 0, "INV-4 violated: negative token balance");
}

/// INV-5: Per-contribution withdrawn amounts add up to the participant total.
pub fn assert_withdrawn_attribution(participant: &Participant, contributions: &Vec<Contribution>) {
    let mut withdrawn = 0i128;
    for c in contributions.iter() {
        assert!(c.withdrawn <= c.amount, "INV-5 violated: contribution over-withdrawn");
        if c.status == ContributionStatus::Withdrawn {
            assert_eq!(c.withdrawn, c.amount);
        }
        withdrawn += c.withdrawn;
    }
    assert_eq!(participant.withdrawn_total, withdrawn);
}

/// INV-6: Replaying the event log reproduces the live aggregates.
pub fn assert_totals_match(live: &LedgerTotals, replayed: &LedgerTotals) {
    assert_eq!(live, replayed, "INV-6 violated: replayed totals diverge from ledger");
}

/// INV-7: Replaying one participant's events reproduces their record.
pub fn assert_participant_matches_replay(participant: &Participant, replayed: &LedgerTotals) {
    assert_eq!(participant.committed_total, replayed.committed);
    assert_eq!(participant.pending_total, replayed.pending);
    assert_eq!(participant.accepted_total, replayed.accepted);
    assert_eq!(participant.withdrawn_total, replayed.withdrawn);
}

/// Run all per-participant invariants.
pub fn assert_all_participant_invariants(participant: &Participant, contributions: &Vec<Contribution>) {
    assert_sum_invariant(participant, contributions);
    assert_reversibility(participant);
    assert_withdrawn_attribution(participant, contributions);
}
