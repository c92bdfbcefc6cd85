//! # Types
//!
//! Shared data structures used across all modules of the Reversible ICO.
//!
//! ## Design decisions
//!
//! ### Config / Participant / Contribution split
//!
//! The sale is stored as several independent ledger entries:
//!
//! - [`SaleConfig`] and the derived [`Stage`] list: written once by `init`.
//! - [`Participant`]: small per-address summary, rewritten on every action
//!   touching that address.
//! - the participant's [`Contribution`] list: append-only audit trail; entries
//!   change status but are never removed.
//!
//! ### Contribution status as a Finite-State Machine
//!
//! ```text
//! Pending ──► Accepted ──► Withdrawn
//!    └──────► Cancelled
//! ```
//!
//! `Cancelled` and `Withdrawn` are terminal. A partly withdrawn contribution
//! stays `Accepted` and tracks the reversed amount in `withdrawn`.

use soroban_sdk::{contracttype, Address};

/// Base units in one whole sold token (Stellar 7-decimal convention).
///
/// Stage prices are quoted in currency base units per whole token.
pub const TOKEN_UNIT: i128 = 10_000_000;

/// Upper bound on the number of buy stages after the commit phase.
pub const MAX_STAGE_COUNT: u32 = 255;

/// Immutable sale configuration, written once by `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleConfig {
    /// Token being sold; the contract must hold enough of it to settle
    /// accepted contributions.
    pub token_contract: Address,
    /// Token contributions are paid in.
    pub currency_token: Address,
    /// Only identity allowed to approve or reject participants.
    pub whitelist_controller: Address,
    /// Only identity allowed to withdraw released funds.
    pub project_wallet: Address,
    pub commit_phase_start_block: u64,
    pub commit_phase_block_count: u64,
    /// Price of one whole token during the commit phase.
    pub commit_phase_price: i128,
    pub stage_count: u32,
    pub stage_block_count: u64,
    /// Added once per stage index on top of `commit_phase_price`.
    pub stage_price_increase: i128,
}

/// A contiguous block range with a fixed token price.
///
/// Both bounds are inclusive. Index 0 is the commit phase.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stage {
    pub start_block: u64,
    pub end_block: u64,
    pub token_price: i128,
}

/// Coarse lifecycle of the whole sale, derived from the current block.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SaleState {
    /// `init` has not been called.
    Uninitialized,
    /// Configured, commit phase not started yet.
    Initialized,
    /// Current block lies inside the commit phase or one of the stages.
    Running,
    /// Past the last stage's end block.
    Ended,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WhitelistStatus {
    Pending,
    Approved,
    Rejected,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContributionStatus {
    /// Received, waiting for a whitelist decision.
    Pending,
    /// Counted towards the project; may still be reversed.
    Accepted,
    /// Refunded before acceptance.
    Cancelled,
    /// Fully reversed by the participant.
    Withdrawn,
}

/// One commit action. Never deleted.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contribution {
    pub block_number: u64,
    /// Currency received.
    pub amount: i128,
    /// Stage the block resolved to when the commit was recorded.
    pub stage_index: u32,
    /// Price used to settle tokens on acceptance.
    pub token_price: i128,
    pub status: ContributionStatus,
    /// Stage in which the contribution became accepted, if it did.
    pub accepted_stage: Option<u32>,
    /// Currency already returned to the participant out of `amount`.
    pub withdrawn: i128,
}

/// Per-address accounting summary.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Participant {
    pub whitelist_status: WhitelistStatus,
    /// Sum of all contributions that were not cancelled.
    pub committed_total: i128,
    /// Part of `committed_total` still waiting for a whitelist decision.
    pub pending_total: i128,
    /// Currency ever accepted; never decreases.
    pub accepted_total: i128,
    /// Currency returned through `withdraw`; never exceeds `accepted_total`.
    pub withdrawn_total: i128,
    /// Sold tokens delivered and not yet handed back.
    pub token_balance: i128,
    pub contribution_count: u32,
}

impl Participant {
    pub fn new() -> Self {
        Participant {
            whitelist_status: WhitelistStatus::Pending,
            committed_total: 0,
            pending_total: 0,
            accepted_total: 0,
            withdrawn_total: 0,
            token_balance: 0,
            contribution_count: 0,
        }
    }

    /// Accepted currency the participant can still reverse.
    pub fn withdrawable(&self) -> i128 {
        self.accepted_total - self.withdrawn_total
    }
}

impl Default for Participant {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of an entry in the application event log.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ApplicationEventType {
    ContributionNew = 1,
    ContributionCancel = 2,
    ParticipantCancel = 3,
    CommitmentAccepted = 4,
    WhitelistApprove = 5,
    WhitelistReject = 6,
    ProjectWithdraw = 7,
    ParticipantWithdraw = 8,
}

/// Why currency left the contract.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum TransferType {
    AutomaticRefund = 1,
    WhitelistReject = 2,
    ParticipantCancel = 3,
    ParticipantWithdraw = 4,
    ProjectWithdraw = 5,
}

/// Append-only log entry; one per successful state-changing action.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationEvent {
    /// Sequential position in the log, starting at 0.
    pub id: u64,
    pub kind: ApplicationEventType,
    pub participant: Address,
    pub amount: i128,
    pub block_number: u64,
}

/// Aggregate currency totals. Also the output of an event-log replay.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LedgerTotals {
    pub committed: i128,
    pub pending: i128,
    pub accepted: i128,
    pub withdrawn: i128,
    pub project_withdrawn: i128,
}
