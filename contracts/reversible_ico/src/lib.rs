//! # Reversible ICO Contract
//!
//! A token sale in which participants commit currency during a commit phase
//! and a sequence of buy stages with rising token price, and can reverse
//! accepted contributions until the project withdraws the matching funds.
//! The single Soroban contract `ReversibleIco` exposes:
//!
//! | Phase        | Entry Point(s)                                        |
//! |--------------|-------------------------------------------------------|
//! | Bootstrap    | [`ReversibleIco::init`]                               |
//! | Emergency    | `freeze`, `unfreeze`                                  |
//! | Contributing | `commit`, `cancel`, `withdraw`, `refund_expired`      |
//! | Whitelist    | `approve`, `reject`                                   |
//! | Project      | `available_for_project_withdrawal`, `project_withdraw`|
//! | Schedule     | `stage`, `stages`, `stage_at_block`, `current_stage`  |
//! | Audit        | `event`, `event_log`, `totals`, `replay_totals`       |
//!
//! ## Architecture
//!
//! Stage arithmetic lives in [`stages`], accounting in `ledger`, whitelist
//! decisions in `whitelist`, release gating in `withdrawal` and
//! authorization in [`rbac`]. This file holds the entry points: it checks
//! preconditions, calls into those modules, moves tokens and appends exactly
//! one application event per successful state change.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, log, token, Address, Env, Vec};

pub mod events;
pub mod rbac;
pub mod stages;
mod ledger;
mod replay;
mod storage;
mod types;
mod whitelist;
mod withdrawal;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

pub use rbac::Role;
pub use stages::StageSchedule;
pub use types::{
    ApplicationEvent, ApplicationEventType, Contribution, ContributionStatus, LedgerTotals,
    Participant, SaleConfig, SaleState, Stage, TransferType, WhitelistStatus, MAX_STAGE_COUNT,
    TOKEN_UNIT,
};

use stages::current_block_number;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Block outside of the sale period.
    OutOfRange = 1,
    Unauthorized = 2,
    AlreadyInitialized = 3,
    SaleFrozen = 4,
    /// Conflicting whitelist decision, or commit by a rejected participant.
    StatusLocked = 5,
    NothingToCancel = 6,
    InsufficientBalance = 7,
    ExceedsAvailable = 8,
    NotInitialized = 9,
    InvalidConfig = 10,
    InvalidAmount = 11,
    Overflow = 12,
    SaleNotEnded = 13,
}

#[contract]
pub struct ReversibleIco;

#[contractimpl]
impl ReversibleIco {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Configure the sale and derive its stage schedule.
    ///
    /// Must be called exactly once. `deployer` must sign and becomes the
    /// only address allowed to freeze the sale.
    pub fn init(env: Env, deployer: Address, config: SaleConfig) -> Result<(), Error> {
        deployer.require_auth();
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        let schedule = StageSchedule::from_config(&config);
        schedule.validate()?;
        if config.commit_phase_start_block <= current_block_number(&env) {
            return Err(Error::InvalidConfig);
        }
        let stages = schedule.build(&env)?;

        rbac::init_roles(
            &env,
            &deployer,
            &config.whitelist_controller,
            &config.project_wallet,
        )?;
        storage::save_config(&env, &config);
        storage::save_stages(&env, &stages);
        storage::set_frozen(&env, false);

        events::emit_initialized(&env, deployer, config);
        Ok(())
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::is_initialized(&env)
    }

    pub fn config(env: Env) -> Result<SaleConfig, Error> {
        storage::load_config(&env)
    }

    pub fn deployer(env: Env) -> Option<Address> {
        storage::load_deployer(&env)
    }

    /// Every role held by `address`.
    pub fn roles_of(env: Env, address: Address) -> Vec<Role> {
        rbac::roles_of(&env, &address)
    }

    pub fn has_role(env: Env, address: Address, role: Role) -> bool {
        rbac::has_role(&env, &address, role)
    }

    // ─────────────────────────────────────────────────────────
    // Emergency Control
    // ─────────────────────────────────────────────────────────

    /// Freeze the sale: every action that moves funds or tokens fails with
    /// `SaleFrozen` until `unfreeze`.
    pub fn freeze(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        Self::load_schedule(&env)?;
        rbac::require_deployer(&env, &caller)?;
        storage::set_frozen(&env, true);
        events::emit_frozen(&env, caller);
        Ok(())
    }

    pub fn unfreeze(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        Self::load_schedule(&env)?;
        rbac::require_deployer(&env, &caller)?;
        storage::set_frozen(&env, false);
        events::emit_unfrozen(&env, caller);
        Ok(())
    }

    pub fn is_frozen(env: Env) -> bool {
        storage::is_frozen(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Schedule
    // ─────────────────────────────────────────────────────────

    pub fn current_block(env: Env) -> u64 {
        current_block_number(&env)
    }

    pub fn sale_state(env: Env) -> Result<SaleState, Error> {
        match Self::load_schedule(&env) {
            Ok(schedule) => schedule.state_at(current_block_number(&env)),
            Err(Error::NotInitialized) => Ok(SaleState::Uninitialized),
            Err(e) => Err(e),
        }
    }

    pub fn stage_count(env: Env) -> Result<u32, Error> {
        Ok(Self::load_schedule(&env)?.stage_count())
    }

    pub fn stage(env: Env, index: u32) -> Result<Stage, Error> {
        storage::load_stages(&env)
            .get(index)
            .ok_or(Error::OutOfRange)
    }

    pub fn stages(env: Env) -> Vec<Stage> {
        storage::load_stages(&env)
    }

    /// Index of the stage containing `block`; `OutOfRange` outside the sale.
    pub fn stage_at_block(env: Env, block: u64) -> Result<u32, Error> {
        Self::load_schedule(&env)?.stage_at(block)
    }

    pub fn price_at_block(env: Env, block: u64) -> Result<i128, Error> {
        Self::load_schedule(&env)?.price_at(block)
    }

    /// Stage of the current block. `OutOfRange` before the commit phase and
    /// once the sale period is over.
    pub fn current_stage(env: Env) -> Result<u32, Error> {
        Self::load_schedule(&env)?.stage_at(current_block_number(&env))
    }

    pub fn current_price(env: Env) -> Result<i128, Error> {
        Self::load_schedule(&env)?.price_at(current_block_number(&env))
    }

    /// First block after the commit phase.
    pub fn buy_phase_start_block(env: Env) -> Result<u64, Error> {
        Ok(Self::load_schedule(&env)?.stage(1)?.start_block)
    }

    pub fn buy_phase_end_block(env: Env) -> Result<u64, Error> {
        Self::load_schedule(&env)?.last_block()
    }

    // ─────────────────────────────────────────────────────────
    // Participant actions
    // ─────────────────────────────────────────────────────────

    /// Commit `amount` of currency at the current block's price.
    ///
    /// Approved participants are accepted immediately and receive their tokens;
    /// everyone else waits for the whitelist controller.
    pub fn commit(env: Env, participant: Address, amount: i128) -> Result<Contribution, Error> {
        participant.require_auth();
        let (config, schedule) = Self::load_sale(&env)?;
        Self::require_not_frozen(&env)?;

        let block = current_block_number(&env);
        let receipt = ledger::commit(&env, &schedule, &participant, block, amount)?;

        let contract = env.current_contract_address();
        token::Client::new(&env, &config.currency_token).transfer(&participant, &contract, &amount);
        if receipt.tokens > 0 {
            token::Client::new(&env, &config.token_contract).transfer(
                &contract,
                &participant,
                &receipt.tokens,
            );
        }

        let kind = if receipt.accepted {
            ApplicationEventType::CommitmentAccepted
        } else {
            ApplicationEventType::ContributionNew
        };
        events::log_application_event(&env, kind, &participant, amount, block);
        Ok(receipt.contribution)
    }

    /// Refund every pending (not yet accepted) contribution of `participant`.
    pub fn cancel(env: Env, participant: Address) -> Result<i128, Error> {
        participant.require_auth();
        let (config, _) = Self::load_sale(&env)?;
        Self::require_not_frozen(&env)?;

        let refunded = ledger::cancel(&env, &participant)?;
        Self::pay_out(
            &env,
            &config,
            TransferType::ParticipantCancel,
            &participant,
            refunded,
        );
        events::log_application_event(
            &env,
            ApplicationEventType::ParticipantCancel,
            &participant,
            refunded,
            current_block_number(&env),
        );
        Ok(refunded)
    }

    /// Reverse `amount` of accepted currency at the current stage price.
    ///
    /// The participant gets `amount` back and returns the tokens `amount` buys
    /// now. Returns the number of tokens handed back.
    pub fn withdraw(env: Env, participant: Address, amount: i128) -> Result<i128, Error> {
        participant.require_auth();
        let (config, schedule) = Self::load_sale(&env)?;
        Self::require_not_frozen(&env)?;

        let block = current_block_number(&env);
        let withdrawal = ledger::withdraw(&env, &schedule, &participant, block, amount)?;
        log!(
            &env,
            "withdraw settled",
            withdrawal.price,
            withdrawal.tokens_returned
        );

        if withdrawal.tokens_returned > 0 {
            token::Client::new(&env, &config.token_contract).transfer(
                &participant,
                &env.current_contract_address(),
                &withdrawal.tokens_returned,
            );
        }
        Self::pay_out(
            &env,
            &config,
            TransferType::ParticipantWithdraw,
            &participant,
            amount,
        );
        events::log_application_event(
            &env,
            ApplicationEventType::ParticipantWithdraw,
            &participant,
            amount,
            block,
        );
        Ok(withdrawal.tokens_returned)
    }

    /// After the sale has ended, refund contributions of `participant` that
    /// never received a whitelist decision. Anyone may trigger it.
    pub fn refund_expired(env: Env, caller: Address, participant: Address) -> Result<i128, Error> {
        caller.require_auth();
        let (config, schedule) = Self::load_sale(&env)?;
        Self::require_not_frozen(&env)?;

        let block = current_block_number(&env);
        if schedule.state_at(block)? != SaleState::Ended {
            return Err(Error::SaleNotEnded);
        }
        let refunded = ledger::cancel(&env, &participant)?;
        Self::pay_out(
            &env,
            &config,
            TransferType::AutomaticRefund,
            &participant,
            refunded,
        );
        events::log_application_event(
            &env,
            ApplicationEventType::ContributionCancel,
            &participant,
            refunded,
            block,
        );
        Ok(refunded)
    }

    // ─────────────────────────────────────────────────────────
    // Whitelist
    // ─────────────────────────────────────────────────────────

    /// Approve `participant` and accept their pending contributions.
    ///
    /// - `caller` must be the whitelist controller.
    /// - Approving twice is a no-op; approving a rejected participant fails
    ///   with `StatusLocked`.
    pub fn approve(env: Env, caller: Address, participant: Address) -> Result<(), Error> {
        caller.require_auth();
        let (config, schedule) = Self::load_sale(&env)?;
        rbac::require_whitelist_controller(&env, &caller)?;
        Self::require_not_frozen(&env)?;

        let block = current_block_number(&env);
        let Some(acceptance) = whitelist::approve(&env, &schedule, &participant, block)? else {
            return Ok(());
        };
        if acceptance.tokens > 0 {
            token::Client::new(&env, &config.token_contract).transfer(
                &env.current_contract_address(),
                &participant,
                &acceptance.tokens,
            );
        }
        events::log_application_event(
            &env,
            ApplicationEventType::WhitelistApprove,
            &participant,
            acceptance.amount,
            block,
        );
        Ok(())
    }

    /// Reject `participant` and refund their pending contributions.
    ///
    /// - `caller` must be the whitelist controller.
    /// - Rejecting twice is a no-op; rejecting an approved participant fails
    ///   with `StatusLocked`.
    pub fn reject(env: Env, caller: Address, participant: Address) -> Result<(), Error> {
        caller.require_auth();
        let (config, _) = Self::load_sale(&env)?;
        rbac::require_whitelist_controller(&env, &caller)?;
        Self::require_not_frozen(&env)?;

        let Some(refunded) = whitelist::reject(&env, &participant)? else {
            return Ok(());
        };
        Self::pay_out(
            &env,
            &config,
            TransferType::WhitelistReject,
            &participant,
            refunded,
        );
        events::log_application_event(
            &env,
            ApplicationEventType::WhitelistReject,
            &participant,
            refunded,
            current_block_number(&env),
        );
        Ok(())
    }

    pub fn whitelist_status(env: Env, participant: Address) -> WhitelistStatus {
        whitelist::status_of(&env, &participant)
    }

    // ─────────────────────────────────────────────────────────
    // Project withdrawal
    // ─────────────────────────────────────────────────────────

    /// Accepted funds from stages before the current one, minus what the
    /// project already withdrew.
    pub fn available_for_project_withdrawal(env: Env) -> Result<i128, Error> {
        let schedule = Self::load_schedule(&env)?;
        withdrawal::available(&env, &schedule, current_block_number(&env))
    }

    /// Transfer `amount` of released funds to the project wallet.
    pub fn project_withdraw(env: Env, caller: Address, amount: i128) -> Result<(), Error> {
        caller.require_auth();
        let (config, schedule) = Self::load_sale(&env)?;
        rbac::require_project_wallet(&env, &caller)?;
        Self::require_not_frozen(&env)?;

        let block = current_block_number(&env);
        withdrawal::withdraw(&env, &schedule, block, amount)?;
        Self::pay_out(
            &env,
            &config,
            TransferType::ProjectWithdraw,
            &config.project_wallet,
            amount,
        );
        events::log_application_event(
            &env,
            ApplicationEventType::ProjectWithdraw,
            &caller,
            amount,
            block,
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn participant(env: Env, address: Address) -> Option<Participant> {
        storage::load_participant(&env, &address)
    }

    pub fn contributions(env: Env, address: Address) -> Vec<Contribution> {
        storage::load_contributions(&env, &address)
    }

    pub fn totals(env: Env) -> LedgerTotals {
        storage::load_totals(&env)
    }

    pub fn event_count(env: Env) -> u64 {
        storage::event_count(&env)
    }

    pub fn event(env: Env, id: u64) -> Option<ApplicationEvent> {
        storage::load_event(&env, id)
    }

    /// Up to `limit` log entries starting at `start`, in append order.
    pub fn event_log(env: Env, start: u64, limit: u32) -> Vec<ApplicationEvent> {
        let mut out = Vec::new(&env);
        let end = storage::event_count(&env).min(start.saturating_add(limit as u64));
        for id in start..end {
            if let Some(event) = storage::load_event(&env, id) {
                out.push_back(event);
            }
        }
        out
    }

    /// Totals rebuilt from the event log alone.
    pub fn replay_totals(env: Env) -> Result<LedgerTotals, Error> {
        replay::replay_totals(&env)
    }

    /// `participant`'s totals rebuilt from their log entries alone.
    pub fn replay_participant(env: Env, participant: Address) -> Result<LedgerTotals, Error> {
        replay::replay_participant(&env, &participant)
    }

    // ─────────────────────────────────────────────────────────
    // Internal Helpers
    // ─────────────────────────────────────────────────────────

    fn load_schedule(env: &Env) -> Result<StageSchedule, Error> {
        Ok(StageSchedule::from_config(&storage::load_config(env)?))
    }

    fn load_sale(env: &Env) -> Result<(SaleConfig, StageSchedule), Error> {
        let config = storage::load_config(env)?;
        let schedule = StageSchedule::from_config(&config);
        Ok((config, schedule))
    }

    fn require_not_frozen(env: &Env) -> Result<(), Error> {
        if storage::is_frozen(env) {
            return Err(Error::SaleFrozen);
        }
        Ok(())
    }

    /// Send `amount` of currency from the contract and publish why.
    fn pay_out(
        env: &Env,
        config: &SaleConfig,
        kind: TransferType,
        recipient: &Address,
        amount: i128,
    ) {
        if amount <= 0 {
            return;
        }
        token::Client::new(env, &config.currency_token).transfer(
            &env.current_contract_address(),
            recipient,
            &amount,
        );
        events::emit_transfer(env, kind, recipient.clone(), amount);
    }
}
