//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by the sale:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key          | Type           | Description                          |
//! |--------------|----------------|--------------------------------------|
//! | `Config`     | `SaleConfig`   | Immutable sale configuration         |
//! | `Deployer`   | `Address`      | Address that called `init`           |
//! | `Stages`     | `Vec<Stage>`   | Derived stage list, index 0 = commit |
//! | `Frozen`     | `bool`         | Emergency stop flag                  |
//! | `Totals`     | `LedgerTotals` | Global currency aggregates           |
//! | `EventCount` | `u64`          | Length of the application event log  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                  | Type                | Description                           |
//! |----------------------|---------------------|---------------------------------------|
//! | `Participant(addr)`  | `Participant`       | Per-address accounting summary        |
//! | `Contributions(addr)`| `Vec<Contribution>` | Per-address audit trail               |
//! | `StageAccepted(i)`   | `i128`              | Reversible accepted currency of stage |
//! | `StageClaimed(i)`    | `i128`              | Part of `StageAccepted(i)` paid out   |
//! | `Event(id)`          | `ApplicationEvent`  | Application event log entry           |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{ApplicationEvent, Contribution, LedgerTotals, Participant, SaleConfig, Stage};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Config,
    Deployer,
    Stages,
    Frozen,
    Totals,
    EventCount,
    Participant(Address),
    Contributions(Address),
    StageAccepted(u32),
    StageClaimed(u32),
    Event(u64),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

/// Load the sale configuration, failing with `NotInitialized` before `init`.
pub fn load_config(env: &Env) -> Result<SaleConfig, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn save_config(env: &Env, config: &SaleConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

pub fn load_deployer(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Deployer)
}

pub fn save_deployer(env: &Env, deployer: &Address) {
    env.storage().instance().set(&DataKey::Deployer, deployer);
}

pub fn load_stages(env: &Env) -> Vec<Stage> {
    env.storage()
        .instance()
        .get(&DataKey::Stages)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn save_stages(env: &Env, stages: &Vec<Stage>) {
    env.storage().instance().set(&DataKey::Stages, stages);
}

pub fn is_frozen(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Frozen)
        .unwrap_or(false)
}

pub fn set_frozen(env: &Env, frozen: bool) {
    env.storage().instance().set(&DataKey::Frozen, &frozen);
    bump_instance(env);
}

pub fn load_totals(env: &Env) -> LedgerTotals {
    env.storage()
        .instance()
        .get(&DataKey::Totals)
        .unwrap_or_default()
}

pub fn save_totals(env: &Env, totals: &LedgerTotals) {
    env.storage().instance().set(&DataKey::Totals, totals);
}

pub fn event_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::EventCount)
        .unwrap_or(0)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Read a persistent entry, bumping its TTL only when it exists.
fn get_persistent<T>(env: &Env, key: &DataKey) -> Option<T>
where
    T: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

fn set_persistent<T>(env: &Env, key: &DataKey, value: &T)
where
    T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    bump_persistent(env, key);
}

pub fn load_participant(env: &Env, who: &Address) -> Option<Participant> {
    get_persistent(env, &DataKey::Participant(who.clone()))
}

pub fn save_participant(env: &Env, who: &Address, participant: &Participant) {
    set_persistent(env, &DataKey::Participant(who.clone()), participant);
}

/// Contributions of `who` in commit order; empty for unknown addresses.
pub fn load_contributions(env: &Env, who: &Address) -> Vec<Contribution> {
    get_persistent(env, &DataKey::Contributions(who.clone())).unwrap_or_else(|| Vec::new(env))
}

pub fn save_contributions(env: &Env, who: &Address, contributions: &Vec<Contribution>) {
    set_persistent(env, &DataKey::Contributions(who.clone()), contributions);
}

/// Accepted, not yet reversed currency attributed to `stage`.
pub fn stage_accepted(env: &Env, stage: u32) -> i128 {
    get_persistent(env, &DataKey::StageAccepted(stage)).unwrap_or(0)
}

pub fn set_stage_accepted(env: &Env, stage: u32, amount: i128) {
    set_persistent(env, &DataKey::StageAccepted(stage), &amount);
}

/// Currency of `stage` already paid out to the project wallet.
pub fn stage_claimed(env: &Env, stage: u32) -> i128 {
    get_persistent(env, &DataKey::StageClaimed(stage)).unwrap_or(0)
}

pub fn set_stage_claimed(env: &Env, stage: u32, amount: i128) {
    set_persistent(env, &DataKey::StageClaimed(stage), &amount);
}

/// Append `event` at the end of the log. The caller assigns `event.id`
/// from [`event_count`].
pub fn append_event(env: &Env, event: &ApplicationEvent) {
    set_persistent(env, &DataKey::Event(event.id), event);
    env.storage()
        .instance()
        .set(&DataKey::EventCount, &(event.id + 1));
}

pub fn load_event(env: &Env, id: u64) -> Option<ApplicationEvent> {
    get_persistent(env, &DataKey::Event(id))
}
