use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::storage;
use crate::types::{ApplicationEvent, ApplicationEventType, SaleConfig, TransferType};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleInitialized {
    pub deployer: Address,
    pub config: SaleConfig,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferEvent {
    pub recipient: Address,
    pub amount: i128,
}

/// Append an entry to the application event log and publish it.
///
/// Topic: `(kind_symbol, participant)`. Data: the stored [`ApplicationEvent`].
pub fn log_application_event(
    env: &Env,
    kind: ApplicationEventType,
    participant: &Address,
    amount: i128,
    block_number: u64,
) -> ApplicationEvent {
    let event = ApplicationEvent {
        id: storage::event_count(env),
        kind,
        participant: participant.clone(),
        amount,
        block_number,
    };
    storage::append_event(env, &event);

    let topics = (kind_to_symbol(kind), participant.clone());
    env.events().publish(topics, event.clone());
    event
}

/// Publish an outbound currency movement.
pub fn emit_transfer(env: &Env, kind: TransferType, recipient: Address, amount: i128) {
    let topics = (symbol_short!("transfer"), kind);
    let data = TransferEvent { recipient, amount };
    env.events().publish(topics, data);
}

pub fn emit_initialized(env: &Env, deployer: Address, config: SaleConfig) {
    let topics = (symbol_short!("init"), deployer.clone());
    let data = SaleInitialized { deployer, config };
    env.events().publish(topics, data);
}

pub fn emit_frozen(env: &Env, caller: Address) {
    env.events().publish((symbol_short!("frozen"), caller), ());
}

pub fn emit_unfrozen(env: &Env, caller: Address) {
    env.events().publish((symbol_short!("unfrozen"), caller), ());
}

pub fn kind_to_symbol(kind: ApplicationEventType) -> Symbol {
    match kind {
        ApplicationEventType::ContributionNew => symbol_short!("c_new"),
        ApplicationEventType::ContributionCancel => symbol_short!("c_cancel"),
        ApplicationEventType::ParticipantCancel => symbol_short!("p_cancel"),
        ApplicationEventType::CommitmentAccepted => symbol_short!("accepted"),
        ApplicationEventType::WhitelistApprove => symbol_short!("wl_apprv"),
        ApplicationEventType::WhitelistReject => symbol_short!("wl_reject"),
        ApplicationEventType::ProjectWithdraw => symbol_short!("proj_wdr"),
        ApplicationEventType::ParticipantWithdraw => symbol_short!("p_withdr"),
    }
}
