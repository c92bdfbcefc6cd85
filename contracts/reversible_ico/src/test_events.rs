extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    vec, Address, IntoVal, TryIntoVal,
};

use crate::events::{SaleInitialized, TransferEvent};
use crate::test::setup_sale;
use crate::{ApplicationEvent, ApplicationEventType, TransferType};

#[test]
fn test_init_event() {
    let sale = setup_sale();
    let env = &sale.env;

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("init"), deployer)
    assert_eq!(last_event.0, sale.client.address);
    let expected_topics = vec![
        env,
        symbol_short!("init").into_val(env),
        sale.deployer.into_val(env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: SaleInitialized = last_event.2.try_into_val(env).unwrap();
    assert_eq!(
        event_data,
        SaleInitialized {
            deployer: sale.deployer.clone(),
            config: sale.config.clone(),
        }
    );
}

#[test]
fn test_commit_event() {
    let sale = setup_sale();
    let env = &sale.env;
    let alice = sale.funded_participant(5_000_000);
    sale.jump_to(1_100);
    sale.client.commit(&alice, &5_000_000);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, sale.client.address);
    let expected_topics = vec![
        env,
        symbol_short!("c_new").into_val(env),
        alice.into_val(env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ApplicationEvent = last_event.2.try_into_val(env).unwrap();
    assert_eq!(
        event_data,
        ApplicationEvent {
            id: 0,
            kind: ApplicationEventType::ContributionNew,
            participant: alice.clone(),
            amount: 5_000_000,
            block_number: 1_100,
        }
    );
}

#[test]
fn test_approved_commit_event() {
    let sale = setup_sale();
    let env = &sale.env;
    let alice = sale.funded_participant(5_000_000);
    sale.client.approve(&sale.controller, &alice);
    sale.jump_to(1_250);
    sale.client.commit(&alice, &5_000_000);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    let expected_topics = vec![
        env,
        symbol_short!("accepted").into_val(env),
        alice.into_val(env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ApplicationEvent = last_event.2.try_into_val(env).unwrap();
    assert_eq!(event_data.id, 1);
    assert_eq!(event_data.kind, ApplicationEventType::CommitmentAccepted);
    assert_eq!(event_data.block_number, 1_250);
}

#[test]
fn test_cancel_emits_transfer_then_log_entry() {
    let sale = setup_sale();
    let env = &sale.env;
    let alice = sale.funded_participant(3_000_000);
    sale.jump_to(1_100);
    sale.client.commit(&alice, &3_000_000);
    sale.client.cancel(&alice);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    let event_data: ApplicationEvent = last_event.2.try_into_val(env).unwrap();
    assert_eq!(event_data.kind, ApplicationEventType::ParticipantCancel);
    assert_eq!(event_data.amount, 3_000_000);

    // Topic: (symbol_short!("transfer"), TransferType)
    let transfer = all_events.get(all_events.len() - 2).unwrap();
    assert_eq!(transfer.0, sale.client.address);
    let expected_topics = vec![
        env,
        symbol_short!("transfer").into_val(env),
        TransferType::ParticipantCancel.into_val(env),
    ];
    assert_eq!(transfer.1, expected_topics);
    let transfer_data: TransferEvent = transfer.2.try_into_val(env).unwrap();
    assert_eq!(
        transfer_data,
        TransferEvent {
            recipient: alice.clone(),
            amount: 3_000_000,
        }
    );
}

#[test]
fn test_project_withdraw_event() {
    let sale = setup_sale();
    let env = &sale.env;
    let alice = sale.funded_participant(4_000_000);
    sale.client.approve(&sale.controller, &alice);
    sale.jump_to(1_100);
    sale.client.commit(&alice, &4_000_000);
    sale.jump_to(1_200);
    sale.client.project_withdraw(&sale.project, &4_000_000);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    let expected_topics = vec![
        env,
        symbol_short!("proj_wdr").into_val(env),
        sale.project.into_val(env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ApplicationEvent = last_event.2.try_into_val(env).unwrap();
    assert_eq!(
        event_data,
        ApplicationEvent {
            id: 2,
            kind: ApplicationEventType::ProjectWithdraw,
            participant: sale.project.clone(),
            amount: 4_000_000,
            block_number: 1_200,
        }
    );
}

#[test]
fn test_freeze_event() {
    let sale = setup_sale();
    let env = &sale.env;
    sale.client.freeze(&sale.deployer);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    let expected_topics = vec![
        env,
        symbol_short!("frozen").into_val(env),
        sale.deployer.into_val(env),
    ];
    assert_eq!(last_event.1, expected_topics);
}

#[test]
fn test_event_log_is_sequential() {
    let sale = setup_sale();
    let alice = sale.funded_participant(10_000_000);
    let bob = Address::generate(&sale.env);
    sale.jump_to(1_100);
    sale.client.commit(&alice, &4_000_000);
    sale.client.commit(&alice, &6_000_000);
    sale.client.reject(&sale.controller, &bob);
    sale.client.approve(&sale.controller, &alice);

    assert_eq!(sale.client.event_count(), 4);
    let log = sale.client.event_log(&0, &10);
    assert_eq!(log.len(), 4);
    for (i, event) in log.iter().enumerate() {
        assert_eq!(event.id, i as u64);
    }
    assert_eq!(log.get(2).unwrap().kind, ApplicationEventType::WhitelistReject);
    assert_eq!(log.get(3).unwrap().amount, 10_000_000);

    let page = sale.client.event_log(&1, &2);
    assert_eq!(page.len(), 2);
    assert_eq!(page.get(0).unwrap().amount, 6_000_000);
    assert_eq!(sale.client.event_log(&4, &10).len(), 0);

    assert_eq!(sale.client.event(&1), log.get(1));
    assert_eq!(sale.client.event(&4), None);
}

#[test]
fn test_event_type_codes() {
    assert_eq!(ApplicationEventType::ContributionNew as u32, 1);
    assert_eq!(ApplicationEventType::ContributionCancel as u32, 2);
    assert_eq!(ApplicationEventType::ParticipantCancel as u32, 3);
    assert_eq!(ApplicationEventType::CommitmentAccepted as u32, 4);
    assert_eq!(ApplicationEventType::WhitelistApprove as u32, 5);
    assert_eq!(ApplicationEventType::WhitelistReject as u32, 6);
    assert_eq!(ApplicationEventType::ProjectWithdraw as u32, 7);
    assert_eq!(ApplicationEventType::ParticipantWithdraw as u32, 8);

    assert_eq!(TransferType::AutomaticRefund as u32, 1);
    assert_eq!(TransferType::ProjectWithdraw as u32, 5);
}
