//! Integration tests for the emergency alert flow.

use std::sync::Arc;
use std::time::Duration;

use careline_core::{
    AlertState, AlertView, Config, ContactDirectory, EmergencyAlertController, EmergencyContact,
    EmergencySession, Event, Phase, RecordingNotifier, COUNTDOWN_DURATION,
};

fn contact(id: &str, name: &str, relationship: &str) -> EmergencyContact {
    EmergencyContact {
        id: id.into(),
        name: name.into(),
        phone: format!("555-01{id:0>2}"),
        email: None,
        relationship: relationship.into(),
    }
}

#[test]
fn test_two_contact_scenario() {
    let c1 = contact("1", "Sarah Johnson", "Spouse");
    let c2 = contact("2", "Michael Chen", "Physician");
    let notifier = Arc::new(RecordingNotifier::new());
    let mut controller = EmergencyAlertController::new(
        ContactDirectory::new(vec![c1.clone(), c2.clone()]),
        notifier.clone(),
    );

    controller.activate();
    let state = controller.state();
    assert_eq!(state.phase, Phase::CountingDown);
    assert_eq!(state.remaining_secs, 5);

    for _ in 0..5 {
        controller.tick();
    }
    assert_eq!(
        controller.state(),
        AlertState {
            phase: Phase::Active,
            remaining_secs: 0,
            notified_contacts: vec![c1.clone(), c2.clone()],
        }
    );
    assert_eq!(notifier.dispatches(), vec![vec![c1, c2]]);

    controller.cancel();
    assert_eq!(
        controller.state(),
        AlertState {
            phase: Phase::Idle,
            remaining_secs: 5,
            notified_contacts: vec![],
        }
    );
}

#[test]
fn test_cancel_after_three_ticks() {
    let notifier = Arc::new(RecordingNotifier::new());
    let mut controller = EmergencyAlertController::new(ContactDirectory::mock(), notifier.clone());

    controller.activate();
    for _ in 0..3 {
        controller.tick();
    }
    assert_eq!(controller.remaining_secs(), 2);
    controller.cancel();

    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(controller.remaining_secs(), COUNTDOWN_DURATION);
    assert_eq!(notifier.dispatch_count(), 0);
}

#[test]
fn test_escalation_event_carries_full_directory() {
    let notifier = Arc::new(RecordingNotifier::new());
    let directory = ContactDirectory::mock();
    let mut controller = EmergencyAlertController::new(directory.clone(), notifier);
    controller.activate();

    let events: Vec<Event> = (0..COUNTDOWN_DURATION)
        .filter_map(|_| controller.tick())
        .collect();
    assert_eq!(events.len(), COUNTDOWN_DURATION as usize);

    let remaining: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            Event::CountdownTick { remaining_secs, .. } => Some(*remaining_secs),
            _ => None,
        })
        .collect();
    assert_eq!(remaining, [4, 3, 2, 1]);

    match events.last() {
        Some(Event::EmergencyEscalated {
            notified_contacts, ..
        }) => assert_eq!(notified_contacts, directory.contacts()),
        other => panic!("Expected EmergencyEscalated, got {other:?}"),
    }
}

#[test]
fn test_view_walks_through_three_modes() {
    let mut controller = EmergencyAlertController::new(
        ContactDirectory::mock(),
        Arc::new(RecordingNotifier::new()),
    );
    assert!(matches!(
        AlertView::from_state(&controller.state()),
        AlertView::Button { .. }
    ));

    controller.activate();
    controller.tick();
    match AlertView::from_state(&controller.state()) {
        AlertView::Countdown { message, .. } => {
            assert_eq!(message, "Your emergency contacts will be notified in 4 seconds")
        }
        other => panic!("Expected Countdown, got {other:?}"),
    }

    for _ in 0..COUNTDOWN_DURATION {
        controller.tick();
    }
    match AlertView::from_state(&controller.state()) {
        AlertView::Active {
            headline,
            contacted,
            ..
        } => {
            assert_eq!(headline, "Help is on the way!");
            assert_eq!(contacted.len(), 2);
        }
        other => panic!("Expected Active, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_live_session_with_configured_contacts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[emergency]
tick_interval_ms = 1000
share_location = false

[[contacts]]
id = "n1"
name = "Nadia Park"
phone = "555-0199"
relationship = "Friend"
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let session = EmergencySession::from_config(&config).unwrap();
    let mut events = session.subscribe();

    session.activate();
    tokio::time::sleep(Duration::from_millis(4500)).await;
    assert_eq!(session.phase(), Phase::CountingDown);
    assert_eq!(session.state().remaining_secs, 1);

    let state = session.wait_until_settled().await;
    assert_eq!(state.phase, Phase::Active);
    assert_eq!(state.notified_contacts.len(), 1);
    assert_eq!(state.notified_contacts[0].name, "Nadia Park");

    session.cancel();
    assert_eq!(session.state(), AlertState::idle());

    let mut escalations = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, Event::EmergencyEscalated { .. }) {
            escalations += 1;
        }
    }
    assert_eq!(escalations, 1);
}

#[tokio::test(start_paused = true)]
async fn test_im_safe_after_escalation_allows_fresh_activation() {
    let notifier = Arc::new(RecordingNotifier::new());
    let controller = EmergencyAlertController::new(ContactDirectory::mock(), notifier.clone());
    let session = EmergencySession::new(controller, Duration::from_secs(1)).unwrap();

    session.activate();
    session.wait_until_settled().await;
    session.cancel();

    session.activate();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(session.state().remaining_secs, COUNTDOWN_DURATION - 1);
    session.wait_until_settled().await;

    assert_eq!(notifier.dispatch_count(), 2);
}
