//! The async store executes the reducer's delayed ticks for real.

#![allow(clippy::unwrap_used)]

use chrono::Duration;
use greed_ticket::{
    IssueRequest, LifecycleStatus, LocationId, Purpose, StaticWallet, TicketAction,
    TicketConfig, TicketEnvironment, TicketLifecycleController, TicketStore, ticket_store,
};
use greed_ticket_core::environment::Clock;
use greed_ticket_testing::{ManualClock, test_clock};
use std::sync::Arc;
use std::time::Duration as StdDuration;

const WAIT: StdDuration = StdDuration::from_secs(5);

fn setup() -> (TicketStore, Arc<ManualClock>) {
    greed_ticket_testing::init_test_tracing();

    let clock = Arc::new(ManualClock::new(test_clock().now()));
    let config = TicketConfig {
        tick_interval_ms: 10,
        ..TicketConfig::default()
    };
    let env = TicketEnvironment::new(
        clock.clone(),
        Arc::new(StaticWallet::new("user-42", 12_000)),
        config,
    );
    (ticket_store(env), clock)
}

fn request() -> IssueRequest {
    IssueRequest::new(Purpose::CashPickup, 300, LocationId::new("counter-2"))
}

async fn wait_for_status(store: &TicketStore, status: LifecycleStatus) {
    tokio::time::timeout(WAIT, async {
        while store.state(|s| s.status).await != status {
            tokio::time::sleep(StdDuration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn ticks_count_down_until_expiry() {
    let (store, clock) = setup();
    store
        .send(TicketAction::IssueTicket { request: request() })
        .await
        .unwrap();

    clock.advance(Duration::minutes(26));
    tokio::time::timeout(WAIT, async {
        while !store.state(|s| s.low_time).await {
            tokio::time::sleep(StdDuration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(store.state(|s| s.remaining).await, Duration::minutes(4));

    clock.advance(Duration::minutes(4));
    wait_for_status(&store, LifecycleStatus::Expired).await;

    assert_eq!(store.state(|s| s.remaining).await, Duration::zero());
    assert_eq!(store.state(|s| s.active_count()).await, 0);

    // Expiry ends the tick chain
    store.shutdown(StdDuration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn regenerate_leaves_a_single_live_timer() {
    let (store, clock) = setup();
    store
        .send(TicketAction::IssueTicket { request: request() })
        .await
        .unwrap();
    let old_id = store
        .state(|s| s.current.as_ref().map(|t| t.ticket_id()))
        .await
        .unwrap();

    clock.advance(Duration::seconds(1));
    store.send(TicketAction::RegenerateTicket).await.unwrap();
    let new_id = store
        .state(|s| s.current.as_ref().map(|t| t.ticket_id()))
        .await
        .unwrap();
    assert_ne!(old_id, new_id);

    // Let the old chain deliver its last, ignored tick
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    let mut actions = store.subscribe_actions();
    let mut seen = Vec::new();
    let _ = tokio::time::timeout(StdDuration::from_millis(100), async {
        while let Ok(action) = actions.recv().await {
            if let TicketAction::Tick { ticket_id, .. } = action {
                seen.push(ticket_id);
            }
        }
    })
    .await;

    assert!(!seen.is_empty());
    assert!(seen.iter().all(|id| *id == new_id));
}

#[tokio::test]
async fn invalidate_stops_ticking() {
    let (store, clock) = setup();
    store
        .send(TicketAction::IssueTicket { request: request() })
        .await
        .unwrap();
    store.send(TicketAction::InvalidateTicket).await.unwrap();

    clock.advance(Duration::hours(1));
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    assert_eq!(store.state(|s| s.status).await, LifecycleStatus::NoTicket);
    assert_eq!(store.state(|s| s.history.len()).await, 1);
    store.shutdown(StdDuration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn rejected_command_schedules_nothing() {
    let (store, _) = setup();
    let mut handle = store
        .send(TicketAction::IssueTicket {
            request: IssueRequest::new(Purpose::Merchandise, 0, LocationId::new("c")),
        })
        .await
        .unwrap();

    handle
        .wait_with_timeout(StdDuration::from_millis(100))
        .await
        .unwrap();
    assert_eq!(handle.pending(), 0);
    assert!(store.state(|s| s.last_error.is_some()).await);
    assert_eq!(store.state(|s| s.status).await, LifecycleStatus::NoTicket);
}

#[tokio::test]
async fn caller_ticks_never_add_a_timer() {
    let (store, _) = setup();
    store
        .send(TicketAction::IssueTicket { request: request() })
        .await
        .unwrap();
    let ticket_id = store
        .state(|s| s.current.as_ref().map(|t| t.ticket_id()))
        .await
        .unwrap();

    for _ in 0..4 {
        store
            .send(TicketAction::Tick {
                ticket_id,
                generation: 0,
            })
            .await
            .unwrap();
    }
    let live = store.state(|s| s.timer_generation).await;
    store
        .send(TicketAction::Tick {
            ticket_id,
            generation: live,
        })
        .await
        .unwrap();

    // The superseded delay still fires once, then only one chain remains
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    let mut actions = store.subscribe_actions();
    let mut generations = Vec::new();
    let _ = tokio::time::timeout(StdDuration::from_millis(100), async {
        while let Ok(action) = actions.recv().await {
            if let TicketAction::Tick { generation, .. } = action {
                generations.push(generation);
            }
        }
    })
    .await;

    assert!(!generations.is_empty());
    assert!(generations.len() <= 12, "too many ticks: {generations:?}");
    assert!(
        generations.windows(2).all(|w| w[1] == w[0] + 1),
        "ticks from more than one chain: {generations:?}"
    );
}

#[tokio::test]
async fn sent_issued_event_is_refused() {
    let (store, clock) = setup();
    store
        .send(TicketAction::IssueTicket { request: request() })
        .await
        .unwrap();
    let original = store.state(|s| s.current.clone()).await.unwrap();

    let mut rich = TicketLifecycleController::new(TicketEnvironment::new(
        clock.clone(),
        Arc::new(StaticWallet::new("user-42", 1_000_000)),
        TicketConfig::default(),
    ));
    let forged = rich
        .issue(IssueRequest::new(
            Purpose::GadgetRedemption,
            999_999,
            LocationId::new("counter-2"),
        ))
        .unwrap()
        .clone();

    store
        .send(TicketAction::TicketIssued { ticket: forged })
        .await
        .unwrap();

    let (current, history_len) = store
        .state(|s| (s.current.clone(), s.history.len()))
        .await;
    assert_eq!(current, Some(original));
    assert_eq!(history_len, 0);

    // The real ticket keeps its timer and still expires
    clock.advance(Duration::minutes(30));
    wait_for_status(&store, LifecycleStatus::Expired).await;
    store.shutdown(StdDuration::from_secs(1)).await.unwrap();
}
