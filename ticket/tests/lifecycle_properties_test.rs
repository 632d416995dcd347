//! Property tests over random sequences of lifecycle operations.

#![allow(clippy::unwrap_used)]

use chrono::Duration;
use greed_ticket::{
    IssueRequest, LifecycleStatus, LocationId, Purpose, StaticWallet, TicketConfig,
    TicketEnvironment, TicketLifecycleController, TicketStatus,
};
use greed_ticket_core::environment::Clock;
use greed_ticket_testing::{ManualClock, test_clock};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone, Debug)]
enum Op {
    Issue(i64),
    Regenerate,
    Invalidate,
    Tick(i64),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-100i64..2000).prop_map(Op::Issue),
        Just(Op::Regenerate),
        Just(Op::Invalidate),
        (0i64..900).prop_map(Op::Tick),
    ]
}

fn controller() -> (TicketLifecycleController, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(test_clock().now()));
    let env = TicketEnvironment::new(
        clock.clone(),
        Arc::new(StaticWallet::new("user-42", 1000)),
        TicketConfig::default(),
    );
    (TicketLifecycleController::new(env), clock)
}

fn apply(controller: &mut TicketLifecycleController, clock: &ManualClock, op: &Op) {
    match op {
        Op::Issue(amount) => {
            let request = IssueRequest::new(Purpose::Merchandise, *amount, LocationId::new("c"));
            let _ = controller.issue(request);
        },
        Op::Regenerate => {
            let _ = controller.regenerate();
        },
        Op::Invalidate => {
            let _ = controller.invalidate();
        },
        Op::Tick(secs) => {
            clock.advance(Duration::seconds(*secs));
            controller.tick();
        },
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// At most one ticket is ever active, and retired tickets never return.
    #[test]
    fn prop_single_active_ticket(ops in prop::collection::vec(arb_op(), 1..60)) {
        let (mut controller, clock) = controller();
        let mut retired = HashSet::new();

        for op in &ops {
            apply(&mut controller, &clock, op);
            let state = controller.state();

            prop_assert!(state.active_count() <= 1);
            prop_assert!(state.history.iter().all(|r| r.status != TicketStatus::Active));

            retired.extend(state.history.iter().map(|r| r.ticket_id));
            if let Some(active) = state.active_ticket() {
                prop_assert!(!retired.contains(&active.ticket_id()));
            }
        }
    }

    /// While one ticket stays active, its remaining time never goes up.
    #[test]
    fn prop_remaining_is_monotonic(ops in prop::collection::vec(arb_op(), 1..60)) {
        let (mut controller, clock) = controller();
        let mut last = None;

        for op in &ops {
            apply(&mut controller, &clock, op);

            let active = controller.state().active_ticket().map(|t| t.ticket_id());
            let remaining = controller.remaining();
            if let (Some(id), Some((last_id, last_remaining))) = (active, last) {
                if id == last_id {
                    prop_assert!(remaining <= last_remaining);
                }
            }
            last = active.map(|id| (id, remaining));
        }
    }

    /// Expiry is observed by the first tick at or after `expires_at`.
    #[test]
    fn prop_expires_within_one_tick(step in 1i64..120) {
        let (mut controller, clock) = controller();
        let expires_at = controller
            .issue(IssueRequest::new(Purpose::CashPickup, 1, LocationId::new("c")))
            .unwrap()
            .expires_at();

        while clock.now() < expires_at {
            prop_assert_eq!(controller.status(), LifecycleStatus::Active);
            clock.advance(Duration::seconds(step));
            controller.tick();
        }

        prop_assert_eq!(controller.status(), LifecycleStatus::Expired);
        prop_assert_eq!(controller.remaining(), Duration::zero());
    }
}
