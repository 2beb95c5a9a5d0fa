use super::*;
use crate::state::feed::FeedState;

fn endpoint() -> Endpoint {
    Endpoint { host: "localhost:8000".to_owned(), secure: false }
}

fn link(id: &str) -> Link {
    Link::new(ChannelId::resolve(Some(id)), &endpoint(), ReconnectPolicy::default())
}

fn closed() -> LinkEvent {
    LinkEvent::Closed { code: 1006, reason: String::new() }
}

/// Minimal simulated clock: one-shot timers fired by `advance`.
#[derive(Default)]
struct SimClock {
    now_ms: u64,
    timers: Vec<u64>,
}

impl SimClock {
    fn schedule(&mut self, after: Duration) {
        let after_ms = u64::try_from(after.as_millis()).expect("small delay");
        self.timers.push(self.now_ms + after_ms);
    }

    /// Advance time and return how many timers fired.
    fn advance(&mut self, ms: u64) -> usize {
        self.now_ms += ms;
        let now = self.now_ms;
        let before = self.timers.len();
        self.timers.retain(|due| *due > now);
        before - self.timers.len()
    }
}

/// Drive one link the way the browser driver does, against the sim clock.
fn apply(link: &mut Link, clock: &mut SimClock, generation: u64, event: LinkEvent) -> Directive {
    let directive = link.handle(generation, event, clock.now_ms);
    if let Directive::Reconnect { after } = &directive {
        clock.schedule(*after);
    }
    directive
}

// =============================================================
// Policy
// =============================================================

#[test]
fn default_policy_is_fixed_one_second() {
    assert_eq!(ReconnectPolicy::default().delay(), Duration::from_millis(1000));
}

// =============================================================
// start()
// =============================================================

#[test]
fn new_link_is_idle_with_channel_url() {
    let mut link = link("42");
    assert_eq!(link.state(), LinkState::Idle);
    assert_eq!(link.attempts(), 0);
    assert_eq!(link.start().url, "ws://localhost:8000/thing/42");
}

#[test]
fn wildcard_link_targets_empty_segment() {
    let mut link = Link::new(ChannelId::resolve(None), &endpoint(), ReconnectPolicy::default());
    assert_eq!(link.start().url, "ws://localhost:8000/thing/");
}

#[test]
fn start_is_repeatable_and_bumps_generation() {
    let mut link = link("a");
    let first = link.start();
    let second = link.start();
    assert_eq!(first.generation + 1, second.generation);
    assert_eq!(link.attempts(), 2);
    assert_eq!(link.state(), LinkState::Connecting);
    assert_eq!(second.url, first.url);
}

#[test]
fn opened_moves_to_open_without_directive() {
    let mut link = link("a");
    let attempt = link.start();
    assert_eq!(link.handle(attempt.generation, LinkEvent::Opened, 0), Directive::Ignore);
    assert_eq!(link.state(), LinkState::Open);
}

#[test]
fn message_before_open_event_marks_link_open() {
    let mut link = link("a");
    let attempt = link.start();
    let directive = link.handle(attempt.generation, LinkEvent::Message("early".to_owned()), 0);
    assert_eq!(directive, Directive::Deliver("early".to_owned()));
    assert_eq!(link.state(), LinkState::Open);
    assert_eq!(link.handle(attempt.generation, LinkEvent::Opened, 0), Directive::Ignore);
    assert_eq!(link.state(), LinkState::Open);
}

#[test]
fn opened_after_termination_does_not_reopen() {
    let mut link = link("a");
    let attempt = link.start();
    link.handle(attempt.generation, closed(), 0);
    link.handle(attempt.generation, LinkEvent::Opened, 10);
    assert_eq!(link.state(), LinkState::Waiting { due_ms: 1000 });
}

// =============================================================
// Delivery
// =============================================================

#[test]
fn messages_are_delivered_in_wire_order() {
    let mut link = link("a");
    let attempt = link.start();
    let delivered: Vec<Directive> = ["m1", "m2", "m3"]
        .iter()
        .map(|m| link.handle(attempt.generation, LinkEvent::Message((*m).to_owned()), 0))
        .collect();
    assert_eq!(
        delivered,
        vec![
            Directive::Deliver("m1".to_owned()),
            Directive::Deliver("m2".to_owned()),
            Directive::Deliver("m3".to_owned()),
        ]
    );
}

#[test]
fn events_from_superseded_attempt_are_ignored() {
    let mut link = link("a");
    let stale = link.start();
    let _fresh = link.start();
    assert_eq!(
        link.handle(stale.generation, LinkEvent::Message("old".to_owned()), 0),
        Directive::Ignore
    );
    assert_eq!(link.handle(stale.generation, closed(), 0), Directive::Ignore);
    assert_eq!(link.state(), LinkState::Connecting);
}

// =============================================================
// Termination and reconnect
// =============================================================

#[test]
fn close_schedules_one_reconnect_after_fixed_delay() {
    let mut link = link("a");
    let attempt = link.start();
    link.handle(attempt.generation, LinkEvent::Opened, 0);
    let directive = link.handle(attempt.generation, closed(), 500);
    assert_eq!(directive, Directive::Reconnect { after: Duration::from_millis(1000) });
    assert_eq!(link.state(), LinkState::Waiting { due_ms: 1500 });
}

#[test]
fn error_and_close_are_treated_alike() {
    let mut link = link("a");
    let attempt = link.start();
    let directive = link.handle(attempt.generation, LinkEvent::Errored("refused".to_owned()), 0);
    assert_eq!(directive, Directive::Reconnect { after: Duration::from_millis(1000) });
}

#[test]
fn error_followed_by_close_schedules_only_once() {
    let mut link = link("a");
    let attempt = link.start();
    let first = link.handle(attempt.generation, LinkEvent::Errored("boom".to_owned()), 0);
    let second = link.handle(attempt.generation, closed(), 0);
    assert!(matches!(first, Directive::Reconnect { .. }));
    assert_eq!(second, Directive::Ignore);
}

#[test]
fn end_of_stream_counts_as_abnormal_close() {
    let mut link = link("a");
    let attempt = link.start();
    link.handle(attempt.generation, LinkEvent::Opened, 0);
    assert_eq!(
        link.end_of_stream(attempt.generation, 200),
        Directive::Reconnect { after: Duration::from_millis(1000) }
    );
    assert_eq!(link.state(), LinkState::Waiting { due_ms: 1200 });
}

#[test]
fn end_of_stream_after_close_is_ignored() {
    let mut link = link("a");
    let attempt = link.start();
    link.handle(attempt.generation, closed(), 0);
    assert_eq!(link.end_of_stream(attempt.generation, 0), Directive::Ignore);
    assert_eq!(link.state(), LinkState::Waiting { due_ms: 1000 });
}

#[test]
fn ensure_retry_keeps_pending_due_time() {
    let mut link = link("a");
    let attempt = link.start();
    link.handle(attempt.generation, closed(), 0);
    assert_eq!(link.ensure_retry(400), Duration::from_millis(600));
    assert_eq!(link.state(), LinkState::Waiting { due_ms: 1000 });
}

#[test]
fn ensure_retry_without_termination_still_waits_full_delay() {
    let mut link = link("a");
    link.start();
    assert_eq!(link.ensure_retry(50), Duration::from_millis(1000));
    assert_eq!(link.poll_retry(1049), RetryPoll::Pending(Duration::from_millis(1)));
    assert_eq!(link.attempts(), 1);
    assert!(matches!(link.poll_retry(1050), RetryPoll::Due(_)));
    assert_eq!(link.attempts(), 2);
}

#[test]
fn poll_retry_never_fires_early() {
    let mut link = link("a");
    let attempt = link.start();
    link.handle(attempt.generation, closed(), 0);

    assert_eq!(link.poll_retry(999), RetryPoll::Pending(Duration::from_millis(1)));
    assert_eq!(link.attempts(), 1);

    match link.poll_retry(1000) {
        RetryPoll::Due(next) => assert_eq!(next.generation, attempt.generation + 1),
        other => panic!("expected due retry, got {other:?}"),
    }
    assert_eq!(link.attempts(), 2);
    assert_eq!(link.poll_retry(5000), RetryPoll::Idle);
}

#[test]
fn poll_retry_is_idle_without_termination() {
    let mut link = link("a");
    assert_eq!(link.poll_retry(0), RetryPoll::Idle);
    link.start();
    assert_eq!(link.poll_retry(10_000), RetryPoll::Idle);
}

#[test]
fn retries_forever_at_constant_interval() {
    let mut link = link("a");
    let mut clock = SimClock::default();
    let mut attempt = link.start();

    for round in 1..=50_u64 {
        let directive = apply(&mut link, &mut clock, attempt.generation, closed());
        assert_eq!(directive, Directive::Reconnect { after: Duration::from_millis(1000) });
        assert_eq!(clock.advance(1000), 1);
        attempt = match link.poll_retry(clock.now_ms) {
            RetryPoll::Due(next) => next,
            other => panic!("round {round}: expected due retry, got {other:?}"),
        };
        assert_eq!(link.attempts(), round + 1);
    }
}

#[test]
fn immediate_close_reconnects_without_touching_store() {
    let mut link = link("42");
    let mut clock = SimClock::default();
    let mut feed = FeedState::default();
    feed.push("kept".to_owned());

    let attempt = link.start();
    apply(&mut link, &mut clock, attempt.generation, closed());

    assert_eq!(clock.advance(999), 0);
    assert_eq!(link.poll_retry(clock.now_ms), RetryPoll::Pending(Duration::from_millis(1)));
    assert_eq!(clock.advance(1), 1);
    assert!(matches!(link.poll_retry(clock.now_ms), RetryPoll::Due(_)));

    assert_eq!(link.attempts(), 2);
    assert_eq!(feed.len(), 1);
    assert_eq!(feed.latest().map(|m| m.payload.as_str()), Some("kept"));
}

#[test]
fn concurrent_links_reconnect_independently() {
    let mut left = link("a");
    let mut right = link("b");
    let left_attempt = left.start();
    let right_attempt = right.start();
    right.handle(right_attempt.generation, LinkEvent::Opened, 0);

    left.handle(left_attempt.generation, closed(), 0);

    assert!(matches!(left.poll_retry(1000), RetryPoll::Due(_)));
    assert_eq!(right.poll_retry(1000), RetryPoll::Idle);
    assert_eq!(left.attempts(), 2);
    assert_eq!(right.attempts(), 1);
    assert_eq!(right.state(), LinkState::Open);
    assert_eq!(
        right.handle(right_attempt.generation, LinkEvent::Message("x".to_owned()), 0),
        Directive::Deliver("x".to_owned())
    );
}
