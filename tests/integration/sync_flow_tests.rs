//! End-to-end flows through [`SyncStateMachine`] on the mock board.

use segclock::app::events::AppEvent;
use segclock::app::ports::TimePort;
use segclock::config::ClockConfig;
use segclock::display::SegmentRenderer;
use segclock::error::{StationError, SyncError};
use segclock::sync::{SyncState, SyncStateMachine};

use super::mock_hw::{HwCall, Link, MockHardware, RecordingSink, jan1};

struct Flow {
    machine: SyncStateMachine,
    renderer: SegmentRenderer,
    hw: MockHardware,
    sink: RecordingSink,
}

impl Flow {
    fn new(link: Link) -> Self {
        let mut cfg = ClockConfig::default();
        cfg.wifi_ssid = heapless::String::try_from("TestNet").unwrap();
        Self {
            machine: SyncStateMachine::new(&cfg),
            renderer: SegmentRenderer::new(),
            hw: MockHardware::at(jan1(10, 0, 0), link),
            sink: RecordingSink::new(),
        }
    }

    fn poll(&mut self) -> SyncState {
        self.machine.run(&mut self.hw, &mut self.renderer, &mut self.sink)
    }

    /// Poll once a second until the attempt leaves `ConnectingPending`.
    fn run_to_outcome(&mut self) -> SyncState {
        for _ in 0..60 {
            let state = self.poll();
            if state != SyncState::ConnectingPending {
                return state;
            }
            self.hw.advance_ms(1000);
        }
        panic!("attempt never finished");
    }
}

// ── Outcomes ──────────────────────────────────────────────────

#[test]
fn unreachable_network_times_out_and_keeps_request() {
    let mut f = Flow::new(Link::Never);
    f.machine.request_resync();

    assert_eq!(f.run_to_outcome(), SyncState::TimedOut);
    assert!(f.machine.error());
    assert!(f.machine.is_pending());
    assert_eq!(f.machine.last_error(), Some(SyncError::ConnectionTimeout));
    assert_eq!(f.hw.connects(), 1);
    assert_eq!(f.hw.syncs(), 0);
    assert!(f.machine.retry_at_ms().is_some());
    assert!(f.sink.contains(&AppEvent::RetryScheduled { in_secs: 30 }));
}

#[test]
fn slow_association_still_succeeds_with_one_exchange() {
    let mut f = Flow::new(Link::After(4_000));
    f.machine.request_resync();

    assert_eq!(f.run_to_outcome(), SyncState::Succeeded);
    assert!(!f.machine.error());
    assert!(!f.machine.is_pending());
    assert_eq!(f.hw.connects(), 1);
    assert_eq!(f.hw.syncs(), 1);
    assert_eq!(f.sink.count(&AppEvent::SyncStarted), 1);
    assert_eq!(f.sink.count(&AppEvent::SyncSucceeded), 1);
}

#[test]
fn exchange_failure_is_a_protocol_error() {
    let mut f = Flow::new(Link::After(0));
    f.hw.fail_next_syncs(SyncError::ServerTimeout, 1);
    f.machine.request_resync();

    assert_eq!(f.poll(), SyncState::ProtocolFailed);
    assert_eq!(f.machine.last_error(), Some(SyncError::ServerTimeout));
    assert!(f.machine.error());
}

#[test]
fn requests_coalesce_into_one_attempt() {
    let mut f = Flow::new(Link::After(3_000));
    assert!(f.machine.request_resync());
    assert!(!f.machine.request_resync());
    assert!(!f.machine.request_resync());

    for _ in 0..2 {
        assert_eq!(f.poll(), SyncState::ConnectingPending);
        assert!(!f.machine.request_resync());
        f.hw.advance_ms(1000);
    }
    assert_eq!(f.run_to_outcome(), SyncState::Succeeded);
    assert_eq!(f.hw.connects(), 1);
}

// ── Station release ───────────────────────────────────────────

#[test]
fn station_released_on_every_exit_path() {
    let cases: [(Link, Option<SyncError>, SyncState); 4] = [
        (Link::After(0), None, SyncState::Succeeded),
        (Link::After(0), Some(SyncError::Network), SyncState::ProtocolFailed),
        (Link::Never, None, SyncState::TimedOut),
        (Link::Refuse(StationError::ConnectionFailed), None, SyncState::TimedOut),
    ];

    for (link, sync_failure, expected) in cases {
        let mut f = Flow::new(link);
        if let Some(err) = sync_failure {
            f.hw.fail_next_syncs(err, 1);
        }
        f.machine.request_resync();

        assert_eq!(f.run_to_outcome(), expected, "{link:?}");
        assert!(!f.hw.radio_on(), "{link:?}: radio left on");
        assert_eq!(f.machine.connection_deadline(), None, "{link:?}");

        let disconnect = f.hw.calls.iter().rposition(|c| *c == HwCall::Disconnect);
        let radio_off = f.hw.calls.iter().rposition(|c| *c == HwCall::Activate(false));
        assert!(disconnect.is_some() && disconnect < radio_off, "{link:?}");
    }
}

#[test]
fn station_kept_while_association_outstanding() {
    let mut f = Flow::new(Link::Never);
    f.machine.request_resync();
    f.poll();
    f.hw.advance_ms(1000);
    f.poll();

    assert!(f.hw.radio_on());
    assert_eq!(f.hw.count(&HwCall::Disconnect), 0);
    assert_eq!(f.machine.connection_deadline(), Some(30_000));
}

// ── Retry and recovery ────────────────────────────────────────

#[test]
fn retry_waits_for_backoff_then_recovers() {
    let mut f = Flow::new(Link::Never);
    f.machine.request_resync();
    assert_eq!(f.run_to_outcome(), SyncState::TimedOut);

    // Network comes back, but the retry delay has not run out yet.
    f.hw.link = Link::After(0);
    let retry_at = f.machine.retry_at_ms().unwrap();
    f.hw.advance_ms(1000);
    assert_eq!(f.poll(), SyncState::TimedOut);
    assert_eq!(f.hw.connects(), 1);

    f.hw.advance_ms(retry_at - f.hw.uptime_ms());
    assert_eq!(f.poll(), SyncState::Succeeded);
    assert!(!f.machine.error());
    assert_eq!(f.machine.retry_at_ms(), None);
}

#[test]
fn explicit_request_skips_backoff() {
    let mut f = Flow::new(Link::Never);
    f.machine.request_resync();
    f.run_to_outcome();

    f.hw.link = Link::After(0);
    assert!(f.machine.request_resync());
    assert_eq!(f.poll(), SyncState::Succeeded);
    assert_eq!(f.hw.connects(), 2);
}

#[test]
fn repeated_failures_back_off_exponentially() {
    let mut f = Flow::new(Link::Refuse(StationError::ConnectionFailed));
    f.machine.request_resync();

    let mut delays = Vec::new();
    for _ in 0..4 {
        let before = f.sink.events.len();
        assert_eq!(f.poll(), SyncState::TimedOut);
        delays.extend(f.sink.events[before..].iter().filter_map(|e| match e {
            AppEvent::RetryScheduled { in_secs } => Some(*in_secs),
            _ => None,
        }));
        let wait = f.machine.retry_at_ms().unwrap() - f.hw.uptime_ms();
        f.hw.advance_ms(wait);
    }
    assert_eq!(delays, [30, 60, 120, 240]);
}
