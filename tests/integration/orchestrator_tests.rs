//! Integration tests for [`ClockOrchestrator`] against the mock board.

use segclock::app::events::{AppEvent, DisplayMode};
use segclock::app::orchestrator::{ClockOrchestrator, TickReport};
use segclock::app::ports::TimePort;
use segclock::calendar::CalendarTime;
use segclock::config::ClockConfig;
use segclock::cron::Boundary;
use segclock::display::DisplayBuffer;
use segclock::error::{Error, StationError, SyncError};
use segclock::sync::SyncState;

use super::mock_hw::{HwCall, Link, MockHardware, RecordingSink, jan1};

// ── Helpers ───────────────────────────────────────────────────

fn config() -> ClockConfig {
    let mut c = ClockConfig::default();
    c.wifi_ssid = heapless::String::try_from("TestNet").unwrap();
    c.wifi_password = heapless::String::try_from("password1").unwrap();
    c
}

fn started(boot_unix: i64, link: Link) -> (ClockOrchestrator, MockHardware, RecordingSink) {
    let mut hw = MockHardware::at(boot_unix, link);
    let mut sink = RecordingSink::new();
    let mut clock = ClockOrchestrator::new(config()).unwrap();
    clock.start(&mut hw, &mut sink);
    (clock, hw, sink)
}

/// One main-loop iteration: tick, then the 1 s sleep.
fn step(clock: &mut ClockOrchestrator, hw: &mut MockHardware, sink: &mut RecordingSink) -> (CalendarTime, TickReport) {
    let now = hw.now();
    let report = clock.tick(hw, sink);
    hw.advance_ms(1000);
    (now, report)
}

fn text_frame(text: &str) -> [u8; 16] {
    let mut buf = DisplayBuffer::new();
    buf.push_str(text);
    *buf.as_bytes()
}

// ── Bring-up ──────────────────────────────────────────────────

#[test]
fn start_applies_display_settings_then_clears() {
    let (_clock, hw, sink) = started(jan1(12, 0, 30), Link::After(0));
    assert_eq!(
        &hw.calls[..3],
        &[HwCall::Brightness(1), HwCall::BlinkRate(0), HwCall::Write([0; 16])]
    );
    assert_eq!(hw.syncs(), 1);
    assert_eq!(sink.events.last(), Some(&AppEvent::Started));
}

#[test]
fn start_shows_sync_text_during_exchange() {
    let (_clock, hw, _sink) = started(jan1(12, 0, 30), Link::After(0));
    let sync_at = hw.calls.iter().position(|c| *c == HwCall::Sync).unwrap();
    assert_eq!(hw.calls[sync_at - 1], HwCall::Write(text_frame("sync")));
}

#[test]
fn start_animates_progress_while_associating() {
    let (clock, hw, _sink) = started(jan1(12, 0, 30), Link::After(1_000));
    assert_eq!(clock.sync_state(), SyncState::Succeeded);
    assert!(hw.frames().any(|f| *f == text_frame("--  ")));
    assert_eq!(hw.count(&HwCall::Delay(200)), 5);
}

// ── Display-mode cycle ────────────────────────────────────────

#[test]
fn interval_boundary_cycles_year_date_guard_time() {
    let (mut clock, mut hw, mut sink) = started(jan1(12, 4, 58), Link::After(0));
    assert_eq!(clock.config().display_interval_minutes, 5);

    let (now, r) = step(&mut clock, &mut hw, &mut sink);
    assert_eq!((now.minute, now.second), (4, 58));
    assert_eq!(r.shown, Some(DisplayMode::Time));
    step(&mut clock, &mut hw, &mut sink);

    let (now, r) = step(&mut clock, &mut hw, &mut sink);
    assert_eq!((now.minute, now.second), (5, 0));
    assert_eq!(r.shown, Some(DisplayMode::Year));
    assert_eq!(clock.mode(), DisplayMode::Date);
    assert_eq!(hw.last_frame(), Some(text_frame("2024")));

    let (_, r) = step(&mut clock, &mut hw, &mut sink);
    assert_eq!(r.shown, Some(DisplayMode::Date));
    assert_eq!(clock.mode(), DisplayMode::TimeGuard);
    assert_eq!(hw.last_frame(), Some(text_frame("01.01")));

    // Held for the rest of the boundary minute.
    for _ in 2..60 {
        let (now, r) = step(&mut clock, &mut hw, &mut sink);
        assert_eq!(now.minute, 5);
        assert_eq!(r.shown, Some(DisplayMode::TimeGuard));
        assert_eq!(clock.mode(), DisplayMode::TimeGuard);
    }

    let (now, r) = step(&mut clock, &mut hw, &mut sink);
    assert_eq!((now.minute, now.second), (6, 0));
    assert_eq!(r.shown, Some(DisplayMode::TimeGuard));
    assert_eq!(clock.mode(), DisplayMode::Time);

    let (_, r) = step(&mut clock, &mut hw, &mut sink);
    assert_eq!(r.shown, Some(DisplayMode::Time));

    let changes: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ModeChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        [
            (DisplayMode::Time, DisplayMode::Date),
            (DisplayMode::Date, DisplayMode::TimeGuard),
            (DisplayMode::TimeGuard, DisplayMode::Time),
        ]
    );
}

#[test]
fn time_face_shows_hours_and_minutes() {
    let (mut clock, mut hw, mut sink) = started(jan1(9, 41, 6), Link::After(0));
    step(&mut clock, &mut hw, &mut sink);

    let frame = hw.last_frame().unwrap();
    // Even second: colon on. Second 6 -> breathing dot on cell 2 only.
    let mut expected = DisplayBuffer::new();
    expected.push_str(":0941");
    expected.put('.', 2);
    assert_eq!(frame, *expected.as_bytes());
    assert_eq!(clock.renderer().buffer(), &expected);
}

// ── Sync error indicator ──────────────────────────────────────

#[test]
fn failed_initial_sync_lights_last_digit_point() {
    // 30.7 s of failed start-up lands the first tick on 12:11:05.
    let (mut clock, mut hw, mut sink) = started(jan1(12, 10, 35), Link::Never);
    assert_eq!(clock.sync_state(), SyncState::TimedOut);
    assert!(clock.sync_error());
    assert!(clock.is_resync_pending());

    let (now, r) = step(&mut clock, &mut hw, &mut sink);
    assert_eq!((now.minute, now.second), (11, 5));
    assert_eq!(r.shown, Some(DisplayMode::Time));
    // Retry delay not yet over.
    assert_eq!(r.sync, SyncState::TimedOut);

    let frame = hw.last_frame().unwrap();
    assert_ne!(frame[8] & 0x80, 0, "error point on last digit");
    assert_eq!(frame[6] & 0x80, 0x80, "breathing dot for second 5");
    assert!(sink.contains(&AppEvent::SyncFailed(SyncError::ConnectionTimeout)));

    let err = clock.last_sync_error().unwrap();
    assert_eq!(Error::from(err).to_string(), "sync: connection timed out");
}

#[test]
fn refused_connect_is_reported_as_station_error() {
    let (clock, hw, _sink) = started(jan1(8, 0, 30), Link::Refuse(StationError::ConnectionFailed));
    assert_eq!(clock.sync_state(), SyncState::TimedOut);
    assert!(!hw.radio_on());

    let err = clock.last_sync_error().unwrap();
    assert!(!err.is_protocol_failure());
    assert_eq!(
        Error::from(err),
        Error::Sync(SyncError::Station(StationError::ConnectionFailed))
    );
    assert_eq!(
        Error::from(StationError::ConnectionFailed).to_string(),
        "station: WiFi connection failed"
    );
}

// ── Cron wiring ───────────────────────────────────────────────

#[test]
fn hourly_does_not_resync_when_healthy() {
    let (mut clock, mut hw, mut sink) = started(jan1(12, 59, 58), Link::After(0));
    let mut fired = Vec::new();
    for _ in 0..4 {
        let (_, r) = step(&mut clock, &mut hw, &mut sink);
        fired.extend(r.fired);
    }
    assert_eq!(fired, [Boundary::Hour]);
    assert!(!sink.contains(&AppEvent::ResyncRequested));
    assert_eq!(hw.connects(), 1);
}

#[test]
fn hourly_self_heals_after_failure() {
    // Failed start-up ends at 12:59:50.
    let (mut clock, mut hw, mut sink) = started(jan1(12, 59, 20), Link::Never);
    assert_eq!(hw.connects(), 1);

    let mut report = None;
    for _ in 0..11 {
        let (now, r) = step(&mut clock, &mut hw, &mut sink);
        if (now.hour, now.minute, now.second) == (13, 0, 0) {
            report = Some(r);
        }
    }
    let r = report.unwrap();
    assert_eq!(r.fired, Some(Boundary::Hour));
    // Rendered before the new attempt started.
    assert_eq!(r.shown, Some(DisplayMode::Year));
    assert_eq!(r.sync, SyncState::ConnectingPending);
    assert_eq!(sink.count(&AppEvent::ResyncRequested), 1);
    assert_eq!(hw.connects(), 2);
}

#[test]
fn daily_maintenance_and_resync_at_two() {
    let (mut clock, mut hw, mut sink) = started(jan1(1, 59, 58), Link::After(0));
    assert_eq!(hw.syncs(), 1);

    for _ in 0..12 {
        let (now, r) = step(&mut clock, &mut hw, &mut sink);
        if (now.hour, now.minute, now.second) == (2, 0, 0) {
            assert_eq!(r.fired, Some(Boundary::Day));
            assert_eq!(r.sync, SyncState::Succeeded);
        }
    }
    assert_eq!(hw.maintenance_runs(), 1);
    assert_eq!(sink.count(&AppEvent::Maintenance), 1);
    assert_eq!(sink.count(&AppEvent::CronFired(Boundary::Day)), 1);
    assert_eq!(hw.syncs(), 2);
    assert!(!clock.sync_error());
}

// ── Cooperative progress ──────────────────────────────────────

#[test]
fn progress_replaces_face_and_freezes_mode_machine() {
    // Failed start-up ends at 12:04:50.
    let (mut clock, mut hw, mut sink) = started(jan1(12, 4, 20), Link::Never);
    clock.request_resync(&mut sink);
    assert!(sink.contains(&AppEvent::ResyncRequested));

    let (_, r) = step(&mut clock, &mut hw, &mut sink);
    assert_eq!(r.shown, Some(DisplayMode::Time));
    assert_eq!(r.sync, SyncState::ConnectingPending);

    // 12:05:00 passes while connecting: no year/date rotation.
    for i in 1..=31 {
        let (_, r) = step(&mut clock, &mut hw, &mut sink);
        assert_eq!(r.shown, None, "tick {i}");
        assert_eq!(clock.mode(), DisplayMode::Time);
    }
    assert_eq!(clock.sync_state(), SyncState::TimedOut);
    assert!(hw.frames().any(|f| *f == text_frame("err ")));

    // Still in minute 5 once the attempt has given up.
    let (now, r) = step(&mut clock, &mut hw, &mut sink);
    assert_eq!(now.minute, 5);
    assert_eq!(r.shown, Some(DisplayMode::Year));
}

#[test]
fn external_resync_requests_coalesce() {
    let (mut clock, mut hw, mut sink) = started(jan1(12, 30, 20), Link::After(5_000));
    hw.clear_calls();

    clock.request_resync(&mut sink);
    clock.request_resync(&mut sink);
    clock.request_resync(&mut sink);
    for _ in 0..10 {
        step(&mut clock, &mut hw, &mut sink);
    }
    assert_eq!(hw.connects(), 1);
    assert_eq!(hw.syncs(), 1);
    assert_eq!(sink.count(&AppEvent::ResyncRequested), 1);
    assert_eq!(clock.tick_count(), 10);
}
