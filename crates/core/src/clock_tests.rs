// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_is_monotonic() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    assert!(clock.now() > t1);
    assert!(clock.epoch_ms() > 1_600_000_000_000);
}

#[test]
fn fake_clock_advances_both_clocks() {
    let clock = FakeClock::new();
    let start = clock.now();
    let start_ms = clock.epoch_ms();
    clock.advance(Duration::from_secs(90));
    assert_eq!(clock.since(start), Duration::from_secs(90));
    assert_eq!(clock.epoch_ms() - start_ms, 90_000);
}

#[test]
fn fake_clock_clones_share_time() {
    let a = FakeClock::new();
    let b = a.clone();
    let start = a.now();
    b.advance(Duration::from_secs(30));
    assert_eq!(a.since(start), Duration::from_secs(30));
}

#[test]
fn since_saturates_for_future_instants() {
    let clock = FakeClock::new();
    let future = clock.now() + Duration::from_secs(5);
    assert_eq!(clock.since(future), Duration::ZERO);
}

#[test]
fn set_epoch_ms_overrides_wall_clock() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}
