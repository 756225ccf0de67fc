//! Sequencer behaviour against the mock platform
//!
//! Most tests run on a virtual clock, so multi-second patterns finish
//! instantly and timing assertions are exact. Cross-thread cancellation
//! runs in real time.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use klaxon_core::{
    ActiveLevel, Actuator, ActuatorConfig, ActuatorState, CancelFlag, DriveError, NeverCancel,
    PatternConfig,
};
use klaxon_hal::mock::{MockDelay, MockLine, MockPlatform};
use klaxon_hal::Level;
use proptest::prelude::*;

const ADDR: u8 = 5;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn setup(polarity: ActiveLevel) -> (MockPlatform, MockDelay, Actuator<MockLine, MockDelay>) {
    let delay = MockDelay::new();
    let platform = MockPlatform::new().with_clock(delay.clone());
    let mut handle = platform.clone();
    let actuator = Actuator::bind(&mut handle, ADDR, polarity, delay.clone()).unwrap();
    (platform, delay, actuator)
}

#[test]
fn classic_buzzer_three_beeps() {
    let (platform, delay, mut buzzer) = setup(ActiveLevel::ActiveLow);

    let mut beeps = Vec::new();
    buzzer
        .pulse_sequence_with(3, ms(500), ms(500), &NeverCancel, |n| beeps.push(n))
        .unwrap();

    assert_eq!(beeps, vec![1, 2, 3]);
    assert_eq!(delay.elapsed(), ms(2500));

    let writes = platform.writes_to(ADDR);
    assert_eq!(writes.len(), 6);
    for (i, window) in writes.chunks(2).enumerate() {
        let start = ms(1000 * i as u64);
        assert_eq!(window[0].level, Level::Low);
        assert_eq!(window[0].at, start);
        assert_eq!(window[1].level, Level::High);
        assert_eq!(window[1].at, start + ms(500));
    }

    buzzer.release();
    assert_eq!(platform.level(ADDR), Some(Level::High));
    assert!(!platform.is_open(ADDR));
}

#[test]
fn from_config_runs_configured_pattern() {
    let delay = MockDelay::new();
    let mut platform = MockPlatform::new().with_clock(delay.clone());
    let config = ActuatorConfig {
        address: 17,
        active_level: ActiveLevel::ActiveHigh,
        poll_interval_ms: 25,
        ..ActuatorConfig::default()
    };
    let pattern = PatternConfig {
        count: 2,
        on_ms: 100,
        off_ms: 300,
    };

    let mut relay = Actuator::from_config(&mut platform, &config, delay.clone()).unwrap();
    assert_eq!(relay.poll_interval(), ms(25));
    relay.run_pattern(&pattern, &NeverCancel, |_| {}).unwrap();

    assert_eq!(delay.elapsed(), pattern.total_duration());
    let levels: Vec<Level> = platform.writes_to(17).iter().map(|w| w.level).collect();
    assert_eq!(levels, vec![Level::High, Level::Low, Level::High, Level::Low]);
}

#[test]
fn actuators_on_separate_addresses_are_independent() {
    let delay = MockDelay::new();
    let platform = MockPlatform::new().with_clock(delay.clone());
    let mut handle = platform.clone();

    let mut buzzer = Actuator::bind(&mut handle, 5, ActiveLevel::ActiveLow, delay.clone()).unwrap();
    let mut led = Actuator::bind(&mut handle, 6, ActiveLevel::ActiveHigh, delay.clone()).unwrap();

    buzzer.activate(ms(10), &NeverCancel).unwrap();
    led.release();

    assert_eq!(platform.writes_to(5).len(), 2);
    assert!(platform.is_open(5));
    assert!(!platform.is_open(6));
    assert_eq!(platform.level(6), Some(Level::Low));
}

/// Real-time delay for tests that cancel from another thread
struct ThreadDelay;

impl DelayNs for ThreadDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }
}

#[test]
fn cancel_from_another_thread_stops_sequence_mid_activation() {
    let platform = MockPlatform::new();
    let mut handle = platform.clone();
    let mut buzzer = Actuator::bind(&mut handle, ADDR, ActiveLevel::ActiveLow, ThreadDelay).unwrap();

    let cancel = Arc::new(CancelFlag::new());
    let trigger = Arc::clone(&cancel);
    let canceller = thread::spawn(move || {
        thread::sleep(ms(250));
        trigger.cancel();
    });

    let started = Instant::now();
    let result = buzzer.pulse_sequence(3, ms(500), ms(500), &*cancel);
    let elapsed = started.elapsed();
    canceller.join().unwrap();

    assert_eq!(result, Err(DriveError::Cancelled));
    assert_eq!(buzzer.state(), ActuatorState::Idle);
    assert!(elapsed < ms(500), "stopped after {:?}", elapsed);

    let levels: Vec<Level> = platform.writes_to(ADDR).iter().map(|w| w.level).collect();
    assert_eq!(levels, vec![Level::Low, Level::High]);
    assert_eq!(platform.level(ADDR), Some(Level::High));
}

#[test]
fn pre_cancelled_flag_from_another_thread_skips_activation() {
    let (platform, _delay, mut buzzer) = setup(ActiveLevel::ActiveLow);
    let cancel = Arc::new(CancelFlag::new());
    cancel.cancel();

    let flag = Arc::clone(&cancel);
    let result = thread::spawn(move || {
        let r = buzzer.pulse_sequence(3, ms(500), ms(500), &*flag);
        (r, buzzer.state())
    })
    .join()
    .unwrap();

    assert_eq!(result, (Err(DriveError::Cancelled), ActuatorState::Idle));
    // Only the safe write from the drop at the end of the thread
    let levels: Vec<Level> = platform.history().iter().map(|w| w.level).collect();
    assert_eq!(levels, vec![Level::High]);
}

proptest! {
    #[test]
    fn line_is_safe_after_any_sequence(
        active_low in any::<bool>(),
        count in 0u32..6,
        on_ms in 0u64..300,
        off_ms in 0u64..300,
        cancel_at in proptest::option::of(0u64..2000),
        energize_fault in any::<bool>(),
    ) {
        let polarity = ActiveLevel::from_inverted(active_low);
        let (platform, delay, mut actuator) = setup(polarity);

        let cancel = Arc::new(CancelFlag::new());
        if let Some(at) = cancel_at {
            let trigger = Arc::clone(&cancel);
            delay.at(ms(at), move || trigger.cancel());
        }
        if energize_fault {
            platform.fail_writes(ADDR, polarity.active(), 1);
        }

        let result = actuator.pulse_sequence(count, ms(on_ms), ms(off_ms), &*cancel);

        prop_assert_eq!(platform.level(ADDR), Some(polarity.safe()));
        prop_assert_eq!(actuator.state(), ActuatorState::Idle);
        if count == 0 {
            prop_assert!(result.is_ok());
            prop_assert!(platform.history().is_empty());
        }
        if let Err(DriveError::Energize(_)) = result {
            // A failed energize is always followed by an attempted safe write
            let writes = platform.writes_to(ADDR);
            let failed = writes.iter().position(|w| !w.ok).unwrap();
            prop_assert_eq!(writes[failed + 1].level, polarity.safe());
        }
    }

    #[test]
    fn release_restores_safe_level_even_after_restore_fault(
        active_low in any::<bool>(),
        count in 1u32..4,
        on_ms in 1u64..100,
    ) {
        let polarity = ActiveLevel::from_inverted(active_low);
        let (platform, _delay, mut actuator) = setup(polarity);
        platform.fail_writes(ADDR, polarity.safe(), 1);

        let result = actuator.pulse_sequence(count, ms(on_ms), ms(10), &NeverCancel);
        prop_assert!(matches!(result, Err(DriveError::Restore(_))));

        actuator.release();
        prop_assert_eq!(platform.level(ADDR), Some(polarity.safe()));
        prop_assert!(!platform.is_open(ADDR));
    }

    #[test]
    fn release_is_idempotent(times in 1usize..5) {
        let (platform, _delay, mut actuator) = setup(ActiveLevel::ActiveLow);

        actuator.release();
        let once = platform.history();
        for _ in 1..times {
            actuator.release();
        }

        prop_assert_eq!(platform.history(), once);
        prop_assert!(actuator.is_released());
        prop_assert_eq!(platform.level(ADDR), Some(Level::High));
    }

    #[test]
    fn uninterrupted_sequence_takes_nominal_time(
        count in 0u32..5,
        on_ms in 0u32..400,
        off_ms in 0u32..400,
    ) {
        let (platform, delay, mut actuator) = setup(ActiveLevel::ActiveLow);
        let pattern = PatternConfig { count, on_ms, off_ms };

        actuator.run_pattern(&pattern, &NeverCancel, |_| {}).unwrap();

        prop_assert_eq!(delay.elapsed(), pattern.total_duration());
        prop_assert_eq!(platform.writes_to(ADDR).len(), 2 * count as usize);
    }
}
