//! Mock platform implementation for testing
//!
//! [`MockPlatform`] hands out in-memory lines that record every write
//! attempt, honour the initial/shutdown levels and can be told to fail.
//! [`MockDelay`] is a virtual-time `DelayNs` so timing-heavy sequences run
//! instantly and can fire callbacks at chosen points in time.

use std::boxed::Box;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::error::{PlatformError, Result};
use crate::gpio::{Level, OutputLine, Platform};
use crate::pins::{PinAllocator, HEADER_GPIO_COUNT};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// One attempted write to a mock line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord {
    /// Line address
    pub address: u8,
    /// Requested level
    pub level: Level,
    /// Whether the write succeeded
    pub ok: bool,
    /// Time of the attempt on the platform clock
    pub at: Duration,
}

#[derive(Debug, Clone, Copy)]
struct LineState {
    level: Level,
    shutdown: Level,
}

#[derive(Debug, Clone, Copy)]
struct Fault {
    address: u8,
    level: Level,
    remaining: u32,
}

enum Clock {
    Wall(Instant),
    Virtual(MockDelay),
}

impl Clock {
    fn now(&self) -> Duration {
        match self {
            Clock::Wall(start) => start.elapsed(),
            Clock::Virtual(delay) => delay.elapsed(),
        }
    }
}

struct Shared {
    allocator: PinAllocator,
    available: bool,
    lines: BTreeMap<u8, LineState>,
    history: Vec<WriteRecord>,
    faults: Vec<Fault>,
    clock: Clock,
}

impl Shared {
    /// Consume one matching fault, returning true if the write must fail
    fn take_fault(&mut self, address: u8, level: Level) -> bool {
        let Some(fault) = self
            .faults
            .iter_mut()
            .find(|f| f.address == address && f.level == level && f.remaining > 0)
        else {
            return false;
        };
        fault.remaining -= 1;
        self.faults.retain(|f| f.remaining > 0);
        true
    }
}

/// In-memory platform
///
/// Cloning yields another handle onto the same simulated board, so a test
/// can keep one handle for inspection after passing the other to `bind`.
#[derive(Clone)]
pub struct MockPlatform {
    shared: Arc<Mutex<Shared>>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    /// Create a mock board with the Raspberry Pi header GPIO range
    pub fn new() -> Self {
        Self::with_pin_count(HEADER_GPIO_COUNT)
    }

    /// Create a mock board with addresses `0..pin_count`
    pub fn with_pin_count(pin_count: u8) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                allocator: PinAllocator::new(pin_count),
                available: true,
                lines: BTreeMap::new(),
                history: Vec::new(),
                faults: Vec::new(),
                clock: Clock::Wall(Instant::now()),
            })),
        }
    }

    /// Timestamp writes with a virtual clock instead of wall time
    pub fn with_clock(self, clock: MockDelay) -> Self {
        lock(&self.shared).clock = Clock::Virtual(clock);
        self
    }

    /// Simulate the GPIO provider going away (or coming back)
    pub fn set_available(&self, available: bool) {
        lock(&self.shared).available = available;
    }

    /// Make the next `count` writes of `level` to `address` fail
    pub fn fail_writes(&self, address: u8, level: Level, count: u32) {
        if count > 0 {
            lock(&self.shared).faults.push(Fault {
                address,
                level,
                remaining: count,
            });
        }
    }

    /// Current physical level of `address`, if it was ever opened
    pub fn level(&self, address: u8) -> Option<Level> {
        lock(&self.shared).lines.get(&address).map(|l| l.level)
    }

    /// Check if `address` is currently owned by an open line
    pub fn is_open(&self, address: u8) -> bool {
        lock(&self.shared).allocator.is_allocated(address)
    }

    /// Every write attempt so far, in order
    pub fn history(&self) -> Vec<WriteRecord> {
        lock(&self.shared).history.clone()
    }

    /// Write attempts to a single address
    pub fn writes_to(&self, address: u8) -> Vec<WriteRecord> {
        lock(&self.shared)
            .history
            .iter()
            .filter(|w| w.address == address)
            .copied()
            .collect()
    }
}

impl Platform for MockPlatform {
    type Line = MockLine;

    fn open_output(&mut self, address: u8, initial: Level, shutdown: Level) -> Result<MockLine> {
        let mut shared = lock(&self.shared);
        if !shared.available {
            return Err(PlatformError::Unavailable);
        }
        shared.allocator.allocate(address)?;
        shared.lines.insert(
            address,
            LineState {
                level: initial,
                shutdown,
            },
        );
        log::debug!("mock: opened gpio{} at {:?}", address, initial);

        Ok(MockLine {
            address,
            level: initial,
            closed: false,
            shared: Arc::clone(&self.shared),
        })
    }
}

/// Line handed out by [`MockPlatform`]
pub struct MockLine {
    address: u8,
    level: Level,
    closed: bool,
    shared: Arc<Mutex<Shared>>,
}

impl OutputLine for MockLine {
    fn address(&self) -> u8 {
        self.address
    }

    fn write(&mut self, level: Level) -> Result<()> {
        if self.closed {
            return Err(PlatformError::Closed(self.address));
        }

        let mut shared = lock(&self.shared);
        let ok = !shared.take_fault(self.address, level);
        let at = shared.clock.now();
        shared.history.push(WriteRecord {
            address: self.address,
            level,
            ok,
            at,
        });

        if !ok {
            return Err(PlatformError::WriteFailed(self.address));
        }
        if let Some(line) = shared.lines.get_mut(&self.address) {
            line.level = level;
        }
        self.level = level;
        Ok(())
    }

    fn level(&self) -> Level {
        self.level
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let mut shared = lock(&self.shared);
        if let Some(line) = shared.lines.get_mut(&self.address) {
            line.level = line.shutdown;
            self.level = line.shutdown;
        }
        shared.allocator.release(self.address);
        log::debug!("mock: closed gpio{}", self.address);
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for MockLine {
    fn drop(&mut self) {
        self.close();
    }
}

type Hook = Box<dyn FnMut() + Send>;

#[derive(Default)]
struct DelayState {
    elapsed_ns: u64,
    hooks: Vec<(u64, Hook)>,
}

/// Virtual-time delay
///
/// Advances an internal clock instead of sleeping. Clones share the clock.
#[derive(Clone, Default)]
pub struct MockDelay {
    state: Arc<Mutex<DelayState>>,
}

impl MockDelay {
    /// Create a delay with the clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Total virtual time spent in delays
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(lock(&self.state).elapsed_ns)
    }

    /// Run `hook` once the clock reaches `at`
    ///
    /// Hooks fire at the end of the delay call that crosses `at`.
    pub fn at(&self, at: Duration, hook: impl FnMut() + Send + 'static) {
        let at_ns = u64::try_from(at.as_nanos()).unwrap_or(u64::MAX);
        lock(&self.state).hooks.push((at_ns, Box::new(hook)));
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        let mut due = {
            let mut state = lock(&self.state);
            state.elapsed_ns = state.elapsed_ns.saturating_add(u64::from(ns));
            let now = state.elapsed_ns;
            let (due, pending): (Vec<_>, Vec<_>) =
                state.hooks.drain(..).partition(|(at, _)| *at <= now);
            state.hooks = pending;
            due
        };

        // Hooks run without the lock held so they may inspect the clock
        for (_, hook) in due.iter_mut() {
            hook();
        }
    }
}
