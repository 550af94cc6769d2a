//! Shared test infrastructure for nav-lights integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use embedded_hal::delay::DelayNs;
use nav_lights::{LampPin, LightSet, SharedLightSet, TickToken, TimerBank, TimerError, TimerId};

// ============================================================================
// Mock Pin
// ============================================================================

/// Mock lamp pin that records its level after every toggle
pub struct MockPin {
    level: bool,
    toggles: u32,
    history: heapless::Vec<bool, 256>,
}

impl MockPin {
    pub fn new() -> Self {
        Self {
            level: false,
            toggles: 0,
            history: heapless::Vec::new(),
        }
    }

    /// Pin that powers up high, to catch missing initialisation
    pub fn floating_high() -> Self {
        Self {
            level: true,
            ..Self::new()
        }
    }

    pub fn level(&self) -> bool {
        self.level
    }

    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    pub fn history(&self) -> &[bool] {
        &self.history
    }
}

impl LampPin for MockPin {
    fn set_high(&mut self) {
        self.level = true;
    }

    fn set_low(&mut self) {
        self.level = false;
    }

    fn toggle(&mut self) {
        self.level = !self.level;
        self.toggles += 1;
        let _ = self.history.push(self.level);
    }

    fn read(&mut self) -> bool {
        self.level
    }
}

// ============================================================================
// Mock Timer Bank
// ============================================================================

pub const TIMER_COUNT: usize = 16;
pub const SOURCE_FREQUENCY_HZ: u64 = 84_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub frequency_hz: u32,
    pub token: TickToken,
}

/// Mock pool of periodic timers with IDs `0..TIMER_COUNT`
pub struct MockTimerBank {
    slots: [Option<ArmedTimer>; TIMER_COUNT],
    claimed: Option<TimerId>,
    clock_fault: bool,
    pub arm_calls: u32,
    pub disarm_calls: u32,
}

impl MockTimerBank {
    pub fn new() -> Self {
        Self {
            slots: [None; TIMER_COUNT],
            claimed: None,
            clock_fault: false,
            arm_calls: 0,
            disarm_calls: 0,
        }
    }

    /// Reserve a timer for some other platform user
    pub fn with_claimed(id: TimerId) -> Self {
        Self {
            claimed: Some(id),
            ..Self::new()
        }
    }

    /// Bank whose clock tree cannot be queried
    pub fn with_clock_fault() -> Self {
        Self {
            clock_fault: true,
            ..Self::new()
        }
    }

    pub fn armed(&self, id: TimerId) -> Option<ArmedTimer> {
        self.slots.get(id.0 as usize).copied().flatten()
    }

    pub fn armed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Tokens of every running timer, in timer ID order
    pub fn pending_ticks(&self) -> heapless::Vec<TickToken, TIMER_COUNT> {
        self.slots.iter().flatten().map(|t| t.token).collect()
    }
}

impl TimerBank for MockTimerBank {
    fn arm(&mut self, id: TimerId, frequency_hz: u32, token: TickToken) -> Result<(), TimerError> {
        self.arm_calls += 1;
        if self.claimed == Some(id) {
            return Err(TimerError::Claimed(id));
        }
        let slot = self
            .slots
            .get_mut(id.0 as usize)
            .ok_or(TimerError::InvalidId(id))?;
        *slot = Some(ArmedTimer {
            frequency_hz,
            token,
        });
        Ok(())
    }

    fn disarm(&mut self, id: TimerId) -> Result<(), TimerError> {
        self.disarm_calls += 1;
        let slot = self
            .slots
            .get_mut(id.0 as usize)
            .ok_or(TimerError::InvalidId(id))?;
        slot.take().map(|_| ()).ok_or(TimerError::NotArmed(id))
    }

    fn source_frequency(&self, id: TimerId) -> Result<u64, TimerError> {
        if self.clock_fault {
            Err(TimerError::Hardware(id))
        } else if (id.0 as usize) < TIMER_COUNT {
            Ok(SOURCE_FREQUENCY_HZ)
        } else {
            Err(TimerError::InvalidId(id))
        }
    }
}

// ============================================================================
// Tick simulation
// ============================================================================

pub type TestLights<const MAX: usize> = LightSet<MockPin, MockTimerBank, MAX>;

/// Fire every armed timer once, as the hardware would on a shared 50 ms edge
pub fn tick_all<const MAX: usize>(lights: &mut TestLights<MAX>) {
    for token in lights.timers().pending_ticks() {
        lights.on_tick(token).unwrap();
    }
}

/// Delay that advances simulated time by firing the light set's timers
pub struct TickingDelay<'a, const MAX: usize> {
    lights: &'a SharedLightSet<MockPin, MockTimerBank, MAX>,
    pending_ns: u64,
    pub elapsed_ms: u64,
    pub ticks: u32,
}

impl<'a, const MAX: usize> TickingDelay<'a, MAX> {
    const TICK_NS: u64 = 50_000_000;

    pub fn new(lights: &'a SharedLightSet<MockPin, MockTimerBank, MAX>) -> Self {
        Self {
            lights,
            pending_ns: 0,
            elapsed_ms: 0,
            ticks: 0,
        }
    }

    fn advance(&mut self, ns: u64) {
        self.pending_ns += ns;
        while self.pending_ns >= Self::TICK_NS {
            self.pending_ns -= Self::TICK_NS;
            self.ticks += 1;
            critical_section::with(|cs| tick_all(&mut self.lights.borrow_ref_mut(cs)));
        }
    }
}

impl<const MAX: usize> DelayNs for TickingDelay<'_, MAX> {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(ns as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ms += ms as u64;
        self.advance(ms as u64 * 1_000_000);
    }
}
