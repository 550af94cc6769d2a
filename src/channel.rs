//! Lamp pattern channel with tick-driven state machine.
//!
//! Provides [`Channel`], which drives one lamp through steady, blink and
//! strobe patterns using a periodic hardware timer. The timer is armed through
//! a [`TimerBank`]; every tick the platform routes back to
//! [`Channel::on_tick`] advances the phase counter and toggles the lamp
//! during the flash window of the pattern.

use crate::command::ChannelAction;
use crate::light_set::ChannelId;
use crate::pin::LampPin;
use crate::timer::{TickCallback, TickToken, TimerBank, TimerError, TimerId};

/// Tick rate for both periodic patterns (one tick every 50 ms).
pub const TICK_HZ: u32 = 20;

/// Blink period: 2 s at [`TICK_HZ`].
pub const BLINK_PERIOD_TICKS: u8 = 40;

/// Blink toggles on the first four ticks: two flashes in the first 200 ms.
pub const BLINK_TOGGLE_TICKS: u8 = 4;

/// Strobe period: 1.75 s at [`TICK_HZ`].
pub const STROBE_PERIOD_TICKS: u8 = 35;

/// Strobe toggles on the first eight ticks: four flashes in the first 400 ms.
pub const STROBE_TOGGLE_TICKS: u8 = 8;

/// The pattern a channel is currently producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    /// No timer armed. Lamp is dark.
    Off,
    /// No timer armed. Lamp is lit.
    SteadyOn,
    /// Timer armed for the blink tick.
    Blink,
    /// Timer armed for the strobe tick.
    Strobe,
}

impl From<TickCallback> for Pattern {
    fn from(callback: TickCallback) -> Self {
        match callback {
            TickCallback::Blink => Pattern::Blink,
            TickCallback::Strobe => Pattern::Strobe,
        }
    }
}

/// Errors that can occur during channel operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    /// The timer bank refused to arm or disarm the channel's timer.
    Timer(TimerError),

    /// Reconfiguration attempted while the channel is not `Off`.
    Busy {
        /// The pattern the channel was producing
        pattern: Pattern,
    },
}

impl core::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChannelError::Timer(err) => write!(f, "timer error: {}", err),
            ChannelError::Busy { pattern } => {
                write!(f, "channel must be stopped first, but is in {:?}", pattern)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ChannelError {}

impl From<TimerError> for ChannelError {
    fn from(err: TimerError) -> Self {
        ChannelError::Timer(err)
    }
}

/// Drives a single lamp through steady, blink and strobe patterns.
///
/// Each channel owns its pin and is bound to one timer ID. The timer bank is
/// passed in on every operation so that several channels can share the
/// platform's pool; see [`LightSet`](crate::LightSet) for the arena that owns
/// both.
///
/// # Type Parameters
/// * `P` - Lamp pin implementation type
pub struct Channel<P: LampPin> {
    id: ChannelId,
    pin: P,
    timer_id: TimerId,
    binding: Option<TickCallback>,
    phase: u8,
    pattern: Pattern,
}

impl<P: LampPin> Channel<P> {
    /// Creates a new channel in `Off` with the lamp driven low.
    ///
    /// No timer is touched until a periodic pattern is started.
    pub fn new(id: ChannelId, mut pin: P, timer_id: TimerId) -> Self {
        pin.set_low();

        Self {
            id,
            pin,
            timer_id,
            binding: None,
            phase: 0,
            pattern: Pattern::Off,
        }
    }

    /// Handles a channel action by dispatching to the appropriate method.
    pub fn handle_action<B: TimerBank>(
        &mut self,
        action: ChannelAction,
        timers: &mut B,
    ) -> Result<(), ChannelError> {
        match action {
            ChannelAction::TurnOn => self.turn_on(timers),
            ChannelAction::Stop => self.stop(timers),
            ChannelAction::StartBlink => self.start_blink(timers),
            ChannelAction::StartStrobe => self.start_strobe(timers),
        }
    }

    /// Lights the lamp steadily. Can be called from any state.
    ///
    /// Disarms any running timer without forcing the lamp low first.
    pub fn turn_on<B: TimerBank>(&mut self, timers: &mut B) -> Result<(), ChannelError> {
        self.disarm(timers)?;

        self.pin.set_high();
        // Phase only counts in Blink and Strobe
        self.phase = 0;
        self.pattern = Pattern::SteadyOn;

        #[cfg(feature = "defmt")]
        defmt::debug!("{}: steady on", self.id);

        Ok(())
    }

    /// Disarms the timer (if armed) and turns the lamp off.
    ///
    /// Idempotent. Can be called from any state.
    pub fn stop<B: TimerBank>(&mut self, timers: &mut B) -> Result<(), ChannelError> {
        self.disarm(timers)?;

        self.pin.set_low();
        self.phase = 0;
        self.pattern = Pattern::Off;

        #[cfg(feature = "defmt")]
        defmt::debug!("{}: off", self.id);

        Ok(())
    }

    /// Starts the navigation double flash. Can be called from any state.
    pub fn start_blink<B: TimerBank>(&mut self, timers: &mut B) -> Result<(), ChannelError> {
        self.start_periodic(TickCallback::Blink, timers)
    }

    /// Starts the anti-collision quadruple flash. Can be called from any state.
    pub fn start_strobe<B: TimerBank>(&mut self, timers: &mut B) -> Result<(), ChannelError> {
        self.start_periodic(TickCallback::Strobe, timers)
    }

    fn start_periodic<B: TimerBank>(
        &mut self,
        callback: TickCallback,
        timers: &mut B,
    ) -> Result<(), ChannelError> {
        // Leaves the channel Off, dark and unbound if arming fails.
        self.stop(timers)?;

        timers.arm(self.timer_id, TICK_HZ, TickToken::new(self.id, callback))?;
        self.binding = Some(callback);
        self.pattern = callback.into();

        #[cfg(feature = "defmt")]
        defmt::debug!("{}: {} on timer {}", self.id, self.pattern, self.timer_id);

        Ok(())
    }

    fn disarm<B: TimerBank>(&mut self, timers: &mut B) -> Result<(), ChannelError> {
        if self.binding.is_none() {
            return Ok(());
        }

        match timers.disarm(self.timer_id) {
            Ok(()) | Err(TimerError::NotArmed(_)) => {
                self.binding = None;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Timer tick entry point. Runs in interrupt context.
    ///
    /// Ticks for a routine the channel is not currently armed for (for
    /// example an interrupt left pending across `stop`) are ignored.
    ///
    /// # Returns
    /// `true` if the tick advanced the pattern, `false` if it was ignored.
    pub fn on_tick(&mut self, callback: TickCallback) -> bool {
        if self.binding != Some(callback) {
            return false;
        }

        match callback {
            TickCallback::Blink => self.blink_tick(),
            TickCallback::Strobe => self.strobe_tick(),
        }
        true
    }

    fn blink_tick(&mut self) {
        if self.phase < BLINK_TOGGLE_TICKS {
            self.pin.toggle();
        }
        self.phase = (self.phase + 1) % BLINK_PERIOD_TICKS;
    }

    fn strobe_tick(&mut self) {
        if self.phase < STROBE_TOGGLE_TICKS {
            self.pin.toggle();
        }
        self.phase = (self.phase + 1) % STROBE_PERIOD_TICKS;
    }

    /// Moves the channel to another timer.
    ///
    /// Must be called from `Off`.
    pub fn set_timer_id(&mut self, timer_id: TimerId) -> Result<(), ChannelError> {
        if self.pattern != Pattern::Off {
            return Err(ChannelError::Busy {
                pattern: self.pattern,
            });
        }

        self.timer_id = timer_id;
        Ok(())
    }

    /// Returns the input clock of this channel's timer, in Hz.
    pub fn source_frequency<B: TimerBank>(&self, timers: &B) -> Result<u64, ChannelError> {
        Ok(timers.source_frequency(self.timer_id)?)
    }

    /// Returns this channel's identifier.
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Returns the timer this channel arms.
    pub fn timer_id(&self) -> TimerId {
        self.timer_id
    }

    /// Returns the current pattern.
    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// Returns the position within the current pattern period.
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Returns the routine the timer is armed for, if any.
    pub fn binding(&self) -> Option<TickCallback> {
        self.binding
    }

    /// Returns true if the channel's timer is armed.
    pub fn is_armed(&self) -> bool {
        self.binding.is_some()
    }

    /// Reads the lamp level back from the pin.
    pub fn is_lit(&mut self) -> bool {
        self.pin.read()
    }

    /// Returns a reference to the lamp pin.
    pub fn pin(&self) -> &P {
        &self.pin
    }
}
