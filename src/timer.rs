//! Periodic timer abstraction for platform-agnostic tick generation.
//!
//! The platform owns a fixed pool of hardware timers, each identified by a
//! small integer. Arming a timer hands it a [`TickToken`]; the platform's
//! interrupt handler passes that token back to
//! [`LightSet::on_tick`](crate::LightSet::on_tick) on every tick.

use crate::light_set::ChannelId;

/// Identifier of one hardware periodic timer in the platform's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerId(pub u8);

impl From<u8> for TimerId {
    fn from(id: u8) -> Self {
        TimerId(id)
    }
}

impl From<TimerId> for u8 {
    fn from(id: TimerId) -> Self {
        id.0
    }
}

/// Which tick routine a timer was armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickCallback {
    /// Double flash, 40 tick period.
    Blink,
    /// Quadruple flash, 35 tick period.
    Strobe,
}

/// Context handed to the platform when a timer is armed.
///
/// The platform stores it alongside the timer and returns it unchanged on
/// every tick. It names exactly one channel and the routine it was armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickToken {
    pub channel: ChannelId,
    pub callback: TickCallback,
}

impl TickToken {
    /// Creates a token.
    pub fn new(channel: ChannelId, callback: TickCallback) -> Self {
        Self { channel, callback }
    }
}

/// Errors reported by a [`TimerBank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// The platform has no timer with this ID.
    InvalidId(TimerId),

    /// The timer exists but is reserved by something else on the platform.
    Claimed(TimerId),

    /// Disarm was requested for a timer that is not running.
    NotArmed(TimerId),

    /// The timer hardware rejected the request (e.g. unreachable frequency).
    Hardware(TimerId),
}

impl core::fmt::Display for TimerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TimerError::InvalidId(id) => write!(f, "timer {} does not exist", id.0),
            TimerError::Claimed(id) => write!(f, "timer {} is already claimed", id.0),
            TimerError::NotArmed(id) => write!(f, "timer {} is not armed", id.0),
            TimerError::Hardware(id) => write!(f, "timer {} hardware fault", id.0),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TimerError {}

/// Trait for abstracting the platform's pool of periodic timers.
///
/// Implement this on top of your HAL's timer peripherals. Both `arm` and
/// `disarm` must take effect synchronously: once `disarm` returns, the timer
/// must not raise another tick.
pub trait TimerBank {
    /// Starts timer `id` firing at `frequency_hz`, delivering `token` on each tick.
    ///
    /// Arming a timer that is already running replaces its frequency and token.
    fn arm(&mut self, id: TimerId, frequency_hz: u32, token: TickToken) -> Result<(), TimerError>;

    /// Stops timer `id`.
    ///
    /// Returns [`TimerError::NotArmed`] if the timer was not running.
    fn disarm(&mut self, id: TimerId) -> Result<(), TimerError>;

    /// Returns the input clock of timer `id` in Hz. Used for diagnostics only.
    fn source_frequency(&self, id: TimerId) -> Result<u64, TimerError>;
}
