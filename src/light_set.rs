use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;

use crate::channel::{Channel, ChannelError, Pattern};
use crate::command::{ChannelAction, ChannelCommand};
use crate::pin::LampPin;
use crate::timer::{TickToken, TimerBank, TimerId};

/// An identifier for a channel within a light set.
///
/// Doubles as the arena index: the timer bank hands it back inside every
/// [`TickToken`] so the tick reaches exactly one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(pub usize);

impl From<usize> for ChannelId {
    fn from(id: usize) -> Self {
        ChannelId(id)
    }
}

impl From<ChannelId> for usize {
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

/// Errors that can occur during light set operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightSetError {
    /// The specified channel ID does not exist in the light set.
    InvalidChannelId(ChannelId),

    /// Attempted to add a channel with an ID that already exists.
    DuplicateChannelId(ChannelId),

    /// The channel ID exceeds the light set's capacity.
    ChannelIdOutOfBounds { id: ChannelId, capacity: usize },

    /// Another channel currently has this timer armed.
    TimerInUse { timer: TimerId, owner: ChannelId },

    /// A channel operation failed.
    Channel(ChannelError),
}

impl core::fmt::Display for LightSetError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LightSetError::InvalidChannelId(id) => {
                write!(f, "channel ID {} does not exist in light set", id.0)
            }
            LightSetError::DuplicateChannelId(id) => {
                write!(f, "channel ID {} already exists in light set", id.0)
            }
            LightSetError::ChannelIdOutOfBounds { id, capacity } => {
                write!(
                    f,
                    "channel ID {} exceeds light set capacity of {}",
                    id.0, capacity
                )
            }
            LightSetError::TimerInUse { timer, owner } => {
                write!(f, "timer {} is armed by channel {}", timer.0, owner.0)
            }
            LightSetError::Channel(err) => {
                write!(f, "channel error: {}", err)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LightSetError {}

impl From<ChannelError> for LightSetError {
    fn from(err: ChannelError) -> Self {
        LightSetError::Channel(err)
    }
}

/// A light set shared between thread mode and the timer interrupt handlers.
pub type SharedLightSet<P, B, const MAX: usize> = Mutex<RefCell<LightSet<P, B, MAX>>>;

/// Routes a timer tick to its channel from inside an interrupt handler.
///
/// Call this from every timer ISR with the token the timer was armed with.
pub fn dispatch_tick<P, B, const MAX: usize>(
    lights: &SharedLightSet<P, B, MAX>,
    token: TickToken,
) -> Result<bool, LightSetError>
where
    P: LampPin,
    B: TimerBank,
{
    critical_section::with(|cs| lights.borrow_ref_mut(cs).on_tick(token))
}

/// Manages a set of pattern channels sharing one timer bank.
///
/// This is the arena the timer interrupts index into: each channel is stored
/// under a user-specified `ChannelId`, and each armed timer carries a
/// [`TickToken`] naming that ID. Commands and ticks are both routed through
/// here, so wrapping the set in a [`SharedLightSet`] serializes them.
///
/// # Type Parameters
/// * `P` - Lamp pin implementation type (must be same for all channels in the set)
/// * `B` - Timer bank implementation type
/// * `MAX` - Maximum number of channels this set can hold
pub struct LightSet<P: LampPin, B: TimerBank, const MAX: usize> {
    channels: [Option<Channel<P>>; MAX],
    timers: B,
}

impl<P, B, const MAX: usize> LightSet<P, B, MAX>
where
    P: LampPin,
    B: TimerBank,
{
    /// Creates a new empty light set owning the timer bank.
    ///
    /// Usable in a `static` initialiser.
    pub const fn new(timers: B) -> Self {
        Self {
            channels: [const { None }; MAX],
            timers,
        }
    }

    /// Adds a channel driving `pin` from timer `timer_id`.
    ///
    /// The channel starts `Off` with its lamp low. Timer conflicts are only
    /// checked when a periodic pattern is started, so channels that never
    /// blink may share a nominal timer ID.
    ///
    /// # Errors
    /// * `DuplicateChannelId` - A channel with this ID already exists
    /// * `ChannelIdOutOfBounds` - The ID exceeds the set's capacity
    pub fn add_channel(
        &mut self,
        id: ChannelId,
        pin: P,
        timer_id: TimerId,
    ) -> Result<(), LightSetError> {
        let idx = id.0;

        if idx >= MAX {
            return Err(LightSetError::ChannelIdOutOfBounds { id, capacity: MAX });
        }

        if self.channels[idx].is_some() {
            return Err(LightSetError::DuplicateChannelId(id));
        }

        self.channels[idx] = Some(Channel::new(id, pin, timer_id));
        Ok(())
    }

    /// Routes a command to its channel.
    pub fn dispatch(&mut self, command: ChannelCommand) -> Result<(), LightSetError> {
        self.handle_command(command.channel_id, command.action)
    }

    /// Routes an action to the specified channel.
    ///
    /// # Errors
    /// * `InvalidChannelId` - No channel with this ID
    /// * `TimerInUse` - Starting a periodic pattern on a timer another channel has armed
    /// * `Channel` - The channel operation failed
    pub fn handle_command(
        &mut self,
        id: ChannelId,
        action: ChannelAction,
    ) -> Result<(), LightSetError> {
        if matches!(
            action,
            ChannelAction::StartBlink | ChannelAction::StartStrobe
        ) {
            let timer = self.slot(id)?.timer_id();
            if let Some(owner) = self.armed_owner(timer, id) {
                return Err(LightSetError::TimerInUse { timer, owner });
            }
        }

        let channel = self
            .channels
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(LightSetError::InvalidChannelId(id))?;
        Ok(channel.handle_action(action, &mut self.timers)?)
    }

    /// Lights the channel steadily.
    pub fn turn_on(&mut self, id: ChannelId) -> Result<(), LightSetError> {
        self.handle_command(id, ChannelAction::TurnOn)
    }

    /// Stops the channel and turns its lamp off.
    pub fn stop(&mut self, id: ChannelId) -> Result<(), LightSetError> {
        self.handle_command(id, ChannelAction::Stop)
    }

    /// Starts the blink pattern on the channel.
    pub fn start_blink(&mut self, id: ChannelId) -> Result<(), LightSetError> {
        self.handle_command(id, ChannelAction::StartBlink)
    }

    /// Starts the strobe pattern on the channel.
    pub fn start_strobe(&mut self, id: ChannelId) -> Result<(), LightSetError> {
        self.handle_command(id, ChannelAction::StartStrobe)
    }

    /// Stops every channel in the set.
    pub fn stop_all(&mut self) -> Result<(), LightSetError> {
        for channel in self.channels.iter_mut().flatten() {
            channel.stop(&mut self.timers)?;
        }
        Ok(())
    }

    /// Delivers one timer tick to the channel named by `token`.
    ///
    /// Runs in interrupt context.
    ///
    /// # Returns
    /// * `Ok(true)` - The tick advanced the channel's pattern
    /// * `Ok(false)` - The channel is no longer armed for this routine
    /// * `Err` - No channel with the token's ID
    pub fn on_tick(&mut self, token: TickToken) -> Result<bool, LightSetError> {
        let channel = self.slot_mut(token.channel)?;
        Ok(channel.on_tick(token.callback))
    }

    /// Moves a stopped channel to another timer.
    pub fn set_timer_id(&mut self, id: ChannelId, timer_id: TimerId) -> Result<(), LightSetError> {
        Ok(self.slot_mut(id)?.set_timer_id(timer_id)?)
    }

    /// Returns the input clock of the channel's timer, in Hz.
    pub fn source_frequency(&self, id: ChannelId) -> Result<u64, LightSetError> {
        Ok(self.slot(id)?.source_frequency(&self.timers)?)
    }

    /// Returns the current pattern of the specified channel.
    pub fn pattern(&self, id: ChannelId) -> Result<Pattern, LightSetError> {
        Ok(self.slot(id)?.pattern())
    }

    /// Reads the lamp level of the specified channel back from its pin.
    pub fn is_lit(&mut self, id: ChannelId) -> Result<bool, LightSetError> {
        Ok(self.slot_mut(id)?.is_lit())
    }

    /// Returns the IDs of all channels with an armed timer, in ID order.
    pub fn armed_channels(&self) -> Vec<ChannelId, MAX> {
        self.channels
            .iter()
            .flatten()
            .filter(|c| c.is_armed())
            .map(Channel::id)
            .collect()
    }

    /// Returns the channel stored under `id`, if any.
    pub fn channel(&self, id: ChannelId) -> Option<&Channel<P>> {
        self.channels.get(id.0).and_then(Option::as_ref)
    }

    /// Returns the timer bank.
    pub fn timers(&self) -> &B {
        &self.timers
    }

    /// Returns the timer bank mutably.
    pub fn timers_mut(&mut self) -> &mut B {
        &mut self.timers
    }

    /// Returns the number of channels currently in the set.
    pub fn len(&self) -> usize {
        self.channels.iter().filter(|c| c.is_some()).count()
    }

    /// Returns true if the set contains no channels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the set contains a channel with the given ID.
    pub fn contains(&self, id: ChannelId) -> bool {
        self.channel(id).is_some()
    }

    fn slot(&self, id: ChannelId) -> Result<&Channel<P>, LightSetError> {
        self.channel(id).ok_or(LightSetError::InvalidChannelId(id))
    }

    fn slot_mut(&mut self, id: ChannelId) -> Result<&mut Channel<P>, LightSetError> {
        self.channels
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(LightSetError::InvalidChannelId(id))
    }

    fn armed_owner(&self, timer: TimerId, requester: ChannelId) -> Option<ChannelId> {
        self.channels
            .iter()
            .flatten()
            .find(|c| c.id() != requester && c.is_armed() && c.timer_id() == timer)
            .map(Channel::id)
    }
}
