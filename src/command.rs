//! Command-based control for pattern channels.

use crate::light_set::ChannelId;

/// Actions for controlling channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelAction {
    /// Steady on.
    TurnOn,
    /// Disarm and go dark.
    Stop,
    /// Navigation double flash.
    StartBlink,
    /// Anti-collision quadruple flash.
    StartStrobe,
}

/// Command targeting a specific channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelCommand {
    pub channel_id: ChannelId,
    pub action: ChannelAction,
}

impl ChannelCommand {
    /// Creates command.
    pub fn new(channel_id: ChannelId, action: ChannelAction) -> Self {
        Self { channel_id, action }
    }
}
