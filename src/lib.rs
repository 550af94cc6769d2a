#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Channel`**: Drives one lamp through `Off`, `SteadyOn`, `Blink` and `Strobe`
//! - **`Pattern`**: The pattern a channel is currently producing
//! - **`LampPin`**: Trait to implement for your lamp output hardware
//! - **`TimerBank`**: Trait to implement over your platform's periodic timers
//! - **`TickToken`**: Context the timer bank hands back on every tick
//! - **`LightSet`**: Arena of channels that routes commands and ticks by `ChannelId`
//! - **`ChannelAction`**: Commands that can be sent to control channels
//!
//! Both periodic patterns tick at 20 Hz. Blink toggles on the first 4 of every
//! 40 ticks, strobe on the first 8 of every 35.

pub mod timer;
pub mod pin;
pub mod channel;
pub mod light_set;
pub mod command;
pub mod demo;

pub use channel::{
    BLINK_PERIOD_TICKS, BLINK_TOGGLE_TICKS, Channel, ChannelError, Pattern, STROBE_PERIOD_TICKS,
    STROBE_TOGGLE_TICKS, TICK_HZ,
};
pub use command::{ChannelAction, ChannelCommand};
pub use light_set::{ChannelId, LightSet, LightSetError, SharedLightSet, dispatch_tick};
pub use pin::{GpioLamp, LampPin};
pub use timer::{TickCallback, TickToken, TimerBank, TimerError, TimerId};
