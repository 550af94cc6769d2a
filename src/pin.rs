//! Lamp output abstraction.
//!
//! Defines the [`LampPin`] trait the pattern channels drive, and a
//! [`GpioLamp`] adapter for any `embedded-hal` stateful output pin.

use core::convert::Infallible;
use embedded_hal::digital::StatefulOutputPin;

/// Trait for abstracting a single digital output line driving a lamp.
///
/// Implement this for your GPIO hardware. Handle any hardware errors
/// internally: these methods are called from interrupt context and cannot fail.
pub trait LampPin {
    /// Drives the line high (lamp lit).
    fn set_high(&mut self);

    /// Drives the line low (lamp dark).
    fn set_low(&mut self);

    /// Inverts the current output level.
    fn toggle(&mut self);

    /// Reads back the current output level.
    ///
    /// Must reflect the hardware output register, not a software copy.
    fn read(&mut self) -> bool;
}

/// Adapter implementing [`LampPin`] for an `embedded-hal` push-pull output.
///
/// Only pins with an infallible error type are accepted, which covers the
/// on-chip GPIO of every common HAL.
pub struct GpioLamp<P> {
    pin: P,
}

impl<P> GpioLamp<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    /// Wraps a configured output pin.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Releases the wrapped pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> LampPin for GpioLamp<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    fn set_high(&mut self) {
        self.pin.set_high().unwrap_or_else(|e| match e {});
    }

    fn set_low(&mut self) {
        self.pin.set_low().unwrap_or_else(|e| match e {});
    }

    fn toggle(&mut self) {
        self.pin.toggle().unwrap_or_else(|e| match e {});
    }

    fn read(&mut self) -> bool {
        self.pin.is_set_high().unwrap_or_else(|e| match e {})
    }
}
