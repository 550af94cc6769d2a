//! Demonstration sequences for a bench setup or a complete aircraft light set.
//!
//! These are plain composition functions over a [`SharedLightSet`]: each
//! control step runs inside a critical section and every dwell happens outside
//! it, so the timer interrupts keep ticking while the demo waits.

use embedded_hal::delay::DelayNs;

use crate::command::ChannelAction;
use crate::light_set::{ChannelId, LightSet, LightSetError, SharedLightSet};
use crate::pin::LampPin;
use crate::timer::{TimerBank, TimerId};

/// How long each self-test pattern is shown.
pub const DWELL_MS: u32 = 5_000;

/// Timer the self-test strobes on.
pub const SELF_TEST_STROBE_TIMER: TimerId = TimerId(11);

/// Timer the self-test blinks on.
pub const SELF_TEST_BLINK_TIMER: TimerId = TimerId(1);

/// Number of lamps in a full light set.
pub const FULL_LIGHT_SET_LAMPS: usize = 6;

/// Channel layout of the full light set, indexed by channel ID.
///
/// Two anti-collision strobes, two blinking beacons and two steady position
/// lights. The position lights never arm a timer, so they share a nominal ID.
pub const FULL_LIGHT_SET: [(ChannelAction, TimerId); FULL_LIGHT_SET_LAMPS] = [
    (ChannelAction::StartStrobe, TimerId(11)),
    (ChannelAction::StartStrobe, TimerId(12)),
    (ChannelAction::StartBlink, TimerId(13)),
    (ChannelAction::StartBlink, TimerId(14)),
    (ChannelAction::TurnOn, TimerId(4)),
    (ChannelAction::TurnOn, TimerId(4)),
];

/// Usage text shown for a missing or invalid mode argument.
pub const USAGE: &str = "usage: nav-lights <mode>
    1 ... strobe and blink test
    2 ... aircraft navigation and anti collision lights";

/// The two demonstration modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DemoMode {
    /// One lamp: strobe, blink, then steady on, 5 s each.
    SelfTest,
    /// Six lamps running the full navigation and anti-collision set.
    FullLightSet,
}

/// Invalid demo invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsageError {
    /// No mode argument given.
    MissingMode,

    /// More than one argument given.
    TooManyArguments,

    /// The argument is not a known mode.
    UnknownMode,
}

impl core::fmt::Display for UsageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let reason = match self {
            UsageError::MissingMode => "missing mode",
            UsageError::TooManyArguments => "too many arguments",
            UsageError::UnknownMode => "unknown mode",
        };
        write!(f, "{}\n{}", reason, USAGE)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UsageError {}

impl DemoMode {
    /// Parses a single mode argument (`"1"` or `"2"`).
    pub fn from_arg(arg: &str) -> Result<Self, UsageError> {
        match arg.trim() {
            "1" => Ok(DemoMode::SelfTest),
            "2" => Ok(DemoMode::FullLightSet),
            _ => Err(UsageError::UnknownMode),
        }
    }

    /// Parses the argument list following the program name.
    ///
    /// Exactly one argument is accepted.
    pub fn from_args<'a, I>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut args = args.into_iter();
        let mode = args.next().ok_or(UsageError::MissingMode)?;
        if args.next().is_some() {
            return Err(UsageError::TooManyArguments);
        }
        Self::from_arg(mode)
    }
}

impl core::str::FromStr for DemoMode {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_arg(s)
    }
}

/// Timer diagnostics captured when a periodic pattern starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerReport {
    pub timer_id: TimerId,
    pub source_frequency_hz: u64,
}

fn with_lights<P, B, const MAX: usize, R>(
    lights: &SharedLightSet<P, B, MAX>,
    f: impl FnOnce(&mut LightSet<P, B, MAX>) -> R,
) -> R
where
    P: LampPin,
    B: TimerBank,
{
    critical_section::with(|cs| f(&mut lights.borrow_ref_mut(cs)))
}

fn report<P, B, const MAX: usize>(
    lights: &LightSet<P, B, MAX>,
    channel: ChannelId,
    timer_id: TimerId,
) -> Result<TimerReport, LightSetError>
where
    P: LampPin,
    B: TimerBank,
{
    let source_frequency_hz = lights.source_frequency(channel)?;

    #[cfg(feature = "defmt")]
    defmt::info!(
        "timer {} source frequency {=u64} Hz",
        timer_id,
        source_frequency_hz
    );

    Ok(TimerReport {
        timer_id,
        source_frequency_hz,
    })
}

/// Starts `action` on `channel` from a dark lamp on `timer_id` and reports the timer.
///
/// The channel is stopped again if the report cannot be taken.
fn start_and_report<P, B, const MAX: usize>(
    lights: &mut LightSet<P, B, MAX>,
    channel: ChannelId,
    timer_id: TimerId,
    action: ChannelAction,
) -> Result<TimerReport, LightSetError>
where
    P: LampPin,
    B: TimerBank,
{
    lights.stop(channel)?;
    lights.set_timer_id(channel, timer_id)?;
    lights.handle_command(channel, action)?;

    report(lights, channel, timer_id).inspect_err(|_| {
        let _ = lights.stop(channel);
    })
}

/// Runs the single-lamp self test on `channel`.
///
/// Strobes on timer 11, then blinks on timer 1, then holds steady, dwelling
/// [`DWELL_MS`] on each and stopping in between. Whatever the channel was
/// doing beforehand is stopped first. The lamp is left off, also on error.
///
/// # Returns
/// The strobe and blink timer diagnostics, in that order.
pub fn run_self_test<P, B, D, const MAX: usize>(
    lights: &SharedLightSet<P, B, MAX>,
    channel: ChannelId,
    delay: &mut D,
) -> Result<[TimerReport; 2], LightSetError>
where
    P: LampPin,
    B: TimerBank,
    D: DelayNs,
{
    #[cfg(feature = "defmt")]
    defmt::info!("strobing");

    let strobe = with_lights(lights, |l| {
        start_and_report(l, channel, SELF_TEST_STROBE_TIMER, ChannelAction::StartStrobe)
    })?;
    delay.delay_ms(DWELL_MS);
    with_lights(lights, |l| l.stop(channel))?;

    #[cfg(feature = "defmt")]
    defmt::info!("blinking");

    let blink = with_lights(lights, |l| {
        start_and_report(l, channel, SELF_TEST_BLINK_TIMER, ChannelAction::StartBlink)
    })?;
    delay.delay_ms(DWELL_MS);
    with_lights(lights, |l| l.stop(channel))?;

    #[cfg(feature = "defmt")]
    defmt::info!("on");

    with_lights(lights, |l| l.turn_on(channel))?;
    delay.delay_ms(DWELL_MS);
    with_lights(lights, |l| l.stop(channel))?;

    #[cfg(feature = "defmt")]
    defmt::info!("self test done");

    Ok([strobe, blink])
}

/// Installs and starts the six-lamp light set described by [`FULL_LIGHT_SET`].
///
/// `pins[i]` becomes channel `i`. All patterns start inside one critical
/// section so the strobes and blinkers share a phase. If any lamp fails to
/// start, every lamp in the set is stopped before the error is returned.
pub fn install_full_light_set<P, B, const MAX: usize>(
    lights: &SharedLightSet<P, B, MAX>,
    pins: [P; FULL_LIGHT_SET_LAMPS],
) -> Result<(), LightSetError>
where
    P: LampPin,
    B: TimerBank,
{
    with_lights(lights, |l| {
        for (idx, pin) in pins.into_iter().enumerate() {
            let (_, timer_id) = FULL_LIGHT_SET[idx];
            l.add_channel(ChannelId(idx), pin, timer_id)?;
        }

        let started = FULL_LIGHT_SET
            .iter()
            .enumerate()
            .try_for_each(|(idx, (action, _))| l.handle_command(ChannelId(idx), *action));
        if let Err(err) = started {
            let _ = l.stop_all();
            return Err(err);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("light set running: {} lamps", l.len());

        Ok(())
    })
}
