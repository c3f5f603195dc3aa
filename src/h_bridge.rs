//! Four-output H-bridge front end.
//!
//! The bridge drives the LED string's two wires from four outputs:
//!
//! - `2V5`: reference/bias supply for the data signal
//! - `P2`: high-side switch (binary)
//! - `N1`: low-side PWM switch, used for plain white dimming
//! - `N2`: low-side switch (binary)
//!
//! Each [`DriveLevel`] maps to one fixed [`OutputState`]. Switching between
//! levels is break-before-make: outputs that must go off are switched off
//! first, currents settle, then the required outputs are switched on. No
//! conflicting combination is ever written.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::Transmitter;
use crate::error::{ConfigError, HBridgeError, HBridgeOutput, TransmitError};
use crate::pulse::PulseTrain;

/// Time for bridge currents to settle between break and make
pub const SETTLE_TIME_MS: u32 = 2;

/// Drive level selected on the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveLevel {
    /// Everything off, string unpowered
    Off,
    /// Biased for DoP data, transmitter enabled
    Data,
    /// Plain white through the PWM leg with the given brightness
    White(u8),
}

impl DriveLevel {
    /// Output combination for this level
    pub const fn output_state(self) -> OutputState {
        match self {
            Self::Off => OutputState::OFF,
            Self::Data => OutputState {
                reference_2v5: true,
                p2: false,
                n1_duty: 0,
                n2: true,
                transmitter_enabled: true,
            },
            Self::White(brightness) => OutputState {
                reference_2v5: false,
                p2: true,
                n1_duty: brightness,
                n2: false,
                transmitter_enabled: false,
            },
        }
    }
}

/// Combined state of the bridge outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputState {
    pub reference_2v5: bool,
    pub p2: bool,
    pub n1_duty: u8,
    pub n2: bool,
    pub transmitter_enabled: bool,
}

impl OutputState {
    pub const OFF: Self = Self {
        reference_2v5: false,
        p2: false,
        n1_duty: 0,
        n2: false,
        transmitter_enabled: false,
    };

    /// Check for combinations that short the bridge or fight the data line
    pub const fn is_conflicting(&self) -> bool {
        let data_side = self.reference_2v5 || self.n2 || self.transmitter_enabled;
        let white_side = self.p2 || self.n1_duty > 0;
        data_side && white_side
    }

    /// Keep only what is on in both states
    const fn intersect(self, other: Self) -> Self {
        Self {
            reference_2v5: self.reference_2v5 && other.reference_2v5,
            p2: self.p2 && other.p2,
            n1_duty: if self.n1_duty == other.n1_duty {
                self.n1_duty
            } else {
                0
            },
            n2: self.n2 && other.n2,
            transmitter_enabled: self.transmitter_enabled && other.transmitter_enabled,
        }
    }
}

/// H-bridge adapter wrapping the raw transmitter.
///
/// Implements [`Transmitter`], switching to [`DriveLevel::Data`] before any
/// frame is passed through.
pub struct HBridge<T, V, P, N1, N2, D> {
    transmitter: T,
    output_2v5: V,
    output_p2: P,
    output_n1_pwm: N1,
    output_n2: N2,
    delay: D,
    level: Option<DriveLevel>,
    // `None` until the first drive: real pin states are unknown
    state: Option<OutputState>,
}

impl<T, V, P, N1, N2, D> HBridge<T, V, P, N1, N2, D>
where
    T: Transmitter,
    V: OutputPin,
    P: OutputPin,
    N1: SetDutyCycle,
    N2: OutputPin,
    D: DelayNs,
{
    /// Create a bridge from a complete output set
    pub fn new(
        transmitter: T,
        output_2v5: V,
        output_p2: P,
        output_n1_pwm: N1,
        output_n2: N2,
        delay: D,
    ) -> Self {
        Self {
            transmitter,
            output_2v5,
            output_p2,
            output_n1_pwm,
            output_n2,
            delay,
            level: None,
            state: None,
        }
    }

    /// Start a builder; every output is mandatory
    pub fn builder(transmitter: T, delay: D) -> HBridgeBuilder<T, V, P, N1, N2, D> {
        HBridgeBuilder::new(transmitter, delay)
    }

    /// Currently selected level, `None` before the first drive
    pub const fn level(&self) -> Option<DriveLevel> {
        self.level
    }

    /// Last output combination written
    pub const fn output_state(&self) -> Option<OutputState> {
        self.state
    }

    pub fn transmitter(&self) -> &T {
        &self.transmitter
    }

    pub fn transmitter_mut(&mut self) -> &mut T {
        &mut self.transmitter
    }

    /// Switch the bridge to `level`.
    ///
    /// Changing brightness within [`DriveLevel::White`] only updates the PWM
    /// duty. Any other change goes through break, settle, make.
    pub fn drive(&mut self, level: DriveLevel) -> Result<(), HBridgeError> {
        if self.level == Some(level) {
            return Ok(());
        }
        let target = level.output_state();

        if let (Some(DriveLevel::White(_)), DriveLevel::White(brightness)) = (self.level, level) {
            self.write_n1(brightness)?;
            self.level = Some(level);
            return Ok(());
        }

        #[cfg(feature = "esp32-log")]
        println!("h_bridge: switching {:?} -> {:?}", self.level, level);

        // Unknown pin states are treated as fully on, so the first drive
        // switches every output off before making the target.
        let broken = match self.state {
            Some(current) => current.intersect(target),
            None => OutputState::OFF,
        };
        let needs_settle = broken != target && self.state != Some(broken);
        self.level = None;

        let result = self.switch(broken, needs_settle, target);
        match result {
            Ok(()) => self.level = Some(level),
            // Outputs not yet written are in an unknown state again
            Err(_) => self.state = None,
        }
        result
    }

    fn switch(
        &mut self,
        broken: OutputState,
        needs_settle: bool,
        target: OutputState,
    ) -> Result<(), HBridgeError> {
        self.apply_break(broken)?;
        if needs_settle {
            self.delay.delay_ms(SETTLE_TIME_MS);
        }
        self.apply_make(target)
    }

    fn apply_break(&mut self, broken: OutputState) -> Result<(), HBridgeError> {
        let current = self.state;
        let was_on = |on: fn(&OutputState) -> bool| current.is_none_or(|state| on(&state));

        if !broken.reference_2v5 && was_on(|s| s.reference_2v5) {
            self.write_2v5(false)?;
        }
        if !broken.n2 && was_on(|s| s.n2) {
            self.write_n2(false)?;
        }
        if !broken.transmitter_enabled && was_on(|s| s.transmitter_enabled) {
            self.write_transmitter(false);
        }
        if broken.n1_duty == 0 && was_on(|s| s.n1_duty > 0) {
            self.write_n1(0)?;
        }
        if !broken.p2 && was_on(|s| s.p2) {
            self.write_p2(false)?;
        }
        Ok(())
    }

    fn apply_make(&mut self, target: OutputState) -> Result<(), HBridgeError> {
        let current = self.state.unwrap_or(OutputState::OFF);

        if target.n2 && !current.n2 {
            self.write_n2(true)?;
        }
        if target.transmitter_enabled && !current.transmitter_enabled {
            self.write_transmitter(true);
        }
        if target.reference_2v5 && !current.reference_2v5 {
            self.write_2v5(true)?;
        }
        if target.n1_duty != current.n1_duty {
            self.write_n1(target.n1_duty)?;
        }
        if target.p2 && !current.p2 {
            self.write_p2(true)?;
        }
        Ok(())
    }

    fn state_mut(&mut self) -> &mut OutputState {
        self.state.get_or_insert(OutputState::OFF)
    }

    fn write_2v5(&mut self, on: bool) -> Result<(), HBridgeError> {
        set_pin(&mut self.output_2v5, on)
            .map_err(|()| HBridgeError::Output(HBridgeOutput::Reference2v5))?;
        self.state_mut().reference_2v5 = on;
        Ok(())
    }

    fn write_p2(&mut self, on: bool) -> Result<(), HBridgeError> {
        set_pin(&mut self.output_p2, on).map_err(|()| HBridgeError::Output(HBridgeOutput::P2))?;
        self.state_mut().p2 = on;
        Ok(())
    }

    fn write_n2(&mut self, on: bool) -> Result<(), HBridgeError> {
        set_pin(&mut self.output_n2, on).map_err(|()| HBridgeError::Output(HBridgeOutput::N2))?;
        self.state_mut().n2 = on;
        Ok(())
    }

    fn write_n1(&mut self, duty: u8) -> Result<(), HBridgeError> {
        let result = if duty == 0 {
            self.output_n1_pwm.set_duty_cycle_fully_off()
        } else {
            self.output_n1_pwm
                .set_duty_cycle_fraction(u16::from(duty), u16::from(u8::MAX))
        };
        result.map_err(|_| HBridgeError::Output(HBridgeOutput::N1Pwm))?;
        self.state_mut().n1_duty = duty;
        Ok(())
    }

    fn write_transmitter(&mut self, enabled: bool) {
        self.transmitter.set_enabled(enabled);
        self.state_mut().transmitter_enabled = enabled;
    }
}

fn set_pin<O: OutputPin>(pin: &mut O, on: bool) -> Result<(), ()> {
    let result = if on { pin.set_high() } else { pin.set_low() };
    result.map_err(|_| ())
}

impl<T, V, P, N1, N2, D> Transmitter for HBridge<T, V, P, N1, N2, D>
where
    T: Transmitter,
    V: OutputPin,
    P: OutputPin,
    N1: SetDutyCycle,
    N2: OutputPin,
    D: DelayNs,
{
    fn transmit(&mut self, pulses: PulseTrain<'_>) -> Result<(), TransmitError> {
        self.drive(DriveLevel::Data)?;
        self.transmitter.transmit(pulses)
    }
}

/// Collects the H-bridge outputs and checks that none is missing
pub struct HBridgeBuilder<T, V, P, N1, N2, D> {
    transmitter: T,
    delay: D,
    output_2v5: Option<V>,
    output_p2: Option<P>,
    output_n1_pwm: Option<N1>,
    output_n2: Option<N2>,
}

impl<T, V, P, N1, N2, D> HBridgeBuilder<T, V, P, N1, N2, D>
where
    T: Transmitter,
    V: OutputPin,
    P: OutputPin,
    N1: SetDutyCycle,
    N2: OutputPin,
    D: DelayNs,
{
    pub fn new(transmitter: T, delay: D) -> Self {
        Self {
            transmitter,
            delay,
            output_2v5: None,
            output_p2: None,
            output_n1_pwm: None,
            output_n2: None,
        }
    }

    #[must_use]
    pub fn output_2v5(mut self, output: V) -> Self {
        self.output_2v5 = Some(output);
        self
    }

    #[must_use]
    pub fn output_p2(mut self, output: P) -> Self {
        self.output_p2 = Some(output);
        self
    }

    #[must_use]
    pub fn output_n1_pwm(mut self, output: N1) -> Self {
        self.output_n1_pwm = Some(output);
        self
    }

    #[must_use]
    pub fn output_n2(mut self, output: N2) -> Self {
        self.output_n2 = Some(output);
        self
    }

    /// Build the bridge.
    ///
    /// Fails with [`ConfigError::MissingOutput`] for the first missing output.
    /// Nothing is written to the hardware here.
    pub fn build(self) -> Result<HBridge<T, V, P, N1, N2, D>, ConfigError> {
        let missing = ConfigError::MissingOutput;
        let output_2v5 = self
            .output_2v5
            .ok_or(missing(HBridgeOutput::Reference2v5))?;
        let output_p2 = self.output_p2.ok_or(missing(HBridgeOutput::P2))?;
        let output_n1_pwm = self.output_n1_pwm.ok_or(missing(HBridgeOutput::N1Pwm))?;
        let output_n2 = self.output_n2.ok_or(missing(HBridgeOutput::N2))?;

        Ok(HBridge::new(
            self.transmitter,
            output_2v5,
            output_p2,
            output_n1_pwm,
            output_n2,
            self.delay,
        ))
    }
}
