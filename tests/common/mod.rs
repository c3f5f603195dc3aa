//! Shared mocks for dop-led integration tests

#![allow(dead_code, unreachable_pub)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use dop_led::{
    HBridge, HBridgeOutput, OutputState, Pulse, PulseTrain, Symbol, TransmitError, Transmitter,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};

// ============================================================================
// Event log
// ============================================================================

/// Hardware side effect observed by the mocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Pin(HBridgeOutput, bool),
    Duty(u16),
    TransmitterEnabled(bool),
    Transmit,
    DelayNs(u32),
    DelayMs(u32),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

// ============================================================================
// Mock transmitter
// ============================================================================

/// Transmitter that records every frame it accepts
#[derive(Default)]
pub struct MockTransmitter {
    pub frames: Vec<Vec<Pulse>>,
    pub busy: bool,
    pub fault: bool,
    pub enabled: Option<bool>,
    pub log: Option<EventLog>,
}

impl MockTransmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: &EventLog) -> Self {
        Self {
            log: Some(log.clone()),
            ..Self::default()
        }
    }

    pub fn last_frame(&self) -> Option<&[Pulse]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl Transmitter for MockTransmitter {
    fn transmit(&mut self, pulses: PulseTrain<'_>) -> Result<(), TransmitError> {
        if self.busy {
            return Err(TransmitError::Busy);
        }
        if self.fault {
            return Err(TransmitError::Fault);
        }
        self.frames.push(pulses.collect());
        if let Some(log) = &self.log {
            log.borrow_mut().push(Event::Transmit);
        }
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = Some(enabled);
        if let Some(log) = &self.log {
            log.borrow_mut().push(Event::TransmitterEnabled(enabled));
        }
    }
}

// ============================================================================
// Mock outputs
// ============================================================================

/// Binary output recording its writes
pub struct MockPin {
    output: HBridgeOutput,
    log: EventLog,
    pub fail: bool,
}

impl MockPin {
    pub fn new(output: HBridgeOutput, log: &EventLog) -> Self {
        Self {
            output,
            log: log.clone(),
            fail: false,
        }
    }

    fn write(&mut self, on: bool) -> Result<(), digital::ErrorKind> {
        if self.fail {
            return Err(digital::ErrorKind::Other);
        }
        self.log.borrow_mut().push(Event::Pin(self.output, on));
        Ok(())
    }
}

impl digital::ErrorType for MockPin {
    type Error = digital::ErrorKind;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

/// PWM output with an 8-bit range
pub struct MockPwm {
    log: EventLog,
}

impl MockPwm {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl pwm::ErrorType for MockPwm {
    type Error = pwm::ErrorKind;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Duty(duty));
        Ok(())
    }
}

/// Delay that only records how long it was asked to wait
pub struct MockDelay {
    log: EventLog,
}

impl MockDelay {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::DelayNs(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::DelayMs(ms));
    }
}

pub type TestBridge = HBridge<MockTransmitter, MockPin, MockPin, MockPwm, MockPin, MockDelay>;

/// Bridge with every output wired to `log`
pub fn test_bridge(log: &EventLog) -> TestBridge {
    HBridge::builder(MockTransmitter::with_log(log), MockDelay::new(log))
        .output_2v5(MockPin::new(HBridgeOutput::Reference2v5, log))
        .output_p2(MockPin::new(HBridgeOutput::P2, log))
        .output_n1_pwm(MockPwm::new(log))
        .output_n2(MockPin::new(HBridgeOutput::N2, log))
        .build()
        .unwrap()
}

/// Replay output events, checking every intermediate combination.
///
/// Starts from all outputs off and returns the final state.
pub fn replay_outputs(events: &[Event]) -> OutputState {
    let mut state = OutputState::OFF;
    for event in events {
        match *event {
            Event::Pin(HBridgeOutput::Reference2v5, on) => state.reference_2v5 = on,
            Event::Pin(HBridgeOutput::P2, on) => state.p2 = on,
            Event::Pin(HBridgeOutput::N2, on) => state.n2 = on,
            Event::Pin(HBridgeOutput::N1Pwm, _) => unreachable!("N1 is a PWM output"),
            Event::Duty(duty) => state.n1_duty = u8::try_from(duty).unwrap(),
            Event::TransmitterEnabled(enabled) => state.transmitter_enabled = enabled,
            Event::Transmit | Event::DelayNs(_) | Event::DelayMs(_) => continue,
        }
        assert!(
            !state.is_conflicting(),
            "conflicting outputs after {:?}: {:?}",
            event,
            state
        );
    }
    state
}

// ============================================================================
// Frame helpers
// ============================================================================

/// Pack data symbols into bytes, MSB first
pub fn data_bytes_msb_first(symbols: &[Symbol]) -> Vec<u8> {
    symbols
        .chunks(8)
        .map(|chunk| {
            chunk.iter().fold(0u8, |byte, symbol| {
                (byte << 1) | u8::from(symbol.bit().expect("data symbol"))
            })
        })
        .collect()
}

/// Pack data symbols into bytes, LSB first
pub fn data_bytes_lsb_first(symbols: &[Symbol]) -> Vec<u8> {
    symbols
        .chunks(8)
        .map(|chunk| {
            chunk.iter().enumerate().fold(0u8, |byte, (i, symbol)| {
                byte | (u8::from(symbol.bit().expect("data symbol")) << i)
            })
        })
        .collect()
}
