//! Symbol to pulse encoding.
//!
//! Every symbol becomes one mark/space pair. Data bits differ only in the
//! length of the mark; the space is constant. Preamble frames are
//! terminated with one latch pulse so the string knows the frame is over.

use core::iter::FusedIterator;

use crate::frame::{Frame, Framing, Symbol};

/// Mark (high) then space (low), both in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pulse {
    pub high_us: u16,
    pub low_us: u16,
}

impl Pulse {
    pub const fn new(high_us: u16, low_us: u16) -> Self {
        Self { high_us, low_us }
    }

    /// Total duration of the pulse
    pub const fn period_us(self) -> u32 {
        self.high_us as u32 + self.low_us as u32
    }
}

/// Pulse widths used on the wire
///
/// The defaults are the shortest values that drive DoP strings reliably.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DopTimings {
    /// Mark length of a 1 bit
    pub bit_one_high_us: u16,
    /// Mark length of a 0 bit
    pub bit_zero_high_us: u16,
    /// Space after every bit
    pub bit_low_us: u16,
    /// Mark length of a header marker, distinct from both data marks
    pub marker_high_us: u16,
    /// Mark and space length of the latch
    pub latch_us: u16,
}

impl DopTimings {
    pub const DEFAULT: Self = Self {
        bit_one_high_us: 135,
        bit_zero_high_us: 80,
        bit_low_us: 80,
        marker_high_us: 190,
        latch_us: 250,
    };

    /// Pulse for one symbol
    pub const fn pulse(&self, symbol: Symbol) -> Pulse {
        match symbol {
            Symbol::Marker => Pulse::new(self.marker_high_us, self.bit_low_us),
            Symbol::Zero => Pulse::new(self.bit_zero_high_us, self.bit_low_us),
            Symbol::One => Pulse::new(self.bit_one_high_us, self.bit_low_us),
            Symbol::Latch => Pulse::new(self.latch_us, self.latch_us),
        }
    }
}

impl Default for DopTimings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Pulses for one frame, ready to hand to a transmitter
#[derive(Debug, Clone)]
pub struct PulseTrain<'a> {
    frame: Frame<'a>,
    timings: DopTimings,
    trailing_latch: bool,
}

impl<'a> PulseTrain<'a> {
    pub fn new(frame: Frame<'a>, timings: DopTimings) -> Self {
        // Addressed frames already end every pixel with a latch
        let trailing_latch = frame.framing() == Framing::Preamble;
        Self {
            frame,
            timings,
            trailing_latch,
        }
    }

    /// Total on-wire duration of the remaining pulses
    pub fn duration_us(&self) -> u64 {
        self.clone().map(|pulse| u64::from(pulse.period_us())).sum()
    }
}

impl Iterator for PulseTrain<'_> {
    type Item = Pulse;

    fn next(&mut self) -> Option<Pulse> {
        if let Some(symbol) = self.frame.next() {
            return Some(self.timings.pulse(symbol));
        }
        if self.trailing_latch {
            self.trailing_latch = false;
            return Some(self.timings.pulse(Symbol::Latch));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frame.len() + usize::from(self.trailing_latch);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PulseTrain<'_> {}

impl FusedIterator for PulseTrain<'_> {}
