//! Frame layout: turns a pixel buffer into a sequence of protocol symbols.
//!
//! A frame is computed lazily from the pixels and never stored. Building one
//! is a pure function of the buffer and the framing parameters.
//!
//! Two layouts are supported:
//!
//! - [`Framing::Preamble`]: `header_bits` marker symbols, then 24 data
//!   symbols per pixel, each channel MSB-first in the configured order.
//! - [`Framing::Addressed`]: per pixel, the pixel index in `header_bits`
//!   symbols (LSB-first), 24 channel symbols (LSB-first) and a latch.

use core::iter::FusedIterator;

use crate::color::{Rgb, RgbOrder};

/// Data symbols carried by one pixel (3 channels x 8 bits)
pub const BITS_PER_PIXEL: usize = 24;

/// One unit of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Symbol {
    /// Frame start marker
    Marker,
    /// Data bit 0
    Zero,
    /// Data bit 1
    One,
    /// Latch/reset gap
    Latch,
}

impl Symbol {
    #[inline]
    pub const fn from_bit(bit: bool) -> Self {
        if bit { Self::One } else { Self::Zero }
    }

    /// Bit value of a data symbol
    pub const fn bit(self) -> Option<bool> {
        match self {
            Self::Zero => Some(false),
            Self::One => Some(true),
            Self::Marker | Self::Latch => None,
        }
    }
}

/// Frame layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Framing {
    /// Single marker preamble followed by MSB-first pixel data
    #[default]
    Preamble,
    /// Per-pixel address header, LSB-first data and latch
    Addressed,
}

impl Framing {
    /// Number of symbols in a frame
    pub const fn frame_len(self, num_leds: usize, header_bits: u8) -> usize {
        let header_bits = header_bits as usize;
        match self {
            Self::Preamble => header_bits + num_leds * BITS_PER_PIXEL,
            Self::Addressed => num_leds * (header_bits + BITS_PER_PIXEL + 1),
        }
    }
}

/// Build a preamble frame for `pixels`.
pub fn build_frame(pixels: &[Rgb], header_bits: u8, order: RgbOrder) -> Frame<'_> {
    Frame::new(pixels, header_bits, order, Framing::Preamble)
}

/// Lazily evaluated frame.
///
/// Iterates over the frame's symbols; [`Frame::symbol_at`] gives random
/// access.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pixels: &'a [Rgb],
    header_bits: u8,
    order: RgbOrder,
    framing: Framing,
    position: usize,
    len: usize,
}

impl<'a> Frame<'a> {
    pub fn new(pixels: &'a [Rgb], header_bits: u8, order: RgbOrder, framing: Framing) -> Self {
        Self {
            pixels,
            header_bits,
            order,
            framing,
            position: 0,
            len: framing.frame_len(pixels.len(), header_bits),
        }
    }

    pub const fn framing(&self) -> Framing {
        self.framing
    }

    pub const fn header_bits(&self) -> u8 {
        self.header_bits
    }

    pub const fn rgb_order(&self) -> RgbOrder {
        self.order
    }

    /// Total number of symbols, independent of iteration progress
    pub const fn total_len(&self) -> usize {
        self.len
    }

    /// Symbol at `index`, or `None` past the end of the frame
    pub fn symbol_at(&self, index: usize) -> Option<Symbol> {
        if index >= self.len {
            return None;
        }
        let header_bits = usize::from(self.header_bits);
        let symbol = match self.framing {
            Framing::Preamble => {
                if index < header_bits {
                    Symbol::Marker
                } else {
                    let data_index = index - header_bits;
                    let pixel = self.pixels[data_index / BITS_PER_PIXEL];
                    let bit = data_index % BITS_PER_PIXEL;
                    let byte = self.order.apply(pixel)[bit / 8];
                    Symbol::from_bit(byte & (0x80 >> (bit % 8)) != 0)
                }
            }
            Framing::Addressed => {
                let stride = header_bits + BITS_PER_PIXEL + 1;
                let led = index / stride;
                let offset = index % stride;
                if offset < header_bits {
                    Symbol::from_bit(address_bit(led, offset))
                } else if offset < header_bits + BITS_PER_PIXEL {
                    let bit = offset - header_bits;
                    let byte = self.order.apply(self.pixels[led])[bit / 8];
                    Symbol::from_bit(byte & (1 << (bit % 8)) != 0)
                } else {
                    Symbol::Latch
                }
            }
        };
        Some(symbol)
    }
}

/// Bit `bit` of the LED index; zero past the width of `usize`
#[inline]
fn address_bit(led: usize, bit: usize) -> bool {
    u32::try_from(bit)
        .ok()
        .and_then(|bit| led.checked_shr(bit))
        .is_some_and(|shifted| shifted & 1 != 0)
}

impl Iterator for Frame<'_> {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        let symbol = self.symbol_at(self.position)?;
        self.position += 1;
        Some(symbol)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frame<'_> {}

impl FusedIterator for Frame<'_> {}
