//! Fixed-length pixel storage.
//!
//! The buffer length is set once at construction and never changes. Writes
//! only mutate the buffer; transmission is driven separately.

use heapless::Vec;

use crate::color::{BLACK, Rgb, RgbOrder};
use crate::error::{ConfigError, OutOfRange};

/// Per-LED color state for one string
#[derive(Debug, Clone)]
pub struct PixelBuffer<const MAX_LEDS: usize> {
    pixels: Vec<Rgb, MAX_LEDS>,
    order: RgbOrder,
    order_locked: bool,
}

impl<const MAX_LEDS: usize> PixelBuffer<MAX_LEDS> {
    /// Create a buffer of `num_leds` black pixels
    pub fn new(num_leds: usize) -> Result<Self, ConfigError> {
        if num_leds == 0 {
            return Err(ConfigError::ZeroLeds);
        }
        let mut pixels = Vec::new();
        pixels
            .resize(num_leds, BLACK)
            .map_err(|()| ConfigError::TooManyLeds {
                requested: num_leds,
                capacity: MAX_LEDS,
            })?;

        Ok(Self {
            pixels,
            order: RgbOrder::default(),
            order_locked: false,
        })
    }

    /// Create a buffer with a specific channel order
    pub fn with_order(num_leds: usize, order: RgbOrder) -> Result<Self, ConfigError> {
        let mut buffer = Self::new(num_leds)?;
        buffer.order = order;
        Ok(buffer)
    }

    /// Number of LEDs
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Store a color at `index`.
    ///
    /// Fails without touching the buffer if `index >= len()`.
    pub fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), OutOfRange> {
        let len = self.len();
        let slot = self
            .pixels
            .get_mut(index)
            .ok_or(OutOfRange { index, len })?;
        *slot = color;
        Ok(())
    }

    pub fn pixel(&self, index: usize) -> Option<Rgb> {
        self.pixels.get(index).copied()
    }

    /// Set every LED to one color
    pub fn fill(&mut self, color: Rgb) {
        self.pixels.iter_mut().for_each(|led| *led = color);
    }

    /// Turn every LED off
    pub fn clear(&mut self) {
        self.fill(BLACK);
    }

    /// Copy colors from an iterator, starting at LED 0.
    ///
    /// Extra colors are ignored; LEDs past the end of the iterator keep
    /// their value. Returns the number of LEDs written.
    pub fn write<I>(&mut self, colors: I) -> usize
    where
        I: IntoIterator<Item = Rgb>,
    {
        self.pixels
            .iter_mut()
            .zip(colors)
            .map(|(led, color)| *led = color)
            .count()
    }

    pub fn as_slice(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn as_mut_slice(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    pub const fn rgb_order(&self) -> RgbOrder {
        self.order
    }

    /// Change the channel order.
    ///
    /// Only allowed until the first frame is transmitted.
    pub fn set_rgb_order(&mut self, order: RgbOrder) -> Result<(), ConfigError> {
        if self.order_locked && order != self.order {
            return Err(ConfigError::OrderLocked);
        }
        self.order = order;
        Ok(())
    }

    pub const fn is_order_locked(&self) -> bool {
        self.order_locked
    }

    pub(crate) fn lock_order(&mut self) {
        self.order_locked = true;
    }
}
