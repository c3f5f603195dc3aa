use embassy_time::Duration;

use crate::color::RgbOrder;
use crate::error::ConfigError;
use crate::frame::Framing;
use crate::pulse::DopTimings;

/// Configuration for a [`DopLed`](crate::DopLed) driver
///
/// Validated once when the driver is created.
#[derive(Debug, Clone)]
pub struct DopLedConfig {
    /// Length of the frame header, must be positive
    pub num_header_bits: u8,
    /// Number of LEDs on the string, must be positive
    pub num_leds: usize,
    /// Channel order on the wire, RGB by default
    pub rgb_order: RgbOrder,
    /// Minimum interval between frames. `None` sends every refresh at once.
    pub max_refresh_rate: Option<Duration>,
    /// Frame layout, preamble by default
    pub framing: Framing,
    /// Pulse widths
    pub timings: DopTimings,
}

impl DopLedConfig {
    pub const fn new(num_header_bits: u8, num_leds: usize) -> Self {
        Self {
            num_header_bits,
            num_leds,
            rgb_order: RgbOrder::Rgb,
            max_refresh_rate: None,
            framing: Framing::Preamble,
            timings: DopTimings::DEFAULT,
        }
    }

    #[must_use]
    pub const fn with_rgb_order(mut self, order: RgbOrder) -> Self {
        self.rgb_order = order;
        self
    }

    #[must_use]
    pub const fn with_max_refresh_rate(mut self, interval: Duration) -> Self {
        self.max_refresh_rate = Some(interval);
        self
    }

    #[must_use]
    pub const fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    #[must_use]
    pub const fn with_timings(mut self, timings: DopTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Check the configuration against a buffer of `capacity` LEDs
    pub fn validate(&self, capacity: usize) -> Result<(), ConfigError> {
        if self.num_header_bits == 0 {
            return Err(ConfigError::ZeroHeaderBits);
        }
        if self.num_leds == 0 {
            return Err(ConfigError::ZeroLeds);
        }
        if self.num_leds > capacity {
            return Err(ConfigError::TooManyLeds {
                requested: self.num_leds,
                capacity,
            });
        }
        if self.framing == Framing::Addressed {
            let max_index = self.num_leds - 1;
            let fits = max_index
                .checked_shr(u32::from(self.num_header_bits))
                .is_none_or(|overflow| overflow == 0);
            if !fits {
                return Err(ConfigError::AddressSpaceTooSmall {
                    num_leds: self.num_leds,
                    header_bits: self.num_header_bits,
                });
            }
        }
        Ok(())
    }
}
