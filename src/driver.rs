//! The DoP LED driver.
//!
//! Owns the pixel buffer, the refresh scheduler and the transmitter. Light
//! control calls only touch the buffer; frames go out from
//! [`DopLed::request_refresh`] when the refresh rate allows it, or later from
//! [`DopLed::tick`].

use embassy_time::{Duration, Instant};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::Transmitter;
use crate::color::{Rgb, RgbOrder};
use crate::config::DopLedConfig;
use crate::error::{ConfigError, HBridgeError, OutOfRange, TransmitError};
use crate::frame::{Frame, Framing};
use crate::h_bridge::{DriveLevel, HBridge};
use crate::pixel_buffer::PixelBuffer;
use crate::pulse::{DopTimings, PulseTrain};
use crate::scheduler::{RefreshDecision, RefreshScheduler};

/// Result of a refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshOutcome {
    /// The frame was handed to the transmitter
    Sent,
    /// The frame will go out on a later tick
    Deferred,
}

/// Result of a scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickResult {
    /// Whether a frame was sent during this tick
    pub transmitted: bool,
    /// When a pending frame may be sent, `None` if nothing is pending
    pub next_deadline: Option<Instant>,
}

/// Counters for the status side channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverStatus {
    pub frames_sent: u32,
    pub busy_retries: u32,
    pub faults: u32,
    pub last_error: Option<TransmitError>,
    pub last_refresh: Option<Instant>,
}

/// DoP addressable LED driver
///
/// `MAX_LEDS` is the buffer capacity; the configured LED count may be lower.
pub struct DopLed<T: Transmitter, const MAX_LEDS: usize> {
    transmitter: T,
    pixels: PixelBuffer<MAX_LEDS>,
    scheduler: RefreshScheduler,
    num_header_bits: u8,
    framing: Framing,
    timings: DopTimings,
    status: DriverStatus,
}

impl<T: Transmitter, const MAX_LEDS: usize> DopLed<T, MAX_LEDS> {
    /// Create a driver.
    ///
    /// Fails if the configuration is invalid; nothing is transmitted here.
    pub fn new(transmitter: T, config: &DopLedConfig) -> Result<Self, ConfigError> {
        config.validate(MAX_LEDS)?;

        Ok(Self {
            transmitter,
            pixels: PixelBuffer::with_order(config.num_leds, config.rgb_order)?,
            scheduler: RefreshScheduler::new(config.max_refresh_rate),
            num_header_bits: config.num_header_bits,
            framing: config.framing,
            timings: config.timings,
            status: DriverStatus::default(),
        })
    }

    /// Number of LEDs
    #[inline]
    pub fn size(&self) -> usize {
        self.pixels.len()
    }

    pub const fn num_header_bits(&self) -> u8 {
        self.num_header_bits
    }

    pub const fn framing(&self) -> Framing {
        self.framing
    }

    pub const fn max_refresh_rate(&self) -> Option<Duration> {
        self.scheduler.min_interval()
    }

    pub const fn rgb_order(&self) -> RgbOrder {
        self.pixels.rgb_order()
    }

    /// Change the channel order; fails once a frame has been sent
    pub fn set_rgb_order(&mut self, order: RgbOrder) -> Result<(), ConfigError> {
        self.pixels.set_rgb_order(order)
    }

    /// Store a color. Does not transmit.
    pub fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), OutOfRange> {
        self.pixels.set_pixel(index, color)
    }

    pub fn pixel(&self, index: usize) -> Option<Rgb> {
        self.pixels.pixel(index)
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    pub fn clear(&mut self) {
        self.pixels.clear();
    }

    /// Copy colors into the buffer from LED 0; returns the count written
    pub fn write_pixels<I>(&mut self, colors: I) -> usize
    where
        I: IntoIterator<Item = Rgb>,
    {
        self.pixels.write(colors)
    }

    pub fn pixels(&self) -> &PixelBuffer<MAX_LEDS> {
        &self.pixels
    }

    /// Direct buffer access for effects that render in place
    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        self.pixels.as_mut_slice()
    }

    /// Frame the next transmission would carry
    pub fn frame(&self) -> Frame<'_> {
        Frame::new(
            self.pixels.as_slice(),
            self.num_header_bits,
            self.pixels.rgb_order(),
            self.framing,
        )
    }

    /// Ask for the current buffer to be sent.
    ///
    /// Never blocks. If the refresh rate or the transmitter don't allow a
    /// frame right now, the request stays pending and [`DopLed::tick`] sends
    /// the latest buffer state later.
    pub fn request_refresh(&mut self, now: Instant) -> RefreshOutcome {
        self.scheduler.request_refresh();
        if self.service(now) {
            RefreshOutcome::Sent
        } else {
            RefreshOutcome::Deferred
        }
    }

    /// Retry a pending refresh.
    ///
    /// Call this periodically, or at `next_deadline`.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        let transmitted = self.service(now);
        TickResult {
            transmitted,
            next_deadline: self.scheduler.next_deadline(now),
        }
    }

    /// Whether a refresh is waiting to be sent
    pub const fn is_refresh_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub const fn status(&self) -> DriverStatus {
        self.status
    }

    pub fn transmitter(&self) -> &T {
        &self.transmitter
    }

    pub fn transmitter_mut(&mut self) -> &mut T {
        &mut self.transmitter
    }

    /// Log the driver configuration
    pub fn dump_config(&self) {
        #[cfg(feature = "esp32-log")]
        {
            println!("dop_led: DoP LED light:");
            println!("dop_led:   Num LEDs: {}", self.size());
            println!("dop_led:   Num header bits: {}", self.num_header_bits);
            println!("dop_led:   RGB order: {}", self.rgb_order().as_str());
            println!("dop_led:   Framing: {:?}", self.framing);
            if let Some(interval) = self.max_refresh_rate() {
                println!("dop_led:   Max refresh rate: {} us", interval.as_micros());
            }
        }
    }

    /// Send a frame if one is pending and allowed; returns whether it was sent
    fn service(&mut self, now: Instant) -> bool {
        match self.scheduler.poll(now) {
            RefreshDecision::Idle | RefreshDecision::Wait(_) => false,
            RefreshDecision::Transmit => self.transmit(now),
        }
    }

    fn transmit(&mut self, now: Instant) -> bool {
        let frame = Frame::new(
            self.pixels.as_slice(),
            self.num_header_bits,
            self.pixels.rgb_order(),
            self.framing,
        );
        let result = self.transmitter.transmit(PulseTrain::new(frame, self.timings));

        match result {
            Ok(()) => {
                self.scheduler.mark_transmitted(now);
                self.pixels.lock_order();
                self.status.frames_sent = self.status.frames_sent.wrapping_add(1);
                self.status.last_refresh = Some(now);
                true
            }
            Err(TransmitError::Busy) => {
                // Still pending; the next tick sends the latest state
                self.status.busy_retries = self.status.busy_retries.wrapping_add(1);
                false
            }
            Err(error @ TransmitError::Fault) => {
                #[cfg(feature = "esp32-log")]
                println!("dop_led: transmit failed: {}", error);
                self.scheduler.cancel();
                self.status.faults = self.status.faults.wrapping_add(1);
                self.status.last_error = Some(error);
                false
            }
        }
    }
}

impl<T, V, P, N1, N2, D, const MAX_LEDS: usize> DopLed<HBridge<T, V, P, N1, N2, D>, MAX_LEDS>
where
    T: Transmitter,
    V: OutputPin,
    P: OutputPin,
    N1: SetDutyCycle,
    N2: OutputPin,
    D: DelayNs,
{
    /// Switch the string to plain white at `brightness`.
    ///
    /// Pending color frames are dropped; the next refresh request switches
    /// the bridge back to data mode.
    pub fn set_white(&mut self, brightness: u8) -> Result<(), HBridgeError> {
        self.scheduler.cancel();
        self.transmitter.drive(DriveLevel::White(brightness))
    }

    /// Switch every bridge output off
    pub fn power_off(&mut self) -> Result<(), HBridgeError> {
        self.scheduler.cancel();
        self.transmitter.drive(DriveLevel::Off)
    }

    /// Current bridge level
    pub fn drive_level(&self) -> Option<DriveLevel> {
        self.transmitter.level()
    }
}
