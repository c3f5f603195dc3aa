//! Driver shared between execution contexts.
//!
//! Light control may run in a task while frames go out from a timer
//! interrupt. Every operation here runs inside a critical section, so a
//! frame is always built from a consistent buffer and never mixes old and
//! new pixel values.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::Instant;

use crate::Transmitter;
use crate::color::Rgb;
use crate::driver::{DopLed, DriverStatus, RefreshOutcome, TickResult};
use crate::error::OutOfRange;

/// A [`DopLed`] guarded by a critical-section mutex.
///
/// Can live in a `static`: create it empty with [`SharedDopLed::new`] and
/// install the driver at startup with [`SharedDopLed::init`].
pub struct SharedDopLed<T: Transmitter, const MAX_LEDS: usize> {
    inner: Mutex<RefCell<Option<DopLed<T, MAX_LEDS>>>>,
}

impl<T: Transmitter, const MAX_LEDS: usize> SharedDopLed<T, MAX_LEDS> {
    /// Create an empty slot
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Wrap an existing driver
    pub const fn from_driver(driver: DopLed<T, MAX_LEDS>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Some(driver))),
        }
    }

    /// Install the driver, returning the previous one
    pub fn init(&self, driver: DopLed<T, MAX_LEDS>) -> Option<DopLed<T, MAX_LEDS>> {
        critical_section::with(|cs| self.inner.borrow(cs).replace(Some(driver)))
    }

    pub fn is_initialized(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().is_some())
    }

    /// Run `f` on the driver inside a critical section.
    ///
    /// Returns `None` if no driver is installed.
    pub fn with<R>(&self, f: impl FnOnce(&mut DopLed<T, MAX_LEDS>) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).borrow_mut();
            slot.as_mut().map(f)
        })
    }

    /// Store a color.
    ///
    /// Without a driver there are no LEDs, so every index is out of range.
    pub fn set_pixel(&self, index: usize, color: Rgb) -> Result<(), OutOfRange> {
        self.with(|led| led.set_pixel(index, color))
            .unwrap_or(Err(OutOfRange { index, len: 0 }))
    }

    pub fn fill(&self, color: Rgb) {
        self.with(|led| led.fill(color));
    }

    pub fn request_refresh(&self, now: Instant) -> RefreshOutcome {
        self.with(|led| led.request_refresh(now))
            .unwrap_or(RefreshOutcome::Deferred)
    }

    pub fn tick(&self, now: Instant) -> TickResult {
        self.with(|led| led.tick(now)).unwrap_or(TickResult {
            transmitted: false,
            next_deadline: None,
        })
    }

    pub fn status(&self) -> Option<DriverStatus> {
        self.with(|led| led.status())
    }
}

impl<T: Transmitter, const MAX_LEDS: usize> Default for SharedDopLed<T, MAX_LEDS> {
    fn default() -> Self {
        Self::new()
    }
}
