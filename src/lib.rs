#![no_std]

pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod fade;
pub mod frame;
pub mod h_bridge;
pub mod pixel_buffer;
pub mod pulse;
pub mod scheduler;
pub mod shared;

pub use config::DopLedConfig;
pub use driver::{DopLed, DriverStatus, RefreshOutcome, TickResult};
pub use error::{ConfigError, HBridgeError, HBridgeOutput, OutOfRange, TransmitError};
pub use fade::FadeTransition;
pub use frame::{Frame, Framing, Symbol, build_frame};
pub use h_bridge::{DriveLevel, HBridge, HBridgeBuilder, OutputState};
pub use pixel_buffer::PixelBuffer;
pub use pulse::{DopTimings, Pulse, PulseTrain};
pub use scheduler::{RefreshDecision, RefreshScheduler};
pub use shared::SharedDopLed;

pub use color::{Rgb, RgbOrder};
pub use embassy_time::{Duration, Instant};

/// Transmission peripheral (an RMT channel or equivalent)
///
/// Implement this trait to support different hardware platforms.
/// The driver is generic over this trait.
pub trait Transmitter {
    /// Send one frame.
    ///
    /// Must not block until the frame is on the wire. Return
    /// [`TransmitError::Busy`] without consuming `pulses` if a previous frame
    /// is still in flight; the driver retries on its next tick.
    fn transmit(&mut self, pulses: PulseTrain<'_>) -> Result<(), TransmitError>;

    /// Enable or disable the output stage.
    ///
    /// A disabled transmitter holds its line inactive. Used by the H-bridge
    /// when it switches away from data mode.
    fn set_enabled(&mut self, _enabled: bool) {}
}
