//! Error types shared by the driver components.

use core::fmt;

/// One of the four H-bridge outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HBridgeOutput {
    /// 2.5 V reference/bias output
    Reference2v5,
    /// P2 high-side drive output
    P2,
    /// N1 low-side PWM output
    N1Pwm,
    /// N2 low-side drive output
    N2,
}

impl HBridgeOutput {
    /// Configuration key naming this output
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reference2v5 => "output_2v5",
            Self::P2 => "output_p2",
            Self::N1Pwm => "output_n1_pwm",
            Self::N2 => "output_n2",
        }
    }
}

/// Invalid or incomplete driver configuration.
///
/// Detected at setup; a driver instance is never created from a config that
/// fails validation, so nothing is ever transmitted with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `num_header_bits` must be positive
    ZeroHeaderBits,
    /// `num_leds` must be positive
    ZeroLeds,
    /// `num_leds` exceeds the compile-time buffer capacity
    TooManyLeds { requested: usize, capacity: usize },
    /// Addressed framing cannot encode every LED index in the header bits
    AddressSpaceTooSmall { num_leds: usize, header_bits: u8 },
    /// A mandatory H-bridge output was not provided
    MissingOutput(HBridgeOutput),
    /// RGB order can't change once a frame has been transmitted
    OrderLocked,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroHeaderBits => write!(f, "num_header_bits must be positive"),
            ConfigError::ZeroLeds => write!(f, "num_leds must be positive"),
            ConfigError::TooManyLeds {
                requested,
                capacity,
            } => write!(
                f,
                "num_leds {} exceeds buffer capacity {}",
                requested, capacity
            ),
            ConfigError::AddressSpaceTooSmall {
                num_leds,
                header_bits,
            } => write!(
                f,
                "{} header bits cannot address {} LEDs",
                header_bits, num_leds
            ),
            ConfigError::MissingOutput(output) => {
                write!(f, "required H-bridge output {} is missing", output.as_str())
            }
            ConfigError::OrderLocked => {
                write!(f, "rgb_order is fixed after the first transmission")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// Pixel index beyond the buffer length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange {
    /// Requested index
    pub index: usize,
    /// Buffer length
    pub len: usize,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pixel index {} out of range for {} LEDs",
            self.index, self.len
        )
    }
}

impl core::error::Error for OutOfRange {}

/// Failure reported by a transmission peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitError {
    /// Peripheral can't accept a frame right now. Nothing was sent.
    Busy,
    /// Peripheral or output hardware failed while sending.
    Fault,
}

impl fmt::Display for TransmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransmitError::Busy => write!(f, "transmitter busy"),
            TransmitError::Fault => write!(f, "transmitter fault"),
        }
    }
}

impl core::error::Error for TransmitError {}

/// H-bridge output failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HBridgeError {
    /// Writing the given output failed
    Output(HBridgeOutput),
}

impl fmt::Display for HBridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HBridgeError::Output(output) => write!(f, "failed to drive {}", output.as_str()),
        }
    }
}

impl core::error::Error for HBridgeError {}

impl From<HBridgeError> for TransmitError {
    fn from(_: HBridgeError) -> Self {
        TransmitError::Fault
    }
}
