use super::Rgb;

const ORDER_NAME_RGB: &str = "RGB";
const ORDER_NAME_RBG: &str = "RBG";
const ORDER_NAME_GRB: &str = "GRB";
const ORDER_NAME_GBR: &str = "GBR";
const ORDER_NAME_BRG: &str = "BRG";
const ORDER_NAME_BGR: &str = "BGR";

const ORDER_ID_RGB: u8 = 0;
const ORDER_ID_RBG: u8 = 1;
const ORDER_ID_GRB: u8 = 2;
const ORDER_ID_GBR: u8 = 3;
const ORDER_ID_BRG: u8 = 4;
const ORDER_ID_BGR: u8 = 5;

/// Logical color channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// Read this channel from a color
    #[inline]
    pub const fn of(self, color: Rgb) -> u8 {
        match self {
            Self::Red => color.r,
            Self::Green => color.g,
            Self::Blue => color.b,
        }
    }
}

/// Order in which color channels are sent on the wire.
///
/// Fixed at configuration time. The default is [`RgbOrder::Rgb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RgbOrder {
    #[default]
    Rgb = ORDER_ID_RGB,
    Rbg = ORDER_ID_RBG,
    Grb = ORDER_ID_GRB,
    Gbr = ORDER_ID_GBR,
    Brg = ORDER_ID_BRG,
    Bgr = ORDER_ID_BGR,
}

impl RgbOrder {
    /// All supported orders
    pub const ALL: [RgbOrder; 6] = [
        Self::Rgb,
        Self::Rbg,
        Self::Grb,
        Self::Gbr,
        Self::Brg,
        Self::Bgr,
    ];

    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            ORDER_ID_RGB => Self::Rgb,
            ORDER_ID_RBG => Self::Rbg,
            ORDER_ID_GRB => Self::Grb,
            ORDER_ID_GBR => Self::Gbr,
            ORDER_ID_BRG => Self::Brg,
            ORDER_ID_BGR => Self::Bgr,
            _ => return None,
        })
    }

    /// Parse an order from its configuration name, e.g. `"GRB"`.
    ///
    /// Case insensitive.
    pub fn parse_from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str().eq_ignore_ascii_case(s))
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => ORDER_NAME_RGB,
            Self::Rbg => ORDER_NAME_RBG,
            Self::Grb => ORDER_NAME_GRB,
            Self::Gbr => ORDER_NAME_GBR,
            Self::Brg => ORDER_NAME_BRG,
            Self::Bgr => ORDER_NAME_BGR,
        }
    }

    /// Permutation table: channels in transmission order
    pub const fn channels(self) -> [Channel; 3] {
        use Channel::{Blue, Green, Red};
        match self {
            Self::Rgb => [Red, Green, Blue],
            Self::Rbg => [Red, Blue, Green],
            Self::Grb => [Green, Red, Blue],
            Self::Gbr => [Green, Blue, Red],
            Self::Brg => [Blue, Red, Green],
            Self::Bgr => [Blue, Green, Red],
        }
    }

    /// Color bytes in transmission order
    #[inline]
    pub const fn apply(self, color: Rgb) -> [u8; 3] {
        let [first, second, third] = self.channels();
        [first.of(color), second.of(color), third.of(color)]
    }
}
