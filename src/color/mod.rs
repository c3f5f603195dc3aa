mod order;
mod utils;

use smart_leds::RGB8;

pub use order::{Channel, RgbOrder};
pub use utils::{blend8, blend_colors, scale_color};

pub type Rgb = RGB8;

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
