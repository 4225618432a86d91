use rwtex_common::color_8888::Color8888;

/// Format-agnostic color exchanged between dispatchers.
///
/// Reading a luminance raster yields [`AbstractColor::Luminance`] so a
/// luminance-to-luminance conversion never goes through RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractColor {
    Rgba(Color8888),
    Luminance { lum: u8, alpha: u8 },
}

impl AbstractColor {
    /// Expands luminance by copying it into all three color channels.
    #[inline]
    pub fn to_rgba(self) -> Color8888 {
        match self {
            Self::Rgba(color) => color,
            Self::Luminance { lum, alpha } => Color8888::new(lum, lum, lum, alpha),
        }
    }

    /// Luminance and alpha; RGB colors use the unweighted channel average.
    #[inline]
    pub fn to_luminance(self) -> (u8, u8) {
        match self {
            Self::Rgba(color) => (luminance_of(color), color.a),
            Self::Luminance { lum, alpha } => (lum, alpha),
        }
    }

    #[inline]
    pub fn alpha(self) -> u8 {
        match self {
            Self::Rgba(color) => color.a,
            Self::Luminance { alpha, .. } => alpha,
        }
    }
}

impl From<Color8888> for AbstractColor {
    fn from(value: Color8888) -> Self {
        Self::Rgba(value)
    }
}

/// Floating point color exchanged with formats of any channel width.
///
/// Channels are fractions of the stored channel's maximum, so a 5-bit 31 and
/// an 8-bit 255 both read as `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorF32 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorF32 {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl From<[f32; 4]> for ColorF32 {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<ColorF32> for [f32; 4] {
    fn from(color: ColorF32) -> Self {
        [color.r, color.g, color.b, color.a]
    }
}

/// Unweighted average of the red, green and blue channels, rounded.
#[inline]
pub fn luminance_of(color: Color8888) -> u8 {
    ((color.r as u32 + color.g as u32 + color.b as u32 + 1) / 3) as u8
}
