use crate::hsv::Hsva;
use core::fmt;
use core::str::FromStr;
use rwtex_common::color_8888::Color8888;
use rwtex_common::format::PaletteType;

/// Which quantizer builds new palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum PaletteRuntime {
    /// The built-in elimination quantizer.
    #[default]
    Native,
    /// The [`ExternalQuantizer`](crate::ExternalQuantizer) held by the caller's context.
    External,
}

impl fmt::Display for PaletteRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteRuntime::Native => write!(f, "native"),
            PaletteRuntime::External => write!(f, "external"),
        }
    }
}

impl FromStr for PaletteRuntime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(PaletteRuntime::Native),
            "external" | "neuquant" => Ok(PaletteRuntime::External),
            _ => Err(format!(
                "Unknown palette runtime: {s}. Valid options: native, external, neuquant"
            )),
        }
    }
}

/// Largest palette addressable by a palette type.
///
/// # Examples
///
/// ```
/// use rwtex_common::format::PaletteType;
/// use rwtex_palette::max_palette_colors;
///
/// assert_eq!(max_palette_colors(PaletteType::Pal4), 16);
/// assert_eq!(max_palette_colors(PaletteType::Pal8), 256);
/// assert_eq!(max_palette_colors(PaletteType::None), 0);
/// ```
#[inline]
pub fn max_palette_colors(palette_type: PaletteType) -> usize {
    match palette_type {
        PaletteType::None => 0,
        PaletteType::Pal4 | PaletteType::Pal4Lsb => 16,
        PaletteType::Pal8 => 256,
    }
}

/// A built palette, in index order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    pub colors: Vec<Color8888>,
}

impl Palette {
    pub fn new(colors: Vec<Color8888>) -> Self {
        Self { colors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Whether any entry is not fully opaque.
    pub fn has_alpha(&self) -> bool {
        self.colors.iter().any(|c| !c.is_opaque())
    }

    /// Index of the entry nearest to `color` in the perceptual 4D space.
    ///
    /// Linear search; ties resolve to the lowest index. Returns 0 for an
    /// empty palette.
    pub fn closest_link(&self, color: Color8888) -> usize {
        let target = Hsva::from_color(color);
        let mut best = 0;
        let mut best_distance = f32::INFINITY;
        for (index, entry) in self.colors.iter().enumerate() {
            if *entry == color {
                return index;
            }
            let distance = Hsva::from_color(*entry).distance(&target);
            if distance < best_distance {
                best_distance = distance;
                best = index;
            }
        }
        best
    }
}
