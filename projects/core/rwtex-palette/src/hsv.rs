//! HSV color space and the perceptual distance used by the quantizers.
//!
//! Colors are compared in a 4D space of `[hue_x, hue_y, darkness, alpha]`
//! where the hue angle is projected onto the unit circle and scaled by
//! saturation and value, so dark or grey colors sit close together
//! regardless of their nominal hue.

use rwtex_common::color_8888::Color8888;

/// A color in HSV space with alpha. Hue is in degrees `[0, 360)`, the rest in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsva {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
    pub alpha: f32,
}

/// Thresholds describing when two colors count as "the same".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    /// Maximum hue difference in degrees.
    pub hue: f32,
    /// Maximum 4D distance.
    pub distance: f32,
    /// Maximum alpha difference.
    pub alpha: f32,
}

/// Colors closer than this are deduplicated while feeding texels.
pub const DEDUPLICATE: MatchThresholds = MatchThresholds {
    hue: 2.75,
    distance: 0.15,
    alpha: 0.075,
};

/// Neighbours closer than this collapse into the more used color when reducing.
pub const COLLAPSE: MatchThresholds = MatchThresholds {
    hue: 1.5,
    distance: 0.05,
    alpha: 0.1,
};

impl Hsva {
    pub fn from_color(color: Color8888) -> Self {
        let r = color.r as f32 / 255.0;
        let g = color.g as f32 / 255.0;
        let b = color.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let hue = if delta <= 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let saturation = if max <= 0.0 { 0.0 } else { delta / max };

        Self {
            hue: hue.rem_euclid(360.0),
            saturation,
            value: max,
            alpha: color.a as f32 / 255.0,
        }
    }

    pub fn to_color(self) -> Color8888 {
        let chroma = self.value * self.saturation;
        let sector = self.hue.rem_euclid(360.0) / 60.0;
        let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = self.value - chroma;
        let to_u8 = |c: f32| ((c + m).clamp(0.0, 1.0) * 255.0).round() as u8;
        let alpha = (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color8888::new(to_u8(r), to_u8(g), to_u8(b), alpha)
    }

    /// Position in the `[hue_x, hue_y, darkness, alpha]` space.
    #[inline]
    pub fn coordinates(&self) -> [f32; 4] {
        let radians = self.hue.to_radians();
        let radius = self.saturation * self.value;
        [
            radians.cos() * radius,
            radians.sin() * radius,
            1.0 - self.value,
            self.alpha,
        ]
    }

    /// Euclidean distance between two colors in the 4D space.
    #[inline]
    pub fn distance(&self, other: &Self) -> f32 {
        let a = self.coordinates();
        let b = other.coordinates();
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }

    /// Angular distance between the hues, along the shorter arc.
    #[inline]
    pub fn hue_difference(&self, other: &Self) -> f32 {
        let diff = (self.hue - other.hue).abs() % 360.0;
        diff.min(360.0 - diff)
    }

    pub fn matches(&self, other: &Self, thresholds: MatchThresholds) -> bool {
        self.hue_difference(other) < thresholds.hue
            && self.distance(other) < thresholds.distance
            && (self.alpha - other.alpha).abs() < thresholds.alpha
    }

    /// Usage weighted midpoint of two colors. Hue is averaged along the shorter arc.
    pub fn weighted_midpoint(&self, self_weight: u32, other: &Self, other_weight: u32) -> Self {
        let total = (self_weight as f32 + other_weight as f32).max(1.0);
        let wa = self_weight as f32 / total;
        let wb = other_weight as f32 / total;

        let mut arc = other.hue - self.hue;
        if arc > 180.0 {
            arc -= 360.0;
        } else if arc < -180.0 {
            arc += 360.0;
        }

        Self {
            hue: (self.hue + arc * wb).rem_euclid(360.0),
            saturation: self.saturation * wa + other.saturation * wb,
            value: self.value * wa + other.value * wb,
            alpha: self.alpha * wa + other.alpha * wb,
        }
    }
}
