/// A single RGBA8888 color, the exchange format between the color model,
/// the block codec and the palette quantizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color8888 {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
    /// Alpha component (0-255)
    pub a: u8,
}

impl Color8888 {
    /// Transparent black; the fourth color of a punch-through DXT1 block.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Constructs a new [`Color8888`] from the specified red, green, blue, and alpha components.
    ///
    /// # Examples
    ///
    /// ```
    /// use rwtex_common::color_8888::Color8888;
    ///
    /// let pixel = Color8888::new(255, 0, 0, 255);
    /// assert_eq!(pixel.r, 255);
    /// assert_eq!(pixel.a, 255);
    /// ```
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Scales the color channels by alpha, rounding to nearest.
    #[inline]
    pub fn premultiply(&self) -> Self {
        let mul = |c: u8| ((c as u32 * self.a as u32 + 127) / 255) as u8;
        Self::new(mul(self.r), mul(self.g), mul(self.b), self.a)
    }

    /// Reverses [`Color8888::premultiply`]. Fully transparent colors stay black.
    #[inline]
    pub fn unpremultiply(&self) -> Self {
        if self.a == 0 {
            return Self::new(0, 0, 0, 0);
        }
        let div = |c: u8| ((c as u32 * 255 + self.a as u32 / 2) / self.a as u32).min(255) as u8;
        Self::new(div(self.r), div(self.g), div(self.b), self.a)
    }

    /// Channels as `[r, g, b, a]`.
    #[inline]
    pub fn to_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn from_array(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

#[cfg(test)]
mod tests {
    use crate::test_prelude::*;

    #[rstest]
    #[case(Color8888::new(255, 128, 0, 255))]
    #[case(Color8888::new(10, 20, 30, 0))]
    #[case(Color8888::new(200, 100, 50, 128))]
    fn premultiply_then_unpremultiply_is_close(#[case] color: Color8888) {
        let restored = color.premultiply().unpremultiply();
        if color.a == 0 {
            assert_eq!(restored, Color8888::TRANSPARENT);
            return;
        }
        for (a, b) in color.to_array().iter().zip(restored.to_array()) {
            assert!((*a as i32 - b as i32).abs() <= 1, "{color:?} -> {restored:?}");
        }
    }

    #[test]
    fn opaque_premultiply_is_identity() {
        let color = Color8888::new(1, 2, 3, 255);
        assert_eq!(color.premultiply(), color);
        assert_eq!(color.unpremultiply(), color);
    }
}
