//! Colours and true-colour bitmaps.

use crate::error::{GifError, Result};

/// An RGBA colour.
///
/// GIF colour tables only store RGB; the alpha channel distinguishes opaque
/// table entries from the transparent black used to fill missing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha (255 = opaque).
    pub a: u8,
}

impl Colour {
    /// Opaque black.
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Colour = Colour::rgba(0, 0, 0, 0);

    /// An opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A colour with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same colour with alpha forced to 255.
    pub const fn opaque(self) -> Self {
        Self::rgb(self.r, self.g, self.b)
    }

    /// Whether the colour is fully transparent.
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Squared Euclidean distance in RGB space, alpha ignored.
    pub fn distance_squared(&self, other: &Colour) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// RGB components packed as `0xRRGGBB`.
    pub const fn to_rgb24(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Parse `RRGGBB` or `#RRGGBB`.
    pub fn from_hex(text: &str) -> Result<Self> {
        let hex = text.strip_prefix('#').unwrap_or(text);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(GifError::invalid_argument(
                "colour",
                format!("`{text}` is not an RRGGBB hex colour"),
            ));
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| {
            GifError::invalid_argument("colour", format!("`{text}` is not an RRGGBB hex colour"))
        })?;
        Ok(Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8))
    }
}

/// Index of the colour in `table` nearest to `colour` (unweighted RGB
/// Euclidean distance). The first of several equally near entries wins.
pub fn nearest_colour_index(table: &[Colour], colour: &Colour) -> Option<usize> {
    table
        .iter()
        .enumerate()
        .min_by_key(|(i, c)| (c.distance_squared(colour), *i))
        .map(|(i, _)| i)
}

/// A true-colour image stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Colour>,
}

impl Bitmap {
    /// A bitmap filled with transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Colour::TRANSPARENT)
    }

    /// A bitmap filled with `colour`.
    pub fn filled(width: u32, height: u32, colour: Colour) -> Self {
        Self {
            width,
            height,
            pixels: vec![colour; width as usize * height as usize],
        }
    }

    /// A bitmap from row-major pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Colour>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(GifError::invalid_argument(
                "pixels",
                format!(
                    "{} pixels supplied for a {width}x{height} bitmap ({expected} needed)",
                    pixels.len()
                ),
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A bitmap from packed RGBA bytes.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(GifError::invalid_argument(
                "rgba",
                format!("{} bytes supplied for a {width}x{height} RGBA bitmap", rgba.len()),
            ));
        }
        let pixels = rgba
            .chunks_exact(4)
            .map(|p| Colour::rgba(p[0], p[1], p[2], p[3]))
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major pixels.
    pub fn pixels(&self) -> &[Colour] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the bitmap.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Colour> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Set the pixel at `(x, y)`; writes outside the bitmap are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, colour: Colour) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = colour;
        }
    }

    /// Fill a rectangle, clipped to the bitmap.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, colour: Colour) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for row in y.min(y_end)..y_end {
            let start = (row * self.width) as usize;
            self.pixels[start + x.min(x_end) as usize..start + x_end as usize].fill(colour);
        }
    }

    /// Packed RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| [c.r, c.g, c.b, c.a])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_ne!(Colour::BLACK, Colour::TRANSPARENT);
        assert!(Colour::TRANSPARENT.is_transparent());
        assert_eq!(Colour::rgba(1, 2, 3, 0).opaque(), Colour::rgb(1, 2, 3));
    }

    #[test]
    fn test_nearest_colour() {
        let table = [Colour::BLACK, Colour::WHITE, Colour::rgb(250, 0, 0)];
        assert_eq!(nearest_colour_index(&table, &Colour::rgb(200, 10, 10)), Some(2));
        assert_eq!(nearest_colour_index(&table, &Colour::rgb(10, 10, 10)), Some(0));
        assert_eq!(nearest_colour_index(&[], &Colour::BLACK), None);
    }

    #[test]
    fn test_hex() {
        assert_eq!(Colour::from_hex("#FF8000").unwrap(), Colour::rgb(255, 128, 0));
        assert_eq!(Colour::from_hex("00ff00").unwrap(), Colour::rgb(0, 255, 0));
        assert!(Colour::from_hex("xyz").is_err());
    }

    #[test]
    fn test_bitmap_access() {
        let mut bmp = Bitmap::new(3, 2);
        bmp.set_pixel(2, 1, Colour::WHITE);
        bmp.set_pixel(5, 5, Colour::WHITE);
        assert_eq!(bmp.get_pixel(2, 1), Some(Colour::WHITE));
        assert_eq!(bmp.get_pixel(0, 0), Some(Colour::TRANSPARENT));
        assert_eq!(bmp.get_pixel(3, 0), None);
    }

    #[test]
    fn test_fill_rect_clipped() {
        let mut bmp = Bitmap::new(4, 4);
        bmp.fill_rect(2, 2, 10, 10, Colour::BLACK);
        assert_eq!(bmp.pixels().iter().filter(|c| **c == Colour::BLACK).count(), 4);
    }

    #[test]
    fn test_rgba_roundtrip() {
        let bytes = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let bmp = Bitmap::from_rgba(2, 1, &bytes).unwrap();
        assert_eq!(bmp.to_rgba(), bytes);
        assert!(Bitmap::from_rgba(2, 2, &bytes).is_err());
    }
}
