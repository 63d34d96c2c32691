// Spirit Level — SSD1306 Frame Buffer
//
// 1-bpp pixel buffer kept in the panel's native page layout so the display
// driver can stream it out without any translation. Drawing goes through
// the embedded-graphics `DrawTarget` trait.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::Pixel;

use crate::config::{DISPLAY_BUFFER_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};

/// In-memory copy of the SSD1306 GDDRAM: 8 pages of 128 bytes, one byte
/// per 8-pixel column strip, least significant bit at the top of the strip.
pub struct Framebuffer {
    buf: [u8; DISPLAY_BUFFER_SIZE],
}

impl Framebuffer {
    pub fn new() -> Self {
        Self {
            buf: [0u8; DISPLAY_BUFFER_SIZE],
        }
    }

    /// Blank the whole frame.
    pub fn clear_all(&mut self) {
        self.buf = [0u8; DISPLAY_BUFFER_SIZE];
    }

    /// Set or clear one pixel. Coordinates outside the panel are ignored,
    /// matching the embedded-graphics draw contract.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if x < 0 || y < 0 || x >= SCREEN_WIDTH as i32 || y >= SCREEN_HEIGHT as i32 {
            return;
        }
        let idx = x as usize + (y as usize / 8) * SCREEN_WIDTH as usize;
        let bit = 1u8 << (y as usize % 8);
        if on {
            self.buf[idx] |= bit;
        } else {
            self.buf[idx] &= !bit;
        }
    }

    /// Read one pixel back (off outside the panel).
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= SCREEN_WIDTH as i32 || y >= SCREEN_HEIGHT as i32 {
            return false;
        }
        let idx = x as usize + (y as usize / 8) * SCREEN_WIDTH as usize;
        self.buf[idx] & (1u8 << (y as usize % 8)) != 0
    }

    /// The raw page-ordered bytes, ready for the panel.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn starts_blank() {
        let fb = Framebuffer::new();
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn pixels_land_in_the_right_page_byte() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(0, 0, true);
        assert_eq!(fb.as_bytes()[0], 0b0000_0001);
        // row 9 -> page 1, bit 1
        fb.set_pixel(3, 9, true);
        assert_eq!(fb.as_bytes()[128 + 3], 0b0000_0010);
        // bottom-right corner -> last byte, top bit
        fb.set_pixel(127, 63, true);
        assert_eq!(fb.as_bytes()[7 * 128 + 127], 0b1000_0000);
    }

    #[test]
    fn set_then_clear_restores_the_bit() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(10, 20, true);
        assert!(fb.pixel(10, 20));
        fb.set_pixel(10, 20, false);
        assert!(!fb.pixel(10, 20));
        // the rest of the shared page byte is untouched
        fb.set_pixel(10, 16, true);
        fb.set_pixel(10, 17, false);
        assert!(fb.pixel(10, 16));
    }

    #[test]
    fn out_of_range_pixels_are_ignored() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(-1, 0, true);
        fb.set_pixel(0, -1, true);
        fb.set_pixel(128, 0, true);
        fb.set_pixel(0, 64, true);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
        assert!(!fb.pixel(500, 500));
    }

    #[test]
    fn clear_all_blanks_a_dirty_frame() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(5, 5, true);
        fb.set_pixel(90, 60, true);
        fb.clear_all();
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn draws_embedded_graphics_primitives() {
        let mut fb = Framebuffer::new();
        Rectangle::new(Point::new(2, 2), Size::new(3, 3))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();
        for x in 2..5 {
            for y in 2..5 {
                assert!(fb.pixel(x, y), "expected ({}, {}) on", x, y);
            }
        }
        assert!(!fb.pixel(1, 2));
        assert!(!fb.pixel(5, 2));
    }
}
