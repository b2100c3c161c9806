//! One-bit pixel surface and its snapshot.
//!
//! The surface is a plain linear bitmap: pixel `(x, y)` is bit `i & 7`
//! (least significant bit first) of byte `i >> 3`, where `i = y * WIDTH + x`.
//! A set bit means the LED is on. Drawing happens through the
//! `embedded-graphics` [`DrawTarget`] implementation or by writing the raw
//! bytes, which keeps the layout compatible with ordinary bit-blit code.
//!
//! # Example
//! ```rust
//! use buse_framebuffer::compute_surface_bytes;
//! use buse_framebuffer::surface::PixelSurface;
//! use embedded_graphics::pixelcolor::BinaryColor;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
//!
//! const WIDTH: usize = 128;
//! const HEIGHT: usize = 19;
//! const BYTES: usize = compute_surface_bytes(WIDTH, HEIGHT);
//!
//! let mut surface = PixelSurface::<WIDTH, HEIGHT, BYTES>::new();
//! Rectangle::new(Point::new(2, 2), Size::new(10, 5))
//!     .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
//!     .draw(&mut surface)
//!     .unwrap();
//! assert!(surface.pixel(2, 2));
//! ```

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Point, Size};
use embedded_graphics::Pixel;

#[inline]
const fn locate(index: usize) -> (usize, u8) {
    (index >> 3, 1 << (index & 7))
}

/// Bit-packed monochrome bitmap written by the application.
///
/// # Type Parameters
/// - `WIDTH`: Display width in pixels
/// - `HEIGHT`: Display height in pixels
/// - `BYTES`: Backing size, use [`compute_surface_bytes`](crate::compute_surface_bytes)
#[derive(Clone, PartialEq, Eq)]
pub struct PixelSurface<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize> {
    bytes: [u8; BYTES],
}

impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize> Default
    for PixelSurface<WIDTH, HEIGHT, BYTES>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize>
    PixelSurface<WIDTH, HEIGHT, BYTES>
{
    /// Create a blank surface.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: [0; BYTES] }
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Set the pixel at `(x, y)`. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        let (byte, mask) = locate(y * WIDTH + x);
        if on {
            self.bytes[byte] |= mask;
        } else {
            self.bytes[byte] &= !mask;
        }
    }

    /// Read the pixel at `(x, y)`. Out-of-range coordinates read as off.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        let (byte, mask) = locate(y * WIDTH + x);
        self.bytes[byte] & mask != 0
    }

    /// Raw surface bytes in the linear layout described in the module docs.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; BYTES] {
        &self.bytes
    }

    /// Mutable raw surface bytes, for external bit-blit routines.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; BYTES] {
        &mut self.bytes
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize> OriginDimensions
    for PixelSurface<WIDTH, HEIGHT, BYTES>
{
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize> DrawTarget
    for PixelSurface<WIDTH, HEIGHT, BYTES>
{
    type Color = BinaryColor;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }
            self.set_pixel(x as usize, y as usize, color.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.bytes.fill(if color.is_on() { 0xff } else { 0 });
        Ok(())
    }
}

impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize> core::fmt::Debug
    for PixelSurface<WIDTH, HEIGHT, BYTES>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelSurface")
            .field("width", &WIDTH)
            .field("height", &HEIGHT)
            .field("size", &BYTES)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const WIDTH: usize, const HEIGHT: usize, const BYTES: usize> defmt::Format
    for PixelSurface<WIDTH, HEIGHT, BYTES>
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PixelSurface<{}, {}, {}>", WIDTH, HEIGHT, BYTES);
    }
}

/// Point-in-time copy of a surface, owned by one refresh cycle.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot<const BYTES: usize> {
    bytes: [u8; BYTES],
}

impl<const BYTES: usize> Default for Snapshot<BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BYTES: usize> Snapshot<BYTES> {
    /// Create an all-off snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: [0; BYTES] }
    }

    /// Build a snapshot from raw surface bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; BYTES]) -> Self {
        Self { bytes }
    }

    /// Replace the contents with `bytes`.
    pub fn copy_from(&mut self, bytes: &[u8; BYTES]) {
        self.bytes.copy_from_slice(bytes);
    }

    /// Read linear pixel `index` (`y * width + x`).
    #[inline]
    #[must_use]
    pub fn bit(&self, index: usize) -> bool {
        let (byte, mask) = locate(index);
        self.bytes[byte] & mask != 0
    }

    /// Raw snapshot bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; BYTES] {
        &self.bytes
    }
}

impl<const BYTES: usize> core::fmt::Debug for Snapshot<BYTES> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Snapshot").field("size", &BYTES).finish()
    }
}
