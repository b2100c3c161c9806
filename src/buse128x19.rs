//! Reference board: 128 × 19 pixels on four panels, refreshed at 240 Hz.
//!
//! # Example
//! ```rust
//! use buse_framebuffer::buse128x19;
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//!
//! static SURFACE: buse128x19::Shared<CriticalSectionRawMutex> = buse128x19::Shared::new();
//!
//! SURFACE.update(|surface| surface.set_pixel(0, 0, true));
//! assert_eq!(buse128x19::FRAME_BYTES, 400);
//! ```

use crate::double_buffer::SharedSurface;
use crate::encoder::HardwareFrame;
use crate::geometry::{compute_frame_bytes, compute_surface_bytes};
use crate::scheduler::RefreshScheduler;
use crate::surface::PixelSurface;
use crate::Config;

/// Display width in pixels.
pub const WIDTH: usize = 128;
/// Display height in pixels.
pub const HEIGHT: usize = 19;
/// Panels side by side.
pub const PANELS: usize = 4;
/// Pixel surface size in bytes.
pub const SURFACE_BYTES: usize = compute_surface_bytes(WIDTH, HEIGHT);
/// Hardware frame size in bytes.
pub const FRAME_BYTES: usize = compute_frame_bytes(WIDTH, HEIGHT, PANELS);

/// Pixel surface for this board.
pub type Surface = PixelSurface<WIDTH, HEIGHT, SURFACE_BYTES>;
/// Shared pixel surface for this board.
pub type Shared<M> = SharedSurface<M, WIDTH, HEIGHT, SURFACE_BYTES>;
/// Hardware frame for this board.
pub type Frame = HardwareFrame<FRAME_BYTES>;
/// Refresh scheduler for this board.
pub type Scheduler<'a, M, SPI, CS, D> =
    RefreshScheduler<'a, M, SPI, CS, D, WIDTH, HEIGHT, SURFACE_BYTES, FRAME_BYTES>;

/// Default configuration for this board.
#[must_use]
pub const fn config() -> Config {
    Config::new(WIDTH, HEIGHT, PANELS)
}
