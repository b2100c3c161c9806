//! Framebuffer and refresh scheduler for BUSE-style multiplexed LED panels.
//!
//! ## How the panels work
//!
//! A display is a row of identical monochrome panels daisy-chained on one SPI
//! bus with one shared chip-select line. Each panel column is driven by a
//! stack of 8-bit shift registers, one per eight rows, so a 19-row panel has
//! three registers per column. The panels do not keep an image by themselves:
//! the host streams the picture over and over, hundreds of times per second.
//!
//! ### Groups
//! Every panel's columns are split into four interleaved **groups**. Group `g`
//! holds the columns whose index leaves remainder `g` when divided by four.
//! One refresh cycle sends the four groups one after another:
//!
//! 1. chip-select is asserted and the group bytes are written in one burst
//! 2. chip-select is released, which latches the group and lights it
//! 3. the line stays released for the **hold window**
//! 4. chip-select is asserted again
//!
//! The length of the hold window sets the brightness, so every group gets the
//! same one.
//!
//! ### Frame layout
//! Within a group each panel gets a run of bytes that starts with a selector
//! byte holding the group number, followed by the register bytes of that
//! panel's group columns. The panels scan mirrored, with adjacent columns
//! swapped in pairs and rows running bottom-up inside a register. [`encode`]
//! takes care of the mapping.
//!
//! ## Drawing
//!
//! The application draws on a [`PixelSurface`], one bit per pixel, through the
//! `embedded-graphics` [`DrawTarget`](embedded_graphics::draw_target::DrawTarget)
//! trait or plain [`PixelSurface::set_pixel`]. The surface lives in a
//! [`SharedSurface`] so the refresh task can take a consistent snapshot at the
//! start of every cycle while the application keeps drawing.
//!
//! ## Refreshing
//!
//! [`RefreshScheduler`] owns the bus, the chip-select pin and a delay, and
//! drives the cycle above from an async task. Two policies are available:
//!
//! - [`RefreshPolicy::Periodic`] starts a cycle on a fixed-rate tick and folds
//!   ticks that arrive mid-cycle into one
//! - [`RefreshPolicy::Chained`] starts the next cycle as soon as one ends
//!
//! ```rust,ignore
//! use buse_framebuffer::buse128x19;
//!
//! static SURFACE: buse128x19::Shared<CriticalSectionRawMutex> = buse128x19::Shared::new();
//! static STOP: Signal<CriticalSectionRawMutex, ()> = Signal::new();
//!
//! let mut scheduler = buse128x19::Scheduler::new(&SURFACE, spi, cs, Delay, buse128x19::config())?;
//! spawner.spawn(async move { scheduler.run(&STOP).await });
//!
//! SURFACE.update(|surface| {
//!     Text::new("12:34", Point::new(0, 12), style).draw(surface).ok();
//! });
//! ```
//!
//! ## Available Feature Flags
//!
//! ### `log` Feature
//! Emits bring-up, shutdown and failure messages through the `log` crate.
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public types and emits the same messages
//! through `defmt`. No functional changes.
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

#[macro_use]
mod fmt;

pub mod buse128x19;
pub mod chip_select;
pub mod config;
pub mod double_buffer;
pub mod encoder;
pub mod error;
pub mod geometry;
pub mod scheduler;
pub mod state;
pub mod surface;

#[cfg(test)]
mod mock;

pub use chip_select::{ChipSelect, Polarity};
pub use config::Config;
pub use double_buffer::{DoubleBuffer, SharedSurface};
pub use encoder::{encode, HardwareFrame, Selector};
pub use error::{ConfigError, Error, Result};
pub use geometry::{compute_frame_bytes, compute_surface_bytes, Geometry, GROUPS};
pub use scheduler::{RefreshScheduler, RefreshStats};
pub use state::{RefreshPolicy, RefreshState, TickOutcome};
pub use surface::{PixelSurface, Snapshot};
