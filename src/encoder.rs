//! Hardware frame layout and the surface-to-frame encoder.
//!
//! # Memory Layout
//! A frame is [`GROUPS`] group chunks sent as separate bus transactions.
//! Each chunk holds one block per panel:
//!
//! ```text
//! | selector | col 0: reg 0 .. reg R-1 | col 1: ... | ... | col C-1: ... |
//! ```
//!
//! where `R` is [`Geometry::regs_per_col`] and `C` is
//! [`Geometry::cols_per_group`]. The selector carries the group index. Within a
//! register the bottom-most physical row of the eight is bit 0, so the
//! hardware's reversed scan order lands most significant bit first.
//!
//! # Pixel Mapping
//! The panels scan right to left and bottom to top, and adjacent column pairs
//! are swapped by the panel wiring. For every output column `x` the encoder
//! reads surface column `WIDTH - 1 - x`, flips the row, and places the bit in
//! group `x % GROUPS`, panel `x / panel_cols`, at column slot
//! `((x % panel_cols) / GROUPS) ^ 1`.

use bitfield::bitfield;
use embedded_dma::ReadBuffer;

use crate::geometry::{Geometry, GROUPS};
use crate::surface::Snapshot;

bitfield! {
    /// Leading byte of every panel block.
    ///
    /// The bit layout is as follows:
    /// - Bits 7-2: Reserved, always zero
    /// - Bits 1-0: Group index
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct Selector(u8);
    impl Debug;
    /// Group index carried by this selector.
    pub u8, group, set_group: 1, 0;
}

impl Selector {
    /// Selector for group `group`.
    #[must_use]
    pub fn for_group(group: u8) -> Self {
        let mut selector = Self(0);
        selector.set_group(group);
        selector
    }

    /// Raw byte as sent on the wire.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Encoded frame ready for transmission.
///
/// # Type Parameters
/// - `FRAME_BYTES`: Frame size, use [`compute_frame_bytes`](crate::compute_frame_bytes)
#[derive(Clone, PartialEq, Eq)]
#[repr(C)]
#[repr(align(4))]
pub struct HardwareFrame<const FRAME_BYTES: usize> {
    bytes: [u8; FRAME_BYTES],
}

impl<const FRAME_BYTES: usize> Default for HardwareFrame<FRAME_BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const FRAME_BYTES: usize> HardwareFrame<FRAME_BYTES> {
    /// Create a zeroed frame.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; FRAME_BYTES],
        }
    }

    /// Zero the whole frame.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Bytes of `group`, as sent in one bus transaction.
    ///
    /// # Panics
    ///
    /// Panics if `group >= GROUPS`.
    #[must_use]
    pub fn group(&self, group: usize) -> &[u8] {
        let len = FRAME_BYTES / GROUPS;
        &self.bytes[group * len..(group + 1) * len]
    }

    /// The whole frame.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; FRAME_BYTES] {
        &self.bytes
    }
}

impl<const FRAME_BYTES: usize> core::fmt::Debug for HardwareFrame<FRAME_BYTES> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HardwareFrame")
            .field("size", &FRAME_BYTES)
            .field("group_size", &(FRAME_BYTES / GROUPS))
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const FRAME_BYTES: usize> defmt::Format for HardwareFrame<FRAME_BYTES> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "HardwareFrame<{}>", FRAME_BYTES);
        defmt::write!(f, " group_size: {}", FRAME_BYTES / GROUPS);
    }
}

unsafe impl<const FRAME_BYTES: usize> ReadBuffer for HardwareFrame<FRAME_BYTES> {
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        let ptr = self.bytes.as_ptr();
        let len = self.bytes.len();
        (ptr, len)
    }
}

/// Rebuild `frame` from `snapshot`.
///
/// The frame is cleared, every selector is written, and each lit pixel sets
/// exactly one data bit. `geometry` must have been checked against both
/// buffer sizes with [`Geometry::check_buffers`].
pub fn encode<const SURFACE_BYTES: usize, const FRAME_BYTES: usize>(
    snapshot: &Snapshot<SURFACE_BYTES>,
    geometry: &Geometry,
    frame: &mut HardwareFrame<FRAME_BYTES>,
) {
    frame.clear();

    let width = geometry.width();
    let height = geometry.height();
    let panel_cols = geometry.panel_cols();
    let panel_bytes = geometry.panel_bytes();
    let group_bytes = geometry.group_bytes();
    let regs_per_col = geometry.regs_per_col();

    for group in 0..GROUPS {
        let selector = Selector::for_group(group as u8).bits();
        for panel in 0..geometry.panels() {
            frame.bytes[group * group_bytes + panel * panel_bytes] = selector;
        }
    }

    for y in 0..height {
        let row = y * width;
        let y_rev = height - 1 - y;
        let reg = y_rev / 8;
        let mask = 1u8 << (7 - (y_rev % 8));
        for x in 0..width {
            if !snapshot.bit(row + width - 1 - x) {
                continue;
            }
            let panel = x / panel_cols;
            let group = x % GROUPS;
            let col = ((x % panel_cols) / GROUPS) ^ 1;
            let base = group * group_bytes + panel * panel_bytes;
            frame.bytes[base + 1 + col * regs_per_col + reg] |= mask;
        }
    }
}
