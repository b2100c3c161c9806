//! Derived layout constants for a panel array.
//!
//! A display of `width` × `height` pixels is built from `panels` identical
//! panels placed side by side. Each panel is fed in [`GROUPS`] interleaved
//! transmissions, and every column is packed into `ceil(height / 8)` register
//! bytes. [`Geometry`] computes the resulting byte layout once, validating the
//! divisibility constraints the encoder relies on.

use crate::error::ConfigError;

/// Number of transmission groups a frame is split into.
pub const GROUPS: usize = 4;

/// Number of bytes needed to hold a `width` × `height` one-bit surface.
#[must_use]
pub const fn compute_surface_bytes(width: usize, height: usize) -> usize {
    (width * height).div_ceil(8)
}

/// Number of bytes in the hardware frame for the given geometry.
///
/// Returns 0 when `panels` is 0; use [`Geometry::new`] to validate the
/// geometry itself.
#[must_use]
pub const fn compute_frame_bytes(width: usize, height: usize, panels: usize) -> usize {
    if panels == 0 {
        return 0;
    }
    let cols_per_group = width / panels / GROUPS;
    GROUPS * panels * (1 + cols_per_group * height.div_ceil(8))
}

/// Validated layout of the hardware frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    width: usize,
    height: usize,
    panels: usize,
    regs_per_col: usize,
    panel_cols: usize,
    cols_per_group: usize,
    panel_bytes: usize,
    group_bytes: usize,
    frame_bytes: usize,
}

impl Geometry {
    /// Resolve the layout for `width` × `height` pixels over `panels` panels.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any dimension is zero, the width does not
    /// split evenly across the panels, or the panel columns do not split
    /// evenly across the [`GROUPS`].
    pub const fn new(width: usize, height: usize, panels: usize) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 || panels == 0 {
            return Err(ConfigError::ZeroDimension {
                width,
                height,
                panels,
            });
        }
        if width % panels != 0 {
            return Err(ConfigError::UnevenPanels { width, panels });
        }
        let panel_cols = width / panels;
        if panel_cols % GROUPS != 0 {
            return Err(ConfigError::UnevenGroups {
                panel_cols,
                groups: GROUPS,
            });
        }
        let regs_per_col = height.div_ceil(8);
        let cols_per_group = panel_cols / GROUPS;
        let panel_bytes = 1 + cols_per_group * regs_per_col;
        let group_bytes = panels * panel_bytes;
        Ok(Self {
            width,
            height,
            panels,
            regs_per_col,
            panel_cols,
            cols_per_group,
            panel_bytes,
            group_bytes,
            frame_bytes: GROUPS * group_bytes,
        })
    }

    /// Display width in pixels.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Display height in pixels.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of panels.
    #[must_use]
    pub const fn panels(&self) -> usize {
        self.panels
    }

    /// Register bytes per column, `ceil(height / 8)`.
    #[must_use]
    pub const fn regs_per_col(&self) -> usize {
        self.regs_per_col
    }

    /// Columns covered by a single panel.
    #[must_use]
    pub const fn panel_cols(&self) -> usize {
        self.panel_cols
    }

    /// Columns of one panel sent in each group.
    #[must_use]
    pub const fn cols_per_group(&self) -> usize {
        self.cols_per_group
    }

    /// Selector byte plus column data for one panel in one group.
    #[must_use]
    pub const fn panel_bytes(&self) -> usize {
        self.panel_bytes
    }

    /// Bytes sent in one bus transaction.
    #[must_use]
    pub const fn group_bytes(&self) -> usize {
        self.group_bytes
    }

    /// Total hardware frame size.
    #[must_use]
    pub const fn frame_bytes(&self) -> usize {
        self.frame_bytes
    }

    /// Size of the one-bit pixel surface in bytes.
    #[must_use]
    pub const fn surface_bytes(&self) -> usize {
        compute_surface_bytes(self.width, self.height)
    }

    /// Check that buffers of `surface_bytes` and `frame_bytes` fit this geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BufferSize`] naming the first mismatching buffer.
    pub const fn check_buffers(
        &self,
        surface_bytes: usize,
        frame_bytes: usize,
    ) -> Result<(), ConfigError> {
        if surface_bytes != self.surface_bytes() {
            return Err(ConfigError::BufferSize {
                buffer: "surface",
                expected: self.surface_bytes(),
                actual: surface_bytes,
            });
        }
        if frame_bytes != self.frame_bytes {
            return Err(ConfigError::BufferSize {
                buffer: "frame",
                expected: self.frame_bytes,
                actual: frame_bytes,
            });
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Geometry {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Geometry<{}x{}, {} panels>",
            self.width,
            self.height,
            self.panels
        );
        defmt::write!(f, " group_bytes: {}", self.group_bytes);
        defmt::write!(f, " frame_bytes: {}", self.frame_bytes);
    }
}
