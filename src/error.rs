//! Error types.

use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Geometry or buffer validation failure, detected once at startup.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Width, height or panel count is zero.
    #[display("width, height and panel count must be positive ({width}x{height}, {panels} panels)")]
    ZeroDimension {
        /// Configured width in pixels
        width: usize,
        /// Configured height in pixels
        height: usize,
        /// Configured panel count
        panels: usize,
    },

    /// Width does not split evenly across the panels.
    #[display("width {width} is not divisible by panel count {panels}")]
    UnevenPanels {
        /// Configured width in pixels
        width: usize,
        /// Configured panel count
        panels: usize,
    },

    /// Panel columns do not split evenly across the transmission groups.
    #[display("{panel_cols} columns per panel is not divisible by {groups} groups")]
    UnevenGroups {
        /// Columns per panel
        panel_cols: usize,
        /// Number of transmission groups
        groups: usize,
    },

    /// The surface type's dimensions differ from the configured ones.
    #[display("surface is {surface_width}x{surface_height}, configuration says {width}x{height}")]
    SurfaceMismatch {
        /// Width of the surface type
        surface_width: usize,
        /// Height of the surface type
        surface_height: usize,
        /// Configured width
        width: usize,
        /// Configured height
        height: usize,
    },

    /// A buffer was sized for a different geometry.
    #[display("{buffer} buffer holds {actual} bytes, geometry needs {expected}")]
    BufferSize {
        /// Which buffer disagrees
        buffer: &'static str,
        /// Bytes required by the geometry
        expected: usize,
        /// Bytes the buffer actually holds
        actual: usize,
    },
}

/// Unified error type for this crate.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Invalid configuration; the display is not brought up.
    #[display("configuration error: {_0}")]
    Config(ConfigError),

    /// The serial bus rejected a group write.
    #[display("bus write failed: {_0:?}")]
    Bus(#[error(not(source))] embedded_hal::spi::ErrorKind),

    /// The chip-select line could not be driven.
    #[display("chip-select failed: {_0:?}")]
    ChipSelect(#[error(not(source))] embedded_hal::digital::ErrorKind),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match *self {
            Self::ZeroDimension {
                width,
                height,
                panels,
            } => defmt::write!(f, "ZeroDimension({}x{}, {} panels)", width, height, panels),
            Self::UnevenPanels { width, panels } => {
                defmt::write!(f, "UnevenPanels(width {}, {} panels)", width, panels);
            }
            Self::UnevenGroups { panel_cols, groups } => {
                defmt::write!(f, "UnevenGroups({} cols, {} groups)", panel_cols, groups);
            }
            Self::SurfaceMismatch {
                surface_width,
                surface_height,
                width,
                height,
            } => defmt::write!(
                f,
                "SurfaceMismatch({}x{} vs {}x{})",
                surface_width,
                surface_height,
                width,
                height
            ),
            Self::BufferSize {
                buffer,
                expected,
                actual,
            } => defmt::write!(
                f,
                "BufferSize({=str}: expected {}, actual {})",
                buffer,
                expected,
                actual
            ),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Config(err) => defmt::write!(f, "Config({})", err),
            Self::Bus(kind) => defmt::write!(f, "Bus({})", defmt::Debug2Format(kind)),
            Self::ChipSelect(kind) => {
                defmt::write!(f, "ChipSelect({})", defmt::Debug2Format(kind));
            }
        }
    }
}
