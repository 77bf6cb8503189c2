//! Configuration for the reconstruction pipeline.
//!
//! Every tunable of the pipeline lives here: window width, chi2/ndf
//! acceptance cut, the chamber layout, the module pairing, and the two
//! enumeration conventions. `Default` carries the production values.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Base-layout position of one channel within a module (layout units).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelPosition {
    /// Channel id within the module.
    pub channel: u16,
    /// Horizontal position before module offset and scaling.
    pub x: f64,
    /// Vertical position before module offset and scaling.
    pub y: f64,
}

/// Translation applied to the base layout for one module (layout units).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModuleOffset {
    /// Horizontal offset.
    pub dx: f64,
    /// Vertical offset.
    pub dy: f64,
}

/// Chamber geometry description.
///
/// The production chamber has 24 channels per module in three layers of
/// eight (the middle layer staggered by half a pitch) and 18 modules on a
/// 9x2 grid; layout units are cm, scaled to mm.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeometryConfig {
    /// Per-channel base positions, shared by every module.
    pub base_layout: Vec<ChannelPosition>,
    /// Per-module translations; the module id indexes this table.
    pub module_offsets: Vec<ModuleOffset>,
    /// Multiplier from layout units to mm.
    pub scale: f64,
}

impl GeometryConfig {
    /// Number of tube columns per layer (base channel offsets to try).
    #[must_use]
    pub fn columns(&self) -> u16 {
        (self.base_layout.len() / 3) as u16
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        let mut base_layout = Vec::with_capacity(24);
        for ch in 0u16..8 {
            base_layout.push(ChannelPosition { channel: ch, x: 1.5 + 3.0 * f64::from(ch), y: 1.5 });
        }
        for ch in 8u16..16 {
            base_layout.push(ChannelPosition {
                channel: ch,
                x: 3.0 + 3.0 * f64::from(ch - 8),
                y: 4.1,
            });
        }
        for ch in 16u16..24 {
            base_layout.push(ChannelPosition {
                channel: ch,
                x: 1.5 + 3.0 * f64::from(ch - 16),
                y: 6.7,
            });
        }

        let mut module_offsets = Vec::with_capacity(18);
        for col in 0..9 {
            let dx = -96.0 + 24.0 * f64::from(col);
            module_offsets.push(ModuleOffset { dx, dy: 0.0 });
            module_offsets.push(ModuleOffset { dx, dy: 34.7 });
        }

        Self { base_layout, module_offsets, scale: 10.0 }
    }
}

/// One enumeration convention: which channels form the bottom/middle/top
/// slots, and the drift-radius sign assigned to each of the six tubes.
///
/// Tube order for `signs` is (A-bottom, A-middle, A-top, B-bottom,
/// B-middle, B-top).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignConvention {
    /// Channel offsets added to the base channel for the bottom, middle,
    /// and top slots.
    pub layer_offsets: [u16; 3],
    /// Sign pattern applied to the measured drift radii.
    pub signs: [f64; 6],
}

/// All pipeline tunables, with production defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReconstructionConfig {
    /// Width of the half-open trigger-timestamp windows.
    pub window_width: i64,
    /// Maximum accepted chi2/ndf for a candidate.
    pub chi2ndf_cut: f64,
    /// Chamber geometry.
    pub geometry: GeometryConfig,
    /// Geometrically adjacent module pairs that jointly supply six tubes.
    pub module_pairs: Vec<(u16, u16)>,
    /// The enumeration conventions tried per window.
    pub conventions: Vec<SignConvention>,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            window_width: 2000,
            chi2ndf_cut: 50.0,
            geometry: GeometryConfig::default(),
            module_pairs: (0..9).map(|i| (2 * i, 2 * i + 1)).collect(),
            conventions: vec![
                SignConvention {
                    layer_offsets: [0, 8, 16],
                    signs: [1.0, -1.0, 1.0, 1.0, -1.0, 1.0],
                },
                SignConvention {
                    layer_offsets: [0, 7, 16],
                    signs: [-1.0, 1.0, -1.0, -1.0, 1.0, -1.0],
                },
            ],
        }
    }
}
