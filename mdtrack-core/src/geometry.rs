//! Chamber geometry: wire positions per (module, channel) address.

use std::collections::HashMap;

use crate::config::GeometryConfig;
use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wire position in the chamber plane (mm).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    /// Horizontal coordinate (mm).
    pub x: f64,
    /// Vertical coordinate (mm).
    pub y: f64,
}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Precomputed mapping from (module, channel) to wire position.
///
/// Built once at startup from the configured base layout replicated
/// across the module offsets; read-only afterwards, so it can be shared
/// across threads without locking.
#[derive(Debug, Clone)]
pub struct GeometryTable {
    positions: HashMap<(u16, u16), Position>,
}

impl GeometryTable {
    /// Builds the table: for every module offset and every base-layout
    /// channel, position = (base + offset) * scale.
    #[must_use]
    pub fn from_config(config: &GeometryConfig) -> Self {
        let mut positions =
            HashMap::with_capacity(config.module_offsets.len() * config.base_layout.len());
        for (module, offset) in config.module_offsets.iter().enumerate() {
            for entry in &config.base_layout {
                let x = (entry.x + offset.dx) * config.scale;
                let y = (entry.y + offset.dy) * config.scale;
                positions.insert((module as u16, entry.channel), Position::new(x, y));
            }
        }
        Self { positions }
    }

    /// Returns the wire position for an address, or `UnknownAddress`.
    pub fn position_of(&self, module: u16, channel: u16) -> Result<Position> {
        self.positions
            .get(&(module, channel))
            .copied()
            .ok_or(Error::UnknownAddress { module, channel })
    }

    /// Returns the number of registered addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if no addresses are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelPosition, ModuleOffset};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_production_table_size() {
        let table = GeometryTable::from_config(&GeometryConfig::default());
        assert_eq!(table.len(), 18 * 24);
    }

    #[test]
    fn test_position_scaling_and_offset() {
        let config = GeometryConfig {
            base_layout: vec![ChannelPosition { channel: 3, x: 1.5, y: 4.1 }],
            module_offsets: vec![ModuleOffset { dx: 0.0, dy: 0.0 }, ModuleOffset { dx: 24.0, dy: 34.7 }],
            scale: 10.0,
        };
        let table = GeometryTable::from_config(&config);
        let p = table.position_of(1, 3).unwrap();
        assert_abs_diff_eq!(p.x, 255.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 388.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_address() {
        let table = GeometryTable::from_config(&GeometryConfig::default());
        let err = table.position_of(99, 0).unwrap_err();
        assert!(matches!(err, Error::UnknownAddress { module: 99, channel: 0 }));
    }
}
