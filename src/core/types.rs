//! Core data types for the driver

use crate::core::constants::{
    POSITION_QUALITY_OFFSET, POSITION_RESPONSE_LEN, POSITION_X_OFFSET, POSITION_Y_OFFSET,
    POSITION_Z_OFFSET,
};
use crate::driver::frame::{read_i32_le, read_u8};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position sample reported by the module
///
/// Coordinates are millimetres in the module's local frame. `quality` is the
/// module's confidence score (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub quality: u8,
}

impl Location {
    pub fn new(x: i32, y: i32, z: i32, quality: u8) -> Self {
        Self { x, y, z, quality }
    }

    /// Decode a `dwm_pos_get` response
    pub fn decode(resp: &[u8; POSITION_RESPONSE_LEN]) -> Self {
        Self {
            x: read_i32_le(resp, POSITION_X_OFFSET),
            y: read_i32_le(resp, POSITION_Y_OFFSET),
            z: read_i32_le(resp, POSITION_Z_OFFSET),
            quality: read_u8(resp, POSITION_QUALITY_OFFSET),
        }
    }

    /// Position in metres
    pub fn to_meters(&self) -> Vector3<f64> {
        Vector3::new(self.x as f64, self.y as f64, self.z as f64) / 1000.0
    }

    /// True for the all-zero sample an unresponsive module decodes to.
    ///
    /// A module sitting at the origin with zero quality looks the same.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x={} y={} z={} mm q={}", self.x, self.y, self.z, self.quality)
    }
}

/// Operating role of the module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleMode {
    Tag,
    Anchor,
}

impl ModuleMode {
    /// Interpret the mode byte of a `dwm_cfg_get` response
    pub fn from_mode_byte(byte: u8) -> Self {
        if byte & crate::core::constants::CONFIG_MODE_ANCHOR_BIT == 0 {
            ModuleMode::Tag
        } else {
            ModuleMode::Anchor
        }
    }
}
