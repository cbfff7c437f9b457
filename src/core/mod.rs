//! Core types and protocol constants for the DWM1001 driver

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
