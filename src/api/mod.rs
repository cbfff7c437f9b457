//! Output helpers for host applications
//!
//! Stamping and rendering of location samples read through the driver.

pub mod formatting;

pub use formatting::{
    CsvFormatter, FormattedLocation, JsonFormatter, LocationFormatter, MeterCoordinates,
    MillimeterCoordinates, TextFormatter, TimingInfo,
};
