//! DWM1001 UWB Positioning Module Driver
//!
//! Talks to a Qorvo/Decawave DWM1001 module over its UART API: one two byte
//! command frame out, one fixed-length response back, fields decoded from
//! fixed offsets. The serial link is opened and configured by the caller and
//! lent to the driver.

pub mod core;
pub mod hardware;
pub mod driver;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{Location, ModuleMode};
pub use driver::{ModuleDriver, ResponseFrame};
pub use hardware::{ByteChannel, CommError, CommResult, MockChannel, RecoveryStrategy, StreamChannel};
pub use utils::DriverConfig;
pub use api::{CsvFormatter, FormattedLocation, JsonFormatter, LocationFormatter, TextFormatter};
