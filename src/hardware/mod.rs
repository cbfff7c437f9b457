//! Hardware abstraction for the module link
//!
//! The driver talks to the module through the [`ByteChannel`] capability.
//! Adapters are provided for `std::io` streams and for scripted testing.

pub mod channel;
pub mod serial;
pub mod mock;
pub mod error;

pub use channel::ByteChannel;
pub use serial::StreamChannel;
pub use mock::MockChannel;
pub use error::{CommError, CommResult, RecoveryStrategy};
