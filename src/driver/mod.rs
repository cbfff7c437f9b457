//! DWM1001 command/response driver

pub mod frame;
pub mod module;

pub use frame::ResponseFrame;
pub use module::ModuleDriver;
