//! DWM1001 driver demonstration
//!
//! Runs the driver against a scripted mock module. Pass a tty path to talk to
//! real hardware; set the line up first so reads time out instead of blocking:
//!
//! ```text
//! stty -F /dev/ttyACM0 115200 raw -echo min 0 time 1
//! RUST_LOG=debug cargo run --example driver_demo /dev/ttyACM0
//! ```

use dwm1001::core::{CMD_CONFIG_GET, CMD_POSITION_GET, CMD_STATUS_GET, CMD_VERSION_GET};
use dwm1001::{
    ByteChannel, CommError, CsvFormatter, DriverConfig, JsonFormatter, LocationFormatter,
    MockChannel, ModuleDriver, StreamChannel, TextFormatter,
};
use std::fs::OpenOptions;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== DWM1001 Driver Demo ===\n");

    match std::env::args().nth(1) {
        Some(path) => demo_tty(&path)?,
        None => {
            demo_mock_module()?;
            demo_error_handling()?;
        }
    }

    println!("Driver demo completed successfully!");
    Ok(())
}

fn scripted_module() -> MockChannel {
    let mut version = vec![0u8; 22];
    version[0] = 0x40;
    version[3] = 0x50;

    MockChannel::new()
        .with_response(CMD_VERSION_GET, &version)
        .with_response(CMD_CONFIG_GET, &[0x40, 0x01, 0x00, 0x46, 0x02, 0x00, 0x00])
        .with_response(CMD_STATUS_GET, &[0x40, 0x01, 0x00, 0x5A, 0x01, 0x01])
        .with_response(
            CMD_POSITION_GET,
            &[
                0x40, 0x01, 0x00, 0x41, 0x0D, 0xD2, 0x04, 0x00, 0x00, 0x0C, 0xFE, 0xFF, 0xFF,
                0x20, 0x03, 0x00, 0x00, 87,
            ],
        )
}

fn demo_mock_module() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Mock Module Demo ---");

    let mut channel = scripted_module();
    let config = DriverConfig::default();
    run_session(&mut channel, &config)?;

    println!("Frames sent: {:02X?}\n", channel.sent_frames());
    Ok(())
}

fn demo_tty(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Serial Demo on {} ---", path);

    let tty = OpenOptions::new().read(true).write(true).open(path)?;
    let mut channel = StreamChannel::new(tty);
    run_session(&mut channel, &DriverConfig::default())
}

fn run_session<C: ByteChannel>(channel: &mut C, config: &DriverConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut driver = ModuleDriver::begin(channel, config)?;
    println!("Module answered the version handshake");
    println!("Mode: {:?}", driver.mode());

    let mut formatter = LocationFormatter::new();
    let mut samples = Vec::new();

    for _ in 0..3 {
        let ready = driver.is_location_ready();
        if !ready {
            println!("No fresh position yet");
        }
        let location = driver.get_location();
        let formatted = formatter.format(&location, ready);
        println!("{}", TextFormatter::compact().format_text(&formatted));
        samples.push(formatted);
    }

    if let Some(last) = samples.last() {
        println!("{}", JsonFormatter::pretty().format_json(last)?);
    }
    println!("{}", CsvFormatter::new().format_batch(&samples));
    Ok(())
}

fn demo_error_handling() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Error Handling Demo ---");

    let mut channel = scripted_module();
    channel.disconnect();
    let config = DriverConfig::for_tests();

    match ModuleDriver::begin(&mut channel, &config) {
        Err(e) => {
            println!("✓ Handshake failed: {}", e);
            println!("  Strategy: {:?}", e.recovery_strategy());
        }
        Ok(_) => println!("✗ Expected handshake failure"),
    }

    // Legacy queries degrade to zeros rather than failing
    let mut driver = ModuleDriver::new(&mut channel, &config);
    let location = driver.get_location();
    println!("Legacy query on dead link: {} (zero: {})", location, location.is_zero());

    match driver.try_get_location() {
        Err(e @ CommError::Io { .. }) => println!("✓ Fallible query: {} (recoverable: {})", e, e.is_recoverable()),
        other => println!("✗ Unexpected result: {:?}", other),
    }

    let mut truncated = MockChannel::new().with_response(CMD_POSITION_GET, &[0x40, 0x01, 0x00]);
    let mut driver = ModuleDriver::new(&mut truncated, &config);
    if let Err(e) = driver.try_get_location() {
        println!("✓ Truncated reply: {}", e);
    }

    println!("Error handling demo completed\n");
    Ok(())
}
