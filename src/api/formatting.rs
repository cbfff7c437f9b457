//! Location output formatting and serialization
//!
//! Turns raw [`Location`] samples into stamped records and renders them as
//! human-readable text, JSON or CSV rows for logging.

use crate::core::Location;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A location sample stamped for output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedLocation {
    /// Raw module coordinates (millimetres)
    pub millimeters: MillimeterCoordinates,
    /// Same position in metres, rounded to the formatter precision
    pub meters: MeterCoordinates,
    /// Module confidence score (0-100)
    pub quality: u8,
    /// Status query reported a fresh estimate when this sample was taken
    pub ready: bool,
    /// All-zero sample, typical of a silent module
    pub suspect: bool,
    pub timing: TimingInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MillimeterCoordinates {
    pub x_mm: i32,
    pub y_mm: i32,
    pub z_mm: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterCoordinates {
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,
}

/// Timing information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingInfo {
    /// Sample timestamp (milliseconds since epoch)
    pub timestamp_ms: u64,
    /// Sequence number for tracking
    pub sequence_number: u32,
}

/// Stamps location samples with time and a running sequence number
pub struct LocationFormatter {
    /// Decimal places kept in the metre fields
    pub precision: u8,
    sequence_counter: u32,
}

impl Default for LocationFormatter {
    fn default() -> Self {
        Self {
            precision: 3,
            sequence_counter: 0,
        }
    }
}

impl LocationFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(precision: u8) -> Self {
        Self {
            precision,
            ..Self::default()
        }
    }

    /// Stamp a sample with the current time.
    ///
    /// `ready` is the result of the status query issued alongside the sample.
    pub fn format(&mut self, location: &Location, ready: bool) -> FormattedLocation {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        self.format_at(location, ready, timestamp_ms)
    }

    /// Stamp a sample with an explicit timestamp
    pub fn format_at(&mut self, location: &Location, ready: bool, timestamp_ms: u64) -> FormattedLocation {
        let sequence_number = self.sequence_counter;
        self.sequence_counter = self.sequence_counter.wrapping_add(1);

        let meters = location.to_meters();
        FormattedLocation {
            millimeters: MillimeterCoordinates {
                x_mm: location.x,
                y_mm: location.y,
                z_mm: location.z,
            },
            meters: MeterCoordinates {
                x_m: self.round_to_precision(meters.x),
                y_m: self.round_to_precision(meters.y),
                z_m: self.round_to_precision(meters.z),
            },
            quality: location.quality,
            ready,
            suspect: location.is_zero(),
            timing: TimingInfo {
                timestamp_ms,
                sequence_number,
            },
        }
    }

    fn round_to_precision(&self, value: f64) -> f64 {
        let multiplier = 10f64.powi(self.precision as i32);
        (value * multiplier).round() / multiplier
    }
}

/// Human-readable text formatter
#[derive(Default)]
pub struct TextFormatter {
    /// Single line output
    pub compact: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact() -> Self {
        Self { compact: true }
    }

    pub fn format_text(&self, formatted: &FormattedLocation) -> String {
        let m = &formatted.meters;

        if self.compact {
            let mut line = format!(
                "#{} Pos: X{:.3}m, Y{:.3}m, Z{:.3}m | Q:{}%",
                formatted.timing.sequence_number, m.x_m, m.y_m, m.z_m, formatted.quality
            );
            if !formatted.ready {
                line.push_str(" (stale)");
            }
            if formatted.suspect {
                line.push_str(" (no data?)");
            }
            return line;
        }

        let mut output = String::new();
        output.push_str("Position:\n");
        output.push_str(&format!("  X: {:.3} m ({} mm)\n", m.x_m, formatted.millimeters.x_mm));
        output.push_str(&format!("  Y: {:.3} m ({} mm)\n", m.y_m, formatted.millimeters.y_mm));
        output.push_str(&format!("  Z: {:.3} m ({} mm)\n", m.z_m, formatted.millimeters.z_mm));
        output.push_str(&format!("Quality: {}%\n", formatted.quality));
        output.push_str(&format!("Ready: {}\n", if formatted.ready { "yes" } else { "no" }));
        if formatted.suspect {
            output.push_str("Warning: all-zero sample, module may not be responding\n");
        }
        output.push_str(&format!("Timestamp: {} ms\n", formatted.timing.timestamp_ms));
        output.push_str(&format!("Sequence: #{}\n", formatted.timing.sequence_number));
        output
    }
}

/// JSON formatter for structured output
#[derive(Default)]
pub struct JsonFormatter {
    /// Pretty print JSON
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn format_json(&self, formatted: &FormattedLocation) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(formatted)
        } else {
            serde_json::to_string(formatted)
        }
    }
}

/// CSV formatter for data logging
pub struct CsvFormatter {
    /// Include header row
    pub include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self { include_header: true }
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> String {
        "timestamp_ms,sequence,x_mm,y_mm,z_mm,quality,ready".to_string()
    }

    pub fn format_csv(&self, formatted: &FormattedLocation) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            formatted.timing.timestamp_ms,
            formatted.timing.sequence_number,
            formatted.millimeters.x_mm,
            formatted.millimeters.y_mm,
            formatted.millimeters.z_mm,
            formatted.quality,
            formatted.ready as u8
        )
    }

    /// Header (if enabled) followed by one row per sample
    pub fn format_batch(&self, samples: &[FormattedLocation]) -> String {
        let mut rows = Vec::with_capacity(samples.len() + 1);
        if self.include_header {
            rows.push(self.header());
        }
        rows.extend(samples.iter().map(|s| self.format_csv(s)));
        rows.join("\n")
    }
}
