//! Wire protocol constants for the DWM1001 UART API
//!
//! Every command is a two byte frame: the opcode followed by a zero length
//! byte. Response sizes are the per-query drain caps, and the offsets name
//! the only bytes each query decodes.

/// Length byte sent after every opcode (no command here carries a payload)
pub const EMPTY_PAYLOAD_LEN: u8 = 0x00;

/// `dwm_ver_get`
pub const CMD_VERSION_GET: u8 = 0x15;
/// `dwm_cfg_get`
pub const CMD_CONFIG_GET: u8 = 0x08;
/// `dwm_status_get`
pub const CMD_STATUS_GET: u8 = 0x32;
/// `dwm_pos_get`
pub const CMD_POSITION_GET: u8 = 0x02;

pub const VERSION_RESPONSE_LEN: usize = 22;
pub const CONFIG_RESPONSE_LEN: usize = 7;
pub const STATUS_RESPONSE_LEN: usize = 6;
pub const POSITION_RESPONSE_LEN: usize = 18;

// Version response sentinels
pub const VERSION_MARKER_OFFSET: usize = 0;
pub const VERSION_MARKER: u8 = 0x40;
pub const VERSION_TAG_OFFSET: usize = 3;
pub const VERSION_TAG: u8 = 0x50;

/// Byte carrying the node mode bit in the configuration response
pub const CONFIG_MODE_OFFSET: usize = 6;
/// Set for anchor mode, clear for tag mode
pub const CONFIG_MODE_ANCHOR_BIT: u8 = 0x20;

pub const STATUS_FLAGS_OFFSET: usize = 5;
pub const STATUS_LOCATION_READY_BIT: u8 = 0x01;

pub const POSITION_X_OFFSET: usize = 5;
pub const POSITION_Y_OFFSET: usize = 9;
pub const POSITION_Z_OFFSET: usize = 13;
pub const POSITION_QUALITY_OFFSET: usize = 17;

/// Settle delay between sending a command and draining the reply (ms).
/// Empirical headroom for the module's response latency, not a protocol value.
pub const DEFAULT_SETTLE_INTERVAL_MS: u64 = 20;
