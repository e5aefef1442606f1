pub const APP_NAME: &str = "colorpipe";

pub const ERROR_LOG_FILE: &str = "colorpipe-error.log";
pub const DEBUG_LOG_FILE: &str = "colorpipe-debug.log";

/// Longest line fed to the color checksum. Longer lines still pass through
/// the echo in full; only the checksum input is capped.
pub const LINE_MAX: usize = 512;

pub const DEFAULT_FPS: u32 = 20;

/// Width of one history column, in terminal cells.
pub const DEFAULT_COLUMN_WIDTH: u16 = 2;
