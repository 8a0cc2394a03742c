use std::time::Duration;

// XuDL board (Microchip VID)
pub const VENDOR_ID: u16 = 0x04D8;
pub const PRODUCT_ID: u16 = 0xFF8C;

pub const ENDPOINT_OUT: u8 = 0x01;
pub const ENDPOINT_IN: u8 = 0x81;

/// Info command understood by the board firmware. The answer is one 16-byte packet.
pub const INFO_CMD: u8 = 0x40;
pub const RESPONSE_LEN: usize = 16;

pub const TRANSFER_TIMEOUT: Duration = Duration::from_millis(100);

/// Index of the configuration descriptor activated on open.
pub const FIRST_CONFIG_INDEX: u8 = 0;
