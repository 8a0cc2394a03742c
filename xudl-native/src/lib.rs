//! Host side of the XuDL info query: find the board, activate its first
//! configuration, send the info command and read back one 16-byte packet.

pub mod consts;
pub mod error;
pub mod report;
pub mod session;
pub mod transport;

#[cfg(test)]
mod mock;

pub use error::{Error, Result, TransferFault};
pub use session::{Response, Session, query_info};
pub use transport::{RusbBus, RusbTransport, UsbBus, UsbTransport};
