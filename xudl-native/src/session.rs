use crate::consts::{
    ENDPOINT_IN, ENDPOINT_OUT, FIRST_CONFIG_INDEX, INFO_CMD, PRODUCT_ID, RESPONSE_LEN,
    TRANSFER_TIMEOUT, VENDOR_ID,
};
use crate::error::{Error, Result, TransferFault};
use crate::transport::{UsbBus, UsbTransport};
use log::debug;

pub type Response = [u8; RESPONSE_LEN];

/// One opened XuDL board.
pub struct Session<T: UsbTransport> {
    transport: T,
}

impl<T: UsbTransport> Session<T> {
    /// Opens the first attached device with the board's vendor/product ID.
    pub fn open<B>(bus: &B) -> Result<Self>
    where
        B: UsbBus<Transport = T>,
    {
        let transport = bus
            .open(VENDOR_ID, PRODUCT_ID)?
            .ok_or(Error::DeviceNotFound {
                vendor_id: VENDOR_ID,
                product_id: PRODUCT_ID,
            })?;
        debug!("Matching device found: VID={:04x}, PID={:04x}", VENDOR_ID, PRODUCT_ID);
        Ok(Session { transport })
    }

    /// Activates the first declared configuration and returns its value.
    pub fn configure(&mut self) -> Result<u8> {
        let value = self
            .transport
            .configuration_value(FIRST_CONFIG_INDEX)
            .map_err(|source| Error::Configuration { source })?;
        self.transport
            .set_configuration(value)
            .map_err(|source| Error::Configuration { source })?;
        debug!("Activated configuration {}", value);
        Ok(value)
    }

    pub fn send_command(&mut self, cmd: u8) -> Result<()> {
        let written = self
            .transport
            .write(ENDPOINT_OUT, &[cmd], TRANSFER_TIMEOUT)
            .map_err(|e| Error::transfer(ENDPOINT_OUT, e))?;
        debug!("Wrote {} byte(s) to endpoint 0x{:02x}", written, ENDPOINT_OUT);
        Ok(())
    }

    /// Reads one full response packet. Anything shorter is a failed transfer.
    pub fn read_response(&mut self) -> Result<Response> {
        let mut buf = [0u8; RESPONSE_LEN];
        let len = self
            .transport
            .read(ENDPOINT_IN, &mut buf, TRANSFER_TIMEOUT)
            .map_err(|e| Error::transfer(ENDPOINT_IN, e))?;
        if len < RESPONSE_LEN {
            return Err(Error::transfer(
                ENDPOINT_IN,
                TransferFault::ShortRead {
                    expected: RESPONSE_LEN,
                    actual: len,
                },
            ));
        }
        debug!("Read {} bytes from endpoint 0x{:02x}: {:02x?}", len, ENDPOINT_IN, buf);
        Ok(buf)
    }

    /// Configure, send the info command, read its answer.
    pub fn exchange(&mut self) -> Result<Response> {
        self.configure()?;
        self.send_command(INFO_CMD)?;
        self.read_response()
    }
}

/// Runs a complete exchange against the first matching device on `bus`.
pub fn query_info<B: UsbBus>(bus: &B) -> Result<Response> {
    Session::open(bus)?.exchange()
}
