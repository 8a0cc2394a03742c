#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("device {vendor_id:04x}:{product_id:04x} not found")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },
    #[error("failed to activate the first configuration")]
    Configuration { source: rusb::Error },
    #[error("transfer on endpoint 0x{endpoint:02x} failed")]
    Transfer {
        endpoint: u8,
        #[source]
        source: TransferFault,
    },
    #[error("USB host error")]
    Usb(#[from] rusb::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum TransferFault {
    #[error(transparent)]
    Usb(#[from] rusb::Error),
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },
}

impl Error {
    pub(crate) fn transfer(endpoint: u8, source: impl Into<TransferFault>) -> Self {
        Error::Transfer {
            endpoint,
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
