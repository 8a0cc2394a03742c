//! Scripted in-memory bus that records every call made through it.

use crate::transport::{UsbBus, UsbTransport};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open { vendor_id: u16, product_id: u16 },
    ConfigurationValue(u8),
    SetConfiguration(u8),
    Write { endpoint: u8, data: Vec<u8>, timeout: Duration },
    Read { endpoint: u8, len: usize, timeout: Duration },
}

type CallLog = Rc<RefCell<Vec<Call>>>;

pub struct MockBus {
    log: CallLog,
    device: RefCell<Option<MockTransport>>,
    open_error: Option<rusb::Error>,
}

impl MockBus {
    pub fn empty() -> Self {
        MockBus {
            log: CallLog::default(),
            device: RefCell::new(None),
            open_error: None,
        }
    }

    pub fn with_device(mut device: MockTransport) -> Self {
        let log = CallLog::default();
        device.log = log.clone();
        MockBus {
            log,
            device: RefCell::new(Some(device)),
            open_error: None,
        }
    }

    pub fn failing(error: rusb::Error) -> Self {
        MockBus {
            open_error: Some(error),
            ..MockBus::empty()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }
}

impl UsbBus for MockBus {
    type Transport = MockTransport;

    fn open(&self, vendor_id: u16, product_id: u16) -> rusb::Result<Option<MockTransport>> {
        self.log.borrow_mut().push(Call::Open {
            vendor_id,
            product_id,
        });
        if let Some(e) = self.open_error {
            return Err(e);
        }
        Ok(self.device.borrow_mut().take())
    }
}

pub struct MockTransport {
    log: CallLog,
    config_value: u8,
    config_value_error: Option<rusb::Error>,
    set_config_error: Option<rusb::Error>,
    write_error: Option<rusb::Error>,
    read_error: Option<rusb::Error>,
    response: Vec<u8>,
}

impl MockTransport {
    /// A device that answers every read with `response`.
    pub fn new(response: Vec<u8>) -> Self {
        MockTransport {
            log: CallLog::default(),
            config_value: 1,
            config_value_error: None,
            set_config_error: None,
            write_error: None,
            read_error: None,
            response,
        }
    }

    pub fn config_value(mut self, value: u8) -> Self {
        self.config_value = value;
        self
    }

    pub fn fail_configuration_value(mut self, e: rusb::Error) -> Self {
        self.config_value_error = Some(e);
        self
    }

    pub fn fail_set_configuration(mut self, e: rusb::Error) -> Self {
        self.set_config_error = Some(e);
        self
    }

    pub fn fail_write(mut self, e: rusb::Error) -> Self {
        self.write_error = Some(e);
        self
    }

    pub fn fail_read(mut self, e: rusb::Error) -> Self {
        self.read_error = Some(e);
        self
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl UsbTransport for MockTransport {
    fn configuration_value(&self, index: u8) -> rusb::Result<u8> {
        self.record(Call::ConfigurationValue(index));
        match self.config_value_error {
            Some(e) => Err(e),
            None => Ok(self.config_value),
        }
    }

    fn set_configuration(&mut self, value: u8) -> rusb::Result<()> {
        self.record(Call::SetConfiguration(value));
        match self.set_config_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn write(&mut self, endpoint: u8, data: &[u8], timeout: Duration) -> rusb::Result<usize> {
        self.record(Call::Write {
            endpoint,
            data: data.to_vec(),
            timeout,
        });
        match self.write_error {
            Some(e) => Err(e),
            None => Ok(data.len()),
        }
    }

    fn read(&mut self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> rusb::Result<usize> {
        self.record(Call::Read {
            endpoint,
            len: buf.len(),
            timeout,
        });
        if let Some(e) = self.read_error {
            return Err(e);
        }
        let n = self.response.len().min(buf.len());
        buf[..n].copy_from_slice(&self.response[..n]);
        Ok(n)
    }
}
