//! Seam between the exchange logic and the USB host stack.
//!
//! [`RusbBus`] and [`RusbTransport`] drive real hardware through libusb.
//! Tests plug in a scripted bus instead.

use log::{debug, warn};
use rusb::{Context, Device, DeviceHandle, TransferType, UsbContext};
use std::time::Duration;

/// Locates and opens a device by vendor/product ID.
pub trait UsbBus {
    type Transport: UsbTransport;

    /// Returns `Ok(None)` when no attached device matches.
    fn open(&self, vendor_id: u16, product_id: u16) -> rusb::Result<Option<Self::Transport>>;
}

/// An opened device.
pub trait UsbTransport {
    /// `bConfigurationValue` of the configuration descriptor at `index`.
    fn configuration_value(&self, index: u8) -> rusb::Result<u8>;
    fn set_configuration(&mut self, value: u8) -> rusb::Result<()>;
    fn write(&mut self, endpoint: u8, data: &[u8], timeout: Duration) -> rusb::Result<usize>;
    fn read(&mut self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> rusb::Result<usize>;
}

pub struct RusbBus<C: UsbContext> {
    context: C,
}

impl RusbBus<Context> {
    pub fn new() -> rusb::Result<Self> {
        Ok(RusbBus::with_context(Context::new()?))
    }
}

impl<C: UsbContext> RusbBus<C> {
    pub fn with_context(context: C) -> Self {
        RusbBus { context }
    }
}

impl<C: UsbContext> UsbBus for RusbBus<C> {
    type Transport = RusbTransport<C>;

    fn open(&self, vendor_id: u16, product_id: u16) -> rusb::Result<Option<Self::Transport>> {
        let mut matching: Vec<Device<C>> = Vec::new();
        for dev in self.context.devices()?.iter() {
            let ids = dev
                .device_descriptor()
                .map(|desc| (desc.vendor_id(), desc.product_id()));
            if let Err(e) = &ids {
                debug!(
                    "Skipping device at bus {} address {}: {}",
                    dev.bus_number(),
                    dev.address(),
                    e
                );
            }
            if is_match(ids, (vendor_id, product_id)) {
                matching.push(dev);
            }
        }

        let Some((dev, count)) = pick_first(matching) else {
            return Ok(None);
        };
        if count > 1 {
            warn!(
                "{} devices match {:04x}:{:04x}, using the first one (bus {} address {})",
                count,
                vendor_id,
                product_id,
                dev.bus_number(),
                dev.address()
            );
        }

        debug!(
            "Opening {:04x}:{:04x} at bus {} address {}",
            vendor_id,
            product_id,
            dev.bus_number(),
            dev.address()
        );
        let handle = dev.open()?;
        Ok(Some(RusbTransport::new(handle)))
    }
}

/// A device whose descriptor can't be read never matches.
fn is_match(ids: rusb::Result<(u16, u16)>, wanted: (u16, u16)) -> bool {
    matches!(ids, Ok(found) if found == wanted)
}

/// First enumerated match, plus how many matched.
fn pick_first<T>(matches: Vec<T>) -> Option<(T, usize)> {
    let count = matches.len();
    matches.into_iter().next().map(|first| (first, count))
}

/// Transfer type for an endpoint, bulk when the descriptor doesn't list it.
fn transfer_kind(found: Option<TransferType>) -> TransferType {
    found.unwrap_or(TransferType::Bulk)
}

/// libusb device handle that claims interfaces on demand.
///
/// Before the first transfer on an endpoint the interface owning it is
/// claimed (detaching a kernel driver if one is bound). Claimed interfaces are
/// released on drop and detached kernel drivers reattached.
pub struct RusbTransport<C: UsbContext> {
    handle: DeviceHandle<C>,
    claimed: Vec<u8>,
    detached: Vec<u8>,
}

impl<C: UsbContext> RusbTransport<C> {
    pub fn new(handle: DeviceHandle<C>) -> Self {
        RusbTransport {
            handle,
            claimed: Vec::new(),
            detached: Vec::new(),
        }
    }

    /// Interface number and transfer type of `endpoint` in the active configuration.
    fn find_endpoint(&self, endpoint: u8) -> rusb::Result<Option<(u8, TransferType)>> {
        let config = self.handle.device().active_config_descriptor()?;
        for iface in config.interfaces() {
            for desc in iface.descriptors() {
                for ep in desc.endpoint_descriptors() {
                    if ep.address() == endpoint {
                        return Ok(Some((desc.interface_number(), ep.transfer_type())));
                    }
                }
            }
        }
        Ok(None)
    }

    fn claim(&mut self, iface: u8) -> rusb::Result<()> {
        if self.claimed.contains(&iface) {
            return Ok(());
        }
        match self.handle.kernel_driver_active(iface) {
            Ok(true) => {
                self.handle.detach_kernel_driver(iface)?;
                self.detached.push(iface);
                debug!("Detached kernel driver from interface {}", iface);
            }
            Ok(false) | Err(rusb::Error::NotSupported) => {}
            Err(e) => return Err(e),
        }
        self.handle.claim_interface(iface)?;
        debug!("Claimed interface {}", iface);
        self.claimed.push(iface);
        Ok(())
    }

    /// Claims the owning interface and picks the transfer type for `endpoint`.
    fn prepare(&mut self, endpoint: u8) -> rusb::Result<TransferType> {
        let found = self.find_endpoint(endpoint)?;
        match found {
            Some((iface, _)) => self.claim(iface)?,
            None => debug!(
                "Endpoint 0x{:02x} not described by the active configuration, using bulk",
                endpoint
            ),
        }
        Ok(transfer_kind(found.map(|(_, kind)| kind)))
    }
}

impl<C: UsbContext> UsbTransport for RusbTransport<C> {
    fn configuration_value(&self, index: u8) -> rusb::Result<u8> {
        Ok(self.handle.device().config_descriptor(index)?.number())
    }

    fn set_configuration(&mut self, value: u8) -> rusb::Result<()> {
        self.handle.set_active_configuration(value)
    }

    fn write(&mut self, endpoint: u8, data: &[u8], timeout: Duration) -> rusb::Result<usize> {
        match self.prepare(endpoint)? {
            TransferType::Interrupt => self.handle.write_interrupt(endpoint, data, timeout),
            _ => self.handle.write_bulk(endpoint, data, timeout),
        }
    }

    fn read(&mut self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> rusb::Result<usize> {
        match self.prepare(endpoint)? {
            TransferType::Interrupt => self.handle.read_interrupt(endpoint, buf, timeout),
            _ => self.handle.read_bulk(endpoint, buf, timeout),
        }
    }
}

impl<C: UsbContext> Drop for RusbTransport<C> {
    fn drop(&mut self) {
        for iface in self.claimed.drain(..) {
            if let Err(e) = self.handle.release_interface(iface) {
                debug!("Failed to release interface {}: {}", iface, e);
            }
        }
        for iface in self.detached.drain(..) {
            if let Err(e) = self.handle.attach_kernel_driver(iface) {
                debug!("Failed to reattach kernel driver to interface {}: {}", iface, e);
            }
        }
    }
}
