use anyhow::{Context, Result};
use std::io::{self, Write};
use xudl_native::{RusbBus, consts, query_info, report};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let bus = RusbBus::new().context("failed to initialise libusb")?;
    let response = query_info(&bus).with_context(|| {
        format!(
            "info query to {:04x}:{:04x} failed",
            consts::VENDOR_ID,
            consts::PRODUCT_ID
        )
    })?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_hex_lines(&mut out, &response)?;
    out.flush()?;
    Ok(())
}
