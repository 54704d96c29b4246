//! oxidized-espresso - Espresso CPU emulator
//!
//! Loads a flat big-endian code image into guest memory and executes it
//! on one hardware thread. The OS-reimplementation layer, GPU and UI
//! live in sibling projects; this binary drives the CPU core directly.

use anyhow::{bail, Context, Result};

use oe_core::config::Config;
use oe_cpu::{Core, Machine};
use oe_memory::constants::MEM2_BASE;

fn main() -> Result<()> {
    let config = Config::load().unwrap_or_default();
    oe_core::logging::init(&config);

    let mut args = std::env::args().skip(1);
    let Some(image_path) = args.next() else {
        bail!("usage: oxidized-espresso <image> [load-address]");
    };

    let load_address = match args.next() {
        Some(text) => parse_address(&text)?,
        None => MEM2_BASE,
    };

    tracing::info!("Starting oxidized-espresso");

    let machine = Machine::new(config.cpu.clone())?;
    machine.install_host_exception_handler();

    let image = std::fs::read(&image_path)
        .with_context(|| format!("failed to read {}", image_path))?;
    machine
        .mem()
        .write_bytes(load_address, &image)
        .context("image does not fit in guest memory")?;

    tracing::info!(
        "Loaded {} bytes at 0x{:08x}",
        image.len(),
        load_address
    );

    let mut core = Core::new(0);
    core.nia = load_address;

    oe_cpu::exception::set_current_core(&mut core as *mut Core);
    let result = machine.run_core(&mut core);
    oe_cpu::exception::clear_current_core();

    match result {
        Ok(()) => {
            tracing::info!("Core 0 stopped at 0x{:08x}", core.nia);
            Ok(())
        }
        Err(fault) => {
            bail!("core 0 faulted: {}", fault);
        }
    }
}

fn parse_address(text: &str) -> Result<u32> {
    let value = if let Some(hex) = text.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else {
        text.parse()
    };
    value.with_context(|| format!("invalid load address: {}", text))
}
