/*
 *  main.rs
 *
 *  ssd1325 - grayscale OLED driver
 *  (c) 2020-26 Stuart Hunter
 *
 *  Demo: bring up an SSD1325 panel on Linux GPIO and draw a gray ramp
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use anyhow::{bail, Context};
use embedded_graphics::pixelcolor::Gray4;
use env_logger::Env;
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, SysfsPin};
use log::{info, warn};

use ssd1325::config::{self, BusConfig, DisplayConfig};
use ssd1325::display::{DisplayError, ParallelInterface, ParallelPins, Product, Ssd1325};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Export a sysfs GPIO line and make it an output
fn output_pin(number: u32) -> Result<SysfsPin, DisplayError> {
    let pin = SysfsPin::new(u64::from(number));
    pin.export()?;
    pin.set_direction(Direction::Out)?;
    Ok(pin)
}

fn parallel_pins(bus: &BusConfig) -> anyhow::Result<ParallelPins<SysfsPin>> {
    match bus {
        BusConfig::Parallel { data_pins, rd_pin, wr_pin, cs_pin, dc_pin, rst_pin } => {
            let mut data = Vec::with_capacity(8);
            for &n in data_pins {
                data.push(output_pin(n).with_context(|| format!("data line GPIO{}", n))?);
            }
            let data: [SysfsPin; 8] = data
                .try_into()
                .map_err(|_| anyhow::anyhow!("expected eight data lines"))?;

            Ok(ParallelPins {
                data,
                rd: output_pin(*rd_pin).context("RD line")?,
                wr: output_pin(*wr_pin).context("WR line")?,
                cs: output_pin(*cs_pin).context("CS line")?,
                dc: output_pin(*dc_pin).context("D/C line")?,
                rst: output_pin(*rst_pin).context("RST line")?,
            })
        }
        BusConfig::Spi { .. } | BusConfig::I2c { .. } => {
            Err(DisplayError::UnsupportedOperation).context("only the parallel bus is implemented")
        }
    }
}

fn run(display_cfg: &DisplayConfig) -> anyhow::Result<()> {
    let bus = display_cfg
        .bus
        .as_ref()
        .context("no bus configuration under display.bus")?;
    let product = display_cfg.product.unwrap_or(Product::Rex012864f);
    let width = display_cfg.width.unwrap_or(128);
    let height = display_cfg.height.unwrap_or(64);

    let interface = ParallelInterface::new(parallel_pins(bus)?);
    let mut display = Ssd1325::new(interface, Delay, product, width, height)?;
    display.init()?;

    if let Some(contrast) = display_cfg.contrast {
        display.set_contrast(contrast)?;
    }
    if display_cfg.invert.unwrap_or(false) {
        display.set_invert(true)?;
    }

    // 16 vertical bars, one per gray level
    let bar = width / 16;
    for level in 0..16u8 {
        display.draw_rectangle(u32::from(level) * bar, 0, bar, height / 2, Gray4::new(level), true)?;
    }
    display.draw_rectangle(0, height / 2, width, height / 2, Gray4::new(0x3), false)?;
    if let Err(e) = display.draw_string(2, height / 2 + 2, env!("CARGO_PKG_NAME"), Gray4::new(0xF), Gray4::new(0), 1) {
        warn!("caption skipped: {}", e);
    }

    display.flush()?;
    info!("Frame sent");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;

    env_logger::Builder::from_env(
        Env::default().default_filter_or(cfg.log_level.as_deref().unwrap_or("info")),
    )
    .format_timestamp_secs()
    .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let Some(display_cfg) = cfg.display.as_ref() else {
        bail!("no display section in the configuration");
    };
    run(display_cfg)
}
