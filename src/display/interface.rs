/*
 *  display/interface.rs
 *
 *  ssd1325 - grayscale OLED driver
 *  (c) 2020-26 Stuart Hunter
 *
 *  Command/data framing over the 8080-style 8-bit parallel bus
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

use display_interface::DisplayError as BusError;
use embedded_hal::digital::OutputPin;

/// Byte transport between the driver and the controller
///
/// The device only ever talks to the panel through this trait, so a
/// different wiring (SPI, I2C) is a new implementation, not a new driver.
pub trait BusInterface {
    /// Drive every control line to its idle level
    fn init_bus(&mut self) -> Result<(), BusError>;

    /// Latch one byte with the data/command line low
    fn send_command(&mut self, command: u8) -> Result<(), BusError>;

    /// Latch one byte with the data/command line high
    fn send_data(&mut self, value: u8) -> Result<(), BusError>;

    /// Stream a run of data bytes
    fn send_data_slice(&mut self, data: &[u8]) -> Result<(), BusError> {
        for &value in data {
            self.send_data(value)?;
        }
        Ok(())
    }
}

/// Pins of the 8080 parallel bus
pub struct ParallelPins<P> {
    /// D0..D7, bit 0 on index 0
    pub data: [P; 8],
    /// Read enable, active low
    pub rd: P,
    /// Write enable, active low, latches on the rising edge
    pub wr: P,
    /// Chip select, active low
    pub cs: P,
    /// Data/command select, low for command
    pub dc: P,
    /// Reset, active low
    pub rst: P,
}

/// Bit-banged 8-bit parallel interface
pub struct ParallelInterface<P> {
    pins: ParallelPins<P>,
}

impl<P: OutputPin> ParallelInterface<P> {
    pub fn new(pins: ParallelPins<P>) -> Self {
        Self { pins }
    }

    /// Give the pins back
    pub fn release(self) -> ParallelPins<P> {
        self.pins
    }

    fn write_bus(&mut self, value: u8) -> Result<(), BusError> {
        for (bit, pin) in self.pins.data.iter_mut().enumerate() {
            let level = if value & (1 << bit) != 0 {
                pin.set_high()
            } else {
                pin.set_low()
            };
            level.map_err(|_| BusError::BusWriteError)?;
        }
        Ok(())
    }

    /// One write cycle; `data` selects the level of the D/C line.
    ///
    /// The order of the phases is fixed by the controller timing: the
    /// D/C level has to settle before WR falls, and the byte is taken on
    /// the rising edge of WR while CS is still asserted.
    fn frame(&mut self, value: u8, data: bool) -> Result<(), BusError> {
        self.pins.rd.set_high().map_err(|_| BusError::BusWriteError)?;
        self.pins.cs.set_low().map_err(|_| BusError::CSError)?;
        self.pins.wr.set_high().map_err(|_| BusError::BusWriteError)?;
        let mode = if data {
            self.pins.dc.set_high()
        } else {
            self.pins.dc.set_low()
        };
        mode.map_err(|_| BusError::DCError)?;
        self.pins.wr.set_low().map_err(|_| BusError::BusWriteError)?;
        self.write_bus(value)?;
        self.pins.wr.set_high().map_err(|_| BusError::BusWriteError)?;
        self.pins.cs.set_high().map_err(|_| BusError::CSError)
    }
}

impl<P: OutputPin> BusInterface for ParallelInterface<P> {
    fn init_bus(&mut self) -> Result<(), BusError> {
        self.pins.dc.set_high().map_err(|_| BusError::DCError)?;
        self.pins.rd.set_high().map_err(|_| BusError::BusWriteError)?;
        self.pins.wr.set_high().map_err(|_| BusError::BusWriteError)?;
        self.pins.cs.set_high().map_err(|_| BusError::CSError)?;
        self.pins.rst.set_high().map_err(|_| BusError::RSError)
    }

    fn send_command(&mut self, command: u8) -> Result<(), BusError> {
        self.frame(command, false)
    }

    fn send_data(&mut self, value: u8) -> Result<(), BusError> {
        self.frame(value, true)
    }
}
