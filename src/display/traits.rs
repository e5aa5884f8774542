/*
 *  display/traits.rs
 *
 *  ssd1325 - grayscale OLED driver
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for display driver abstraction
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

use crate::display::error::DisplayError;

/// Display capabilities and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Gray levels per pixel
    pub gray_levels: u8,
}

/// Minimal hardware abstraction over a buffered display
///
/// Everything is drawn into a RAM copy first and only reaches the glass
/// on [`DisplayDriver::flush`].
pub trait DisplayDriver {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Bring the controller up; safe to call again, it reruns the sequence
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Set display brightness (0-255)
    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError>;

    /// Flush the current framebuffer to the display hardware
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Clear the display to blank/off state
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Replace the framebuffer with `buffer` and flush it
    ///
    /// The layout is the packed controller format, two pixels per byte.
    fn write_buffer(&mut self, buffer: &[u8]) -> Result<(), DisplayError>;

    /// Set display inversion (if supported)
    fn set_invert(&mut self, _inverted: bool) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }
}
