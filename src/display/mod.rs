/*
 *  display/mod.rs
 *
 *  ssd1325 - grayscale OLED driver
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - SSD1325 controller over a parallel bus
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

// Core trait definitions
pub mod traits;
pub mod error;

// Controller protocol
pub mod command;
pub mod interface;

// Packed RAM copy of the panel
pub mod framebuffer;

// Device and drawing helpers
pub mod ssd1325;
pub mod graphics;

// Re-exports for convenience
pub use traits::{DisplayDriver, DisplayCapabilities};
pub use error::DisplayError;
pub use command::{Cmd, Product, Remap, RemapConfig, MAX_CONTRAST};
pub use interface::{BusInterface, ParallelInterface, ParallelPins};
pub use framebuffer::PackedFrameBuffer;
pub use ssd1325::Ssd1325;
pub use graphics::{PictureType, DEFAULT_FONT};
