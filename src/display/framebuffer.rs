/*
 *  display/framebuffer.rs
 *
 *  ssd1325 - grayscale OLED driver
 *  (c) 2020-26 Stuart Hunter
 *
 *  Packed 4-bit grayscale framebuffer mirroring the controller GDDRAM
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

/// Smallest panel edge the controller can be wired to
pub const MIN_DIMENSION: u32 = 16;

/// Largest panel edge the controller can address
pub const MAX_DIMENSION: u32 = 128;

/// A runtime-sized framebuffer holding two 4-bit pixels per byte.
///
/// Rows are stored top to bottom, each row `width / 2` bytes long. The
/// pixel at an even `x` lives in the high nibble, the odd neighbour in the
/// low nibble, which is exactly the layout the controller expects on the
/// wire.
#[derive(Debug, Clone)]
pub struct PackedFrameBuffer {
    buf: Vec<u8>,
    w: u32,
    h: u32,
}

impl PackedFrameBuffer {
    /// Allocate a zeroed buffer, validating the panel geometry
    pub fn new(width: u32, height: u32) -> Result<Self, DisplayError> {
        if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&width) {
            return Err(DisplayError::InvalidConfiguration(format!(
                "width must be between {} and {}, got {}",
                MIN_DIMENSION, MAX_DIMENSION, width
            )));
        }
        if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&height) {
            return Err(DisplayError::InvalidConfiguration(format!(
                "height must be between {} and {}, got {}",
                MIN_DIMENSION, MAX_DIMENSION, height
            )));
        }
        if width % 2 != 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "width must be even to pack two pixels per byte, got {}",
                width
            )));
        }

        Ok(Self {
            buf: vec![0; (width * height / 2) as usize],
            w: width,
            h: height,
        })
    }

    pub fn width(&self) -> u32 { self.w }
    pub fn height(&self) -> u32 { self.h }

    /// Bytes per row
    #[inline]
    pub fn row_stride(&self) -> usize { (self.w / 2) as usize }

    /// Total size in bytes, `width * height / 2`
    pub fn len(&self) -> usize { self.buf.len() }

    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    /// Immutable raw access
    pub fn as_slice(&self) -> &[u8] { &self.buf }

    /// Zero every pixel
    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    /// Replace the whole buffer with an already packed image
    pub fn copy_from(&mut self, packed: &[u8]) -> Result<(), DisplayError> {
        if packed.len() != self.buf.len() {
            return Err(DisplayError::BufferSizeMismatch {
                expected: self.buf.len(),
                actual: packed.len(),
            });
        }
        self.buf.copy_from_slice(packed);
        Ok(())
    }

    #[inline]
    fn byte_index(&self, x: u32, y: u32) -> usize {
        (x / 2) as usize + y as usize * self.row_stride()
    }

    /// Store one gray level (0..=15, upper bits ignored), keeping the
    /// sibling nibble intact
    pub fn set_pixel(&mut self, x: u32, y: u32, gray: u8) -> Result<(), DisplayError> {
        if x >= self.w || y >= self.h {
            return Err(DisplayError::WrongPosition { x, y });
        }

        let i = self.byte_index(x, y);
        let byte = &mut self.buf[i];
        if x % 2 == 1 {
            *byte = (gray & 0x0F) | (*byte & 0xF0);
        } else {
            *byte = ((gray << 4) & 0xF0) | (*byte & 0x0F);
        }
        Ok(())
    }

    /// Read back one gray level; `None` outside the panel
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.w || y >= self.h {
            return None;
        }
        let byte = self.buf[self.byte_index(x, y)];
        Some(if x % 2 == 1 { byte & 0x0F } else { byte >> 4 })
    }

    /// Bytes covering rows `y0..=y1` and byte columns `x0/2..=x1/2`, row by
    /// row. A reversed range yields nothing.
    pub fn window(&self, x0: u32, x1: u32, y0: u32, y1: u32) -> impl Iterator<Item = u8> + '_ {
        let stride = self.row_stride();
        let (c0, c1) = ((x0 / 2) as usize, (x1 / 2) as usize);
        (y0 as usize..=y1 as usize).flat_map(move |row| {
            let base = row * stride;
            self.buf.get(base + c0..=base + c1).unwrap_or(&[]).iter().copied()
        })
    }
}
