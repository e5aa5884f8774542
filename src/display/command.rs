/*
 *  display/command.rs
 *
 *  ssd1325 - grayscale OLED driver
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1325 command set, remap flags and supported panel products
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

use std::fmt;
use std::str::FromStr;

use crate::display::error::DisplayError;

/// Controller opcodes
pub struct Cmd;

impl Cmd {
    // Addressing
    pub const SET_COLUMN_ADDR: u8 = 0x15;
    pub const SET_ROW_ADDR: u8 = 0x75;

    // Configuration
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SEGMENT_REMAP: u8 = 0xA0;
    pub const START_LINE: u8 = 0xA1;

    // Display mode
    pub const DISPLAY_NORMAL: u8 = 0xA4;
    /// Entire display on, every pixel at GS15
    pub const DISPLAY_ALL_ON: u8 = 0xA5;
    /// Entire display off, every pixel at GS0
    pub const DISPLAY_ALL_OFF: u8 = 0xA6;
    pub const DISPLAY_INVERSE: u8 = 0xA7;

    // Power
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
}

/// Flags for [`Cmd::SEGMENT_REMAP`]
pub struct Remap;

impl Remap {
    pub const COLUMN: u8 = 0x01;
    pub const NIBBLE: u8 = 0x02;
    pub const ADDR_INCREMENT: u8 = 0x04;
    pub const COM: u8 = 0x10;
    pub const ODD_EVEN_COM: u8 = 0x40;
}

/// Highest value accepted by [`Cmd::SET_CONTRAST`]
pub const MAX_CONTRAST: u8 = 0x7F;

/// Model tag carried in the high byte of every product tag
pub const MODEL_SSD1325: u16 = 0x2500;

/// Panel wiring chosen by the module vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapConfig {
    /// Value sent after [`Cmd::SEGMENT_REMAP`]
    pub flags: u8,
    /// Value sent after [`Cmd::START_LINE`]
    pub start_line: u8,
}

/// Panel modules built around the SSD1325
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// Raystar REX012864F, 128x64
    Rex012864f,
}

impl Product {
    /// Numeric tag as stored by the board layer
    pub fn tag(self) -> u16 {
        match self {
            Product::Rex012864f => 0x0001 | MODEL_SSD1325,
        }
    }

    /// Look a product up by its numeric tag
    pub fn from_tag(tag: u16) -> Result<Self, DisplayError> {
        match tag {
            t if t == Product::Rex012864f.tag() => Ok(Product::Rex012864f),
            _ => Err(DisplayError::InvalidConfiguration(format!(
                "unknown SSD1325 product tag 0x{:04X}",
                tag
            ))),
        }
    }

    /// Segment remap and start line for this panel
    pub fn remap(self) -> RemapConfig {
        match self {
            // REX012864F: nibble remap with odd/even COM split
            Product::Rex012864f => RemapConfig {
                flags: Remap::ODD_EVEN_COM | Remap::NIBBLE,
                start_line: 0,
            },
        }
    }
}

impl FromStr for Product {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rex012864f" | "raystar-rex012864f" => Ok(Product::Rex012864f),
            other => Err(DisplayError::InvalidConfiguration(format!(
                "unknown SSD1325 product '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Product::Rex012864f => write!(f, "Raystar REX012864F"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rex012864f_remap() {
        let remap = Product::Rex012864f.remap();
        assert_eq!(remap.flags, 0x42);
        assert_eq!(remap.start_line, 0);
    }

    #[test]
    fn test_product_tag_lookup() {
        let tag = Product::Rex012864f.tag();
        assert_eq!(Product::from_tag(tag), Ok(Product::Rex012864f));
        assert!(matches!(
            Product::from_tag(0x0002 | MODEL_SSD1325),
            Err(DisplayError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_product_from_str() {
        assert_eq!("REX012864F".parse::<Product>(), Ok(Product::Rex012864f));
        assert!("nhd-2.7".parse::<Product>().is_err());
    }
}
