/*
 *  display/error.rs
 *
 *  ssd1325 - grayscale OLED driver
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error type for the SSD1325 driver
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
use std::error::Error;

/// Unified error type for all display operations
#[derive(Debug, Clone)]
pub enum DisplayError {
    /// Coordinate or addressing window outside the panel
    WrongPosition { x: u32, y: u32 },

    /// Value outside the range a command accepts
    WrongValue(String),

    /// Invalid geometry, product tag or bus selection
    InvalidConfiguration(String),

    /// Operation or transport not supported by this driver
    UnsupportedOperation,

    /// Framebuffer size mismatch
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Host GPIO setup error
    GpioError(String),

    /// A bus line could not be driven while framing a byte
    InterfaceError(display_interface::DisplayError),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::WrongPosition { x, y } =>
                write!(f, "Position ({}, {}) is outside the display", x, y),
            DisplayError::WrongValue(msg) =>
                write!(f, "Wrong value: {}", msg),
            DisplayError::InvalidConfiguration(msg) =>
                write!(f, "Invalid configuration: {}", msg),
            DisplayError::UnsupportedOperation =>
                write!(f, "Operation not supported by this display"),
            DisplayError::BufferSizeMismatch { expected, actual } =>
                write!(f, "Buffer size mismatch: expected {} bytes, got {}", expected, actual),
            DisplayError::GpioError(msg) =>
                write!(f, "GPIO error: {}", msg),
            DisplayError::InterfaceError(err) =>
                write!(f, "Display interface error: {:?}", err),
        }
    }
}

// display_interface::DisplayError has no PartialEq, bus errors compare by variant
impl PartialEq for DisplayError {
    fn eq(&self, other: &Self) -> bool {
        use DisplayError::*;
        match (self, other) {
            (WrongPosition { x: ax, y: ay }, WrongPosition { x: bx, y: by }) => ax == bx && ay == by,
            (WrongValue(a), WrongValue(b)) => a == b,
            (InvalidConfiguration(a), InvalidConfiguration(b)) => a == b,
            (UnsupportedOperation, UnsupportedOperation) => true,
            (
                BufferSizeMismatch { expected: ae, actual: aa },
                BufferSizeMismatch { expected: be, actual: ba },
            ) => ae == be && aa == ba,
            (GpioError(a), GpioError(b)) => a == b,
            (InterfaceError(a), InterfaceError(b)) => {
                std::mem::discriminant(a) == std::mem::discriminant(b)
            }
            _ => false,
        }
    }
}

impl Error for DisplayError {
    // display_interface::DisplayError doesn't implement std::error::Error
    // so we can't provide it as a source
}

impl From<display_interface::DisplayError> for DisplayError {
    fn from(err: display_interface::DisplayError) -> Self {
        DisplayError::InterfaceError(err)
    }
}

impl From<linux_embedded_hal::sysfs_gpio::Error> for DisplayError {
    fn from(err: linux_embedded_hal::sysfs_gpio::Error) -> Self {
        DisplayError::GpioError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_position_message() {
        let err = DisplayError::WrongPosition { x: 200, y: 3 };
        assert_eq!(err.to_string(), "Position (200, 3) is outside the display");
    }

    #[test]
    fn test_interface_error_conversion() {
        let err: DisplayError = display_interface::DisplayError::DCError.into();
        assert_eq!(err, DisplayError::InterfaceError(display_interface::DisplayError::DCError));
        assert_ne!(err, DisplayError::InterfaceError(display_interface::DisplayError::CSError));
        assert_ne!(err, DisplayError::UnsupportedOperation);
    }
}
