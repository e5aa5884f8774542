/*
 *  lib.rs
 *
 *  ssd1325 - grayscale OLED driver
 *  (c) 2020-26 Stuart Hunter
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

//! # SSD1325 grayscale OLED driver
//!
//! 16 gray levels, up to 128x128, driven over an 8-bit 8080-style
//! parallel bus. Drawing goes into a packed RAM copy of the controller
//! memory (two pixels per byte) and reaches the panel on `flush`.
//!
//! Shapes, text and pictures are rendered with `embedded-graphics`; the
//! device is a `DrawTarget<Color = Gray4>`.

pub mod config;
pub mod display;

pub use display::{
    BusInterface, DisplayDriver, DisplayError, ParallelInterface, ParallelPins, PictureType,
    Product, Ssd1325,
};
