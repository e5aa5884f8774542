/*
 *  display/graphics.rs
 *
 *  ssd1325 - grayscale OLED driver
 *  (c) 2020-26 Stuart Hunter
 *
 *  Shape, text and picture helpers rendered through embedded-graphics
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

use embedded_graphics::image::{Image, ImageRaw};
use embedded_graphics::mono_font::{ascii::FONT_5X8, MonoFont, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::{BinaryColor, Gray4};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::delay::DelayNs;

use crate::display::error::DisplayError;
use crate::display::interface::BusInterface;
use crate::display::ssd1325::Ssd1325;

use log::warn;

/// Font used until a custom one is installed
pub static DEFAULT_FONT: &MonoFont<'static> = &FONT_5X8;

/// Bits per pixel of a picture handed to [`Ssd1325::draw_picture`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureType {
    OneBit,
    FourBit,
    EightBit,
    SixteenBit,
    TwentyFourBit,
}

impl PictureType {
    /// Bytes needed for one row of `width` pixels, rows padded to a byte
    fn row_bytes(self, width: u32) -> usize {
        let bits = match self {
            PictureType::OneBit => 1,
            PictureType::FourBit => 4,
            PictureType::EightBit => 8,
            PictureType::SixteenBit => 16,
            PictureType::TwentyFourBit => 24,
        };
        (width as usize * bits).div_ceil(8)
    }
}

/// Draw target adapter blowing every pixel up to a `scale` x `scale`
/// block anchored at `origin`
struct Scaled<'a, T> {
    target: &'a mut T,
    origin: Point,
    scale: u32,
}

impl<T: DrawTarget> Dimensions for Scaled<'_, T> {
    fn bounding_box(&self) -> Rectangle {
        self.target.bounding_box()
    }
}

impl<T: DrawTarget> DrawTarget for Scaled<'_, T> {
    type Color = T::Color;
    type Error = T::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            let top_left = self.origin + (p - self.origin) * self.scale as i32;
            self.target
                .fill_solid(&Rectangle::new(top_left, Size::new_equal(self.scale)), color)?;
        }
        Ok(())
    }
}

/// Panel coordinate as an embedded-graphics point; anything past
/// `i32::MAX` is rejected rather than wrapped
fn point(x: u32, y: u32) -> Result<Point, DisplayError> {
    match (i32::try_from(x), i32::try_from(y)) {
        (Ok(px), Ok(py)) => Ok(Point::new(px, py)),
        _ => Err(DisplayError::WrongPosition { x, y }),
    }
}

impl<DI, D> Ssd1325<DI, D>
where
    DI: BusInterface,
    D: DelayNs,
{
    fn font(&self) -> &'static MonoFont<'static> {
        self.custom_font.unwrap_or(DEFAULT_FONT)
    }

    /// Glyph cell of the active font at scale 1, spacing included
    pub fn char_cell(&self) -> Size {
        let font = self.font();
        Size::new(
            font.character_size.width + font.character_spacing,
            font.character_size.height,
        )
    }

    /// Scale applied when a text call passes size 0
    pub fn font_size(&self) -> u8 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: u8) -> Result<(), DisplayError> {
        if size == 0 {
            return Err(DisplayError::WrongValue("font size must be at least 1".to_string()));
        }
        self.font_size = size;
        Ok(())
    }

    /// Render text with `font` instead of the built-in one
    pub fn set_custom_font(&mut self, font: &'static MonoFont<'static>) {
        self.custom_font = Some(font);
    }

    /// Drop a custom font and go back to the built-in one
    pub fn use_default_font(&mut self) {
        self.custom_font = None;
    }

    pub fn draw_line(
        &mut self,
        x_start: u32,
        y_start: u32,
        x_stop: u32,
        y_stop: u32,
        color: Gray4,
    ) -> Result<(), DisplayError> {
        Line::new(point(x_start, y_start)?, point(x_stop, y_stop)?)
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(self)
    }

    /// Horizontal line from `x_start` to `x_start + width`, both ends inclusive
    pub fn draw_hline(&mut self, x_start: u32, y_start: u32, width: u32, color: Gray4) -> Result<(), DisplayError> {
        let x_stop = x_start
            .checked_add(width)
            .ok_or(DisplayError::WrongPosition { x: x_start, y: y_start })?;
        self.draw_line(x_start, y_start, x_stop, y_start, color)
    }

    /// Vertical line from `y_start` to `y_start + height`, both ends inclusive
    pub fn draw_vline(&mut self, x_start: u32, y_start: u32, height: u32, color: Gray4) -> Result<(), DisplayError> {
        let y_stop = y_start
            .checked_add(height)
            .ok_or(DisplayError::WrongPosition { x: x_start, y: y_start })?;
        self.draw_line(x_start, y_start, x_start, y_stop, color)
    }

    pub fn draw_rectangle(
        &mut self,
        x_start: u32,
        y_start: u32,
        width: u32,
        height: u32,
        color: Gray4,
        fill: bool,
    ) -> Result<(), DisplayError> {
        let style = if fill {
            PrimitiveStyle::with_fill(color)
        } else {
            PrimitiveStyle::with_stroke(color, 1)
        };
        let top_left = point(x_start, y_start)?;
        // the far corner has to be representable too
        point(x_start.saturating_add(width), y_start.saturating_add(height))
            .map_err(|_| DisplayError::WrongPosition { x: x_start, y: y_start })?;
        Rectangle::new(top_left, Size::new(width, height))
            .into_styled(style)
            .draw(self)
    }

    /// Draw one glyph with its top-left corner at (x, y)
    ///
    /// `size` scales the glyph, 0 means the current font size. A glyph
    /// that would not fit entirely on the panel is rejected untouched.
    pub fn draw_char(
        &mut self,
        x: u32,
        y: u32,
        c: char,
        color: Gray4,
        background: Gray4,
        size: u8,
    ) -> Result<(), DisplayError> {
        let scale = u32::from(if size == 0 { self.font_size } else { size });
        let cell = self.char_cell();

        if x.saturating_add(cell.width * scale) > self.width()
            || y.saturating_add(cell.height * scale) > self.height()
        {
            warn!("glyph {:?} at ({}, {}) does not fit the panel", c, x, y);
            return Err(DisplayError::WrongPosition { x, y });
        }

        let style = MonoTextStyleBuilder::new()
            .font(self.font())
            .text_color(color)
            .background_color(background)
            .build();

        let mut utf8 = [0u8; 4];
        let origin = point(x, y)?;
        let mut scaled = Scaled { target: self, origin, scale };
        Text::with_baseline(c.encode_utf8(&mut utf8), origin, style, Baseline::Top)
            .draw(&mut scaled)?;
        Ok(())
    }

    /// Draw text up to the first newline, one glyph cell per character
    ///
    /// Stops at the first glyph that fails and returns its error.
    pub fn draw_string(
        &mut self,
        x: u32,
        y: u32,
        text: &str,
        color: Gray4,
        background: Gray4,
        size: u8,
    ) -> Result<(), DisplayError> {
        let scale = u32::from(if size == 0 { self.font_size } else { size });
        let char_width = self.char_cell().width * scale;

        for (i, c) in text.chars().take_while(|&c| c != '\n').enumerate() {
            self.draw_char(x + char_width * i as u32, y, c, color, background, size)?;
        }
        Ok(())
    }

    /// Draw a packed picture with its top-left corner at (x, y)
    ///
    /// One-bit pictures are MSB first with set bits at full brightness;
    /// four-bit pictures use the panel's own nibble order. Rows are padded
    /// to whole bytes.
    pub fn draw_picture(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        picture: &[u8],
        pixel_type: PictureType,
    ) -> Result<(), DisplayError> {
        if !matches!(pixel_type, PictureType::OneBit | PictureType::FourBit) {
            return Err(DisplayError::WrongValue(format!(
                "{:?} pictures are not supported on a 16 level panel",
                pixel_type
            )));
        }
        if x.saturating_add(width) > self.width() || y.saturating_add(height) > self.height() {
            return Err(DisplayError::WrongPosition { x, y });
        }

        let needed = pixel_type.row_bytes(width) * height as usize;
        if picture.len() < needed {
            return Err(DisplayError::WrongValue(format!(
                "picture needs {} bytes, got {}",
                needed,
                picture.len()
            )));
        }
        let data = &picture[..needed];
        let origin = point(x, y)?;

        match pixel_type {
            PictureType::OneBit => {
                let raw = ImageRaw::<BinaryColor>::new(data, width);
                Image::new(&raw, origin).draw(&mut self.color_converted())
            }
            _ => {
                let raw = ImageRaw::<Gray4>::new(data, width);
                Image::new(&raw, origin).draw(self)
            }
        }
    }
}
