/*
 *  display/ssd1325.rs
 *
 *  ssd1325 - grayscale OLED driver
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1325 device: power-up sequence, addressing window and flush
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

use embedded_graphics::geometry::Size;
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Gray4;
use embedded_graphics::prelude::*;
use embedded_hal::delay::DelayNs;

use crate::display::command::{Cmd, Product, MAX_CONTRAST};
use crate::display::error::DisplayError;
use crate::display::framebuffer::PackedFrameBuffer;
use crate::display::interface::BusInterface;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

use log::{debug, info};

/// Settle time the controller needs after DISPLAY_ON before it accepts
/// further configuration
pub const POWER_UP_DELAY_MS: u32 = 100;

/// SSD1325 driver owning its bus, its delay source and the packed
/// framebuffer.
///
/// Drawing only touches the RAM copy; nothing reaches the panel until
/// [`Ssd1325::flush`] or [`Ssd1325::flush_part`]. The controller memory is
/// never read back.
pub struct Ssd1325<DI, D> {
    /// Byte transport to the controller
    interface: DI,

    /// Millisecond delay provider
    delay: D,

    /// Panel module, selects the remap configuration
    product: Product,

    /// RAM copy of the controller memory
    framebuffer: PackedFrameBuffer,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Glyph scale used when a draw call passes size 0
    pub(crate) font_size: u8,

    /// Font replacing the built-in one, if any
    pub(crate) custom_font: Option<&'static MonoFont<'static>>,
}

impl<DI, D> Ssd1325<DI, D>
where
    DI: BusInterface,
    D: DelayNs,
{
    /// Create a driver for a `width` x `height` panel
    ///
    /// Both edges must be within 16..=128 and the width must be even.
    /// No bus traffic happens until [`Ssd1325::init`].
    pub fn new(
        interface: DI,
        delay: D,
        product: Product,
        width: u32,
        height: u32,
    ) -> Result<Self, DisplayError> {
        let framebuffer = PackedFrameBuffer::new(width, height)?;

        let capabilities = DisplayCapabilities {
            width,
            height,
            gray_levels: 16,
        };

        Ok(Self {
            interface,
            delay,
            product,
            framebuffer,
            capabilities,
            font_size: 1,
            custom_font: None,
        })
    }

    /// Run the power-up sequence and apply the product remap
    ///
    /// Calling this again reruns the full sequence, including the settle
    /// delay, and wipes the framebuffer.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        info!(
            "Initializing SSD1325 ({}) {}x{}",
            self.product,
            self.width(),
            self.height()
        );

        self.font_size = 1;
        self.custom_font = None;
        self.framebuffer.clear();

        self.interface.init_bus()?;

        self.command(Cmd::DISPLAY_ON)?;
        self.delay.delay_ms(POWER_UP_DELAY_MS);

        self.command(Cmd::DISPLAY_NORMAL)?;

        // segment remap, COM scan direction and start line depend on how
        // the module vendor wired the panel
        let remap = self.product.remap();
        self.command(Cmd::SEGMENT_REMAP)?;
        self.command(remap.flags)?;
        self.command(Cmd::START_LINE)?;
        self.command(remap.start_line)?;

        info!("SSD1325 initialized");
        Ok(())
    }

    fn command(&mut self, value: u8) -> Result<(), DisplayError> {
        Ok(self.interface.send_command(value)?)
    }

    fn check_window(&self, x0: u32, x1: u32, y0: u32, y1: u32) -> Result<(), DisplayError> {
        let (w, h) = (self.width(), self.height());
        if x0 >= w || y0 >= h {
            return Err(DisplayError::WrongPosition { x: x0, y: y0 });
        }
        if x1 >= w || y1 >= h {
            return Err(DisplayError::WrongPosition { x: x1, y: y1 });
        }
        // stop must not precede start on either axis
        if x0 > x1 || y0 > y1 {
            return Err(DisplayError::WrongPosition { x: x0, y: y0 });
        }
        Ok(())
    }

    /// Program the controller's column and row address window
    ///
    /// Columns are byte addresses (two pixels each), rows are pixel rows.
    /// The window only steers where the following data bytes land; the
    /// caller has to stream exactly the bytes it covers.
    pub fn set_buffer_position(
        &mut self,
        x_start: u32,
        x_stop: u32,
        y_start: u32,
        y_stop: u32,
    ) -> Result<(), DisplayError> {
        self.check_window(x_start, x_stop, y_start, y_stop)?;
        debug!(
            "window columns {}..={} rows {}..={}",
            x_start / 2,
            x_stop / 2,
            y_start,
            y_stop
        );

        // every coordinate is < 128 here, so the casts are lossless
        self.command(Cmd::SET_COLUMN_ADDR)?;
        self.command((x_start / 2) as u8)?;
        self.command((x_stop / 2) as u8)?;

        self.command(Cmd::SET_ROW_ADDR)?;
        self.command(y_start as u8)?;
        self.command(y_stop as u8)
    }

    /// Store one pixel in the framebuffer; no bus traffic
    pub fn draw_pixel(&mut self, x: u32, y: u32, color: Gray4) -> Result<(), DisplayError> {
        self.framebuffer.set_pixel(x, y, color.luma())
    }

    /// Push the whole framebuffer to the panel
    pub fn flush(&mut self) -> Result<(), DisplayError> {
        let (w, h) = (self.width(), self.height());
        self.set_buffer_position(0, w - 1, 0, h - 1)?;
        debug!("flushing {} bytes", self.framebuffer.len());
        Ok(self.interface.send_data_slice(self.framebuffer.as_slice())?)
    }

    /// Push the bytes covering a sub-rectangle of the framebuffer
    ///
    /// An invalid window is reported before anything is sent.
    pub fn flush_part(
        &mut self,
        x_start: u32,
        x_stop: u32,
        y_start: u32,
        y_stop: u32,
    ) -> Result<(), DisplayError> {
        self.set_buffer_position(x_start, x_stop, y_start, y_stop)?;
        for byte in self.framebuffer.window(x_start, x_stop, y_start, y_stop) {
            self.interface.send_data(byte)?;
        }
        Ok(())
    }

    /// Zero the framebuffer and flush it
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        info!("Clearing display");
        self.framebuffer.clear();
        self.flush()
    }

    /// Set contrast, 0..=0x7F
    pub fn set_contrast(&mut self, value: u8) -> Result<(), DisplayError> {
        if value > MAX_CONTRAST {
            return Err(DisplayError::WrongValue(format!(
                "contrast {} exceeds 0x{:02X}",
                value, MAX_CONTRAST
            )));
        }
        self.command(Cmd::SET_CONTRAST)?;
        self.command(value)
    }

    /// Light every pixel at GS15 regardless of RAM (test pattern)
    pub fn display_on(&mut self) -> Result<(), DisplayError> {
        self.command(Cmd::DISPLAY_ALL_ON)
    }

    /// Force every pixel to GS0 regardless of RAM (test pattern)
    pub fn display_off(&mut self) -> Result<(), DisplayError> {
        self.command(Cmd::DISPLAY_ALL_OFF)
    }

    /// Show RAM inverted, or return to normal mode
    pub fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.command(if inverted { Cmd::DISPLAY_INVERSE } else { Cmd::DISPLAY_NORMAL })
    }

    /// Wake the panel or put it to sleep; RAM is retained
    pub fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        self.command(if on { Cmd::DISPLAY_ON } else { Cmd::DISPLAY_OFF })
    }

    pub fn product(&self) -> Product { self.product }
    pub fn width(&self) -> u32 { self.framebuffer.width() }
    pub fn height(&self) -> u32 { self.framebuffer.height() }

    /// Packed framebuffer contents
    pub fn buffer(&self) -> &[u8] { self.framebuffer.as_slice() }

    /// Gray level stored for a pixel; `None` outside the panel
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        self.framebuffer.pixel(x, y)
    }

    /// Release the bus and delay
    pub fn release(self) -> (DI, D) {
        (self.interface, self.delay)
    }
}

impl<DI, D> DisplayDriver for Ssd1325<DI, D>
where
    DI: BusInterface,
    D: DelayNs,
{
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        Ssd1325::init(self)
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        // 0..=255 onto the 128 contrast steps
        self.set_contrast(value >> 1)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        Ssd1325::flush(self)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        Ssd1325::clear(self)
    }

    fn write_buffer(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        self.framebuffer.copy_from(buffer)?;
        Ssd1325::flush(self)
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        Ssd1325::set_invert(self, inverted)
    }
}

// Lets any embedded-graphics drawable render into the framebuffer.
// Pixels outside the panel are clipped.
impl<DI, D> DrawTarget for Ssd1325<DI, D>
where
    DI: BusInterface,
    D: DelayNs,
{
    type Color = Gray4;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if p.x < 0 || p.y < 0 {
                continue;
            }
            match self.draw_pixel(p.x as u32, p.y as u32, color) {
                Ok(()) | Err(DisplayError::WrongPosition { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<DI, D> OriginDimensions for Ssd1325<DI, D> {
    fn size(&self) -> Size {
        Size::new(self.framebuffer.width(), self.framebuffer.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::command::Remap;
    use crate::display::interface::mock::{Frame, MockBus, MockDelay};

    fn device(width: u32, height: u32) -> Ssd1325<MockBus, MockDelay> {
        Ssd1325::new(MockBus::default(), MockDelay::default(), Product::Rex012864f, width, height)
            .unwrap()
    }

    fn frames(dev: &Ssd1325<MockBus, MockDelay>) -> &[Frame] {
        &dev.interface.frames
    }

    fn take_frames(dev: &mut Ssd1325<MockBus, MockDelay>) -> Vec<Frame> {
        std::mem::take(&mut dev.interface.frames)
    }

    #[test]
    fn test_new_rejects_bad_geometry() {
        let odd = Ssd1325::new(MockBus::default(), MockDelay::default(), Product::Rex012864f, 17, 16);
        assert!(matches!(odd, Err(DisplayError::InvalidConfiguration(_))));

        let small = Ssd1325::new(MockBus::default(), MockDelay::default(), Product::Rex012864f, 16, 8);
        assert!(matches!(small, Err(DisplayError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_new_is_silent_on_the_bus() {
        let dev = device(128, 64);
        assert!(frames(&dev).is_empty());
        assert_eq!(dev.interface.init_count, 0);
    }

    #[test]
    fn test_init_sequence() {
        let mut dev = device(128, 64);
        dev.init().unwrap();

        assert_eq!(dev.interface.init_count, 1);
        assert_eq!(
            dev.interface.commands(),
            vec![
                Cmd::DISPLAY_ON,
                Cmd::DISPLAY_NORMAL,
                Cmd::SEGMENT_REMAP,
                Remap::ODD_EVEN_COM | Remap::NIBBLE,
                Cmd::START_LINE,
                0,
            ]
        );
        assert!(dev.interface.data().is_empty());
        assert_eq!(dev.delay.total_ns, 100_000_000);
    }

    #[test]
    fn test_init_twice_reruns_sequence() {
        let mut dev = device(64, 32);
        dev.init().unwrap();
        dev.draw_pixel(1, 1, Gray4::new(7)).unwrap();
        dev.font_size = 3;
        dev.init().unwrap();

        assert_eq!(dev.interface.init_count, 2);
        assert_eq!(dev.interface.commands().len(), 12);
        assert_eq!(dev.delay.total_ns, 200_000_000);
        assert!(dev.buffer().iter().all(|&b| b == 0));
        assert_eq!(dev.font_size, 1);
    }

    #[test]
    fn test_set_buffer_position() {
        let mut dev = device(128, 64);
        dev.set_buffer_position(5, 100, 2, 63).unwrap();

        assert_eq!(
            frames(&dev),
            &[
                Frame::Command(Cmd::SET_COLUMN_ADDR),
                Frame::Command(2),
                Frame::Command(50),
                Frame::Command(Cmd::SET_ROW_ADDR),
                Frame::Command(2),
                Frame::Command(63),
            ]
        );
    }

    #[test]
    fn test_set_buffer_position_out_of_range() {
        let mut dev = device(128, 64);
        assert_eq!(
            dev.set_buffer_position(0, 128, 0, 10),
            Err(DisplayError::WrongPosition { x: 128, y: 10 })
        );
        assert_eq!(
            dev.set_buffer_position(0, 10, 64, 10),
            Err(DisplayError::WrongPosition { x: 0, y: 64 })
        );
        assert!(frames(&dev).is_empty());
    }

    #[test]
    fn test_draw_pixel_no_bus_traffic() {
        let mut dev = device(16, 16);
        dev.draw_pixel(3, 0, Gray4::new(0xF)).unwrap();
        dev.draw_pixel(2, 0, Gray4::new(0x1)).unwrap();

        assert_eq!(dev.buffer()[1], 0x1F);
        assert!(frames(&dev).is_empty());
    }

    #[test]
    fn test_flush_streams_whole_buffer() {
        let mut dev = device(16, 16);
        dev.draw_pixel(15, 15, Gray4::new(0xA)).unwrap();
        dev.flush().unwrap();

        assert_eq!(
            dev.interface.commands(),
            vec![Cmd::SET_COLUMN_ADDR, 0, 7, Cmd::SET_ROW_ADDR, 0, 15]
        );
        let data = dev.interface.data();
        assert_eq!(data.len(), 128);
        assert_eq!(data[127], 0x0A);
    }

    #[test]
    fn test_flush_part_single_byte() {
        let mut dev = device(16, 16);
        dev.draw_pixel(1, 0, Gray4::new(0x6)).unwrap();
        dev.flush_part(0, 1, 0, 0).unwrap();

        assert_eq!(
            frames(&dev),
            &[
                Frame::Command(Cmd::SET_COLUMN_ADDR),
                Frame::Command(0),
                Frame::Command(0),
                Frame::Command(Cmd::SET_ROW_ADDR),
                Frame::Command(0),
                Frame::Command(0),
                Frame::Data(0x06),
            ]
        );
    }

    #[test]
    fn test_flush_part_region_order() {
        let mut dev = device(32, 16);
        for y in 0..16 {
            for x in 0..32 {
                dev.draw_pixel(x, y, Gray4::new(((x + y) % 16) as u8)).unwrap();
            }
        }
        dev.flush_part(6, 9, 4, 6).unwrap();

        let expected: Vec<u8> = (4..=6)
            .flat_map(|y| (3..=4).map(move |col| (col, y)))
            .map(|(col, y)| {
                let hi = ((col * 2 + y) % 16) as u8;
                let lo = ((col * 2 + 1 + y) % 16) as u8;
                (hi << 4) | lo
            })
            .collect();
        assert_eq!(dev.interface.data(), expected);
    }

    #[test]
    fn test_flush_part_invalid_window() {
        let mut dev = device(16, 16);
        assert_eq!(
            dev.flush_part(0, 16, 0, 0),
            Err(DisplayError::WrongPosition { x: 16, y: 0 })
        );
        assert!(frames(&dev).is_empty());
    }

    #[test]
    fn test_reversed_window_rejected() {
        let mut dev = device(16, 16);
        assert_eq!(
            dev.flush_part(4, 0, 0, 0),
            Err(DisplayError::WrongPosition { x: 4, y: 0 })
        );
        assert_eq!(
            dev.set_buffer_position(0, 1, 5, 2),
            Err(DisplayError::WrongPosition { x: 0, y: 5 })
        );
        assert!(frames(&dev).is_empty());

        // a single-pixel window is still fine
        dev.flush_part(3, 3, 7, 7).unwrap();
        assert_eq!(dev.interface.data().len(), 1);
    }

    #[test]
    fn test_clear_flushes_zeros() {
        let mut dev = device(16, 16);
        dev.draw_pixel(4, 4, Gray4::new(0xF)).unwrap();
        dev.clear().unwrap();

        let data = dev.interface.data();
        assert_eq!(data.len(), 16 * 16 / 2);
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_contrast() {
        let mut dev = device(16, 16);
        assert!(matches!(dev.set_contrast(0x80), Err(DisplayError::WrongValue(_))));
        assert!(frames(&dev).is_empty());

        dev.set_contrast(0x7F).unwrap();
        assert_eq!(
            take_frames(&mut dev),
            vec![Frame::Command(Cmd::SET_CONTRAST), Frame::Command(0x7F)]
        );
    }

    #[test]
    fn test_test_patterns_and_modes() {
        let mut dev = device(16, 16);
        dev.display_on().unwrap();
        dev.display_off().unwrap();
        dev.set_invert(true).unwrap();
        dev.set_invert(false).unwrap();
        dev.set_power(false).unwrap();
        dev.set_power(true).unwrap();

        assert_eq!(
            dev.interface.commands(),
            vec![
                Cmd::DISPLAY_ALL_ON,
                Cmd::DISPLAY_ALL_OFF,
                Cmd::DISPLAY_INVERSE,
                Cmd::DISPLAY_NORMAL,
                Cmd::DISPLAY_OFF,
                Cmd::DISPLAY_ON,
            ]
        );
    }

    #[test]
    fn test_display_driver_trait() {
        let mut dev = device(16, 16);
        assert_eq!(DisplayDriver::dimensions(&dev), (16, 16));
        assert_eq!(dev.capabilities().gray_levels, 16);

        dev.set_brightness(255).unwrap();
        assert_eq!(
            take_frames(&mut dev),
            vec![Frame::Command(Cmd::SET_CONTRAST), Frame::Command(0x7F)]
        );

        assert_eq!(
            dev.write_buffer(&[0u8; 12]),
            Err(DisplayError::BufferSizeMismatch { expected: 128, actual: 12 })
        );
        assert!(frames(&dev).is_empty());

        dev.write_buffer(&[0x21; 128]).unwrap();
        assert_eq!(dev.pixel(0, 0), Some(2));
        assert_eq!(dev.pixel(1, 0), Some(1));
        assert_eq!(dev.interface.data().len(), 128);
    }

    #[test]
    fn test_draw_target_clips() {
        use embedded_graphics::primitives::{Line, PrimitiveStyle};

        let mut dev = device(16, 16);
        Line::new(Point::new(-4, 0), Point::new(20, 0))
            .into_styled(PrimitiveStyle::with_stroke(Gray4::new(5), 1))
            .draw(&mut dev)
            .unwrap();

        assert!((0..16).all(|x| dev.pixel(x, 0) == Some(5)));
        assert!(frames(&dev).is_empty());
    }
}
