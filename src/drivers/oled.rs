//! SSD1306 status display driver (128×64, I²C).
//!
//! Renders the status lines the control loop supplies each cycle.  The
//! driver owns layout and flushing; the loop owns the text.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: `ssd1306` + `embedded-graphics` over the HAL I²C driver.
//! On host/test: keeps the last rendered lines in memory for assertions.

#[cfg(target_os = "espidf")]
use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle, MonoTextStyleBuilder},
    pixelcolor::BinaryColor,
    prelude::*,
    text::Text,
};
#[cfg(target_os = "espidf")]
use esp_idf_hal::i2c::I2cDriver;
#[cfg(target_os = "espidf")]
use ssd1306::{
    mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306,
};

/// Display driver, generic over the I²C implementation so callers pass
/// in their HAL's I²C peripheral.
#[cfg(target_os = "espidf")]
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Initialise the SSD1306 over any `embedded-hal` I²C bus and clear it.
#[cfg(target_os = "espidf")]
fn init<I2C>(i2c: I2C) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    let _ = display.init();
    display.clear_buffer();
    let _ = display.flush();
    display
}

/// Vertical pitch between status lines (pixels).
#[cfg(target_os = "espidf")]
const LINE_PITCH: i32 = 15;

#[cfg(target_os = "espidf")]
fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

#[cfg(target_os = "espidf")]
pub struct OledDisplay {
    inner: Display<I2cDriver<'static>>,
}

#[cfg(target_os = "espidf")]
impl OledDisplay {
    /// Bring up the display on the board's I²C bus.
    pub fn new(i2c: I2cDriver<'static>) -> Self {
        Self { inner: init(i2c) }
    }

    /// Redraw the full status screen.  Draw errors are swallowed — a
    /// glitched frame is repainted on the next cycle anyway.
    pub fn render(&mut self, lines: &[String]) {
        self.inner.clear_buffer();
        let style = text_style();
        for (row, line) in lines.iter().take(4).enumerate() {
            let y = 10 + row as i32 * LINE_PITCH;
            let _ = Text::new(line, Point::new(0, y), style).draw(&mut self.inner);
        }
        let _ = self.inner.flush();
    }
}

#[cfg(not(target_os = "espidf"))]
pub struct OledDisplay {
    last_lines: Vec<String>,
}

#[cfg(not(target_os = "espidf"))]
impl OledDisplay {
    pub fn new() -> Self {
        Self {
            last_lines: Vec::new(),
        }
    }

    pub fn render(&mut self, lines: &[String]) {
        self.last_lines = lines.to_vec();
    }

    /// Last rendered frame (host only, for tests).
    pub fn last_lines(&self) -> &[String] {
        &self.last_lines
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for OledDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn sim_keeps_last_frame() {
        let mut oled = OledDisplay::new();
        oled.render(&["Temp: 24.5C".into(), "Modo manual".into()]);
        assert_eq!(oled.last_lines().len(), 2);
        assert_eq!(oled.last_lines()[0], "Temp: 24.5C");
    }
}
