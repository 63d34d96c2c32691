// Spirit Level — SSD1306 OLED Driver
//
// Custom register-level driver over the shared I2C bus, owning the frame
// buffer. Drawing happens against the buffer through embedded-graphics;
// `flush` streams the page-ordered bytes out to the panel.

use spiritlevel::config::*;
use spiritlevel::framebuffer::Framebuffer;

use crate::drivers::SharedBus;

// Control bytes prefixing every I2C transfer
const CTRL_COMMAND: u8 = 0x00;
const CTRL_DATA: u8 = 0x40;

// SSD1306 command set (the subset this panel needs)
const CMD_DISPLAY_OFF: u8 = 0xAE;
const CMD_DISPLAY_ON: u8 = 0xAF;
const CMD_CLOCK_DIV: u8 = 0xD5;
const CMD_MULTIPLEX: u8 = 0xA8;
const CMD_DISPLAY_OFFSET: u8 = 0xD3;
const CMD_START_LINE: u8 = 0x40;
const CMD_CHARGE_PUMP: u8 = 0x8D;
const CMD_MEMORY_MODE: u8 = 0x20;
const CMD_SEG_REMAP: u8 = 0xA1;
const CMD_COM_SCAN_DEC: u8 = 0xC8;
const CMD_COM_PINS: u8 = 0xDA;
const CMD_CONTRAST: u8 = 0x81;
const CMD_PRECHARGE: u8 = 0xD9;
const CMD_VCOM_DESELECT: u8 = 0xDB;
const CMD_RESUME_RAM: u8 = 0xA4;
const CMD_NORMAL_DISPLAY: u8 = 0xA6;
const CMD_COLUMN_ADDR: u8 = 0x21;
const CMD_PAGE_ADDR: u8 = 0x22;

pub struct OledDisplay {
    bus: SharedBus,
    frame: Framebuffer,
}

impl OledDisplay {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            bus,
            frame: Framebuffer::new(),
        }
    }

    /// Run the power-up sequence, blank the RAM, and switch the panel on.
    pub fn init(&mut self) -> anyhow::Result<()> {
        self.command(&[CMD_DISPLAY_OFF])?;
        self.command(&[CMD_CLOCK_DIV, 0x80])?;
        self.command(&[CMD_MULTIPLEX, (SCREEN_HEIGHT - 1) as u8])?;
        self.command(&[CMD_DISPLAY_OFFSET, 0x00])?;
        self.command(&[CMD_START_LINE | 0x00])?;
        self.command(&[CMD_CHARGE_PUMP, 0x14])?; // internal charge pump
        self.command(&[CMD_MEMORY_MODE, 0x00])?; // horizontal addressing
        self.command(&[CMD_SEG_REMAP])?;
        self.command(&[CMD_COM_SCAN_DEC])?;
        self.command(&[CMD_COM_PINS, 0x12])?;
        self.command(&[CMD_CONTRAST, 0xCF])?;
        self.command(&[CMD_PRECHARGE, 0xF1])?;
        self.command(&[CMD_VCOM_DESELECT, 0x40])?;
        self.command(&[CMD_RESUME_RAM])?;
        self.command(&[CMD_NORMAL_DISPLAY])?;
        self.command(&[CMD_DISPLAY_ON])?;

        self.frame.clear_all();
        self.flush()?;

        log::info!("SSD1306 initialised ({}x{})", SCREEN_WIDTH, SCREEN_HEIGHT);
        Ok(())
    }

    /// The buffer the renderer draws into.
    pub fn frame_mut(&mut self) -> &mut Framebuffer {
        &mut self.frame
    }

    /// Push the whole frame buffer to the panel, one data transfer per page.
    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.command(&[CMD_COLUMN_ADDR, 0, (SCREEN_WIDTH - 1) as u8])?;
        self.command(&[CMD_PAGE_ADDR, 0, (SCREEN_HEIGHT / 8 - 1) as u8])?;

        let mut bus = self.bus.lock().unwrap();
        for page in self.frame.as_bytes().chunks(SCREEN_WIDTH as usize) {
            let mut packet = [0u8; SCREEN_WIDTH as usize + 1];
            packet[0] = CTRL_DATA;
            packet[1..].copy_from_slice(page);
            bus.write(I2C_ADDR_OLED, &packet, I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }

    /// Send a command plus arguments, prefixed with the command control byte.
    fn command(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        // Longest command in the set is an opcode plus two arguments.
        let mut packet = [0u8; 4];
        packet[0] = CTRL_COMMAND;
        packet[1..=bytes.len()].copy_from_slice(bytes);

        let mut bus = self.bus.lock().unwrap();
        bus.write(I2C_ADDR_OLED, &packet[..=bytes.len()], I2C_TIMEOUT_TICKS)?;
        Ok(())
    }
}
