#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use gba_cart_gpio::gpio::{CartridgeGpio, REG_DATA};
use gba_cart_gpio::sensors::{LuminanceSource, RotationSource, RumblePort, WallClockSource};

/// p0: serial clock.
pub const CLOCK: u16 = 1;
/// p1: serial data.
pub const DATA: u16 = 2;
/// p2: chip select.
pub const SELECT: u16 = 4;

/// Assert the chip-select sequence that moves the RTC to its active
/// transfer state.
pub fn begin_transfer(gpio: &mut CartridgeGpio) {
    gpio.write(REG_DATA, CLOCK);
    gpio.write(REG_DATA, CLOCK | SELECT);
}

/// Clock one byte into the RTC, LSB first. The data direction bit must
/// be set (cartridge driving p1).
pub fn send_byte(gpio: &mut CartridgeGpio, byte: u8) {
    for bit in 0..8 {
        let data = if byte >> bit & 1 != 0 { DATA } else { 0 };
        gpio.write(REG_DATA, SELECT | data);
        gpio.write(REG_DATA, SELECT | CLOCK | data);
    }
}

/// Clock one byte out of the RTC, LSB first. The data direction bit
/// must be clear (chip driving p1) and reads must be enabled.
pub fn read_byte(gpio: &mut CartridgeGpio) -> u8 {
    let mut byte = 0u8;
    for bit in 0..8 {
        gpio.write(REG_DATA, SELECT);
        gpio.write(REG_DATA, SELECT | CLOCK);
        if gpio.read_data() & DATA != 0 {
            byte |= 1 << bit;
        }
    }
    byte
}

/// Drop chip select with the clock held high, returning the RTC to
/// idle.
pub fn end_transfer(gpio: &mut CartridgeGpio) {
    gpio.write(REG_DATA, CLOCK);
}

/// Wall clock pinned to a fixed timestamp.
pub struct FixedClock {
    pub timestamp: i64,
}

impl WallClockSource for FixedClock {
    fn unix_time(&self) -> i64 {
        self.timestamp
    }
}

/// Rotation driver returning fixed raw readings, counting samples.
pub struct FixedRotation {
    pub z: i32,
    pub x: i32,
    pub y: i32,
    pub tilt: bool,
    pub samples: Arc<Mutex<u32>>,
}

impl FixedRotation {
    pub fn new(z: i32, x: i32, y: i32, tilt: bool) -> Self {
        Self {
            z,
            x,
            y,
            tilt,
            samples: Arc::new(Mutex::new(0)),
        }
    }
}

impl RotationSource for FixedRotation {
    fn sample(&mut self) {
        *self.samples.lock().unwrap() += 1;
    }

    fn read_gyro_z(&mut self) -> i32 {
        self.z
    }

    fn has_tilt(&self) -> bool {
        self.tilt
    }

    fn read_tilt_x(&mut self) -> i32 {
        self.x
    }

    fn read_tilt_y(&mut self) -> i32 {
        self.y
    }
}

/// Luminance driver returning a fixed threshold.
pub struct FixedLuminance {
    pub level: u8,
}

impl LuminanceSource for FixedLuminance {
    fn read_luminance(&mut self) -> u8 {
        self.level
    }
}

/// Rumble port that records every forwarded level.
pub struct RecordingRumble {
    pub levels: Arc<Mutex<Vec<bool>>>,
}

impl RecordingRumble {
    pub fn new() -> Self {
        Self {
            levels: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl RumblePort for RecordingRumble {
    fn set_rumble(&mut self, enable: bool) {
        self.levels.lock().unwrap().push(enable);
    }
}
