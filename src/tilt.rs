use crate::diagnostics::Diagnostics;
use crate::sensors::RotationSource;

/// Write 0x55 here to arm a sample.
pub const ARM_ADDRESS: u32 = 0x8000;
/// Write 0xAA here while armed to latch a sample.
pub const COMMIT_ADDRESS: u32 = 0x8100;
/// Low byte of the X axis.
pub const X_LOW_ADDRESS: u32 = 0x8200;
/// High nibble of the X axis, with bit 7 always set.
pub const X_HIGH_ADDRESS: u32 = 0x8300;
/// Low byte of the Y axis.
pub const Y_LOW_ADDRESS: u32 = 0x8400;
/// High nibble of the Y axis.
pub const Y_HIGH_ADDRESS: u32 = 0x8500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TiltHandshake {
    Idle,
    Armed,
}

/// Two-axis tilt sensor (Yoshi Topsy-Turvy). Not wired to the GPIO
/// pins: the game talks to it through plain byte accesses in the
/// 0x8000-0x8500 range of the SRAM space, using an arm/commit
/// handshake to trigger each sample.
pub struct TiltSensor {
    pub(crate) handshake: TiltHandshake,
    pub(crate) x: u16,
    pub(crate) y: u16,
}

impl TiltSensor {
    pub(crate) fn new() -> Self {
        Self {
            handshake: TiltHandshake::Idle,
            x: 0xFFF,
            y: 0xFFF,
        }
    }

    pub(crate) fn write(
        &mut self,
        address: u32,
        value: u8,
        rotation: Option<&mut (dyn RotationSource + 'static)>,
        diag: &dyn Diagnostics,
    ) {
        match address {
            ARM_ADDRESS => {
                if value == 0x55 {
                    self.handshake = TiltHandshake::Armed;
                } else {
                    diag.game_error(format_args!(
                        "tilt sensor wrote wrong byte to {address:#06X}: {value:02X}"
                    ));
                }
            }
            COMMIT_ADDRESS => {
                if value == 0xAA && self.handshake == TiltHandshake::Armed {
                    // Disarm even if the host can't supply tilt data.
                    self.handshake = TiltHandshake::Idle;
                    let Some(rotation) = rotation else {
                        return;
                    };
                    if !rotation.has_tilt() {
                        return;
                    }
                    rotation.sample();
                    // Normalize to ~12 bits centered on 0x3A0, dropping
                    // one extra low bit so the bias can't go negative.
                    self.x = ((rotation.read_tilt_x() >> 21) + 0x3A0) as u16;
                    self.y = ((rotation.read_tilt_y() >> 21) + 0x3A0) as u16;
                } else {
                    diag.game_error(format_args!(
                        "tilt sensor wrote wrong byte to {address:#06X}: {value:02X}"
                    ));
                }
            }
            _ => diag.game_error(format_args!(
                "invalid tilt sensor write to {address:#06X}: {value:02X}"
            )),
        }
    }

    pub(crate) fn read(&self, address: u32, diag: &dyn Diagnostics) -> u8 {
        match address {
            X_LOW_ADDRESS => (self.x & 0xFF) as u8,
            X_HIGH_ADDRESS => (self.x >> 8 & 0xF) as u8 | 0x80,
            Y_LOW_ADDRESS => (self.y & 0xFF) as u8,
            Y_HIGH_ADDRESS => (self.y >> 8 & 0xF) as u8,
            _ => {
                diag.game_error(format_args!("invalid tilt sensor read from {address:#06X}"));
                0xFF
            }
        }
    }
}
