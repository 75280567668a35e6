use crate::gpio::{CartridgeGpio, DeviceSet};
use crate::rtc::{CommandByte, ControlRegister, TransferStep};
use crate::tilt::TiltHandshake;

/// The accessory state block of a save state. Every field is captured
/// and restored verbatim; restoring never re-triggers a sensor sample.
/// The packed RTC command and control registers are stored in their
/// encoded byte form so the record is bit-exact across versions of the
/// in-memory representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GpioSnapshot {
    pub read_write: bool,
    pub pin_state: u16,
    pub direction: u16,
    pub devices: u8,
    pub rtc: RtcSnapshot,
    pub gyro_sample: u16,
    pub gyro_edge: bool,
    pub tilt_x: u16,
    pub tilt_y: u16,
    pub tilt_handshake: TiltHandshake,
    pub light_counter: u32,
    pub light_sample: u8,
    pub light_edge: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RtcSnapshot {
    pub transfer: TransferStep,
    pub bits_read: u8,
    pub bit_buffer: u8,
    pub command_active: bool,
    pub command: u8,
    pub bytes_remaining: i32,
    pub control: u8,
    pub time: [u8; 7],
}

impl CartridgeGpio {
    pub fn snapshot(&self) -> GpioSnapshot {
        GpioSnapshot {
            read_write: self.bus.read_write,
            pin_state: self.bus.pin_state,
            direction: self.bus.direction,
            devices: self.devices.bits(),
            rtc: RtcSnapshot {
                transfer: self.rtc.transfer,
                bits_read: self.rtc.bits_read,
                bit_buffer: self.rtc.bit_buffer,
                command_active: self.rtc.command_active,
                command: self.rtc.command.encode(),
                bytes_remaining: self.rtc.bytes_remaining,
                control: self.rtc.control.encode(),
                time: self.rtc.time,
            },
            gyro_sample: self.gyro.sample,
            gyro_edge: self.gyro.edge,
            tilt_x: self.tilt.x,
            tilt_y: self.tilt.y,
            tilt_handshake: self.tilt.handshake,
            light_counter: self.light.counter,
            light_sample: self.light.sample,
            light_edge: self.light.edge,
        }
    }

    pub fn restore(&mut self, state: &GpioSnapshot) {
        self.bus.read_write = state.read_write;
        self.bus.pin_state = state.pin_state;
        self.bus.direction = state.direction;
        self.devices = DeviceSet::from_bits(state.devices);

        self.rtc.transfer = state.rtc.transfer;
        self.rtc.bits_read = state.rtc.bits_read;
        self.rtc.bit_buffer = state.rtc.bit_buffer;
        self.rtc.command_active = state.rtc.command_active;
        self.rtc.command = CommandByte::decode(state.rtc.command);
        self.rtc.bytes_remaining = state.rtc.bytes_remaining;
        self.rtc.control = ControlRegister::decode(state.rtc.control);
        self.rtc.time = state.rtc.time;

        self.gyro.sample = state.gyro_sample;
        self.gyro.edge = state.gyro_edge;
        self.tilt.x = state.tilt_x;
        self.tilt.y = state.tilt_y;
        self.tilt.handshake = state.tilt_handshake;
        self.light.counter = state.light_counter;
        self.light.sample = state.light_sample;
        self.light.edge = state.light_edge;

        // The DATA register image is not part of the record; rebuild it
        // from the restored pins so the next read is coherent.
        self.bus.visible = if state.read_write { state.pin_state } else { 0 };
    }
}
