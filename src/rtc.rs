use std::time::{SystemTime, UNIX_EPOCH};

use crate::diagnostics::Diagnostics;
use crate::gpio::PinBus;
use crate::sensors::WallClockSource;

/// Fixed low-nibble pattern every valid command byte carries. Bits
/// arrive LSB-first, so the nibble sits in bits 0-3 of the accumulated
/// byte.
pub const COMMAND_MAGIC: u8 = 0x6;

/// Command slots of the S-3511, in register order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Command {
    #[default]
    Reset = 0,
    Reserved1 = 1,
    DateTime = 2,
    ForceIrq = 3,
    Control = 4,
    Reserved5 = 5,
    Time = 6,
    Reserved7 = 7,
}

impl Command {
    fn from_bits(bits: u8) -> Self {
        match bits & 7 {
            0 => Command::Reset,
            1 => Command::Reserved1,
            2 => Command::DateTime,
            3 => Command::ForceIrq,
            4 => Command::Control,
            5 => Command::Reserved5,
            6 => Command::Time,
            _ => Command::Reserved7,
        }
    }

    /// Payload length in bytes. The reserved slots transfer nothing.
    fn payload_len(self) -> i32 {
        match self {
            Command::DateTime => 7,
            Command::Control => 1,
            Command::Time => 3,
            _ => 0,
        }
    }
}

/// The command byte, unpacked. Bits 0-3 magic, bits 4-6 command index,
/// bit 7 read/write flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommandByte {
    pub magic: u8,
    pub index: Command,
    pub reading: bool,
}

impl CommandByte {
    pub fn decode(byte: u8) -> Self {
        Self {
            magic: byte & 0xF,
            index: Command::from_bits(byte >> 4),
            reading: byte & 0x80 != 0,
        }
    }

    pub fn encode(self) -> u8 {
        (self.magic & 0xF) | (self.index as u8) << 4 | (self.reading as u8) << 7
    }

    pub fn magic_valid(self) -> bool {
        self.magic == COMMAND_MAGIC
    }
}

/// The control register. Only the 24-hour-mode flag matters to the
/// emulation; the remaining bits are held verbatim so read-back and
/// save states stay bit-exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlRegister {
    pub hour24: bool,
    pub reserved: u8,
}

const HOUR24_BIT: u8 = 0x40;

impl ControlRegister {
    pub fn decode(byte: u8) -> Self {
        Self {
            hour24: byte & HOUR24_BIT != 0,
            reserved: byte & !HOUR24_BIT,
        }
    }

    pub fn encode(self) -> u8 {
        let hour24 = if self.hour24 { HOUR24_BIT } else { 0 };
        self.reserved & !HOUR24_BIT | hour24
    }
}

/// Named indices into the time register block, in transfer order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeRegister {
    Year = 0,
    Month = 1,
    Day = 2,
    Weekday = 3,
    Hour = 4,
    Minute = 5,
    Second = 6,
}

/// Where the serial handshake currently stands.
///
/// The transfer sequence on pins p0 (serial clock), p1 (data), p2
/// (chip select):
///
/// ```text
///  P: 0 | 1 | 2
///  == Initiate
///  > HI | - | LO
///  > HI | - | HI
///  == Transfer bit (x8)
///  > LO | x | HI
///  > HI | - | HI
///  < ?? | x | ??
///  == Terminate
///  >  - | - | LO
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferStep {
    Idle,
    Initiating,
    Active,
}

/// Serial real-time clock (S-3511) behind the cartridge GPIO pins.
pub struct Rtc {
    pub(crate) transfer: TransferStep,
    pub(crate) bits_read: u8,
    pub(crate) bit_buffer: u8,
    pub(crate) command_active: bool,
    pub(crate) command: CommandByte,
    pub(crate) bytes_remaining: i32,
    pub(crate) control: ControlRegister,
    pub(crate) time: [u8; 7],
}

impl Rtc {
    pub(crate) fn new() -> Self {
        Self {
            transfer: TransferStep::Idle,
            bits_read: 0,
            bit_buffer: 0,
            command_active: false,
            command: CommandByte::default(),
            bytes_remaining: 0,
            // 24-hour mode out of the box.
            control: ControlRegister::decode(0x40),
            time: [0; 7],
        }
    }

    pub(crate) fn step(
        &mut self,
        bus: &mut PinBus,
        clock: Option<&mut (dyn WallClockSource + 'static)>,
        diag: &dyn Diagnostics,
    ) {
        match self.transfer {
            TransferStep::Idle => {
                if bus.pins() & 0b101 == 0b001 {
                    self.transfer = TransferStep::Initiating;
                }
            }
            TransferStep::Initiating => {
                if bus.pins() & 0b101 == 0b101 {
                    self.transfer = TransferStep::Active;
                }
            }
            TransferStep::Active => {
                if !bus.p0() {
                    // Clock low: sample the data line into the shift
                    // accumulator.
                    self.bit_buffer &= !(1 << self.bits_read);
                    self.bit_buffer |= (bus.p1() as u8) << self.bits_read;
                } else if bus.p2() {
                    if bus.direction_out(1) {
                        // Cartridge drives the data line.
                        if self.command.reading {
                            diag.game_error(format_args!(
                                "attempting to write to RTC while in read mode"
                            ));
                        }
                        self.bits_read += 1;
                        if self.bits_read == 8 {
                            self.process_byte(clock, diag);
                        }
                    } else {
                        // Chip drives the data line.
                        bus.output(0b101 | self.next_output_bit() << 1);
                        self.bits_read += 1;
                        if self.bits_read == 8 {
                            self.bytes_remaining -= 1;
                            if self.bytes_remaining <= 0 {
                                self.command_active = false;
                                self.command.reading = false;
                            }
                            self.bits_read = 0;
                        }
                    }
                } else {
                    // Select dropped mid-transfer: abort.
                    self.bits_read = 0;
                    self.bytes_remaining = 0;
                    self.command_active = false;
                    self.command.reading = false;
                    self.transfer = TransferStep::Idle;
                }
            }
        }
    }

    fn process_byte(
        &mut self,
        clock: Option<&mut (dyn WallClockSource + 'static)>,
        diag: &dyn Diagnostics,
    ) {
        self.bytes_remaining -= 1;
        if !self.command_active {
            let command = CommandByte::decode(self.bit_buffer);
            if command.magic_valid() {
                self.command = command;
                self.bytes_remaining = command.index.payload_len();
                self.command_active = self.bytes_remaining > 0;
                match command.index {
                    Command::Reset => self.control = ControlRegister::decode(0),
                    // Both date/time commands refresh all seven fields,
                    // even though Time only transmits the last three.
                    Command::DateTime | Command::Time => self.resample_clock(clock),
                    Command::ForceIrq | Command::Control => {}
                    Command::Reserved1 | Command::Reserved5 | Command::Reserved7 => {}
                }
            } else {
                diag.warning(format_args!(
                    "invalid RTC command byte: {:02X}",
                    self.bit_buffer
                ));
            }
        } else {
            match self.command.index {
                Command::Control => self.control = ControlRegister::decode(self.bit_buffer),
                Command::ForceIrq => {
                    diag.unimplemented(format_args!("unimplemented RTC command: force IRQ"));
                }
                _ => {}
            }
        }

        self.bit_buffer = 0;
        self.bits_read = 0;
        if self.bytes_remaining == 0 {
            self.command_active = false;
            self.command.reading = false;
        }
    }

    fn next_output_bit(&self) -> u16 {
        let byte = match self.command.index {
            Command::Control => self.control.encode(),
            Command::DateTime | Command::Time => {
                // Registers go out in array order as bytes_remaining
                // counts down; Time starts at the hour field.
                let index = 7i32.saturating_sub(self.bytes_remaining).max(0) as usize;
                self.time.get(index).copied().unwrap_or(0)
            }
            _ => 0,
        };
        u16::from(byte >> self.bits_read & 1)
    }

    fn resample_clock(&mut self, clock: Option<&mut (dyn WallClockSource + 'static)>) {
        let timestamp = match clock {
            Some(clock) => {
                clock.sample();
                clock.unix_time()
            }
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0),
        };
        let date = CalendarTime::from_unix(timestamp);

        self.time[TimeRegister::Year as usize] = bcd((date.year - 2000).rem_euclid(100) as u8);
        self.time[TimeRegister::Month as usize] = bcd(date.month);
        self.time[TimeRegister::Day as usize] = bcd(date.day);
        self.time[TimeRegister::Weekday as usize] = bcd(date.weekday);
        let hour = if self.control.hour24 {
            date.hour
        } else {
            date.hour % 12
        };
        self.time[TimeRegister::Hour as usize] = bcd(hour);
        self.time[TimeRegister::Minute as usize] = bcd(date.minute);
        self.time[TimeRegister::Second as usize] = bcd(date.second);
    }
}

/// Packed BCD for 0..=99: one decimal digit per nibble.
pub fn bcd(value: u8) -> u8 {
    (value / 10 % 10) << 4 | value % 10
}

/// A Unix timestamp broken into calendar fields. Weekday 0 is Sunday,
/// matching `tm_wday`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CalendarTime {
    year: i32,
    month: u8,
    day: u8,
    weekday: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl CalendarTime {
    fn from_unix(timestamp: i64) -> Self {
        let days = timestamp.div_euclid(86_400);
        let secs = timestamp.rem_euclid(86_400);
        // The epoch fell on a Thursday.
        let weekday = (days + 4).rem_euclid(7) as u8;
        let (year, month, day) = civil_from_days(days);
        Self {
            year,
            month,
            day,
            weekday,
            hour: (secs / 3_600) as u8,
            minute: (secs / 60 % 60) as u8,
            second: (secs % 60) as u8,
        }
    }
}

/// Days-since-epoch to proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year as i32, month, day)
}
