use crate::diagnostics::{Diagnostics, LogDiagnostics};
use crate::gyro::GyroSensor;
use crate::light::LightSensor;
use crate::rtc::Rtc;
use crate::sensors::HostSources;
use crate::tilt::TiltSensor;

/// GPIO register offsets within the cartridge ROM space.
pub const REG_DATA: u32 = 0xC4;
pub const REG_DIRECTION: u32 = 0xC6;
pub const REG_CONTROL: u32 = 0xC8;

/// The set of accessory chips wired to the cartridge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceSet(u8);

impl DeviceSet {
    pub const RTC: DeviceSet = DeviceSet(1);
    pub const RUMBLE: DeviceSet = DeviceSet(2);
    pub const LIGHT: DeviceSet = DeviceSet(4);
    pub const GYRO: DeviceSet = DeviceSet(8);
    pub const TILT: DeviceSet = DeviceSet(16);

    pub const fn empty() -> Self {
        DeviceSet(0)
    }

    pub fn contains(self, other: DeviceSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: DeviceSet) {
        self.0 |= other.0;
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn from_bits(bits: u8) -> Self {
        DeviceSet(bits)
    }
}

/// The pin latch shared by every GPIO device: current pin levels, the
/// direction mask, and the externally visible DATA register image.
pub(crate) struct PinBus {
    /// Current levels on p0..p3. Bits covered by `direction` come from
    /// the last external write, the rest from device output.
    pub(crate) pin_state: u16,
    /// 1 = pin driven by the cartridge bus write, 0 = driven by a chip.
    pub(crate) direction: u16,
    /// Whether reads of the DATA register see the pins at all.
    pub(crate) read_write: bool,
    /// What a DATA read currently returns.
    pub(crate) visible: u16,
}

impl PinBus {
    fn new() -> Self {
        Self {
            pin_state: 0,
            direction: 0,
            read_write: false,
            visible: 0,
        }
    }

    pub(crate) fn pins(&self) -> u16 {
        self.pin_state & 0xF
    }

    pub(crate) fn p0(&self) -> bool {
        self.pin_state & 1 != 0
    }

    pub(crate) fn p1(&self) -> bool {
        self.pin_state & 2 != 0
    }

    pub(crate) fn p2(&self) -> bool {
        self.pin_state & 4 != 0
    }

    pub(crate) fn p3(&self) -> bool {
        self.pin_state & 8 != 0
    }

    pub(crate) fn direction_out(&self, pin: u8) -> bool {
        self.direction & 1 << pin != 0
    }

    /// Device-driven pin update. Pins the cartridge drives are held at
    /// their externally written levels; the rest take the device's
    /// bits. Invisible (and dropped) unless reads are enabled.
    pub(crate) fn output(&mut self, pins: u16) {
        if self.read_write {
            let held = self.visible & self.direction;
            self.pin_state = held | (pins & !self.direction & 0xF);
            self.visible = self.pin_state;
        }
    }

    /// Recompute the DATA register image after an external write.
    fn latch_visible(&mut self) {
        if self.read_write {
            self.visible = (self.visible & !self.direction) | self.pin_state;
        } else {
            self.visible = 0;
        }
    }
}

/// The cartridge GPIO block and every accessory chip behind it.
///
/// Register writes come in through [`write`]; the tilt sensor bypasses
/// the pins entirely and is reached through [`tilt_write`] /
/// [`tilt_read`].
///
/// [`write`]: CartridgeGpio::write
/// [`tilt_write`]: CartridgeGpio::tilt_write
/// [`tilt_read`]: CartridgeGpio::tilt_read
pub struct CartridgeGpio {
    pub(crate) bus: PinBus,
    pub(crate) devices: DeviceSet,
    pub(crate) rtc: Rtc,
    pub(crate) gyro: GyroSensor,
    pub(crate) light: LightSensor,
    pub(crate) tilt: TiltSensor,
    sources: HostSources,
    diag: Box<dyn Diagnostics>,
}

impl CartridgeGpio {
    pub fn new() -> Self {
        Self::with_sources(HostSources::default())
    }

    pub fn with_sources(sources: HostSources) -> Self {
        Self {
            bus: PinBus::new(),
            devices: DeviceSet::empty(),
            rtc: Rtc::new(),
            gyro: GyroSensor::new(),
            light: LightSensor::new(),
            tilt: TiltSensor::new(),
            sources,
            diag: Box::new(LogDiagnostics),
        }
    }

    pub fn set_diagnostics(&mut self, diag: Box<dyn Diagnostics>) {
        self.diag = diag;
    }

    pub fn sources_mut(&mut self) -> &mut HostSources {
        &mut self.sources
    }

    /// Back to the power-on state: no devices, all registers clear.
    pub fn clear(&mut self) {
        self.bus = PinBus::new();
        self.devices = DeviceSet::empty();
    }

    pub fn devices(&self) -> DeviceSet {
        self.devices
    }

    pub fn attach_rtc(&mut self) {
        self.devices.insert(DeviceSet::RTC);
        self.rtc = Rtc::new();
    }

    pub fn attach_gyro(&mut self) {
        self.devices.insert(DeviceSet::GYRO);
        self.gyro = GyroSensor::new();
    }

    pub fn attach_rumble(&mut self) {
        self.devices.insert(DeviceSet::RUMBLE);
    }

    pub fn attach_light_sensor(&mut self) {
        self.devices.insert(DeviceSet::LIGHT);
        self.light = LightSensor::new();
    }

    pub fn attach_tilt(&mut self) {
        self.devices.insert(DeviceSet::TILT);
        self.tilt = TiltSensor::new();
    }

    /// Handle a write to one of the GPIO registers. Writes to any other
    /// offset are reported and ignored.
    pub fn write(&mut self, address: u32, value: u16) {
        match address {
            REG_DATA => {
                self.bus.pin_state &= !self.bus.direction;
                self.bus.pin_state |= value;
                self.dispatch();
            }
            REG_DIRECTION => self.bus.direction = value,
            REG_CONTROL => self.bus.read_write = value != 0,
            _ => {
                self.diag
                    .warning(format_args!("invalid GPIO address {address:#05X}"));
                return;
            }
        }
        self.bus.latch_visible();
    }

    /// Current value of the DATA register. Reads as zero while the
    /// read/write enable bit is clear.
    pub fn read_data(&self) -> u16 {
        self.bus.visible
    }

    /// Fan a pin-state change out to every attached chip, in fixed
    /// order. A chip's driven output becomes visible to the chips
    /// dispatched after it, as on the shared physical pins.
    fn dispatch(&mut self) {
        if self.devices.contains(DeviceSet::RTC) {
            self.rtc.step(
                &mut self.bus,
                self.sources.wall_clock.as_deref_mut(),
                &*self.diag,
            );
        }
        if self.devices.contains(DeviceSet::GYRO) {
            self.gyro
                .step(&mut self.bus, self.sources.rotation.as_deref_mut());
        }
        if self.devices.contains(DeviceSet::RUMBLE)
            && let Some(rumble) = self.sources.rumble.as_deref_mut()
        {
            rumble.set_rumble(self.bus.p3());
        }
        if self.devices.contains(DeviceSet::LIGHT) {
            self.light
                .step(&mut self.bus, self.sources.luminance.as_deref_mut());
        }
    }

    /// Handle a byte write to the tilt sensor's address range.
    pub fn tilt_write(&mut self, address: u32, value: u8) {
        self.tilt.write(
            address,
            value,
            self.sources.rotation.as_deref_mut(),
            &*self.diag,
        );
    }

    /// Handle a byte read from the tilt sensor's address range.
    pub fn tilt_read(&self, address: u32) -> u8 {
        self.tilt.read(address, &*self.diag)
    }
}

impl Default for CartridgeGpio {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CaptureDiagnostics, Severity};

    #[test]
    fn external_writes_respect_direction_mask() {
        let mut gpio = CartridgeGpio::new();
        gpio.write(REG_CONTROL, 1);
        gpio.write(REG_DIRECTION, 0b0011);

        gpio.write(REG_DATA, 0b1111);
        // Output-direction bits follow the write; input bits stay low
        // until a device drives them.
        assert_eq!(gpio.read_data() & 0b0011, 0b0011);

        gpio.write(REG_DATA, 0b0001);
        assert_eq!(gpio.read_data() & 0b0011, 0b0001);
    }

    #[test]
    fn data_reads_zero_when_read_write_disabled() {
        let mut gpio = CartridgeGpio::new();
        gpio.write(REG_DIRECTION, 0b1111);
        gpio.write(REG_DATA, 0b1010);
        assert_eq!(gpio.read_data(), 0);

        gpio.write(REG_CONTROL, 1);
        gpio.write(REG_DATA, 0b1010);
        assert_eq!(gpio.read_data(), 0b1010);

        gpio.write(REG_CONTROL, 0);
        gpio.write(REG_DATA, 0b1010);
        assert_eq!(gpio.read_data(), 0);
    }

    #[test]
    fn invalid_address_warns_and_leaves_state_untouched() {
        let mut gpio = CartridgeGpio::new();
        gpio.attach_rtc();
        gpio.write(REG_CONTROL, 1);
        gpio.write(REG_DIRECTION, 0b0111);
        gpio.write(REG_DATA, 0b0101);
        let before = gpio.snapshot();

        let capture = CaptureDiagnostics::new();
        let entries = capture.entries();
        gpio.set_diagnostics(Box::new(capture));
        gpio.write(0xCA, 0b0001);

        assert_eq!(gpio.snapshot(), before);
        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, Severity::ProtocolWarning);
    }

    #[test]
    fn device_set_round_trips_bits() {
        let mut set = DeviceSet::empty();
        set.insert(DeviceSet::RTC);
        set.insert(DeviceSet::TILT);
        assert!(set.contains(DeviceSet::RTC));
        assert!(!set.contains(DeviceSet::GYRO));
        assert_eq!(DeviceSet::from_bits(set.bits()), set);
    }
}
