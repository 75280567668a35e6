//! Host-side sensor drivers, modeled as traits the frontend implements.
//! All callbacks are synchronous and non-blocking; they run on the bus
//! emulation thread, potentially every few cycles.

/// Time source for the serial RTC. `sample()` is called once per
/// date/time command, then `unix_time()` supplies the timestamp to
/// encode. Hosts that want the clock to show wall-local time should
/// return a timestamp pre-biased by their UTC offset.
pub trait WallClockSource: Send {
    fn sample(&mut self) {}
    fn unix_time(&self) -> i64;
}

/// Rotation source shared by the gyroscope and the tilt sensor.
///
/// `has_tilt()` reports whether the tilt axes are meaningful; a
/// gyro-only driver leaves the defaults in place and the tilt sensor
/// will not sample it.
pub trait RotationSource: Send {
    fn sample(&mut self) {}

    fn read_gyro_z(&mut self) -> i32 {
        0
    }

    fn has_tilt(&self) -> bool {
        false
    }

    fn read_tilt_x(&mut self) -> i32 {
        0
    }

    fn read_tilt_y(&mut self) -> i32 {
        0
    }
}

/// Luminance source for the solar sensor. Lower readings are brighter;
/// 0xFF means fully dark.
pub trait LuminanceSource: Send {
    fn sample(&mut self) {}
    fn read_luminance(&mut self) -> u8;
}

/// Rumble actuator. Receives the raw pin level on every dispatch.
pub trait RumblePort: Send {
    fn set_rumble(&mut self, enable: bool);
}

/// Collaborators handed to the controller at construction. Every field
/// is optional; a missing driver degrades the corresponding accessory
/// to its inert default.
#[derive(Default)]
pub struct HostSources {
    pub wall_clock: Option<Box<dyn WallClockSource>>,
    pub rotation: Option<Box<dyn RotationSource>>,
    pub luminance: Option<Box<dyn LuminanceSource>>,
    pub rumble: Option<Box<dyn RumblePort>>,
}
