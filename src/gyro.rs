use crate::gpio::PinBus;
use crate::sensors::RotationSource;

/// Single-axis gyroscope (WarioWare Twisted). The game strobes p0 to
/// latch a sample, then clocks it out one bit at a time on p1, reading
/// the result on p2.
pub struct GyroSensor {
    /// Shift register. Loaded with the biased 12-bit sample, emptied
    /// MSB-of-16 first.
    pub(crate) sample: u16,
    /// p1 level at the previous dispatch, for falling-edge detection.
    pub(crate) edge: bool,
}

impl GyroSensor {
    pub(crate) fn new() -> Self {
        Self {
            sample: 0,
            edge: false,
        }
    }

    pub(crate) fn step(
        &mut self,
        bus: &mut PinBus,
        rotation: Option<&mut (dyn RotationSource + 'static)>,
    ) {
        let Some(rotation) = rotation else {
            return;
        };

        if bus.p0() {
            rotation.sample();
            // Normalize to ~12 bits centered on 0x6C0. Dropping one
            // extra low bit keeps the biased value non-negative.
            self.sample = ((rotation.read_gyro_z() >> 21) + 0x6C0) as u16;
        }

        if self.edge && !bus.p1() {
            // Shift a bit out on the falling edge.
            let bit = self.sample >> 15;
            self.sample <<= 1;
            bus.output(bit << 2);
        }

        self.edge = bus.p1();
    }
}
