use crate::gpio::PinBus;
use crate::sensors::LuminanceSource;

/// Solar sensor (Boktai). The game resets a counter via p1, then
/// pulses p0 and counts the pulses until the sensor's comparator trips
/// on p3: fewer pulses means more light.
pub struct LightSensor {
    pub(crate) counter: u32,
    /// Comparator threshold from the luminance source. 0xFF never
    /// trips, reading as fully dark.
    pub(crate) sample: u8,
    /// Whether the previous dispatch left p0 low.
    pub(crate) edge: bool,
}

impl LightSensor {
    pub(crate) fn new() -> Self {
        Self {
            counter: 0,
            sample: 0xFF,
            edge: false,
        }
    }

    pub(crate) fn step(
        &mut self,
        bus: &mut PinBus,
        luminance: Option<&mut (dyn LuminanceSource + 'static)>,
    ) {
        if bus.p2() {
            // Boktai chip select.
            return;
        }
        if bus.p1() {
            log::trace!(target: "solar", "got reset");
            self.counter = 0;
            self.sample = match luminance {
                Some(luminance) => {
                    luminance.sample();
                    luminance.read_luminance()
                }
                None => 0xFF,
            };
        }
        if bus.p0() && self.edge {
            self.counter += 1;
        }
        self.edge = !bus.p0();

        let send = self.counter >= u32::from(self.sample);
        bus.output(u16::from(send) << 3);
        log::trace!(target: "solar", "output {} with pins {:X}", self.counter, bus.pins());
    }
}
