//! Emulation of the GPIO-attached accessory chips found in Game Boy
//! Advance cartridges: the S-3511 serial real-time clock, the WarioWare
//! Twisted gyroscope, the Drill Dozer rumble motor, the Boktai solar
//! sensor, and the Yoshi Topsy-Turvy tilt sensor.
//!
//! The surrounding bus emulator routes cartridge register writes into
//! [`gpio::CartridgeGpio`] and wires up host-side sensor drivers through
//! the traits in [`sensors`].

/// Injected diagnostics sink for protocol warnings and game-logic errors.
pub mod diagnostics;

/// GPIO pin register, direction mask, and device dispatch.
pub mod gpio;

/// Gyroscope shift register.
pub mod gyro;

/// Solar sensor counter.
pub mod light;

/// Serial real-time clock state machine.
pub mod rtc;

/// Host collaborator traits (wall clock, rotation, luminance, rumble).
pub mod sensors;

/// Save-state capture and restore.
pub mod snapshot;

/// Memory-mapped tilt sensor.
pub mod tilt;
