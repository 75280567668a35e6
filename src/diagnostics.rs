use std::fmt;
use std::sync::{Arc, Mutex};

/// Severity classes for accessory-chip faults. None of them abort
/// emulation; the driving input is untrusted game software.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Malformed traffic the chip ignores (bad command byte, bad GPIO
    /// register address).
    ProtocolWarning,
    /// The game drove the protocol incorrectly (writing while the chip
    /// is in output mode, tilt handshake mismatch, invalid tilt access).
    GameError,
    /// A command the emulation does not implement (Force IRQ).
    Unimplemented,
}

/// Sink for accessory diagnostics. Injected into [`CartridgeGpio`] so
/// the core has no global logger dependency and tests can assert on
/// emitted diagnostics.
///
/// [`CartridgeGpio`]: crate::gpio::CartridgeGpio
pub trait Diagnostics: Send {
    fn warning(&self, args: fmt::Arguments);
    fn game_error(&self, args: fmt::Arguments);
    fn unimplemented(&self, args: fmt::Arguments);
}

/// Default sink: forwards to the `log` crate.
#[derive(Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warning(&self, args: fmt::Arguments) {
        log::warn!(target: "gpio", "{args}");
    }

    fn game_error(&self, args: fmt::Arguments) {
        // Game bugs are routine and can fire at bus-cycle rates.
        log::debug!(target: "gpio", "{args}");
    }

    fn unimplemented(&self, args: fmt::Arguments) {
        log::info!(target: "gpio", "{args}");
    }
}

/// A sink that records every diagnostic, for scenario tests and
/// frontends that surface game bugs in a debug console.
#[derive(Default)]
pub struct CaptureDiagnostics {
    entries: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl CaptureDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that stays valid after the sink is boxed and handed to the
    /// controller.
    pub fn entries(&self) -> Arc<Mutex<Vec<(Severity, String)>>> {
        Arc::clone(&self.entries)
    }

    fn push(&self, severity: Severity, args: fmt::Arguments) {
        self.entries
            .lock()
            .expect("diagnostics lock poisoned")
            .push((severity, args.to_string()));
    }
}

impl Diagnostics for CaptureDiagnostics {
    fn warning(&self, args: fmt::Arguments) {
        self.push(Severity::ProtocolWarning, args);
    }

    fn game_error(&self, args: fmt::Arguments) {
        self.push(Severity::GameError, args);
    }

    fn unimplemented(&self, args: fmt::Arguments) {
        self.push(Severity::Unimplemented, args);
    }
}
