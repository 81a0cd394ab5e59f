//! Activity gate
//!
//! The detector can be pulled off its base plate at any time. Before every
//! transmission the presence line is sampled; while nothing is plugged in
//! transmissions are skipped without an error.
//!
//! A detector that has just been plugged in finds its support voltage rail
//! still switched off. The gate switches it on and lets the caller carry
//! on without waiting for the rail to settle.

use rauchmelder_hal::{IoPin, Pull, PullInputPin};

use crate::config::GateConfig;

/// Decides whether the detector may be talked to
pub trait PeripheralGate {
    /// Returns true if the detector is present
    ///
    /// May power the detector as a side effect.
    fn is_peripheral_active(&mut self) -> bool;
}

/// Presence detect and support rail pins of the base plate
pub struct ActivityGate<P, R> {
    presence: P,
    rail: R,
    config: GateConfig,
}

impl<P: PullInputPin, R: IoPin> ActivityGate<P, R> {
    /// Create a new activity gate
    ///
    /// # Arguments
    /// - `presence`: Presence detect input, sampled with a pull-down
    /// - `rail`: Support voltage rail output, read back before switching
    /// - `config`: Pin polarity
    pub fn new(presence: P, rail: R, config: GateConfig) -> Self {
        Self {
            presence,
            rail,
            config,
        }
    }

    /// Returns true if the support voltage rail is switched on
    pub fn is_rail_on(&self) -> bool {
        self.rail.is_high() == self.config.rail_on_high
    }

    /// Release the pins
    pub fn release(self) -> (P, R) {
        (self.presence, self.rail)
    }
}

impl<P: PullInputPin, R: IoPin> PeripheralGate for ActivityGate<P, R> {
    fn is_peripheral_active(&mut self) -> bool {
        let level = self.presence.sample_with_pull(Pull::Down);
        let present = level == self.config.presence_active_high;

        if present && !self.is_rail_on() {
            #[cfg(feature = "defmt")]
            defmt::debug!("Detector present, switching support rail on");
            self.rail.set_state(self.config.rail_on_high);
        }

        present
    }
}
