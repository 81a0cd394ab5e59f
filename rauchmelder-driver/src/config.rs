//! Link configuration
//!
//! Board wiring differs in pin polarity only; the wire protocol itself is
//! fixed. Defaults match the original base plate.

use rauchmelder_hal::UartConfig;
use rauchmelder_protocol::InvalidCharPolicy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pin polarity of the activity gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GateConfig {
    /// Level of the presence input while a detector is plugged in
    pub presence_active_high: bool,
    /// Level of the support voltage pin that switches the rail on
    pub rail_on_high: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            presence_active_high: true,
            rail_on_high: true,
        }
    }
}

/// Complete link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Serial line settings, 9600 8N1 for the detector
    ///
    /// Not applied by the driver; board code sets the UART up from it.
    pub uart: UartConfig,
    /// Activity gate polarity
    pub gate: GateConfig,
    /// Handling of non-hex characters inside a frame
    pub invalid_char_policy: InvalidCharPolicy,
}

impl LinkConfig {
    /// Configuration with the given invalid character policy
    pub fn with_invalid_char_policy(mut self, policy: InvalidCharPolicy) -> Self {
        self.invalid_char_policy = policy;
        self
    }

    /// Configuration with the given gate polarity
    pub fn with_gate(mut self, gate: GateConfig) -> Self {
        self.gate = gate;
        self
    }
}
