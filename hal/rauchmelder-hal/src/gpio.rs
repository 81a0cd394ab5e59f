//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins that can be implemented
//! by chip-specific HALs.

/// Internal bias resistor selection for an input pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// Plain input, no bias
    #[default]
    None,
    /// Weak pull-down to ground
    Down,
    /// Weak pull-up to supply
    Up,
}

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
///
/// Implementations should handle the actual hardware register reading
/// for the specific chip.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Input pin whose bias resistor can be switched at runtime
///
/// The presence detect line floats while no detector is plugged in, so it
/// is only meaningful while a pull-down holds it low.
pub trait PullInputPin: InputPin {
    /// Select the bias resistor
    fn set_pull(&mut self, pull: Pull);

    /// Sample the pin with `pull` applied, then return to a plain input
    fn sample_with_pull(&mut self, pull: Pull) -> bool {
        self.set_pull(pull);
        let level = self.is_high();
        self.set_pull(Pull::None);
        level
    }
}

/// Pin that can be used for both input and output
///
/// The support voltage rail is driven as an output but its level is read
/// back before deciding whether to switch it.
pub trait IoPin: OutputPin + InputPin {}

// Blanket implementation for types that implement both traits
impl<T: OutputPin + InputPin> IoPin for T {}
