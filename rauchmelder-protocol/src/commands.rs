//! Alarm commands sent to the smoke detector

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Alarm state the detector can be switched into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AlarmState {
    /// Sound the alarm (networked alarm from another detector)
    Alarm,
    /// Sound the test alarm
    TestAlarm,
    /// Silence any alarm
    NoAlarm,
}

// Command strings, already hex encoded
const CMD_ALARM: &[u8; 6] = b"030210";
const CMD_TEST_ALARM: &[u8; 6] = b"030280";
const CMD_NO_ALARM: &[u8; 6] = b"030200";

impl AlarmState {
    /// Hex string transmitted to switch the detector into this state
    pub const fn command(self) -> &'static [u8] {
        match self {
            AlarmState::Alarm => CMD_ALARM,
            AlarmState::TestAlarm => CMD_TEST_ALARM,
            AlarmState::NoAlarm => CMD_NO_ALARM,
        }
    }
}
