//! Serial link to the smoke detector
//!
//! [`DetectorLink`] owns the UART, the activity gate and the receive state
//! machine. Transmissions are synchronous. Reception is poll driven:
//! [`DetectorLink::poll_receive`] is called from the main loop or a
//! periodic tick and never waits for bytes that have not arrived yet.

use rauchmelder_hal::Uart;
use rauchmelder_protocol::{
    encode_byte, encode_frame, encode_payload_frame, AlarmState, FrameReceiver, InvalidCharPolicy,
    Step, ACK,
};

use crate::config::LinkConfig;
use crate::gate::PeripheralGate;
use crate::handler::MessageHandler;

/// Result of one receive poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxStatus {
    /// No frame in progress
    Idle,
    /// A frame was acknowledged and dispatched
    FrameComplete,
    /// A frame ended without a message: too short, or abandoned on an invalid character
    ///
    /// Under [`InvalidCharPolicy::Resync`] an invalid STX also starts the next
    /// frame, so [`DetectorLink::is_receiving`] may already be true.
    FrameDropped,
    /// A frame is in progress, call again
    AwaitingMore,
}

/// Link to a single smoke detector
pub struct DetectorLink<S, G> {
    serial: S,
    gate: G,
    receiver: FrameReceiver,
    config: LinkConfig,
}

impl<S: Uart, G: PeripheralGate> DetectorLink<S, G> {
    /// Create a new link
    ///
    /// The link never reconfigures the UART: board code applies
    /// `config.uart` before handing the UART over.
    pub fn new(serial: S, gate: G, config: LinkConfig) -> Self {
        Self {
            serial,
            gate,
            receiver: FrameReceiver::with_policy(config.invalid_char_policy),
            config,
        }
    }

    /// Link configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Returns true while a frame from the detector is being received
    pub fn is_receiving(&self) -> bool {
        self.receiver.is_receiving()
    }

    /// Abandon any frame in progress
    pub fn reset(&mut self) {
        self.receiver.reset();
    }

    /// Sample the activity gate
    pub fn is_peripheral_active(&mut self) -> bool {
        self.gate.is_peripheral_active()
    }

    /// Access the UART
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Access the activity gate
    pub fn gate_mut(&mut self) -> &mut G {
        &mut self.gate
    }

    /// Release the UART and the gate
    pub fn release(self) -> (S, G) {
        (self.serial, self.gate)
    }

    /// Write one byte, bypassing the activity gate
    pub fn send_byte(&mut self, byte: u8) -> Result<(), S::Error> {
        self.serial.write_byte(byte)
    }

    /// Acknowledge a received frame
    pub fn send_ack(&mut self) -> Result<(), S::Error> {
        if !self.gate.is_peripheral_active() {
            #[cfg(feature = "defmt")]
            defmt::trace!("Detector inactive, ACK skipped");
            return Ok(());
        }
        self.send_byte(ACK)
    }

    /// Send a hex string as a complete frame
    ///
    /// The characters are sent verbatim, followed by their checksum.
    /// Nothing is sent while the detector is inactive.
    pub fn send_hex_str(&mut self, hex: &[u8]) -> Result<(), S::Error> {
        if !self.gate.is_peripheral_active() {
            #[cfg(feature = "defmt")]
            defmt::trace!("Detector inactive, frame skipped");
            return Ok(());
        }
        self.send_hex_str_ungated(hex)
    }

    /// Send a hex string as a complete frame without sampling the gate
    pub fn send_hex_str_ungated(&mut self, hex: &[u8]) -> Result<(), S::Error> {
        let serial = &mut self.serial;
        encode_frame(hex, |byte| serial.write_byte(byte))?;

        #[cfg(feature = "defmt")]
        defmt::trace!("TX frame: {=[u8]:a}", hex);
        Ok(())
    }

    /// Send a one byte command
    pub fn send_cmd(&mut self, cmd: u8) -> Result<(), S::Error> {
        if !self.gate.is_peripheral_active() {
            return Ok(());
        }
        self.send_hex_str_ungated(&encode_byte(cmd))
    }

    /// Send a binary payload as a complete frame, hex encoding it on the fly
    ///
    /// Nothing is sent while the detector is inactive.
    pub fn send_payload(&mut self, payload: &[u8]) -> Result<(), S::Error> {
        if !self.gate.is_peripheral_active() {
            #[cfg(feature = "defmt")]
            defmt::trace!("Detector inactive, payload skipped");
            return Ok(());
        }

        let serial = &mut self.serial;
        encode_payload_frame(payload, |byte| serial.write_byte(byte))?;

        #[cfg(feature = "defmt")]
        defmt::trace!("TX payload: {=[u8]:X}", payload);
        Ok(())
    }

    /// Switch the detector's alarm state
    pub fn set_alarm_state(&mut self, state: AlarmState) -> Result<(), S::Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!("Set alarm state: {:?}", state);
        self.send_hex_str(state.command())
    }

    /// Process received bytes
    ///
    /// Consumes bytes until the UART runs dry or a frame ends. A completed
    /// frame is acknowledged and its payload passed to `handler`; bytes
    /// after it stay in the UART for the next poll. A dropped overflow
    /// digit or an invalid character also ends the poll.
    pub fn poll_receive<H: MessageHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<RxStatus, S::Error> {
        if self.serial.bytes_available() == 0 {
            return Ok(RxStatus::Idle);
        }

        while let Some(byte) = self.serial.try_read_byte() {
            match self.receiver.feed(byte) {
                Step::Discarded | Step::Started | Step::Accepted => {}
                Step::Complete { len } => {
                    self.send_ack()?;
                    #[cfg(feature = "defmt")]
                    defmt::debug!("RX message: {=[u8]:X}", self.receiver.payload(len));
                    handler.on_message(self.receiver.payload(len));
                    return Ok(RxStatus::FrameComplete);
                }
                Step::Short => {
                    self.send_ack()?;
                    #[cfg(feature = "defmt")]
                    defmt::debug!("RX frame too short, not dispatched");
                    return Ok(RxStatus::FrameDropped);
                }
                Step::Overflowed => {
                    #[cfg(feature = "defmt")]
                    defmt::trace!("RX overflow, character dropped");
                    return Ok(RxStatus::AwaitingMore);
                }
                Step::Invalid => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("RX invalid character: {=u8:#x}", byte);
                    return Ok(match self.receiver.policy() {
                        InvalidCharPolicy::Hold => RxStatus::AwaitingMore,
                        InvalidCharPolicy::Resync => RxStatus::FrameDropped,
                    });
                }
            }
        }

        if self.receiver.is_receiving() {
            Ok(RxStatus::AwaitingMore)
        } else {
            Ok(RxStatus::Idle)
        }
    }
}
