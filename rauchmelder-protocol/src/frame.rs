//! Frame encoding for the smoke detector protocol.
//!
//! Frame format:
//! - STX (1 byte): 0x02 start marker
//! - PAYLOAD (n bytes): ASCII hex digits `0-9A-F`, two per payload byte
//! - CHECKSUM (2 bytes): sum mod 256 of the PAYLOAD characters, as two hex digits
//! - ETX (1 byte): 0x03 end marker
//!
//! The encoder transmits the hex string it is given verbatim. It does not
//! check that the characters are hex digits; the receiver rejects anything
//! else on its side.

use heapless::Vec;

/// Frame start marker
pub const STX: u8 = 0x02;

/// Frame end marker
pub const ETX: u8 = 0x03;

/// Acknowledgement byte, sent once per received frame
pub const ACK: u8 = 0x06;

/// Digits used for every hex encoding on the wire
pub const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Maximum number of hex characters between STX and ETX the receiver keeps
pub const RECV_MAX_CHARS: usize = 12;

/// Decoded receive buffer size, the last byte being the checksum
pub const RECV_BUF_LEN: usize = RECV_MAX_CHARS >> 1;

/// Maximum hex string length accepted by [`encode_to_vec`]
pub const MAX_TX_HEX_CHARS: usize = 32;

/// Maximum complete frame size produced by [`encode_to_vec`]
pub const MAX_TX_FRAME_SIZE: usize = 1 + MAX_TX_HEX_CHARS + 2 + 1;

/// Errors that can occur while encoding into a fixed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Hex-encode one byte, high nibble first
pub const fn encode_byte(byte: u8) -> [u8; 2] {
    [HEX_DIGITS[(byte >> 4) as usize], HEX_DIGITS[(byte & 0x0F) as usize]]
}

/// Decode one hex digit
///
/// Only uppercase digits are valid on the wire.
pub const fn decode_nibble(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

/// Checksum over the hex characters of a frame
pub fn checksum(hex: &[u8]) -> u8 {
    hex.iter().fold(0u8, |sum, &ch| sum.wrapping_add(ch))
}

/// Check a received frame's checksum byte against its decoded payload
///
/// The sender summed the hex characters, so the payload is re-encoded
/// before summing.
pub fn verify_checksum(payload: &[u8], received: u8) -> bool {
    let sum = payload.iter().fold(0u8, |sum, &byte| {
        let [hi, lo] = encode_byte(byte);
        sum.wrapping_add(hi).wrapping_add(lo)
    });
    sum == received
}

/// Emit a complete frame for `hex` through `emit`, one byte at a time
///
/// Stops at the first error returned by `emit`.
pub fn encode_frame<E>(hex: &[u8], emit: impl FnMut(u8) -> Result<(), E>) -> Result<(), E> {
    encode_chars(hex.iter().copied(), emit)
}

/// Emit a complete frame carrying a binary payload, hex encoding it on the fly
///
/// Equivalent to [`encode_frame`] over the payload's hex string, without
/// any limit on the payload length.
pub fn encode_payload_frame<E>(
    payload: &[u8],
    emit: impl FnMut(u8) -> Result<(), E>,
) -> Result<(), E> {
    encode_chars(payload.iter().flat_map(|&byte| encode_byte(byte)), emit)
}

fn encode_chars<E>(
    chars: impl Iterator<Item = u8>,
    mut emit: impl FnMut(u8) -> Result<(), E>,
) -> Result<(), E> {
    let mut sum = 0u8;

    emit(STX)?;
    for ch in chars {
        sum = sum.wrapping_add(ch);
        emit(ch)?;
    }

    let [hi, lo] = encode_byte(sum);
    emit(hi)?;
    emit(lo)?;

    emit(ETX)
}

/// Encode a frame for `hex` into a byte buffer
///
/// Returns the number of bytes written
pub fn encode(hex: &[u8], buffer: &mut [u8]) -> Result<usize, FrameError> {
    let frame_len = hex.len() + 4; // STX + hex + checksum + ETX
    if buffer.len() < frame_len {
        return Err(FrameError::BufferTooSmall);
    }

    let mut pos = 0;
    encode_frame(hex, |byte| {
        buffer[pos] = byte;
        pos += 1;
        Ok::<(), FrameError>(())
    })?;

    Ok(pos)
}

/// Encode a frame for `hex` into a heapless Vec
pub fn encode_to_vec(hex: &[u8]) -> Result<Vec<u8, MAX_TX_FRAME_SIZE>, FrameError> {
    if hex.len() > MAX_TX_HEX_CHARS {
        return Err(FrameError::PayloadTooLarge);
    }

    let mut frame = Vec::new();
    encode_frame(hex, |byte| {
        frame.push(byte).map_err(|_| FrameError::BufferTooSmall)
    })?;
    Ok(frame)
}

/// Hex-encode a binary payload into the character string a frame carries
pub fn hex_string(payload: &[u8]) -> Result<Vec<u8, MAX_TX_HEX_CHARS>, FrameError> {
    let mut hex = Vec::new();
    for &byte in payload {
        hex.extend_from_slice(&encode_byte(byte))
            .map_err(|_| FrameError::PayloadTooLarge)?;
    }
    Ok(hex)
}
