//! Receive state machine for frames coming from the smoke detector.
//!
//! Bytes are fed one at a time. Between STX and ETX every character is a
//! hex digit; pairs of digits are decoded straight into a six byte buffer,
//! the last decoded byte being the checksum.
//!
//! Anomalies never produce an error. Noise before STX is dropped, excess
//! characters past the buffer are dropped while ETX is still looked for,
//! and frames shorter than two decoded bytes are ended without a message.

use crate::frame::{decode_nibble, ETX, RECV_BUF_LEN, RECV_MAX_CHARS, STX};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to do with a non-hex character in the middle of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InvalidCharPolicy {
    /// Drop the character and keep the frame in progress.
    ///
    /// Only a later ETX ends the frame.
    #[default]
    Hold,
    /// Abandon the frame and search for the next STX.
    ///
    /// A STX in place of the invalid character starts a new frame at once.
    Resync,
}

/// Outcome of feeding one byte to the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Byte dropped while searching for STX
    Discarded,
    /// STX seen, decoding started
    Started,
    /// Hex digit stored
    Accepted,
    /// Hex digit dropped, the buffer is full
    Overflowed,
    /// Character is not a hex digit
    Invalid,
    /// ETX seen with at least one payload byte before the checksum
    Complete {
        /// Payload length, checksum byte excluded
        len: usize,
    },
    /// ETX seen, but too few characters for a message
    Short,
}

impl Step {
    /// Returns true if a poll loop must stop after this byte
    pub fn ends_poll(&self) -> bool {
        matches!(
            self,
            Step::Overflowed | Step::Invalid | Step::Complete { .. } | Step::Short
        )
    }
}

/// Receive cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Cursor {
    /// Waiting for STX
    Searching,
    /// Number of hex digits stored so far, always below `RECV_MAX_CHARS`
    Decoding(u8),
    /// `RECV_MAX_CHARS` digits stored, further digits are dropped
    Full,
}

impl Cursor {
    /// Number of buffer bytes touched so far
    fn decoded_len(self) -> usize {
        match self {
            Cursor::Searching => 0,
            Cursor::Decoding(chars) => (chars >> 1) as usize,
            Cursor::Full => RECV_BUF_LEN,
        }
    }
}

/// Incremental frame decoder
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameReceiver {
    cursor: Cursor,
    buffer: [u8; RECV_BUF_LEN],
    policy: InvalidCharPolicy,
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReceiver {
    /// Create a receiver that holds frames across invalid characters
    pub const fn new() -> Self {
        Self::with_policy(InvalidCharPolicy::Hold)
    }

    /// Create a receiver with an explicit invalid character policy
    pub const fn with_policy(policy: InvalidCharPolicy) -> Self {
        Self {
            cursor: Cursor::Searching,
            buffer: [0; RECV_BUF_LEN],
            policy,
        }
    }

    /// Invalid character policy in use
    pub fn policy(&self) -> InvalidCharPolicy {
        self.policy
    }

    /// Abandon any frame in progress and search for STX
    pub fn reset(&mut self) {
        self.cursor = Cursor::Searching;
    }

    /// Returns true while a frame is in progress
    pub fn is_receiving(&self) -> bool {
        self.cursor != Cursor::Searching
    }

    /// Returns true once the buffer is full and digits are being dropped
    pub fn is_overflowed(&self) -> bool {
        self.cursor == Cursor::Full
    }

    /// Number of buffer bytes the current frame has touched
    pub fn decoded_len(&self) -> usize {
        self.cursor.decoded_len()
    }

    /// Raw decode buffer, including stale bytes of earlier frames
    pub fn buffer(&self) -> &[u8; RECV_BUF_LEN] {
        &self.buffer
    }

    /// Payload of the frame that ended with [`Step::Complete`]
    ///
    /// Valid until the next STX starts overwriting the buffer.
    pub fn payload(&self, len: usize) -> &[u8] {
        &self.buffer[..len.min(RECV_BUF_LEN)]
    }

    /// Checksum byte following a payload of `len` bytes
    pub fn checksum_byte(&self, len: usize) -> Option<u8> {
        self.buffer.get(len).copied()
    }

    /// Feed a single byte to the receiver
    pub fn feed(&mut self, byte: u8) -> Step {
        let chars = match self.cursor {
            Cursor::Searching => {
                if byte == STX {
                    self.cursor = Cursor::Decoding(0);
                    return Step::Started;
                }
                return Step::Discarded;
            }
            Cursor::Decoding(chars) => chars,
            Cursor::Full => {
                if byte == ETX {
                    return self.finish();
                }
                return Step::Overflowed;
            }
        };

        if byte == ETX {
            return self.finish();
        }

        let Some(nibble) = decode_nibble(byte) else {
            if self.policy == InvalidCharPolicy::Resync {
                self.cursor = if byte == STX {
                    Cursor::Decoding(0)
                } else {
                    Cursor::Searching
                };
            }
            return Step::Invalid;
        };

        let Some(slot) = self.buffer.get_mut((chars >> 1) as usize) else {
            self.cursor = Cursor::Full;
            return Step::Overflowed;
        };

        if chars & 1 == 1 {
            *slot = (*slot << 4) | nibble;
        } else {
            *slot = nibble;
        }

        let next = chars + 1;
        self.cursor = if next as usize >= RECV_MAX_CHARS {
            Cursor::Full
        } else {
            Cursor::Decoding(next)
        };
        Step::Accepted
    }

    /// Feed multiple bytes, stopping where a poll loop would stop
    ///
    /// Returns the last step and the number of bytes consumed. Bytes after
    /// a frame end, an overflowed digit, or an invalid character are left
    /// for the next call.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Option<(Step, usize)> {
        let mut last = None;
        for (i, &byte) in bytes.iter().enumerate() {
            let step = self.feed(byte);
            last = Some((step, i + 1));
            if step.ends_poll() {
                break;
            }
        }
        last
    }

    fn finish(&mut self) -> Step {
        let decoded = self.cursor.decoded_len();
        self.cursor = Cursor::Searching;

        if decoded > 1 {
            Step::Complete { len: decoded - 1 }
        } else {
            Step::Short
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{encode_to_vec, hex_string, verify_checksum};
    use proptest::prelude::*;

    fn frame(body: &[u8]) -> heapless::Vec<u8, 32> {
        let mut v = heapless::Vec::new();
        v.push(STX).unwrap();
        v.extend_from_slice(body).unwrap();
        v.push(ETX).unwrap();
        v
    }

    #[test]
    fn test_alarm_frame_decodes() {
        let mut rx = FrameReceiver::new();
        let (step, used) = rx.feed_bytes(&frame(b"03021026")).unwrap();

        assert_eq!(step, Step::Complete { len: 3 });
        assert_eq!(used, 10);
        assert_eq!(rx.payload(3), &[0x03, 0x02, 0x10]);
        assert_eq!(rx.checksum_byte(3), Some(0x26));
        assert!(!rx.is_receiving());
    }

    #[test]
    fn test_noise_before_stx_discarded() {
        let mut rx = FrameReceiver::new();
        assert_eq!(rx.feed(0xFF), Step::Discarded);
        assert_eq!(rx.feed(b'0'), Step::Discarded);
        assert_eq!(rx.feed(ETX), Step::Discarded);
        assert!(!rx.is_receiving());
        assert_eq!(rx.feed(STX), Step::Started);
        assert!(rx.is_receiving());
    }

    #[test]
    fn test_single_digit_frame_is_short() {
        let mut rx = FrameReceiver::new();
        let (step, _) = rx.feed_bytes(&frame(b"0")).unwrap();
        assert_eq!(step, Step::Short);
        assert!(!rx.is_receiving());
    }

    #[test]
    fn test_one_byte_plus_checksum_is_short() {
        // Two decoded bytes would be needed: one payload, one checksum
        let mut rx = FrameReceiver::new();
        let (step, _) = rx.feed_bytes(&frame(b"03")).unwrap();
        assert_eq!(step, Step::Short);
    }

    #[test]
    fn test_empty_frame_is_short() {
        let mut rx = FrameReceiver::new();
        let (step, _) = rx.feed_bytes(&[STX, ETX]).unwrap();
        assert_eq!(step, Step::Short);
    }

    #[test]
    fn test_odd_length_frame_drops_half_byte() {
        let mut rx = FrameReceiver::new();
        let (step, _) = rx.feed_bytes(&frame(b"03021")).unwrap();
        // Two complete bytes, the trailing nibble does not count
        assert_eq!(step, Step::Complete { len: 1 });
        assert_eq!(rx.payload(1), &[0x03]);
    }

    #[test]
    fn test_overflow_keeps_scanning_for_etx() {
        let mut rx = FrameReceiver::new();
        let data = frame(b"0102030405060708");

        // STX + 12 digits accepted, the 13th is dropped and ends the call
        let (step, used) = rx.feed_bytes(&data).unwrap();
        assert_eq!(step, Step::Overflowed);
        assert_eq!(used, 14);
        assert!(rx.is_overflowed());

        let (step, used2) = rx.feed_bytes(&data[used..]).unwrap();
        assert_eq!(step, Step::Overflowed);
        assert_eq!(used2, 1);

        let rest = &data[used + used2..];
        let (step, _) = rx.feed_bytes(rest).unwrap();
        assert_eq!(step, Step::Overflowed);

        // Remaining: one digit and ETX
        let rest = &data[data.len() - 2..];
        let (step, _) = rx.feed_bytes(rest).unwrap();
        assert_eq!(step, Step::Overflowed);
        assert_eq!(rx.feed(ETX), Step::Complete { len: 5 });
        assert_eq!(rx.buffer(), &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    }

    #[test]
    fn test_fourteen_digits() {
        let mut rx = FrameReceiver::new();
        let data = frame(b"01020304050607");
        let mut pos = 0;
        let mut last = None;
        while pos < data.len() {
            let (step, used) = rx.feed_bytes(&data[pos..]).unwrap();
            pos += used;
            last = Some(step);
        }
        assert_eq!(last, Some(Step::Complete { len: 5 }));
        assert_eq!(rx.payload(5), &[0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(rx.checksum_byte(5), Some(0x06));
    }

    #[test]
    fn test_exactly_full_frame() {
        let mut rx = FrameReceiver::new();
        let (step, _) = rx.feed_bytes(&frame(b"0A0B0C0D0E0F")).unwrap();
        assert_eq!(step, Step::Complete { len: 5 });
        assert_eq!(rx.payload(5), &[0x0A, 0x0B, 0x0C, 0x0D, 0x0E]);
    }

    #[test]
    fn test_invalid_char_hold_keeps_frame() {
        let mut rx = FrameReceiver::new();
        let data = frame(b"03x021026");

        let (step, used) = rx.feed_bytes(&data).unwrap();
        assert_eq!(step, Step::Invalid);
        assert_eq!(used, 4);
        assert!(rx.is_receiving());
        assert_eq!(rx.decoded_len(), 1);

        let (step, _) = rx.feed_bytes(&data[used..]).unwrap();
        assert_eq!(step, Step::Complete { len: 3 });
        assert_eq!(rx.payload(3), &[0x03, 0x02, 0x10]);
    }

    #[test]
    fn test_lowercase_digit_is_invalid() {
        let mut rx = FrameReceiver::new();
        rx.feed(STX);
        assert_eq!(rx.feed(b'a'), Step::Invalid);
        assert!(rx.is_receiving());
    }

    #[test]
    fn test_stx_mid_frame_hold_is_ignored() {
        let mut rx = FrameReceiver::new();
        rx.feed_bytes(&[STX, b'1', b'2']);
        assert_eq!(rx.feed(STX), Step::Invalid);
        // Frame continues where it was
        rx.feed_bytes(b"3456");
        assert_eq!(rx.feed(ETX), Step::Complete { len: 2 });
        assert_eq!(rx.payload(2), &[0x12, 0x34]);
    }

    #[test]
    fn test_invalid_char_resync_drops_frame() {
        let mut rx = FrameReceiver::with_policy(InvalidCharPolicy::Resync);
        let data = frame(b"03x021026");

        let (step, used) = rx.feed_bytes(&data).unwrap();
        assert_eq!(step, Step::Invalid);
        assert!(!rx.is_receiving());

        // The rest of the frame is noise until the next STX
        let (step, _) = rx.feed_bytes(&data[used..]).unwrap();
        assert_eq!(step, Step::Discarded);
        assert!(!rx.is_receiving());
    }

    #[test]
    fn test_stx_mid_frame_resync_restarts() {
        let mut rx = FrameReceiver::with_policy(InvalidCharPolicy::Resync);
        rx.feed_bytes(&[STX, b'F', b'F', b'F']);
        assert_eq!(rx.feed(STX), Step::Invalid);
        assert!(rx.is_receiving());
        assert_eq!(rx.decoded_len(), 0);

        rx.feed_bytes(b"03021026");
        assert_eq!(rx.feed(ETX), Step::Complete { len: 3 });
        assert_eq!(rx.payload(3), &[0x03, 0x02, 0x10]);
    }

    #[test]
    fn test_reset() {
        let mut rx = FrameReceiver::new();
        rx.feed_bytes(&[STX, b'1']);
        assert!(rx.is_receiving());
        rx.reset();
        assert!(!rx.is_receiving());
        assert_eq!(rx.feed(ETX), Step::Discarded);
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut rx = FrameReceiver::new();
        let mut data = heapless::Vec::<u8, 32>::new();
        data.extend_from_slice(&frame(b"03021026")).unwrap();
        data.extend_from_slice(&frame(b"0302802D")).unwrap();

        let (step, used) = rx.feed_bytes(&data).unwrap();
        assert_eq!(step, Step::Complete { len: 3 });
        assert_eq!(rx.payload(3), &[0x03, 0x02, 0x10]);

        let (step, _) = rx.feed_bytes(&data[used..]).unwrap();
        assert_eq!(step, Step::Complete { len: 3 });
        assert_eq!(rx.payload(3), &[0x03, 0x02, 0x80]);
    }

    #[test]
    fn test_feed_bytes_empty() {
        let mut rx = FrameReceiver::new();
        assert_eq!(rx.feed_bytes(&[]), None);
    }

    proptest! {
        #[test]
        fn prop_encoded_frames_decode(
            payload in proptest::collection::vec(any::<u8>(), 1..RECV_BUF_LEN)
        ) {
            let hex = hex_string(&payload).unwrap();
            let encoded = encode_to_vec(&hex).unwrap();

            let mut rx = FrameReceiver::new();
            let (step, used) = rx.feed_bytes(&encoded).unwrap();

            prop_assert_eq!(step, Step::Complete { len: payload.len() });
            prop_assert_eq!(used, encoded.len());
            prop_assert_eq!(rx.payload(payload.len()), &payload[..]);

            let checksum = rx.checksum_byte(payload.len()).unwrap();
            prop_assert!(verify_checksum(rx.payload(payload.len()), checksum));
        }

        #[test]
        fn prop_never_panics_and_resyncs(noise in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut rx = FrameReceiver::new();
            for byte in noise {
                rx.feed(byte);
                prop_assert!(rx.decoded_len() <= RECV_BUF_LEN);
            }

            // An ETX always brings the receiver back to searching
            rx.feed(ETX);
            prop_assert!(!rx.is_receiving());

            let (step, _) = rx.feed_bytes(&encode_to_vec(b"03021026").unwrap()).unwrap();
            prop_assert_eq!(step, Step::Complete { len: 4 });
        }
    }
}
