//! Rauchmelder Serial Protocol
//!
//! This crate defines the wire format spoken between the bus coupler
//! controller and the smoke detector module. The line is half-duplex,
//! 9600 baud, and carries short command/response frames.
//!
//! # Protocol Overview
//!
//! Every payload byte travels as two ASCII hex digits, high nibble first:
//! ```text
//! ┌─────┬──────────────────────┬──────────┬─────┐
//! │ STX │ PAYLOAD (hex digits) │ CHECKSUM │ ETX │
//! │ 02h │ 2 chars per byte     │ 2 chars  │ 03h │
//! └─────┴──────────────────────┴──────────┴─────┘
//! ```
//!
//! The checksum is the 8-bit sum of the transmitted hex *characters*, not
//! of the decoded bytes. The receiver acknowledges each complete frame with
//! a single [`ACK`] byte.
//!
//! The crate is sans-IO: [`frame`] produces the bytes to transmit and
//! [`receiver::FrameReceiver`] consumes received bytes one at a time.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod commands;
pub mod frame;
pub mod receiver;

pub use commands::AlarmState;
pub use frame::{
    checksum, decode_nibble, encode_byte, encode_frame, encode_payload_frame, encode_to_vec, hex_string,
    verify_checksum, FrameError, ACK, ETX, HEX_DIGITS, RECV_BUF_LEN, RECV_MAX_CHARS, STX,
};
pub use receiver::{FrameReceiver, InvalidCharPolicy, Step};
