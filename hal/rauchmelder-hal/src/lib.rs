//! Rauchmelder Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the smoke detector
//! link is written against. Board support code implements them for the
//! actual UART and GPIO peripherals, tests implement them with mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  rauchmelder-driver (gate, link)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  rauchmelder-hal (this crate - traits)  │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  board UART   │       │  board GPIO   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`], [`gpio::PullInputPin`] - Digital I/O
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, IoPin, OutputPin, Pull, PullInputPin};
pub use uart::{Uart, UartConfig, UartRx, UartTx};
