//! Smoke detector link driver
//!
//! Binds the [`rauchmelder_protocol`] wire format to a UART and to the two
//! base plate pins that tell whether a detector is plugged in and powered:
//!
//! - [`gate::ActivityGate`] - presence detect and support rail switching
//! - [`link::DetectorLink`] - gated frame transmission and receive polling
//! - [`handler::MessageHandler`] - dispatch target for decoded messages
//! - [`adapters`] - wrappers for `embedded-io` UARTs and `embedded-hal` pins
//!
//! ```ignore
//! let gate = ActivityGate::new(presence_pin, rail_pin, config.gate);
//! let mut link = DetectorLink::new(uart, gate, config);
//! let mut queue = MessageQueue::<4>::new();
//!
//! link.set_alarm_state(AlarmState::TestAlarm)?;
//! loop {
//!     link.poll_receive(&mut queue)?;
//!     while let Some(message) = queue.pop() {
//!         // ...
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod config;
pub mod gate;
pub mod handler;
pub mod link;

pub use config::{GateConfig, LinkConfig};
pub use gate::{ActivityGate, PeripheralGate};
pub use handler::{Message, MessageHandler, MessageQueue};
pub use link::{DetectorLink, RxStatus};

pub use rauchmelder_protocol::{AlarmState, InvalidCharPolicy};
