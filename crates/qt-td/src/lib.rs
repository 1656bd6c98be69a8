//! # qt-td
//!
//! Order command path from strategies to the execution service.
//!
//! ```text
//! strategy callback
//!     │ send_order(NewOrder)
//! ┌───▼─────────┐  encode (ContractTable lookup)
//! │ OrderSender │──────────────────────────────┐
//! └─────────────┘                              │ try_send
//!                                    ┌─────────▼────────┐
//!                                    │ bounded mpsc     │
//!                                    └─────────┬────────┘
//!                                    ┌─────────▼────────┐  publish("trader_cmd")
//!                                    │ command publisher│──────────────────────► bus
//!                                    └──────────────────┘
//! ```
//!
//! The strategy thread never waits on the bus: `send_order` either queues the
//! command or returns the reason it could not.

pub mod encoder;
pub mod outbound;
pub mod publisher;
pub mod sender;

pub use encoder::OrderRequestEncoder;
pub use outbound::{OutboundCommand, OutboundReceiver, OutboundSender};
pub use publisher::{PublisherStats, run_command_publisher, spawn_command_publisher};
pub use sender::OrderSender;
