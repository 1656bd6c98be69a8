//! Outbound command queue between the strategy thread and the publisher task.
//!
//! The order sender pushes encoded commands with `try_send`, so a slow or
//! unavailable bus never blocks tick dispatch. The
//! [`publisher`](crate::publisher) task drains the receiver.

/// One encoded command waiting to be published.
#[derive(Debug, Clone)]
pub struct OutboundCommand {
    /// Strategy-assigned id, for log correlation.
    pub user_order_id: u32,
    /// Ticker the command refers to, for log correlation.
    pub ticker: String,
    /// Wire bytes, published unmodified.
    pub payload: Vec<u8>,
}

/// Sender half of the outbound command queue.
pub type OutboundSender = tokio::sync::mpsc::Sender<OutboundCommand>;

/// Receiver half of the outbound command queue.
///
/// Owned by the publisher task.
pub type OutboundReceiver = tokio::sync::mpsc::Receiver<OutboundCommand>;
