//! Fixed-size strategy identifier used in the command wire format.
//!
//! The command layout reserves 16 bytes for the strategy id. These helpers
//! convert between `&str` and that fixed representation.

/// Length of the strategy id field in trader commands.
pub const STRATEGY_ID_LEN: usize = 16;

/// Write a UTF-8 strategy id into a fixed `[u8; STRATEGY_ID_LEN]` buffer.
///
/// The string is copied byte-for-byte and the remaining bytes are zero-filled.
/// Longer ids are truncated to the first `STRATEGY_ID_LEN` bytes.
#[inline]
pub fn strategy_id_to_bytes(s: &str) -> [u8; STRATEGY_ID_LEN] {
    let mut buf = [0u8; STRATEGY_ID_LEN];
    let len = s.len().min(STRATEGY_ID_LEN);
    buf[..len].copy_from_slice(&s.as_bytes()[..len]);
    buf
}

/// Read a strategy id back from its fixed buffer.
///
/// Stops at the first null byte. A truncation that split a multi-byte
/// character yields the longest valid UTF-8 prefix.
pub fn strategy_id_from_bytes(buf: &[u8; STRATEGY_ID_LEN]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(STRATEGY_ID_LEN);
    match std::str::from_utf8(&buf[..end]) {
        Ok(s) => s.to_owned(),
        Err(e) => String::from_utf8_lossy(&buf[..e.valid_up_to()]).into_owned(),
    }
}
