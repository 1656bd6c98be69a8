//! CPU affinity for the strategy thread.
//!
//! A strategy instance is driven by one receive loop. Pinning the thread that
//! runs it to a dedicated core keeps tick-to-callback latency stable.

use tracing::{info, warn};

/// Bind the current thread to the specified CPU core.
///
/// Returns `true` if the binding succeeded, `false` if the core ID is invalid
/// or the OS rejected the request.
pub fn bind_to_core(core_id: usize) -> bool {
    let core_ids = core_affinity::get_core_ids().unwrap_or_default();
    let Some(core) = core_ids.get(core_id) else {
        warn!("CPU core {core_id} not available (system has {} cores)", core_ids.len());
        return false;
    };

    let ok = core_affinity::set_for_current(*core);
    if ok {
        info!("bound strategy thread to CPU core {core_id}");
    } else {
        warn!("failed to bind strategy thread to CPU core {core_id}");
    }
    ok
}

/// Bind the current thread to `core_id` if one is configured.
pub fn maybe_bind(core_id: Option<usize>) {
    if let Some(id) = core_id {
        bind_to_core(id);
    }
}
