//! Session sweeper — background eviction of idle sessions.
//!
//! Sessions are purely in-memory; without eviction every browser that ever
//! loaded the page would keep its form state until the process restarts.

use std::time::Instant;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::state::AppState;

/// Spawn the periodic sweep. Runs until the runtime shuts down.
pub fn spawn_session_sweeper(state: AppState) -> JoinHandle<()> {
    let interval = state.settings.session_sweep_interval;
    let ttl = state.settings.session_idle_ttl;
    info!(interval_secs = interval.as_secs(), ttl_secs = ttl.as_secs(), "session sweeper configured");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(std::time::Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            sweep_once(&state, Instant::now()).await;
        }
    })
}

pub(crate) async fn sweep_once(state: &AppState, now: Instant) -> usize {
    let removed = state
        .sessions
        .evict_idle(state.settings.session_idle_ttl, now)
        .await;
    if removed > 0 {
        let remaining = state.sessions.len().await;
        info!(removed, remaining, "idle sessions evicted");
    } else {
        debug!("session sweep: nothing to evict");
    }
    removed
}
