//! Time-based priority escalation
//!
//! A recurring task rescans pending requests on a fixed wall-clock interval
//! and raises their priority from the *total* hours elapsed since
//! submission. The increase is recomputed from absolute elapsed time each
//! pass, so repeated passes without resolution compound.
//!
//! Passes never overlap: the loop awaits each pass before taking the next
//! tick, and a single request's failure is logged and skipped without
//! aborting the rest of the batch.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::store::{RequestKind, SharedStore, Store};

/// Priority increase for a request of the given type after `hours` total
/// elapsed hours. Types without an escalation function never escalate.
pub fn escalation_increase(kind: RequestKind, hours: i64) -> i64 {
    if hours <= 0 {
        return 0;
    }
    let h = hours as f64;
    let raw = match kind {
        RequestKind::Water => 2f64.powf(h),
        RequestKind::Food => 1.5 * h,
        RequestKind::Shelter => h,
        RequestKind::Clothes | RequestKind::Hygiene => 0.5 * h,
        RequestKind::Medical | RequestKind::Other => 0.0,
    };
    // f64 -> i64 casts saturate, which caps runaway exponential growth
    raw.floor() as i64
}

/// One escalation pass over all pending requests. Returns how many requests
/// were updated.
pub fn run_pass(store: &mut Store, now: DateTime<Utc>) -> Result<usize> {
    let pending = store.list_pending_requests()?;
    let mut updated = 0;

    for request in pending {
        let hours = (now - request.timestamp).num_seconds().max(0) / 3600;
        let increase = escalation_increase(request.kind, hours);
        if increase <= 0 {
            continue;
        }
        let new_priority = request.priority.saturating_add(increase);

        // Re-checks pending status at write time: a request resolved since
        // the scan keeps its frozen priority.
        match store.bump_priority_if_pending(request.id, new_priority) {
            Ok(true) => {
                debug!(
                    request_id = request.id,
                    kind = request.kind.as_str(),
                    hours,
                    priority = new_priority,
                    "Escalated request priority"
                );
                updated += 1;
            }
            Ok(false) => {
                debug!(request_id = request.id, "Request resolved mid-scan, skipped");
            }
            Err(e) => {
                warn!(request_id = request.id, error = %e, "Failed to escalate request, skipping");
            }
        }
    }

    Ok(updated)
}

/// Run the escalator until the process shuts down.
pub async fn run(store: SharedStore, interval_secs: u64) {
    info!(interval_secs, "Starting priority escalator");

    let mut ticker = interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let now = Utc::now();
        let mut store = store.lock().await;
        match run_pass(&mut store, now) {
            Ok(0) => {}
            Ok(updated) => info!(updated, "Escalation pass complete"),
            Err(e) => warn!(error = %e, "Escalation pass failed"),
        }
    }
}
