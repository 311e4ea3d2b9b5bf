//! Request lifecycle: intake and resolution
//!
//! Intake assigns the nearest district and the type-derived default
//! priority. Resolution deducts the request's quantity from its district's
//! inventory and flips the status in the same transaction, so the deduction
//! and the status change commit together or not at all.

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ReliefError, Result};
use crate::geo;
use crate::store::{districts, inventory, requests};
use crate::store::{NewRequest, Request, RequestKind, RequestStatus, Store};

/// Intake fields as submitted from the field.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub subtype: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub tckn: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

/// Intake: locate the nearest district and persist a pending request.
///
/// The related district stays `None` when no districts are seeded; the
/// request is still accepted.
pub fn submit(store: &mut Store, input: SubmitRequest) -> Result<Request> {
    if input.quantity <= 0 {
        return Err(ReliefError::InvalidInput(format!(
            "quantity must be positive, got {}",
            input.quantity
        )));
    }
    if !input.latitude.is_finite() || !input.longitude.is_finite() {
        return Err(ReliefError::InvalidInput("coordinates must be finite".into()));
    }

    let all_districts = store.list_districts()?;
    let related_district =
        geo::nearest_district(input.latitude, input.longitude, &all_districts).map(|d| d.id);

    let request = store.create_request(NewRequest {
        kind: input.kind,
        subtype: input.subtype,
        latitude: input.latitude,
        longitude: input.longitude,
        quantity: input.quantity,
        tckn: input.tckn,
        notes: input.notes,
        priority: None,
        timestamp: None,
        related_district,
    })?;

    info!(
        request_id = request.id,
        kind = request.kind.as_str(),
        district = ?request.related_district,
        priority = request.priority,
        "Request submitted"
    );
    Ok(request)
}

/// Resolution: deduct the request's quantity from its district and mark it
/// resolved, atomically.
pub fn resolve(store: &mut Store, request_id: i64) -> Result<Request> {
    let tx = store.begin()?;

    let request = requests::get_request(&tx, request_id)?;
    if request.status == RequestStatus::Resolved {
        return Err(ReliefError::AlreadyResolved(request_id));
    }

    let district_id = request
        .related_district
        .ok_or_else(|| ReliefError::NotFound(format!("district for request {request_id}")))?;
    districts::ensure_exists(&tx, district_id)?;

    let item_key = request.item_key();
    inventory::deduct_one(&tx, district_id, &item_key, request.quantity)?;
    requests::set_resolved(&tx, request_id)?;

    tx.commit()?;

    debug!(
        request_id,
        district_id,
        item = %item_key,
        quantity = request.quantity,
        "Request resolved"
    );
    store.get_request(request_id)
}
