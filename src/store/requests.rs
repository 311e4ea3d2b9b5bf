//! Aid request rows and lifecycle transitions
//!
//! A request is created pending with a default priority derived from its
//! type, escalated over time by the escalator, and terminally resolved
//! exactly once. Its related district is set at creation and never changes.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};
use crate::store::Store;

/// Aid request category. Unknown tags read back from storage fold into
/// `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Water,
    Food,
    Shelter,
    Medical,
    Clothes,
    Hygiene,
    Other,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Food => "food",
            Self::Shelter => "shelter",
            Self::Medical => "medical",
            Self::Clothes => "clothes",
            Self::Hygiene => "hygiene",
            Self::Other => "other",
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "water" => Self::Water,
            "food" => Self::Food,
            "shelter" => Self::Shelter,
            "medical" => Self::Medical,
            "clothes" => Self::Clothes,
            "hygiene" => Self::Hygiene,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Resolved,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
        }
    }
}

/// A submitted aid need tied to a location, type, and quantity.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub subtype: String,
    pub priority: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub quantity: i64,
    pub tckn: Option<String>,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: RequestStatus,
    pub related_district: Option<i64>,
}

impl Request {
    /// Composite inventory key, `"{type} - {subtype}"`.
    pub fn item_key(&self) -> String {
        format!("{} - {}", self.kind.as_str(), self.subtype)
    }
}

/// Fields for creating a request. `priority` and `timestamp` default to the
/// type-derived priority and the current time when not supplied.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub kind: RequestKind,
    pub subtype: String,
    pub latitude: f64,
    pub longitude: f64,
    pub quantity: i64,
    pub tckn: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub related_district: Option<i64>,
}

/// Default priority by request type.
pub fn default_priority(kind: RequestKind) -> i64 {
    match kind {
        RequestKind::Water => 3,
        RequestKind::Shelter | RequestKind::Medical => 2,
        _ => 1,
    }
}

fn request_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Request> {
    let kind_tag: String = row.get(1)?;
    let status_tag: String = row.get(10)?;
    let timestamp_secs: i64 = row.get(9)?;
    Ok(Request {
        id: row.get(0)?,
        kind: RequestKind::from_tag(&kind_tag),
        subtype: row.get(2)?,
        priority: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        quantity: row.get(6)?,
        tckn: row.get(7)?,
        notes: row.get(8)?,
        timestamp: DateTime::from_timestamp(timestamp_secs, 0).unwrap_or_default(),
        status: if status_tag == "resolved" {
            RequestStatus::Resolved
        } else {
            RequestStatus::Pending
        },
        related_district: row.get(11)?,
    })
}

const REQUEST_COLUMNS: &str = "id, type, subtype, priority, latitude, longitude, quantity, \
                               tckn, notes, timestamp, status, related_district";

pub(crate) fn get_request(conn: &Connection, request_id: i64) -> Result<Request> {
    conn.prepare_cached(&format!(
        "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?1"
    ))?
    .query_row([request_id], request_from_row)
    .optional()?
    .ok_or_else(|| ReliefError::NotFound(format!("request {request_id}")))
}

/// Flip a pending request to resolved inside the caller's transaction.
pub(crate) fn set_resolved(conn: &Connection, request_id: i64) -> Result<()> {
    conn.prepare_cached("UPDATE requests SET status = 'resolved' WHERE id = ?1")?
        .execute([request_id])?;
    Ok(())
}

impl Store {
    pub fn create_request(&mut self, new: NewRequest) -> Result<Request> {
        if new.quantity <= 0 {
            return Err(ReliefError::InvalidInput(format!(
                "quantity must be positive, got {}",
                new.quantity
            )));
        }
        let priority = new.priority.unwrap_or_else(|| default_priority(new.kind));
        if priority < 0 {
            return Err(ReliefError::InvalidInput(format!(
                "priority must be non-negative, got {priority}"
            )));
        }
        let timestamp = new.timestamp.unwrap_or_else(Utc::now);

        self.conn().execute(
            "INSERT INTO requests
                (type, subtype, priority, latitude, longitude, quantity,
                 tckn, notes, timestamp, status, related_district)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'pending', ?10)",
            params![
                new.kind.as_str(),
                new.subtype,
                priority,
                new.latitude,
                new.longitude,
                new.quantity,
                new.tckn,
                new.notes,
                timestamp.timestamp(),
                new.related_district,
            ],
        )?;
        let id = self.conn().last_insert_rowid();
        get_request(self.conn(), id)
    }

    pub fn get_request(&self, request_id: i64) -> Result<Request> {
        get_request(self.conn(), request_id)
    }

    pub fn list_requests(&self) -> Result<Vec<Request>> {
        self.query_requests(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests ORDER BY id"
        ))
    }

    pub fn list_requests_by_district(&self, district_id: i64) -> Result<Vec<Request>> {
        let mut stmt = self.conn().prepare_cached(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE related_district = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map([district_id], request_from_row)?;
        let mut requests = Vec::new();
        for row in rows {
            requests.push(row?);
        }
        Ok(requests)
    }

    pub fn list_pending_requests(&self) -> Result<Vec<Request>> {
        self.query_requests(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE status = 'pending' ORDER BY id"
        ))
    }

    fn query_requests(&self, sql: &str) -> Result<Vec<Request>> {
        let mut stmt = self.conn().prepare_cached(sql)?;
        let rows = stmt.query_map([], request_from_row)?;
        let mut requests = Vec::new();
        for row in rows {
            requests.push(row?);
        }
        Ok(requests)
    }

    /// Transition pending -> resolved. Resolving twice is an error, not a
    /// no-op.
    pub fn mark_resolved(&mut self, request_id: i64) -> Result<Request> {
        let tx = self.begin()?;
        let request = get_request(&tx, request_id)?;
        if request.status == RequestStatus::Resolved {
            return Err(ReliefError::AlreadyResolved(request_id));
        }
        set_resolved(&tx, request_id)?;
        tx.commit()?;
        get_request(self.conn(), request_id)
    }

    /// Escalator write path: only touches requests still pending, so a
    /// request resolved between scan and write keeps its frozen priority.
    /// Returns whether a row was updated.
    pub fn bump_priority_if_pending(&mut self, request_id: i64, priority: i64) -> Result<bool> {
        let changed = self.conn().execute(
            "UPDATE requests SET priority = ?1 WHERE id = ?2 AND status = 'pending'",
            params![priority, request_id],
        )?;
        Ok(changed > 0)
    }
}
