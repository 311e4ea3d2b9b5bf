//! District rows and read views

use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::error::{ReliefError, Result};
use crate::store::{inventory, Store};

/// Administrative region with a fixed location.
#[derive(Debug, Clone, Serialize)]
pub struct District {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// District as served over the API: inventory plus open-request count.
#[derive(Debug, Clone, Serialize)]
pub struct DistrictView {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub inventory: BTreeMap<String, i64>,
    pub request_count: i64,
}

fn district_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<District> {
    Ok(District {
        id: row.get(0)?,
        name: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
    })
}

/// Fail with `NotFound` unless the district row exists.
pub(crate) fn ensure_exists(conn: &Connection, district_id: i64) -> Result<()> {
    let found: Option<i64> = conn
        .prepare_cached("SELECT id FROM districts WHERE id = ?1")?
        .query_row([district_id], |row| row.get(0))
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(ReliefError::NotFound(format!("district {district_id}"))),
    }
}

impl Store {
    pub fn insert_district(&mut self, name: &str, latitude: f64, longitude: f64) -> Result<District> {
        if name.trim().is_empty() {
            return Err(ReliefError::InvalidInput("district name is empty".into()));
        }
        self.conn().execute(
            "INSERT INTO districts (name, latitude, longitude) VALUES (?1, ?2, ?3)",
            params![name, latitude, longitude],
        )?;
        let id = self.conn().last_insert_rowid();
        Ok(District {
            id,
            name: name.to_string(),
            latitude,
            longitude,
        })
    }

    pub fn district_by_name(&self, name: &str) -> Result<Option<District>> {
        let district = self
            .conn()
            .prepare_cached("SELECT id, name, latitude, longitude FROM districts WHERE name = ?1")?
            .query_row([name], district_from_row)
            .optional()?;
        Ok(district)
    }

    pub fn get_district(&self, district_id: i64) -> Result<District> {
        self.conn()
            .prepare_cached("SELECT id, name, latitude, longitude FROM districts WHERE id = ?1")?
            .query_row([district_id], district_from_row)
            .optional()?
            .ok_or_else(|| ReliefError::NotFound(format!("district {district_id}")))
    }

    /// All districts in id order. Geo lookup iterates this, so nearest-tie
    /// breaking follows insertion order.
    pub fn list_districts(&self) -> Result<Vec<District>> {
        let mut stmt = self
            .conn()
            .prepare_cached("SELECT id, name, latitude, longitude FROM districts ORDER BY id")?;
        let rows = stmt.query_map([], district_from_row)?;
        let mut districts = Vec::new();
        for row in rows {
            districts.push(row?);
        }
        Ok(districts)
    }

    pub fn district_view(&self, district_id: i64) -> Result<DistrictView> {
        let district = self.get_district(district_id)?;
        self.view_of(district)
    }

    pub fn list_district_views(&self) -> Result<Vec<DistrictView>> {
        let districts = self.list_districts()?;
        let mut views = Vec::with_capacity(districts.len());
        for district in districts {
            views.push(self.view_of(district)?);
        }
        Ok(views)
    }

    fn view_of(&self, district: District) -> Result<DistrictView> {
        let inventory = inventory::inventory_of(self.conn(), district.id)?;
        let request_count: i64 = self
            .conn()
            .prepare_cached("SELECT COUNT(*) FROM requests WHERE related_district = ?1")?
            .query_row([district.id], |row| row.get(0))?;
        Ok(DistrictView {
            id: district.id,
            name: district.name,
            latitude: district.latitude,
            longitude: district.longitude,
            inventory,
            request_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::store::Store;

    #[test]
    fn test_insert_and_get() {
        let mut store = Store::open_in_memory().unwrap();
        let d = store.insert_district("Kadikoy", 40.9833, 29.0333).unwrap();
        let got = store.get_district(d.id).unwrap();
        assert_eq!(got.name, "Kadikoy");
        assert_eq!(got.latitude, 40.9833);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut store = Store::open_in_memory().unwrap();
        assert!(store.insert_district("  ", 1.0, 2.0).is_err());
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let err = store.get_district(42).unwrap_err();
        assert!(err.to_string().contains("district 42"));
    }

    #[test]
    fn test_view_reports_request_count() {
        let mut store = Store::open_in_memory().unwrap();
        let d = store.insert_district("Fatih", 41.0186, 28.9396).unwrap();

        let view = store.district_view(d.id).unwrap();
        assert_eq!(view.request_count, 0);
        assert!(view.inventory.is_empty());
    }
}
