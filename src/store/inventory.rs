//! Per-district inventory ledger
//!
//! Quantities are always positive in the table: an item reaching zero is
//! deleted, never stored as zero. Batched updates and transfers validate
//! every item before mutating anything, so they fully succeed or fully fail.

use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{ReliefError, Result};
use crate::store::{districts, Store};

/// Current quantity of an item in a district, 0 when absent.
pub(crate) fn quantity_of(conn: &Connection, district_id: i64, item: &str) -> Result<i64> {
    let qty: Option<i64> = conn
        .prepare_cached(
            "SELECT quantity FROM inventory WHERE district_id = ?1 AND item_key = ?2",
        )?
        .query_row(params![district_id, item], |row| row.get(0))
        .optional()?;
    Ok(qty.unwrap_or(0))
}

/// Write a quantity, deleting the row when it reaches zero.
fn write_quantity(conn: &Connection, district_id: i64, item: &str, quantity: i64) -> Result<()> {
    if quantity == 0 {
        conn.prepare_cached("DELETE FROM inventory WHERE district_id = ?1 AND item_key = ?2")?
            .execute(params![district_id, item])?;
    } else {
        conn.prepare_cached(
            "INSERT INTO inventory (district_id, item_key, quantity) VALUES (?1, ?2, ?3)
             ON CONFLICT (district_id, item_key) DO UPDATE SET quantity = ?3",
        )?
        .execute(params![district_id, item, quantity])?;
    }
    Ok(())
}

/// Apply a signed delta to one item. Fails without mutating when the result
/// would go negative.
pub(crate) fn adjust_one(
    conn: &Connection,
    district_id: i64,
    item: &str,
    delta: i64,
) -> Result<i64> {
    let current = quantity_of(conn, district_id, item)?;
    let next = current.checked_add(delta).ok_or_else(|| {
        ReliefError::InvalidInput(format!("inventory delta overflows for '{item}'"))
    })?;
    if next < 0 {
        return Err(ReliefError::InsufficientInventory {
            item: item.to_string(),
            requested: delta.unsigned_abs() as i64,
            available: current,
        });
    }
    write_quantity(conn, district_id, item, next)?;
    Ok(next)
}

/// Deduct a positive amount from one item.
pub(crate) fn deduct_one(
    conn: &Connection,
    district_id: i64,
    item: &str,
    amount: i64,
) -> Result<()> {
    if amount <= 0 {
        return Err(ReliefError::InvalidInput(format!(
            "deduction amount must be positive, got {amount}"
        )));
    }
    adjust_one(conn, district_id, item, -amount)?;
    Ok(())
}

/// Full inventory mapping of a district.
pub(crate) fn inventory_of(conn: &Connection, district_id: i64) -> Result<BTreeMap<String, i64>> {
    let mut stmt = conn.prepare_cached(
        "SELECT item_key, quantity FROM inventory WHERE district_id = ?1 ORDER BY item_key",
    )?;
    let rows = stmt.query_map([district_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    let mut inventory = BTreeMap::new();
    for row in rows {
        let (item, qty) = row?;
        inventory.insert(item, qty);
    }
    Ok(inventory)
}

impl Store {
    /// Apply a signed delta to one item in one district.
    pub fn adjust_inventory(&mut self, district_id: i64, item: &str, delta: i64) -> Result<i64> {
        let tx = self.begin()?;
        districts::ensure_exists(&tx, district_id)?;
        let next = adjust_one(&tx, district_id, item, delta)?;
        tx.commit()?;
        Ok(next)
    }

    /// Apply a mapping of item -> signed delta in one pass. The whole batch is
    /// validated against current quantities before any mutation is applied.
    pub fn apply_inventory_batch(
        &mut self,
        district_id: i64,
        deltas: &BTreeMap<String, i64>,
    ) -> Result<()> {
        let tx = self.begin()?;
        districts::ensure_exists(&tx, district_id)?;

        // Validation pass: no writes until every item clears.
        for (item, delta) in deltas {
            let current = quantity_of(&tx, district_id, item)?;
            let next = current.checked_add(*delta).ok_or_else(|| {
                ReliefError::InvalidInput(format!("inventory delta overflows for '{item}'"))
            })?;
            if next < 0 {
                return Err(ReliefError::InsufficientInventory {
                    item: item.clone(),
                    requested: delta.unsigned_abs() as i64,
                    available: current,
                });
            }
        }

        for (item, delta) in deltas {
            adjust_one(&tx, district_id, item, *delta)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Atomically move items from source to target. Validates the full batch
    /// against the source before applying; a failure leaves both districts
    /// untouched, so total inventory is conserved.
    pub fn transfer_inventory(
        &mut self,
        source_id: i64,
        target_id: i64,
        items: &BTreeMap<String, i64>,
    ) -> Result<()> {
        if source_id == target_id {
            return Err(ReliefError::InvalidInput(
                "transfer source and target are the same district".into(),
            ));
        }

        let tx = self.begin()?;
        districts::ensure_exists(&tx, source_id)?;
        districts::ensure_exists(&tx, target_id)?;

        for (item, amount) in items {
            if *amount <= 0 {
                return Err(ReliefError::InvalidInput(format!(
                    "transfer amount for '{item}' must be positive, got {amount}"
                )));
            }
            let available = quantity_of(&tx, source_id, item)?;
            if available < *amount {
                return Err(ReliefError::InsufficientInventory {
                    item: item.clone(),
                    requested: *amount,
                    available,
                });
            }
        }

        for (item, amount) in items {
            adjust_one(&tx, source_id, item, -amount)?;
            adjust_one(&tx, target_id, item, *amount)?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn district_inventory(&self, district_id: i64) -> Result<BTreeMap<String, i64>> {
        districts::ensure_exists(self.conn(), district_id)?;
        inventory_of(self.conn(), district_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn store_with_district() -> (Store, i64) {
        let mut store = Store::open_in_memory().unwrap();
        let d = store.insert_district("Uskudar", 41.0226, 29.0078).unwrap();
        (store, d.id)
    }

    #[test]
    fn test_adjust_from_absent_defaults_to_zero() {
        let (mut store, d) = store_with_district();
        let qty = store.adjust_inventory(d, "water - bottled", 5).unwrap();
        assert_eq!(qty, 5);
    }

    #[test]
    fn test_adjust_never_goes_negative() {
        let (mut store, d) = store_with_district();
        store.adjust_inventory(d, "blankets", 2).unwrap();

        let err = store.adjust_inventory(d, "blankets", -3).unwrap_err();
        match err {
            ReliefError::InsufficientInventory {
                item,
                requested,
                available,
            } => {
                assert_eq!(item, "blankets");
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected InsufficientInventory, got {other}"),
        }

        // Unchanged after the failure
        assert_eq!(store.district_inventory(d).unwrap()["blankets"], 2);
    }

    #[test]
    fn test_zero_quantity_row_is_removed() {
        let (mut store, d) = store_with_district();
        store.adjust_inventory(d, "tents", 4).unwrap();
        store.adjust_inventory(d, "tents", -4).unwrap();
        assert!(!store.district_inventory(d).unwrap().contains_key("tents"));
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let (mut store, d) = store_with_district();
        store.adjust_inventory(d, "water - bottled", 5).unwrap();

        let mut deltas = BTreeMap::new();
        deltas.insert("water - bottled".to_string(), 3);
        deltas.insert("tents".to_string(), -1); // would go negative

        assert!(store.apply_inventory_batch(d, &deltas).is_err());

        // First item untouched even though it appears before the failing one
        let inventory = store.district_inventory(d).unwrap();
        assert_eq!(inventory["water - bottled"], 5);
        assert!(!inventory.contains_key("tents"));
    }

    #[test]
    fn test_transfer_round_trip_restores_quantities() {
        let (mut store, a) = store_with_district();
        let b = store.insert_district("Sariyer", 41.1669, 29.0572).unwrap().id;
        store.adjust_inventory(a, "water - bottled", 7).unwrap();
        store.adjust_inventory(b, "water - bottled", 2).unwrap();

        let mut items = BTreeMap::new();
        items.insert("water - bottled".to_string(), 3);

        store.transfer_inventory(a, b, &items).unwrap();
        assert_eq!(store.district_inventory(a).unwrap()["water - bottled"], 4);
        assert_eq!(store.district_inventory(b).unwrap()["water - bottled"], 5);

        store.transfer_inventory(b, a, &items).unwrap();
        assert_eq!(store.district_inventory(a).unwrap()["water - bottled"], 7);
        assert_eq!(store.district_inventory(b).unwrap()["water - bottled"], 2);
    }

    #[test]
    fn test_transfer_insufficient_mutates_neither_side() {
        let (mut store, a) = store_with_district();
        let b = store.insert_district("Maltepe", 40.9357, 29.1569).unwrap().id;
        store.adjust_inventory(a, "tents", 5).unwrap();

        let mut items = BTreeMap::new();
        items.insert("tents".to_string(), 10);

        let err = store.transfer_inventory(a, b, &items).unwrap_err();
        assert!(matches!(err, ReliefError::InsufficientInventory { .. }));

        assert_eq!(store.district_inventory(a).unwrap()["tents"], 5);
        assert!(store.district_inventory(b).unwrap().is_empty());
    }

    #[test]
    fn test_transfer_rejects_non_positive_amounts() {
        let (mut store, a) = store_with_district();
        let b = store.insert_district("Bakirkoy", 40.9797, 28.8772).unwrap().id;

        let mut items = BTreeMap::new();
        items.insert("tents".to_string(), 0);
        assert!(matches!(
            store.transfer_inventory(a, b, &items).unwrap_err(),
            ReliefError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_unknown_district_is_not_found() {
        let mut store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.adjust_inventory(99, "tents", 1).unwrap_err(),
            ReliefError::NotFound(_)
        ));
    }
}
