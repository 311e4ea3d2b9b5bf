//! End-to-end lifecycle integration tests against a file-backed store

use std::collections::BTreeMap;

use tempfile::TempDir;

use relief_node::lifecycle::{self, SubmitRequest};
use relief_node::store::{RequestKind, RequestStatus, Store};
use relief_node::ReliefError;

fn open_store(dir: &TempDir) -> Store {
    Store::open(dir.path()).unwrap()
}

fn water_request(lat: f64, lon: f64, quantity: i64) -> SubmitRequest {
    SubmitRequest {
        kind: RequestKind::Water,
        subtype: "bottled".into(),
        latitude: lat,
        longitude: lon,
        quantity,
        tckn: Some("12345678901".into()),
        notes: Some("urgent".into()),
    }
}

/// District with {"water - bottled": 5}; a quantity-3 request submitted
/// nearby resolves and leaves 2; the second resolve fails and mutates
/// nothing.
#[test]
fn test_resolve_scenario_deducts_and_rejects_second_resolve() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let district = store.insert_district("Kadikoy", 40.9833, 29.0333).unwrap();
    store
        .adjust_inventory(district.id, "water - bottled", 5)
        .unwrap();

    let request = lifecycle::submit(&mut store, water_request(40.99, 29.03, 3)).unwrap();
    assert_eq!(request.related_district, Some(district.id));

    let resolved = lifecycle::resolve(&mut store, request.id).unwrap();
    assert_eq!(resolved.status, RequestStatus::Resolved);
    assert_eq!(
        store.district_inventory(district.id).unwrap()["water - bottled"],
        2
    );

    let err = lifecycle::resolve(&mut store, request.id).unwrap_err();
    assert!(matches!(err, ReliefError::AlreadyResolved(_)));
    assert_eq!(
        store.district_inventory(district.id).unwrap()["water - bottled"],
        2
    );
}

#[test]
fn test_request_assigned_to_nearest_of_several_districts() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let _far = store.insert_district("Beylikduzu", 41.0014, 28.6419).unwrap();
    let near = store.insert_district("Pendik", 40.8775, 29.2513).unwrap();

    let request = lifecycle::submit(&mut store, water_request(40.88, 29.25, 1)).unwrap();
    assert_eq!(request.related_district, Some(near.id));

    let by_district = store.list_requests_by_district(near.id).unwrap();
    assert_eq!(by_district.len(), 1);
    assert_eq!(by_district[0].id, request.id);

    let view = store.district_view(near.id).unwrap();
    assert_eq!(view.request_count, 1);
}

/// Transfer of {"tents": 10} from a district holding 5 fails and mutates
/// neither side.
#[test]
fn test_transfer_insufficient_leaves_both_districts_untouched() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let source = store.insert_district("Fatih", 41.0186, 28.9396).unwrap();
    let target = store.insert_district("Sariyer", 41.1669, 29.0572).unwrap();
    store.adjust_inventory(source.id, "tents", 5).unwrap();

    let mut items = BTreeMap::new();
    items.insert("tents".to_string(), 10);

    let err = store
        .transfer_inventory(source.id, target.id, &items)
        .unwrap_err();
    assert!(matches!(err, ReliefError::InsufficientInventory { .. }));

    assert_eq!(store.district_inventory(source.id).unwrap()["tents"], 5);
    assert!(store.district_inventory(target.id).unwrap().is_empty());
}

#[test]
fn test_transfer_round_trip_restores_original_quantities() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    let a = store.insert_district("Uskudar", 41.0226, 29.0078).unwrap();
    let b = store.insert_district("Maltepe", 40.9357, 29.1569).unwrap();
    store.adjust_inventory(a.id, "food - canned", 8).unwrap();

    let mut items = BTreeMap::new();
    items.insert("food - canned".to_string(), 8);

    store.transfer_inventory(a.id, b.id, &items).unwrap();
    // Source row dropped at zero, target holds everything
    assert!(store.district_inventory(a.id).unwrap().is_empty());
    assert_eq!(store.district_inventory(b.id).unwrap()["food - canned"], 8);

    store.transfer_inventory(b.id, a.id, &items).unwrap();
    assert_eq!(store.district_inventory(a.id).unwrap()["food - canned"], 8);
    assert!(store.district_inventory(b.id).unwrap().is_empty());
}
