use proptest::prelude::*;
use serde_json::{json, Value};
use turbine_types::{CdcEnvelope, Record, RecordFormat, RecordsArray};

fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,11}"
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[ -~]{0,24}".prop_map(Value::from),
    ]
}

fn record(key: String, cdc: bool, id: i64) -> Record {
    if cdc {
        Record::cdc(
            key,
            CdcEnvelope::update(Some(json!({"id": id - 1})), json!({"id": id})),
        )
    } else {
        Record::raw(key, json!({"id": id}))
    }
}

proptest! {
    #[test]
    fn push_preserves_insertion_order(specs in prop::collection::vec((any::<bool>(), any::<i64>()), 0..32)) {
        let mut records = RecordsArray::new();
        for (i, (cdc, id)) in specs.iter().enumerate() {
            records.push(record(i.to_string(), *cdc, *id));
        }
        prop_assert_eq!(records.len(), specs.len());
        for (i, r) in records.iter().enumerate() {
            prop_assert_eq!(r.key(), i.to_string());
        }
    }

    #[test]
    fn unwrap_is_idempotent(specs in prop::collection::vec((any::<bool>(), any::<i64>()), 0..32)) {
        let mut once: RecordsArray = specs
            .iter()
            .enumerate()
            .map(|(i, (cdc, id))| record(i.to_string(), *cdc, *id))
            .collect();
        once.unwrap();
        let mut twice = once.clone();
        twice.unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.iter().all(|r| r.format() == RecordFormat::Raw));
    }

    #[test]
    fn unwrap_exposes_after_image(id in any::<i64>()) {
        let mut r = record("k".into(), true, id);
        r.unwrap();
        prop_assert_eq!(r.get("id").unwrap(), &json!(id));
    }

    #[test]
    fn set_then_get_returns_value(cdc in any::<bool>(), field in field_name(), value in scalar()) {
        let mut r = record("k".into(), cdc, 1);
        r.set(&field, value.clone()).unwrap();
        prop_assert_eq!(r.get(&field).unwrap(), &value);
    }

    #[test]
    fn nested_set_creates_intermediate_objects(parent in field_name(), child in field_name(), value in scalar()) {
        prop_assume!(parent != "id");
        let mut r = Record::raw("k", json!({"id": 1}));
        let path = format!("{parent}.{child}");
        r.set(&path, value.clone()).unwrap();
        prop_assert_eq!(r.get(&path).unwrap(), &value);
        prop_assert_eq!(r.get("id").unwrap(), &json!(1));
    }
}
