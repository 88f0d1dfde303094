//! Motor configuration resolution

use std::collections::BTreeMap;

use lealtad::{
    motors::{CashbackConfig, MotorConfig, MotorFields, merge, resolve, resolve_all},
    programs::ProgramType,
};
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn object(value: Value) -> MotorFields {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn namespaced_cashback_round_trips() {
    let raw = json!({ "motors": { "cashback": { "porcentaje": 7 } } });

    assert_eq!(resolve(&raw, ProgramType::Cashback), object(json!({ "porcentaje": 7 })));
}

#[test]
fn merge_then_resolve_is_idempotent() {
    let raw = json!({ "nombre": "Club Café", "porcentaje": 3 });

    let updates = BTreeMap::from([
        (ProgramType::Cashback, object(json!({ "porcentaje": 7 }))),
        (ProgramType::Cupon, object(json!({ "vigencia_dias": 15 }))),
    ]);

    let once = merge(&raw, &updates);
    let twice = merge(&once, &resolve_all(&once));

    assert_eq!(once, twice);
    assert_eq!(once.get("nombre"), Some(&json!("Club Café")));
    assert_eq!(resolve(&once, ProgramType::Cashback), object(json!({ "porcentaje": 7 })));
}

#[test]
fn legacy_flat_fields_migrate() {
    let raw = json!({ "porcentaje": 10, "tope_mensual": 5000 });

    assert_eq!(
        resolve(&raw, ProgramType::Cashback),
        object(json!({ "porcentaje": 10, "tope_mensual": 5000 }))
    );
    assert_eq!(resolve(&raw, ProgramType::Sellos), MotorFields::new());
    assert_eq!(
        MotorConfig::resolve(&raw, ProgramType::Cashback),
        MotorConfig::Cashback(CashbackConfig {
            porcentaje: Some(Decimal::TEN),
            tope_mensual: Some(5_000),
        })
    );
}

#[test]
fn namespaced_wins_over_legacy() {
    let raw = json!({
        "porcentaje": 10,
        "motors": { "cashback": { "porcentaje": 4 } }
    });

    assert_eq!(resolve(&raw, ProgramType::Cashback), object(json!({ "porcentaje": 4 })));
}

#[test]
fn empty_namespace_falls_back_to_legacy() {
    let raw = json!({ "porcentaje": 10, "motors": { "cashback": {} } });

    assert_eq!(resolve(&raw, ProgramType::Cashback), object(json!({ "porcentaje": 10 })));
}

#[test]
fn malformed_input_degrades_to_empty() {
    for raw in [Value::Null, json!([1, 2]), json!("text"), json!({ "motors": 5 })] {
        for ty in ProgramType::ALL {
            assert!(resolve(&raw, ty).is_empty());
        }

        assert!(resolve_all(&raw).is_empty());
    }
}
