//! Motor Configuration
//!
//! A program's `config` column is a single JSON object. Current rows keep one
//! object per program type under the `motors` key:
//!
//! ```json
//! { "motors": { "cashback": { "porcentaje": 7 } }, "nombre": "Club" }
//! ```
//!
//! Rows written before the namespaced layout carry the same fields flat at the
//! top level. Resolution prefers the namespaced object and falls back to a
//! fixed whitelist of legacy keys per type. None of these functions fail:
//! anything malformed resolves to an empty object.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::programs::ProgramType;

mod lenient;
pub mod variants;

pub use variants::*;

/// Top-level key holding the per-type namespace.
pub const MOTORS_KEY: &str = "motors";

/// A resolved configuration object for one program type.
pub type MotorFields = Map<String, Value>;

/// Legacy top-level keys that belonged to each program type before migration.
#[must_use]
pub const fn legacy_keys(ty: ProgramType) -> &'static [&'static str] {
    match ty {
        ProgramType::Sellos => &[],
        ProgramType::Cashback => &["porcentaje", "tope_mensual"],
        ProgramType::Multipase => &["usos_totales", "precio", "vigencia_dias"],
        ProgramType::Membresia => &["precio_mensual", "beneficios", "duracion_dias"],
        ProgramType::Descuento => &["niveles"],
        ProgramType::Cupon => &["descuento_porcentaje", "descuento_monto", "vigencia_dias"],
        ProgramType::Regalo => &["montos", "vigencia_dias"],
        ProgramType::Afiliacion => &["beneficio", "requiere_aprobacion"],
    }
}

/// Effective configuration for `ty`.
///
/// Returns `raw.motors[ty]` verbatim when it is a non-empty object, otherwise
/// the legacy whitelist for `ty` picked from the top level of `raw`.
pub fn resolve(raw: &Value, ty: ProgramType) -> MotorFields {
    match namespaced(raw, ty) {
        Some(fields) => fields.clone(),
        None => legacy_fields(raw, ty),
    }
}

/// Effective configuration for every program type that resolves to something.
pub fn resolve_all(raw: &Value) -> BTreeMap<ProgramType, MotorFields> {
    ProgramType::ALL
        .into_iter()
        .map(|ty| (ty, resolve(raw, ty)))
        .filter(|(_, fields)| !fields.is_empty())
        .collect()
}

/// Replace the whole `motors` namespace with `updates`.
///
/// Every other top-level key of `raw` is preserved, including legacy flat
/// fields; they stay shadowed for any type present in `updates`.
pub fn merge(raw: &Value, updates: &BTreeMap<ProgramType, MotorFields>) -> Value {
    let mut config = raw.as_object().cloned().unwrap_or_default();

    let motors = updates
        .iter()
        .map(|(ty, fields)| (ty.as_str().to_string(), Value::Object(fields.clone())))
        .collect::<Map<_, _>>();

    config.insert(MOTORS_KEY.to_string(), Value::Object(motors));

    Value::Object(config)
}

fn namespaced(raw: &Value, ty: ProgramType) -> Option<&MotorFields> {
    raw.get(MOTORS_KEY)?
        .get(ty.as_str())?
        .as_object()
        .filter(|fields| !fields.is_empty())
}

fn legacy_fields(raw: &Value, ty: ProgramType) -> MotorFields {
    let Some(top_level) = raw.as_object() else {
        return MotorFields::new();
    };

    legacy_keys(ty)
        .iter()
        .filter_map(|key| {
            top_level
                .get(*key)
                .filter(|value| !value.is_null())
                .map(|value| ((*key).to_string(), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> MotorFields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn namespaced_config_is_returned_verbatim() {
        let raw = json!({ "motors": { "cashback": { "porcentaje": 7 } } });

        assert_eq!(
            resolve(&raw, ProgramType::Cashback),
            fields(json!({ "porcentaje": 7 }))
        );
    }

    #[test]
    fn legacy_flat_fields_are_picked_by_whitelist() {
        let raw = json!({ "porcentaje": 10, "tope_mensual": 5000, "nombre": "Club" });

        assert_eq!(
            resolve(&raw, ProgramType::Cashback),
            fields(json!({ "porcentaje": 10, "tope_mensual": 5000 }))
        );
        assert!(resolve(&raw, ProgramType::Sellos).is_empty());
    }

    #[test]
    fn namespaced_wins_over_legacy_when_both_present() {
        let raw = json!({
            "porcentaje": 10,
            "motors": { "cashback": { "porcentaje": 3 } }
        });

        assert_eq!(
            resolve(&raw, ProgramType::Cashback),
            fields(json!({ "porcentaje": 3 }))
        );
    }

    #[test]
    fn empty_namespaced_object_falls_back_to_legacy() {
        let raw = json!({ "porcentaje": 10, "motors": { "cashback": {} } });

        assert_eq!(
            resolve(&raw, ProgramType::Cashback),
            fields(json!({ "porcentaje": 10 }))
        );
    }

    #[test]
    fn malformed_input_degrades_to_empty() {
        for raw in [
            Value::Null,
            json!("config"),
            json!([1, 2, 3]),
            json!({ "motors": "nope" }),
            json!({ "motors": { "cashback": 12 } }),
        ] {
            assert!(resolve(&raw, ProgramType::Cashback).is_empty(), "{raw}");
        }
    }

    #[test]
    fn null_legacy_values_are_skipped() {
        let raw = json!({ "porcentaje": null, "tope_mensual": 900 });

        assert_eq!(
            resolve(&raw, ProgramType::Cashback),
            fields(json!({ "tope_mensual": 900 }))
        );
    }

    #[test]
    fn resolve_all_omits_empty_types() {
        let raw = json!({
            "vigencia_dias": 30,
            "motors": { "cashback": { "porcentaje": 5 } }
        });

        let resolved = resolve_all(&raw);

        assert_eq!(
            resolved.keys().copied().collect::<Vec<_>>(),
            vec![
                ProgramType::Cashback,
                ProgramType::Multipase,
                ProgramType::Cupon,
                ProgramType::Regalo,
            ]
        );
    }

    #[test]
    fn merge_replaces_namespace_and_keeps_other_keys() {
        let raw = json!({
            "nombre": "Club",
            "motors": { "cupon": { "descuento_monto": 1000 } }
        });

        let updates = BTreeMap::from([(ProgramType::Cashback, fields(json!({ "porcentaje": 7 })))]);

        let merged = merge(&raw, &updates);

        assert_eq!(
            merged,
            json!({ "nombre": "Club", "motors": { "cashback": { "porcentaje": 7 } } })
        );
    }

    #[test]
    fn merge_then_resolve_is_idempotent() {
        let raw = json!({ "porcentaje": 10, "tope_mensual": 5000, "usos_totales": 8 });

        let once = merge(&raw, &resolve_all(&raw));
        let twice = merge(&once, &resolve_all(&once));

        assert_eq!(once, twice);
        assert_eq!(resolve_all(&once), resolve_all(&raw));
    }

    #[test]
    fn merge_on_non_object_starts_fresh() {
        let updates = BTreeMap::from([(ProgramType::Regalo, fields(json!({ "montos": [5000] })))]);

        assert_eq!(
            merge(&Value::Null, &updates),
            json!({ "motors": { "regalo": { "montos": [5000] } } })
        );
    }
}
