//! Translation of declaration values into template intrinsics.
//!
//! | value | same topology | same region | other region |
//! |-------|---------------|-------------|--------------|
//! | `Ref` attribute | `{"Ref": id}` | `Fn::ImportValue` | parameter `Ref` |
//! | other attribute | `Fn::GetAtt` | `Fn::ImportValue` | parameter `Ref` |
//!
//! Joins whose parts are all literal collapse to a plain string. A list join
//! passes the list attribute itself as the second `Fn::Join` argument.

use serde_json::{Map, Value as Json, json};

use tierstack_core::domain::{Reference, Value, entities::resources::attr};

/// Parameter path under which a cross-region export is published.
pub fn parameter_path(reference: &Reference) -> String {
    format!(
        "/tierstack/exports/{}/{}/{}",
        reference.topology, reference.resource, reference.attribute
    )
}

/// Logical name of the parameter a consumer reads a cross-region value from.
pub fn parameter_name(reference: &Reference) -> String {
    format!(
        "Import{}{}{}",
        reference.topology,
        reference.resource,
        alphanumeric(&reference.attribute)
    )
}

/// Logical name of the output that publishes a same-region export.
pub fn export_output_name(reference: &Reference) -> String {
    format!(
        "ExportsOutput{}{}",
        reference.resource,
        alphanumeric(&reference.attribute)
    )
}

pub fn alphanumeric(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// A reference as seen from inside `consumer`.
pub fn reference(r: &Reference, consumer: &str) -> Json {
    if r.topology == consumer {
        local(r)
    } else if r.cross_region {
        json!({ "Ref": parameter_name(r) })
    } else {
        json!({ "Fn::ImportValue": r.export_key() })
    }
}

/// A reference as seen from inside its own topology.
pub fn local(r: &Reference) -> Json {
    if r.attribute == attr::REF {
        json!({ "Ref": r.resource.as_str() })
    } else {
        json!({ "Fn::GetAtt": [r.resource.as_str(), r.attribute] })
    }
}

pub fn value(v: &Value, consumer: &str) -> Json {
    match v {
        Value::Literal(s) => Json::String(s.clone()),
        Value::Ref(r) => reference(r, consumer),
        Value::Join { separator, parts } => {
            let parts: Vec<Json> = parts.iter().map(|p| value(p, consumer)).collect();
            let literal: Option<Vec<&str>> = parts.iter().map(Json::as_str).collect();
            match literal {
                Some(strings) => Json::String(strings.join(separator)),
                None => json!({ "Fn::Join": [separator, parts] }),
            }
        }
        Value::JoinList { separator, list } => {
            json!({ "Fn::Join": [separator, value(list, consumer)] })
        }
    }
}

/// Rewrite a serialized declaration: embedded `Value`s become intrinsics and
/// `null` properties are dropped.
pub fn resolve(json: Json, consumer: &str) -> Json {
    match json {
        Json::Object(map) => {
            if let Some(v) = as_value(&map) {
                return value(&v, consumer);
            }
            let resolved: Map<String, Json> = map
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, resolve(v, consumer)))
                .collect();
            Json::Object(resolved)
        }
        Json::Array(items) => {
            Json::Array(items.into_iter().map(|v| resolve(v, consumer)).collect())
        }
        other => other,
    }
}

fn as_value(map: &Map<String, Json>) -> Option<Value> {
    let is_tagged = map.len() == 1
        && map
            .keys()
            .all(|k| matches!(k.as_str(), "literal" | "ref" | "join" | "joinList"));
    if !is_tagged {
        return None;
    }
    serde_json::from_value(Json::Object(map.clone())).ok()
}
