use serde_json::Value;

/// Collapse a joined relation to at most one object.
///
/// PostgREST returns an embedded resource either as an object or as an array
/// depending on how it infers the foreign key cardinality. Rows leaving the
/// data-access layer always carry an object or `null` under `relation`.
pub fn normalize_relation(mut row: Value, relation: &str) -> Value {
    if let Some(fields) = row.as_object_mut() {
        let normalized = match fields.remove(relation) {
            Some(Value::Array(items)) => items.into_iter().find(Value::is_object).unwrap_or(Value::Null),
            Some(object @ Value::Object(_)) => object,
            _ => Value::Null,
        };
        fields.insert(relation.to_string(), normalized);
    }
    row
}
