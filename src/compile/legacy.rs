//! Carry-over of previous values the schema no longer produces

use serde_json::Value;

/// Copy every key of `legacy` missing from `values`, recursing into objects
///
/// Keys already present in `values` keep their computed value. Arrays are
/// never merged element by element.
pub fn backfill_legacy_values(values: &mut Value, legacy: &Value) {
    let (Value::Object(target), Value::Object(previous)) = (values, legacy) else {
        return;
    };
    for (key, previous_value) in previous {
        match target.get_mut(key) {
            Some(current) => backfill_legacy_values(current, previous_value),
            None => {
                tracing::debug!("keeping previous value for '{}'", key);
                target.insert(key.clone(), previous_value.clone());
            }
        }
    }
}
