use serde_json::Value;

/// Deep-merge a user configuration over a default configuration.
///
/// Policy, applied key-by-key:
/// - mapping + mapping → merge recursively
/// - sequence + sequence → concatenate, default items first (no dedup of
///   individual items; a user sequence already prefixed by the defaults is
///   kept as-is so merging a merged result changes nothing — which also
///   means a user list that deliberately repeats the exact default items at
///   its head is indistinguishable from a merged result and is not
///   prepended again)
/// - anything else (scalar, type mismatch, one-sided key) → the user value
///   wins when present, otherwise the default is kept
///
/// Pure function, no I/O. With `serde_json`'s `preserve_order` feature the
/// result iterates in first-insertion order, defaults first, so the same
/// inputs always render the same output.
pub fn merge_values(default: &Value, user: &Value) -> Value {
    match (default, user) {
        (Value::Object(d), Value::Object(u)) => {
            let mut out = serde_json::Map::new();
            for (key, d_val) in d {
                match u.get(key) {
                    Some(u_val) => out.insert(key.clone(), merge_values(d_val, u_val)),
                    None => out.insert(key.clone(), d_val.clone()),
                };
            }
            for (key, u_val) in u {
                if !out.contains_key(key) {
                    out.insert(key.clone(), u_val.clone());
                }
            }
            Value::Object(out)
        }
        (Value::Array(d), Value::Array(u)) => {
            // A user sequence that already begins with the default items is
            // an already-merged result; re-merging must not duplicate them.
            if u.len() >= d.len() && u[..d.len()] == d[..] {
                Value::Array(u.clone())
            } else {
                let mut out = d.clone();
                out.extend(u.iter().cloned());
                Value::Array(out)
            }
        }
        // absent user keys arrive as Null; keep the default
        (_, Value::Null) => default.clone(),
        // scalar or type mismatch: user wins
        (_, u) => u.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merging_empty_user_is_identity() {
        let default = crate::config::default_config();
        assert_eq!(merge_values(&default, &json!({})), default);
    }

    #[test]
    fn merge_is_idempotent_on_its_result() {
        let default = crate::config::default_config();
        let user = json!({
            "settings": {"app_name": "orders"},
            "dependencies": ["httpx"],
            "env": {"EXTRA": 1}
        });
        let once = merge_values(&default, &user);
        assert_eq!(merge_values(&default, &once), once);
    }

    #[test]
    fn user_sequence_prefixed_by_defaults_is_kept_as_is() {
        let merged = merge_values(
            &json!({"files": ["a", "b"]}),
            &json!({"files": ["a", "b", "c"]}),
        );
        assert_eq!(merged["files"], json!(["a", "b", "c"]));
    }

    #[test]
    fn repeated_merge_accumulates_sequences() {
        let default = crate::config::default_config();
        let user = json!({"dependencies": ["httpx"]});
        let once = merge_values(&default, &user);
        let twice = merge_values(&once, &user);
        let count = twice["dependencies"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|d| *d == &json!("httpx"))
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn sequences_concatenate_default_then_user() {
        let merged = merge_values(&json!({"files": ["a", "b"]}), &json!({"files": ["b", "c"]}));
        assert_eq!(merged["files"], json!(["a", "b", "b", "c"]));
    }

    #[test]
    fn nested_mappings_merge_recursively() {
        let merged = merge_values(
            &json!({"settings": {"app_name": "x", "app_version": "1"}}),
            &json!({"settings": {"app_name": "y"}}),
        );
        assert_eq!(merged["settings"]["app_name"], json!("y"));
        assert_eq!(merged["settings"]["app_version"], json!("1"));
    }

    #[test]
    fn type_mismatch_lets_user_win() {
        let merged = merge_values(&json!({"schema": {}}), &json!({"schema": "raw"}));
        assert_eq!(merged["schema"], json!("raw"));
    }

    #[test]
    fn null_user_value_keeps_default() {
        let merged = merge_values(&json!({"port": 8000}), &json!({"port": null}));
        assert_eq!(merged["port"], json!(8000));
    }

    #[test]
    fn insertion_order_is_defaults_first() {
        let merged = merge_values(&json!({"a": 1, "b": 2}), &json!({"c": 3, "b": 9}));
        let keys: Vec<&String> = merged.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }
}
