//! Step execution
//!
//! One handler per operation kind, all mutating the document in place. The
//! engine adds step-ordinal context to any error returned from here.

use crate::core::{MapRule, MigrateError, Result, Step, StepOp};
use crate::path::{
    delete_at_path, find_array_paths, get_at_path, get_at_path_mut, has_wildcard, json_type_name,
    set_at_path,
};
use serde_json::Value as JsonValue;

/// Apply a single step to the document.
pub fn apply_step(doc: &mut JsonValue, step: &Step) -> Result<()> {
    match &step.op {
        StepOp::Move { from, to } => {
            if has_wildcard(from) || has_wildcard(to) {
                return Err(MigrateError::WildcardNotAllowed(format!(
                    "move: from='{from}' to='{to}'"
                )));
            }
            let value = get_at_path(doc, from)?
                .cloned()
                .ok_or_else(|| MigrateError::PathNotFound(format!("move: source {from}")))?;
            // write before delete so a sibling destination is safe
            set_at_path(doc, to, value)?;
            delete_at_path(doc, from)
        }

        StepOp::Wrap { path, wrap_as } => {
            if has_wildcard(path) {
                return Err(MigrateError::WildcardNotAllowed(format!("wrap: {path}")));
            }
            let value = get_at_path(doc, path)?
                .cloned()
                .ok_or_else(|| MigrateError::PathNotFound(format!("wrap: {path}")))?;
            let mut wrapped = serde_json::Map::new();
            wrapped.insert(wrap_as.clone(), value);
            set_at_path(doc, path, JsonValue::Object(wrapped))
        }

        StepOp::Unwrap { path, unwrap_to } => {
            if has_wildcard(path) || has_wildcard(unwrap_to) {
                return Err(MigrateError::WildcardNotAllowed(format!(
                    "unwrap: path='{path}' unwrapTo='{unwrap_to}'"
                )));
            }
            // the original path is left in place; migrations pair this with
            // an explicit delete when cleanup is wanted
            let value = get_at_path(doc, path)?
                .cloned()
                .ok_or_else(|| MigrateError::PathNotFound(format!("unwrap: source {path}")))?;
            set_at_path(doc, unwrap_to, value)
        }

        StepOp::MapArray { path, rule } => {
            for array_path in find_array_paths(doc, path)? {
                let Some(JsonValue::Array(items)) = get_at_path_mut(doc, &array_path)? else {
                    continue;
                };
                for item in items.iter_mut() {
                    let transformed = apply_item_rule(item, rule)?;
                    *item = transformed;
                }
            }
            Ok(())
        }

        StepOp::Set { path, value } => {
            if has_wildcard(path) {
                return Err(MigrateError::WildcardNotAllowed(format!("set: {path}")));
            }
            set_at_path(doc, path, value.clone())
        }

        StepOp::Delete { path } => {
            if has_wildcard(path) {
                return Err(MigrateError::WildcardNotAllowed(format!("delete: {path}")));
            }
            delete_at_path(doc, path)
        }
    }
}

fn apply_item_rule(item: &JsonValue, rule: &MapRule) -> Result<JsonValue> {
    match rule {
        MapRule::StringToObject { separator, value } => {
            let JsonValue::String(s) = item else {
                return Err(MigrateError::TypeMismatch(format!(
                    "stringToObject: expected string, got {}",
                    json_type_name(item)
                )));
            };
            let key = match separator {
                Some(sep) if !sep.is_empty() => match s.find(sep.as_str()) {
                    Some(pos) => &s[..pos],
                    None => s.as_str(),
                },
                _ => s.as_str(),
            };
            let entry_value = value.clone().unwrap_or(JsonValue::Bool(true));
            let mut obj = serde_json::Map::new();
            obj.insert(key.to_string(), entry_value);
            Ok(JsonValue::Object(obj))
        }

        MapRule::ObjectToString { suffix } => {
            let JsonValue::Object(map) = item else {
                return Err(MigrateError::TypeMismatch(format!(
                    "objectToString: expected object, got {}",
                    json_type_name(item)
                )));
            };
            // active key: first entry that is boolean true or non-boolean
            // non-null; an object with no such entry yields the bare suffix
            let key = map
                .iter()
                .find_map(|(k, v)| match v {
                    JsonValue::Bool(flag) => flag.then_some(k.as_str()),
                    JsonValue::Null => None,
                    _ => Some(k.as_str()),
                })
                .unwrap_or("");
            let suffix = suffix.as_deref().unwrap_or("");
            Ok(JsonValue::String(format!("{key}{suffix}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(op: StepOp) -> Step {
        Step {
            op,
            reversible: None,
        }
    }

    #[test]
    fn test_string_to_object_rule() {
        let rule = MapRule::StringToObject {
            separator: Some(":".into()),
            value: None,
        };
        assert_eq!(
            apply_item_rule(&json!("a:1"), &rule).unwrap(),
            json!({"a": true})
        );
        // no separator occurrence keeps the whole string as key
        assert_eq!(
            apply_item_rule(&json!("plain"), &rule).unwrap(),
            json!({"plain": true})
        );

        let rule = MapRule::StringToObject {
            separator: None,
            value: Some(json!("on")),
        };
        assert_eq!(
            apply_item_rule(&json!("a:1"), &rule).unwrap(),
            json!({"a:1": "on"})
        );

        assert!(matches!(
            apply_item_rule(&json!(42), &rule),
            Err(MigrateError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_object_to_string_rule() {
        let rule = MapRule::ObjectToString {
            suffix: Some(":enabled".into()),
        };
        assert_eq!(
            apply_item_rule(&json!({"feat": true}), &rule).unwrap(),
            json!("feat:enabled")
        );
        // boolean false entries are not active
        assert_eq!(
            apply_item_rule(&json!({"feat": false}), &rule).unwrap(),
            json!(":enabled")
        );
        // non-boolean non-null entries qualify
        assert_eq!(
            apply_item_rule(&json!({"feat": "x"}), &rule).unwrap(),
            json!("feat:enabled")
        );
        // null entries do not
        assert_eq!(
            apply_item_rule(&json!({"feat": null}), &rule).unwrap(),
            json!(":enabled")
        );

        assert!(matches!(
            apply_item_rule(&json!("str"), &rule),
            Err(MigrateError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_map_array_over_wildcard_paths() {
        let mut doc = json!({
            "envs": {
                "prod": {"flags": ["a:1", "b:2"]},
                "dev": {"flags": ["c"]}
            }
        });
        let st = step(StepOp::MapArray {
            path: "envs/*/flags".into(),
            rule: MapRule::StringToObject {
                separator: Some(":".into()),
                value: None,
            },
        });
        apply_step(&mut doc, &st).unwrap();
        assert_eq!(
            doc,
            json!({
                "envs": {
                    "prod": {"flags": [{"a": true}, {"b": true}]},
                    "dev": {"flags": [{"c": true}]}
                }
            })
        );
    }

    #[test]
    fn test_map_array_requires_arrays() {
        let mut doc = json!({"envs": {"prod": {"flags": {"a": 1}}}});
        let st = step(StepOp::MapArray {
            path: "envs/*/flags".into(),
            rule: MapRule::ObjectToString { suffix: None },
        });
        assert!(matches!(
            apply_step(&mut doc, &st),
            Err(MigrateError::TypeMismatch(_))
        ));

        // a scalar at the final position never matches the wildcard at all
        let mut doc = json!({"envs": {"prod": {"flags": "not-an-array"}}});
        let st = step(StepOp::MapArray {
            path: "envs/*/flags".into(),
            rule: MapRule::ObjectToString { suffix: None },
        });
        assert!(matches!(
            apply_step(&mut doc, &st),
            Err(MigrateError::PathNotFound(_))
        ));
    }

    #[test]
    fn test_wildcards_forbidden_outside_map_array() {
        let mut doc = json!({"a": 1});
        let cases = [
            StepOp::Move {
                from: "*/x".into(),
                to: "y".into(),
            },
            StepOp::Wrap {
                path: "a/*".into(),
                wrap_as: "k".into(),
            },
            StepOp::Unwrap {
                path: "a".into(),
                unwrap_to: "b/*".into(),
            },
            StepOp::Set {
                path: "*".into(),
                value: json!(1),
            },
            StepOp::Delete { path: "a/*".into() },
        ];
        for op in cases {
            assert!(
                matches!(
                    apply_step(&mut doc, &step(op.clone())),
                    Err(MigrateError::WildcardNotAllowed(_))
                ),
                "expected wildcard rejection for {}",
                op.name()
            );
        }
    }
}
