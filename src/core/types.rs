//! Migration data model
//!
//! A migration is a named, directed edge between two schema versions plus
//! the ordered list of edit steps that carries a document across that edge.
//! Migration definition files deserialize directly into these types, so the
//! serde attributes double as the file-format contract.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A version-to-version set of steps.
///
/// Identified by the `(from, to)` pair; the registry keeps the last
/// migration registered for a pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Migration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A single edit operation within a migration.
///
/// `reversible` controls reverse synthesis: `None` means "invert if the
/// operation kind supports it", `Some(false)` forces the step to be skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub op: StepOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversible: Option<bool>,
}

/// The operation performed by a step, tagged by `op` in the file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum StepOp {
    #[serde(rename = "move")]
    Move { from: String, to: String },

    #[serde(rename = "wrap")]
    Wrap {
        path: String,
        #[serde(rename = "wrapAs")]
        wrap_as: String,
    },

    #[serde(rename = "unwrap")]
    Unwrap {
        path: String,
        #[serde(rename = "unwrapTo")]
        unwrap_to: String,
    },

    #[serde(rename = "mapArray")]
    MapArray { path: String, rule: MapRule },

    #[serde(rename = "set")]
    Set { path: String, value: JsonValue },

    #[serde(rename = "delete")]
    Delete { path: String },
}

impl StepOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Wrap { .. } => "wrap",
            Self::Unwrap { .. } => "unwrap",
            Self::MapArray { .. } => "mapArray",
            Self::Set { .. } => "set",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Element transformation rule for `mapArray` steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MapRule {
    /// Turn each string element into a single-entry object. The key is the
    /// substring before the first separator occurrence (the whole string
    /// when no separator is set or it does not occur); the entry value
    /// defaults to `true`.
    StringToObject {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        separator: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<JsonValue>,
    },

    /// Turn each object element back into a string: the active key plus an
    /// optional suffix.
    ObjectToString {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suffix: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_migration_file() {
        let raw = json!({
            "name": "add_server_block",
            "from": "1.0",
            "to": "2.0",
            "steps": [
                {"op": "move", "from": "host", "to": "server/host"},
                {"op": "wrap", "path": "limits", "wrapAs": "hard"},
                {"op": "unwrap", "path": "a/b", "unwrapTo": "a"},
                {"op": "mapArray", "path": "features", "rule": {"stringToObject": {"separator": ":"}}},
                {"op": "set", "path": "version", "value": "2.0", "reversible": false},
                {"op": "delete", "path": "legacy"}
            ]
        })
        .to_string();

        let migration: Migration = serde_json::from_str(&raw).unwrap();
        assert_eq!(migration.name.as_deref(), Some("add_server_block"));
        assert_eq!(migration.from, "1.0");
        assert_eq!(migration.to, "2.0");
        assert_eq!(migration.steps.len(), 6);

        assert!(matches!(&migration.steps[0].op, StepOp::Move { from, to }
            if from == "host" && to == "server/host"));
        assert!(matches!(&migration.steps[3].op, StepOp::MapArray { rule, .. }
            if matches!(rule, MapRule::StringToObject { separator: Some(s), value: None } if s == ":")));
        assert_eq!(migration.steps[4].reversible, Some(false));
        assert_eq!(migration.steps[5].reversible, None);
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let raw = r#"{"from": "1.0", "to": "2.0", "steps": [{"op": "rename", "path": "x"}]}"#;
        assert!(serde_json::from_str::<Migration>(raw).is_err());
    }

    #[test]
    fn test_steps_default_to_empty() {
        let migration: Migration = serde_json::from_str(r#"{"from": "a", "to": "b"}"#).unwrap();
        assert!(migration.steps.is_empty());
        assert!(migration.name.is_none());
    }

    #[test]
    fn test_op_names() {
        let op = StepOp::MapArray {
            path: "x/*".into(),
            rule: MapRule::ObjectToString { suffix: None },
        };
        assert_eq!(op.name(), "mapArray");
        assert_eq!(StepOp::Delete { path: "x".into() }.name(), "delete");
    }
}
