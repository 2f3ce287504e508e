//! Reverse migration synthesis
//!
//! A forward migration's steps are walked back-to-front and inverted one at
//! a time. Steps that carry no information to invert (`set`, `delete`) and
//! steps marked `reversible: false` are dropped; if nothing survives, the
//! migration stays one-directional.

use crate::core::{MapRule, MigrateError, Migration, Result, Step, StepOp};
use crate::path::split_path;
use serde_json::Value as JsonValue;

/// Derive a best-effort `to -> from` migration from a forward one.
pub fn generate_reverse(migration: &Migration) -> Result<Migration> {
    let mut steps = Vec::new();
    for step in migration.steps.iter().rev() {
        if step.reversible == Some(false) {
            continue;
        }
        if let Some(op) = invert_op(&step.op) {
            steps.push(Step {
                op,
                reversible: None,
            });
        }
    }
    if steps.is_empty() {
        return Err(MigrateError::ReverseSynthesisFailed(
            migration.from.clone(),
            migration.to.clone(),
        ));
    }
    Ok(Migration {
        name: migration.name.as_ref().map(|name| format!("{name}_reverse")),
        from: migration.to.clone(),
        to: migration.from.clone(),
        steps,
    })
}

fn invert_op(op: &StepOp) -> Option<StepOp> {
    match op {
        StepOp::Move { from, to } => Some(StepOp::Move {
            from: to.clone(),
            to: from.clone(),
        }),

        // wrap path=P wrapAs=K  =>  unwrap path=P/K unwrapTo=P
        StepOp::Wrap { path, wrap_as } => {
            let base = path.trim_end_matches('/');
            Some(StepOp::Unwrap {
                path: format!("{base}/{wrap_as}"),
                unwrap_to: base.to_string(),
            })
        }

        // unwrap path=P/K unwrapTo=P  =>  wrap path=P wrapAs=K
        StepOp::Unwrap { path, unwrap_to } => {
            let key = split_path(path).last()?.to_string();
            Some(StepOp::Wrap {
                path: unwrap_to.clone(),
                wrap_as: key,
            })
        }

        StepOp::MapArray { path, rule } => {
            let inverted = match rule {
                // the separator survives as a suffix so the string form can
                // be reassembled, fidelity is best-effort
                MapRule::StringToObject { separator, .. } => MapRule::ObjectToString {
                    suffix: separator.clone(),
                },
                MapRule::ObjectToString { suffix } => MapRule::StringToObject {
                    separator: suffix.clone(),
                    value: Some(JsonValue::Bool(true)),
                },
            };
            Some(StepOp::MapArray {
                path: path.clone(),
                rule: inverted,
            })
        }

        // nothing to reconstruct the prior value from
        StepOp::Set { .. } | StepOp::Delete { .. } => None,
    }
}
