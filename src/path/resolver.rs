//! Slash-path navigation over JSON documents
//!
//! Paths are `/`-separated; empty segments are ignored, so leading and
//! trailing slashes are harmless. A segment addresses a map key, an array
//! index, or (for the wildcard routines only) `*`.

use crate::core::{MigrateError, Result};
use serde_json::Value as JsonValue;

/// Split a path into its non-empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|seg| !seg.is_empty()).collect()
}

pub fn has_wildcard(path: &str) -> bool {
    path.contains('*')
}

fn parse_index(segment: &str) -> Option<i64> {
    segment.parse().ok()
}

pub fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Look up the value at a non-wildcard path.
///
/// An absent map key, an out-of-range index, or a scalar in the middle of
/// the path all yield `Ok(None)`. A wildcard segment over an array and a
/// non-integer segment over an array are errors.
pub fn get_at_path<'a>(root: &'a JsonValue, path: &str) -> Result<Option<&'a JsonValue>> {
    let mut cur = root;
    for seg in split_path(path) {
        cur = match cur {
            JsonValue::Object(map) => match map.get(seg) {
                Some(next) => next,
                None => return Ok(None),
            },
            JsonValue::Array(items) => {
                if seg == "*" {
                    return Err(MigrateError::WildcardNotAllowed(path.to_string()));
                }
                match parse_index(seg) {
                    Some(idx) if idx >= 0 && (idx as usize) < items.len() => &items[idx as usize],
                    Some(_) => return Ok(None),
                    None => {
                        return Err(MigrateError::TypeMismatch(format!(
                            "array index expected at segment '{seg}'"
                        )));
                    }
                }
            }
            _ => return Ok(None),
        };
    }
    Ok(Some(cur))
}

/// Mutable variant of [`get_at_path`], same not-found and error semantics.
pub fn get_at_path_mut<'a>(
    root: &'a mut JsonValue,
    path: &str,
) -> Result<Option<&'a mut JsonValue>> {
    let mut cur = root;
    for seg in split_path(path) {
        cur = match cur {
            JsonValue::Object(map) => match map.get_mut(seg) {
                Some(next) => next,
                None => return Ok(None),
            },
            JsonValue::Array(items) => {
                if seg == "*" {
                    return Err(MigrateError::WildcardNotAllowed(path.to_string()));
                }
                match parse_index(seg) {
                    Some(idx) if idx >= 0 && (idx as usize) < items.len() => {
                        &mut items[idx as usize]
                    }
                    Some(_) => return Ok(None),
                    None => {
                        return Err(MigrateError::TypeMismatch(format!(
                            "array index expected at segment '{seg}'"
                        )));
                    }
                }
            }
            _ => return Ok(None),
        };
    }
    Ok(Some(cur))
}

/// Write `value` at a non-wildcard path.
///
/// Intermediate objects are created on demand for key segments. Arrays are
/// never created automatically, and an index segment must address an
/// existing element.
pub fn set_at_path(root: &mut JsonValue, path: &str, value: JsonValue) -> Result<()> {
    let segments = split_path(path);
    if segments.is_empty() {
        return Ok(());
    }
    set_segments(root, &segments, path, value)
}

fn set_segments(node: &mut JsonValue, segments: &[&str], full_path: &str, value: JsonValue) -> Result<()> {
    let seg = segments[0];
    let rest = &segments[1..];
    match node {
        JsonValue::Object(map) => {
            if rest.is_empty() {
                map.insert(seg.to_string(), value);
                return Ok(());
            }
            if parse_index(rest[0]).is_some() {
                // next hop is an array index, so the array must already exist
                match map.get_mut(seg) {
                    Some(next) => set_segments(next, rest, full_path, value),
                    None => Err(MigrateError::TypeMismatch(format!(
                        "cannot create array automatically for {full_path}"
                    ))),
                }
            } else {
                let next = map
                    .entry(seg.to_string())
                    .or_insert_with(|| JsonValue::Object(serde_json::Map::new()));
                set_segments(next, rest, full_path, value)
            }
        }
        JsonValue::Array(items) => {
            let Some(idx) = parse_index(seg) else {
                return Err(MigrateError::TypeMismatch(format!(
                    "expected array index at '{seg}'"
                )));
            };
            if idx < 0 || (idx as usize) >= items.len() {
                return Err(MigrateError::IndexOutOfRange(format!(
                    "index {idx} out of range at '{seg}'"
                )));
            }
            let slot = &mut items[idx as usize];
            if rest.is_empty() {
                *slot = value;
                Ok(())
            } else {
                set_segments(slot, rest, full_path, value)
            }
        }
        other => Err(MigrateError::TypeMismatch(format!(
            "cannot descend into {} at '{seg}'",
            json_type_name(other)
        ))),
    }
}

/// Remove the map key at the terminal segment of a non-wildcard path.
///
/// Absent keys and dead-end paths are silent no-ops. Index segments may be
/// traversed on the way down, but deleting an array element itself is not
/// supported.
pub fn delete_at_path(root: &mut JsonValue, path: &str) -> Result<()> {
    let segments = split_path(path);
    if segments.is_empty() {
        return Ok(());
    }
    delete_segments(root, &segments)
}

fn delete_segments(node: &mut JsonValue, segments: &[&str]) -> Result<()> {
    let seg = segments[0];
    let rest = &segments[1..];
    match node {
        JsonValue::Object(map) => {
            if rest.is_empty() {
                map.remove(seg);
                return Ok(());
            }
            match map.get_mut(seg) {
                Some(next) => delete_segments(next, rest),
                None => Ok(()),
            }
        }
        JsonValue::Array(items) => {
            let Some(idx) = parse_index(seg) else {
                return Err(MigrateError::TypeMismatch(format!(
                    "expected index at '{seg}'; array deletion unsupported"
                )));
            };
            if idx < 0 || (idx as usize) >= items.len() {
                return Ok(());
            }
            if rest.is_empty() {
                return Err(MigrateError::UnsupportedDeletion(seg.to_string()));
            }
            delete_segments(&mut items[idx as usize], rest)
        }
        _ => Ok(()),
    }
}

/// Expand every `*` segment against the document, depth-first, returning the
/// concrete paths that exist.
///
/// Intermediate segments descend into objects only. At the final position
/// both objects and arrays match; scalars never do. Result order follows map
/// iteration order and carries no meaning.
pub fn resolve_wildcard_paths(root: &JsonValue, path: &str) -> Vec<String> {
    let segments = split_path(path);
    let mut found = Vec::new();
    walk_wildcards(root, &segments, &mut Vec::new(), &mut found);
    found
}

fn walk_wildcards(
    node: &JsonValue,
    segments: &[&str],
    sofar: &mut Vec<String>,
    found: &mut Vec<String>,
) {
    if sofar.len() == segments.len() {
        found.push(sofar.join("/"));
        return;
    }
    let JsonValue::Object(map) = node else {
        return;
    };
    let seg = segments[sofar.len()];
    let at_last = sofar.len() + 1 == segments.len();
    if seg == "*" {
        for (key, value) in map {
            match value {
                JsonValue::Object(_) => {
                    sofar.push(key.clone());
                    walk_wildcards(value, segments, sofar, found);
                    sofar.pop();
                }
                JsonValue::Array(_) if at_last => {
                    sofar.push(key.clone());
                    found.push(sofar.join("/"));
                    sofar.pop();
                }
                _ => {}
            }
        }
    } else {
        match map.get(seg) {
            Some(value @ JsonValue::Object(_)) => {
                sofar.push(seg.to_string());
                walk_wildcards(value, segments, sofar, found);
                sofar.pop();
            }
            Some(JsonValue::Array(_)) if at_last => {
                sofar.push(seg.to_string());
                found.push(sofar.join("/"));
                sofar.pop();
            }
            _ => {}
        }
    }
}

/// Resolve a wildcard path and require every match to be an array.
///
/// A non-array match is a type error; zero matches is an error too, since a
/// `mapArray` step with nothing to transform is a broken migration.
pub fn find_array_paths(root: &JsonValue, path: &str) -> Result<Vec<String>> {
    let mut result = Vec::new();
    for concrete in resolve_wildcard_paths(root, path) {
        let Some(value) = get_at_path(root, &concrete)? else {
            continue;
        };
        match value {
            JsonValue::Array(_) => result.push(concrete),
            other => {
                return Err(MigrateError::TypeMismatch(format!(
                    "expected array at {concrete}, got {}",
                    json_type_name(other)
                )));
            }
        }
    }
    if result.is_empty() {
        return Err(MigrateError::PathNotFound(format!(
            "no arrays found at {path}"
        )));
    }
    Ok(result)
}
