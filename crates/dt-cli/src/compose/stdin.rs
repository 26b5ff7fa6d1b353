//! Piped JSON input.
//!
//! Accepts an array of objects, a single object, or an array of id strings,
//! so output from other tools can be fed straight into `dtk validate --stdin`
//! or `dtk history --stdin`.

use std::io::{IsTerminal, Read};

use anyhow::{Context, bail};
use serde_json::{Map, Value};

const ID_KEYS: &[&str] = &["id", "ID", "phase_id", "decision_id", "feature_id"];
const PATH_KEYS: &[&str] = &["path", "file_path", "phase_path", "spec_path"];

/// Parsed stdin payload, normalized to a list of objects.
#[derive(Debug, Clone, PartialEq)]
pub struct StdinInput {
    pub items: Vec<Map<String, Value>>,
}

/// Read all of stdin. Fails when stdin is a terminal or the input is empty.
pub fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let stdin = std::io::stdin();
    let is_terminal = stdin.is_terminal();
    read_piped(stdin.lock(), is_terminal)
}

fn read_piped(mut reader: impl Read, is_terminal: bool) -> anyhow::Result<Vec<u8>> {
    if is_terminal {
        bail!("no input from stdin (not a pipe)");
    }

    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .context("failed to read stdin")?;

    if data.trim_ascii().is_empty() {
        bail!("empty stdin");
    }
    Ok(data)
}

/// Parse piped JSON. Tries, in order: array of objects, single object,
/// array of strings (each becoming `{"id": s}`).
pub fn parse_stdin_json(data: &[u8]) -> anyhow::Result<StdinInput> {
    if let Ok(items) = serde_json::from_slice::<Vec<Map<String, Value>>>(data) {
        return Ok(StdinInput { items });
    }

    if let Ok(item) = serde_json::from_slice::<Map<String, Value>>(data) {
        return Ok(StdinInput { items: vec![item] });
    }

    if let Ok(ids) = serde_json::from_slice::<Vec<String>>(data) {
        let items = ids
            .into_iter()
            .map(|id| Map::from_iter([("id".to_string(), Value::String(id))]))
            .collect();
        return Ok(StdinInput { items });
    }

    bail!("invalid JSON: must be object, array of objects, or array of strings")
}

/// Read and parse stdin in one step.
pub fn read_and_parse_stdin() -> anyhow::Result<StdinInput> {
    let data = read_stdin()?;
    parse_stdin_json(&data)
}

/// First non-empty id per item, trying the id aliases in order.
#[must_use]
pub fn extract_ids(input: &StdinInput) -> Vec<String> {
    input
        .items
        .iter()
        .filter_map(|item| first_text(item, ID_KEYS))
        .collect()
}

/// First non-empty path per item, trying the path aliases in order.
#[must_use]
pub fn extract_paths(input: &StdinInput) -> Vec<String> {
    input
        .items
        .iter()
        .filter_map(|item| first_text(item, PATH_KEYS))
        .collect()
}

/// Non-empty values of `field` across all items.
#[must_use]
pub fn extract_field(input: &StdinInput, field: &str) -> Vec<String> {
    input
        .items
        .iter()
        .filter_map(|item| first_text(item, &[field]))
        .collect()
}

/// Strings are taken verbatim; integers in decimal (audit ids are numeric).
fn first_text(item: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match item.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn string_array_becomes_id_items() {
        let input = parse_stdin_json(br#"["a","b"]"#).unwrap();
        assert_eq!(input.items.len(), 2);
        assert_eq!(extract_ids(&input), vec!["a", "b"]);
    }

    #[test]
    fn single_object_is_one_item() {
        let input = parse_stdin_json(br#"{"decision_id":"DEC-1","path":"x.md"}"#).unwrap();
        assert_eq!(input.items.len(), 1);
        assert_eq!(extract_ids(&input), vec!["DEC-1"]);
        assert_eq!(extract_paths(&input), vec!["x.md"]);
    }

    #[test]
    fn id_aliases_apply_in_order_and_skip_missing() {
        let input = parse_stdin_json(
            br#"[{"ID":"upper","phase_id":"ignored"},{"name":"none"},{"id":"","feature_id":"f-2"},{"id":14}]"#,
        )
        .unwrap();
        assert_eq!(extract_ids(&input), vec!["upper", "f-2", "14"]);
    }

    #[test]
    fn path_aliases_and_field_extraction() {
        let input = parse_stdin_json(
            br#"[{"spec_path":"docs/a.md","name":"a"},{"file_path":"src/b.rs","name":"b"},{"name":""}]"#,
        )
        .unwrap();
        assert_eq!(extract_paths(&input), vec!["docs/a.md", "src/b.rs"]);
        assert_eq!(extract_field(&input, "name"), vec!["a", "b"]);
    }

    #[test]
    fn piped_input_is_read_whole() {
        let data = read_piped(&b"[\"a\"]\n"[..], false).unwrap();
        assert_eq!(data, b"[\"a\"]\n");
    }

    #[test]
    fn blank_pipe_is_rejected() {
        let cases: [&[u8]; 2] = [b"", b"  \n\t"];
        for raw in cases {
            let err = read_piped(raw, false).unwrap_err();
            assert_eq!(err.to_string(), "empty stdin");
        }
    }

    #[test]
    fn terminal_is_rejected_without_reading() {
        let err = read_piped(&b"[\"a\"]"[..], true).unwrap_err();
        assert_eq!(err.to_string(), "no input from stdin (not a pipe)");
    }

    #[test]
    fn rejects_other_shapes() {
        let cases: [&[u8]; 4] = [b"42", b"[1,2]", b"not json", br#"[{"id":"a"},"b"]"#];
        for raw in cases {
            let err = parse_stdin_json(raw).unwrap_err();
            assert!(err.to_string().starts_with("invalid JSON"), "{err}");
        }
    }
}
