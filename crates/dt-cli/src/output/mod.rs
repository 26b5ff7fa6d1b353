//! Response envelopes written to stdout.
//!
//! Every response is one compact JSON line: `{"ok":true,...}` on success,
//! `{"ok":false,"err":"..."}` on failure. Empty top-level values are dropped.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;

/// Containers searched, in order, for `--format lines`.
const LINE_CONTAINERS: &[&str] = &["items", "results", "entries", "phases", "decisions", "features"];
/// Fields tried on the first element to pick the emitted value.
const LINE_FIELDS: &[&str] = &["id", "path", "name"];

/// Render a success envelope for `value`.
///
/// Objects contribute their fields; arrays are wrapped as `items`; any other
/// value is wrapped as `value`.
pub fn render_success<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let payload = into_payload(serde_json::to_value(value)?);
    Ok(envelope(true, None, payload))
}

/// Render an error envelope with optional detail fields.
#[must_use]
pub fn render_error(message: &str, details: Map<String, Value>) -> String {
    envelope(false, Some(message), details)
}

/// Render one line of a streamed response (no `ok` field).
pub fn render_stream_line<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let payload = into_payload(serde_json::to_value(value)?);
    Ok(Value::Object(strip_empty(payload)).to_string())
}

/// Render `value` for `--format lines`, or `None` if no container matches.
pub fn render_lines<T: Serialize>(value: &T) -> anyhow::Result<Option<String>> {
    let payload = into_payload(serde_json::to_value(value)?);
    Ok(lines_from(&payload))
}

/// Print a success response in the requested format.
pub fn success<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Lines {
        if let Some(lines) = render_lines(value)? {
            println!("{lines}");
            return Ok(());
        }
    }
    println!("{}", render_success(value)?);
    Ok(())
}

/// Print an error envelope.
pub fn error(message: &str, details: Map<String, Value>) {
    println!("{}", render_error(message, details));
}

/// Print one streamed object.
pub fn stream_line<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", render_stream_line(value)?);
    Ok(())
}

fn into_payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Array(_) => Map::from_iter([("items".to_string(), value)]),
        other => Map::from_iter([("value".to_string(), other)]),
    }
}

fn envelope(ok: bool, err: Option<&str>, payload: Map<String, Value>) -> String {
    let mut out = Map::new();
    out.insert("ok".to_string(), Value::Bool(ok));
    if let Some(err) = err.filter(|e| !e.is_empty()) {
        out.insert("err".to_string(), Value::String(err.to_string()));
    }
    for (key, value) in strip_empty(payload) {
        if key != "ok" && key != "err" {
            out.insert(key, value);
        }
    }
    Value::Object(out).to_string()
}

/// Drop top-level null, `""`, `[]`, and `{}`. Zero and `false` are kept.
fn strip_empty(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter().filter(|(_, value)| !is_empty(value)).collect()
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn lines_from(payload: &Map<String, Value>) -> Option<String> {
    for key in LINE_CONTAINERS {
        let Some(Value::Array(items)) = payload.get(*key) else {
            continue;
        };
        let Some(Value::Object(first)) = items.first() else {
            continue;
        };
        let Some(field) = LINE_FIELDS.iter().find(|f| first.contains_key(**f)) else {
            continue;
        };

        let lines = items
            .iter()
            .filter_map(|item| item.get(*field))
            .filter_map(|value| match value {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect::<Vec<_>>();
        return Some(lines.join("\n"));
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;
    use serde_json::{Map, json};

    use super::{render_error, render_lines, render_stream_line, render_success};

    #[test]
    fn success_strips_empty_string() {
        let out = render_success(&json!({"a": "", "b": "x"})).unwrap();
        assert_eq!(out, r#"{"ok":true,"b":"x"}"#);
    }

    #[test]
    fn success_keeps_zero_and_false() {
        let out = render_success(&json!({
            "count": 0,
            "can_undo": false,
            "none": null,
            "list": [],
            "obj": {}
        }))
        .unwrap();
        assert_eq!(out, r#"{"ok":true,"count":0,"can_undo":false}"#);
    }

    #[test]
    fn success_only_strips_top_level() {
        let out = render_success(&json!({"restored": {"description": "", "status": "pending"}}))
            .unwrap();
        assert_eq!(
            out,
            r#"{"ok":true,"restored":{"description":"","status":"pending"}}"#
        );
    }

    #[test]
    fn success_preserves_struct_field_order() {
        #[derive(Serialize)]
        struct Reply {
            zeta: &'static str,
            alpha: u32,
        }
        let out = render_success(&Reply { zeta: "z", alpha: 1 }).unwrap();
        assert_eq!(out, r#"{"ok":true,"zeta":"z","alpha":1}"#);
    }

    #[test]
    fn arrays_are_wrapped_as_items() {
        let out = render_success(&vec!["a", "b"]).unwrap();
        assert_eq!(out, r#"{"ok":true,"items":["a","b"]}"#);
    }

    #[test]
    fn error_envelope_merges_details() {
        let mut details = Map::new();
        details.insert("kind".into(), json!("nothing_to_undo"));
        details.insert("hint".into(), json!(""));
        let out = render_error("nothing to undo", details);
        assert_eq!(
            out,
            r#"{"ok":false,"err":"nothing to undo","kind":"nothing_to_undo"}"#
        );
    }

    #[test]
    fn stream_line_has_no_envelope() {
        let out = render_stream_line(&json!({"id": 3, "safe": true, "err": null})).unwrap();
        assert_eq!(out, r#"{"id":3,"safe":true}"#);
        assert!(!out.contains('\n'));
    }

    #[test]
    fn lines_prefer_first_matching_container_and_field() {
        let data = json!({
            "entries": [
                {"id": 12, "action": "complete_phase"},
                {"id": 11, "action": "create_decision"}
            ],
            "count": 2
        });
        assert_eq!(render_lines(&data).unwrap().as_deref(), Some("12\n11"));

        let data = json!({"phases": [{"path": "phases/a.md"}, {"path": "phases/b.md"}]});
        assert_eq!(
            render_lines(&data).unwrap().as_deref(),
            Some("phases/a.md\nphases/b.md")
        );
    }

    #[test]
    fn lines_skip_non_scalar_values() {
        let data = json!({"items": [{"name": "lsp"}, {"name": true}, {"name": "parser"}]});
        assert_eq!(render_lines(&data).unwrap().as_deref(), Some("lsp\nparser"));
    }

    #[test]
    fn lines_fall_back_when_nothing_matches() {
        assert_eq!(render_lines(&json!({"can_undo": true})).unwrap(), None);
        assert_eq!(render_lines(&json!({"items": []})).unwrap(), None);
        assert_eq!(render_lines(&json!({"items": [{"title": "x"}]})).unwrap(), None);
    }
}
