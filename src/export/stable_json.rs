//! Bitwise-stable JSON serialization: object keys sorted, compact
//! separators, non-ASCII characters escaped. Used for every output artifact
//! except `manifest.json`, which uses [`pretty_dumps`] instead.

use crate::export::error::ExportError;
use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::{Map, Value};
use std::io::Write;

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = map.into_iter().collect::<Vec<_>>();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = Map::new();
            for (key, val) in sorted {
                out.insert(key, canonicalize(val));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Formatter wrapping an inner formatter to ASCII-escape every non-ASCII
/// character in string fragments (`ensure_ascii=True` equivalent).
struct AsciiEscapingFormatter<F> {
    inner: F,
}

impl<F: Formatter> Formatter for AsciiEscapingFormatter<F> {
    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> std::io::Result<()> {
        for ch in fragment.chars() {
            if ch.is_ascii() {
                self.inner.write_string_fragment(writer, &ch.to_string())?;
            } else {
                let mut buf = [0u16; 2];
                for unit in ch.encode_utf16(&mut buf) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }

    fn write_char_escape<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        char_escape: serde_json::ser::CharEscape,
    ) -> std::io::Result<()> {
        self.inner.write_char_escape(writer, char_escape)
    }
}

/// Canonical form: sorted object keys, compact separators, ASCII-escaped —
/// the format for every JSONL record and report.
pub fn stable_dumps<T: Serialize>(value: &T) -> Result<String, ExportError> {
    let raw = serde_json::to_value(value)?;
    let canonical = canonicalize(raw);

    let mut buf = Vec::new();
    let formatter = AsciiEscapingFormatter {
        inner: CompactFormatter,
    };
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    canonical.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf).expect("formatter only emits valid UTF-8"))
}

/// Pretty form (`indent=2`, sorted keys): used only for `manifest.json`.
pub fn pretty_dumps<T: Serialize>(value: &T) -> Result<String, ExportError> {
    let raw = serde_json::to_value(value)?;
    let canonical = canonicalize(raw);

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    canonical.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf).expect("formatter only emits valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_keys_and_compacts() {
        let value = json!({"b": 1, "a": 2});
        assert_eq!(stable_dumps(&value).unwrap(), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn escapes_non_ascii() {
        let value = json!({"label": "café"});
        let dumped = stable_dumps(&value).unwrap();
        assert!(dumped.is_ascii());
        assert!(dumped.contains("\\u00e9"));
    }

    #[test]
    fn pretty_dumps_indents_with_two_spaces() {
        let value = json!({"a": 1});
        let dumped = pretty_dumps(&value).unwrap();
        assert_eq!(dumped, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn stable_dumps_is_deterministic_across_calls() {
        let value = json!({"z": 1, "a": {"y": 2, "b": 3}});
        assert_eq!(stable_dumps(&value).unwrap(), stable_dumps(&value).unwrap());
    }
}
