//! Syntax highlighting for JSON embedded in prose lines.

use crate::style::{Color, Rgb, Style};
use serde_json::Value;
use std::fmt::Write;

/// Colors JSON objects and arrays found inside a line.
///
/// Each `{`/`[` is matched to its closing bracket (string-aware) and the
/// candidate is parsed with `serde_json`. Candidates that fail to parse stay
/// as plain text. Key order is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonHighlighter {
    key: Style,
    string: Style,
    number: Style,
    boolean: Style,
    null: Style,
    bracket: Style,
    punctuation: Style,
}

impl Default for JsonHighlighter {
    /// One Dark palette.
    fn default() -> Self {
        Self {
            key: Style::fg(Color::Rgb(Rgb::new(198, 120, 221))),
            string: Style::fg(Color::Rgb(Rgb::new(152, 195, 121))),
            number: Style::fg(Color::Rgb(Rgb::new(209, 154, 102))),
            boolean: Style::fg(Color::Rgb(Rgb::new(86, 182, 194))),
            null: Style::fg(Color::Rgb(Rgb::new(92, 99, 112))),
            bracket: Style::fg(Color::Rgb(Rgb::new(224, 227, 236))),
            punctuation: Style::fg(Color::Rgb(Rgb::new(130, 137, 151))),
        }
    }
}

impl JsonHighlighter {
    /// Create a highlighter with the default palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight every JSON value in `line`.
    ///
    /// Returns `None` when the line holds nothing worth highlighting, so the
    /// caller can fall back to its regular formatting.
    pub fn highlight(&self, line: &str) -> Option<String> {
        let mut out = String::with_capacity(line.len() * 2);
        let mut plain_start = 0;
        let mut search = 0;
        let mut found = false;

        while let Some(offset) = line[search..].find(|c| c == '{' || c == '[') {
            let start = search + offset;
            let candidate = find_closing(line, start).and_then(|end| {
                serde_json::from_str::<Value>(&line[start..=end])
                    .ok()
                    .map(|value| (end, value))
            });

            match candidate {
                Some((end, value)) if worth_highlighting(&value) => {
                    out.push_str(&line[plain_start..start]);
                    self.write_value(&value, &mut out);
                    plain_start = end + 1;
                    search = end + 1;
                    found = true;
                }
                _ => search = start + 1,
            }
        }

        if !found {
            return None;
        }
        out.push_str(&line[plain_start..]);
        Some(out)
    }

    fn write_value(&self, value: &Value, out: &mut String) {
        match value {
            Value::Null => self.null.paint_into("null", out),
            Value::Bool(b) => self.boolean.paint_into(if *b { "true" } else { "false" }, out),
            Value::Number(n) => self.number.paint_into(&n.to_string(), out),
            Value::String(_) => self.string.paint_into(&value.to_string(), out),
            Value::Array(items) => {
                self.bracket.paint_into("[", out);
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.punctuation.paint_into(", ", out);
                    }
                    self.write_value(item, out);
                }
                self.bracket.paint_into("]", out);
            }
            Value::Object(map) => {
                self.bracket.paint_into("{", out);
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        self.punctuation.paint_into(", ", out);
                    }
                    let mut quoted = String::with_capacity(key.len() + 2);
                    let _ = write!(quoted, "{}", Value::String(key.clone()));
                    self.key.paint_into(&quoted, out);
                    self.punctuation.paint_into(": ", out);
                    self.write_value(item, out);
                }
                self.bracket.paint_into("}", out);
            }
        }
    }
}

/// Objects always; arrays unless they only hold numbers (`see [1]`).
fn worth_highlighting(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(|v| !v.is_number()),
        _ => false,
    }
}

/// Byte index of the bracket closing the one at `start`.
fn find_closing(s: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
