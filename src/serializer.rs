//! The on-disk text format.
//!
//! The output is not what `serde_json::to_string_pretty` would produce: only
//! the outermost level is laid out (one entry per line, tab indented), and
//! every nested value is written as single-line compact JSON. Existing files
//! rely on that layout, so keep it byte-for-byte.

use serde_json::{Map, Value};

/// Turns a mapping or a sequence into its file text, pretty or compact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Compact output: everything on one line, no spaces after `:`.
    pub fn new() -> Self {
        Self::default()
    }

    /// One top-level entry per line, indented with a single tab.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Pick the mode from a flag.
    pub fn with_pretty(pretty: bool) -> Self {
        Self { pretty }
    }

    /// `true` for the indented layout.
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Encode a mapping as a JSON object, keys in iteration order.
    /// An empty mapping is always `{}`.
    pub fn serialize_map(&self, map: &Map<String, Value>) -> String {
        let colon = if self.pretty { ": " } else { ":" };
        self.wrap(
            '{',
            '}',
            map.iter().map(|(key, value)| {
                let mut entry = Value::String(key.clone()).to_string();
                entry.push_str(colon);
                entry.push_str(&value.to_string());
                entry
            }),
        )
    }

    /// Encode a sequence as a JSON array. An empty sequence is always `[]`.
    pub fn serialize_seq(&self, items: &[Value]) -> String {
        self.wrap('[', ']', items.iter().map(Value::to_string))
    }

    fn wrap<I>(&self, open: char, close: char, entries: I) -> String
    where
        I: Iterator<Item = String>,
    {
        let mut out = String::new();
        out.push(open);
        let mut any = false;
        for entry in entries {
            if any {
                out.push(',');
            }
            if self.pretty {
                out.push_str("\n\t");
            }
            out.push_str(&entry);
            any = true;
        }
        if any && self.pretty {
            out.push('\n');
        }
        out.push(close);
        out
    }
}
