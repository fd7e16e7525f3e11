//! Line-oriented rendering of native syntax with aligned assignments.
//!
//! Objects open a new indentation level and are written one attribute per
//! line; lists stay on the current line. Consecutive single-line
//! assignments at the same depth have their `=` aligned. A line that opens
//! a multi-line object, a comment, a closing brace or a blank line ends the
//! run.

use crate::value::{Value, is_identifier};

const INDENT: &str = "  ";

#[derive(Debug, Default)]
struct Line {
    depth: usize,
    key: Option<String>,
    text: String,
    /// The line ends inside an unclosed `{`.
    opens: bool,
}

impl Line {
    fn keyed(depth: usize, key: String) -> Self {
        Self {
            depth,
            key: Some(key),
            ..Self::default()
        }
    }

    fn plain(depth: usize, text: impl Into<String>) -> Self {
        Self {
            depth,
            text: text.into(),
            ..Self::default()
        }
    }

    const fn aligns(&self) -> bool {
        self.key.is_some() && !self.opens
    }
}

/// A document being built line by line.
#[derive(Debug, Default)]
pub(crate) struct Document {
    lines: Vec<Line>,
    current: Option<Line>,
}

impl Document {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends an empty line.
    pub(crate) fn blank(&mut self) {
        self.start(Line::default());
    }

    /// Appends a `# text` comment line.
    pub(crate) fn comment(&mut self, depth: usize, text: &str) {
        self.start(Line::plain(depth, format!("# {text}")));
    }

    /// Appends a line of literal text.
    pub(crate) fn plain(&mut self, depth: usize, text: impl Into<String>) {
        self.start(Line::plain(depth, text));
    }

    /// Appends a line that opens a block body, such as a block header.
    pub(crate) fn open(&mut self, depth: usize, text: impl Into<String>) {
        self.start(Line {
            opens: true,
            ..Line::plain(depth, text)
        });
    }

    /// Appends `name = value` at `depth`.
    pub(crate) fn attribute(&mut self, depth: usize, name: &str, value: &Value) {
        self.start(Line::keyed(depth, name.to_owned()));
        self.value(value);
    }

    fn start(&mut self, line: Line) {
        if let Some(done) = self.current.replace(line) {
            self.lines.push(done);
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(line) = self.current.as_mut() {
            line.text.push_str(text);
        } else {
            self.current = Some(Line::plain(0, text));
        }
    }

    fn value(&mut self, value: &Value) {
        match value {
            Value::List(items) => {
                self.text("[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.text(", ");
                    }
                    self.value(item);
                }
                self.text("]");
            }
            Value::Object(map) if !map.is_empty() => {
                self.text("{");
                let depth = self.current.as_mut().map_or(0, |line| {
                    line.opens = true;
                    line.depth
                });
                for (key, item) in map {
                    self.start(Line::keyed(depth + 1, object_key(key)));
                    self.value(item);
                }
                self.start(Line::plain(depth, "}"));
            }
            Value::Object(_) => self.text("{}"),
            scalar => {
                let text = scalar_text(scalar).unwrap_or_default();
                self.text(&text);
            }
        }
    }

    /// Renders every line with a trailing newline.
    pub(crate) fn finish(mut self) -> String {
        if let Some(done) = self.current.take() {
            self.lines.push(done);
        }
        let widths = key_widths(&self.lines);
        let mut out = String::new();
        for (line, width) in self.lines.iter().zip(widths) {
            if line.key.is_none() && line.text.is_empty() {
                out.push('\n');
                continue;
            }
            out.push_str(&INDENT.repeat(line.depth));
            if let Some(key) = &line.key {
                out.push_str(&format!("{key:<width$} = "));
            }
            out.push_str(&line.text);
            out.push('\n');
        }
        out
    }
}

/// Pads the keys of each aligned run to the run's widest key.
fn key_widths(lines: &[Line]) -> Vec<usize> {
    lines
        .chunk_by(|a, b| a.aligns() && b.aligns() && a.depth == b.depth)
        .flat_map(|run| {
            let widest = run
                .iter()
                .filter_map(|line| line.key.as_ref())
                .map(|key| key.chars().count())
                .max()
                .unwrap_or(0);
            run.iter()
                .map(move |line| if line.aligns() { widest } else { 0 })
        })
        .collect()
}

/// An object key, bare when it is a valid identifier.
pub(crate) fn object_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_owned()
    } else {
        quote(key)
    }
}

/// Native syntax for a non-collection value; `None` for lists and objects.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_owned()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(quote(s)),
        Value::List(_) | Value::Object(_) => None,
    }
}

/// Quotes `text` as a native syntax string literal.
pub(crate) fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    out.push_str(&escape(text));
    out.push('"');
    out
}

/// Escapes `text` for use inside a quoted string literal, including the
/// template introducers `${` and `%{`.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            ctrl if ctrl.is_control() => {
                out.push_str(&format!("\\u{:04x}", u32::from(ctrl)));
            }
            other => out.push(other),
        }
    }
    out
}
