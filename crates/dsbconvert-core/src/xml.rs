//! Minimal XML tree and a deterministic serializer for it.
//!
//! Attributes keep insertion order, so every element type gets the same
//! attribute order on every run. Indentation is two spaces and lines end
//! with `\n`.

use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Comment(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: &'static str,
    pub attributes: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((key, value.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Comment(_) | Node::Text(_) => None,
        })
    }

    /// Breadth-first walk over this element and all element descendants.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = vec![self];
        let mut i = 0;
        while i < out.len() {
            let current = out[i];
            out.extend(current.elements());
            i += 1;
        }
        out
    }
}

/// Document with a declaration, an optional leading comment and one root.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub comment: Option<String>,
    pub root: Element,
}

impl Document {
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        if let Some(comment) = &self.comment {
            let _ = writeln!(out, "<!--{}-->", escape_comment(comment));
        }
        write_element(&mut out, &self.root, 0);
        out
    }
}

fn write_element(out: &mut String, el: &Element, depth: usize) {
    indent(out, depth);
    out.push('<');
    out.push_str(el.name);
    for (key, value) in &el.attributes {
        let _ = write!(out, " {key}=\"{}\"", escape(value));
    }

    if el.children.is_empty() {
        out.push_str(" />\n");
        return;
    }

    // Text-only elements stay on one line.
    if let [Node::Text(text)] = el.children.as_slice() {
        let _ = writeln!(out, ">{}</{}>", escape(text), el.name);
        return;
    }

    out.push_str(">\n");
    for child in &el.children {
        match child {
            Node::Element(e) => write_element(out, e, depth + 1),
            Node::Comment(c) => {
                indent(out, depth + 1);
                let _ = writeln!(out, "<!--{}-->", escape_comment(c));
            }
            Node::Text(t) => {
                indent(out, depth + 1);
                out.push_str(&escape(t));
                out.push('\n');
            }
        }
    }
    indent(out, depth);
    let _ = writeln!(out, "</{}>", el.name);
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            // Other control characters are not allowed in XML 1.0.
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

/// Comments cannot contain `--` or end with `-`; entities are not expanded there.
pub fn escape_comment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '-' && out.ends_with('-') {
            out.push(' ');
        }
        if (c as u32) < 0x20 && c != '\t' {
            out.push(' ');
            continue;
        }
        out.push(c);
    }
    if out.ends_with('-') {
        out.push(' ');
    }
    out
}

/// Fixed-precision number; negative zero prints as zero.
pub fn fmt_num(v: f64, precision: usize) -> String {
    if !v.is_finite() {
        return fmt_num(0.0, precision);
    }
    let s = format!("{v:.precision$}");
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}
