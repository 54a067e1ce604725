use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::node::scalar::format_float;
use crate::node::{Category, Node, Scalar};

const DEFAULT_INDENT: usize = 4;

pub fn encode(node: &Node, pretty: bool) -> Result<String> {
    Encoder::new().pretty(pretty).encode(node)
}

#[derive(Clone, Debug)]
pub struct Encoder {
    pretty: bool,
    indent: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: DEFAULT_INDENT,
        }
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Spaces per nesting level in pretty mode.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn encode(&self, node: &Node) -> Result<String> {
        let mut out = String::new();
        self.write_node(&mut out, node, 0)?;
        Ok(out)
    }

    fn write_node(&self, out: &mut String, node: &Node, depth: usize) -> Result<()> {
        match node.category() {
            Category::Void => out.push_str("null"),
            Category::Scalar => write_scalar(out, node.value()?)?,
            Category::Object => self.write_container(out, node, depth, ('{', '}'))?,
            Category::Array => self.write_container(out, node, depth, ('[', ']'))?,
        }
        Ok(())
    }

    fn write_container(
        &self,
        out: &mut String,
        node: &Node,
        depth: usize,
        (open, close): (char, char),
    ) -> Result<()> {
        let keyed = node.category() == Category::Object;
        out.push(open);
        if node.is_empty() {
            out.push(close);
            return Ok(());
        }
        for (index, child) in node.children().iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            self.newline(out, depth + 1);
            if keyed {
                write_string(out, child.name().unwrap_or_default());
                out.push(':');
                if self.pretty {
                    out.push(' ');
                }
            }
            self.write_node(out, child, depth + 1)?;
        }
        self.newline(out, depth);
        out.push(close);
        Ok(())
    }

    fn newline(&self, out: &mut String, depth: usize) {
        if self.pretty {
            out.push('\n');
            out.extend(std::iter::repeat_n(' ', depth * self.indent));
        }
    }
}

fn write_scalar(out: &mut String, value: &Scalar) -> Result<()> {
    match value {
        Scalar::Str(s) => write_string(out, s),
        Scalar::Float(f) if !f.is_finite() => return Err(Error::NonFiniteNumber(*f)),
        Scalar::Float(f) => out.push_str(&format_float(*f)),
        Scalar::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Scalar::UInt(u) => {
            let _ = write!(out, "{u}");
        }
        Scalar::Int(i) => {
            let _ = write!(out, "{i}");
        }
    }
    Ok(())
}

pub(crate) fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if c < ' ' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_output_has_no_whitespace() {
        let node = Node::from_members([
            ("a", Node::scalar(1u8)),
            ("b", Node::from_elements([Node::scalar(true), Node::new()])),
            ("c", Node::object()),
        ]);
        assert_eq!(encode(&node, false).unwrap(), r#"{"a":1,"b":[true,null],"c":{}}"#);
    }

    #[test]
    fn pretty_output_indents_each_level() {
        let node = Node::from_members([
            ("a", Node::from_elements([Node::scalar(-2i32)])),
            ("b", Node::array()),
        ]);
        let expected = "{\n    \"a\": [\n        -2\n    ],\n    \"b\": []\n}";
        assert_eq!(encode(&node, true).unwrap(), expected);
        let two = Encoder::new().pretty(true).indent(2).encode(&node).unwrap();
        assert_eq!(two, "{\n  \"a\": [\n    -2\n  ],\n  \"b\": []\n}");
    }

    #[test]
    fn strings_are_escaped() {
        let node = Node::scalar("quote\" back\\ nl\n tab\t bell\u{07} é");
        assert_eq!(
            encode(&node, false).unwrap(),
            r#""quote\" back\\ nl\n tab\t bell\u0007 é""#
        );
    }

    #[test]
    fn numbers_are_canonical() {
        assert_eq!(encode(&Node::scalar(u64::MAX), false).unwrap(), "18446744073709551615");
        assert_eq!(encode(&Node::scalar(i64::MIN), false).unwrap(), "-9223372036854775808");
        assert_eq!(encode(&Node::scalar(1.5f64), false).unwrap(), "1.5");
        assert_eq!(encode(&Node::scalar(3.0f64), false).unwrap(), "3.0");
    }

    #[test]
    fn non_finite_numbers_fail_the_whole_document() {
        let node = Node::from_members([("ok", Node::scalar(1u8)), ("bad", Node::scalar(f64::NAN))]);
        let err = encode(&node, true).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NonFiniteNumber);
    }

    #[test]
    fn void_and_empty_scalar() {
        assert_eq!(encode(&Node::new(), false).unwrap(), "null");
        let mut node = Node::new();
        node.set_category(Category::Scalar).unwrap();
        assert_eq!(encode(&node, false).unwrap(), "\"\"");
    }
}
