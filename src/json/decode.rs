//! Strict single-pass JSON decoder.
//!
//! The grammar is driven by an explicit state machine over a frame stack, so
//! nesting depth is bounded by `max_depth` rather than by the native stack.
use crate::error::{Error, Result};
use crate::node::{Category, Node, Scalar};

pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Decodes one complete document. Anything but whitespace after the value
/// is an error.
pub fn decode(text: &str) -> Result<Node> {
    let mut decoder = Decoder::new(text);
    let node = match decoder.next_value()? {
        Some(node) => node,
        None => return Err(decoder.error_here("unexpected end of input, expected a value")),
    };
    decoder.finish()?;
    Ok(node)
}

pub fn decode_slice(bytes: &[u8]) -> Result<Node> {
    match std::str::from_utf8(bytes) {
        Ok(text) => decode(text),
        Err(err) => Err(syntax_error(bytes, err.valid_up_to(), "invalid UTF-8 in input")),
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    ExpectValue,
    ObjectAfterOpenBrace,
    ObjectAfterKey,
    ObjectAfterColon,
    ObjectAfterComma,
    ObjectAfterValue,
    ArrayAfterOpenBracket,
    ArrayAfterValue,
    Done,
}

#[derive(Debug)]
enum Frame {
    Object { children: Vec<Node>, key: Option<String> },
    Array { children: Vec<Node> },
}

/// Reads JSON values one at a time from a text holding zero or more of them
/// separated by whitespace (e.g. NDJSON).
#[derive(Debug)]
pub struct Decoder<'a> {
    input: &'a str,
    pos: usize,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Consumes exactly one value, or returns `None` once only whitespace is
    /// left.
    pub fn next_value(&mut self) -> Result<Option<Node>> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Ok(None);
        }
        self.read_document().map(Some)
    }

    /// Fails unless only whitespace remains.
    pub fn finish(&mut self) -> Result<()> {
        self.skip_whitespace();
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error_here("trailing characters after JSON value")),
        }
    }

    fn read_document(&mut self) -> Result<Node> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut root: Option<Node> = None;
        let mut state = State::ExpectValue;

        while state != State::Done {
            self.skip_whitespace();
            state = match state {
                State::ExpectValue | State::ObjectAfterColon => match self.peek() {
                    Some(b'{') => {
                        self.open(&mut stack, Frame::Object { children: Vec::new(), key: None })?;
                        State::ObjectAfterOpenBrace
                    }
                    Some(b'[') => {
                        self.open(&mut stack, Frame::Array { children: Vec::new() })?;
                        State::ArrayAfterOpenBracket
                    }
                    Some(_) => {
                        let node = self.read_scalar()?;
                        complete(&mut stack, &mut root, node)
                    }
                    None => return Err(self.end_of_input("a value")),
                },
                State::ObjectAfterOpenBrace | State::ObjectAfterComma => match self.peek() {
                    Some(b'"') => {
                        let name = self.read_string()?;
                        if let Some(Frame::Object { key, .. }) = stack.last_mut() {
                            *key = Some(name);
                        }
                        State::ObjectAfterKey
                    }
                    Some(b'}') if state == State::ObjectAfterOpenBrace => {
                        self.pos += 1;
                        self.close(&mut stack, &mut root)?
                    }
                    Some(b'}') => return Err(self.error_here("trailing comma before '}'")),
                    Some(_) => return Err(self.unexpected("a member name")),
                    None => return Err(self.end_of_input("a member name")),
                },
                State::ObjectAfterKey => match self.peek() {
                    Some(b':') => {
                        self.pos += 1;
                        State::ObjectAfterColon
                    }
                    Some(_) => return Err(self.unexpected("':'")),
                    None => return Err(self.end_of_input("':'")),
                },
                State::ObjectAfterValue => match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                        State::ObjectAfterComma
                    }
                    Some(b'}') => {
                        self.pos += 1;
                        self.close(&mut stack, &mut root)?
                    }
                    Some(_) => return Err(self.unexpected("',' or '}'")),
                    None => return Err(self.end_of_input("',' or '}'")),
                },
                State::ArrayAfterOpenBracket => match self.peek() {
                    Some(b']') => {
                        self.pos += 1;
                        self.close(&mut stack, &mut root)?
                    }
                    _ => State::ExpectValue,
                },
                State::ArrayAfterValue => match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                        if self.peek_after_whitespace() == Some(b']') {
                            return Err(self.error_here("trailing comma before ']'"));
                        }
                        State::ExpectValue
                    }
                    Some(b']') => {
                        self.pos += 1;
                        self.close(&mut stack, &mut root)?
                    }
                    Some(_) => return Err(self.unexpected("',' or ']'")),
                    None => return Err(self.end_of_input("',' or ']'")),
                },
                State::Done => State::Done,
            };
        }

        root.ok_or_else(|| self.error_here("no value decoded"))
    }

    fn open(&mut self, stack: &mut Vec<Frame>, frame: Frame) -> Result<()> {
        if stack.len() >= self.max_depth {
            return Err(self.error_here(&format!("nesting deeper than {} levels", self.max_depth)));
        }
        self.pos += 1;
        stack.push(frame);
        Ok(())
    }

    fn close(&self, stack: &mut Vec<Frame>, root: &mut Option<Node>) -> Result<State> {
        let node = match stack.pop() {
            Some(Frame::Object { children, .. }) => Node::with_children(Category::Object, children),
            Some(Frame::Array { children }) => Node::with_children(Category::Array, children),
            None => return Err(self.error_here("unbalanced closing bracket")),
        };
        Ok(complete(stack, root, node))
    }

    // ————————————————————————————————————————————————————————————————————————
    // TOKENS
    // ————————————————————————————————————————————————————————————————————————

    fn read_scalar(&mut self) -> Result<Node> {
        match self.peek() {
            Some(b'"') => Ok(Node::scalar(self.read_string()?)),
            Some(b't') => self.read_literal("true").map(|()| Node::scalar(true)),
            Some(b'f') => self.read_literal("false").map(|()| Node::scalar(false)),
            Some(b'n') => self.read_literal("null").map(|()| Node::new()),
            Some(b'-' | b'0'..=b'9') => self.read_number().map(|value| Node::scalar(value)),
            Some(_) => Err(self.unexpected("a value")),
            None => Err(self.end_of_input("a value")),
        }
    }

    fn read_literal(&mut self, literal: &str) -> Result<()> {
        if self.input[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(self.error_here(&format!("invalid literal, expected `{literal}`")))
        }
    }

    fn read_number(&mut self) -> Result<Scalar> {
        let start = self.pos;
        let negative = self.eat(b'-');
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if matches!(self.peek(), Some(b'0'..=b'9')) {
                    return Err(self.error_here("leading zeros are not allowed"));
                }
            }
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.error_here("invalid number, expected a digit")),
        }

        let mut fractional = false;
        if self.eat(b'.') {
            fractional = true;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error_here("expected a digit after the decimal point"));
            }
            self.skip_digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            fractional = true;
            self.pos += 1;
            if !self.eat(b'+') {
                self.eat(b'-');
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error_here("expected a digit in the exponent"));
            }
            self.skip_digits();
        }

        let text = &self.input[start..self.pos];
        if !fractional {
            if negative {
                if let Ok(i) = text.parse::<i64>() {
                    return Ok(Scalar::from(i));
                }
            } else if let Ok(u) = text.parse::<u64>() {
                return Ok(Scalar::UInt(u));
            }
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Scalar::Float(f)),
            _ => Err(syntax_error(self.input.as_bytes(), start, "number out of range")),
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let input = self.input;
        let bytes = input.as_bytes();
        let opening = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let run = self.pos;
            while let Some(&b) = bytes.get(self.pos) {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            // Stops only on ASCII bytes, so the run ends on a char boundary.
            out.push_str(&input[run..self.pos]);
            match bytes.get(self.pos) {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    out.push(self.read_escape()?);
                }
                Some(_) => return Err(self.error_here("control character in string")),
                None => return Err(syntax_error(bytes, opening, "unterminated string")),
            }
        }
    }

    fn read_escape(&mut self) -> Result<char> {
        let Some(b) = self.peek() else {
            return Err(self.end_of_input("an escape sequence"));
        };
        self.pos += 1;
        let c = match b {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{08}',
            b'f' => '\u{0c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => return self.read_unicode_escape(),
            _ => {
                self.pos -= 1;
                return Err(self.error_here("invalid escape sequence"));
            }
        };
        Ok(c)
    }

    fn read_unicode_escape(&mut self) -> Result<char> {
        let first = self.read_hex4()?;
        let code = match first {
            0xD800..=0xDBFF => {
                if !self.input[self.pos..].starts_with("\\u") {
                    return Err(self.error_here("unpaired surrogate in unicode escape"));
                }
                self.pos += 2;
                let second = self.read_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&second) {
                    return Err(self.error_here("unpaired surrogate in unicode escape"));
                }
                0x10000 + ((u32::from(first) - 0xD800) << 10) + (u32::from(second) - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(self.error_here("unpaired surrogate in unicode escape")),
            other => u32::from(other),
        };
        char::from_u32(code).ok_or_else(|| self.error_here("invalid unicode escape"))
    }

    fn read_hex4(&mut self) -> Result<u16> {
        let digits = self
            .input
            .get(self.pos..self.pos + 4)
            .filter(|s| s.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| self.error_here("expected four hex digits in unicode escape"))?;
        let value = u16::from_str_radix(digits, 16)
            .map_err(|_| self.error_here("expected four hex digits in unicode escape"))?;
        self.pos += 4;
        Ok(value)
    }

    // ————————————————————————————————————————————————————————————————————————
    // CURSOR
    // ————————————————————————————————————————————————————————————————————————

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn peek_after_whitespace(&self) -> Option<u8> {
        self.input.as_bytes()[self.pos..]
            .iter()
            .copied()
            .find(|b| !is_whitespace(*b))
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
    }

    fn error_here(&self, message: &str) -> Error {
        syntax_error(self.input.as_bytes(), self.pos, message)
    }

    fn end_of_input(&self, expected: &str) -> Error {
        self.error_here(&format!("unexpected end of input, expected {expected}"))
    }

    fn unexpected(&self, expected: &str) -> Error {
        let found = self.input[self.pos..].chars().next().unwrap_or_default();
        self.error_here(&format!("unexpected character {found:?}, expected {expected}"))
    }
}

fn complete(stack: &mut [Frame], root: &mut Option<Node>, mut node: Node) -> State {
    match stack.last_mut() {
        None => {
            *root = Some(node);
            State::Done
        }
        Some(Frame::Object { children, key }) => {
            node.set_name(key.take());
            children.push(node);
            State::ObjectAfterValue
        }
        Some(Frame::Array { children }) => {
            children.push(node);
            State::ArrayAfterValue
        }
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Builds a syntax error with the 1-based line/column of byte `offset`.
fn syntax_error(bytes: &[u8], offset: usize, message: &str) -> Error {
    let before = &bytes[..offset.min(bytes.len())];
    let line_start = before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    // Count chars, not bytes: skip UTF-8 continuation bytes.
    let column = before[line_start..]
        .iter()
        .filter(|&&b| b & 0xC0 != 0x80)
        .count()
        + 1;
    Error::Syntax {
        message: message.to_owned(),
        line,
        column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn syntax(text: &str) -> (String, usize, usize) {
        match decode(text).unwrap_err() {
            Error::Syntax { message, line, column } => (message, line, column),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn decodes_every_value_kind() {
        let node = decode(r#"{"s":"x","i":-3,"u":7,"f":1.5e2,"t":true,"n":null,"a":[],"o":{}}"#).unwrap();
        assert_eq!(node.get_member("s").unwrap().as_str().unwrap(), "x");
        assert_eq!(node.get_member("i").unwrap().to_i64().unwrap(), -3);
        assert_eq!(node.get_member("u").unwrap().value().unwrap(), &Scalar::UInt(7));
        assert_eq!(node.get_member("f").unwrap().value().unwrap(), &Scalar::Float(150.0));
        assert!(node.get_member("t").unwrap().to_bool().unwrap());
        assert!(node.get_member("n").unwrap().is_null());
        assert_eq!(node.get_member("a").unwrap().category(), Category::Array);
        assert_eq!(node.get_member("o").unwrap().category(), Category::Object);
    }

    #[test]
    fn members_keep_document_order_and_duplicates() {
        let node = decode(r#"{"b":1,"a":2,"b":3}"#).unwrap();
        let names: Vec<_> = node.children().iter().filter_map(Node::name).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
        assert_eq!(node.get_member("b").unwrap().to_u64().unwrap(), 3);
    }

    #[test]
    fn escapes_and_surrogate_pairs() {
        let node = decode(r#""a\"b\\c\/d\né😀""#).unwrap();
        assert_eq!(node.as_str().unwrap(), "a\"b\\c/d\né😀");
        assert!(decode(r#""\ud83d""#).is_err());
        assert!(decode(r#""\ude00""#).is_err());
        assert!(decode(r#""\x""#).is_err());
        assert!(decode("\"tab\there\"").is_err());
    }

    #[test]
    fn numbers_follow_json_grammar() {
        assert_eq!(decode("18446744073709551615").unwrap().to_u64().unwrap(), u64::MAX);
        assert_eq!(decode("-9223372036854775808").unwrap().to_i64().unwrap(), i64::MIN);
        assert_eq!(decode("18446744073709551616").unwrap().value().unwrap(), &Scalar::Float(18446744073709551616.0));
        assert_eq!(decode("-0").unwrap().to_u64().unwrap(), 0);
        for bad in ["01", "1.", ".5", "-", "1e", "+1", "1e999"] {
            assert!(decode(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn malformed_member_value_is_a_syntax_error() {
        let (message, line, column) = syntax(r#"{"firstName": "John", "age": }"#);
        assert_eq!(message, "unexpected character '}', expected a value");
        assert_eq!((line, column), (1, 30));
    }

    #[test]
    fn strict_mode_rejects_trailing_commas() {
        assert_eq!(syntax("[1,2,]").0, "trailing comma before ']'");
        assert_eq!(syntax(r#"{"a":1,}"#).0, "trailing comma before '}'");
    }

    #[test]
    fn structural_errors_are_located() {
        let (message, line, column) = syntax("{\n  \"a\": [1, 2}\n}");
        assert_eq!(message, "unexpected character '}', expected ',' or ']'");
        assert_eq!((line, column), (2, 13));

        let (message, _, _) = syntax(r#"{"a" 1}"#);
        assert_eq!(message, "unexpected character '1', expected ':'");

        let (message, line, column) = syntax("\"abc");
        assert_eq!(message, "unterminated string");
        assert_eq!((line, column), (1, 1));

        assert!(syntax("[1, 2").0.starts_with("unexpected end of input"));
        assert!(syntax("").0.starts_with("unexpected end of input"));
        assert_eq!(syntax("[1] x").0, "trailing characters after JSON value");
        assert_eq!(syntax("nul").0, "invalid literal, expected `null`");
    }

    #[test]
    fn depth_limit_is_enforced() {
        let deep = format!("{}{}", "[".repeat(10), "]".repeat(10));
        assert!(Decoder::new(&deep).with_max_depth(10).next_value().is_ok());
        let err = Decoder::new(&deep).with_max_depth(9).next_value().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);

        let very_deep = format!("{}{}", "[".repeat(100_000), "]".repeat(100_000));
        assert!(decode(&very_deep).is_err());
    }

    #[test]
    fn decoder_reads_one_value_per_call() {
        let mut decoder = Decoder::new("{\"a\":1}\n[2]\n  3 \n");
        assert_eq!(decoder.next_value().unwrap().unwrap().category(), Category::Object);
        assert_eq!(decoder.next_value().unwrap().unwrap().category(), Category::Array);
        assert_eq!(decoder.next_value().unwrap().unwrap().to_u64().unwrap(), 3);
        assert!(decoder.next_value().unwrap().is_none());
    }

    #[test]
    fn invalid_utf8_is_reported_with_position() {
        let err = decode_slice(b"[\"ok\", \xff]").unwrap_err();
        assert_eq!(
            err,
            Error::Syntax {
                message: "invalid UTF-8 in input".into(),
                line: 1,
                column: 8
            }
        );
    }
}
