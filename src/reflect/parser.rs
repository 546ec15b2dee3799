use crate::reflect::document::{DataType, Document, Node, NodeId};
use crate::reflect::error::{ParseError, ParseErrorKind};

/// Default arena reservation when the caller gives no hint.
const DEFAULT_RESERVE_NODES: usize = 100;

/// Parse JSON text into a [`Document`].
pub fn parse(text: &str) -> Result<Document, ParseError> {
	parse_with_capacity(text, DEFAULT_RESERVE_NODES)
}

/// Parse JSON text, reserving arena space for roughly `reserve_nodes` nodes
/// up front.
pub fn parse_with_capacity(text: &str, reserve_nodes: usize) -> Result<Document, ParseError> {
	Parser::new(text, reserve_nodes).run()
}

/// Validate a token against the RFC 7159 number grammar: optional minus,
/// integer part without a leading zero, optional fraction and exponent each
/// with at least one digit.
pub fn is_number(token: &str) -> bool {
	let bytes = token.as_bytes();
	let mut i = 0;

	if bytes.first() == Some(&b'-') {
		i += 1;
	}

	match bytes.get(i) {
		Some(b'0') => i += 1,
		Some(b'1'..=b'9') => {
			while matches!(bytes.get(i), Some(b'0'..=b'9')) {
				i += 1;
			}
		}
		_ => return false,
	}

	if bytes.get(i) == Some(&b'.') {
		i += 1;
		if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
			return false;
		}
		while matches!(bytes.get(i), Some(b'0'..=b'9')) {
			i += 1;
		}
	}

	if matches!(bytes.get(i), Some(b'e' | b'E')) {
		i += 1;
		if matches!(bytes.get(i), Some(b'+' | b'-')) {
			i += 1;
		}
		if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
			return false;
		}
		while matches!(bytes.get(i), Some(b'0'..=b'9')) {
			i += 1;
		}
	}

	i == bytes.len()
}

/// Whether a token is the `true` or `false` literal.
pub fn is_boolean(token: &str) -> bool {
	token == "true" || token == "false"
}

/// Whether a token is the `null` literal.
pub fn is_null(token: &str) -> bool {
	token == "null"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	Root,
	Key,
	KeyValueSeparator,
	Value,
	CommaOrEnd,
	Done,
}

struct Parser<'a> {
	bytes: &'a [u8],
	pos: usize,
	line: usize,
	column: usize,
	doc: Document,
	stack: Vec<NodeId>,
	pending: Option<NodeId>,
	after_comma: bool,
	state: State,
}

impl<'a> Parser<'a> {
	fn new(text: &'a str, reserve_nodes: usize) -> Self {
		Self {
			bytes: text.as_bytes(),
			pos: 0,
			line: 1,
			column: 1,
			doc: Document::with_capacity(reserve_nodes),
			stack: Vec::new(),
			pending: None,
			after_comma: false,
			state: State::Root,
		}
	}

	fn run(mut self) -> Result<Document, ParseError> {
		while self.pos < self.bytes.len() && self.state != State::Done {
			let byte = self.bytes[self.pos];

			match byte {
				b' ' | b'\t' | b'\r' => {
					self.advance();
					continue;
				}
				b'\n' => {
					self.advance();
					continue;
				}
				_ => {}
			}

			match self.state {
				State::Root => self.on_root(byte)?,
				State::Key => self.on_key(byte)?,
				State::KeyValueSeparator => self.on_separator(byte)?,
				State::Value => self.on_value(byte)?,
				State::CommaOrEnd => self.on_comma_or_end(byte)?,
				State::Done => unreachable!("loop exits on Done"),
			}
		}

		if self.state != State::Done {
			return Err(self.error(ParseErrorKind::UnexpectedEnd));
		}

		Ok(self.doc)
	}

	fn on_root(&mut self, byte: u8) -> Result<(), ParseError> {
		let kind = match byte {
			b'{' => DataType::Object,
			b'[' => DataType::Array,
			_ => return Err(self.error(ParseErrorKind::InvalidRoot)),
		};

		let root = self.doc.push(Node::new(kind));
		self.stack.push(root);
		self.state = if kind == DataType::Object { State::Key } else { State::Value };
		self.advance();
		Ok(())
	}

	fn on_key(&mut self, byte: u8) -> Result<(), ParseError> {
		match byte {
			b'"' => {
				let name = self.scan_string()?;
				let id = self.doc.push(Node::new(DataType::Undefined));
				self.doc.node_mut(id).name = name;
				self.pending = Some(id);
				self.after_comma = false;
				self.state = State::KeyValueSeparator;
				Ok(())
			}
			b'}' => {
				if self.after_comma {
					// a comma inside an object promises another key
					return Err(self.error(ParseErrorKind::InvalidKey));
				}
				self.close_container(DataType::Object)
			}
			b']' => self.close_container(DataType::Array),
			_ => Err(self.error(ParseErrorKind::InvalidKey)),
		}
	}

	fn on_separator(&mut self, byte: u8) -> Result<(), ParseError> {
		if byte != b':' {
			return Err(self.error(ParseErrorKind::MissingKeyValueSeparator));
		}
		self.state = State::Value;
		self.advance();
		Ok(())
	}

	fn on_value(&mut self, byte: u8) -> Result<(), ParseError> {
		match byte {
			b'{' | b'[' => {
				let kind = if byte == b'{' { DataType::Object } else { DataType::Array };
				let id = self.take_value_node(kind);
				let parent = self.top();
				self.doc.node_mut(parent).children.push(id);
				self.stack.push(id);
				self.after_comma = false;
				self.state = if kind == DataType::Object { State::Key } else { State::Value };
				self.advance();
				Ok(())
			}
			b'"' => {
				let data = self.scan_string()?;
				self.attach_scalar(DataType::String, data);
				Ok(())
			}
			b'-' | b'0'..=b'9' => {
				let token = self.scan_atom()?;
				if !is_number(&token) {
					return Err(self.error(ParseErrorKind::BadNumberFormat));
				}
				self.attach_scalar(DataType::Number, token);
				Ok(())
			}
			b't' | b'f' => {
				let token = self.scan_atom()?;
				if !is_boolean(&token) {
					return Err(self.error(ParseErrorKind::BadFormat));
				}
				self.attach_scalar(DataType::Boolean, token);
				Ok(())
			}
			b'n' => {
				let token = self.scan_atom()?;
				if !is_null(&token) {
					return Err(self.error(ParseErrorKind::BadFormat));
				}
				self.attach_scalar(DataType::Null, token);
				Ok(())
			}
			b'}' => {
				if self.pending.is_some() {
					// "key": followed directly by a closing brace
					return Err(self.error(ParseErrorKind::BadFormat));
				}
				self.close_container(DataType::Object)
			}
			b']' => {
				if self.after_comma {
					return Err(self.error(ParseErrorKind::BadFormat));
				}
				self.close_container(DataType::Array)
			}
			_ => Err(self.error(ParseErrorKind::BadFormat)),
		}
	}

	fn on_comma_or_end(&mut self, byte: u8) -> Result<(), ParseError> {
		match byte {
			b',' => {
				let parent = self.top();
				self.after_comma = true;
				self.state = if self.doc.node(parent).kind == DataType::Object {
					State::Key
				} else {
					State::Value
				};
				self.advance();
				Ok(())
			}
			b'}' => self.close_container(DataType::Object),
			b']' => self.close_container(DataType::Array),
			_ => Err(self.error(ParseErrorKind::MissingComma)),
		}
	}

	/// Pop the current container, verifying the closing bracket matches its
	/// kind. Emptying the stack finishes the parse; otherwise scanning
	/// resumes at the enclosing container's comma-or-end position.
	fn close_container(&mut self, expected: DataType) -> Result<(), ParseError> {
		let top = self.top();
		if self.doc.node(top).kind != expected {
			let kind = if expected == DataType::Object {
				ParseErrorKind::OutOfPlaceBrace
			} else {
				ParseErrorKind::OutOfPlaceSquareBracket
			};
			return Err(self.error(kind));
		}

		self.stack.pop();
		self.after_comma = false;
		self.state = if self.stack.is_empty() { State::Done } else { State::CommaOrEnd };
		self.advance();
		Ok(())
	}

	/// Reuse the pending keyed node if one exists, otherwise allocate an
	/// unnamed node (array entry).
	fn take_value_node(&mut self, kind: DataType) -> NodeId {
		match self.pending.take() {
			Some(id) => {
				self.doc.node_mut(id).kind = kind;
				id
			}
			None => self.doc.push(Node::new(kind)),
		}
	}

	fn attach_scalar(&mut self, kind: DataType, data: String) {
		let id = self.take_value_node(kind);
		self.doc.node_mut(id).data = data;
		let parent = self.top();
		self.doc.node_mut(parent).children.push(id);
		self.after_comma = false;
		self.state = State::CommaOrEnd;
	}

	fn top(&self) -> NodeId {
		*self.stack.last().expect("container stack is non-empty in this state")
	}

	fn error(&self, kind: ParseErrorKind) -> ParseError {
		ParseError::new(kind, self.line, self.column)
	}

	fn advance(&mut self) {
		if self.bytes[self.pos] == b'\n' {
			self.line += 1;
			self.column = 1;
		} else {
			self.column += 1;
		}
		self.pos += 1;
	}

	/// Scan a quoted string starting at the current `"`, consuming through
	/// the closing quote. Escape sequences are decoded into the result.
	fn scan_string(&mut self) -> Result<String, ParseError> {
		self.advance(); // opening quote
		let mut out: Vec<u8> = Vec::new();

		while self.pos < self.bytes.len() {
			let byte = self.bytes[self.pos];

			match byte {
				b'"' => {
					self.advance();
					return Ok(String::from_utf8_lossy(&out).into_owned());
				}
				b'\\' => {
					self.advance();
					let ch = self.scan_escape()?;
					let mut buf = [0_u8; 4];
					out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
				}
				0x00..=0x1F => {
					// raw control characters must be escaped
					return Err(self.error(ParseErrorKind::InvalidEscape));
				}
				_ => {
					out.push(byte);
					self.advance();
				}
			}
		}

		Err(self.error(ParseErrorKind::UnterminatedString))
	}

	/// Decode one escape sequence, positioned just past the backslash.
	fn scan_escape(&mut self) -> Result<char, ParseError> {
		let Some(byte) = self.bytes.get(self.pos).copied() else {
			return Err(self.error(ParseErrorKind::UnterminatedString));
		};

		let ch = match byte {
			b'"' => '"',
			b'\\' => '\\',
			b'/' => '/',
			b'b' => '\u{0008}',
			b'f' => '\u{000C}',
			b'n' => '\n',
			b'r' => '\r',
			b't' => '\t',
			b'u' => {
				self.advance();
				return self.scan_unicode_escape();
			}
			_ => return Err(self.error(ParseErrorKind::InvalidEscape)),
		};

		self.advance();
		Ok(ch)
	}

	/// Decode `XXXX` (and a following low surrogate when needed),
	/// positioned just past the `u`.
	fn scan_unicode_escape(&mut self) -> Result<char, ParseError> {
		let high = self.scan_hex4()?;

		if (0xD800..=0xDBFF).contains(&high) {
			// try to combine a surrogate pair
			if self.bytes.get(self.pos) == Some(&b'\\') && self.bytes.get(self.pos + 1) == Some(&b'u') {
				self.advance();
				self.advance();
				let low = self.scan_hex4()?;
				if (0xDC00..=0xDFFF).contains(&low) {
					let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
					return Ok(char::from_u32(combined).unwrap_or('\u{FFFD}'));
				}
				return Ok('\u{FFFD}');
			}
			return Ok('\u{FFFD}');
		}

		Ok(char::from_u32(high).unwrap_or('\u{FFFD}'))
	}

	fn scan_hex4(&mut self) -> Result<u32, ParseError> {
		let mut value = 0_u32;
		for _ in 0..4 {
			let Some(byte) = self.bytes.get(self.pos).copied() else {
				return Err(self.error(ParseErrorKind::UnterminatedString));
			};
			let digit = match byte {
				b'0'..=b'9' => u32::from(byte - b'0'),
				b'a'..=b'f' => u32::from(byte - b'a') + 10,
				b'A'..=b'F' => u32::from(byte - b'A') + 10,
				_ => return Err(self.error(ParseErrorKind::InvalidEscape)),
			};
			value = value * 16 + digit;
			self.advance();
		}
		Ok(value)
	}

	/// Scan an unquoted token (number, boolean, or null) up to the next
	/// delimiter. The delimiter is left unconsumed.
	fn scan_atom(&mut self) -> Result<String, ParseError> {
		let start = self.pos;

		while self.pos < self.bytes.len() {
			let byte = self.bytes[self.pos];
			if matches!(byte, b':' | b',' | b']' | b'}' | b' ' | b'\t' | b'\r' | b'\n') {
				break;
			}
			if !(0x20..0x7F).contains(&byte) {
				return Err(self.error(ParseErrorKind::BadFormat));
			}
			self.advance();
		}

		if self.pos == start || self.pos == self.bytes.len() {
			// empty token, or input ended before a delimiter closed it
			return Err(self.error(ParseErrorKind::BadFormat));
		}

		Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
	}
}

#[cfg(test)]
mod tests {
	use super::{is_boolean, is_null, is_number, parse};
	use crate::reflect::document::DataType;
	use crate::reflect::error::ParseErrorKind;

	fn error_kind(text: &str) -> ParseErrorKind {
		parse(text).expect_err("input should be rejected").kind
	}

	#[test]
	fn string_array_parses_in_order() {
		let doc = parse("[ \"hello\", \"world\", \"json\" ]").expect("valid input");
		let root = doc.root();
		assert_eq!(root.kind, DataType::Array);
		assert_eq!(root.name, "");

		let values: Vec<&str> = doc.children(doc.root_id()).map(|node| node.data.as_str()).collect();
		assert_eq!(values, ["hello", "world", "json"]);
		for node in doc.children(doc.root_id()) {
			assert_eq!(node.kind, DataType::String);
		}
	}

	#[test]
	fn nested_object_values_resolve_by_name() {
		let doc = parse("{\"a\": {\"b\": [1, 2]}, \"c\": true}").expect("valid input");
		let a = doc.child_by_name(doc.root_id(), "a").expect("a exists");
		let b = doc.child_by_name(a, "b").expect("b exists");
		assert_eq!(doc.node(b).kind, DataType::Array);
		assert_eq!(doc.node(b).children.len(), 2);

		let c = doc.child_by_name(doc.root_id(), "c").expect("c exists");
		assert_eq!(doc.node(c).kind, DataType::Boolean);
		assert_eq!(doc.node(c).data, "true");
	}

	#[test]
	fn empty_containers_parse() {
		assert_eq!(parse("{}").expect("valid").root().kind, DataType::Object);
		assert_eq!(parse("[]").expect("valid").root().kind, DataType::Array);
		assert_eq!(parse("{\"a\": {}}").expect("valid").len(), 2);
		assert_eq!(parse("[[], []]").expect("valid").len(), 3);
	}

	#[test]
	fn object_close_then_comma_continues() {
		let doc = parse("{\"a\": {}, \"b\": 1}").expect("valid input");
		assert!(doc.child_by_name(doc.root_id(), "b").is_some());
	}

	#[test]
	fn scalar_root_is_rejected() {
		assert_eq!(error_kind("42"), ParseErrorKind::InvalidRoot);
		assert_eq!(error_kind("\"text\""), ParseErrorKind::InvalidRoot);
	}

	#[test]
	fn trailing_comma_in_object_is_missing_key() {
		assert_eq!(error_kind("{\"a\": 1,}"), ParseErrorKind::InvalidKey);
	}

	#[test]
	fn trailing_comma_in_array_is_bad_format() {
		assert_eq!(error_kind("[1,]"), ParseErrorKind::BadFormat);
	}

	#[test]
	fn mismatched_brackets_are_rejected() {
		assert_eq!(error_kind("{\"a\": 1]"), ParseErrorKind::OutOfPlaceSquareBracket);
		assert_eq!(error_kind("[1}"), ParseErrorKind::OutOfPlaceBrace);
	}

	#[test]
	fn missing_separator_and_comma_are_rejected() {
		assert_eq!(error_kind("{\"a\" 1}"), ParseErrorKind::MissingKeyValueSeparator);
		assert_eq!(error_kind("[1 2]"), ParseErrorKind::MissingComma);
	}

	#[test]
	fn unterminated_string_is_rejected() {
		assert_eq!(error_kind("[\"abc"), ParseErrorKind::UnterminatedString);
	}

	#[test]
	fn unclosed_root_is_unexpected_end() {
		assert_eq!(error_kind("{\"a\": 1"), ParseErrorKind::UnexpectedEnd);
		assert_eq!(error_kind(""), ParseErrorKind::UnexpectedEnd);
		assert_eq!(error_kind("   "), ParseErrorKind::UnexpectedEnd);
	}

	#[test]
	fn missing_value_before_brace_is_rejected() {
		assert_eq!(error_kind("{\"a\":}"), ParseErrorKind::BadFormat);
	}

	#[test]
	fn escapes_are_decoded() {
		let doc = parse("[\"a\\n\\t\\\"b\\\\\", \"\\u0041\\u00e9\"]").expect("valid input");
		let values: Vec<&str> = doc.children(doc.root_id()).map(|node| node.data.as_str()).collect();
		assert_eq!(values, ["a\n\t\"b\\", "A\u{e9}"]);
	}

	#[test]
	fn surrogate_pair_combines() {
		let doc = parse("[\"\\ud83d\\ude00\"]").expect("valid input");
		let value = doc.children(doc.root_id()).next().expect("one child");
		assert_eq!(value.data, "\u{1F600}");
	}

	#[test]
	fn lone_surrogate_becomes_replacement() {
		let doc = parse("[\"\\ud800x\"]").expect("valid input");
		let value = doc.children(doc.root_id()).next().expect("one child");
		assert_eq!(value.data, "\u{FFFD}x");
	}

	#[test]
	fn invalid_escape_is_rejected() {
		assert_eq!(error_kind("[\"\\x\"]"), ParseErrorKind::InvalidEscape);
		assert_eq!(error_kind("[\"\\u12g4\"]"), ParseErrorKind::InvalidEscape);
	}

	#[test]
	fn raw_control_character_is_rejected() {
		assert_eq!(error_kind("[\"a\u{1}b\"]"), ParseErrorKind::InvalidEscape);
	}

	#[test]
	fn bad_literals_are_rejected() {
		assert_eq!(error_kind("[tru]"), ParseErrorKind::BadFormat);
		assert_eq!(error_kind("[nul]"), ParseErrorKind::BadFormat);
		assert_eq!(error_kind("[truth]"), ParseErrorKind::BadFormat);
	}

	#[test]
	fn bad_numbers_are_rejected() {
		assert_eq!(error_kind("[01]"), ParseErrorKind::BadNumberFormat);
		assert_eq!(error_kind("[1.]"), ParseErrorKind::BadNumberFormat);
		assert_eq!(error_kind("[1.e5]"), ParseErrorKind::BadNumberFormat);
		assert_eq!(error_kind("[1e]"), ParseErrorKind::BadNumberFormat);
		assert_eq!(error_kind("[-]"), ParseErrorKind::BadNumberFormat);
		assert_eq!(error_kind("[--1]"), ParseErrorKind::BadNumberFormat);
	}

	#[test]
	fn error_position_is_one_based() {
		let err = parse("{\n  \"a\" 1\n}").expect_err("separator is missing");
		assert_eq!(err.kind, ParseErrorKind::MissingKeyValueSeparator);
		assert_eq!(err.line, 2);
		assert_eq!(err.column, 7);
	}

	#[test]
	fn trailing_garbage_after_root_is_ignored() {
		let doc = parse("[1] garbage").expect("scan stops after the root closes");
		assert_eq!(doc.root().children.len(), 1);
	}

	#[test]
	fn number_grammar_matrix() {
		for valid in ["0", "-0", "1", "-1", "10", "1.5", "-1.25", "0.1", "1e5", "1E5", "1e+5", "1e-5", "1.5e10", "123456789"] {
			assert!(is_number(valid), "expected {valid} to be a valid number");
		}
		for invalid in ["", "-", "01", "1.", ".5", "1.e5", "1e", "1e+", "+1", "1a", "0x10", "--1", "1..2"] {
			assert!(!is_number(invalid), "expected {invalid} to be rejected");
		}
	}

	#[test]
	fn literal_helpers_match_exactly() {
		assert!(is_boolean("true") && is_boolean("false"));
		assert!(!is_boolean("True") && !is_boolean("1"));
		assert!(is_null("null"));
		assert!(!is_null("NULL"));
	}
}
