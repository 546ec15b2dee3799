use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level errors for parser entry points and the CLI surface.
#[derive(Debug, Error)]
pub enum Error {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// JSON text did not parse.
	#[error(transparent)]
	Parse(#[from] ParseError),
}

/// Classification of a JSON parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
	/// Root character is not `{` or `[`.
	#[error("root is not a JSON object or array")]
	InvalidRoot,
	/// Object key position held something other than a string.
	#[error("object key is not a string")]
	InvalidKey,
	/// Expected `:` between a key and its value.
	#[error("missing key-value separator")]
	MissingKeyValueSeparator,
	/// Expected `,` or a closing bracket after a value.
	#[error("missing comma")]
	MissingComma,
	/// Input ended inside a string literal.
	#[error("unterminated string")]
	UnterminatedString,
	/// Backslash escape is not one of the allowed forms.
	#[error("invalid escape sequence")]
	InvalidEscape,
	/// `}` closed a container that is not an object.
	#[error("out of place brace")]
	OutOfPlaceBrace,
	/// `]` closed a container that is not an array.
	#[error("out of place square bracket")]
	OutOfPlaceSquareBracket,
	/// Number token does not match the JSON number grammar.
	#[error("invalid number format")]
	BadNumberFormat,
	/// Value token is not a JSON number, string, boolean, or null.
	#[error("value is not a JSON number, string, boolean, or null")]
	BadFormat,
	/// Input ended before the root container closed.
	#[error("unexpected end of input")]
	UnexpectedEnd,
}

/// A parse failure with its 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} (line {line}, column {column})")]
pub struct ParseError {
	/// What went wrong.
	pub kind: ParseErrorKind,
	/// 1-based line of the offending character.
	pub line: usize,
	/// 1-based column of the offending character.
	pub column: usize,
}

impl ParseError {
	/// Build an error at an explicit position.
	pub fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
		Self { kind, line, column }
	}
}
