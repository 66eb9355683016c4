use convert_case::Casing as _;

/// The kind of a single preprocessor token. Unlike a full C lexer, this crate does not need to
/// distinguish every punctuation mark in the language: it only needs the handful of symbols the
/// directive dispatcher, the definition table, and the expression evaluator actually branch on.
/// Everything else a host lexer produces is carried through as `Other`, value intact.
#[derive(strum_macros::EnumIter, PartialEq, Eq, Debug, Clone, Copy)]
pub enum TokenKind {
	/// An identifier: a macro name, a directive spelling, or a bare name inside an expression.
	Identifier,
	/// A numeric constant, as it appeared in the source (`42`, `0x1F`, ...).
	Number,
	/// The `#` symbol. Only meaningful as the first non-newline token on a logical line.
	Hashtag,
	/// A logical end-of-line marker. The dispatcher and conditional engine use this to bound
	/// directive arguments and macro replacement lists.
	Newline,
	LeftParen,
	RightParen,
	Comma,
	Plus,
	Minus,
	Bang,
	Tilde,
	Star,
	Slash,
	Percent,
	LeftShift,
	RightShift,
	Less,
	Greater,
	LessEqual,
	GreaterEqual,
	EqualEqual,
	BangEqual,
	Amp,
	Caret,
	Pipe,
	AmpAmp,
	PipePipe,
	Question,
	Colon,
	/// Any token this crate has no opinion about. Passed through to output unchanged.
	Other,
}

impl std::fmt::Display for TokenKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", format!("{self:?}").to_case(convert_case::Case::Title))
	}
}

/// A single token handed to this crate by a host lexer.
///
/// `leading_whitespace` records whether the token was preceded by horizontal whitespace (spaces
/// or tabs, not a newline) in the original source. This is the only piece of lexical trivia the
/// directive engine cares about: a function-like macro invocation's argument list must open with
/// a `(` that has no leading whitespace, distinguishing `FOO(x)` (a call) from `FOO (x)` (an
/// object-like macro followed by a parenthesized expression).
#[derive(Debug, Clone)]
pub struct Token {
	pub kind: TokenKind,
	pub value: String,
	pub line: usize,
	pub leading_whitespace: bool,
}

impl Token {
	#[must_use]
	pub const fn new(kind: TokenKind, value: String, line: usize, leading_whitespace: bool) -> Self {
		Self { kind, value, line, leading_whitespace }
	}

	/// Returns whether this token is an identifier or a keyword-shaped word that could be the
	/// spelling of a preprocessor directive. Punctuation and numbers never qualify.
	#[must_use]
	pub const fn could_name_a_directive(&self) -> bool {
		matches!(self.kind, TokenKind::Identifier)
	}
}
