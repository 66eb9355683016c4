use crate::arithmetic::{BinaryOp, UnaryOp};
use crate::cursor::TokenCursor;
use crate::diagnostics::PreprocessorError;
use crate::expr::{BinaryNode, DefinedNode, ExprNode, IdentifierNode, NumberNode, TernaryNode, UnaryNode};
use crate::token::TokenKind;

/// Parses a `#if`/`#elif` constant expression directly off the shared token cursor, stopping
/// naturally at the first token the grammar doesn't consume (in practice, the line's trailing
/// `Newline`). This mirrors how the reference calls straight into its expression parser with the
/// compiler's live token vector rather than first slicing out "the rest of this line" into its
/// own buffer.
///
/// Precedence, loosest to tightest: ternary, logical-or, logical-and, bitwise-or, bitwise-xor,
/// bitwise-and, equality, relational, shift, additive, multiplicative, unary, primary.
pub struct ExpressionParser<'cursor> {
	cursor: &'cursor mut TokenCursor,
}

impl<'cursor> ExpressionParser<'cursor> {
	#[must_use]
	pub fn new(cursor: &'cursor mut TokenCursor) -> Self {
		Self { cursor }
	}

	pub fn parse(&mut self) -> Result<ExprNode, PreprocessorError> {
		self.parse_ternary()
	}

	fn current_line(&self) -> usize {
		self.cursor.peek().map_or_else(|| self.cursor.previous().map_or(0, |token| token.line), |token| token.line)
	}

	fn parse_ternary(&mut self) -> Result<ExprNode, PreprocessorError> {
		let condition = self.parse_logical_or()?;
		if matches!(self.cursor.peek().map(|token| token.kind), Some(TokenKind::Question)) {
			self.cursor.next();
			let consequent = self.parse_ternary()?;
			self.expect(TokenKind::Colon, "expected ':' in ternary expression")?;
			let alternative = self.parse_ternary()?;
			return Ok(ExprNode::Ternary(TernaryNode { condition: Box::new(condition), consequent: Box::new(consequent), alternative: Box::new(alternative) }));
		}
		Ok(condition)
	}

	fn parse_logical_or(&mut self) -> Result<ExprNode, PreprocessorError> {
		self.parse_binary_level(Self::parse_logical_and, &[(TokenKind::PipePipe, BinaryOp::LogicalOr)])
	}

	fn parse_logical_and(&mut self) -> Result<ExprNode, PreprocessorError> {
		self.parse_binary_level(Self::parse_bit_or, &[(TokenKind::AmpAmp, BinaryOp::LogicalAnd)])
	}

	fn parse_bit_or(&mut self) -> Result<ExprNode, PreprocessorError> {
		self.parse_binary_level(Self::parse_bit_xor, &[(TokenKind::Pipe, BinaryOp::BitOr)])
	}

	fn parse_bit_xor(&mut self) -> Result<ExprNode, PreprocessorError> {
		self.parse_binary_level(Self::parse_bit_and, &[(TokenKind::Caret, BinaryOp::BitXor)])
	}

	fn parse_bit_and(&mut self) -> Result<ExprNode, PreprocessorError> {
		self.parse_binary_level(Self::parse_equality, &[(TokenKind::Amp, BinaryOp::BitAnd)])
	}

	fn parse_equality(&mut self) -> Result<ExprNode, PreprocessorError> {
		self.parse_binary_level(Self::parse_relational, &[(TokenKind::EqualEqual, BinaryOp::Equal), (TokenKind::BangEqual, BinaryOp::NotEqual)])
	}

	fn parse_relational(&mut self) -> Result<ExprNode, PreprocessorError> {
		self.parse_binary_level(
			Self::parse_shift,
			&[
				(TokenKind::Less, BinaryOp::Less),
				(TokenKind::Greater, BinaryOp::Greater),
				(TokenKind::LessEqual, BinaryOp::LessEqual),
				(TokenKind::GreaterEqual, BinaryOp::GreaterEqual),
			],
		)
	}

	fn parse_shift(&mut self) -> Result<ExprNode, PreprocessorError> {
		self.parse_binary_level(Self::parse_additive, &[(TokenKind::LeftShift, BinaryOp::LeftShift), (TokenKind::RightShift, BinaryOp::RightShift)])
	}

	fn parse_additive(&mut self) -> Result<ExprNode, PreprocessorError> {
		self.parse_binary_level(Self::parse_multiplicative, &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Subtract)])
	}

	fn parse_multiplicative(&mut self) -> Result<ExprNode, PreprocessorError> {
		self.parse_binary_level(Self::parse_unary, &[(TokenKind::Star, BinaryOp::Multiply), (TokenKind::Slash, BinaryOp::Divide), (TokenKind::Percent, BinaryOp::Modulo)])
	}

	/// Parses one precedence level: a sub-expression via `next_level`, followed by zero or more
	/// `(operator, sub-expression)` pairs whose operator matches one of `operators`, folded
	/// left-associatively.
	fn parse_binary_level(&mut self, next_level: fn(&mut Self) -> Result<ExprNode, PreprocessorError>, operators: &[(TokenKind, BinaryOp)]) -> Result<ExprNode, PreprocessorError> {
		let mut left = next_level(self)?;
		while let Some(op) = self.cursor.peek().and_then(|token| operators.iter().find(|(kind, _)| *kind == token.kind).map(|(_, op)| *op)) {
			self.cursor.next();
			let right = next_level(self)?;
			left = ExprNode::Binary(BinaryNode { op, left: Box::new(left), right: Box::new(right) });
		}
		Ok(left)
	}

	fn parse_unary(&mut self) -> Result<ExprNode, PreprocessorError> {
		let op = match self.cursor.peek().map(|token| token.kind) {
			Some(TokenKind::Plus) => Some(UnaryOp::Plus),
			Some(TokenKind::Minus) => Some(UnaryOp::Negate),
			Some(TokenKind::Bang) => Some(UnaryOp::LogicalNot),
			Some(TokenKind::Tilde) => Some(UnaryOp::BitNot),
			_ => None,
		};
		if let Some(op) = op {
			self.cursor.next();
			let operand = self.parse_unary()?;
			return Ok(ExprNode::Unary(UnaryNode { op, operand: Box::new(operand) }));
		}
		self.parse_primary()
	}

	fn parse_primary(&mut self) -> Result<ExprNode, PreprocessorError> {
		let line = self.current_line();
		let Some(token) = self.cursor.peek() else {
			return Err(PreprocessorError::new(line, "expected expression but found end of input".to_owned()));
		};

		match token.kind {
			TokenKind::Number => {
				let value = token.value.parse::<i64>().map_err(|_| PreprocessorError::new(line, format!("invalid number literal \"{}\"", token.value)))?;
				self.cursor.next();
				Ok(ExprNode::Number(NumberNode { value }))
			},
			TokenKind::Identifier if token.value == "defined" => {
				self.cursor.next();
				self.parse_defined()
			},
			TokenKind::Identifier => {
				let name = token.value.clone();
				self.cursor.next();
				Ok(ExprNode::Identifier(IdentifierNode { name }))
			},
			TokenKind::LeftParen => {
				self.cursor.next();
				let inner = self.parse_ternary()?;
				self.expect(TokenKind::RightParen, "expected ')' to close expression")?;
				Ok(inner)
			},
			_ => Err(PreprocessorError::new(line, format!("expected expression but found \"{}\"", token.value))),
		}
	}

	fn parse_defined(&mut self) -> Result<ExprNode, PreprocessorError> {
		let line = self.current_line();
		let parenthesized = matches!(self.cursor.peek().map(|token| token.kind), Some(TokenKind::LeftParen));
		if parenthesized {
			self.cursor.next();
		}

		let name = match self.cursor.peek() {
			Some(token) if token.kind == TokenKind::Identifier => token.value.clone(),
			_ => return Err(PreprocessorError::new(line, "expected identifier after \"defined\"".to_owned())),
		};
		self.cursor.next();

		if parenthesized {
			self.expect(TokenKind::RightParen, "expected ')' after \"defined(...\"")?;
		}

		Ok(ExprNode::Defined(DefinedNode { name }))
	}

	fn expect(&mut self, kind: TokenKind, message: &str) -> Result<(), PreprocessorError> {
		let line = self.current_line();
		match self.cursor.peek() {
			Some(token) if token.kind == kind => {
				self.cursor.next();
				Ok(())
			},
			_ => Err(PreprocessorError::new(line, message.to_owned())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::ExpressionParser;
	use crate::arithmetic::DefaultArithmetic;
	use crate::cursor::TokenCursor;
	use crate::definitions::DefinitionTable;
	use crate::expr::Evaluate as _;
	use crate::token::{Token, TokenKind};

	fn eval(tokens: Vec<Token>) -> i64 {
		let mut cursor = TokenCursor::new(tokens);
		let node = ExpressionParser::new(&mut cursor).parse().unwrap();
		node.evaluate(&DefinitionTable::new(), &DefaultArithmetic).unwrap()
	}

	fn num(value: &str) -> Token {
		Token::new(TokenKind::Number, value.to_owned(), 1, false)
	}

	fn sym(kind: TokenKind, value: &str) -> Token {
		Token::new(kind, value.to_owned(), 1, false)
	}

	#[test]
	fn multiplication_binds_tighter_than_addition() {
		// 2 + 3 * 4 == 14, not 20
		let tokens = vec![num("2"), sym(TokenKind::Plus, "+"), num("3"), sym(TokenKind::Star, "*"), num("4")];
		assert_eq!(eval(tokens), 14);
	}

	#[test]
	fn parentheses_override_precedence() {
		let tokens = vec![
			sym(TokenKind::LeftParen, "("),
			num("2"),
			sym(TokenKind::Plus, "+"),
			num("3"),
			sym(TokenKind::RightParen, ")"),
			sym(TokenKind::Star, "*"),
			num("4"),
		];
		assert_eq!(eval(tokens), 20);
	}

	#[test]
	fn ternary_picks_the_right_branch() {
		let tokens = vec![num("0"), sym(TokenKind::Question, "?"), num("1"), sym(TokenKind::Colon, ":"), num("2")];
		assert_eq!(eval(tokens), 2);
	}

	#[test]
	fn unary_not_and_relational() {
		let tokens = vec![sym(TokenKind::Bang, "!"), num("0"), sym(TokenKind::AmpAmp, "&&"), num("1"), sym(TokenKind::Less, "<"), num("2")];
		assert_eq!(eval(tokens), 1);
	}

	#[test]
	fn defined_without_parens() {
		let tokens = vec![sym(TokenKind::Identifier, "defined"), sym(TokenKind::Identifier, "FOO")];
		assert_eq!(eval(tokens), 0);
	}

	#[test]
	fn defined_with_parens() {
		let tokens = vec![sym(TokenKind::Identifier, "defined"), sym(TokenKind::LeftParen, "("), sym(TokenKind::Identifier, "FOO"), sym(TokenKind::RightParen, ")")];
		assert_eq!(eval(tokens), 0);
	}

	#[test]
	fn unbalanced_parens_is_an_error() {
		let mut cursor = TokenCursor::new(vec![sym(TokenKind::LeftParen, "("), num("1")]);
		assert!(ExpressionParser::new(&mut cursor).parse().is_err());
	}
}
