use convert_case::Casing as _;

/// A binary operator in a constant expression, in the precedence order the parser climbs through
/// from loosest to tightest: logical-or, logical-and, bitwise-or, bitwise-xor, bitwise-and,
/// equality, relational, shift, additive, multiplicative.
#[derive(strum_macros::EnumIter, PartialEq, Eq, Debug, Clone, Copy)]
pub enum BinaryOp {
	Add,
	Subtract,
	Multiply,
	Divide,
	Modulo,
	LeftShift,
	RightShift,
	Less,
	Greater,
	LessEqual,
	GreaterEqual,
	Equal,
	NotEqual,
	BitAnd,
	BitXor,
	BitOr,
	LogicalAnd,
	LogicalOr,
}

impl std::fmt::Display for BinaryOp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", format!("{self:?}").to_case(convert_case::Case::Title))
	}
}

/// A unary operator applied to a single constant-expression operand.
#[derive(strum_macros::EnumIter, PartialEq, Eq, Debug, Clone, Copy)]
pub enum UnaryOp {
	Plus,
	Negate,
	LogicalNot,
	BitNot,
}

/// Raised when a constant-expression operation can't be carried out, currently only division or
/// modulo by zero. Distinct from `PreprocessorError` because it's produced deep inside expression
/// folding, where the caller (the `#if` evaluator) is in a better position to attach a line number
/// and wrap it in the crate's real error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArithmeticError {
	pub op: BinaryOp,
}

impl std::fmt::Display for ArithmeticError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "division by zero in {} expression", self.op)
	}
}

impl std::error::Error for ArithmeticError {}

/// The host-provided integer arithmetic primitive constant expressions fold through. A real
/// compiler typically already has one central place implementing the target's integer semantics
/// (width, overflow behavior, signedness); this trait lets this crate delegate to it rather than
/// assume its own. `DefaultArithmetic` is what a standalone user of this crate reaches for absent
/// such a host.
pub trait ArithmeticHost {
	fn apply(&self, left: i64, right: i64, op: BinaryOp) -> Result<i64, ArithmeticError>;

	fn apply_unary(&self, operand: i64, op: UnaryOp) -> i64 {
		match op {
			UnaryOp::Plus => operand,
			UnaryOp::Negate => operand.wrapping_neg(),
			UnaryOp::LogicalNot => i64::from(operand == 0),
			UnaryOp::BitNot => !operand,
		}
	}
}

/// Two's-complement 64-bit integer arithmetic, matching the width C's preprocessor constant
/// expressions are specified to evaluate in (`intmax_t`).
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultArithmetic;

impl ArithmeticHost for DefaultArithmetic {
	fn apply(&self, left: i64, right: i64, op: BinaryOp) -> Result<i64, ArithmeticError> {
		Ok(match op {
			BinaryOp::Add => left.wrapping_add(right),
			BinaryOp::Subtract => left.wrapping_sub(right),
			BinaryOp::Multiply => left.wrapping_mul(right),
			BinaryOp::Divide => left.checked_div(right).ok_or(ArithmeticError { op })?,
			BinaryOp::Modulo => left.checked_rem(right).ok_or(ArithmeticError { op })?,
			BinaryOp::LeftShift => left.wrapping_shl(right as u32),
			BinaryOp::RightShift => left.wrapping_shr(right as u32),
			BinaryOp::Less => i64::from(left < right),
			BinaryOp::Greater => i64::from(left > right),
			BinaryOp::LessEqual => i64::from(left <= right),
			BinaryOp::GreaterEqual => i64::from(left >= right),
			BinaryOp::Equal => i64::from(left == right),
			BinaryOp::NotEqual => i64::from(left != right),
			BinaryOp::BitAnd => left & right,
			BinaryOp::BitXor => left ^ right,
			BinaryOp::BitOr => left | right,
			BinaryOp::LogicalAnd => i64::from(left != 0 && right != 0),
			BinaryOp::LogicalOr => i64::from(left != 0 || right != 0),
		})
	}
}
