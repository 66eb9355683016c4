use crate::arithmetic::{ArithmeticHost, BinaryOp, UnaryOp};
use crate::cursor::TokenCursor;
use crate::definitions::DefinitionTable;
use crate::diagnostics::PreprocessorError;
use crate::expr::parser::ExpressionParser;

/// The expression parser: a dedicated precedence-climbing descent over the fixed grammar
/// `#if`/`#elif` constant expressions use. The reference source routes every expression through a
/// generic `expressionable_config` callback table shared with its full C-expression parser; this
/// crate has no second client for that indirection (see the design notes), so the grammar is
/// implemented directly against `ExprNode`.
pub mod parser;

/// A constant integer, as it appeared in the expression (after the host lexer already parsed its
/// digits into a value).
#[derive(Debug, Clone, Copy)]
pub struct NumberNode {
	pub value: i64,
}

/// A bare identifier appearing inside a constant expression. Per the documented deviation from
/// the reference (see the design notes), an identifier that names no macro folds to `0`, not `1`.
#[derive(Debug, Clone)]
pub struct IdentifierNode {
	pub name: String,
}

/// `defined X` or `defined(X)`. Evaluates to `1` if `X` is currently defined, `0` otherwise —
/// this is the one place a bare name's *definedness* rather than its *value* is being asked about.
#[derive(Debug, Clone)]
pub struct DefinedNode {
	pub name: String,
}

/// A unary operator applied to one sub-expression.
#[derive(Debug, Clone)]
pub struct UnaryNode {
	pub op: UnaryOp,
	pub operand: Box<ExprNode>,
}

/// A binary operator applied to two sub-expressions.
#[derive(Debug, Clone)]
pub struct BinaryNode {
	pub op: BinaryOp,
	pub left: Box<ExprNode>,
	pub right: Box<ExprNode>,
}

/// `condition ? consequent : alternative`.
#[derive(Debug, Clone)]
pub struct TernaryNode {
	pub condition: Box<ExprNode>,
	pub consequent: Box<ExprNode>,
	pub alternative: Box<ExprNode>,
}

/// Folds a node down to its integer value, given the current macro table and the host's
/// arithmetic primitive.
pub trait Evaluate {
	fn evaluate(&self, definitions: &DefinitionTable, arithmetic: &dyn ArithmeticHost) -> Result<i64, PreprocessorError>;
}

impl Evaluate for NumberNode {
	fn evaluate(&self, _definitions: &DefinitionTable, _arithmetic: &dyn ArithmeticHost) -> Result<i64, PreprocessorError> {
		Ok(self.value)
	}
}

impl Evaluate for IdentifierNode {
	fn evaluate(&self, definitions: &DefinitionTable, arithmetic: &dyn ArithmeticHost) -> Result<i64, PreprocessorError> {
		let Some(definition) = definitions.get(&self.name) else {
			return Ok(0);
		};
		if definition.is_function_like {
			return Ok(0);
		}
		evaluate_replacement_as_number(&self.name, definitions, arithmetic)
	}
}

impl Evaluate for DefinedNode {
	fn evaluate(&self, definitions: &DefinitionTable, _arithmetic: &dyn ArithmeticHost) -> Result<i64, PreprocessorError> {
		Ok(i64::from(definitions.is_defined(&self.name)))
	}
}

impl Evaluate for UnaryNode {
	fn evaluate(&self, definitions: &DefinitionTable, arithmetic: &dyn ArithmeticHost) -> Result<i64, PreprocessorError> {
		let operand = self.operand.evaluate(definitions, arithmetic)?;
		Ok(arithmetic.apply_unary(operand, self.op))
	}
}

impl Evaluate for BinaryNode {
	fn evaluate(&self, definitions: &DefinitionTable, arithmetic: &dyn ArithmeticHost) -> Result<i64, PreprocessorError> {
		let left = self.left.evaluate(definitions, arithmetic)?;
		let right = self.right.evaluate(definitions, arithmetic)?;
		arithmetic
			.apply(left, right, self.op)
			.map_err(|error| PreprocessorError::new(0, error.to_string()))
	}
}

impl Evaluate for TernaryNode {
	fn evaluate(&self, definitions: &DefinitionTable, arithmetic: &dyn ArithmeticHost) -> Result<i64, PreprocessorError> {
		if self.condition.evaluate(definitions, arithmetic)? != 0 {
			self.consequent.evaluate(definitions, arithmetic)
		} else {
			self.alternative.evaluate(definitions, arithmetic)
		}
	}
}

/// A node in a constant-expression tree. Named, boxed-struct variants rather than one flat struct
/// with an operator-tag-plus-optional-children layout (the reference's approach): each variant
/// carries exactly the fields its shape needs, and `enum_dispatch` generates the `match` that
/// routes `evaluate()` to the right one, so adding a node kind can never forget an arm.
#[derive(Debug, Clone)]
#[enum_dispatch::enum_dispatch(Evaluate)]
pub enum ExprNode {
	Number(NumberNode),
	Identifier(IdentifierNode),
	Defined(DefinedNode),
	Unary(UnaryNode),
	Binary(BinaryNode),
	Ternary(TernaryNode),
}

/// Recursion guard for self-referential object-like macros (`#define A A`). The reference has no
/// such guard and recurses until the process's stack is exhausted; this crate treats running past
/// the bound as the fatal condition it practically is, rather than letting it crash the host.
const MAX_IDENTIFIER_EXPANSION_DEPTH: usize = 64;

fn evaluate_replacement_as_number(name: &str, definitions: &DefinitionTable, arithmetic: &dyn ArithmeticHost) -> Result<i64, PreprocessorError> {
	evaluate_replacement_as_number_bounded(name, definitions, arithmetic, 0)
}

fn evaluate_replacement_as_number_bounded(name: &str, definitions: &DefinitionTable, arithmetic: &dyn ArithmeticHost, depth: usize) -> Result<i64, PreprocessorError> {
	if depth > MAX_IDENTIFIER_EXPANSION_DEPTH {
		return Err(PreprocessorError::new(0, format!("macro \"{name}\" expands into itself")));
	}

	let Some(definition) = definitions.get(name) else {
		return Ok(0);
	};

	if definition.replacement.is_empty() {
		return Ok(0);
	}

	if definition.replacement.len() > 1 {
		let mut cursor = TokenCursor::new(definition.replacement.clone());
		let node = ExpressionParser::new(&mut cursor).parse()?;
		return node.evaluate(definitions, arithmetic);
	}

	let first = definition.replacement.first().unwrap_or_else(|| unreachable!("just confirmed the replacement list holds exactly one token"));

	if let Ok(value) = first.value.parse::<i64>() {
		return Ok(value);
	}

	if definitions.is_defined(&first.value) && first.value != name {
		return evaluate_replacement_as_number_bounded(&first.value, definitions, arithmetic, depth + 1);
	}

	Err(PreprocessorError::new(0, format!("definition \"{name}\" does not hold a number value")))
}
