use crate::arithmetic::{ArithmeticHost, DefaultArithmetic};
use crate::conditional;
use crate::cursor::TokenCursor;
use crate::definitions::DefinitionTable;
use crate::diagnostics::{DiagnosticSink, PreprocessorError, StderrDiagnostics};
use crate::directive::{self, Directive, DispatchOutcome};
use crate::expr::parser::ExpressionParser;
use crate::expr::Evaluate as _;
use crate::includes::IncludeRegistry;
use crate::token::{Token, TokenKind};

/// The driver: walks the token stream exactly once, dispatching directives and copying everything
/// else straight through to output. This struct owns every other component (the cursor, the
/// definition table, the include registry) and is the thing both the top-level `run()` entry point
/// and the conditional engine's `read_to_endif` re-enter, since the driver carries no per-call
/// state beyond what's already sitting on `self`.
pub struct Preprocessor {
	cursor: TokenCursor,
	definitions: DefinitionTable,
	includes: IncludeRegistry,
	output: Vec<Token>,
	diagnostics: Box<dyn DiagnosticSink>,
	arithmetic: Box<dyn ArithmeticHost>,
}

impl Preprocessor {
	#[must_use]
	pub fn new(tokens: Vec<Token>) -> Self {
		Self::with_collaborators(tokens, Box::new(StderrDiagnostics), Box::new(DefaultArithmetic))
	}

	#[must_use]
	pub fn with_collaborators(tokens: Vec<Token>, diagnostics: Box<dyn DiagnosticSink>, arithmetic: Box<dyn ArithmeticHost>) -> Self {
		Self { cursor: TokenCursor::new(tokens), definitions: DefinitionTable::new(), includes: IncludeRegistry::new(), output: Vec::new(), diagnostics, arithmetic }
	}

	/// Runs the driver to completion and returns the preprocessed token stream.
	///
	/// # Errors
	/// Returns the first fatal diagnostic encountered (a malformed directive, an unbalanced
	/// `#endif`, a malformed constant expression).
	pub fn run(mut self) -> Result<Vec<Token>, PreprocessorError> {
		while !self.cursor.is_at_end() {
			self.process_token()?;
		}
		Ok(self.output)
	}

	#[must_use]
	pub fn definitions(&self) -> &DefinitionTable {
		&self.definitions
	}

	#[must_use]
	pub fn includes(&self) -> &IncludeRegistry {
		&self.includes
	}

	pub(crate) fn cursor(&self) -> &TokenCursor {
		&self.cursor
	}

	pub(crate) fn cursor_mut(&mut self) -> &mut TokenCursor {
		&mut self.cursor
	}

	/// Processes exactly one step of input: a directive line consumed as a whole, one conditional
	/// block consumed as a whole (recursively), or a single plain token copied to output. Shared
	/// between the top-level loop in `run()` and `conditional::read_to_endif`, which re-enters it
	/// once per step inside a taken branch — this is the reentrancy the component is designed for.
	///
	/// # Errors
	/// Returns a fatal error from whatever this step dispatches into.
	pub fn process_token(&mut self) -> Result<(), PreprocessorError> {
		let Some(peeked) = self.cursor.peek() else {
			return Ok(());
		};

		if peeked.kind == TokenKind::Newline {
			self.cursor.next();
			return Ok(());
		}

		if peeked.kind == TokenKind::Hashtag {
			let at_line_start = self.cursor.previous().map_or(true, |token| token.kind == TokenKind::Newline);
			if at_line_start {
				let hash = self.cursor.next().cloned().unwrap_or_else(|| unreachable!("peek() just confirmed a token is present"));
				return self.dispatch_and_handle(hash);
			}
		}

		let token = self.cursor.next().cloned().unwrap_or_else(|| unreachable!("peek() just confirmed a token is present"));
		self.output.push(token);
		Ok(())
	}

	fn dispatch_and_handle(&mut self, hash: Token) -> Result<(), PreprocessorError> {
		match directive::dispatch_hash(hash.clone(), &mut self.cursor, &mut self.definitions, &mut self.includes, self.diagnostics.as_mut())? {
			DispatchOutcome::Handled => Ok(()),
			DispatchOutcome::NotRecognized(hash_token, name_token) => {
				self.output.push(hash_token);
				self.output.push(name_token);
				Ok(())
			},
			DispatchOutcome::Conditional(directive) => self.handle_conditional(directive, hash.line),
		}
	}

	fn handle_conditional(&mut self, directive: Directive, line: usize) -> Result<(), PreprocessorError> {
		let taken = match directive {
			Directive::If => {
				let node = ExpressionParser::new(&mut self.cursor).parse()?;
				node.evaluate(&self.definitions, self.arithmetic.as_ref())? != 0
			},
			Directive::Ifdef => {
				let name = self.expect_conditional_name(line)?;
				self.definitions.is_defined(&name)
			},
			Directive::Ifndef => {
				let name = self.expect_conditional_name(line)?;
				!self.definitions.is_defined(&name)
			},
			Directive::Define | Directive::Undef | Directive::Warning | Directive::Error | Directive::Include | Directive::Typedef | Directive::Endif => {
				unreachable!("dispatch_hash only returns Conditional for #if/#ifdef/#ifndef")
			},
		};

		directive::consume_rest_of_line(&mut self.cursor);

		if taken {
			conditional::read_to_endif(self)
		} else {
			conditional::skip_to_endif(&mut self.cursor)
		}
	}

	fn expect_conditional_name(&mut self, line: usize) -> Result<String, PreprocessorError> {
		match self.cursor.next() {
			Some(token) if token.kind == TokenKind::Identifier => Ok(token.value.clone()),
			_ => Err(PreprocessorError::new(line, "expected an identifier after #ifdef/#ifndef".to_owned())),
		}
	}
}
