use crate::cursor::TokenCursor;
use crate::definitions::{Definition, DefinitionTable};
use crate::diagnostics::{DiagnosticSink, PreprocessorError};
use crate::includes::IncludeRegistry;
use crate::token::{Token, TokenKind};

/// Every directive spelling this core recognizes after a `#`. `Include` and `Typedef` are
/// recognized but not acted on beyond consuming their line (see `dispatch_hash`); everything else
/// is fully implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
	Define,
	Undef,
	Warning,
	Error,
	If,
	Ifdef,
	Ifndef,
	Endif,
	Include,
	Typedef,
}

static DIRECTIVE_NAMES: phf::Map<&'static str, Directive> = phf::phf_map! {
	"define" => Directive::Define,
	"undef" => Directive::Undef,
	"warning" => Directive::Warning,
	"error" => Directive::Error,
	"if" => Directive::If,
	"ifdef" => Directive::Ifdef,
	"ifndef" => Directive::Ifndef,
	"endif" => Directive::Endif,
	"include" => Directive::Include,
	"typedef" => Directive::Typedef,
};

/// Looks up whether `name` is a recognized directive spelling. A token qualifies as a directive
/// name candidate only if it's lexically an identifier or keyword-shaped word; the reference has
/// a real operator-precedence bug here (`kind == identifier || kind == keyword && name in table`,
/// which due to `&&` binding tighter than `||` accepts *any* identifier that merely LOOKS like one
/// of the directive names, regardless of the membership test — effectively always true for
/// identifiers). This is corrected to the evidently intended
/// `(kind == identifier || kind == keyword) && name in table`.
#[must_use]
pub fn recognize(token: &Token) -> Option<Directive> {
	if !token.could_name_a_directive() {
		return None;
	}
	DIRECTIVE_NAMES.get(token.value.as_str()).copied()
}

/// Looks, without consuming anything, at whether the cursor is currently sitting at the start of
/// a directive line: the previous token (if any) was a `Newline`, the next token is `Hashtag`, and
/// the one after that names a recognized directive. Used by the conditional engine to find its own
/// closing `#endif` without disturbing the cursor if it isn't there yet.
#[must_use]
pub fn peek_directive(cursor: &TokenCursor) -> Option<Directive> {
	let at_line_start = cursor.previous().map_or(true, |token| token.kind == TokenKind::Newline);
	if !at_line_start {
		return None;
	}
	if cursor.peek()?.kind != TokenKind::Hashtag {
		return None;
	}
	recognize(cursor.peek_nth(1)?)
}

/// What happened when the dispatcher was handed a `#` token.
#[derive(Debug)]
pub enum DispatchOutcome {
	/// The directive was fully handled in place (`#define`, `#undef`) or recognized but
	/// deliberately inert (`#include`, `#typedef` — see the design notes).
	Handled,
	/// The directive names one of the conditional-inclusion keywords; the caller (the driver)
	/// must hand control to the conditional engine, which needs to recurse back into the driver
	/// itself to process a taken branch.
	Conditional(Directive),
	/// Neither `#` nor the token after it named a recognized directive. Both tokens are handed
	/// back so the caller can emit them to output unchanged, instead of the reference's behavior
	/// of dropping the second token (see the design notes).
	NotRecognized(Token, Token),
}

/// Consumes a `#` token (already known to start a logical line) and the identifier that follows
/// it, and dispatches to the matching directive handler.
///
/// # Errors
/// Returns a fatal error if `#define`/`#undef` is malformed, if `#error` was encountered, if `#`
/// is the last token in the input with nothing following it, or if a bare `#endif` has no
/// enclosing conditional.
pub fn dispatch_hash(
	hash: Token,
	cursor: &mut TokenCursor,
	definitions: &mut DefinitionTable,
	includes: &mut IncludeRegistry,
	diagnostics: &mut dyn DiagnosticSink,
) -> Result<DispatchOutcome, PreprocessorError> {
	let Some(name_token) = cursor.next().cloned() else {
		return Err(PreprocessorError::new(hash.line, "expected a directive name after '#'".to_owned()));
	};

	let Some(directive) = recognize(&name_token) else {
		return Ok(DispatchOutcome::NotRecognized(hash, name_token));
	};

	match directive {
		Directive::Define => {
			handle_define(&name_token, cursor, definitions, diagnostics)?;
			Ok(DispatchOutcome::Handled)
		},
		Directive::Undef => {
			handle_undef(&name_token, cursor, definitions)?;
			Ok(DispatchOutcome::Handled)
		},
		Directive::Warning => {
			let message = capture_rest_of_line_as_text(cursor);
			diagnostics.warn(name_token.line, &message);
			Ok(DispatchOutcome::Handled)
		},
		Directive::Error => Err(PreprocessorError::new(name_token.line, capture_rest_of_line_as_text(cursor))),
		Directive::Include => {
			handle_include(&name_token, cursor, includes, diagnostics)?;
			Ok(DispatchOutcome::Handled)
		},
		Directive::Typedef => {
			consume_rest_of_line(cursor);
			diagnostics.warn(name_token.line, "#typedef is recognized but not implemented by this preprocessor core");
			Ok(DispatchOutcome::Handled)
		},
		Directive::Endif => Err(PreprocessorError::new(name_token.line, "#endif without matching #if/#ifdef/#ifndef".to_owned())),
		Directive::If | Directive::Ifdef | Directive::Ifndef => Ok(DispatchOutcome::Conditional(directive)),
	}
}

fn handle_define(name_token: &Token, cursor: &mut TokenCursor, definitions: &mut DefinitionTable, diagnostics: &mut dyn DiagnosticSink) -> Result<(), PreprocessorError> {
	let Some(macro_name) = cursor.peek().filter(|token| token.kind == TokenKind::Identifier).cloned() else {
		return Err(PreprocessorError::new(name_token.line, "expected macro name after #define".to_owned()));
	};
	cursor.next();

	let is_function_like = matches!(cursor.peek(), Some(open) if open.kind == TokenKind::LeftParen && !open.leading_whitespace);

	let mut parameters = Vec::new();
	if is_function_like {
		cursor.next();
		if !matches!(cursor.peek(), Some(token) if token.kind == TokenKind::RightParen) {
			loop {
				let Some(parameter) = cursor.peek().filter(|token| token.kind == TokenKind::Identifier).cloned() else {
					return Err(PreprocessorError::new(macro_name.line, "incomplete sequence for macro parameters".to_owned()));
				};
				cursor.next();
				parameters.push(parameter.value);
				if matches!(cursor.peek(), Some(token) if token.kind == TokenKind::Comma) {
					cursor.next();
					continue;
				}
				break;
			}
		}
		match cursor.next() {
			Some(token) if token.kind == TokenKind::RightParen => {},
			_ => return Err(PreprocessorError::new(macro_name.line, "incomplete sequence for macro arguments".to_owned())),
		}
	}

	let mut replacement = Vec::new();
	while let Some(token) = cursor.peek() {
		if token.kind == TokenKind::Newline {
			break;
		}
		replacement.push(cursor.next().cloned().unwrap_or_else(|| unreachable!("peek() just confirmed a token is present")));
	}

	let definition = Definition { name: macro_name.value.clone(), is_function_like, parameters, replacement };
	if definitions.define(definition) {
		diagnostics.warn(macro_name.line, &format!("\"{}\" redefined with a different body", macro_name.value));
	}

	Ok(())
}

fn handle_undef(name_token: &Token, cursor: &mut TokenCursor, definitions: &mut DefinitionTable) -> Result<(), PreprocessorError> {
	let Some(macro_name) = cursor.next().cloned() else {
		return Err(PreprocessorError::new(name_token.line, "expected macro name after #undef".to_owned()));
	};
	if macro_name.kind != TokenKind::Identifier {
		return Err(PreprocessorError::new(macro_name.line, "expected macro name after #undef".to_owned()));
	}
	definitions.undefine(&macro_name.value);
	consume_rest_of_line(cursor);
	Ok(())
}

fn handle_include(name_token: &Token, cursor: &mut TokenCursor, includes: &mut IncludeRegistry, diagnostics: &mut dyn DiagnosticSink) -> Result<(), PreprocessorError> {
	let Some(path_token) = cursor.next().cloned() else {
		return Err(PreprocessorError::new(name_token.line, "expected a file path after #include".to_owned()));
	};
	includes.record(path_token.value, name_token.line);
	consume_rest_of_line(cursor);
	diagnostics.warn(name_token.line, "#include is recognized but file resolution is not implemented by this preprocessor core");
	Ok(())
}

pub(crate) fn consume_rest_of_line(cursor: &mut TokenCursor) {
	while let Some(token) = cursor.peek() {
		if token.kind == TokenKind::Newline {
			break;
		}
		cursor.next();
	}
}

/// Consumes the rest of the logical line and joins every token's spelling with a single space,
/// for `#warning`/`#error`'s "concatenated string" rest-of-line argument (spec.md 4.D).
fn capture_rest_of_line_as_text(cursor: &mut TokenCursor) -> String {
	let mut words = Vec::new();
	while let Some(token) = cursor.peek() {
		if token.kind == TokenKind::Newline {
			break;
		}
		words.push(cursor.next().unwrap_or_else(|| unreachable!("peek() just confirmed a token is present")).value.clone());
	}
	words.join(" ")
}

#[cfg(test)]
mod tests {
	use super::{dispatch_hash, peek_directive, Directive, DispatchOutcome};
	use crate::cursor::TokenCursor;
	use crate::definitions::DefinitionTable;
	use crate::diagnostics::CollectingDiagnostics;
	use crate::includes::IncludeRegistry;
	use crate::token::{Token, TokenKind};

	fn ident(value: &str) -> Token {
		Token::new(TokenKind::Identifier, value.to_owned(), 1, true)
	}

	fn num(value: &str) -> Token {
		Token::new(TokenKind::Number, value.to_owned(), 1, true)
	}

	fn hash() -> Token {
		Token::new(TokenKind::Hashtag, "#".to_owned(), 1, false)
	}

	#[test]
	fn object_like_define_installs_a_definition() {
		let mut cursor = TokenCursor::new(vec![ident("define"), ident("FOO"), num("1")]);
		let mut definitions = DefinitionTable::new();
		let mut includes = IncludeRegistry::new();
		let mut sink = CollectingDiagnostics::default();
		let outcome = dispatch_hash(hash(), &mut cursor, &mut definitions, &mut includes, &mut sink).unwrap();
		assert!(matches!(outcome, DispatchOutcome::Handled));
		assert!(definitions.is_defined("FOO"));
	}

	#[test]
	fn function_like_define_parses_parameter_list() {
		let mut open = Token::new(TokenKind::LeftParen, "(".to_owned(), 1, false);
		open.leading_whitespace = false;
		let mut cursor = TokenCursor::new(vec![
			ident("define"),
			ident("ADD"),
			open,
			ident("a"),
			Token::new(TokenKind::Comma, ",".to_owned(), 1, false),
			ident("b"),
			Token::new(TokenKind::RightParen, ")".to_owned(), 1, false),
			ident("a"),
			Token::new(TokenKind::Plus, "+".to_owned(), 1, true),
			ident("b"),
		]);
		let mut definitions = DefinitionTable::new();
		let mut includes = IncludeRegistry::new();
		let mut sink = CollectingDiagnostics::default();
		dispatch_hash(hash(), &mut cursor, &mut definitions, &mut includes, &mut sink).unwrap();
		let definition = definitions.get("ADD").unwrap();
		assert!(definition.is_function_like);
		assert_eq!(definition.parameters, vec!["a".to_owned(), "b".to_owned()]);
		assert_eq!(definition.replacement.len(), 3);
	}

	#[test]
	fn define_followed_by_whitespace_then_paren_is_object_like() {
		let mut cursor = TokenCursor::new(vec![
			ident("define"),
			ident("FOO"),
			Token::new(TokenKind::LeftParen, "(".to_owned(), 1, true),
			num("1"),
			Token::new(TokenKind::RightParen, ")".to_owned(), 1, false),
		]);
		let mut definitions = DefinitionTable::new();
		let mut includes = IncludeRegistry::new();
		let mut sink = CollectingDiagnostics::default();
		dispatch_hash(hash(), &mut cursor, &mut definitions, &mut includes, &mut sink).unwrap();
		let definition = definitions.get("FOO").unwrap();
		assert!(!definition.is_function_like);
	}

	#[test]
	fn undef_removes_a_definition() {
		let mut definitions = DefinitionTable::new();
		definitions.define(crate::definitions::Definition {
			name: "FOO".to_owned(),
			is_function_like: false,
			parameters: Vec::new(),
			replacement: vec![num("1")],
		});
		let mut cursor = TokenCursor::new(vec![ident("undef"), ident("FOO")]);
		let mut includes = IncludeRegistry::new();
		let mut sink = CollectingDiagnostics::default();
		dispatch_hash(hash(), &mut cursor, &mut definitions, &mut includes, &mut sink).unwrap();
		assert!(!definitions.is_defined("FOO"));
	}

	#[test]
	fn unrecognized_directive_returns_both_tokens_for_passthrough() {
		let mut cursor = TokenCursor::new(vec![ident("pragma"), ident("once")]);
		let mut definitions = DefinitionTable::new();
		let mut includes = IncludeRegistry::new();
		let mut sink = CollectingDiagnostics::default();
		let outcome = dispatch_hash(hash(), &mut cursor, &mut definitions, &mut includes, &mut sink).unwrap();
		match outcome {
			DispatchOutcome::NotRecognized(hash_token, name_token) => {
				assert_eq!(hash_token.value, "#");
				assert_eq!(name_token.value, "pragma");
			},
			_ => panic!("expected NotRecognized"),
		}
	}

	#[test]
	fn bare_endif_is_fatal() {
		let mut cursor = TokenCursor::new(vec![ident("endif")]);
		let mut definitions = DefinitionTable::new();
		let mut includes = IncludeRegistry::new();
		let mut sink = CollectingDiagnostics::default();
		assert!(dispatch_hash(hash(), &mut cursor, &mut definitions, &mut includes, &mut sink).is_err());
	}

	#[test]
	fn peek_directive_requires_a_preceding_newline_or_start_of_input() {
		let mut cursor = TokenCursor::new(vec![hash(), ident("endif"), ident("FOO"), hash(), ident("endif")]);
		assert_eq!(peek_directive(&cursor), Some(Directive::Endif));
		cursor.next();
		cursor.next();
		cursor.next();
		assert_eq!(peek_directive(&cursor), None, "a '#' not preceded by a newline isn't a directive line");
	}

	#[test]
	fn include_is_recognized_but_inert_and_recorded() {
		let mut cursor = TokenCursor::new(vec![ident("include"), Token::new(TokenKind::Other, "\"local.h\"".to_owned(), 1, true)]);
		let mut definitions = DefinitionTable::new();
		let mut includes = IncludeRegistry::new();
		let mut sink = CollectingDiagnostics::default();
		let outcome = dispatch_hash(hash(), &mut cursor, &mut definitions, &mut includes, &mut sink).unwrap();
		assert!(matches!(outcome, DispatchOutcome::Handled));
		assert_eq!(includes.entries().len(), 1);
		assert_eq!(sink.warnings.len(), 1);
	}

	#[test]
	fn warning_directive_emits_the_rest_of_the_line_and_is_handled() {
		let mut cursor = TokenCursor::new(vec![ident("warning"), ident("deprecated"), ident("API")]);
		let mut definitions = DefinitionTable::new();
		let mut includes = IncludeRegistry::new();
		let mut sink = CollectingDiagnostics::default();
		let outcome = dispatch_hash(hash(), &mut cursor, &mut definitions, &mut includes, &mut sink).unwrap();
		assert!(matches!(outcome, DispatchOutcome::Handled));
		assert_eq!(sink.warnings, vec![(1, "deprecated API".to_owned())]);
	}

	#[test]
	fn error_directive_is_fatal_with_the_rest_of_the_line_as_the_message() {
		let mut cursor = TokenCursor::new(vec![ident("error"), ident("unsupported"), ident("platform")]);
		let mut definitions = DefinitionTable::new();
		let mut includes = IncludeRegistry::new();
		let mut sink = CollectingDiagnostics::default();
		let error = dispatch_hash(hash(), &mut cursor, &mut definitions, &mut includes, &mut sink).unwrap_err();
		assert_eq!(error.message, "unsupported platform");
	}
}
