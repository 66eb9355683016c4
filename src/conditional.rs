use crate::cursor::TokenCursor;
use crate::diagnostics::PreprocessorError;
use crate::directive::{peek_directive, Directive};
use crate::preprocessor::Preprocessor;

/// Runs the driver forward through a *taken* conditional branch until this block's own `#endif`,
/// then consumes it. Everything encountered in between — plain tokens, `#define`/`#undef`,
/// nested `#if`/`#ifdef`/`#ifndef` blocks — is processed exactly as it would be at the top level,
/// by re-entering `Preprocessor::process_token`. A nested conditional's own `read_to_endif` or
/// `skip_to_endif` call fully consumes that nested block (including its closing `#endif`) before
/// returning here, so by construction the first bare `#endif` this function's own lookahead can
/// see belongs to it, not to some inner block.
///
/// # Errors
/// Returns a fatal error if the input is exhausted before a matching `#endif` is found.
pub fn read_to_endif(preprocessor: &mut Preprocessor) -> Result<(), PreprocessorError> {
	loop {
		if preprocessor.cursor().is_at_end() {
			return Err(PreprocessorError::new(0, "unbalanced #endif: reached end of input while looking for one".to_owned()));
		}

		if matches!(peek_directive(preprocessor.cursor()), Some(Directive::Endif)) {
			preprocessor.cursor_mut().next();
			preprocessor.cursor_mut().next();
			return Ok(());
		}

		preprocessor.process_token()?;
	}
}

/// Discards tokens up to and including this block's matching `#endif`, without evaluating
/// anything or writing to output — the false branch of an `#if`/`#ifdef`/`#ifndef`. Nested
/// conditionals inside the skipped region are tracked by depth only; their conditions are never
/// evaluated, matching standard C preprocessor behavior of not looking at dead code closely
/// enough to trip over, say, a division-by-zero in an untaken nested `#if`.
///
/// # Errors
/// Returns a fatal error if the input is exhausted before a matching `#endif` is found.
pub fn skip_to_endif(cursor: &mut TokenCursor) -> Result<(), PreprocessorError> {
	let mut depth = 0usize;
	loop {
		if cursor.is_at_end() {
			return Err(PreprocessorError::new(0, "unbalanced #endif: reached end of input while looking for one".to_owned()));
		}

		match peek_directive(cursor) {
			Some(Directive::If | Directive::Ifdef | Directive::Ifndef) => {
				depth += 1;
				cursor.next();
				cursor.next();
			},
			Some(Directive::Endif) if depth == 0 => {
				cursor.next();
				cursor.next();
				return Ok(());
			},
			Some(Directive::Endif) => {
				depth -= 1;
				cursor.next();
				cursor.next();
			},
			_ => {
				cursor.next();
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::skip_to_endif;
	use crate::cursor::TokenCursor;
	use crate::token::{Token, TokenKind};

	fn ident(value: &str) -> Token {
		Token::new(TokenKind::Identifier, value.to_owned(), 1, true)
	}

	fn newline() -> Token {
		Token::new(TokenKind::Newline, "\n".to_owned(), 1, false)
	}

	fn hash() -> Token {
		Token::new(TokenKind::Hashtag, "#".to_owned(), 1, false)
	}

	#[test]
	fn skip_stops_at_its_own_endif_not_a_nested_one() {
		// #ifdef A <skipped body with a nested #ifdef/#endif> #endif <survivor>
		let mut cursor = TokenCursor::new(vec![
			hash(),
			ident("ifdef"),
			ident("A"),
			newline(),
			hash(),
			ident("ifdef"),
			ident("B"),
			newline(),
			ident("dead"),
			newline(),
			hash(),
			ident("endif"),
			newline(),
			hash(),
			ident("endif"),
			newline(),
			ident("survivor"),
		]);
		// Consume the opening #ifdef A line ourselves, as the driver would have before delegating here.
		cursor.next();
		cursor.next();
		cursor.next();
		skip_to_endif(&mut cursor).unwrap();
		assert_eq!(cursor.peek().unwrap().value, "\n");
		cursor.next();
		assert_eq!(cursor.peek().unwrap().value, "survivor");
	}

	#[test]
	fn unterminated_conditional_is_fatal() {
		let mut cursor = TokenCursor::new(vec![ident("dead")]);
		assert!(skip_to_endif(&mut cursor).is_err());
	}
}
