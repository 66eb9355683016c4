use crate::token::{Token, TokenKind};

/// A position-tracking view over a fixed token stream.
///
/// The reference preprocessor walks a plain array with an integer index; this is the same idea,
/// just with the index kept private and the array immutable once constructed (the driver only
/// ever reads forward through it, it never splices tokens in). Lookahead that needs to backtrack
/// (testing whether a function-like macro invocation is really present, probing for a matching
/// `#endif`) is handled with an explicit checkpoint stack rather than re-lexing: `save()` pushes
/// the current position, `restore()` pops one and rewinds to it, and `save_purge()` pops one
/// without rewinding, committing to everything consumed since the matching `save()`.
pub struct TokenCursor {
	tokens: Vec<Token>,
	position: usize,
	checkpoints: Vec<usize>,
}

impl TokenCursor {
	#[must_use]
	pub fn new(tokens: Vec<Token>) -> Self {
		Self { tokens, position: 0, checkpoints: Vec::new() }
	}

	/// Returns the next token without consuming it, or `None` at end of input.
	#[must_use]
	pub fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.position)
	}

	/// Returns the token `offset` positions ahead of the next token without consuming anything.
	/// `peek_nth(0)` is equivalent to `peek()`. Used for fixed-depth lookahead (checking whether a
	/// `#` is immediately followed by a recognized directive name) where a full `save`/`restore`
	/// checkpoint would be overkill.
	#[must_use]
	pub fn peek_nth(&self, offset: usize) -> Option<&Token> {
		self.tokens.get(self.position + offset)
	}

	/// Returns the next non-newline token without consuming anything, skipping over any run of
	/// `Newline` tokens that precedes it. Used when a directive's argument grammar is allowed to
	/// continue onto the next physical line (the reference preprocessor does this nowhere, but
	/// `#if`/`#ifdef` lookahead within this crate never needs to; kept for parity with spec 4.A).
	#[must_use]
	pub fn peek_skip_newline(&self) -> Option<&Token> {
		let mut offset = self.position;
		while let Some(token) = self.tokens.get(offset) {
			if token.kind != TokenKind::Newline {
				return Some(token);
			}
			offset += 1;
		}
		None
	}

	/// Consumes and returns the next token, or `None` at end of input.
	pub fn next(&mut self) -> Option<&Token> {
		let token = self.tokens.get(self.position);
		if token.is_some() {
			self.position += 1;
		}
		token
	}

	/// Returns the most recently consumed token, or `None` if nothing has been consumed yet (or
	/// the cursor has just been rewound to the start). Used by the dispatcher to decide whether a
	/// `#` token sits at the start of a logical line: it must be checked before that `#` itself is
	/// consumed, otherwise this would report the `#` rather than what preceded it.
	#[must_use]
	pub fn previous(&self) -> Option<&Token> {
		self.position.checked_sub(1).and_then(|index| self.tokens.get(index))
	}

	/// Returns whether the cursor has no more tokens to consume.
	#[must_use]
	pub fn is_at_end(&self) -> bool {
		self.position >= self.tokens.len()
	}

	/// Pushes a checkpoint at the current position. Must be paired with exactly one `restore()`
	/// or `save_purge()`.
	pub fn save(&mut self) {
		self.checkpoints.push(self.position);
	}

	/// Rewinds to the most recent checkpoint and discards it.
	///
	/// # Panics
	/// Panics if there is no matching `save()`. A restore with nothing to restore to is a
	/// programming error in the caller, not a recoverable condition.
	pub fn restore(&mut self) {
		let checkpoint = self.checkpoints.pop().expect("restore() called with no matching save()");
		self.position = checkpoint;
	}

	/// Discards the most recent checkpoint without rewinding, committing to every token consumed
	/// since the matching `save()`.
	///
	/// # Panics
	/// Panics if there is no matching `save()`.
	pub fn save_purge(&mut self) {
		self.checkpoints.pop().expect("save_purge() called with no matching save()");
	}
}
