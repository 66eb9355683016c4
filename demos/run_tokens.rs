//! Runs a small, hand-built token stream through `cprep_core::Preprocessor` and prints the
//! result. Stands in for the host lexer this crate expects to sit behind: a real caller would
//! hand it tokens from its own tokenizer rather than constructing them literally like this.

use colored::Colorize as _;
use cprep_core::{Preprocessor, Token, TokenKind};

fn token(kind: TokenKind, value: &str) -> Token {
	Token::new(kind, value.to_owned(), 1, false)
}

fn sample_tokens() -> Vec<Token> {
	// #define WIDTH 80
	// #if WIDTH > 40
	// wide_mode
	// #endif
	vec![
		token(TokenKind::Hashtag, "#"),
		token(TokenKind::Identifier, "define"),
		token(TokenKind::Identifier, "WIDTH"),
		token(TokenKind::Number, "80"),
		token(TokenKind::Newline, "\n"),
		token(TokenKind::Hashtag, "#"),
		token(TokenKind::Identifier, "if"),
		token(TokenKind::Identifier, "WIDTH"),
		token(TokenKind::Greater, ">"),
		token(TokenKind::Number, "40"),
		token(TokenKind::Newline, "\n"),
		token(TokenKind::Identifier, "wide_mode"),
		token(TokenKind::Newline, "\n"),
		token(TokenKind::Hashtag, "#"),
		token(TokenKind::Identifier, "endif"),
	]
}

fn main() -> anyhow::Result<()> {
	let preprocessor = Preprocessor::new(sample_tokens());
	let output = preprocessor.run().map_err(|error| anyhow::anyhow!("{error}"))?;

	println!("{}", "preprocessed tokens:".bold());
	for token in &output {
		println!("  {:?} {}", token.kind, token.value);
	}

	Ok(())
}
