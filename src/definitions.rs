use std::collections::HashMap;

use crate::token::Token;

/// A macro definition, either object-like (`#define FOO 1`) or function-like
/// (`#define FOO(a, b) a + b`).
#[derive(Debug, Clone)]
pub struct Definition {
	pub name: String,
	pub is_function_like: bool,
	pub parameters: Vec<String>,
	pub replacement: Vec<Token>,
}

impl Definition {
	/// Returns the position of `name` among this definition's parameters, or `None` if it isn't
	/// one. The reference returns `-1` for "not a parameter"; a hash map keyed definition table
	/// has no array indices to be consistent with, so this is the direct Rust rendition of the
	/// same "found at N, or not found" contract, not a behavior change.
	#[must_use]
	pub fn parameter_index(&self, name: &str) -> Option<usize> {
		self.parameters.iter().position(|parameter| parameter == name)
	}

	/// Returns whether `other` would be an observably different definition if it replaced this
	/// one: a different kind (object-like vs. function-like), a different parameter list, or a
	/// replacement list that differs in token values. Two identical re-`#define`s of the same
	/// macro are common in headers guarded against multiple inclusion and shouldn't be treated as
	/// an error; a genuinely conflicting redefinition should be flagged.
	#[must_use]
	pub fn conflicts_with(&self, other: &Self) -> bool {
		self.is_function_like != other.is_function_like
			|| self.parameters != other.parameters
			|| self.replacement.len() != other.replacement.len()
			|| self.replacement.iter().zip(&other.replacement).any(|(left, right)| left.value != right.value)
	}
}

/// The table of every macro currently in scope. Backed by a `HashMap` rather than the reference's
/// linear array: lookup by name is this table's only access pattern, so a hash map is a strictly
/// better fit with no observable difference in preprocessor semantics.
#[derive(Debug, Default)]
pub struct DefinitionTable {
	definitions: HashMap<String, Definition>,
}

impl DefinitionTable {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces a definition. Returns `true` if this replaced an existing definition
	/// with a conflicting one (see `Definition::conflicts_with`), which callers use to decide
	/// whether a redefinition warning is warranted.
	pub fn define(&mut self, definition: Definition) -> bool {
		let conflict = self.definitions.get(&definition.name).is_some_and(|existing| existing.conflicts_with(&definition));
		self.definitions.insert(definition.name.clone(), definition);
		conflict
	}

	/// Removes a definition, returning whether one existed to remove.
	pub fn undefine(&mut self, name: &str) -> bool {
		self.definitions.remove(name).is_some()
	}

	#[must_use]
	pub fn is_defined(&self, name: &str) -> bool {
		self.definitions.contains_key(name)
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&Definition> {
		self.definitions.get(name)
	}
}

#[cfg(test)]
mod tests {
	use super::{Definition, DefinitionTable};
	use crate::token::{Token, TokenKind};

	fn number(value: &str) -> Token {
		Token::new(TokenKind::Number, value.to_owned(), 1, false)
	}

	fn object_like(name: &str, value: &str) -> Definition {
		Definition { name: name.to_owned(), is_function_like: false, parameters: Vec::new(), replacement: vec![number(value)] }
	}

	#[test]
	fn define_then_undef_round_trips() {
		let mut table = DefinitionTable::new();
		assert!(!table.is_defined("FOO"));
		table.define(object_like("FOO", "1"));
		assert!(table.is_defined("FOO"));
		assert!(table.undefine("FOO"));
		assert!(!table.is_defined("FOO"));
		assert!(!table.undefine("FOO"));
	}

	#[test]
	fn identical_redefinition_is_not_a_conflict() {
		let mut table = DefinitionTable::new();
		table.define(object_like("FOO", "1"));
		assert!(!table.define(object_like("FOO", "1")));
	}

	#[test]
	fn differing_redefinition_is_a_conflict() {
		let mut table = DefinitionTable::new();
		table.define(object_like("FOO", "1"));
		assert!(table.define(object_like("FOO", "2")));
	}

	#[test]
	fn parameter_index_finds_position_or_none() {
		let definition = Definition {
			name: "ADD".to_owned(),
			is_function_like: true,
			parameters: vec!["a".to_owned(), "b".to_owned()],
			replacement: Vec::new(),
		};
		assert_eq!(definition.parameter_index("a"), Some(0));
		assert_eq!(definition.parameter_index("b"), Some(1));
		assert_eq!(definition.parameter_index("c"), None);
	}
}
