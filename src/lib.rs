//! `cprep-core`
//!
//! The directive-execution core of a C preprocessor: a token cursor, a macro/definition table, a
//! constant-expression evaluator, a directive dispatcher, and a conditional-inclusion engine,
//! wired together by a single-pass [`Preprocessor`] driver.
//!
//! This crate consumes a token stream produced by a host lexer and produces a transformed token
//! stream with every recognized directive executed. It does not lex raw source, resolve
//! `#include` paths, or expand function-like macros at call sites — see `DESIGN.md` for the exact
//! scope boundary and the reasoning behind it.

/// Integer arithmetic for constant-expression folding, pluggable via [`arithmetic::ArithmeticHost`]
/// so a host compiler can share its own integer semantics.
pub mod arithmetic;

/// The conditional-inclusion engine: `read_to_endif`/`skip_to_endif` over nested `#if`/`#ifdef`/
/// `#ifndef` blocks.
pub mod conditional;

/// The forward, checkpointable cursor every other component reads the token stream through.
pub mod cursor;

/// The macro/definition table.
pub mod definitions;

/// The fatal error type and the pluggable warning sink.
pub mod diagnostics;

/// Directive recognition and per-directive handlers (`#define`, `#undef`, `#warning`, `#error`,
/// `#if`/`#ifdef`/`#ifndef`, `#endif`, and the recognized-but-inert `#include`/`#typedef`).
pub mod directive;

/// The constant-expression tree and evaluator used by `#if`.
pub mod expr;

/// The append-only `#include` registry.
pub mod includes;

/// The driver: the top-level loop and the single [`Preprocessor`] struct that owns every other
/// component for the lifetime of a run.
pub mod preprocessor;

/// The token type this crate consumes, as produced by a host lexer.
pub mod token;

pub use arithmetic::{ArithmeticHost, ArithmeticError, BinaryOp, DefaultArithmetic, UnaryOp};
pub use definitions::{Definition, DefinitionTable};
pub use diagnostics::{CollectingDiagnostics, DiagnosticSink, PreprocessorError, StderrDiagnostics};
pub use expr::{Evaluate, ExprNode};
pub use includes::{IncludeRegistry, IncludedFile};
pub use preprocessor::Preprocessor;
pub use token::{Token, TokenKind};
