use colored::Colorize as _;

/// A fatal preprocessor error: malformed input that the reference implementation would abort
/// compilation over (an unbalanced `#endif`, a redefinition with a conflicting body, an
/// expression that can't be parsed). Modeled directly on the reference's `TokenError`, minus the
/// severity field: this crate only ever constructs the fatal variant, since non-fatal diagnostics
/// are routed through `DiagnosticSink::warn` instead and never become a `Result::Err`.
#[derive(Debug)]
pub struct PreprocessorError {
	pub line: usize,
	pub message: String,
}

impl PreprocessorError {
	#[must_use]
	pub const fn new(line: usize, message: String) -> Self {
		Self { line, message }
	}
}

impl std::fmt::Display for PreprocessorError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.line, self.message)
	}
}

impl std::error::Error for PreprocessorError {}

/// Where non-fatal diagnostics (warnings) go. A host compiler supplies its own implementation so
/// it can route preprocessor warnings into whatever it already uses for the rest of compilation;
/// this crate ships the two a standalone user of it would actually need: a terminal renderer and
/// a buffer for assertions in tests.
pub trait DiagnosticSink {
	fn warn(&mut self, line: usize, message: &str);
}

/// Prints warnings to stderr, colored the way the reference's error-reporting code colors its own
/// output: the location dimmed, the word `warning` in bold yellow, the message plain.
#[derive(Debug, Default)]
pub struct StderrDiagnostics;

impl DiagnosticSink for StderrDiagnostics {
	fn warn(&mut self, line: usize, message: &str) {
		eprintln!("{}{} {}", format!("{line}: ").dimmed(), "warning:".yellow().bold(), message);
	}
}

/// Buffers warnings instead of printing them, so tests can assert on exactly what was emitted.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
	pub warnings: Vec<(usize, String)>,
}

impl DiagnosticSink for CollectingDiagnostics {
	fn warn(&mut self, line: usize, message: &str) {
		self.warnings.push((line, message.to_owned()));
	}
}
