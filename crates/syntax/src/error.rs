//! The compile-time error taxonomy.
use crate::token::Token;

/// An error surfaced while compiling a pattern.
///
/// Compilation aborts at the first problem; matching never fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
	/// A bracket range whose endpoints are reversed or not single
	/// characters.
	#[error("bad range: {reason}")]
	BadRange { reason: &'static str },

	/// A malformed, truncated or unrepresentable escape sequence.
	#[error("illegal escape: {escape}")]
	IllegalEscape { escape: String },

	/// A token the parser cannot accept at this position.
	#[error("{msg}: {got:?}")]
	UnexpectedToken { got: Token, msg: &'static str },

	/// The pattern ended where more input was required. The end-of-input
	/// case of [`ParseError::UnexpectedToken`], kept as its own variant.
	#[error("unexpected end of pattern: {msg}")]
	UnexpectedEof { msg: &'static str },

	/// A recognised construct this engine does not implement.
	#[error("{feature} is not supported")]
	Unsupported { feature: &'static str },
}
