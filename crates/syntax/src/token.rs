//! Lexical elements of a pattern.

/// A single token.
///
/// Equality is tag and payload; the variants only meaningful inside a
/// bracket ([`Token::Dash`], [`Token::Not`], [`Token::RBracket`]) never
/// appear outside one, and vice versa for the operator tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
	Or,
	LPar,
	RPar,
	LBracket,
	RBracket,
	/// `-` inside a bracket.
	Dash,
	/// `^` immediately after `[`.
	Not,
	Star,
	Plus,
	Question,
	Dot,
	/// `^` or `\A` outside a bracket.
	Begin,
	/// `$` or `\Z` outside a bracket.
	End,
	/// A literal scalar value.
	Char(char),
	/// A predefined-class or word-boundary escape key, one of `wWsSdDbB`.
	Escape(char),
	Eof,
}
