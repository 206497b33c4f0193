//! The pattern parser.
//!
//! A recursive descent over a one-token-lookahead stream. Anchors are
//! parsed as pseudo-characters and stay in the syntax tree; the automata
//! layer decides when they may be crossed.
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use replace_with::replace_with_or_abort;

use dregex_automata::Symbol;

use crate::error::ParseError;
use crate::token::Token;
use crate::tokenizer::Tokenizer;

/// A node of the pattern syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
	/// Matches the empty string.
	Empty,
	/// A single pseudo-character: a scalar value or an anchor.
	Char(Symbol),
	/// An inclusive scalar-value range, `start <= end`.
	CharRange { start: char, end: char },
	/// A character class. Children are `Char`, `CharRange` or a nested
	/// `Bracket` standing for a predefined class; nesting is flattened
	/// when the class is merged into a character set.
	Bracket { children: Vec<Ast>, complement: bool },
	/// Any scalar value.
	Dot,
	Star(Box<Ast>),
	Plus(Box<Ast>),
	Question(Box<Ast>),
	/// Concatenation, at least two children.
	Cat(Vec<Ast>),
	/// Alternation, at least one child.
	Or(Vec<Ast>),
}

/// One-token-lookahead stream over the tokenizer.
///
/// Keeps yielding [`Token::Eof`] once the pattern is exhausted.
struct TokenStream<'a> {
	tokens: Tokenizer<'a>,
	buffer: Option<Token>,
	eof: bool,
}

impl<'a> TokenStream<'a> {
	fn new(pattern: &'a str) -> Self {
		Self {
			tokens: Tokenizer::new(pattern),
			buffer: None,
			eof: false,
		}
	}

	fn get(&mut self) -> Result<Token, ParseError> {
		if let Some(token) = self.buffer.take() {
			return Ok(token);
		}
		if self.eof {
			return Ok(Token::Eof);
		}
		let token = self.tokens.next().unwrap_or(Ok(Token::Eof))?;
		if token == Token::Eof {
			self.eof = true;
		}
		Ok(token)
	}

	fn peek(&mut self) -> Result<Token, ParseError> {
		let token = self.get()?;
		self.buffer = Some(token);
		Ok(token)
	}

	fn eat(&mut self, expect: Token, msg: &'static str) -> Result<(), ParseError> {
		match self.get()? {
			token if token == expect => Ok(()),
			Token::Eof => Err(ParseError::UnexpectedEof { msg }),
			got => Err(ParseError::UnexpectedToken { got, msg }),
		}
	}
}

/// The predefined character classes, desugared to their bracket forms and
/// parsed once. `\w` produces exactly the tree `[a-zA-Z0-9_]` does.
static PREDEFINED: Lazy<BTreeMap<char, Ast>> = Lazy::new(|| {
	let classes = [
		('w', r"[a-zA-Z0-9_]"),
		('W', r"[^a-zA-Z0-9_]"),
		('s', "[ \\t\\n\\r\\f\\v]"),
		('S', "[^ \\t\\n\\r\\f\\v]"),
		('d', "[0-9]"),
		('D', "[^0-9]"),
	];
	classes
		.into_iter()
		.map(|(key, pattern)| {
			let ast = ast_from_string(pattern).expect("predefined class pattern parses");
			(key, ast)
		})
		.collect()
});

fn predefined(key: char) -> Result<Ast, ParseError> {
	match PREDEFINED.get(&key) {
		Some(ast) => Ok(ast.clone()),
		// `\b` and `\B` tokenize but have no automaton counterpart
		None => Err(ParseError::Unsupported {
			feature: "word boundary",
		}),
	}
}

/// Parses a whole pattern into its syntax tree.
pub fn ast_from_string(pattern: &str) -> Result<Ast, ParseError> {
	let mut tokens = TokenStream::new(pattern);
	let ast = parse_exp(&mut tokens)?;
	match tokens.peek()? {
		Token::Eof => Ok(ast),
		got => Err(ParseError::UnexpectedToken {
			got,
			msg: "trailing input",
		}),
	}
}

fn parse_exp(tokens: &mut TokenStream) -> Result<Ast, ParseError> {
	let mut alternatives = Vec::new();
	loop {
		alternatives.push(parse_cat(tokens)?);
		if tokens.peek()? == Token::Or {
			tokens.get()?;
		} else {
			break;
		}
	}
	Ok(if alternatives.len() == 1 {
		alternatives.remove(0)
	} else {
		Ast::Or(alternatives)
	})
}

fn parse_cat(tokens: &mut TokenStream) -> Result<Ast, ParseError> {
	let mut atoms: Vec<Ast> = Vec::new();
	loop {
		match tokens.peek()? {
			Token::Eof | Token::Or | Token::RPar => break,
			Token::LPar => {
				tokens.get()?;
				let group = parse_exp(tokens)?;
				tokens.eat(Token::RPar, "unclosed group")?;
				atoms.push(group);
			}
			Token::LBracket => {
				tokens.get()?;
				atoms.push(parse_bracket(tokens)?);
			}
			token @ (Token::Star | Token::Plus | Token::Question) => {
				tokens.get()?;
				let Some(last) = atoms.last_mut() else {
					return Err(ParseError::UnexpectedToken {
						got: token,
						msg: "nothing to repeat",
					});
				};
				if matches!(last, Ast::Star(_) | Ast::Plus(_) | Ast::Question(_)) {
					return Err(ParseError::UnexpectedToken {
						got: token,
						msg: "multiple repeat",
					});
				}
				replace_with_or_abort(last, |atom| match token {
					Token::Star => Ast::Star(Box::new(atom)),
					Token::Plus => Ast::Plus(Box::new(atom)),
					_ => Ast::Question(Box::new(atom)),
				});
			}
			Token::Dot => {
				tokens.get()?;
				atoms.push(Ast::Dot);
			}
			Token::Begin => {
				tokens.get()?;
				atoms.push(Ast::Char(Symbol::Begin));
			}
			Token::End => {
				tokens.get()?;
				atoms.push(Ast::Char(Symbol::End));
			}
			Token::Char(c) => {
				tokens.get()?;
				atoms.push(Ast::Char(Symbol::Char(c)));
			}
			Token::Escape(key) => {
				tokens.get()?;
				atoms.push(predefined(key)?);
			}
			got => {
				tokens.get()?;
				return Err(ParseError::UnexpectedToken {
					got,
					msg: "unexpected token",
				});
			}
		}
	}

	Ok(match atoms.len() {
		0 => Ast::Empty,
		1 => atoms.remove(0),
		_ => Ast::Cat(atoms),
	})
}

/// Parses a character class; the opening `[` is already consumed.
fn parse_bracket(tokens: &mut TokenStream) -> Result<Ast, ParseError> {
	let mut complement = false;
	if tokens.peek()? == Token::Not {
		tokens.get()?;
		complement = true;
	}

	let mut children: Vec<Ast> = Vec::new();
	loop {
		match tokens.get()? {
			Token::RBracket => break,
			Token::Eof => {
				return Err(ParseError::UnexpectedEof {
					msg: "unclosed character class",
				});
			}
			Token::Char(c) => children.push(Ast::Char(Symbol::Char(c))),
			Token::Escape(key) => children.push(predefined(key)?),
			Token::Dash => parse_bracket_dash(tokens, &mut children)?,
			got => {
				return Err(ParseError::UnexpectedToken {
					got,
					msg: "unexpected token in character class",
				});
			}
		}
	}

	debug_assert!(!children.is_empty(), "the tokenizer yields a literal `]` first");
	Ok(Ast::Bracket {
		children,
		complement,
	})
}

/// Resolves a `-` inside a class: a literal at the edges of the class or
/// after a completed range, the range operator between single characters.
fn parse_bracket_dash(
	tokens: &mut TokenStream,
	children: &mut Vec<Ast>,
) -> Result<(), ParseError> {
	let literal = match children.last() {
		None => true,
		Some(Ast::CharRange { .. }) => true,
		_ => tokens.peek()? == Token::RBracket,
	};
	if literal {
		children.push(Ast::Char(Symbol::Char('-')));
		return Ok(());
	}

	let start = match children.last() {
		Some(Ast::Char(Symbol::Char(c))) => Some(*c),
		_ => None,
	};

	let end = match tokens.get()? {
		Token::Char(c) => c,
		Token::Dash => '-',
		Token::Eof => {
			return Err(ParseError::UnexpectedEof {
				msg: "unclosed character class",
			});
		}
		_ => {
			return Err(ParseError::BadRange {
				reason: "not character type",
			});
		}
	};

	let Some(start) = start else {
		// the previous item is a spliced class, not a single character
		return Err(ParseError::BadRange {
			reason: "not character type",
		});
	};
	if end < start {
		return Err(ParseError::BadRange {
			reason: "reversed range",
		});
	}

	*children.last_mut().expect("range start present") = Ast::CharRange { start, end };
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ast(pattern: &str) -> Ast {
		ast_from_string(pattern).expect("pattern parses")
	}

	fn error(pattern: &str) -> ParseError {
		ast_from_string(pattern).expect_err("pattern fails to parse")
	}

	fn ch(c: char) -> Ast {
		Ast::Char(Symbol::Char(c))
	}

	#[test]
	fn empty_pattern() {
		assert_eq!(ast(""), Ast::Empty);
	}

	#[test]
	fn alternation_and_concatenation() {
		let expected = Ast::Or(vec![
			Ast::Cat(vec![
				Ast::Char(Symbol::Begin),
				ch('a'),
				ch('b'),
				Ast::Star(Box::new(Ast::Or(vec![
					ch('a'),
					Ast::Empty,
					ch('b'),
					Ast::Empty,
				]))),
			]),
			Ast::Cat(vec![ch('c'), Ast::Char(Symbol::End)]),
		]);
		assert_eq!(ast("^ab(a||b|)*|c$"), expected);
	}

	#[test]
	fn repetition_suffixes() {
		assert_eq!(
			ast("a*a+a?"),
			Ast::Cat(vec![
				Ast::Star(Box::new(ch('a'))),
				Ast::Plus(Box::new(ch('a'))),
				Ast::Question(Box::new(ch('a'))),
			])
		);
	}

	#[test]
	fn repetition_needs_an_atom() {
		for pattern in ["*", "+", "?"] {
			assert_eq!(
				error(pattern),
				ParseError::UnexpectedToken {
					got: match pattern {
						"*" => Token::Star,
						"+" => Token::Plus,
						_ => Token::Question,
					},
					msg: "nothing to repeat",
				}
			);
		}
	}

	#[test]
	fn stacked_repetition_is_rejected() {
		for first in ['*', '+', '?'] {
			for second in ['*', '+'] {
				let pattern = format!(".{first}{second}");
				assert!(matches!(
					error(&pattern),
					ParseError::UnexpectedToken {
						msg: "multiple repeat",
						..
					}
				));
			}
		}
	}

	#[test]
	fn bracket_basic() {
		assert_eq!(
			ast("[abc]"),
			Ast::Bracket {
				children: vec![ch('a'), ch('b'), ch('c')],
				complement: false,
			}
		);
	}

	#[test]
	fn bracket_cannot_be_empty() {
		assert!(matches!(error("[]"), ParseError::UnexpectedEof { .. }));
		assert!(matches!(error("[^]"), ParseError::UnexpectedEof { .. }));
	}

	#[test]
	fn bracket_must_be_closed() {
		assert!(matches!(error("["), ParseError::UnexpectedEof { .. }));
		assert!(matches!(error("[a-"), ParseError::UnexpectedEof { .. }));
	}

	#[test]
	fn bracket_ranges() {
		assert_eq!(
			ast("[a-c]"),
			Ast::Bracket {
				children: vec![Ast::CharRange {
					start: 'a',
					end: 'c'
				}],
				complement: false,
			}
		);
		assert_eq!(
			ast("[a-c-d]"),
			Ast::Bracket {
				children: vec![
					Ast::CharRange {
						start: 'a',
						end: 'c'
					},
					ch('-'),
					ch('d'),
				],
				complement: false,
			}
		);
		assert_eq!(
			ast("[a-]"),
			Ast::Bracket {
				children: vec![ch('a'), ch('-')],
				complement: false,
			}
		);
		assert_eq!(
			ast("[-a-]"),
			Ast::Bracket {
				children: vec![ch('-'), ch('a'), ch('-')],
				complement: false,
			}
		);
	}

	#[test]
	fn bracket_complement() {
		assert_eq!(
			ast("[^-ac-d-]"),
			Ast::Bracket {
				children: vec![
					ch('-'),
					ch('a'),
					Ast::CharRange {
						start: 'c',
						end: 'd'
					},
					ch('-'),
				],
				complement: true,
			}
		);
	}

	#[test]
	fn bad_ranges() {
		assert_eq!(
			error("[z-a]"),
			ParseError::BadRange {
				reason: "reversed range"
			}
		);
		assert_eq!(
			error(r"[\w-a]"),
			ParseError::BadRange {
				reason: "not character type"
			}
		);
		assert_eq!(
			error(r"[a-\w]"),
			ParseError::BadRange {
				reason: "not character type"
			}
		);
		assert_eq!(
			error(r"[\s-\w]"),
			ParseError::BadRange {
				reason: "not character type"
			}
		);
	}

	#[test]
	fn predefined_classes_desugar_to_brackets() {
		assert_eq!(ast(r"\w\d"), ast("[a-zA-Z0-9_][0-9]"));
		assert_eq!(ast(r"\s"), ast("[ \\t\\n\\r\\f\\v]"));
		assert_eq!(ast(r"\D"), ast("[^0-9]"));
	}

	#[test]
	fn predefined_classes_splice_into_brackets() {
		assert_eq!(
			ast(r"[\w]"),
			Ast::Bracket {
				children: vec![ast("[a-zA-Z0-9_]")],
				complement: false,
			}
		);
	}

	#[test]
	fn word_boundaries_are_unsupported() {
		assert_eq!(
			error(r"\b"),
			ParseError::Unsupported {
				feature: "word boundary"
			}
		);
		assert_eq!(
			error(r"a\Bb"),
			ParseError::Unsupported {
				feature: "word boundary"
			}
		);
	}

	#[test]
	fn anchors_are_pseudo_characters() {
		assert_eq!(
			ast("^$"),
			Ast::Cat(vec![Ast::Char(Symbol::Begin), Ast::Char(Symbol::End)])
		);
		assert_eq!(ast(r"\A"), Ast::Char(Symbol::Begin));
		assert_eq!(ast(r"\Z"), Ast::Char(Symbol::End));
	}

	#[test]
	fn anchors_inside_brackets_are_rejected() {
		assert!(matches!(
			error(r"[\A]"),
			ParseError::UnexpectedToken { .. }
		));
	}

	#[test]
	fn stray_close_paren_is_trailing_input() {
		assert_eq!(
			error("a)b"),
			ParseError::UnexpectedToken {
				got: Token::RPar,
				msg: "trailing input",
			}
		);
	}

	#[test]
	fn unclosed_group() {
		assert!(matches!(error("(a"), ParseError::UnexpectedEof { .. }));
	}
}
