//! A regular expression engine that compiles patterns into deterministic
//! finite automata over the full Unicode scalar-value alphabet and reports
//! the longest prefix of its input the pattern accepts.
//!
//! ```
//! let re = dregex::compile("a*b")?;
//! assert_eq!(re.match_begin("aaabb"), 4);
//! assert!(re.match_full("aaab"));
//! # Ok::<(), dregex::ParseError>(())
//! ```
pub use dregex_automata as automata;
pub use dregex_syntax as syntax;

pub use dregex_automata::dfa::Dfa;
pub use dregex_syntax::{ast_from_string, nfa_from_ast, Ast, ParseError};

/// A compiled regular expression.
///
/// The compiled automaton is immutable; matching needs no synchronisation
/// and a `Regex` can be shared freely between threads.
#[derive(Debug)]
pub struct Regex {
	pattern: String,
	dfa: Dfa,
}

impl Regex {
	/// Compiles `pattern`.
	pub fn new(pattern: &str) -> Result<Self, ParseError> {
		let ast = ast_from_string(pattern)?;
		let (nfa, fragment) = nfa_from_ast(&ast);
		let dfa = Dfa::from_nfa(&nfa, fragment);
		Ok(Self {
			pattern: pattern.to_owned(),
			dfa,
		})
	}

	/// The source pattern.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// The compiled automaton.
	pub fn dfa(&self) -> &Dfa {
		&self.dfa
	}

	/// The length, in scalar values, of the longest prefix of `input` this
	/// pattern accepts, or `-1` when no prefix — not even the empty one —
	/// matches.
	pub fn match_begin(&self, input: &str) -> isize {
		if input.is_empty() {
			return if self.dfa.match_empty() { 0 } else { -1 };
		}

		let mut state = Dfa::START;
		let mut last_match = if self.dfa.state(state).is_end() { 0 } else { -1 };
		let mut consumed = 0;

		for (i, c) in input.chars().enumerate() {
			match self.dfa.follow(state, c) {
				None => return last_match,
				Some(next) => {
					state = next;
					if self.dfa.state(state).is_end() {
						last_match = (i + 1) as isize;
					}
				}
			}
			consumed = i + 1;
		}

		// one last chance for a trailing `$`
		if !self.dfa.state(state).is_end() {
			if let Some(next) = self.dfa.follow_end(state) {
				if self.dfa.state(next).is_end() {
					last_match = consumed as isize;
				}
			}
		}

		last_match
	}

	/// Whether this pattern accepts the whole of `input`.
	pub fn match_full(&self, input: &str) -> bool {
		self.match_begin(input) == input.chars().count() as isize
	}
}

/// Compiles `pattern` into a reusable [`Regex`].
pub fn compile(pattern: &str) -> Result<Regex, ParseError> {
	Regex::new(pattern)
}

/// Compiles `pattern` and returns the longest accepted prefix length of
/// `input`; see [`Regex::match_begin`].
pub fn match_begin(pattern: &str, input: &str) -> Result<isize, ParseError> {
	Ok(compile(pattern)?.match_begin(input))
}

/// Compiles `pattern` and tests it against the whole of `input`.
pub fn match_full(pattern: &str, input: &str) -> Result<bool, ParseError> {
	Ok(compile(pattern)?.match_full(input))
}
