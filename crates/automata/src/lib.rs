//! This library provides the automata half of the `dregex` regular
//! expression engine: a probabilistic ordered container, interval maps
//! over Unicode scalar values (the [`char`] type), a Thompson-style NFA
//! whose ε-closure understands position anchors, and the subset
//! construction producing a frozen [`Dfa`].
pub mod skiplist;
pub use skiplist::SkipList;

pub mod rangemap;
pub use rangemap::{Interval, RangeMap, RangeSet, RangeValue};

pub mod nfa;
pub use nfa::{Anchors, Edge, Fragment, Nfa, StateId, Symbol};

pub mod dfa;
pub use dfa::{Dfa, DfaId, Span};

/// The smallest Unicode scalar value.
pub const MIN_SCALAR: char = '\u{0}';

/// The largest Unicode scalar value.
pub const MAX_SCALAR: char = '\u{10ffff}';

/// The scalar value immediately below `c`, skipping the surrogate gap.
///
/// Must not be called on [`MIN_SCALAR`].
pub fn scalar_pred(c: char) -> char {
	debug_assert!(c != MIN_SCALAR);
	match c {
		'\u{e000}' => '\u{d7ff}',
		_ => char::from_u32(c as u32 - 1).expect("scalar value below U+0000"),
	}
}

/// The scalar value immediately above `c`, skipping the surrogate gap.
///
/// Must not be called on [`MAX_SCALAR`].
pub fn scalar_succ(c: char) -> char {
	debug_assert!(c != MAX_SCALAR);
	match c {
		'\u{d7ff}' => '\u{e000}',
		_ => char::from_u32(c as u32 + 1).expect("scalar value above U+10FFFF"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scalar_neighbours_skip_surrogates() {
		assert_eq!(scalar_succ('a'), 'b');
		assert_eq!(scalar_pred('b'), 'a');
		assert_eq!(scalar_succ('\u{d7ff}'), '\u{e000}');
		assert_eq!(scalar_pred('\u{e000}'), '\u{d7ff}');
		assert_eq!(scalar_succ('\u{10fffe}'), MAX_SCALAR);
		assert_eq!(scalar_pred('\u{1}'), MIN_SCALAR);
	}
}
