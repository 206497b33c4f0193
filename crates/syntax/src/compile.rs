//! Thompson construction: syntax trees into ε-NFAs.
//!
//! Every node becomes a small fragment with distinct start and end states;
//! composition only ever adds ε-edges between fragment endpoints.
use dregex_automata::nfa::{Fragment, Nfa, Symbol};
use dregex_automata::rangemap::RangeSet;

use crate::parser::Ast;

/// Builds the automaton for a parsed pattern and the fragment delimiting
/// it.
pub fn nfa_from_ast(ast: &Ast) -> (Nfa, Fragment) {
	let mut nfa = Nfa::new();
	let fragment = build(&mut nfa, ast);
	(nfa, fragment)
}

fn build(nfa: &mut Nfa, ast: &Ast) -> Fragment {
	match ast {
		Ast::Empty => {
			let state = nfa.add_state();
			Fragment {
				start: state,
				end: state,
			}
		}
		Ast::Char(symbol) => {
			let start = nfa.add_state();
			let end = nfa.add_state();
			nfa.set_symbol_edge(start, *symbol, end);
			Fragment { start, end }
		}
		Ast::CharRange { start, end } => {
			let mut set = RangeSet::new();
			set.add_range(*start, *end);
			charset_fragment(nfa, set)
		}
		Ast::Bracket {
			children,
			complement,
		} => {
			let mut set = RangeSet::new();
			merge_bracket(&mut set, children);
			if *complement {
				set.complement();
			}
			charset_fragment(nfa, set)
		}
		Ast::Dot => charset_fragment(nfa, RangeSet::all()),
		Ast::Star(sub) => {
			let sub = build(nfa, sub);
			nfa.add_epsilon(sub.start, sub.end);
			nfa.add_epsilon(sub.end, sub.start);
			sub
		}
		Ast::Plus(sub) => {
			let sub = build(nfa, sub);
			nfa.add_epsilon(sub.end, sub.start);
			sub
		}
		Ast::Question(sub) => {
			let sub = build(nfa, sub);
			nfa.add_epsilon(sub.start, sub.end);
			sub
		}
		Ast::Cat(children) => {
			debug_assert!(children.len() >= 2);
			let mut fragments = Vec::with_capacity(children.len());
			for child in children {
				fragments.push(build(nfa, child));
			}
			for pair in fragments.windows(2) {
				nfa.add_epsilon(pair[0].end, pair[1].start);
			}
			Fragment {
				start: fragments[0].start,
				end: fragments[fragments.len() - 1].end,
			}
		}
		Ast::Or(children) => {
			debug_assert!(!children.is_empty());
			let start = nfa.add_state();
			let end = nfa.add_state();
			for child in children {
				let sub = build(nfa, child);
				nfa.add_epsilon(start, sub.start);
				nfa.add_epsilon(sub.end, end);
			}
			Fragment { start, end }
		}
	}
}

fn charset_fragment(nfa: &mut Nfa, set: RangeSet) -> Fragment {
	let start = nfa.add_state();
	let end = nfa.add_state();
	nfa.set_charset_edge(start, set, end);
	Fragment { start, end }
}

/// Merges class children into one character set, flattening the brackets
/// spliced in for predefined classes.
fn merge_bracket(set: &mut RangeSet, children: &[Ast]) {
	for child in children {
		match child {
			Ast::Char(Symbol::Char(c)) => set.add_char(*c),
			Ast::CharRange { start, end } => set.add_range(*start, *end),
			Ast::Bracket {
				children,
				complement,
			} => {
				let mut sub = RangeSet::new();
				merge_bracket(&mut sub, children);
				if *complement {
					sub.complement();
				}
				for (start, end) in sub.true_ranges() {
					set.add_range(start, end);
				}
			}
			_ => debug_assert!(false, "class children are characters, ranges or classes"),
		}
	}
}
