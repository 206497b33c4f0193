//! Deterministic finite automaton built by subset construction.
//!
//! Every deterministic state is interned under the frozen set of NFA
//! states it stands for, so each reachable subset is materialised at most
//! once. Transitions are kept as a sorted interval table covering the
//! whole scalar range; sharing interval values between far-apart ranges is
//! what keeps the table small despite the width of the alphabet.
use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::nfa::{Anchors, Edge, Fragment, Nfa, StateId, Symbol};
use crate::rangemap::RangeMap;

/// A state index inside a [`Dfa`].
pub type DfaId = u32;

/// One frozen transition interval: scalar values in `[start, end]` lead to
/// `target`, or nowhere when `target` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
	pub start: char,
	pub end: char,
	pub target: Option<DfaId>,
}

/// A frozen deterministic state.
#[derive(Debug, PartialEq, Eq)]
pub struct DfaState {
	set: Box<[StateId]>,
	spans: Box<[Span]>,
	end_transition: Option<DfaId>,
	is_end: bool,
}

impl DfaState {
	/// The sorted set of NFA states this state was interned under.
	pub fn nfa_set(&self) -> &[StateId] {
		&self.set
	}

	/// The transition intervals, ascending and covering every scalar value.
	pub fn spans(&self) -> &[Span] {
		&self.spans
	}

	/// The state reached by the end-of-input pseudo-transition, if any.
	pub fn end_transition(&self) -> Option<DfaId> {
		self.end_transition
	}

	/// Whether this state contains the NFA accept state.
	pub fn is_end(&self) -> bool {
		self.is_end
	}
}

/// Deterministic finite automaton over Unicode scalar values.
///
/// Immutable once built; matching against it needs no synchronisation.
#[derive(Debug, PartialEq, Eq)]
pub struct Dfa {
	states: Vec<DfaState>,
	match_empty: bool,
}

impl Dfa {
	/// The start state.
	pub const START: DfaId = 0;

	/// Builds the automaton recognising the language of `nfa` between the
	/// `fragment` endpoints.
	pub fn from_nfa(nfa: &Nfa, fragment: Fragment) -> Self {
		let Fragment { start, end } = fragment;

		// the empty input sits at both anchors at once
		let match_empty = nfa.epsilon_closure([start], Anchors::BOTH).contains(&end);

		let mut dfa = Dfa {
			states: Vec::new(),
			match_empty,
		};
		let mut table: HashMap<Box<[StateId]>, DfaId> = HashMap::new();
		let mut queue: VecDeque<DfaId> = VecDeque::new();

		let seed = nfa.epsilon_closure([start], Anchors::BEGIN);
		intern(&mut dfa, &mut table, &mut queue, end, seed);

		while let Some(id) = queue.pop_front() {
			let set = dfa.states[id as usize].set.clone();

			let mut map: RangeMap<BTreeSet<StateId>> = RangeMap::new();
			let mut end_targets: BTreeSet<StateId> = BTreeSet::new();
			for &q in set.iter() {
				match nfa.state(q).edge() {
					Some(Edge::Symbol {
						symbol: Symbol::Char(c),
						to,
					}) => {
						map.add_range(*c, *c, &BTreeSet::from([*to]));
					}
					Some(Edge::Symbol {
						symbol: Symbol::End,
						to,
					}) => {
						end_targets.insert(*to);
					}
					// a `^` edge is only crossable inside the seed closure
					Some(Edge::Symbol {
						symbol: Symbol::Begin,
						..
					}) => {}
					Some(Edge::Set { set: charset, to }) => {
						let target = BTreeSet::from([*to]);
						for (range_start, range_end) in charset.true_ranges() {
							map.add_range(range_start, range_end, &target);
						}
					}
					None => {}
				}
			}

			// freeze: replace every interval value with the interned id of
			// its ε-closure
			let mut spans = Vec::with_capacity(map.len());
			for item in map.iter() {
				let target = if item.value.is_empty() {
					None
				} else {
					let closure =
						nfa.epsilon_closure(item.value.iter().copied(), Anchors::NONE);
					Some(intern(&mut dfa, &mut table, &mut queue, end, closure))
				};
				spans.push(Span {
					start: item.start,
					end: item.end,
					target,
				});
			}

			let end_transition = if end_targets.is_empty() {
				None
			} else {
				let closure = nfa.epsilon_closure(end_targets.iter().copied(), Anchors::END);
				Some(intern(&mut dfa, &mut table, &mut queue, end, closure))
			};

			let state = &mut dfa.states[id as usize];
			state.spans = spans.into_boxed_slice();
			state.end_transition = end_transition;
		}

		dfa
	}

	/// The number of states.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// The state behind `id`.
	pub fn state(&self, id: DfaId) -> &DfaState {
		&self.states[id as usize]
	}

	/// Iterates over all states with their ids.
	pub fn states(&self) -> impl Iterator<Item = (DfaId, &DfaState)> {
		self.states
			.iter()
			.enumerate()
			.map(|(id, state)| (id as DfaId, state))
	}

	/// Whether the automaton accepts the empty string.
	pub fn match_empty(&self) -> bool {
		self.match_empty
	}

	/// Follows the transition for `c` out of `id`.
	pub fn follow(&self, id: DfaId, c: char) -> Option<DfaId> {
		let spans = &self.states[id as usize].spans;
		let index = spans.partition_point(|span| span.end < c);
		debug_assert!(index < spans.len() && spans[index].start <= c);
		spans[index].target
	}

	/// Follows the end-of-input pseudo-transition out of `id`.
	pub fn follow_end(&self, id: DfaId) -> Option<DfaId> {
		self.states[id as usize].end_transition
	}
}

/// Returns the id interned for `set`, materialising and enqueueing a fresh
/// state when the subset has not been seen before.
fn intern(
	dfa: &mut Dfa,
	table: &mut HashMap<Box<[StateId]>, DfaId>,
	queue: &mut VecDeque<DfaId>,
	end: StateId,
	set: BTreeSet<StateId>,
) -> DfaId {
	let key: Box<[StateId]> = set.into_iter().collect();
	if let Some(&id) = table.get(&key) {
		return id;
	}
	let id = dfa.states.len() as DfaId;
	dfa.states.push(DfaState {
		is_end: key.contains(&end),
		set: key.clone(),
		spans: Box::new([]),
		end_transition: None,
	});
	table.insert(key, id);
	queue.push_back(id);
	id
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rangemap::RangeSet;

	/// `a|bc` as a Thompson automaton.
	fn sample_nfa() -> (Nfa, Fragment) {
		let mut nfa = Nfa::new();
		let start = nfa.add_state();
		let end = nfa.add_state();

		let a0 = nfa.add_state();
		let a1 = nfa.add_state();
		nfa.set_symbol_edge(a0, Symbol::Char('a'), a1);

		let b0 = nfa.add_state();
		let b1 = nfa.add_state();
		nfa.set_symbol_edge(b0, Symbol::Char('b'), b1);
		let c0 = nfa.add_state();
		let c1 = nfa.add_state();
		nfa.set_symbol_edge(c0, Symbol::Char('c'), c1);
		nfa.add_epsilon(b1, c0);

		nfa.add_epsilon(start, a0);
		nfa.add_epsilon(start, b0);
		nfa.add_epsilon(a1, end);
		nfa.add_epsilon(c1, end);

		(nfa, Fragment { start, end })
	}

	#[test]
	fn follow_walks_the_language() {
		let (nfa, fragment) = sample_nfa();
		let dfa = Dfa::from_nfa(&nfa, fragment);

		assert!(!dfa.match_empty());
		assert!(!dfa.state(Dfa::START).is_end());

		let after_a = dfa.follow(Dfa::START, 'a').expect("transition on a");
		assert!(dfa.state(after_a).is_end());

		let after_b = dfa.follow(Dfa::START, 'b').expect("transition on b");
		assert!(!dfa.state(after_b).is_end());
		let after_bc = dfa.follow(after_b, 'c').expect("transition on c");
		assert!(dfa.state(after_bc).is_end());

		assert_eq!(dfa.follow(Dfa::START, 'x'), None);
		assert_eq!(dfa.follow(after_a, 'a'), None);
	}

	#[test]
	fn states_are_interned_by_subset() {
		let (nfa, fragment) = sample_nfa();
		let dfa = Dfa::from_nfa(&nfa, fragment);

		let mut seen = std::collections::HashSet::new();
		for (_, state) in dfa.states() {
			assert!(seen.insert(state.nfa_set().to_vec()), "duplicate subset");
		}
	}

	#[test]
	fn spans_cover_the_whole_alphabet() {
		let (nfa, fragment) = sample_nfa();
		let dfa = Dfa::from_nfa(&nfa, fragment);

		for (_, state) in dfa.states() {
			let spans = state.spans();
			assert_eq!(spans.first().map(|span| span.start), Some(crate::MIN_SCALAR));
			assert_eq!(spans.last().map(|span| span.end), Some(crate::MAX_SCALAR));
			for pair in spans.windows(2) {
				assert_eq!(crate::scalar_succ(pair[0].end), pair[1].start);
				assert!(pair[0].target != pair[1].target, "uncoalesced spans");
			}
		}
	}

	#[test]
	fn construction_is_deterministic() {
		let (nfa, fragment) = sample_nfa();
		let first = Dfa::from_nfa(&nfa, fragment);
		let second = Dfa::from_nfa(&nfa, fragment);
		assert_eq!(first, second);
	}

	#[test]
	fn charset_edges_partition_the_alphabet() {
		let mut nfa = Nfa::new();
		let start = nfa.add_state();
		let end = nfa.add_state();
		let mut set = RangeSet::new();
		set.add_range('a', 'm');
		set.add_range('0', '9');
		nfa.set_charset_edge(start, set, end);

		let dfa = Dfa::from_nfa(&nfa, Fragment { start, end });
		let hit = dfa.follow(Dfa::START, 'c').expect("inside the set");
		assert!(dfa.state(hit).is_end());
		assert_eq!(dfa.follow(Dfa::START, 'z'), None);
		assert_eq!(dfa.follow(Dfa::START, ' '), None);
		assert_eq!(dfa.follow(Dfa::START, '5'), Some(hit));
	}

	#[test]
	fn end_anchor_becomes_a_pseudo_transition() {
		// `a$`
		let mut nfa = Nfa::new();
		let a0 = nfa.add_state();
		let a1 = nfa.add_state();
		nfa.set_symbol_edge(a0, Symbol::Char('a'), a1);
		let d0 = nfa.add_state();
		let d1 = nfa.add_state();
		nfa.set_symbol_edge(d0, Symbol::End, d1);
		nfa.add_epsilon(a1, d0);

		let dfa = Dfa::from_nfa(&nfa, Fragment { start: a0, end: d1 });
		let after_a = dfa.follow(Dfa::START, 'a').expect("transition on a");
		assert!(!dfa.state(after_a).is_end());
		let at_end = dfa.follow_end(after_a).expect("end pseudo-transition");
		assert!(dfa.state(at_end).is_end());
		assert_eq!(dfa.follow_end(Dfa::START), None);
	}
}
