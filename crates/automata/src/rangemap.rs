//! Interval containers over the Unicode scalar values.
//!
//! A [`RangeMap`] is an ordered sequence of non-overlapping intervals whose
//! union is the whole scalar range; every scalar value has exactly one
//! carrying value. A [`RangeSet`] specialises the value domain to
//! membership booleans.
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::skiplist::{self, SkipList};
use crate::{scalar_pred, scalar_succ, MAX_SCALAR, MIN_SCALAR};

/// A value an interval can carry.
///
/// Values are joined additively when ranges are layered on top of each
/// other, set union for set-like values.
pub trait RangeValue: Clone + Eq {
	/// The value carried by intervals nothing has been joined into.
	fn empty() -> Self;

	/// Joins `other` into `self`.
	fn join(&mut self, other: &Self);
}

impl RangeValue for bool {
	fn empty() -> Self {
		false
	}

	fn join(&mut self, other: &Self) {
		*self |= *other;
	}
}

impl<T: Clone + Ord> RangeValue for BTreeSet<T> {
	fn empty() -> Self {
		BTreeSet::new()
	}

	fn join(&mut self, other: &Self) {
		self.extend(other.iter().cloned());
	}
}

/// An inclusive interval of scalar values carrying a value.
///
/// Intervals are ordered by their `end` bound alone: inside a [`RangeMap`]
/// the upper bound identifies the interval.
#[derive(Debug, Clone)]
pub struct Interval<V> {
	pub start: char,
	pub end: char,
	pub value: V,
}

impl<V> PartialEq for Interval<V> {
	fn eq(&self, other: &Self) -> bool {
		self.end == other.end
	}
}

impl<V> Eq for Interval<V> {}

impl<V> PartialOrd for Interval<V> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl<V> Ord for Interval<V> {
	fn cmp(&self, other: &Self) -> Ordering {
		self.end.cmp(&other.end)
	}
}

/// A search key for the interval whose `end` bound is `>=` the probed
/// scalar, which by totality is the interval containing it.
fn probe<V: RangeValue>(end: char) -> Interval<V> {
	Interval {
		start: MIN_SCALAR,
		end,
		value: V::empty(),
	}
}

/// The decomposition of the intervals intersecting a queried range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlap {
	/// A single interval strictly encloses the queried range on both sides.
	Enclosed { start: char, end: char },
	/// Optional straddlers on either side plus the fully contained
	/// intervals, all given as `(start, end)` bounds.
	Split {
		left: Option<(char, char)>,
		middle: Vec<(char, char)>,
		right: Option<(char, char)>,
	},
}

/// An ordered map from scalar-value intervals to values.
///
/// The intervals are contiguous (each starts right above its predecessor's
/// `end`), the first starts at `U+0000` and the last ends at `U+10FFFF`.
/// Adjacent intervals carrying equal values are coalesced after every
/// mutation.
#[derive(Debug)]
pub struct RangeMap<V> {
	items: SkipList<Interval<V>>,
}

impl<V: RangeValue> Default for RangeMap<V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V: RangeValue> RangeMap<V> {
	/// Creates a map with one interval spanning the whole scalar range,
	/// carrying the empty value.
	pub fn new() -> Self {
		let mut items = SkipList::new();
		items.insert(Interval {
			start: MIN_SCALAR,
			end: MAX_SCALAR,
			value: V::empty(),
		});
		Self { items }
	}

	/// The number of intervals.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Iterates over the intervals in ascending order.
	pub fn iter(&self) -> skiplist::Iter<Interval<V>> {
		self.items.iter()
	}

	/// The value carried by the interval containing `c`.
	pub fn get_char(&self, c: char) -> &V {
		let item = self
			.items
			.lower_bound(&probe(c))
			.next()
			.expect("interval cover is total");
		debug_assert!(item.start <= c);
		&item.value
	}

	/// Decomposes the intervals intersecting `[start, end]` into the left
	/// straddler, the fully contained middles and the right straddler.
	pub fn query_overlap(&self, start: char, end: char) -> Overlap {
		debug_assert!(start <= end);
		let mut left = None;
		let mut middle = Vec::new();
		let mut right = None;

		for item in self.items.lower_bound(&probe(start)) {
			if item.start < start && item.end <= end {
				debug_assert!(left.is_none());
				left = Some((item.start, item.end));
			} else if item.start >= start && item.end > end {
				if item.start <= end {
					right = Some((item.start, item.end));
				}
				break;
			} else if item.start >= start && item.end <= end {
				middle.push((item.start, item.end));
			} else {
				debug_assert!(left.is_none() && middle.is_empty() && right.is_none());
				return Overlap::Enclosed {
					start: item.start,
					end: item.end,
				};
			}
		}

		Overlap::Split {
			left,
			middle,
			right,
		}
	}

	fn interval_mut(&mut self, key: char) -> &mut Interval<V> {
		self.items
			.find_mut(&probe(key))
			.expect("interval for a known key")
	}

	/// Joins `value` into the value of every scalar in `[start, end]`,
	/// splitting straddling intervals and re-coalescing afterwards.
	pub fn add_range(&mut self, start: char, end: char, value: &V) {
		debug_assert!(start <= end);
		match self.query_overlap(start, end) {
			Overlap::Enclosed {
				start: outer_start,
				end: outer_end,
			} => {
				// three pieces; the enclosing interval keeps its key and
				// becomes the right piece
				let item = self.interval_mut(outer_end);
				let outer_value = item.value.clone();
				item.start = scalar_succ(end);
				let mut middle_value = outer_value.clone();
				middle_value.join(value);
				self.items.insert(Interval {
					start: outer_start,
					end: scalar_pred(start),
					value: outer_value,
				});
				self.items.insert(Interval {
					start,
					end,
					value: middle_value,
				});
			}
			Overlap::Split {
				left,
				middle,
				right,
			} => {
				if let Some((outer_start, straddle_end)) = left {
					// the straddler keeps its key and becomes the joined
					// inner piece
					let item = self.interval_mut(straddle_end);
					let old = item.value.clone();
					item.start = start;
					item.value.join(value);
					self.items.insert(Interval {
						start: outer_start,
						end: scalar_pred(start),
						value: old,
					});
				}
				if let Some((straddle_start, outer_end)) = right {
					let item = self.interval_mut(outer_end);
					let old = item.value.clone();
					item.start = scalar_succ(end);
					let mut joined = old;
					joined.join(value);
					self.items.insert(Interval {
						start: straddle_start,
						end,
						value: joined,
					});
				}
				for (_, key) in middle {
					self.interval_mut(key).value.join(value);
				}
			}
		}

		self.coalesce(start, end);
	}

	/// Merges runs of equal-valued intervals across `[start, end]` and its
	/// immediate neighbours.
	fn coalesce(&mut self, start: char, end: char) {
		let middle = match self.query_overlap(start, end) {
			Overlap::Split {
				left: None,
				middle,
				right: None,
			} => middle,
			_ => {
				debug_assert!(false, "mutated span is covered by whole intervals");
				return;
			}
		};
		debug_assert!(!middle.is_empty());

		let mut keys: Vec<char> = middle.iter().map(|&(_, end)| end).collect();
		if let Some(prev) = self.items.upper_bound(&probe(keys[0])).nth(1) {
			keys.insert(0, prev.end);
		}
		let last = *keys.last().expect("at least one interval");
		if let Some(next) = self.items.lower_bound(&probe(last)).nth(1) {
			keys.push(next.end);
		}

		let mut prev_key: Option<char> = None;
		for key in keys {
			if let Some(prev) = prev_key {
				let merged_start = {
					let prev_item = self.items.find(&probe(prev)).expect("interval for key");
					let item = self.items.find(&probe(key)).expect("interval for key");
					(prev_item.value == item.value).then_some(prev_item.start)
				};
				if let Some(merged_start) = merged_start {
					self.items.remove(&probe::<V>(prev));
					self.interval_mut(key).start = merged_start;
				}
			}
			prev_key = Some(key);
		}
	}
}

/// A range map specialised to boolean membership.
#[derive(Debug, Default)]
pub struct RangeSet {
	map: RangeMap<bool>,
}

impl RangeSet {
	/// Creates the empty set.
	pub fn new() -> Self {
		Self {
			map: RangeMap::new(),
		}
	}

	/// Creates the set containing every scalar value.
	pub fn all() -> Self {
		let mut set = Self::new();
		set.add_range(MIN_SCALAR, MAX_SCALAR);
		set
	}

	/// Marks every scalar in `[start, end]` as a member.
	pub fn add_range(&mut self, start: char, end: char) {
		self.map.add_range(start, end, &true);
	}

	/// Marks `c` as a member.
	pub fn add_char(&mut self, c: char) {
		self.add_range(c, c);
	}

	/// Whether `c` is a member.
	pub fn contains(&self, c: char) -> bool {
		*self.map.get_char(c)
	}

	/// Flips the membership of every scalar value.
	pub fn complement(&mut self) {
		// flipping preserves the inequality of neighbouring intervals, so
		// the map stays coalesced
		let keys: Vec<char> = self.map.iter().map(|item| item.end).collect();
		for key in keys {
			let item = self.map.interval_mut(key);
			item.value = !item.value;
		}
	}

	/// The member intervals, in ascending order.
	pub fn true_ranges(&self) -> impl Iterator<Item = (char, char)> + '_ {
		self.map
			.iter()
			.filter(|item| item.value)
			.map(|item| (item.start, item.end))
	}
}
