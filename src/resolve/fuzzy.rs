/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::roster::index::RosterIndex;

/// Most alias keys offered to the language model after fuzzy ranking.
pub const MAX_CANDIDATES: usize = 20;

/// Similarity a key must exceed to be offered as a candidate.
pub const SIMILARITY_CUTOFF: f64 = 0.2;

/// How much of the roster to offer when no key is similar enough.
pub const FALLBACK_POOL_SIZE: usize = 30;

/// Case-insensitive similarity in [0, 1]: one minus the character edit
/// distance over the length of the longer string. Equal strings score 1.0
/// and strings sharing no aligned characters score 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
	let a: Vec<char> = a.to_lowercase().chars().collect();
	let b: Vec<char> = b.to_lowercase().chars().collect();

	let longest = a.len().max(b.len());
	if longest == 0 {
		return 1.0;
	}

	1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
	let mut prev: Vec<usize> = (0..=b.len()).collect();
	let mut curr = vec![0; b.len() + 1];

	for (i, ca) in a.iter().enumerate() {
		curr[0] = i + 1;
		for (j, cb) in b.iter().enumerate() {
			let substitution = prev[j] + usize::from(ca != cb);
			curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
		}
		std::mem::swap(&mut prev, &mut curr);
	}

	prev[b.len()]
}

/// Up to `MAX_CANDIDATES` keys scoring above the cutoff, best first. Keys
/// with equal scores keep their relative order.
pub fn select<'a, I>(name: &str, keys: I) -> Vec<&'a str>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut scored: Vec<(&str, f64)> = keys
		.into_iter()
		.map(|k| (k, similarity(name, k)))
		.filter(|(_, score)| *score > SIMILARITY_CUTOFF)
		.collect();

	scored.sort_by(|a, b| b.1.total_cmp(&a.1));
	scored.truncate(MAX_CANDIDATES);
	scored.into_iter().map(|(k, _)| k).collect()
}

/// The full records to put in front of the language model for `name`:
/// the records behind the best fuzzy matches, or the head of the roster
/// when nothing is close.
pub fn candidate_pool(name: &str, index: &RosterIndex) -> Vec<String> {
	let matches = select(name, index.aliases().keys());

	if matches.is_empty() {
		return index
			.roster()
			.records()
			.iter()
			.take(FALLBACK_POOL_SIZE)
			.cloned()
			.collect();
	}

	matches
		.into_iter()
		.filter_map(|k| index.aliases().get(k))
		.map(str::to_owned)
		.collect()
}
