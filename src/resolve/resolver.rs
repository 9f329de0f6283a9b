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
use crate::resolve::disambiguator::{Disambiguator, NO_MATCH};
use crate::resolve::fuzzy::candidate_pool;
use crate::roster::index::RosterIndex;
use crate::util::error::CollaboratorError;
use crate::util::retry::RetryPolicy;
use log::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	/// Always a record present in the roster.
	Resolved(String),
	NotFound,
}

/// Maps an informal customer name to its canonical roster record.
///
/// Tries, in order and each exactly once: the display name as given, the
/// full record as given, the display name ignoring case, and finally a
/// language model choosing among fuzzy candidates. The cheap lookups are
/// deterministic; only the last one leaves the process.
pub struct NameResolver {
	index: RosterIndex,
	disambiguator: Option<Box<dyn Disambiguator>>,
	retry: RetryPolicy,
}

impl NameResolver {
	pub fn new(
		index: RosterIndex,
		disambiguator: Option<Box<dyn Disambiguator>>,
	) -> Self {
		Self {
			index,
			disambiguator,
			retry: RetryPolicy::default(),
		}
	}

	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	pub fn resolve(&self, name: &str) -> Resolution {
		if let Some(record) = self.index.aliases().get(name) {
			info!("Direct match found: '{}'", name);
			return Resolution::Resolved(record.to_string());
		}

		if self.index.roster().contains(name) {
			info!("Full customer record provided: '{}'", name);
			return Resolution::Resolved(name.to_string());
		}

		if let Some((key, record)) = self.index.aliases().find_ignore_case(name)
		{
			info!("Case-insensitive match found: '{}' -> '{}'", name, key);
			return Resolution::Resolved(record.to_string());
		}

		match self.disambiguate(name) {
			Some(record) => {
				info!("Language model mapped '{}' -> '{}'", name, record);
				Resolution::Resolved(record)
			},
			None => {
				warn!("Could not find customer: '{}'", name);
				Resolution::NotFound
			},
		}
	}

	fn disambiguate(&self, name: &str) -> Option<String> {
		let Some(disambiguator) = &self.disambiguator else {
			debug!("No language model configured; skipping fuzzy lookup");
			return None;
		};
		if self.index.roster().is_empty() {
			return None;
		}

		info!("No direct match for '{}', asking the language model", name);
		let pool = candidate_pool(name, &self.index);

		let answer = self.retry.run(
			|attempt| {
				debug!("Language model attempt {} for '{}'", attempt, name);
				disambiguator.pick(name, &pool)
			},
			CollaboratorError::is_transient,
		);

		let answer = match answer {
			Ok(a) => a,
			Err(e) => {
				error!("Language model mapping failed for '{}': {}", name, e);
				return None;
			},
		};

		if answer == NO_MATCH {
			return None;
		}
		if !self.index.roster().contains(&answer) {
			warn!(
				"Language model answered '{}' for '{}', which is not a customer",
				answer, name
			);
			return None;
		}

		Some(answer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::Rng;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::{Arc, Mutex};

	/// Answers from a script, one entry per call, and records what it was
	/// asked. Calls past the end of the script fail as transport errors.
	struct ScriptedModel {
		script: Mutex<Vec<Result<String, CollaboratorError>>>,
		calls: Arc<AtomicUsize>,
		pools: Arc<Mutex<Vec<Vec<String>>>>,
	}

	impl ScriptedModel {
		fn new(mut script: Vec<Result<String, CollaboratorError>>) -> Self {
			script.reverse();
			Self {
				script: Mutex::new(script),
				calls: Arc::new(AtomicUsize::new(0)),
				pools: Arc::new(Mutex::new(vec![])),
			}
		}
	}

	impl Disambiguator for ScriptedModel {
		fn pick(
			&self,
			_name: &str,
			candidates: &[String],
		) -> Result<String, CollaboratorError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.pools.lock().unwrap().push(candidates.to_vec());
			self.script
				.lock()
				.unwrap()
				.pop()
				.unwrap_or_else(|| Err(CollaboratorError::Malformed("no more answers".into())))
		}
	}

	fn unavailable() -> CollaboratorError {
		CollaboratorError::Status {
			status: 503,
			body: "try later".into(),
		}
	}

	fn roster() -> RosterIndex {
		RosterIndex::build([
			"(ann) Anna K",
			"(bob) Bob R",
			"Giorgi Beridze",
			"(gb) Giorgi Bakradze",
		])
	}

	fn resolver_with(model: ScriptedModel) -> NameResolver {
		NameResolver::new(roster(), Some(Box::new(model)))
			.with_retry(RetryPolicy::immediate(3))
	}

	#[test]
	fn test_exact_alias() {
		let resolver = NameResolver::new(roster(), None);
		assert_eq!(
			resolver.resolve("Anna K"),
			Resolution::Resolved("(ann) Anna K".into())
		);
	}

	#[test]
	fn test_exact_full_record() {
		let resolver = NameResolver::new(roster(), None);
		assert_eq!(
			resolver.resolve("(bob) Bob R"),
			Resolution::Resolved("(bob) Bob R".into())
		);
		assert_eq!(
			resolver.resolve("Giorgi Beridze"),
			Resolution::Resolved("Giorgi Beridze".into())
		);
	}

	#[test]
	fn test_case_insensitive_alias() {
		let resolver = NameResolver::new(roster(), None);
		assert_eq!(
			resolver.resolve("giorgi BAKRADZE"),
			Resolution::Resolved("(gb) Giorgi Bakradze".into())
		);
	}

	#[test]
	fn test_cheap_tiers_do_not_call_model() {
		let model = ScriptedModel::new(vec![]);
		let calls = model.calls.clone();
		let resolver = resolver_with(model);

		resolver.resolve("Anna K");
		resolver.resolve("(bob) Bob R");
		resolver.resolve("anna k");
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_model_answer_accepted_when_in_roster() {
		let model = ScriptedModel::new(vec![Ok("(ann) Anna K".into())]);
		let pools = model.pools.clone();
		let resolver = resolver_with(model);

		assert_eq!(
			resolver.resolve("ana"),
			Resolution::Resolved("(ann) Anna K".into())
		);
		assert!(pools.lock().unwrap()[0].contains(&"(ann) Anna K".into()));
	}

	#[test]
	fn test_hallucinated_answer_is_rejected() {
		let model = ScriptedModel::new(vec![Ok("(ann) Anna Karenina".into())]);
		let calls = model.calls.clone();
		let resolver = resolver_with(model);

		assert_eq!(resolver.resolve("ana"), Resolution::NotFound);
		// a validation failure is not retried
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_null_answer_is_not_found() {
		let model = ScriptedModel::new(vec![Ok(NO_MATCH.into())]);
		let resolver = resolver_with(model);
		assert_eq!(resolver.resolve("somebody else"), Resolution::NotFound);
	}

	#[test]
	fn test_retries_until_success() {
		let model = ScriptedModel::new(vec![
			Err(unavailable()),
			Err(unavailable()),
			Ok("Giorgi Beridze".into()),
		]);
		let calls = model.calls.clone();
		let resolver = resolver_with(model);

		assert_eq!(
			resolver.resolve("Gio Berdze"),
			Resolution::Resolved("Giorgi Beridze".into())
		);
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[test]
	fn test_gives_up_after_three_failures() {
		let model = ScriptedModel::new(vec![
			Err(unavailable()),
			Err(unavailable()),
			Err(unavailable()),
			Ok("Giorgi Beridze".into()),
		]);
		let calls = model.calls.clone();
		let resolver = resolver_with(model);

		assert_eq!(resolver.resolve("Gio Berdze"), Resolution::NotFound);
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[test]
	fn test_permanent_failure_is_not_retried() {
		let model = ScriptedModel::new(vec![Err(CollaboratorError::Status {
			status: 401,
			body: "bad key".into(),
		})]);
		let calls = model.calls.clone();
		let resolver = resolver_with(model);

		assert_eq!(resolver.resolve("Gio"), Resolution::NotFound);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_empty_roster_never_resolves() {
		let model = ScriptedModel::new(vec![Ok("Anna K".into())]);
		let calls = model.calls.clone();
		let resolver = NameResolver::new(
			RosterIndex::from_json("this is not json"),
			Some(Box::new(model)),
		);

		for name in ["Anna K", "anna k", "", "(ann) Anna K"] {
			assert_eq!(resolver.resolve(name), Resolution::NotFound);
		}
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_display_names_resolve_in_any_case() {
		let mut rng = rand::thread_rng();
		let letters: Vec<char> = "abcdefghijklmnopqrstuvwxyz".chars().collect();

		let records: Vec<String> = (0..100)
			.map(|i| {
				let display: String = (0..rng.gen_range(3..12))
					.map(|_| letters[rng.gen_range(0..letters.len())])
					.collect();
				format!("(c{}) {} {}", i, display, i)
			})
			.collect();
		let resolver =
			NameResolver::new(RosterIndex::build(&records), None);

		for (i, record) in records.iter().enumerate() {
			let display = record.split_once(") ").unwrap().1;
			let mangled: String = display
				.chars()
				.map(|c| {
					if rng.gen_bool(0.5) {
						c.to_ascii_uppercase()
					} else {
						c
					}
				})
				.collect();

			assert_eq!(
				resolver.resolve(&mangled),
				Resolution::Resolved(record.clone()),
				"record {} from {}",
				i,
				mangled
			);
		}
	}
}
