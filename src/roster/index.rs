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
use log::{info, warn};
use std::collections::HashMap;

/// The canonical customer list in load order. Duplicates are kept as given.
#[derive(Debug, Default, Clone)]
pub struct Roster {
	records: Vec<String>,
}

impl Roster {
	pub fn records(&self) -> &[String] {
		&self.records
	}

	pub fn contains(&self, record: &str) -> bool {
		self.records.iter().any(|r| r == record)
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}

/// Display name -> canonical record, iterable in insertion order.
///
/// When two records share a display name the later one wins, but the key
/// keeps the position where it was first inserted.
#[derive(Debug, Default, Clone)]
pub struct AliasIndex {
	entries: Vec<(String, String)>,
	positions: HashMap<String, usize>,
}

impl AliasIndex {
	fn insert(&mut self, display: String, record: String) {
		if let Some(&i) = self.positions.get(&display) {
			warn!(
				"Display name '{}' now points to '{}' (was '{}')",
				display, record, self.entries[i].1
			);
			self.entries[i].1 = record;
			return;
		}
		self.positions.insert(display.clone(), self.entries.len());
		self.entries.push((display, record));
	}

	pub fn get(&self, display: &str) -> Option<&str> {
		self.positions
			.get(display)
			.map(|&i| self.entries[i].1.as_str())
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(k, _)| k.as_str())
	}

	/// First key equal to `name` ignoring case, with its record.
	pub fn find_ignore_case(&self, name: &str) -> Option<(&str, &str)> {
		let lower = name.to_lowercase();
		self.entries
			.iter()
			.find(|(k, _)| k.to_lowercase() == lower)
			.map(|(k, r)| (k.as_str(), r.as_str()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// The roster together with its derived lookup structures. Built once at
/// startup and never mutated afterwards; a reload builds a new one.
#[derive(Debug, Default, Clone)]
pub struct RosterIndex {
	roster: Roster,
	aliases: AliasIndex,
}

impl RosterIndex {
	pub fn build<I, S>(records: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut index = RosterIndex::default();

		for record in records {
			let record = record.as_ref().trim();
			if record.is_empty() {
				continue;
			}

			index.roster.records.push(record.to_string());
			index
				.aliases
				.insert(display_name(record).to_string(), record.to_string());
		}

		index
	}

	/// Builds from a JSON array of strings. Anything that does not decode
	/// yields an empty roster, so every lookup misses instead of the
	/// process refusing to start.
	pub fn from_json(payload: &str) -> Self {
		match serde_json::from_str::<Vec<String>>(payload) {
			Ok(records) => {
				let index = RosterIndex::build(records);
				info!("Loaded {} customers", index.roster.len());
				index
			},
			Err(e) => {
				warn!("Failed to load customers: {}", e);
				RosterIndex::default()
			},
		}
	}

	pub fn roster(&self) -> &Roster {
		&self.roster
	}

	pub fn aliases(&self) -> &AliasIndex {
		&self.aliases
	}
}

/// Strips a leading "(alias)" from a record. Records without one, or with
/// nothing after it, are their own display name.
pub fn display_name(record: &str) -> &str {
	let display = record
		.strip_prefix('(')
		.and_then(|rest| rest.split_once(')'))
		.map(|(_, display)| display.trim());

	match display {
		Some(d) if !d.is_empty() => d,
		_ => record,
	}
}
